//! HTTP server for the booking API
//!
//! One store is shared by every request. Handlers take the lock for the
//! duration of a single service call and never across an `.await`.

use std::future::Future;
use std::io;
use std::sync::{Arc, Mutex};

use axum::routing::{get, post, put};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tower_http::LatencyUnit;
use tracing::{info, Level};

use studyspace_core::Storage;

use crate::error::{ApiError, ApiResult};
use crate::handlers;

/// State handed to every handler
#[derive(Clone)]
pub struct AppState {
    store: Arc<Mutex<dyn Storage + Send>>,
}

impl AppState {
    pub fn new<S: Storage + Send + 'static>(store: S) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
        }
    }

    /// Run `f` with exclusive access to the store
    pub fn with_store<T>(
        &self,
        f: impl FnOnce(&(dyn Storage + Send)) -> studyspace_core::Result<T>,
    ) -> ApiResult<T> {
        let store = self
            .store
            .lock()
            .map_err(|_| ApiError::Unavailable("store lock poisoned".to_string()))?;
        Ok(f(&*store)?)
    }
}

/// Build the API router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/login", post(handlers::login))
        .route("/api/users/{id}", get(handlers::show_user))
        .route("/api/spaces", get(handlers::show_space_list))
        .route("/api/spaces/{id}", get(handlers::show_space))
        .route("/api/admin/overview", get(handlers::show_overview))
        .route(
            "/bookings",
            post(handlers::register_booking).get(handlers::show_booking_list),
        )
        .route("/bookings/{id}", get(handlers::show_booking))
        .route("/bookings/user/{user_id}", get(handlers::show_user_bookings))
        .route("/bookings/{id}/checkin", put(handlers::check_in))
        .route("/bookings/{id}/checkout", put(handlers::check_out))
        .route("/bookings/{id}/cancel", put(handlers::cancel_booking))
        .route(
            "/noise-reports",
            post(handlers::register_noise_report).get(handlers::show_noise_report_list),
        )
        .route(
            "/noise-reports/space/{space_id}",
            get(handlers::show_space_noise_reports),
        )
        .fallback(handlers::not_found)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .latency_unit(LatencyUnit::Millis),
                ),
        )
        .with_state(state)
}

/// Serve the API on `listener` until `shutdown` resolves
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    info!(addr = %addr, "Listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
}

/// Start a seeded in-memory server on an ephemeral port
#[cfg(test)]
pub(crate) async fn spawn_test_server() -> std::net::SocketAddr {
    use studyspace_core::{seed_spaces, Database};

    let db = Database::open_in_memory().unwrap();
    seed_spaces(&db).unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(serve(listener, AppState::new(db), std::future::pending()));
    addr
}
