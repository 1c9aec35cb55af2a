//! Study Space Network Library
//!
//! HTTP surface for the booking service.
//!
//! # Architecture
//!
//! - **Server**: axum router over a shared [`studyspace_core::Storage`]
//! - **Client**: typed `reqwest` wrapper for the same routes
//! - **Mirror**: client-side cache with explicit connected/offline modes
//!
//! # Usage
//!
//! ```ignore
//! let db = Database::open("studyspace.db")?;
//! let listener = TcpListener::bind(("127.0.0.1", DEFAULT_PORT)).await?;
//! serve(listener, AppState::new(db), shutdown_signal()).await?;
//!
//! let mut mirror = Mirror::new(ApiClient::new("http://127.0.0.1:5000"));
//! mirror.refresh().await?;
//! ```

pub mod client;
pub mod error;
mod handlers;
pub mod mirror;
pub mod protocol;
pub mod server;

pub use client::ApiClient;
pub use error::{ApiError, Error, Result};
pub use mirror::{
    Applied, Cached, ConnectionState, Mirror, PendingChange, RefreshReport, SyncState, Unsynced,
};
pub use protocol::{ErrorBody, HealthStatus};
pub use server::{router, serve, AppState};

/// Default port for the booking API
pub const DEFAULT_PORT: u16 = 5000;
