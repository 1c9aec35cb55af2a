//! HTTP client for the booking API

use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use chrono::NaiveDate;
use studyspace_core::models::{BookingDetails, NoiseReportDetails, StudySpace, User};
use studyspace_core::{CreateBookingRequest, CreateNoiseReportRequest, LoginRequest, Overview};

use crate::error::{Error, Result};
use crate::protocol::{ErrorBody, HealthStatus};

/// Thin typed wrapper over the REST surface
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// `base_url` is scheme, host and port, e.g. `http://127.0.0.1:5000`
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn health(&self) -> Result<HealthStatus> {
        self.get("/health").await
    }

    pub async fn login(&self, request: &LoginRequest) -> Result<User> {
        self.send_json(Method::POST, "/api/login", request).await
    }

    pub async fn user(&self, id: Uuid) -> Result<User> {
        self.get(&format!("/api/users/{id}")).await
    }

    pub async fn spaces(&self) -> Result<Vec<StudySpace>> {
        self.get("/api/spaces").await
    }

    pub async fn space(&self, id: Uuid) -> Result<StudySpace> {
        self.get(&format!("/api/spaces/{id}")).await
    }

    pub async fn overview(&self, date: Option<NaiveDate>) -> Result<Overview> {
        match date {
            Some(date) => self.get(&format!("/api/admin/overview?date={date}")).await,
            None => self.get("/api/admin/overview").await,
        }
    }

    pub async fn create_booking(&self, request: &CreateBookingRequest) -> Result<BookingDetails> {
        self.send_json(Method::POST, "/bookings", request).await
    }

    pub async fn bookings(&self) -> Result<Vec<BookingDetails>> {
        self.get("/bookings").await
    }

    pub async fn booking(&self, id: Uuid) -> Result<BookingDetails> {
        self.get(&format!("/bookings/{id}")).await
    }

    pub async fn bookings_for_user(&self, user_id: Uuid) -> Result<Vec<BookingDetails>> {
        self.get(&format!("/bookings/user/{user_id}")).await
    }

    pub async fn check_in(&self, id: Uuid) -> Result<BookingDetails> {
        self.put(&format!("/bookings/{id}/checkin")).await
    }

    pub async fn check_out(&self, id: Uuid) -> Result<BookingDetails> {
        self.put(&format!("/bookings/{id}/checkout")).await
    }

    pub async fn cancel_booking(&self, id: Uuid) -> Result<BookingDetails> {
        self.put(&format!("/bookings/{id}/cancel")).await
    }

    pub async fn create_noise_report(
        &self,
        request: &CreateNoiseReportRequest,
    ) -> Result<NoiseReportDetails> {
        self.send_json(Method::POST, "/noise-reports", request).await
    }

    pub async fn noise_reports(&self) -> Result<Vec<NoiseReportDetails>> {
        self.get("/noise-reports").await
    }

    pub async fn noise_reports_for_space(&self, space_id: Uuid) -> Result<Vec<NoiseReportDetails>> {
        self.get(&format!("/noise-reports/space/{space_id}")).await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.execute(self.request(Method::GET, path)).await
    }

    async fn put<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.execute(self.request(Method::PUT, path)).await
    }

    async fn send_json<B, T>(&self, method: Method, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.execute(self.request(method, path).json(body)).await
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, format!("{}{}", self.base_url, path))
    }

    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request.send().await.map_err(Error::Transport)?;
        let status = response.status();
        debug!(status = status.as_u16(), url = %response.url(), "Response received");

        if !status.is_success() {
            let message = match response.json::<ErrorBody>().await {
                Ok(body) => body.error,
                Err(_) => status.canonical_reason().unwrap_or("error").to_string(),
            };
            return Err(Error::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| Error::Decode(e.to_string()))
    }
}
