//! Client-side mirror of server state
//!
//! Holds the last rows fetched from the server. While the server is
//! unreachable, mutations are kept as [`Unsynced`] entries instead of being
//! dressed up as server rows; they are reported and dropped on the next
//! successful [`Mirror::refresh`].

use chrono::{DateTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use studyspace_core::lifecycle::{self, Transition};
use studyspace_core::models::{BookingDetails, NoiseReportDetails, StudySpace};
use studyspace_core::{CreateBookingRequest, CreateNoiseReportRequest, Error as CoreError};

use crate::client::ApiClient;
use crate::error::{Error, Result};

/// Whether the mirror is talking to the server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connected,
    Offline,
}

/// Freshness of cached rows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// Fetched or written while connected
    Synced,
    /// Last known server rows; the server may have moved on
    Stale,
}

/// Cached rows and how far they can be trusted
#[derive(Debug, PartialEq)]
pub struct Cached<'a, T> {
    pub rows: &'a [T],
    pub sync: SyncState,
}

/// A mutation recorded while offline
#[derive(Debug, Clone)]
pub enum PendingChange {
    CreateBooking(CreateBookingRequest),
    Transition { booking_id: Uuid, transition: Transition },
    CreateNoiseReport(CreateNoiseReportRequest),
}

#[derive(Debug, Clone)]
pub struct Unsynced {
    pub local_id: Uuid,
    pub change: PendingChange,
    pub recorded_at: DateTime<Utc>,
}

/// Result of a mutation made through the mirror
#[derive(Debug, Clone, PartialEq)]
pub enum Applied<T> {
    /// The server accepted it and returned its row
    Synced(T),
    /// Recorded locally under this id; not on the server
    Unsynced(Uuid),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshReport {
    /// Offline changes discarded by this refresh
    pub dropped_unsynced: usize,
}

pub struct Mirror {
    client: ApiClient,
    state: ConnectionState,
    spaces: Vec<StudySpace>,
    bookings: Vec<BookingDetails>,
    noise_reports: Vec<NoiseReportDetails>,
    unsynced: Vec<Unsynced>,
}

impl Mirror {
    /// An empty mirror; it stays offline until the first [`Mirror::refresh`]
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            state: ConnectionState::Offline,
            spaces: Vec::new(),
            bookings: Vec::new(),
            noise_reports: Vec::new(),
            unsynced: Vec::new(),
        }
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.state
    }

    pub fn spaces(&self) -> Cached<'_, StudySpace> {
        self.cached(&self.spaces)
    }

    pub fn bookings(&self) -> Cached<'_, BookingDetails> {
        self.cached(&self.bookings)
    }

    pub fn noise_reports(&self) -> Cached<'_, NoiseReportDetails> {
        self.cached(&self.noise_reports)
    }

    pub fn unsynced(&self) -> &[Unsynced] {
        &self.unsynced
    }

    fn cached<'a, T>(&self, rows: &'a [T]) -> Cached<'a, T> {
        let sync = match self.state {
            ConnectionState::Connected => SyncState::Synced,
            ConnectionState::Offline => SyncState::Stale,
        };
        Cached { rows, sync }
    }

    /// Refetch everything from the server.
    ///
    /// On success the cache is replaced and any unsynced entries are dropped;
    /// the report says how many.
    pub async fn refresh(&mut self) -> Result<RefreshReport> {
        let fetched = fetch_all(&self.client).await;
        let (spaces, bookings, noise_reports) = match fetched {
            Ok(rows) => rows,
            Err(e) => {
                if e.is_transport() {
                    self.go_offline(&e);
                }
                return Err(e);
            }
        };

        let dropped_unsynced = self.unsynced.len();
        if dropped_unsynced > 0 {
            warn!(dropped = dropped_unsynced, "Discarding changes made while offline");
        }
        self.unsynced.clear();

        self.spaces = spaces;
        self.bookings = bookings;
        self.noise_reports = noise_reports;
        if self.state == ConnectionState::Offline {
            info!(server = %self.client.base_url(), "Connected");
        }
        self.state = ConnectionState::Connected;

        Ok(RefreshReport { dropped_unsynced })
    }

    pub async fn create_booking(
        &mut self,
        request: CreateBookingRequest,
    ) -> Result<Applied<BookingDetails>> {
        request.validate()?;

        if self.state == ConnectionState::Offline {
            return Ok(self.record(PendingChange::CreateBooking(request)));
        }
        match self.client.create_booking(&request).await {
            Ok(details) => {
                self.upsert_booking(details.clone());
                Ok(Applied::Synced(details))
            }
            Err(e) if e.is_transport() => {
                self.go_offline(&e);
                Ok(self.record(PendingChange::CreateBooking(request)))
            }
            Err(e) => Err(e),
        }
    }

    pub async fn check_in(&mut self, booking_id: Uuid) -> Result<Applied<BookingDetails>> {
        self.transition(booking_id, Transition::CheckIn).await
    }

    pub async fn check_out(&mut self, booking_id: Uuid) -> Result<Applied<BookingDetails>> {
        self.transition(booking_id, Transition::CheckOut).await
    }

    pub async fn cancel_booking(&mut self, booking_id: Uuid) -> Result<Applied<BookingDetails>> {
        self.transition(booking_id, Transition::Cancel).await
    }

    async fn transition(
        &mut self,
        booking_id: Uuid,
        transition: Transition,
    ) -> Result<Applied<BookingDetails>> {
        // Reject what the cached row already rules out
        if let Some(cached) = self.bookings.iter().find(|d| d.booking.id == booking_id) {
            if !lifecycle::is_allowed(cached.booking.phase(), transition) {
                return Err(Error::Local(CoreError::InvalidTransition(format!(
                    "cannot {} booking {booking_id} in its cached state",
                    transition.as_str()
                ))));
            }
        }

        let change = PendingChange::Transition {
            booking_id,
            transition,
        };
        if self.state == ConnectionState::Offline {
            return Ok(self.record(change));
        }

        let sent = match transition {
            Transition::CheckIn => self.client.check_in(booking_id).await,
            Transition::CheckOut => self.client.check_out(booking_id).await,
            Transition::Cancel => self.client.cancel_booking(booking_id).await,
        };
        match sent {
            Ok(details) => {
                self.upsert_booking(details.clone());
                Ok(Applied::Synced(details))
            }
            Err(e) if e.is_transport() => {
                self.go_offline(&e);
                Ok(self.record(change))
            }
            Err(e) => Err(e),
        }
    }

    pub async fn create_noise_report(
        &mut self,
        request: CreateNoiseReportRequest,
    ) -> Result<Applied<NoiseReportDetails>> {
        request.validate()?;

        if self.state == ConnectionState::Offline {
            return Ok(self.record(PendingChange::CreateNoiseReport(request)));
        }
        match self.client.create_noise_report(&request).await {
            Ok(details) => {
                self.noise_reports.insert(0, details.clone());
                Ok(Applied::Synced(details))
            }
            Err(e) if e.is_transport() => {
                self.go_offline(&e);
                Ok(self.record(PendingChange::CreateNoiseReport(request)))
            }
            Err(e) => Err(e),
        }
    }

    fn record<T>(&mut self, change: PendingChange) -> Applied<T> {
        let local_id = Uuid::new_v4();
        self.unsynced.push(Unsynced {
            local_id,
            change,
            recorded_at: Utc::now(),
        });
        Applied::Unsynced(local_id)
    }

    fn go_offline(&mut self, cause: &Error) {
        if self.state == ConnectionState::Connected {
            warn!(error = %cause, "Server unreachable, switching to offline mode");
        }
        self.state = ConnectionState::Offline;
    }

    /// Insert or replace, keeping the server's newest-first order
    fn upsert_booking(&mut self, details: BookingDetails) {
        match self
            .bookings
            .iter_mut()
            .find(|d| d.booking.id == details.booking.id)
        {
            Some(existing) => *existing = details,
            None => self.bookings.push(details),
        }
        self.bookings.sort_by(|a, b| {
            let (a, b) = (&a.booking, &b.booking);
            (b.date, b.start_time, b.created_at).cmp(&(a.date, a.start_time, a.created_at))
        });
    }
}

async fn fetch_all(
    client: &ApiClient,
) -> Result<(Vec<StudySpace>, Vec<BookingDetails>, Vec<NoiseReportDetails>)> {
    let spaces = client.spaces().await?;
    let bookings = client.bookings().await?;
    let noise_reports = client.noise_reports().await?;
    Ok((spaces, bookings, noise_reports))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::spawn_test_server;
    use studyspace_core::{BookingStatus, LoginRequest, UserRole};

    async fn connected_mirror() -> (Mirror, Uuid, Uuid) {
        let addr = spawn_test_server().await;
        let client = ApiClient::new(format!("http://{addr}"));
        let user = client
            .login(&LoginRequest::new("alice@x.edu", UserRole::Student))
            .await
            .unwrap();

        let mut mirror = Mirror::new(client);
        let report = mirror.refresh().await.unwrap();
        assert_eq!(report.dropped_unsynced, 0);
        let space_id = mirror.spaces().rows[0].id;
        (mirror, user.id, space_id)
    }

    #[tokio::test]
    async fn test_connected_mutations_update_cache() {
        let (mut mirror, user_id, space_id) = connected_mirror().await;
        assert_eq!(mirror.connection_state(), ConnectionState::Connected);
        assert_eq!(mirror.spaces().rows.len(), 5);

        let request = CreateBookingRequest::new(user_id, space_id, "2024-01-10", "09:00", "10:00");
        let Applied::Synced(created) = mirror.create_booking(request).await.unwrap() else {
            panic!("expected a synced booking");
        };
        let id = created.booking.id;

        mirror.check_in(id).await.unwrap();
        let Applied::Synced(done) = mirror.check_out(id).await.unwrap() else {
            panic!("expected a synced check-out");
        };
        assert_eq!(done.booking.status, BookingStatus::Completed);

        let bookings = mirror.bookings();
        assert_eq!(bookings.sync, SyncState::Synced);
        assert_eq!(bookings.rows, &[done][..]);
        assert!(mirror.unsynced().is_empty());
    }

    #[tokio::test]
    async fn test_server_rejections_are_not_masked() {
        let (mut mirror, user_id, space_id) = connected_mirror().await;

        let err = mirror.check_in(Uuid::new_v4()).await.unwrap_err();
        assert_eq!(err.status(), Some(404));

        let mut request = CreateBookingRequest::new(user_id, space_id, "2024-01-10", "09:00", "10:00");
        request.end_time = None;
        assert!(matches!(
            mirror.create_booking(request).await,
            Err(Error::Local(CoreError::Validation(_)))
        ));

        assert_eq!(mirror.connection_state(), ConnectionState::Connected);
        assert!(mirror.unsynced().is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_server_goes_offline() {
        let mut mirror = Mirror::new(ApiClient::new("http://127.0.0.1:1"));

        assert!(mirror.refresh().await.unwrap_err().is_transport());
        assert_eq!(mirror.connection_state(), ConnectionState::Offline);

        let applied = mirror
            .create_noise_report(CreateNoiseReportRequest::new(
                Uuid::new_v4(),
                Uuid::new_v4(),
                "music",
            ))
            .await
            .unwrap();
        let Applied::Unsynced(local_id) = applied else {
            panic!("expected an unsynced report");
        };

        assert_eq!(mirror.unsynced().len(), 1);
        assert_eq!(mirror.unsynced()[0].local_id, local_id);
        // Nothing is presented as a server row
        assert!(mirror.noise_reports().rows.is_empty());
        assert_eq!(mirror.noise_reports().sync, SyncState::Stale);
    }

    #[tokio::test]
    async fn test_refresh_reports_dropped_changes() {
        let addr = spawn_test_server().await;
        let mut mirror = Mirror::new(ApiClient::new(format!("http://{addr}")));

        // Never refreshed, so still offline
        let applied = mirror
            .create_booking(CreateBookingRequest::new(
                Uuid::new_v4(),
                Uuid::new_v4(),
                "2024-01-10",
                "09:00",
                "10:00",
            ))
            .await
            .unwrap();
        assert!(matches!(applied, Applied::Unsynced(_)));
        mirror.check_in(Uuid::new_v4()).await.unwrap();

        let report = mirror.refresh().await.unwrap();
        assert_eq!(report.dropped_unsynced, 2);
        assert!(mirror.unsynced().is_empty());
        assert_eq!(mirror.connection_state(), ConnectionState::Connected);
        assert!(mirror.bookings().rows.is_empty());
    }
}
