//! SQLite storage layer for Study Space

mod bookings;
mod migrations;
mod noise_reports;
mod parse;
mod spaces;
mod traits;
mod users;

use uuid::Uuid;

use crate::error::Result;
use crate::models::{
    Booking, BookingDetails, NoiseReport, NoiseReportDetails, StudySpace, User,
};
use rusqlite::Connection;
use std::path::Path;
use std::time::Duration;
use tracing::instrument;

pub use bookings::BookingStore;
pub use noise_reports::NoiseReportStore;
pub use spaces::SpaceStore;
pub use traits::{
    BookingRepository, NoiseReportRepository, SpaceRepository, Storage, UserRepository,
};
pub use users::UserStore;

/// How long a writer waits on a locked database file before failing
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Main database handle
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create database at the given path
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::configure(conn)
    }

    /// Open in-memory database (for testing)
    #[instrument]
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::configure(conn)
    }

    fn configure(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON")?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initialize database schema via migrations
    fn init(&self) -> Result<()> {
        migrations::run_migrations(&self.conn)?;
        Ok(())
    }

    /// Get current schema version
    pub fn schema_version(&self) -> u32 {
        self.conn
            .query_row("SELECT MAX(version) FROM schema_migrations", [], |row| {
                row.get(0)
            })
            .unwrap_or(0)
    }

    /// Get user store
    pub fn users(&self) -> UserStore<'_> {
        UserStore::new(&self.conn)
    }

    /// Get study space store
    pub fn spaces(&self) -> SpaceStore<'_> {
        SpaceStore::new(&self.conn)
    }

    /// Get booking store
    pub fn bookings(&self) -> BookingStore<'_> {
        BookingStore::new(&self.conn)
    }

    /// Get noise report store
    pub fn noise_reports(&self) -> NoiseReportStore<'_> {
        NoiseReportStore::new(&self.conn)
    }
}

// Implement repository traits for Database
// Write paths classify constraint failures so callers see client errors

impl UserRepository for Database {
    fn create_user(&self, user: &User) -> Result<()> {
        self.users().create(user).map_err(|e| e.classify())
    }

    fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>> {
        self.users().find_by_id(id)
    }

    fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.users().find_by_email(email)
    }
}

impl SpaceRepository for Database {
    fn create_space(&self, space: &StudySpace) -> Result<()> {
        self.spaces().create(space).map_err(|e| e.classify())
    }

    fn find_space_by_id(&self, id: Uuid) -> Result<Option<StudySpace>> {
        self.spaces().find_by_id(id)
    }

    fn list_spaces(&self) -> Result<Vec<StudySpace>> {
        self.spaces().list()
    }

    fn count_spaces(&self) -> Result<u64> {
        self.spaces().count()
    }
}

impl BookingRepository for Database {
    fn create_booking(&self, booking: &Booking) -> Result<()> {
        self.bookings().create(booking).map_err(|e| e.classify())
    }

    fn find_booking(&self, id: Uuid) -> Result<Option<Booking>> {
        self.bookings().find_by_id(id)
    }

    fn find_booking_details(&self, id: Uuid) -> Result<Option<BookingDetails>> {
        self.bookings().find_details(id)
    }

    fn list_booking_details(&self) -> Result<Vec<BookingDetails>> {
        self.bookings().list_details()
    }

    fn list_booking_details_for_user(&self, user_id: Uuid) -> Result<Vec<BookingDetails>> {
        self.bookings().list_details_for_user(user_id)
    }

    fn update_booking_lifecycle(&self, booking: &Booking, prior: &Booking) -> Result<bool> {
        self.bookings()
            .update_lifecycle(booking, prior)
            .map_err(|e| e.classify())
    }
}

impl NoiseReportRepository for Database {
    fn create_noise_report(&self, report: &NoiseReport) -> Result<()> {
        self.noise_reports().create(report).map_err(|e| e.classify())
    }

    fn find_noise_report_details(&self, id: Uuid) -> Result<Option<NoiseReportDetails>> {
        self.noise_reports().find_details(id)
    }

    fn list_noise_report_details(&self) -> Result<Vec<NoiseReportDetails>> {
        self.noise_reports().list_details()
    }

    fn list_noise_report_details_for_space(
        &self,
        space_id: Uuid,
    ) -> Result<Vec<NoiseReportDetails>> {
        self.noise_reports().list_details_for_space(space_id)
    }
}
