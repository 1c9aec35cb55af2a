//! Storage repository traits
//!
//! These traits define the storage interface, allowing for different
//! implementations (SQLite, in-memory substitutes in tests).

use uuid::Uuid;

use crate::error::Result;
use crate::models::{
    Booking, BookingDetails, NoiseReport, NoiseReportDetails, StudySpace, User,
};

/// User repository operations
pub trait UserRepository {
    /// Create a new user
    fn create_user(&self, user: &User) -> Result<()>;

    /// Find user by ID
    fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>>;

    /// Find user by normalized email
    fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;
}

/// Study space repository operations
pub trait SpaceRepository {
    /// Insert a space
    fn create_space(&self, space: &StudySpace) -> Result<()>;

    /// Find space by ID
    fn find_space_by_id(&self, id: Uuid) -> Result<Option<StudySpace>>;

    /// All spaces in storage order
    fn list_spaces(&self) -> Result<Vec<StudySpace>>;

    /// Number of spaces
    fn count_spaces(&self) -> Result<u64>;
}

/// Booking repository operations
pub trait BookingRepository {
    /// Insert a new booking
    fn create_booking(&self, booking: &Booking) -> Result<()>;

    /// Find the bare booking row
    fn find_booking(&self, id: Uuid) -> Result<Option<Booking>>;

    /// Find a booking joined with user email and space name
    fn find_booking_details(&self, id: Uuid) -> Result<Option<BookingDetails>>;

    /// All bookings, newest first
    fn list_booking_details(&self) -> Result<Vec<BookingDetails>>;

    /// One user's bookings, newest first
    fn list_booking_details_for_user(&self, user_id: Uuid) -> Result<Vec<BookingDetails>>;

    /// Persist lifecycle fields if the stored row still matches `prior`
    fn update_booking_lifecycle(&self, booking: &Booking, prior: &Booking) -> Result<bool>;
}

/// Noise report repository operations
pub trait NoiseReportRepository {
    /// Insert a report
    fn create_noise_report(&self, report: &NoiseReport) -> Result<()>;

    /// Find a report joined with user email and space name
    fn find_noise_report_details(&self, id: Uuid) -> Result<Option<NoiseReportDetails>>;

    /// All reports, newest first
    fn list_noise_report_details(&self) -> Result<Vec<NoiseReportDetails>>;

    /// Reports for one space, newest first
    fn list_noise_report_details_for_space(&self, space_id: Uuid)
        -> Result<Vec<NoiseReportDetails>>;
}

/// Combined storage interface
///
/// Provides access to all repository operations.
/// Implementations may be backed by SQLite or by test substitutes.
pub trait Storage: UserRepository + SpaceRepository + BookingRepository + NoiseReportRepository {}

// Blanket implementation: any type implementing all traits implements Storage
impl<T> Storage for T where
    T: UserRepository + SpaceRepository + BookingRepository + NoiseReportRepository
{
}
