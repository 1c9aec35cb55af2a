//! Operations behind the HTTP API
//!
//! Each function validates its input, talks to a [`Storage`] and returns
//! the shape the API serves. Callers hold exclusive access to the store for
//! the duration of a call, so read-then-write sequences here are not
//! interleaved with other requests.

use chrono::NaiveDate;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::lifecycle::{self, Transition};
use crate::models::{self, Booking, BookingDetails, NoiseReport, NoiseReportDetails, StudySpace, User};
use crate::overview::{self, Overview};
use crate::storage::Storage;
use crate::validation::{CreateBookingRequest, CreateNoiseReportRequest, LoginRequest};

/// Result of a login: the account, and whether it was just created
#[derive(Debug, Clone, PartialEq)]
pub struct LoginOutcome {
    pub user: User,
    pub created: bool,
}

/// Find the user with this email, or create one with the requested role.
///
/// An existing account keeps its stored role.
#[instrument(skip(store, request))]
pub fn login<S: Storage + ?Sized>(store: &S, request: &LoginRequest) -> Result<LoginOutcome> {
    let login = request.validate()?;

    if let Some(user) = store.find_user_by_email(&login.email)? {
        if user.role != login.role {
            warn!(user_id = %user.id, stored = %user.role, requested = %login.role, "Login role differs from stored role");
        }
        return Ok(LoginOutcome {
            user,
            created: false,
        });
    }

    let user = User::new(login.email, login.role);
    match store.create_user(&user) {
        Ok(()) => {
            info!(user_id = %user.id, role = %user.role, "Created user");
            Ok(LoginOutcome {
                user,
                created: true,
            })
        }
        // Another writer registered the same email first
        Err(Error::Constraint(_)) => {
            let user = store
                .find_user_by_email(&user.email)?
                .ok_or_else(|| Error::NotFound(format!("user {}", user.email)))?;
            Ok(LoginOutcome {
                user,
                created: false,
            })
        }
        Err(e) => Err(e),
    }
}

pub fn get_user<S: Storage + ?Sized>(store: &S, id: Uuid) -> Result<User> {
    store
        .find_user_by_id(id)?
        .ok_or_else(|| Error::NotFound(format!("user {id}")))
}

pub fn list_spaces<S: Storage + ?Sized>(store: &S) -> Result<Vec<StudySpace>> {
    store.list_spaces()
}

pub fn get_space<S: Storage + ?Sized>(store: &S, id: Uuid) -> Result<StudySpace> {
    store
        .find_space_by_id(id)?
        .ok_or_else(|| Error::NotFound(format!("study space {id}")))
}

/// Record a new active booking and return it with user email and space name
#[instrument(skip(store, request))]
pub fn create_booking<S: Storage + ?Sized>(
    store: &S,
    request: &CreateBookingRequest,
) -> Result<BookingDetails> {
    let new = request.validate()?;
    let booking = Booking::new(new.user_id, new.space_id, new.date, new.start_time, new.end_time);

    store.create_booking(&booking)?;
    info!(booking_id = %booking.id, space_id = %booking.space_id, date = %booking.date, "Booking created");

    booking_details(store, booking.id)
}

pub fn get_booking<S: Storage + ?Sized>(store: &S, id: Uuid) -> Result<BookingDetails> {
    booking_details(store, id)
}

pub fn list_bookings<S: Storage + ?Sized>(store: &S) -> Result<Vec<BookingDetails>> {
    store.list_booking_details()
}

/// A user's bookings; an unknown user simply has none
pub fn list_bookings_for_user<S: Storage + ?Sized>(
    store: &S,
    user_id: Uuid,
) -> Result<Vec<BookingDetails>> {
    store.list_booking_details_for_user(user_id)
}

pub fn check_in<S: Storage + ?Sized>(store: &S, id: Uuid) -> Result<BookingDetails> {
    apply_transition(store, id, Transition::CheckIn)
}

pub fn check_out<S: Storage + ?Sized>(store: &S, id: Uuid) -> Result<BookingDetails> {
    apply_transition(store, id, Transition::CheckOut)
}

pub fn cancel_booking<S: Storage + ?Sized>(store: &S, id: Uuid) -> Result<BookingDetails> {
    apply_transition(store, id, Transition::Cancel)
}

#[instrument(skip(store, transition), fields(transition = transition.as_str()))]
fn apply_transition<S: Storage + ?Sized>(
    store: &S,
    id: Uuid,
    transition: Transition,
) -> Result<BookingDetails> {
    let mut booking = store
        .find_booking(id)?
        .ok_or_else(|| Error::NotFound(format!("booking {id}")))?;
    let prior = booking.clone();

    lifecycle::apply(&mut booking, transition, models::now())?;

    if !store.update_booking_lifecycle(&booking, &prior)? {
        return Err(Error::InvalidTransition(format!(
            "cannot {} booking {id}: it was changed concurrently",
            transition.as_str()
        )));
    }
    info!(booking_id = %id, status = %booking.status, "Booking updated");

    booking_details(store, id)
}

fn booking_details<S: Storage + ?Sized>(store: &S, id: Uuid) -> Result<BookingDetails> {
    store
        .find_booking_details(id)?
        .ok_or_else(|| Error::NotFound(format!("booking {id}")))
}

#[instrument(skip(store, request))]
pub fn create_noise_report<S: Storage + ?Sized>(
    store: &S,
    request: &CreateNoiseReportRequest,
) -> Result<NoiseReportDetails> {
    let new = request.validate()?;
    let report = NoiseReport::new(new.user_id, new.space_id, new.description);

    store.create_noise_report(&report)?;
    info!(report_id = %report.id, space_id = %report.space_id, "Noise report filed");

    store
        .find_noise_report_details(report.id)?
        .ok_or_else(|| Error::NotFound(format!("noise report {}", report.id)))
}

pub fn list_noise_reports<S: Storage + ?Sized>(store: &S) -> Result<Vec<NoiseReportDetails>> {
    store.list_noise_report_details()
}

pub fn list_noise_reports_for_space<S: Storage + ?Sized>(
    store: &S,
    space_id: Uuid,
) -> Result<Vec<NoiseReportDetails>> {
    store.list_noise_report_details_for_space(space_id)
}

/// Occupancy per space on `date`, plus totals
pub fn admin_overview<S: Storage + ?Sized>(store: &S, date: NaiveDate) -> Result<Overview> {
    let spaces = store.list_spaces()?;
    let bookings = store.list_booking_details()?;
    let reports = store.list_noise_report_details()?;
    Ok(overview::summarize(date, spaces, &bookings, reports.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BookingStatus, SpaceType, UserRole};
    use crate::seed::seed_spaces;
    use crate::storage::{Database, SpaceRepository, UserRepository};

    fn setup() -> (Database, User, StudySpace) {
        let db = Database::open_in_memory().unwrap();
        seed_spaces(&db).unwrap();
        let user = login(&db, &LoginRequest::new("alice@x.edu", UserRole::Student))
            .unwrap()
            .user;
        let space = db.list_spaces().unwrap().remove(1);
        (db, user, space)
    }

    fn book(db: &Database, user: &User, space: &StudySpace) -> BookingDetails {
        create_booking(
            db,
            &CreateBookingRequest::new(user.id, space.id, "2024-01-10", "09:00", "10:00"),
        )
        .unwrap()
    }

    #[test]
    fn test_login_creates_then_returns_same_user() {
        let db = Database::open_in_memory().unwrap();

        let first = login(&db, &LoginRequest::new("alice@x.edu", UserRole::Student)).unwrap();
        assert!(first.created);
        assert_eq!(first.user.name, "alice");

        let again = login(&db, &LoginRequest::new("ALICE@x.edu", UserRole::Admin)).unwrap();
        assert!(!again.created);
        assert_eq!(again.user.id, first.user.id);
        // Stored role wins
        assert_eq!(again.user.role, UserRole::Student);
    }

    #[test]
    fn test_login_validation_precedes_storage() {
        let db = Database::open_in_memory().unwrap();
        let err = login(&db, &LoginRequest::default()).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(db.find_user_by_email("").unwrap().is_none());
    }

    #[test]
    fn test_unknown_user_and_space_not_found() {
        let db = Database::open_in_memory().unwrap();
        assert!(matches!(get_user(&db, Uuid::new_v4()), Err(Error::NotFound(_))));
        assert!(matches!(get_space(&db, Uuid::new_v4()), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_create_booking_returns_details() {
        let (db, user, space) = setup();

        let details = book(&db, &user, &space);
        assert_eq!(details.booking.status, BookingStatus::Active);
        assert_eq!(details.user_email, "alice@x.edu");
        assert_eq!(details.space_name, "Group Study Room 1");
        assert!(details.booking.check_in_time.is_none());

        let listed = list_bookings_for_user(&db, user.id).unwrap();
        assert_eq!(listed, vec![details]);
    }

    #[test]
    fn test_create_booking_for_unknown_space_is_client_error() {
        let (db, user, _) = setup();
        let err = create_booking(
            &db,
            &CreateBookingRequest::new(user.id, Uuid::new_v4(), "2024-01-10", "09:00", "10:00"),
        )
        .unwrap_err();

        assert!(matches!(err, Error::Constraint(_)));
        assert!(list_bookings(&db).unwrap().is_empty());
    }

    #[test]
    fn test_full_lifecycle() {
        let (db, user, space) = setup();
        let id = book(&db, &user, &space).booking.id;

        let checked_in = check_in(&db, id).unwrap();
        assert_eq!(checked_in.booking.status, BookingStatus::Active);
        assert!(checked_in.booking.check_in_time.is_some());

        let done = check_out(&db, id).unwrap();
        assert_eq!(done.booking.status, BookingStatus::Completed);
        assert!(done.booking.check_in_time <= done.booking.check_out_time);

        let stored = get_booking(&db, id).unwrap();
        assert_eq!(stored, done);
    }

    #[test]
    fn test_rejected_transitions_leave_booking_unchanged() {
        let (db, user, space) = setup();
        let id = book(&db, &user, &space).booking.id;

        assert!(matches!(check_out(&db, id), Err(Error::InvalidTransition(_))));

        let checked_in = check_in(&db, id).unwrap();
        assert!(matches!(check_in(&db, id), Err(Error::InvalidTransition(_))));
        assert!(matches!(cancel_booking(&db, id), Err(Error::InvalidTransition(_))));
        assert_eq!(get_booking(&db, id).unwrap(), checked_in);
    }

    #[test]
    fn test_cancel_is_terminal() {
        let (db, user, space) = setup();
        let id = book(&db, &user, &space).booking.id;

        let cancelled = cancel_booking(&db, id).unwrap();
        assert_eq!(cancelled.booking.status, BookingStatus::Cancelled);
        assert!(check_in(&db, id).is_err());
        assert!(cancel_booking(&db, id).is_err());
    }

    #[test]
    fn test_transition_on_missing_booking_not_found() {
        let (db, _, _) = setup();
        assert!(matches!(check_in(&db, Uuid::new_v4()), Err(Error::NotFound(_))));
        assert!(matches!(cancel_booking(&db, Uuid::new_v4()), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_noise_reports_listed_per_space() {
        let (db, user, space) = setup();
        let report = create_noise_report(
            &db,
            &CreateNoiseReportRequest::new(user.id, space.id, "loud group"),
        )
        .unwrap();
        assert_eq!(report.space_name, space.name);

        assert_eq!(list_noise_reports(&db).unwrap().len(), 1);
        assert_eq!(list_noise_reports_for_space(&db, space.id).unwrap(), vec![report]);

        let other = db.list_spaces().unwrap().remove(0);
        assert!(list_noise_reports_for_space(&db, other.id).unwrap().is_empty());
    }

    #[test]
    fn test_noise_report_stamped_at_submission() {
        let (db, user, space) = setup();

        let before = models::now();
        let report = create_noise_report(
            &db,
            &CreateNoiseReportRequest::new(user.id, space.id, "phone ringing"),
        )
        .unwrap();
        let after = models::now();

        let stamped = report.report.timestamp;
        assert!(before <= stamped && stamped <= after);
        assert_eq!(list_noise_reports(&db).unwrap()[0].report.timestamp, stamped);
    }

    #[test]
    fn test_admin_overview() {
        let (db, user, space) = setup();
        let id = book(&db, &user, &space).booking.id;
        check_in(&db, id).unwrap();
        book(&db, &user, &space);

        let quiet = StudySpace::new("Carrel 7", "Basement", 1, SpaceType::Silent);
        db.create_space(&quiet).unwrap();

        let date = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        let overview = admin_overview(&db, date).unwrap();

        assert_eq!(overview.total_spaces, 6);
        assert_eq!(overview.total_bookings, 2);
        assert_eq!(overview.check_ins, 1);

        let load = overview
            .spaces
            .iter()
            .find(|s| s.space.id == space.id)
            .unwrap();
        assert_eq!(load.active_bookings, 2);
        assert_eq!(load.available, space.capacity - 2);
    }
}
