//! Developer guardrails and invariants
//!
//! Debug assertions for detecting impossible states during development.
//! These checks are compiled out in release builds.

use uuid::Uuid;

use crate::models::{Booking, BookingStatus, StudySpace};

/// Validate that a booking's status agrees with its timestamps
pub fn assert_booking_invariants(booking: &Booking) {
    // Check-out implies a prior check-in
    debug_assert!(
        booking.check_out_time.is_none() || booking.check_in_time.is_some(),
        "Booking {} checked out without a check-in",
        booking.id
    );

    // completed iff checked out
    debug_assert_eq!(
        booking.status == BookingStatus::Completed,
        booking.check_out_time.is_some(),
        "Booking {} status {:?} disagrees with check-out time {:?}",
        booking.id,
        booking.status,
        booking.check_out_time
    );

    if let (Some(check_in), Some(check_out)) = (booking.check_in_time, booking.check_out_time) {
        debug_assert!(
            check_in <= check_out,
            "Booking {} checked out at {} before check-in at {}",
            booking.id,
            check_out,
            check_in
        );
    }

    debug_assert!(
        booking.start_time < booking.end_time,
        "Booking {} ends before it starts",
        booking.id
    );

    assert_id_valid(booking.user_id, "booking.user_id");
    assert_id_valid(booking.space_id, "booking.space_id");
}

/// Validate a study space row
pub fn assert_space_invariants(space: &StudySpace) {
    debug_assert!(space.capacity > 0, "Space {} has zero capacity", space.id);

    debug_assert!(
        !space.name.trim().is_empty(),
        "Space {} has empty name",
        space.id
    );
}

/// Validate that an ID is not nil
pub fn assert_id_valid(id: Uuid, context: &str) {
    debug_assert!(id != Uuid::nil(), "Nil id in context: {}", context);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SpaceType;
    use chrono::{NaiveDate, NaiveTime, Utc};

    fn make_booking() -> Booking {
        Booking::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_valid_booking() {
        assert_booking_invariants(&make_booking());
    }

    #[test]
    fn test_valid_space() {
        let space = StudySpace::new("Open Study Hall", "Student Center", 50, SpaceType::Open);
        assert_space_invariants(&space);
    }

    #[test]
    #[should_panic(expected = "without a check-in")]
    fn test_check_out_without_check_in_panics() {
        let mut booking = make_booking();
        booking.check_out_time = Some(Utc::now());
        booking.status = BookingStatus::Completed;
        assert_booking_invariants(&booking);
    }

    #[test]
    #[should_panic(expected = "disagrees with check-out")]
    fn test_completed_without_check_out_panics() {
        let mut booking = make_booking();
        booking.status = BookingStatus::Completed;
        assert_booking_invariants(&booking);
    }
}
