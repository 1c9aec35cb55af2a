//! Booking lifecycle transitions
//!
//! `active` → checked-in → `completed`, with `cancelled` reachable only
//! from an active booking that was never checked in. Each transition is a
//! pure function over a [`Booking`]; persisting the result is the store's job.

use chrono::{DateTime, Utc};

use crate::error::{Error, Result};
use crate::invariants::assert_booking_invariants;
use crate::models::{Booking, BookingPhase, BookingStatus};

/// Lifecycle operations a booking can undergo
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    CheckIn,
    CheckOut,
    Cancel,
}

impl Transition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Transition::CheckIn => "check-in",
            Transition::CheckOut => "check-out",
            Transition::Cancel => "cancel",
        }
    }
}

/// Whether `transition` is allowed from `phase`
pub fn is_allowed(phase: BookingPhase, transition: Transition) -> bool {
    matches!(
        (phase, transition),
        (BookingPhase::Active, Transition::CheckIn)
            | (BookingPhase::Active, Transition::Cancel)
            | (BookingPhase::CheckedIn, Transition::CheckOut)
    )
}

/// Apply `transition` to `booking` at time `now`
pub fn apply(booking: &mut Booking, transition: Transition, now: DateTime<Utc>) -> Result<()> {
    let phase = booking.phase();
    if !is_allowed(phase, transition) {
        return Err(Error::InvalidTransition(rejection_reason(
            booking, phase, transition,
        )));
    }

    match transition {
        Transition::CheckIn => {
            booking.check_in_time = Some(now);
        }
        Transition::CheckOut => {
            // Clock skew must never place check-out before check-in
            let checked_in = booking.check_in_time.unwrap_or(now);
            booking.check_out_time = Some(now.max(checked_in));
            booking.status = BookingStatus::Completed;
        }
        Transition::Cancel => {
            booking.status = BookingStatus::Cancelled;
        }
    }

    assert_booking_invariants(booking);
    Ok(())
}

pub fn check_in(booking: &mut Booking, now: DateTime<Utc>) -> Result<()> {
    apply(booking, Transition::CheckIn, now)
}

pub fn check_out(booking: &mut Booking, now: DateTime<Utc>) -> Result<()> {
    apply(booking, Transition::CheckOut, now)
}

pub fn cancel(booking: &mut Booking, now: DateTime<Utc>) -> Result<()> {
    apply(booking, Transition::Cancel, now)
}

fn rejection_reason(booking: &Booking, phase: BookingPhase, transition: Transition) -> String {
    let state = match phase {
        BookingPhase::Active => "has not been checked in",
        BookingPhase::CheckedIn => "is already checked in",
        BookingPhase::Completed => "is already completed",
        BookingPhase::Cancelled => "has been cancelled",
    };
    format!(
        "cannot {} booking {}: it {}",
        transition.as_str(),
        booking.id,
        state
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate, NaiveTime};
    use uuid::Uuid;

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
    fn test_check_in_then_check_out() {
        let mut booking = make_booking();
        let t0 = Utc::now();

        check_in(&mut booking, t0).unwrap();
        assert_eq!(booking.phase(), BookingPhase::CheckedIn);
        assert_eq!(booking.status, BookingStatus::Active);

        check_out(&mut booking, t0 + Duration::minutes(45)).unwrap();
        assert_eq!(booking.status, BookingStatus::Completed);
        assert!(booking.check_in_time.unwrap() <= booking.check_out_time.unwrap());
    }

    #[test]
    fn test_double_check_in_rejected() {
        let mut booking = make_booking();
        let t0 = Utc::now();
        check_in(&mut booking, t0).unwrap();

        let err = check_in(&mut booking, t0 + Duration::minutes(5)).unwrap_err();
        assert!(matches!(err, Error::InvalidTransition(ref m) if m.contains("already checked in")));
        // First check-in time is kept
        assert_eq!(booking.check_in_time, Some(t0));
    }

    #[test]
    fn test_check_out_without_check_in_rejected() {
        let mut booking = make_booking();
        let err = check_out(&mut booking, Utc::now()).unwrap_err();
        assert!(matches!(err, Error::InvalidTransition(_)));
        assert_eq!(booking.status, BookingStatus::Active);
        assert!(booking.check_out_time.is_none());
    }

    #[test]
    fn test_check_out_never_precedes_check_in() {
        let mut booking = make_booking();
        let t0 = Utc::now();
        check_in(&mut booking, t0).unwrap();
        check_out(&mut booking, t0 - Duration::seconds(3)).unwrap();
        assert_eq!(booking.check_out_time, Some(t0));
    }

    #[test]
    fn test_cancel_only_before_check_in() {
        let mut fresh = make_booking();
        cancel(&mut fresh, Utc::now()).unwrap();
        assert_eq!(fresh.phase(), BookingPhase::Cancelled);
        assert!(check_in(&mut fresh, Utc::now()).is_err());

        let mut occupied = make_booking();
        check_in(&mut occupied, Utc::now()).unwrap();
        assert!(cancel(&mut occupied, Utc::now()).is_err());
    }

    #[test]
    fn test_completed_is_terminal() {
        let mut booking = make_booking();
        let now = Utc::now();
        check_in(&mut booking, now).unwrap();
        check_out(&mut booking, now).unwrap();

        for transition in [Transition::CheckIn, Transition::CheckOut, Transition::Cancel] {
            assert!(!is_allowed(booking.phase(), transition));
            assert!(apply(&mut booking, transition, now).is_err());
        }
    }
}
