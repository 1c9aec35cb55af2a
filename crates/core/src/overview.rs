//! Occupancy overview for the admin dashboard
//!
//! Derived on read from the full booking list; nothing here is stored.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{BookingDetails, BookingStatus, StudySpace};

/// One space's load on a given date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpaceOccupancy {
    #[serde(flatten)]
    pub space: StudySpace,
    /// Bookings on the date that are still active (checked in or not)
    pub active_bookings: u32,
    pub available: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Overview {
    pub date: NaiveDate,
    pub total_spaces: usize,
    pub total_bookings: usize,
    pub total_noise_reports: usize,
    pub check_ins: usize,
    pub spaces: Vec<SpaceOccupancy>,
}

/// Summarize occupancy for `date`
pub fn summarize(
    date: NaiveDate,
    spaces: Vec<StudySpace>,
    bookings: &[BookingDetails],
    total_noise_reports: usize,
) -> Overview {
    let on_date = || bookings.iter().map(|d| &d.booking).filter(move |b| b.date == date);

    let check_ins = on_date().filter(|b| b.check_in_time.is_some()).count();

    let total_spaces = spaces.len();
    let spaces = spaces
        .into_iter()
        .map(|space| {
            let active = on_date()
                .filter(|b| b.space_id == space.id && b.status == BookingStatus::Active)
                .count() as u32;
            SpaceOccupancy {
                available: space.capacity.saturating_sub(active),
                active_bookings: active,
                space,
            }
        })
        .collect();

    Overview {
        date,
        total_spaces,
        total_bookings: bookings.len(),
        total_noise_reports,
        check_ins,
        spaces,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{now, Booking, SpaceType};
    use chrono::NaiveTime;
    use uuid::Uuid;

    fn details(space: &StudySpace, date: NaiveDate, status: BookingStatus, checked_in: bool) -> BookingDetails {
        let mut booking = Booking::new(
            Uuid::new_v4(),
            space.id,
            date,
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
        );
        booking.status = status;
        if checked_in {
            booking.check_in_time = Some(now());
        }
        BookingDetails {
            booking,
            user_email: "alice@x.edu".to_string(),
            space_name: space.name.clone(),
        }
    }

    #[test]
    fn test_counts_only_active_bookings_on_date() {
        let today = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        let tomorrow = today.succ_opt().unwrap();
        let room = StudySpace::new("Group Study Room 1", "Academic Block, Room 101", 2, SpaceType::Discussion);
        let hall = StudySpace::new("Open Study Hall", "Student Center", 50, SpaceType::Open);

        let bookings = vec![
            details(&room, today, BookingStatus::Active, false),
            details(&room, today, BookingStatus::Active, true),
            details(&room, today, BookingStatus::Active, false),
            details(&room, today, BookingStatus::Cancelled, false),
            details(&room, tomorrow, BookingStatus::Active, true),
            details(&hall, today, BookingStatus::Active, false),
        ];

        let overview = summarize(today, vec![room.clone(), hall.clone()], &bookings, 4);

        assert_eq!(overview.total_spaces, 2);
        assert_eq!(overview.total_bookings, 6);
        assert_eq!(overview.total_noise_reports, 4);
        assert_eq!(overview.check_ins, 1);

        let room_load = &overview.spaces[0];
        assert_eq!(room_load.space.id, room.id);
        assert_eq!(room_load.active_bookings, 3);
        // Overbooked rooms report zero, never negative
        assert_eq!(room_load.available, 0);

        assert_eq!(overview.spaces[1].active_bookings, 1);
        assert_eq!(overview.spaces[1].available, 49);
    }
}
