//! Booking model

use chrono::{DateTime, NaiveDate, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Persisted booking status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Active,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Active => "active",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "active" => Some(BookingStatus::Active),
            "completed" => Some(BookingStatus::Completed),
            "cancelled" => Some(BookingStatus::Cancelled),
            _ => None,
        }
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle position, derived from status and timestamps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingPhase {
    /// Reserved, not yet occupied
    Active,
    /// Active with a check-in timestamp
    CheckedIn,
    Completed,
    Cancelled,
}

/// A reservation of a study space for a date and time range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub user_id: Uuid,
    pub space_id: Uuid,
    pub date: NaiveDate,
    #[serde(with = "clock")]
    pub start_time: NaiveTime,
    #[serde(with = "clock")]
    pub end_time: NaiveTime,
    pub status: BookingStatus,
    pub check_in_time: Option<DateTime<Utc>>,
    pub check_out_time: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    pub fn new(
        user_id: Uuid,
        space_id: Uuid,
        date: NaiveDate,
        start_time: NaiveTime,
        end_time: NaiveTime,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            space_id,
            date,
            start_time,
            end_time,
            status: BookingStatus::Active,
            check_in_time: None,
            check_out_time: None,
            created_at: super::now(),
        }
    }

    pub fn phase(&self) -> BookingPhase {
        match self.status {
            BookingStatus::Completed => BookingPhase::Completed,
            BookingStatus::Cancelled => BookingPhase::Cancelled,
            BookingStatus::Active if self.check_in_time.is_some() => BookingPhase::CheckedIn,
            BookingStatus::Active => BookingPhase::Active,
        }
    }

    pub fn is_checked_in(&self) -> bool {
        self.phase() == BookingPhase::CheckedIn
    }
}

/// Booking joined with the owner's email and the space's name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingDetails {
    #[serde(flatten)]
    pub booking: Booking,
    pub user_email: String,
    pub space_name: String,
}

/// Parse a wall-clock time given as `HH:MM` or `HH:MM:SS`; seconds are dropped
pub fn parse_clock(s: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .ok()
        .and_then(|t| t.with_second(0))
}

/// Format a wall-clock time as `HH:MM`
pub fn format_clock(t: &NaiveTime) -> String {
    t.format("%H:%M").to_string()
}

/// Serde adapter storing times as `HH:MM`
pub mod clock {
    use chrono::NaiveTime;
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(t: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&super::format_clock(t))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(d)?;
        super::parse_clock(&raw)
            .ok_or_else(|| D::Error::custom(format!("invalid time of day: {raw}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Booking {
        Booking::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_new_booking_is_active() {
        let booking = sample();
        assert_eq!(booking.status, BookingStatus::Active);
        assert_eq!(booking.phase(), BookingPhase::Active);
        assert!(booking.check_in_time.is_none());
    }

    #[test]
    fn test_phase_derived_from_check_in() {
        let mut booking = sample();
        booking.check_in_time = Some(Utc::now());
        assert!(booking.is_checked_in());
    }

    #[test]
    fn test_times_serialize_as_hh_mm() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["start_time"], "09:00");
        assert_eq!(json["end_time"], "10:00");
        assert_eq!(json["date"], "2024-01-10");
        assert_eq!(json["status"], "active");
    }

    #[test]
    fn test_details_flatten_booking_fields() {
        let details = BookingDetails {
            booking: sample(),
            user_email: "alice@x.edu".to_string(),
            space_name: "Library Zone A".to_string(),
        };
        let json = serde_json::to_value(&details).unwrap();
        assert_eq!(json["space_name"], "Library Zone A");
        assert_eq!(json["start_time"], "09:00");

        let back: BookingDetails = serde_json::from_value(json).unwrap();
        assert_eq!(back, details);
    }

    #[test]
    fn test_parse_clock_drops_seconds() {
        assert_eq!(parse_clock("09:30"), NaiveTime::from_hms_opt(9, 30, 0));
        assert_eq!(parse_clock("09:30:15"), NaiveTime::from_hms_opt(9, 30, 0));
        assert_eq!(parse_clock("9am"), None);
    }
}
