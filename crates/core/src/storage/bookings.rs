//! Booking storage operations
//!
//! Reads always join the owner's email and the space's name; neither is
//! stored on the booking row.

use rusqlite::{params, Connection, Row};
use tracing::instrument;
use uuid::Uuid;

use super::parse::{
    format_datetime, parse_date, parse_datetime, parse_datetime_opt, parse_status, parse_time,
    parse_uuid, OptionalExt,
};
use crate::error::Result;
use crate::models::{format_clock, Booking, BookingDetails};

const BOOKING_COLUMNS: &str = "b.id, b.user_id, b.space_id, b.booking_date, b.start_time, \
     b.end_time, b.status, b.check_in_time, b.check_out_time, b.created_at";

const DETAILS_FROM: &str = "FROM bookings b
     INNER JOIN users u ON u.id = b.user_id
     INNER JOIN study_spaces s ON s.id = b.space_id";

const NEWEST_FIRST: &str = "ORDER BY b.booking_date DESC, b.start_time DESC, b.created_at DESC";

pub struct BookingStore<'a> {
    conn: &'a Connection,
}

impl<'a> BookingStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Insert a new booking
    #[instrument(skip(self, booking), fields(booking_id = %booking.id, user_id = %booking.user_id))]
    pub fn create(&self, booking: &Booking) -> Result<()> {
        self.conn.execute(
            "INSERT INTO bookings (id, user_id, space_id, booking_date, start_time, end_time,
                                   status, check_in_time, check_out_time, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                booking.id.to_string(),
                booking.user_id.to_string(),
                booking.space_id.to_string(),
                booking.date.format("%Y-%m-%d").to_string(),
                format_clock(&booking.start_time),
                format_clock(&booking.end_time),
                booking.status.as_str(),
                booking.check_in_time.as_ref().map(format_datetime),
                booking.check_out_time.as_ref().map(format_datetime),
                format_datetime(&booking.created_at),
            ],
        )?;
        Ok(())
    }

    /// Get the bare booking row
    #[instrument(skip(self))]
    pub fn find_by_id(&self, id: Uuid) -> Result<Option<Booking>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings b WHERE b.id = ?1"
        ))?;

        let booking = stmt
            .query_row(params![id.to_string()], map_booking)
            .optional()?;

        Ok(booking)
    }

    /// Get a booking joined with user email and space name
    #[instrument(skip(self))]
    pub fn find_details(&self, id: Uuid) -> Result<Option<BookingDetails>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {BOOKING_COLUMNS}, u.email, s.name {DETAILS_FROM} WHERE b.id = ?1"
        ))?;

        let details = stmt
            .query_row(params![id.to_string()], map_details)
            .optional()?;

        Ok(details)
    }

    /// All bookings, newest first
    pub fn list_details(&self) -> Result<Vec<BookingDetails>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {BOOKING_COLUMNS}, u.email, s.name {DETAILS_FROM} {NEWEST_FIRST}"
        ))?;

        let bookings = stmt
            .query_map([], map_details)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(bookings)
    }

    /// One user's bookings, newest first
    #[instrument(skip(self))]
    pub fn list_details_for_user(&self, user_id: Uuid) -> Result<Vec<BookingDetails>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {BOOKING_COLUMNS}, u.email, s.name {DETAILS_FROM}
             WHERE b.user_id = ?1 {NEWEST_FIRST}"
        ))?;

        let bookings = stmt
            .query_map(params![user_id.to_string()], map_details)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(bookings)
    }

    /// Persist status and check-in/out timestamps.
    ///
    /// Only applies if the stored lifecycle fields still equal those of
    /// `prior`; returns whether a row was updated.
    #[instrument(skip(self, booking, prior), fields(booking_id = %booking.id, status = booking.status.as_str()))]
    pub fn update_lifecycle(&self, booking: &Booking, prior: &Booking) -> Result<bool> {
        debug_assert_eq!(booking.id, prior.id);

        let updated = self.conn.execute(
            "UPDATE bookings SET status = ?1, check_in_time = ?2, check_out_time = ?3
             WHERE id = ?4 AND status = ?5 AND check_in_time IS ?6 AND check_out_time IS ?7",
            params![
                booking.status.as_str(),
                booking.check_in_time.as_ref().map(format_datetime),
                booking.check_out_time.as_ref().map(format_datetime),
                booking.id.to_string(),
                prior.status.as_str(),
                prior.check_in_time.as_ref().map(format_datetime),
                prior.check_out_time.as_ref().map(format_datetime),
            ],
        )?;
        Ok(updated == 1)
    }
}

fn map_booking(row: &Row<'_>) -> rusqlite::Result<Booking> {
    Ok(Booking {
        id: parse_uuid(&row.get::<_, String>(0)?)?,
        user_id: parse_uuid(&row.get::<_, String>(1)?)?,
        space_id: parse_uuid(&row.get::<_, String>(2)?)?,
        date: parse_date(&row.get::<_, String>(3)?)?,
        start_time: parse_time(&row.get::<_, String>(4)?)?,
        end_time: parse_time(&row.get::<_, String>(5)?)?,
        status: parse_status(&row.get::<_, String>(6)?)?,
        check_in_time: parse_datetime_opt(row.get::<_, Option<String>>(7)?)?,
        check_out_time: parse_datetime_opt(row.get::<_, Option<String>>(8)?)?,
        created_at: parse_datetime(&row.get::<_, String>(9)?)?,
    })
}

fn map_details(row: &Row<'_>) -> rusqlite::Result<BookingDetails> {
    Ok(BookingDetails {
        booking: map_booking(row)?,
        user_email: row.get(10)?,
        space_name: row.get(11)?,
    })
}
