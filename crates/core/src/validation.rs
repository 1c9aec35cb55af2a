//! Request payloads and their validation
//!
//! Every field arrives optional so that a missing field and an empty one
//! are rejected the same way, before any store access.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::{normalize_email, parse_clock, UserRole};

pub const LOGIN_FIELDS_REQUIRED: &str = "Email and role are required";
pub const BOOKING_FIELDS_REQUIRED: &str = "All booking fields are required";
pub const REPORT_FIELDS_REQUIRED: &str = "All noise report fields are required";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Login {
    pub email: String,
    pub role: UserRole,
}

impl LoginRequest {
    pub fn new(email: &str, role: UserRole) -> Self {
        Self {
            email: Some(email.to_string()),
            role: Some(role.as_str().to_string()),
        }
    }

    pub fn validate(&self) -> Result<Login> {
        let (Some(email), Some(role)) = (present(&self.email), present(&self.role)) else {
            return Err(Error::Validation(LOGIN_FIELDS_REQUIRED.to_string()));
        };

        if !email.contains('@') {
            return Err(Error::Validation(format!("invalid email address: {email}")));
        }

        let role = UserRole::from_str(&role.to_lowercase())
            .ok_or_else(|| Error::Validation(format!("role must be student or admin, got {role}")))?;

        Ok(Login {
            email: normalize_email(email),
            role,
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateBookingRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub study_space_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booking_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
}

/// A validated booking request
#[derive(Debug, Clone, PartialEq)]
pub struct NewBooking {
    pub user_id: Uuid,
    pub space_id: Uuid,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

impl CreateBookingRequest {
    pub fn new(user_id: Uuid, space_id: Uuid, date: &str, start_time: &str, end_time: &str) -> Self {
        Self {
            user_id: Some(user_id.to_string()),
            study_space_id: Some(space_id.to_string()),
            booking_date: Some(date.to_string()),
            start_time: Some(start_time.to_string()),
            end_time: Some(end_time.to_string()),
        }
    }

    pub fn validate(&self) -> Result<NewBooking> {
        let (Some(user_id), Some(space_id), Some(date), Some(start), Some(end)) = (
            present(&self.user_id),
            present(&self.study_space_id),
            present(&self.booking_date),
            present(&self.start_time),
            present(&self.end_time),
        ) else {
            return Err(Error::Validation(BOOKING_FIELDS_REQUIRED.to_string()));
        };

        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|_| Error::Validation(format!("booking_date must be YYYY-MM-DD, got {date}")))?;
        let start_time = parse_time("start_time", start)?;
        let end_time = parse_time("end_time", end)?;

        if end_time <= start_time {
            return Err(Error::Validation(
                "end_time must be later than start_time".to_string(),
            ));
        }

        Ok(NewBooking {
            user_id: parse_id("user_id", user_id)?,
            space_id: parse_id("study_space_id", space_id)?,
            date,
            start_time,
            end_time,
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateNoiseReportRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub study_space_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewNoiseReport {
    pub user_id: Uuid,
    pub space_id: Uuid,
    pub description: String,
}

impl CreateNoiseReportRequest {
    pub fn new(user_id: Uuid, space_id: Uuid, description: &str) -> Self {
        Self {
            user_id: Some(user_id.to_string()),
            study_space_id: Some(space_id.to_string()),
            description: Some(description.to_string()),
        }
    }

    pub fn validate(&self) -> Result<NewNoiseReport> {
        let (Some(user_id), Some(space_id), Some(description)) = (
            present(&self.user_id),
            present(&self.study_space_id),
            present(&self.description),
        ) else {
            return Err(Error::Validation(REPORT_FIELDS_REQUIRED.to_string()));
        };

        Ok(NewNoiseReport {
            user_id: parse_id("user_id", user_id)?,
            space_id: parse_id("study_space_id", space_id)?,
            description: description.to_string(),
        })
    }
}

/// Parse an identifier supplied by a client
pub fn parse_id(field: &str, raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| Error::Validation(format!("{field} is not a valid id: {raw}")))
}

fn parse_time(field: &str, raw: &str) -> Result<NaiveTime> {
    parse_clock(raw).ok_or_else(|| Error::Validation(format!("{field} must be HH:MM, got {raw}")))
}

fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}
