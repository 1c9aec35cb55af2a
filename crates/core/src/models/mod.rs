//! Data models for Study Space

mod booking;
mod noise_report;
mod space;
mod user;

pub use booking::*;
pub use noise_report::*;
pub use space::*;
pub use user::*;

use chrono::{DateTime, SubsecRound, Utc};

/// Current time at the precision the store keeps (microseconds)
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}
