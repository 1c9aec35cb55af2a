//! Study Space Core Library
//!
//! Models, booking lifecycle, validation, and SQLite storage for the
//! study space booking service.

pub mod error;
pub mod invariants;
pub mod lifecycle;
pub mod models;
pub mod overview;
pub mod seed;
pub mod service;
pub mod storage;
pub mod validation;

pub use error::{Error, Result};
pub use lifecycle::Transition;
pub use models::*;
pub use overview::{Overview, SpaceOccupancy};
pub use seed::{seed_spaces, DEFAULT_SPACES};
pub use service::LoginOutcome;
pub use storage::{
    BookingRepository, Database, NoiseReportRepository, SpaceRepository, Storage, UserRepository,
};
pub use validation::{CreateBookingRequest, CreateNoiseReportRequest, LoginRequest};
