//! Noise report model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A free-text complaint about a study space, immutable once filed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoiseReport {
    pub id: Uuid,
    pub user_id: Uuid,
    pub space_id: Uuid,
    pub description: String,
    /// Assigned by the server when the report is filed
    pub timestamp: DateTime<Utc>,
}

impl NoiseReport {
    pub fn new(user_id: Uuid, space_id: Uuid, description: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            space_id,
            description,
            timestamp: super::now(),
        }
    }
}

/// Report joined with the reporter's email and the space's name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoiseReportDetails {
    #[serde(flatten)]
    pub report: NoiseReport,
    pub user_email: String,
    pub space_name: String,
}
