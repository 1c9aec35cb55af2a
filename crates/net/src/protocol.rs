//! JSON bodies shared by the server and the client
//!
//! Request payloads and entity shapes live in `studyspace-core`; this module
//! only carries the envelopes specific to HTTP.

use serde::{Deserialize, Serialize};

/// Body of every error response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

impl HealthStatus {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }
}

/// `?date=YYYY-MM-DD` on the overview endpoint; today when absent
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OverviewQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}
