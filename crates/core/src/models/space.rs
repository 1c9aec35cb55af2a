//! Study space model

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How a space may be used
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpaceType {
    /// No talking
    Silent,
    /// Group work allowed
    Discussion,
    Open,
}

impl SpaceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpaceType::Silent => "silent",
            SpaceType::Discussion => "discussion",
            SpaceType::Open => "open",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "silent" => Some(SpaceType::Silent),
            "discussion" => Some(SpaceType::Discussion),
            "open" => Some(SpaceType::Open),
            _ => None,
        }
    }
}

/// A bookable physical location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudySpace {
    pub id: Uuid,
    pub name: String,
    pub location: String,
    pub capacity: u32,
    #[serde(rename = "type")]
    pub space_type: SpaceType,
}

impl StudySpace {
    pub fn new(name: &str, location: &str, capacity: u32, space_type: SpaceType) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            location: location.to_string(),
            capacity,
            space_type,
        }
    }
}
