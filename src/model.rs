//! Project and task documents.
//!
//! Field names follow snake_case on disk. Aliases accept the camelCase
//! names used by documents exported from the hosted backend, so an export
//! can be dropped into a store without conversion.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::date::{deserialize_lenient, deserialize_lenient_instant, DateValue};
use crate::error::{Error, Result};

/// Urgency tag on projects and tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    Urgent,
}

/// Rank used when a document carries no recognizable priority.
pub const UNKNOWN_PRIORITY_RANK: usize = 3;

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Urgent, Priority::Medium, Priority::Low];

    /// Case-insensitive parse; `None` for anything unrecognized.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        Priority::ALL
            .into_iter()
            .find(|priority| priority.as_str().eq_ignore_ascii_case(trimmed))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::Urgent => "urgent",
        }
    }

    /// Sort rank: urgent=0, medium=1, low=2, unknown=3.
    pub fn rank(priority: Option<Priority>) -> usize {
        match priority {
            Some(Priority::Urgent) => 0,
            Some(Priority::Medium) => 1,
            Some(Priority::Low) => 2,
            None => UNKNOWN_PRIORITY_RANK,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self> {
        Priority::parse(raw).ok_or_else(|| {
            Error::InvalidArgument(format!(
                "invalid priority '{raw}' (expected low|medium|urgent)"
            ))
        })
    }
}

fn deserialize_lenient_priority<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<Priority>, D::Error> {
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw
        .as_ref()
        .and_then(serde_json::Value::as_str)
        .and_then(Priority::parse))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub deadline: Option<DateValue>,
    #[serde(
        default,
        deserialize_with = "deserialize_lenient_priority",
        skip_serializing_if = "Option::is_none"
    )]
    pub priority: Option<Priority>,
    #[serde(default, alias = "imageUrl", skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(alias = "ownerId", alias = "userId")]
    pub owner_id: String,
    #[serde(
        default,
        alias = "createdAt",
        deserialize_with = "deserialize_lenient_instant",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        alias = "updatedAt",
        deserialize_with = "deserialize_lenient_instant",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub deadline: Option<DateValue>,
    #[serde(
        default,
        deserialize_with = "deserialize_lenient_priority",
        skip_serializing_if = "Option::is_none"
    )]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub completed: bool,
    #[serde(alias = "projectId")]
    pub project_id: String,
    #[serde(alias = "ownerId", alias = "userId")]
    pub owner_id: String,
    #[serde(
        default,
        alias = "createdAt",
        deserialize_with = "deserialize_lenient_instant",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        alias = "updatedAt",
        deserialize_with = "deserialize_lenient_instant",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<DateTime<Utc>>,
}
