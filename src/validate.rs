//! Form validation for project and task input.
//!
//! Input typed by the user is held to a stricter standard than stored
//! documents: a deadline that does not resolve to a calendar day is rejected
//! here, while the same value arriving from the store simply drops out of
//! the calendar.

use crate::date::{parse_day, DateValue};
use crate::error::{Error, Result};
use crate::model::Priority;

pub const MAX_TITLE_LEN: usize = 120;
pub const MAX_DESCRIPTION_LEN: usize = 2000;

/// Trimmed, non-empty, bounded title.
pub fn title(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(Error::Validation {
            field: "title",
            message: "cannot be empty".to_string(),
        });
    }
    if trimmed.chars().count() > MAX_TITLE_LEN {
        return Err(Error::Validation {
            field: "title",
            message: format!("must be at most {MAX_TITLE_LEN} characters"),
        });
    }
    Ok(trimmed.to_string())
}

/// Trimmed description; blank becomes `None`.
pub fn description(raw: Option<String>) -> Result<Option<String>> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if trimmed.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(Error::Validation {
            field: "description",
            message: format!("must be at most {MAX_DESCRIPTION_LEN} characters"),
        });
    }
    Ok(Some(trimmed.to_string()))
}

/// Parse a typed deadline. Date-only input is kept as a local calendar day.
pub fn deadline(raw: &str) -> Result<DateValue> {
    let trimmed = raw.trim();
    if let Some(day) = parse_day(trimmed) {
        return Ok(DateValue::from_day(day));
    }
    match DateValue::from_json(&serde_json::Value::String(trimmed.to_string())) {
        Some(value) if value.calendar_day().is_some() => Ok(value),
        _ => Err(Error::Validation {
            field: "deadline",
            message: format!("'{trimmed}' is not a date (expected YYYY-MM-DD or RFC 3339)"),
        }),
    }
}

fn resolvable(value: Option<DateValue>) -> Result<Option<DateValue>> {
    match value {
        Some(value) if value.calendar_day().is_none() => Err(Error::Validation {
            field: "deadline",
            message: format!("'{value}' is not a date"),
        }),
        other => Ok(other),
    }
}

/// Trimmed image reference; blank becomes `None`.
pub fn image(raw: Option<String>) -> Option<String> {
    raw.map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// New project form.
#[derive(Debug, Clone)]
pub struct ProjectDraft {
    pub title: String,
    pub description: Option<String>,
    pub deadline: Option<DateValue>,
    pub priority: Priority,
    pub image: Option<String>,
}

impl ProjectDraft {
    pub fn validate(self) -> Result<Self> {
        Ok(Self {
            title: title(&self.title)?,
            description: description(self.description)?,
            deadline: resolvable(self.deadline)?,
            priority: self.priority,
            image: image(self.image),
        })
    }
}

/// Project edit form. `Some(None)` clears an optional field.
#[derive(Debug, Clone, Default)]
pub struct ProjectPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub deadline: Option<Option<DateValue>>,
    pub priority: Option<Priority>,
    pub image: Option<Option<String>>,
}

impl ProjectPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.deadline.is_none()
            && self.priority.is_none()
            && self.image.is_none()
    }

    pub fn validate(self) -> Result<Self> {
        Ok(Self {
            title: self.title.as_deref().map(title).transpose()?,
            description: self.description.map(description).transpose()?,
            deadline: self.deadline.map(resolvable).transpose()?,
            priority: self.priority,
            image: self.image.map(image),
        })
    }
}

/// New task form.
#[derive(Debug, Clone)]
pub struct TaskDraft {
    pub project_id: String,
    pub title: String,
    pub description: Option<String>,
    pub deadline: Option<DateValue>,
    pub priority: Priority,
}

impl TaskDraft {
    pub fn validate(self) -> Result<Self> {
        let project_id = self.project_id.trim().to_string();
        if project_id.is_empty() {
            return Err(Error::Validation {
                field: "project",
                message: "a task must belong to a project".to_string(),
            });
        }
        Ok(Self {
            project_id,
            title: title(&self.title)?,
            description: description(self.description)?,
            deadline: resolvable(self.deadline)?,
            priority: self.priority,
        })
    }
}

/// Task edit form. `Some(None)` clears an optional field.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub deadline: Option<Option<DateValue>>,
    pub priority: Option<Priority>,
    pub project_id: Option<String>,
    pub completed: Option<bool>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.deadline.is_none()
            && self.priority.is_none()
            && self.project_id.is_none()
            && self.completed.is_none()
    }

    pub fn validate(self) -> Result<Self> {
        Ok(Self {
            title: self.title.as_deref().map(title).transpose()?,
            description: self.description.map(description).transpose()?,
            deadline: self.deadline.map(resolvable).transpose()?,
            priority: self.priority,
            project_id: self.project_id.map(|id| id.trim().to_string()),
            completed: self.completed,
        })
    }
}
