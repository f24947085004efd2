//! Response shape checks, the verdict table and message formatting.
//!
//! The API body is handled as a raw [`serde_json::Value`] so that every
//! structural problem maps onto a specific [`ShapeError`] instead of a generic
//! deserialization failure.

use serde_json::Value;

use crate::error::{PollError, ShapeError};

/// Review verdict for a homework submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Reviewer accepted the work.
    Approved,
    /// Work is being reviewed.
    Reviewing,
    /// Reviewer left remarks.
    Rejected,
}

impl Verdict {
    /// Map an API status string to a verdict.
    pub fn from_status(status: &str) -> Option<Self> {
        match status {
            "approved" => Some(Self::Approved),
            "reviewing" => Some(Self::Reviewing),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    /// Sentence shown to the student.
    pub fn sentence(self) -> &'static str {
        match self {
            Self::Approved => "Работа проверена: ревьюеру всё понравилось. Ура!",
            Self::Reviewing => "Работа взята на проверку ревьюером.",
            Self::Rejected => "Работа проверена: у ревьюера есть замечания.",
        }
    }
}

/// Validate the response body and return its latest homework record.
///
/// Only element 0 of `homeworks` is returned; later elements are ignored.
/// `Ok(None)` means the list is empty.
///
/// # Errors
///
/// Returns [`ShapeError`] when the body is not an object, lacks `homeworks`,
/// or `homeworks` is not an array.
pub fn check_response(response: &Value) -> Result<Option<&Value>, ShapeError> {
    let Some(object) = response.as_object() else {
        return Err(ShapeError::ResponseNotObject {
            found: json_type(response),
        });
    };
    let homeworks = object
        .get("homeworks")
        .ok_or(ShapeError::MissingKey("homeworks"))?;
    let Some(list) = homeworks.as_array() else {
        return Err(ShapeError::HomeworksNotArray {
            found: json_type(homeworks),
        });
    };
    Ok(list.first())
}

/// Build the status-change message for one homework record.
///
/// # Errors
///
/// Returns [`PollError::BadShape`] when the record is not an object or lacks
/// `homework_name`, and [`PollError::UnknownStatus`] when `status` is absent or
/// outside the verdict table.
pub fn parse_status(homework: &Value) -> Result<String, PollError> {
    let Some(record) = homework.as_object() else {
        return Err(ShapeError::HomeworkNotObject {
            found: json_type(homework),
        }
        .into());
    };
    let name = record
        .get("homework_name")
        .ok_or(ShapeError::MissingKey("homework_name"))?;

    let status = record.get("status");
    let verdict = status
        .and_then(Value::as_str)
        .and_then(Verdict::from_status)
        .ok_or_else(|| PollError::UnknownStatus {
            status: status.map_or_else(|| "<missing>".to_owned(), display_value),
        })?;

    Ok(format!(
        "Status changed for \"{}\". {}",
        display_value(name),
        verdict.sentence()
    ))
}

/// Server-provided `current_date`, if it is an integer.
pub fn current_date(response: &Value) -> Option<i64> {
    response.get("current_date").and_then(Value::as_i64)
}

/// Strings render bare, anything else as compact JSON.
fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
