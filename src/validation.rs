//! Checks request bodies against the shapes the service accepts.
//!
//! Validators never stop at the first problem: every violated
//! constraint is reported, keyed by the JSON field it concerns.

use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::id::MoodEntryId;
use crate::mood::NewMoodEntry;
use crate::normalization::normalize_text;
use crate::playlist::NewPlaylist;

/// The lowest accepted energy or valence.
pub const AFFECT_MIN: i64 = 1;

/// The highest accepted energy or valence.
pub const AFFECT_MAX: i64 = 10;

/// A rule a field failed to satisfy.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "constraint", rename_all = "lowercase")]
pub enum Constraint {
    Required,
    Empty,
    Type { expected: &'static str },
    Range { min: i64, max: i64 },
    Id,
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::Required => write!(f, "is required"),
            Constraint::Empty => write!(f, "must not be empty"),
            Constraint::Type { expected } => write!(f, "must be of type {}", expected),
            Constraint::Range { min, max } => write!(f, "must be between {} and {}", min, max),
            Constraint::Id => write!(f, "must be a valid ID"),
        }
    }
}

/// A single failed constraint.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FieldError {
    pub field: String,

    #[serde(flatten)]
    pub constraint: Constraint,
}

impl FieldError {
    fn new(field: impl Into<String>, constraint: Constraint) -> Self {
        Self {
            field: field.into(),
            constraint,
        }
    }
}

/// Every constraint a request body failed.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn fields(&self) -> &[FieldError] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn push(&mut self, field: impl Into<String>, constraint: Constraint) {
        self.0.push(FieldError::new(field, constraint));
    }

    fn into_result<T>(self, value: impl FnOnce() -> T) -> Result<T, ValidationErrors> {
        if self.is_empty() {
            Ok(value())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts = self
            .0
            .iter()
            .map(|e| format!("{} {}", e.field, e.constraint))
            .collect::<Vec<_>>();

        write!(f, "{}", parts.join("; "))
    }
}

/// Validates the body of a mood entry submission.
pub fn validate_mood_entry(body: &Value) -> Result<NewMoodEntry, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    let object = match as_object(body, &mut errors) {
        Some(object) => object,
        None => return Err(errors),
    };

    let text = required_text(object, "text", &mut errors);
    let emoji = required_text(object, "emoji", &mut errors);
    let quick_mood = required_text(object, "quickMood", &mut errors);
    let energy = required_affect(object, "energy", &mut errors);
    let valence = required_affect(object, "valence", &mut errors);

    errors.into_result(|| NewMoodEntry {
        text: text.unwrap_or_default(),
        emoji: emoji.unwrap_or_default(),
        quick_mood: quick_mood.unwrap_or_default(),
        energy: energy.unwrap_or_default(),
        valence: valence.unwrap_or_default(),
    })
}

/// Validates the body of a playlist submission.
pub fn validate_playlist(body: &Value) -> Result<NewPlaylist, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    let object = match as_object(body, &mut errors) {
        Some(object) => object,
        None => return Err(errors),
    };

    let name = required_text(object, "name", &mut errors);
    let description = optional_text(object, "description", &mut errors);
    let mood_entry_ids = required_ids(object, "moodEntryIds", &mut errors);

    errors.into_result(|| NewPlaylist {
        name: name.unwrap_or_default(),
        description,
        mood_entry_ids: mood_entry_ids.unwrap_or_default(),
    })
}

fn as_object<'a>(body: &'a Value, errors: &mut ValidationErrors) -> Option<&'a Map<String, Value>> {
    let object = body.as_object();

    if object.is_none() {
        errors.push("body", Constraint::Type { expected: "object" });
    }

    object
}

fn required_text(
    object: &Map<String, Value>,
    field: &str,
    errors: &mut ValidationErrors,
) -> Option<String> {
    match object.get(field) {
        None | Some(Value::Null) => {
            errors.push(field, Constraint::Required);
            None
        }
        Some(Value::String(s)) => {
            let normalized = normalize_text(s);

            if normalized.is_empty() {
                errors.push(field, Constraint::Empty);
                None
            } else {
                Some(normalized)
            }
        }
        Some(_) => {
            errors.push(field, Constraint::Type { expected: "string" });
            None
        }
    }
}

fn optional_text(
    object: &Map<String, Value>,
    field: &str,
    errors: &mut ValidationErrors,
) -> Option<String> {
    match object.get(field) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(normalize_text(s)).filter(|s| !s.is_empty()),
        Some(_) => {
            errors.push(field, Constraint::Type { expected: "string" });
            None
        }
    }
}

fn required_affect(
    object: &Map<String, Value>,
    field: &str,
    errors: &mut ValidationErrors,
) -> Option<i16> {
    let value = match object.get(field) {
        None | Some(Value::Null) => {
            errors.push(field, Constraint::Required);
            return None;
        }
        Some(value) => value,
    };

    match value.as_i64() {
        Some(n) if (AFFECT_MIN..=AFFECT_MAX).contains(&n) => Some(n as i16),
        Some(_) => {
            errors.push(
                field,
                Constraint::Range {
                    min: AFFECT_MIN,
                    max: AFFECT_MAX,
                },
            );
            None
        }
        // whole numbers past i64 are still numbers, just far out of range
        None if is_whole_number(value) => {
            errors.push(
                field,
                Constraint::Range {
                    min: AFFECT_MIN,
                    max: AFFECT_MAX,
                },
            );
            None
        }
        None => {
            errors.push(field, Constraint::Type { expected: "integer" });
            None
        }
    }
}

fn is_whole_number(value: &Value) -> bool {
    value.as_u64().is_some() || value.as_f64().map_or(false, |f| f.is_finite() && f.fract() == 0.0)
}

fn required_ids(
    object: &Map<String, Value>,
    field: &str,
    errors: &mut ValidationErrors,
) -> Option<Vec<MoodEntryId>> {
    let values = match object.get(field) {
        None | Some(Value::Null) => {
            errors.push(field, Constraint::Required);
            return None;
        }
        Some(Value::Array(values)) => values,
        Some(_) => {
            errors.push(field, Constraint::Type { expected: "array" });
            return None;
        }
    };

    let mut ids = Vec::with_capacity(values.len());

    for (i, value) in values.iter().enumerate() {
        let element = format!("{}[{}]", field, i);

        match value.as_str() {
            Some(raw) => match raw.parse::<MoodEntryId>() {
                Ok(id) => ids.push(id),
                Err(_) => errors.push(element, Constraint::Id),
            },
            None => errors.push(element, Constraint::Type { expected: "string" }),
        }
    }

    Some(ids)
}
