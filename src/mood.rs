use serde::Serialize;
use time::OffsetDateTime;

use crate::id::{MoodEntryId, ReflectionId};

/// A single mood entry in the database.
#[derive(Clone, Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MoodEntry {
    /// The ID of the entry.
    pub id: MoodEntryId,

    /// The free-text note.
    pub text: String,

    /// The emoji chosen alongside the note.
    pub emoji: String,

    /// The quick-mood label picked by the user.
    pub quick_mood: String,

    /// Arousal, from 1 to 10.
    pub energy: i16,

    /// Pleasantness, from 1 to 10.
    pub valence: i16,

    /// The date and time it was created.
    #[serde(with = "time::serde::timestamp")]
    pub created_at: OffsetDateTime,
}

/// A validated mood entry that hasn't been stored yet.
#[derive(Clone, Debug, PartialEq)]
pub struct NewMoodEntry {
    pub text: String,
    pub emoji: String,
    pub quick_mood: String,
    pub energy: i16,
    pub valence: i16,
}

/// The generated commentary on a mood entry.
#[derive(Clone, Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AiReflection {
    pub id: ReflectionId,
    pub mood_entry_id: MoodEntryId,
    pub reflection: String,

    #[serde(with = "time::serde::timestamp")]
    pub created_at: OffsetDateTime,
}

/// A mood entry along with its reflection, if one was generated.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodEntryDetail {
    #[serde(flatten)]
    pub entry: MoodEntry,

    pub ai_reflection: Option<AiReflection>,
}

/// Converts a 1–10 affect score into the 0–1 scale used by the music
/// catalog.
pub fn normalize_affect(score: i16) -> f64 {
    f64::from(score) / 10.0
}
