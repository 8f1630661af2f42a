use serde::Serialize;
use time::OffsetDateTime;

use crate::id::{MoodEntryId, PlaylistId};

/// A named, ordered collection of mood entries.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedPlaylist {
    pub id: PlaylistId,
    pub name: String,
    pub description: Option<String>,

    /// The entries in the order they were submitted.
    pub mood_entry_ids: Vec<MoodEntryId>,

    #[serde(with = "time::serde::timestamp")]
    pub created_at: OffsetDateTime,
}

/// A validated playlist that hasn't been stored yet.
#[derive(Clone, Debug, PartialEq)]
pub struct NewPlaylist {
    pub name: String,
    pub description: Option<String>,
    pub mood_entry_ids: Vec<MoodEntryId>,
}
