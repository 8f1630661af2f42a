use serde::Serialize;
use time::OffsetDateTime;

use crate::id::{MoodEntryId, RecommendationId};

/// A track suggested for a mood entry.
#[derive(Clone, Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub id: RecommendationId,

    /// The entry this track was suggested for.
    pub mood_entry_id: MoodEntryId,

    /// The catalog's ID for the track.
    pub spotify_track_id: String,

    pub track_name: String,

    /// The track's artists, comma-separated.
    pub artist_name: String,

    pub album_art_url: Option<String>,

    pub preview_url: Option<String>,

    /// Energy reported by the catalog, from 0 to 1.
    pub energy: f64,

    /// Valence reported by the catalog, from 0 to 1.
    pub valence: f64,

    #[serde(with = "time::serde::timestamp")]
    pub created_at: OffsetDateTime,
}

/// A recommendation that hasn't been stored yet.
#[derive(Clone, Debug, PartialEq)]
pub struct NewRecommendation {
    pub spotify_track_id: String,
    pub track_name: String,
    pub artist_name: String,
    pub album_art_url: Option<String>,
    pub preview_url: Option<String>,
    pub energy: f64,
    pub valence: f64,
}
