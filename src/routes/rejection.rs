use serde::Serialize;
use warp::reject;

use crate::errors::BackendError;
use crate::validation::FieldError;

#[derive(Debug)]
pub struct Rejection {
    pub(crate) context: Context,
    pub(crate) error: BackendError,
}

impl Rejection {
    pub fn new(context: Context, error: BackendError) -> Self {
        Rejection { context, error }
    }

    /// Builds the response body. Client errors explain themselves in
    /// `message`; server errors get the context's summary there and the
    /// raw error text in `error`.
    pub fn flatten(&self, server_error: bool) -> FlattenedRejection {
        let fields = match &self.error {
            BackendError::Validation(errors) => Some(errors.fields().to_vec()),
            _ => None,
        };

        if server_error {
            FlattenedRejection {
                context: self.context.clone(),
                message: self.context.summary().to_owned(),
                error: Some(self.error.to_string()),
                fields,
            }
        } else {
            FlattenedRejection {
                context: self.context.clone(),
                message: self.error.to_string(),
                error: None,
                fields,
            }
        }
    }
}

impl reject::Reject for Rejection {}

#[derive(Debug, Serialize)]
pub struct FlattenedRejection {
    #[serde(flatten)]
    pub(crate) context: Context,
    pub(crate) message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) fields: Option<Vec<FieldError>>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase", tag = "operation")]
pub enum Context {
    CreateMoodEntry { id: Option<String> },
    ListMoodEntries,
    ListRecentMoodEntries { limit: Option<String> },
    RetrieveMoodEntry { id: String },
    ListRecommendations { id: String },
    RefreshRecommendations { id: String },
    SavePlaylist,
    ListPlaylists,
    Affirmation,
    SearchTracks { query: Option<String> },
    ListGenres,
    ParseQuery,
}

impl Context {
    pub fn create_mood_entry(id: Option<String>) -> Context {
        Context::CreateMoodEntry { id }
    }

    pub fn list_mood_entries() -> Context {
        Context::ListMoodEntries
    }

    pub fn list_recent_mood_entries(limit: Option<String>) -> Context {
        Context::ListRecentMoodEntries { limit }
    }

    pub fn retrieve_mood_entry(id: String) -> Context {
        Context::RetrieveMoodEntry { id }
    }

    pub fn list_recommendations(id: String) -> Context {
        Context::ListRecommendations { id }
    }

    pub fn refresh_recommendations(id: String) -> Context {
        Context::RefreshRecommendations { id }
    }

    pub fn save_playlist() -> Context {
        Context::SavePlaylist
    }

    pub fn list_playlists() -> Context {
        Context::ListPlaylists
    }

    pub fn affirmation() -> Context {
        Context::Affirmation
    }

    pub fn search_tracks(query: Option<String>) -> Context {
        Context::SearchTracks { query }
    }

    pub fn list_genres() -> Context {
        Context::ListGenres
    }

    pub fn parse_query() -> Context {
        Context::ParseQuery
    }

    /// A generic description of the failed operation.
    pub fn summary(&self) -> &'static str {
        match self {
            Context::CreateMoodEntry { .. } => "Failed to create mood entry",
            Context::ListMoodEntries => "Failed to fetch mood entries",
            Context::ListRecentMoodEntries { .. } => "Failed to fetch recent mood entries",
            Context::RetrieveMoodEntry { .. } => "Failed to fetch mood entry",
            Context::ListRecommendations { .. } => "Failed to fetch recommendations",
            Context::RefreshRecommendations { .. } => "Failed to refresh recommendations",
            Context::SavePlaylist => "Failed to save playlist",
            Context::ListPlaylists => "Failed to fetch playlists",
            Context::Affirmation => "Failed to generate affirmation",
            Context::SearchTracks { .. } => "Failed to search tracks",
            Context::ListGenres => "Failed to fetch genres",
            Context::ParseQuery => "Failed to read query string",
        }
    }
}
