use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};

use crate::errors::ClientError;

#[cfg(test)]
pub(crate) mod mock;
mod openai;

pub use self::openai::OpenAiAnalyzer;

/// What the analysis service made of a mood entry.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodAnalysis {
    /// A short reflective comment on the entry.
    pub reflection: String,

    /// Refined energy, from 0 to 1.
    pub energy: f64,

    /// Refined valence, from 0 to 1.
    pub valence: f64,

    /// Genres that suit the mood, used to seed recommendations.
    #[serde(default)]
    pub suggested_genres: Vec<String>,
}

/// A shortened recent entry handed to the affirmation prompt.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AffirmationNote {
    pub excerpt: String,
    pub emoji: String,
    pub quick_mood: String,
    pub energy: i16,
    pub valence: i16,
}

/// A text-generation service that comments on mood entries.
pub trait Analyzer {
    /// Analyzes an entry's text along with its self-reported energy and
    /// valence (both 1–10).
    fn analyze(
        &self,
        text: String,
        energy: i16,
        valence: i16,
    ) -> BoxFuture<Result<MoodAnalysis, ClientError>>;

    /// Writes a single affirmation inspired by the given notes.
    fn affirm(&self, notes: Vec<AffirmationNote>) -> BoxFuture<Result<String, ClientError>>;
}
