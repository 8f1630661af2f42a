use serde::Serialize;

use crate::analysis::MoodAnalysis;
use crate::mood::{AiReflection, MoodEntry};
use crate::recommendation::Recommendation;

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum SuccessResponse<'a> {
    #[serde(rename_all = "camelCase")]
    Created {
        mood_entry: MoodEntry,
        ai_reflection: AiReflection,
        recommendations: Vec<Recommendation>,
        analysis: MoodAnalysis,
    },
    Affirmation {
        affirmation: String,
    },
    Healthz {
        revision: Option<&'a str>,
        timestamp: Option<&'a str>,
        version: &'a str,
    },
}
