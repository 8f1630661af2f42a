use std::sync::RwLock;

use futures::future::{BoxFuture, FutureExt};

use super::{AffirmationNote, Analyzer, MoodAnalysis};
use crate::errors::ClientError;

/// An analyzer that answers every request with the same analysis, or
/// fails with a fixed status when `failing` is set.
pub(crate) struct MockAnalyzer {
    analysis: MoodAnalysis,
    failing: bool,
    pub(crate) analyzed: RwLock<Vec<(String, i16, i16)>>,
    pub(crate) affirmed: RwLock<Vec<Vec<AffirmationNote>>>,
}

impl MockAnalyzer {
    pub fn new(analysis: MoodAnalysis) -> Self {
        MockAnalyzer {
            analysis,
            failing: false,
            analyzed: RwLock::new(vec![]),
            affirmed: RwLock::new(vec![]),
        }
    }

    pub fn failing() -> Self {
        MockAnalyzer {
            failing: true,
            ..Self::new(MoodAnalysis {
                reflection: String::new(),
                energy: 0.0,
                valence: 0.0,
                suggested_genres: vec![],
            })
        }
    }

    fn outage() -> ClientError {
        ClientError::Api {
            status: 503,
            message: "model overloaded".to_owned(),
        }
    }
}

impl Analyzer for MockAnalyzer {
    fn analyze(
        &self,
        text: String,
        energy: i16,
        valence: i16,
    ) -> BoxFuture<Result<MoodAnalysis, ClientError>> {
        self.analyzed.write().unwrap().push((text, energy, valence));

        let result = if self.failing {
            Err(Self::outage())
        } else {
            Ok(self.analysis.clone())
        };

        async move { result }.boxed()
    }

    fn affirm(&self, notes: Vec<AffirmationNote>) -> BoxFuture<Result<String, ClientError>> {
        let result = if self.failing {
            Err(Self::outage())
        } else {
            Ok(format!("You showed up {} times this week.", notes.len()))
        };

        self.affirmed.write().unwrap().push(notes);

        async move { result }.boxed()
    }
}
