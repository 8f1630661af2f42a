use std::sync::RwLock;

use futures::future::{BoxFuture, FutureExt};

use super::{AudioFeatures, MusicCatalog, Track};
use crate::errors::ClientError;

/// A catalog with a fixed set of tracks and features.
pub(crate) struct MockCatalog {
    tracks: Vec<Track>,
    features: Vec<Option<AudioFeatures>>,
    failing: bool,
    pub(crate) recommended: RwLock<Vec<(f64, f64, Option<Vec<String>>, u8)>>,
    pub(crate) searched: RwLock<Vec<(String, u8)>>,
}

impl MockCatalog {
    pub fn new(tracks: Vec<Track>, features: Vec<Option<AudioFeatures>>) -> Self {
        MockCatalog {
            tracks,
            features,
            failing: false,
            recommended: RwLock::new(vec![]),
            searched: RwLock::new(vec![]),
        }
    }

    pub fn failing() -> Self {
        MockCatalog {
            failing: true,
            ..Self::new(vec![], vec![])
        }
    }

    fn result<T>(&self, value: impl FnOnce() -> T) -> Result<T, ClientError> {
        if self.failing {
            Err(ClientError::Api {
                status: 429,
                message: "rate limited".to_owned(),
            })
        } else {
            Ok(value())
        }
    }
}

impl MusicCatalog for MockCatalog {
    fn recommend(
        &self,
        energy: f64,
        valence: f64,
        genres: Option<Vec<String>>,
        limit: u8,
    ) -> BoxFuture<Result<Vec<Track>, ClientError>> {
        self.recommended
            .write()
            .unwrap()
            .push((energy, valence, genres, limit));

        let result: Result<Vec<Track>, ClientError> =
            self.result(|| self.tracks.iter().take(limit as usize).cloned().collect());

        async move { result }.boxed()
    }

    fn audio_features(
        &self,
        ids: Vec<String>,
    ) -> BoxFuture<Result<Vec<Option<AudioFeatures>>, ClientError>> {
        let result: Result<Vec<Option<AudioFeatures>>, ClientError> = self.result(|| {
            ids.iter()
                .map(|id| {
                    self.features
                        .iter()
                        .flatten()
                        .find(|f| &f.id == id)
                        .cloned()
                })
                .collect()
        });

        async move { result }.boxed()
    }

    fn search(&self, query: String, limit: u8) -> BoxFuture<Result<Vec<Track>, ClientError>> {
        let result: Result<Vec<Track>, ClientError> = self.result(|| {
            let needle = query.to_lowercase();

            self.tracks
                .iter()
                .filter(|t| t.name.to_lowercase().contains(&needle))
                .take(limit as usize)
                .cloned()
                .collect()
        });

        self.searched.write().unwrap().push((query, limit));

        async move { result }.boxed()
    }

    fn genres(&self) -> BoxFuture<Result<Vec<String>, ClientError>> {
        let result = self.result(|| vec!["chill".to_owned(), "pop".to_owned()]);

        async move { result }.boxed()
    }
}
