use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_AUDIO_FEATURE;
use crate::errors::ClientError;
use crate::recommendation::NewRecommendation;

#[cfg(test)]
pub(crate) mod mock;
mod spotify;

pub use self::spotify::SpotifyCatalog;

/// A track as returned by the catalog.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Track {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<Artist>,
    pub album: Option<Album>,
    pub preview_url: Option<String>,
    pub duration_ms: Option<u32>,
    pub popularity: Option<u32>,
    pub external_urls: Option<ExternalUrls>,
}

impl Track {
    /// The names of all credited artists, comma-separated.
    pub fn artist_names(&self) -> String {
        self.artists
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// The first (largest) album image, if any.
    pub fn album_art_url(&self) -> Option<String> {
        self.album
            .as_ref()
            .and_then(|album| album.images.first())
            .map(|image| image.url.clone())
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Artist {
    pub id: Option<String>,
    pub name: String,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Album {
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub images: Vec<Image>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Image {
    pub url: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ExternalUrls {
    pub spotify: Option<String>,
}

/// The audio analysis of a single track.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct AudioFeatures {
    pub id: String,
    pub energy: f64,
    pub valence: f64,
    pub danceability: Option<f64>,
    pub tempo: Option<f64>,
}

/// A music catalog that can suggest tracks for a mood.
pub trait MusicCatalog {
    /// Suggests up to `limit` tracks close to the given energy and
    /// valence (both 0–1), seeded with `genres` when given.
    fn recommend(
        &self,
        energy: f64,
        valence: f64,
        genres: Option<Vec<String>>,
        limit: u8,
    ) -> BoxFuture<Result<Vec<Track>, ClientError>>;

    /// Looks up audio features for the given track IDs. The result is
    /// aligned with `ids`; tracks without features are `None`.
    fn audio_features(
        &self,
        ids: Vec<String>,
    ) -> BoxFuture<Result<Vec<Option<AudioFeatures>>, ClientError>>;

    /// Searches tracks by free text.
    fn search(&self, query: String, limit: u8) -> BoxFuture<Result<Vec<Track>, ClientError>>;

    /// Lists the genres accepted as recommendation seeds.
    fn genres(&self) -> BoxFuture<Result<Vec<String>, ClientError>>;
}

/// Turns catalog tracks into recommendations, taking energy and valence
/// from the feature at the same position, or `DEFAULT_AUDIO_FEATURE`
/// when there is none.
pub fn pair_with_features(
    tracks: Vec<Track>,
    features: Vec<Option<AudioFeatures>>,
) -> Vec<NewRecommendation> {
    let mut features = features.into_iter();

    tracks
        .into_iter()
        .map(|track| {
            let (energy, valence) = features
                .next()
                .flatten()
                .map(|f| (f.energy, f.valence))
                .unwrap_or((DEFAULT_AUDIO_FEATURE, DEFAULT_AUDIO_FEATURE));

            NewRecommendation {
                artist_name: track.artist_names(),
                album_art_url: track.album_art_url(),
                spotify_track_id: track.id,
                track_name: track.name,
                preview_url: track.preview_url,
                energy,
                valence,
            }
        })
        .collect()
}

/// Genres the catalog accepts as recommendation seeds.
pub const GENRES: &[&str] = &[
    "acoustic", "afrobeat", "alt-rock", "alternative", "ambient", "anime", "black-metal",
    "bluegrass", "blues", "bossanova", "brazil", "breakbeat", "british", "cantopop",
    "chicago-house", "children", "chill", "classical", "club", "comedy", "country", "dance",
    "dancehall", "death-metal", "deep-house", "detroit-techno", "disco", "disney",
    "drum-and-bass", "dub", "dubstep", "edm", "electro", "electronic", "emo", "folk", "forro",
    "french", "funk", "garage", "german", "gospel", "goth", "grindcore", "groove", "grunge",
    "guitar", "happy", "hard-rock", "hardcore", "hardstyle", "heavy-metal", "hip-hop",
    "holidays", "honky-tonk", "house", "idm", "indian", "indie", "indie-pop", "industrial",
    "iranian", "j-dance", "j-idol", "j-pop", "j-rock", "jazz", "k-pop", "kids", "latin",
    "latino", "malay", "mandopop", "metal", "metal-misc", "metalcore", "minimal-techno",
    "movies", "mpb", "new-age", "new-release", "opera", "pagode", "party", "philippines-opm",
    "piano", "pop", "pop-film", "post-dubstep", "power-pop", "progressive-house", "psych-rock",
    "punk", "punk-rock", "r-n-b", "rainy-day", "reggae", "reggaeton", "road-trip", "rock",
    "rock-n-roll", "rockabilly", "romance", "sad", "salsa", "samba", "sertanejo", "show-tunes",
    "singer-songwriter", "ska", "sleep", "songwriter", "soul", "soundtracks", "spanish",
    "study", "summer", "swedish", "synth-pop", "tango", "techno", "trance", "trip-hop",
    "turkish", "work-out", "world-music",
];

#[cfg(test)]
mod tests {
    use super::*;

    fn track(id: &str) -> Track {
        Track {
            id: id.to_owned(),
            name: format!("Track {}", id),
            artists: vec![
                Artist {
                    id: None,
                    name: "First".to_owned(),
                },
                Artist {
                    id: None,
                    name: "Second".to_owned(),
                },
            ],
            album: Some(Album {
                id: None,
                name: "Album".to_owned(),
                images: vec![Image {
                    url: format!("https://i.scdn.co/image/{}", id),
                    width: Some(640),
                    height: Some(640),
                }],
            }),
            preview_url: None,
            duration_ms: None,
            popularity: None,
            external_urls: None,
        }
    }

    fn features(id: &str, energy: f64, valence: f64) -> AudioFeatures {
        AudioFeatures {
            id: id.to_owned(),
            energy,
            valence,
            danceability: None,
            tempo: None,
        }
    }

    #[test]
    fn pairs_features_by_position() {
        let recommendations = pair_with_features(
            vec![track("a"), track("b"), track("c")],
            vec![Some(features("a", 0.9, 0.1)), None],
        );

        let signals = recommendations
            .iter()
            .map(|r| (r.spotify_track_id.as_str(), r.energy, r.valence))
            .collect::<Vec<_>>();

        assert_eq!(
            signals,
            vec![
                ("a", 0.9, 0.1),
                ("b", DEFAULT_AUDIO_FEATURE, DEFAULT_AUDIO_FEATURE),
                ("c", DEFAULT_AUDIO_FEATURE, DEFAULT_AUDIO_FEATURE),
            ]
        );
    }

    #[test]
    fn copies_track_details() {
        let recommendation = pair_with_features(vec![track("a")], vec![]).remove(0);

        assert_eq!(recommendation.track_name, "Track a");
        assert_eq!(recommendation.artist_name, "First, Second");
        assert_eq!(
            recommendation.album_art_url.as_deref(),
            Some("https://i.scdn.co/image/a")
        );
    }

    #[test]
    fn genres_are_sorted_and_unique() {
        let mut sorted = GENRES.to_vec();
        sorted.sort_unstable();
        sorted.dedup();

        assert_eq!(sorted, GENRES.to_vec());
    }
}
