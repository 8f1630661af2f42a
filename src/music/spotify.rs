use std::time::{Duration, Instant};

use futures::future::{BoxFuture, FutureExt};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio::sync::Mutex;
use url::Url;

use super::{AudioFeatures, MusicCatalog, Track, GENRES};
use crate::config::{get_variable, get_variable_or};
use crate::errors::ClientError;

const DEFAULT_API_BASE: &str = "https://api.spotify.com/v1/";
const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
const DEFAULT_SEED_GENRES: &str = "pop,indie,chill";

/// The catalog rejects more seeds than this.
const MAX_SEEDS: usize = 5;

/// The catalog rejects more IDs per audio-features request than this.
const MAX_FEATURE_IDS: usize = 100;

/// Tokens are refreshed this long before they expire.
const TOKEN_MARGIN: Duration = Duration::from_secs(60);

struct AccessToken {
    value: String,
    expires_at: Instant,
}

/// The Spotify Web API, authenticated with client credentials.
pub struct SpotifyCatalog {
    client: Client,
    api_base: Url,
    token_url: Url,
    client_id: String,
    client_secret: String,
    fallback_genres: Vec<String>,
    token: Mutex<Option<AccessToken>>,
}

impl SpotifyCatalog {
    pub fn new(
        client: Client,
        api_base: Url,
        token_url: Url,
        client_id: String,
        client_secret: String,
        fallback_genres: Vec<String>,
    ) -> Self {
        Self {
            client,
            api_base,
            token_url,
            client_id,
            client_secret,
            fallback_genres,
            token: Mutex::new(None),
        }
    }

    pub fn from_env(client: Client) -> Result<Self, url::ParseError> {
        let fallback_genres = get_variable_or("SPOTIFY_SEED_GENRES", DEFAULT_SEED_GENRES)
            .split(',')
            .map(|g| g.trim().to_owned())
            .filter(|g| !g.is_empty())
            .collect();

        Ok(Self::new(
            client,
            Url::parse(DEFAULT_API_BASE)?,
            Url::parse(DEFAULT_TOKEN_URL)?,
            get_variable("SPOTIFY_CLIENT_ID"),
            get_variable("SPOTIFY_CLIENT_SECRET"),
            fallback_genres,
        ))
    }

    async fn access_token(&self) -> Result<String, ClientError> {
        let mut token = self.token.lock().await;

        if let Some(ref current) = *token {
            if current.expires_at > Instant::now() + TOKEN_MARGIN {
                return Ok(current.value.clone());
            }
        }

        let response = self
            .client
            .post(self.token_url.clone())
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        let granted: TokenResponse = read_json(response).await?;
        let value = granted.access_token.clone();

        *token = Some(AccessToken {
            value: granted.access_token,
            expires_at: Instant::now() + Duration::from_secs(granted.expires_in),
        });

        Ok(value)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ClientError> {
        let url = self
            .api_base
            .join(path)
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;
        let token = self.access_token().await?;

        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .query(query)
            .send()
            .await?;

        read_json(response).await
    }
}

impl MusicCatalog for SpotifyCatalog {
    fn recommend(
        &self,
        energy: f64,
        valence: f64,
        genres: Option<Vec<String>>,
        limit: u8,
    ) -> BoxFuture<Result<Vec<Track>, ClientError>> {
        async move {
            let seeds = seed_genres(genres.as_deref(), &self.fallback_genres);

            let query = [
                ("seed_genres", seeds.join(",")),
                ("target_energy", format!("{:.2}", energy)),
                ("target_valence", format!("{:.2}", valence)),
                ("limit", limit.max(1).min(100).to_string()),
            ];

            let response: RecommendationsResponse = self.get("recommendations", &query).await?;

            Ok(response.tracks)
        }
        .boxed()
    }

    fn audio_features(
        &self,
        ids: Vec<String>,
    ) -> BoxFuture<Result<Vec<Option<AudioFeatures>>, ClientError>> {
        async move {
            let mut features = Vec::with_capacity(ids.len());

            for chunk in ids.chunks(MAX_FEATURE_IDS) {
                let query = [("ids", chunk.join(","))];
                let response: AudioFeaturesResponse = self.get("audio-features", &query).await?;

                // keep positions aligned even if the catalog returns fewer
                // entries than requested
                let mut returned = response.audio_features.into_iter();
                for _ in chunk {
                    features.push(returned.next().flatten());
                }
            }

            Ok(features)
        }
        .boxed()
    }

    fn search(&self, query: String, limit: u8) -> BoxFuture<Result<Vec<Track>, ClientError>> {
        async move {
            let query = [
                ("q", query),
                ("type", "track".to_owned()),
                ("limit", limit.max(1).min(50).to_string()),
            ];

            let response: SearchResponse = self.get("search", &query).await?;

            Ok(response.tracks.items)
        }
        .boxed()
    }

    fn genres(&self) -> BoxFuture<Result<Vec<String>, ClientError>> {
        let genres = GENRES.iter().map(|g| (*g).to_owned()).collect::<Vec<_>>();

        async move { Ok(genres) }.boxed()
    }
}

/// Picks recommendation seeds: the suggested genres the catalog knows,
/// or the fallback genres if none are usable.
pub(crate) fn seed_genres(suggested: Option<&[String]>, fallback: &[String]) -> Vec<String> {
    let mut seeds: Vec<String> = vec![];

    for genre in suggested.unwrap_or_default() {
        let genre = genre.trim().to_lowercase();

        if GENRES.contains(&genre.as_str()) && !seeds.contains(&genre) {
            seeds.push(genre);
        }
    }

    if seeds.is_empty() {
        seeds = fallback.to_vec();
    }

    seeds.truncate(MAX_SEEDS);

    seeds
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();

    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();

        return Err(ClientError::Api {
            status: status.as_u16(),
            message,
        });
    }

    Ok(response.json().await?)
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

#[derive(Debug, Deserialize)]
struct RecommendationsResponse {
    tracks: Vec<Track>,
}

#[derive(Debug, Deserialize)]
struct AudioFeaturesResponse {
    audio_features: Vec<Option<AudioFeatures>>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    tracks: TrackPage,
}

#[derive(Debug, Deserialize)]
struct TrackPage {
    items: Vec<Track>,
}
