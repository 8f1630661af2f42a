use std::time::{Duration, Instant};

use serde_json::Value;
use slog::{debug, o, trace, Logger};
use warp::{
    http::StatusCode,
    reject,
    reply::{json, with_header, with_status, Reply},
};

use crate::analysis::AffirmationNote;
use crate::config::{AFFIRMATION_ENTRY_COUNT, AFFIRMATION_EXCERPT_LENGTH, DEFAULT_SEARCH_LIMIT};
use crate::environment::{Environment, SafeCatalog, SafeDb};
use crate::errors::BackendError;
use crate::id::MoodEntryId;
use crate::mood::{normalize_affect, MoodEntryDetail};
use crate::music::pair_with_features;
use crate::normalization::{excerpt, normalize_text};
use crate::recommendation::Recommendation;
use crate::routes::{
    query::{parse_limit, RecentQuery, SearchQuery},
    rejection::{Context, Rejection},
    response::SuccessResponse,
};
use crate::validation::{validate_mood_entry, validate_playlist};

const SERVER_TIMING_HEADER: &str = "server-timing";
type RouteResult = Result<Box<dyn Reply>, reject::Rejection>;

macro_rules! timed {
    ($($body:tt)*) => {{
        let start = Instant::now();

        // errors return early through `?`, so only successful
        // responses carry the header
        let result = { $($body)* };

        Ok(Box::new(with_header(
            result,
            SERVER_TIMING_HEADER,
            format_server_timing(start.elapsed()),
        )) as Box<dyn Reply>)
    }};
}

pub async fn create_mood_entry(environment: Environment, body: Value) -> RouteResult {
    timed! {
        let Environment {
            logger,
            db,
            analyzer,
            catalog,
            config,
        } = environment;

        let error_handler = |e: BackendError| Rejection::new(Context::create_mood_entry(None), e);

        debug!(logger, "Validating mood entry...");
        let new_entry = validate_mood_entry(&body)
            .map_err(BackendError::Validation)
            .map_err(error_handler)?;

        debug!(logger, "Saving mood entry...");
        let entry = db.insert_mood_entry(new_entry).await.map_err(error_handler)?;

        // from here on the entry exists, and it stays even if a later step
        // fails
        let id_as_str = entry.id.to_string();
        let logger = logger.new(o!("id" => id_as_str.clone()));
        let error_handler =
            |e: BackendError| Rejection::new(Context::create_mood_entry(Some(id_as_str.clone())), e);

        debug!(logger, "Analyzing mood entry...");
        let analysis = analyzer
            .analyze(entry.text.clone(), entry.energy, entry.valence)
            .await
            .map_err(|source| BackendError::Analysis { source })
            .map_err(&error_handler)?;

        debug!(logger, "Saving reflection...");
        let ai_reflection = db
            .insert_reflection(&entry.id, analysis.reflection.clone())
            .await
            .map_err(&error_handler)?;

        let genres = if analysis.suggested_genres.is_empty() {
            None
        } else {
            Some(analysis.suggested_genres.clone())
        };

        let recommendations = save_recommendations(
            &logger,
            &*db,
            &*catalog,
            &entry.id,
            (analysis.energy, analysis.valence),
            genres,
            config.recommendation_limit,
        )
        .await
        .map_err(&error_handler)?;

        let response = SuccessResponse::Created {
            mood_entry: entry,
            ai_reflection,
            recommendations,
            analysis,
        };

        with_status(json(&response), StatusCode::CREATED)
    }
}

pub async fn list_mood_entries(environment: Environment) -> RouteResult {
    timed! {
        let entries = environment
            .db
            .list_mood_entries()
            .await
            .map_err(|e: BackendError| Rejection::new(Context::list_mood_entries(), e))?;

        json(&entries)
    }
}

pub async fn list_recent_mood_entries(environment: Environment, query: RecentQuery) -> RouteResult {
    timed! {
        let error_handler =
            |e: BackendError| Rejection::new(Context::list_recent_mood_entries(query.limit.clone()), e);

        let limit = parse_limit(query.limit.as_deref(), environment.config.recent_limit)
            .map_err(error_handler)?;

        debug!(environment.logger, "Listing recent mood entries..."; "limit" => limit);
        let entries = environment
            .db
            .list_recent_mood_entries(limit)
            .await
            .map_err(error_handler)?;

        json(&entries)
    }
}

pub async fn retrieve_mood_entry(environment: Environment, id: String) -> RouteResult {
    timed! {
        let error_handler = |e: BackendError| Rejection::new(Context::retrieve_mood_entry(id.clone()), e);

        let id: MoodEntryId = id.parse().map_err(error_handler)?;
        debug!(environment.logger, "Retrieving mood entry..."; "id" => %id);

        let entry = environment
            .db
            .retrieve_mood_entry(&id)
            .await
            .map_err(error_handler)?
            .ok_or_else(|| error_handler(BackendError::NonExistentId(id)))?;

        let ai_reflection = environment
            .db
            .retrieve_reflection(&id)
            .await
            .map_err(error_handler)?;

        json(&MoodEntryDetail { entry, ai_reflection })
    }
}

pub async fn list_recommendations(environment: Environment, id: String) -> RouteResult {
    timed! {
        let error_handler = |e: BackendError| Rejection::new(Context::list_recommendations(id.clone()), e);

        let id: MoodEntryId = id.parse().map_err(error_handler)?;
        debug!(environment.logger, "Listing recommendations..."; "id" => %id);

        let recommendations = environment
            .db
            .list_recommendations(&id)
            .await
            .map_err(error_handler)?;

        json(&recommendations)
    }
}

pub async fn refresh_recommendations(environment: Environment, id: String) -> RouteResult {
    timed! {
        let Environment {
            logger,
            db,
            catalog,
            config,
            ..
        } = environment;

        let error_handler =
            |e: BackendError| Rejection::new(Context::refresh_recommendations(id.clone()), e);

        let id: MoodEntryId = id.parse().map_err(error_handler)?;
        let logger = logger.new(o!("id" => id.to_string()));

        debug!(logger, "Retrieving mood entry...");
        let entry = db
            .retrieve_mood_entry(&id)
            .await
            .map_err(error_handler)?
            .ok_or_else(|| error_handler(BackendError::NonExistentId(id)))?;

        // the stored self-report stands in for a fresh analysis
        let recommendations = save_recommendations(
            &logger,
            &*db,
            &*catalog,
            &entry.id,
            (normalize_affect(entry.energy), normalize_affect(entry.valence)),
            None,
            config.recommendation_limit,
        )
        .await
        .map_err(error_handler)?;

        json(&recommendations)
    }
}

pub async fn save_playlist(environment: Environment, body: Value) -> RouteResult {
    timed! {
        let error_handler = |e: BackendError| Rejection::new(Context::save_playlist(), e);

        let new_playlist = validate_playlist(&body)
            .map_err(BackendError::Validation)
            .map_err(error_handler)?;

        debug!(environment.logger, "Saving playlist..."; "entries" => new_playlist.mood_entry_ids.len());
        let playlist = environment
            .db
            .insert_playlist(new_playlist)
            .await
            .map_err(error_handler)?;

        with_status(json(&playlist), StatusCode::CREATED)
    }
}

pub async fn list_playlists(environment: Environment) -> RouteResult {
    timed! {
        let playlists = environment
            .db
            .list_playlists()
            .await
            .map_err(|e: BackendError| Rejection::new(Context::list_playlists(), e))?;

        json(&playlists)
    }
}

pub async fn affirmation(environment: Environment) -> RouteResult {
    timed! {
        let error_handler = |e: BackendError| Rejection::new(Context::affirmation(), e);

        let entries = environment
            .db
            .list_recent_mood_entries(AFFIRMATION_ENTRY_COUNT)
            .await
            .map_err(error_handler)?;

        let notes = entries
            .into_iter()
            .map(|entry| AffirmationNote {
                excerpt: excerpt(&entry.text, AFFIRMATION_EXCERPT_LENGTH),
                emoji: entry.emoji,
                quick_mood: entry.quick_mood,
                energy: entry.energy,
                valence: entry.valence,
            })
            .collect::<Vec<_>>();

        debug!(environment.logger, "Generating affirmation..."; "notes" => notes.len());
        let affirmation = environment
            .analyzer
            .affirm(notes)
            .await
            .map_err(|source| BackendError::Analysis { source })
            .map_err(error_handler)?;

        json(&SuccessResponse::Affirmation { affirmation })
    }
}

pub async fn search_tracks(environment: Environment, query: SearchQuery) -> RouteResult {
    timed! {
        let SearchQuery { q, limit } = query;

        let error_handler = |e: BackendError| Rejection::new(Context::search_tracks(q.clone()), e);

        let text = q
            .as_deref()
            .map(|q| normalize_text(q))
            .filter(|text| !text.is_empty())
            .ok_or_else(|| error_handler(BackendError::MissingQuery))?;
        let limit = parse_limit(limit.as_deref(), DEFAULT_SEARCH_LIMIT).map_err(error_handler)?;

        debug!(environment.logger, "Searching tracks..."; "query" => %text, "limit" => limit);
        let tracks = environment
            .catalog
            .search(text, limit)
            .await
            .map_err(|source| BackendError::Catalog { source })
            .map_err(error_handler)?;

        json(&tracks)
    }
}

pub async fn list_genres(environment: Environment) -> RouteResult {
    timed! {
        let genres = environment
            .catalog
            .genres()
            .await
            .map_err(|source| BackendError::Catalog { source })
            .map_err(|e| Rejection::new(Context::list_genres(), e))?;

        json(&genres)
    }
}

/// Asks the catalog for tracks near the given (energy, valence), looks up
/// their audio features and stores one recommendation per track.
async fn save_recommendations(
    logger: &Logger,
    db: &SafeDb,
    catalog: &SafeCatalog,
    entry: &MoodEntryId,
    (energy, valence): (f64, f64),
    genres: Option<Vec<String>>,
    limit: u8,
) -> Result<Vec<Recommendation>, BackendError> {
    let catalog_error = |source| BackendError::Catalog { source };

    debug!(logger, "Requesting recommendations..."; "energy" => energy, "valence" => valence);
    let tracks = catalog
        .recommend(energy, valence, genres, limit)
        .await
        .map_err(catalog_error)?;

    let features = if tracks.is_empty() {
        vec![]
    } else {
        let ids = tracks.iter().map(|t| t.id.clone()).collect();
        catalog.audio_features(ids).await.map_err(catalog_error)?
    };

    let mut recommendations = Vec::with_capacity(tracks.len());

    for recommendation in pair_with_features(tracks, features) {
        trace!(logger, "Saving recommendation..."; "track" => %recommendation.spotify_track_id);
        recommendations.push(db.insert_recommendation(entry, recommendation).await?);
    }

    debug!(logger, "Saved recommendations"; "count" => recommendations.len());

    Ok(recommendations)
}

fn format_server_timing(d: Duration) -> String {
    format!("handler;dur={}", d.as_millis())
}
