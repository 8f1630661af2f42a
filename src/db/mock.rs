use std::sync::RwLock;

use futures::future::{BoxFuture, FutureExt};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::db::Db;
use crate::errors::BackendError;
use crate::id::MoodEntryId;
use crate::mood::{AiReflection, MoodEntry, NewMoodEntry};
use crate::playlist::{NewPlaylist, SavedPlaylist};
use crate::recommendation::{NewRecommendation, Recommendation};

#[derive(Default)]
struct Tables {
    entries: Vec<MoodEntry>,
    reflections: Vec<AiReflection>,
    recommendations: Vec<Recommendation>,
    playlists: Vec<SavedPlaylist>,
}

/// An in-memory database that records which operations it served.
pub(crate) struct MockDb {
    tables: RwLock<Tables>,
    calls: RwLock<Vec<&'static str>>,
    started: OffsetDateTime,
}

impl MockDb {
    pub fn new() -> Self {
        MockDb {
            tables: RwLock::new(Tables::default()),
            calls: RwLock::new(Vec::new()),
            started: OffsetDateTime::now_utc(),
        }
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.read().unwrap().clone()
    }

    pub fn recommendation_count(&self) -> usize {
        self.tables.read().unwrap().recommendations.len()
    }

    fn record(&self, call: &'static str) {
        self.calls.write().unwrap().push(call);
    }

    // every record gets a distinct, increasing timestamp so orderings are
    // deterministic
    fn next_timestamp(&self, tables: &Tables) -> OffsetDateTime {
        let count = tables.entries.len()
            + tables.reflections.len()
            + tables.recommendations.len()
            + tables.playlists.len();

        self.started + Duration::seconds(count as i64)
    }
}

impl Db for MockDb {
    fn insert_mood_entry(&self, entry: NewMoodEntry) -> BoxFuture<Result<MoodEntry, BackendError>> {
        self.record("insert_mood_entry");

        let mut tables = self.tables.write().unwrap();
        let created = MoodEntry {
            id: MoodEntryId::new(Uuid::new_v4()),
            text: entry.text,
            emoji: entry.emoji,
            quick_mood: entry.quick_mood,
            energy: entry.energy,
            valence: entry.valence,
            created_at: self.next_timestamp(&tables),
        };
        tables.entries.push(created.clone());

        async move { Ok(created) }.boxed()
    }

    fn retrieve_mood_entry(
        &self,
        id: &MoodEntryId,
    ) -> BoxFuture<Result<Option<MoodEntry>, BackendError>> {
        self.record("retrieve_mood_entry");

        let entry = self
            .tables
            .read()
            .unwrap()
            .entries
            .iter()
            .find(|e| e.id == *id)
            .cloned();

        async move { Ok(entry) }.boxed()
    }

    fn list_mood_entries(&self) -> BoxFuture<Result<Vec<MoodEntry>, BackendError>> {
        self.record("list_mood_entries");

        let entries: Vec<MoodEntry> = self
            .tables
            .read()
            .unwrap()
            .entries
            .iter()
            .rev()
            .cloned()
            .collect();

        async move { Ok(entries) }.boxed()
    }

    fn list_recent_mood_entries(
        &self,
        limit: u32,
    ) -> BoxFuture<Result<Vec<MoodEntry>, BackendError>> {
        self.record("list_recent_mood_entries");

        let entries: Vec<MoodEntry> = self
            .tables
            .read()
            .unwrap()
            .entries
            .iter()
            .rev()
            .take(limit as usize)
            .cloned()
            .collect();

        async move { Ok(entries) }.boxed()
    }

    fn insert_reflection(
        &self,
        entry: &MoodEntryId,
        reflection: String,
    ) -> BoxFuture<Result<AiReflection, BackendError>> {
        self.record("insert_reflection");

        let mut tables = self.tables.write().unwrap();
        let created = AiReflection {
            id: Uuid::new_v4().into(),
            mood_entry_id: *entry,
            reflection,
            created_at: self.next_timestamp(&tables),
        };
        tables.reflections.push(created.clone());

        async move { Ok(created) }.boxed()
    }

    fn retrieve_reflection(
        &self,
        entry: &MoodEntryId,
    ) -> BoxFuture<Result<Option<AiReflection>, BackendError>> {
        self.record("retrieve_reflection");

        let reflection = self
            .tables
            .read()
            .unwrap()
            .reflections
            .iter()
            .find(|r| r.mood_entry_id == *entry)
            .cloned();

        async move { Ok(reflection) }.boxed()
    }

    fn insert_recommendation(
        &self,
        entry: &MoodEntryId,
        recommendation: NewRecommendation,
    ) -> BoxFuture<Result<Recommendation, BackendError>> {
        self.record("insert_recommendation");

        let mut tables = self.tables.write().unwrap();
        let created = Recommendation {
            id: Uuid::new_v4().into(),
            mood_entry_id: *entry,
            spotify_track_id: recommendation.spotify_track_id,
            track_name: recommendation.track_name,
            artist_name: recommendation.artist_name,
            album_art_url: recommendation.album_art_url,
            preview_url: recommendation.preview_url,
            energy: recommendation.energy,
            valence: recommendation.valence,
            created_at: self.next_timestamp(&tables),
        };
        tables.recommendations.push(created.clone());

        async move { Ok(created) }.boxed()
    }

    fn list_recommendations(
        &self,
        entry: &MoodEntryId,
    ) -> BoxFuture<Result<Vec<Recommendation>, BackendError>> {
        self.record("list_recommendations");

        let recommendations: Vec<Recommendation> = self
            .tables
            .read()
            .unwrap()
            .recommendations
            .iter()
            .filter(|r| r.mood_entry_id == *entry)
            .cloned()
            .collect();

        async move { Ok(recommendations) }.boxed()
    }

    fn insert_playlist(&self, playlist: NewPlaylist) -> BoxFuture<Result<SavedPlaylist, BackendError>> {
        self.record("insert_playlist");

        let mut tables = self.tables.write().unwrap();
        let created = SavedPlaylist {
            id: Uuid::new_v4().into(),
            name: playlist.name,
            description: playlist.description,
            mood_entry_ids: playlist.mood_entry_ids,
            created_at: self.next_timestamp(&tables),
        };
        tables.playlists.push(created.clone());

        async move { Ok(created) }.boxed()
    }

    fn list_playlists(&self) -> BoxFuture<Result<Vec<SavedPlaylist>, BackendError>> {
        self.record("list_playlists");

        let playlists: Vec<SavedPlaylist> = self
            .tables
            .read()
            .unwrap()
            .playlists
            .iter()
            .rev()
            .cloned()
            .collect();

        async move { Ok(playlists) }.boxed()
    }
}
