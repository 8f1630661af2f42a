use futures::future::BoxFuture;

use crate::errors::BackendError;
use crate::id::MoodEntryId;
use crate::mood::{AiReflection, MoodEntry, NewMoodEntry};
use crate::playlist::{NewPlaylist, SavedPlaylist};
use crate::recommendation::{NewRecommendation, Recommendation};

#[cfg(test)]
pub(crate) mod mock;

pub trait Db {
    fn insert_mood_entry(&self, entry: NewMoodEntry) -> BoxFuture<Result<MoodEntry, BackendError>>;

    fn retrieve_mood_entry(
        &self,
        id: &MoodEntryId,
    ) -> BoxFuture<Result<Option<MoodEntry>, BackendError>>;

    fn list_mood_entries(&self) -> BoxFuture<Result<Vec<MoodEntry>, BackendError>>;

    fn list_recent_mood_entries(&self, limit: u32)
        -> BoxFuture<Result<Vec<MoodEntry>, BackendError>>;

    fn insert_reflection(
        &self,
        entry: &MoodEntryId,
        reflection: String,
    ) -> BoxFuture<Result<AiReflection, BackendError>>;

    fn retrieve_reflection(
        &self,
        entry: &MoodEntryId,
    ) -> BoxFuture<Result<Option<AiReflection>, BackendError>>;

    fn insert_recommendation(
        &self,
        entry: &MoodEntryId,
        recommendation: NewRecommendation,
    ) -> BoxFuture<Result<Recommendation, BackendError>>;

    fn list_recommendations(
        &self,
        entry: &MoodEntryId,
    ) -> BoxFuture<Result<Vec<Recommendation>, BackendError>>;

    fn insert_playlist(&self, playlist: NewPlaylist) -> BoxFuture<Result<SavedPlaylist, BackendError>>;

    fn list_playlists(&self) -> BoxFuture<Result<Vec<SavedPlaylist>, BackendError>>;
}

pub use self::postgres::*;

mod postgres {
    use futures::future::BoxFuture;
    use futures::FutureExt;
    use sqlx::{
        self,
        postgres::{PgPool, PgRow},
        Executor,
    };
    use time::OffsetDateTime;
    use uuid::Uuid;

    use crate::errors::BackendError;
    use crate::id::{MoodEntryId, PlaylistId};
    use crate::mood::{AiReflection, MoodEntry, NewMoodEntry};
    use crate::playlist::{NewPlaylist, SavedPlaylist};
    use crate::recommendation::{NewRecommendation, Recommendation};

    pub struct PgDb {
        pool: PgPool,
    }

    impl PgDb {
        pub fn new(pool: PgPool) -> Self {
            PgDb { pool }
        }

        /// Creates any missing tables. Safe to run against an
        /// initialized database.
        pub async fn initialize_schema(&self) -> Result<(), BackendError> {
            // a plain string goes through the simple query protocol,
            // which is what allows several statements at once
            (&self.pool)
                .execute(include_str!("queries/schema.sql"))
                .await?;

            Ok(())
        }
    }

    // these can be simplified once async functions in traits are stabilized
    impl super::Db for PgDb {
        fn insert_mood_entry(
            &self,
            entry: NewMoodEntry,
        ) -> BoxFuture<Result<MoodEntry, BackendError>> {
            async move {
                let query = sqlx::query_as::<_, MoodEntry>(include_str!(
                    "queries/create_mood_entry.sql"
                ));

                let created = query
                    .bind(&entry.text)
                    .bind(&entry.emoji)
                    .bind(&entry.quick_mood)
                    .bind(entry.energy)
                    .bind(entry.valence)
                    .fetch_one(&self.pool)
                    .await?;

                Ok(created)
            }
            .boxed()
        }

        fn retrieve_mood_entry(
            &self,
            id: &MoodEntryId,
        ) -> BoxFuture<Result<Option<MoodEntry>, BackendError>> {
            let id = *id;

            async move {
                let query = sqlx::query_as::<_, MoodEntry>(include_str!(
                    "queries/retrieve_mood_entry.sql"
                ));

                let entry = query.bind(id).fetch_optional(&self.pool).await?;

                Ok(entry)
            }
            .boxed()
        }

        fn list_mood_entries(&self) -> BoxFuture<Result<Vec<MoodEntry>, BackendError>> {
            async move {
                let query =
                    sqlx::query_as::<_, MoodEntry>(include_str!("queries/list_mood_entries.sql"));

                let entries = query.fetch_all(&self.pool).await?;

                Ok(entries)
            }
            .boxed()
        }

        fn list_recent_mood_entries(
            &self,
            limit: u32,
        ) -> BoxFuture<Result<Vec<MoodEntry>, BackendError>> {
            async move {
                let query = sqlx::query_as::<_, MoodEntry>(include_str!(
                    "queries/list_recent_mood_entries.sql"
                ));

                let entries = query
                    .bind(i64::from(limit))
                    .fetch_all(&self.pool)
                    .await?;

                Ok(entries)
            }
            .boxed()
        }

        fn insert_reflection(
            &self,
            entry: &MoodEntryId,
            reflection: String,
        ) -> BoxFuture<Result<AiReflection, BackendError>> {
            let entry = *entry;

            async move {
                let query = sqlx::query_as::<_, AiReflection>(include_str!(
                    "queries/create_reflection.sql"
                ));

                let created = query
                    .bind(entry)
                    .bind(reflection)
                    .fetch_one(&self.pool)
                    .await?;

                Ok(created)
            }
            .boxed()
        }

        fn retrieve_reflection(
            &self,
            entry: &MoodEntryId,
        ) -> BoxFuture<Result<Option<AiReflection>, BackendError>> {
            let entry = *entry;

            async move {
                let query = sqlx::query_as::<_, AiReflection>(include_str!(
                    "queries/retrieve_reflection.sql"
                ));

                let reflection = query.bind(entry).fetch_optional(&self.pool).await?;

                Ok(reflection)
            }
            .boxed()
        }

        fn insert_recommendation(
            &self,
            entry: &MoodEntryId,
            recommendation: NewRecommendation,
        ) -> BoxFuture<Result<Recommendation, BackendError>> {
            let entry = *entry;

            async move {
                let query = sqlx::query_as::<_, Recommendation>(include_str!(
                    "queries/create_recommendation.sql"
                ));

                let created = query
                    .bind(entry)
                    .bind(&recommendation.spotify_track_id)
                    .bind(&recommendation.track_name)
                    .bind(&recommendation.artist_name)
                    .bind(&recommendation.album_art_url)
                    .bind(&recommendation.preview_url)
                    .bind(recommendation.energy)
                    .bind(recommendation.valence)
                    .fetch_one(&self.pool)
                    .await?;

                Ok(created)
            }
            .boxed()
        }

        fn list_recommendations(
            &self,
            entry: &MoodEntryId,
        ) -> BoxFuture<Result<Vec<Recommendation>, BackendError>> {
            let entry = *entry;

            async move {
                let query = sqlx::query_as::<_, Recommendation>(include_str!(
                    "queries/list_recommendations.sql"
                ));

                let recommendations = query.bind(entry).fetch_all(&self.pool).await?;

                Ok(recommendations)
            }
            .boxed()
        }

        fn insert_playlist(
            &self,
            playlist: NewPlaylist,
        ) -> BoxFuture<Result<SavedPlaylist, BackendError>> {
            async move {
                let query = sqlx::query(include_str!("queries/create_playlist.sql"));

                let ids = playlist
                    .mood_entry_ids
                    .iter()
                    .map(|id| *id.as_uuid())
                    .collect::<Vec<Uuid>>();

                let created = query
                    .bind(&playlist.name)
                    .bind(&playlist.description)
                    .bind(ids)
                    .try_map(|row: PgRow| new_saved_playlist(&row))
                    .fetch_one(&self.pool)
                    .await?;

                Ok(created)
            }
            .boxed()
        }

        fn list_playlists(&self) -> BoxFuture<Result<Vec<SavedPlaylist>, BackendError>> {
            async move {
                let query = sqlx::query(include_str!("queries/list_playlists.sql"));

                let playlists = query
                    .try_map(|row: PgRow| new_saved_playlist(&row))
                    .fetch_all(&self.pool)
                    .await?;

                Ok(playlists)
            }
            .boxed()
        }
    }

    // arrays of a transparent ID type don't decode directly, so
    // playlists are assembled by hand
    fn new_saved_playlist(row: &PgRow) -> Result<SavedPlaylist, sqlx::Error> {
        use sqlx::Row;

        let id: PlaylistId = row.try_get("id")?;
        let name: String = row.try_get("name")?;
        let description: Option<String> = row.try_get("description")?;
        let mood_entry_ids: Vec<Uuid> = row.try_get("mood_entry_ids")?;
        let created_at: OffsetDateTime = row.try_get("created_at")?;

        Ok(SavedPlaylist {
            id,
            name,
            description,
            mood_entry_ids: mood_entry_ids.into_iter().map(MoodEntryId::new).collect(),
            created_at,
        })
    }
}
