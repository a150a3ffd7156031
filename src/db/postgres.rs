use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPoolOptions, PgPool};
use uuid::Uuid;

use crate::{
    db::DataStore,
    error::{AppError, AppResult},
    models::{ContentId, ContentKind, HistoryEntry, ProgressPatch, UserProfile, WatchlistEntry},
};

/// Creates a PostgreSQL connection pool
///
/// Establishes a pool of database connections for efficient reuse.
/// The pool automatically manages connection lifecycle and limits.
pub async fn create_pool(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// Applies the bundled schema migrations
pub async fn run_migrations(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

#[derive(sqlx::FromRow)]
struct WatchlistRow {
    user_id: Uuid,
    content_id: i64,
    content_kind: String,
    title: String,
    poster_url: String,
    added_at: DateTime<Utc>,
}

impl TryFrom<WatchlistRow> for WatchlistEntry {
    type Error = AppError;

    fn try_from(row: WatchlistRow) -> Result<Self, Self::Error> {
        Ok(WatchlistEntry {
            user_id: row.user_id,
            content_id: ContentId(row.content_id),
            content_kind: row.content_kind.parse::<ContentKind>()?,
            title: row.title,
            poster_url: row.poster_url,
            added_at: row.added_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct HistoryRow {
    user_id: Uuid,
    content_id: i64,
    content_kind: String,
    title: String,
    poster_url: String,
    progress_percent: i16,
    watched_minutes: i32,
    watched_at: DateTime<Utc>,
    completed: bool,
}

impl TryFrom<HistoryRow> for HistoryEntry {
    type Error = AppError;

    fn try_from(row: HistoryRow) -> Result<Self, Self::Error> {
        Ok(HistoryEntry {
            user_id: row.user_id,
            content_id: ContentId(row.content_id),
            content_kind: row.content_kind.parse::<ContentKind>()?,
            title: row.title,
            poster_url: row.poster_url,
            progress_percent: row.progress_percent.clamp(0, 100) as u8,
            watched_minutes: row.watched_minutes.max(0) as u32,
            watched_at: row.watched_at,
            completed: row.completed,
        })
    }
}

/// Data store backed by the Supabase project's Postgres database
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DataStore for PostgresStore {
    async fn find_profile(&self, user_id: Uuid) -> AppResult<Option<UserProfile>> {
        let profile = sqlx::query_as::<_, UserProfile>(
            r#"
            SELECT id, username, email, birth_date, phone, role, created_at
            FROM user_profiles
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }

    async fn insert_profile(&self, profile: &UserProfile) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO user_profiles (id, username, email, birth_date, phone, role, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(profile.id)
        .bind(&profile.username)
        .bind(&profile.email)
        .bind(profile.birth_date)
        .bind(&profile.phone)
        .bind(&profile.role)
        .bind(profile.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_watchlist(&self, user_id: Uuid) -> AppResult<Vec<WatchlistEntry>> {
        let rows = sqlx::query_as::<_, WatchlistRow>(
            r#"
            SELECT user_id, content_id, content_kind, title, poster_url, added_at
            FROM watchlist_entries
            WHERE user_id = $1
            ORDER BY added_at
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(WatchlistEntry::try_from).collect()
    }

    async fn insert_watchlist_entry(&self, entry: &WatchlistEntry) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO watchlist_entries (user_id, content_id, content_kind, title, poster_url, added_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(entry.user_id)
        .bind(entry.content_id.0)
        .bind(entry.content_kind.as_str())
        .bind(&entry.title)
        .bind(&entry.poster_url)
        .bind(entry.added_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_watchlist_entry(
        &self,
        user_id: Uuid,
        content_id: ContentId,
    ) -> AppResult<()> {
        sqlx::query("DELETE FROM watchlist_entries WHERE user_id = $1 AND content_id = $2")
            .bind(user_id)
            .bind(content_id.0)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn list_history(&self, user_id: Uuid) -> AppResult<Vec<HistoryEntry>> {
        let rows = sqlx::query_as::<_, HistoryRow>(
            r#"
            SELECT user_id, content_id, content_kind, title, poster_url,
                   progress_percent, watched_minutes, watched_at, completed
            FROM history_entries
            WHERE user_id = $1
            ORDER BY watched_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(HistoryEntry::try_from).collect()
    }

    async fn upsert_history_entry(&self, entry: &HistoryEntry) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO history_entries
                (user_id, content_id, content_kind, title, poster_url,
                 progress_percent, watched_minutes, watched_at, completed)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (user_id, content_id) DO UPDATE SET
                content_kind = EXCLUDED.content_kind,
                title = EXCLUDED.title,
                poster_url = EXCLUDED.poster_url,
                progress_percent = EXCLUDED.progress_percent,
                watched_minutes = EXCLUDED.watched_minutes,
                watched_at = EXCLUDED.watched_at,
                completed = EXCLUDED.completed
            "#,
        )
        .bind(entry.user_id)
        .bind(entry.content_id.0)
        .bind(entry.content_kind.as_str())
        .bind(&entry.title)
        .bind(&entry.poster_url)
        .bind(entry.progress_percent as i16)
        .bind(i32::try_from(entry.watched_minutes).unwrap_or(i32::MAX))
        .bind(entry.watched_at)
        .bind(entry.completed)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update_history_progress(
        &self,
        user_id: Uuid,
        content_id: ContentId,
        patch: &ProgressPatch,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE history_entries SET
                progress_percent = $3,
                watched_minutes = COALESCE($4, watched_minutes),
                completed = COALESCE($5, completed),
                watched_at = $6
            WHERE user_id = $1 AND content_id = $2
            "#,
        )
        .bind(user_id)
        .bind(content_id.0)
        .bind(patch.progress_percent as i16)
        .bind(patch.watched_minutes.map(|m| i32::try_from(m).unwrap_or(i32::MAX)))
        .bind(patch.completed)
        .bind(patch.watched_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    fn name(&self) -> &'static str {
        "postgres"
    }
}
