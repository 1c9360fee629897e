//! Persistence for session and user records.
//!
//! Both tables have put semantics: a write replaces the whole record.
//! Missing records are `Ok(None)`; errors are transport failures only.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{Connection, PgPool};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{Instrument, info_span};

use super::models::{SessionRecord, User};

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get_session(&self, session_id: &str) -> Result<Option<SessionRecord>>;
    async fn put_session(&self, record: &SessionRecord) -> Result<()>;
    async fn get_user(&self, user_id: &str) -> Result<Option<User>>;
    async fn put_user(&self, user: &User) -> Result<()>;

    /// Cheap liveness probe used by `/health`.
    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

/// `PostgreSQL` backed store (`sql/schema.sql`).
#[derive(Clone, Debug)]
pub struct PgSessionStore {
    pool: PgPool,
}

impl PgSessionStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn get_session(&self, session_id: &str) -> Result<Option<SessionRecord>> {
        let query = r"
            SELECT session_id, user_id, temp_token, temp_secret, token, secret
            FROM sessions
            WHERE session_id = $1
        ";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        sqlx::query_as::<_, SessionRecord>(query)
            .bind(session_id)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("failed to lookup session")
    }

    async fn put_session(&self, record: &SessionRecord) -> Result<()> {
        let query = r"
            INSERT INTO sessions
                (session_id, user_id, temp_token, temp_secret, token, secret)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (session_id) DO UPDATE SET
                user_id = EXCLUDED.user_id,
                temp_token = EXCLUDED.temp_token,
                temp_secret = EXCLUDED.temp_secret,
                token = EXCLUDED.token,
                secret = EXCLUDED.secret,
                updated_at = NOW()
        ";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query
        );
        sqlx::query(query)
            .bind(&record.session_id)
            .bind(&record.user_id)
            .bind(&record.temp_token)
            .bind(&record.temp_secret)
            .bind(&record.token)
            .bind(&record.secret)
            .execute(&self.pool)
            .instrument(span)
            .await
            .context("failed to put session")?;
        Ok(())
    }

    async fn get_user(&self, user_id: &str) -> Result<Option<User>> {
        let query = "SELECT user_id, display_name, avatar_url FROM users WHERE user_id = $1";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        sqlx::query_as::<_, User>(query)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("failed to lookup user")
    }

    async fn put_user(&self, user: &User) -> Result<()> {
        let query = r"
            INSERT INTO users
                (user_id, display_name, avatar_url)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id) DO UPDATE SET
                display_name = EXCLUDED.display_name,
                avatar_url = EXCLUDED.avatar_url,
                updated_at = NOW()
        ";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query
        );
        sqlx::query(query)
            .bind(&user.user_id)
            .bind(&user.display_name)
            .bind(&user.avatar_url)
            .execute(&self.pool)
            .instrument(span)
            .await
            .context("failed to put user")?;
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        let acquire_span = info_span!(
            "db.acquire",
            db.system = "postgresql",
            db.operation = "ACQUIRE"
        );
        let mut conn = self
            .pool
            .acquire()
            .instrument(acquire_span)
            .await
            .context("failed to acquire database connection")?;
        let ping_span = info_span!("db.ping", db.system = "postgresql", db.operation = "PING");
        conn.ping()
            .instrument(ping_span)
            .await
            .context("failed to ping database")
    }
}

/// In-process store for local runs without a database, and for tests.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, SessionRecord>>,
    users: RwLock<HashMap<String, User>>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get_session(&self, session_id: &str) -> Result<Option<SessionRecord>> {
        Ok(self.sessions.read().await.get(session_id).cloned())
    }

    async fn put_session(&self, record: &SessionRecord) -> Result<()> {
        self.sessions
            .write()
            .await
            .insert(record.session_id.clone(), record.clone());
        Ok(())
    }

    async fn get_user(&self, user_id: &str) -> Result<Option<User>> {
        Ok(self.users.read().await.get(user_id).cloned())
    }

    async fn put_user(&self, user: &User) -> Result<()> {
        self.users
            .write()
            .await
            .insert(user.user_id.clone(), user.clone());
        Ok(())
    }
}
