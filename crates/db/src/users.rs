use anyhow::Context;
use sqlx::{FromRow, SqlitePool};

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
}

#[derive(Clone)]
pub struct UserStore {
    pool: SqlitePool,
}

impl UserStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a user. Returns `None` when the username is already taken.
    pub async fn create(&self, username: &str, password_hash: &str) -> anyhow::Result<Option<User>> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (username, password_hash) VALUES (?1, ?2) \
             ON CONFLICT(username) DO NOTHING \
             RETURNING id, username, password_hash",
        )
        .bind(username)
        .bind(password_hash)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("failed to create user {}", username))
    }

    pub async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<User>> {
        sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash FROM users WHERE username = ?1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("failed to look up user {}", username))
    }
}
