//! SQLite persistence for the catalog.
//!
//! [`Database`] owns the connection pool and executes the migrations the
//! module registry collects. [`BookStore`] and [`UserStore`] are cheap handles
//! over the same pool.

use std::str::FromStr;

use anyhow::Context;
use shelf_kernel::settings::DatabaseSettings;
use shelf_kernel::Migration;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

pub mod books;
pub mod schema;
pub mod users;

pub use books::{Book, BookQuery, BookStore, NewBook, SeedCounts};
pub use users::{User, UserStore};

/// Shared connection pool.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connect using the configured URL, creating the database file (and its
    /// directory) when missing.
    pub async fn connect(settings: &DatabaseSettings) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(&settings.url)
            .with_context(|| format!("invalid database url '{}'", settings.url))?
            .create_if_missing(true);

        let in_memory = settings.url.contains(":memory:");
        if !in_memory {
            if let Some(parent) = options.get_filename().parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent).with_context(|| {
                        format!("failed to create database directory {}", parent.display())
                    })?;
                }
            }
        }

        // An in-memory database lives only as long as a connection holds it.
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(settings.max_connections)
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .with_context(|| format!("failed to connect to {}", settings.url))?;

        tracing::info!(target: "shelf-db", url = %settings.url, "database connected");
        Ok(Self { pool })
    }

    /// Fresh private in-memory database.
    pub async fn in_memory() -> anyhow::Result<Self> {
        Self::connect(&DatabaseSettings {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
        })
        .await
    }

    /// Execute module migrations in the given order. Statements are
    /// idempotent, so this runs on every start.
    pub async fn run_migrations(&self, migrations: &[(String, Migration)]) -> anyhow::Result<()> {
        for (module, migration) in migrations {
            tracing::info!(
                target: "shelf-db",
                module = %module,
                migration = migration.id,
                "applying migration"
            );

            sqlx::raw_sql(migration.up)
                .execute(&self.pool)
                .await
                .with_context(|| {
                    format!("migration {}/{} failed", module, migration.id)
                })?;
        }

        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn books(&self) -> BookStore {
        BookStore::new(self.pool.clone())
    }

    pub fn users(&self) -> UserStore {
        UserStore::new(self.pool.clone())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// In-memory database with the full schema applied.
    pub async fn migrated() -> Database {
        let db = Database::in_memory().await.unwrap();
        let migrations = vec![
            (
                "auth".to_string(),
                Migration {
                    id: "001_users",
                    up: schema::USERS,
                },
            ),
            (
                "books".to_string(),
                Migration {
                    id: "001_books",
                    up: schema::BOOKS,
                },
            ),
        ];
        db.run_migrations(&migrations).await.unwrap();
        db
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn migrations_are_idempotent() {
        let db = testing::migrated().await;
        let again = vec![(
            "books".to_string(),
            Migration {
                id: "001_books",
                up: schema::BOOKS,
            },
        )];
        db.run_migrations(&again).await.unwrap();
        db.books().ping().await.unwrap();
    }

    #[tokio::test]
    async fn ping_fails_without_schema() {
        let db = Database::in_memory().await.unwrap();
        assert!(db.books().ping().await.is_err());
    }
}
