use anyhow::Context;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

const BOOK_COLUMNS: &str = "id, title, stars, category, image, upc, product_type, \
     price_excl_tax, price_incl_tax, tax, availability, number_of_reviews, in_stock";

/// A stored catalog row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub stars: Option<i64>,
    pub category: String,
    pub image: String,
    pub upc: String,
    pub product_type: String,
    pub price_excl_tax: f64,
    pub price_incl_tax: f64,
    pub tax: f64,
    pub availability: String,
    pub number_of_reviews: i64,
    pub in_stock: i64,
}

/// A row to insert; the store assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBook {
    pub title: String,
    pub stars: Option<i64>,
    pub category: String,
    pub image: String,
    pub upc: String,
    pub product_type: String,
    pub price_excl_tax: f64,
    pub price_incl_tax: f64,
    pub tax: f64,
    pub availability: String,
    pub number_of_reviews: i64,
    pub in_stock: i64,
}

/// Case-insensitive substring filters, combined with AND. `None` means
/// "don't filter on this field".
#[derive(Debug, Clone, Default)]
pub struct BookQuery {
    pub title: Option<String>,
    pub category: Option<String>,
}

impl BookQuery {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.category.is_none()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedCounts {
    pub inserted: usize,
    pub skipped: usize,
}

#[derive(Clone)]
pub struct BookStore {
    pool: SqlitePool,
}

impl BookStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> anyhow::Result<Vec<Book>> {
        sqlx::query_as::<_, Book>(&format!("SELECT {BOOK_COLUMNS} FROM books ORDER BY id"))
            .fetch_all(&self.pool)
            .await
            .context("failed to list books")
    }

    pub async fn get(&self, id: i64) -> anyhow::Result<Option<Book>> {
        sqlx::query_as::<_, Book>(&format!("SELECT {BOOK_COLUMNS} FROM books WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("failed to load book {}", id))
    }

    pub async fn find_by_upc(&self, upc: &str) -> anyhow::Result<Option<Book>> {
        sqlx::query_as::<_, Book>(&format!("SELECT {BOOK_COLUMNS} FROM books WHERE upc = ?1"))
            .bind(upc)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("failed to look up upc {}", upc))
    }

    pub async fn search(&self, query: &BookQuery) -> anyhow::Result<Vec<Book>> {
        // instr() instead of LIKE so `%` and `_` in user input match literally.
        let sql = format!(
            "SELECT {BOOK_COLUMNS} FROM books \
             WHERE (?1 IS NULL OR instr(lower(title), lower(?1)) > 0) \
               AND (?2 IS NULL OR instr(lower(category), lower(?2)) > 0) \
             ORDER BY id"
        );

        sqlx::query_as::<_, Book>(&sql)
            .bind(query.title.as_deref())
            .bind(query.category.as_deref())
            .fetch_all(&self.pool)
            .await
            .context("failed to search books")
    }

    /// Distinct categories, sorted.
    pub async fn categories(&self) -> anyhow::Result<Vec<String>> {
        sqlx::query_scalar::<_, String>("SELECT DISTINCT category FROM books ORDER BY category")
            .fetch_all(&self.pool)
            .await
            .context("failed to list categories")
    }

    /// Insert every book whose `upc` is not stored yet, in one transaction.
    /// Existing rows are never touched; a failure rolls the whole batch back.
    pub async fn insert_new(&self, books: &[NewBook]) -> anyhow::Result<SeedCounts> {
        let mut tx = self.pool.begin().await.context("failed to open transaction")?;
        let mut counts = SeedCounts::default();

        for book in books {
            let result = sqlx::query(
                "INSERT INTO books (title, stars, category, image, upc, product_type, \
                 price_excl_tax, price_incl_tax, tax, availability, number_of_reviews, in_stock) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12) \
                 ON CONFLICT(upc) DO NOTHING",
            )
            .bind(&book.title)
            .bind(book.stars)
            .bind(&book.category)
            .bind(&book.image)
            .bind(&book.upc)
            .bind(&book.product_type)
            .bind(book.price_excl_tax)
            .bind(book.price_incl_tax)
            .bind(book.tax)
            .bind(&book.availability)
            .bind(book.number_of_reviews)
            .bind(book.in_stock)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("failed to insert book {}", book.upc))?;

            if result.rows_affected() == 0 {
                tracing::debug!(upc = %book.upc, "book already stored, skipping");
                counts.skipped += 1;
            } else {
                counts.inserted += 1;
            }
        }

        tx.commit().await.context("failed to commit seed transaction")?;
        Ok(counts)
    }

    /// Cheap query proving the pool and the `books` table are reachable.
    pub async fn ping(&self) -> anyhow::Result<()> {
        sqlx::query("SELECT id FROM books LIMIT 1")
            .fetch_optional(&self.pool)
            .await
            .context("database ping failed")?;
        Ok(())
    }
}
