//! Scrape the catalog and load the result into the store.

use std::path::PathBuf;

use anyhow::Context;
use shelf_db::{BookStore, NewBook};
use shelf_scraper::{BookRecord, PageSource, Scraper};
use time::Date;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedReport {
    pub scraped: usize,
    pub inserted: usize,
    pub skipped: usize,
    pub output_path: PathBuf,
}

fn new_book(record: &BookRecord) -> NewBook {
    NewBook {
        title: record.title.clone(),
        stars: record.stars.map(i64::from),
        category: record.category.clone(),
        image: record.image.clone(),
        upc: record.upc.clone(),
        product_type: record.product_type.clone(),
        price_excl_tax: record.price_excl_tax,
        price_incl_tax: record.price_incl_tax,
        tax: record.tax,
        availability: record.availability.clone(),
        number_of_reviews: record.number_of_reviews,
        in_stock: record.in_stock,
    }
}

/// Run a scrape of `pages` index pages and insert every book not stored yet.
///
/// The CSV named after `date` is written by the scrape before anything
/// touches the database and stays in place if the insert fails.
pub async fn seed<S: PageSource>(
    scraper: &Scraper<S>,
    store: &BookStore,
    pages: u32,
    date: Date,
) -> anyhow::Result<SeedReport> {
    let output = scraper
        .run_dated(pages, date)
        .await
        .context("scrape failed")?;

    if output.records.is_empty() {
        tracing::warn!(pages, "scrape found no books; nothing to seed");
        return Ok(SeedReport {
            scraped: 0,
            inserted: 0,
            skipped: 0,
            output_path: output.output_path,
        });
    }

    let books: Vec<NewBook> = output.records.iter().map(new_book).collect();
    let counts = store.insert_new(&books).await.context("seeding failed")?;

    tracing::info!(
        scraped = books.len(),
        inserted = counts.inserted,
        skipped = counts.skipped,
        "seeding complete"
    );

    Ok(SeedReport {
        scraped: books.len(),
        inserted: counts.inserted,
        skipped: counts.skipped,
        output_path: output.output_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelf_db::Database;
    use shelf_kernel::Migration;
    use shelf_scraper::MemoryPageSource;
    use time::Month;

    const BASE: &str = "https://books.example/catalogue/";

    fn index(links: &[&str]) -> String {
        let items: String = links
            .iter()
            .map(|l| {
                format!(r#"<li class="col-xs-6 col-sm-4 col-md-3 col-lg-3"><h3><a href="{l}">x</a></h3></li>"#)
            })
            .collect();
        format!("<html><body><ol>{items}</ol></body></html>")
    }

    fn detail(title: &str, stars: &str, upc: &str) -> String {
        format!(
            r#"<html><head><title>{title}</title></head><body>
            <ul class="breadcrumb"><li><a href="/">Home</a></li><li><a href="b">Books</a></li>
            <li><a href="c">Poetry</a></li><li class="active">{title}</li></ul>
            <img src="../../media/{upc}.jpg">
            <p class="star-rating {stars}"></p>
            <table class="table table-striped">
              <tr><th>UPC</th><td>{upc}</td></tr>
              <tr><th>Product Type</th><td>Books</td></tr>
              <tr><th>Price (excl. tax)</th><td>£51.77</td></tr>
              <tr><th>Price (incl. tax)</th><td>£51.77</td></tr>
              <tr><th>Tax</th><td>£0.00</td></tr>
              <tr><th>Availability</th><td>In stock (22 available)</td></tr>
              <tr><th>Number of reviews</th><td>0</td></tr>
            </table></body></html>"#
        )
    }

    fn catalog() -> MemoryPageSource {
        MemoryPageSource::new()
            .with_page(
                format!("{BASE}page-1.html"),
                index(&["attic_1/index.html", "velvet_2/index.html"]),
            )
            .with_page(
                format!("{BASE}attic_1/index.html"),
                detail("A Light in the Attic", "Three", "a897fe39b1053632"),
            )
            .with_page(
                format!("{BASE}velvet_2/index.html"),
                detail("Tipping the Velvet", "Zero", "90fa61229261140a"),
            )
    }

    async fn store() -> BookStore {
        let db = Database::in_memory().await.unwrap();
        let migrations = vec![(
            "books".to_string(),
            Migration {
                id: "001_books",
                up: shelf_db::schema::BOOKS,
            },
        )];
        db.run_migrations(&migrations).await.unwrap();
        db.books()
    }

    fn date() -> Date {
        Date::from_calendar_date(2025, Month::June, 2).unwrap()
    }

    fn scratch_dir() -> PathBuf {
        std::env::temp_dir().join(format!("shelf-seed-{}", uuid::Uuid::new_v4()))
    }

    #[tokio::test]
    async fn seeding_twice_inserts_each_upc_once() {
        let dir = scratch_dir();
        let scraper = Scraper::new(catalog(), BASE, &dir).unwrap();
        let store = store().await;

        let first = seed(&scraper, &store, 1, date()).await.unwrap();
        let second = seed(&scraper, &store, 1, date()).await.unwrap();

        assert_eq!((first.scraped, first.inserted, first.skipped), (2, 2, 0));
        assert_eq!((second.scraped, second.inserted, second.skipped), (2, 0, 2));
        assert_eq!(first.output_path, dir.join("books_2025-06-02.csv"));
        assert!(first.output_path.exists());

        let books = store.list().await.unwrap();
        assert_eq!(books.len(), 2);
        assert_eq!(books[0].stars, Some(3));
        assert_eq!(books[1].stars, None);
        assert_eq!(books[0].in_stock, 22);

        std::fs::remove_dir_all(dir).ok();
    }

    #[tokio::test]
    async fn empty_catalog_seeds_nothing() {
        let dir = scratch_dir();
        let source = MemoryPageSource::new().with_page(format!("{BASE}page-1.html"), index(&[]));
        let scraper = Scraper::new(source, BASE, &dir).unwrap();
        let store = store().await;

        let report = seed(&scraper, &store, 1, date()).await.unwrap();

        assert_eq!(report.scraped, 0);
        assert_eq!(report.inserted, 0);
        assert!(store.list().await.unwrap().is_empty());

        std::fs::remove_dir_all(dir).ok();
    }

    #[tokio::test]
    async fn store_failure_keeps_the_audit_file() {
        let dir = scratch_dir();
        let scraper = Scraper::new(catalog(), BASE, &dir).unwrap();
        // never migrated
        let store = Database::in_memory().await.unwrap().books();

        let result = seed(&scraper, &store, 1, date()).await;

        assert!(result.is_err());
        let written: Vec<_> = std::fs::read_dir(&dir).unwrap().collect();
        assert_eq!(written.len(), 1);

        std::fs::remove_dir_all(dir).ok();
    }
}
