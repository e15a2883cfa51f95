//! Normalization: raw string mappings become typed [`BookRecord`]s.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Result, ScrapeError};
use crate::extract::RawBook;
use crate::record::BookRecord;

/// Product-table labels and the record fields they land in.
pub const FIELD_RENAMES: &[(&str, &str)] = &[
    ("UPC", "upc"),
    ("Product Type", "product_type"),
    ("Price (excl. tax)", "price_excl_tax"),
    ("Price (incl. tax)", "price_incl_tax"),
    ("Tax", "tax"),
    ("Availability", "availability"),
    ("Number of reviews", "number_of_reviews"),
];

/// Rating words as they appear in the rating marker's class list.
pub const STAR_WORDS: &[(&str, u8)] = &[
    ("One", 1),
    ("Two", 2),
    ("Three", 3),
    ("Four", 4),
    ("Five", 5),
];

const CURRENCY_SYMBOL: char = '£';

static DIGIT_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("valid digit regex"));
static BEFORE_PAREN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.*?)\s*\(").expect("valid availability regex"));

pub fn rename_key(key: &str) -> &str {
    FIELD_RENAMES
        .iter()
        .find(|(from, _)| *from == key)
        .map(|(_, to)| *to)
        .unwrap_or(key)
}

pub fn star_rating(word: &str) -> Option<u8> {
    STAR_WORDS
        .iter()
        .find(|(name, _)| *name == word)
        .map(|(_, stars)| *stars)
}

/// Stock count from text such as `In stock (22 available)`.
pub fn parse_in_stock(url: &str, availability: &str) -> Result<i64> {
    let digits = DIGIT_RUN
        .find(availability)
        .ok_or_else(|| ScrapeError::parse(url, "in_stock", availability, "no digits found"))?;
    digits
        .as_str()
        .parse()
        .map_err(|e| ScrapeError::parse(url, "in_stock", availability, e))
}

/// Availability text with its parenthesised stock count removed.
pub fn strip_stock_count(url: &str, availability: &str) -> Result<String> {
    BEFORE_PAREN
        .captures(availability)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim_start().to_string())
        .ok_or_else(|| ScrapeError::parse(url, "availability", availability, "no parenthesis found"))
}

pub fn parse_price(url: &str, field: &'static str, text: &str) -> Result<f64> {
    text.trim()
        .trim_start_matches(CURRENCY_SYMBOL)
        .parse()
        .map_err(|e| ScrapeError::parse(url, field, text, e))
}

fn parse_count(url: &str, field: &'static str, text: &str) -> Result<i64> {
    text.trim()
        .parse()
        .map_err(|e| ScrapeError::parse(url, field, text, e))
}

struct Fields<'a> {
    url: &'a str,
    map: BTreeMap<String, String>,
}

impl Fields<'_> {
    fn take(&mut self, field: &'static str) -> Result<String> {
        self.map.remove(field).ok_or_else(|| ScrapeError::MissingField {
            url: self.url.to_string(),
            field,
        })
    }
}

/// Normalize one raw mapping into a typed record.
pub fn normalize_book(raw: RawBook) -> Result<BookRecord> {
    let url = raw.url.as_str();
    let map = raw
        .fields
        .iter()
        .map(|(key, value)| (rename_key(key).to_string(), value.clone()))
        .collect();
    let mut fields = Fields { url, map };

    let availability_text = fields.take("availability")?;
    let in_stock = parse_in_stock(url, &availability_text)?;
    let availability = strip_stock_count(url, &availability_text)?;

    let stars_word = fields.take("stars")?;
    let stars = star_rating(&stars_word);
    if stars.is_none() {
        tracing::warn!(url, token = %stars_word, "unrecognized star rating");
    }

    let price_excl_tax = parse_price(url, "price_excl_tax", &fields.take("price_excl_tax")?)?;
    let price_incl_tax = parse_price(url, "price_incl_tax", &fields.take("price_incl_tax")?)?;
    let tax = parse_price(url, "tax", &fields.take("tax")?)?;
    let number_of_reviews =
        parse_count(url, "number_of_reviews", &fields.take("number_of_reviews")?)?;

    let record = BookRecord {
        title: fields.take("title")?,
        stars,
        category: fields.take("category")?,
        image: fields.take("image")?,
        upc: fields.take("upc")?,
        product_type: fields.take("product_type")?,
        price_excl_tax,
        price_incl_tax,
        tax,
        availability,
        number_of_reviews,
        in_stock,
        extra: fields.map.into_iter().collect(),
    };

    Ok(record)
}

/// Normalize the whole collected set. The first malformed item aborts.
pub fn normalize(raw: Vec<RawBook>) -> Result<Vec<BookRecord>> {
    raw.into_iter().map(normalize_book).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(overrides: &[(&str, &str)]) -> RawBook {
        let mut fields: Vec<(String, String)> = [
            ("title", "Sharp Objects"),
            ("stars", "Four"),
            ("category", "Mystery"),
            ("image", "../../media/cache/32/51/3251.jpg"),
            ("UPC", "e00eb4fd7b871a48"),
            ("Product Type", "Books"),
            ("Price (excl. tax)", "£47.82"),
            ("Price (incl. tax)", "£47.82"),
            ("Tax", "£0.00"),
            ("Availability", "In stock (20 available)"),
            ("Number of reviews", "0"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        for (key, value) in overrides {
            match fields.iter_mut().find(|(k, _)| k == key) {
                Some(field) => field.1 = value.to_string(),
                None => fields.push((key.to_string(), value.to_string())),
            }
        }

        RawBook {
            url: "https://books.example/catalogue/sharp-objects_997/index.html".to_string(),
            fields,
        }
    }

    #[test]
    fn star_words_map_to_one_through_five() {
        for (word, expected) in [("One", 1), ("Two", 2), ("Three", 3), ("Four", 4), ("Five", 5)] {
            assert_eq!(star_rating(word), Some(expected));
        }
        assert_eq!(star_rating("Zero"), None);
        assert_eq!(star_rating("three"), None);
    }

    #[test]
    fn availability_splits_into_text_and_count() {
        assert_eq!(parse_in_stock("u", "In stock (22 available)").unwrap(), 22);
        assert_eq!(
            strip_stock_count("u", "In stock (22 available)").unwrap(),
            "In stock"
        );
    }

    #[test]
    fn availability_without_count_fails() {
        assert!(matches!(
            parse_in_stock("u", "Out of stock"),
            Err(ScrapeError::Parse { field: "in_stock", .. })
        ));
        assert!(matches!(
            strip_stock_count("u", "In stock 22 available"),
            Err(ScrapeError::Parse { field: "availability", .. })
        ));
    }

    #[test]
    fn prices_drop_the_currency_symbol() {
        assert_eq!(parse_price("u", "price_excl_tax", "£51.77").unwrap(), 51.77);
        assert_eq!(parse_price("u", "tax", "£0.00").unwrap(), 0.0);
        assert!(parse_price("u", "tax", "$1.00").is_err());
    }

    #[test]
    fn normalizes_a_full_record() {
        let record = normalize_book(raw(&[])).unwrap();

        assert_eq!(record.title, "Sharp Objects");
        assert_eq!(record.stars, Some(4));
        assert_eq!(record.upc, "e00eb4fd7b871a48");
        assert_eq!(record.product_type, "Books");
        assert_eq!(record.price_excl_tax, 47.82);
        assert_eq!(record.availability, "In stock");
        assert_eq!(record.in_stock, 20);
        assert_eq!(record.number_of_reviews, 0);
        assert!(record.extra.is_empty());
    }

    #[test]
    fn unknown_star_word_leaves_rating_unset() {
        let record = normalize_book(raw(&[("stars", "Six")])).unwrap();
        assert_eq!(record.stars, None);
    }

    #[test]
    fn unmapped_table_rows_pass_through() {
        let record = normalize_book(raw(&[("Format", "Paperback")])).unwrap();
        assert_eq!(
            record.extra,
            vec![("Format".to_string(), "Paperback".to_string())]
        );
    }

    #[test]
    fn non_numeric_review_count_fails() {
        assert!(matches!(
            normalize_book(raw(&[("Number of reviews", "many")])),
            Err(ScrapeError::Parse { field: "number_of_reviews", .. })
        ));
    }

    #[test]
    fn missing_upc_row_fails() {
        let mut book = raw(&[]);
        book.fields.retain(|(k, _)| k != "UPC");
        assert!(matches!(
            normalize_book(book),
            Err(ScrapeError::MissingField { field: "upc", .. })
        ));
    }

    #[test]
    fn one_malformed_item_aborts_the_batch() {
        let batch = vec![raw(&[]), raw(&[("Tax", "free")]), raw(&[])];
        assert!(normalize(batch).is_err());
    }
}
