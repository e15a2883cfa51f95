use serde::Serialize;

/// A normalized catalog item, as written to the audit file and seeded into
/// the store.
///
/// Field order is the column order of the output file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookRecord {
    pub title: String,
    /// `None` when the rating word was not one of `One`..`Five`.
    pub stars: Option<u8>,
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
    /// Product-table rows with no target field, under their page labels.
    #[serde(skip)]
    pub extra: Vec<(String, String)>,
}

/// Header row of the output file.
pub const RECORD_COLUMNS: [&str; 12] = [
    "title",
    "stars",
    "category",
    "image",
    "upc",
    "product_type",
    "price_excl_tax",
    "price_incl_tax",
    "tax",
    "availability",
    "number_of_reviews",
    "in_stock",
];
