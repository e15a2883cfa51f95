//! Table definitions contributed to the registry as module migrations.

pub const BOOKS: &str = r#"
CREATE TABLE IF NOT EXISTS books (
    id                INTEGER PRIMARY KEY AUTOINCREMENT,
    title             TEXT    NOT NULL,
    stars             INTEGER,
    category          TEXT    NOT NULL,
    image             TEXT    NOT NULL,
    upc               TEXT    NOT NULL,
    product_type      TEXT    NOT NULL,
    price_excl_tax    REAL    NOT NULL,
    price_incl_tax    REAL    NOT NULL,
    tax               REAL    NOT NULL,
    availability      TEXT    NOT NULL,
    number_of_reviews INTEGER NOT NULL,
    in_stock          INTEGER NOT NULL
);
CREATE UNIQUE INDEX IF NOT EXISTS books_upc_unique ON books(upc);
CREATE INDEX IF NOT EXISTS books_category ON books(category);
"#;

pub const USERS: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    username      TEXT NOT NULL,
    password_hash TEXT NOT NULL,
    created_at    TEXT NOT NULL DEFAULT (datetime('now'))
);
CREATE UNIQUE INDEX IF NOT EXISTS users_username_unique ON users(username);
"#;
