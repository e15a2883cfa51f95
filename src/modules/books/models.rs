use serde::{Deserialize, Serialize};
use shelf_db::BookQuery;

/// Query string of `GET /books/search`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchParams {
    pub title: Option<String>,
    pub category: Option<String>,
}

impl SearchParams {
    /// Blank parameters count as absent.
    pub fn into_query(self) -> BookQuery {
        fn present(value: Option<String>) -> Option<String> {
            value.filter(|v| !v.trim().is_empty())
        }

        BookQuery {
            title: present(self.title),
            category: present(self.category),
        }
    }
}

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub database: &'static str,
}

impl HealthStatus {
    pub const CONNECTED: Self = Self {
        status: "ok",
        database: "connected",
    };

    pub const UNREACHABLE: Self = Self {
        status: "degraded",
        database: "unreachable",
    };
}
