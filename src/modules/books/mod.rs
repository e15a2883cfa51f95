pub mod models;

use async_trait::async_trait;
use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::json;
use shelf_db::{schema, Book, BookStore};
use shelf_http::{
    error::AppError,
    extract::{PathParam, QueryParams},
};
use shelf_kernel::{InitCtx, Migration, Module};

use models::{HealthStatus, SearchParams};

/// Read-only catalog endpoints over the scraped books table
pub struct BooksModule {
    store: BookStore,
}

impl BooksModule {
    pub fn new(store: BookStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/books", get(list_books))
            .route("/books/search", get(search_books))
            .route("/books/{id}", get(get_book))
            .route("/categories", get(list_categories))
            .route("/health", get(health_check))
            .with_state(self.store.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let error = json!({
            "content": {
                "application/json": {
                    "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                }
            }
        });
        let book_list = json!({
            "application/json": {
                "schema": {
                    "type": "array",
                    "items": { "$ref": "#/components/schemas/Book" }
                }
            }
        });

        Some(json!({
            "paths": {
                "/books": {
                    "get": {
                        "summary": "List books",
                        "tags": ["Books"],
                        "responses": {
                            "200": { "description": "Every stored book", "content": book_list },
                            "500": error_response("Internal server error", &error)
                        }
                    }
                },
                "/books/{id}": {
                    "get": {
                        "summary": "Get a book by id",
                        "tags": ["Books"],
                        "parameters": [{
                            "name": "id",
                            "in": "path",
                            "required": true,
                            "schema": { "type": "integer" }
                        }],
                        "responses": {
                            "200": {
                                "description": "The book",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/Book" }
                                    }
                                }
                            },
                            "404": error_response("Book not found", &error)
                        }
                    }
                },
                "/books/search": {
                    "get": {
                        "summary": "Search books by title and/or category",
                        "description": "Case-insensitive substring match. At least one parameter is required.",
                        "tags": ["Books"],
                        "parameters": [
                            { "name": "title", "in": "query", "schema": { "type": "string" } },
                            { "name": "category", "in": "query", "schema": { "type": "string" } }
                        ],
                        "responses": {
                            "200": { "description": "Matching books, possibly none", "content": book_list },
                            "400": error_response("No search parameter given", &error)
                        }
                    }
                },
                "/categories": {
                    "get": {
                        "summary": "List distinct categories",
                        "tags": ["Books"],
                        "responses": {
                            "200": {
                                "description": "Sorted category names",
                                "content": {
                                    "application/json": {
                                        "schema": { "type": "array", "items": { "type": "string" } }
                                    }
                                }
                            }
                        }
                    }
                },
                "/health": {
                    "get": {
                        "summary": "Database connectivity check",
                        "tags": ["Health"],
                        "responses": {
                            "200": {
                                "description": "Database reachable",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/HealthStatus" }
                                    }
                                }
                            },
                            "500": {
                                "description": "Database unreachable",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/HealthStatus" }
                                    }
                                }
                            }
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Book": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer" },
                            "title": { "type": "string" },
                            "stars": { "type": ["integer", "null"], "minimum": 1, "maximum": 5 },
                            "category": { "type": "string" },
                            "image": { "type": "string" },
                            "upc": { "type": "string" },
                            "product_type": { "type": "string" },
                            "price_excl_tax": { "type": "number" },
                            "price_incl_tax": { "type": "number" },
                            "tax": { "type": "number" },
                            "availability": { "type": "string" },
                            "number_of_reviews": { "type": "integer" },
                            "in_stock": { "type": "integer" }
                        },
                        "required": [
                            "id", "title", "category", "image", "upc", "product_type",
                            "price_excl_tax", "price_incl_tax", "tax", "availability",
                            "number_of_reviews", "in_stock"
                        ]
                    },
                    "HealthStatus": {
                        "type": "object",
                        "properties": {
                            "status": { "type": "string", "enum": ["ok", "degraded"] },
                            "database": { "type": "string", "enum": ["connected", "unreachable"] }
                        },
                        "required": ["status", "database"]
                    }
                }
            }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![Migration {
            id: "001_books",
            up: schema::BOOKS,
        }]
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

fn error_response(description: &str, error: &serde_json::Value) -> serde_json::Value {
    let mut response = error.clone();
    response["description"] = json!(description);
    response
}

async fn list_books(State(store): State<BookStore>) -> Result<Json<Vec<Book>>, AppError> {
    Ok(Json(store.list().await?))
}

async fn get_book(
    State(store): State<BookStore>,
    PathParam(id): PathParam<i64>,
) -> Result<Json<Book>, AppError> {
    store
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found(format!("book {} not found", id)))
}

async fn search_books(
    State(store): State<BookStore>,
    QueryParams(params): QueryParams<SearchParams>,
) -> Result<Json<Vec<Book>>, AppError> {
    let query = params.into_query();
    if query.is_empty() {
        return Err(AppError::bad_request(
            "provide at least one of 'title' or 'category'",
        ));
    }

    Ok(Json(store.search(&query).await?))
}

async fn list_categories(State(store): State<BookStore>) -> Result<Json<Vec<String>>, AppError> {
    Ok(Json(store.categories().await?))
}

/// Reports connectivity as a status flag rather than an error body
async fn health_check(State(store): State<BookStore>) -> (StatusCode, Json<HealthStatus>) {
    match store.ping().await {
        Ok(()) => (StatusCode::OK, Json(HealthStatus::CONNECTED)),
        Err(e) => {
            tracing::error!(error = ?e, "health check failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(HealthStatus::UNREACHABLE),
            )
        }
    }
}
