pub mod models;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use shelf_authz::{
    password::{hash_password, verify_password},
    AuthUser, JwtService,
};
use shelf_db::{schema, UserStore};
use shelf_http::{error::AppError, extract::JsonBody};
use shelf_kernel::{InitCtx, Migration, Module};

use models::{Credentials, Message, TokenResponse};

/// State shared by the auth handlers.
#[derive(Clone)]
pub struct AuthState {
    pub users: UserStore,
    pub jwt: Arc<JwtService>,
}

impl FromRef<AuthState> for Arc<JwtService> {
    fn from_ref(state: &AuthState) -> Self {
        state.jwt.clone()
    }
}

/// Registration, login and the token-gated echo route
pub struct AuthModule {
    state: AuthState,
}

impl AuthModule {
    pub fn new(users: UserStore, jwt: Arc<JwtService>) -> Self {
        Self {
            state: AuthState { users, jwt },
        }
    }
}

#[async_trait]
impl Module for AuthModule {
    fn name(&self) -> &'static str {
        "auth"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            issuer = %ctx.settings.auth.issuer,
            token_ttl_minutes = ctx.settings.auth.token_ttl_minutes,
            "auth module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/register", post(register))
            .route("/login", post(login))
            .route("/protected", get(protected))
            .with_state(self.state.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let credentials = json!({
            "required": true,
            "content": {
                "application/json": {
                    "schema": { "$ref": "#/components/schemas/Credentials" }
                }
            }
        });
        let message = json!({
            "application/json": {
                "schema": { "$ref": "#/components/schemas/Message" }
            }
        });
        let error = json!({
            "application/json": {
                "schema": { "$ref": "#/components/schemas/ErrorResponse" }
            }
        });

        Some(json!({
            "paths": {
                "/register": {
                    "post": {
                        "summary": "Register a user",
                        "tags": ["Auth"],
                        "requestBody": credentials,
                        "responses": {
                            "201": { "description": "User created", "content": message },
                            "409": { "description": "Username already exists", "content": error },
                            "422": { "description": "Blank username or password", "content": error }
                        }
                    }
                },
                "/login": {
                    "post": {
                        "summary": "Exchange credentials for an access token",
                        "tags": ["Auth"],
                        "requestBody": credentials,
                        "responses": {
                            "200": {
                                "description": "Access token",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/TokenResponse" }
                                    }
                                }
                            },
                            "401": { "description": "Invalid credentials", "content": error }
                        }
                    }
                },
                "/protected": {
                    "get": {
                        "summary": "Echo the authenticated user",
                        "tags": ["Auth"],
                        "security": [{ "bearerAuth": [] }],
                        "responses": {
                            "200": { "description": "Authenticated", "content": message },
                            "401": { "description": "Missing or invalid token", "content": error }
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Credentials": {
                        "type": "object",
                        "properties": {
                            "username": { "type": "string" },
                            "password": { "type": "string", "format": "password" }
                        },
                        "required": ["username", "password"]
                    },
                    "Message": {
                        "type": "object",
                        "properties": { "msg": { "type": "string" } },
                        "required": ["msg"]
                    },
                    "TokenResponse": {
                        "type": "object",
                        "properties": {
                            "access_token": { "type": "string" },
                            "token_type": { "type": "string", "enum": ["Bearer"] }
                        },
                        "required": ["access_token", "token_type"]
                    }
                }
            }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![Migration {
            id: "001_users",
            up: schema::USERS,
        }]
    }
}

async fn register(
    State(state): State<AuthState>,
    JsonBody(credentials): JsonBody<Credentials>,
) -> Result<(StatusCode, Json<Message>), AppError> {
    let problems = credentials.problems();
    if !problems.is_empty() {
        return Err(AppError::validation(
            problems,
            "username and password are required",
        ));
    }

    let username = credentials.username.trim();
    let password_hash = hash_password(&credentials.password)?;

    match state.users.create(username, &password_hash).await? {
        Some(user) => {
            tracing::info!(user_id = user.id, username = %user.username, "user registered");
            Ok((
                StatusCode::CREATED,
                Json(Message::new("User created successfully")),
            ))
        }
        None => Err(AppError::conflict(
            vec![json!({"field": "username", "error": "taken"})],
            "username already exists",
        )),
    }
}

async fn login(
    State(state): State<AuthState>,
    JsonBody(credentials): JsonBody<Credentials>,
) -> Result<Json<TokenResponse>, AppError> {
    let user = state
        .users
        .find_by_username(credentials.username.trim())
        .await?
        .filter(|user| verify_password(&credentials.password, &user.password_hash))
        .ok_or_else(|| AppError::unauthorized("invalid credentials"))?;

    let token = state.jwt.create_token(user.id, &user.username)?;
    tracing::info!(user_id = user.id, "access token issued");

    Ok(Json(TokenResponse::bearer(token)))
}

async fn protected(user: AuthUser) -> Json<Message> {
    Json(Message::new(format!("Logged in as user {}", user.user_id)))
}
