use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use shelf_http::error::AppError;

use crate::jwt::JwtService;

/// Authenticated caller, resolved from an `Authorization: Bearer` header.
///
/// Handlers that take an `AuthUser` reject unauthenticated requests with 401.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: i64,
    pub username: String,
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Resolve the caller from request headers.
pub fn authenticate(headers: &HeaderMap, jwt: &JwtService) -> Result<AuthUser, AppError> {
    let token = bearer_token(headers)
        .ok_or_else(|| AppError::unauthorized("missing or malformed bearer token"))?;

    let claims = jwt.verify_token(token).map_err(|e| {
        tracing::debug!(error = %e, "rejected access token");
        AppError::unauthorized("invalid or expired token")
    })?;

    let user_id = claims
        .user_id()
        .ok_or_else(|| AppError::unauthorized("invalid token subject"))?;

    Ok(AuthUser {
        user_id,
        username: claims.username,
    })
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    Arc<JwtService>: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jwt = Arc::<JwtService>::from_ref(state);
        authenticate(&parts.headers, &jwt)
    }
}
