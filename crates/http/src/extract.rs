//! Request extractors whose rejections use the standard error body.

use axum::{
    extract::{FromRequest, FromRequestParts, Request},
    http::request::Parts,
};
use serde::de::DeserializeOwned;

use crate::error::AppError;

/// JSON request body. Malformed JSON is a 400, a body that does not match
/// `T` is a 422.
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let axum::Json(value) = axum::Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

/// Typed path parameters; a value that does not parse is a 400.
#[derive(Debug, Clone)]
pub struct PathParam<T>(pub T);

impl<S, T> FromRequestParts<S> for PathParam<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let axum::extract::Path(value) =
            axum::extract::Path::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}

/// Typed query string; a value that does not parse is a 400.
#[derive(Debug, Clone)]
pub struct QueryParams<T>(pub T);

impl<S, T> FromRequestParts<S> for QueryParams<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let axum::extract::Query(value) =
            axum::extract::Query::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{header, StatusCode},
        routing::{get, post},
        Router,
    };
    use serde::Deserialize;
    use tower::ServiceExt;

    #[derive(Deserialize)]
    struct Login {
        username: String,
    }

    fn router() -> Router {
        Router::new()
            .route(
                "/login",
                post(|JsonBody(login): JsonBody<Login>| async move { login.username }),
            )
            .route(
                "/items/{id}",
                get(|PathParam(id): PathParam<i64>| async move { id.to_string() }),
            )
    }

    async fn error_of(request: axum::http::Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = router().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        (status, body["error"].clone())
    }

    fn post_json(body: &str) -> axum::http::Request<Body> {
        axum::http::Request::post("/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn accepts_well_formed_input() {
        let response = router().oneshot(post_json(r#"{"username":"reader"}"#)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = router()
            .oneshot(axum::http::Request::get("/items/7").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn missing_field_is_a_validation_error() {
        let (status, error) = error_of(post_json(r#"{"user":"reader"}"#)).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(error["code"], "validation_error");
        assert!(error["trace_id"].is_string());
    }

    #[tokio::test]
    async fn malformed_json_is_a_bad_request() {
        let (status, error) = error_of(post_json("{not json")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error["code"], "bad_request");
    }

    #[tokio::test]
    async fn missing_content_type_is_unsupported_media_type() {
        let request = axum::http::Request::post("/login")
            .body(Body::from(r#"{"username":"reader"}"#))
            .unwrap();

        let (status, error) = error_of(request).await;

        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(error["code"], "unsupported_media_type");
    }

    #[tokio::test]
    async fn unparsable_path_parameter_is_a_bad_request() {
        let request = axum::http::Request::get("/items/abc").body(Body::empty()).unwrap();

        let (status, error) = error_of(request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error["code"], "bad_request");
    }
}
