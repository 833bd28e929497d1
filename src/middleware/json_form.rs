use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    http::header::CONTENT_TYPE,
};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::PortfolioError;

/// JSON body that falls back to `T::default()` when the request is not JSON.
///
/// Malformed JSON is rejected as [`PortfolioError::InvalidBody`]; any other
/// content type leaves the body unparsed, so every field binds as NULL.
#[derive(Debug)]
pub struct JsonForm<T>(pub T);

impl<S, T> FromRequest<S> for JsonForm<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Default + Send,
{
    type Rejection = PortfolioError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = content_type_of(&req);
        json_or_default(req, state, &content_type).await.map(Self)
    }
}

/// Lowercased `Content-Type` header, empty when absent.
pub(crate) fn content_type_of(req: &Request) -> String {
    req.headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase()
}

pub(crate) async fn json_or_default<S, T>(
    req: Request,
    state: &S,
    content_type: &str,
) -> Result<T, PortfolioError>
where
    S: Send + Sync,
    T: DeserializeOwned + Default + Send,
{
    if !content_type.starts_with("application/json") {
        debug!(content_type = %content_type, "unparsed request body; using empty fields");
        return Ok(T::default());
    }

    let bytes = Bytes::from_request(req, state)
        .await
        .map_err(|rejection| PortfolioError::InvalidBody(rejection.body_text()))?;
    serde_json::from_slice(&bytes).map_err(|e| PortfolioError::InvalidBody(e.to_string()))
}
