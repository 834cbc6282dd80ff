use axum::body::Bytes;
use axum::extract::{FromRequest, Request, State};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use hashlink_core::{LinkRecord, ShortKey};
use std::borrow::Cow;
use tracing::{debug, trace};

use crate::error::{AppError, Result};
use crate::state::AppState;

/// Dispatches every non-health path by method: `POST` shortens, `GET`
/// resolves, anything else is rejected with an empty 405.
pub async fn link_handler(State(state): State<AppState>, request: Request) -> Response {
    match *request.method() {
        Method::POST => match Bytes::from_request(request, &state).await {
            Ok(body) => create_link(&state, body).await.into_response(),
            Err(rejection) => rejection.into_response(),
        },
        Method::GET => resolve_link(&state, request.uri().path())
            .await
            .into_response(),
        _ => StatusCode::METHOD_NOT_ALLOWED.into_response(),
    }
}

async fn create_link(state: &AppState, body: Bytes) -> Result<String> {
    let original_url = String::from_utf8(body.to_vec()).map_err(|_| AppError::InvalidUtf8)?;
    if original_url.is_empty() {
        return Err(AppError::EmptyUrl);
    }

    let record = LinkRecord::from_url(original_url);
    state
        .with_deadline(
            state
                .storage()
                .put(&record.short_key, &record.original_url),
        )
        .await?;

    debug!(key = %record.short_key, url = %record.original_url, "shortened url");
    Ok(record.short_key.to_url(state.base_url()))
}

/// Turns a request path into a lookup key: percent-decoded, without the
/// leading `/`. A path that decodes to invalid UTF-8 is used as is.
fn key_from_path(path: &str) -> ShortKey {
    let decoded = urlencoding::decode(path).unwrap_or(Cow::Borrowed(path));
    let decoded: &str = &decoded;
    ShortKey::new_unchecked(decoded.strip_prefix('/').unwrap_or(decoded))
}

async fn resolve_link(state: &AppState, path: &str) -> Result<Response> {
    let key = key_from_path(path);
    if !key.is_well_formed() {
        trace!(key = %key, "resolving malformed key");
    }

    match state.with_deadline(state.storage().get(&key)).await? {
        Some(original_url) => {
            debug!(key = %key, url = %original_url, "resolved key");
            Ok(original_url.into_response())
        }
        None if state.strict_not_found() => {
            trace!(key = %key, "key not found");
            Ok(StatusCode::NOT_FOUND.into_response())
        }
        None => {
            trace!(key = %key, "key not found, answering with an empty body");
            Ok(String::new().into_response())
        }
    }
}
