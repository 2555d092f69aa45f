//! HTTP request handlers for the URL shortener API
//!
//! Handlers validate request shape, call into [`LinkService`](crate::service::LinkService)
//! and translate the outcome into an HTTP response:
//! - Creating short URLs with custom or random codes
//! - Redirecting short codes to their original destinations
//! - Answering liveness probes
//!
//! Store calls are synchronous redb transactions, so they run on the blocking
//! thread pool instead of a runtime worker.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Redirect},
    Json,
};
use url::Url;

use crate::error::AppError;
use crate::model::{CreateRequest, CreateResponse, HealthResponse};
use crate::service::LinkService;
use crate::state::AppState;
use crate::validation::{validate_custom_code, validate_url};

/// Runs a service call on the blocking pool
async fn run_blocking<T, F>(state: &AppState, f: F) -> Result<T, AppError>
where
    F: FnOnce(&LinkService) -> Result<T, AppError> + Send + 'static,
    T: Send + 'static,
{
    let links = state.links.clone();
    tokio::task::spawn_blocking(move || f(links.as_ref()))
        .await
        .map_err(|err| AppError::Internal(format!("store task failed: {err}")))?
}

/// Scheme and authority used to build `short_url`
///
/// The authority is the `Host` header (default `localhost`). The scheme is
/// `X-Forwarded-Proto` when a proxy sets it to `http` or `https`, else `http`.
fn base_url(headers: &HeaderMap) -> String {
    let host = headers
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("localhost");

    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|value| value.to_str().ok())
        .map(|value| value.trim().to_ascii_lowercase())
        .filter(|value| value == "http" || value == "https")
        .unwrap_or_else(|| "http".to_string());

    format!("{}://{}", scheme, host)
}

/// Creates a new short URL
///
/// Submitting a URL that was already shortened returns the existing short
/// URL instead of creating a second record.
///
/// # Request Body
///
/// ```json
/// {
///   "url": "https://example.com/very/long/url",
///   "custom_code": "promo24"  // Optional
/// }
/// ```
///
/// # Response
///
/// - **201 Created** - `{"short_url": "<scheme>://<host>/<code>"}`
/// - **400 Bad Request** - Malformed body, invalid URL or custom code
/// - **409 Conflict** - Custom code already bound to a different URL
/// - **500 Internal Server Error** - No free code found or storage failure
///
/// See [`base_url`] for how the prefix of `short_url` is derived.
pub async fn create_short_url(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<CreateRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload.map_err(|rejection| AppError::invalid(rejection.body_text()))?;

    if let Err(err) = validate_url(&payload.url) {
        tracing::warn!(url = %payload.url, "invalid URL submitted");
        return Err(err);
    }

    if let Some(code) = &payload.custom_code {
        validate_custom_code(code)?;
    }

    let CreateRequest { url, custom_code } = payload;
    let code = run_blocking(&state, move |links| {
        links.create_short_link(&url, custom_code.as_deref())
    })
    .await?;

    let response = CreateResponse {
        short_url: format!("{}/{}", base_url(&headers), code),
    };

    Ok((StatusCode::CREATED, Json(response)))
}

/// Redirects a short code to its original destination
///
/// # Path Parameters
///
/// - `code` - The short code (1-10 letters, digits or `_`)
///
/// # Response
///
/// - **307 Temporary Redirect** - `Location` set to the original URL
/// - **400 Bad Request** - Malformed code
/// - **404 Not Found** - Unknown code
///
/// The stored URL is kept exactly as submitted; `Location` carries its
/// serialized form (punycode host, percent-encoded path), which is plain ASCII.
///
/// # Note
///
/// Uses 307 Temporary Redirect instead of 301 Permanent Redirect so that
/// browsers come back through this endpoint and every visit is counted.
pub async fn redirect_url(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Redirect, AppError> {
    let original_url = run_blocking(&state, move |links| links.resolve(&code)).await?;

    let location = Url::parse(&original_url)
        .map_err(|err| AppError::Internal(format!("stored URL is unparseable: {err}")))?;

    Ok(Redirect::temporary(location.as_str()))
}

/// Liveness probe
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
    })
}
