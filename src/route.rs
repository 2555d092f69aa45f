//! Route definitions for the URL shortener API
//!
//! This module configures all HTTP routes and maps them to their respective handlers.

use axum::routing::{get, post};
use axum::Router;

use crate::handler::{create_short_url, health, redirect_url};
use crate::state::AppState;

/// Creates and configures the Axum application router with all routes
///
/// # Route Definitions
///
/// - `POST /shorten` - Creates a short URL
/// - `GET /health` - Liveness probe
/// - `GET /{code}` - Redirects to the original URL
///
/// Static segments take priority over `/{code}`, so `health` and `shorten`
/// never reach the redirect handler.
///
/// # Example Usage
///
/// ```no_run
/// # use std::sync::Arc;
/// # use snaplink::database::LinkStore;
/// # use snaplink::route::create_app;
/// # use snaplink::state::AppState;
/// let store = LinkStore::open("data.db").unwrap();
/// let app = create_app(AppState::new(Arc::new(store)));
/// // axum::serve(listener, app).await.unwrap();
/// ```
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/shorten", post(create_short_url))
        .route("/health", get(health))
        .route("/{code}", get(redirect_url))
        .with_state(state)
}
