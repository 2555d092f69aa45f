//! Application state shared across all request handlers

use std::sync::Arc;

use crate::database::LinkRepository;
use crate::service::LinkService;

/// Cloned into every handler by axum
///
/// Holds the only process-wide resource, the store handle, behind the link
/// service. Each state owns its own store, so tests never share data.
#[derive(Clone)]
pub struct AppState {
    pub links: Arc<LinkService>,
}

impl AppState {
    pub fn new(repository: Arc<dyn LinkRepository>) -> Self {
        Self {
            links: Arc::new(LinkService::new(repository)),
        }
    }
}
