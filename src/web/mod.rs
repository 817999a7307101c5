//! HTTP surface: router, shared state and handlers.
//!
//! # Routes
//!
//! | Method | Path                 | Purpose                                   |
//! |--------|----------------------|-------------------------------------------|
//! | GET    | `/`                  | Entry page with optional error banner     |
//! | GET    | `/view`              | Listing of one folder, filtered by type   |
//! | GET    | `/folder/*name`      | Redirect into `/view` for a folder path   |
//! | POST   | `/download_selected` | Zip of the selected files                 |
//! | GET    | `/download`          | One file as an attachment                 |
//! | GET    | `/health`            | Liveness check                            |

mod error;
mod handlers;
pub mod render;

pub use error::{
    MSG_ARCHIVE_FAILED, MSG_DOWNLOAD_FAILED, MSG_MISSING_DOWNLOAD_PARAMS, MSG_NO_FILES_SELECTED,
    MSG_STORAGE_NOT_FOUND, MSG_UNSUPPORTED_FORM, WebError,
};

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::trace::{DefaultOnFailure, TraceLayer};
use tracing::Level;

use crate::bundle::{DEFAULT_BUNDLE_CONCURRENCY, MAX_BUNDLE_CONCURRENCY};
use crate::cache::ListingCache;
use crate::disk::DiskApi;

/// State shared by every handler.
///
/// Built once by the composition root; cloning only bumps reference counts.
#[derive(Clone)]
pub struct AppState {
    api: Arc<dyn DiskApi>,
    cache: Arc<ListingCache>,
    bundle_concurrency: usize,
}

impl AppState {
    /// Creates state that fetches bundle entries one at a time.
    #[must_use]
    pub fn new(api: Arc<dyn DiskApi>, cache: Arc<ListingCache>) -> Self {
        Self {
            api,
            cache,
            bundle_concurrency: DEFAULT_BUNDLE_CONCURRENCY,
        }
    }

    /// Sets how many bundle entries are fetched at once (clamped to 1..=16).
    #[must_use]
    pub fn with_bundle_concurrency(mut self, concurrency: usize) -> Self {
        self.bundle_concurrency = concurrency.clamp(1, MAX_BUNDLE_CONCURRENCY);
        self
    }

    #[must_use]
    pub fn api(&self) -> &dyn DiskApi {
        self.api.as_ref()
    }

    #[must_use]
    pub fn cache(&self) -> &ListingCache {
        &self.cache
    }

    #[must_use]
    pub fn bundle_concurrency(&self) -> usize {
        self.bundle_concurrency
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("cached_listings", &self.cache.len())
            .field("bundle_concurrency", &self.bundle_concurrency)
            .finish_non_exhaustive()
    }
}

/// Builds the application router with request tracing.
///
/// Handlers log their own failures, so 5xx responses are traced at debug.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::search))
        .route("/view", get(handlers::view))
        .route("/folder/*name", get(handlers::folder))
        .route("/download_selected", post(handlers::download_selected))
        .route("/download", get(handlers::download))
        .route("/health", get(handlers::health))
        .layer(
            TraceLayer::new_for_http().on_failure(DefaultOnFailure::new().level(Level::DEBUG)),
        )
        .with_state(state)
}
