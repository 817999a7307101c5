//! Cache-then-fetch listing resolution and category filtering.

use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::cache::{Listing, ListingCache};
use crate::category::{Category, filter_listing};
use crate::disk::{DiskApi, DiskError, FileRecord};

/// Why a listing could not be produced.
#[derive(Debug, Error)]
pub enum ListingError {
    /// The request carried no public key.
    #[error("no public key supplied")]
    MissingPublicKey,

    /// The provider could not be reached or returned no usable listing.
    #[error("listing unavailable for {public_key} at '{path}': {source}")]
    Unavailable {
        public_key: String,
        path: String,
        #[source]
        source: DiskError,
    },
}

/// Returns the listing for `(public_key, path)`, fetching and caching it on a miss.
///
/// Failed fetches are not cached, so the next request tries the provider again.
///
/// # Errors
///
/// Returns [`ListingError::MissingPublicKey`] for an absent or blank key, and
/// [`ListingError::Unavailable`] when the provider call fails.
#[instrument(skip_all, fields(public_key = ?public_key, path = %path))]
pub async fn load_listing(
    api: &dyn DiskApi,
    cache: &ListingCache,
    public_key: Option<&str>,
    path: &str,
) -> Result<Listing, ListingError> {
    let Some(public_key) = public_key.filter(|key| !key.trim().is_empty()) else {
        debug!("listing requested without public key");
        return Err(ListingError::MissingPublicKey);
    };

    if let Some(listing) = cache.get(public_key, path) {
        debug!(entries = listing.len(), "serving listing from cache");
        return Ok(listing);
    }

    match api.list_files(public_key, path).await {
        Ok(records) => {
            let listing = cache.put(public_key, path, records);
            debug!(entries = listing.len(), cached = cache.len(), "listing cached");
            Ok(listing)
        }
        Err(source) => {
            warn!(error = %source, "listing fetch failed; not caching");
            Err(ListingError::Unavailable {
                public_key: public_key.to_string(),
                path: path.to_string(),
                source,
            })
        }
    }
}

/// Loads a listing and keeps the entries belonging to `category`.
///
/// # Errors
///
/// Same as [`load_listing`].
pub async fn browse(
    api: &dyn DiskApi,
    cache: &ListingCache,
    public_key: Option<&str>,
    path: &str,
    category: Category,
) -> Result<Vec<FileRecord>, ListingError> {
    let listing = load_listing(api, cache, public_key, path).await?;
    Ok(filter_listing(&listing, category))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;

    struct CountingApi {
        listing: Vec<FileRecord>,
        fail: bool,
        list_calls: AtomicUsize,
    }

    impl CountingApi {
        fn returning(listing: Vec<FileRecord>) -> Self {
            Self {
                listing,
                fail: false,
                list_calls: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                listing: Vec::new(),
                fail: true,
                list_calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.list_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl DiskApi for CountingApi {
        async fn list_files(
            &self,
            _public_key: &str,
            _path: &str,
        ) -> Result<Vec<FileRecord>, DiskError> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(DiskError::http_status("https://api.test", 404));
            }
            Ok(self.listing.clone())
        }

        async fn download_file(&self, url: &str) -> Result<Vec<u8>, DiskError> {
            Err(DiskError::invalid_url(url))
        }
    }

    fn sample() -> Vec<FileRecord> {
        vec![
            FileRecord::dir("pk1", "docs", "/docs"),
            FileRecord::file(
                "pk1",
                "a.png",
                "/a.png",
                Some("http://x/a?filename=a.png".into()),
                Some("image/png".into()),
            ),
        ]
    }

    #[tokio::test]
    async fn test_warm_cache_skips_remote_call() {
        let api = CountingApi::returning(sample());
        let cache = ListingCache::new();

        let first = load_listing(&api, &cache, Some("pk1"), "").await.unwrap();
        let second = load_listing(&api, &cache, Some("pk1"), "").await.unwrap();

        assert_eq!(api.calls(), 1);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_distinct_paths_fetch_separately() {
        let api = CountingApi::returning(sample());
        let cache = ListingCache::new();

        load_listing(&api, &cache, Some("pk1"), "").await.unwrap();
        load_listing(&api, &cache, Some("pk1"), "/docs").await.unwrap();

        assert_eq!(api.calls(), 2);
    }

    #[tokio::test]
    async fn test_failed_fetch_is_not_cached() {
        let api = CountingApi::failing();
        let cache = ListingCache::new();

        let first = load_listing(&api, &cache, Some("pk1"), "").await;
        let second = load_listing(&api, &cache, Some("pk1"), "").await;

        assert!(matches!(first, Err(ListingError::Unavailable { .. })));
        assert!(matches!(second, Err(ListingError::Unavailable { .. })));
        assert_eq!(api.calls(), 2);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_missing_public_key_never_calls_remote() {
        let api = CountingApi::returning(sample());
        let cache = ListingCache::new();

        let absent = load_listing(&api, &cache, None, "").await;
        let blank = load_listing(&api, &cache, Some("  "), "").await;

        assert!(matches!(absent, Err(ListingError::MissingPublicKey)));
        assert!(matches!(blank, Err(ListingError::MissingPublicKey)));
        assert_eq!(api.calls(), 0);
    }

    #[tokio::test]
    async fn test_browse_filters_by_category() {
        let api = CountingApi::returning(sample());
        let cache = ListingCache::new();

        let images = browse(&api, &cache, Some("pk1"), "", Category::Images)
            .await
            .unwrap();
        let videos = browse(&api, &cache, Some("pk1"), "", Category::Video)
            .await
            .unwrap();

        assert_eq!(images.len(), 1);
        assert_eq!(images[0].name(), "a.png");
        assert!(videos.is_empty());
        assert_eq!(api.calls(), 1);
    }
}
