//! Process-lifetime cache of folder listings.
//!
//! Listings are keyed by `(public key, path)` and kept until the process exits.
//! There is no eviction, size bound, or TTL: a public folder that changes after
//! its first successful fetch keeps being served from memory.
//!
//! # Example
//!
//! ```
//! use diskview_core::cache::ListingCache;
//! use diskview_core::disk::FileRecord;
//!
//! let cache = ListingCache::new();
//! assert!(cache.get("pk", "").is_none());
//!
//! cache.put("pk", "", vec![FileRecord::dir("pk", "photos", "/photos")]);
//! assert_eq!(cache.get("pk", "").map(|l| l.len()), Some(1));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use tracing::trace;

use crate::disk::FileRecord;

/// Separator between public key and path in cache keys.
///
/// Public keys are URLs or base64 tokens and paths come from the provider;
/// neither contains a pipe.
pub const KEY_SEPARATOR: char = '|';

/// A cached listing, shared between concurrent readers.
pub type Listing = Arc<[FileRecord]>;

/// Concurrent map from `(public key, path)` to a listing.
///
/// `ListingCache` is `Send + Sync`; the composition root wraps it in `Arc`
/// and hands it to the web layer.
#[derive(Debug, Default)]
pub struct ListingCache {
    entries: DashMap<String, Listing>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ListingCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the cache key for a public key and path.
    #[must_use]
    pub fn key(public_key: &str, path: &str) -> String {
        format!("{public_key}{KEY_SEPARATOR}{path}")
    }

    /// Returns the cached listing, if any.
    #[must_use]
    pub fn get(&self, public_key: &str, path: &str) -> Option<Listing> {
        let key = Self::key(public_key, path);
        let found = self.entries.get(&key).map(|entry| Arc::clone(entry.value()));
        if found.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            trace!(key = %key, "listing cache hit");
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            trace!(key = %key, "listing cache miss");
        }
        found
    }

    /// Stores a listing, replacing any previous value, and returns the shared copy.
    pub fn put(&self, public_key: &str, path: &str, listing: Vec<FileRecord>) -> Listing {
        let listing: Listing = listing.into();
        self.entries
            .insert(Self::key(public_key, path), Arc::clone(&listing));
        listing
    }

    /// Number of cached listings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Lookups that found a listing.
    #[must_use]
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Lookups that found nothing.
    #[must_use]
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }
}
