//! Remote disk access: public listings and file downloads.
//!
//! # Architecture
//!
//! - [`DiskApi`] - Async trait the web layer depends on; tests substitute a fake
//! - [`YandexDiskClient`] - Implementation backed by the Yandex public-resources API
//! - [`FileRecord`] - One entry of a listing
//! - [`DiskError`] - Why a remote call failed
//!
//! # Example
//!
//! ```no_run
//! use diskview_core::disk::{DiskApi, YandexDiskClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = YandexDiskClient::new()?;
//! let listing = client.list_files("https://disk.yandex.ru/d/abc", "").await?;
//! for record in &listing {
//!     println!("{} ({})", record.name(), record.resource_type().as_str());
//! }
//! # Ok(())
//! # }
//! ```

mod client;
mod error;
mod record;

pub use client::{
    ClientSettings, DEFAULT_API_BASE_URL, DEFAULT_CONNECT_TIMEOUT_SECS,
    DEFAULT_READ_TIMEOUT_SECS, YandexDiskClient,
};
pub use error::DiskError;
pub use record::{FileRecord, ResourceType};

use async_trait::async_trait;

/// Operations the application needs from the remote storage provider.
///
/// Implementations report failures as [`DiskError`] and trace them at debug
/// level only. The caller that decides what a failure means (skip, redirect,
/// error page) writes the single warning or error for it.
#[async_trait]
pub trait DiskApi: Send + Sync {
    /// Lists the entries of `path` inside the public resource `public_key`.
    ///
    /// An empty `path` lists the root of the resource.
    async fn list_files(&self, public_key: &str, path: &str) -> Result<Vec<FileRecord>, DiskError>;

    /// Fetches the full body behind a download URL from a previous listing.
    async fn download_file(&self, url: &str) -> Result<Vec<u8>, DiskError>;
}
