//! Zip bundling of several remote files into one download.
//!
//! Files are fetched in the order given and written into a Deflate-compressed
//! archive held in memory. An entry that cannot be named or downloaded is
//! skipped and logged; the rest of the archive is still produced.
//!
//! # Example
//!
//! ```no_run
//! use diskview_core::bundle::build_bundle;
//! use diskview_core::disk::YandexDiskClient;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = YandexDiskClient::new()?;
//! let urls = vec!["https://downloader.disk.yandex.ru/disk/x?filename=a.png".to_string()];
//! let bundle = build_bundle(&client, &urls, 1).await?;
//! println!("{} entries, {} skipped", bundle.entries.len(), bundle.skipped.len());
//! # Ok(())
//! # }
//! ```

mod filename;

pub use filename::{EntryNames, file_name_from_download_url, sanitize_entry_name};

use std::io::{Cursor, Write};

use futures_util::{StreamExt, stream};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::disk::{DiskApi, DiskError};

/// Attachment name of every bundle download.
pub const ARCHIVE_NAME: &str = "selected_files.zip";

/// Default number of files fetched at once (sequential).
pub const DEFAULT_BUNDLE_CONCURRENCY: usize = 1;

/// Upper bound for `bundle_concurrency`.
pub const MAX_BUNDLE_CONCURRENCY: usize = 16;

/// Errors that abort a bundle as a whole.
#[derive(Debug, Error)]
pub enum BundleError {
    /// The caller selected nothing.
    #[error("no files selected for download")]
    NoFiles,

    /// The archive writer failed.
    #[error("failed to write archive entry '{name}': {source}")]
    Archive {
        name: String,
        #[source]
        source: ZipError,
    },
}

/// Why one selected file is missing from the archive.
#[derive(Debug)]
pub enum SkipReason {
    /// The URL carries no usable `filename` parameter.
    NoFileName,
    /// Fetching the file failed.
    Download(DiskError),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoFileName => f.write_str("no filename parameter in download URL"),
            Self::Download(error) => write!(f, "{error}"),
        }
    }
}

/// A selected file left out of the archive.
#[derive(Debug)]
pub struct SkippedEntry {
    pub url: String,
    pub reason: SkipReason,
}

/// A finished archive.
#[derive(Debug)]
pub struct Bundle {
    /// Complete zip file bytes.
    pub archive: Vec<u8>,
    /// Entry names in archive order.
    pub entries: Vec<String>,
    /// Selected files that were not included.
    pub skipped: Vec<SkippedEntry>,
}

/// Downloads `urls` and packs them into a zip archive.
///
/// At most `concurrency` downloads run at once (values below 1 mean 1).
/// Archive order always follows `urls`, whatever order downloads finish in.
///
/// # Errors
///
/// Returns [`BundleError::NoFiles`] for an empty selection, before any network
/// I/O, and [`BundleError::Archive`] if the zip writer fails. Individual
/// download failures are reported in [`Bundle::skipped`] instead.
#[instrument(skip(api, urls), fields(selected = urls.len()))]
pub async fn build_bundle(
    api: &dyn DiskApi,
    urls: &[String],
    concurrency: usize,
) -> Result<Bundle, BundleError> {
    if urls.is_empty() {
        return Err(BundleError::NoFiles);
    }

    let fetched: Vec<(String, Result<(String, Vec<u8>), SkipReason>)> =
        stream::iter(urls.to_vec())
            .map(|url| async move {
                let outcome = fetch_entry(api, &url).await;
                (url, outcome)
            })
            .buffered(concurrency.max(1))
            .collect()
            .await;

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let mut names = EntryNames::new();
    let mut entries = Vec::new();
    let mut skipped = Vec::new();

    for (url, outcome) in fetched {
        match outcome {
            Ok((file_name, bytes)) => {
                let name = names.claim(&file_name);
                write_entry(&mut writer, &name, &bytes)?;
                debug!(entry = %name, bytes = bytes.len(), "added archive entry");
                entries.push(name);
            }
            Err(reason) => {
                warn!(url = %url, reason = %reason, "skipping file in bundle");
                skipped.push(SkippedEntry { url, reason });
            }
        }
    }

    let archive = writer
        .finish()
        .map_err(|source| BundleError::Archive {
            name: ARCHIVE_NAME.to_string(),
            source,
        })?
        .into_inner();

    info!(
        entries = entries.len(),
        skipped = skipped.len(),
        bytes = archive.len(),
        "bundle ready"
    );

    Ok(Bundle {
        archive,
        entries,
        skipped,
    })
}

async fn fetch_entry(api: &dyn DiskApi, url: &str) -> Result<(String, Vec<u8>), SkipReason> {
    let file_name = file_name_from_download_url(url).ok_or(SkipReason::NoFileName)?;
    let bytes = api
        .download_file(url)
        .await
        .map_err(SkipReason::Download)?;
    Ok((file_name, bytes))
}

fn write_entry(
    writer: &mut ZipWriter<Cursor<Vec<u8>>>,
    name: &str,
    bytes: &[u8],
) -> Result<(), BundleError> {
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .large_file(u64::try_from(bytes.len()).unwrap_or(u64::MAX) >= u64::from(u32::MAX));
    let archive_error = |source: ZipError| BundleError::Archive {
        name: name.to_string(),
        source,
    };

    writer.start_file(name, options).map_err(archive_error)?;
    writer
        .write_all(bytes)
        .map_err(|e| archive_error(ZipError::Io(e)))?;
    Ok(())
}
