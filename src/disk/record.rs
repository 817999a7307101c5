//! Typed records for entries returned by the public-resources listing.

use serde::Deserialize;

use crate::category::Category;

/// Kind of a remote entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    /// A regular file with a download link.
    File,
    /// A folder that can be navigated into.
    Dir,
}

impl ResourceType {
    /// Returns the provider's label for this kind.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Dir => "dir",
        }
    }
}

/// One file or folder from a public listing.
///
/// Records are immutable once built; a listing is shared between requests
/// through the cache, so nothing downstream mutates it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    public_key: String,
    name: String,
    resource_type: ResourceType,
    path: String,
    download_url: Option<String>,
    mime_type: Option<String>,
    size: Option<u64>,
}

impl FileRecord {
    /// Creates a file entry.
    #[must_use]
    pub fn file(
        public_key: impl Into<String>,
        name: impl Into<String>,
        path: impl Into<String>,
        download_url: Option<String>,
        mime_type: Option<String>,
    ) -> Self {
        Self {
            public_key: public_key.into(),
            name: name.into(),
            resource_type: ResourceType::File,
            path: path.into(),
            download_url,
            mime_type,
            size: None,
        }
    }

    /// Creates a folder entry. Folders never carry a download URL.
    #[must_use]
    pub fn dir(
        public_key: impl Into<String>,
        name: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            public_key: public_key.into(),
            name: name.into(),
            resource_type: ResourceType::Dir,
            path: path.into(),
            download_url: None,
            mime_type: None,
            size: None,
        }
    }

    /// Sets the reported size in bytes.
    #[must_use]
    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    /// Builds a record from a raw listing item.
    ///
    /// `requested_key` is used when the item does not echo its own public key.
    pub(crate) fn from_item(item: ListingItem, requested_key: &str) -> Self {
        let public_key = item
            .public_key
            .filter(|key| !key.is_empty())
            .unwrap_or_else(|| requested_key.to_string());
        let record = match item.resource_type {
            ResourceType::File => {
                Self::file(public_key, item.name, item.path, item.file, item.mime_type)
            }
            ResourceType::Dir => Self::dir(public_key, item.name, item.path),
        };
        match item.size {
            Some(size) => record.with_size(size),
            None => record,
        }
    }

    #[must_use]
    pub fn public_key(&self) -> &str {
        &self.public_key
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn resource_type(&self) -> ResourceType {
        self.resource_type
    }

    /// Path of the entry inside the public resource (e.g. `/photos/a.png`).
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn download_url(&self) -> Option<&str> {
        self.download_url.as_deref()
    }

    #[must_use]
    pub fn mime_type(&self) -> Option<&str> {
        self.mime_type.as_deref()
    }

    #[must_use]
    pub fn size(&self) -> Option<u64> {
        self.size
    }

    #[must_use]
    pub fn is_dir(&self) -> bool {
        self.resource_type == ResourceType::Dir
    }

    /// Returns true when this entry belongs to `category`.
    ///
    /// Only files with a known MIME type can match a named category.
    #[must_use]
    pub fn matches_category(&self, category: Category) -> bool {
        if category == Category::All {
            return true;
        }
        if self.resource_type != ResourceType::File {
            return false;
        }
        self.mime_type
            .as_deref()
            .is_some_and(|mime| category.contains_mime(mime))
    }
}

// ==================== Provider Response Types ====================

/// Top-level body of `GET /v1/disk/public/resources`.
#[derive(Debug, Deserialize)]
pub(crate) struct ListingResponse {
    #[serde(rename = "_embedded")]
    pub embedded: Option<EmbeddedItems>,
}

/// The `_embedded` object holding the folder contents.
#[derive(Debug, Deserialize)]
pub(crate) struct EmbeddedItems {
    pub items: Vec<ListingItem>,
}

/// One entry of `_embedded.items`.
#[derive(Debug, Deserialize)]
pub(crate) struct ListingItem {
    pub name: String,
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    #[serde(default)]
    pub path: String,
    pub file: Option<String>,
    pub mime_type: Option<String>,
    pub public_key: Option<String>,
    pub size: Option<u64>,
}
