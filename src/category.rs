//! Coarse file-type categories used to filter listings.
//!
//! A category is chosen by a user-facing label (Russian as shown in the UI, or
//! the English equivalent) and maps to a fixed set of MIME types. Labels that
//! match nothing resolve to [`Category::Unrecognized`], which matches no file.

use crate::disk::FileRecord;

const IMAGE_MIME_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/bmp",
    "image/webp",
    "image/svg+xml",
    "image/tiff",
    "image/heic",
];

const DOCUMENT_MIME_TYPES: &[&str] = &[
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/vnd.ms-excel",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "application/vnd.ms-powerpoint",
    "application/vnd.openxmlformats-officedocument.presentationml.presentation",
    "application/vnd.oasis.opendocument.text",
    "application/rtf",
    "text/plain",
    "text/csv",
];

const VIDEO_MIME_TYPES: &[&str] = &[
    "video/mp4",
    "video/mpeg",
    "video/quicktime",
    "video/x-msvideo",
    "video/x-matroska",
    "video/webm",
];

const AUDIO_MIME_TYPES: &[&str] = &[
    "audio/mpeg",
    "audio/mp4",
    "audio/ogg",
    "audio/wav",
    "audio/x-wav",
    "audio/flac",
    "audio/webm",
];

const ARCHIVE_MIME_TYPES: &[&str] = &[
    "application/zip",
    "application/x-rar-compressed",
    "application/vnd.rar",
    "application/x-7z-compressed",
    "application/gzip",
    "application/x-tar",
];

/// Label of the default, unfiltered view.
pub const ALL_FILES_LABEL: &str = "Все файлы";

/// A file-type category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// No filtering.
    All,
    Images,
    Documents,
    Video,
    Audio,
    Archives,
    /// A label that names no known category. Matches nothing.
    Unrecognized,
}

impl Category {
    /// Categories offered in the filter selector, in display order.
    pub const SELECTABLE: [Self; 6] = [
        Self::All,
        Self::Images,
        Self::Documents,
        Self::Video,
        Self::Audio,
        Self::Archives,
    ];

    /// Resolves a user-supplied label.
    ///
    /// Russian labels match exactly; English labels ignore ASCII case. An
    /// empty label means the default view.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        let label = label.trim();
        match label {
            "" | ALL_FILES_LABEL => return Self::All,
            "Изображения" => return Self::Images,
            "Документы" => return Self::Documents,
            "Видеофайлы" => return Self::Video,
            "Аудиофайлы" => return Self::Audio,
            "Архивы" => return Self::Archives,
            _ => {}
        }
        match label.to_ascii_lowercase().as_str() {
            "all" | "all files" => Self::All,
            "images" => Self::Images,
            "documents" => Self::Documents,
            "video" => Self::Video,
            "audio" => Self::Audio,
            "archives" => Self::Archives,
            _ => Self::Unrecognized,
        }
    }

    /// Display label used in the UI and in `file_type` query values.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::All => ALL_FILES_LABEL,
            Self::Images => "Изображения",
            Self::Documents => "Документы",
            Self::Video => "Видеофайлы",
            Self::Audio => "Аудиофайлы",
            Self::Archives => "Архивы",
            Self::Unrecognized => "",
        }
    }

    /// Known MIME types for this category. Empty for `All` and `Unrecognized`.
    #[must_use]
    pub fn mime_types(self) -> &'static [&'static str] {
        match self {
            Self::Images => IMAGE_MIME_TYPES,
            Self::Documents => DOCUMENT_MIME_TYPES,
            Self::Video => VIDEO_MIME_TYPES,
            Self::Audio => AUDIO_MIME_TYPES,
            Self::Archives => ARCHIVE_MIME_TYPES,
            Self::All | Self::Unrecognized => &[],
        }
    }

    /// Returns true when `mime` is one of this category's known types.
    ///
    /// Parameters such as `; charset=utf-8` are ignored.
    #[must_use]
    pub fn contains_mime(self, mime: &str) -> bool {
        let essence = mime.split(';').next().unwrap_or("").trim();
        self.mime_types()
            .iter()
            .any(|known| known.eq_ignore_ascii_case(essence))
    }
}

/// Keeps the records of `listing` that belong to `category`, preserving order.
///
/// `Category::All` returns the listing unchanged.
#[must_use]
pub fn filter_listing(listing: &[FileRecord], category: Category) -> Vec<FileRecord> {
    listing
        .iter()
        .filter(|record| record.matches_category(category))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_listing() -> Vec<FileRecord> {
        vec![
            FileRecord::dir("pk", "photos", "/photos"),
            FileRecord::file("pk", "a.png", "/a.png", None, Some("image/png".into())),
            FileRecord::file("pk", "b.pdf", "/b.pdf", None, Some("application/pdf".into())),
            FileRecord::file("pk", "c.mp4", "/c.mp4", None, Some("video/mp4".into())),
            FileRecord::file("pk", "d.bin", "/d.bin", None, None),
            FileRecord::file("pk", "e.xyz", "/e.xyz", None, Some("chemical/x-xyz".into())),
        ]
    }

    #[test]
    fn test_from_label_russian_labels() {
        assert_eq!(Category::from_label("Все файлы"), Category::All);
        assert_eq!(Category::from_label("Изображения"), Category::Images);
        assert_eq!(Category::from_label("Документы"), Category::Documents);
        assert_eq!(Category::from_label("Видеофайлы"), Category::Video);
        assert_eq!(Category::from_label("Аудиофайлы"), Category::Audio);
        assert_eq!(Category::from_label("Архивы"), Category::Archives);
    }

    #[test]
    fn test_from_label_english_labels_ignore_case() {
        assert_eq!(Category::from_label("Images"), Category::Images);
        assert_eq!(Category::from_label("VIDEO"), Category::Video);
        assert_eq!(Category::from_label("all files"), Category::All);
    }

    #[test]
    fn test_from_label_unknown_is_unrecognized() {
        assert_eq!(Category::from_label("Spreadsheets"), Category::Unrecognized);
    }

    #[test]
    fn test_label_roundtrips_for_selectable_categories() {
        for category in Category::SELECTABLE {
            assert_eq!(Category::from_label(category.label()), category);
        }
    }

    #[test]
    fn test_contains_mime_ignores_parameters_and_case() {
        assert!(Category::Documents.contains_mime("text/plain; charset=utf-8"));
        assert!(Category::Images.contains_mime("IMAGE/PNG"));
        assert!(!Category::Images.contains_mime("video/mp4"));
    }

    #[test]
    fn test_filter_all_is_identity() {
        let listing = sample_listing();
        assert_eq!(filter_listing(&listing, Category::All), listing);
    }

    #[test]
    fn test_filter_is_idempotent() {
        let listing = sample_listing();
        for category in Category::SELECTABLE
            .into_iter()
            .chain([Category::Unrecognized])
        {
            let once = filter_listing(&listing, category);
            let twice = filter_listing(&once, category);
            assert_eq!(once, twice, "filtering by {category:?} twice changed the result");
        }
    }

    #[test]
    fn test_filter_named_category_keeps_only_matching_mime() {
        let listing = sample_listing();

        let images = filter_listing(&listing, Category::Images);
        let names: Vec<&str> = images.iter().map(FileRecord::name).collect();
        assert_eq!(names, vec!["a.png"]);

        let documents = filter_listing(&listing, Category::Documents);
        let names: Vec<&str> = documents.iter().map(FileRecord::name).collect();
        assert_eq!(names, vec!["b.pdf"]);
    }

    #[test]
    fn test_filter_excludes_absent_and_unknown_mime_from_every_category() {
        let listing = sample_listing();
        for category in Category::SELECTABLE {
            if category == Category::All {
                continue;
            }
            let filtered = filter_listing(&listing, category);
            assert!(
                filtered
                    .iter()
                    .all(|r| r.name() != "d.bin" && r.name() != "e.xyz" && !r.is_dir()),
                "{category:?} kept an untyped entry or folder"
            );
        }
    }

    #[test]
    fn test_filter_unrecognized_yields_empty() {
        assert!(filter_listing(&sample_listing(), Category::Unrecognized).is_empty());
    }
}
