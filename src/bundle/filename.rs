//! Archive entry names derived from provider download URLs.
//!
//! Download URLs handed out by the provider carry the original file name in a
//! `filename` query parameter. That value is untrusted input, so it is
//! sanitized before it becomes a zip entry name.

use std::collections::HashSet;

use url::Url;

/// Extracts the `filename` query parameter from a download URL.
///
/// Returns `None` for unparseable URLs and for URLs without a non-empty
/// `filename` parameter. Percent-encoding is decoded.
#[must_use]
pub fn file_name_from_download_url(download_url: &str) -> Option<String> {
    let parsed = Url::parse(download_url).ok()?;
    parsed
        .query_pairs()
        .find(|(key, _)| key == "filename")
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.trim().is_empty())
}

/// Makes a name safe to use as a single, flat archive entry.
///
/// Path separators, reserved characters and control characters become `_`,
/// and names consisting only of dots are rewritten so they cannot escape the
/// archive root when extracted.
#[must_use]
pub fn sanitize_entry_name(name: &str) -> String {
    let sanitized: String = name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if sanitized.is_empty() {
        return "_".to_string();
    }
    if sanitized.chars().all(|c| c == '.') {
        return sanitized.replace('.', "_");
    }
    sanitized
}

/// Tracks entry names already written to one archive.
#[derive(Debug, Default)]
pub struct EntryNames {
    used: HashSet<String>,
}

impl EntryNames {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a sanitized name not used before in this archive and records it.
    ///
    /// Collisions get a numeric suffix before the extension, starting at `_2`
    /// (`report.pdf`, `report_2.pdf`, `report_3.pdf`).
    pub fn claim(&mut self, name: &str) -> String {
        let name = sanitize_entry_name(name);
        if self.used.insert(name.clone()) {
            return name;
        }

        let (stem, ext) = match name.rfind('.') {
            Some(pos) if pos > 0 => (&name[..pos], &name[pos..]),
            _ => (name.as_str(), ""),
        };
        let mut i = 2usize;
        loop {
            let candidate = format!("{stem}_{i}{ext}");
            if self.used.insert(candidate.clone()) {
                return candidate;
            }
            i += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name_from_download_url_reads_query_parameter() {
        let url = "https://downloader.disk.yandex.ru/disk/abc?uid=0&filename=report.pdf&disposition=attachment";
        assert_eq!(
            file_name_from_download_url(url).as_deref(),
            Some("report.pdf")
        );
    }

    #[test]
    fn test_file_name_from_download_url_decodes_percent_encoding() {
        let url = "https://dl.test/x?filename=%D0%BE%D1%82%D1%87%D1%91%D1%82%202024.docx";
        assert_eq!(
            file_name_from_download_url(url).as_deref(),
            Some("отчёт 2024.docx")
        );
    }

    #[test]
    fn test_file_name_from_download_url_missing_parameter() {
        assert_eq!(file_name_from_download_url("https://dl.test/x?uid=1"), None);
        assert_eq!(file_name_from_download_url("https://dl.test/x?filename="), None);
        assert_eq!(file_name_from_download_url("not a url"), None);
    }

    #[test]
    fn test_sanitize_entry_name_strips_path_components() {
        assert_eq!(sanitize_entry_name("../../etc/passwd"), ".._.._etc_passwd");
        assert_eq!(sanitize_entry_name("a\\b.txt"), "a_b.txt");
        assert_eq!(sanitize_entry_name(".."), "__");
        assert_eq!(sanitize_entry_name("   "), "_");
    }

    #[test]
    fn test_sanitize_entry_name_keeps_unicode() {
        assert_eq!(sanitize_entry_name("Фото лето.jpg"), "Фото лето.jpg");
    }

    #[test]
    fn test_entry_names_deduplicate_with_suffix() {
        let mut names = EntryNames::new();
        assert_eq!(names.claim("report.pdf"), "report.pdf");
        assert_eq!(names.claim("report.pdf"), "report_2.pdf");
        assert_eq!(names.claim("report.pdf"), "report_3.pdf");
        assert_eq!(names.claim("README"), "README");
        assert_eq!(names.claim("README"), "README_2");
    }

    #[test]
    fn test_entry_names_dotfile_suffix_goes_after_name() {
        let mut names = EntryNames::new();
        assert_eq!(names.claim(".env"), ".env");
        assert_eq!(names.claim(".env"), ".env_2");
    }
}
