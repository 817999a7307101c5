//! Server-side HTML for the entry and listing pages.
//!
//! Pages are small and static apart from the listing rows, so they are built
//! with `format!`. Every interpolated value goes through [`escape_html`].

use std::fmt::Write;

use url::form_urlencoded;

use crate::category::Category;
use crate::disk::FileRecord;

const STYLE: &str = "body{font-family:sans-serif;max-width:960px;margin:2em auto;padding:0 1em}\
table{border-collapse:collapse;width:100%}td,th{padding:.35em .5em;border-bottom:1px solid #ddd;text-align:left}\
.banner{background:#fdecea;color:#611a15;padding:.75em 1em;margin-bottom:1em}\
.muted{color:#777}";

/// Escapes text for use in element content and quoted attribute values.
#[must_use]
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            c => out.push(c),
        }
    }
    out
}

/// Builds `base?k=v&...` with form-style percent-encoding.
#[must_use]
pub fn link(base: &str, pairs: &[(&str, &str)]) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in pairs {
        serializer.append_pair(key, value);
    }
    let query = serializer.finish();
    if query.is_empty() {
        base.to_string()
    } else {
        format!("{base}?{query}")
    }
}

/// Parent of a provider path; `None` at the root.
#[must_use]
pub fn parent_path(path: &str) -> Option<String> {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return None;
    }
    match trimmed.rsplit_once('/') {
        Some((parent, _)) if !parent.is_empty() => Some(parent.to_string()),
        _ => Some(String::new()),
    }
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"ru\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n{body}</body>\n</html>\n",
        escape_html(title)
    )
}

/// Entry page with the public-link form and an optional error banner.
#[must_use]
pub fn search_page(public_key: &str, path: Option<&str>, message: Option<&str>) -> String {
    let mut body = String::from("<h1>Просмотр Яндекс Диска</h1>\n");
    if let Some(message) = message.filter(|m| !m.is_empty()) {
        let _ = writeln!(body, "<div class=\"banner\">{}</div>", escape_html(message));
    }
    let _ = write!(
        body,
        "<form method=\"get\" action=\"/view\">\n\
         <label>Публичная ссылка или ключ<br>\
         <input type=\"text\" name=\"public_key\" size=\"70\" value=\"{}\" required></label>\n\
         <input type=\"hidden\" name=\"path\" value=\"{}\">\n\
         <button type=\"submit\">Открыть</button>\n</form>\n",
        escape_html(public_key),
        escape_html(path.unwrap_or(""))
    );
    page("Яндекс Диск", &body)
}

/// Everything the listing page shows.
#[derive(Debug)]
pub struct ViewPage<'a> {
    pub public_key: &'a str,
    pub current_path: &'a str,
    /// Raw `file_type` value echoed back into the selector.
    pub file_type: &'a str,
    pub files: &'a [FileRecord],
}

/// Listing page: navigation, category selector and selectable file rows.
#[must_use]
pub fn view_page(view: &ViewPage<'_>) -> String {
    let mut body = String::new();
    let shown_path = if view.current_path.is_empty() {
        "/"
    } else {
        view.current_path
    };
    let _ = writeln!(body, "<h1>{}</h1>", escape_html(shown_path));
    let _ = write!(
        body,
        "<p><a href=\"{}\">Другая ссылка</a>",
        escape_html(&link("/", &[("public_key", view.public_key)]))
    );
    if let Some(parent) = parent_path(view.current_path) {
        let up = link(
            "/view",
            &[("public_key", view.public_key), ("path", parent.as_str())],
        );
        let _ = write!(body, " | <a href=\"{}\">Наверх</a>", escape_html(&up));
    }
    body.push_str("</p>\n");

    render_category_selector(&mut body, view);
    render_file_table(&mut body, view);

    page("Файлы", &body)
}

fn render_category_selector(body: &mut String, view: &ViewPage<'_>) {
    let selected = Category::from_label(view.file_type);
    let _ = write!(
        body,
        "<form method=\"get\" action=\"/view\">\n\
         <input type=\"hidden\" name=\"public_key\" value=\"{}\">\n\
         <input type=\"hidden\" name=\"path\" value=\"{}\">\n\
         <select name=\"file_type\">\n",
        escape_html(view.public_key),
        escape_html(view.current_path)
    );
    for category in Category::SELECTABLE {
        let marker = if category == selected { " selected" } else { "" };
        let label = escape_html(category.label());
        let _ = writeln!(body, "<option value=\"{label}\"{marker}>{label}</option>");
    }
    body.push_str("</select>\n<button type=\"submit\">Фильтр</button>\n</form>\n");
}

fn render_file_table(body: &mut String, view: &ViewPage<'_>) {
    if view.files.is_empty() {
        body.push_str("<p class=\"muted\">Нет файлов.</p>\n");
        return;
    }

    body.push_str(
        "<form method=\"post\" action=\"/download_selected\">\n<table>\n\
         <tr><th></th><th>Имя</th><th>Тип</th><th>Размер</th></tr>\n",
    );
    for record in view.files {
        body.push_str("<tr>");
        if record.is_dir() {
            let href = link(
                "/view",
                &[("public_key", view.public_key), ("path", record.path())],
            );
            let _ = write!(
                body,
                "<td></td><td><a href=\"{}\">{}/</a></td><td>папка</td><td></td>",
                escape_html(&href),
                escape_html(record.name())
            );
        } else {
            render_file_row(body, record);
        }
        body.push_str("</tr>\n");
    }
    body.push_str(
        "</table>\n<button type=\"submit\">Скачать выбранные (zip)</button>\n</form>\n",
    );
}

fn render_file_row(body: &mut String, record: &FileRecord) {
    let name = escape_html(record.name());
    match record.download_url() {
        Some(url) => {
            let href = link("/download", &[("download_url", url), ("file_name", record.name())]);
            let _ = write!(
                body,
                "<td><input type=\"checkbox\" name=\"selected_files\" value=\"{}\"></td>\
                 <td><a href=\"{}\">{name}</a></td>",
                escape_html(url),
                escape_html(&href)
            );
        }
        None => {
            let _ = write!(body, "<td></td><td>{name}</td>");
        }
    }
    let _ = write!(
        body,
        "<td>{}</td><td>{}</td>",
        escape_html(record.mime_type().unwrap_or("")),
        record.size().map(format_size).unwrap_or_default()
    );
}

#[allow(clippy::cast_precision_loss)]
fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["КБ", "МБ", "ГБ", "ТБ"];
    if bytes < 1024 {
        return format!("{bytes} Б");
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html_escapes_markup() {
        assert_eq!(
            escape_html(r#"<a href="x">'&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&#x27;&amp;&#x27;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_link_encodes_pairs() {
        assert_eq!(
            link("/view", &[("public_key", "https://disk.yandex.ru/d/a b"), ("path", "")]),
            "/view?public_key=https%3A%2F%2Fdisk.yandex.ru%2Fd%2Fa+b&path="
        );
        assert_eq!(link("/", &[]), "/");
    }

    #[test]
    fn test_parent_path() {
        assert_eq!(parent_path(""), None);
        assert_eq!(parent_path("/"), None);
        assert_eq!(parent_path("/photos"), Some(String::new()));
        assert_eq!(parent_path("/photos/2024"), Some("/photos".to_string()));
        assert_eq!(parent_path("/photos/2024/"), Some("/photos".to_string()));
    }

    #[test]
    fn test_search_page_shows_escaped_banner() {
        let html = search_page("pk", None, Some("<b>нет</b>"));
        assert!(html.contains("&lt;b&gt;нет&lt;/b&gt;"));
        assert!(!html.contains("<b>нет</b>"));
    }

    #[test]
    fn test_search_page_without_message_has_no_banner() {
        let html = search_page("", None, None);
        assert!(!html.contains("class=\"banner\""));
    }

    #[test]
    fn test_view_page_lists_files_and_folders() {
        let files = vec![
            FileRecord::dir("pk", "photos", "/photos"),
            FileRecord::file(
                "pk",
                "a.png",
                "/a.png",
                Some("http://x/a?filename=a.png".into()),
                Some("image/png".into()),
            )
            .with_size(2048),
        ];
        let html = view_page(&ViewPage {
            public_key: "pk",
            current_path: "",
            file_type: "Все файлы",
            files: &files,
        });

        assert!(html.contains("photos/</a>"));
        assert!(html.contains("/view?public_key=pk&amp;path=%2Fphotos"));
        assert!(html.contains("name=\"selected_files\" value=\"http://x/a?filename=a.png\""));
        assert!(html.contains("2.0 КБ"));
        assert!(!html.contains("Наверх"));
    }

    #[test]
    fn test_view_page_marks_selected_category() {
        let html = view_page(&ViewPage {
            public_key: "pk",
            current_path: "/docs",
            file_type: "Изображения",
            files: &[],
        });
        assert!(html.contains("<option value=\"Изображения\" selected>"));
        assert!(html.contains("Нет файлов."));
        assert!(html.contains("Наверх"));
    }

    #[test]
    fn test_format_size_units() {
        assert_eq!(format_size(512), "512 Б");
        assert_eq!(format_size(1536), "1.5 КБ");
        assert_eq!(format_size(5 * 1024 * 1024), "5.0 МБ");
    }
}
