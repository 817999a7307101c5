//! Request handlers for the browsing and download routes.

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, HeaderValue};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::{Html, IntoResponse, Redirect, Response};
use serde::Deserialize;
use tracing::{debug, error, info};
use url::form_urlencoded;

use super::AppState;
use super::error::{
    MSG_ARCHIVE_FAILED, MSG_DOWNLOAD_FAILED, MSG_MISSING_DOWNLOAD_PARAMS, MSG_NO_FILES_SELECTED,
    MSG_STORAGE_NOT_FOUND, MSG_UNSUPPORTED_FORM, WebError,
};
use super::render::{self, ViewPage};
use crate::bundle::{ARCHIVE_NAME, BundleError, build_bundle, file_name_from_download_url, sanitize_entry_name};
use crate::category::{ALL_FILES_LABEL, Category};
use crate::listing;

/// Attachment name used when neither the request nor the URL names the file.
const FALLBACK_FILE_NAME: &str = "download";

#[derive(Debug, Deserialize)]
pub(crate) struct SearchQuery {
    #[serde(default)]
    public_key: String,
    path: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ViewQuery {
    public_key: Option<String>,
    #[serde(default)]
    path: String,
    file_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FolderQuery {
    public_key: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DownloadQuery {
    download_url: Option<String>,
    file_name: Option<String>,
}

/// `GET /` - entry page.
pub(crate) async fn search(Query(query): Query<SearchQuery>) -> Html<String> {
    Html(render::search_page(
        &query.public_key,
        query.path.as_deref(),
        query.message.as_deref(),
    ))
}

/// `GET /view` - listing page, or a redirect back to `/` with a message.
pub(crate) async fn view(State(state): State<AppState>, Query(query): Query<ViewQuery>) -> Response {
    let file_type = query
        .file_type
        .as_deref()
        .filter(|label| !label.is_empty())
        .unwrap_or(ALL_FILES_LABEL);
    let category = Category::from_label(file_type);
    if category == Category::Unrecognized {
        debug!(file_type, "unrecognized category label");
    }

    let result = listing::browse(
        state.api(),
        state.cache(),
        query.public_key.as_deref(),
        &query.path,
        category,
    )
    .await;

    match result {
        Ok(files) => Html(render::view_page(&ViewPage {
            public_key: query.public_key.as_deref().unwrap_or(""),
            current_path: &query.path,
            file_type,
            files: &files,
        }))
        .into_response(),
        Err(error) => {
            debug!(error = %error, "redirecting to entry page");
            let target = render::link(
                "/",
                &[
                    ("public_key", query.public_key.as_deref().unwrap_or("")),
                    ("path", query.path.as_str()),
                    ("message", MSG_STORAGE_NOT_FOUND),
                ],
            );
            Redirect::to(&target).into_response()
        }
    }
}

/// `GET /folder/*name` - shortcut into `/view` for a folder path.
pub(crate) async fn folder(
    Path(name): Path<String>,
    Query(query): Query<FolderQuery>,
) -> Redirect {
    let path = if name.starts_with('/') {
        name
    } else {
        format!("/{name}")
    };
    let target = render::link(
        "/view",
        &[
            ("public_key", query.public_key.as_deref().unwrap_or("")),
            ("path", path.as_str()),
        ],
    );
    Redirect::to(&target)
}

/// `POST /download_selected` - zip of every `selected_files` URL in the form.
pub(crate) async fn download_selected(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if !is_urlencoded_form(&headers) {
        info!(
            content_type = ?headers.get(CONTENT_TYPE),
            "bundle form posted in an unsupported encoding"
        );
        return WebError::UnsupportedMediaType(MSG_UNSUPPORTED_FORM).into_response();
    }

    let urls: Vec<String> = form_urlencoded::parse(&body)
        .filter(|(key, value)| key == "selected_files" && !value.trim().is_empty())
        .map(|(_, value)| value.into_owned())
        .collect();

    if urls.is_empty() {
        info!("bundle requested without selected files");
        return WebError::BadRequest(MSG_NO_FILES_SELECTED).into_response();
    }

    match build_bundle(state.api(), &urls, state.bundle_concurrency()).await {
        Ok(bundle) => attachment(bundle.archive, ARCHIVE_NAME, "application/zip"),
        Err(BundleError::NoFiles) => WebError::BadRequest(MSG_NO_FILES_SELECTED).into_response(),
        Err(err @ BundleError::Archive { .. }) => {
            error!(error = %err, "failed to assemble bundle");
            WebError::Internal(MSG_ARCHIVE_FAILED).into_response()
        }
    }
}

/// `GET /download` - one remote file as an attachment.
pub(crate) async fn download(
    State(state): State<AppState>,
    Query(query): Query<DownloadQuery>,
) -> Response {
    let Some(download_url) = query
        .download_url
        .as_deref()
        .map(str::trim)
        .filter(|url| !url.is_empty())
    else {
        info!("download requested without download_url");
        return WebError::BadRequest(MSG_MISSING_DOWNLOAD_PARAMS).into_response();
    };

    let file_name = query
        .file_name
        .filter(|name| !name.trim().is_empty())
        .or_else(|| file_name_from_download_url(download_url))
        .unwrap_or_else(|| FALLBACK_FILE_NAME.to_string());

    match state.api().download_file(download_url).await {
        Ok(bytes) => attachment(bytes, &file_name, "application/octet-stream"),
        Err(err) => {
            error!(url = %download_url, error = %err, "single file download failed");
            WebError::Internal(MSG_DOWNLOAD_FAILED).into_response()
        }
    }
}

/// A missing `Content-Type` is read as a url-encoded form.
fn is_urlencoded_form(headers: &HeaderMap) -> bool {
    let Some(value) = headers.get(CONTENT_TYPE) else {
        return true;
    };
    value
        .to_str()
        .ok()
        .and_then(|text| text.split(';').next())
        .is_some_and(|mime| {
            mime.trim()
                .eq_ignore_ascii_case("application/x-www-form-urlencoded")
        })
}

/// `GET /health` - liveness check.
pub(crate) async fn health() -> &'static str {
    "ok"
}

fn attachment(bytes: Vec<u8>, file_name: &str, content_type: &'static str) -> Response {
    (
        [
            (CONTENT_TYPE, HeaderValue::from_static(content_type)),
            (CONTENT_DISPOSITION, content_disposition(file_name)),
        ],
        bytes,
    )
        .into_response()
}

/// `attachment` disposition with an ASCII fallback and an RFC 5987 UTF-8 name.
pub(crate) fn content_disposition(file_name: &str) -> HeaderValue {
    let name = sanitize_entry_name(file_name);
    let ascii: String = name
        .chars()
        .map(|c| if c.is_ascii() && c != '\\' && c != '"' { c } else { '_' })
        .collect();
    let value = format!(
        "attachment; filename=\"{ascii}\"; filename*=UTF-8''{}",
        urlencoding::encode(&name)
    );
    HeaderValue::from_str(&value).unwrap_or_else(|_| HeaderValue::from_static("attachment"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers_with(content_type: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        headers
    }

    #[test]
    fn test_is_urlencoded_form_accepts_form_and_missing_type() {
        assert!(is_urlencoded_form(&HeaderMap::new()));
        assert!(is_urlencoded_form(&headers_with(
            "application/x-www-form-urlencoded"
        )));
        assert!(is_urlencoded_form(&headers_with(
            "Application/X-WWW-Form-Urlencoded; charset=UTF-8"
        )));
    }

    #[test]
    fn test_is_urlencoded_form_rejects_multipart_and_json() {
        assert!(!is_urlencoded_form(&headers_with(
            "multipart/form-data; boundary=xyz"
        )));
        assert!(!is_urlencoded_form(&headers_with("application/json")));
    }

    #[test]
    fn test_content_disposition_ascii_name() {
        let value = content_disposition("report.pdf");
        assert_eq!(
            value.to_str().ok(),
            Some("attachment; filename=\"report.pdf\"; filename*=UTF-8''report.pdf")
        );
    }

    #[test]
    fn test_content_disposition_unicode_name_has_fallback() {
        let value = content_disposition("отчёт.pdf");
        let text = value.to_str().unwrap_or_default();
        assert!(text.contains("filename=\"_____.pdf\""), "{text}");
        assert!(
            text.contains("filename*=UTF-8''%D0%BE%D1%82%D1%87%D1%91%D1%82.pdf"),
            "{text}"
        );
    }

    #[test]
    fn test_content_disposition_strips_separators_and_quotes() {
        let value = content_disposition("../\"evil\".txt");
        let text = value.to_str().unwrap_or_default();
        assert!(!text.contains('/'), "{text}");
        assert!(text.starts_with("attachment; filename=\".._"), "{text}");
    }
}
