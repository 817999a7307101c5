//! HTTP error responses.
//!
//! Handlers return [`WebError`] for anything that is not a page or a file. The
//! body is always a short plain-text message; details stay in the server log.

use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};

/// Banner shown on the entry page when a listing cannot be loaded.
pub const MSG_STORAGE_NOT_FOUND: &str = "Хранилище не найдено.";
/// Bundle request without any selected file.
pub const MSG_NO_FILES_SELECTED: &str = "Не выбраны файлы для скачивания";
/// Single download without a download URL.
pub const MSG_MISSING_DOWNLOAD_PARAMS: &str = "Недостаточно параметров для скачивания";
/// Remote fetch failed.
pub const MSG_DOWNLOAD_FAILED: &str = "Ошибка при скачивании файла";
/// Zip writer failed.
pub const MSG_ARCHIVE_FAILED: &str = "Ошибка при создании архива";
/// Bundle form posted with something other than `application/x-www-form-urlencoded`.
pub const MSG_UNSUPPORTED_FORM: &str = "Неподдерживаемый формат формы";

/// Error responses produced by handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebError {
    /// Required input is missing (400).
    BadRequest(&'static str),
    /// Request body in a format the handler does not read (415).
    UnsupportedMediaType(&'static str),
    /// Upstream or unexpected failure (500).
    Internal(&'static str),
}

impl WebError {
    #[must_use]
    pub fn status(self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Self::BadRequest(message)
            | Self::UnsupportedMediaType(message)
            | Self::Internal(message) => message,
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        (
            self.status(),
            [(CONTENT_TYPE, "text/plain; charset=utf-8")],
            self.message(),
        )
            .into_response()
    }
}
