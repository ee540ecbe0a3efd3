use axum::extract::Multipart;
use serde::Serialize;
use tracing::debug;
use validator::{Validate, ValidationErrors};

use crate::core::error::AppError;
use crate::features::files::models::{FileListing, FileRef};

/// Flash message shown when an upload or edit arrives without a title
pub const TITLE_REQUIRED: &str = "Title is required.";

/// Upload/edit form as submitted by the browser
#[derive(Debug, Clone, Validate)]
pub struct FileFormDto {
    #[validate(length(min = 1, message = "Title is required."))]
    pub friendly_title: String,
    pub contents: Vec<u8>,
}

impl FileFormDto {
    /// Read `friendly_title` and `file` from a multipart body.
    ///
    /// Both fields must be present; an empty title is left for validation so
    /// the form can be shown again with a message.
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut friendly_title: Option<String> = None;
        let mut contents: Option<Vec<u8>> = None;

        while let Some(field) = multipart.next_field().await.map_err(|e| {
            debug!("Failed to read multipart field: {}", e);
            AppError::BadRequest(format!("Failed to read multipart data: {}", e))
        })? {
            let field_name = field.name().unwrap_or("").to_string();

            match field_name.as_str() {
                "friendly_title" => {
                    let text = field.text().await.map_err(|e| {
                        AppError::BadRequest(format!("Failed to read title field: {}", e))
                    })?;
                    friendly_title = Some(text);
                }
                "file" => {
                    let data = field.bytes().await.map_err(|e| {
                        debug!("Failed to read file bytes: {}", e);
                        AppError::BadRequest(format!("Failed to read file data: {}", e))
                    })?;
                    contents = Some(data.to_vec());
                }
                _ => {
                    debug!("Ignoring unknown field: {}", field_name);
                }
            }
        }

        let friendly_title = friendly_title
            .ok_or_else(|| AppError::BadRequest("friendly_title is required".to_string()))?;
        let contents =
            contents.ok_or_else(|| AppError::BadRequest("File is required".to_string()))?;

        Ok(Self {
            friendly_title,
            contents,
        })
    }

    /// Validate the form, turning the first failure into `AppError::Validation`
    pub fn check(&self) -> Result<(), AppError> {
        self.validate()
            .map_err(|e| AppError::Validation(first_message(&e)))
    }
}

fn first_message(errors: &ValidationErrors) -> String {
    errors
        .field_errors()
        .values()
        .flat_map(|errs| errs.iter())
        .find_map(|err| err.message.as_ref().map(|m| m.to_string()))
        .unwrap_or_else(|| TITLE_REQUIRED.to_string())
}

/// Row of the listing page
#[derive(Debug, Serialize)]
pub struct FileListItemDto {
    pub id: i64,
    pub friendly_title: String,
    pub username: String,
    pub created: String,
    pub size: i64,
}

impl From<FileListing> for FileListItemDto {
    fn from(file: FileListing) -> Self {
        Self {
            id: file.id,
            friendly_title: file.friendly_title,
            username: file.username,
            created: file.created.format("%Y-%m-%d %H:%M").to_string(),
            size: file.size,
        }
    }
}

/// What the edit page needs to know about the record being edited
#[derive(Debug, Serialize)]
pub struct FileRefDto {
    pub id: i64,
    pub friendly_title: String,
}

impl From<FileRef> for FileRefDto {
    fn from(file: FileRef) -> Self {
        Self {
            id: file.id,
            friendly_title: file.friendly_title,
        }
    }
}

/// Build a `Content-Disposition` value suggesting `title` as the filename.
///
/// The quoted `filename` is an ASCII fallback; `filename*` carries the exact
/// title percent-encoded as UTF-8.
pub fn content_disposition(title: &str) -> String {
    let fallback: String = title
        .chars()
        .map(|c| {
            if c.is_ascii() && !c.is_ascii_control() && c != '"' && c != '\\' {
                c
            } else {
                '_'
            }
        })
        .collect();

    format!(
        "inline; filename=\"{}\"; filename*=UTF-8''{}",
        fallback,
        urlencoding::encode(title)
    )
}

/// Guess a `Content-Type` from the extension of `title`, falling back to
/// `application/octet-stream`
pub fn content_type(title: &str) -> String {
    mime_guess::from_path(title)
        .first_or_octet_stream()
        .to_string()
}
