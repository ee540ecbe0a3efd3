use axum::{
    extract::{Multipart, Path, State},
    http::{header, HeaderValue},
    response::{Html, IntoResponse, Redirect, Response},
};
use minijinja::context;
use std::sync::Arc;

use crate::core::error::{AppError, Result};
use crate::features::auth::CurrentUser;
use crate::features::files::dtos::{
    content_disposition, content_type, FileFormDto, FileListItemDto, FileRefDto,
};
use crate::features::files::services::FileService;
use crate::shared::templates;

/// Show all the files the current user owns, most recent first
pub async fn list_files(
    user: CurrentUser,
    State(service): State<Arc<FileService>>,
) -> Result<Html<String>> {
    let files: Vec<FileListItemDto> = service
        .list_for_author(&user)
        .await?
        .into_iter()
        .map(FileListItemDto::from)
        .collect();

    let page = templates::render("files/index.html", context! { user => user, files => files })?;
    Ok(Html(page))
}

pub async fn create_form(user: CurrentUser) -> Result<Html<String>> {
    let page = templates::render("files/create.html", context! { user => user })?;
    Ok(Html(page))
}

/// Upload a file
///
/// Accepts multipart/form-data with:
/// - `friendly_title`: display name (required, non-empty)
/// - `file`: the file contents
///
/// An empty title re-renders the form with a flash message.
pub async fn create_file(
    user: CurrentUser,
    State(service): State<Arc<FileService>>,
    multipart: Multipart,
) -> Result<Response> {
    let form = FileFormDto::from_multipart(multipart).await?;
    let friendly_title = form.friendly_title.clone();

    match service.create_file(&user, form).await {
        Ok(_) => Ok(Redirect::to("/").into_response()),
        Err(AppError::Validation(error)) => {
            let page = templates::render(
                "files/create.html",
                context! { user => user, error => error, friendly_title => friendly_title },
            )?;
            Ok(Html(page).into_response())
        }
        Err(e) => Err(e),
    }
}

/// Stream a file back under its title. Anyone holding the id may download.
pub async fn download_file(
    Path(id): Path<i64>,
    State(service): State<Arc<FileService>>,
) -> Result<Response> {
    let file = service.download(id).await?;

    let mime = HeaderValue::from_str(&content_type(&file.friendly_title))
        .map_err(|e| AppError::Internal(format!("Invalid Content-Type: {}", e)))?;
    let disposition = HeaderValue::from_str(&content_disposition(&file.friendly_title))
        .map_err(|e| AppError::Internal(format!("Invalid Content-Disposition: {}", e)))?;

    Ok((
        [
            (header::CONTENT_TYPE, mime),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        file.contents,
    )
        .into_response())
}

/// Edit form for a file the current user owns
pub async fn update_form(
    user: CurrentUser,
    Path(id): Path<i64>,
    State(service): State<Arc<FileService>>,
) -> Result<Html<String>> {
    let file = FileRefDto::from(service.get_file(id, &user, true).await?);

    let page = templates::render("files/update.html", context! { user => user, file => file })?;
    Ok(Html(page))
}

/// Replace a file's title and contents
///
/// The service checks ownership before validating; an empty title re-renders
/// the edit form with the stored record loaded.
pub async fn update_file(
    user: CurrentUser,
    Path(id): Path<i64>,
    State(service): State<Arc<FileService>>,
    multipart: Multipart,
) -> Result<Response> {
    let form = FileFormDto::from_multipart(multipart).await?;

    match service.update_file(&user, id, form).await {
        Ok(_) => Ok(Redirect::to("/").into_response()),
        Err(AppError::Validation(error)) => {
            let file = FileRefDto::from(service.get_file(id, &user, true).await?);
            let page = templates::render(
                "files/update.html",
                context! { user => user, file => file, error => error },
            )?;
            Ok(Html(page).into_response())
        }
        Err(e) => Err(e),
    }
}

pub async fn delete_file(
    user: CurrentUser,
    Path(id): Path<i64>,
    State(service): State<Arc<FileService>>,
) -> Result<Redirect> {
    service.delete_file(&user, id).await?;
    Ok(Redirect::to("/"))
}
