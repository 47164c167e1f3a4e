//! Helpers for reading `multipart/form-data` bodies.

use axum::extract::{
    Multipart,
    multipart::{Field, MultipartError},
};
use utoipa::ToSchema;

use crate::{error::AppError, storage::ImageUpload};

/// Single-image multipart body, for the API docs.
#[derive(ToSchema)]
pub struct ImageForm {
    #[schema(value_type = String, format = Binary)]
    pub image: Vec<u8>,
}

pub(crate) fn form_error(err: MultipartError) -> AppError {
    AppError::BadRequest(format!("invalid form data: {}", err.body_text()))
}

pub(crate) async fn text_field(field: Field<'_>) -> Result<String, AppError> {
    field.text().await.map_err(form_error)
}

/// Reads a file part, keeping the content type the client declared.
pub(crate) async fn image_field(field: Field<'_>) -> Result<ImageUpload, AppError> {
    let content_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_string();
    let bytes = field.bytes().await.map_err(form_error)?;
    Ok(ImageUpload::new(bytes, content_type))
}

/// Reads the named file part of a form, ignoring any other parts.
pub(crate) async fn required_image(
    multipart: &mut Multipart,
    name: &str,
) -> Result<ImageUpload, AppError> {
    let mut image = None;
    while let Some(field) = multipart.next_field().await.map_err(form_error)? {
        if field.name() == Some(name) {
            image = Some(image_field(field).await?);
        }
    }
    image.ok_or_else(|| AppError::BadRequest(format!("{name} image is required")))
}
