//! Naming and storing the images clients upload.

use crate::{
    error::{AppError, AppResult},
    state::AppState,
    storage::{BlobError, ImageUpload, object_key},
};

/// Where a kind of image lives in the blob store, and what to call it in errors.
#[derive(Debug, Clone, Copy)]
pub struct ImageKind {
    pub prefix: &'static str,
    pub label: &'static str,
}

pub const PAYMENT_SLIP: ImageKind = ImageKind {
    prefix: "payment_slips",
    label: "Payment slip",
};

pub const PROMPTPAY_QR: ImageKind = ImageKind {
    prefix: "promptpay_qr",
    label: "QR code",
};

pub const PRODUCT_IMAGE: ImageKind = ImageKind {
    prefix: "product_images",
    label: "Product image",
};

pub const PROFILE_IMAGE: ImageKind = ImageKind {
    prefix: "profile_images",
    label: "Profile image",
};

impl ImageKind {
    /// Validates the upload and picks its object key without storing anything.
    pub fn key_for(self, upload: &ImageUpload) -> AppResult<String> {
        if upload.bytes.is_empty() {
            return Err(AppError::upload(self.label, BlobError::Empty));
        }
        object_key(self.prefix, &upload.content_type).map_err(|err| AppError::upload(self.label, err))
    }

    pub async fn put(self, state: &AppState, key: &str, upload: ImageUpload) -> AppResult<String> {
        state
            .blobs
            .put(key, upload.bytes, &upload.content_type)
            .await
            .map_err(|err| {
                tracing::warn!(error = %err, key, kind = self.label, "image upload failed");
                AppError::upload(self.label, err)
            })
    }

    pub async fn store(self, state: &AppState, upload: ImageUpload) -> AppResult<String> {
        let key = self.key_for(&upload)?;
        self.put(state, &key, upload).await
    }
}
