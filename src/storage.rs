//! Blob storage for uploaded images (payment slips, PromptPay QR codes).
//!
//! A [`BlobStore`] accepts a binary under a key and hands back a URL the
//! client can later fetch it from.

use std::{
    collections::HashMap,
    path::PathBuf,
    sync::{Mutex, PoisonError},
};

use async_trait::async_trait;
use axum::body::Bytes;
use thiserror::Error;
use uuid::Uuid;

/// An image received from a client, not yet stored.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub bytes: Bytes,
    pub content_type: String,
}

impl ImageUpload {
    pub fn new(bytes: impl Into<Bytes>, content_type: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            content_type: content_type.into(),
        }
    }
}

/// Path prefix under which [`LocalBlobStore`] files are served.
pub const UPLOADS_ROUTE: &str = "/uploads";

#[derive(Debug, Error)]
pub enum BlobError {
    #[error("upload is empty")]
    Empty,

    #[error("unsupported content type {0}")]
    UnsupportedType(String),

    #[error("upload of {size} bytes exceeds limit of {limit} bytes")]
    TooLarge { size: usize, limit: usize },

    #[error("storage io error")]
    Io(#[from] std::io::Error),

    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Stores `bytes` under `key` and returns a retrievable URL.
    async fn put(&self, key: &str, bytes: Bytes, content_type: &str) -> Result<String, BlobError>;
}

/// Builds `<prefix>/<uuid>.<ext>` for an accepted image content type.
pub fn object_key(prefix: &str, content_type: &str) -> Result<String, BlobError> {
    let ext = match content_type {
        "image/jpeg" | "image/jpg" => "jpg",
        "image/png" => "png",
        "image/webp" => "webp",
        "image/heic" => "heic",
        other => return Err(BlobError::UnsupportedType(other.to_string())),
    };
    Ok(format!("{prefix}/{}.{ext}", Uuid::new_v4()))
}

/// Filesystem-backed store; files are served by the HTTP layer at [`UPLOADS_ROUTE`].
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
    public_base_url: String,
    max_bytes: usize,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>, max_bytes: usize) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into(),
            max_bytes,
        }
    }

    pub fn root(&self) -> &PathBuf {
        &self.root
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(&self, key: &str, bytes: Bytes, _content_type: &str) -> Result<String, BlobError> {
        if bytes.is_empty() {
            return Err(BlobError::Empty);
        }
        if bytes.len() > self.max_bytes {
            return Err(BlobError::TooLarge {
                size: bytes.len(),
                limit: self.max_bytes,
            });
        }

        let path = self.root.join(key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, &bytes).await?;
        tracing::debug!(key, size = bytes.len(), "blob stored");

        Ok(format!("{}{UPLOADS_ROUTE}/{key}", self.public_base_url))
    }
}

/// Process-local store, handy for tests and demos.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    objects: Mutex<HashMap<String, (Bytes, String)>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<(Bytes, String)> {
        self.objects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.objects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, key: &str, bytes: Bytes, content_type: &str) -> Result<String, BlobError> {
        if bytes.is_empty() {
            return Err(BlobError::Empty);
        }
        self.objects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), (bytes, content_type.to_string()));
        Ok(format!("memory://{key}"))
    }
}
