use std::sync::Arc;

use crate::{db::OrmConn, storage::BlobStore};

#[derive(Clone)]
pub struct AppState {
    pub orm: OrmConn,
    pub blobs: Arc<dyn BlobStore>,
    pub jwt_secret: Arc<str>,
}

impl AppState {
    pub fn new(orm: OrmConn, blobs: Arc<dyn BlobStore>, jwt_secret: impl Into<Arc<str>>) -> Self {
        Self {
            orm,
            blobs,
            jwt_secret: jwt_secret.into(),
        }
    }
}
