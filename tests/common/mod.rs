#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Bytes;
use chrono::Utc;
use marketplace_api::{
    db::{create_orm_conn, run_migrations},
    dto::{
        orders::{CheckoutRequest, CheckoutResponse},
        products::CreateProductRequest,
    },
    entity::users::{ActiveModel as UserActive, Role},
    middleware::auth::AuthUser,
    models::Product,
    services::{order_service, product_service},
    state::AppState,
    storage::{BlobError, BlobStore, ImageUpload, MemoryBlobStore},
};
use sea_orm::{ActiveModelTrait, Set};
use uuid::Uuid;

pub const JWT_SECRET: &str = "test-secret";

pub struct TestApp {
    pub state: AppState,
    pub blobs: Arc<MemoryBlobStore>,
}

/// Fresh in-memory database with every migration applied.
pub async fn setup() -> anyhow::Result<TestApp> {
    let blobs = Arc::new(MemoryBlobStore::new());
    let state = setup_with_blobs(blobs.clone()).await?;
    Ok(TestApp { state, blobs })
}

pub async fn setup_with_blobs(blobs: Arc<dyn BlobStore>) -> anyhow::Result<AppState> {
    let orm = create_orm_conn("sqlite::memory:", 1).await?;
    run_migrations(&orm).await?;
    Ok(AppState::new(orm, blobs, JWT_SECRET))
}

/// Blob backend that is always down.
pub struct FailingBlobStore;

#[async_trait]
impl BlobStore for FailingBlobStore {
    async fn put(&self, _key: &str, _bytes: Bytes, _content_type: &str) -> Result<String, BlobError> {
        Err(BlobError::Unavailable("bucket offline".into()))
    }
}

pub async fn create_user(state: &AppState, role: Role, username: &str) -> anyhow::Result<AuthUser> {
    create_user_with_address(state, role, username, "12 Sukhumvit Rd, Bangkok").await
}

pub async fn create_user_with_address(
    state: &AppState,
    role: Role,
    username: &str,
    address: &str,
) -> anyhow::Result<AuthUser> {
    let user = UserActive {
        id: Set(Uuid::new_v4()),
        email: Set(format!("{username}-{}@example.com", Uuid::new_v4())),
        password_hash: Set("not-a-real-hash".into()),
        role: Set(role),
        username: Set(username.into()),
        address: Set(address.into()),
        phone: Set("0812345678".into()),
        profile_image_url: Set(None),
        promptpay_qr_url: Set(None),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await?;

    Ok(AuthUser {
        user_id: user.id,
        role,
    })
}

pub async fn create_product(
    state: &AppState,
    seller: &AuthUser,
    name: &str,
    price: &str,
) -> anyhow::Result<Product> {
    let resp = product_service::create_product(
        state,
        seller,
        CreateProductRequest {
            name: name.into(),
            price: price.into(),
            detail: format!("{name} in good condition"),
            status: None,
        },
    )
    .await?;
    Ok(resp.data.expect("created product"))
}

pub fn slip() -> ImageUpload {
    ImageUpload::new(Bytes::from_static(b"\xff\xd8\xff\xe0fake-jpeg"), "image/jpeg")
}

pub fn checkout_request(product_id: Uuid) -> CheckoutRequest {
    CheckoutRequest {
        product_id,
        address: Some("99 Rama IV Rd, Bangkok 10500".into()),
        phone: Some("0899999999".into()),
    }
}

pub async fn place_order(
    state: &AppState,
    buyer: &AuthUser,
    product_id: Uuid,
) -> anyhow::Result<CheckoutResponse> {
    let resp = order_service::place_order(state, buyer, checkout_request(product_id), slip()).await?;
    Ok(resp.data.expect("checkout response"))
}
