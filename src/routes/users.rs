use axum::{
    Json, Router,
    extract::{Multipart, Path, Query, State},
    routing::{get, put},
};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    dto::{
        products::ProductList,
        users::{PublicProfile, SellerPaymentInfo, UpdateProfileRequest},
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::User,
    response::ApiResponse,
    routes::{
        form::{ImageForm, required_image},
        params::ProductQuery,
    },
    services::user_service,
    state::AppState,
};

/// Multipart body for the QR upload, for the API docs.
#[derive(ToSchema)]
pub struct QrForm {
    #[schema(value_type = String, format = Binary)]
    pub qr: Vec<u8>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/me", get(get_me).put(update_me))
        .route("/me/promptpay-qr", put(upload_promptpay_qr))
        .route("/me/profile-image", put(upload_profile_image))
        .route("/{id}", get(get_profile))
        .route("/{id}/products", get(seller_products))
        .route("/{id}/payment", get(seller_payment))
}

#[utoipa::path(
    get,
    path = "/api/users/me",
    responses(
        (status = 200, description = "Current user's profile", body = ApiResponse<User>)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn get_me(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<User>>> {
    let resp = user_service::get_me(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/users/me",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated profile", body = ApiResponse<User>),
        (status = 400, description = "Blank field")
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn update_me(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> AppResult<Json<ApiResponse<User>>> {
    let resp = user_service::update_profile(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/users/me/promptpay-qr",
    request_body(content = QrForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "QR stored", body = ApiResponse<User>),
        (status = 400, description = "Missing, empty or non-image file"),
        (status = 403, description = "Not a seller"),
        (status = 413, description = "Image too large"),
        (status = 502, description = "Upload failed")
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn upload_promptpay_qr(
    State(state): State<AppState>,
    user: AuthUser,
    mut multipart: Multipart,
) -> AppResult<Json<ApiResponse<User>>> {
    let qr = required_image(&mut multipart, "qr").await?;
    let resp = user_service::upload_promptpay_qr(&state, &user, qr).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/users/me/profile-image",
    request_body(content = ImageForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Profile with its new image", body = ApiResponse<User>),
        (status = 400, description = "Missing, empty or non-image file"),
        (status = 413, description = "Image too large"),
        (status = 502, description = "Upload failed")
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn upload_profile_image(
    State(state): State<AppState>,
    user: AuthUser,
    mut multipart: Multipart,
) -> AppResult<Json<ApiResponse<User>>> {
    let image = required_image(&mut multipart, "image").await?;
    let resp = user_service::upload_profile_image(&state, &user, image).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Public profile", body = ApiResponse<PublicProfile>),
        (status = 404, description = "User not found")
    ),
    tag = "Users"
)]
pub async fn get_profile(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<PublicProfile>>> {
    let resp = user_service::get_public_profile(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/users/{id}/products",
    params(
        ("id" = Uuid, Path, description = "Seller ID"),
        ProductQuery
    ),
    responses(
        (status = 200, description = "The seller's available listings", body = ApiResponse<ProductList>),
        (status = 404, description = "Seller not found")
    ),
    tag = "Users"
)]
pub async fn seller_products(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<ProductQuery>,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    let resp = user_service::seller_storefront(&state, id, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/users/{id}/payment",
    params(
        ("id" = Uuid, Path, description = "Seller ID")
    ),
    responses(
        (status = 200, description = "Seller payment details", body = ApiResponse<SellerPaymentInfo>),
        (status = 404, description = "Seller not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn seller_payment(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<SellerPaymentInfo>>> {
    let resp = user_service::seller_payment_info(&state, id).await?;
    Ok(Json(resp))
}
