use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use uuid::Uuid;

use crate::{
    audit,
    dto::{
        products::ProductList,
        users::{PublicProfile, SellerPaymentInfo, UpdateProfileRequest},
    },
    entity::users::{ActiveModel as UserActive, Entity as Users, Model as UserModel, Role},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_seller},
    models::User,
    response::ApiResponse,
    routes::params::ProductQuery,
    services::{
        images::{PROFILE_IMAGE, PROMPTPAY_QR},
        product_service,
    },
    state::AppState,
    storage::ImageUpload,
};

pub async fn get_me(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<User>> {
    let me = find_user(state, user).await?;
    Ok(ApiResponse::item("OK", User::from(me)))
}

pub async fn update_profile(
    state: &AppState,
    user: &AuthUser,
    payload: UpdateProfileRequest,
) -> AppResult<ApiResponse<User>> {
    let username = non_blank("username", payload.username)?;
    let address = non_blank("address", payload.address)?;
    let phone = non_blank("phone", payload.phone)?;

    let me = find_user(state, user).await?;
    let mut active: UserActive = me.into();
    if let Some(username) = username {
        active.username = Set(username);
    }
    if let Some(address) = address {
        active.address = Set(address);
    }
    if let Some(phone) = phone {
        active.phone = Set(phone);
    }
    let me = active.update(&state.orm).await?;

    audit::record(
        &state.orm,
        user.user_id,
        "profile_update",
        "users",
        serde_json::json!({}),
    )
    .await;

    Ok(ApiResponse::item("Profile updated", User::from(me)))
}

/// Stores a seller's PromptPay QR image and links it to their profile.
pub async fn upload_promptpay_qr(
    state: &AppState,
    user: &AuthUser,
    qr: ImageUpload,
) -> AppResult<ApiResponse<User>> {
    ensure_seller(user)?;
    let me = find_user(state, user).await?;
    let url = PROMPTPAY_QR.store(state, qr).await?;

    let mut active: UserActive = me.into();
    active.promptpay_qr_url = Set(Some(url));
    let me = active.update(&state.orm).await?;

    tracing::info!(seller_id = %me.id, "promptpay qr updated");
    Ok(ApiResponse::item("QR code uploaded", User::from(me)))
}

pub async fn upload_profile_image(
    state: &AppState,
    user: &AuthUser,
    image: ImageUpload,
) -> AppResult<ApiResponse<User>> {
    let me = find_user(state, user).await?;
    let url = PROFILE_IMAGE.store(state, image).await?;

    let mut active: UserActive = me.into();
    active.profile_image_url = Set(Some(url));
    let me = active.update(&state.orm).await?;

    audit::record(
        &state.orm,
        user.user_id,
        "profile_image_upload",
        "users",
        serde_json::json!({}),
    )
    .await;

    Ok(ApiResponse::item("Profile image uploaded", User::from(me)))
}

/// The part of a profile anyone may see. Contact details stay private.
pub async fn get_public_profile(state: &AppState, id: Uuid) -> AppResult<ApiResponse<PublicProfile>> {
    let found = Users::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::item("OK", PublicProfile::from(found)))
}

/// A seller's storefront: their available listings, paged like the catalog.
pub async fn seller_storefront(
    state: &AppState,
    seller_id: Uuid,
    query: ProductQuery,
) -> AppResult<ApiResponse<ProductList>> {
    find_seller(state, seller_id).await?;
    product_service::list_catalog(
        state,
        ProductQuery {
            seller_id: Some(seller_id),
            ..query
        },
    )
    .await
}

/// Payment details a buyer sees before transferring money to a seller.
pub async fn seller_payment_info(
    state: &AppState,
    seller_id: Uuid,
) -> AppResult<ApiResponse<SellerPaymentInfo>> {
    let seller = find_seller(state, seller_id).await?;

    Ok(ApiResponse::item(
        "OK",
        SellerPaymentInfo {
            seller_id: seller.id,
            shop_name: seller.username,
            promptpay_qr_url: seller.promptpay_qr_url,
        },
    ))
}

async fn find_user(state: &AppState, user: &AuthUser) -> AppResult<UserModel> {
    Users::find_by_id(user.user_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Unknown user".into()))
}

async fn find_seller(state: &AppState, id: Uuid) -> AppResult<UserModel> {
    Users::find_by_id(id)
        .one(&state.orm)
        .await?
        .filter(|u| u.role == Role::Seller)
        .ok_or(AppError::NotFound)
}

fn non_blank(field: &str, value: Option<String>) -> AppResult<Option<String>> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if v.is_empty() => Err(AppError::BadRequest(format!("{field} must not be empty"))),
        other => Ok(other),
    }
}
