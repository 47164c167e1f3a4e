use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::cart::{AddToCartRequest, CartList},
    entity::{
        cart_items::{
            ActiveModel as CartActive, Column as CartCol, Entity as CartItems, Model as CartModel,
        },
        products::{Model as ProductModel, ProductStatus},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_buyer},
    models::CartItem,
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    services::product_service::find_product,
    state::AppState,
};

pub async fn list_cart(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<CartList>> {
    ensure_buyer(user)?;
    let (page, limit, offset) = pagination.normalize();

    let finder = CartItems::find()
        .filter(CartCol::BuyerId.eq(user.user_id))
        .order_by_desc(CartCol::AddedAt);

    let total = finder.clone().count(&state.orm).await?;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(CartItem::from)
        .collect();

    Ok(ApiResponse::success(
        "OK",
        CartList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

/// Saves a snapshot of the product in the buyer's cart; adding the same
/// product again refreshes the snapshot.
pub async fn add_to_cart(
    state: &AppState,
    user: &AuthUser,
    payload: AddToCartRequest,
) -> AppResult<ApiResponse<CartItem>> {
    ensure_buyer(user)?;

    let product = match find_product(state, payload.product_id).await {
        Ok(product) => product,
        Err(AppError::NotFound) => {
            return Err(AppError::BadRequest("product not found".to_string()));
        }
        Err(err) => return Err(err),
    };
    if product.seller_id == user.user_id {
        return Err(AppError::BadRequest("cannot add your own product".into()));
    }
    if product.status != ProductStatus::Available {
        return Err(AppError::Conflict("product is not available".into()));
    }

    let cart_item = match find_entry(state, user.user_id, product.id).await? {
        Some(entry) => {
            let mut active: CartActive = entry.into();
            apply_snapshot(&mut active, &product);
            active.update(&state.orm).await?
        }
        None => {
            let mut active = CartActive {
                id: Set(Uuid::new_v4()),
                buyer_id: Set(user.user_id),
                product_id: Set(product.id),
                ..Default::default()
            };
            apply_snapshot(&mut active, &product);
            active.insert(&state.orm).await?
        }
    };

    audit::record(
        &state.orm,
        user.user_id,
        "cart_update",
        "cart_items",
        serde_json::json!({ "product_id": payload.product_id }),
    )
    .await;

    Ok(ApiResponse::item("Added to cart", CartItem::from(cart_item)))
}

pub async fn remove_from_cart(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_buyer(user)?;
    let result = CartItems::delete_many()
        .filter(
            Condition::all()
                .add(CartCol::BuyerId.eq(user.user_id))
                .add(CartCol::ProductId.eq(product_id)),
        )
        .exec(&state.orm)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        &state.orm,
        user.user_id,
        "cart_remove",
        "cart_items",
        serde_json::json!({ "product_id": product_id }),
    )
    .await;

    Ok(ApiResponse::ack("Removed from cart"))
}

async fn find_entry(
    state: &AppState,
    buyer_id: Uuid,
    product_id: Uuid,
) -> AppResult<Option<CartModel>> {
    Ok(CartItems::find()
        .filter(
            Condition::all()
                .add(CartCol::BuyerId.eq(buyer_id))
                .add(CartCol::ProductId.eq(product_id)),
        )
        .one(&state.orm)
        .await?)
}

fn apply_snapshot(active: &mut CartActive, product: &ProductModel) {
    active.name = Set(product.name.clone());
    active.price = Set(product.price);
    active.detail = Set(product.detail.clone());
    active.image_url = Set(product.image_url.clone());
    active.seller_id = Set(product.seller_id);
    active.seller_name = Set(product.seller_name.clone());
    active.added_at = Set(Utc::now().into());
}
