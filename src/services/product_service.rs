use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, QueryTrait, Set, TransactionTrait,
    sea_query::{Expr, Func},
};
use uuid::Uuid;

use crate::{
    audit,
    dto::products::{CreateProductRequest, ProductList, UpdateProductRequest},
    entity::{
        cart_items::{Column as CartCol, Entity as CartItems},
        products::{ActiveModel, Column, Entity as Products, Model as ProductModel, ProductStatus},
        users::{Column as UserCol, Entity as Users, Role},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_seller},
    models::Product,
    response::{ApiResponse, Meta},
    routes::params::{ProductQuery, ProductSortBy, SellerProductQuery, SortOrder},
    services::images::PRODUCT_IMAGE,
    state::AppState,
    storage::ImageUpload,
};

/// Buyer-facing catalog: every available product of every seller, as one
/// paginated query.
pub async fn list_catalog(
    state: &AppState,
    query: ProductQuery,
) -> AppResult<ApiResponse<ProductList>> {
    let (page, limit, offset) = query.pagination().normalize();

    let mut condition = Condition::all()
        .add(Column::Status.eq(ProductStatus::Available))
        .add(UserCol::Role.eq(Role::Seller));
    if let Some(search) = query.q.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        condition = condition.add(
            Expr::expr(Func::lower(Expr::col((Products, Column::Name))))
                .like(format!("%{}%", search.to_lowercase())),
        );
    }
    if let Some(seller_id) = query.seller_id {
        condition = condition.add(Column::SellerId.eq(seller_id));
    }

    let sort_col = match query.sort_by.unwrap_or(ProductSortBy::CreatedAt) {
        ProductSortBy::CreatedAt => Column::CreatedAt,
        ProductSortBy::Price => Column::Price,
        ProductSortBy::Name => Column::Name,
    };

    let mut finder = Products::find().inner_join(Users).filter(condition);
    finder = match query.sort_order.unwrap_or(SortOrder::Desc) {
        SortOrder::Asc => finder.order_by_asc(sort_col),
        SortOrder::Desc => finder.order_by_desc(sort_col),
    };
    // Tie-break so pages stay stable when sort keys collide.
    finder = finder.order_by_asc(Column::Id);

    let total = finder.clone().count(&state.orm).await?;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Product::from)
        .collect();

    Ok(ApiResponse::success(
        "Products",
        ProductList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn get_product(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Product>> {
    let product = find_product(state, id).await?;
    Ok(ApiResponse::item("Product", Product::from(product)))
}

/// A seller's own listings in any status.
pub async fn list_seller_products(
    state: &AppState,
    user: &AuthUser,
    query: SellerProductQuery,
) -> AppResult<ApiResponse<ProductList>> {
    ensure_seller(user)?;
    let (page, limit, offset) = query.pagination().normalize();

    let finder = Products::find()
        .filter(Column::SellerId.eq(user.user_id))
        .apply_if(query.status, |q, status| q.filter(Column::Status.eq(status)))
        .order_by_desc(Column::CreatedAt);

    let total = finder.clone().count(&state.orm).await?;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Product::from)
        .collect();

    Ok(ApiResponse::success(
        "Products",
        ProductList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn create_product(
    state: &AppState,
    user: &AuthUser,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_seller(user)?;
    let name = required("name", &payload.name)?;
    let detail = required("detail", &payload.detail)?;
    let price = payload.price.to_minor()?;

    let seller = Users::find_by_id(user.user_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Unknown user".into()))?;

    let now = Utc::now();
    let product = ActiveModel {
        id: Set(Uuid::new_v4()),
        seller_id: Set(seller.id),
        seller_name: Set(seller.username),
        name: Set(name),
        price: Set(price),
        detail: Set(detail),
        image_url: Set(None),
        status: Set(payload.status.unwrap_or(ProductStatus::Available)),
        buyer_id: Set(None),
        sold_at: Set(None),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&state.orm)
    .await?;

    tracing::info!(product_id = %product.id, seller_id = %user.user_id, "product created");
    audit::record(
        &state.orm,
        user.user_id,
        "product_create",
        "products",
        serde_json::json!({ "product_id": product.id }),
    )
    .await;

    Ok(ApiResponse::item("Product created", Product::from(product)))
}

pub async fn update_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_seller(user)?;
    let existing = find_owned_product(state, user, id).await?;

    // Validate everything before touching the row.
    let name = payload.name.as_deref().map(|n| required("name", n)).transpose()?;
    let detail = payload.detail.as_deref().map(|d| required("detail", d)).transpose()?;
    let price = payload.price.as_ref().map(|p| p.to_minor()).transpose()?;

    let mut active: ActiveModel = existing.into();
    if let Some(name) = name {
        active.name = Set(name);
    }
    if let Some(detail) = detail {
        active.detail = Set(detail);
    }
    if let Some(price) = price {
        active.price = Set(price);
    }
    if let Some(status) = payload.status {
        active.status = Set(status);
    }
    active.updated_at = Set(Utc::now().into());

    let product = active.update(&state.orm).await?;

    audit::record(
        &state.orm,
        user.user_id,
        "product_update",
        "products",
        serde_json::json!({ "product_id": product.id }),
    )
    .await;

    Ok(ApiResponse::item("Updated", Product::from(product)))
}

/// Replaces a listing's photo with an uploaded image.
pub async fn upload_product_image(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    image: ImageUpload,
) -> AppResult<ApiResponse<Product>> {
    ensure_seller(user)?;
    let existing = find_owned_product(state, user, id).await?;
    let url = PRODUCT_IMAGE.store(state, image).await?;

    let mut active: ActiveModel = existing.into();
    active.image_url = Set(Some(url));
    active.updated_at = Set(Utc::now().into());
    let product = active.update(&state.orm).await?;

    audit::record(
        &state.orm,
        user.user_id,
        "product_image_upload",
        "products",
        serde_json::json!({ "product_id": product.id }),
    )
    .await;

    Ok(ApiResponse::item("Image uploaded", Product::from(product)))
}

pub async fn delete_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_seller(user)?;
    find_owned_product(state, user, id).await?;

    let txn = state.orm.begin().await?;
    let removed_from_carts = CartItems::delete_many()
        .filter(CartCol::ProductId.eq(id))
        .exec(&txn)
        .await?
        .rows_affected;
    Products::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;

    tracing::info!(product_id = %id, removed_from_carts, "product deleted");
    audit::record(
        &state.orm,
        user.user_id,
        "product_delete",
        "products",
        serde_json::json!({ "product_id": id }),
    )
    .await;

    Ok(ApiResponse::ack("Deleted"))
}

pub(crate) async fn find_product(state: &AppState, id: Uuid) -> AppResult<ProductModel> {
    Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)
}

async fn find_owned_product(state: &AppState, user: &AuthUser, id: Uuid) -> AppResult<ProductModel> {
    let product = find_product(state, id).await?;
    if product.seller_id != user.user_id {
        return Err(AppError::Forbidden);
    }
    Ok(product)
}

fn required(field: &str, value: &str) -> AppResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::BadRequest(format!("{field} is required")));
    }
    Ok(value.to_string())
}
