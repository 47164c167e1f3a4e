use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseTransaction, DbErr,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, SqlErr,
    TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::orders::{
        Availability, CheckoutRequest, CheckoutResponse, OrderList, TrackingUpdate,
        UpdateTrackingRequest,
    },
    entity::{
        cart_items::{Column as CartCol, Entity as CartItems},
        notifications::{
            ActiveModel as NotificationActive, Column as NotificationCol,
            Entity as Notifications, Model as NotificationModel, NotificationType,
        },
        orders::{
            ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel,
            OrderStatus,
        },
        products::{ActiveModel as ProductActive, Entity as Products, Model as ProductModel, ProductStatus},
        users::{Entity as Users, Model as UserModel},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_buyer, ensure_seller},
    models::{Notification, Order},
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
    services::{images::PAYMENT_SLIP, notification_service, product_service::find_product},
    state::AppState,
    storage::ImageUpload,
};

const ALREADY_ORDERED: &str = "This product has been ordered.";
const NOT_AVAILABLE: &str = "This product is not available.";

/// Why a product cannot be checked out, if it cannot.
async fn unavailable_reason<C: ConnectionTrait>(
    conn: &C,
    product: &ProductModel,
) -> Result<Option<&'static str>, DbErr> {
    let ordered = Orders::find()
        .filter(OrderCol::ProductId.eq(product.id))
        .count(conn)
        .await?;
    if ordered > 0 {
        return Ok(Some(ALREADY_ORDERED));
    }
    if product.status != ProductStatus::Available {
        return Ok(Some(NOT_AVAILABLE));
    }
    Ok(None)
}

/// Pre-checkout lookup: has anyone already ordered this product?
pub async fn check_availability(
    state: &AppState,
    product_id: Uuid,
) -> AppResult<ApiResponse<Availability>> {
    let product = find_product(state, product_id).await?;
    let reason = unavailable_reason(&state.orm, &product).await?;
    Ok(ApiResponse::item(
        "Availability",
        Availability {
            product_id,
            available: reason.is_none(),
            reason: reason.map(str::to_string),
        },
    ))
}

/// Everything the checkout batch writes, resolved before the batch starts.
struct OrderDraft<'a> {
    buyer: &'a UserModel,
    product: &'a ProductModel,
    shop_name: String,
    address: String,
    phone: String,
    slip_url: String,
}

/// Places an order: uploads the payment slip, then writes the order, the
/// seller notification, the product's sold status and the cart removal in
/// one transaction.
pub async fn place_order(
    state: &AppState,
    user: &AuthUser,
    payload: CheckoutRequest,
    slip: ImageUpload,
) -> AppResult<ApiResponse<CheckoutResponse>> {
    ensure_buyer(user)?;

    let buyer = Users::find_by_id(user.user_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Unknown user".into()))?;

    let address = non_empty_or(payload.address, &buyer.address)
        .ok_or_else(|| AppError::BadRequest("shipping address is required".into()))?;
    let phone = non_empty_or(payload.phone, &buyer.phone)
        .ok_or_else(|| AppError::BadRequest("phone number is required".into()))?;
    let slip_key = PAYMENT_SLIP.key_for(&slip)?;

    let product = find_product(state, payload.product_id).await?;
    if product.seller_id == buyer.id {
        return Err(AppError::BadRequest("cannot order your own product".into()));
    }
    if let Some(reason) = unavailable_reason(&state.orm, &product).await? {
        return Err(AppError::Conflict(reason.into()));
    }
    let shop_name = Users::find_by_id(product.seller_id)
        .one(&state.orm)
        .await?
        .map(|seller| seller.username)
        .unwrap_or_else(|| product.seller_name.clone());

    let slip_url = PAYMENT_SLIP.put(state, &slip_key, slip).await?;

    let draft = OrderDraft {
        buyer: &buyer,
        product: &product,
        shop_name,
        address,
        phone,
        slip_url,
    };

    let txn = state.orm.begin().await.map_err(AppError::OrderFailed)?;
    let (order, notification) = match write_order_batch(&txn, &draft).await {
        Ok(written) => written,
        Err(err) => {
            tracing::warn!(
                product_id = %product.id,
                slip_url = %draft.slip_url,
                "order batch aborted, uploaded slip left unreferenced"
            );
            return Err(err);
        }
    };
    txn.commit().await.map_err(batch_error)?;

    tracing::info!(
        order_id = %order.id,
        product_id = %order.product_id,
        buyer_id = %order.buyer_id,
        seller_id = %order.seller_id,
        "order placed"
    );
    audit::record(
        &state.orm,
        user.user_id,
        "order_place",
        "orders",
        serde_json::json!({ "order_id": order.id, "product_id": order.product_id }),
    )
    .await;

    Ok(ApiResponse::item(
        "Order placed successfully",
        CheckoutResponse {
            order: Order::from(order),
            notification: Notification::from(notification),
        },
    ))
}

async fn write_order_batch(
    txn: &DatabaseTransaction,
    draft: &OrderDraft<'_>,
) -> AppResult<(OrderModel, NotificationModel)> {
    // Re-read under lock: the pre-check above ran outside the transaction.
    let product = Products::find_by_id(draft.product.id)
        .lock_exclusive()
        .one(txn)
        .await
        .map_err(batch_error)?
        .ok_or(AppError::NotFound)?;
    if let Some(reason) = unavailable_reason(txn, &product)
        .await
        .map_err(batch_error)?
    {
        return Err(AppError::Conflict(reason.into()));
    }

    let now = Utc::now();
    let order = OrderActive {
        id: Set(Uuid::new_v4()),
        product_id: Set(product.id),
        product_name: Set(product.name.clone()),
        product_price: Set(product.price),
        product_image_url: Set(product.image_url.clone()),
        buyer_id: Set(draft.buyer.id),
        buyer_name: Set(draft.buyer.username.clone()),
        buyer_address: Set(draft.address.clone()),
        buyer_phone: Set(draft.phone.clone()),
        seller_id: Set(product.seller_id),
        shop_name: Set(draft.shop_name.clone()),
        payment_slip_url: Set(draft.slip_url.clone()),
        tracking_number: Set(None),
        status: Set(OrderStatus::Pending),
        order_date: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(txn)
    .await
    .map_err(batch_error)?;

    let notification = NotificationActive {
        id: Set(Uuid::new_v4()),
        kind: Set(NotificationType::Order),
        title: Set(notification_service::ORDER_TITLE.to_string()),
        message: Set(notification_service::order_message(
            &draft.buyer.username,
            &product.name,
        )),
        seller_id: Set(product.seller_id),
        buyer_id: Set(draft.buyer.id),
        order_id: Set(order.id),
        product_id: Set(product.id),
        is_read: Set(false),
        tracking_number: Set(None),
        timestamp: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(txn)
    .await
    .map_err(batch_error)?;

    let mut sold: ProductActive = product.into();
    sold.status = Set(ProductStatus::Sold);
    sold.buyer_id = Set(Some(draft.buyer.id));
    sold.sold_at = Set(Some(now.into()));
    sold.updated_at = Set(now.into());
    sold.update(txn).await.map_err(batch_error)?;

    CartItems::delete_many()
        .filter(
            Condition::all()
                .add(CartCol::BuyerId.eq(draft.buyer.id))
                .add(CartCol::ProductId.eq(draft.product.id)),
        )
        .exec(txn)
        .await
        .map_err(batch_error)?;

    Ok((order, notification))
}

/// A unique-index hit on `orders.product_id` means another checkout won.
fn batch_error(err: DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => AppError::Conflict(ALREADY_ORDERED.into()),
        _ => AppError::OrderFailed(err),
    }
}

fn non_empty_or(value: Option<String>, fallback: &str) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .or_else(|| Some(fallback.trim().to_string()).filter(|v| !v.is_empty()))
}

/// Seller enters a tracking number: the order moves to `Shipped` and every
/// notification for it becomes an unread `delivery` notice for the buyer,
/// all in one transaction.
pub async fn update_tracking(
    state: &AppState,
    user: &AuthUser,
    order_id: Uuid,
    payload: UpdateTrackingRequest,
) -> AppResult<ApiResponse<TrackingUpdate>> {
    ensure_seller(user)?;
    let tracking_number = payload.tracking_number.trim().to_string();
    if tracking_number.is_empty() {
        return Err(AppError::BadRequest(
            "Please enter a tracking number before saving.".into(),
        ));
    }

    let order = Orders::find_by_id(order_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    if order.seller_id != user.user_id {
        return Err(AppError::Forbidden);
    }

    let txn = state.orm.begin().await?;
    let now = Utc::now();
    let mut active: OrderActive = order.into();
    active.tracking_number = Set(Some(tracking_number.clone()));
    active.status = Set(OrderStatus::Shipped);
    active.updated_at = Set(now.into());
    let order = active.update(&txn).await?;

    let fan_out = Notifications::update_many()
        .set(NotificationActive {
            kind: Set(NotificationType::Delivery),
            title: Set(notification_service::DELIVERY_TITLE.to_string()),
            message: Set(notification_service::delivery_message(&tracking_number)),
            tracking_number: Set(Some(tracking_number.clone())),
            is_read: Set(false),
            updated_at: Set(now.into()),
            ..Default::default()
        })
        .filter(NotificationCol::OrderId.eq(order.id))
        .exec(&txn)
        .await?;

    txn.commit().await?;

    let notifications_updated = fan_out.rows_affected;
    if notifications_updated == 0 {
        tracing::warn!(order_id = %order.id, "tracking saved but no notification references the order");
    }
    tracing::info!(order_id = %order.id, notifications_updated, "tracking number saved");
    audit::record(
        &state.orm,
        user.user_id,
        "order_tracking_update",
        "orders",
        serde_json::json!({ "order_id": order.id, "tracking_number": tracking_number }),
    )
    .await;

    Ok(ApiResponse::item(
        "Tracking number saved",
        TrackingUpdate {
            order: Order::from(order),
            notifications_updated,
        },
    ))
}

/// Orders the caller bought.
pub async fn list_purchases(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    ensure_buyer(user)?;
    list_orders_by(state, OrderCol::BuyerId, user.user_id, query).await
}

/// Orders placed on the caller's products.
pub async fn list_sales(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    ensure_seller(user)?;
    list_orders_by(state, OrderCol::SellerId, user.user_id, query).await
}

async fn list_orders_by(
    state: &AppState,
    party: OrderCol,
    user_id: Uuid,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let mut condition = Condition::all().add(party.eq(user_id));
    if let Some(status) = query.status {
        condition = condition.add(OrderCol::Status.eq(status));
    }

    let mut finder = Orders::find().filter(condition);
    finder = match query.sort_order.unwrap_or(SortOrder::Desc) {
        SortOrder::Asc => finder.order_by_asc(OrderCol::OrderDate),
        SortOrder::Desc => finder.order_by_desc(OrderCol::OrderDate),
    };

    let total = finder.clone().count(&state.orm).await?;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Order::from)
        .collect();

    Ok(ApiResponse::success(
        "Ok",
        OrderList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn get_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Order>> {
    let order = Orders::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    if order.buyer_id != user.user_id && order.seller_id != user.user_id {
        return Err(AppError::NotFound);
    }
    Ok(ApiResponse::item("OK", Order::from(order)))
}
