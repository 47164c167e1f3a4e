use axum::{
    Json, Router,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
};
use uuid::Uuid;

use crate::{
    dto::orders::{
        Availability, CheckoutForm, CheckoutRequest, CheckoutResponse, OrderList, TrackingUpdate,
        UpdateTrackingRequest,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Order,
    response::ApiResponse,
    routes::{
        form::{form_error, image_field, text_field},
        params::OrderListQuery,
    },
    services::order_service,
    state::AppState,
    storage::ImageUpload,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_purchases))
        .route("/sales", get(list_sales))
        .route("/checkout", post(checkout))
        .route("/availability/{product_id}", get(availability))
        .route("/{id}", get(get_order))
        .route("/{id}/tracking", put(update_tracking))
}

#[utoipa::path(
    get,
    path = "/api/orders",
    params(OrderListQuery),
    responses(
        (status = 200, description = "Orders placed by the current buyer", body = ApiResponse<OrderList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn list_purchases(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<OrderListQuery>,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    let resp = order_service::list_purchases(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/orders/sales",
    params(OrderListQuery),
    responses(
        (status = 200, description = "Orders on the current seller's products", body = ApiResponse<OrderList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn list_sales(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<OrderListQuery>,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    let resp = order_service::list_sales(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/orders/availability/{product_id}",
    params(
        ("product_id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Whether the product can still be ordered", body = ApiResponse<Availability>),
        (status = 404, description = "Product not found")
    ),
    tag = "Orders"
)]
pub async fn availability(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Availability>>> {
    let resp = order_service::check_availability(&state, product_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/orders/checkout",
    request_body(content = CheckoutForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Order placed", body = ApiResponse<CheckoutResponse>),
        (status = 400, description = "Missing field, empty or non-image slip"),
        (status = 409, description = "Product already ordered"),
        (status = 413, description = "Payment slip too large"),
        (status = 502, description = "Payment slip upload failed")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn checkout(
    State(state): State<AppState>,
    user: AuthUser,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<ApiResponse<CheckoutResponse>>)> {
    let (payload, slip) = read_checkout_form(multipart).await?;
    let resp = order_service::place_order(&state, &user, payload, slip).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

async fn read_checkout_form(mut multipart: Multipart) -> AppResult<(CheckoutRequest, ImageUpload)> {
    let mut product_id = None;
    let mut address = None;
    let mut phone = None;
    let mut slip = None;

    while let Some(field) = multipart.next_field().await.map_err(form_error)? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("product_id") => product_id = Some(text_field(field).await?),
            Some("address") => address = Some(text_field(field).await?),
            Some("phone") => phone = Some(text_field(field).await?),
            Some("slip") => slip = Some(image_field(field).await?),
            _ => {}
        }
    }

    let product_id = product_id
        .ok_or_else(|| AppError::BadRequest("product_id is required".into()))?;
    let product_id = Uuid::parse_str(product_id.trim())
        .map_err(|_| AppError::BadRequest("product_id must be a UUID".into()))?;
    let slip = slip.ok_or_else(|| AppError::BadRequest("payment slip is required".into()))?;

    Ok((
        CheckoutRequest {
            product_id,
            address,
            phone,
        },
        slip,
    ))
}

#[utoipa::path(
    put,
    path = "/api/orders/{id}/tracking",
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    request_body = UpdateTrackingRequest,
    responses(
        (status = 200, description = "Tracking saved and buyer notified", body = ApiResponse<TrackingUpdate>),
        (status = 400, description = "Empty tracking number"),
        (status = 403, description = "Not the seller of this order"),
        (status = 404, description = "Order not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn update_tracking(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateTrackingRequest>,
) -> AppResult<Json<ApiResponse<TrackingUpdate>>> {
    let resp = order_service::update_tracking(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    responses(
        (status = 200, description = "Order detail", body = ApiResponse<Order>),
        (status = 404, description = "Order not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let resp = order_service::get_order(&state, &user, id).await?;
    Ok(Json(resp))
}
