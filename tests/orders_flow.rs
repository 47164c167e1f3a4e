mod common;

use std::sync::Arc;

use chrono::Utc;
use marketplace_api::{
    dto::cart::AddToCartRequest,
    entity::{
        Notifications, Orders,
        notifications::NotificationType,
        orders::{ActiveModel as OrderActive, OrderStatus},
        products::ProductStatus,
        users::Role,
    },
    error::AppError,
    routes::params::{OrderListQuery, Pagination},
    services::{cart_service, order_service, product_service},
    storage::{ImageUpload, LocalBlobStore},
};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, EntityTrait, PaginatorTrait, Set, SqlErr};
use uuid::Uuid;

use common::{FailingBlobStore, checkout_request, create_product, create_user, slip};

#[tokio::test]
async fn checkout_writes_order_notification_and_marks_product_sold() -> anyhow::Result<()> {
    let app = common::setup().await?;
    let state = &app.state;
    let seller = create_user(state, Role::Seller, "Ferris Shop").await?;
    let buyer = create_user(state, Role::Buyer, "somchai").await?;
    let product = create_product(state, &seller, "Vintage Lamp", "250.00").await?;

    cart_service::add_to_cart(state, &buyer, AddToCartRequest { product_id: product.id }).await?;

    let placed = common::place_order(state, &buyer, product.id).await?;
    let order = placed.order;
    assert_eq!(order.product_id, product.id);
    assert_eq!(order.product_price, Decimal::new(25_000, 2));
    assert_eq!(order.product_price.to_string(), "250.00");
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.buyer_name, "somchai");
    assert_eq!(order.shop_name, "Ferris Shop");
    assert_eq!(order.buyer_address, "99 Rama IV Rd, Bangkok 10500");
    assert!(order.tracking_number.is_none());
    let slip_key = order
        .payment_slip_url
        .strip_prefix("memory://")
        .expect("slip stored in memory");
    assert!(slip_key.starts_with("payment_slips/"));
    let (bytes, content_type) = app.blobs.get(slip_key).expect("slip bytes kept");
    assert_eq!(bytes, slip().bytes);
    assert_eq!(content_type, "image/jpeg");
    assert_eq!(app.blobs.len(), 1);

    let notification = placed.notification;
    assert_eq!(notification.kind, NotificationType::Order);
    assert_eq!(notification.title, "New Order Received");
    assert_eq!(notification.message, "somchai placed an order for Vintage Lamp");
    assert_eq!(notification.seller_id, seller.user_id);
    assert_eq!(notification.buyer_id, buyer.user_id);
    assert_eq!(notification.order_id, order.id);
    assert!(!notification.is_read);

    let stored = product_service::get_product(state, product.id).await?.data.unwrap();
    assert_eq!(stored.status, ProductStatus::Sold);
    assert_eq!(stored.buyer_id, Some(buyer.user_id));
    assert!(stored.sold_at.is_some());

    let cart = cart_service::list_cart(state, &buyer, Pagination::default()).await?;
    assert!(cart.data.unwrap().items.is_empty());

    let availability = order_service::check_availability(state, product.id)
        .await?
        .data
        .unwrap();
    assert!(!availability.available);
    assert_eq!(availability.reason.as_deref(), Some("This product has been ordered."));

    Ok(())
}

#[tokio::test]
async fn second_checkout_of_same_product_conflicts() -> anyhow::Result<()> {
    let app = common::setup().await?;
    let state = &app.state;
    let seller = create_user(state, Role::Seller, "shop").await?;
    let first = create_user(state, Role::Buyer, "first").await?;
    let second = create_user(state, Role::Buyer, "second").await?;
    let product = create_product(state, &seller, "Film Camera", "3500.50").await?;

    common::place_order(state, &first, product.id).await?;
    let err = order_service::place_order(state, &second, checkout_request(product.id), slip())
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Conflict(ref msg) if msg == "This product has been ordered."));
    assert_eq!(Orders::find().count(&state.orm).await?, 1);
    // The loser never reached the upload.
    assert_eq!(app.blobs.len(), 1);
    Ok(())
}

#[tokio::test]
async fn upload_failure_leaves_no_writes() -> anyhow::Result<()> {
    let state = common::setup_with_blobs(Arc::new(FailingBlobStore)).await?;
    let seller = create_user(&state, Role::Seller, "shop").await?;
    let buyer = create_user(&state, Role::Buyer, "buyer").await?;
    let product = create_product(&state, &seller, "Ferris Mug", "120").await?;
    cart_service::add_to_cart(&state, &buyer, AddToCartRequest { product_id: product.id }).await?;

    let err = order_service::place_order(&state, &buyer, checkout_request(product.id), slip())
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Upload { what: "Payment slip", .. }));
    assert_eq!(err.status(), axum::http::StatusCode::BAD_GATEWAY);
    assert_eq!(Orders::find().count(&state.orm).await?, 0);
    assert_eq!(Notifications::find().count(&state.orm).await?, 0);
    let stored = product_service::get_product(&state, product.id).await?.data.unwrap();
    assert_eq!(stored.status, ProductStatus::Available);
    assert!(stored.buyer_id.is_none());
    let cart = cart_service::list_cart(&state, &buyer, Pagination::default()).await?;
    assert_eq!(cart.data.unwrap().items.len(), 1);
    Ok(())
}

#[tokio::test]
async fn oversized_slip_is_rejected_as_too_large() -> anyhow::Result<()> {
    let root = std::env::temp_dir().join(format!("slips-{}", Uuid::new_v4()));
    let state = common::setup_with_blobs(Arc::new(LocalBlobStore::new(&root, "http://x", 4))).await?;
    let seller = create_user(&state, Role::Seller, "shop").await?;
    let buyer = create_user(&state, Role::Buyer, "buyer").await?;
    let product = create_product(&state, &seller, "Rattan Chair", "450").await?;

    let err = order_service::place_order(&state, &buyer, checkout_request(product.id), slip())
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::PayloadTooLarge(ref msg) if msg.starts_with("Payment slip is")));
    assert_eq!(err.status(), axum::http::StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(Orders::find().count(&state.orm).await?, 0);
    assert_eq!(Notifications::find().count(&state.orm).await?, 0);
    let stored = product_service::get_product(&state, product.id).await?.data.unwrap();
    assert_eq!(stored.status, ProductStatus::Available);
    Ok(())
}

#[tokio::test]
async fn checkout_rejects_bad_input_before_uploading() -> anyhow::Result<()> {
    let app = common::setup().await?;
    let state = &app.state;
    let seller = create_user(state, Role::Seller, "shop").await?;
    let buyer = create_user(state, Role::Buyer, "buyer").await?;
    let homeless =
        common::create_user_with_address(state, Role::Buyer, "nomad", "").await?;
    let product = create_product(state, &seller, "Desk", "999.99").await?;

    let pdf = ImageUpload::new(&b"%PDF-1.7"[..], "application/pdf");
    let err = order_service::place_order(state, &buyer, checkout_request(product.id), pdf)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let empty = ImageUpload::new(&b""[..], "image/png");
    let err = order_service::place_order(state, &buyer, checkout_request(product.id), empty)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let mut no_address = checkout_request(product.id);
    no_address.address = None;
    let err = order_service::place_order(state, &homeless, no_address, slip())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(ref msg) if msg.contains("address")));

    let err = order_service::place_order(state, &seller, checkout_request(product.id), slip())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    let err = order_service::place_order(state, &buyer, checkout_request(Uuid::new_v4()), slip())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    assert!(app.blobs.is_empty());
    assert_eq!(Orders::find().count(&state.orm).await?, 0);
    Ok(())
}

#[tokio::test]
async fn address_and_phone_fall_back_to_profile() -> anyhow::Result<()> {
    let app = common::setup().await?;
    let state = &app.state;
    let seller = create_user(state, Role::Seller, "shop").await?;
    let buyer = create_user(state, Role::Buyer, "buyer").await?;
    let product = create_product(state, &seller, "Chair", "450").await?;

    let mut request = checkout_request(product.id);
    request.address = Some("   ".into());
    request.phone = None;
    let order = order_service::place_order(state, &buyer, request, slip())
        .await?
        .data
        .unwrap()
        .order;

    assert_eq!(order.buyer_address, "12 Sukhumvit Rd, Bangkok");
    assert_eq!(order.buyer_phone, "0812345678");
    Ok(())
}

#[tokio::test]
async fn database_refuses_a_second_order_row_for_a_product() -> anyhow::Result<()> {
    let app = common::setup().await?;
    let state = &app.state;
    let seller = create_user(state, Role::Seller, "shop").await?;
    let buyer = create_user(state, Role::Buyer, "buyer").await?;
    let product = create_product(state, &seller, "Bike", "2000").await?;
    let first = common::place_order(state, &buyer, product.id).await?.order;

    let now = Utc::now();
    let err = OrderActive {
        id: Set(Uuid::new_v4()),
        product_id: Set(product.id),
        product_name: Set(first.product_name.clone()),
        product_price: Set(200_000),
        product_image_url: Set(None),
        buyer_id: Set(buyer.user_id),
        buyer_name: Set("buyer".into()),
        buyer_address: Set("x".into()),
        buyer_phone: Set("x".into()),
        seller_id: Set(seller.user_id),
        shop_name: Set("shop".into()),
        payment_slip_url: Set("memory://dup".into()),
        tracking_number: Set(None),
        status: Set(OrderStatus::Pending),
        order_date: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&state.orm)
    .await
    .unwrap_err();

    assert!(matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))));
    Ok(())
}

#[tokio::test]
async fn purchases_and_sales_are_scoped_to_each_party() -> anyhow::Result<()> {
    let app = common::setup().await?;
    let state = &app.state;
    let seller = create_user(state, Role::Seller, "shop").await?;
    let other_seller = create_user(state, Role::Seller, "other").await?;
    let buyer = create_user(state, Role::Buyer, "buyer").await?;
    let stranger = create_user(state, Role::Buyer, "stranger").await?;

    let lamp = create_product(state, &seller, "Lamp", "100").await?;
    let vase = create_product(state, &other_seller, "Vase", "80").await?;
    let lamp_order = common::place_order(state, &buyer, lamp.id).await?.order;
    common::place_order(state, &buyer, vase.id).await?;

    let purchases = order_service::list_purchases(state, &buyer, OrderListQuery::default()).await?;
    assert_eq!(purchases.meta.unwrap().total, Some(2));

    let sales = order_service::list_sales(state, &seller, OrderListQuery::default()).await?;
    let sales = sales.data.unwrap().items;
    assert_eq!(sales.len(), 1);
    assert_eq!(sales[0].id, lamp_order.id);

    let shipped_only = OrderListQuery {
        status: Some(OrderStatus::Shipped),
        ..Default::default()
    };
    let none = order_service::list_sales(state, &seller, shipped_only).await?;
    assert!(none.data.unwrap().items.is_empty());

    assert!(order_service::get_order(state, &seller, lamp_order.id).await.is_ok());
    let err = order_service::get_order(state, &stranger, lamp_order.id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound));
    let err = order_service::list_sales(state, &buyer, OrderListQuery::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));
    Ok(())
}
