mod common;

use marketplace_api::{
    entity::users::Role, error::AppError, routes::params::Pagination,
    services::notification_service,
};
use uuid::Uuid;

use common::{create_product, create_user};

#[tokio::test]
async fn mark_read_is_idempotent() -> anyhow::Result<()> {
    let app = common::setup().await?;
    let state = &app.state;
    let seller = create_user(state, Role::Seller, "shop").await?;
    let buyer = create_user(state, Role::Buyer, "buyer").await?;
    let product = create_product(state, &seller, "Lamp", "250.00").await?;
    let notice = common::place_order(state, &buyer, product.id).await?.notification;

    let inbox = notification_service::list_notifications(state, &seller, Pagination::default())
        .await?
        .data
        .unwrap();
    assert_eq!(inbox.unread, 1);

    let first = notification_service::mark_read(state, &seller, notice.id).await?;
    assert_eq!(first.message, "Marked as read");
    assert!(first.data.unwrap().is_read);

    let second = notification_service::mark_read(state, &seller, notice.id).await?;
    assert_eq!(second.message, "Already read");
    assert!(second.data.unwrap().is_read);

    let inbox = notification_service::list_notifications(state, &seller, Pagination::default())
        .await?
        .data
        .unwrap();
    assert_eq!(inbox.items.len(), 1);
    assert_eq!(inbox.unread, 0);
    Ok(())
}

#[tokio::test]
async fn order_notices_reach_only_the_seller() -> anyhow::Result<()> {
    let app = common::setup().await?;
    let state = &app.state;
    let seller = create_user(state, Role::Seller, "shop").await?;
    let buyer = create_user(state, Role::Buyer, "buyer").await?;
    let stranger = create_user(state, Role::Buyer, "stranger").await?;
    let product = create_product(state, &seller, "Lamp", "250.00").await?;
    let notice = common::place_order(state, &buyer, product.id).await?.notification;

    let buyer_inbox = notification_service::list_notifications(state, &buyer, Pagination::default())
        .await?
        .data
        .unwrap();
    assert!(buyer_inbox.items.is_empty());

    // Parties to the order may still open it directly.
    assert!(notification_service::get_notification(state, &buyer, notice.id).await.is_ok());

    let err = notification_service::mark_read(state, &stranger, notice.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    let err = notification_service::get_notification(state, &seller, Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound));
    Ok(())
}

#[tokio::test]
async fn inbox_pages_newest_first() -> anyhow::Result<()> {
    let app = common::setup().await?;
    let state = &app.state;
    let seller = create_user(state, Role::Seller, "shop").await?;
    let buyer = create_user(state, Role::Buyer, "buyer").await?;
    for name in ["One", "Two", "Three"] {
        let product = create_product(state, &seller, name, "10").await?;
        common::place_order(state, &buyer, product.id).await?;
    }

    let page = notification_service::list_notifications(state, &seller, Pagination::new(1, 2)).await?;
    let meta = page.meta.clone().unwrap();
    assert_eq!(meta.total, Some(3));
    assert_eq!(meta.per_page, Some(2));
    let items = page.data.unwrap().items;
    assert_eq!(items.len(), 2);
    assert!(items[0].timestamp >= items[1].timestamp);
    Ok(())
}
