use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    dto::notifications::NotificationList,
    entity::notifications::{
        ActiveModel as NotificationActive, Column as NotificationCol, Entity as Notifications,
        Model as NotificationModel, NotificationType,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Notification,
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    state::AppState,
};

pub const ORDER_TITLE: &str = "New Order Received";
pub const DELIVERY_TITLE: &str = "Your package has been shipped.";

pub fn order_message(buyer_name: &str, product_name: &str) -> String {
    format!("{buyer_name} placed an order for {product_name}")
}

pub fn delivery_message(tracking_number: &str) -> String {
    format!("Tracking number: {tracking_number}")
}

/// Seller-side `order` notifications plus buyer-side `delivery` ones.
fn inbox_condition(user_id: Uuid) -> Condition {
    Condition::any()
        .add(
            Condition::all()
                .add(NotificationCol::SellerId.eq(user_id))
                .add(NotificationCol::Kind.eq(NotificationType::Order)),
        )
        .add(
            Condition::all()
                .add(NotificationCol::BuyerId.eq(user_id))
                .add(NotificationCol::Kind.eq(NotificationType::Delivery)),
        )
}

pub async fn list_notifications(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<NotificationList>> {
    let (page, limit, offset) = pagination.normalize();

    let finder = Notifications::find()
        .filter(inbox_condition(user.user_id))
        .order_by_desc(NotificationCol::Timestamp)
        .order_by_asc(NotificationCol::Id);

    let total = finder.clone().count(&state.orm).await?;
    let unread = Notifications::find()
        .filter(inbox_condition(user.user_id))
        .filter(NotificationCol::IsRead.eq(false))
        .count(&state.orm)
        .await?;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Notification::from)
        .collect();

    Ok(ApiResponse::success(
        "Notifications",
        NotificationList { items, unread },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn get_notification(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Notification>> {
    let notification = find_addressed(state, user, id).await?;
    Ok(ApiResponse::item("Notification", Notification::from(notification)))
}

/// Marks a notification read. Already-read notifications are left as they are.
pub async fn mark_read(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Notification>> {
    let notification = find_addressed(state, user, id).await?;
    if notification.is_read {
        return Ok(ApiResponse::item(
            "Already read",
            Notification::from(notification),
        ));
    }

    let mut active: NotificationActive = notification.into();
    active.is_read = Set(true);
    active.updated_at = Set(Utc::now().into());
    let notification = active.update(&state.orm).await?;

    tracing::debug!(notification_id = %id, user_id = %user.user_id, "notification read");
    Ok(ApiResponse::item("Marked as read", Notification::from(notification)))
}

/// Loads a notification the caller is a party to.
async fn find_addressed(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<NotificationModel> {
    let notification = Notifications::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    if notification.buyer_id != user.user_id && notification.seller_id != user.user_id {
        return Err(AppError::Forbidden);
    }
    Ok(notification)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_parties() {
        assert_eq!(
            order_message("somchai", "Vintage Lamp"),
            "somchai placed an order for Vintage Lamp"
        );
        assert_eq!(delivery_message("TH1234567890"), "Tracking number: TH1234567890");
    }
}
