use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    entity::{
        cart_items, notifications,
        notifications::NotificationType,
        orders::{self, OrderStatus},
        products::{self, ProductStatus},
        users::{self, Role},
    },
    money::to_decimal,
};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub role: Role,
    pub username: String,
    pub email: String,
    pub address: String,
    pub phone: String,
    pub profile_image_url: Option<String>,
    pub promptpay_qr_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub price: Decimal,
    pub detail: String,
    pub image_url: Option<String>,
    pub seller_id: Uuid,
    pub seller_name: String,
    pub status: ProductStatus,
    pub buyer_id: Option<Uuid>,
    pub sold_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CartItem {
    pub id: Uuid,
    pub product_id: Uuid,
    pub name: String,
    pub price: Decimal,
    pub detail: String,
    pub image_url: Option<String>,
    pub seller_id: Uuid,
    pub seller_name: String,
    pub added_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub product_price: Decimal,
    pub product_image_url: Option<String>,
    pub buyer_id: Uuid,
    pub buyer_name: String,
    pub buyer_address: String,
    pub buyer_phone: String,
    pub seller_id: Uuid,
    pub shop_name: String,
    pub payment_slip_url: String,
    pub tracking_number: Option<String>,
    pub status: OrderStatus,
    pub order_date: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Notification {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub title: String,
    pub message: String,
    pub seller_id: Uuid,
    pub buyer_id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub is_read: bool,
    pub tracking_number: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            role: model.role,
            username: model.username,
            email: model.email,
            address: model.address,
            phone: model.phone,
            profile_image_url: model.profile_image_url,
            promptpay_qr_url: model.promptpay_qr_url,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

impl From<products::Model> for Product {
    fn from(model: products::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            price: to_decimal(model.price),
            detail: model.detail,
            image_url: model.image_url,
            seller_id: model.seller_id,
            seller_name: model.seller_name,
            status: model.status,
            buyer_id: model.buyer_id,
            sold_at: model.sold_at.map(|dt| dt.with_timezone(&Utc)),
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

impl From<cart_items::Model> for CartItem {
    fn from(model: cart_items::Model) -> Self {
        Self {
            id: model.id,
            product_id: model.product_id,
            name: model.name,
            price: to_decimal(model.price),
            detail: model.detail,
            image_url: model.image_url,
            seller_id: model.seller_id,
            seller_name: model.seller_name,
            added_at: model.added_at.with_timezone(&Utc),
        }
    }
}

impl From<orders::Model> for Order {
    fn from(model: orders::Model) -> Self {
        Self {
            id: model.id,
            product_id: model.product_id,
            product_name: model.product_name,
            product_price: to_decimal(model.product_price),
            product_image_url: model.product_image_url,
            buyer_id: model.buyer_id,
            buyer_name: model.buyer_name,
            buyer_address: model.buyer_address,
            buyer_phone: model.buyer_phone,
            seller_id: model.seller_id,
            shop_name: model.shop_name,
            payment_slip_url: model.payment_slip_url,
            tracking_number: model.tracking_number,
            status: model.status,
            order_date: model.order_date.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

impl From<notifications::Model> for Notification {
    fn from(model: notifications::Model) -> Self {
        Self {
            id: model.id,
            kind: model.kind,
            title: model.title,
            message: model.message,
            seller_id: model.seller_id,
            buyer_id: model.buyer_id,
            order_id: model.order_id,
            product_id: model.product_id,
            is_read: model.is_read,
            tracking_number: model.tracking_number,
            timestamp: model.timestamp.with_timezone(&Utc),
        }
    }
}
