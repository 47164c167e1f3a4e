use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Notification, Order};

/// Checkout form fields. Address and phone fall back to the buyer's profile.
#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    pub product_id: Uuid,
    pub address: Option<String>,
    pub phone: Option<String>,
}

/// Multipart body accepted by the checkout endpoint, for the API docs.
#[derive(ToSchema)]
pub struct CheckoutForm {
    pub product_id: Uuid,
    pub address: Option<String>,
    pub phone: Option<String>,
    #[schema(value_type = String, format = Binary)]
    pub slip: Vec<u8>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CheckoutResponse {
    pub order: Order,
    pub notification: Notification,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Availability {
    pub product_id: Uuid,
    pub available: bool,
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateTrackingRequest {
    pub tracking_number: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TrackingUpdate {
    pub order: Order,
    pub notifications_updated: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderList {
    pub items: Vec<Order>,
}
