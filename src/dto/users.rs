use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entity::users::{Model as UserModel, Role};

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    pub username: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
}

/// What a buyer needs to pay a seller at checkout.
#[derive(Debug, Serialize, ToSchema)]
pub struct SellerPaymentInfo {
    pub seller_id: Uuid,
    pub shop_name: String,
    pub promptpay_qr_url: Option<String>,
}

/// A user as other users see them.
#[derive(Debug, Serialize, ToSchema)]
pub struct PublicProfile {
    pub id: Uuid,
    pub username: String,
    pub role: Role,
    pub profile_image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<UserModel> for PublicProfile {
    fn from(user: UserModel) -> Self {
        Self {
            id: user.id,
            username: user.username,
            role: user.role,
            profile_image_url: user.profile_image_url,
            created_at: user.created_at.with_timezone(&Utc),
        }
    }
}
