use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{entity::products::ProductStatus, models::Product, money::PriceInput};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    pub name: String,
    #[schema(value_type = String, example = "250.00")]
    pub price: PriceInput,
    pub detail: String,
    pub status: Option<ProductStatus>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    #[schema(value_type = Option<String>, example = "250.00")]
    pub price: Option<PriceInput>,
    pub detail: Option<String>,
    pub status: Option<ProductStatus>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct ProductList {
    #[schema(value_type = Vec<Product>)]
    pub items: Vec<Product>,
}
