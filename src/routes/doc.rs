use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{LoginRequest, LoginResponse, RegisterRequest},
        cart::{AddToCartRequest, CartList},
        notifications::NotificationList,
        orders::{
            Availability, CheckoutForm, CheckoutResponse, OrderList, TrackingUpdate,
            UpdateTrackingRequest,
        },
        products::{CreateProductRequest, ProductList, UpdateProductRequest},
        users::{PublicProfile, SellerPaymentInfo, UpdateProfileRequest},
    },
    entity::{
        notifications::NotificationType, orders::OrderStatus, products::ProductStatus,
        users::Role,
    },
    models::{CartItem, Notification, Order, Product, User},
    response::{ApiResponse, Meta},
    routes::{
        auth, cart, form, health, notifications, orders, params, products as product_routes,
        users,
    },
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::login,
        auth::register,
        users::get_me,
        users::update_me,
        users::upload_promptpay_qr,
        users::upload_profile_image,
        users::get_profile,
        users::seller_products,
        users::seller_payment,
        product_routes::list_products,
        product_routes::list_my_products,
        product_routes::create_product,
        product_routes::get_product,
        product_routes::update_product,
        product_routes::delete_product,
        product_routes::upload_product_image,
        cart::cart_list,
        cart::add_to_cart,
        cart::remove_from_cart,
        orders::list_purchases,
        orders::list_sales,
        orders::availability,
        orders::checkout,
        orders::update_tracking,
        orders::get_order,
        notifications::list_notifications,
        notifications::get_notification,
        notifications::mark_read
    ),
    components(
        schemas(
            User,
            Role,
            Product,
            ProductStatus,
            CartItem,
            Order,
            OrderStatus,
            Notification,
            NotificationType,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            UpdateProfileRequest,
            SellerPaymentInfo,
            users::QrForm,
            PublicProfile,
            form::ImageForm,
            CreateProductRequest,
            UpdateProductRequest,
            ProductList,
            AddToCartRequest,
            CartList,
            CheckoutForm,
            CheckoutResponse,
            Availability,
            UpdateTrackingRequest,
            TrackingUpdate,
            OrderList,
            NotificationList,
            health::HealthData,
            params::Pagination,
            params::SortOrder,
            params::ProductSortBy,
            Meta,
            ApiResponse<Product>,
            ApiResponse<ProductList>,
            ApiResponse<OrderList>,
            ApiResponse<CheckoutResponse>,
            ApiResponse<NotificationList>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Authentication endpoints"),
        (name = "Users", description = "Profile and seller payment endpoints"),
        (name = "Products", description = "Catalog and listing endpoints"),
        (name = "Cart", description = "Cart endpoints"),
        (name = "Orders", description = "Checkout, tracking and order history"),
        (name = "Notifications", description = "Order and delivery notifications"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
