use chrono::Utc;
use marketplace_api::{
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
    entity::{
        products::{self, ActiveModel as ProductActive, ProductStatus},
        users::{self, ActiveModel as UserActive, Role},
    },
    money::parse_price,
    services::auth_service::hash_password,
};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let orm = create_orm_conn(&config.database_url, config.db_max_connections).await?;
    run_migrations(&orm).await?;

    let seller = ensure_user(&orm, "seller@example.com", "seller123", "Ferris Shop", Role::Seller).await?;
    let buyer = ensure_user(&orm, "buyer@example.com", "buyer123", "somchai", Role::Buyer).await?;
    seed_products(&orm, &seller).await?;

    println!("Seed completed. Seller ID: {}, Buyer ID: {}", seller.id, buyer.id);
    Ok(())
}

async fn ensure_user(
    orm: &DatabaseConnection,
    email: &str,
    password: &str,
    username: &str,
    role: Role,
) -> anyhow::Result<users::Model> {
    if let Some(existing) = users::Entity::find()
        .filter(users::Column::Email.eq(email))
        .one(orm)
        .await?
    {
        println!("User {email} already present");
        return Ok(existing);
    }

    let password_hash = hash_password(password).map_err(|e| anyhow::anyhow!(e.to_string()))?;
    let user = UserActive {
        id: Set(Uuid::new_v4()),
        email: Set(email.to_string()),
        password_hash: Set(password_hash),
        role: Set(role),
        username: Set(username.to_string()),
        address: Set("99 Rama IV Rd, Bangkok 10500".to_string()),
        phone: Set("0812345678".to_string()),
        profile_image_url: Set(None),
        promptpay_qr_url: Set(None),
        created_at: Set(Utc::now().into()),
    }
    .insert(orm)
    .await?;

    println!("Created user {email} (role={role:?})");
    Ok(user)
}

async fn seed_products(orm: &DatabaseConnection, seller: &users::Model) -> anyhow::Result<()> {
    let listings = [
        ("Vintage Lamp", "Brass desk lamp, works fine", "250.00"),
        ("Ferris Mug", "Coffee tastes better with Ferris", "120.00"),
        ("Film Camera", "35mm rangefinder, tested", "3500.50"),
        ("Rust Sticker Pack", "Decorate your laptop", "50.00"),
    ];

    for (name, detail, price) in listings {
        let exists = products::Entity::find()
            .filter(products::Column::SellerId.eq(seller.id))
            .filter(products::Column::Name.eq(name))
            .one(orm)
            .await?
            .is_some();
        if exists {
            continue;
        }

        let now = Utc::now();
        ProductActive {
            id: Set(Uuid::new_v4()),
            seller_id: Set(seller.id),
            seller_name: Set(seller.username.clone()),
            name: Set(name.to_string()),
            price: Set(parse_price(price).map_err(|e| anyhow::anyhow!(e.to_string()))?),
            detail: Set(detail.to_string()),
            image_url: Set(None),
            status: Set(ProductStatus::Available),
            buyer_id: Set(None),
            sold_at: Set(None),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(orm)
        .await?;
    }

    println!("Seeded products");
    Ok(())
}
