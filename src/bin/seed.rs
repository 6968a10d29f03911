use chrono::Utc;
use flower_shop_api::{
    config::AppConfig,
    models::{Product, Role, User},
    services::auth_service::{NewUser, hash_password},
    store::{Collection, RemoteStore},
};
use serde_json::json;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;
    let store = RemoteStore::new(&config.store_url, config.store_timeout)?;

    let admin_id = ensure_user(&store, "Shop Admin", "admin@example.com", "admin123", Role::Admin).await?;
    let user_id = ensure_user(&store, "Daisy Buyer", "user@example.com", "user123", Role::Customer).await?;
    seed_products(&store).await?;

    println!("Seed completed. Admin ID: {admin_id}, User ID: {user_id}");
    Ok(())
}

async fn ensure_user(
    store: &RemoteStore,
    name: &str,
    email: &str,
    password: &str,
    role: Role,
) -> anyhow::Result<String> {
    let users: Vec<User> = store.list(Collection::Users).await?;
    if let Some(existing) = users.into_iter().find(|u| u.email == email) {
        println!("User {email} already present");
        return Ok(existing.id);
    }

    let password_hash = hash_password(password).map_err(|e| anyhow::anyhow!(e.to_string()))?;
    let user: User = store
        .create(
            Collection::Users,
            &NewUser {
                name,
                email,
                password_hash: &password_hash,
                role,
                created_at: Utc::now(),
            },
        )
        .await?;

    println!("Ensured user {email} (role={})", role.as_str());
    Ok(user.id)
}

async fn seed_products(store: &RemoteStore) -> anyhow::Result<()> {
    let products = vec![
        ("Red Rose Bouquet", "Twelve long-stem red roses", "roses", 4500, Some(3900), 25),
        ("Pink Peonies", "Seasonal peonies wrapped in kraft paper", "peonies", 5200, None, 12),
        ("White Lilies", "Fragrant oriental lilies", "lilies", 3800, None, 18),
        ("Sunflower Bunch", "Five bright sunflowers", "seasonal", 2500, Some(2200), 30),
        ("Tulip Mix", "Ten tulips in mixed colors", "tulips", 3000, None, 40),
        ("Orchid Pot", "Phalaenopsis orchid in a ceramic pot", "plants", 6500, None, 6),
    ];

    let existing: Vec<Product> = store.list(Collection::Products).await?;
    for (title, description, category, price, discount_price, stock) in products {
        if existing.iter().any(|p| p.title == title) {
            continue;
        }
        let _: Product = store
            .create(
                Collection::Products,
                &json!({
                    "title": title,
                    "description": description,
                    "category": category,
                    "image": "",
                    "price": price,
                    "discountPrice": discount_price,
                    "stock": stock,
                    "rating": 0.0,
                    "createdAt": Utc::now(),
                }),
            )
            .await?;
    }

    println!("Seeded products");
    Ok(())
}
