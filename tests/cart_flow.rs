mod common;

use common::{TestShop, customer};
use flower_shop_api::{
    dto::cart::{AddToCartRequest, RemoveOutcome, UpdateCartRequest},
    error::AppError,
    models::CartRow,
    services::cart_service,
    store::Collection,
};

fn add(product_id: &str, quantity: i32) -> AddToCartRequest {
    AddToCartRequest {
        product_id: product_id.to_string(),
        quantity,
    }
}

async fn rows(shop: &TestShop, user_id: &str) -> Vec<CartRow> {
    cart_service::rows_for_user(shop.store(), user_id)
        .await
        .expect("list cart")
}

#[tokio::test]
async fn add_within_stock_creates_single_row() -> anyhow::Result<()> {
    let shop = TestShop::start().await?;
    let product = shop.product("Red Roses", "roses", 4500, 5).await;
    let user = customer("1");

    let resp = cart_service::add_to_cart(shop.store(), &user, add(&product, 3)).await?;
    let row = resp.data.expect("row");
    assert_eq!(row.quantity, 3);
    assert_eq!(row.title, "Red Roses");
    assert_eq!(row.category, "roses");
    assert_eq!(row.price, 4500);

    let rows = rows(&shop, "1").await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].product_id, product);
    Ok(())
}

#[tokio::test]
async fn adding_twice_merges_quantities() -> anyhow::Result<()> {
    let shop = TestShop::start().await?;
    let product = shop.product("Tulips", "tulips", 3000, 10).await;
    let user = customer("1");

    cart_service::add_to_cart(shop.store(), &user, add(&product, 2)).await?;
    cart_service::add_to_cart(shop.store(), &user, add(&product, 4)).await?;

    let rows = rows(&shop, "1").await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].quantity, 6);
    Ok(())
}

#[tokio::test]
async fn request_above_stock_is_insufficient_stock() -> anyhow::Result<()> {
    let shop = TestShop::start().await?;
    let product = shop.product("Orchid", "plants", 6500, 2).await;

    let err = cart_service::add_to_cart(shop.store(), &customer("1"), add(&product, 3))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AppError::InsufficientStock {
            requested: 3,
            available: 2
        }
    ));
    assert!(rows(&shop, "1").await.is_empty());
    Ok(())
}

#[tokio::test]
async fn stock_walkthrough_add_merge_update() -> anyhow::Result<()> {
    let shop = TestShop::start().await?;
    let product = shop.product("Peonies", "peonies", 5200, 5).await;
    let user = customer("1");

    cart_service::add_to_cart(shop.store(), &user, add(&product, 3)).await?;

    let err = cart_service::add_to_cart(shop.store(), &user, add(&product, 3))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "exceeds_stock");
    let row = rows(&shop, "1").await.remove(0);
    assert_eq!(row.quantity, 3);

    let updated = cart_service::update_quantity(
        shop.store(),
        &user,
        &row.id,
        UpdateCartRequest { quantity: 5 },
    )
    .await?;
    assert_eq!(updated.data.expect("row").quantity, 5);

    let err = cart_service::update_quantity(
        shop.store(),
        &user,
        &row.id,
        UpdateCartRequest { quantity: 6 },
    )
    .await
    .unwrap_err();
    assert_eq!(err.code(), "insufficient_stock");
    assert_eq!(rows(&shop, "1").await[0].quantity, 5);
    Ok(())
}

#[tokio::test]
async fn non_positive_quantity_is_rejected() -> anyhow::Result<()> {
    let shop = TestShop::start().await?;
    let product = shop.product("Lilies", "lilies", 3800, 5).await;

    let err = cart_service::add_to_cart(shop.store(), &customer("1"), add(&product, 0))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
    Ok(())
}

#[tokio::test]
async fn unknown_product_is_not_found() -> anyhow::Result<()> {
    let shop = TestShop::start().await?;
    let err = cart_service::add_to_cart(shop.store(), &customer("1"), add("999", 1))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound));
    Ok(())
}

#[tokio::test]
async fn update_of_foreign_row_is_not_found() -> anyhow::Result<()> {
    let shop = TestShop::start().await?;
    let product = shop.product("Sunflowers", "seasonal", 2500, 9).await;
    cart_service::add_to_cart(shop.store(), &customer("1"), add(&product, 1)).await?;
    let row = rows(&shop, "1").await.remove(0);

    let err = cart_service::update_quantity(
        shop.store(),
        &customer("2"),
        &row.id,
        UpdateCartRequest { quantity: 2 },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::NotFound));
    Ok(())
}

#[tokio::test]
async fn remove_requires_confirmation() -> anyhow::Result<()> {
    let shop = TestShop::start().await?;
    let product = shop.product("Daisies", "seasonal", 1500, 9).await;
    let user = customer("1");
    cart_service::add_to_cart(shop.store(), &user, add(&product, 1)).await?;
    let row = rows(&shop, "1").await.remove(0);

    let declined = cart_service::remove_row(shop.store(), &user, &row.id, false).await?;
    assert_eq!(declined.message, "Cancelled");
    assert_eq!(declined.data.expect("result").outcome, RemoveOutcome::Cancelled);
    assert_eq!(rows(&shop, "1").await.len(), 1);

    let confirmed = cart_service::remove_row(shop.store(), &user, &row.id, true).await?;
    assert!(confirmed.data.expect("result").removed);
    assert!(rows(&shop, "1").await.is_empty());
    Ok(())
}

#[tokio::test]
async fn clear_only_touches_own_rows() -> anyhow::Result<()> {
    let shop = TestShop::start().await?;
    let roses = shop.product("Roses", "roses", 4500, 20).await;
    let lilies = shop.product("Lilies", "lilies", 3800, 20).await;

    let alice = customer("a");
    let bob = customer("b");
    cart_service::add_to_cart(shop.store(), &alice, add(&roses, 2)).await?;
    cart_service::add_to_cart(shop.store(), &alice, add(&lilies, 1)).await?;
    cart_service::add_to_cart(shop.store(), &bob, add(&roses, 4)).await?;

    let cleared = cart_service::clear_cart(shop.store(), &alice).await?;
    let result = cleared.data.expect("result");
    assert_eq!(result.dispatched, 2);
    assert_eq!(result.failed, 0);

    assert!(rows(&shop, "a").await.is_empty());
    let bob_rows = rows(&shop, "b").await;
    assert_eq!(bob_rows.len(), 1);
    assert_eq!(bob_rows[0].quantity, 4);
    Ok(())
}

#[tokio::test]
async fn clear_reports_success_despite_failed_deletes() -> anyhow::Result<()> {
    let shop = TestShop::start().await?;
    let roses = shop.product("Roses", "roses", 4500, 20).await;
    let lilies = shop.product("Lilies", "lilies", 3800, 20).await;
    let user = customer("1");
    cart_service::add_to_cart(shop.store(), &user, add(&roses, 1)).await?;
    cart_service::add_to_cart(shop.store(), &user, add(&lilies, 1)).await?;

    let stuck = rows(&shop, "1").await.remove(0);
    shop.mock.inject_failure(Collection::Cart, &stuck.id).await;

    let result = cart_service::clear_cart(shop.store(), &user)
        .await?
        .data
        .expect("result");
    assert_eq!(result.dispatched, 2);
    assert_eq!(result.failed, 1);

    let left = rows(&shop, "1").await;
    assert_eq!(left.len(), 1);
    assert_eq!(left[0].id, stuck.id);
    Ok(())
}

#[tokio::test]
async fn list_reports_totals() -> anyhow::Result<()> {
    let shop = TestShop::start().await?;
    let roses = shop.product("Roses", "roses", 4500, 20).await;
    let user = customer("1");
    cart_service::add_to_cart(shop.store(), &user, add(&roses, 2)).await?;

    let summary = cart_service::list_cart(shop.store(), &user)
        .await?
        .data
        .expect("summary");
    assert_eq!(summary.item_count, 2);
    assert_eq!(summary.subtotal, 9000);
    assert_eq!(summary.total, 9000);
    Ok(())
}
