mod common;

use common::{TestShop, customer};
use flower_shop_api::{
    dto::wishlist::{MoveToCartRequest, ToggleOutcome, WishlistRequest},
    error::AppError,
    services::{cart_service, wishlist_service},
};

fn request(product_id: &str) -> WishlistRequest {
    WishlistRequest {
        product_id: product_id.to_string(),
    }
}

#[tokio::test]
async fn toggle_adds_then_removes() -> anyhow::Result<()> {
    let shop = TestShop::start().await?;
    let product = shop.product("Hydrangea", "seasonal", 4200, 3).await;
    let user = customer("1");

    let first = wishlist_service::toggle(shop.store(), &user, request(&product))
        .await?
        .data
        .expect("toggle");
    assert_eq!(first.outcome, ToggleOutcome::Added);
    assert_eq!(first.row.expect("row").title, "Hydrangea");
    assert_eq!(wishlist_service::rows_for_user(shop.store(), "1").await?.len(), 1);

    let second = wishlist_service::toggle(shop.store(), &user, request(&product))
        .await?
        .data
        .expect("toggle");
    assert_eq!(second.outcome, ToggleOutcome::Removed);
    assert!(wishlist_service::rows_for_user(shop.store(), "1").await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn wishlists_are_per_user() -> anyhow::Result<()> {
    let shop = TestShop::start().await?;
    let product = shop.product("Hydrangea", "seasonal", 4200, 3).await;

    wishlist_service::toggle(shop.store(), &customer("1"), request(&product)).await?;
    wishlist_service::toggle(shop.store(), &customer("2"), request(&product)).await?;

    let err = wishlist_service::remove(shop.store(), &customer("3"), &product)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    wishlist_service::remove(shop.store(), &customer("1"), &product).await?;
    assert!(wishlist_service::rows_for_user(shop.store(), "1").await?.is_empty());
    assert_eq!(wishlist_service::rows_for_user(shop.store(), "2").await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn move_to_cart_transfers_row() -> anyhow::Result<()> {
    let shop = TestShop::start().await?;
    let product = shop.product("Lavender", "plants", 1900, 4).await;
    let user = customer("1");
    wishlist_service::toggle(shop.store(), &user, request(&product)).await?;

    let moved = wishlist_service::move_to_cart(
        shop.store(),
        &user,
        &product,
        MoveToCartRequest { quantity: 2 },
    )
    .await?
    .data
    .expect("moved");
    assert_eq!(moved.cart.quantity, 2);

    assert!(wishlist_service::rows_for_user(shop.store(), "1").await?.is_empty());
    let cart = cart_service::rows_for_user(shop.store(), "1").await?;
    assert_eq!(cart.len(), 1);
    assert_eq!(cart[0].product_id, product);
    Ok(())
}

#[tokio::test]
async fn failed_move_keeps_wishlist_row() -> anyhow::Result<()> {
    let shop = TestShop::start().await?;
    let product = shop.product("Lavender", "plants", 1900, 1).await;
    let user = customer("1");
    wishlist_service::toggle(shop.store(), &user, request(&product)).await?;

    let err = wishlist_service::move_to_cart(
        shop.store(),
        &user,
        &product,
        MoveToCartRequest { quantity: 3 },
    )
    .await
    .unwrap_err();
    assert_eq!(err.code(), "insufficient_stock");
    assert_eq!(wishlist_service::rows_for_user(shop.store(), "1").await?.len(), 1);
    assert!(cart_service::rows_for_user(shop.store(), "1").await?.is_empty());
    Ok(())
}
