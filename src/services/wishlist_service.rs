use serde::Serialize;

use crate::{
    audit::log_audit,
    dto::{
        cart::AddToCartRequest,
        wishlist::{
            MoveToCartRequest, MoveToCartResult, ToggleOutcome, ToggleResult, WishlistList,
            WishlistRequest,
        },
    },
    error::{AppError, AppResult},
    middleware::auth::SessionUser,
    models::WishlistRow,
    response::{ApiResponse, Meta},
    services::{cart_service, product_service::fetch_product},
    store::{Collection, RemoteStore},
};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NewWishlistRow<'a> {
    product_id: &'a str,
    user_id: &'a str,
    title: &'a str,
    image: &'a str,
    category: &'a str,
    price: i64,
    discount_price: Option<i64>,
}

pub async fn rows_for_user(store: &RemoteStore, user_id: &str) -> AppResult<Vec<WishlistRow>> {
    let rows: Vec<WishlistRow> = store.list(Collection::Wishlist).await?;
    Ok(rows.into_iter().filter(|r| r.user_id == user_id).collect())
}

async fn find_row(
    store: &RemoteStore,
    user_id: &str,
    product_id: &str,
) -> AppResult<Option<WishlistRow>> {
    Ok(rows_for_user(store, user_id)
        .await?
        .into_iter()
        .find(|r| r.product_id == product_id))
}

pub async fn list_wishlist(
    store: &RemoteStore,
    user: &SessionUser,
) -> AppResult<ApiResponse<WishlistList>> {
    let items = rows_for_user(store, &user.user_id).await?;
    let total = items.len() as i64;
    Ok(ApiResponse::success(
        "OK",
        WishlistList { items },
        Some(Meta::new(1, total, total)),
    ))
}

/// Adds the product when it is not wishlisted yet, removes it otherwise.
pub async fn toggle(
    store: &RemoteStore,
    user: &SessionUser,
    payload: WishlistRequest,
) -> AppResult<ApiResponse<ToggleResult>> {
    if let Some(row) = find_row(store, &user.user_id, &payload.product_id).await? {
        store.delete(Collection::Wishlist, &row.id).await?;
        log_audit(
            Some(&user.user_id),
            "wishlist_remove",
            Some("wishlist"),
            Some(serde_json::json!({ "product_id": row.product_id })),
        );
        return Ok(ApiResponse::success(
            "Removed from wishlist",
            ToggleResult {
                outcome: ToggleOutcome::Removed,
                row: None,
            },
            Some(Meta::empty()),
        ));
    }

    let product = fetch_product(store, &payload.product_id).await?;
    let row: WishlistRow = store
        .create(
            Collection::Wishlist,
            &NewWishlistRow {
                product_id: &product.id,
                user_id: &user.user_id,
                title: &product.title,
                image: &product.image,
                category: &product.category,
                price: product.price,
                discount_price: product.discount_price,
            },
        )
        .await?;

    log_audit(
        Some(&user.user_id),
        "wishlist_add",
        Some("wishlist"),
        Some(serde_json::json!({ "product_id": product.id })),
    );
    Ok(ApiResponse::success(
        "Added to wishlist",
        ToggleResult {
            outcome: ToggleOutcome::Added,
            row: Some(row),
        },
        Some(Meta::empty()),
    ))
}

pub async fn remove(
    store: &RemoteStore,
    user: &SessionUser,
    product_id: &str,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let row = find_row(store, &user.user_id, product_id)
        .await?
        .ok_or(AppError::NotFound)?;
    if !store.delete(Collection::Wishlist, &row.id).await? {
        return Err(AppError::NotFound);
    }

    log_audit(
        Some(&user.user_id),
        "wishlist_remove",
        Some("wishlist"),
        Some(serde_json::json!({ "product_id": product_id })),
    );
    Ok(ApiResponse::success(
        "Removed from wishlist",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

/// Adds a wishlisted product to the cart under the usual stock rules, then drops
/// it from the wishlist. The wishlist row stays if the cart add fails.
pub async fn move_to_cart(
    store: &RemoteStore,
    user: &SessionUser,
    product_id: &str,
    payload: MoveToCartRequest,
) -> AppResult<ApiResponse<MoveToCartResult>> {
    let row = find_row(store, &user.user_id, product_id)
        .await?
        .ok_or(AppError::NotFound)?;

    let added = cart_service::add_to_cart(
        store,
        user,
        AddToCartRequest {
            product_id: row.product_id.clone(),
            quantity: payload.quantity,
        },
    )
    .await?;
    let cart = added
        .data
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("cart add returned no row")))?;

    store.delete(Collection::Wishlist, &row.id).await?;

    Ok(ApiResponse::success(
        "Moved to cart",
        MoveToCartResult { cart },
        Some(Meta::empty()),
    ))
}
