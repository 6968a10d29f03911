//! Cart rows and their reconciliation with product stock.
//!
//! Stock is re-read from the remote store on every mutating call; nothing cached
//! locally is trusted. The store offers no conditional writes, so the
//! check-then-write sequence below can race with a concurrent caller for the
//! same product. Two tabs adding the last units at once can both succeed.

use futures::future::join_all;
use serde::Serialize;

use crate::{
    audit::log_audit,
    dto::cart::{
        AddToCartRequest, CartSummary, ClearResult, RemoveOutcome, RemoveResult, UpdateCartRequest,
    },
    error::{AppError, AppResult},
    middleware::auth::SessionUser,
    models::{CartRow, Product},
    response::{ApiResponse, Meta},
    services::product_service::fetch_product,
    store::{Collection, RemoteStore},
};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NewCartRow<'a> {
    product_id: &'a str,
    user_id: &'a str,
    quantity: i32,
    price: i64,
    discount_price: Option<i64>,
    title: &'a str,
    image: &'a str,
    category: &'a str,
}

#[derive(Serialize)]
struct QuantityChange {
    quantity: i32,
}

/// All cart rows owned by `user_id`. The store returns every user's rows.
pub async fn rows_for_user(store: &RemoteStore, user_id: &str) -> AppResult<Vec<CartRow>> {
    let rows: Vec<CartRow> = store.list(Collection::Cart).await?;
    Ok(rows.into_iter().filter(|r| r.user_id == user_id).collect())
}

pub fn summarize(items: Vec<CartRow>) -> CartSummary {
    let item_count = items.iter().map(|r| i64::from(r.quantity)).sum();
    let subtotal = items
        .iter()
        .map(|r| r.price * i64::from(r.quantity))
        .sum();
    let total = items
        .iter()
        .map(|r| r.unit_price() * i64::from(r.quantity))
        .sum();
    CartSummary {
        items,
        item_count,
        subtotal,
        total,
    }
}

pub async fn list_cart(
    store: &RemoteStore,
    user: &SessionUser,
) -> AppResult<ApiResponse<CartSummary>> {
    let rows = rows_for_user(store, &user.user_id).await?;
    let total = rows.len() as i64;
    Ok(ApiResponse::success(
        "OK",
        summarize(rows),
        Some(Meta::new(1, total, total)),
    ))
}

fn ensure_positive(quantity: i32) -> AppResult<()> {
    if quantity <= 0 {
        return Err(AppError::BadRequest(
            "quantity must be greater than 0".to_string(),
        ));
    }
    Ok(())
}

/// Checks a requested quantity against the stock of `product`.
pub fn check_stock(product: &Product, quantity: i32) -> AppResult<()> {
    if quantity > product.stock {
        return Err(AppError::InsufficientStock {
            requested: quantity,
            available: product.stock,
        });
    }
    Ok(())
}

/// Checks the merged quantity of an existing row against stock.
pub fn check_merge(product: &Product, in_cart: i32, requested: i32) -> AppResult<i32> {
    let merged = in_cart.saturating_add(requested);
    if merged > product.stock {
        return Err(AppError::ExceedsStock {
            in_cart,
            requested,
            available: product.stock,
        });
    }
    Ok(merged)
}

pub async fn add_to_cart(
    store: &RemoteStore,
    user: &SessionUser,
    payload: AddToCartRequest,
) -> AppResult<ApiResponse<CartRow>> {
    ensure_positive(payload.quantity)?;

    let product = fetch_product(store, &payload.product_id).await?;
    check_stock(&product, payload.quantity)?;

    // rows are matched on the denormalized title, not the product id
    let existing = rows_for_user(store, &user.user_id)
        .await?
        .into_iter()
        .find(|row| row.title == product.title);

    let row = if let Some(row) = existing {
        let merged = check_merge(&product, row.quantity, payload.quantity)?;
        store
            .update::<_, CartRow>(Collection::Cart, &row.id, &QuantityChange { quantity: merged })
            .await?
            .ok_or(AppError::NotFound)?
    } else {
        store
            .create::<_, CartRow>(
                Collection::Cart,
                &NewCartRow {
                    product_id: &product.id,
                    user_id: &user.user_id,
                    quantity: payload.quantity,
                    price: product.price,
                    discount_price: product.discount_price,
                    title: &product.title,
                    image: &product.image,
                    category: &product.category,
                },
            )
            .await?
    };

    log_audit(
        Some(&user.user_id),
        "cart_add",
        Some("cart"),
        Some(serde_json::json!({ "product_id": product.id, "quantity": row.quantity })),
    );

    Ok(ApiResponse::success("Added to cart", row, None))
}

async fn owned_row(store: &RemoteStore, user: &SessionUser, id: &str) -> AppResult<CartRow> {
    store
        .get::<CartRow>(Collection::Cart, id)
        .await?
        .filter(|row| row.user_id == user.user_id)
        .ok_or(AppError::NotFound)
}

pub async fn update_quantity(
    store: &RemoteStore,
    user: &SessionUser,
    id: &str,
    payload: UpdateCartRequest,
) -> AppResult<ApiResponse<CartRow>> {
    ensure_positive(payload.quantity)?;

    let row = owned_row(store, user, id).await?;
    let product = fetch_product(store, &row.product_id).await?;
    check_stock(&product, payload.quantity)?;

    let row: CartRow = store
        .update(
            Collection::Cart,
            &row.id,
            &QuantityChange {
                quantity: payload.quantity,
            },
        )
        .await?
        .ok_or(AppError::NotFound)?;

    log_audit(
        Some(&user.user_id),
        "cart_update",
        Some("cart"),
        Some(serde_json::json!({ "row_id": row.id, "quantity": row.quantity })),
    );

    Ok(ApiResponse::success("Cart updated", row, None))
}

/// Deletes a row only when the caller confirmed. A declined confirmation is
/// reported as [`RemoveOutcome::Cancelled`], not as an error.
pub async fn remove_row(
    store: &RemoteStore,
    user: &SessionUser,
    id: &str,
    confirmed: bool,
) -> AppResult<ApiResponse<RemoveResult>> {
    if !confirmed {
        return Ok(ApiResponse::cancelled(RemoveResult {
            outcome: RemoveOutcome::Cancelled,
            removed: false,
        }));
    }

    let row = owned_row(store, user, id).await?;
    if !store.delete(Collection::Cart, &row.id).await? {
        return Err(AppError::NotFound);
    }

    log_audit(
        Some(&user.user_id),
        "cart_remove",
        Some("cart"),
        Some(serde_json::json!({ "row_id": row.id, "product_id": row.product_id })),
    );

    Ok(ApiResponse::success(
        "Removed from cart",
        RemoveResult {
            outcome: RemoveOutcome::Removed,
            removed: true,
        },
        Some(Meta::empty()),
    ))
}

/// Deletes every row of the user concurrently. Individual failures are logged and
/// counted, never rolled back or retried.
pub async fn clear_rows(store: &RemoteStore, user_id: &str) -> AppResult<ClearResult> {
    let rows = rows_for_user(store, user_id).await?;
    let deletes = rows.iter().map(|row| async move {
        let result = store.delete(Collection::Cart, &row.id).await;
        if let Err(err) = &result {
            tracing::warn!(row_id = %row.id, error = %err, "cart row delete failed");
        }
        result
    });
    let results = join_all(deletes).await;

    Ok(ClearResult {
        dispatched: results.len(),
        failed: results.iter().filter(|r| r.is_err()).count(),
    })
}

pub async fn clear_cart(
    store: &RemoteStore,
    user: &SessionUser,
) -> AppResult<ApiResponse<ClearResult>> {
    let result = clear_rows(store, &user.user_id).await?;

    log_audit(
        Some(&user.user_id),
        "cart_clear",
        Some("cart"),
        Some(serde_json::json!({ "dispatched": result.dispatched, "failed": result.failed })),
    );

    Ok(ApiResponse::success("Cart cleared", result, Some(Meta::empty())))
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn product(stock: i32) -> Product {
        Product {
            id: "p1".into(),
            title: "Tulips".into(),
            description: String::new(),
            category: "tulips".into(),
            image: String::new(),
            price: 1200,
            discount_price: Some(1000),
            stock,
            rating: 0.0,
            created_at: Utc::now(),
        }
    }

    fn row(quantity: i32, price: i64, discount_price: Option<i64>) -> CartRow {
        CartRow {
            id: "r".into(),
            product_id: "p".into(),
            user_id: "u".into(),
            quantity,
            price,
            discount_price,
            title: "t".into(),
            image: String::new(),
            category: "c".into(),
        }
    }

    #[test]
    fn stock_check_allows_exact_stock() {
        assert!(check_stock(&product(5), 5).is_ok());
        let err = check_stock(&product(5), 6).unwrap_err();
        assert_eq!(err.code(), "insufficient_stock");
    }

    #[test]
    fn merge_over_stock_is_its_own_error() {
        assert_eq!(check_merge(&product(5), 2, 3).unwrap(), 5);
        let err = check_merge(&product(5), 3, 3).unwrap_err();
        assert_eq!(err.code(), "exceeds_stock");
    }

    #[test]
    fn summary_uses_discount_for_total() {
        let summary = summarize(vec![row(2, 1200, Some(1000)), row(1, 500, None)]);
        assert_eq!(summary.item_count, 3);
        assert_eq!(summary.subtotal, 2900);
        assert_eq!(summary.total, 2500);
    }
}
