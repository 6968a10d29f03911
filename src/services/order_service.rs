use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::orders::{CheckoutRequest, OrderList},
    error::{AppError, AppResult},
    middleware::auth::SessionUser,
    models::{Order, OrderLine, OrderStatus, Product},
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
    services::{cart_service, product_service::fetch_product},
    store::{Collection, RemoteStore},
};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NewOrder<'a> {
    user_id: &'a str,
    items: &'a [OrderLine],
    total_amount: i64,
    status: OrderStatus,
    address: &'a str,
    phone: &'a str,
    payment_method: &'a str,
    invoice_number: String,
    created_at: DateTime<Utc>,
}

#[derive(Serialize)]
struct StockChange {
    stock: i32,
}

#[derive(Serialize)]
struct StatusChange {
    status: OrderStatus,
}

/// Filters by status and orders by creation time.
pub fn select_orders(orders: Vec<Order>, query: &OrderListQuery) -> Vec<Order> {
    let mut orders: Vec<Order> = orders
        .into_iter()
        .filter(|o| query.status.is_none_or(|s| o.status == s))
        .collect();
    match query.sort_order.unwrap_or_default() {
        SortOrder::Asc => orders.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
        SortOrder::Desc => orders.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
    }
    orders
}

pub fn paginate_orders(orders: Vec<Order>, query: &OrderListQuery) -> (OrderList, Meta) {
    let total = orders.len() as i64;
    let (items, page, per_page) = query.pagination().apply(orders);
    (OrderList { items }, Meta::new(page, per_page, total))
}

pub async fn list_orders(
    store: &RemoteStore,
    user: &SessionUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    let orders: Vec<Order> = store
        .list::<Order>(Collection::Orders)
        .await?
        .into_iter()
        .filter(|o| o.user_id == user.user_id)
        .collect();
    let (list, meta) = paginate_orders(select_orders(orders, &query), &query);
    Ok(ApiResponse::success("Ok", list, Some(meta)))
}

pub async fn get_order(
    store: &RemoteStore,
    user: &SessionUser,
    id: &str,
) -> AppResult<ApiResponse<Order>> {
    let order = store
        .get::<Order>(Collection::Orders, id)
        .await?
        .filter(|o| o.user_id == user.user_id)
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("OK", order, Some(Meta::empty())))
}

/// Turns the caller's cart into a pending order. Stock is checked against the
/// summed quantity per product. Once the order is created it is kept even if a
/// stock write or a cart delete fails afterwards; those failures are logged.
pub async fn checkout(
    store: &RemoteStore,
    user: &SessionUser,
    payload: CheckoutRequest,
) -> AppResult<ApiResponse<Order>> {
    if payload.address.trim().is_empty() {
        return Err(AppError::BadRequest("address is required".into()));
    }
    if payload.payment_method.trim().is_empty() {
        return Err(AppError::BadRequest("paymentMethod is required".into()));
    }

    let rows = cart_service::rows_for_user(store, &user.user_id).await?;
    if rows.is_empty() {
        return Err(AppError::BadRequest("Cart is empty".into()));
    }

    // one product can sit in several rows, so stock is checked per product
    let mut demand: BTreeMap<&str, i32> = BTreeMap::new();
    for row in &rows {
        *demand.entry(row.product_id.as_str()).or_default() += row.quantity;
    }
    let mut products: Vec<(Product, i32)> = Vec::with_capacity(demand.len());
    for (product_id, quantity) in demand {
        let product = fetch_product(store, product_id).await?;
        cart_service::check_stock(&product, quantity)?;
        products.push((product, quantity));
    }

    let lines: Vec<OrderLine> = rows
        .iter()
        .map(|row| OrderLine {
            product_id: row.product_id.clone(),
            title: row.title.clone(),
            category: row.category.clone(),
            quantity: row.quantity,
            unit_price: row.unit_price(),
        })
        .collect();
    let total_amount = lines.iter().map(OrderLine::line_total).sum();

    let order: Order = store
        .create(
            Collection::Orders,
            &NewOrder {
                user_id: &user.user_id,
                items: &lines,
                total_amount,
                status: OrderStatus::Pending,
                address: payload.address.trim(),
                phone: payload.phone.trim(),
                payment_method: payload.payment_method.trim(),
                invoice_number: build_invoice_number(Uuid::new_v4()),
                created_at: Utc::now(),
            },
        )
        .await?;

    // no conditional update exists remotely; decrement from the stock read above.
    // The order already exists here, so a failed write is logged, not returned.
    for (product, quantity) in &products {
        let remaining = (product.stock - quantity).max(0);
        if let Err(err) = store
            .update::<_, serde_json::Value>(
                Collection::Products,
                &product.id,
                &StockChange { stock: remaining },
            )
            .await
        {
            tracing::warn!(
                order_id = %order.id,
                product_id = %product.id,
                error = %err,
                "stock decrement failed after checkout"
            );
        }
    }

    let cleared = cart_service::clear_rows(store, &user.user_id).await?;
    if cleared.failed > 0 {
        tracing::warn!(
            order_id = %order.id,
            failed = cleared.failed,
            "cart rows left behind after checkout"
        );
    }

    log_audit(
        Some(&user.user_id),
        "checkout",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id, "total": order.total_amount })),
    );

    Ok(ApiResponse::success(
        "Checkout success",
        order,
        Some(Meta::empty()),
    ))
}

pub async fn cancel_order(
    store: &RemoteStore,
    user: &SessionUser,
    id: &str,
) -> AppResult<ApiResponse<Order>> {
    let order = store
        .get::<Order>(Collection::Orders, id)
        .await?
        .filter(|o| o.user_id == user.user_id)
        .ok_or(AppError::NotFound)?;

    if order.status != OrderStatus::Pending {
        return Err(AppError::BadRequest(
            "Only pending orders can be cancelled".into(),
        ));
    }

    let order = set_status(store, &order.id, OrderStatus::Cancelled).await?;

    log_audit(
        Some(&user.user_id),
        "order_cancel",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id })),
    );
    Ok(ApiResponse::success("Order cancelled", order, Some(Meta::empty())))
}

pub async fn set_status(store: &RemoteStore, id: &str, status: OrderStatus) -> AppResult<Order> {
    store
        .update::<_, Order>(Collection::Orders, id, &StatusChange { status })
        .await?
        .ok_or(AppError::NotFound)
}

pub fn build_invoice_number(order_id: Uuid) -> String {
    let date = Utc::now().format("%Y%m%d");
    let suffix = order_id.simple().to_string();
    let short = &suffix[..8];
    format!("INV-{}-{}", date, short.to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invoice_number_has_date_and_short_id() {
        let id = Uuid::parse_str("a1b2c3d4-0000-4000-8000-000000000000").unwrap();
        let invoice = build_invoice_number(id);
        assert!(invoice.starts_with("INV-"));
        assert!(invoice.ends_with("-A1B2C3D4"));
        assert_eq!(invoice.len(), "INV-20260101-A1B2C3D4".len());
    }
}
