use serde::Serialize;

use crate::{
    audit::log_audit,
    dto::{
        admin::{InventoryAdjustRequest, LowStockQuery, UpdateRoleRequest, UserList},
        orders::{OrderList, UpdateOrderStatusRequest},
        products::ProductList,
    },
    error::{AppError, AppResult},
    middleware::auth::{SessionUser, ensure_admin},
    models::{Order, Product, PublicUser, Role, User},
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, Pagination},
    services::{
        order_service::{paginate_orders, select_orders, set_status},
        product_service::fetch_product,
    },
    state::AppState,
    store::Collection,
};

#[derive(Serialize)]
struct StockChange {
    stock: i32,
}

#[derive(Serialize)]
struct RoleChange {
    role: Role,
}

pub async fn list_all_orders(
    state: &AppState,
    user: &SessionUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    ensure_admin(user)?;
    let orders: Vec<Order> = state.store.list(Collection::Orders).await?;
    let (list, meta) = paginate_orders(select_orders(orders, &query), &query);
    Ok(ApiResponse::success("Orders", list, Some(meta)))
}

pub async fn get_order_admin(
    state: &AppState,
    user: &SessionUser,
    id: &str,
) -> AppResult<ApiResponse<Order>> {
    ensure_admin(user)?;
    let order = state
        .store
        .get::<Order>(Collection::Orders, id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("Order found", order, Some(Meta::empty())))
}

pub async fn update_order_status(
    state: &AppState,
    user: &SessionUser,
    id: &str,
    payload: UpdateOrderStatusRequest,
) -> AppResult<ApiResponse<Order>> {
    ensure_admin(user)?;
    let order = set_status(&state.store, id, payload.status).await?;

    log_audit(
        Some(&user.user_id),
        "order_status_update",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id, "status": order.status.as_str() })),
    );

    Ok(ApiResponse::success("Order updated", order, Some(Meta::empty())))
}

pub async fn list_low_stock(
    state: &AppState,
    user: &SessionUser,
    query: LowStockQuery,
) -> AppResult<ApiResponse<ProductList>> {
    ensure_admin(user)?;
    let threshold = query.threshold.unwrap_or(state.low_stock_threshold);

    let mut products: Vec<Product> = state
        .store
        .list::<Product>(Collection::Products)
        .await?
        .into_iter()
        .filter(|p| p.stock <= threshold)
        .collect();
    products.sort_by(|a, b| {
        a.stock
            .cmp(&b.stock)
            .then_with(|| b.created_at.cmp(&a.created_at))
    });

    let total = products.len() as i64;
    let pagination = Pagination {
        page: query.page,
        per_page: query.per_page,
    };
    let (items, page, per_page) = pagination.apply(products);
    Ok(ApiResponse::success(
        "Low stock",
        ProductList { items },
        Some(Meta::new(page, per_page, total)),
    ))
}

pub async fn adjust_inventory(
    state: &AppState,
    user: &SessionUser,
    id: &str,
    payload: InventoryAdjustRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_admin(user)?;
    if payload.delta == 0 {
        return Err(AppError::BadRequest("delta must not be 0".into()));
    }

    let product = fetch_product(&state.store, id).await?;
    let new_stock = product
        .stock
        .checked_add(payload.delta)
        .ok_or_else(|| AppError::BadRequest("stock adjustment is out of range".into()))?;
    if new_stock < 0 {
        return Err(AppError::BadRequest("stock cannot be negative".into()));
    }

    let updated: Product = state
        .store
        .update(Collection::Products, id, &StockChange { stock: new_stock })
        .await?
        .ok_or(AppError::NotFound)?;

    log_audit(
        Some(&user.user_id),
        "inventory_adjust",
        Some("products"),
        Some(serde_json::json!({ "product_id": updated.id, "delta": payload.delta })),
    );

    Ok(ApiResponse::success(
        "Inventory updated",
        updated,
        Some(Meta::empty()),
    ))
}

pub async fn list_users(
    state: &AppState,
    user: &SessionUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<UserList>> {
    ensure_admin(user)?;
    let mut users: Vec<PublicUser> = state
        .store
        .list::<User>(Collection::Users)
        .await?
        .into_iter()
        .map(PublicUser::from)
        .collect();
    users.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let total = users.len() as i64;
    let (items, page, per_page) = pagination.apply(users);
    Ok(ApiResponse::success(
        "Users",
        UserList { items },
        Some(Meta::new(page, per_page, total)),
    ))
}

pub async fn update_user_role(
    state: &AppState,
    user: &SessionUser,
    id: &str,
    payload: UpdateRoleRequest,
) -> AppResult<ApiResponse<PublicUser>> {
    ensure_admin(user)?;
    let updated: User = state
        .store
        .update(Collection::Users, id, &RoleChange { role: payload.role })
        .await?
        .ok_or(AppError::NotFound)?;

    log_audit(
        Some(&user.user_id),
        "user_role_update",
        Some("users"),
        Some(serde_json::json!({ "user_id": updated.id, "role": updated.role.as_str() })),
    );
    Ok(ApiResponse::success("User updated", updated.into(), Some(Meta::empty())))
}

pub async fn delete_user(
    state: &AppState,
    user: &SessionUser,
    id: &str,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    if user.user_id == id {
        return Err(AppError::BadRequest("cannot delete your own account".into()));
    }
    if !state.store.delete(Collection::Users, id).await? {
        return Err(AppError::NotFound);
    }

    log_audit(
        Some(&user.user_id),
        "user_delete",
        Some("users"),
        Some(serde_json::json!({ "user_id": id })),
    );
    Ok(ApiResponse::success(
        "User deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}
