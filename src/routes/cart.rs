use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, put},
};

use crate::{
    dto::cart::{
        AddToCartRequest, CartSummary, ClearResult, RemoveCartQuery, RemoveResult,
        UpdateCartRequest,
    },
    error::AppResult,
    middleware::auth::SessionUser,
    models::CartRow,
    response::ApiResponse,
    services::cart_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(cart_list).post(add_to_cart).delete(clear_cart))
        .route("/{id}", put(update_quantity).delete(remove_row))
}

#[utoipa::path(
    get,
    path = "/api/cart",
    responses(
        (status = 200, description = "Cart rows and totals for current user", body = ApiResponse<CartSummary>),
        (status = 401, description = "Not logged in")
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn cart_list(
    State(state): State<AppState>,
    user: SessionUser,
) -> AppResult<Json<ApiResponse<CartSummary>>> {
    let resp = cart_service::list_cart(&state.store, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/cart",
    request_body = AddToCartRequest,
    responses(
        (status = 200, description = "Insert or merge a cart row", body = ApiResponse<CartRow>),
        (status = 400, description = "Bad request"),
        (status = 401, description = "Not logged in"),
        (status = 404, description = "Product not found"),
        (status = 409, description = "insufficient_stock or exceeds_stock"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn add_to_cart(
    State(state): State<AppState>,
    user: SessionUser,
    Json(payload): Json<AddToCartRequest>,
) -> AppResult<Json<ApiResponse<CartRow>>> {
    let resp = cart_service::add_to_cart(&state.store, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/cart/{id}",
    params(
        ("id" = String, Path, description = "Cart row ID")
    ),
    request_body = UpdateCartRequest,
    responses(
        (status = 200, description = "Quantity overwritten", body = ApiResponse<CartRow>),
        (status = 404, description = "Cart row not found"),
        (status = 409, description = "insufficient_stock"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn update_quantity(
    State(state): State<AppState>,
    user: SessionUser,
    Path(id): Path<String>,
    Json(payload): Json<UpdateCartRequest>,
) -> AppResult<Json<ApiResponse<CartRow>>> {
    let resp = cart_service::update_quantity(&state.store, &user, &id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/cart/{id}",
    params(
        ("id" = String, Path, description = "Cart row ID"),
        ("confirm" = Option<bool>, Query, description = "Must be true to delete; otherwise the removal is cancelled")
    ),
    responses(
        (status = 200, description = "Removed or cancelled", body = ApiResponse<RemoveResult>),
        (status = 404, description = "Cart row not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn remove_row(
    State(state): State<AppState>,
    user: SessionUser,
    Path(id): Path<String>,
    Query(query): Query<RemoveCartQuery>,
) -> AppResult<Json<ApiResponse<RemoveResult>>> {
    let confirmed = query.confirm.unwrap_or(false);
    let resp = cart_service::remove_row(&state.store, &user, &id, confirmed).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/cart",
    responses(
        (status = 200, description = "All rows dispatched for deletion", body = ApiResponse<ClearResult>),
        (status = 401, description = "Not logged in")
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn clear_cart(
    State(state): State<AppState>,
    user: SessionUser,
) -> AppResult<Json<ApiResponse<ClearResult>>> {
    let resp = cart_service::clear_cart(&state.store, &user).await?;
    Ok(Json(resp))
}
