use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get, post},
};

use crate::{
    dto::wishlist::{MoveToCartRequest, MoveToCartResult, ToggleResult, WishlistList, WishlistRequest},
    error::AppResult,
    middleware::auth::SessionUser,
    response::ApiResponse,
    services::wishlist_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_wishlist))
        .route("/toggle", post(toggle_wishlist))
        .route("/{product_id}", delete(remove_wishlist))
        .route("/{product_id}/move-to-cart", post(move_to_cart))
}

#[utoipa::path(
    get,
    path = "/api/wishlist",
    responses(
        (status = 200, description = "Wishlist rows for current user", body = ApiResponse<WishlistList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Wishlist"
)]
pub async fn list_wishlist(
    State(state): State<AppState>,
    user: SessionUser,
) -> AppResult<Json<ApiResponse<WishlistList>>> {
    let resp = wishlist_service::list_wishlist(&state.store, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/wishlist/toggle",
    request_body = WishlistRequest,
    responses(
        (status = 200, description = "Added or removed", body = ApiResponse<ToggleResult>),
        (status = 404, description = "Product not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Wishlist"
)]
pub async fn toggle_wishlist(
    State(state): State<AppState>,
    user: SessionUser,
    Json(payload): Json<WishlistRequest>,
) -> AppResult<Json<ApiResponse<ToggleResult>>> {
    let resp = wishlist_service::toggle(&state.store, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/wishlist/{product_id}",
    params(
        ("product_id" = String, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Removed from wishlist", body = ApiResponse<serde_json::Value>),
        (status = 404, description = "Not wishlisted")
    ),
    security(("bearer_auth" = [])),
    tag = "Wishlist"
)]
pub async fn remove_wishlist(
    State(state): State<AppState>,
    user: SessionUser,
    Path(product_id): Path<String>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = wishlist_service::remove(&state.store, &user, &product_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/wishlist/{product_id}/move-to-cart",
    params(
        ("product_id" = String, Path, description = "Product ID")
    ),
    request_body = MoveToCartRequest,
    responses(
        (status = 200, description = "Moved to cart", body = ApiResponse<MoveToCartResult>),
        (status = 404, description = "Not wishlisted"),
        (status = 409, description = "insufficient_stock or exceeds_stock")
    ),
    security(("bearer_auth" = [])),
    tag = "Wishlist"
)]
pub async fn move_to_cart(
    State(state): State<AppState>,
    user: SessionUser,
    Path(product_id): Path<String>,
    Json(payload): Json<MoveToCartRequest>,
) -> AppResult<Json<ApiResponse<MoveToCartResult>>> {
    let resp = wishlist_service::move_to_cart(&state.store, &user, &product_id, payload).await?;
    Ok(Json(resp))
}
