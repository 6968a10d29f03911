use std::{cmp::Ordering, collections::BTreeMap};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    audit::log_audit,
    dto::products::{
        CategoryCount, CreateProductRequest, ProductDetail, ProductList, UpdateProductRequest,
    },
    error::{AppError, AppResult},
    middleware::auth::{SessionUser, ensure_admin},
    models::{Product, Review},
    response::{ApiResponse, Meta},
    routes::params::{ProductQuery, ProductSortBy, SortOrder},
    state::AppState,
    store::{Collection, RemoteStore},
};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NewProduct<'a> {
    title: &'a str,
    description: &'a str,
    category: &'a str,
    image: &'a str,
    price: i64,
    discount_price: Option<i64>,
    stock: i32,
    rating: f64,
    created_at: DateTime<Utc>,
}

pub async fn fetch_product(store: &RemoteStore, id: &str) -> AppResult<Product> {
    store
        .get::<Product>(Collection::Products, id)
        .await?
        .ok_or(AppError::NotFound)
}

/// Applies search, filters and ordering from `query` to a full product listing.
pub fn filter_products(products: Vec<Product>, query: &ProductQuery) -> Vec<Product> {
    let needle = query
        .q
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .map(str::to_lowercase);
    let category = query
        .category
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());

    let mut items: Vec<Product> = products
        .into_iter()
        .filter(|p| {
            needle.as_deref().is_none_or(|n| {
                p.title.to_lowercase().contains(n) || p.description.to_lowercase().contains(n)
            })
        })
        .filter(|p| category.is_none_or(|c| p.category.eq_ignore_ascii_case(c)))
        .filter(|p| query.min_price.is_none_or(|min| p.effective_price() >= min))
        .filter(|p| query.max_price.is_none_or(|max| p.effective_price() <= max))
        .filter(|p| !query.in_stock.unwrap_or(false) || p.stock > 0)
        .collect();

    let sort_by = query.sort_by.unwrap_or_default();
    let sort_order = query.sort_order.unwrap_or_default();
    items.sort_by(|a, b| {
        let ordering = match sort_by {
            ProductSortBy::CreatedAt => a.created_at.cmp(&b.created_at),
            ProductSortBy::Price => a.effective_price().cmp(&b.effective_price()),
            ProductSortBy::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
            ProductSortBy::Rating => a.rating.partial_cmp(&b.rating).unwrap_or(Ordering::Equal),
        };
        match sort_order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
    items
}

pub async fn list_products(
    state: &AppState,
    query: ProductQuery,
) -> AppResult<ApiResponse<ProductList>> {
    let products: Vec<Product> = state.store.list(Collection::Products).await?;
    let filtered = filter_products(products, &query);
    let total = filtered.len() as i64;
    let (items, page, per_page) = query.pagination().apply(filtered);

    Ok(ApiResponse::success(
        "Products",
        ProductList { items },
        Some(Meta::new(page, per_page, total)),
    ))
}

pub async fn list_categories(state: &AppState) -> AppResult<ApiResponse<Vec<CategoryCount>>> {
    let products: Vec<Product> = state.store.list(Collection::Products).await?;
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for product in products {
        *counts.entry(product.category).or_default() += 1;
    }
    let categories = counts
        .into_iter()
        .map(|(category, count)| CategoryCount { category, count })
        .collect();
    Ok(ApiResponse::success("Categories", categories, None))
}

pub async fn get_product(state: &AppState, id: &str) -> AppResult<ApiResponse<ProductDetail>> {
    let product = fetch_product(&state.store, id).await?;
    let mut reviews: Vec<Review> = state
        .store
        .list::<Review>(Collection::Reviews)
        .await?
        .into_iter()
        .filter(|r| r.product_id == product.id)
        .collect();
    reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let average_rating = average_rating(&reviews);
    Ok(ApiResponse::success(
        "Product",
        ProductDetail {
            product,
            reviews,
            average_rating,
        },
        None,
    ))
}

pub fn average_rating(reviews: &[Review]) -> Option<f64> {
    if reviews.is_empty() {
        return None;
    }
    let sum: u32 = reviews.iter().map(|r| u32::from(r.rating)).sum();
    Some(f64::from(sum) / reviews.len() as f64)
}

fn validate_pricing(price: i64, discount_price: Option<i64>, stock: i32) -> AppResult<()> {
    if price <= 0 {
        return Err(AppError::BadRequest("price must be greater than 0".into()));
    }
    if let Some(discount) = discount_price {
        if discount <= 0 || discount > price {
            return Err(AppError::BadRequest(
                "discountPrice must be positive and not above price".into(),
            ));
        }
    }
    if stock < 0 {
        return Err(AppError::BadRequest("stock cannot be negative".into()));
    }
    Ok(())
}

pub async fn create_product(
    state: &AppState,
    user: &SessionUser,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_admin(user)?;
    if payload.title.trim().is_empty() || payload.category.trim().is_empty() {
        return Err(AppError::BadRequest("title and category are required".into()));
    }
    validate_pricing(payload.price, payload.discount_price, payload.stock)?;

    let product: Product = state
        .store
        .create(
            Collection::Products,
            &NewProduct {
                title: payload.title.trim(),
                description: &payload.description,
                category: payload.category.trim(),
                image: &payload.image,
                price: payload.price,
                discount_price: payload.discount_price,
                stock: payload.stock,
                rating: 0.0,
                created_at: Utc::now(),
            },
        )
        .await?;

    log_audit(
        Some(&user.user_id),
        "product_create",
        Some("products"),
        Some(serde_json::json!({ "product_id": product.id })),
    );
    Ok(ApiResponse::success("Product created", product, None))
}

pub async fn update_product(
    state: &AppState,
    user: &SessionUser,
    id: &str,
    payload: UpdateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_admin(user)?;
    let existing = fetch_product(&state.store, id).await?;
    let blank = |field: &Option<String>| field.as_deref().is_some_and(|v| v.trim().is_empty());
    if blank(&payload.title) || blank(&payload.category) {
        return Err(AppError::BadRequest("title and category are required".into()));
    }
    validate_pricing(
        payload.price.unwrap_or(existing.price),
        payload.discount_price.unwrap_or(existing.discount_price),
        payload.stock.unwrap_or(existing.stock),
    )?;
    let payload = UpdateProductRequest {
        title: payload.title.map(|t| t.trim().to_string()),
        category: payload.category.map(|c| c.trim().to_string()),
        ..payload
    };

    let product: Product = state
        .store
        .update(Collection::Products, id, &payload)
        .await?
        .ok_or(AppError::NotFound)?;

    log_audit(
        Some(&user.user_id),
        "product_update",
        Some("products"),
        Some(serde_json::json!({ "product_id": product.id })),
    );
    Ok(ApiResponse::success("Product updated", product, None))
}

pub async fn delete_product(
    state: &AppState,
    user: &SessionUser,
    id: &str,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    if !state.store.delete(Collection::Products, id).await? {
        return Err(AppError::NotFound);
    }

    log_audit(
        Some(&user.user_id),
        "product_delete",
        Some("products"),
        Some(serde_json::json!({ "product_id": id })),
    );
    Ok(ApiResponse::success(
        "Product deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}
