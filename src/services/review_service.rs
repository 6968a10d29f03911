use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    audit::log_audit,
    dto::reviews::CreateReviewRequest,
    error::{AppError, AppResult},
    middleware::auth::SessionUser,
    models::Review,
    response::ApiResponse,
    services::product_service::{average_rating, fetch_product},
    state::AppState,
    store::Collection,
};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NewReview<'a> {
    product_id: &'a str,
    user_id: &'a str,
    user_name: &'a str,
    rating: u8,
    comment: &'a str,
    created_at: DateTime<Utc>,
}

#[derive(Serialize)]
struct RatingChange {
    rating: f64,
}

pub async fn add_review(
    state: &AppState,
    user: &SessionUser,
    product_id: &str,
    payload: CreateReviewRequest,
) -> AppResult<ApiResponse<Review>> {
    if !(1..=5).contains(&payload.rating) {
        return Err(AppError::BadRequest("rating must be between 1 and 5".into()));
    }
    let comment = payload.comment.trim();
    if comment.is_empty() {
        return Err(AppError::BadRequest("comment is required".into()));
    }

    let product = fetch_product(&state.store, product_id).await?;
    let review: Review = state
        .store
        .create(
            Collection::Reviews,
            &NewReview {
                product_id: &product.id,
                user_id: &user.user_id,
                user_name: &user.name,
                rating: payload.rating,
                comment,
                created_at: Utc::now(),
            },
        )
        .await?;

    // keep the denormalized product rating in step with its reviews
    let reviews: Vec<Review> = state
        .store
        .list::<Review>(Collection::Reviews)
        .await?
        .into_iter()
        .filter(|r| r.product_id == product.id)
        .collect();
    if let Some(rating) = average_rating(&reviews) {
        if let Err(err) = state
            .store
            .update::<_, serde_json::Value>(Collection::Products, &product.id, &RatingChange { rating })
            .await
        {
            tracing::warn!(product_id = %product.id, error = %err, "rating refresh failed");
        }
    }

    log_audit(
        Some(&user.user_id),
        "review_add",
        Some("reviews"),
        Some(serde_json::json!({ "product_id": product.id, "rating": review.rating })),
    );
    Ok(ApiResponse::success("Review added", review, None))
}
