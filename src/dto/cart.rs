use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::CartRow;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    pub product_id: String,
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCartRequest {
    pub quantity: i32,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct RemoveCartQuery {
    pub confirm: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CartSummary {
    pub items: Vec<CartRow>,
    pub item_count: i64,
    pub subtotal: i64,
    pub total: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RemoveOutcome {
    Removed,
    Cancelled,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RemoveResult {
    pub outcome: RemoveOutcome,
    pub removed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct ClearResult {
    pub dispatched: usize,
    pub failed: usize,
}
