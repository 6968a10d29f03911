use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{CartRow, WishlistRow};

#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WishlistRequest {
    pub product_id: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct WishlistList {
    #[schema(value_type = Vec<WishlistRow>)]
    pub items: Vec<WishlistRow>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ToggleOutcome {
    Added,
    Removed,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ToggleResult {
    pub outcome: ToggleOutcome,
    pub row: Option<WishlistRow>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct MoveToCartRequest {
    #[serde(default = "default_quantity")]
    pub quantity: i32,
}

fn default_quantity() -> i32 {
    1
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MoveToCartResult {
    pub cart: CartRow,
}
