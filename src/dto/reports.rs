use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::OrderStatus;

#[derive(Debug, Serialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub revenue: i64,
    pub order_count: usize,
    pub customer_count: usize,
    pub product_count: usize,
    pub low_stock_count: usize,
    pub pending_orders: usize,
    pub unread_messages: usize,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum GroupBy {
    Day,
    #[default]
    Month,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SalesReportQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub status: Option<OrderStatus>,
    pub group_by: Option<GroupBy>,
    pub top: Option<usize>,
}

#[derive(Debug, Serialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PeriodSales {
    pub period: String,
    pub revenue: i64,
    pub orders: usize,
}

#[derive(Debug, Serialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CategorySales {
    pub category: String,
    pub revenue: i64,
    pub units: i64,
}

#[derive(Debug, Serialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductSales {
    pub product_id: String,
    pub title: String,
    pub units: i64,
    pub revenue: i64,
}

#[derive(Debug, Serialize, ToSchema, PartialEq)]
pub struct StatusCount {
    pub status: OrderStatus,
    pub count: usize,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SalesReport {
    pub total_revenue: i64,
    pub order_count: usize,
    pub by_period: Vec<PeriodSales>,
    pub by_category: Vec<CategorySales>,
    pub top_products: Vec<ProductSales>,
    pub by_status: Vec<StatusCount>,
}
