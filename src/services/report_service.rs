//! Dashboard and sales aggregation over full collection listings.

use std::collections::{BTreeMap, HashMap};

use crate::{
    dto::reports::{
        CategorySales, DashboardSummary, GroupBy, PeriodSales, ProductSales, SalesReport,
        SalesReportQuery, StatusCount,
    },
    error::AppResult,
    middleware::auth::{SessionUser, ensure_admin},
    models::{ContactMessage, Order, OrderStatus, Product, Role, User},
    response::ApiResponse,
    state::AppState,
    store::Collection,
};

const DEFAULT_TOP: usize = 5;

fn counts_as_revenue(order: &Order) -> bool {
    order.status != OrderStatus::Cancelled
}

pub fn dashboard(
    orders: &[Order],
    products: &[Product],
    users: &[User],
    contacts: &[ContactMessage],
    low_stock_threshold: i32,
) -> DashboardSummary {
    DashboardSummary {
        revenue: orders
            .iter()
            .filter(|o| counts_as_revenue(o))
            .map(|o| o.total_amount)
            .sum(),
        order_count: orders.len(),
        customer_count: users.iter().filter(|u| u.role == Role::Customer).count(),
        product_count: products.len(),
        low_stock_count: products
            .iter()
            .filter(|p| p.stock <= low_stock_threshold)
            .count(),
        pending_orders: orders
            .iter()
            .filter(|o| o.status == OrderStatus::Pending)
            .count(),
        unread_messages: contacts.iter().filter(|c| !c.read).count(),
    }
}

pub fn sales_report(orders: &[Order], query: &SalesReportQuery) -> SalesReport {
    let selected: Vec<&Order> = orders
        .iter()
        .filter(|o| {
            let day = o.created_at.date_naive();
            query.from.is_none_or(|from| day >= from) && query.to.is_none_or(|to| day <= to)
        })
        .filter(|o| match query.status {
            Some(status) => o.status == status,
            None => counts_as_revenue(o),
        })
        .collect();

    let group_by = query.group_by.unwrap_or_default();
    let mut by_period: BTreeMap<String, (i64, usize)> = BTreeMap::new();
    let mut by_category: BTreeMap<String, (i64, i64)> = BTreeMap::new();
    let mut by_product: HashMap<String, ProductSales> = HashMap::new();
    let mut by_status: BTreeMap<OrderStatus, usize> = BTreeMap::new();

    for order in &selected {
        let period = match group_by {
            GroupBy::Day => order.created_at.format("%Y-%m-%d").to_string(),
            GroupBy::Month => order.created_at.format("%Y-%m").to_string(),
        };
        let bucket = by_period.entry(period).or_default();
        bucket.0 += order.total_amount;
        bucket.1 += 1;

        *by_status.entry(order.status).or_default() += 1;

        for line in &order.items {
            let category = by_category.entry(line.category.clone()).or_default();
            category.0 += line.line_total();
            category.1 += i64::from(line.quantity);

            let product = by_product
                .entry(line.product_id.clone())
                .or_insert_with(|| ProductSales {
                    product_id: line.product_id.clone(),
                    title: line.title.clone(),
                    units: 0,
                    revenue: 0,
                });
            product.units += i64::from(line.quantity);
            product.revenue += line.line_total();
        }
    }

    let mut top_products: Vec<ProductSales> = by_product.into_values().collect();
    top_products.sort_by(|a, b| {
        b.units
            .cmp(&a.units)
            .then_with(|| b.revenue.cmp(&a.revenue))
            .then_with(|| a.title.cmp(&b.title))
    });
    top_products.truncate(query.top.unwrap_or(DEFAULT_TOP));

    let mut by_category: Vec<CategorySales> = by_category
        .into_iter()
        .map(|(category, (revenue, units))| CategorySales {
            category,
            revenue,
            units,
        })
        .collect();
    by_category.sort_by(|a, b| b.revenue.cmp(&a.revenue));

    SalesReport {
        total_revenue: selected.iter().map(|o| o.total_amount).sum(),
        order_count: selected.len(),
        by_period: by_period
            .into_iter()
            .map(|(period, (revenue, orders))| PeriodSales {
                period,
                revenue,
                orders,
            })
            .collect(),
        by_category,
        top_products,
        by_status: by_status
            .into_iter()
            .map(|(status, count)| StatusCount { status, count })
            .collect(),
    }
}

pub async fn get_dashboard(
    state: &AppState,
    user: &SessionUser,
) -> AppResult<ApiResponse<DashboardSummary>> {
    ensure_admin(user)?;
    let (orders, products, users, contacts) = tokio::try_join!(
        state.store.list::<Order>(Collection::Orders),
        state.store.list::<Product>(Collection::Products),
        state.store.list::<User>(Collection::Users),
        state.store.list::<ContactMessage>(Collection::Contacts),
    )?;

    let summary = dashboard(
        &orders,
        &products,
        &users,
        &contacts,
        state.low_stock_threshold,
    );
    Ok(ApiResponse::success("Dashboard", summary, None))
}

pub async fn get_sales_report(
    state: &AppState,
    user: &SessionUser,
    query: SalesReportQuery,
) -> AppResult<ApiResponse<SalesReport>> {
    ensure_admin(user)?;
    let orders: Vec<Order> = state.store.list(Collection::Orders).await?;
    Ok(ApiResponse::success(
        "Sales report",
        sales_report(&orders, &query),
        None,
    ))
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Utc};

    use super::*;
    use crate::models::OrderLine;

    fn line(product_id: &str, category: &str, quantity: i32, unit_price: i64) -> OrderLine {
        OrderLine {
            product_id: product_id.into(),
            title: format!("Flower {product_id}"),
            category: category.into(),
            quantity,
            unit_price,
        }
    }

    fn order(id: &str, month: u32, day: u32, status: OrderStatus, items: Vec<OrderLine>) -> Order {
        Order {
            id: id.into(),
            user_id: "u1".into(),
            total_amount: items.iter().map(OrderLine::line_total).sum(),
            items,
            status,
            address: "1 Garden Lane".into(),
            phone: String::new(),
            payment_method: "card".into(),
            invoice_number: format!("INV-{id}"),
            created_at: Utc.with_ymd_and_hms(2026, month, day, 12, 0, 0).unwrap(),
        }
    }

    fn orders() -> Vec<Order> {
        vec![
            order("1", 1, 5, OrderStatus::Delivered, vec![line("a", "roses", 2, 1000)]),
            order(
                "2",
                1,
                20,
                OrderStatus::Pending,
                vec![line("b", "lilies", 1, 3000), line("a", "roses", 1, 1000)],
            ),
            order("3", 2, 2, OrderStatus::Cancelled, vec![line("c", "tulips", 9, 500)]),
            order("4", 2, 14, OrderStatus::Shipped, vec![line("a", "roses", 3, 1000)]),
        ]
    }

    #[test]
    fn monthly_report_excludes_cancelled_by_default() {
        let report = sales_report(&orders(), &SalesReportQuery::default());

        assert_eq!(report.order_count, 3);
        assert_eq!(report.total_revenue, 2000 + 4000 + 3000);
        assert_eq!(
            report.by_period,
            vec![
                PeriodSales {
                    period: "2026-01".into(),
                    revenue: 6000,
                    orders: 2
                },
                PeriodSales {
                    period: "2026-02".into(),
                    revenue: 3000,
                    orders: 1
                },
            ]
        );
        assert_eq!(report.top_products[0].product_id, "a");
        assert_eq!(report.top_products[0].units, 6);
        assert!(report.by_category.iter().all(|c| c.category != "tulips"));
    }

    #[test]
    fn date_range_and_day_grouping() {
        let query = SalesReportQuery {
            from: NaiveDate::from_ymd_opt(2026, 1, 10),
            to: NaiveDate::from_ymd_opt(2026, 2, 14),
            group_by: Some(GroupBy::Day),
            ..Default::default()
        };
        let report = sales_report(&orders(), &query);
        let periods: Vec<_> = report.by_period.iter().map(|p| p.period.as_str()).collect();
        assert_eq!(periods, vec!["2026-01-20", "2026-02-14"]);
    }

    #[test]
    fn explicit_status_filter_includes_cancelled() {
        let query = SalesReportQuery {
            status: Some(OrderStatus::Cancelled),
            ..Default::default()
        };
        let report = sales_report(&orders(), &query);
        assert_eq!(report.order_count, 1);
        assert_eq!(
            report.by_status,
            vec![StatusCount {
                status: OrderStatus::Cancelled,
                count: 1
            }]
        );
    }

    #[test]
    fn top_is_truncated() {
        let query = SalesReportQuery {
            top: Some(1),
            ..Default::default()
        };
        assert_eq!(sales_report(&orders(), &query).top_products.len(), 1);
    }

    #[test]
    fn dashboard_counts() {
        let summary = dashboard(&orders(), &[], &[], &[], 5);
        assert_eq!(summary.revenue, 9000);
        assert_eq!(summary.order_count, 4);
        assert_eq!(summary.pending_orders, 1);
        assert_eq!(summary.unread_messages, 0);
    }
}
