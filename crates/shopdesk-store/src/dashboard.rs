//! Admin dashboard statistics.

use serde::{Deserialize, Serialize};
use shopdesk_core::OrderStatus;

use crate::client::StoreClient;
use crate::error::StoreError;

pub const DASHBOARD_QUERY: &str = r#"{
  "products": count(*[_type == "products"]),
  "reviews": count(*[_type == "review"]),
  "orders": *[_type == "orders"]{_id, status, total}
}"#;

#[derive(Debug, Deserialize)]
struct OrderRow {
    #[serde(default)]
    status: Option<String>,
    #[serde(
        default,
        deserialize_with = "shopdesk_core::documents::lenient::opt_f64"
    )]
    total: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct DashboardRow {
    #[serde(default)]
    products: u64,
    #[serde(default)]
    reviews: u64,
    #[serde(default)]
    orders: Vec<OrderRow>,
}

/// One bar of the order chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub label: String,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_products: u64,
    pub total_orders: u64,
    pub total_reviews: u64,
    pub delivered_orders: u64,
    pub pending_orders: u64,
    pub chart: Vec<ChartPoint>,
}

fn summarize(row: DashboardRow) -> DashboardSummary {
    let count_status = |wanted: OrderStatus| {
        row.orders
            .iter()
            .filter(|o| {
                o.status
                    .as_deref()
                    .and_then(|s| s.parse::<OrderStatus>().ok())
                    == Some(wanted)
            })
            .count() as u64
    };

    DashboardSummary {
        total_products: row.products,
        total_orders: row.orders.len() as u64,
        total_reviews: row.reviews,
        delivered_orders: count_status(OrderStatus::Delivered),
        pending_orders: count_status(OrderStatus::Pending),
        chart: row
            .orders
            .iter()
            .enumerate()
            .map(|(i, o)| ChartPoint {
                label: format!("Order {}", i + 1),
                total: o.total.unwrap_or(0.0),
            })
            .collect(),
    }
}

/// Counts and chart data for the dashboard, in one round trip.
///
/// # Errors
///
/// Propagates [`StoreError`] from the query.
pub async fn summary(client: &StoreClient) -> Result<DashboardSummary, StoreError> {
    let row: DashboardRow = client.query(DASHBOARD_QUERY, &[]).await?;
    Ok(summarize(row))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn summarize_counts_statuses_leniently() {
        let row: DashboardRow = serde_json::from_value(json!({
            "products": 4,
            "reviews": 2,
            "orders": [
                {"_id": "a", "status": "Delivered", "total": 10.0},
                {"_id": "b", "status": "pending", "total": 5.5},
                {"_id": "c", "status": "lost"},
                {"_id": "d", "status": "delivered", "total": 1.0}
            ]
        }))
        .unwrap();

        let s = summarize(row);
        assert_eq!(s.total_products, 4);
        assert_eq!(s.total_orders, 4);
        assert_eq!(s.total_reviews, 2);
        assert_eq!(s.delivered_orders, 2);
        assert_eq!(s.pending_orders, 1);
        assert_eq!(s.chart.len(), 4);
        assert_eq!(s.chart[0].label, "Order 1");
        assert_eq!(s.chart[2].total, 0.0);
    }

    #[test]
    fn summary_serializes_camel_case() {
        let s = summarize(DashboardRow {
            products: 0,
            reviews: 0,
            orders: Vec::new(),
        });
        let value = serde_json::to_value(&s).unwrap();
        assert_eq!(value["totalProducts"], 0);
        assert_eq!(value["pendingOrders"], 0);
        assert!(value["chart"].as_array().unwrap().is_empty());
    }
}
