//! Order repository. Orders reference one `orderItems` document per line.

use serde::{Deserialize, Serialize};
use serde_json::json;
use shopdesk_core::documents::{array_key, ORDER_ITEM_TYPE, ORDER_TYPE};
use shopdesk_core::{NewOrder, OrderDocument, OrderItemView, OrderStatus, Reference};
use uuid::Uuid;

use crate::client::StoreClient;
use crate::error::StoreError;
use crate::mutation::{Mutation, Transaction};

pub const ORDERS_QUERY: &str = r#"*[_type == "orders"] | order(_createdAt desc){
  _id, _type, fullName, emailAddress, shippingAddress, phoneNumber, status, total,
  "items": items[]->{_id, quantity, price, "title": products->title}
}"#;

/// `null` when `$id` is not an order; otherwise the ids of its line items.
pub const ORDER_ITEM_IDS_QUERY: &str =
    r#"*[_type == "orders" && _id == $id][0]{"items": items[]._ref}"#;

/// Totals that differ by less than this are treated as equal.
const TOTAL_TOLERANCE: f64 = 0.005;

#[derive(Deserialize)]
struct OrderItemIds {
    #[serde(default)]
    items: Option<Vec<Option<String>>>,
}

#[derive(Serialize)]
struct OrderItemBody {
    products: Reference,
    quantity: u32,
    price: f64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OrderBody<'a> {
    full_name: &'a str,
    email_address: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    shipping_address: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    phone_number: Option<&'a str>,
    status: OrderStatus,
    total: f64,
    items: Vec<Reference>,
}

/// All orders with expanded items, optionally filtered by a
/// case-insensitive match on email address or status.
///
/// # Errors
///
/// Propagates [`StoreError`] from the query.
pub async fn list(
    client: &StoreClient,
    search: Option<&str>,
) -> Result<Vec<OrderDocument>, StoreError> {
    let orders: Vec<OrderDocument> = client.query(ORDERS_QUERY, &[]).await?;
    Ok(match search.map(str::trim).filter(|s| !s.is_empty()) {
        Some(term) => orders
            .into_iter()
            .filter(|o| o.matches_search(term))
            .collect(),
        None => orders,
    })
}

/// Creates the order and one `orderItems` document per line in a single
/// transaction. `total` is stored as given.
///
/// # Errors
///
/// Propagates [`StoreError`] from the mutation; on error nothing is written.
pub async fn create(client: &StoreClient, order: &NewOrder) -> Result<OrderDocument, StoreError> {
    let subtotal = order.items_subtotal();
    if (subtotal - order.total).abs() > TOTAL_TOLERANCE {
        tracing::warn!(
            total = order.total,
            items_subtotal = subtotal,
            email = %order.email_address,
            "order total differs from the sum of its items"
        );
    }

    let order_id = Uuid::new_v4().to_string();
    let mut tx = Transaction::new();
    let mut refs = Vec::with_capacity(order.items.len());
    let mut views = Vec::with_capacity(order.items.len());

    for (index, item) in order.items.iter().enumerate() {
        let item_id = Uuid::new_v4().to_string();
        tx.push(Mutation::create(
            ORDER_ITEM_TYPE,
            Some(&item_id),
            &OrderItemBody {
                products: Reference::to(item.product_id.as_str()),
                quantity: item.quantity,
                price: item.unit_price,
            },
        )?);
        refs.push(Reference::keyed(item_id.as_str(), array_key(&order_id, index)));
        views.push(OrderItemView {
            doc_id: Some(item_id),
            title: None,
            price: Some(item.unit_price),
            quantity: Some(i64::from(item.quantity)),
        });
    }

    tx.push(Mutation::create(
        ORDER_TYPE,
        Some(&order_id),
        &OrderBody {
            full_name: &order.full_name,
            email_address: &order.email_address,
            shipping_address: order.shipping_address.as_deref(),
            phone_number: order.phone_number.as_deref(),
            status: order.status,
            total: order.total,
            items: refs,
        },
    )?);

    client.mutate(&tx).await?;
    tracing::info!(order_id = %order_id, items = views.len(), "order created");

    Ok(OrderDocument {
        doc_id: order_id,
        doc_type: ORDER_TYPE.to_owned(),
        full_name: Some(order.full_name.clone()),
        email_address: Some(order.email_address.clone()),
        shipping_address: order.shipping_address.clone(),
        phone_number: order.phone_number.clone(),
        status: Some(order.status.as_str().to_owned()),
        total: Some(order.total),
        items: views,
    })
}

/// Sets the order's status. Any status may replace any other.
///
/// # Errors
///
/// [`StoreError::NotFound`] when `id` is not an order or the store reports
/// no patched document.
pub async fn update_status(
    client: &StoreClient,
    id: &str,
    status: OrderStatus,
) -> Result<(), StoreError> {
    client.require_document(ORDER_TYPE, "order", id).await?;
    let tx = Transaction::from(vec![Mutation::set(id, &json!({ "status": status }))?]);
    let response = client.mutate(&tx).await?;
    if !response.touched(id) {
        return Err(StoreError::NotFound {
            kind: "order",
            id: id.to_owned(),
        });
    }
    tracing::info!(order_id = %id, status = %status, "order status updated");
    Ok(())
}

/// Deletes the order together with its `orderItems` documents.
///
/// # Errors
///
/// [`StoreError::NotFound`] when `id` is not an order or the order itself
/// was not deleted.
pub async fn delete(client: &StoreClient, id: &str) -> Result<(), StoreError> {
    let order: Option<OrderItemIds> = client
        .query(ORDER_ITEM_IDS_QUERY, &[("id", json!(id))])
        .await?;
    let Some(order) = order else {
        return Err(StoreError::NotFound {
            kind: "order",
            id: id.to_owned(),
        });
    };

    // The order goes first so its items are no longer referenced.
    let mut tx = Transaction::new();
    tx.push(Mutation::delete(id));
    for item_id in order.items.unwrap_or_default().into_iter().flatten() {
        tx.push(Mutation::delete(&item_id));
    }

    let response = client.mutate(&tx).await?;
    if !response.touched(id) {
        return Err(StoreError::NotFound {
            kind: "order",
            id: id.to_owned(),
        });
    }
    tracing::info!(order_id = %id, items = tx.len() - 1, "order deleted");
    Ok(())
}
