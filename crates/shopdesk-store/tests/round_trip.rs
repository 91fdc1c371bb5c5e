//! Write-then-read behaviour against an in-memory store that applies
//! mutations and answers the repositories' queries from its own state.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde_json::{json, Map, Value};
use shopdesk_core::{CatalogEntry, OrderFields, OrderStatus, ProductFields, StoreConfig};
use shopdesk_store::client::DOCUMENT_COUNT_QUERY;
use shopdesk_store::{orders, products, reviews, StoreClient, StoreError};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

const QUERY_PATH: &str = "/v2023-01-01/data/query/production";
const MUTATE_PATH: &str = "/v2023-01-01/data/mutate/production";

/// Documents kept in insertion order, shared by the query and mutate mocks.
#[derive(Clone, Default)]
struct InMemoryStore {
    docs: Arc<Mutex<Vec<Value>>>,
}

fn doc_type(doc: &Value) -> &str {
    doc["_type"].as_str().unwrap_or_default()
}

fn doc_id(doc: &Value) -> &str {
    doc["_id"].as_str().unwrap_or_default()
}

fn find<'a>(docs: &'a [Value], id: &str) -> Option<&'a Value> {
    docs.iter().find(|d| doc_id(d) == id)
}

fn of_type<'a>(docs: &'a [Value], kind: &'a str) -> impl DoubleEndedIterator<Item = &'a Value> {
    docs.iter().filter(move |d| doc_type(d) == kind)
}

fn references(value: &Value, id: &str) -> bool {
    match value {
        Value::Object(map) => {
            map.get("_ref").and_then(Value::as_str) == Some(id)
                || map.values().any(|v| references(v, id))
        }
        Value::Array(items) => items.iter().any(|v| references(v, id)),
        _ => false,
    }
}

impl InMemoryStore {
    fn seed(&self, doc: Value) {
        self.docs.lock().unwrap().push(doc);
    }

    fn query(&self, query: &str, params: &HashMap<String, Value>) -> Value {
        let guard = self.docs.lock().unwrap();
        let docs: &[Value] = &guard;

        if query == products::CATALOG_QUERY {
            docs.iter()
                .filter(|d| matches!(doc_type(d), "products" | "categories"))
                .cloned()
                .collect()
        } else if query == reviews::REVIEWS_QUERY {
            of_type(docs, "review").cloned().collect()
        } else if query == orders::ORDERS_QUERY {
            let expand = |order: &Value| {
                let mut order = order.clone();
                let items: Vec<Value> = order["items"]
                    .as_array()
                    .into_iter()
                    .flatten()
                    .filter_map(|r| r["_ref"].as_str().and_then(|id| find(docs, id)))
                    .map(|item| {
                        let title = item["products"]["_ref"]
                            .as_str()
                            .and_then(|id| find(docs, id))
                            .map_or(Value::Null, |p| p["title"].clone());
                        json!({
                            "_id": item["_id"],
                            "quantity": item["quantity"],
                            "price": item["price"],
                            "title": title,
                        })
                    })
                    .collect();
                order["items"] = Value::Array(items);
                order
            };
            // Newest first.
            of_type(docs, "orders").rev().map(expand).collect()
        } else if query == orders::ORDER_ITEM_IDS_QUERY {
            let id = params["id"].as_str().unwrap_or_default();
            find(docs, id)
                .filter(|d| doc_type(d) == "orders")
                .map_or(Value::Null, |order| {
                    let ids: Vec<Value> = order["items"]
                        .as_array()
                        .into_iter()
                        .flatten()
                        .map(|r| r["_ref"].clone())
                        .collect();
                    json!({ "items": ids })
                })
        } else if query == DOCUMENT_COUNT_QUERY {
            let id = params["id"].as_str().unwrap_or_default();
            let kind = params["type"].as_str().unwrap_or_default();
            json!(of_type(docs, kind).filter(|d| doc_id(d) == id).count())
        } else if query == products::REFERENCE_COUNT_QUERY {
            let id = params["id"].as_str().unwrap_or_default();
            json!(docs.iter().filter(|d| references(d, id)).count())
        } else {
            panic!("unexpected query: {query}");
        }
    }

    /// Applies the whole batch or nothing, like the store's transactions.
    fn mutate(&self, body: &Value) -> Result<Vec<Value>, String> {
        let mut docs = self.docs.lock().unwrap();
        let mut staged = docs.clone();
        let mut results = Vec::new();

        for mutation in body["mutations"].as_array().into_iter().flatten() {
            let (op, payload) = mutation
                .as_object()
                .and_then(|o| o.iter().next())
                .ok_or("empty mutation")?;
            match op.as_str() {
                "create" => {
                    let id = doc_id(payload).to_owned();
                    if staged.iter().any(|d| doc_id(d) == id) {
                        return Err(format!("Document \"{id}\" already exists"));
                    }
                    staged.push(payload.clone());
                    results.push(json!({"id": id, "operation": "create", "document": payload}));
                }
                "patch" => {
                    let id = payload["id"].as_str().unwrap_or_default();
                    let doc = staged
                        .iter_mut()
                        .find(|d| doc_id(d) == id)
                        .ok_or_else(|| format!("Document \"{id}\" not found"))?;
                    let set: Map<String, Value> =
                        payload["set"].as_object().cloned().unwrap_or_default();
                    if let Some(fields) = doc.as_object_mut() {
                        fields.extend(set);
                    }
                    results.push(json!({"id": id, "operation": "update", "document": doc}));
                }
                "delete" => {
                    let id = payload["id"].as_str().unwrap_or_default();
                    if let Some(pos) = staged.iter().position(|d| doc_id(d) == id) {
                        staged.remove(pos);
                        results.push(json!({"id": id, "operation": "delete"}));
                    }
                }
                other => return Err(format!("unsupported mutation '{other}'")),
            }
        }

        *docs = staged;
        Ok(results)
    }
}

impl Respond for InMemoryStore {
    fn respond(&self, req: &Request) -> ResponseTemplate {
        if req.url.path() == QUERY_PATH {
            let mut query = String::new();
            let mut params = HashMap::new();
            for (name, value) in req.url.query_pairs() {
                if name == "query" {
                    query = value.into_owned();
                } else if let Some(param) = name.strip_prefix('$') {
                    let parsed = serde_json::from_str(&value).unwrap_or(Value::Null);
                    params.insert(param.to_owned(), parsed);
                }
            }
            let result = self.query(&query, &params);
            return ResponseTemplate::new(200).set_body_json(json!({ "result": result }));
        }

        let body: Value = serde_json::from_slice(&req.body).unwrap_or(Value::Null);
        match self.mutate(&body) {
            Ok(results) => ResponseTemplate::new(200)
                .set_body_json(json!({"transactionId": "tx-mem", "results": results})),
            Err(description) => ResponseTemplate::new(409).set_body_json(json!({
                "error": {"type": "mutationError", "description": description}
            })),
        }
    }
}

async fn start() -> (MockServer, InMemoryStore, StoreClient) {
    let server = MockServer::start().await;
    let store = InMemoryStore::default();
    Mock::given(method("GET"))
        .and(path(QUERY_PATH))
        .respond_with(store.clone())
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(MUTATE_PATH))
        .respond_with(store.clone())
        .mount(&server)
        .await;

    let config = StoreConfig {
        project_id: "abc123xy".to_owned(),
        dataset: "production".to_owned(),
        api_version: "2023-01-01".to_owned(),
        token: "test-token".to_owned(),
        api_host: None,
        timeout_secs: 5,
        max_retries: 0,
        retry_backoff_base_ms: 0,
    };
    let client = StoreClient::with_base_url(&config, &server.uri()).expect("client");
    (server, store, client)
}

#[tokio::test]
async fn created_product_is_listed_with_its_fields() {
    let (_server, _store, client) = start().await;

    let fields = ProductFields {
        catalog_id: Some(42),
        title: Some("Library Stool Chair".to_owned()),
        price: Some(99.0),
        price_without_discount: Some(120.0),
        badge: Some("Sale".to_owned()),
        description: Some("Oak, hand finished".to_owned()),
        inventory: Some(7),
        tags: Some(vec!["featured".to_owned(), "gallery".to_owned()]),
        ..ProductFields::default()
    };
    let created = products::create(&client, fields.into_new_product().unwrap(), None)
        .await
        .unwrap();

    let listed = products::list(&client).await.unwrap();
    let product = listed
        .iter()
        .filter_map(CatalogEntry::as_product)
        .find(|p| p.doc_id == created.doc_id)
        .expect("created product is listed");

    assert_eq!(product.catalog_id, Some(42));
    assert_eq!(product.title.as_deref(), Some("Library Stool Chair"));
    assert_eq!(product.price, Some(99.0));
    assert_eq!(product.price_without_discount, Some(120.0));
    assert_eq!(product.badge.as_deref(), Some("Sale"));
    assert_eq!(product.description.as_deref(), Some("Oak, hand finished"));
    assert_eq!(product.inventory, Some(7));
    assert_eq!(
        product.tags.as_deref(),
        Some(&["featured".to_owned(), "gallery".to_owned()][..])
    );
    assert_eq!(product, &created);
}

#[tokio::test]
async fn status_update_is_listed_and_leaves_other_fields_alone() {
    let (_server, store, client) = start().await;
    store.seed(json!({"_id": "p1", "_type": "products", "title": "Chair", "price": 10}));

    let fields: OrderFields = serde_json::from_value(json!({
        "fullName": "Jane Doe",
        "emailAddress": "jane@x.com",
        "shippingAddress": "1 Main St",
        "items": [{"product": "p1", "quantity": 2, "price": 10.0}],
        "total": 20.0
    }))
    .unwrap();
    let created = orders::create(&client, &fields.into_new_order().unwrap())
        .await
        .unwrap();

    let before = orders::list(&client, None).await.unwrap();
    let before = before
        .into_iter()
        .find(|o| o.doc_id == created.doc_id)
        .expect("created order is listed");
    assert_eq!(before.status(), Some(OrderStatus::Pending));
    assert_eq!(before.items[0].title.as_deref(), Some("Chair"));

    orders::update_status(&client, &created.doc_id, OrderStatus::Shipped)
        .await
        .unwrap();

    let after = orders::list(&client, None).await.unwrap();
    let after = after
        .into_iter()
        .find(|o| o.doc_id == created.doc_id)
        .expect("order is still listed");
    assert_eq!(after.status.as_deref(), Some("shipped"));
    assert_eq!(after.full_name, before.full_name);
    assert_eq!(after.email_address, before.email_address);
    assert_eq!(after.shipping_address, before.shipping_address);
    assert_eq!(after.total, before.total);
    assert_eq!(after.items, before.items);
}

#[tokio::test]
async fn orders_are_listed_newest_first() {
    assert!(orders::ORDERS_QUERY.contains("| order(_createdAt desc)"));

    let (_server, store, client) = start().await;
    store.seed(json!({"_id": "p1", "_type": "products", "title": "Chair", "price": 10}));

    let mut created = Vec::new();
    for name in ["First Buyer", "Second Buyer"] {
        let fields: OrderFields = serde_json::from_value(json!({
            "fullName": name,
            "emailAddress": "buyer@x.com",
            "shippingAddress": "1 Main St",
            "items": [{"product": "p1", "quantity": 1, "price": 10.0}],
            "total": 10.0
        }))
        .unwrap();
        let order = orders::create(&client, &fields.into_new_order().unwrap())
            .await
            .unwrap();
        created.push(order.doc_id);
    }

    let listed: Vec<String> = orders::list(&client, None)
        .await
        .unwrap()
        .into_iter()
        .map(|o| o.doc_id)
        .collect();
    assert_eq!(listed, vec![created[1].clone(), created[0].clone()]);
}

#[tokio::test]
async fn deleted_review_is_no_longer_listed() {
    let (_server, store, client) = start().await;
    store.seed(json!({"_id": "r1", "_type": "review", "user": "Sam", "rating": 4,
        "comment": "Sturdy", "date": "2024-05-01T00:00:00Z", "productId": 2}));
    store.seed(json!({"_id": "r2", "_type": "review", "user": "Ann", "rating": 5,
        "comment": "Lovely", "date": "2024-05-02T00:00:00Z", "productId": 3}));

    assert_eq!(reviews::list(&client).await.unwrap().len(), 2);

    reviews::delete(&client, "r1").await.unwrap();

    let remaining = reviews::list(&client).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].doc_id, "r2");

    let err = reviews::delete(&client, "r1").await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound { kind: "review", .. }));
}

#[tokio::test]
async fn ordered_product_can_be_deleted_once_its_orders_are_gone() {
    let (_server, store, client) = start().await;
    store.seed(json!({"_id": "p1", "_type": "products", "title": "Chair", "price": 10}));

    let fields: OrderFields = serde_json::from_value(json!({
        "fullName": "Jane Doe",
        "emailAddress": "jane@x.com",
        "items": [{"product": "p1", "quantity": 1, "price": 10.0}],
        "total": 10.0
    }))
    .unwrap();
    let order = orders::create(&client, &fields.into_new_order().unwrap())
        .await
        .unwrap();

    let err = products::delete(&client, "p1").await.unwrap_err();
    assert!(matches!(err, StoreError::Conflict(_)));

    orders::delete(&client, &order.doc_id).await.unwrap();
    assert!(orders::list(&client, None).await.unwrap().is_empty());

    products::delete(&client, "p1").await.unwrap();
    assert!(products::list(&client).await.unwrap().is_empty());
}

#[tokio::test]
async fn review_route_ids_cannot_reach_products() {
    let (_server, store, client) = start().await;
    store.seed(json!({"_id": "p1", "_type": "products", "title": "Chair", "price": 10}));

    let err = reviews::delete(&client, "p1").await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound { kind: "review", .. }));
    let err = orders::update_status(&client, "p1", OrderStatus::Shipped)
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound { kind: "order", .. }));

    let listed = products::list(&client).await.unwrap();
    let product = listed[0].as_product().expect("product survives");
    assert_eq!(product.title.as_deref(), Some("Chair"));
}
