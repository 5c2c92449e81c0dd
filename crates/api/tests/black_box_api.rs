//! End-to-end tests: the real router and real backend client driven over
//! HTTP against an in-process mock of the shop backend.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tokio::sync::RwLock;

use stockroute_api::config::{AppConfig, BackendConfig};
use stockroute_client::Credentials;
use stockroute_core::{WarehouseId, WarehouseTopology};
use stockroute_routing::RoutingPolicy;

const PRIMARY: i64 = 101;
const FALLBACK: i64 = 202;

// -------------------------
// Mock shop backend
// -------------------------

#[derive(Default)]
struct BackendState {
    /// Order objects as the backend would return them (inner `order` value).
    orders: RwLock<HashMap<i64, Value>>,
    /// (product, warehouse) -> available. Missing pairs return 404.
    stock: RwLock<HashMap<(i64, i64), u64>>,
    /// variant -> product.
    variants: RwLock<HashMap<i64, i64>>,
    /// Ids the order listing reports beyond the stored orders.
    listing_extras: RwLock<Vec<i64>>,
    /// Recorded (order, warehouse) writes.
    writes: RwLock<Vec<(i64, i64)>>,
    reject_writes: AtomicBool,
    listing_hits: AtomicUsize,
    variant_hits: AtomicUsize,
}

struct MockBackend {
    state: Arc<BackendState>,
    addr: SocketAddr,
    _handle: tokio::task::JoinHandle<()>,
}

impl MockBackend {
    async fn start() -> Self {
        let state = Arc::new(BackendState::default());

        let app = Router::new()
            .route("/admin/orders.json", get(list_orders))
            .route("/admin/orders/:file", get(get_order).put(put_order))
            .route("/admin/products/:id/stock.json", get(get_stock))
            .route("/admin/variants/:file", get(get_variant))
            .route("/admin/warehouses/:id/stock.json", get(warehouse_stock))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind mock backend");
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            state,
            addr,
            _handle: handle,
        }
    }

    fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    async fn insert_order(&self, id: i64, warehouse: Option<i64>, lines: Value) {
        self.state.orders.write().await.insert(
            id,
            json!({
                "id": id,
                "warehouse_id": warehouse,
                "order_lines": lines,
            }),
        );
    }

    async fn set_stock(&self, product: i64, warehouse: i64, available: u64) {
        self.state
            .stock
            .write()
            .await
            .insert((product, warehouse), available);
    }

    async fn set_variant(&self, variant: i64, product: i64) {
        self.state.variants.write().await.insert(variant, product);
    }

    async fn add_listing_extra(&self, id: i64) {
        self.state.listing_extras.write().await.push(id);
    }

    async fn warehouse_of(&self, id: i64) -> Option<i64> {
        self.state
            .orders
            .read()
            .await
            .get(&id)
            .and_then(|order| order["warehouse_id"].as_i64())
    }

    async fn write_count(&self) -> usize {
        self.state.writes.read().await.len()
    }
}

fn parse_file_id(file: &str) -> Option<i64> {
    file.strip_suffix(".json").unwrap_or(file).parse().ok()
}

async fn list_orders(State(state): State<Arc<BackendState>>) -> axum::response::Response {
    let mut ids: Vec<i64> = state.orders.read().await.keys().copied().collect();
    ids.extend(state.listing_extras.read().await.iter().copied());
    ids.sort();
    let orders: Vec<Value> = ids.into_iter().map(|id| json!({ "id": id })).collect();
    Json(json!({ "orders": orders })).into_response()
}

async fn get_order(
    State(state): State<Arc<BackendState>>,
    Path(file): Path<String>,
) -> axum::response::Response {
    let Some(id) = parse_file_id(&file) else {
        return StatusCode::BAD_REQUEST.into_response();
    };
    match state.orders.read().await.get(&id) {
        Some(order) => Json(json!({ "order": order })).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn put_order(
    State(state): State<Arc<BackendState>>,
    Path(file): Path<String>,
    Json(body): Json<Value>,
) -> axum::response::Response {
    if state.reject_writes.load(Ordering::SeqCst) {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    let Some(id) = parse_file_id(&file) else {
        return StatusCode::BAD_REQUEST.into_response();
    };
    let Some(warehouse) = body.pointer("/order/warehouse_id").and_then(Value::as_i64) else {
        return StatusCode::UNPROCESSABLE_ENTITY.into_response();
    };

    let mut orders = state.orders.write().await;
    let Some(order) = orders.get_mut(&id) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    order["warehouse_id"] = json!(warehouse);
    state.writes.write().await.push((id, warehouse));

    Json(json!({ "order": order })).into_response()
}

async fn get_stock(
    State(state): State<Arc<BackendState>>,
    Path(id): Path<i64>,
    Query(params): Query<HashMap<String, String>>,
) -> axum::response::Response {
    let warehouse: i64 = params
        .get("warehouse_id")
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(0);
    match state.stock.read().await.get(&(id, warehouse)) {
        Some(available) => Json(json!({ "available": available })).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn get_variant(
    State(state): State<Arc<BackendState>>,
    Path(file): Path<String>,
) -> axum::response::Response {
    state.variant_hits.fetch_add(1, Ordering::SeqCst);
    let Some(id) = parse_file_id(&file) else {
        return StatusCode::BAD_REQUEST.into_response();
    };
    match state.variants.read().await.get(&id) {
        Some(product) => {
            Json(json!({ "variant": { "id": id, "product_id": product } })).into_response()
        }
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn warehouse_stock(
    State(state): State<Arc<BackendState>>,
    Path(id): Path<i64>,
) -> axum::response::Response {
    state.listing_hits.fetch_add(1, Ordering::SeqCst);
    let rows: Vec<Value> = state
        .stock
        .read()
        .await
        .iter()
        .filter(|((_, warehouse), _)| *warehouse == id)
        .map(|((product, _), available)| json!({ "product_id": product, "available": available }))
        .collect();
    Json(json!(rows)).into_response()
}

// -------------------------
// The app under test
// -------------------------

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn(config: AppConfig) -> Self {
        let app = stockroute_api::app::build_app(config);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn test_config(backend_url: &str, token: Option<&str>) -> AppConfig {
    AppConfig {
        bind_addr: "127.0.0.1:0".to_string(),
        webhook_token: token.map(str::to_string),
        backend: BackendConfig {
            base_url: backend_url.to_string(),
            credentials: Credentials {
                key: "test-key".to_string(),
                password: "test-password".to_string(),
            },
        },
        topology: WarehouseTopology::new(
            WarehouseId::new(PRIMARY),
            vec![WarehouseId::new(FALLBACK)],
        )
        .unwrap(),
        policy: RoutingPolicy::default(),
        poll_window: chrono::Duration::minutes(15),
        stock_cache_ttl: None,
    }
}

fn physical_line(product: i64, quantity: u32) -> Value {
    json!({ "product_id": product, "quantity": quantity, "category": "physical" })
}

async fn post_webhook(client: &reqwest::Client, base_url: &str, payload: Value) -> reqwest::Response {
    client
        .post(format!("{}/hooks/order-changed", base_url))
        .json(&payload)
        .send()
        .await
        .unwrap()
}

// -------------------------
// Tests
// -------------------------

#[tokio::test]
async fn shortfall_order_is_reassigned_end_to_end() {
    let backend = MockBackend::start().await;
    backend
        .insert_order(5001, Some(PRIMARY), json!([physical_line(11, 5)]))
        .await;
    backend.set_stock(11, PRIMARY, 2).await;
    backend.set_stock(11, FALLBACK, 10).await;

    let srv = TestServer::spawn(test_config(&backend.url(), None)).await;
    let client = reqwest::Client::new();

    let res = post_webhook(&client, &srv.base_url, json!({ "id": 5001 })).await;
    assert_eq!(res.status(), reqwest::StatusCode::OK);
    let body: Value = res.json().await.unwrap();

    assert_eq!(body["decision"]["action"], "reassign");
    assert_eq!(body["decision"]["target"], FALLBACK);
    assert_eq!(body["mutation"], "applied");

    let item = &body["rationale"]["items"][0];
    assert_eq!(item["ordered"], 5);
    assert_eq!(item["stock"][0]["warehouse"], PRIMARY);
    assert_eq!(item["stock"][0]["available"], 2);
    assert_eq!(item["stock"][1]["warehouse"], FALLBACK);
    assert_eq!(item["stock"][1]["available"], 10);

    assert_eq!(backend.warehouse_of(5001).await, Some(FALLBACK));
    assert_eq!(backend.write_count().await, 1);

    // Re-delivery of the same event: the order now sits on a fallback,
    // which is terminal, so no second write happens.
    let res = post_webhook(&client, &srv.base_url, json!({ "id": 5001 })).await;
    assert_eq!(res.status(), reqwest::StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["decision"]["action"], "no_op");
    assert_eq!(body["mutation"], "not_needed");
    assert_eq!(backend.write_count().await, 1);
}

#[tokio::test]
async fn event_envelope_reference_is_followed() {
    let backend = MockBackend::start().await;
    backend
        .insert_order(
            5002,
            Some(PRIMARY),
            json!([{ "product_id": 11, "quantity": 1, "category": "service" }]),
        )
        .await;

    let srv = TestServer::spawn(test_config(&backend.url(), None)).await;
    let client = reqwest::Client::new();

    let payload = json!({
        "events": [
            { "metadata": { "order": format!("{}/admin/orders/5002.json", backend.url()) } }
        ]
    });
    let res = post_webhook(&client, &srv.base_url, payload).await;
    assert_eq!(res.status(), reqwest::StatusCode::OK);
    let body: Value = res.json().await.unwrap();

    // Service-only order already on primary: nothing to do, no stock read.
    assert_eq!(body["order_id"], 5002);
    assert_eq!(body["decision"]["action"], "no_op");
    assert_eq!(backend.write_count().await, 0);
}

#[tokio::test]
async fn unassigned_order_is_defaulted_then_stays_put() {
    let backend = MockBackend::start().await;
    backend
        .insert_order(5003, None, json!([physical_line(11, 3)]))
        .await;
    backend.set_stock(11, PRIMARY, 5).await;

    let srv = TestServer::spawn(test_config(&backend.url(), None)).await;
    let client = reqwest::Client::new();

    let res = post_webhook(&client, &srv.base_url, json!({ "id": 5003 })).await;
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["decision"]["action"], "assign_default");
    assert_eq!(body["decision"]["target"], PRIMARY);
    assert_eq!(body["mutation"], "applied");
    assert_eq!(backend.warehouse_of(5003).await, Some(PRIMARY));

    // Same trigger again: the order now carries the primary explicitly, so
    // the end state is unchanged and nothing new is written.
    let res = post_webhook(&client, &srv.base_url, json!({ "id": 5003 })).await;
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["decision"]["action"], "no_op");
    assert_eq!(backend.write_count().await, 1);
}

#[tokio::test]
async fn order_short_everywhere_is_not_moved() {
    let backend = MockBackend::start().await;
    backend
        .insert_order(
            5004,
            Some(PRIMARY),
            json!([physical_line(1, 3), physical_line(2, 4)]),
        )
        .await;
    backend.set_stock(1, PRIMARY, 5).await;
    backend.set_stock(2, PRIMARY, 1).await;
    backend.set_stock(2, FALLBACK, 0).await;

    let srv = TestServer::spawn(test_config(&backend.url(), None)).await;
    let client = reqwest::Client::new();

    let res = post_webhook(&client, &srv.base_url, json!({ "id": 5004 })).await;
    let body: Value = res.json().await.unwrap();

    assert_eq!(body["decision"]["action"], "no_op");
    assert_eq!(body["mutation"], "not_needed");
    assert_eq!(body["rationale"]["items"][1]["outcome"], "short_everywhere");
    assert_eq!(backend.write_count().await, 0);
}

#[tokio::test]
async fn unknown_order_is_a_client_error() {
    let backend = MockBackend::start().await;
    let srv = TestServer::spawn(test_config(&backend.url(), None)).await;
    let client = reqwest::Client::new();

    let res = post_webhook(&client, &srv.base_url, json!({ "id": 9999 })).await;
    assert_eq!(res.status(), reqwest::StatusCode::NOT_FOUND);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn malformed_trigger_is_rejected() {
    let backend = MockBackend::start().await;
    let srv = TestServer::spawn(test_config(&backend.url(), None)).await;
    let client = reqwest::Client::new();

    let res = post_webhook(&client, &srv.base_url, json!({ "events": [] })).await;
    assert_eq!(res.status(), reqwest::StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "bad_trigger");
}

#[tokio::test]
async fn trigger_endpoints_require_the_configured_token() {
    let backend = MockBackend::start().await;
    backend
        .insert_order(5005, Some(PRIMARY), json!([]))
        .await;

    let srv = TestServer::spawn(test_config(&backend.url(), Some("hook-secret"))).await;
    let client = reqwest::Client::new();

    let res = post_webhook(&client, &srv.base_url, json!({ "id": 5005 })).await;
    assert_eq!(res.status(), reqwest::StatusCode::UNAUTHORIZED);

    let res = client
        .post(format!("{}/hooks/order-changed", srv.base_url))
        .bearer_auth("wrong")
        .json(&json!({ "id": 5005 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::UNAUTHORIZED);

    let res = client
        .post(format!("{}/hooks/order-changed", srv.base_url))
        .bearer_auth("hook-secret")
        .json(&json!({ "id": 5005 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::OK);
}

#[tokio::test]
async fn readiness_probe_needs_no_token() {
    let backend = MockBackend::start().await;
    let srv = TestServer::spawn(test_config(&backend.url(), Some("hook-secret"))).await;

    let client = reqwest::Client::new();
    let res = client
        .get(format!("{}/hooks/order-changed", srv.base_url))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), reqwest::StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn failed_write_reports_the_attempted_decision() {
    let backend = MockBackend::start().await;
    backend
        .insert_order(5006, Some(PRIMARY), json!([physical_line(11, 5)]))
        .await;
    backend.set_stock(11, PRIMARY, 0).await;
    backend.set_stock(11, FALLBACK, 10).await;
    backend.state.reject_writes.store(true, Ordering::SeqCst);

    let srv = TestServer::spawn(test_config(&backend.url(), None)).await;
    let client = reqwest::Client::new();

    let res = post_webhook(&client, &srv.base_url, json!({ "id": 5006 })).await;
    assert_eq!(res.status(), reqwest::StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = res.json().await.unwrap();

    // The computed decision and rationale survive the failed write.
    assert_eq!(body["error"], "mutation_failed");
    assert_eq!(body["attempted"]["action"], "reassign");
    assert_eq!(body["attempted"]["target"], FALLBACK);
    assert_eq!(body["rationale"]["items"][0]["ordered"], 5);

    assert_eq!(backend.warehouse_of(5006).await, Some(PRIMARY));
}

#[tokio::test]
async fn poll_processes_each_order_independently() {
    let backend = MockBackend::start().await;
    backend
        .insert_order(6001, Some(PRIMARY), json!([physical_line(11, 5)]))
        .await;
    backend
        .insert_order(
            6002,
            Some(PRIMARY),
            json!([{ "product_id": 12, "quantity": 1, "category": "service" }]),
        )
        .await;
    backend.add_listing_extra(6999).await;
    backend.set_stock(11, PRIMARY, 0).await;
    backend.set_stock(11, FALLBACK, 10).await;

    let srv = TestServer::spawn(test_config(&backend.url(), None)).await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/poll", srv.base_url))
        .json(&json!({ "window_minutes": 60 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::OK);
    let body: Value = res.json().await.unwrap();

    assert_eq!(body["processed"], 3);
    let results = body["results"].as_array().unwrap();

    let by_id = |id: i64| {
        results
            .iter()
            .find(|entry| entry["order_id"] == id)
            .unwrap()
    };
    assert_eq!(by_id(6001)["decision"]["action"], "reassign");
    assert_eq!(by_id(6002)["decision"]["action"], "no_op");
    // The phantom order fails alone; the batch still completes.
    assert_eq!(by_id(6999)["error"], "not_found");

    assert_eq!(backend.warehouse_of(6001).await, Some(FALLBACK));
}

#[tokio::test]
async fn decision_preview_never_mutates() {
    let backend = MockBackend::start().await;
    backend
        .insert_order(7001, Some(PRIMARY), json!([physical_line(11, 5)]))
        .await;
    backend.set_stock(11, PRIMARY, 0).await;
    backend.set_stock(11, FALLBACK, 10).await;

    let srv = TestServer::spawn(test_config(&backend.url(), None)).await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/orders/7001/decision", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::OK);
    let body: Value = res.json().await.unwrap();

    assert_eq!(body["decision"]["action"], "reassign");
    assert_eq!(body["decision"]["target"], FALLBACK);
    assert_eq!(backend.write_count().await, 0);
    assert_eq!(backend.warehouse_of(7001).await, Some(PRIMARY));
}

#[tokio::test]
async fn warehouse_listings_are_cached_within_the_freshness_window() {
    let backend = MockBackend::start().await;
    backend
        .insert_order(8001, Some(PRIMARY), json!([physical_line(11, 2)]))
        .await;
    backend.set_stock(11, PRIMARY, 5).await;

    let mut config = test_config(&backend.url(), None);
    config.stock_cache_ttl = Some(std::time::Duration::from_secs(30));
    let srv = TestServer::spawn(config).await;
    let client = reqwest::Client::new();

    for _ in 0..2 {
        let res = client
            .get(format!("{}/orders/8001/decision", srv.base_url))
            .send()
            .await
            .unwrap();
        let body: Value = res.json().await.unwrap();
        assert_eq!(body["decision"]["action"], "no_op");
    }

    // Two evaluations, one bulk listing fetch for the primary warehouse.
    assert_eq!(backend.state.listing_hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn variant_references_are_resolved_once() {
    let backend = MockBackend::start().await;
    backend
        .insert_order(
            9001,
            Some(PRIMARY),
            json!([{ "variant_id": 77, "quantity": 2, "category": "physical" }]),
        )
        .await;
    backend.set_variant(77, 11).await;
    backend.set_stock(11, PRIMARY, 5).await;

    let srv = TestServer::spawn(test_config(&backend.url(), None)).await;
    let client = reqwest::Client::new();

    for _ in 0..2 {
        let res = client
            .get(format!("{}/orders/9001/decision", srv.base_url))
            .send()
            .await
            .unwrap();
        let body: Value = res.json().await.unwrap();
        assert_eq!(body["decision"]["action"], "no_op");
        assert_eq!(body["rationale"]["items"][0]["product"], "variant:77");
    }

    // The variant→product mapping is memoized for the client's lifetime.
    assert_eq!(backend.state.variant_hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn health_endpoint_is_public() {
    let backend = MockBackend::start().await;
    let srv = TestServer::spawn(test_config(&backend.url(), Some("hook-secret"))).await;

    let res = reqwest::get(format!("{}/health", srv.base_url)).await.unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::OK);
}
