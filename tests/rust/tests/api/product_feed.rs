//! ProductFeed: result application, error collapse, stale responses, detail cache

use mcpmart_core::{
    cache_keys, CacheScope, DomainEvent, EventBus, EventSender, ProductFeed, ProductId,
    ProductType, ERROR_MESSAGE,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tests::events::collect_events;
use tests::http::client_for;
use tests::MockClientCacheRepository;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn products_body(names: &[&str]) -> serde_json::Value {
    let items: Vec<_> = names
        .iter()
        .enumerate()
        .map(|(i, name)| json!({ "id": i + 1, "name": name }))
        .collect();
    json!({
        "data": items,
        "pagination": { "page": 1, "limit": 12, "total": names.len(), "totalPages": 1 }
    })
}

#[tokio::test]
async fn test_success_applies_products_and_pagination() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(products_body(&["A", "B"])))
        .mount(&server)
        .await;

    let bus = EventBus::new();
    let mut rx = bus.subscribe();
    let feed = ProductFeed::new(client_for(&server), bus.sender());

    let state = feed.fetch_products(1, 12).await;
    assert_eq!(state.products.len(), 2);
    assert_eq!(state.pagination.unwrap().total, 2);
    assert_eq!(state.error, None);
    assert!(!state.loading);

    let event = rx.recv().await.unwrap();
    assert_eq!(
        event,
        DomainEvent::ProductsLoaded {
            generation: 1,
            count: 2,
            page: 1
        }
    );
}

#[tokio::test]
async fn test_failure_clears_products_and_shows_fixed_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/products"))
        .and(query_param("search", "ok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(products_body(&["A"])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/products"))
        .and(query_param("search", "boom"))
        .respond_with(ResponseTemplate::new(500).set_body_string("stack trace"))
        .mount(&server)
        .await;

    let feed = ProductFeed::new(client_for(&server), EventSender::detached());
    assert_eq!(feed.search_products("ok").await.products.len(), 1);

    let state = feed.search_products("boom").await;
    assert!(state.products.is_empty());
    assert_eq!(state.pagination, None);
    assert_eq!(state.error.as_deref(), Some(ERROR_MESSAGE));
}

#[tokio::test]
async fn test_stale_response_never_overwrites_newer_one() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/products"))
        .and(query_param("search", "slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(products_body(&["Slow"]))
                .set_delay(Duration::from_millis(400)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/products"))
        .and(query_param("search", "fast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(products_body(&["Fast"])))
        .mount(&server)
        .await;

    let bus = EventBus::new();
    let mut rx = bus.subscribe();
    let feed = Arc::new(ProductFeed::new(client_for(&server), bus.sender()));

    let slow = tokio::spawn({
        let feed = feed.clone();
        async move { feed.search_products("slow").await }
    });
    // Let the slow request draw its generation first
    tokio::time::sleep(Duration::from_millis(50)).await;
    let fast = feed.search_products("fast").await;
    assert_eq!(fast.products[0].name, "Fast");
    assert_eq!(fast.generation, 2);

    slow.await.unwrap();
    let state = feed.snapshot().await;
    assert_eq!(state.products[0].name, "Fast");
    assert_eq!(state.generation, 2);

    let events = collect_events(&mut rx, Duration::from_millis(100)).await;
    assert!(events.contains(&DomainEvent::StaleResponseDiscarded {
        generation: 1,
        latest: 2
    }));
}

#[tokio::test]
async fn test_filters_send_their_own_parameter() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/products"))
        .and(query_param("category", "Databases"))
        .respond_with(ResponseTemplate::new(200).set_body_json(products_body(&["Pg"])))
        .expect(1)
        .mount(&server)
        .await;

    let feed = ProductFeed::new(client_for(&server), EventSender::detached());
    let state = feed.filter_by_category("Databases").await;
    assert_eq!(state.products[0].name, "Pg");
}

#[tokio::test]
async fn test_product_type_filter_sends_type_parameter() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/products"))
        .and(query_param("type", "ai_agent"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(products_body(&["Scout", "Relay"])))
        .expect(1)
        .mount(&server)
        .await;

    let feed = ProductFeed::new(client_for(&server), EventSender::detached());
    let state = feed.filter_by_product_type(ProductType::AiAgent).await;
    assert_eq!(state.products.len(), 2);
    assert_eq!(state.error, None);
    assert_eq!(feed.snapshot().await.products.len(), 2);
}

#[tokio::test]
async fn test_featured_products_loaded_through_feed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/products/featured"))
        .and(query_param("limit", "4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 3, "name": "Scout Agent", "isFeatured": true }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let feed = ProductFeed::new(client_for(&server), EventSender::detached());
    let featured = feed.fetch_featured(4).await.unwrap();
    assert_eq!(featured.len(), 1);
    assert_eq!(featured[0].id, ProductId::from(3_i64));
}

// =============================================================================
// Product detail
// =============================================================================

#[tokio::test]
async fn test_detail_served_from_session_cache() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/products/5"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let cache = Arc::new(MockClientCacheRepository::new().with_entry(
        CacheScope::Session,
        "product_5",
        r#"{"id": 5, "name": "Cached"}"#,
    ));
    let feed = ProductFeed::new(client_for(&server), EventSender::detached()).with_cache(cache);

    let product = feed.get_product(&ProductId::Number(5)).await.unwrap().unwrap();
    assert_eq!(product.name, "Cached");
}

#[tokio::test]
async fn test_detail_found_in_custom_product_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/products/custom-2"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let cache = Arc::new(MockClientCacheRepository::new().with_entry(
        CacheScope::Session,
        cache_keys::CACHED_CUSTOM_PRODUCTS,
        r#"[{"id": "custom-1", "name": "One"}, {"id": "custom-2", "name": "Two"}]"#,
    ));
    let feed = ProductFeed::new(client_for(&server), EventSender::detached()).with_cache(cache);

    let product = feed
        .get_product(&ProductId::from("custom-2"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(product.name, "Two");
}

#[tokio::test]
async fn test_detail_fetched_and_written_back() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/products/9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 9, "name": "Nine" })))
        .expect(1)
        .mount(&server)
        .await;

    let cache = Arc::new(MockClientCacheRepository::new());
    let feed =
        ProductFeed::new(client_for(&server), EventSender::detached()).with_cache(cache.clone());

    let id = ProductId::Number(9);
    assert_eq!(feed.get_product(&id).await.unwrap().unwrap().name, "Nine");
    // Second lookup is a cache hit; the mock expects exactly one request
    assert_eq!(feed.get_product(&id).await.unwrap().unwrap().name, "Nine");
    assert!(cache.value(CacheScope::Session, "product_9").is_some());
}
