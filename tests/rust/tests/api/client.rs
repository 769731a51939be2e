//! CatalogApiClient against wiremock

use mcpmart_core::{
    ApiError, DataStatus, ImageFile, ProductId, ProductQuery, ProductType, UploadTarget,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use tests::http::client_for;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// =============================================================================
// Products
// =============================================================================

#[tokio::test]
async fn test_fetch_products_sends_page_limit_and_language() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/products"))
        .and(query_param("page", "2"))
        .and(query_param("limit", "5"))
        .and(query_param("language", "en"))
        .and(query_param("type", "ai_agent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 6, "name": "Scout Agent", "stars": "1.2k" },
            { "id": "gh-7", "name": "Git Helper", "stars_numeric": null }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let page = client
        .fetch_products(&ProductQuery::page(2, 5).with_product_type(ProductType::AiAgent))
        .await
        .unwrap();

    assert_eq!(page.products.len(), 2);
    assert_eq!(page.products[0].popularity(), Some(1200.0));
    assert_eq!(page.products[1].id, ProductId::from("gh-7"));
    // Bare arrays carry no totals, so pagination is derived from the request
    assert_eq!(page.pagination.page, 2);
    assert_eq!(page.pagination.limit, 5);
}

#[tokio::test]
async fn test_fetch_products_reads_wrapped_pagination() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{ "id": 1, "name": "Postgres MCP", "type": "mcp_server" }],
            "pagination": { "page": 1, "limit": 12, "total": 30, "totalPages": 3 }
        })))
        .mount(&server)
        .await;

    let page = client_for(&server)
        .fetch_products(&ProductQuery::page(1, 12))
        .await
        .unwrap();

    assert_eq!(page.products[0].product_type, Some(ProductType::McpServer));
    assert_eq!(page.pagination.total, 30);
    assert_eq!(page.pagination.total_pages, 3);
    assert!(page.pagination.has_next());
}

#[tokio::test]
async fn test_server_error_is_typed() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/products"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .fetch_products(&ProductQuery::page(1, 12))
        .await
        .unwrap_err();

    match err {
        ApiError::Status { status, body } => {
            assert_eq!(status, 503);
            assert_eq!(body, "maintenance");
        }
        other => panic!("expected status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_malformed_body_is_decode_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/products/featured"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let err = client_for(&server).fetch_featured(6).await.unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)));
}

#[tokio::test]
async fn test_fetch_featured_reads_bare_list() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/products/featured"))
        .and(query_param("limit", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 3, "name": "Scout Agent", "isFeatured": true },
            { "id": "gh-9", "name": "Atlas", "isFeatured": true }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let featured = client_for(&server).fetch_featured(2).await.unwrap();
    let ids: Vec<String> = featured.iter().map(|p| p.id.to_string()).collect();
    assert_eq!(ids, vec!["3", "gh-9"]);
    assert!(featured.iter().all(|p| p.is_featured));
}

#[tokio::test]
async fn test_fetch_featured_reads_wrapped_list() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/products/featured"))
        .and(query_param("limit", "6"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{ "id": 1, "name": "Postgres MCP", "type": "mcp_server" }]
        })))
        .mount(&server)
        .await;

    let featured = client_for(&server).fetch_featured(6).await.unwrap();
    assert_eq!(featured.len(), 1);
    assert_eq!(featured[0].name, "Postgres MCP");
    assert_eq!(featured[0].product_type, Some(ProductType::McpServer));
}

#[tokio::test]
async fn test_fetch_product_not_found_is_none() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/products/404"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/products/5"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "data": { "id": 5, "name": "Five" } })),
        )
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert_eq!(client.fetch_product(&ProductId::Number(404)).await.unwrap(), None);
    let five = client.fetch_product(&ProductId::Number(5)).await.unwrap().unwrap();
    assert_eq!(five.name, "Five");
}

// =============================================================================
// Status and news
// =============================================================================

#[tokio::test]
async fn test_data_status_accepts_camel_case() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/data-status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "connected",
            "usingFallbackData": true,
            "message": "Serving cached catalog"
        })))
        .mount(&server)
        .await;

    let report = client_for(&server).fetch_data_status().await.unwrap();
    assert!(report.using_fallback_data);
    assert_eq!(report.status(), DataStatus::Fallback);
}

#[tokio::test]
async fn test_news_categories_accept_plain_names() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/news/categories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": ["Industry", { "id": "ai", "name": "AI", "count": 3 }]
        })))
        .mount(&server)
        .await;

    let categories = client_for(&server).fetch_news_categories().await.unwrap();
    assert_eq!(categories.len(), 2);
    assert_eq!(categories[0].name, "Industry");
    assert_eq!(categories[1].count, Some(3));
}

// =============================================================================
// Admin endpoints
// =============================================================================

#[tokio::test]
async fn test_upload_sends_bearer_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/media/upload/news"))
        .and(header("authorization", "Bearer secret"))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({ "imageUrl": "/uploads/n.png" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let image = ImageFile::new("n.png", vec![0x89, b'P', b'N', b'G']);
    let asset = client_for(&server)
        .upload_image(&UploadTarget::Media("news".to_string()), &image, Some("secret"))
        .await
        .unwrap();
    assert_eq!(asset.url, "/uploads/n.png");
}

#[tokio::test]
async fn test_post_json_handles_empty_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/admin/courses"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let record = client_for(&server)
        .post_json("/admin/courses", &json!({ "title": "x" }), Some("t"))
        .await
        .unwrap();
    assert_eq!(record.id, None);
}
