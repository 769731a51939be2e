//! NewsService fallback chain: API, then local cache, then examples

use mcpmart_core::{
    cache_keys, example_articles, AppState, CacheScope, EventSender, NewsArticle, NewsService,
    NewsSource, DEFAULT_AUTHOR, DEFAULT_TITLE, MAX_SUMMARY_CHARS,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use tests::http::client_for;
use tests::MockClientCacheRepository;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn service(server: &MockServer, cache: Arc<MockClientCacheRepository>) -> (NewsService, Arc<AppState>) {
    let state = AppState::shared();
    let service = NewsService::new(client_for(server), cache, state.clone(), EventSender::detached());
    (service, state)
}

fn cached_article(title: &str) -> NewsArticle {
    let mut article = example_articles().remove(0);
    article.id = "cached-1".to_string();
    article.title = title.to_string();
    article
}

#[tokio::test]
async fn test_api_articles_are_validated_and_cached() {
    let server = MockServer::start().await;
    let long_summary = "x".repeat(300);
    Mock::given(method("GET"))
        .and(path("/api/news"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 12, "title": "Registry update", "excerpt": long_summary },
            { "title": "" }
        ])))
        .mount(&server)
        .await;

    let cache = Arc::new(MockClientCacheRepository::new());
    let (service, state) = service(&server, cache.clone());
    let feed = service.load_news().await;

    assert_eq!(feed.source, NewsSource::Api);
    assert_eq!(feed.articles[0].id, "12");
    assert_eq!(feed.articles[0].summary.chars().count(), MAX_SUMMARY_CHARS + 3);
    assert_eq!(feed.articles[1].title, DEFAULT_TITLE);
    assert_eq!(feed.articles[1].author, DEFAULT_AUTHOR);
    assert!(feed.articles[1].id.starts_with("news-"));

    let cached: Vec<NewsArticle> =
        serde_json::from_str(&cache.value(CacheScope::Local, cache_keys::NEWS_DATA).unwrap())
            .unwrap();
    assert_eq!(cached, feed.articles);
    assert_eq!(state.snapshot().await.news_source, Some(NewsSource::Api));
}

#[tokio::test]
async fn test_falls_back_to_local_cache() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/news"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let cached = vec![cached_article("From last time")];
    let cache = Arc::new(MockClientCacheRepository::new().with_entry(
        CacheScope::Local,
        cache_keys::NEWS_DATA,
        &serde_json::to_string(&cached).unwrap(),
    ));
    let (service, state) = service(&server, cache);

    let feed = service.load_news().await;
    assert_eq!(feed.source, NewsSource::LocalCache);
    assert_eq!(feed.articles, cached);
    assert_eq!(state.snapshot().await.news_source, Some(NewsSource::LocalCache));
    assert!(state.snapshot().await.using_fallback_data);
}

#[tokio::test]
async fn test_falls_back_to_examples() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/news"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let cache = Arc::new(
        MockClientCacheRepository::new().with_entry(CacheScope::Local, cache_keys::NEWS_DATA, "{corrupt"),
    );
    let (service, _state) = service(&server, cache);

    let feed = service.load_news().await;
    assert_eq!(feed.source, NewsSource::Examples);
    assert_eq!(feed.articles, example_articles());
}

#[tokio::test]
async fn test_unreadable_cache_still_yields_examples() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/news"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let cache = Arc::new(MockClientCacheRepository::new().failing_reads());
    let (service, _state) = service(&server, cache);

    assert_eq!(service.load_news().await.source, NewsSource::Examples);
}

#[tokio::test]
async fn test_categories_derived_when_api_fails() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/news/categories"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let (service, _state) = service(&server, Arc::new(MockClientCacheRepository::new()));
    let categories = service.load_categories(&example_articles()).await;

    let names: Vec<&str> = categories.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Announcements", "Guides", "Product Updates"]);
}
