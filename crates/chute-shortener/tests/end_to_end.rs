//! Mints through the shortener router and resolves through the redirector
//! router, with both services sharing the same cache and durable store.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chute_cache::MemoryUrlCache;
use chute_core::ShortCode;
use chute_idgen::{IdAllocOptions, IdAllocator, MemoryStore};
use chute_redirector::RedirectorService;
use chute_shortener::ShortenerService;
use chute_storage::InMemoryRepository;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

const BASE_URL: &str = "http://chu.te";

struct Cluster {
    cache: Arc<MemoryUrlCache>,
    shortener: Router,
    redirector: Router,
}

async fn cluster() -> Cluster {
    let cache = Arc::new(MemoryUrlCache::new());
    let repo = Arc::new(InMemoryRepository::new());

    let options = IdAllocOptions::builder()
        .segment_size(32)
        .segment_count_key("test/count".to_string())
        .segment_map_key("test/map".to_string())
        .max_segment_count(4)
        .build();
    let allocator = IdAllocator::bootstrap(Arc::new(MemoryStore::new()), &options)
        .await
        .unwrap();

    let shorten_service = ShortenerService::new(
        allocator,
        Arc::clone(&cache),
        Arc::clone(&repo),
        Duration::from_secs(60),
    );
    let shortener = chute_shortener::http::app(chute_shortener::http::AppState {
        shortener: Arc::new(shorten_service),
        base_url: BASE_URL.to_string(),
    });

    let redirect_service = RedirectorService::new(Arc::clone(&cache), repo);
    let redirector = chute_redirector::http::app(chute_redirector::http::AppState {
        redirector: Arc::new(redirect_service),
    });

    Cluster {
        cache,
        shortener,
        redirector,
    }
}

async fn mint(cluster: &Cluster, long_url: &str) -> String {
    let resp = cluster
        .shortener
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/create")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(format!("{{\"long_url\":\"{long_url}\"}}")))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let parsed: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    let short_url = parsed["short_url"].as_str().unwrap();
    short_url
        .strip_prefix(&format!("{BASE_URL}/short/"))
        .unwrap()
        .to_string()
}

async fn resolve(cluster: &Cluster, code: &str) -> axum::response::Response {
    cluster
        .redirector
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/short/{code}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
}

#[tokio::test]
async fn minted_code_redirects_from_the_cache() {
    let cluster = cluster().await;
    let code = mint(&cluster, "http://example.com/").await;

    let resp = resolve(&cluster, &code).await;
    assert_eq!(resp.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(
        resp.headers().get(header::LOCATION).unwrap(),
        "http://example.com/"
    );
}

#[tokio::test]
async fn minted_code_survives_cache_eviction() {
    let cluster = cluster().await;
    let code = mint(&cluster, "http://example.com/deep/path?q=1").await;

    cluster.cache.evict(&ShortCode::parse(&code).unwrap());

    let resp = resolve(&cluster, &code).await;
    assert_eq!(resp.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(
        resp.headers().get(header::LOCATION).unwrap(),
        "http://example.com/deep/path?q=1"
    );
}

#[tokio::test]
async fn unminted_code_is_404() {
    let cluster = cluster().await;
    mint(&cluster, "http://example.com/").await;

    let resp = resolve(&cluster, "ZZZZZZZ").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
