//! Collectibles cache behavior against a mock API: negative caching,
//! in-flight de-duplication, failure suspension, bulk priming.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use cordgrab_core::{CollectibleRecord, CollectiblesCache, HttpClient};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn cache_for(server: &MockServer) -> Arc<CollectiblesCache> {
    Arc::new(CollectiblesCache::new(HttpClient::default(), server.uri()))
}

fn nameplate_listing(sku: &str, name: &str, asset: &str) -> serde_json::Value {
    json!({
        "type": 2,
        "sku_id": sku,
        "name": name,
        "items": [{
            "type": 2,
            "id": "1",
            "sku_id": sku,
            "asset": asset,
            "label": format!("{name} nameplate"),
            "palette": "crimson"
        }]
    })
}

#[tokio::test]
async fn test_fetch_caches_positive_result() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/collectibles-products/100"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(nameplate_listing("100", "Cityscape", "nameplates/cityscape/")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let cache = cache_for(&server);
    let record = cache.fetch("100", false).await.unwrap();
    assert_eq!(record.name(), "Cityscape");
    assert_eq!(record.asset(), Some("nameplates/cityscape/"));

    // second lookup is served from the cache (mock expects one hit)
    let again = cache.fetch("100", false).await.unwrap();
    assert_eq!(again, record);
    assert_eq!(cache.peek("100"), Some(record.clone()));
    assert_eq!(cache.peek_by_asset("nameplates/cityscape/"), Some(record));
}

#[tokio::test]
async fn test_missing_sku_is_cached_as_invalid() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/collectibles-products/404sku"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let cache = cache_for(&server);
    assert_eq!(cache.fetch("404sku", false).await, None);
    // negative result cached: no second request
    assert_eq!(cache.fetch("404sku", false).await, None);
    // a 404 is a definitive answer, not a failure
    assert_eq!(cache.error_count(), 0);
    assert!(!cache.is_suspended());
}

#[tokio::test]
async fn test_force_bypasses_negative_cache() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/collectibles-products/late"))
        .respond_with(ResponseTemplate::new(404))
        .expect(2)
        .mount(&server)
        .await;

    let cache = cache_for(&server);
    assert_eq!(cache.fetch("late", false).await, None);
    // force retries even though the SKU is marked invalid
    assert_eq!(cache.fetch("late", true).await, None);
}

#[tokio::test]
async fn test_non_collectible_listing_is_invalid() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/collectibles-products/bundle"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "type": 1000,
            "sku_id": "bundle",
            "name": "Mega Bundle",
            "items": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    let cache = cache_for(&server);
    assert_eq!(cache.fetch("bundle", false).await, None);
    assert_eq!(cache.fetch("bundle", false).await, None);
}

#[tokio::test]
async fn test_repeated_failures_suspend_lookups() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(5)
        .mount(&server)
        .await;

    let cache = cache_for(&server);
    for n in 0..5 {
        assert_eq!(cache.fetch(&format!("sku{n}"), false).await, None);
    }
    assert_eq!(cache.error_count(), 5);
    assert!(cache.is_suspended());

    // suspended: no request leaves the process (mock expects five)
    assert_eq!(cache.fetch("sku-after", false).await, None);

    // cached entries still serve while suspended
    let item = json!({ "type": 0, "sku_id": "s", "asset": "a", "label": "l" });
    cache.store("s", CollectibleRecord::from_item(&item, Some("Halo")).unwrap());
    assert!(cache.fetch("s", false).await.is_some());
}

#[tokio::test]
async fn test_concurrent_fetches_share_one_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/collectibles-products/shared"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(nameplate_listing("shared", "Shared", "nameplates/shared/"))
                .set_delay(Duration::from_millis(150)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let cache = cache_for(&server);
    let (a, b) = tokio::join!(cache.fetch("shared", false), cache.fetch("shared", false));
    assert_eq!(a.unwrap().name(), "Shared");
    assert_eq!(b.unwrap().name(), "Shared");
}

#[tokio::test]
async fn test_get_or_schedule_fetches_in_background() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/collectibles-products/bg"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(nameplate_listing("bg", "Background", "nameplates/bg/")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let cache = cache_for(&server);
    // miss now, fetch scheduled
    assert_eq!(cache.get_or_schedule("bg"), None);
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(cache.peek("bg").unwrap().name(), "Background");
    // hit now
    assert!(cache.get_or_schedule("bg").is_some());
}

#[tokio::test]
async fn test_load_session_data_primes_from_all_endpoints() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/@me/collectibles-purchases"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(nameplate_listing("p1", "Purchased", "nameplates/p1/")),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/collectibles-categories/v2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "categories": [{
                "name": "Nameplates",
                "products": [
                    nameplate_listing("c1", "Catalog One", "nameplates/c1/"),
                    nameplate_listing("c2", "Catalog Two", "nameplates/c2/")
                ]
            }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/user-profile-effects"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "profile_effect_configs": [{
                "type": 1,
                "sku_id": "e1",
                "title": "Snowfall",
                "thumbnailPreviewSrc": "https://cdn.example/snow-thumb.png",
                "effects": [{ "src": "https://cdn.example/snow.png" }]
            }]
        })))
        .mount(&server)
        .await;

    let cache = cache_for(&server);
    cache.load_session_data().await;

    assert_eq!(cache.peek("p1").unwrap().name(), "Purchased");
    assert_eq!(cache.peek("c1").unwrap().name(), "Catalog One");
    assert_eq!(cache.peek("c2").unwrap().name(), "Catalog Two");
    assert_eq!(cache.peek("e1").unwrap().name(), "Snowfall");
}

#[tokio::test]
async fn test_empty_sku_is_a_miss() {
    let server = MockServer::start().await;
    let cache = cache_for(&server);
    assert_eq!(cache.fetch("", false).await, None);
    assert_eq!(cache.get_or_schedule(""), None);
}
