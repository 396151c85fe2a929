use saferoute_core::GeoPoint;
use saferoute_server::backoff::RetryPolicy;
use saferoute_server::cache::LightingCache;
use saferoute_server::config::Config;
use saferoute_server::lighting::{LightingEstimator, LightingSource};
use saferoute_server::overpass::OverpassClient;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const OVERPASS_PATH: &str = "/api/interpreter";

fn estimator(server: &MockServer) -> LightingEstimator {
    let config = Config {
        overpass_url: format!("{}{}", server.uri(), OVERPASS_PATH),
        retry_base_ms: 1,
        ..Config::default()
    };
    let overpass = OverpassClient::new(
        reqwest::Client::new(),
        config.overpass_url.clone(),
        Duration::from_secs(5),
    );
    LightingEstimator::new(
        overpass,
        Arc::new(LightingCache::new(16)),
        RetryPolicy::from_config(&config),
        &config,
    )
}

fn straight_path(offset: f64) -> Vec<GeoPoint> {
    (0..40)
        .map(|i| GeoPoint::new(48.85 + f64::from(i) * 0.001 + offset, 2.35 + offset))
        .collect()
}

fn roads() -> serde_json::Value {
    json!({
        "elements": [
            { "type": "way", "id": 1, "tags": { "highway": "primary", "lit": "yes" } },
            { "type": "way", "id": 2, "tags": { "highway": "residential", "lit": "no" } },
            { "type": "way", "id": 1, "tags": { "highway": "primary", "lit": "yes" } },
            { "type": "way", "id": 3, "tags": { "highway": "tertiary" } }
        ]
    })
}

#[tokio::test]
async fn scores_unique_segments_and_caches_near_identical_paths() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(OVERPASS_PATH))
        .and(body_string_contains("[\"highway\"]"))
        .respond_with(ResponseTemplate::new(200).set_body_json(roads()))
        .expect(1)
        .mount(&server)
        .await;

    let estimator = estimator(&server);
    let first = estimator.estimate_detailed(&straight_path(0.0)).await;
    assert_eq!(first.score, 6);
    assert_eq!(first.source, LightingSource::Live);

    // Differs only below the fingerprint precision.
    let second = estimator.estimate_detailed(&straight_path(0.00001)).await;
    assert_eq!(second.score, 6);
    assert_eq!(second.source, LightingSource::Cache);
    assert_eq!(estimator.cache().len(), 1);
}

#[tokio::test]
async fn transient_failures_are_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(OVERPASS_PATH))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(OVERPASS_PATH))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .with_priority(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(OVERPASS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(roads()))
        .with_priority(3)
        .mount(&server)
        .await;

    let estimate = estimator(&server).estimate_detailed(&straight_path(0.0)).await;
    assert_eq!(estimate.attempts_made, 3);
    assert_eq!(estimate.source, LightingSource::Live);
    assert_eq!(estimate.score, 6);
}

#[tokio::test]
async fn client_errors_fall_back_without_caching() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(OVERPASS_PATH))
        .respond_with(ResponseTemplate::new(400))
        .expect(2)
        .mount(&server)
        .await;

    let estimator = estimator(&server);
    let estimate = estimator.estimate_detailed(&straight_path(0.0)).await;
    assert_eq!(estimate.score, 5);
    assert_eq!(estimate.source, LightingSource::Fallback);
    assert_eq!(estimate.attempts_made, 1);
    assert!(estimator.cache().is_empty());

    // Not cached, so the next call asks again.
    assert_eq!(estimator.estimate(&straight_path(0.0)).await, 5);
}

#[tokio::test]
async fn exhausted_retries_fall_back_to_default() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(OVERPASS_PATH))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let estimate = estimator(&server).estimate_detailed(&straight_path(0.0)).await;
    assert_eq!(estimate.score, 5);
    assert_eq!(estimate.attempts_made, 3);
}

#[tokio::test]
async fn empty_result_scores_no_data_and_is_cached() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(OVERPASS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "elements": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let estimator = estimator(&server);
    let estimate = estimator.estimate_detailed(&straight_path(0.0)).await;
    assert_eq!(estimate.score, 3);
    assert_eq!(estimate.source, LightingSource::NoData);
    assert_eq!(estimator.estimate(&straight_path(0.0)).await, 3);
}

#[tokio::test]
async fn cleared_cache_triggers_a_fresh_lookup() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(OVERPASS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(roads()))
        .expect(2)
        .mount(&server)
        .await;

    let estimator = estimator(&server);
    estimator.estimate(&straight_path(0.0)).await;
    assert_eq!(estimator.cache().clear(), 1);
    let estimate = estimator.estimate_detailed(&straight_path(0.0)).await;
    assert_eq!(estimate.source, LightingSource::Live);
}
