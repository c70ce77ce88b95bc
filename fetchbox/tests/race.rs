mod common;

use std::time::Duration;

use common::{Harness, MockOrigin, MockStore, matching, request};
use fetchbox::strategy::race::RaceState;
use fetchbox::{Response, Rule, StrategyKind};
use http::StatusCode;
use pretty_assertions::assert_eq;

fn rule() -> Rule {
    Rule::new(StrategyKind::Race).with_cache(true)
}

#[tokio::test(start_paused = true)]
async fn test_network_first_wins_and_later_store_hit_is_ignored() {
    let fresh = Response::ok("fresh");
    let store = MockStore::new()
        .with_entry("/feed", Response::ok("cached"))
        .with_read_delay(Duration::from_millis(50));
    let origin = MockOrigin::respond(fresh.clone()).with_delay(Duration::from_millis(10));
    let harness = Harness::new(store.clone(), origin);

    let (req, event) = request("/feed");
    let response = harness
        .strategies
        .dispatch(rule(), req, event, matching())
        .await;
    tokio::time::sleep(Duration::from_millis(100)).await;
    harness.settle().await;

    assert_eq!(response, fresh);
    assert_eq!(harness.trace.count("Race resolved from network"), 1);
    assert_eq!(harness.trace.count("Race resolved from store"), 0);
    assert_eq!(harness.fallback.count(), 0);
    assert_eq!(store.write_count(), 1);
    assert_eq!(store.entry("/feed"), Some(fresh));
}

#[tokio::test(start_paused = true)]
async fn test_network_win_traces_response_url() {
    let uri: http::Uri = "https://cdn.example.com/feed".parse().unwrap();
    let origin = MockOrigin::respond(Response::ok("fresh").with_url(uri));
    let store = MockStore::new().with_read_delay(Duration::from_millis(50));
    let harness = Harness::new(store, origin);

    let (req, event) = request("/feed");
    harness
        .strategies
        .dispatch(Rule::new(StrategyKind::Race), req, event, matching())
        .await;

    assert_eq!(
        harness.trace.data("Race resolved from network"),
        Some(serde_json::json!({ "url": "https://cdn.example.com/feed" }))
    );
}

#[tokio::test(start_paused = true)]
async fn test_store_first_wins_and_late_network_refreshes_once() {
    let cached = Response::ok("cached");
    let fresh = Response::ok("fresh");
    let store = MockStore::new().with_entry("/feed", cached.clone());
    let origin = MockOrigin::respond(fresh.clone()).with_delay(Duration::from_millis(100));
    let harness = Harness::new(store.clone(), origin.clone());

    let (req, event) = request("/feed");
    let response = harness
        .strategies
        .dispatch(rule(), req, event, matching())
        .await;

    assert_eq!(response, cached);
    assert_eq!(store.write_count(), 0);

    harness.settle().await;

    assert_eq!(origin.calls(), 1);
    assert_eq!(store.write_count(), 1);
    assert_eq!(store.entry("/feed"), Some(fresh));
    assert_eq!(harness.trace.count("Race resolved from store"), 1);
    assert_eq!(harness.trace.count("Race resolved from network"), 0);
    assert_eq!(harness.trace.count("Race failed fetching"), 0);
    assert_eq!(harness.trace.count("Updated cache"), 1);
}

#[tokio::test(start_paused = true)]
async fn test_store_first_without_cache_action_never_writes() {
    let store = MockStore::new().with_entry("/feed", Response::ok("cached"));
    let origin = MockOrigin::respond(Response::ok("fresh")).with_delay(Duration::from_millis(100));
    let harness = Harness::new(store.clone(), origin.clone());

    let (req, event) = request("/feed");
    harness
        .strategies
        .dispatch(Rule::new(StrategyKind::Race), req, event, matching())
        .await;
    harness.settle().await;

    assert_eq!(origin.calls(), 1);
    assert_eq!(store.write_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_network_failure_then_store_hit() {
    let cached = Response::ok("cached");
    let store = MockStore::new()
        .with_entry("/feed", cached.clone())
        .with_read_delay(Duration::from_millis(50));
    let origin = MockOrigin::status(StatusCode::INTERNAL_SERVER_ERROR)
        .with_delay(Duration::from_millis(10));
    let harness = Harness::new(store, origin);

    let (req, event) = request("/feed");
    let response = harness
        .strategies
        .dispatch(rule(), req, event, matching())
        .await;

    assert_eq!(response, cached);
    assert_eq!(
        harness.trace.data("Race failed fetching"),
        Some(serde_json::json!({ "status": 500, "reason": "Internal Server Error" }))
    );
    assert_eq!(harness.fallback.count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_store_miss_then_network_success() {
    let fresh = Response::ok("fresh");
    let store = MockStore::new();
    let origin = MockOrigin::respond(fresh.clone()).with_delay(Duration::from_millis(30));
    let harness = Harness::new(store.clone(), origin);

    let (req, event) = request("/feed");
    let response = harness
        .strategies
        .dispatch(rule(), req, event, matching())
        .await;
    harness.settle().await;

    assert_eq!(response, fresh);
    assert_eq!(store.write_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_both_failed_uses_fallback_once() {
    let store = MockStore::new().with_read_delay(Duration::from_millis(20));
    let origin = MockOrigin::status(StatusCode::NOT_FOUND).with_delay(Duration::from_millis(10));
    let harness = Harness::new(store.clone(), origin);

    let (req, event) = request("/gone");
    let response = harness
        .strategies
        .dispatch(rule(), req, event, matching())
        .await;
    harness.settle().await;

    assert_eq!(
        harness.fallback.calls(),
        vec![(StatusCode::NOT_FOUND, "/gone".to_string())]
    );
    assert_eq!(response.body, "fallback page for /gone");
    assert_eq!(
        harness.trace.count("Race could not fetch nor find in store"),
        1
    );
    assert_eq!(store.write_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_both_failed_when_network_is_last() {
    let store = MockStore::new();
    let origin = MockOrigin::reject("dns failure").with_delay(Duration::from_millis(10));
    let harness = Harness::new(store, origin);

    let (req, event) = request("/gone");
    harness
        .strategies
        .dispatch(rule(), req, event, matching())
        .await;

    assert_eq!(
        harness.fallback.calls(),
        vec![(StatusCode::BAD_GATEWAY, "/gone".to_string())]
    );
}

#[tokio::test(start_paused = true)]
async fn test_store_read_error_then_network_failure_uses_fallback_once() {
    let store = MockStore::new().failing_reads();
    let origin = MockOrigin::status(StatusCode::SERVICE_UNAVAILABLE)
        .with_delay(Duration::from_millis(10));
    let harness = Harness::new(store.clone(), origin.clone());

    let (req, event) = request("/feed");
    let response = harness
        .strategies
        .dispatch(rule(), req, event, matching())
        .await;
    harness.settle().await;

    assert_eq!(origin.calls(), 1);
    assert_eq!(
        harness.fallback.calls(),
        vec![(StatusCode::SERVICE_UNAVAILABLE, "/feed".to_string())]
    );
    assert_eq!(response.body, "fallback page for /feed");
    assert_eq!(
        harness.trace.count("Race could not fetch nor find in store"),
        1
    );
    assert_eq!(harness.trace.count("Race resolved from store"), 0);
    assert_eq!(store.write_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_store_read_uses_raw_options() {
    let store = MockStore::new().with_entry("/feed", Response::ok("cached"));
    let origin = MockOrigin::status(StatusCode::OK).with_delay(Duration::from_millis(10));
    let harness = Harness::new(store.clone(), origin);

    let (req, event) = request("/feed");
    harness
        .strategies
        .dispatch(rule(), req, event, matching())
        .await;

    let options = store.read_options();
    assert_eq!(options.len(), 1);
    assert!(!options[0].populate_on_miss);
    assert!(!options[0].fallback_on_miss);
}

#[tokio::test(start_paused = true)]
async fn test_invocations_do_not_share_state() {
    let store = MockStore::new().with_read_delay(Duration::from_millis(5));
    let origin = MockOrigin::status(StatusCode::BAD_GATEWAY);
    let harness = Harness::new(store, origin);
    let race = harness.strategies.collaborators().clone();
    let race = fetchbox::Race::new(race);

    let (req, event) = request("/one");
    let first = race.race(rule(), req, event, matching());
    assert_eq!(*first.state(), RaceState::default());
    first.await;

    let (req, event) = request("/two");
    let second = race.race(rule(), req, event, matching());
    assert_eq!(*second.state(), RaceState::default());
    second.await;

    assert_eq!(harness.fallback.count(), 2);
}
