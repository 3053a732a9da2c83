use super::*;
use crate::api::test_support::{ManualClock, MockTransport, client_with, slow_client_with};
use reqwest::Method;
use serde_json::json;

const TTL: Duration = Duration::from_millis(500);

fn opts() -> FetchOptions {
    FetchOptions::new().ttl(TTL)
}

fn clocked(mock: &Arc<MockTransport>) -> (HelpToolClient, ManualClock) {
    let clock = ManualClock::new();
    let client = client_with(mock).with_clock(clock.source());
    (client, clock)
}

// =========================================================================
// fetch_json: caching
// =========================================================================

#[tokio::test]
async fn second_fetch_within_ttl_hits_cache() {
    let mock = MockTransport::new();
    mock.respond(Method::GET, "/api/tools", 200, json!([{ "id": 1 }]));
    let (client, clock) = clocked(&mock);

    let first = client.fetch_json("/api/tools", &opts()).await.unwrap();
    clock.advance(Duration::from_millis(499));
    let second = client.fetch_json("/api/tools", &opts()).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(mock.call_count(Method::GET, "/api/tools"), 1);
}

#[tokio::test]
async fn fetch_after_ttl_goes_to_network() {
    let mock = MockTransport::new();
    mock.respond(Method::GET, "/api/tools", 200, json!([]));
    let (client, clock) = clocked(&mock);

    client.fetch_json("/api/tools", &opts()).await.unwrap();
    clock.advance(TTL);
    client.fetch_json("/api/tools", &opts()).await.unwrap();

    assert_eq!(mock.call_count(Method::GET, "/api/tools"), 2);
}

#[tokio::test]
async fn bust_always_goes_to_network() {
    let mock = MockTransport::new();
    mock.respond(Method::GET, "/api/system/info", 200, json!({ "version": "1.0.0" }));
    let (client, _clock) = clocked(&mock);
    let busting = opts().bust(true);

    for _ in 0..3 {
        client.fetch_json("/api/system/info", &busting).await.unwrap();
    }
    assert_eq!(mock.call_count(Method::GET, "/api/system/info"), 3);
}

#[tokio::test]
async fn bust_refreshes_the_stored_value() {
    let mock = MockTransport::new();
    mock.respond_once_raw(Method::GET, "/api/tools", 200, "[1]");
    mock.respond_once_raw(Method::GET, "/api/tools", 200, "[2]");
    let (client, _clock) = clocked(&mock);

    client.fetch_json("/api/tools", &opts()).await.unwrap();
    let busted = client.fetch_json("/api/tools", &opts().bust(true)).await.unwrap();
    let cached = client.fetch_json("/api/tools", &opts()).await.unwrap();

    assert_eq!(busted, Some(json!([2])));
    assert_eq!(cached, Some(json!([2])));
    assert_eq!(mock.call_count(Method::GET, "/api/tools"), 2);
}

#[tokio::test]
async fn slow_response_is_stamped_when_it_arrives() {
    let mock = MockTransport::new();
    mock.respond(Method::GET, "/api/tools", 200, json!([{ "id": 1 }]));
    let clock = ManualClock::new();
    let started = clock.now();
    let client = slow_client_with(&mock, &clock, Duration::from_millis(400));

    client.fetch_json("/api/tools", &opts()).await.unwrap();
    assert_eq!(clock.now(), started + Duration::from_millis(400));

    // 800ms after the request started, 400ms after it finished.
    clock.advance(Duration::from_millis(400));
    client.fetch_json("/api/tools", &opts()).await.unwrap();
    assert_eq!(mock.call_count(Method::GET, "/api/tools"), 1);

    // TTL measured from arrival runs out at 900ms.
    clock.advance(Duration::from_millis(100));
    client.fetch_json("/api/tools", &opts()).await.unwrap();
    assert_eq!(mock.call_count(Method::GET, "/api/tools"), 2);
}

#[tokio::test]
async fn request_slower_than_ttl_still_caches() {
    let mock = MockTransport::new();
    mock.respond(Method::GET, "/api/printers", 200, json!(["HP"]));
    let clock = ManualClock::new();
    let client = slow_client_with(&mock, &clock, TTL * 2);

    client.fetch_json("/api/printers", &opts()).await.unwrap();
    let hit = client.cache().get_at("/api/printers", clock.now());
    assert_eq!(hit, Some(json!(["HP"])));

    client.fetch_json("/api/printers", &opts()).await.unwrap();
    assert_eq!(mock.call_count(Method::GET, "/api/printers"), 1);
}

#[tokio::test]
async fn cache_key_defaults_to_path() {
    let mock = MockTransport::new();
    mock.respond(Method::GET, "/api/printers", 200, json!(["HP"]));
    let client = client_with(&mock);

    client.fetch_json("/api/printers", &opts()).await.unwrap();
    assert_eq!(client.cache().get("/api/printers"), Some(json!(["HP"])));
}

#[tokio::test]
async fn shared_cache_key_serves_other_path() {
    let mock = MockTransport::new();
    mock.respond(Method::GET, "/api/network/devices", 200, json!([{ "id": "10.0.0.1" }]));
    let (client, _clock) = clocked(&mock);
    let keyed = opts().cache_key("network-devices");

    client.fetch_json("/api/network/devices", &keyed).await.unwrap();
    let hit = client.fetch_json("/elsewhere", &keyed).await.unwrap();

    assert_eq!(hit, Some(json!([{ "id": "10.0.0.1" }])));
    assert_eq!(mock.calls().len(), 1);
}

#[tokio::test]
async fn default_ttl_is_client_fast_ttl() {
    let mock = MockTransport::new();
    mock.respond(Method::GET, "/api/tools", 200, json!([]));
    let (client, clock) = clocked(&mock);
    let client = client.with_ttls(Duration::from_millis(50), Duration::from_secs(1));

    client.fetch_json("/api/tools", &FetchOptions::new()).await.unwrap();
    clock.advance(Duration::from_millis(60));
    client.fetch_json("/api/tools", &FetchOptions::new()).await.unwrap();
    assert_eq!(mock.call_count(Method::GET, "/api/tools"), 2);
}

#[tokio::test]
async fn clear_cache_forces_refetch() {
    let mock = MockTransport::new();
    mock.respond(Method::GET, "/api/tools", 200, json!([]));
    let (client, _clock) = clocked(&mock);

    client.fetch_json("/api/tools", &opts()).await.unwrap();
    client.clear_cache(Some("/api/tools"));
    client.fetch_json("/api/tools", &opts()).await.unwrap();
    assert_eq!(mock.call_count(Method::GET, "/api/tools"), 2);
}

// =========================================================================
// fetch_json: failures
// =========================================================================

#[tokio::test]
async fn http_error_propagates_without_allow_error() {
    let mock = MockTransport::new();
    mock.respond(Method::GET, "/api/tools", 500, json!({ "error": "Interner Server-Fehler" }));
    let client = client_with(&mock);

    let err = client.fetch_json("/api/tools", &opts()).await.unwrap_err();
    assert_eq!(err.status(), Some(500));
    assert!(err.to_string().contains("Interner Server-Fehler"));
}

#[tokio::test]
async fn http_error_is_none_with_allow_error() {
    let mock = MockTransport::new();
    mock.respond(Method::GET, "/api/tools", 503, json!({}));
    let client = client_with(&mock);

    let value = client
        .fetch_json("/api/tools", &opts().allow_error(true))
        .await
        .unwrap();
    assert!(value.is_none());
    assert!(client.cache().is_empty());
}

#[tokio::test]
async fn transport_error_respects_allow_error() {
    let mock = MockTransport::new();
    mock.fail(Method::GET, "/api/tools");
    let client = client_with(&mock);

    assert!(matches!(
        client.fetch_json("/api/tools", &opts()).await,
        Err(ApiError::Request(_))
    ));
    assert!(client
        .fetch_json("/api/tools", &opts().allow_error(true))
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn malformed_json_is_parse_error() {
    let mock = MockTransport::new();
    mock.respond_once_raw(Method::GET, "/api/tools", 200, "<html>");
    let client = client_with(&mock);

    assert!(matches!(
        client.fetch_json("/api/tools", &opts()).await,
        Err(ApiError::Parse(_))
    ));
}

#[tokio::test]
async fn failed_refresh_does_not_poison_cache() {
    let mock = MockTransport::new();
    mock.respond_once_raw(Method::GET, "/api/tools", 200, "[1]");
    mock.respond_once_raw(Method::GET, "/api/tools", 500, "");
    let (client, _clock) = clocked(&mock);

    client.fetch_json("/api/tools", &opts()).await.unwrap();
    let refreshed = client
        .fetch_json("/api/tools", &opts().bust(true).allow_error(true))
        .await
        .unwrap();
    assert!(refreshed.is_none());

    let cached = client.fetch_json("/api/tools", &opts()).await.unwrap();
    assert_eq!(cached, Some(json!([1])));
}

// =========================================================================
// helpers
// =========================================================================

#[test]
fn error_message_prefers_error_field() {
    assert_eq!(error_message(r#"{"error":"Tool nicht gefunden"}"#), "Tool nicht gefunden");
    assert_eq!(error_message(r#"{"message":"nope"}"#), "nope");
    assert_eq!(error_message(""), "empty response");
    assert_eq!(error_message("Bad Gateway"), "Bad Gateway");
}

#[test]
fn decode_record_unwraps_envelope() {
    let tool: crate::api::types::Tool =
        decode_record(json!({ "success": true, "tool": { "id": 7, "name": "RDP" } }), "tool").unwrap();
    assert_eq!(tool.id, Some(7));

    let bare: crate::api::types::Tool = decode_record(json!({ "id": 8 }), "tool").unwrap();
    assert_eq!(bare.id, Some(8));
}

#[tokio::test]
async fn empty_body_reads_as_null() {
    let mock = MockTransport::new();
    mock.respond_once_raw(Method::DELETE, "/api/tickets/1", 204, "");
    let client = client_with(&mock);

    let value = client.delete("/api/tickets/1").await.unwrap();
    assert_eq!(value, Value::Null);
}
