//! Wire-level tests for `TradeSession` against a local mock trade endpoint.
//!
//! Each test mounts the endpoint responses it needs on a `wiremock` server and
//! checks both the form fields sent and the interpretation of the reply.

use itemtrade_models::{ForeignInventory, SessionConfig};
use itemtrade_session::{SessionCredentials, SessionError, TradeApi, TradeCursor, TradeSession};
use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const COUNTERPART: u64 = 76561198000000002;

fn session_for(server: &MockServer) -> TradeSession {
    let config = SessionConfig {
        base_url: format!("{}/trade", server.uri()),
        cookie_domain: "localhost".to_string(),
        request_timeout_seconds: 5,
        ..SessionConfig::default()
    };
    let credentials = SessionCredentials {
        session_id: "c2Vzc2lvbg%3D%3D".to_string(),
        login_token: "login-token".to_string(),
    };
    TradeSession::new(&config, &credentials, COUNTERPART).unwrap()
}

fn endpoint(name: &str) -> String {
    format!("/trade/{COUNTERPART}/{name}")
}

#[tokio::test]
async fn fetch_status_posts_cursor_and_parses_events() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(endpoint("tradestatus")))
        .and(body_string_contains("sessionid=c2Vzc2lvbg%3D%3D"))
        .and(body_string_contains("logpos=3"))
        .and(body_string_contains("version=2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "trade_status": 0,
            "newversion": false,
            "version": "2",
            "logpos": 4,
            "events": {"3": {"steamid": "76561198000000002", "action": "0",
                             "timestamp": 1400000000, "appid": 440,
                             "contextid": "2", "assetid": "111"}}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = session_for(&server);
    session.set_cursor(TradeCursor::new(2, 3));

    let status = session.fetch_status().await.unwrap();
    assert_eq!(status.version, 2);
    assert_eq!(status.log_pos, 4);
    assert_eq!(status.events.len(), 1);
    assert_eq!(status.events[0].asset_id, 111);
}

#[tokio::test]
async fn add_item_sends_item_form_and_reads_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(endpoint("additem")))
        .and(body_string_contains("appid=440"))
        .and(body_string_contains("contextid=2"))
        .and(body_string_contains("itemid=555"))
        .and(body_string_contains("slot=0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    let session = session_for(&server);
    assert!(session.add_item(555, 0).await.unwrap());
}

#[tokio::test]
async fn string_false_success_is_a_rejection_not_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(endpoint("toggleready")))
        .and(body_string_contains("ready=true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": "false"})))
        .mount(&server)
        .await;

    let session = session_for(&server);
    assert!(!session.set_ready(true).await.unwrap());
}

#[tokio::test]
async fn chat_and_confirm_carry_version() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(endpoint("chat")))
        .and(body_string_contains("message=hello+there"))
        .and(body_string_contains("version=5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(endpoint("confirm")))
        .and(body_string_contains("version=5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": "true"})))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = session_for(&server);
    session.set_cursor(TradeCursor::new(5, 0));
    assert!(session.send_message("hello there").await.unwrap());
    assert!(session.accept_trade().await.unwrap());
}

#[tokio::test]
async fn server_error_is_a_transport_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(endpoint("cancel")))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let session = session_for(&server);
    let err = session.cancel_trade().await.unwrap_err();
    assert!(err.is_transport());
    match err {
        SessionError::Http { status, body } => {
            assert_eq!(status, 502);
            assert_eq!(body, "bad gateway");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn unparseable_status_is_a_protocol_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(endpoint("tradestatus")))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
        .mount(&server)
        .await;

    let session = session_for(&server);
    let err = session.fetch_status().await.unwrap_err();
    assert!(err.is_protocol());
    assert!(!err.is_transport());
}

#[tokio::test]
async fn foreign_inventory_resolves_def_index() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(endpoint("foreigninventory")))
        .and(body_string_contains(format!("steamid={COUNTERPART}")))
        .and(body_string_contains("contextid=6"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "rgInventory": {"900": {"id": "900", "classid": "7", "instanceid": "0"}},
            "rgDescriptions": {"7_0": {"app_data": {"def_index": "5021"}}}
        })))
        .mount(&server)
        .await;

    let session = session_for(&server);
    let inventory = session.fetch_foreign_inventory(COUNTERPART, 6).await;
    assert_eq!(inventory.def_index(900), Some(5021));
}

#[tokio::test]
async fn foreign_inventory_failures_collapse_to_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(endpoint("foreigninventory")))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let session = session_for(&server);
    assert_eq!(
        session.fetch_foreign_inventory(COUNTERPART, 2).await,
        ForeignInventory::Unavailable
    );
}

#[tokio::test]
async fn foreign_inventory_success_false_is_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(endpoint("foreigninventory")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": "false"})))
        .mount(&server)
        .await;

    let session = session_for(&server);
    assert_eq!(
        session.fetch_foreign_inventory(COUNTERPART, 2).await,
        ForeignInventory::Unavailable
    );
}
