//! HTTP-level tests for the reqwest transport and the gateway running on it.

use serde_json::json;
use session_gateway::{
    ApiRequest, Gateway, GatewayConfig, GatewayError, ReqwestTransport, Transport,
    TransportConfig,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use url::Url;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

/// Answers 401 for the first `expired_for` calls, then 200.
struct ExpiredUntilRenewed {
    calls: AtomicUsize,
    expired_for: usize,
}

impl Respond for ExpiredUntilRenewed {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.expired_for {
            ResponseTemplate::new(401)
        } else {
            ResponseTemplate::new(200).set_body_json(json!([{"id": 1, "name": "Hutspot"}]))
        }
    }
}

fn transport_for(server: &MockServer) -> Arc<ReqwestTransport> {
    let base = Url::parse(&format!("{}/api", server.uri())).unwrap();
    Arc::new(ReqwestTransport::new(TransportConfig::new(base)).unwrap())
}

#[tokio::test]
async fn test_sends_json_body_with_default_content_type() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"email": "cook@example.com", "password": "pw"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 7})))
        .expect(1)
        .mount(&server)
        .await;

    let transport = transport_for(&server);
    let request = ApiRequest::post("/auth/login")
        .json(&json!({"email": "cook@example.com", "password": "pw"}))
        .unwrap();

    let response = transport.send(&request).await.unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.json::<serde_json::Value>().unwrap()["id"], 7);
}

#[tokio::test]
async fn test_non_success_status_is_a_response_not_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/dishes/404"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .mount(&server)
        .await;

    let transport = transport_for(&server);
    let response = transport.send(&ApiRequest::get("/dishes/404")).await.unwrap();

    assert_eq!(response.status(), 404);
    assert_eq!(response.text(), "not found");
}

#[tokio::test]
async fn test_query_string_is_forwarded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/auth/reset-password"))
        .and(query_param("token", "abc"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let transport = transport_for(&server);
    let response = transport
        .send(&ApiRequest::get("/auth/reset-password?token=abc"))
        .await
        .unwrap();

    assert_eq!(response.status(), 204);
}

#[tokio::test]
async fn test_gateway_renews_and_replays_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/dishes"))
        .respond_with(ExpiredUntilRenewed {
            calls: AtomicUsize::new(0),
            expired_for: 1,
        })
        .expect(2)
        .mount(&server)
        .await;

    let gateway = Gateway::new(transport_for(&server), GatewayConfig::default());
    let response = gateway.perform(ApiRequest::get("/dishes")).await.unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(response.json::<serde_json::Value>().unwrap()[0]["name"], "Hutspot");
}

#[tokio::test]
async fn test_gateway_gives_up_when_refresh_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/dishes"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = Gateway::new(transport_for(&server), GatewayConfig::default());
    let result = gateway.perform(ApiRequest::get("/dishes")).await;

    assert!(matches!(result, Err(GatewayError::SessionLost)));
    assert!(gateway.signal().is_raised());
}

#[tokio::test]
async fn test_unreachable_backend_is_a_transport_error() {
    // Nothing listens on the reserved discard port
    let base = Url::parse("http://127.0.0.1:9/api").unwrap();
    let transport = Arc::new(ReqwestTransport::new(TransportConfig::new(base)).unwrap());
    let gateway = Gateway::new(transport, GatewayConfig::default());

    let result = gateway.perform(ApiRequest::get("/dishes")).await;

    assert!(matches!(result, Err(GatewayError::Transport(_))));
    assert!(!gateway.signal().is_raised());
}
