//! Integration tests for session renewal through the gateway.
//!
//! These run on the current-thread runtime, so spawned requests start in
//! spawn order and their replays follow the order the coordinator releases them.

mod common;

use common::{gateway_over, RenewalBehavior, ScriptedBackend};
use session_gateway::{ApiRequest, GatewayError, RenewalState, TransportError};
use std::sync::atomic::Ordering;
use std::time::Duration;

#[tokio::test]
async fn test_three_expired_requests_share_one_renewal() {
    let backend = ScriptedBackend::new(RenewalBehavior::Succeed);
    let (gateway, navigations) = gateway_over(&backend);

    let mut handles = Vec::new();
    for path in ["/dishes", "/ingredients", "/grocery-lists"] {
        let gateway = gateway.clone();
        handles.push(tokio::spawn(async move {
            gateway.perform(ApiRequest::get(path)).await
        }));
    }

    let mut bodies = Vec::new();
    for handle in handles {
        let response = handle.await.unwrap().unwrap();
        assert_eq!(response.status(), 200);
        bodies.push(response.text());
    }

    assert_eq!(bodies, vec!["/dishes", "/ingredients", "/grocery-lists"]);
    assert_eq!(backend.renewal_calls(), 1);
    assert_eq!(
        backend.paths(),
        vec![
            "/dishes",
            "/ingredients",
            "/grocery-lists",
            "/auth/refresh",
            "/dishes",
            "/ingredients",
            "/grocery-lists",
        ]
    );
    assert_eq!(navigations.load(Ordering::SeqCst), 0);
    assert_eq!(gateway.coordinator().state(), RenewalState::Idle);
}

#[tokio::test]
async fn test_failed_renewal_rejects_everyone_and_signals_once() {
    let backend = ScriptedBackend::new(RenewalBehavior::Reject(401));
    let (gateway, navigations) = gateway_over(&backend);

    let mut handles = Vec::new();
    for path in ["/dishes", "/ingredients", "/grocery-lists"] {
        let gateway = gateway.clone();
        handles.push(tokio::spawn(async move {
            gateway.perform(ApiRequest::get(path)).await
        }));
    }

    for handle in handles {
        let result = handle.await.unwrap();
        assert!(matches!(result, Err(GatewayError::SessionLost)));
    }

    assert_eq!(backend.renewal_calls(), 1);
    // No replays after a failed renewal
    assert_eq!(backend.paths().len(), 4);
    assert_eq!(navigations.load(Ordering::SeqCst), 1);
    assert_eq!(gateway.signal().raised_count(), 1);
    assert_eq!(gateway.coordinator().stats().renewals_failed, 1);
}

#[tokio::test]
async fn test_unreachable_renewal_endpoint_is_terminal() {
    let backend = ScriptedBackend::new(RenewalBehavior::Unreachable);
    let (gateway, navigations) = gateway_over(&backend);

    let result = gateway.perform(ApiRequest::get("/dishes")).await;

    assert!(matches!(result, Err(GatewayError::SessionLost)));
    assert_eq!(navigations.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_second_expiry_after_replay_is_terminal() {
    let backend = ScriptedBackend::new(RenewalBehavior::SucceedButStillExpired);
    let (gateway, navigations) = gateway_over(&backend);

    let result = gateway.perform(ApiRequest::get("/dishes")).await;

    assert!(matches!(result, Err(GatewayError::SessionLost)));
    assert_eq!(backend.renewal_calls(), 1);
    assert_eq!(backend.calls_to("/dishes"), 2);
    assert_eq!(gateway.coordinator().stats().renewals_started, 1);
    assert_eq!(navigations.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_renewal_endpoint_never_triggers_renewal() {
    let backend = ScriptedBackend::new(RenewalBehavior::Reject(401));
    let (gateway, navigations) = gateway_over(&backend);

    let result = gateway.perform(ApiRequest::post("/auth/refresh")).await;

    assert!(matches!(result, Err(GatewayError::SessionLost)));
    assert_eq!(backend.renewal_calls(), 1);
    assert_eq!(gateway.coordinator().stats().renewals_started, 0);
    assert_eq!(gateway.coordinator().stats().waiters_enrolled, 0);
    assert_eq!(navigations.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_renewal_endpoint_without_leading_slash_never_triggers_renewal() {
    let backend = ScriptedBackend::new(RenewalBehavior::Reject(401));
    let (gateway, navigations) = gateway_over(&backend);

    let result = gateway.perform(ApiRequest::post("auth/refresh")).await;

    assert!(matches!(result, Err(GatewayError::SessionLost)));
    assert_eq!(backend.renewal_calls(), 1);
    assert_eq!(gateway.coordinator().stats().renewals_started, 0);
    assert_eq!(gateway.coordinator().stats().waiters_enrolled, 0);
    assert_eq!(navigations.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_direct_renewal_call_succeeds_without_coordination() {
    let backend = ScriptedBackend::new(RenewalBehavior::Succeed);
    let (gateway, _) = gateway_over(&backend);

    let response = gateway
        .perform(ApiRequest::post("/auth/refresh"))
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(gateway.coordinator().stats().renewals_started, 0);
}

#[tokio::test]
async fn test_non_auth_errors_are_returned_unchanged() {
    let backend = ScriptedBackend::new(RenewalBehavior::Succeed).with_valid_session();
    backend.respond_with("/dishes/99", 404);
    backend.respond_with("/cart", 500);
    let (gateway, _) = gateway_over(&backend);

    let missing = gateway.perform(ApiRequest::get("/dishes/99")).await.unwrap();
    let broken = gateway.perform(ApiRequest::get("/cart")).await.unwrap();

    assert_eq!(missing.status(), 404);
    assert_eq!(broken.status(), 500);
    assert_eq!(backend.renewal_calls(), 0);
}

#[tokio::test]
async fn test_transport_errors_pass_through() {
    let backend = ScriptedBackend::new(RenewalBehavior::Succeed);
    backend.take_offline("/dishes");
    let (gateway, navigations) = gateway_over(&backend);

    let result = gateway.perform(ApiRequest::get("/dishes")).await;

    assert!(matches!(
        result,
        Err(GatewayError::Transport(TransportError::Connection(_)))
    ));
    assert_eq!(backend.renewal_calls(), 0);
    assert_eq!(navigations.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_later_expiry_opens_a_new_episode() {
    let backend = ScriptedBackend::new(RenewalBehavior::Succeed);
    let (gateway, _) = gateway_over(&backend);

    gateway.perform(ApiRequest::get("/dishes")).await.unwrap();
    backend.expire_session();
    gateway.perform(ApiRequest::get("/dishes")).await.unwrap();

    assert_eq!(backend.renewal_calls(), 2);
    assert_eq!(gateway.coordinator().stats().renewals_started, 2);
    assert_eq!(gateway.coordinator().stats().renewals_succeeded, 2);
}

#[tokio::test]
async fn test_signal_rearms_after_session_is_restored() {
    let backend = ScriptedBackend::new(RenewalBehavior::Reject(403));
    let (gateway, navigations) = gateway_over(&backend);

    assert!(gateway.perform(ApiRequest::get("/dishes")).await.is_err());
    assert_eq!(navigations.load(Ordering::SeqCst), 1);

    // Still lost: no second navigation
    assert!(gateway.perform(ApiRequest::get("/dishes")).await.is_err());
    assert_eq!(navigations.load(Ordering::SeqCst), 1);

    backend.set_renewal(RenewalBehavior::Succeed);
    gateway.perform(ApiRequest::get("/dishes")).await.unwrap();
    assert!(!gateway.signal().is_raised());

    backend.expire_session();
    backend.set_renewal(RenewalBehavior::Reject(403));
    assert!(gateway.perform(ApiRequest::get("/dishes")).await.is_err());
    assert_eq!(navigations.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_many_concurrent_requests_single_renewal() {
    let backend = ScriptedBackend::new(RenewalBehavior::Succeed);
    let (gateway, _) = gateway_over(&backend);

    let mut handles = Vec::new();
    for id in 0..25 {
        let gateway = gateway.clone();
        handles.push(tokio::spawn(async move {
            gateway.perform(ApiRequest::get(format!("/dishes/{}", id))).await
        }));
    }

    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap().status(), 200);
    }

    assert_eq!(backend.renewal_calls(), 1);
    assert_eq!(gateway.coordinator().stats().waiters_enrolled, 25);
    // Each request is sent once, then replayed once
    assert_eq!(backend.paths().len(), 25 * 2 + 1);
}

#[tokio::test]
async fn test_request_expiring_mid_renewal_joins_the_episode() {
    let backend = ScriptedBackend::new(RenewalBehavior::Succeed);
    let (gateway, _) = gateway_over(&backend);

    let first = {
        let gateway = gateway.clone();
        tokio::spawn(async move { gateway.perform(ApiRequest::get("/dishes")).await })
    };

    // Let the first request start the renewal, then expire a second one
    tokio::time::sleep(Duration::from_millis(5)).await;
    assert_eq!(gateway.coordinator().state(), RenewalState::Renewing);

    let second = gateway.perform(ApiRequest::get("/ingredients")).await;

    assert_eq!(second.unwrap().status(), 200);
    assert_eq!(first.await.unwrap().unwrap().status(), 200);
    assert_eq!(backend.renewal_calls(), 1);
}

#[tokio::test]
async fn test_explicit_refresh_session() {
    let backend = ScriptedBackend::new(RenewalBehavior::Succeed);
    let (gateway, _) = gateway_over(&backend);

    gateway.refresh_session().await.unwrap();
    assert_eq!(backend.renewal_calls(), 1);

    // Session is now valid, no further renewal needed
    gateway.perform(ApiRequest::get("/dishes")).await.unwrap();
    assert_eq!(backend.renewal_calls(), 1);
}

#[tokio::test]
async fn test_explicit_refresh_failure_signals_session_loss() {
    let backend = ScriptedBackend::new(RenewalBehavior::Reject(401));
    let (gateway, navigations) = gateway_over(&backend);

    let result = gateway.refresh_session().await;

    assert!(matches!(result, Err(GatewayError::SessionLost)));
    assert_eq!(navigations.load(Ordering::SeqCst), 1);
}
