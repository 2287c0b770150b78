//! Shared test support: a scripted in-memory backend.

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use session_gateway::{
    ApiRequest, ApiResponse, Gateway, GatewayConfig, Method, Transport, TransportError,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// How the scripted backend answers the renewal endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenewalBehavior {
    /// 200, and the session becomes valid.
    Succeed,
    /// 200, but the backend keeps rejecting the session afterwards.
    SucceedButStillExpired,
    /// Non-2xx status.
    Reject(u16),
    /// Connection failure.
    Unreachable,
}

/// In-memory backend that answers 401 until the session is renewed.
pub struct ScriptedBackend {
    session_valid: AtomicBool,
    renewal: Mutex<RenewalBehavior>,
    renewal_delay: Duration,
    renewal_calls: AtomicUsize,
    overrides: Mutex<HashMap<String, u16>>,
    offline_paths: Mutex<Vec<String>>,
    log: Mutex<Vec<(Method, String)>>,
}

impl ScriptedBackend {
    pub fn new(renewal: RenewalBehavior) -> Arc<Self> {
        Arc::new(Self {
            session_valid: AtomicBool::new(false),
            renewal: Mutex::new(renewal),
            renewal_delay: Duration::from_millis(20),
            renewal_calls: AtomicUsize::new(0),
            overrides: Mutex::new(HashMap::new()),
            offline_paths: Mutex::new(Vec::new()),
            log: Mutex::new(Vec::new()),
        })
    }

    pub fn with_valid_session(self: Arc<Self>) -> Arc<Self> {
        self.session_valid.store(true, Ordering::SeqCst);
        self
    }

    pub fn expire_session(&self) {
        self.session_valid.store(false, Ordering::SeqCst);
    }

    pub fn set_renewal(&self, behavior: RenewalBehavior) {
        *self.renewal.lock() = behavior;
    }

    /// Answer `path` with a fixed status regardless of the session.
    pub fn respond_with(&self, path: &str, status: u16) {
        self.overrides.lock().insert(path.to_string(), status);
    }

    /// Fail requests to `path` at the transport level.
    pub fn take_offline(&self, path: &str) {
        self.offline_paths.lock().push(path.to_string());
    }

    pub fn renewal_calls(&self) -> usize {
        self.renewal_calls.load(Ordering::SeqCst)
    }

    /// Paths of every request received, in arrival order.
    pub fn paths(&self) -> Vec<String> {
        self.log.lock().iter().map(|(_, path)| path.clone()).collect()
    }

    pub fn calls_to(&self, path: &str) -> usize {
        self.log.lock().iter().filter(|(_, p)| p == path).count()
    }
}

#[async_trait]
impl Transport for ScriptedBackend {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        self.log
            .lock()
            .push((request.method(), request.path().to_string()));

        if self.offline_paths.lock().iter().any(|p| p == request.path()) {
            return Err(TransportError::Connection("connection refused".to_string()));
        }

        if request.route() == "/auth/refresh" {
            self.renewal_calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.renewal_delay).await;

            let behavior = *self.renewal.lock();
            return match behavior {
                RenewalBehavior::Succeed => {
                    self.session_valid.store(true, Ordering::SeqCst);
                    Ok(ApiResponse::new(200))
                }
                RenewalBehavior::SucceedButStillExpired => Ok(ApiResponse::new(200)),
                RenewalBehavior::Reject(status) => Ok(ApiResponse::new(status)),
                RenewalBehavior::Unreachable => {
                    Err(TransportError::Connection("connection refused".to_string()))
                }
            };
        }

        if let Some(status) = self.overrides.lock().get(request.path()) {
            return Ok(ApiResponse::new(*status));
        }

        if self.session_valid.load(Ordering::SeqCst) {
            Ok(ApiResponse::new(200).with_body(request.path().to_string()))
        } else {
            Ok(ApiResponse::new(401))
        }
    }
}

/// Build a gateway over `backend` and count how often the session-loss listener fires.
pub fn gateway_over(backend: &Arc<ScriptedBackend>) -> (Gateway, Arc<AtomicUsize>) {
    let transport: Arc<dyn Transport> = backend.clone();
    let gateway = Gateway::new(transport, GatewayConfig::default());

    let navigations = Arc::new(AtomicUsize::new(0));
    let counter = navigations.clone();
    gateway.signal().set_listener(Arc::new(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    }));

    (gateway, navigations)
}
