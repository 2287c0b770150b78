//! Session-renewal-aware request gateway.
//!
//! Every API call goes through [`Gateway::perform`]. A 401 response is never
//! handed to the caller: the request is parked on the renewal coordinator,
//! replayed once the shared renewal succeeds, and turned into
//! [`GatewayError::SessionLost`] when renewal is impossible.

use crate::coordinator::RenewalCoordinator;
use crate::request::normalize_route;
use crate::signal::SessionLossSignal;
use crate::waiter_queue::RenewalOutcome;
use crate::{ApiRequest, ApiResponse, GatewayError, GatewayResult, RenewalError, Transport};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Default renewal endpoint.
pub const DEFAULT_RENEWAL_PATH: &str = "/auth/refresh";

/// Default sign-in entry point handed to the session-loss listener.
pub const DEFAULT_SIGN_IN_PATH: &str = "/auth/login";

/// Gateway configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    /// Path of the renewal endpoint, relative to the API base.
    pub renewal_path: String,
    /// Where the hosting application should send the user after a session loss.
    pub sign_in_path: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            renewal_path: DEFAULT_RENEWAL_PATH.to_string(),
            sign_in_path: DEFAULT_SIGN_IN_PATH.to_string(),
        }
    }
}

struct GatewayInner {
    transport: Arc<dyn Transport>,
    coordinator: RenewalCoordinator,
    signal: SessionLossSignal,
    config: GatewayConfig,
}

/// Public entry point for all API calls. Cheap to clone.
#[derive(Clone)]
pub struct Gateway {
    inner: Arc<GatewayInner>,
}

impl Gateway {
    pub fn new(transport: Arc<dyn Transport>, config: GatewayConfig) -> Self {
        Self {
            inner: Arc::new(GatewayInner {
                transport,
                coordinator: RenewalCoordinator::new(),
                signal: SessionLossSignal::new(),
                config,
            }),
        }
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.inner.config
    }

    pub fn coordinator(&self) -> &RenewalCoordinator {
        &self.inner.coordinator
    }

    pub fn signal(&self) -> &SessionLossSignal {
        &self.inner.signal
    }

    /// Whether `request` targets the renewal endpoint itself.
    pub fn is_renewal_request(&self, request: &ApiRequest) -> bool {
        request.route() == normalize_route(&self.inner.config.renewal_path)
    }

    /// Perform a request, renewing the session transparently on expiry.
    ///
    /// Returns the backend's response for anything but a 401, including
    /// non-auth errors. Fails with [`GatewayError::SessionLost`] when the
    /// session cannot be renewed, or when a request that was already replayed
    /// once is rejected again.
    pub async fn perform(&self, mut request: ApiRequest) -> GatewayResult<ApiResponse> {
        // The renewal endpoint never triggers renewal of its own.
        if self.is_renewal_request(&request) {
            return self
                .send_renewal(&request)
                .await
                .map_err(|e| self.session_lost(&request, &e));
        }

        loop {
            let response = self.inner.transport.send(&request).await?;

            if !response.is_session_expired() {
                return Ok(response);
            }

            if request.is_retry() {
                warn!(
                    method = %request.method(),
                    path = %request.path(),
                    "Session expired again after renewal"
                );
                self.inner.signal.raise();
                return Err(GatewayError::SessionLost);
            }

            request.mark_retry();
            debug!(
                method = %request.method(),
                path = %request.path(),
                "Session expired, waiting for renewal"
            );

            if let Err(e) = self.await_coordinated_renewal().await {
                return Err(self.session_lost(&request, &e));
            }

            debug!(
                method = %request.method(),
                path = %request.path(),
                "Replaying request after renewal"
            );
        }
    }

    /// Renew the session now, joining a renewal already in flight.
    pub async fn refresh_session(&self) -> GatewayResult<()> {
        self.await_coordinated_renewal().await.map_err(|e| {
            warn!(error = %e, "Explicit session refresh failed");
            self.inner.signal.raise();
            GatewayError::SessionLost
        })
    }

    async fn await_coordinated_renewal(&self) -> RenewalOutcome {
        let gateway = self.clone();
        self.inner
            .coordinator
            .await_renewal(move || async move { gateway.renew().await })
            .await
    }

    /// One renewal call on behalf of the coordinator.
    async fn renew(&self) -> RenewalOutcome {
        let request = ApiRequest::post(self.inner.config.renewal_path.clone());
        match self.send_renewal(&request).await {
            Ok(_) => Ok(()),
            Err(e) => {
                self.inner.signal.raise();
                Err(e)
            }
        }
    }

    /// Send a request to the renewal endpoint. Any failure is terminal.
    async fn send_renewal(&self, request: &ApiRequest) -> Result<ApiResponse, RenewalError> {
        let response = self
            .inner
            .transport
            .send(request)
            .await
            .map_err(|e| RenewalError::Transport(e.to_string()))?;

        if !response.is_success() {
            return Err(RenewalError::Rejected {
                status: response.status(),
            });
        }

        info!(status = response.status(), "Renewal endpoint accepted session");
        self.inner.signal.reset();
        Ok(response)
    }

    fn session_lost(&self, request: &ApiRequest, cause: &RenewalError) -> GatewayError {
        warn!(
            method = %request.method(),
            path = %request.path(),
            error = %cause,
            "Session could not be renewed"
        );
        self.inner.signal.raise();
        GatewayError::SessionLost
    }
}
