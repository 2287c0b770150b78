//! Session-renewal-aware request gateway for the Pantry API.
//!
//! This crate provides:
//! - A transport seam with a reqwest implementation (cookie-held session)
//! - Transparent renewal of an expired session for every outgoing request
//! - Single-flight renewal shared by any number of concurrent callers
//! - FIFO release of queued callers, each replayed at most once
//! - A one-shot session-loss signal for the hosting application
//! - Explicit FSM-based renewal state management

mod coordinator;
mod error;
mod gateway;
mod renewal_fsm;
mod request;
mod signal;
mod transport;
mod waiter_queue;

pub use coordinator::{CoordinatorStats, RenewalCoordinator};
pub use error::{GatewayError, GatewayResult, RenewalError, TransportError};
pub use gateway::{Gateway, GatewayConfig, DEFAULT_RENEWAL_PATH, DEFAULT_SIGN_IN_PATH};
pub use renewal_fsm::renewal_machine;
pub use renewal_fsm::{RenewalMachine, RenewalMachineInput, RenewalMachineState, RenewalState};
pub use request::{ApiRequest, ApiResponse, Method, SESSION_EXPIRED_STATUS};
pub use signal::{SessionLossCallback, SessionLossSignal};
pub use transport::{ReqwestTransport, Transport, TransportConfig, DEFAULT_REQUEST_TIMEOUT};
pub use waiter_queue::{RenewalOutcome, Waiter, WaiterQueue};
