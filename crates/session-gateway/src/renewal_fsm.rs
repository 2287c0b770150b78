//! Renewal state machine using rust-fsm.
//!
//! ## State Diagram
//!
//! ```text
//! ┌─────────────────┐   RenewalStarted    ┌─────────────────┐
//! │      Idle       │ ──────────────────► │    Renewing     │
//! │   (initial)     │ ◄────────────────── │                 │
//! └─────────────────┘  RenewalSucceeded / └─────────────────┘
//!                      RenewalFailed
//! ```
//!
//! There is no terminal state: the machine cycles for the life of the
//! process. `RenewalStarted` is only accepted from `Idle`, so a second
//! renewal can never begin while one is outstanding.

use rust_fsm::*;
use serde::{Deserialize, Serialize};

state_machine! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub renewal_machine(Idle)

    Idle => {
        RenewalStarted => Renewing
    },
    Renewing => {
        RenewalSucceeded => Idle,
        RenewalFailed => Idle
    }
}

pub use renewal_machine::Input as RenewalMachineInput;
pub use renewal_machine::State as RenewalMachineState;
pub use renewal_machine::StateMachine as RenewalMachine;

/// Public view of the renewal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenewalState {
    /// No renewal outstanding.
    Idle,
    /// One renewal call is in flight; expired callers queue behind it.
    Renewing,
}

impl From<&RenewalMachineState> for RenewalState {
    fn from(state: &RenewalMachineState) -> Self {
        match state {
            RenewalMachineState::Idle => RenewalState::Idle,
            RenewalMachineState::Renewing => RenewalState::Renewing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state_is_idle() {
        let machine = RenewalMachine::new();
        assert_eq!(*machine.state(), RenewalMachineState::Idle);
    }

    #[test]
    fn test_successful_cycle() {
        let mut machine = RenewalMachine::new();

        machine.consume(&RenewalMachineInput::RenewalStarted).unwrap();
        assert_eq!(*machine.state(), RenewalMachineState::Renewing);

        machine
            .consume(&RenewalMachineInput::RenewalSucceeded)
            .unwrap();
        assert_eq!(*machine.state(), RenewalMachineState::Idle);
    }

    #[test]
    fn test_failed_cycle_returns_to_idle() {
        let mut machine = RenewalMachine::new();

        machine.consume(&RenewalMachineInput::RenewalStarted).unwrap();
        machine.consume(&RenewalMachineInput::RenewalFailed).unwrap();
        assert_eq!(*machine.state(), RenewalMachineState::Idle);

        // Cycles again
        machine.consume(&RenewalMachineInput::RenewalStarted).unwrap();
        assert_eq!(*machine.state(), RenewalMachineState::Renewing);
    }

    #[test]
    fn test_cannot_start_twice() {
        let mut machine = RenewalMachine::new();

        machine.consume(&RenewalMachineInput::RenewalStarted).unwrap();
        let result = machine.consume(&RenewalMachineInput::RenewalStarted);
        assert!(result.is_err());
        assert_eq!(*machine.state(), RenewalMachineState::Renewing);
    }

    #[test]
    fn test_cannot_complete_while_idle() {
        let mut machine = RenewalMachine::new();

        assert!(machine
            .consume(&RenewalMachineInput::RenewalSucceeded)
            .is_err());
        assert!(machine.consume(&RenewalMachineInput::RenewalFailed).is_err());
    }

    #[test]
    fn test_renewal_state_conversion() {
        assert_eq!(
            RenewalState::from(&RenewalMachineState::Idle),
            RenewalState::Idle
        );
        assert_eq!(
            RenewalState::from(&RenewalMachineState::Renewing),
            RenewalState::Renewing
        );
    }
}
