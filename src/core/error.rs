//! Errors raised by states, transitions and the engine.

use thiserror::Error;

/// Every violation the engine can report.
///
/// Ids and symbols are rendered with their `Debug` representation so the
/// error type stays independent of the engine's key types.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FsmError {
    #[error("The engine has no states")]
    EmptySetOfStates,

    #[error("The engine has no transitions")]
    EmptySetOfTransitions,

    #[error("No final state defined")]
    NoFinalState,

    #[error("Initial state not specified")]
    NoInitialState,

    #[error("Initial state {id} is not in the set of known states")]
    InitialStateNotInSetOfStates { id: String },

    #[error("State {id} is not reachable from the initial state")]
    UnreachableStateDetected { id: String },

    #[error("Missing transitions: expected {expected} ({states} states x {symbols} symbols), found {found}")]
    MissingTransitions {
        expected: usize,
        found: usize,
        states: usize,
        symbols: usize,
    },

    #[error("State {id} already exists")]
    DuplicateState { id: String },

    #[error("Transition {symbol} from {src} to {dst} already exists")]
    DuplicateTransition {
        symbol: String,
        src: String,
        dst: String,
    },

    #[error("Transition {symbol} from {src} to {dst} references an unknown state")]
    TransitionContainsUnknownState {
        symbol: String,
        src: String,
        dst: String,
    },

    #[error("State {src} already has a transition on symbol {symbol}")]
    StateCannotHaveSameSymbolTransitions { symbol: String, src: String },

    #[error("State {id} is the current state and cannot be modified")]
    CannotModifyStateThatIsCurrent { id: String },

    #[error("Only one dead state per FSM is allowed")]
    OnlyOneDeadStatePerFSMAllowed,

    #[error("Dead state {id} does not support an exit callback")]
    OnExitNotSupportedInDeadState { id: String },

    #[error("Dead state {id} must be installed with set_dead_state")]
    DeadStateAsRegular { id: String },

    #[error("State {id} is not a dead state")]
    NotADeadState { id: String },

    #[error("Transition source {id} cannot be a dead state")]
    SourceStateCannotBeDead { id: String },

    #[error("Transition destination {id} cannot be a dead state")]
    DestinationStateCannotBeDead { id: String },

    #[error("Unknown state {id}")]
    UnknownState { id: String },

    #[error("Unknown transition {symbol} from {src} to {dst}")]
    UnknownTransition {
        symbol: String,
        src: String,
        dst: String,
    },

    #[error("The engine changed since the last validation. Call validate() before step()")]
    ValidationRequired,

    #[error("Symbol {symbol} has no transition from state {state}")]
    UnknownSymbol { symbol: String, state: String },
}

pub(crate) fn render<T: std::fmt::Debug>(value: &T) -> String {
    format!("{value:?}")
}
