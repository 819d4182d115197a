//! Core building blocks of a state machine.
//!
//! - `State`: a node with a final flag and lifecycle callbacks, or the dead state
//! - `Transition`: a symbol-labelled edge between two regular states
//! - `Callback`: a shared hook fired during a step
//! - `StepHistory`: the record of executed steps
//! - `FsmError`: every violation the engine reports

mod callback;
mod error;
mod history;
mod key;
mod state;
mod transition;

pub use callback::Callback;
pub(crate) use callback::fire;
pub(crate) use error::render;
pub use error::FsmError;
pub use history::{StepHistory, StepRecord};
pub use key::Key;
pub use state::{State, StateKind};
pub use transition::Transition;
