//! The execution engine.
//!
//! An [`Engine`] owns states, transitions, the derived alphabet and a routing
//! index. It moves between two lifecycle states:
//!
//! - **Dirty**: the structure changed since the last successful validation.
//!   Stepping is refused with [`FsmError::ValidationRequired`](crate::core::FsmError).
//! - **Clean**: [`Engine::validate`] succeeded; [`Engine::step`] is allowed.
//!
//! Everything runs synchronously on the caller's thread, callbacks included.

mod config;
mod index;
mod lifecycle;
mod machine;
mod validate;

pub use config::EngineConfig;
pub use index::Route;
pub use lifecycle::Lifecycle;
pub use machine::{Engine, StepResult};
