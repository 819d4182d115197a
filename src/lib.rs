//! fsmkit: a deterministic finite state machine engine
//!
//! States are connected by symbol-labelled transitions. Each state may carry
//! enter, exit, loop-enter and loop-exit callbacks, each transition a callback
//! of its own. An optional dead state absorbs every input that has no
//! declared transition.
//!
//! # Core Concepts
//!
//! - **State**: an id, a final flag and lifecycle callbacks; the dead state is a tagged variant
//! - **Transition**: `(symbol, source, destination)` plus an optional callback
//! - **Engine**: owns the graph, validates it and executes one symbol per step
//! - **Lifecycle**: any structural change makes the engine dirty until it validates again
//!
//! # Example
//!
//! ```rust
//! use fsmkit::core::{State, Transition};
//! use fsmkit::engine::Engine;
//!
//! let q0: State<String> = State::new("q0", false);
//! let q1: State<String> = State::new("q1", true);
//! let dead: State<String> = State::dead("trap");
//!
//! let mut engine: Engine<String, char> = Engine::new();
//! engine.add_state(q0.clone()).unwrap();
//! engine.add_state(q1.clone()).unwrap();
//! engine.set_initial_state(q0.id()).unwrap();
//! engine.set_dead_state(Some(dead)).unwrap();
//! engine.add_transition(Transition::new('a', &q0, &q1).unwrap()).unwrap();
//! engine.validate().unwrap();
//!
//! engine.step(&'a').unwrap();
//! assert!(engine.is_in_final_state());
//!
//! engine.step(&'a').unwrap();
//! assert!(engine.is_in_dead_state());
//! ```

pub mod builder;
pub mod core;
pub mod engine;
pub mod snapshot;

// Re-export commonly used types
pub use builder::FsmBuilder;
pub use core::{Callback, FsmError, Key, State, StateKind, StepHistory, StepRecord, Transition};
pub use engine::{Engine, EngineConfig, Lifecycle, Route, StepResult};
pub use snapshot::{Snapshot, SnapshotError};
