//! Builder API for ergonomic engine construction.
//!
//! ```rust
//! use fsmkit::builder::FsmBuilder;
//! use fsmkit::core::State;
//!
//! let mut engine = FsmBuilder::<String, char>::new()
//!     .states([State::new("even", true), State::new("odd", false)])
//!     .initial("even")
//!     .edge('1', "even", "odd")
//!     .edge('1', "odd", "even")
//!     .edge('0', "even", "even")
//!     .edge('0', "odd", "odd")
//!     .build()
//!     .unwrap();
//!
//! engine.run(&['1', '0', '1']).unwrap();
//! assert!(engine.is_in_final_state());
//! ```

pub mod machine;

pub use machine::FsmBuilder;
