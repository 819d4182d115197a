//! Capture and restore engines.
//!
//! A snapshot keeps the structure of an engine: states with their final flag,
//! transitions as `(symbol, source id, destination id)`, the initial and dead
//! states, where execution stands and the step history. Callbacks are not
//! serializable; hosts re-attach them while restoring with
//! [`Snapshot::restore_with`].
//!
//! A restored engine is always validated before it is handed back.

use crate::core::{render, Key, State, StepHistory, Transition};
use crate::engine::{Engine, EngineConfig};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

pub mod error;

pub use error::SnapshotError;

/// Version identifier for snapshot format
pub const SNAPSHOT_VERSION: u32 = 1;

/// A state without its callbacks.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StateRecord<K: Key> {
    pub id: K,
    pub is_final: bool,
}

/// A transition without its callback.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct TransitionRecord<K: Key, Sym: Key> {
    pub symbol: Sym,
    pub src: K,
    pub dst: K,
}

/// Serializable picture of an engine.
/// Does NOT include callbacks (not serializable).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Snapshot<K: Key, Sym: Key> {
    /// Snapshot format version
    pub version: u32,

    /// Unique snapshot identifier
    pub id: Uuid,

    /// When the snapshot was taken
    pub taken_at: DateTime<Utc>,

    pub states: Vec<StateRecord<K>>,

    pub transitions: Vec<TransitionRecord<K, Sym>>,

    pub initial_state: Option<K>,

    pub dead_state: Option<StateRecord<K>>,

    /// Where execution stands; `None` if the engine never stepped
    pub current_state: Option<K>,

    pub history: StepHistory<K, Sym>,

    /// Configuration of the engine the snapshot was taken from
    #[serde(default)]
    pub config: EngineConfig,
}

impl<K: Key, Sym: Key> Engine<K, Sym> {
    /// Capture the engine's structure and position.
    pub fn snapshot(&self) -> Snapshot<K, Sym> {
        let current_state = if self.has_started() {
            self.current_state().map(|state| state.id().clone())
        } else {
            None
        };

        Snapshot {
            version: SNAPSHOT_VERSION,
            id: Uuid::new_v4(),
            taken_at: Utc::now(),
            states: self.states().map(StateRecord::from).collect(),
            transitions: self
                .transitions()
                .map(|transition| TransitionRecord {
                    symbol: transition.symbol().clone(),
                    src: transition.src().clone(),
                    dst: transition.dst().clone(),
                })
                .collect(),
            initial_state: self.initial_state().map(|state| state.id().clone()),
            dead_state: self.dead_state().map(StateRecord::from),
            current_state,
            history: self.history().clone(),
            config: self.config().clone(),
        }
    }
}

impl<K: Key> From<&State<K>> for StateRecord<K> {
    fn from(state: &State<K>) -> Self {
        Self {
            id: state.id().clone(),
            is_final: state.is_final(),
        }
    }
}

impl<K: Key, Sym: Key> Snapshot<K, Sym> {
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        serde_json::to_string(self).map_err(|e| SnapshotError::SerializationFailed(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        serde_json::from_str(json).map_err(|e| SnapshotError::DeserializationFailed(e.to_string()))
    }

    /// Compact binary encoding.
    pub fn to_bytes(&self) -> Result<Vec<u8>, SnapshotError> {
        bincode::serialize(self).map_err(|e| SnapshotError::SerializationFailed(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SnapshotError> {
        bincode::deserialize(bytes).map_err(|e| SnapshotError::DeserializationFailed(e.to_string()))
    }

    /// Rebuild a callback-free engine with the configuration it was captured with.
    pub fn restore(self) -> Result<Engine<K, Sym>, SnapshotError> {
        let config = self.config.clone();
        self.restore_with(config, |state| state, |transition| transition)
    }

    /// Rebuild an engine, passing every state and transition through a hook
    /// before it is installed so callbacks can be re-attached.
    ///
    /// The dead state is passed through `on_state` as well. The engine is
    /// validated, then resumed at the captured current state. Captured history
    /// is trimmed to `config`'s limit, and dropped if `config` does not record
    /// history.
    pub fn restore_with<FS, FT>(
        self,
        config: EngineConfig,
        mut on_state: FS,
        mut on_transition: FT,
    ) -> Result<Engine<K, Sym>, SnapshotError>
    where
        FS: FnMut(State<K>) -> State<K>,
        FT: FnMut(Transition<K, Sym>) -> Transition<K, Sym>,
    {
        if self.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion {
                found: self.version,
                supported: SNAPSHOT_VERSION,
            });
        }

        let mut engine = Engine::with_config(config);
        for record in self.states {
            engine.add_state(on_state(State::new(record.id, record.is_final)))?;
        }
        if let Some(record) = self.dead_state {
            let dead = State::dead(record.id).with_final(record.is_final);
            engine.set_dead_state(Some(on_state(dead)))?;
        }
        if let Some(initial) = &self.initial_state {
            engine.set_initial_state(initial)?;
        }
        for record in self.transitions {
            engine.add_transition(on_transition(Transition::from_ids(
                record.symbol,
                record.src,
                record.dst,
            )))?;
        }

        engine.validate()?;

        if let Some(current) = self.current_state {
            let id = render(&current);
            engine
                .resume_at(current)
                .map_err(|_| SnapshotError::UnknownCurrentState { id })?;
        }
        engine.restore_history(self.history);

        debug!(snapshot = %self.id, "engine restored from snapshot");
        Ok(engine)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::FsmBuilder;
    use crate::core::FsmError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn parity() -> Engine<String, char> {
        FsmBuilder::new()
            .states([State::new("even", true), State::new("odd", false)])
            .dead_state(State::dead("ds"))
            .initial("even")
            .edge('1', "even", "odd")
            .edge('1', "odd", "even")
            .edge('0', "even", "even")
            .config(EngineConfig::default().with_history(None))
            .build()
            .unwrap()
    }

    #[test]
    fn snapshot_captures_structure() {
        let engine = parity();

        let snapshot = engine.snapshot();

        assert_eq!(snapshot.version, SNAPSHOT_VERSION);
        assert_eq!(snapshot.states.len(), 2);
        assert_eq!(snapshot.transitions.len(), 3);
        assert_eq!(snapshot.initial_state.as_deref(), Some("even"));
        assert_eq!(snapshot.dead_state.as_ref().map(|d| d.id.as_str()), Some("ds"));
        assert!(snapshot.current_state.is_none());
    }

    #[test]
    fn json_restore_resumes_position() {
        let mut engine = parity();
        engine.run(&['1', '0']).unwrap();

        let json = engine.snapshot().to_json().unwrap();
        let restored: Engine<String, char> = Snapshot::from_json(&json).unwrap().restore().unwrap();

        assert!(!restored.is_dirty());
        assert!(restored.is_in_dead_state());
        assert_eq!(restored.history().len(), 2);
        assert_eq!(restored.alphabet().count(), 2);
    }

    #[test]
    fn binary_restore_matches_original() {
        let mut engine = parity();
        engine.step(&'1').unwrap();

        let bytes = engine.snapshot().to_bytes().unwrap();
        let mut restored: Engine<String, char> =
            Snapshot::from_bytes(&bytes).unwrap().restore().unwrap();

        assert_eq!(restored.current_state().unwrap().id(), "odd");
        restored.step(&'1').unwrap();
        assert!(restored.is_in_final_state());
    }

    #[test]
    fn restore_with_reattaches_callbacks() {
        let entered = Arc::new(AtomicUsize::new(0));
        let snapshot = parity().snapshot();

        let counter = Arc::clone(&entered);
        let mut restored = snapshot
            .restore_with(
                EngineConfig::default(),
                move |state| {
                    if state.id() == "odd" {
                        let counter = Arc::clone(&counter);
                        state.on_enter(move || {
                            counter.fetch_add(1, Ordering::SeqCst);
                        })
                    } else {
                        state
                    }
                },
                |transition| transition,
            )
            .unwrap();

        restored.run(&['1', '1', '1']).unwrap();

        assert_eq!(entered.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn restore_with_applies_configured_history_limit() {
        let mut engine = parity();
        engine.run(&['1', '1', '1', '1']).unwrap();
        let snapshot = engine.snapshot();

        let mut restored = snapshot
            .restore_with(
                EngineConfig::default().with_history(Some(2)),
                |state| state,
                |transition| transition,
            )
            .unwrap();

        assert_eq!(restored.history().limit(), Some(2));
        assert_eq!(restored.history().len(), 2);

        restored.run(&['1', '1', '1']).unwrap();

        assert_eq!(restored.history().len(), 2);
        let last = restored.history().last().unwrap();
        assert_eq!((last.from.as_str(), last.to.as_str()), ("even", "odd"));
    }

    #[test]
    fn restore_with_history_disabled_drops_captured_steps() {
        let mut engine = parity();
        engine.run(&['1', '1']).unwrap();

        let mut restored = engine
            .snapshot()
            .restore_with(EngineConfig::default(), |state| state, |transition| transition)
            .unwrap();
        restored.step(&'1').unwrap();

        assert!(restored.history().is_empty());
    }

    #[test]
    fn restore_keeps_captured_config() {
        let engine: Engine<String, char> = FsmBuilder::new()
            .states([State::new("even", true), State::new("odd", false)])
            .initial("even")
            .edge('1', "even", "odd")
            .edge('1', "odd", "even")
            .config(EngineConfig::default().with_history(Some(3)))
            .build()
            .unwrap();

        let restored: Engine<String, char> = Snapshot::from_json(&engine.snapshot().to_json().unwrap())
            .unwrap()
            .restore()
            .unwrap();

        assert_eq!(restored.config(), engine.config());
        assert_eq!(restored.history().limit(), Some(3));
    }

    #[test]
    fn restore_revalidates() {
        let mut snapshot = parity().snapshot();
        snapshot.dead_state = None;

        let result = snapshot.restore();

        assert!(matches!(
            result,
            Err(SnapshotError::Engine(FsmError::MissingTransitions { .. }))
        ));
    }

    #[test]
    fn unsupported_version_is_rejected() {
        let mut snapshot = parity().snapshot();
        snapshot.version = 99;

        assert!(matches!(
            snapshot.restore(),
            Err(SnapshotError::UnsupportedVersion {
                found: 99,
                supported: SNAPSHOT_VERSION
            })
        ));
    }

    #[test]
    fn unknown_current_state_is_rejected() {
        let mut snapshot = parity().snapshot();
        snapshot.current_state = Some("gone".to_string());

        assert!(matches!(
            snapshot.restore(),
            Err(SnapshotError::UnknownCurrentState { .. })
        ));
    }

    #[test]
    fn malformed_json_is_reported() {
        let result = Snapshot::<String, char>::from_json("{ not json");

        assert!(matches!(
            result,
            Err(SnapshotError::DeserializationFailed(_))
        ));
    }
}
