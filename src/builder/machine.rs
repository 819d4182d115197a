//! Builder for constructing validated engines.

use crate::core::{render, FsmError, Key, State, Transition};
use crate::engine::{Engine, EngineConfig};

/// Fluent builder producing a validated [`Engine`].
///
/// Everything is installed through the ordinary engine API at
/// [`build`](FsmBuilder::build) time, so the same errors surface in the same
/// way. The result is validated and ready to step.
pub struct FsmBuilder<K: Key, Sym: Key> {
    states: Vec<State<K>>,
    dead_states: Vec<State<K>>,
    initial: Option<K>,
    transitions: Vec<Transition<K, Sym>>,
    edges: Vec<(Sym, K, K)>,
    config: EngineConfig,
}

impl<K: Key, Sym: Key> FsmBuilder<K, Sym> {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            states: Vec::new(),
            dead_states: Vec::new(),
            initial: None,
            transitions: Vec::new(),
            edges: Vec::new(),
            config: EngineConfig::default(),
        }
    }

    /// Add a regular state.
    pub fn state(mut self, state: State<K>) -> Self {
        self.states.push(state);
        self
    }

    /// Add several regular states at once.
    pub fn states(mut self, states: impl IntoIterator<Item = State<K>>) -> Self {
        self.states.extend(states);
        self
    }

    /// Set the dead state. At most one may be given.
    pub fn dead_state(mut self, state: State<K>) -> Self {
        self.dead_states.push(state);
        self
    }

    /// Set the initial state by id (required).
    pub fn initial(mut self, id: impl Into<K>) -> Self {
        self.initial = Some(id.into());
        self
    }

    /// Add a pre-built transition.
    pub fn transition(mut self, transition: Transition<K, Sym>) -> Self {
        self.transitions.push(transition);
        self
    }

    /// Add multiple transitions at once.
    pub fn transitions(mut self, transitions: impl IntoIterator<Item = Transition<K, Sym>>) -> Self {
        self.transitions.extend(transitions);
        self
    }

    /// Add a callback-free transition between two states given by id.
    pub fn edge(mut self, symbol: impl Into<Sym>, src: impl Into<K>, dst: impl Into<K>) -> Self {
        self.edges.push((symbol.into(), src.into(), dst.into()));
        self
    }

    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Build and validate the engine.
    pub fn build(self) -> Result<Engine<K, Sym>, FsmError> {
        if self.dead_states.len() > 1 {
            return Err(FsmError::OnlyOneDeadStatePerFSMAllowed);
        }

        let mut engine = Engine::with_config(self.config);
        for state in self.states {
            engine.add_state(state)?;
        }
        if let Some(dead) = self.dead_states.into_iter().next() {
            engine.set_dead_state(Some(dead))?;
        }

        let initial = self.initial.ok_or(FsmError::NoInitialState)?;
        engine.set_initial_state(&initial)?;

        for transition in self.transitions {
            engine.add_transition(transition)?;
        }
        for (symbol, src, dst) in self.edges {
            let transition = match (engine.state(&src), engine.state(&dst)) {
                (Some(src), Some(dst)) => Transition::new(symbol, src, dst)?,
                _ => {
                    return Err(FsmError::TransitionContainsUnknownState {
                        symbol: render(&symbol),
                        src: render(&src),
                        dst: render(&dst),
                    })
                }
            };
            engine.add_transition(transition)?;
        }

        engine.validate()?;
        Ok(engine)
    }
}

impl<K: Key, Sym: Key> Default for FsmBuilder<K, Sym> {
    fn default() -> Self {
        Self::new()
    }
}
