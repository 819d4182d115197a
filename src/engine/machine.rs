//! The deterministic state machine engine.

use super::config::EngineConfig;
use super::index::{Route, TransitionIndex};
use super::lifecycle::Lifecycle;
use crate::core::{
    fire, render, Callback, FsmError, Key, State, StepHistory, StepRecord, Transition,
};
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use tracing::{debug, trace, warn};

/// Outcome of a single [`Engine::step`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StepResult<K: Key> {
    /// Followed a declared transition to a different state
    Moved { from: K, to: K },

    /// Stayed in the same state, either through a loop transition or because
    /// the engine is absorbed in the dead state
    Looped(K),

    /// No transition matched, so the engine routed into the dead state
    FellIntoDeadState { from: K, dead: K },
}

impl<K: Key> StepResult<K> {
    /// The state occupied after the step.
    pub fn state(&self) -> &K {
        match self {
            Self::Moved { to, .. } => to,
            Self::Looped(state) => state,
            Self::FellIntoDeadState { dead, .. } => dead,
        }
    }

    pub fn is_loop(&self) -> bool {
        matches!(self, Self::Looped(_))
    }
}

/// A mutable graph of states and symbol-labelled transitions.
///
/// The engine is generic over the state id type `K` and the symbol type `Sym`.
/// Any structural change marks it dirty; [`validate`](Engine::validate) must
/// succeed before [`step`](Engine::step) is accepted again.
///
/// The engine does no locking. Hosts sharing one across threads must serialize
/// every call themselves, for instance behind a mutex.
///
/// # Example
///
/// ```rust
/// use fsmkit::core::{State, Transition};
/// use fsmkit::engine::{Engine, StepResult};
///
/// let locked: State<String> = State::new("locked", false);
/// let open: State<String> = State::new("open", true);
///
/// let mut engine: Engine<String, char> = Engine::new();
/// engine.add_state(locked.clone()).unwrap();
/// engine.add_state(open.clone()).unwrap();
/// engine.set_initial_state(locked.id()).unwrap();
/// engine.add_transition(Transition::new('c', &locked, &open).unwrap()).unwrap();
/// engine.add_transition(Transition::new('p', &locked, &locked).unwrap()).unwrap();
/// engine.add_transition(Transition::new('c', &open, &open).unwrap()).unwrap();
/// engine.add_transition(Transition::new('p', &open, &locked).unwrap()).unwrap();
/// engine.validate().unwrap();
///
/// let result = engine.step(&'c').unwrap();
/// assert_eq!(result, StepResult::Moved { from: "locked".into(), to: "open".into() });
/// assert!(engine.is_in_final_state());
/// ```
#[derive(Debug)]
pub struct Engine<K: Key, Sym: Key> {
    pub(super) states: HashMap<K, State<K>>,
    pub(super) transitions: HashSet<Transition<K, Sym>>,
    pub(super) index: TransitionIndex<K, Sym>,
    pub(super) dead_state: Option<State<K>>,
    pub(super) initial_state: Option<K>,
    pub(super) current_state: Option<K>,
    pub(super) lifecycle: Lifecycle,
    pub(super) history: StepHistory<K, Sym>,
    pub(super) config: EngineConfig,
}

impl<K: Key, Sym: Key> Default for Engine<K, Sym> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Key, Sym: Key> Engine<K, Sym> {
    /// Create an empty, clean engine with the default configuration.
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Create an empty, clean engine. History is kept only if `config` asks for it.
    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            states: HashMap::new(),
            transitions: HashSet::new(),
            index: TransitionIndex::default(),
            dead_state: None,
            initial_state: None,
            current_state: None,
            lifecycle: Lifecycle::Clean,
            history: config.new_history(),
            config,
        }
    }

    // Accessors

    /// The configuration the engine was created with.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Whether the engine has been validated since its last structural change.
    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    /// True when [`step`](Self::step) would be refused until the next
    /// successful [`validate`](Self::validate).
    pub fn is_dirty(&self) -> bool {
        self.lifecycle.is_dirty()
    }

    /// The state the engine occupies.
    ///
    /// Before the first step this is the initial state.
    pub fn current_state(&self) -> Option<&State<K>> {
        self.current_state
            .as_ref()
            .or(self.initial_state.as_ref())
            .and_then(|id| self.lookup(id))
    }

    /// True once a step has been executed since creation or the last reset.
    pub fn has_started(&self) -> bool {
        self.current_state.is_some()
    }

    /// The state execution starts from, if one has been chosen.
    pub fn initial_state(&self) -> Option<&State<K>> {
        self.initial_state.as_ref().and_then(|id| self.states.get(id))
    }

    pub fn dead_state(&self) -> Option<&State<K>> {
        self.dead_state.as_ref()
    }

    /// Look up a regular state by id.
    pub fn state(&self, id: &K) -> Option<&State<K>> {
        self.states.get(id)
    }

    /// Registered regular states, in no particular order. The dead state is
    /// not included.
    pub fn states(&self) -> impl Iterator<Item = &State<K>> {
        self.states.values()
    }

    /// Registered transitions, in no particular order.
    pub fn transitions(&self) -> impl Iterator<Item = &Transition<K, Sym>> {
        self.transitions.iter()
    }

    pub fn contains_transition(&self, transition: &Transition<K, Sym>) -> bool {
        self.transitions.contains(transition)
    }

    /// Distinct symbols appearing in any registered transition.
    pub fn alphabet(&self) -> impl Iterator<Item = &Sym> {
        self.index.alphabet()
    }

    pub fn alphabet_contains(&self, symbol: &Sym) -> bool {
        self.index.has_symbol(symbol)
    }

    /// The routing entry for `(symbol, src)`, if one is declared.
    pub fn route(&self, symbol: &Sym, src: &K) -> Option<&Route<K>> {
        self.index.route(symbol, src)
    }

    /// Steps executed since creation or the last [`reset`](Self::reset).
    ///
    /// Always empty unless [`EngineConfig::record_history`] is set.
    pub fn history(&self) -> &StepHistory<K, Sym> {
        &self.history
    }

    /// True if the current state is final.
    ///
    /// Before the first step this asks about the initial state.
    ///
    /// ```rust
    /// use fsmkit::{FsmBuilder, State};
    ///
    /// let mut engine = FsmBuilder::<String, char>::new()
    ///     .states([State::new("off", false), State::new("on", true)])
    ///     .initial("off")
    ///     .edge('t', "off", "on")
    ///     .edge('t', "on", "off")
    ///     .build()
    ///     .unwrap();
    ///
    /// assert!(!engine.is_in_final_state());
    /// engine.step(&'t').unwrap();
    /// assert!(engine.is_in_final_state());
    /// ```
    pub fn is_in_final_state(&self) -> bool {
        self.current_state().is_some_and(State::is_final)
    }

    /// True once execution has fallen into the dead state. Only
    /// [`reset`](Self::reset) leaves it.
    pub fn is_in_dead_state(&self) -> bool {
        match (&self.dead_state, &self.current_state) {
            (Some(dead), Some(current)) => dead.id() == current,
            _ => false,
        }
    }

    /// True if a dead state is installed, so unmatched symbols are absorbed
    /// instead of failing.
    pub fn is_dead_state_on(&self) -> bool {
        self.dead_state.is_some()
    }

    fn lookup(&self, id: &K) -> Option<&State<K>> {
        self.states
            .get(id)
            .or_else(|| self.dead_state.as_ref().filter(|dead| dead.id() == id))
    }

    // Lifecycle transitions

    pub(super) fn mark_dirty(&mut self) {
        if self.lifecycle.is_clean() {
            trace!("engine marked dirty");
        }
        self.lifecycle = Lifecycle::Dirty;
    }

    pub(super) fn mark_clean(&mut self) {
        self.lifecycle = Lifecycle::Clean;
    }

    // Structural mutation

    /// Register a regular state.
    ///
    /// Dead states are rejected here; install them with
    /// [`set_dead_state`](Self::set_dead_state).
    pub fn add_state(&mut self, state: State<K>) -> Result<(), FsmError> {
        if state.is_dead() {
            return Err(FsmError::DeadStateAsRegular {
                id: render(state.id()),
            });
        }
        let collides_with_dead = self
            .dead_state
            .as_ref()
            .is_some_and(|dead| dead.id() == state.id());
        if collides_with_dead || self.states.contains_key(state.id()) {
            return Err(FsmError::DuplicateState {
                id: render(state.id()),
            });
        }

        debug!(state = ?state.id(), is_final = state.is_final(), "state added");
        self.states.insert(state.id().clone(), state);
        self.mark_dirty();
        Ok(())
    }

    /// Remove a regular state together with every transition touching it.
    ///
    /// Symbols left without transitions leave the alphabet. Removing the
    /// initial state unsets it.
    pub fn remove_state(&mut self, id: &K) -> Result<(), FsmError> {
        if self.dead_state.as_ref().is_some_and(|dead| dead.id() == id) {
            return Err(FsmError::DeadStateAsRegular { id: render(id) });
        }
        if self.current_state.as_ref() == Some(id) {
            return Err(FsmError::CannotModifyStateThatIsCurrent { id: render(id) });
        }
        if self.states.remove(id).is_none() {
            return Err(FsmError::UnknownState { id: render(id) });
        }

        let before = self.transitions.len();
        self.transitions
            .retain(|transition| transition.src() != id && transition.dst() != id);
        self.index.remove_state(id);
        if self.initial_state.as_ref() == Some(id) {
            self.initial_state = None;
        }

        debug!(
            state = ?id,
            transitions_removed = before - self.transitions.len(),
            "state removed"
        );
        self.mark_dirty();
        Ok(())
    }

    /// Register a transition.
    ///
    /// All checks run before anything is touched, so a rejected transition
    /// leaves the engine exactly as it was.
    pub fn add_transition(&mut self, transition: Transition<K, Sym>) -> Result<(), FsmError> {
        if self.transitions.contains(&transition) {
            let (symbol, src, dst) = transition.describe();
            return Err(FsmError::DuplicateTransition { symbol, src, dst });
        }
        if !self.states.contains_key(transition.src()) || !self.states.contains_key(transition.dst())
        {
            let (symbol, src, dst) = transition.describe();
            return Err(FsmError::TransitionContainsUnknownState { symbol, src, dst });
        }
        if self.index.contains(transition.symbol(), transition.src()) {
            let (symbol, src, _) = transition.describe();
            return Err(FsmError::StateCannotHaveSameSymbolTransitions { symbol, src });
        }

        debug!(
            symbol = ?transition.symbol(),
            src = ?transition.src(),
            dst = ?transition.dst(),
            "transition added"
        );
        self.index.insert(&transition);
        self.transitions.insert(transition);
        self.mark_dirty();
        Ok(())
    }

    /// Remove a transition. Its symbol leaves the alphabet if nothing else uses it.
    pub fn remove_transition(&mut self, transition: &Transition<K, Sym>) -> Result<(), FsmError> {
        if !self.transitions.remove(transition) {
            let (symbol, src, dst) = transition.describe();
            return Err(FsmError::UnknownTransition { symbol, src, dst });
        }
        self.index.remove(transition.symbol(), transition.src());

        debug!(
            symbol = ?transition.symbol(),
            src = ?transition.src(),
            dst = ?transition.dst(),
            "transition removed"
        );
        self.mark_dirty();
        Ok(())
    }

    /// Install, replace or clear the dead state.
    ///
    /// Clearing marks the engine dirty since every `(state, symbol)` pair must
    /// then be covered. Installing one only relaxes that requirement.
    pub fn set_dead_state(&mut self, dead: Option<State<K>>) -> Result<(), FsmError> {
        if self.is_in_dead_state() {
            let id = self.current_state.as_ref().map(render).unwrap_or_default();
            return Err(FsmError::CannotModifyStateThatIsCurrent { id });
        }

        match dead {
            None => {
                debug!("dead state cleared");
                self.dead_state = None;
                self.mark_dirty();
            }
            Some(state) => {
                if !state.is_dead() {
                    return Err(FsmError::NotADeadState {
                        id: render(state.id()),
                    });
                }
                if self.states.contains_key(state.id()) {
                    return Err(FsmError::DuplicateState {
                        id: render(state.id()),
                    });
                }
                debug!(state = ?state.id(), "dead state installed");
                self.dead_state = Some(state);
            }
        }
        Ok(())
    }

    /// Choose the state execution starts from. It must already be registered.
    pub fn set_initial_state(&mut self, id: &K) -> Result<(), FsmError> {
        if !self.states.contains_key(id) {
            return Err(FsmError::InitialStateNotInSetOfStates { id: render(id) });
        }
        self.initial_state = Some(id.clone());
        Ok(())
    }

    /// Forget the current state and the step history.
    ///
    /// The next step starts again from the initial state. Structure is
    /// untouched, so the engine stays clean.
    pub fn reset(&mut self) {
        self.current_state = None;
        self.history.clear();
    }

    // Execution

    /// Consume one symbol.
    ///
    /// Resolution order:
    /// 1. In the dead state: stay there, loop callbacks fire.
    /// 2. No transition for `(symbol, current)`: enter the dead state if one
    ///    is configured, otherwise fail with [`FsmError::UnknownSymbol`].
    /// 3. Otherwise follow the declared transition.
    ///
    /// Callbacks fire strictly in this order: exit of the current state, the
    /// transition callback, then enter of the destination. Loop variants
    /// replace exit and enter when source and destination coincide.
    pub fn step(&mut self, symbol: &Sym) -> Result<StepResult<K>, FsmError> {
        if self.lifecycle.is_dirty() {
            return Err(FsmError::ValidationRequired);
        }
        let current = match self.current_state.clone() {
            Some(current) => current,
            None => {
                let initial = self.initial_state.clone().ok_or(FsmError::NoInitialState)?;
                self.current_state = Some(initial.clone());
                initial
            }
        };

        let (result, on_transition) = self.resolve(&current, symbol)?;
        let looped = result.is_loop();

        let src = self
            .lookup(&current)
            .ok_or_else(|| FsmError::UnknownState { id: render(&current) })?;
        let dst = self.lookup(result.state()).ok_or_else(|| FsmError::UnknownState {
            id: render(result.state()),
        })?;
        let on_leave = src.leave_callback(looped).cloned();
        let on_arrive = dst.arrive_callback(looped).cloned();

        trace!(state = ?current, looped, "firing exit callback");
        fire(on_leave.as_ref());
        trace!(symbol = ?symbol, "firing transition callback");
        fire(on_transition.as_ref());
        self.current_state = Some(result.state().clone());
        trace!(state = ?result.state(), looped, "firing enter callback");
        fire(on_arrive.as_ref());

        match &result {
            StepResult::FellIntoDeadState { from, dead } => {
                warn!(symbol = ?symbol, from = ?from, dead = ?dead, "no transition matched, entered dead state");
            }
            _ => debug!(symbol = ?symbol, from = ?current, to = ?result.state(), looped, "step"),
        }

        if self.config.record_history {
            self.history.record(StepRecord {
                symbol: symbol.clone(),
                from: current,
                to: result.state().clone(),
                looped,
                timestamp: Utc::now(),
            });
        }

        Ok(result)
    }

    /// Run `step` for each symbol in turn, stopping at the first error.
    pub fn run<'a, I>(&mut self, symbols: I) -> Result<Vec<StepResult<K>>, FsmError>
    where
        I: IntoIterator<Item = &'a Sym>,
    {
        symbols.into_iter().map(|symbol| self.step(symbol)).collect()
    }

    fn resolve(
        &self,
        current: &K,
        symbol: &Sym,
    ) -> Result<(StepResult<K>, Option<Callback>), FsmError> {
        if self.is_in_dead_state() {
            return Ok((StepResult::Looped(current.clone()), None));
        }

        match (self.index.route(symbol, current), &self.dead_state) {
            (Some(route), _) if route.dst() == current => {
                Ok((StepResult::Looped(current.clone()), route.callback().cloned()))
            }
            (Some(route), _) => Ok((
                StepResult::Moved {
                    from: current.clone(),
                    to: route.dst().clone(),
                },
                route.callback().cloned(),
            )),
            (None, Some(dead)) => Ok((
                StepResult::FellIntoDeadState {
                    from: current.clone(),
                    dead: dead.id().clone(),
                },
                None,
            )),
            (None, None) => Err(FsmError::UnknownSymbol {
                symbol: render(symbol),
                state: render(current),
            }),
        }
    }

    /// Resume at `id` after a restore. `id` must be a known state or the dead state.
    pub(crate) fn resume_at(&mut self, id: K) -> Result<(), FsmError> {
        if self.lookup(&id).is_none() {
            return Err(FsmError::UnknownState { id: render(&id) });
        }
        self.current_state = Some(id);
        Ok(())
    }

    /// Replace the history with `history`, re-bucketed under this engine's
    /// configured limit. Oldest records are evicted first.
    pub(crate) fn restore_history(&mut self, history: StepHistory<K, Sym>) {
        let mut restored = self.config.new_history();
        if self.config.record_history {
            for step in history.steps() {
                restored.record(step.clone());
            }
        }
        self.history = restored;
    }
}
