//! Structural validation of an engine.
//!
//! [`Engine::validate`] is fail-fast and is the only way back to a clean
//! lifecycle. [`Engine::diagnose`] runs every check and accumulates all
//! problems with Stillwater's `Validation`, without touching the lifecycle.

use super::machine::Engine;
use crate::core::{render, FsmError, Key};
use std::collections::{HashSet, VecDeque};
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;
use tracing::debug;

impl<K: Key, Sym: Key> Engine<K, Sym> {
    /// Check every structural invariant and, on success, mark the engine clean.
    ///
    /// Checks run in this order and the first failure is returned:
    /// 1. at least one state
    /// 2. at least one transition
    /// 3. at least one final state
    /// 4. an initial state is set
    /// 5. every state is reachable from the initial state
    /// 6. without a dead state, every `(state, symbol)` pair has a transition
    ///
    /// Validating twice without an intervening mutation yields the same result.
    pub fn validate(&mut self) -> Result<(), FsmError> {
        let outcome = self.check_all();
        match &outcome {
            Ok(()) => {
                self.mark_clean();
                debug!(
                    states = self.states.len(),
                    transitions = self.transitions.len(),
                    symbols = self.index.alphabet_len(),
                    dead_state = self.dead_state.is_some(),
                    "engine validated"
                );
            }
            Err(error) => debug!(%error, "engine validation failed"),
        }
        outcome
    }

    /// Run every check and report all problems at once.
    ///
    /// Reachability can only be judged once an initial state exists, so it is
    /// skipped when none is set.
    pub fn diagnose(&self) -> Validation<(), NonEmptyVec<FsmError>> {
        let mut checks: Vec<Validation<(), NonEmptyVec<FsmError>>> = vec![
            as_validation(self.check_states()),
            as_validation(self.check_transitions()),
            as_validation(self.check_final()),
        ];
        match self.check_initial() {
            Ok(initial) => checks.push(as_validation(self.check_reachable(initial))),
            Err(error) => checks.push(Validation::fail(error)),
        }
        checks.push(as_validation(self.check_total()));

        Validation::all_vec(checks).map(|_| ())
    }

    fn check_all(&self) -> Result<(), FsmError> {
        self.check_states()?;
        self.check_transitions()?;
        self.check_final()?;
        let initial = self.check_initial()?;
        self.check_reachable(initial)?;
        self.check_total()
    }

    fn check_states(&self) -> Result<(), FsmError> {
        if self.states.is_empty() {
            return Err(FsmError::EmptySetOfStates);
        }
        Ok(())
    }

    fn check_transitions(&self) -> Result<(), FsmError> {
        if self.transitions.is_empty() {
            return Err(FsmError::EmptySetOfTransitions);
        }
        Ok(())
    }

    fn check_final(&self) -> Result<(), FsmError> {
        if !self.states.values().any(|state| state.is_final()) {
            return Err(FsmError::NoFinalState);
        }
        Ok(())
    }

    fn check_initial(&self) -> Result<&K, FsmError> {
        let initial = self.initial_state.as_ref().ok_or(FsmError::NoInitialState)?;
        if !self.states.contains_key(initial) {
            return Err(FsmError::InitialStateNotInSetOfStates {
                id: render(initial),
            });
        }
        Ok(initial)
    }

    /// Breadth-first walk along declared transitions.
    fn check_reachable(&self, initial: &K) -> Result<(), FsmError> {
        let mut visited: HashSet<&K> = HashSet::from([initial]);
        let mut queue: VecDeque<&K> = VecDeque::from([initial]);

        while let Some(state) = queue.pop_front() {
            for next in self.index.successors(state) {
                if visited.insert(next) {
                    queue.push_back(next);
                }
            }
        }

        match self.states.keys().find(|id| !visited.contains(id)) {
            Some(unreachable) => Err(FsmError::UnreachableStateDetected {
                id: render(unreachable),
            }),
            None => Ok(()),
        }
    }

    /// Totality is only required when no dead state absorbs missing pairs.
    fn check_total(&self) -> Result<(), FsmError> {
        if self.dead_state.is_some() {
            return Ok(());
        }
        let states = self.states.len();
        let symbols = self.index.alphabet_len();
        let expected = states * symbols;
        let found = self.transitions.len();
        if found != expected {
            return Err(FsmError::MissingTransitions {
                expected,
                found,
                states,
                symbols,
            });
        }
        Ok(())
    }
}

fn as_validation(result: Result<(), FsmError>) -> Validation<(), NonEmptyVec<FsmError>> {
    match result {
        Ok(()) => Validation::success(()),
        Err(error) => Validation::fail(error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{State, Transition};

    fn link(symbol: char, src: &State<String>, dst: &State<String>) -> Transition<String, char> {
        Transition::new(symbol, src, dst).unwrap()
    }

    fn states() -> (State<String>, State<String>, State<String>) {
        (
            State::new("q0", false),
            State::new("q1", true),
            State::new("q2", false),
        )
    }

    /// q0 --a--> q1 --a--> q2 --a--> q0, all states reachable and total over {a}
    fn ring() -> Engine<String, char> {
        let (q0, q1, q2) = states();
        let mut engine = Engine::new();
        for state in [&q0, &q1, &q2] {
            engine.add_state(state.clone()).unwrap();
        }
        engine.set_initial_state(q0.id()).unwrap();
        engine.add_transition(link('a', &q0, &q1)).unwrap();
        engine.add_transition(link('a', &q1, &q2)).unwrap();
        engine.add_transition(link('a', &q2, &q0)).unwrap();
        engine
    }

    #[test]
    fn valid_engine_becomes_clean() {
        let mut engine = ring();
        assert!(engine.is_dirty());

        engine.validate().unwrap();

        assert!(!engine.is_dirty());
    }

    #[test]
    fn validate_is_idempotent() {
        let mut engine = ring();

        let first = engine.validate();
        let second = engine.validate();

        assert_eq!(first, second);
        assert!(!engine.is_dirty());
    }

    #[test]
    fn empty_engine_has_no_states() {
        let mut engine: Engine<String, char> = Engine::new();

        assert_eq!(engine.validate(), Err(FsmError::EmptySetOfStates));
    }

    #[test]
    fn engine_without_transitions_is_rejected() {
        let mut engine: Engine<String, char> = Engine::new();
        engine.add_state(State::new("q0", true)).unwrap();

        assert_eq!(engine.validate(), Err(FsmError::EmptySetOfTransitions));
        assert!(engine.is_dirty());
    }

    #[test]
    fn engine_without_final_state_is_rejected() {
        let q0: State<String> = State::new("q0", false);
        let mut engine: Engine<String, char> = Engine::new();
        engine.add_state(q0.clone()).unwrap();
        engine.add_transition(link('a', &q0, &q0)).unwrap();

        assert_eq!(engine.validate(), Err(FsmError::NoFinalState));
    }

    #[test]
    fn engine_without_initial_state_is_rejected() {
        let q0: State<String> = State::new("q0", true);
        let mut engine: Engine<String, char> = Engine::new();
        engine.add_state(q0.clone()).unwrap();
        engine.add_transition(link('a', &q0, &q0)).unwrap();

        assert_eq!(engine.validate(), Err(FsmError::NoInitialState));
    }

    #[test]
    fn unreachable_state_is_detected() {
        let (q0, q1, q2) = states();
        let mut engine = Engine::new();
        for state in [&q0, &q1, &q2] {
            engine.add_state(state.clone()).unwrap();
        }
        engine.set_initial_state(q0.id()).unwrap();
        engine.add_transition(link('a', &q0, &q1)).unwrap();
        engine.add_transition(link('a', &q1, &q0)).unwrap();
        engine.add_transition(link('a', &q2, &q0)).unwrap();

        assert_eq!(
            engine.validate(),
            Err(FsmError::UnreachableStateDetected {
                id: render(q2.id())
            })
        );
    }

    #[test]
    fn missing_transitions_without_dead_state() {
        let mut engine = ring();
        let (q0, _, _) = states();
        engine.add_transition(link('b', &q0, &q0)).unwrap();

        assert_eq!(
            engine.validate(),
            Err(FsmError::MissingTransitions {
                expected: 6,
                found: 4,
                states: 3,
                symbols: 2,
            })
        );
    }

    #[test]
    fn dead_state_relaxes_totality() {
        let mut engine = ring();
        let (q0, _, _) = states();
        engine.add_transition(link('b', &q0, &q0)).unwrap();
        engine.set_dead_state(Some(State::dead("ds"))).unwrap();

        assert_eq!(engine.validate(), Ok(()));
    }

    #[test]
    fn dead_state_does_not_relax_reachability() {
        let (q0, q1, q2) = states();
        let mut engine = Engine::new();
        for state in [&q0, &q1, &q2] {
            engine.add_state(state.clone()).unwrap();
        }
        engine.set_initial_state(q0.id()).unwrap();
        engine.set_dead_state(Some(State::dead("ds"))).unwrap();
        engine.add_transition(link('a', &q0, &q1)).unwrap();

        assert!(matches!(
            engine.validate(),
            Err(FsmError::UnreachableStateDetected { .. })
        ));
    }

    #[test]
    fn failed_validation_keeps_engine_dirty() {
        let mut engine = ring();
        engine.validate().unwrap();
        let (q0, _, _) = states();
        engine.add_transition(link('b', &q0, &q0)).unwrap();

        assert!(engine.validate().is_err());
        assert!(engine.is_dirty());
    }

    #[test]
    fn diagnose_accumulates_all_problems() {
        let q0: State<String> = State::new("q0", false);
        let mut engine: Engine<String, char> = Engine::new();
        engine.add_state(q0).unwrap();

        match engine.diagnose() {
            Validation::Failure(errors) => {
                assert_eq!(errors.len(), 3);
                assert!(errors
                    .iter()
                    .any(|e| matches!(e, FsmError::EmptySetOfTransitions)));
                assert!(errors.iter().any(|e| matches!(e, FsmError::NoFinalState)));
                assert!(errors.iter().any(|e| matches!(e, FsmError::NoInitialState)));
            }
            Validation::Success(_) => panic!("Expected failures, got success"),
        }
        assert!(engine.is_dirty());
    }

    #[test]
    fn diagnose_succeeds_on_valid_engine() {
        let engine = ring();

        assert!(engine.diagnose().is_success());
        assert!(engine.is_dirty());
    }
}
