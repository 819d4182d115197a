//! Symbol-labelled edges between states.

use super::callback::Callback;
use super::error::{render, FsmError};
use super::key::Key;
use super::state::State;
use std::hash::{Hash, Hasher};

/// An immutable directed edge `(symbol, src, dst)` with an optional callback.
///
/// Event order for an ordinary transition:
///
/// ```text
/// (src)  ----------symbol---------->  (dst)
/// on_exit -----on_transition------> on_enter
/// ```
///
/// When `src == dst` the loop variants `on_loop_exit` / `on_loop_enter` fire
/// instead. Identity is `(symbol, src id, dst id)`; the callback is not part of it.
///
/// # Example
///
/// ```rust
/// use fsmkit::core::{State, Transition};
///
/// let locked: State<String> = State::new("locked", false);
/// let open: State<String> = State::new("open", true);
///
/// let coin = Transition::<String, char>::new('c', &locked, &open)
///     .unwrap()
///     .with_callback(|| println!("coin accepted"));
///
/// assert_eq!(coin.symbol(), &'c');
/// assert!(!coin.is_loop());
/// ```
#[derive(Clone, Debug)]
pub struct Transition<K: Key, Sym: Key> {
    symbol: Sym,
    src: K,
    dst: K,
    on_transition: Option<Callback>,
}

impl<K: Key, Sym: Key> Transition<K, Sym> {
    /// Create a transition between two regular states.
    ///
    /// Fails if either endpoint is a dead state.
    pub fn new(symbol: impl Into<Sym>, src: &State<K>, dst: &State<K>) -> Result<Self, FsmError> {
        if src.is_dead() {
            return Err(FsmError::SourceStateCannotBeDead {
                id: render(src.id()),
            });
        }
        if dst.is_dead() {
            return Err(FsmError::DestinationStateCannotBeDead {
                id: render(dst.id()),
            });
        }
        Ok(Self {
            symbol: symbol.into(),
            src: src.id().clone(),
            dst: dst.id().clone(),
            on_transition: None,
        })
    }

    /// Build a transition from raw ids, used when restoring snapshots.
    pub(crate) fn from_ids(symbol: Sym, src: K, dst: K) -> Self {
        Self {
            symbol,
            src,
            dst,
            on_transition: None,
        }
    }

    pub fn with_callback<F>(mut self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_transition = Some(Callback::new(f));
        self
    }

    pub fn set_callback(&mut self, callback: Option<Callback>) {
        self.on_transition = callback;
    }

    pub fn symbol(&self) -> &Sym {
        &self.symbol
    }

    /// Id of the source state.
    pub fn src(&self) -> &K {
        &self.src
    }

    /// Id of the destination state.
    pub fn dst(&self) -> &K {
        &self.dst
    }

    pub fn callback(&self) -> Option<&Callback> {
        self.on_transition.as_ref()
    }

    pub fn is_loop(&self) -> bool {
        self.src == self.dst
    }

    pub(crate) fn describe(&self) -> (String, String, String) {
        (render(&self.symbol), render(&self.src), render(&self.dst))
    }
}

impl<K: Key, Sym: Key> PartialEq for Transition<K, Sym> {
    fn eq(&self, other: &Self) -> bool {
        self.symbol == other.symbol && self.src == other.src && self.dst == other.dst
    }
}

impl<K: Key, Sym: Key> Eq for Transition<K, Sym> {}

impl<K: Key, Sym: Key> Hash for Transition<K, Sym> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.symbol.hash(state);
        self.src.hash(state);
        self.dst.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(id: &str) -> State<String> {
        State::new(id, false)
    }

    #[test]
    fn dead_source_is_rejected() {
        let result = Transition::<String, char>::new('a', &State::dead("ds"), &state("q0"));

        assert!(matches!(
            result,
            Err(FsmError::SourceStateCannotBeDead { .. })
        ));
    }

    #[test]
    fn dead_destination_is_rejected() {
        let result = Transition::<String, char>::new('a', &state("q0"), &State::dead("ds"));

        assert!(matches!(
            result,
            Err(FsmError::DestinationStateCannotBeDead { .. })
        ));
    }

    #[test]
    fn callback_is_not_part_of_identity() {
        let plain = Transition::<String, char>::new('a', &state("q0"), &state("q1")).unwrap();
        let with_callback = plain.clone().with_callback(|| {});

        assert_eq!(plain, with_callback);
        assert!(plain.callback().is_none());
        assert!(with_callback.callback().is_some());
    }

    #[test]
    fn identity_covers_symbol_and_endpoints() {
        let base = Transition::<String, char>::new('a', &state("q0"), &state("q1")).unwrap();
        let other_symbol = Transition::<String, char>::new('b', &state("q0"), &state("q1")).unwrap();
        let other_dst = Transition::<String, char>::new('a', &state("q0"), &state("q2")).unwrap();

        assert_ne!(base, other_symbol);
        assert_ne!(base, other_dst);
    }

    #[test]
    fn loop_is_detected() {
        let looped = Transition::<String, char>::new('a', &state("q0"), &state("q0")).unwrap();

        assert!(looped.is_loop());
        assert_eq!(looped.src(), "q0");
        assert_eq!(looped.dst(), "q0");
    }
}
