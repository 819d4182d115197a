//! States and the dead state variant.
//!
//! A state is identified by its id alone. Two states with the same id are the
//! same state no matter what flags or callbacks they carry.

use super::callback::Callback;
use super::error::{render, FsmError};
use super::key::Key;
use std::hash::{Hash, Hasher};

/// Distinguishes ordinary states from the absorbing dead state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StateKind {
    Regular,
    /// Absorbing sink entered when no transition matches. Never the source or
    /// destination of a declared transition and never exited.
    Dead,
}

/// A node of the state graph with optional lifecycle callbacks.
///
/// - `on_enter` / `on_exit` fire when the state is entered from, or left for,
///   a different state.
/// - `on_loop_enter` / `on_loop_exit` fire instead when a transition leads
///   back to the same state.
///
/// # Example
///
/// ```rust
/// use fsmkit::core::State;
///
/// let idle: State<String> = State::new("idle", false)
///     .on_enter(|| println!("entered idle"))
///     .on_loop_enter(|| println!("still idle"));
///
/// assert_eq!(idle.id(), "idle");
/// assert!(!idle.is_final());
/// assert!(!idle.is_dead());
/// ```
#[derive(Clone, Debug)]
pub struct State<K: Key> {
    id: K,
    is_final: bool,
    kind: StateKind,
    on_enter: Option<Callback>,
    on_exit: Option<Callback>,
    on_loop_enter: Option<Callback>,
    on_loop_exit: Option<Callback>,
}

impl<K: Key> State<K> {
    /// Create a regular state.
    pub fn new(id: impl Into<K>, is_final: bool) -> Self {
        Self {
            id: id.into(),
            is_final,
            kind: StateKind::Regular,
            on_enter: None,
            on_exit: None,
            on_loop_enter: None,
            on_loop_exit: None,
        }
    }

    /// Create a dead state. Its exit callback is permanently absent.
    pub fn dead(id: impl Into<K>) -> Self {
        Self {
            kind: StateKind::Dead,
            ..Self::new(id, false)
        }
    }

    pub fn id(&self) -> &K {
        &self.id
    }

    pub fn is_final(&self) -> bool {
        self.is_final
    }

    pub fn set_final(&mut self, is_final: bool) {
        self.is_final = is_final;
    }

    pub fn kind(&self) -> StateKind {
        self.kind
    }

    pub fn is_dead(&self) -> bool {
        self.kind == StateKind::Dead
    }

    /// Builder-style counterpart of [`set_final`](Self::set_final); handy for
    /// dead states, which start out non-final.
    pub fn with_final(mut self, is_final: bool) -> Self {
        self.is_final = is_final;
        self
    }

    pub fn on_enter<F>(mut self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_enter = Some(Callback::new(f));
        self
    }

    pub fn on_loop_enter<F>(mut self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_loop_enter = Some(Callback::new(f));
        self
    }

    pub fn on_loop_exit<F>(mut self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_loop_exit = Some(Callback::new(f));
        self
    }

    /// Attach an exit callback. Fails for dead states.
    pub fn try_on_exit<F>(mut self, f: F) -> Result<Self, FsmError>
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.set_on_exit(Some(Callback::new(f)))?;
        Ok(self)
    }

    pub fn enter_callback(&self) -> Option<&Callback> {
        self.on_enter.as_ref()
    }

    /// The exit callback. Reading it from a dead state is an error.
    pub fn exit_callback(&self) -> Result<Option<&Callback>, FsmError> {
        match self.kind {
            StateKind::Regular => Ok(self.on_exit.as_ref()),
            StateKind::Dead => Err(FsmError::OnExitNotSupportedInDeadState {
                id: render(&self.id),
            }),
        }
    }

    pub fn loop_enter_callback(&self) -> Option<&Callback> {
        self.on_loop_enter.as_ref()
    }

    pub fn loop_exit_callback(&self) -> Option<&Callback> {
        self.on_loop_exit.as_ref()
    }

    pub fn set_on_enter(&mut self, callback: Option<Callback>) {
        self.on_enter = callback;
    }

    /// Replace the exit callback.
    ///
    /// Dead states accept only `None`, anything else fails with
    /// [`FsmError::OnExitNotSupportedInDeadState`].
    pub fn set_on_exit(&mut self, callback: Option<Callback>) -> Result<(), FsmError> {
        if self.is_dead() && callback.is_some() {
            return Err(FsmError::OnExitNotSupportedInDeadState {
                id: render(&self.id),
            });
        }
        self.on_exit = callback;
        Ok(())
    }

    pub fn set_on_loop_enter(&mut self, callback: Option<Callback>) {
        self.on_loop_enter = callback;
    }

    pub fn set_on_loop_exit(&mut self, callback: Option<Callback>) {
        self.on_loop_exit = callback;
    }

    /// The callback run when leaving this state. Dead states never have one.
    pub(crate) fn leave_callback(&self, looped: bool) -> Option<&Callback> {
        if looped {
            self.on_loop_exit.as_ref()
        } else if self.is_dead() {
            None
        } else {
            self.on_exit.as_ref()
        }
    }

    pub(crate) fn arrive_callback(&self, looped: bool) -> Option<&Callback> {
        if looped {
            self.on_loop_enter.as_ref()
        } else {
            self.on_enter.as_ref()
        }
    }
}

impl<K: Key> PartialEq for State<K> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<K: Key> Eq for State<K> {}

impl<K: Key> Hash for State<K> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
