//! Lifecycle and transition callbacks.

use std::fmt;
use std::sync::Arc;

/// A side-effecting hook invoked inline during [`Engine::step`](crate::engine::Engine::step).
///
/// Callbacks are shared, so cloning a [`State`](crate::core::State) or a
/// [`Transition`](crate::core::Transition) shares its hooks rather than
/// duplicating them. Identity is by pointer, see [`Callback::same_as`].
///
/// # Example
///
/// ```rust
/// use fsmkit::core::Callback;
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
///
/// let hits = Arc::new(AtomicUsize::new(0));
/// let counter = Arc::clone(&hits);
/// let callback = Callback::new(move || {
///     counter.fetch_add(1, Ordering::SeqCst);
/// });
///
/// callback.invoke();
/// callback.invoke();
/// assert_eq!(hits.load(Ordering::SeqCst), 2);
/// ```
#[derive(Clone)]
pub struct Callback(Arc<dyn Fn() + Send + Sync>);

impl Callback {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Run the hook.
    pub fn invoke(&self) {
        (self.0)()
    }

    /// True if both handles point at the same closure.
    pub fn same_as(&self, other: &Callback) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Callback")
    }
}

/// Invoke an optional hook; absence is a no-op.
pub(crate) fn fire(callback: Option<&Callback>) {
    if let Some(callback) = callback {
        callback.invoke();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn invoke_runs_closure() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let callback = Callback::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        callback.invoke();

        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn clones_share_identity() {
        let callback = Callback::new(|| {});
        let cloned = callback.clone();
        let other = Callback::new(|| {});

        assert!(callback.same_as(&cloned));
        assert!(!callback.same_as(&other));
    }

    #[test]
    fn fire_ignores_missing_callback() {
        fire(None);
    }
}
