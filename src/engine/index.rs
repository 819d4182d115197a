//! Symbol-major routing table.
//!
//! Laid out as `symbol -> source -> (destination, callback)`. The alphabet is
//! exactly the set of symbols with a non-empty bucket; emptied buckets are
//! dropped immediately.

use crate::core::{Callback, Key, Transition};
use std::collections::HashMap;

/// Where a `(symbol, source)` pair leads.
#[derive(Clone, Debug)]
pub struct Route<K: Key> {
    dst: K,
    callback: Option<Callback>,
}

impl<K: Key> Route<K> {
    pub fn dst(&self) -> &K {
        &self.dst
    }

    pub fn callback(&self) -> Option<&Callback> {
        self.callback.as_ref()
    }

    /// True if this route leads to `dst` and carries the same callback.
    pub fn matches<Sym: Key>(&self, transition: &Transition<K, Sym>) -> bool {
        let same_callback = match (&self.callback, transition.callback()) {
            (Some(a), Some(b)) => a.same_as(b),
            (None, None) => true,
            _ => false,
        };
        &self.dst == transition.dst() && same_callback
    }
}

#[derive(Clone, Debug)]
pub(crate) struct TransitionIndex<K: Key, Sym: Key> {
    buckets: HashMap<Sym, HashMap<K, Route<K>>>,
}

impl<K: Key, Sym: Key> Default for TransitionIndex<K, Sym> {
    fn default() -> Self {
        Self {
            buckets: HashMap::new(),
        }
    }
}

impl<K: Key, Sym: Key> TransitionIndex<K, Sym> {
    pub(crate) fn route(&self, symbol: &Sym, src: &K) -> Option<&Route<K>> {
        self.buckets.get(symbol)?.get(src)
    }

    pub(crate) fn contains(&self, symbol: &Sym, src: &K) -> bool {
        self.route(symbol, src).is_some()
    }

    /// Callers must have checked [`contains`](Self::contains) first; an
    /// existing route is overwritten.
    pub(crate) fn insert(&mut self, transition: &Transition<K, Sym>) {
        self.buckets
            .entry(transition.symbol().clone())
            .or_default()
            .insert(
                transition.src().clone(),
                Route {
                    dst: transition.dst().clone(),
                    callback: transition.callback().cloned(),
                },
            );
    }

    pub(crate) fn remove(&mut self, symbol: &Sym, src: &K) {
        if let Some(bucket) = self.buckets.get_mut(symbol) {
            bucket.remove(src);
            if bucket.is_empty() {
                self.buckets.remove(symbol);
            }
        }
    }

    /// Drop every route leaving or entering `state`.
    pub(crate) fn remove_state(&mut self, state: &K) {
        for bucket in self.buckets.values_mut() {
            bucket.retain(|src, route| src != state && &route.dst != state);
        }
        self.buckets.retain(|_, bucket| !bucket.is_empty());
    }

    /// Destinations reachable from `src` in one step.
    pub(crate) fn successors<'a>(&'a self, src: &'a K) -> impl Iterator<Item = &'a K> + 'a {
        self.buckets
            .values()
            .filter_map(move |bucket| bucket.get(src))
            .map(Route::dst)
    }

    pub(crate) fn alphabet(&self) -> impl Iterator<Item = &Sym> {
        self.buckets.keys()
    }

    pub(crate) fn alphabet_len(&self) -> usize {
        self.buckets.len()
    }

    pub(crate) fn has_symbol(&self, symbol: &Sym) -> bool {
        self.buckets.contains_key(symbol)
    }
}
