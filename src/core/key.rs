//! Bound shared by state ids and transition symbols.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::hash::Hash;

/// Trait for state ids and input symbols.
///
/// Identity is decided by `Eq` + `Hash` alone. Keys must be serializable so
/// that an engine can be captured in a [`Snapshot`](crate::snapshot::Snapshot).
///
/// Implemented automatically for every type meeting the bounds, so `String`,
/// integers, `char` and plain unit enums deriving serde all work out of the box.
pub trait Key:
    Clone + Eq + Hash + Debug + Serialize + for<'de> Deserialize<'de> + Send + Sync + 'static
{
}

impl<T> Key for T where
    T: Clone + Eq + Hash + Debug + Serialize + for<'de> Deserialize<'de> + Send + Sync + 'static
{
}
