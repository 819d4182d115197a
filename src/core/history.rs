//! Step history tracking.
//!
//! Records every executed step so a host can inspect the path a machine took.

use super::key::Key;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;

/// Record of a single executed step.
///
/// # Example
///
/// ```rust
/// use fsmkit::core::StepRecord;
/// use chrono::Utc;
///
/// let record: StepRecord<String, char> = StepRecord {
///     symbol: 'a',
///     from: "q0".to_string(),
///     to: "q1".to_string(),
///     looped: false,
///     timestamp: Utc::now(),
/// };
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StepRecord<K: Key, Sym: Key> {
    /// The symbol that drove the step
    pub symbol: Sym,
    /// The state being left
    pub from: K,
    /// The state being entered
    pub to: K,
    /// Whether the loop variants of the callbacks fired
    pub looped: bool,
    /// When the step completed
    pub timestamp: DateTime<Utc>,
}

/// Ordered history of executed steps, optionally bounded.
///
/// When a limit is set the oldest records are dropped first.
///
/// # Example
///
/// ```rust
/// use fsmkit::core::{StepHistory, StepRecord};
/// use chrono::Utc;
///
/// let mut history: StepHistory<String, char> = StepHistory::new();
///
/// history.record(StepRecord {
///     symbol: 'a',
///     from: "q0".to_string(),
///     to: "q1".to_string(),
///     looped: false,
///     timestamp: Utc::now(),
/// });
/// history.record(StepRecord {
///     symbol: 'b',
///     from: "q1".to_string(),
///     to: "q1".to_string(),
///     looped: true,
///     timestamp: Utc::now(),
/// });
///
/// let path = history.get_path();
/// assert_eq!(path.len(), 3); // q0 -> q1 -> q1
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StepHistory<K: Key, Sym: Key> {
    steps: VecDeque<StepRecord<K, Sym>>,
    limit: Option<usize>,
}

impl<K: Key, Sym: Key> Default for StepHistory<K, Sym> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Key, Sym: Key> StepHistory<K, Sym> {
    /// Create an unbounded, empty history.
    pub fn new() -> Self {
        Self {
            steps: VecDeque::new(),
            limit: None,
        }
    }

    /// Create an empty history that keeps at most `limit` records.
    pub fn bounded(limit: usize) -> Self {
        Self {
            steps: VecDeque::with_capacity(limit),
            limit: Some(limit),
        }
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Append a record, evicting the oldest one if the limit is reached.
    pub fn record(&mut self, step: StepRecord<K, Sym>) {
        if let Some(limit) = self.limit {
            if limit == 0 {
                return;
            }
            while self.steps.len() >= limit {
                self.steps.pop_front();
            }
        }
        self.steps.push_back(step);
    }

    /// Get the path of states traversed.
    ///
    /// Returns the `from` state of the oldest retained record, then the `to`
    /// state of every record.
    pub fn get_path(&self) -> Vec<&K> {
        let mut path = Vec::with_capacity(self.steps.len() + 1);
        if let Some(first) = self.steps.front() {
            path.push(&first.from);
        }
        path.extend(self.steps.iter().map(|step| &step.to));
        path
    }

    /// Time between the oldest and newest retained records.
    pub fn duration(&self) -> Option<Duration> {
        let (first, last) = (self.steps.front()?, self.steps.back()?);
        last.timestamp
            .signed_duration_since(first.timestamp)
            .to_std()
            .ok()
    }

    pub fn steps(&self) -> impl Iterator<Item = &StepRecord<K, Sym>> {
        self.steps.iter()
    }

    pub fn last(&self) -> Option<&StepRecord<K, Sym>> {
        self.steps.back()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn clear(&mut self) {
        self.steps.clear();
    }
}
