//! Validity lifecycle of an engine.

/// Whether the engine's structure has been validated since its last change.
///
/// ```text
/// Clean --(mutation)--> Dirty --(validate ok)--> Clean
/// ```
///
/// Stepping is only permitted while `Clean`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Lifecycle {
    #[default]
    Clean,
    Dirty,
}

impl Lifecycle {
    pub fn is_dirty(self) -> bool {
        self == Lifecycle::Dirty
    }

    pub fn is_clean(self) -> bool {
        self == Lifecycle::Clean
    }
}
