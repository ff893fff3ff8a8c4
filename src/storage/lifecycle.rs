use std::sync::atomic::{AtomicU8, Ordering};

/// Where a node is in its lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Built, but the listener is not serving yet.
    Created,
    /// Serving requests.
    Running,
    /// Shut down or administratively disabled.
    Stopped,
}

impl LifecycleState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => LifecycleState::Created,
            1 => LifecycleState::Running,
            _ => LifecycleState::Stopped,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            LifecycleState::Created => 0,
            LifecycleState::Running => 1,
            LifecycleState::Stopped => 2,
        }
    }
}

/// Shared lifecycle flag, consulted before every local store access.
#[derive(Debug)]
pub struct NodeLifecycle {
    state: AtomicU8,
}

impl NodeLifecycle {
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(LifecycleState::Created.as_u8()),
        }
    }

    pub fn state(&self) -> LifecycleState {
        LifecycleState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn is_accepting(&self) -> bool {
        self.state() == LifecycleState::Running
    }

    pub fn start(&self) {
        self.transition(LifecycleState::Running);
    }

    pub fn stop(&self) {
        self.transition(LifecycleState::Stopped);
    }

    fn transition(&self, next: LifecycleState) {
        let previous = LifecycleState::from_u8(self.state.swap(next.as_u8(), Ordering::AcqRel));
        if previous != next {
            tracing::info!(from = ?previous, to = ?next, "node lifecycle changed");
        }
    }
}

impl Default for NodeLifecycle {
    fn default() -> Self {
        Self::new()
    }
}
