//! Two-valued flag with independent waits on both transitions.
//!
//! Backed by a `watch` channel so every waiter is woken on each transition
//! and a waiter arriving after the fact sees the current value immediately.

use tokio::sync::watch;

#[derive(Debug, Clone, Copy)]
struct Phase {
    ready: bool,
    /// Bumped on every `set()` that changes state and on every `clear()`.
    generation: u64,
}

pub struct DualState {
    tx: watch::Sender<Phase>,
}

impl Default for DualState {
    fn default() -> Self {
        Self::new()
    }
}

impl DualState {
    /// Create a flag in the not-ready state.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(Phase {
            ready: false,
            generation: 0,
        });
        Self { tx }
    }

    /// Mark ready. No-op (and no wakeup) if already ready.
    pub fn set(&self) {
        self.tx.send_if_modified(|phase| {
            if phase.ready {
                return false;
            }
            phase.ready = true;
            phase.generation += 1;
            true
        });
    }

    /// Mark not-ready. Always counts as a transition, so a waiter on
    /// `await_generation_after` sees a repeated invalidation.
    pub fn clear(&self) {
        self.tx.send_modify(|phase| {
            phase.ready = false;
            phase.generation += 1;
        });
    }

    pub fn is_ready(&self) -> bool {
        self.tx.borrow().ready
    }

    pub fn generation(&self) -> u64 {
        self.tx.borrow().generation
    }

    /// Resolve once the flag is ready (immediately if it already is).
    pub async fn await_ready(&self) {
        self.wait_for(|phase| phase.ready).await;
    }

    /// Resolve once the flag is not ready (immediately if it already is not).
    pub async fn await_not_ready(&self) {
        self.wait_for(|phase| !phase.ready).await;
    }

    /// Resolve once any transition has happened after `generation`.
    pub async fn await_generation_after(&self, generation: u64) {
        self.wait_for(|phase| phase.generation > generation).await;
    }

    async fn wait_for(&self, f: impl FnMut(&Phase) -> bool) {
        let mut rx = self.tx.subscribe();
        // The sender lives in `self`, so the channel cannot close under us.
        let _ = rx.wait_for(f).await;
    }
}
