pub mod config;
mod dual;
mod session;
pub mod tables;

pub use dual::DualState;
pub use session::{ReceivedMerge, SessionStore, SlotContext};
pub use tables::Tables;

use std::sync::Mutex;

use tokio::task::JoinHandle;

use crate::actors::Actor;
use config::SystemConfig;

/// Root entry point for all managed bridge state.
///
/// Passed as `Arc<BridgeState>` to all actors and the web layer. The store
/// is only reachable through `with_store`, which takes a synchronous
/// closure, so the lock can never be held across an `.await`.
pub struct BridgeState {
    pub system: SystemConfig,
    pub tables: Tables,
    /// Ready while a session handshake is in effect.
    pub connected: DualState,
    /// Ready while every owned location has a known assignment.
    pub scouted: DualState,
    store: Mutex<SessionStore>,
    actors: Mutex<Vec<RegisteredActor>>,
}

struct RegisteredActor {
    id: String,
    actor: Box<dyn Actor>,
    handle: JoinHandle<()>,
}

impl BridgeState {
    pub fn new(system: SystemConfig, tables: Tables) -> Self {
        Self {
            system,
            tables,
            connected: DualState::new(),
            scouted: DualState::new(),
            store: Mutex::new(SessionStore::default()),
            actors: Mutex::new(Vec::new()),
        }
    }

    /// Run a closure with exclusive access to the session store.
    pub fn with_store<R>(&self, f: impl FnOnce(&mut SessionStore) -> R) -> R {
        let mut guard = self.store.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut guard)
    }

    // ----- Actor registry -----

    /// Register a started actor with its task handle.
    pub fn register_actor(&self, id: String, actor: Box<dyn Actor>, handle: JoinHandle<()>) {
        self.actors
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(RegisteredActor { id, actor, handle });
    }

    /// Registered actor IDs, in start order.
    pub fn actor_ids(&self) -> Vec<String> {
        self.actors
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(|a| a.id.clone())
            .collect()
    }

    /// Stop every actor in reverse start order, waiting for each task to
    /// finish before stopping the next.
    pub async fn stop_all(&self) {
        let registered = std::mem::take(&mut *self.actors.lock().unwrap_or_else(|e| e.into_inner()));
        for RegisteredActor { id, actor, handle } in registered.into_iter().rev() {
            tracing::info!("stopping actor '{id}'");
            actor.stop(&handle);
            match handle.await {
                Ok(()) => {}
                Err(e) if e.is_cancelled() => {}
                Err(e) => tracing::warn!("actor '{id}' panicked: {e}"),
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::path::PathBuf;
    use std::sync::Arc;

    use apbridge::{BridgeConfig, SessionEvent, SlotInfo};

    use super::*;

    /// Local slot used by fixtures.
    pub const SLOT: u32 = 1;

    pub fn state() -> Arc<BridgeState> {
        let mut config = BridgeConfig::default();
        config.session.goal_location = Some("Homeworld Falls".into());
        Arc::new(BridgeState::new(
            SystemConfig::from_config(PathBuf::from("test.toml"), config),
            tables::sample(),
        ))
    }

    /// A handshake for slot 1 ("Ace", Starfront) with slot 2 ("Bea",
    /// Other Game) in the roster and every sample location missing.
    pub fn connected_event() -> SessionEvent {
        SessionEvent::Connected {
            slot: SLOT,
            team: 0,
            slot_info: [
                (
                    1,
                    SlotInfo {
                        name: "Ace".into(),
                        game: "Starfront".into(),
                    },
                ),
                (
                    2,
                    SlotInfo {
                        name: "Bea".into(),
                        game: "Other Game".into(),
                    },
                ),
            ]
            .into(),
            missing_locations: [1000, 1001, 1002, 1003, 1004, 1005].into(),
            checked_locations: Default::default(),
            goal_location: None,
        }
    }
}
