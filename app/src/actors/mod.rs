//! Actor infrastructure: shared trait, bus helpers, and actor resolution.

pub mod mock;
pub mod scout;
pub mod session;
pub mod web;

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::bus::BusSender;
use crate::spoiler::JsonFileSink;
use crate::state::BridgeState;
use crate::state::config::BridgeConfig;

// ---------------------------------------------------------------------------
// Actor trait
// ---------------------------------------------------------------------------

/// Common trait for self-managed actors. Each actor struct holds its own
/// config; `start()` clones what it needs and spawns a task on the current
/// runtime.
pub trait Actor: Send + Sync {
    /// Spawn the actor's run loop. Subscriptions to the bus must be taken
    /// before returning so no event sent after `start()` is missed.
    fn start(&self, state: Arc<BridgeState>, sender: BusSender) -> JoinHandle<()>;

    /// Request the actor to stop. Default: cancel the task at its next
    /// suspension point.
    fn stop(&self, handle: &JoinHandle<()>) {
        handle.abort();
    }
}

// ---------------------------------------------------------------------------
// Actor resolution
// ---------------------------------------------------------------------------

/// A concrete actor ready to be started, resolved from config.
pub struct ResolvedActor {
    pub id: String,
    pub name: String,
    pub actor: Box<dyn Actor>,
}

/// Build the list of config-driven actors, in start order.
///
/// The session actor is not included: it is always on and must be started
/// before anything can push session events. The scouting coordinator comes
/// last so that it is the first to be stopped.
pub fn resolve_actors(config: &BridgeConfig) -> Vec<ResolvedActor> {
    let mut actors = Vec::new();

    if let Some(mock) = &config.mock_session
        && mock.enabled
    {
        actors.push(ResolvedActor {
            id: "mock_session".into(),
            name: "Mock Session".into(),
            actor: Box::new(mock::session::MockSessionActor {
                slot_name: config.session.slot_name.clone(),
            }),
        });
    }

    let addr = SocketAddr::from((Ipv4Addr::LOCALHOST, config.bridge.port));
    actors.push(ResolvedActor {
        id: "webserver".into(),
        name: "Web Server".into(),
        actor: Box::new(web::WebActor::new(addr)),
    });

    actors.push(ResolvedActor {
        id: "scout".into(),
        name: "Scouting Coordinator".into(),
        actor: Box::new(scout::ScoutActor {
            sink: Arc::new(JsonFileSink::new(config.session.spoiler.clone())),
        }),
    });

    actors
}

/// Start an actor with its own bus sender and register it in state.
pub fn start_actor(id: String, actor: Box<dyn Actor>, state: &Arc<BridgeState>, bus: &BusSender) {
    let sender = bus.for_actor(id.clone());
    let handle = actor.start(Arc::clone(state), sender);
    state.register_actor(id, actor, handle);
}

#[cfg(test)]
mod tests {
    use super::*;
    use apbridge::MockSessionSection;

    fn ids(config: &BridgeConfig) -> Vec<String> {
        resolve_actors(config).into_iter().map(|ra| ra.id).collect()
    }

    #[test]
    fn scout_is_resolved_after_webserver() {
        assert_eq!(ids(&BridgeConfig::default()), vec!["webserver", "scout"]);
    }

    #[test]
    fn mock_session_only_when_enabled() {
        let mut config = BridgeConfig::default();
        config.mock_session = Some(MockSessionSection { enabled: false });
        assert_eq!(ids(&config), vec!["webserver", "scout"]);
        config.mock_session = Some(MockSessionSection { enabled: true });
        assert_eq!(ids(&config), vec!["mock_session", "webserver", "scout"]);
    }
}
