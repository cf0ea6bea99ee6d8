//! Session actor: default actor that always runs and applies session pushes
//! to `BridgeState`.
//!
//! Subscribes to the bus and processes every `SessionEvent`: it is the only
//! consumer of inbound session traffic, so the store and the `connected` /
//! `scouted` flags always move together. This runs independently of the web
//! server and the scouting coordinator.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::actors::Actor;
use crate::bus::{BusReceiver, BusSender, PollError};
use crate::state::{BridgeState, ReceivedMerge, SlotContext};
use apbridge::{BridgeEvent, SessionCommand, SessionEvent};

/// Session actor. Always-on, not config-driven.
pub struct SessionActor;

impl Actor for SessionActor {
    fn start(&self, state: Arc<BridgeState>, sender: BusSender) -> JoinHandle<()> {
        let receiver = sender.subscribe();
        tokio::spawn(run(state, sender, receiver))
    }
}

async fn run(state: Arc<BridgeState>, sender: BusSender, mut receiver: BusReceiver) {
    loop {
        match receiver.recv().await {
            Err(PollError::Shutdown) => return,
            Ok(msg) => {
                if let BridgeEvent::Session(event) = msg.event {
                    apply_event(&state, &sender, event);
                }
            }
        }
    }
}

/// Apply one session push. Store mutations happen under a single lock; flag
/// transitions follow once the store is consistent.
pub(crate) fn apply_event(state: &BridgeState, sender: &BusSender, event: SessionEvent) {
    let tables = &state.tables;
    match event {
        SessionEvent::Connected {
            slot,
            team,
            slot_info,
            missing_locations,
            checked_locations,
            goal_location,
        } => {
            let goal_location = goal_location.or(state.system.snapshot().session.goal_location);
            let owned = state.with_store(|store| {
                // Item names usually arrive before the handshake.
                let item_names = std::mem::take(&mut store.item_names);
                store.reset();
                store.item_names = item_names;
                store.slot = Some(SlotContext {
                    slot,
                    team,
                    slot_info,
                    goal_location,
                });
                store.missing_locations = missing_locations;
                store.checked_locations = checked_locations;
                store.owned_locations(tables).len()
            });
            tracing::info!("session: connected as slot {slot} (team {team}), {owned} owned locations");
            state.scouted.clear();
            state.connected.set();
        }
        SessionEvent::Disconnected => {
            tracing::info!("session: disconnected");
            state.connected.clear();
            state.scouted.clear();
            state.with_store(|store| store.reset());
        }
        SessionEvent::ReceivedItems { index, items } => {
            let merge = state.with_store(|store| store.merge_received(index, &items));
            match merge {
                ReceivedMerge::Replaced | ReceivedMerge::Appended => {
                    tracing::debug!("session: received {} items at index {index}", items.len());
                }
                ReceivedMerge::Desync { expected, got } => {
                    tracing::warn!(
                        "session: received items at index {got}, expected {expected}; requesting sync"
                    );
                    sender.command(SessionCommand::Sync);
                }
            }
        }
        SessionEvent::LocationInfo { locations } => {
            let settled = state.with_store(|store| {
                for assignment in &locations {
                    store.assignments.insert(assignment.location, *assignment);
                }
                store.is_settled(tables)
            });
            tracing::debug!("session: {} location assignments", locations.len());
            if settled && !state.scouted.is_ready() {
                tracing::info!("session: scouting settled");
                state.scouted.set();
            }
        }
        SessionEvent::RoomUpdate {
            checked_locations,
            missing_locations,
        } => {
            let unscouted = state.with_store(|store| {
                for id in &checked_locations {
                    store.missing_locations.remove(id);
                }
                store.checked_locations.extend(checked_locations);
                let fresh: Vec<_> = missing_locations
                    .into_iter()
                    .filter(|id| !store.checked_locations.contains(id))
                    .collect();
                store.missing_locations.extend(fresh);
                store.has_unscouted(tables)
            });
            if unscouted {
                tracing::info!("session: new locations visible, rescouting");
                state.scouted.clear();
            }
        }
        SessionEvent::DataPackage { games } => {
            state.with_store(|store| {
                for (game, names) in games {
                    store.item_names.entry(game).or_default().extend(names);
                }
            });
        }
        SessionEvent::GoalReached => {
            tracing::info!("session: goal reached");
            state.with_store(|store| store.goal_reached = true);
        }
    }
}
