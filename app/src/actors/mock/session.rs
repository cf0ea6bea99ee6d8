//! Mock session actor: a single-player session backed by the local tables.
//!
//! Every location with an id whose vanilla item also has an id belongs to
//! the local slot, and scouting assigns each location its vanilla item.
//! Useful for exercising the full pipeline without a server.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::info;

use crate::actors::Actor;
use crate::bus::{BusReceiver, BusSender, PollError};
use crate::state::{BridgeState, Tables};
use apbridge::{
    BridgeEvent, ItemFlags, LocationId, NetworkItem, SessionCommand, SessionEvent, SlotId,
    SlotInfo,
};

const MOCK_SLOT: SlotId = 1;

/// Mock session actor. Announces itself on start and answers commands.
pub struct MockSessionActor {
    pub slot_name: String,
}

impl Actor for MockSessionActor {
    fn start(&self, state: Arc<BridgeState>, sender: BusSender) -> JoinHandle<()> {
        let receiver = sender.subscribe();
        let world = MockWorld::new(&state.tables, &self.slot_name);
        tokio::spawn(run(world, sender, receiver))
    }
}

async fn run(mut world: MockWorld, sender: BusSender, mut receiver: BusReceiver) {
    info!(
        "mock: session for '{}' with {} locations",
        world.slot_info.name,
        world.assignments.len()
    );
    sender.push(world.connected());

    loop {
        match receiver.recv().await {
            Err(PollError::Shutdown) => return,
            Ok(msg) => {
                if let BridgeEvent::Command(cmd) = msg.event {
                    for event in world.handle(cmd) {
                        sender.push(event);
                    }
                }
            }
        }
    }
}

/// Server-side state of the mock session.
pub struct MockWorld {
    slot_info: SlotInfo,
    assignments: HashMap<LocationId, NetworkItem>,
    missing: HashSet<LocationId>,
    checked: HashSet<LocationId>,
    received: Vec<NetworkItem>,
}

impl MockWorld {
    pub fn new(tables: &Tables, slot_name: &str) -> Self {
        let assignments: HashMap<_, _> = tables
            .location_ids()
            .filter_map(|location| {
                let def = tables.location_by_id(location)?;
                let item = tables.item_by_name(&def.vanilla_item)?;
                let flags = if item.is_progressive() {
                    ItemFlags::PROGRESSION
                } else {
                    0
                };
                Some((
                    location,
                    NetworkItem {
                        item: item.id?,
                        location,
                        player: MOCK_SLOT,
                        flags: ItemFlags(flags),
                    },
                ))
            })
            .collect();

        Self {
            slot_info: SlotInfo {
                name: slot_name.to_string(),
                game: tables.game().to_string(),
            },
            missing: assignments.keys().copied().collect(),
            assignments,
            checked: HashSet::new(),
            received: Vec::new(),
        }
    }

    pub fn connected(&self) -> SessionEvent {
        SessionEvent::Connected {
            slot: MOCK_SLOT,
            team: 0,
            slot_info: HashMap::from([(MOCK_SLOT, self.slot_info.clone())]),
            missing_locations: self.missing.clone(),
            checked_locations: self.checked.clone(),
            goal_location: None,
        }
    }

    /// Answer one command with the events a session would push back.
    pub fn handle(&mut self, cmd: SessionCommand) -> Vec<SessionEvent> {
        match cmd {
            SessionCommand::LocationScouts { locations } => {
                let locations = locations
                    .iter()
                    .filter_map(|id| self.assignments.get(id).copied())
                    .collect();
                vec![SessionEvent::LocationInfo { locations }]
            }
            SessionCommand::LocationChecks { locations } => {
                let new: Vec<_> = locations
                    .into_iter()
                    .filter(|id| self.missing.remove(id))
                    .collect();
                if new.is_empty() {
                    return Vec::new();
                }
                self.checked.extend(&new);

                let index = self.received.len();
                let items: Vec<_> = new
                    .iter()
                    .filter_map(|id| self.assignments.get(id).copied())
                    .collect();
                self.received.extend_from_slice(&items);
                info!("mock: {} checks, {} items granted", new.len(), items.len());

                vec![
                    SessionEvent::RoomUpdate {
                        checked_locations: new.into_iter().collect(),
                        missing_locations: HashSet::new(),
                    },
                    SessionEvent::ReceivedItems { index, items },
                ]
            }
            SessionCommand::Sync => vec![SessionEvent::ReceivedItems {
                index: 0,
                items: self.received.clone(),
            }],
            SessionCommand::CreateHints { locations } => {
                for id in locations {
                    match self.assignments.get(&id) {
                        Some(item) => info!("mock: hint: location {id} holds item {}", item.item),
                        None => info!("mock: hint: location {id} is not in this session"),
                    }
                }
                Vec::new()
            }
            SessionCommand::GoalComplete => {
                info!("mock: goal complete");
                vec![SessionEvent::GoalReached]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::actors::session::SessionActor;
    use crate::bus;
    use crate::state::{tables, testing};
    use apbridge::{Channel, GameData, ItemDef, LocationDef};

    #[test]
    fn owns_every_location_with_an_assignable_item() {
        let world = MockWorld::new(&tables::sample(), "Ace");
        let SessionEvent::Connected {
            missing_locations,
            slot_info,
            ..
        } = world.connected()
        else {
            unreachable!()
        };
        let mut ids: Vec<_> = missing_locations.into_iter().collect();
        ids.sort();
        assert_eq!(ids, vec![1000, 1001, 1002, 1003, 1004, 1005]);
        assert_eq!(slot_info[&MOCK_SLOT].game, "Starfront");
    }

    #[test]
    fn location_with_unassignable_item_is_not_owned() {
        let tables = Tables::new(GameData {
            game: "Starfront".into(),
            items: vec![ItemDef {
                name: "Medal".into(),
                id: None,
                channel: Channel::Strategy,
                category: "Event".into(),
                stages: None,
            }],
            locations: vec![LocationDef {
                name: "Parade".into(),
                id: Some(2000),
                vanilla_item: "Medal".into(),
            }],
        });
        let SessionEvent::Connected {
            missing_locations, ..
        } = MockWorld::new(&tables, "Ace").connected()
        else {
            unreachable!()
        };
        assert!(missing_locations.is_empty());
    }

    #[test]
    fn checks_grant_items_once_and_sync_replays() {
        let mut world = MockWorld::new(&tables::sample(), "Ace");
        let events = world.handle(SessionCommand::LocationChecks {
            locations: vec![1000, 1002],
        });
        assert_eq!(events.len(), 2);
        let SessionEvent::ReceivedItems { index, items } = &events[1] else {
            panic!("expected received items, got {:?}", events[1]);
        };
        assert_eq!(*index, 0);
        assert_eq!(items.iter().map(|i| i.item).collect::<Vec<_>>(), vec![100, 101]);
        assert!(items[1].flags.is_progression());

        assert!(
            world
                .handle(SessionCommand::LocationChecks {
                    locations: vec![1000]
                })
                .is_empty()
        );

        let events = world.handle(SessionCommand::LocationChecks {
            locations: vec![1004],
        });
        let SessionEvent::ReceivedItems { index, .. } = &events[1] else {
            panic!("expected received items");
        };
        assert_eq!(*index, 2);

        let SessionEvent::ReceivedItems { index, items } = &world.handle(SessionCommand::Sync)[0]
        else {
            panic!("expected received items");
        };
        assert_eq!((*index, items.len()), (0, 3));
    }

    #[tokio::test]
    async fn drives_session_state_end_to_end() {
        let state = testing::state();
        let bus = bus::channel("main");
        let session = SessionActor.start(Arc::clone(&state), bus.for_actor("session"));
        let mock = MockSessionActor {
            slot_name: "Ace".into(),
        }
        .start(Arc::clone(&state), bus.for_actor("mock_session"));

        tokio::time::timeout(Duration::from_secs(1), state.connected.await_ready())
            .await
            .unwrap();
        state.with_store(|store| store.extend_scouted(&state.tables));
        bus.command(SessionCommand::LocationScouts {
            locations: vec![1000, 1001, 1002, 1003, 1004, 1005],
        });
        tokio::time::timeout(Duration::from_secs(1), state.scouted.await_ready())
            .await
            .unwrap();

        session.abort();
        mock.abort();
    }
}
