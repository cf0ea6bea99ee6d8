//! Session-state store: everything the session has told us, plus the
//! checks we observed locally.
//!
//! Lives behind a mutex on `BridgeState`. Every mutation is a synchronous
//! method call, so a batch is applied completely before any other task can
//! observe the store.

use std::collections::{HashMap, HashSet};

use apbridge::{ItemId, LocationId, NetworkItem, SlotId, SlotInfo};

use super::tables::Tables;

/// Our identity within the connected session.
#[derive(Debug, Clone)]
pub struct SlotContext {
    pub slot: SlotId,
    pub team: u32,
    pub slot_info: HashMap<SlotId, SlotInfo>,
    pub goal_location: Option<String>,
}

/// Result of merging a received-items push into the sequence.
#[derive(Debug, PartialEq, Eq)]
pub enum ReceivedMerge {
    /// Sequence replaced from index 0.
    Replaced,
    /// Items appended at the end.
    Appended,
    /// Push does not line up with what we hold; a resync is needed.
    Desync { expected: usize, got: usize },
}

#[derive(Debug, Default)]
pub struct SessionStore {
    pub slot: Option<SlotContext>,
    /// Append-only, in arrival order.
    pub received: Vec<NetworkItem>,
    /// Server-known locations not yet checked.
    pub missing_locations: HashSet<LocationId>,
    /// Server-confirmed checks.
    pub checked_locations: HashSet<LocationId>,
    /// Checks observed by the game process; may run ahead of the server.
    pub local_checked: HashSet<LocationId>,
    /// Locations whose assignments we have asked for.
    pub scouted: HashSet<LocationId>,
    /// Assignment results, keyed by location.
    pub assignments: HashMap<LocationId, NetworkItem>,
    /// Foreign item names, per game.
    pub item_names: HashMap<String, HashMap<ItemId, String>>,
    pub goal_reached: bool,
}

impl SessionStore {
    /// Drop everything learned from the session.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn local_slot(&self) -> Option<SlotId> {
        self.slot.as_ref().map(|s| s.slot)
    }

    pub fn slot_info(&self, slot: SlotId) -> Option<&SlotInfo> {
        self.slot.as_ref().and_then(|s| s.slot_info.get(&slot))
    }

    pub fn goal_location(&self) -> Option<&str> {
        self.slot.as_ref().and_then(|s| s.goal_location.as_deref())
    }

    /// Session-known locations that belong to our static table.
    pub fn owned_locations(&self, tables: &Tables) -> HashSet<LocationId> {
        self.missing_locations
            .iter()
            .chain(&self.checked_locations)
            .copied()
            .filter(|&id| tables.owns(id))
            .collect()
    }

    /// Checked either by the server or locally.
    pub fn is_checked(&self, id: LocationId) -> bool {
        self.checked_locations.contains(&id) || self.local_checked.contains(&id)
    }

    /// Whether an owned location is missing from the scouted set.
    pub fn has_unscouted(&self, tables: &Tables) -> bool {
        self.owned_locations(tables)
            .iter()
            .any(|id| !self.scouted.contains(id))
    }

    /// Scouting is settled once every owned location has been scouted and
    /// every scouted location has an assignment.
    pub fn is_settled(&self, tables: &Tables) -> bool {
        !self.has_unscouted(tables)
            && self
                .scouted
                .iter()
                .all(|id| self.assignments.contains_key(id))
    }

    /// Add every owned location to the scouted set and return the full
    /// running set, sorted.
    pub fn extend_scouted(&mut self, tables: &Tables) -> Vec<LocationId> {
        let owned = self.owned_locations(tables);
        self.scouted.extend(owned);
        let mut ids: Vec<_> = self.scouted.iter().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Merge a received-items push starting at `index`.
    pub fn merge_received(&mut self, index: usize, items: &[NetworkItem]) -> ReceivedMerge {
        if index == 0 {
            self.received = items.to_vec();
            ReceivedMerge::Replaced
        } else if index == self.received.len() {
            self.received.extend_from_slice(items);
            ReceivedMerge::Appended
        } else {
            ReceivedMerge::Desync {
                expected: self.received.len(),
                got: index,
            }
        }
    }

    /// Take the locally checked locations the server still lists as missing.
    /// They move to the checked set so a repeat call yields nothing.
    pub fn take_new_checks(&mut self) -> Vec<LocationId> {
        let mut new: Vec<_> = self
            .local_checked
            .intersection(&self.missing_locations)
            .copied()
            .collect();
        new.sort_unstable();
        for id in &new {
            self.missing_locations.remove(id);
            self.checked_locations.insert(*id);
        }
        new
    }

    /// Best-effort display name for an item belonging to `game`. Items of
    /// an unknown game cannot be named.
    pub fn item_name(&self, tables: &Tables, game: Option<&str>, id: ItemId) -> String {
        let name = match game {
            Some(g) if g == tables.game() => tables.item(id).map(|item| item.name.clone()),
            Some(g) => self.item_names.get(g).and_then(|names| names.get(&id)).cloned(),
            None => None,
        };
        name.unwrap_or_else(|| format!("Unknown item {id}"))
    }

    /// Display name of an assigned item, resolved in its owner's game.
    pub fn assigned_item_name(&self, tables: &Tables, assignment: &NetworkItem) -> String {
        let game = if self.local_slot() == Some(assignment.player) {
            Some(tables.game())
        } else {
            self.slot_info(assignment.player).map(|info| info.game.as_str())
        };
        self.item_name(tables, game, assignment.item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::tables;

    fn item(item: ItemId, location: LocationId, player: SlotId) -> NetworkItem {
        NetworkItem {
            item,
            location,
            player,
            flags: Default::default(),
        }
    }

    #[test]
    fn owned_locations_filter_foreign_ids() {
        let tables = tables::sample();
        let mut store = SessionStore::default();
        store.missing_locations.extend([1000, 1001, 5555]);
        store.checked_locations.insert(1002);
        let mut owned: Vec<_> = store.owned_locations(&tables).into_iter().collect();
        owned.sort();
        assert_eq!(owned, vec![1000, 1001, 1002]);
    }

    #[test]
    fn settled_requires_scouted_superset_and_assignments() {
        let tables = tables::sample();
        let mut store = SessionStore::default();
        store.missing_locations.extend([1000, 1001]);
        assert!(!store.is_settled(&tables));

        assert_eq!(store.extend_scouted(&tables), vec![1000, 1001]);
        assert!(!store.is_settled(&tables));

        store.assignments.insert(1000, item(100, 1000, 1));
        assert!(!store.is_settled(&tables));
        store.assignments.insert(1001, item(102, 1001, 1));
        assert!(store.is_settled(&tables));

        store.missing_locations.insert(1003);
        assert!(store.has_unscouted(&tables));
        assert!(!store.is_settled(&tables));
    }

    #[test]
    fn scouted_set_keeps_growing_across_rounds() {
        let tables = tables::sample();
        let mut store = SessionStore::default();
        store.missing_locations.insert(1000);
        store.extend_scouted(&tables);
        store.missing_locations.clear();
        store.missing_locations.insert(1004);
        assert_eq!(store.extend_scouted(&tables), vec![1000, 1004]);
    }

    #[test]
    fn received_merge_appends_replaces_and_detects_gaps() {
        let mut store = SessionStore::default();
        assert_eq!(
            store.merge_received(0, &[item(100, 1, 1)]),
            ReceivedMerge::Replaced
        );
        assert_eq!(
            store.merge_received(1, &[item(102, 2, 1)]),
            ReceivedMerge::Appended
        );
        assert_eq!(
            store.merge_received(5, &[item(103, 3, 1)]),
            ReceivedMerge::Desync {
                expected: 2,
                got: 5
            }
        );
        assert_eq!(store.received.len(), 2);
        assert_eq!(store.received[1].item, 102);
    }

    #[test]
    fn new_checks_are_taken_once() {
        let mut store = SessionStore::default();
        store.missing_locations.extend([1000, 1001]);
        store.local_checked.extend([1000, 1003]);
        assert_eq!(store.take_new_checks(), vec![1000]);
        assert!(store.take_new_checks().is_empty());
        assert!(store.is_checked(1000));
        assert!(store.checked_locations.contains(&1000));
    }

    #[test]
    fn item_names_fall_back_gracefully() {
        let tables = tables::sample();
        let mut store = SessionStore::default();
        store.item_names.insert(
            "Other".into(),
            HashMap::from([(7, "Boomerang".to_string())]),
        );
        assert_eq!(store.item_name(&tables, None, 100), "Unknown item 100");
        assert_eq!(store.item_name(&tables, Some("Starfront"), 103), "Ion Cannon");
        assert_eq!(store.item_name(&tables, Some("Other"), 7), "Boomerang");
        assert_eq!(store.item_name(&tables, Some("Other"), 8), "Unknown item 8");
    }

    #[test]
    fn assigned_items_resolve_in_owner_game() {
        let tables = tables::sample();
        let mut store = SessionStore::default();
        store.slot = Some(SlotContext {
            slot: 1,
            team: 0,
            slot_info: HashMap::from([(
                2,
                SlotInfo {
                    name: "Bea".into(),
                    game: "Other".into(),
                },
            )]),
            goal_location: None,
        });
        store.item_names.insert(
            "Other".into(),
            HashMap::from([(100, "Boomerang".to_string())]),
        );
        assert_eq!(store.assigned_item_name(&tables, &item(100, 1000, 1)), "Frigate");
        assert_eq!(store.assigned_item_name(&tables, &item(100, 1000, 2)), "Boomerang");
        assert_eq!(
            store.assigned_item_name(&tables, &item(100, 1000, 9)),
            "Unknown item 100"
        );
    }
}
