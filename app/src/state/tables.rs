//! Static item and location tables for the local game.
//!
//! Loaded once at startup and shared read-only. Lookups are by location
//! name (the game process reports names), location id (the session reports
//! ids), and item id.

use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;

use apbridge::{GameData, ItemDef, ItemId, LocationDef, LocationId};

pub struct Tables {
    game: String,
    items: Vec<ItemDef>,
    locations: Vec<LocationDef>,
    item_by_id: HashMap<ItemId, usize>,
    item_by_name: HashMap<String, usize>,
    location_by_id: HashMap<LocationId, usize>,
    location_by_name: HashMap<String, usize>,
}

impl Tables {
    pub fn new(data: GameData) -> Self {
        let GameData {
            game,
            items,
            locations,
        } = data;

        let mut item_by_id = HashMap::new();
        let mut item_by_name = HashMap::new();
        for (index, item) in items.iter().enumerate() {
            if let Some(id) = item.id
                && item_by_id.insert(id, index).is_some()
            {
                tracing::warn!("tables: duplicate item id {id} ('{}')", item.name);
            }
            item_by_name.insert(item.name.clone(), index);
        }

        let mut location_by_id = HashMap::new();
        let mut location_by_name = HashMap::new();
        for (index, location) in locations.iter().enumerate() {
            if let Some(id) = location.id
                && location_by_id.insert(id, index).is_some()
            {
                tracing::warn!("tables: duplicate location id {id} ('{}')", location.name);
            }
            location_by_name.insert(location.name.clone(), index);
        }

        Self {
            game,
            items,
            locations,
            item_by_id,
            item_by_name,
            location_by_id,
            location_by_name,
        }
    }

    /// Load tables from a JSON game data file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read game data {}", path.display()))?;
        let data: GameData = serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse game data {}", path.display()))?;
        let tables = Self::new(data);
        tracing::info!(
            "loaded {} items and {} locations for '{}' from {}",
            tables.items.len(),
            tables.locations.len(),
            tables.game,
            path.display()
        );
        Ok(tables)
    }

    pub fn game(&self) -> &str {
        &self.game
    }

    pub fn location(&self, name: &str) -> Option<&LocationDef> {
        self.location_by_name
            .get(name)
            .map(|&index| &self.locations[index])
    }

    pub fn location_by_id(&self, id: LocationId) -> Option<&LocationDef> {
        self.location_by_id
            .get(&id)
            .map(|&index| &self.locations[index])
    }

    /// Whether a session location id belongs to this game's table.
    pub fn owns(&self, id: LocationId) -> bool {
        self.location_by_id.contains_key(&id)
    }

    /// Every location id in the table (event markers excluded).
    pub fn location_ids(&self) -> impl Iterator<Item = LocationId> + '_ {
        self.location_by_id.keys().copied()
    }

    pub fn item(&self, id: ItemId) -> Option<&ItemDef> {
        self.item_by_id.get(&id).map(|&index| &self.items[index])
    }

    pub fn item_by_name(&self, name: &str) -> Option<&ItemDef> {
        self.item_by_name.get(name).map(|&index| &self.items[index])
    }
}

/// The bundled sample game, used as a test fixture.
#[cfg(test)]
pub(crate) fn sample() -> Tables {
    let data = serde_json::from_str(include_str!("../../data/game.json"))
        .expect("bundled game.json parses");
    Tables::new(data)
}
