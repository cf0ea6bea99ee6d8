//! Shared domain types used by both the unified bus and the bridge state.
//!
//! These are pure data structures with no channel affinity. The bus message
//! types in `message.rs` and the response blocks in `api.rs` reference them.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Numeric location identifier as known to the session.
pub type LocationId = i64;

/// Numeric item identifier as known to the session.
pub type ItemId = i64;

/// Slot number of a player within the session. Slot 0 is the server itself.
pub type SlotId = u32;

// ---------------------------------------------------------------------------
// Channel
// ---------------------------------------------------------------------------

/// Delivery channel (item layer). The two channels are sequenced
/// independently by the game process.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Channel {
    Strategy,
    Tactical,
}

// ---------------------------------------------------------------------------
// Network items
// ---------------------------------------------------------------------------

/// Classification bits attached to a network item by the session.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct ItemFlags(pub u8);

impl ItemFlags {
    pub const PROGRESSION: u8 = 0b001;
    pub const USEFUL: u8 = 0b010;
    pub const TRAP: u8 = 0b100;

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn is_progression(self) -> bool {
        self.0 & Self::PROGRESSION != 0
    }
}

/// An item as pushed by the session: which item, where it came from, and
/// who owns it.
///
/// In a received-items list `player` is the sender; in a location-info list
/// it is the player the item is for.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct NetworkItem {
    pub item: ItemId,
    pub location: LocationId,
    pub player: SlotId,
    #[serde(default)]
    pub flags: ItemFlags,
}

/// Per-slot metadata announced by the session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SlotInfo {
    pub name: String,
    pub game: String,
}

impl fmt::Display for SlotInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.game)
    }
}

// ---------------------------------------------------------------------------
// Static game data
// ---------------------------------------------------------------------------

fn default_category() -> String {
    "Item".into()
}

/// One item in the game's static item table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ItemDef {
    pub name: String,
    #[serde(default)]
    pub id: Option<ItemId>,
    pub channel: Channel,
    /// Bracketed tag shown to the game process on delivery.
    #[serde(default = "default_category")]
    pub category: String,
    /// Stage names for progressive items; receipt N resolves to stage N.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stages: Option<Vec<String>>,
}

impl ItemDef {
    pub fn is_progressive(&self) -> bool {
        self.stages.is_some()
    }
}

/// One location in the game's static location table. A location without an
/// id is a narrative event marker and is never reported to the session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LocationDef {
    pub name: String,
    #[serde(default)]
    pub id: Option<LocationId>,
    /// Item placed here when the location is played outside the session.
    pub vanilla_item: String,
}

/// The full static description of one game, as loaded from disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameData {
    pub game: String,
    #[serde(default)]
    pub items: Vec<ItemDef>,
    #[serde(default)]
    pub locations: Vec<LocationDef>,
}
