//! Unified `BridgeMessage` bus types.
//!
//! All traffic between the bridge core and the session client flows through
//! a single `broadcast<BridgeMessage>` channel. Each message has a source
//! (id of the originating actor), a timestamp, and a typed event: either a
//! push from the session (`SessionEvent`) or a request to it
//! (`SessionCommand`). Producers create messages; consumers subscribe and
//! filter.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{ItemId, LocationId, NetworkItem, SlotId, SlotInfo};

// ---------------------------------------------------------------------------
// Top-level message
// ---------------------------------------------------------------------------

/// A single event on the unified bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeMessage {
    #[serde(default)]
    pub source: String,
    pub timestamp: DateTime<Utc>,
    pub event: BridgeEvent,
}

impl BridgeMessage {
    /// Create a new message with the current UTC timestamp. The bus sender
    /// stamps the originator.
    pub fn new(event: impl Into<BridgeEvent>) -> Self {
        Self {
            source: String::new(),
            timestamp: Utc::now(),
            event: event.into(),
        }
    }
}

/// Bus event payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BridgeEvent {
    /// Pushed by the session client.
    Session(SessionEvent),
    /// Emitted by the bridge core for the session client to carry out.
    Command(SessionCommand),
}

impl From<SessionEvent> for BridgeEvent {
    fn from(event: SessionEvent) -> Self {
        BridgeEvent::Session(event)
    }
}

impl From<SessionCommand> for BridgeEvent {
    fn from(cmd: SessionCommand) -> Self {
        BridgeEvent::Command(cmd)
    }
}

// ---------------------------------------------------------------------------
// Inbound: session -> bridge
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// Session handshake completed for our slot.
    Connected {
        slot: SlotId,
        #[serde(default)]
        team: u32,
        #[serde(default)]
        slot_info: HashMap<SlotId, SlotInfo>,
        #[serde(default)]
        missing_locations: HashSet<LocationId>,
        #[serde(default)]
        checked_locations: HashSet<LocationId>,
        #[serde(default)]
        goal_location: Option<String>,
    },
    /// Connection to the session was lost; all session state is stale.
    Disconnected,
    /// Items received by our slot. `index` is the position of `items[0]`
    /// in the append-only received sequence.
    ReceivedItems {
        index: usize,
        items: Vec<NetworkItem>,
    },
    /// Item assignments for scouted locations.
    LocationInfo { locations: Vec<NetworkItem> },
    /// Server-side additions to the checked and missing location sets.
    RoomUpdate {
        #[serde(default)]
        checked_locations: HashSet<LocationId>,
        #[serde(default)]
        missing_locations: HashSet<LocationId>,
    },
    /// Item display names per game, for items that belong to other games.
    DataPackage {
        games: HashMap<String, HashMap<ItemId, String>>,
    },
    /// The session recorded our goal as complete.
    GoalReached,
}

// ---------------------------------------------------------------------------
// Outbound: bridge -> session
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionCommand {
    /// Reveal item assignments for these locations.
    LocationScouts { locations: Vec<LocationId> },
    /// These locations were visited in-game.
    LocationChecks { locations: Vec<LocationId> },
    /// Create hints for these locations.
    CreateHints { locations: Vec<LocationId> },
    /// Our goal was reached in-game.
    GoalComplete,
    /// Resend the full received-items sequence.
    Sync,
}
