//! Response types for the local HTTP surface polled by the game process,
//! plus the spoiler record handed to the spoiler sink.
//!
//! Bodies are plain text: one block per entry, each block starting with a
//! bracketed tag line. The game process keys on the tags, so the tag set is
//! fixed; the detail lines are informational.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{SlotId, SlotInfo};

// ---------------------------------------------------------------------------
// Check
// ---------------------------------------------------------------------------

/// Resolution of one checked location name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// The goal event location was reached.
    Victory { location: String },
    /// Location was already checked earlier (by us or the server).
    AlreadyChecked { location: String },
    /// Location is not part of the session; `item` is its vanilla item.
    Disabled { location: String, item: String },
    /// The assigned item is for the local player.
    SentToSelf { location: String, item: String },
    /// The assigned item is for another known player.
    SentTo {
        location: String,
        item: String,
        recipient: SlotInfo,
    },
    /// The assigned item's owner is unknown to us.
    SentToNoOne { location: String, item: String },
}

impl CheckOutcome {
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Victory { .. } => "Victory",
            Self::AlreadyChecked { .. } => "Checked",
            Self::Disabled { .. } => "Disabled",
            Self::SentToSelf { .. } => "Self",
            Self::SentTo { .. } | Self::SentToNoOne { .. } => "Sent",
        }
    }

    pub fn location(&self) -> &str {
        match self {
            Self::Victory { location }
            | Self::AlreadyChecked { location }
            | Self::Disabled { location, .. }
            | Self::SentToSelf { location, .. }
            | Self::SentTo { location, .. }
            | Self::SentToNoOne { location, .. } => location,
        }
    }
}

impl fmt::Display for CheckOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[{}]", self.tag())?;
        writeln!(f, "{}", self.location())?;
        match self {
            Self::Victory { .. } => writeln!(f, "Goal complete"),
            Self::AlreadyChecked { .. } => writeln!(f, "Already checked"),
            Self::Disabled { item, .. } | Self::SentToSelf { item, .. } => writeln!(f, "{item}"),
            Self::SentTo {
                item, recipient, ..
            } => writeln!(f, "{item} to {recipient}"),
            Self::SentToNoOne { item, .. } => writeln!(f, "{item} to no one"),
        }
    }
}

/// Body for `GET /Check/...`: blocks in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckResponse {
    pub outcomes: Vec<CheckOutcome>,
}

impl fmt::Display for CheckResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for outcome in &self.outcomes {
            write!(f, "{outcome}")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tick (item delivery)
// ---------------------------------------------------------------------------

/// Who an item delivered to the game process came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemSender {
    /// Found by the local player in their own world.
    Own,
    /// Sent by another player whose slot info is known.
    Other(SlotInfo),
    /// Sender slot unknown (server grants, stale roster).
    Unknown,
}

impl fmt::Display for ItemSender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Own => write!(f, "Self"),
            Self::Other(info) => write!(f, "From {info}"),
            Self::Unknown => write!(f, "Received"),
        }
    }
}

/// One item the game process has not consumed yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveredItem {
    /// Display name, already resolved to the progressive stage.
    pub name: String,
    pub category: String,
    pub sender: ItemSender,
}

impl fmt::Display for DeliveredItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[{}]", self.category)?;
        writeln!(f, "{}", self.sender)?;
        writeln!(f, "{}", self.name)
    }
}

/// Body for `GET /Tick/<channel>/{count}`. Echoes the caller's count first so
/// the caller can detect a baseline mismatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickResponse {
    pub count: usize,
    pub items: Vec<DeliveredItem>,
}

impl fmt::Display for TickResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.count)?;
        for item in &self.items {
            write!(f, "{item}")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Spoiler record
// ---------------------------------------------------------------------------

/// Snapshot of every scouted assignment, emitted when a scouting round
/// settles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpoilerRecord {
    pub generated_at: DateTime<Utc>,
    pub slot: SlotId,
    pub entries: Vec<SpoilerEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SpoilerEntry {
    pub location: String,
    pub item: String,
    pub player: String,
    pub game: String,
    pub flags: u8,
}
