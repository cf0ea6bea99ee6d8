use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Persisted config types
// ---------------------------------------------------------------------------

/// Default loopback port the game process polls.
pub const DEFAULT_PORT: u16 = 22142;

/// Top-level persisted config. Paths are resolved relative to the working
/// directory so the TOML file stays hand-editable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct BridgeConfig {
    #[serde(default)]
    pub bridge: BridgeSection,
    #[serde(default)]
    pub session: SessionSection,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mock_session: Option<MockSessionSection>,
}

/// Local HTTP listener.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeSection {
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

impl Default for BridgeSection {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
        }
    }
}

/// The local player's slot and the files the bridge reads and writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSection {
    pub slot_name: String,
    /// Static item/location tables (JSON).
    pub game_data: PathBuf,
    /// Where the spoiler record is written after each scouting round.
    pub spoiler: PathBuf,
    /// Goal event location, used when the session does not announce one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goal_location: Option<String>,
}

impl Default for SessionSection {
    fn default() -> Self {
        Self {
            slot_name: "Player".into(),
            game_data: PathBuf::from("game.json"),
            spoiler: PathBuf::from("spoiler.json"),
            goal_location: None,
        }
    }
}

/// Offline session that serves the static tables without a server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MockSessionSection {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}
