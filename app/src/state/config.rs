//! Configuration loading, resolution, and persistence.
//!
//! Handles the TOML config file (~/.config/apbridge/config.toml) with
//! `[bridge]`, `[session]` and optional `[mock_session]` sections.

use std::path::{Path, PathBuf};
use std::sync::RwLock;

pub use apbridge::BridgeConfig;

// ---------------------------------------------------------------------------
// Persistence I/O
// ---------------------------------------------------------------------------

/// Returns `~/.config/apbridge/config.toml`.
pub fn default_config_path() -> PathBuf {
    let dir = dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("apbridge");
    dir.join("config.toml")
}

/// Load persisted config from disk. If the file does not exist, creates it
/// with all-defaults and returns that. A file that fails to parse is left
/// untouched and defaults are used for this run.
pub fn load(path: &Path) -> BridgeConfig {
    match std::fs::read_to_string(path) {
        Ok(contents) => match toml::from_str::<BridgeConfig>(&contents) {
            Ok(config) => {
                tracing::info!("loaded config from {}", path.display());
                config
            }
            Err(e) => {
                tracing::warn!("failed to parse {}: {e}", path.display());
                BridgeConfig::default()
            }
        },
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            let defaults = BridgeConfig::default();
            tracing::info!("no config file found, creating {}", path.display());
            save_to(path, &defaults);
            defaults
        }
        Err(e) => {
            tracing::warn!("failed to read {}: {e}", path.display());
            BridgeConfig::default()
        }
    }
}

/// Write config to a specific path. Creates parent dirs if needed. Never panics.
pub fn save_to(path: &Path, config: &BridgeConfig) {
    if let Some(dir) = path.parent()
        && !dir.as_os_str().is_empty()
        && let Err(e) = std::fs::create_dir_all(dir)
    {
        tracing::warn!("failed to create config dir {}: {e}", dir.display());
        return;
    }
    match toml::to_string_pretty(config) {
        Ok(contents) => {
            if let Err(e) = std::fs::write(path, contents) {
                tracing::warn!("failed to write {}: {e}", path.display());
            }
        }
        Err(e) => {
            tracing::warn!("failed to serialize config: {e}");
        }
    }
}

// ---------------------------------------------------------------------------
// Cached config
// ---------------------------------------------------------------------------

/// Cached configuration backed by a TOML file.
///
/// Reads are cheap (RwLock read guard + clone). The bridge never rewrites
/// the file after startup; command-line overrides only touch the cache.
pub struct SystemConfig {
    path: PathBuf,
    inner: RwLock<BridgeConfig>,
}

impl SystemConfig {
    /// Load config from disk (or create defaults) and cache it.
    pub fn new(path: PathBuf) -> Self {
        let config = load(&path);
        Self::from_config(path, config)
    }

    /// Cache an already-resolved config without touching disk.
    pub fn from_config(path: PathBuf, config: BridgeConfig) -> Self {
        Self {
            path,
            inner: RwLock::new(config),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Clone the current cached config.
    pub fn snapshot(&self) -> BridgeConfig {
        self.inner.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Mutate the cached config in place. Not persisted.
    pub fn override_with(&self, f: impl FnOnce(&mut BridgeConfig)) {
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        f(&mut guard);
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn missing_file_is_created_with_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = load(&path);
        assert_eq!(config, BridgeConfig::default());
        assert!(path.exists());
        let reread = load(&path);
        assert_eq!(reread, config);
    }

    #[test]
    fn sections_parse_from_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[bridge]
port = 4000

[session]
slot_name = "Ace"
game_data = "data/game.json"
spoiler = "out/spoiler.json"
goal_location = "Homeworld Falls"

[mock_session]
"#,
        )
        .unwrap();
        let config = load(&path);
        assert_eq!(config.bridge.port, 4000);
        assert_eq!(config.session.slot_name, "Ace");
        assert_eq!(
            config.session.goal_location.as_deref(),
            Some("Homeworld Falls")
        );
        assert!(config.mock_session.unwrap().enabled);
    }

    #[test]
    fn unparsable_file_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[bridge\nport = ").unwrap();
        assert_eq!(load(&path), BridgeConfig::default());
    }

    #[test]
    fn overrides_stay_in_memory() {
        let system = SystemConfig::from_config(PathBuf::from("unused.toml"), BridgeConfig::default());
        system.override_with(|c| c.bridge.port = 9);
        assert_eq!(system.snapshot().bridge.port, 9);
        assert!(!system.path().exists());
    }
}
