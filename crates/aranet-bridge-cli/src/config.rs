//! Configuration file management.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use aranet_bridge::{ProcessRunner, Reader, ToolConfig};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Environment variable that overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "ARANET_BRIDGE_CONFIG";

/// Default shortest wait between watch reads, in seconds.
pub const DEFAULT_MIN_INTERVAL_SECS: u64 = 10;

/// Configuration file structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default device address or alias
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,

    /// How to run the external tool
    pub tool: ToolConfig,

    /// Watch mode settings
    pub watch: WatchConfig,

    /// Device aliases (friendly name -> device address)
    pub aliases: BTreeMap<String, String>,
}

/// Watch mode settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Never read more often than this, even if the device reports an
    /// earlier next measurement.
    pub min_interval_secs: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            min_interval_secs: DEFAULT_MIN_INTERVAL_SECS,
        }
    }
}

impl WatchConfig {
    pub fn min_interval(&self) -> Duration {
        Duration::from_secs(self.min_interval_secs)
    }
}

impl Config {
    /// Get the config file path
    pub fn path() -> PathBuf {
        if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
            return PathBuf::from(path);
        }
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("aranet-bridge")
            .join("config.toml")
    }

    /// Load config from the default path, or return default if not found
    pub fn load() -> Self {
        Self::load_from(&Self::path())
    }

    /// Load config from `path`. A missing or unreadable file yields the
    /// defaults; the latter with a warning.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => return config,
                Err(e) => {
                    warn!(path = %path.display(), "Failed to parse config: {}", e);
                }
            },
            Err(e) => {
                warn!(path = %path.display(), "Failed to read config: {}", e);
            }
        }
        Self::default()
    }

    /// Save config to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }
        let content = self.to_toml()?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }

    /// Render as TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }

    /// Build a reader for the configured tool.
    pub fn reader(&self) -> Result<Reader<ProcessRunner>> {
        Reader::from_config(self.tool.clone()).context("Invalid [tool] configuration")
    }
}

/// Resolve devices from args (including `ARANET_DEVICE`), falling back to
/// the configured default. Aliases are replaced by their addresses.
pub fn resolve_devices(devices: Vec<String>, config: &Config) -> Vec<String> {
    if devices.is_empty() {
        return config
            .device
            .as_deref()
            .map(|d| vec![resolve_alias(d, config)])
            .unwrap_or_default();
    }
    devices
        .into_iter()
        .map(|d| resolve_alias(&d, config))
        .collect()
}

/// Resolve an alias to its device address, or return the original if not an alias.
pub fn resolve_alias(device: &str, config: &Config) -> String {
    config
        .aliases
        .get(device)
        .cloned()
        .unwrap_or_else(|| device.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_aliases() -> Config {
        let mut aliases = BTreeMap::new();
        aliases.insert("office".to_string(), "AA:BB:CC:DD:EE:FF".to_string());
        aliases.insert("bedroom".to_string(), "11:22:33:44:55:66".to_string());
        Config {
            aliases,
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.device, None);
        assert_eq!(config.tool, ToolConfig::default());
        assert_eq!(config.watch.min_interval(), Duration::from_secs(10));
        assert!(config.aliases.is_empty());
    }

    #[test]
    fn test_resolve_devices_prefers_args() {
        let config = Config {
            device: Some("config-device".to_string()),
            ..config_with_aliases()
        };
        let result = resolve_devices(vec!["office".to_string(), "raw".to_string()], &config);
        assert_eq!(result, vec!["AA:BB:CC:DD:EE:FF", "raw"]);
    }

    #[test]
    fn test_resolve_devices_falls_back_to_config() {
        let config = Config {
            device: Some("bedroom".to_string()),
            ..config_with_aliases()
        };
        assert_eq!(resolve_devices(vec![], &config), vec!["11:22:33:44:55:66"]);
    }

    #[test]
    fn test_resolve_devices_none_when_both_empty() {
        assert!(resolve_devices(vec![], &Config::default()).is_empty());
    }

    #[test]
    fn test_resolve_alias_not_found() {
        let config = config_with_aliases();
        assert_eq!(resolve_alias("AA:BB:CC:DD:EE:FF", &config), "AA:BB:CC:DD:EE:FF");
        assert_eq!(resolve_alias("kitchen", &config), "kitchen");
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            device = "office"

            [tool]
            program = "/opt/aranet/bin/aranetctl"
            "#,
        )
        .unwrap();

        assert_eq!(config.device.as_deref(), Some("office"));
        assert_eq!(config.tool.program, "/opt/aranet/bin/aranetctl");
        assert_eq!(config.tool.scan_args, vec!["--scan"]);
        assert_eq!(config.watch.min_interval_secs, DEFAULT_MIN_INTERVAL_SECS);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = config_with_aliases();
        config.device = Some("office".to_string());
        config.tool.read_args = vec!["--no-history".to_string()];
        config.watch.min_interval_secs = 60;
        config.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path), config);
    }

    #[test]
    fn test_load_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("absent.toml"));
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_invalid_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "device = [not toml").unwrap();
        assert_eq!(Config::load_from(&path), Config::default());
    }

    #[test]
    fn test_reader_rejects_invalid_tool() {
        let mut config = Config::default();
        config.tool.program = String::new();
        assert!(config.reader().is_err());
    }
}
