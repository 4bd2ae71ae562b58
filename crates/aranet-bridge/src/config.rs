//! External tool configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default program used to scan for and read devices.
pub const DEFAULT_PROGRAM: &str = "aranetctl";

/// Default timeout for one tool invocation, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// How to invoke the external scanning/reading tool.
///
/// ```
/// use aranet_bridge::ToolConfig;
///
/// let config = ToolConfig::default();
/// assert_eq!(config.scan_command(), vec!["--scan".to_string()]);
/// assert_eq!(config.read_command("AA:BB"), vec!["AA:BB".to_string()]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    /// Program to run (looked up on `PATH` if not absolute).
    pub program: String,
    /// Arguments for a scan of all nearby devices.
    pub scan_args: Vec<String>,
    /// Arguments for a targeted read; the address is appended last.
    pub read_args: Vec<String>,
    /// Kill the tool if it runs longer than this. `None` waits indefinitely.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            program: DEFAULT_PROGRAM.to_string(),
            scan_args: vec!["--scan".to_string()],
            read_args: Vec::new(),
            timeout_secs: Some(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ToolConfig {
    /// Create a configuration for a specific program.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Self::default()
        }
    }

    /// Set the timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout_secs = timeout.map(|d| d.as_secs());
        self
    }

    /// The timeout as a `Duration`.
    pub fn timeout_duration(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Arguments for a scan.
    pub fn scan_command(&self) -> Vec<String> {
        self.scan_args.clone()
    }

    /// Arguments for a targeted read of `address`.
    pub fn read_command(&self, address: &str) -> Vec<String> {
        let mut args = self.read_args.clone();
        args.push(address.to_string());
        args
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if the program is empty or the
    /// timeout is zero.
    pub fn validate(&self) -> Result<()> {
        if self.program.trim().is_empty() {
            return Err(Error::invalid_config("tool.program must not be empty"));
        }
        if self.timeout_secs == Some(0) {
            return Err(Error::invalid_config(
                "tool.timeout_secs must be greater than 0",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = ToolConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.program, "aranetctl");
        assert_eq!(config.timeout_duration(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_read_command_appends_address() {
        let config = ToolConfig {
            read_args: vec!["--read".to_string()],
            ..ToolConfig::default()
        };
        assert_eq!(
            config.read_command("AA:BB:CC:DD:EE:FF"),
            vec!["--read".to_string(), "AA:BB:CC:DD:EE:FF".to_string()]
        );
    }

    #[test]
    fn test_validate_rejects_empty_program() {
        let config = ToolConfig::new("  ");
        let err = config.validate().unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let config = ToolConfig::default().timeout(Some(Duration::ZERO));
        assert!(config.validate().is_err());

        let config = ToolConfig::default().timeout(None);
        assert!(config.validate().is_ok());
        assert_eq!(config.timeout_duration(), None);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: ToolConfig = toml::from_str(r#"program = "/opt/aranet/bin/aranetctl""#).unwrap();
        assert_eq!(config.program, "/opt/aranet/bin/aranetctl");
        assert_eq!(config.scan_args, vec!["--scan".to_string()]);
        assert_eq!(config.timeout_secs, Some(30));
    }
}
