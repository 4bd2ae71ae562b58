//! Scanning for and reading devices through the external tool.

use std::collections::HashSet;

use aranet_types::DeviceRecord;
use tracing::{debug, info, warn};

use crate::config::ToolConfig;
use crate::error::{Error, Result};
use crate::parser::parse;
use crate::runner::{CommandRunner, ProcessRunner};

/// Enumerates and reads devices by running the external tool and parsing
/// its output.
///
/// Each call is one tool invocation, awaited to completion. Calls are not
/// coordinated with each other; callers that must not overlap radio access
/// should serialize their own calls. Failures are never retried here.
///
/// # Example
///
/// ```
/// use aranet_bridge::{MockRunner, Reader, ToolConfig};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> aranet_bridge::Result<()> {
/// let runner = MockRunner::new();
/// runner.push_output("= Device =\nName: Office\nAddress: AA:BB:CC:DD:EE:FF\n").await;
///
/// let reader = Reader::new(runner, ToolConfig::default());
/// let devices = reader.scan().await?;
/// assert_eq!(devices[0].name.as_deref(), Some("Office"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Reader<R> {
    runner: R,
    config: ToolConfig,
}

impl Reader<ProcessRunner> {
    /// Create a reader that spawns the configured program.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if the configuration is invalid.
    pub fn from_config(config: ToolConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(ProcessRunner::from_config(&config), config))
    }
}

impl<R: CommandRunner> Reader<R> {
    /// Create a reader with a custom runner.
    pub fn new(runner: R, config: ToolConfig) -> Self {
        Self { runner, config }
    }

    /// The runner used to invoke the tool.
    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// The tool configuration.
    pub fn config(&self) -> &ToolConfig {
        &self.config
    }

    /// Scan for all nearby devices.
    ///
    /// Returns records in the order the tool printed them. If an address
    /// appears more than once, only its first record is kept. An empty
    /// result means no devices were found and is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ExternalTool`] if the tool reports a failure, or
    /// [`Error::Io`]/[`Error::Timeout`] if it could not be run.
    pub async fn scan(&self) -> Result<Vec<DeviceRecord>> {
        let stdout = self.invoke(self.config.scan_command()).await?;
        let records = dedupe_by_address(parse(&stdout));
        info!(count = records.len(), "Scan complete");
        Ok(records)
    }

    /// Read a single device by address.
    ///
    /// The record whose address matches (ignoring ASCII case) is returned.
    /// If the tool printed exactly one record and it carries a different or
    /// no address, that record is returned.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DeviceNotFound`] if no record matches, plus the
    /// errors of [`scan`](Self::scan).
    pub async fn read(&self, address: &str) -> Result<DeviceRecord> {
        let stdout = self.invoke(self.config.read_command(address)).await?;
        let mut records = parse(&stdout);

        if let Some(pos) = records.iter().position(|r| {
            r.address
                .as_deref()
                .is_some_and(|a| a.eq_ignore_ascii_case(address))
        }) {
            if records.len() > 1 {
                warn!(
                    address,
                    count = records.len(),
                    "Targeted read returned several devices; using the matching one"
                );
            }
            return Ok(records.swap_remove(pos));
        }

        match records.len() {
            1 => {
                debug!(address, returned = ?records[0].address, "Targeted read returned a different address");
                Ok(records.remove(0))
            }
            _ => Err(Error::device_not_found(address)),
        }
    }

    /// Run the tool and return its stdout, or the failure it reported.
    async fn invoke(&self, args: Vec<String>) -> Result<String> {
        let output = self.runner.run(&args).await?;
        if let Some(message) = output.failure() {
            warn!(?args, %message, "External tool reported a failure");
            return Err(Error::external_tool(message));
        }
        Ok(output.stdout)
    }
}

/// Keep the first record for each address. Records without an address are kept.
fn dedupe_by_address(records: Vec<DeviceRecord>) -> Vec<DeviceRecord> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|record| match record.address.as_deref() {
            Some(address) => {
                let fresh = seen.insert(address.to_ascii_uppercase());
                if !fresh {
                    warn!(address, "Dropping duplicate device address from scan");
                }
                fresh
            }
            None => true,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockRunner;

    const SCAN: &str = "\
= Device 1 =
Name: Office
Address: AA:BB:CC:DD:EE:FF
CO2: 612 ppm
= Device 2 =
Name: Bedroom
Address: 11:22:33:44:55:66
CO2: 800 ppm
";

    fn reader(runner: MockRunner) -> Reader<MockRunner> {
        Reader::new(runner, ToolConfig::default())
    }

    #[tokio::test]
    async fn test_scan_returns_records_in_order() {
        let runner = MockRunner::new();
        runner.push_output(SCAN).await;
        let reader = reader(runner);

        let records = reader.scan().await.unwrap();
        let names: Vec<_> = records.iter().filter_map(|r| r.name.as_deref()).collect();
        assert_eq!(names, vec!["Office", "Bedroom"]);

        assert_eq!(reader.runner().calls().await, vec![vec!["--scan".to_string()]]);
    }

    #[tokio::test]
    async fn test_scan_empty_is_not_an_error() {
        let runner = MockRunner::new();
        runner.push_output("Scanning...\nNo devices found\n").await;

        let records = reader(runner).scan().await.unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_stderr_short_circuits_parsing() {
        let runner = MockRunner::new();
        runner.push_stderr(SCAN, "BleakError: Bluetooth device is turned off\n").await;

        let err = reader(runner).scan().await.unwrap_err();
        match err {
            Error::ExternalTool { message } => {
                assert_eq!(message, "BleakError: Bluetooth device is turned off\n");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_non_zero_exit_is_an_error() {
        let runner = MockRunner::new();
        runner.push_exit_code("", 1).await;

        let err = reader(runner).scan().await.unwrap_err();
        assert!(matches!(err, Error::ExternalTool { .. }));
    }

    #[tokio::test]
    async fn test_io_error_propagates() {
        let runner = MockRunner::new();
        runner
            .push_io_error(std::io::ErrorKind::NotFound, "aranetctl: not found")
            .await;

        let err = reader(runner).scan().await.unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[tokio::test]
    async fn test_scan_drops_duplicate_addresses() {
        let runner = MockRunner::new();
        runner
            .push_output(
                "= A =\nName: First\nAddress: AA:BB\n= B =\nName: Second\nAddress: aa:bb\n= C =\nName: NoAddress\n",
            )
            .await;

        let records = reader(runner).scan().await.unwrap();
        let names: Vec<_> = records.iter().filter_map(|r| r.name.as_deref()).collect();
        assert_eq!(names, vec!["First", "NoAddress"]);
    }

    #[tokio::test]
    async fn test_read_passes_address_and_returns_match() {
        let runner = MockRunner::new();
        runner.push_output(SCAN).await;
        let reader = reader(runner);

        let record = reader.read("11:22:33:44:55:66").await.unwrap();
        assert_eq!(record.name.as_deref(), Some("Bedroom"));
        assert_eq!(
            reader.runner().calls().await,
            vec![vec!["11:22:33:44:55:66".to_string()]]
        );
    }

    #[tokio::test]
    async fn test_read_matches_case_insensitively() {
        let runner = MockRunner::new();
        runner.push_output(SCAN).await;

        let record = reader(runner).read("aa:bb:cc:dd:ee:ff").await.unwrap();
        assert_eq!(record.name.as_deref(), Some("Office"));
    }

    #[tokio::test]
    async fn test_read_single_record_without_address() {
        let runner = MockRunner::new();
        runner.push_output("= Device =\nName: Office\nCO2: 612 ppm\n").await;

        let record = reader(runner).read("AA:BB:CC:DD:EE:FF").await.unwrap();
        assert_eq!(record.name.as_deref(), Some("Office"));
    }

    #[tokio::test]
    async fn test_read_not_found() {
        let runner = MockRunner::new();
        runner.push_output("").await;
        let err = reader(runner).read("AA:BB").await.unwrap_err();
        assert!(matches!(err, Error::DeviceNotFound(ref a) if a == "AA:BB"));

        let runner = MockRunner::new();
        runner.push_output(SCAN).await;
        let err = reader(runner).read("99:99").await.unwrap_err();
        assert!(matches!(err, Error::DeviceNotFound(_)));
    }

    #[test]
    fn test_from_config_validates() {
        assert!(Reader::from_config(ToolConfig::new("")).is_err());
        assert!(Reader::from_config(ToolConfig::default()).is_ok());
    }
}
