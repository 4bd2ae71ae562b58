//! Read command implementation.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use aranet_bridge::{CommandRunner, DeviceRecord, Reader};
use tracing::warn;

use crate::cli::OutputFormat;
use crate::format::{
    FormatOptions, format_record_json, format_record_text, format_records_json,
    format_records_text,
};
use crate::util::write_output;

pub async fn cmd_read<R: CommandRunner>(
    reader: &Reader<R>,
    devices: &[String],
    format: OutputFormat,
    output: Option<&PathBuf>,
    quiet: bool,
    opts: &FormatOptions,
) -> Result<()> {
    let content = read_content(reader, devices, format, quiet, opts).await?;
    write_output(output, &content)
}

async fn read_content<R: CommandRunner>(
    reader: &Reader<R>,
    devices: &[String],
    format: OutputFormat,
    quiet: bool,
    opts: &FormatOptions,
) -> Result<String> {
    // Single device: simple output, errors propagate
    if let [address] = devices {
        let record = reader
            .read(address)
            .await
            .with_context(|| format!("Failed to read {}", address))?;
        return match format {
            OutputFormat::Json => format_record_json(&record, opts),
            OutputFormat::Text => Ok(format_record_text(&record, opts)),
        };
    }

    // Multiple devices: one at a time, since they share the radio
    let mut records: Vec<DeviceRecord> = Vec::new();
    let mut errors = Vec::new();

    for (i, address) in devices.iter().enumerate() {
        match reader.read(address).await {
            Ok(record) => {
                if !quiet && matches!(format, OutputFormat::Text) {
                    eprintln!("  [{}/{}] {} - OK", i + 1, devices.len(), address);
                }
                records.push(record);
            }
            Err(err) => {
                warn!(address = %address, "Read failed: {}", err);
                if !quiet && matches!(format, OutputFormat::Text) {
                    eprintln!("  [{}/{}] {} - FAILED", i + 1, devices.len(), address);
                }
                errors.push((address, err));
            }
        }
    }

    // Report detailed errors
    if !quiet && !errors.is_empty() {
        eprintln!();
        for (address, err) in &errors {
            eprintln!("Error reading {}: {}", address, err.to_string().trim_end());
        }
    }

    if records.is_empty() {
        bail!("Failed to read from any device");
    }

    match format {
        OutputFormat::Json => format_records_json(&records, opts),
        OutputFormat::Text => Ok(format_records_text(&records, opts)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aranet_bridge::{MockRunner, ToolConfig};

    const OFFICE: &str = "\
= Device =
Name: Office
Address: AA:BB:CC:DD:EE:FF
CO2: 2150 ppm
Status Display: RED
Age: 12/300
";

    const BEDROOM: &str = "\
= Device =
Name: Bedroom
Address: 11:22:33:44:55:66
CO2: 540 ppm
";

    fn addresses(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_read_single_text() {
        let runner = MockRunner::new();
        runner.push_output(OFFICE).await;
        let reader = Reader::new(runner, ToolConfig::default());

        let text = read_content(
            &reader,
            &addresses(&["AA:BB:CC:DD:EE:FF"]),
            OutputFormat::Text,
            true,
            &FormatOptions::new(true),
        )
        .await
        .unwrap();

        assert!(text.contains("2150 ppm  [RED]"));
        assert!(text.contains("Next update:  in 4m 48s"));
    }

    #[tokio::test]
    async fn test_read_single_json() {
        let runner = MockRunner::new();
        runner.push_output(OFFICE).await;
        let reader = Reader::new(runner, ToolConfig::default());

        let json = read_content(
            &reader,
            &addresses(&["AA:BB:CC:DD:EE:FF"]),
            OutputFormat::Json,
            true,
            &FormatOptions::new(true),
        )
        .await
        .unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["address"], "AA:BB:CC:DD:EE:FF");
        assert_eq!(parsed["next_update_ms"], 288000.0);
    }

    #[tokio::test]
    async fn test_read_single_failure_propagates() {
        let runner = MockRunner::new();
        runner.push_stderr("", "Device not in range").await;
        let reader = Reader::new(runner, ToolConfig::default());

        let err = read_content(
            &reader,
            &addresses(&["AA:BB:CC:DD:EE:FF"]),
            OutputFormat::Text,
            true,
            &FormatOptions::default(),
        )
        .await
        .unwrap_err();

        assert_eq!(err.to_string(), "Failed to read AA:BB:CC:DD:EE:FF");
        assert!(format!("{:#}", err).contains("Device not in range"));
    }

    #[tokio::test]
    async fn test_read_multi_is_sequential_and_tolerates_failures() {
        let runner = MockRunner::new();
        runner.push_output(OFFICE).await;
        runner.push_stderr("", "timeout").await;
        runner.push_output(BEDROOM).await;
        let reader = Reader::new(runner, ToolConfig::default());

        let json = read_content(
            &reader,
            &addresses(&["AA:BB:CC:DD:EE:FF", "DE:AD:BE:EF:00:00", "11:22:33:44:55:66"]),
            OutputFormat::Json,
            true,
            &FormatOptions::new(true).with_compact(true),
        )
        .await
        .unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        let names: Vec<_> = parsed
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["name"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["Office", "Bedroom"]);

        assert_eq!(
            reader.runner().calls().await,
            vec![
                vec!["AA:BB:CC:DD:EE:FF".to_string()],
                vec!["DE:AD:BE:EF:00:00".to_string()],
                vec!["11:22:33:44:55:66".to_string()],
            ]
        );
    }

    #[tokio::test]
    async fn test_read_multi_all_failed() {
        let runner = MockRunner::new();
        runner.push_stderr("", "busy").await;
        runner.push_stderr("", "busy").await;
        let reader = Reader::new(runner, ToolConfig::default());

        let err = read_content(
            &reader,
            &addresses(&["AA:BB", "CC:DD"]),
            OutputFormat::Text,
            true,
            &FormatOptions::default(),
        )
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "Failed to read from any device");
    }
}
