//! Scan command implementation.

use std::path::PathBuf;

use anyhow::{Context, Result};
use aranet_bridge::{CommandRunner, Reader};

use crate::cli::OutputFormat;
use crate::format::{FormatOptions, format_scan_json, format_scan_text};
use crate::util::write_output;

pub async fn cmd_scan<R: CommandRunner>(
    reader: &Reader<R>,
    format: OutputFormat,
    output: Option<&PathBuf>,
    quiet: bool,
    opts: &FormatOptions,
) -> Result<()> {
    if !quiet && matches!(format, OutputFormat::Text) {
        eprintln!("Scanning for Aranet devices...");
    }

    let content = scan_content(reader, format, !quiet, opts).await?;
    write_output(output, &content)
}

async fn scan_content<R: CommandRunner>(
    reader: &Reader<R>,
    format: OutputFormat,
    show_tips: bool,
    opts: &FormatOptions,
) -> Result<String> {
    let records = reader
        .scan()
        .await
        .context("Failed to scan for devices")?;

    match format {
        OutputFormat::Json => format_scan_json(&records, opts),
        OutputFormat::Text => Ok(format_scan_text(&records, opts, show_tips)),
    }
}
