//! Parse command implementation.
//!
//! Runs captured tool output through the parser without invoking the tool.

use std::path::{Path, PathBuf};

use anyhow::Result;
use aranet_bridge::parse;

use crate::cli::OutputFormat;
use crate::format::{FormatOptions, format_records_json, format_records_text};
use crate::util::{read_input, write_output};

pub fn cmd_parse(
    file: Option<&Path>,
    format: OutputFormat,
    output: Option<&PathBuf>,
    opts: &FormatOptions,
) -> Result<()> {
    let raw = read_input(file)?;
    let content = parse_content(&raw, format, opts)?;
    write_output(output, &content)
}

fn parse_content(raw: &str, format: OutputFormat, opts: &FormatOptions) -> Result<String> {
    let records = parse(raw);
    match format {
        OutputFormat::Json => format_records_json(&records, opts),
        OutputFormat::Text if records.is_empty() => Ok("No device records found.\n".to_string()),
        OutputFormat::Text => Ok(format_records_text(&records, opts)),
    }
}
