//! Output formatting utilities for text and JSON output.

use std::time::Duration;

use anyhow::Result;
use aranet_types::{DeviceRecord, Measurement, Status, TemperatureUnit, Value};
use owo_colors::OwoColorize;
use serde::Serialize;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Battery level below which the value is shown in red.
const BATTERY_LOW: f64 = 20.0;
/// Battery level below which the value is shown in yellow.
const BATTERY_MEDIUM: f64 = 40.0;

/// Formatting options for output.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormatOptions {
    /// Disable colored output.
    pub no_color: bool,
    /// Use compact JSON output (no pretty-printing).
    pub compact: bool,
}

impl FormatOptions {
    pub fn new(no_color: bool) -> Self {
        Self {
            no_color,
            compact: false,
        }
    }

    /// Create with compact JSON option.
    #[must_use]
    pub fn with_compact(mut self, compact: bool) -> Self {
        self.compact = compact;
        self
    }

    /// Serialize value to JSON string, respecting compact option.
    pub fn as_json<T: Serialize>(&self, value: &T) -> Result<String> {
        let json = if self.compact {
            serde_json::to_string(value)?
        } else {
            serde_json::to_string_pretty(value)?
        };
        Ok(json + "\n")
    }
}

/// Format status tier with color
#[must_use]
pub fn format_status(status: Status, no_color: bool) -> String {
    let label = status.to_string();

    if no_color {
        format!("[{}]", label)
    } else {
        match status {
            Status::Green => format!("[{}]", label.green()),
            // Orange color (RGB: 255, 165, 0)
            Status::Orange => format!("[{}]", label.truecolor(255, 165, 0)),
            Status::Red => format!("[{}]", label.red()),
            Status::Unknown => format!("[{}]", label.dimmed()),
        }
    }
}

/// Format age in human-readable format
#[must_use]
pub fn format_age(seconds: u64) -> String {
    if seconds < 60 {
        format!("{}s ago", seconds)
    } else {
        format!("{}m {}s ago", seconds / 60, seconds % 60)
    }
}

/// Format the wait until the next measurement.
#[must_use]
pub fn format_next_update(wait: Duration) -> String {
    let seconds = wait.as_secs();
    if seconds == 0 {
        "due now".to_string()
    } else if seconds < 60 {
        format!("in {}s", seconds)
    } else {
        format!("in {}m {}s", seconds / 60, seconds % 60)
    }
}

/// Format a measurement as `<value> <unit>`, or just the value.
#[must_use]
pub fn format_measurement(measurement: &Measurement) -> String {
    match &measurement.unit {
        Some(unit) => format!("{} {}", measurement.value, unit),
        None => measurement.value.to_string(),
    }
}

/// Format a temperature with its degree symbol.
#[must_use]
pub fn format_temperature(measurement: &Measurement<TemperatureUnit>) -> String {
    match (&measurement.value, measurement.unit) {
        (Value::Number(n), Some(unit)) => format!("{:.1}{}", n, unit.symbol()),
        (Value::Number(n), None) => format!("{:.1}", n),
        (raw, _) => raw.to_string(),
    }
}

/// Format battery percentage with appropriate color.
#[must_use]
pub fn format_battery(measurement: &Measurement, no_color: bool) -> String {
    let text = format_measurement(measurement);
    let Some(percent) = measurement.as_f64() else {
        return text;
    };
    if no_color {
        text
    } else if percent < BATTERY_LOW {
        format!("{}", text.red())
    } else if percent < BATTERY_MEDIUM {
        format!("{}", text.yellow())
    } else {
        format!("{}", text.green())
    }
}

/// Name and address heading for a record.
fn record_heading(record: &DeviceRecord, no_color: bool) -> String {
    let name = record.name.as_deref().unwrap_or("Unknown");
    match (record.address.as_deref(), no_color) {
        (Some(address), true) => format!("{} ({})", name, address),
        (Some(address), false) => format!("{} ({})", name.bold(), address.cyan()),
        (None, true) => name.to_string(),
        (None, false) => format!("{}", name.bold()),
    }
}

// ============================================================================
// Record formatting
// ============================================================================

/// Format one record as an indented block.
#[must_use]
pub fn format_record_text(record: &DeviceRecord, opts: &FormatOptions) -> String {
    let mut output = record_heading(record, opts.no_color);
    output.push('\n');

    if let Some(co2) = &record.co2 {
        let status = record
            .status
            .map(|s| format!("  {}", format_status(s, opts.no_color)))
            .unwrap_or_default();
        output.push_str(&format!(
            "  CO2:          {}{}\n",
            format_measurement(co2),
            status
        ));
    } else if let Some(status) = record.status {
        output.push_str(&format!(
            "  Status:       {}\n",
            format_status(status, opts.no_color)
        ));
    }
    if let Some(temperature) = &record.temperature {
        output.push_str(&format!(
            "  Temperature:  {}\n",
            format_temperature(temperature)
        ));
    }
    if let Some(humidity) = &record.humidity {
        output.push_str(&format!(
            "  Humidity:     {}\n",
            format_measurement(humidity)
        ));
    }
    if let Some(pressure) = &record.pressure {
        output.push_str(&format!(
            "  Pressure:     {}\n",
            format_measurement(pressure)
        ));
    }
    if let Some(battery) = &record.battery {
        output.push_str(&format!(
            "  Battery:      {}\n",
            format_battery(battery, opts.no_color)
        ));
    }
    if let Some(rssi) = &record.rssi {
        output.push_str(&format!("  Signal:       {}\n", format_measurement(rssi)));
    }
    if let Some(age) = &record.age {
        output.push_str(&format!(
            "  Measured:     {}\n",
            format_age(age.elapsed.max(0.0) as u64)
        ));
        output.push_str(&format!(
            "  Next update:  {}\n",
            format_next_update(age.next_update())
        ));
    }

    output
}

/// Format several records, separated by blank lines.
#[must_use]
pub fn format_records_text(records: &[DeviceRecord], opts: &FormatOptions) -> String {
    records
        .iter()
        .map(|r| format_record_text(r, opts))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Tips shown after an empty scan.
#[must_use]
pub fn format_scan_tips(no_color: bool) -> String {
    let tips = "\
Tips:
  - Make sure the device is powered on and within range
  - Check that the scanning tool works on its own (see `config show`)
  - Enable Smart Home integration on the device if it is not listed
";
    if no_color {
        tips.to_string()
    } else {
        format!("{}", tips.dimmed())
    }
}

#[must_use]
pub fn format_scan_text(records: &[DeviceRecord], opts: &FormatOptions, show_tips: bool) -> String {
    if records.is_empty() {
        let mut output = "No Aranet devices found.\n".to_string();
        if show_tips {
            output.push('\n');
            output.push_str(&format_scan_tips(opts.no_color));
        }
        return output;
    }

    let noun = if records.len() == 1 { "device" } else { "devices" };
    format!(
        "Found {} Aranet {}\n\n{}",
        records.len(),
        noun,
        format_records_text(records, opts)
    )
}

// ============================================================================
// JSON formatting
// ============================================================================

#[derive(Serialize)]
struct RecordJson<'a> {
    #[serde(flatten)]
    record: &'a DeviceRecord,
    next_update_ms: Option<f64>,
}

impl<'a> From<&'a DeviceRecord> for RecordJson<'a> {
    fn from(record: &'a DeviceRecord) -> Self {
        Self {
            record,
            next_update_ms: record.next_update_millis(),
        }
    }
}

pub fn format_scan_json(records: &[DeviceRecord], opts: &FormatOptions) -> Result<String> {
    #[derive(Serialize)]
    struct ScanResult<'a> {
        count: usize,
        devices: Vec<RecordJson<'a>>,
    }

    opts.as_json(&ScanResult {
        count: records.len(),
        devices: records.iter().map(RecordJson::from).collect(),
    })
}

pub fn format_record_json(record: &DeviceRecord, opts: &FormatOptions) -> Result<String> {
    opts.as_json(&RecordJson::from(record))
}

pub fn format_records_json(records: &[DeviceRecord], opts: &FormatOptions) -> Result<String> {
    let records: Vec<_> = records.iter().map(RecordJson::from).collect();
    opts.as_json(&records)
}

// ============================================================================
// Watch formatting
// ============================================================================

fn timestamp(now: OffsetDateTime) -> String {
    now.format(&Rfc3339).unwrap_or_else(|_| "???".to_string())
}

/// Format one watch line: timestamp, status and the available values.
#[must_use]
pub fn format_watch_line(record: &DeviceRecord, now: OffsetDateTime, opts: &FormatOptions) -> String {
    let mut parts = vec![timestamp(now)];

    parts.push(format_status(record.status.unwrap_or_default(), opts.no_color));
    if let Some(co2) = &record.co2 {
        parts.push(format_measurement(co2));
    }
    if let Some(temperature) = &record.temperature {
        parts.push(format_temperature(temperature));
    }
    if let Some(humidity) = &record.humidity {
        parts.push(format_measurement(humidity));
    }
    if let Some(pressure) = &record.pressure {
        parts.push(format_measurement(pressure));
    }
    if let Some(battery) = &record.battery {
        parts.push(format!("BAT {}", format_battery(battery, opts.no_color)));
    }

    parts.join("  ") + "\n"
}

/// Format one watch line as a single-line JSON object.
pub fn format_watch_json(record: &DeviceRecord, now: OffsetDateTime) -> Result<String> {
    #[derive(Serialize)]
    struct WatchJson<'a> {
        timestamp: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        measured_at: Option<String>,
        #[serde(flatten)]
        record: RecordJson<'a>,
    }

    let line = serde_json::to_string(&WatchJson {
        timestamp: timestamp(now),
        measured_at: record.captured_at(now).map(timestamp),
        record: RecordJson::from(record),
    })?;
    Ok(line + "\n")
}
