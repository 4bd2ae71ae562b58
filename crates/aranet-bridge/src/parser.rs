//! Parser for the reading tool's text output.
//!
//! The tool prints one field per line as `Label: value[ unit]`, with each
//! device block introduced by a line starting with `=`:
//!
//! ```text
//! = Device 1 =
//! Name: Office
//! Address: AA:BB:CC:DD:EE:FF
//! CO2: 612 ppm
//! Temperature: 21.5 C
//! Status Display: GREEN
//! Age: 40/300
//! ```
//!
//! Parsing never fails. Blank lines, lines without a `: ` separator, lines
//! before the first boundary and unknown labels are skipped. Values that do
//! not parse as numbers are kept as raw strings, unknown status labels map
//! to tier 0, and a malformed `Age` leaves the age unset.

use aranet_types::{
    Age, DeviceRecord, DeviceRecordBuilder, Measurement, Status, TemperatureUnit, Value,
};
use tracing::{debug, trace};

/// First character of a line that starts a new device block.
pub const BOUNDARY_MARKER: char = '=';

/// Fields recognized in a device block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Name,
    Address,
    Co2,
    Temperature,
    Humidity,
    Pressure,
    Battery,
    Rssi,
    StatusDisplay,
    Age,
}

/// Label printed by the tool for each recognized field.
const LABELS: &[(&str, Field)] = &[
    ("Name", Field::Name),
    ("Address", Field::Address),
    ("CO2", Field::Co2),
    ("Temperature", Field::Temperature),
    ("Humidity", Field::Humidity),
    ("Pressure", Field::Pressure),
    ("Battery", Field::Battery),
    ("RSSI", Field::Rssi),
    ("Status Display", Field::StatusDisplay),
    ("Age", Field::Age),
];

impl Field {
    fn from_label(label: &str) -> Option<Self> {
        LABELS
            .iter()
            .find(|(l, _)| *l == label)
            .map(|(_, field)| *field)
    }

    /// Store `rest` into the builder according to this field's kind.
    fn apply(self, builder: DeviceRecordBuilder, rest: &str) -> DeviceRecordBuilder {
        match self {
            Field::Name => builder.name(rest),
            Field::Address => builder.address(rest),
            Field::Co2 => builder.co2(measurement(rest)),
            Field::Temperature => builder.temperature(temperature(rest)),
            Field::Humidity => builder.humidity(measurement(rest)),
            Field::Pressure => builder.pressure(measurement(rest)),
            Field::Battery => builder.battery(measurement(rest)),
            Field::Rssi => builder.rssi(measurement(rest)),
            Field::StatusDisplay => {
                let status = Status::from_display(rest);
                if status == Status::Unknown {
                    debug!(label = rest, "Unrecognized status display");
                }
                builder.status(status)
            }
            Field::Age => match rest.parse::<Age>() {
                Ok(age) => builder.age(age),
                Err(e) => {
                    debug!(value = rest, error = %e, "Ignoring malformed age");
                    builder
                }
            },
        }
    }
}

/// Parse the tool's output into device records, in the order they appear.
///
/// A record is emitted when the next boundary line is seen or the input
/// ends. Two consecutive boundaries produce an empty record; it is emitted
/// like any other, so the number of records always equals the number of
/// boundary lines.
///
/// # Examples
///
/// ```
/// use aranet_bridge::parse;
///
/// let records = parse("= Device =\nName: Office\nCO2: 612 ppm\n");
/// assert_eq!(records.len(), 1);
/// assert_eq!(records[0].name.as_deref(), Some("Office"));
/// assert_eq!(records[0].co2.as_ref().and_then(|m| m.as_f64()), Some(612.0));
///
/// assert!(parse("no devices here").is_empty());
/// ```
pub fn parse(raw: &str) -> Vec<DeviceRecord> {
    let mut records = Vec::new();
    let mut current: Option<DeviceRecordBuilder> = None;

    for line in raw.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if line.starts_with(BOUNDARY_MARKER) {
            if let Some(builder) = current.take() {
                records.push(builder.build());
            }
            current = Some(DeviceRecord::builder());
            continue;
        }

        let Some((label, rest)) = split_label(line) else {
            trace!(line, "Skipping line without a label");
            continue;
        };

        let Some(field) = Field::from_label(label) else {
            trace!(label, "Skipping unrecognized label");
            continue;
        };

        match current.take() {
            Some(builder) => current = Some(field.apply(builder, rest)),
            None => debug!(label, "Skipping field before first device boundary"),
        }
    }

    if let Some(builder) = current {
        records.push(builder.build());
    }

    debug!(count = records.len(), "Parsed device records");
    records
}

/// Split `Label: rest` at the first `:` that is followed by whitespace.
///
/// Colons inside values (such as MAC addresses) are not followed by
/// whitespace and are left alone.
fn split_label(line: &str) -> Option<(&str, &str)> {
    line.char_indices().find_map(|(i, c)| {
        let after = &line[i + c.len_utf8()..];
        (c == ':' && after.starts_with(char::is_whitespace)).then(|| (line[..i].trim(), after.trim()))
    })
}

/// Split `rest` into a number token and an optional unit token.
fn split_value(rest: &str) -> (Value, Option<&str>) {
    match rest.split_once(char::is_whitespace) {
        Some((number, unit)) => {
            let unit = unit.trim();
            (Value::parse(number), (!unit.is_empty()).then_some(unit))
        }
        None => (Value::parse(rest), None),
    }
}

fn measurement(rest: &str) -> Measurement {
    let (value, unit) = split_value(rest);
    if let Value::Raw(raw) = &value {
        debug!(value = %raw, "Keeping non-numeric value as raw text");
    }
    Measurement::new(value, unit.map(str::to_string))
}

fn temperature(rest: &str) -> Measurement<TemperatureUnit> {
    let (value, unit) = split_value(rest);
    Measurement::new(value, unit.map(TemperatureUnit::from_token))
}
