//! Core types for Aranet device records.

use core::fmt;
use core::str::FromStr;
use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{ParseError, ParseResult};

/// A measured value as reported by the reading tool.
///
/// Values that parse as finite numbers become [`Value::Number`]. Anything else
/// is kept verbatim as [`Value::Raw`] so that a single malformed field never
/// prevents the rest of a device block from being read.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Value {
    /// A numeric value.
    Number(f64),
    /// The original token, when it could not be read as a number.
    Raw(String),
}

impl Value {
    /// Parse a token, falling back to the raw token if it is not a finite number.
    ///
    /// # Examples
    ///
    /// ```
    /// use aranet_types::Value;
    ///
    /// assert_eq!(Value::parse("612"), Value::Number(612.0));
    /// assert_eq!(Value::parse("n/a"), Value::Raw("n/a".to_string()));
    /// ```
    #[must_use]
    pub fn parse(token: &str) -> Self {
        match token.parse::<f64>() {
            Ok(n) if n.is_finite() => Value::Number(n),
            _ => Value::Raw(token.to_string()),
        }
    }

    /// Returns the numeric value, if there is one.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Raw(_) => None,
        }
    }

    /// Returns `true` if the value fell back to the raw token.
    #[must_use]
    pub fn is_raw(&self) -> bool {
        matches!(self, Value::Raw(_))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", n),
            Value::Raw(s) => f.write_str(s),
        }
    }
}

/// A value paired with the unit the tool reported for it, if any.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Measurement<U = String> {
    /// The measured value.
    pub value: Value,
    /// The unit, present only when the tool printed one.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub unit: Option<U>,
}

impl<U> Measurement<U> {
    /// Create a measurement.
    pub fn new(value: Value, unit: Option<U>) -> Self {
        Self { value, unit }
    }

    /// Create a numeric measurement without a unit.
    pub fn number(value: f64) -> Self {
        Self {
            value: Value::Number(value),
            unit: None,
        }
    }

    /// Attach a unit.
    #[must_use]
    pub fn with_unit(mut self, unit: U) -> Self {
        self.unit = Some(unit);
        self
    }

    /// Returns the numeric value, if there is one.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        self.value.as_f64()
    }
}

/// Temperature unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum TemperatureUnit {
    /// Degrees Celsius.
    Celsius,
    /// Degrees Fahrenheit.
    Fahrenheit,
}

impl TemperatureUnit {
    /// Normalize a unit token printed by the tool.
    ///
    /// This is a plain suffix check: a token ending in `C` is Celsius and
    /// every other token is Fahrenheit. It is not locale-aware.
    ///
    /// ```
    /// use aranet_types::TemperatureUnit;
    ///
    /// assert_eq!(TemperatureUnit::from_token("°C"), TemperatureUnit::Celsius);
    /// assert_eq!(TemperatureUnit::from_token("°F"), TemperatureUnit::Fahrenheit);
    /// assert_eq!(TemperatureUnit::from_token("K"), TemperatureUnit::Fahrenheit);
    /// ```
    #[must_use]
    pub fn from_token(token: &str) -> Self {
        if token.ends_with('C') {
            TemperatureUnit::Celsius
        } else {
            TemperatureUnit::Fahrenheit
        }
    }

    /// Display symbol for the unit.
    #[must_use]
    pub fn symbol(&self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "°C",
            TemperatureUnit::Fahrenheit => "°F",
        }
    }
}

impl fmt::Display for TemperatureUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemperatureUnit::Celsius => write!(f, "celsius"),
            TemperatureUnit::Fahrenheit => write!(f, "fahrenheit"),
        }
    }
}

/// Status display labels, ordered from best to worst.
pub const STATUS_LABELS: [&str; 3] = ["GREEN", "ORANGE", "RED"];

/// Air-quality severity tier from the device's status display.
///
/// Tiers are ordered by severity: `Unknown < Green < Orange < Red`.
///
/// ```
/// use aranet_types::Status;
///
/// assert_eq!(Status::from_display("ORANGE").tier(), 2);
/// assert_eq!(Status::from_display("PURPLE"), Status::Unknown);
/// assert!(Status::Red > Status::Orange);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(into = "u8", from = "u8"))]
#[repr(u8)]
pub enum Status {
    /// Unrecognized status text.
    #[default]
    Unknown = 0,
    /// Good air quality.
    Green = 1,
    /// Moderate air quality.
    Orange = 2,
    /// Poor air quality.
    Red = 3,
}

impl Status {
    /// Classify a status display label. Unknown labels map to [`Status::Unknown`].
    #[must_use]
    pub fn from_display(label: &str) -> Self {
        STATUS_LABELS
            .iter()
            .position(|l| *l == label)
            .map_or(Status::Unknown, |i| Status::from(i as u8 + 1))
    }

    /// Numeric tier: 1 is best, 3 is worst, 0 is unknown.
    #[must_use]
    pub fn tier(self) -> u8 {
        self as u8
    }
}

impl From<u8> for Status {
    fn from(value: u8) -> Self {
        match value {
            1 => Status::Green,
            2 => Status::Orange,
            3 => Status::Red,
            _ => Status::Unknown,
        }
    }
}

impl From<Status> for u8 {
    fn from(status: Status) -> Self {
        status.tier()
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Unknown => write!(f, "UNKNOWN"),
            Status::Green => write!(f, "GREEN"),
            Status::Orange => write!(f, "ORANGE"),
            Status::Red => write!(f, "RED"),
        }
    }
}

/// Position within the device's current measurement interval, in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Age {
    /// Seconds since the last measurement.
    pub elapsed: f64,
    /// Length of the measurement interval.
    pub total: f64,
}

impl Age {
    /// Milliseconds until the next measurement: `(total - elapsed) * 1000`.
    ///
    /// Not clamped; a stale reading yields a negative value.
    #[must_use]
    pub fn next_update_millis(&self) -> f64 {
        (self.total - self.elapsed) * 1000.0
    }

    /// Time until the next measurement, clamped at zero.
    #[must_use]
    pub fn next_update(&self) -> Duration {
        let millis = self.next_update_millis();
        if millis > 0.0 {
            Duration::try_from_secs_f64(millis / 1000.0).unwrap_or(Duration::MAX)
        } else {
            Duration::ZERO
        }
    }
}

impl FromStr for Age {
    type Err = ParseError;

    /// Parse `"<elapsed>/<total>"`.
    ///
    /// ```
    /// use aranet_types::Age;
    ///
    /// let age: Age = "12/300".parse().unwrap();
    /// assert_eq!(age.next_update_millis(), 288000.0);
    /// assert!("12".parse::<Age>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (elapsed, total) = s
            .split_once('/')
            .ok_or_else(|| ParseError::InvalidValue(format!("age '{}' is missing '/'", s)))?;

        let number = |part: &str| -> ParseResult<f64> {
            match part.trim().parse::<f64>() {
                Ok(n) if n.is_finite() => Ok(n),
                _ => Err(ParseError::InvalidValue(format!(
                    "age component '{}' is not a number",
                    part.trim()
                ))),
            }
        };

        Ok(Age {
            elapsed: number(elapsed)?,
            total: number(total)?,
        })
    }
}

/// One device block from the tool's output.
///
/// Every field is optional: the tool may omit lines, and a block is kept
/// even if it is sparse.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DeviceRecord {
    /// Display name.
    pub name: Option<String>,
    /// Device address, the key for later targeted reads.
    pub address: Option<String>,
    /// CO2 concentration (ppm).
    pub co2: Option<Measurement>,
    /// Temperature in the unit the tool reported.
    pub temperature: Option<Measurement<TemperatureUnit>>,
    /// Relative humidity (%).
    pub humidity: Option<Measurement>,
    /// Atmospheric pressure (hPa).
    pub pressure: Option<Measurement>,
    /// Battery level (%).
    pub battery: Option<Measurement>,
    /// Signal strength seen by the scanner (dBm).
    pub rssi: Option<Measurement>,
    /// Status display tier.
    pub status: Option<Status>,
    /// Measurement interval progress.
    pub age: Option<Age>,
}

impl DeviceRecord {
    /// Create a builder.
    pub fn builder() -> DeviceRecordBuilder {
        DeviceRecordBuilder::default()
    }

    /// Milliseconds until the device takes its next measurement.
    ///
    /// Always derived from [`age`](Self::age).
    #[must_use]
    pub fn next_update_millis(&self) -> Option<f64> {
        self.age.as_ref().map(Age::next_update_millis)
    }

    /// Time until the device takes its next measurement, clamped at zero.
    #[must_use]
    pub fn next_update(&self) -> Option<Duration> {
        self.age.as_ref().map(Age::next_update)
    }

    /// Estimate when the current measurement was taken, relative to `now`.
    ///
    /// Returns `None` without an age, or if the elapsed time does not fit
    /// the representable date range.
    #[must_use]
    pub fn captured_at(&self, now: time::OffsetDateTime) -> Option<time::OffsetDateTime> {
        let age = self.age?;
        let elapsed = time::Duration::checked_seconds_f64(age.elapsed)?;
        now.checked_sub(elapsed)
    }

    /// Returns `true` if no field was populated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == DeviceRecord::default()
    }
}

/// Builder for [`DeviceRecord`].
#[derive(Debug, Default, Clone)]
#[must_use]
pub struct DeviceRecordBuilder {
    record: DeviceRecord,
}

impl DeviceRecordBuilder {
    /// Set the display name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.record.name = Some(name.into());
        self
    }

    /// Set the address.
    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.record.address = Some(address.into());
        self
    }

    /// Set the CO2 measurement.
    pub fn co2(mut self, co2: Measurement) -> Self {
        self.record.co2 = Some(co2);
        self
    }

    /// Set the temperature measurement.
    pub fn temperature(mut self, temperature: Measurement<TemperatureUnit>) -> Self {
        self.record.temperature = Some(temperature);
        self
    }

    /// Set the humidity measurement.
    pub fn humidity(mut self, humidity: Measurement) -> Self {
        self.record.humidity = Some(humidity);
        self
    }

    /// Set the pressure measurement.
    pub fn pressure(mut self, pressure: Measurement) -> Self {
        self.record.pressure = Some(pressure);
        self
    }

    /// Set the battery measurement.
    pub fn battery(mut self, battery: Measurement) -> Self {
        self.record.battery = Some(battery);
        self
    }

    /// Set the signal strength.
    pub fn rssi(mut self, rssi: Measurement) -> Self {
        self.record.rssi = Some(rssi);
        self
    }

    /// Set the status tier.
    pub fn status(mut self, status: Status) -> Self {
        self.record.status = Some(status);
        self
    }

    /// Set the interval progress.
    pub fn age(mut self, age: Age) -> Self {
        self.record.age = Some(age);
        self
    }

    /// Finish the record.
    #[must_use]
    pub fn build(self) -> DeviceRecord {
        self.record
    }
}

/// Flattened, unit-stripped reading for bridges that expect plain numbers.
///
/// Values that the tool printed but could not be read as numbers are `None`.
/// Temperature is in [`temperature_unit`](Self::temperature_unit); converting
/// it is up to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CurrentReading {
    /// CO2 concentration in ppm.
    pub co2: Option<f64>,
    /// Temperature in `temperature_unit`.
    pub temperature: Option<f64>,
    /// Unit of `temperature`, if the tool reported one.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub temperature_unit: Option<TemperatureUnit>,
    /// Relative humidity percentage.
    pub humidity: Option<f64>,
    /// Atmospheric pressure in hPa.
    pub pressure: Option<f64>,
    /// Battery level percentage.
    pub battery: Option<f64>,
}

impl From<&DeviceRecord> for CurrentReading {
    fn from(record: &DeviceRecord) -> Self {
        let number = |m: &Option<Measurement>| m.as_ref().and_then(Measurement::as_f64);
        Self {
            co2: number(&record.co2),
            temperature: record.temperature.as_ref().and_then(Measurement::as_f64),
            temperature_unit: record.temperature.as_ref().and_then(|t| t.unit),
            humidity: number(&record.humidity),
            pressure: number(&record.pressure),
            battery: number(&record.battery),
        }
    }
}

/// Descriptive metadata for a device.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DeviceInfo {
    /// Device name.
    pub name: String,
    /// Model name.
    pub model: String,
    /// Serial number.
    pub serial: String,
    /// Firmware revision.
    pub firmware: String,
    /// Hardware revision.
    pub hardware: String,
    /// Software revision.
    pub software: String,
    /// Manufacturer name.
    pub manufacturer: String,
}

impl DeviceInfo {
    /// Create a builder for constructing `DeviceInfo`.
    pub fn builder() -> DeviceInfoBuilder {
        DeviceInfoBuilder::default()
    }
}

/// Builder for constructing `DeviceInfo`.
#[derive(Debug, Default, Clone)]
#[must_use]
pub struct DeviceInfoBuilder {
    info: DeviceInfo,
}

impl DeviceInfoBuilder {
    /// Set the device name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.info.name = name.into();
        self
    }

    /// Set the model name.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.info.model = model.into();
        self
    }

    /// Set the serial number.
    pub fn serial(mut self, serial: impl Into<String>) -> Self {
        self.info.serial = serial.into();
        self
    }

    /// Set the firmware revision.
    pub fn firmware(mut self, firmware: impl Into<String>) -> Self {
        self.info.firmware = firmware.into();
        self
    }

    /// Set the hardware revision.
    pub fn hardware(mut self, hardware: impl Into<String>) -> Self {
        self.info.hardware = hardware.into();
        self
    }

    /// Set the software revision.
    pub fn software(mut self, software: impl Into<String>) -> Self {
        self.info.software = software.into();
        self
    }

    /// Set the manufacturer name.
    pub fn manufacturer(mut self, manufacturer: impl Into<String>) -> Self {
        self.info.manufacturer = manufacturer.into();
        self
    }

    /// Build the `DeviceInfo`.
    #[must_use]
    pub fn build(self) -> DeviceInfo {
        self.info
    }
}
