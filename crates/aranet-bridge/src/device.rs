//! Device facade for bridge integrations.
//!
//! An [`Aranet4`] wraps the latest [`DeviceRecord`] for one sensor together
//! with descriptive metadata. The reading tool does not report manufacturer,
//! model or revision strings, so these are filled with placeholders unless
//! the caller supplies its own [`DeviceInfo`].

use std::time::Duration;

use aranet_types::{CurrentReading, DeviceInfo, DeviceRecord, Status};
use tracing::debug;

use crate::error::{Error, Result};
use crate::reader::Reader;
use crate::runner::CommandRunner;

/// Manufacturer reported for every device.
pub const DEFAULT_MANUFACTURER: &str = "SAF Tehnika";
/// Model reported for every device.
pub const DEFAULT_MODEL: &str = "Aranet4";
/// Placeholder firmware, hardware and software revision.
pub const DEFAULT_REVISION: &str = "1.0.0";

/// One sensor as seen by a bridge.
///
/// # Example
///
/// ```
/// use aranet_bridge::{Aranet4, parse};
///
/// let records = parse("= D =\nName: Office\nAddress: AA:BB:CC:DD:EE:FF\nCO2: 612 ppm\n");
/// let device = Aranet4::new(records[0].clone()).unwrap();
///
/// assert_eq!(device.identifier(), "AA:BB:CC:DD:EE:FF");
/// assert_eq!(device.current_reading().co2, Some(612.0));
/// assert_eq!(device.info().manufacturer, "SAF Tehnika");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Aranet4 {
    identifier: String,
    record: DeviceRecord,
    info: DeviceInfo,
}

impl Aranet4 {
    /// Wrap a record.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingField`] if the record has no address, since
    /// the address is the only way to read the device again.
    pub fn new(record: DeviceRecord) -> Result<Self> {
        let identifier = record
            .address
            .clone()
            .ok_or(Error::MissingField("address"))?;
        let info = placeholder_info(&record, &identifier);
        Ok(Self {
            identifier,
            record,
            info,
        })
    }

    /// Replace the placeholder metadata.
    #[must_use]
    pub fn with_info(mut self, info: DeviceInfo) -> Self {
        self.info = info;
        self
    }

    /// Scan for devices and wrap every record that has an address.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`Reader::scan`].
    pub async fn discover<R: CommandRunner>(reader: &Reader<R>) -> Result<Vec<Self>> {
        let records = reader.scan().await?;
        Ok(records
            .into_iter()
            .filter_map(|record| match Self::new(record) {
                Ok(device) => Some(device),
                Err(_) => {
                    debug!("Skipping scanned device without an address");
                    None
                }
            })
            .collect())
    }

    /// Stable key for targeted reads: the device address.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Display name, falling back to the address.
    pub fn name(&self) -> &str {
        self.record.name.as_deref().unwrap_or(&self.identifier)
    }

    /// The latest record.
    pub fn record(&self) -> &DeviceRecord {
        &self.record
    }

    /// Descriptive metadata.
    pub fn info(&self) -> &DeviceInfo {
        &self.info
    }

    /// The latest values as plain numbers.
    pub fn current_reading(&self) -> CurrentReading {
        CurrentReading::from(&self.record)
    }

    /// Status tier of the latest record.
    pub fn status(&self) -> Option<Status> {
        self.record.status
    }

    /// Time until the device takes its next measurement.
    pub fn next_update(&self) -> Option<Duration> {
        self.record.next_update()
    }

    /// Read the device again and replace the stored record.
    ///
    /// If the fresh record lacks an address, this device's identifier is
    /// kept on it.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`Reader::read`]; on error the stored record is
    /// unchanged.
    pub async fn refresh<R: CommandRunner>(&mut self, reader: &Reader<R>) -> Result<&DeviceRecord> {
        let mut record = reader.read(&self.identifier).await?;
        if record.address.is_none() {
            record.address = Some(self.identifier.clone());
        }
        debug!(identifier = %self.identifier, "Refreshed device record");
        self.record = record;
        Ok(&self.record)
    }
}

impl TryFrom<DeviceRecord> for Aranet4 {
    type Error = Error;

    fn try_from(record: DeviceRecord) -> Result<Self> {
        Self::new(record)
    }
}

fn placeholder_info(record: &DeviceRecord, identifier: &str) -> DeviceInfo {
    DeviceInfo::builder()
        .name(record.name.as_deref().unwrap_or(identifier))
        .serial(identifier)
        .manufacturer(DEFAULT_MANUFACTURER)
        .model(DEFAULT_MODEL)
        .firmware(DEFAULT_REVISION)
        .hardware(DEFAULT_REVISION)
        .software(DEFAULT_REVISION)
        .build()
}
