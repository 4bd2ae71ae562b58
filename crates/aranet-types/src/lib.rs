//! Typed device records for Aranet4 sensors.
//!
//! This crate provides the data model shared by the output parser
//! (aranet-bridge) and anything that consumes its results, such as a
//! home-automation bridge.
//!
//! # Features
//!
//! - [`DeviceRecord`]: one parsed device block with optional, unit-aware fields
//! - [`Measurement`] and [`Value`]: numeric values with a raw-string fallback
//! - [`Status`]: severity tier from the status display (`GREEN`/`ORANGE`/`RED`)
//! - [`Age`]: measurement interval progress and the derived next-update time
//! - [`CurrentReading`]: flattened numeric view for bridges
//!
//! # Example
//!
//! ```
//! use aranet_types::{DeviceRecord, Measurement, Status};
//!
//! let record = DeviceRecord::builder()
//!     .name("Office")
//!     .address("AA:BB:CC:DD:EE:FF")
//!     .co2(Measurement::number(612.0).with_unit("ppm".to_string()))
//!     .status(Status::Green)
//!     .build();
//!
//! assert_eq!(record.status.map(Status::tier), Some(1));
//! ```

pub mod error;
pub mod types;

pub use error::{ParseError, ParseResult};
pub use types::{
    Age, CurrentReading, DeviceInfo, DeviceInfoBuilder, DeviceRecord, DeviceRecordBuilder,
    Measurement, STATUS_LABELS, Status, TemperatureUnit, Value,
};
