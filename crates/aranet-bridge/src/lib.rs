//! Aranet4 readings through an external scanning tool.
//!
//! This crate runs a command-line tool that talks to Aranet4 CO2 monitors
//! (such as `aranetctl`), parses its semi-structured text output into typed
//! [`DeviceRecord`]s, and wraps those records for home-automation bridges.
//!
//! # Features
//!
//! - **Output parsing**: tolerant, line-oriented [`parse`] that never fails
//!   on malformed fields
//! - **Device scanning**: [`Reader::scan`] lists all nearby devices
//! - **Targeted reads**: [`Reader::read`] fetches one device by address
//! - **Bridge facade**: [`Aranet4`] exposes an identifier, placeholder
//!   metadata and flat numeric readings
//! - **Testability**: the tool is behind the [`CommandRunner`] trait, with a
//!   scripted [`MockRunner`] for tests
//!
//! # Error model
//!
//! Only the tool itself can fail an operation: any output on its error
//! stream becomes [`Error::ExternalTool`] and the standard output is not
//! parsed. Malformed values degrade to raw strings or sentinel tiers.
//! Nothing is retried.
//!
//! # Quick Start
//!
//! ```no_run
//! use aranet_bridge::{Aranet4, Reader, ToolConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let reader = Reader::from_config(ToolConfig::default())?;
//!
//!     // Scan for devices
//!     let mut devices = Aranet4::discover(&reader).await?;
//!     println!("Found {} devices", devices.len());
//!
//!     // Read one again by address
//!     if let Some(device) = devices.first_mut() {
//!         device.refresh(&reader).await?;
//!         println!("CO2: {:?} ppm", device.current_reading().co2);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod device;
pub mod error;
pub mod mock;
pub mod parser;
pub mod reader;
pub mod runner;

// Re-export the types module from aranet-types
pub use aranet_types::types;

// Core exports
pub use config::ToolConfig;
pub use device::Aranet4;
pub use error::{Error, Result};
pub use mock::MockRunner;
pub use parser::parse;
pub use reader::Reader;
pub use runner::{CommandOutput, CommandRunner, ProcessRunner};

// Re-export from aranet-types
pub use aranet_types::{
    Age, CurrentReading, DeviceInfo, DeviceRecord, Measurement, Status, TemperatureUnit, Value,
};
