#![no_std]
//! # INA219 Current/Voltage/Power Monitor Driver
//!
//! This crate provides an embedded driver for the TI INA219 high-side
//! current/voltage/power monitor. It supports:
//! - Shunt voltage, bus voltage, current and power readings in physical
//!   units
//! - Two calibration profiles: standard (400 mA range) and high-current
//!   (3.2 A range)
//! - Automatic one-way escalation to the high-current profile when the
//!   device reports a measurement overflow or a current reading crosses
//!   90% of the standard range
//! - A configurable settling delay for triggered ADC modes
//!
//! Transport faults are surfaced as [`Error::I2c`] instead of being
//! reported as zero readings.
//!
//! ## Example
//!
//! ```no_run
//! use ina219::{Error, Ina219};
//! # use embedded_hal::{delay::DelayNs, i2c::I2c};
//! # fn example<I: I2c, D: DelayNs>(i2c: I, delay: D) -> Result<(), Error<I::Error>> {
//! let mut monitor = Ina219::new(i2c, delay);
//!
//! // Program the standard (400 mA) calibration profile
//! monitor.begin()?;
//!
//! let volts = monitor.read_bus_voltage()?;
//! let milliamps = monitor.read_current()?;
//! let milliwatts = monitor.read_power()?;
//!
//! if monitor.is_high_current_mode() {
//!     // A reading overflowed the standard range; the driver has
//!     // re-calibrated for the 3.2 A range and stays there.
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Async Support
//!
//! When the `async` feature is enabled, the crate provides
//! [`AsyncIna219`] with the same API but async/await support:
//!
//! ```no_run
//! # #[cfg(feature = "async")]
//! # async fn example<I, D>(i2c: I, delay: D) -> Result<(), ina219::Error<I::Error>>
//! # where
//! #     I: embedded_hal_async::i2c::I2c,
//! #     D: embedded_hal_async::delay::DelayNs,
//! # {
//! use ina219::AsyncIna219;
//!
//! let mut monitor = AsyncIna219::new(i2c, delay);
//! monitor.begin().await?;
//! let volts = monitor.read_bus_voltage().await?;
//! # Ok(())
//! # }
//! ```

mod driver;
#[cfg(feature = "async")]
mod driver_async;
mod error;
mod registers;
mod types;

// Re-export main types
pub use driver::Ina219;
#[cfg(feature = "async")]
pub use driver_async::AsyncIna219;
pub use error::Error;
pub use registers::*;
pub use types::*;
