//! Error types for INA219 operations
//!
//! A failed bus transaction is surfaced to the caller instead of being
//! folded into a plausible-looking zero reading.

/// Error types for INA219 operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error<E> {
    /// I2C communication error
    I2c(E),
}

impl<E> From<E> for Error<E> {
    fn from(error: E) -> Self {
        Error::I2c(error)
    }
}
