//! Async INA219 driver implementation

use crate::{error::Error, registers::*, types::*};

#[cfg(feature = "async")]
use embedded_hal_async::{delay::DelayNs as AsyncDelayNs, i2c::I2c as AsyncI2c};

/// Async INA219 current/voltage/power monitor driver
///
/// Mirrors the synchronous [`Ina219`](crate::Ina219) API when the `async`
/// feature is enabled: the same profile state machine and escalation
/// policy, with every bus transaction awaited.
///
/// # Example
/// ```no_run
/// # #[cfg(feature = "async")]
/// # async fn example<I, D>(i2c: I, delay: D) -> Result<(), ina219::Error<I::Error>>
/// # where
/// #     I: embedded_hal_async::i2c::I2c,
/// #     D: embedded_hal_async::delay::DelayNs,
/// # {
/// use ina219::AsyncIna219;
///
/// let mut monitor = AsyncIna219::new(i2c, delay);
/// monitor.begin().await?;
/// let volts = monitor.read_bus_voltage().await?;
/// let milliamps = monitor.read_current().await?;
/// # Ok(())
/// # }
/// ```
#[cfg(feature = "async")]
pub struct AsyncIna219<I, D> {
    i2c: I,
    delay: D,
    addr: u8,
    mode: CalibrationMode,
    auto_escalation: bool,
    conversion_delay_us: u32,
}

#[cfg(feature = "async")]
impl<I, D> AsyncIna219<I, D>
where
    I: AsyncI2c,
    D: AsyncDelayNs,
{
    /// Create a new async INA219 driver instance
    pub fn new(i2c: I, delay: D) -> Self {
        Self::with_address(i2c, delay, INA219_I2C_ADDR)
    }

    /// Create a new async INA219 driver instance with a custom I2C
    /// address
    pub fn with_address(i2c: I, delay: D, addr: u8) -> Self {
        Self {
            i2c,
            delay,
            addr,
            mode: CalibrationMode::Standard,
            auto_escalation: true,
            conversion_delay_us: CONVERSION_DELAY_CONTINUOUS_US,
        }
    }

    /// Set the settling delay inserted between addressing a register and
    /// reading it back
    pub fn set_conversion_delay_us(&mut self, us: u32) {
        self.conversion_delay_us = us;
    }

    /// Enable or disable automatic escalation to the high-current
    /// profile (enabled by default)
    pub fn set_auto_escalation(&mut self, enabled: bool) {
        self.auto_escalation = enabled;
    }

    // ========================================
    // Low-level I2C operations
    // ========================================

    /// Write a 16-bit register, big-endian
    async fn write_register(&mut self, reg: Register, value: u16) -> Result<(), Error<I::Error>> {
        let [upper, lower] = value.to_be_bytes();
        self.i2c
            .write(self.addr, &[reg.addr(), upper, lower])
            .await
            .map_err(Error::I2c)
    }

    /// Read a 16-bit register, big-endian
    async fn read_register(&mut self, reg: Register) -> Result<u16, Error<I::Error>> {
        self.i2c
            .write(self.addr, &[reg.addr()])
            .await
            .map_err(Error::I2c)?;
        self.delay.delay_us(self.conversion_delay_us).await;
        let mut buf = [0u8; 2];
        self.i2c.read(self.addr, &mut buf).await.map_err(Error::I2c)?;
        Ok(u16::from_be_bytes(buf))
    }

    async fn apply_profile(&mut self, mode: CalibrationMode) -> Result<(), Error<I::Error>> {
        let profile = mode.profile();
        self.write_register(Register::Configuration, profile.configuration)
            .await?;
        self.write_register(Register::Calibration, profile.calibration)
            .await?;
        self.mode = mode;
        Ok(())
    }

    // ========================================
    // Profile management
    // ========================================

    /// Program the standard (400 mA) profile
    pub async fn begin(&mut self) -> Result<(), Error<I::Error>> {
        self.apply_profile(CalibrationMode::Standard).await
    }

    /// Program the high-current (3.2 A) profile
    pub async fn switch_to_high_current(&mut self) -> Result<(), Error<I::Error>> {
        self.apply_profile(CalibrationMode::HighCurrent).await
    }

    /// Whether the high-current profile is active
    pub fn is_high_current_mode(&self) -> bool {
        self.mode == CalibrationMode::HighCurrent
    }

    /// The active calibration mode
    pub fn mode(&self) -> CalibrationMode {
        self.mode
    }

    // ========================================
    // Measurements
    // ========================================

    /// Voltage across the shunt resistor in volts (10 uV per count,
    /// profile independent)
    pub async fn read_shunt_voltage(&mut self) -> Result<f32, Error<I::Error>> {
        let raw = self.read_register(Register::ShuntVoltage).await? as i16;
        Ok(raw as f32 * SHUNT_VOLTAGE_LSB_V)
    }

    /// Bus voltage in volts
    ///
    /// Overflow handling matches the sync driver: escalate and re-read
    /// once in the standard profile, degrade to
    /// [`BUS_VOLTAGE_OVERFLOW_V`] if the flag persists.
    pub async fn read_bus_voltage(&mut self) -> Result<f32, Error<I::Error>> {
        let mut raw = self.read_register(Register::BusVoltage).await?;
        if raw & BUS_VOLTAGE_OVERFLOW_FLAG != 0
            && self.auto_escalation
            && self.mode == CalibrationMode::Standard
        {
            self.switch_to_high_current().await?;
            raw = self.read_register(Register::BusVoltage).await?;
        }
        if raw & BUS_VOLTAGE_OVERFLOW_FLAG != 0 {
            return Ok(BUS_VOLTAGE_OVERFLOW_V);
        }
        // Bits 3-15 carry the voltage, 4 mV per count
        Ok(((raw as i16) >> 3) as f32 * BUS_VOLTAGE_LSB_V)
    }

    /// Current through the shunt in milliamps, scaled by the active
    /// profile's LSB, escalating above [`HIGH_CURRENT_THRESHOLD_MA`]
    pub async fn read_current(&mut self) -> Result<f32, Error<I::Error>> {
        let raw = self.read_register(Register::Current).await? as i16;
        let current = raw as f32 * self.mode.profile().current_lsb_ma;
        if self.auto_escalation
            && self.mode == CalibrationMode::Standard
            && current > HIGH_CURRENT_THRESHOLD_MA
        {
            self.switch_to_high_current().await?;
            let raw = self.read_register(Register::Current).await? as i16;
            return Ok(raw as f32 * self.mode.profile().current_lsb_ma);
        }
        Ok(current)
    }

    /// Power in milliwatts, scaled by the active profile's power LSB
    pub async fn read_power(&mut self) -> Result<f32, Error<I::Error>> {
        let raw = self.read_register(Register::Power).await?;
        Ok(raw as f32 * self.mode.profile().power_lsb_mw())
    }
}
