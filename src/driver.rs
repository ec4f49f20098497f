//! Synchronous INA219 driver implementation

use crate::{error::Error, registers::*, types::*};
use embedded_hal::{delay::DelayNs, i2c::I2c};

/// INA219 current/voltage/power monitor driver
///
/// The driver owns the active calibration profile. It comes up in the
/// standard (400 mA) profile and escalates to the high-current (3.2 A)
/// profile when the device reports a measurement overflow or a current
/// reading crosses [`HIGH_CURRENT_THRESHOLD_MA`]. Escalation is
/// one-directional; only [`Ina219::begin`] returns to the standard
/// profile.
pub struct Ina219<I, D> {
    i2c: I,
    delay: D,
    addr: u8,
    mode: CalibrationMode,
    auto_escalation: bool,
    conversion_delay_us: u32,
}

impl<I, D> Ina219<I, D>
where
    I: I2c,
    D: DelayNs,
{
    /// Create a new INA219 driver instance
    ///
    /// # Arguments
    /// * `i2c` - I2C bus instance
    /// * `delay` - delay provider for the post-addressing settling wait
    ///
    /// # Example
    /// ```no_run
    /// # use ina219::Ina219;
    /// # use embedded_hal::{delay::DelayNs, i2c::I2c};
    /// # fn example<I: I2c, D: DelayNs>(i2c: I, delay: D) {
    /// let monitor = Ina219::new(i2c, delay);
    /// # }
    /// ```
    pub fn new(i2c: I, delay: D) -> Self {
        Self::with_address(i2c, delay, INA219_I2C_ADDR)
    }

    /// Create a new INA219 driver instance with a custom I2C address
    /// (A0/A1 strap pins, datasheet page 14, table 1)
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
    ///
    /// Both built-in profiles run the ADC in continuous mode, where the
    /// default [`CONVERSION_DELAY_CONTINUOUS_US`] suffices. Triggered
    /// modes need [`CONVERSION_DELAY_12BIT_TRIGGERED_US`] or
    /// [`CONVERSION_DELAY_128_SAMPLES_US`].
    pub fn set_conversion_delay_us(&mut self, us: u32) {
        self.conversion_delay_us = us;
    }

    /// Enable or disable automatic escalation to the high-current profile
    ///
    /// With escalation disabled the driver never rewrites the device
    /// registers on its own: a bus-voltage overflow reports
    /// [`BUS_VOLTAGE_OVERFLOW_V`] immediately and current readings are
    /// returned as measured. Enabled by default.
    pub fn set_auto_escalation(&mut self, enabled: bool) {
        self.auto_escalation = enabled;
    }

    // ========================================
    // Low-level I2C operations
    // ========================================

    /// Write a 16-bit register, big-endian
    fn write_register(&mut self, reg: Register, value: u16) -> Result<(), Error<I::Error>> {
        let [upper, lower] = value.to_be_bytes();
        self.i2c
            .write(self.addr, &[reg.addr(), upper, lower])
            .map_err(Error::I2c)
    }

    /// Read a 16-bit register, big-endian
    fn read_register(&mut self, reg: Register) -> Result<u16, Error<I::Error>> {
        self.i2c.write(self.addr, &[reg.addr()]).map_err(Error::I2c)?;
        self.delay.delay_us(self.conversion_delay_us);
        let mut buf = [0u8; 2];
        self.i2c.read(self.addr, &mut buf).map_err(Error::I2c)?;
        Ok(u16::from_be_bytes(buf))
    }

    /// Program the device with a profile's Configuration and Calibration
    /// words, then record it as active
    fn apply_profile(&mut self, mode: CalibrationMode) -> Result<(), Error<I::Error>> {
        let profile = mode.profile();
        self.write_register(Register::Configuration, profile.configuration)?;
        self.write_register(Register::Calibration, profile.calibration)?;
        self.mode = mode;
        Ok(())
    }

    // ========================================
    // Profile management
    // ========================================

    /// Program the standard (400 mA) profile
    ///
    /// This is the only way back to the standard profile once the driver
    /// has escalated.
    pub fn begin(&mut self) -> Result<(), Error<I::Error>> {
        self.apply_profile(CalibrationMode::Standard)
    }

    /// Program the high-current (3.2 A) profile
    ///
    /// Called automatically when a reading overflows the standard range;
    /// exposed for callers that know the load up front.
    pub fn switch_to_high_current(&mut self) -> Result<(), Error<I::Error>> {
        self.apply_profile(CalibrationMode::HighCurrent)
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

    /// Voltage across the shunt resistor in volts
    ///
    /// 10 uV per count regardless of the active profile.
    pub fn read_shunt_voltage(&mut self) -> Result<f32, Error<I::Error>> {
        let raw = self.read_register(Register::ShuntVoltage)? as i16;
        Ok(raw as f32 * SHUNT_VOLTAGE_LSB_V)
    }

    /// Bus voltage in volts
    ///
    /// Bit 0 of the raw word is the device's math overflow flag. The
    /// device raises it through this register even when the cause is
    /// shunt/current saturation, so in the standard profile it is taken
    /// as the cue to broaden the whole measurement range: escalate, then
    /// re-read once. If the flag is still set afterwards (or escalation
    /// is disabled) the reading degrades to [`BUS_VOLTAGE_OVERFLOW_V`].
    pub fn read_bus_voltage(&mut self) -> Result<f32, Error<I::Error>> {
        let mut raw = self.read_register(Register::BusVoltage)?;
        if raw & BUS_VOLTAGE_OVERFLOW_FLAG != 0
            && self.auto_escalation
            && self.mode == CalibrationMode::Standard
        {
            self.switch_to_high_current()?;
            raw = self.read_register(Register::BusVoltage)?;
        }
        if raw & BUS_VOLTAGE_OVERFLOW_FLAG != 0 {
            return Ok(BUS_VOLTAGE_OVERFLOW_V);
        }
        // Bits 3-15 carry the voltage, 4 mV per count
        Ok(((raw as i16) >> 3) as f32 * BUS_VOLTAGE_LSB_V)
    }

    /// Current through the shunt in milliamps, scaled by the active
    /// profile's LSB
    ///
    /// In the standard profile a reading above
    /// [`HIGH_CURRENT_THRESHOLD_MA`] escalates to the high-current
    /// profile and re-reads once before returning.
    pub fn read_current(&mut self) -> Result<f32, Error<I::Error>> {
        let raw = self.read_register(Register::Current)? as i16;
        let current = raw as f32 * self.mode.profile().current_lsb_ma;
        if self.auto_escalation
            && self.mode == CalibrationMode::Standard
            && current > HIGH_CURRENT_THRESHOLD_MA
        {
            self.switch_to_high_current()?;
            let raw = self.read_register(Register::Current)? as i16;
            return Ok(raw as f32 * self.mode.profile().current_lsb_ma);
        }
        Ok(current)
    }

    /// Power in milliwatts, scaled by the active profile's power LSB
    /// (20 times its current LSB)
    pub fn read_power(&mut self) -> Result<f32, Error<I::Error>> {
        let raw = self.read_register(Register::Power)?;
        Ok(raw as f32 * self.mode.profile().power_lsb_mw())
    }
}

#[cfg(test)]
mod tests {
    extern crate std;
    use std::vec;
    use std::vec::Vec;

    use super::*;
    use embedded_hal::i2c::ErrorKind;
    use embedded_hal_mock::eh1::delay::NoopDelay;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};

    const ADDR: u8 = INA219_I2C_ADDR;

    fn reg_read(reg: Register, value: u16) -> Vec<I2cTransaction> {
        vec![
            I2cTransaction::write(ADDR, vec![reg.addr()]),
            I2cTransaction::read(ADDR, value.to_be_bytes().to_vec()),
        ]
    }

    fn standard_profile_writes() -> Vec<I2cTransaction> {
        vec![
            I2cTransaction::write(ADDR, vec![0x00, 0x04, 0x47]),
            I2cTransaction::write(ADDR, vec![0x05, 0x7D, 0x00]),
        ]
    }

    fn high_current_profile_writes() -> Vec<I2cTransaction> {
        vec![
            I2cTransaction::write(ADDR, vec![0x00, 0x1C, 0x47]),
            I2cTransaction::write(ADDR, vec![0x05, 0x0F, 0xA0]),
        ]
    }

    #[test]
    fn begin_is_idempotent_and_writes_identical_sequences() {
        let mut expectations = standard_profile_writes();
        expectations.extend(standard_profile_writes());
        let mut i2c = I2cMock::new(&expectations);

        let mut ina = Ina219::new(i2c.clone(), NoopDelay);
        ina.begin().unwrap();
        ina.begin().unwrap();
        assert!(!ina.is_high_current_mode());
        i2c.done();
    }

    #[test]
    fn begin_resets_mode_after_escalation() {
        let mut expectations = high_current_profile_writes();
        expectations.extend(standard_profile_writes());
        let mut i2c = I2cMock::new(&expectations);

        let mut ina = Ina219::new(i2c.clone(), NoopDelay);
        ina.switch_to_high_current().unwrap();
        assert!(ina.is_high_current_mode());
        ina.begin().unwrap();
        assert!(!ina.is_high_current_mode());
        assert_eq!(ina.mode(), CalibrationMode::Standard);
        i2c.done();
    }

    #[test]
    fn shunt_voltage_scales_by_ten_microvolts() {
        let mut expectations = reg_read(Register::ShuntVoltage, 4000);
        expectations.extend(reg_read(Register::ShuntVoltage, 0xFFF6)); // -10
        let mut i2c = I2cMock::new(&expectations);

        let mut ina = Ina219::new(i2c.clone(), NoopDelay);
        assert!((ina.read_shunt_voltage().unwrap() - 0.04).abs() < 1e-6);
        assert!((ina.read_shunt_voltage().unwrap() - (-0.0001)).abs() < 1e-7);
        i2c.done();
    }

    #[test]
    fn bus_voltage_discards_status_bits() {
        // 8000 >> 3 = 1000 counts, 4 mV each
        let expectations = reg_read(Register::BusVoltage, 0x1F40);
        let mut i2c = I2cMock::new(&expectations);

        let mut ina = Ina219::new(i2c.clone(), NoopDelay);
        assert!((ina.read_bus_voltage().unwrap() - 4.0).abs() < 1e-4);
        assert!(!ina.is_high_current_mode());
        i2c.done();
    }

    #[test]
    fn bus_voltage_overflow_escalates_and_rereads_once() {
        let mut expectations = reg_read(Register::BusVoltage, 0x3209); // bit 0 set
        expectations.extend(high_current_profile_writes());
        expectations.extend(reg_read(Register::BusVoltage, 0x3208));
        let mut i2c = I2cMock::new(&expectations);

        let mut ina = Ina219::new(i2c.clone(), NoopDelay);
        // (0x3208 >> 3) * 0.004 = 1601 * 0.004
        assert!((ina.read_bus_voltage().unwrap() - 6.404).abs() < 1e-3);
        assert!(ina.is_high_current_mode());
        i2c.done();
    }

    #[test]
    fn bus_voltage_reports_sentinel_when_overflow_persists() {
        let mut expectations = reg_read(Register::BusVoltage, 0x0001);
        expectations.extend(high_current_profile_writes());
        expectations.extend(reg_read(Register::BusVoltage, 0x0001));
        let mut i2c = I2cMock::new(&expectations);

        let mut ina = Ina219::new(i2c.clone(), NoopDelay);
        assert_eq!(ina.read_bus_voltage().unwrap(), BUS_VOLTAGE_OVERFLOW_V);
        assert!(ina.is_high_current_mode());
        i2c.done();
    }

    #[test]
    fn bus_voltage_overflow_in_high_current_mode_is_sentinel_without_reread() {
        let mut expectations = high_current_profile_writes();
        expectations.extend(reg_read(Register::BusVoltage, 0x0001));
        let mut i2c = I2cMock::new(&expectations);

        let mut ina = Ina219::new(i2c.clone(), NoopDelay);
        ina.switch_to_high_current().unwrap();
        assert_eq!(ina.read_bus_voltage().unwrap(), BUS_VOLTAGE_OVERFLOW_V);
        i2c.done();
    }

    #[test]
    fn bus_voltage_overflow_with_escalation_disabled_is_sentinel() {
        let expectations = reg_read(Register::BusVoltage, 0x3209);
        let mut i2c = I2cMock::new(&expectations);

        let mut ina = Ina219::new(i2c.clone(), NoopDelay);
        ina.set_auto_escalation(false);
        assert_eq!(ina.read_bus_voltage().unwrap(), BUS_VOLTAGE_OVERFLOW_V);
        assert!(!ina.is_high_current_mode());
        i2c.done();
    }

    #[test]
    fn current_below_threshold_stays_in_standard_mode() {
        // 1000 * 0.0128 = 12.8 mA
        let expectations = reg_read(Register::Current, 1000);
        let mut i2c = I2cMock::new(&expectations);

        let mut ina = Ina219::new(i2c.clone(), NoopDelay);
        assert!((ina.read_current().unwrap() - 12.8).abs() < 1e-4);
        assert!(!ina.is_high_current_mode());
        i2c.done();
    }

    #[test]
    fn current_above_threshold_escalates_and_rescales() {
        // 28204 * 0.0128 = 361.0112 mA, above the 360 mA threshold
        let mut expectations = reg_read(Register::Current, 28204);
        expectations.extend(high_current_profile_writes());
        // re-read scales by the high-current LSB: 3526 * 0.1024 = 361.0624
        expectations.extend(reg_read(Register::Current, 3526));
        let mut i2c = I2cMock::new(&expectations);

        let mut ina = Ina219::new(i2c.clone(), NoopDelay);
        assert!((ina.read_current().unwrap() - 361.0624).abs() < 1e-3);
        assert!(ina.is_high_current_mode());
        i2c.done();
    }

    #[test]
    fn current_in_high_current_mode_never_rereads() {
        let mut expectations = high_current_profile_writes();
        expectations.extend(reg_read(Register::Current, 28204));
        let mut i2c = I2cMock::new(&expectations);

        let mut ina = Ina219::new(i2c.clone(), NoopDelay);
        ina.switch_to_high_current().unwrap();
        // 28204 * 0.1024 = 2888.0896 mA
        assert!((ina.read_current().unwrap() - 2888.0896).abs() < 1e-2);
        i2c.done();
    }

    #[test]
    fn negative_current_is_signed() {
        // -1000 * 0.0128 = -12.8 mA
        let expectations = reg_read(Register::Current, (-1000i16) as u16);
        let mut i2c = I2cMock::new(&expectations);

        let mut ina = Ina219::new(i2c.clone(), NoopDelay);
        assert!((ina.read_current().unwrap() - (-12.8)).abs() < 1e-4);
        assert!(!ina.is_high_current_mode());
        i2c.done();
    }

    #[test]
    fn power_uses_the_active_profile_lsb() {
        let mut expectations = reg_read(Register::Power, 1000);
        expectations.extend(high_current_profile_writes());
        expectations.extend(reg_read(Register::Power, 1000));
        let mut i2c = I2cMock::new(&expectations);

        let mut ina = Ina219::new(i2c.clone(), NoopDelay);
        // 1000 * 0.0128 * 20 = 256 mW
        assert!((ina.read_power().unwrap() - 256.0).abs() < 1e-3);
        ina.switch_to_high_current().unwrap();
        // same raw word, 1000 * 0.1024 * 20 = 2048 mW
        assert!((ina.read_power().unwrap() - 2048.0).abs() < 1e-2);
        i2c.done();
    }

    #[test]
    fn transport_fault_surfaces_as_error() {
        let expectations =
            [I2cTransaction::write(ADDR, vec![0x01]).with_error(ErrorKind::Other)];
        let mut i2c = I2cMock::new(&expectations);

        let mut ina = Ina219::new(i2c.clone(), NoopDelay);
        assert_eq!(ina.read_shunt_voltage(), Err(Error::I2c(ErrorKind::Other)));
        i2c.done();
    }

    #[test]
    fn custom_address_is_used_on_the_wire() {
        let alt = 0x41;
        let expectations = [
            I2cTransaction::write(alt, vec![0x00, 0x04, 0x47]),
            I2cTransaction::write(alt, vec![0x05, 0x7D, 0x00]),
        ];
        let mut i2c = I2cMock::new(&expectations);

        let mut ina = Ina219::with_address(i2c.clone(), NoopDelay, alt);
        ina.begin().unwrap();
        i2c.done();
    }
}
