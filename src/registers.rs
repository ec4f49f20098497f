//! Register map and calibration constants for the INA219
//!
//! All values trace back to the INA219 datasheet
//! (<http://www.ti.com/lit/ds/symlink/ina219.pdf>). The calibration
//! constants are design-time values for a 0.1 ohm shunt; the derivations
//! are spelled out below so they can be re-derived for a different shunt
//! resistor or current range.

/// INA219 I2C address with A0 and A1 strapped to GND
/// (datasheet page 14, table 1)
pub const INA219_I2C_ADDR: u8 = 0b100_0000;

/// Register access mode, see [`Register::access`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Measurement result, writes are not meaningful
    ReadOnly,
    /// Host-configured register
    ReadWrite,
}

/// The INA219 register file
///
/// Every register is a 16-bit big-endian word addressed by a single byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Register {
    /// Operating mode, PGA gain and ADC resolution (datasheet page 19, table 3)
    Configuration = 0x00,
    /// Voltage across the shunt resistor, signed (datasheet page 23, figure 20)
    ShuntVoltage = 0x01,
    /// Bus voltage plus status bits; bit 0 is the math overflow flag
    /// (datasheet page 23, figure 24)
    BusVoltage = 0x02,
    /// Power measurement, unsigned (datasheet page 23, figure 25)
    Power = 0x03,
    /// Current measurement, signed (datasheet page 23, figure 26)
    Current = 0x04,
    /// Full-scale range scaling for current and power
    /// (datasheet page 12, chapter 8.5.1)
    Calibration = 0x05,
}

impl Register {
    /// Register address byte
    pub const fn addr(self) -> u8 {
        self as u8
    }

    /// Whether the raw word is two's-complement signed
    pub const fn is_signed(self) -> bool {
        matches!(
            self,
            Register::ShuntVoltage | Register::BusVoltage | Register::Current
        )
    }

    /// Host access mode
    pub const fn access(self) -> Access {
        match self {
            Register::Configuration | Register::Calibration => Access::ReadWrite,
            _ => Access::ReadOnly,
        }
    }
}

/// Configuration word for the standard (400 mA) profile:
/// 16 V bus FSR, +-40 mV PGA (highest current resolution), 128-sample
/// bus and shunt ADC, shunt-and-bus continuous mode
pub const CONFIG_STANDARD: u16 = 0b0000_0100_0100_0111;

/// Configuration word for the high-current (3.2 A) profile; identical to
/// [`CONFIG_STANDARD`] except the PGA is opened up to +-320 mV
pub const CONFIG_HIGH_CURRENT: u16 = 0b0001_1100_0100_0111;

/// Calibration word for the standard profile.
///
/// Maximum expected current 400 mA, Current_LSB = 400 mA / 2^15
/// ~= 12.8 uA, R(shunt) = 0.1 ohm:
/// Cal = 0.04096 / 0.0000128 / 0.1 = 32000 (0x7D00)
pub const CALIBRATION_STANDARD: u16 = 32000;

/// Calibration word for the high-current profile.
///
/// Maximum expected current 3200 mA, Current_LSB = 3200 mA / 2^15
/// ~= 102.4 uA, R(shunt) = 0.1 ohm:
/// Cal = 0.04096 / 0.0001024 / 0.1 = 4000 (0x0FA0)
pub const CALIBRATION_HIGH_CURRENT: u16 = 4000;

/// Milliamps per Current register count, standard profile
pub const CURRENT_LSB_STANDARD_MA: f32 = 0.0128;

/// Milliamps per Current register count, high-current profile
pub const CURRENT_LSB_HIGH_CURRENT_MA: f32 = 0.1024;

/// The device computes power with an LSB of 20 times the current LSB
/// (datasheet page 12, chapter 8.5.1)
pub const POWER_LSB_FACTOR: f32 = 20.0;

/// Escalation threshold in milliamps: 90% of the standard profile's
/// 400 mA rated range
pub const HIGH_CURRENT_THRESHOLD_MA: f32 = 360.0;

/// Volts per Shunt Voltage register count (10 uV), independent of the
/// active profile
pub const SHUNT_VOLTAGE_LSB_V: f32 = 0.00001;

/// Volts per Bus Voltage register count (4 mV) after the low 3 status
/// bits are shifted out
pub const BUS_VOLTAGE_LSB_V: f32 = 0.004;

/// Overflow flag in the Bus Voltage register
pub const BUS_VOLTAGE_OVERFLOW_FLAG: u16 = 0x0001;

/// Sentinel reported when the bus-voltage overflow flag is still set
/// after escalating to the high-current profile
pub const BUS_VOLTAGE_OVERFLOW_V: f32 = 99.99;

// Conversion times, datasheet page 20, table 5. Continuous mode needs no
// wait between addressing a register and reading it back; the triggered
// modes do.

/// Settling delay for shunt-and-bus continuous mode (the configuration
/// both built-in profiles use)
pub const CONVERSION_DELAY_CONTINUOUS_US: u32 = 1;

/// Settling delay for 12-bit triggered mode
pub const CONVERSION_DELAY_12BIT_TRIGGERED_US: u32 = 532;

/// Settling delay for 128-sample averaged triggered mode (68.10 ms)
pub const CONVERSION_DELAY_128_SAMPLES_US: u32 = 69_000;
