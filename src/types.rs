//! Calibration profile types for the INA219
//!
//! A profile bundles the register words and scale factor that define one
//! measurement range. Exactly one profile is active at a time; switching
//! requires rewriting both the Configuration and Calibration registers
//! before further reads are valid.

use crate::registers::{
    CALIBRATION_HIGH_CURRENT, CALIBRATION_STANDARD, CONFIG_HIGH_CURRENT, CONFIG_STANDARD,
    CURRENT_LSB_HIGH_CURRENT_MA, CURRENT_LSB_STANDARD_MA, POWER_LSB_FACTOR,
};

/// Which calibration profile the device is currently programmed with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationMode {
    /// 400 mA range, 12.8 uA resolution
    Standard,
    /// 3.2 A range, 102.4 uA resolution
    HighCurrent,
}

impl CalibrationMode {
    /// The register settings and scale factors for this mode
    pub const fn profile(self) -> &'static CalibrationProfile {
        match self {
            CalibrationMode::Standard => &CalibrationProfile::STANDARD,
            CalibrationMode::HighCurrent => &CalibrationProfile::HIGH_CURRENT,
        }
    }
}

/// Register settings and scale factors defining one measurement range
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationProfile {
    /// Configuration register word
    pub configuration: u16,
    /// Calibration register word
    pub calibration: u16,
    /// Milliamps per Current register count
    pub current_lsb_ma: f32,
}

impl CalibrationProfile {
    /// 400 mA profile written by `begin`
    pub const STANDARD: CalibrationProfile = CalibrationProfile {
        configuration: CONFIG_STANDARD,
        calibration: CALIBRATION_STANDARD,
        current_lsb_ma: CURRENT_LSB_STANDARD_MA,
    };

    /// 3.2 A profile written by `switch_to_high_current`
    pub const HIGH_CURRENT: CalibrationProfile = CalibrationProfile {
        configuration: CONFIG_HIGH_CURRENT,
        calibration: CALIBRATION_HIGH_CURRENT,
        current_lsb_ma: CURRENT_LSB_HIGH_CURRENT_MA,
    };

    /// Milliwatts per Power register count
    pub fn power_lsb_mw(&self) -> f32 {
        self.current_lsb_ma * POWER_LSB_FACTOR
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_selects_matching_profile() {
        assert_eq!(
            CalibrationMode::Standard.profile(),
            &CalibrationProfile::STANDARD
        );
        assert_eq!(
            CalibrationMode::HighCurrent.profile(),
            &CalibrationProfile::HIGH_CURRENT
        );
    }

    #[test]
    fn power_lsb_is_twenty_times_current_lsb() {
        assert!((CalibrationProfile::STANDARD.power_lsb_mw() - 0.256).abs() < 1e-6);
        assert!((CalibrationProfile::HIGH_CURRENT.power_lsb_mw() - 2.048).abs() < 1e-6);
    }
}
