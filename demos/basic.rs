//! Basic INA219 usage example
//!
//! Demonstrates programming the standard calibration profile and taking
//! readings. The measurement loop is generic over any `embedded-hal`
//! I2C bus; `main` drives it against a mock bus so the example runs on
//! the host. On real hardware, pass your platform's I2C and delay
//! implementations instead.

use embedded_hal::{delay::DelayNs, i2c::I2c};
use embedded_hal_mock::eh1::delay::NoopDelay;
use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};
use ina219::{Error, Ina219, INA219_I2C_ADDR};

fn monitor_load<I: I2c, D: DelayNs>(i2c: I, delay: D) -> Result<(), Error<I::Error>> {
    let mut monitor = Ina219::new(i2c, delay);

    // Program the standard (400 mA) calibration profile
    monitor.begin()?;

    let volts = monitor.read_bus_voltage()?;
    let milliamps = monitor.read_current()?;
    let milliwatts = monitor.read_power()?;

    println!("bus: {volts:.3} V, load: {milliamps:.1} mA / {milliwatts:.1} mW");
    if monitor.is_high_current_mode() {
        println!("escalated to the 3.2 A range");
    }
    Ok(())
}

fn main() {
    // A scripted bus standing in for real hardware: profile programming,
    // then one bus-voltage, current and power reading each.
    let expectations = [
        I2cTransaction::write(INA219_I2C_ADDR, vec![0x00, 0x04, 0x47]),
        I2cTransaction::write(INA219_I2C_ADDR, vec![0x05, 0x7D, 0x00]),
        I2cTransaction::write(INA219_I2C_ADDR, vec![0x02]),
        I2cTransaction::read(INA219_I2C_ADDR, vec![0x1F, 0x40]),
        I2cTransaction::write(INA219_I2C_ADDR, vec![0x04]),
        I2cTransaction::read(INA219_I2C_ADDR, vec![0x03, 0xE8]),
        I2cTransaction::write(INA219_I2C_ADDR, vec![0x03]),
        I2cTransaction::read(INA219_I2C_ADDR, vec![0x03, 0xE8]),
    ];
    let mut i2c = I2cMock::new(&expectations);

    monitor_load(i2c.clone(), NoopDelay).unwrap();
    i2c.done();
}
