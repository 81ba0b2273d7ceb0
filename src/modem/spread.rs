use super::code::SpreadCode;
use crate::loadio::LoadDriver;
use std::time::Duration;

/// Maps a logical bit onto the medium as one spread-code period.
///
/// A logical 1 transmits the code verbatim, a logical 0 its bitwise inverse.
/// Consecutive bits are emitted back to back with no gap; the driver's
/// deadline cursor keeps the chip boundaries phase-accurate across the whole
/// frame.
#[derive(Debug)]
pub struct Spreader {
    code: SpreadCode,
    chip_period: Duration,
    driver: LoadDriver,
}

impl Spreader {
    pub fn new(code: SpreadCode, chip_period: Duration, driver: LoadDriver) -> Self {
        Self {
            code,
            chip_period,
            driver,
        }
    }

    pub fn emit_bit(&mut self, value: bool) {
        for index in 0..self.code.len() {
            let chip = if value {
                self.code.bit(index)
            } else {
                !self.code.bit(index)
            };
            self.driver.drive(chip, self.chip_period);
        }
    }
}
