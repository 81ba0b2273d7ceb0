use super::builtin::LOCK_STDEV_THRESHOLD;
use super::corr::CorrelatorBank;
use tracing::{info, trace};

/// Detects recovered-clock edges in the bank output and samples the data
/// line on the rising edge, which geometrically falls in the middle of the
/// bit period where noise immunity is highest.
///
/// Carrier loss is not an error: the slicer keeps consuming samples and the
/// downstream reader resynchronizes on the next delimiter. The lock
/// heuristic is logged on transitions but never gates decoding.
#[derive(Debug)]
pub struct BitSlicer {
    bank: CorrelatorBank,
    clock_latch: bool,
    locked: bool,
    samples: usize,
}

impl BitSlicer {
    pub fn new(bank: CorrelatorBank) -> Self {
        Self {
            bank,
            clock_latch: false,
            locked: false,
            samples: 0,
        }
    }

    /// Feed one PHY sample; yields a data bit on each rising clock edge.
    pub fn feed(&mut self, sample: bool) -> Option<bool> {
        let output = self.bank.feed(sample);
        self.samples += 1;
        if self.samples % self.bank.len() == 0 {
            trace!("{}", self.bank.diagnostics(LOCK_STDEV_THRESHOLD));
        }

        let locked = self.bank.is_locked(LOCK_STDEV_THRESHOLD);
        if locked != self.locked {
            self.locked = locked;
            if locked {
                info!("signal acquired");
            } else {
                info!("carrier lost");
            }
        }

        if !self.clock_latch && output.clock > 0.0 {
            self.clock_latch = true;
            return Some(output.data > 0.0);
        }
        if self.clock_latch && output.clock < 0.0 {
            self.clock_latch = false;
        }
        None
    }

    /// Diagnostic accessor.
    pub fn bank(&self) -> &CorrelatorBank {
        &self.bank
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modem::code::{gold_code_5, SpreadCode};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    const OVERSAMPLING: usize = 3;

    /// Expand logical bits the way the transmitter would put them on the
    /// medium: one code period per bit, each chip held for one oversampled
    /// sample window.
    fn modulate(code: &SpreadCode, bits: &[bool]) -> Vec<bool> {
        let mut samples = Vec::new();
        for &bit in bits {
            for index in 0..code.len() {
                let chip = if bit { code.bit(index) } else { !code.bit(index) };
                for _ in 0..OVERSAMPLING {
                    samples.push(chip);
                }
            }
        }
        samples
    }

    fn slice_all(code: &SpreadCode, samples: &[bool]) -> Vec<bool> {
        let mut slicer = BitSlicer::new(CorrelatorBank::new(code, OVERSAMPLING));
        samples
            .iter()
            .filter_map(|&sample| slicer.feed(sample))
            .collect()
    }

    #[test]
    fn test_recovers_bits_one_period_late() {
        let code = SpreadCode::from_bits(gold_code_5().generate(1));
        let bits = [true, false, true, true, false, false, true, false];
        // Lead with a pad bit: until the bank completes its first code
        // period the channel correlations are still settling, exactly the
        // window a real frame's opening delimiter covers. Trail with one
        // more because the clock edge lags each bit by one period.
        let mut padded = vec![false];
        padded.extend_from_slice(&bits);
        padded.push(false);

        let decoded = slice_all(&code, &modulate(&code, &padded));
        assert!(
            decoded.ends_with(&bits),
            "decoded {:?}, expected tail {:?}",
            decoded,
            bits
        );
        // Acquisition may cost a few stray bits, never a storm.
        assert!(decoded.len() <= bits.len() + 5);
    }

    #[test]
    fn test_recovers_bits_under_sample_noise() {
        let code = SpreadCode::from_bits(gold_code_5().generate(1));
        let bits = [true, true, false, true, false, false, false, true];
        let mut padded = vec![false];
        padded.extend_from_slice(&bits);
        padded.push(false);

        let mut samples = modulate(&code, &padded);
        let mut rng = StdRng::seed_from_u64(42);
        for sample in samples.iter_mut() {
            if rng.gen_range(0..100) < 5 {
                *sample = !*sample;
            }
        }

        let decoded = slice_all(&code, &samples);
        assert!(
            decoded.ends_with(&bits),
            "decoded {:?}, expected tail {:?}",
            decoded,
            bits
        );
    }
}
