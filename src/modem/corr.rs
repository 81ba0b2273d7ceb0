//! # Loadnet Correlator
//! Estimates correlation of the real-time sample stream against the spread
//! code. The bank runs one channel per sample offset of the oversampled
//! code, so exactly one channel is phase-aligned to the transmitter's chip
//! boundaries (modulo integer sampling error) and the bit clock falls out of
//! the code phase for free.

use super::code::SpreadCode;
use bitvec::vec::BitVec;
use std::fmt;
use std::sync::Arc;

/// One phase offset of the reference sequence.
///
/// The channel decodes a data bit per full code period and reports a clock
/// whose leading edge occurs near the middle of the period. The clock edge
/// lags the bit it relates to by one period.
#[derive(Debug)]
pub struct CorrelationChannel {
    reference: Arc<BitVec>,
    position: usize,
    match_hi: usize,
    match_lo: usize,
    state: bool,
    correlation: f32,
}

/// Per-sample channel yield. `correlation` ranges in [0, 1]: 0 for
/// uncorrelated input, 1 for a perfect period.
#[derive(Debug, Clone, Copy)]
pub struct ChannelOutput {
    pub correlation: f32,
    pub data: bool,
    pub clock: bool,
}

impl CorrelationChannel {
    pub fn new(reference: Arc<BitVec>, offset: usize) -> Self {
        Self {
            reference,
            position: offset,
            match_hi: 0,
            match_lo: 0,
            state: false,
            correlation: 0.0,
        }
    }

    pub fn feed(&mut self, sample: bool) -> ChannelOutput {
        let length = self.reference.len();
        if self.position >= length {
            let difference = self.match_hi.abs_diff(self.match_lo);
            self.correlation = difference as f32 / length as f32;
            self.state = self.match_hi > self.match_lo;
            self.position = 0;
            self.match_hi = 0;
            self.match_lo = 0;
        }
        if sample == self.reference[self.position] {
            self.match_hi += 1;
        } else {
            self.match_lo += 1;
        }
        self.position += 1;
        ChannelOutput {
            correlation: self.correlation,
            data: self.state,
            clock: self.position > length / 2,
        }
    }

    /// Diagnostic accessor, not part of the decode path.
    pub fn correlation(&self) -> f32 {
        self.correlation
    }
}

/// Weighted fold of every channel. Positive values represent truth,
/// negative values falsity.
#[derive(Debug, Clone, Copy)]
pub struct BankOutput {
    pub data: f32,
    pub clock: f32,
}

#[derive(Debug)]
pub struct CorrelatorBank {
    channels: Vec<CorrelationChannel>,
}

impl CorrelatorBank {
    /// Builds `code.len() * oversampling` channels over the expanded
    /// reference sequence, each offset by one sample from its neighbor.
    pub fn new(code: &SpreadCode, oversampling: usize) -> Self {
        let reference = Arc::new(code.expand(oversampling));
        let channels = (0..reference.len())
            .map(|offset| CorrelationChannel::new(reference.clone(), offset))
            .collect();
        Self { channels }
    }

    /// Feed one PHY sample to every channel and fold their votes.
    ///
    /// The fourth-power weighting suppresses uncorrelated channels, whose
    /// correlation clusters near 0.5 under random input, while preserving
    /// the aligned channel's vote. Linear weights fail to recover under
    /// adverse SNR.
    pub fn feed(&mut self, sample: bool) -> BankOutput {
        let mut data = 0.0f32;
        let mut clock = 0.0f32;
        for channel in &mut self.channels {
            let output = channel.feed(sample);
            let weight = output.correlation.powi(4);
            data += if output.data { weight } else { -weight };
            clock += if output.clock { weight } else { -weight };
        }
        BankOutput { data, clock }
    }

    /// Number of channels, which also equals the samples per code period.
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Correlation factor of each channel.
    pub fn correlation_vector(&self) -> Vec<f32> {
        self.channels
            .iter()
            .map(CorrelationChannel::correlation)
            .collect()
    }

    /// Heuristic code-phase-lock assessment: the best channel must stand
    /// `stdev_multiple` standard deviations above the bank mean. Unreliable
    /// by nature; the slicer treats it as a diagnostic and nothing else.
    pub fn is_locked(&self, stdev_multiple: f32) -> bool {
        let correlations = self.correlation_vector();
        let (mean, stdev) = mean_stdev(&correlations);
        let max = correlations.iter().fold(0.0f32, |acc, &c| acc.max(c));
        (max - mean) > stdev * stdev_multiple
    }

    pub fn diagnostics(&self, stdev_multiple: f32) -> BankDiagnostics {
        let correlations = self.correlation_vector();
        let (mean, stdev) = mean_stdev(&correlations);
        let max = correlations.iter().fold(0.0f32, |acc, &c| acc.max(c));
        let strip = correlations
            .iter()
            .map(|&c| {
                if c > 0.2 {
                    char::from_digit(((c * 16.0) as u32).min(15), 16)
                        .unwrap_or('F')
                        .to_ascii_uppercase()
                } else {
                    ' '
                }
            })
            .collect();
        BankDiagnostics {
            mean,
            max,
            stdev,
            locked: (max - mean) > stdev * stdev_multiple,
            strip,
        }
    }
}

/// Snapshot of the bank for humans: summary statistics plus one intensity
/// character per channel above the noise floor.
#[derive(Debug, Clone)]
pub struct BankDiagnostics {
    pub mean: f32,
    pub max: f32,
    pub stdev: f32,
    pub locked: bool,
    strip: String,
}

impl fmt::Display for BankDiagnostics {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            formatter,
            "mean={:.2} max={:.2} stdev={:.2} lock={} |{}|",
            self.mean, self.max, self.stdev, self.locked as u8, self.strip
        )
    }
}

fn mean_stdev(values: &[f32]) -> (f32, f32) {
    let mean = values.iter().sum::<f32>() / values.len() as f32;
    let variance = values
        .iter()
        .map(|value| (value - mean).powi(2))
        .sum::<f32>()
        / values.len() as f32;
    (mean, variance.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modem::code::MSequence;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_mean_stdev() {
        let (mean, stdev) = mean_stdev(&[1.0, 1.0, 1.0, 1.0]);
        assert!((mean - 1.0).abs() < 1e-6);
        assert!(stdev.abs() < 1e-6);

        let (mean, stdev) = mean_stdev(&[0.0, 2.0]);
        assert!((mean - 1.0).abs() < 1e-6);
        assert!((stdev - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_channel_counters_track_position() {
        let code = SpreadCode::from_bits(MSequence::new(5, vec![1, 3]).generate());
        let reference = Arc::new(code.expand(1));
        let mut channel = CorrelationChannel::new(reference.clone(), 0);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..(reference.len() * 3) {
            channel.feed(rng.gen());
            assert_eq!(channel.match_hi + channel.match_lo, channel.position);
        }
    }

    #[test]
    fn test_channel_counters_after_offset_wrap() {
        let code = SpreadCode::from_bits(MSequence::new(5, vec![1, 3]).generate());
        let reference = Arc::new(code.expand(1));
        let offset = 17;
        let mut channel = CorrelationChannel::new(reference, offset);
        let mut rng = StdRng::seed_from_u64(7);
        // Run past the first (short) period; afterwards the counters must
        // track the position exactly.
        for _ in 0..40 {
            channel.feed(rng.gen());
        }
        assert_eq!(channel.match_hi + channel.match_lo, channel.position);
    }

    #[test]
    fn test_phase_alignment() {
        // Feeding the code starting at offset k drives channel k to a
        // correlation of 1 while every misaligned channel settles at the
        // m-sequence autocorrelation floor of 1/len.
        let sequence = MSequence::new(10, vec![1, 8]).generate();
        let length = sequence.len();
        let code = SpreadCode::from_bits(sequence.clone());
        let mut bank = CorrelatorBank::new(&code, 1);

        let offset = 5;
        for index in 0..(2 * length + 1) {
            bank.feed(sequence[(offset + index) % length]);
        }

        let correlations = bank.correlation_vector();
        assert!((correlations[offset] - 1.0).abs() < 1e-6);
        let floor = 1.0 / length as f32 + 1e-6;
        for (channel, &correlation) in correlations.iter().enumerate() {
            if channel != offset {
                assert!(
                    correlation <= floor,
                    "channel {} at {}",
                    channel,
                    correlation
                );
            }
        }
        assert!(bank.is_locked(5.0));
    }

    #[test]
    fn test_spread_orthogonality() {
        // A stream spread with a sibling PRN must not lock the bank.
        let own = SpreadCode::gps_ca(1).unwrap();
        let other = SpreadCode::gps_ca(2).unwrap();
        let mut bank = CorrelatorBank::new(&own, 1);

        let stream = other.expand(1);
        let mut locked_samples = 0usize;
        let total = 2 * stream.len();
        for index in 0..total {
            bank.feed(stream[index % stream.len()]);
            if bank.is_locked(5.0) {
                locked_samples += 1;
            }
        }
        assert!(
            (locked_samples as f32) < total as f32 * 0.05,
            "locked for {}/{} samples",
            locked_samples,
            total
        );
    }

    #[test]
    fn test_diagnostics_display() {
        let code = SpreadCode::from_bits(MSequence::new(5, vec![1, 3]).generate());
        let bank = CorrelatorBank::new(&code, 1);
        let rendered = bank.diagnostics(5.0).to_string();
        assert!(rendered.contains("lock=0"));
    }
}
