//! # Loadnet Spread Codes
//! Pseudorandom spreading sequences shared by a TX/RX pair. The link code is
//! a 1023-chip GPS L1 C/A Gold code: long enough to survive roughly 30 dB
//! below the noise floor and to cross VM boundaries, with a published family
//! of 32 low-cross-correlation siblings for concurrent links on one host.
//! The generic m-sequence and Gold machinery is also used to build the short
//! degree-5 family that the fast pipeline tests run on.

use bitvec::prelude::*;
use thiserror::Error;

/// Chips in one GPS L1 C/A code period.
pub const GPS_CA_CODE_LEN: usize = 1023;

/// G2 phase-selector cells (1-indexed) per GPS PRN, straight from the ICD.
const GPS_CA_PHASE_TAPS: [(usize, usize); 32] = [
    (2, 6),
    (3, 7),
    (4, 8),
    (5, 9),
    (1, 9),
    (2, 10),
    (1, 8),
    (2, 9),
    (3, 10),
    (2, 3),
    (3, 4),
    (5, 6),
    (6, 7),
    (7, 8),
    (8, 9),
    (9, 10),
    (1, 4),
    (2, 5),
    (3, 6),
    (4, 7),
    (5, 8),
    (6, 9),
    (1, 3),
    (4, 6),
    (5, 7),
    (6, 8),
    (7, 9),
    (8, 10),
    (1, 6),
    (2, 7),
    (3, 8),
    (4, 9),
];

#[derive(Error, Debug)]
pub enum CodeError {
    #[error("unknown GPS PRN (got {0}, expected 1..=32)")]
    UnknownPrn(usize),
}

/// The spreading sequence of one link, identical and immutable on both ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpreadCode {
    bits: BitVec,
}

impl SpreadCode {
    /// The GPS L1 C/A code for the given PRN (1..=32).
    ///
    /// G1 is x^10 + x^3 + 1, G2 is x^10 + x^9 + x^8 + x^6 + x^3 + x^2 + 1,
    /// both seeded all-ones; each chip is the G1 output XOR two selected G2
    /// cells. Distinct PRNs keep their cyclic cross-correlation within the
    /// Gold bound of 65/1023.
    pub fn gps_ca(prn: usize) -> Result<Self, CodeError> {
        let (tap_a, tap_b) = *GPS_CA_PHASE_TAPS
            .get(prn.wrapping_sub(1))
            .ok_or(CodeError::UnknownPrn(prn))?;

        let mut g1 = [true; 10];
        let mut g2 = [true; 10];
        let mut bits = BitVec::with_capacity(GPS_CA_CODE_LEN);
        for _ in 0..GPS_CA_CODE_LEN {
            bits.push(g1[9] ^ g2[tap_a - 1] ^ g2[tap_b - 1]);

            let feedback1 = g1[2] ^ g1[9];
            let feedback2 = g2[1] ^ g2[2] ^ g2[5] ^ g2[7] ^ g2[8] ^ g2[9];
            g1.rotate_right(1);
            g1[0] = feedback1;
            g2.rotate_right(1);
            g2[0] = feedback2;
        }
        Ok(Self { bits })
    }

    pub fn from_bits(bits: BitVec) -> Self {
        Self { bits }
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    pub fn bit(&self, index: usize) -> bool {
        self.bits[index]
    }

    pub fn bits(&self) -> &BitSlice {
        &self.bits
    }

    /// The reference sequence the correlator runs on: every chip repeated
    /// once per sample offset.
    pub fn expand(&self, oversampling: usize) -> BitVec {
        let mut expanded = BitVec::with_capacity(self.bits.len() * oversampling);
        for bit in &self.bits {
            for _ in 0..oversampling {
                expanded.push(*bit);
            }
        }
        expanded
    }
}

/// Maximal-length sequence generator. An m-sequence of degree `n` has period
/// 2^n - 1 and two-valued autocorrelation, which makes misaligned correlator
/// channels settle at exactly 1/len.
#[derive(Debug, Clone)]
pub struct MSequence {
    degree: usize,
    taps: Vec<usize>,
    register: u32,
}

impl MSequence {
    /// `taps` are 1-indexed feedback positions; the register starts all-ones.
    pub fn new(degree: usize, taps: Vec<usize>) -> Self {
        let register = (1u32 << degree) - 1;
        Self {
            degree,
            taps,
            register,
        }
    }

    /// Produce one full period of 2^degree - 1 chips.
    pub fn generate(&mut self) -> BitVec {
        let length = (1usize << self.degree) - 1;
        let mut sequence = BitVec::with_capacity(length);
        for _ in 0..length {
            sequence.push(self.register & 1 != 0);

            let mut feedback = 0u32;
            for &tap in &self.taps {
                feedback ^= (self.register >> (tap - 1)) & 1;
            }
            self.register >>= 1;
            self.register |= feedback << (self.degree - 1);
        }
        sequence
    }

    pub fn reset(&mut self) {
        self.register = (1u32 << self.degree) - 1;
    }
}

/// Gold code family built from a preferred pair of m-sequences. A degree-n
/// family has 2^n + 1 members of length 2^n - 1 with three-valued
/// cross-correlation.
#[derive(Debug, Clone)]
pub struct GoldCode {
    degree: usize,
    taps1: Vec<usize>,
    taps2: Vec<usize>,
}

impl GoldCode {
    pub fn new(degree: usize, taps1: Vec<usize>, taps2: Vec<usize>) -> Self {
        Self {
            degree,
            taps1,
            taps2,
        }
    }

    /// Member `index` of the family: the two base m-sequences at the ends,
    /// XORs of the first with cyclic shifts of the second in between.
    pub fn generate(&self, index: usize) -> BitVec {
        let length = (1usize << self.degree) - 1;
        let sequence1 = MSequence::new(self.degree, self.taps1.clone()).generate();
        let sequence2 = MSequence::new(self.degree, self.taps2.clone()).generate();

        if index == 0 {
            return sequence1;
        }
        if index == length + 1 {
            return sequence2;
        }

        let shift = index - 1;
        let mut gold = BitVec::with_capacity(length);
        for position in 0..length {
            gold.push(sequence1[position] ^ sequence2[(position + shift) % length]);
        }
        gold
    }

    pub fn family_size(&self) -> usize {
        (1usize << self.degree) + 1
    }
}

/// Degree-5 family (33 codes of length 31) from the preferred pair
/// x^5 + x^3 + 1 and x^5 + x^4 + x^3 + x^2 + 1. Far too short to cross VM
/// boundaries; used for fast pipeline tests and in-process experiments.
pub fn gold_code_5() -> GoldCode {
    GoldCode::new(5, vec![1, 3], vec![1, 2, 3, 4])
}

/// Peak absolute cyclic cross-correlation between two equal-length codes in
/// bipolar terms (agreements minus disagreements).
pub fn cross_correlation_peak(code1: &BitSlice, code2: &BitSlice) -> i64 {
    assert_eq!(code1.len(), code2.len(), "codes must have equal length");
    let length = code1.len();
    let mut peak = 0i64;
    for shift in 0..length {
        let mut sum = 0i64;
        for position in 0..length {
            let agree = code1[position] == code2[(position + shift) % length];
            sum += if agree { 1 } else { -1 };
        }
        peak = peak.max(sum.abs());
    }
    peak
}
