//! # Loadnet Link Streams
//! Packet-level endpoints over the load medium. The output stream frames a
//! payload and spreads it chip by chip through the load driver; the input
//! stream runs the whole receive pipeline — sampler, correlator bank, bit
//! slicer, symbol reader, packet assembler — strictly sequentially on the
//! calling thread. Threads exist only below, inside the medium layer.

use super::frame;
use super::packet::PacketAssembler;
use super::symbol::SymbolReader;
use crate::loadio::builtin::MAX_CONCURRENCY;
use crate::loadio::{LoadDriver, LoadSampler};
use crate::modem::builtin::{CHIP_PERIOD, OVERSAMPLING};
use crate::modem::{BitSlicer, CorrelatorBank, SpreadCode, Spreader};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct LinkStreamConfig {
    pub code: SpreadCode,
    pub chip_period: Duration,
    pub oversampling: usize,
    pub delimiter_len: usize,
    pub max_concurrency: usize,
}

impl LinkStreamConfig {
    pub fn new(code: SpreadCode) -> Self {
        Self {
            code,
            chip_period: CHIP_PERIOD,
            oversampling: OVERSAMPLING,
            delimiter_len: super::builtin::DELIMITER_BITS_LEN,
            max_concurrency: MAX_CONCURRENCY,
        }
    }

    pub fn sample_period(&self) -> Duration {
        self.chip_period / self.oversampling as u32
    }
}

pub struct LoadOutputStream {
    config: LinkStreamConfig,
    spreader: Spreader,
}

impl LoadOutputStream {
    pub fn new(config: LinkStreamConfig) -> Self {
        let driver = LoadDriver::new(config.max_concurrency);
        let spreader = Spreader::new(config.code.clone(), config.chip_period, driver);
        Self { config, spreader }
    }

    /// Emit one packet. Blocks for the full on-air time:
    /// `(bits * code length) * chip period`.
    pub fn write(&mut self, payload: &[u8]) {
        let bits = frame::frame_bits(payload, self.config.delimiter_len);
        debug!(
            "emitting {} bits for a payload of {} bytes",
            bits.len(),
            payload.len()
        );
        for bit in &bits {
            self.spreader.emit_bit(*bit);
        }
    }
}

pub struct LoadInputStream {
    sampler: LoadSampler,
    slicer: BitSlicer,
    reader: SymbolReader,
    assembler: PacketAssembler,
}

impl LoadInputStream {
    pub fn new(config: LinkStreamConfig) -> Self {
        let sampler = LoadSampler::new(config.sample_period(), config.max_concurrency);
        let slicer = BitSlicer::new(CorrelatorBank::new(&config.code, config.oversampling));
        Self {
            sampler,
            slicer,
            reader: SymbolReader::new(),
            assembler: PacketAssembler::new(),
        }
    }

    /// Block until the next CRC-valid payload arrives.
    pub fn read(&mut self) -> Vec<u8> {
        loop {
            let sample = self.sampler.sample();
            if let Some(bit) = self.slicer.feed(sample) {
                if let Some(symbol) = self.reader.feed(bit) {
                    if let Some(payload) = self.assembler.feed(symbol) {
                        return payload;
                    }
                }
            }
        }
    }

    /// Diagnostic counter of frames dropped by the CRC check.
    pub fn crc_failures(&self) -> u64 {
        self.assembler.crc_failures()
    }
}
