use super::builtin::{CRC_ALGORITHM, CRC_BYTES_LEN};
use super::symbol::Symbol;
use std::mem;
use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug)]
pub enum PacketError {
    #[error("frame is too short (got {0} bytes, expected at least {1})")]
    TooShort(usize, usize),
    #[error("CRC residue check failed (got 0x{0:04X}, expected 0x0000)")]
    BadResidue(u16),
}

/// Collects bytes between delimiters into frames and hands off CRC-valid
/// payloads. A failed check drops the buffer and the assembler resumes with
/// the next frame; nothing propagates.
#[derive(Debug, Default)]
pub struct PacketAssembler {
    buffer: Vec<u8>,
    crc_failures: u64,
}

impl PacketAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one symbol; yields the payload when a delimiter closes a frame
    /// whose CRC residue is zero. Fragments shorter than the CRC trailer
    /// (stray bits decoded while the carrier settles) are dropped without
    /// comment.
    pub fn feed(&mut self, symbol: Symbol) -> Option<Vec<u8>> {
        match symbol {
            Symbol::Data(byte) => {
                self.buffer.push(byte);
                None
            }
            Symbol::Delimiter => {
                let buffer = mem::take(&mut self.buffer);
                if buffer.is_empty() {
                    return None;
                }
                match verify(&buffer) {
                    Ok(()) => {
                        let mut payload = buffer;
                        payload.truncate(payload.len() - CRC_BYTES_LEN);
                        Some(payload)
                    }
                    Err(error @ PacketError::BadResidue(_)) => {
                        self.crc_failures += 1;
                        warn!("dropping frame of {} bytes: {}", buffer.len(), error);
                        None
                    }
                    Err(_) => None,
                }
            }
        }
    }

    /// Diagnostic counter of frames dropped by the CRC check.
    pub fn crc_failures(&self) -> u64 {
        self.crc_failures
    }
}

fn verify(buffer: &[u8]) -> Result<(), PacketError> {
    if buffer.len() < CRC_BYTES_LEN {
        return Err(PacketError::TooShort(buffer.len(), CRC_BYTES_LEN));
    }
    let residue = CRC_ALGORITHM.checksum(buffer);
    if residue != 0 {
        return Err(PacketError::BadResidue(residue));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed_frame(assembler: &mut PacketAssembler, bytes: &[u8]) -> Option<Vec<u8>> {
        let mut payload = None;
        for &byte in bytes {
            payload = payload.or(assembler.feed(Symbol::Data(byte)));
        }
        payload.or(assembler.feed(Symbol::Delimiter))
    }

    #[test]
    fn test_valid_frame_yields_payload() {
        let mut assembler = PacketAssembler::new();
        // CRC-16-CCITT of {1, 2, 3} is 0x6131.
        let payload = feed_frame(&mut assembler, &[1, 2, 3, 0x61, 0x31]);
        assert_eq!(payload, Some(vec![1, 2, 3]));
        assert_eq!(assembler.crc_failures(), 0);
    }

    #[test]
    fn test_corrupt_frame_is_dropped_and_counted() {
        let mut assembler = PacketAssembler::new();
        assert_eq!(feed_frame(&mut assembler, &[1, 2, 3, 0x61, 0x32]), None);
        assert_eq!(assembler.crc_failures(), 1);
        // The assembler keeps decoding afterwards.
        let payload = feed_frame(&mut assembler, &[1, 2, 3, 0x61, 0x31]);
        assert_eq!(payload, Some(vec![1, 2, 3]));
    }

    #[test]
    fn test_short_fragments_are_silently_dropped() {
        let mut assembler = PacketAssembler::new();
        assert_eq!(feed_frame(&mut assembler, &[0x42]), None);
        assert_eq!(assembler.crc_failures(), 0);
    }

    #[test]
    fn test_bare_delimiters_yield_nothing() {
        let mut assembler = PacketAssembler::new();
        for _ in 0..12 {
            assert_eq!(assembler.feed(Symbol::Delimiter), None);
        }
    }

    #[test]
    fn test_empty_payload_round_trip() {
        let mut assembler = PacketAssembler::new();
        // An empty payload is just the CRC of nothing: 0xFFFF.
        let payload = feed_frame(&mut assembler, &[0xFF, 0xFF]);
        assert_eq!(payload, Some(vec![]));
    }
}
