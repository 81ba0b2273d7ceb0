//! # Loadnet Link Builtins
//! The only hard compatibility surface of the link lives here: frame
//! delimiting and the CRC algorithm. Both ends must agree on all of it.

use crc::{Crc, CRC_16_IBM_3740};

/// Zero bits emitted on each side of a frame. Anything at or above
/// [`DELIMITER_DETECT_LEN`] is conformant; the extra length lets the
/// receiver find correlation before the data transmission starts.
pub const DELIMITER_BITS_LEN: usize = 20;

/// Consecutive zero bits (with no start bit) after which the reader
/// declares a frame delimiter.
pub const DELIMITER_DETECT_LEN: u64 = 9;

/// CRC-16-CCITT: polynomial 0x1021, initial 0xFFFF, no reflection, no final
/// XOR, transmitted most-significant byte first. Feeding a frame including
/// its trailing CRC bytes yields residue 0.
pub const CRC_ALGORITHM: Crc<u16> = Crc::<u16>::new(&CRC_16_IBM_3740);

pub const CRC_BYTES_LEN: usize = 2;
