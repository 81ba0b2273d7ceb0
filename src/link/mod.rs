//! # Loadnet Link
//! The byte and frame layer above the modem. Frames are delimited by long
//! runs of zero bits, every byte rides behind a single start bit, and a
//! CRC-16-CCITT trailer decides whether a frame is handed off or dropped.
//! ## Frame structure
//! | Delimiter (>= 9 zero bits, 20 emitted) | per byte: start bit + 8 data
//! bits MSB first | CRC-16 (2 bytes, big endian) | Delimiter |

pub mod builtin;
mod frame;
pub mod hamming;
mod packet;
mod stream;
mod symbol;

pub use frame::frame_bits;
pub use packet::{PacketAssembler, PacketError};
pub use stream::{LinkStreamConfig, LoadInputStream, LoadOutputStream};
pub use symbol::{Symbol, SymbolReader};
