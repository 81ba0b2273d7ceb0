//! # Loadnet
//! A covert unidirectional data link between two mutually-isolated
//! processes — potentially in distinct virtual machines on one physical
//! host — that modulates shared CPU load as its transmission medium. The
//! transmitter raises the effective load of the shared cores to signal a
//! high chip and relaxes it for a low chip; the receiver times how many
//! busy-loop ticks fit in a sample window against the same wall clock and
//! despreads the result with a CDMA correlator bank.
//!
//! The crate is layered like any other modem stack:
//! - [`loadio`]: the medium — load actuation (TX) and load sensing (RX)
//!   with drift-free deadline cursors.
//! - [`modem`]: spread codes, the correlator bank, and the bit slicer.
//! - [`link`]: start-bit byte framing, delimiters, CRC, and the packet
//!   streams that tie the pipelines together.

pub mod link;
pub mod loadio;
pub mod modem;
