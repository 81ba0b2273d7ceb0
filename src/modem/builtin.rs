use std::time::Duration;

/// On-wire duration of one spread-code chip. Both ends must agree within
/// about 1% or the code phase slips across a typical packet.
pub const CHIP_PERIOD: Duration = Duration::from_millis(16);

/// PHY samples taken per chip. The correlator bank covers every sample
/// offset, so this also sets the phase resolution of code acquisition.
pub const OVERSAMPLING: usize = 3;

/// Lock heuristic: the best channel's correlation must exceed the bank mean
/// by this many standard deviations. Diagnostic only; the slicer does not
/// gate on it.
pub const LOCK_STDEV_THRESHOLD: f32 = 5.0;
