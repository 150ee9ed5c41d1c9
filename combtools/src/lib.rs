pub mod bit;
pub mod cfg;

use serde::{Deserialize, Serialize};

/// The basic representation of a timestamped event on a virtual channel
#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Debug, Serialize, Deserialize)]
pub struct Event {
    /// Counter in time units from arbitrary offset, non-decreasing
    pub time: u64,
    /// Virtual channel (0-indexed) of the event
    pub channel: u8,
}

/// Duration of one time unit in seconds (1/3 ps in the reference hardware)
pub const TSTEP: f64 = 1.0 / 3.0e12;

/// Maximum number of virtual channels a combination can span
pub const MAX_CHANNELS: u8 = 16;

/// Number of histogram bins, one per possible channel mask
pub const HISTOGRAM_BINS: usize = 1 << 16;

/// Stream-mode FIFO depth of the reference bitfile
pub const FIFO_DEPTH: usize = 8192;
