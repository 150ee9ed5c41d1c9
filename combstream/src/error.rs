//! Error types for the combinations engine

use thiserror::Error;

pub use combtools::cfg::InvalidConfig;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// Rejected configuration; the previous configuration stays active
    #[error(transparent)]
    InvalidConfig(#[from] InvalidConfig),

    /// An input event referenced a channel the configuration does not
    /// know about. Indicates upstream misconfiguration, so the batch
    /// is rejected rather than silently dropped.
    #[error("event on channel {channel} but only {channels} virtual channels configured")]
    OutOfRangeChannel { channel: u8, channels: u8 },

    /// Window and guard arithmetic assume monotonic time, so a
    /// timestamp going backwards is fatal for the stream.
    #[error("event at t = {time} after t = {seen}, input must be time-ordered")]
    OrderingViolation { time: u64, seen: u64 },

    #[error("configuration can only change while capture is disabled")]
    CaptureActive,

    #[error("readout does not match the selected data source")]
    SourceMismatch,
}

pub type Result<T> = std::result::Result<T, Error>;
