//! Admission boundary between the channel-mapping pre-stage and the
//! matching automaton

use combtools::Event;

use crate::error::{Error, Result};

/// Validates incoming event batches: every channel must lie below the
/// configured channel count and timestamps must be non-decreasing,
/// both within a batch and across batches. A rejected batch admits
/// none of its events.
#[derive(Clone, Copy, Debug)]
pub struct Normalizer {
    channels: u8,
    seen: Option<u64>,
}

impl Normalizer {
    pub fn new(channels: u8) -> Normalizer {
        Normalizer {
            channels,
            seen: None,
        }
    }

    /// Check a batch against the admission invariants. The batch may
    /// only be fed to the automaton on `Ok`.
    pub fn admit(&mut self, batch: &[Event]) -> Result<()> {
        let mut seen = self.seen;
        for e in batch {
            if e.channel >= self.channels {
                return Err(Error::OutOfRangeChannel {
                    channel: e.channel,
                    channels: self.channels,
                });
            }
            if let Some(s) = seen {
                if e.time < s {
                    return Err(Error::OrderingViolation {
                        time: e.time,
                        seen: s,
                    });
                }
            }
            seen = Some(e.time);
        }
        self.seen = seen;
        Ok(())
    }

    /// Forget the admitted-time watermark
    pub fn reset(&mut self) {
        self.seen = None;
    }
}
