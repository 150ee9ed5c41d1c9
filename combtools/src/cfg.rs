//! Configuration types for the combinations engine

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::bit::BitOps;
use crate::MAX_CHANNELS;

/// Number of physical input slots addressable by the channel lookup
/// table (positive and negative edge of 32 inputs)
pub const LUT_INPUTS: usize = 64;

/// Enable bit of a lookup table entry
pub const LUT_ENABLE_BIT: usize = 15;

/// Configuration rejected before taking effect; the previous
/// configuration stays active.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvalidConfig {
    #[error("channel count {0} outside supported range 1..=16")]
    ChannelCount(u8),
    #[error("window must be at least one tick")]
    ZeroWindow,
    #[error("filter bounds {min}..={max} must satisfy min <= max <= {channels} channels")]
    FilterBounds { min: u8, max: u8, channels: u8 },
    #[error("virtual channel keys must be contiguous from 0, missing key {0}")]
    NonContiguousKeys(u8),
    #[error("physical input {0} mapped to more than one virtual channel")]
    DuplicateInput(i8),
    #[error("physical input {0} outside supported range +-1..=32")]
    UnknownInput(i8),
}

/// Which sink accumulates verified combinations
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataSource {
    /// Bounded FIFO of combination records
    Stream,
    /// Dense per-mask histogram
    Histogram,
}

/// All parameters of the matching core. `window` and `guard` are in
/// time units; `filter_min`/`filter_max` bound the multiplicity of
/// combinations that reach the sink.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombinationConfig {
    pub channels: u8,
    pub window: u64,
    pub guard: u64,
    pub filter_min: u8,
    pub filter_max: u8,
    pub source: DataSource,
}

impl CombinationConfig {
    pub fn validate(&self) -> Result<(), InvalidConfig> {
        if self.channels == 0 || self.channels > MAX_CHANNELS {
            return Err(InvalidConfig::ChannelCount(self.channels));
        }
        if self.window == 0 {
            return Err(InvalidConfig::ZeroWindow);
        }
        if self.filter_min > self.filter_max || self.filter_max > self.channels {
            return Err(InvalidConfig::FilterBounds {
                min: self.filter_min,
                max: self.filter_max,
                channels: self.channels,
            });
        }
        Ok(())
    }
}

impl Default for CombinationConfig {
    fn default() -> Self {
        CombinationConfig {
            channels: MAX_CHANNELS,
            window: 3000,
            guard: 0,
            filter_min: 0,
            filter_max: MAX_CHANNELS,
            source: DataSource::Stream,
        }
    }
}

/// Lookup table mapping virtual channels to physical inputs.
///
/// Physical inputs are 1-indexed and signed: a negative value selects
/// the falling edge of that input. Virtual channel keys must be
/// contiguous starting at 0, and no physical input may feed more than
/// one virtual channel. This table belongs to the pre-stage that
/// resolves raw inputs to virtual channel indices; it is validated
/// here because its failures share the configuration error taxonomy.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelMap(pub BTreeMap<u8, Vec<i8>>);

impl ChannelMap {
    /// Identity map: virtual channel i reads the rising edge of
    /// physical input i + 1
    pub fn identity(channels: u8) -> ChannelMap {
        ChannelMap(
            (0..channels)
                .map(|i| (i, vec![i as i8 + 1]))
                .collect(),
        )
    }

    /// Number of virtual channels declared by the map
    pub fn channels(&self) -> u8 {
        return self.0.len() as u8;
    }

    pub fn validate(&self) -> Result<(), InvalidConfig> {
        let n = self.0.len();
        if n == 0 || n > MAX_CHANNELS as usize {
            return Err(InvalidConfig::ChannelCount(n as u8));
        }
        for key in 0..n as u8 {
            if !self.0.contains_key(&key) {
                return Err(InvalidConfig::NonContiguousKeys(key));
            }
        }
        let mut claimed = [false; LUT_INPUTS];
        for inputs in self.0.values() {
            for &input in inputs {
                if input == 0 || input < -32 || input > 32 {
                    return Err(InvalidConfig::UnknownInput(input));
                }
                let slot = (input as u8 & 0x3f) as usize;
                if claimed[slot] {
                    return Err(InvalidConfig::DuplicateInput(input));
                }
                claimed[slot] = true;
            }
        }
        Ok(())
    }

    /// Flatten into the hardware-shaped lookup table: one entry per
    /// input slot, holding the virtual channel key with the enable
    /// bit set, or zero for unmapped slots.
    pub fn lut(&self) -> Result<[u16; LUT_INPUTS], InvalidConfig> {
        self.validate()?;
        let mut lut = [0u16; LUT_INPUTS];
        for (&key, inputs) in self.0.iter() {
            for &input in inputs {
                let slot = (input as u8 & 0x3f) as usize;
                let mut entry = key as u16;
                entry.set(LUT_ENABLE_BIT);
                lut[slot] = entry;
            }
        }
        Ok(lut)
    }
}

impl Default for ChannelMap {
    fn default() -> Self {
        ChannelMap::identity(MAX_CHANNELS)
    }
}
