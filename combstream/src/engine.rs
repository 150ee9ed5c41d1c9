//! Configuration, control, and readout surface of the combinations
//! engine

use combtools::cfg::{CombinationConfig, DataSource};
use combtools::{Event, FIFO_DEPTH};

#[allow(unused_imports)]
use tracing::{debug, error, info, warn};

use crate::automaton::Automaton;
use crate::error::{Error, Result};
use crate::filter::MultiplicityFilter;
use crate::normalizer::Normalizer;
use crate::sink::{CombinationRecord, HistogramSink, Sink, StreamSink};

/// The combination detection and aggregation engine.
///
/// Wires the admission boundary, the guard/window automaton, the
/// multiplicity filter, and the selected sink into one synchronous
/// pipeline: feed time-ordered batches with [`Combinations::process`],
/// read results with [`Combinations::read_records`] or
/// [`Combinations::read_histogram`]. Feeding never blocks on the
/// reader; overload shows up in the overflow accounting instead.
#[derive(Debug)]
pub struct Combinations {
    config: CombinationConfig,
    capture: bool,
    fifo_depth: usize,
    normalizer: Normalizer,
    automaton: Automaton,
    filter: MultiplicityFilter,
    sink: Sink,
}

impl Combinations {
    pub fn new(config: CombinationConfig) -> Result<Combinations> {
        Combinations::with_fifo_depth(config, FIFO_DEPTH)
    }

    /// Build an engine with a non-default stream FIFO depth. The
    /// depth is a build-time constant of the reference hardware, so
    /// it is fixed for the engine's lifetime rather than part of the
    /// runtime configuration.
    pub fn with_fifo_depth(config: CombinationConfig, fifo_depth: usize) -> Result<Combinations> {
        config.validate()?;
        let mut engine = Combinations {
            config,
            capture: false,
            fifo_depth,
            normalizer: Normalizer::new(config.channels),
            automaton: Automaton::new(config.window, config.guard),
            filter: MultiplicityFilter::new(config.filter_min, config.filter_max),
            sink: Sink::Stream(StreamSink::new(fifo_depth)),
        };
        engine.apply();
        Ok(engine)
    }

    pub fn config(&self) -> &CombinationConfig {
        return &self.config;
    }

    /// Replace the configuration. Only allowed while capture is
    /// disabled; there are no defined matching semantics for a
    /// candidate straddling a reconfiguration, so an accepted change
    /// performs a full reset.
    pub fn configure(&mut self, config: CombinationConfig) -> Result<()> {
        if self.capture {
            return Err(Error::CaptureActive);
        }
        config.validate()?;
        self.config = config;
        self.apply();
        info!(
            channels = config.channels,
            window = config.window,
            guard = config.guard,
            "reconfigured"
        );
        Ok(())
    }

    fn apply(&mut self) {
        self.normalizer = Normalizer::new(self.config.channels);
        self.automaton = Automaton::new(self.config.window, self.config.guard);
        self.filter = MultiplicityFilter::new(self.config.filter_min, self.config.filter_max);
        self.sink = match self.config.source {
            DataSource::Stream => Sink::Stream(StreamSink::new(self.fifo_depth)),
            DataSource::Histogram => Sink::Histogram(HistogramSink::new()),
        };
    }

    /// Gate the whole pipeline. While disabled, incoming batches are
    /// discarded without touching any state.
    pub fn set_capture_enable(&mut self, enable: bool) {
        self.capture = enable;
        debug!(enable, "capture");
    }

    pub fn capture_enabled(&self) -> bool {
        return self.capture;
    }

    /// Clear the sink, the in-flight candidate, and the admission
    /// watermark. Safe in any state and idempotent.
    pub fn reset(&mut self) {
        self.automaton.reset();
        self.normalizer.reset();
        self.sink.clear();
        debug!("reset");
    }

    /// Feed one time-ordered batch of events through the pipeline.
    /// On error no event of the batch is admitted and all accumulator
    /// state is left as it was.
    pub fn process(&mut self, batch: &[Event]) -> Result<()> {
        if !self.capture {
            return Ok(());
        }
        self.normalizer.admit(batch)?;
        for &e in batch {
            if let Some(v) = self.automaton.advance(e) {
                self.accumulate(v.mask);
            }
        }
        Ok(())
    }

    /// Resolve an in-flight candidate as if the stream went quiet
    /// forever: its window closes and its tail guard passes, so it is
    /// verified and accumulated. Call at end of stream or before
    /// disabling capture for readout.
    pub fn flush(&mut self) {
        if let Some(v) = self.automaton.settle() {
            self.accumulate(v.mask);
        }
    }

    fn accumulate(&mut self, mask: u16) {
        if self.filter.accepts(mask) {
            self.sink.record(mask);
        }
    }

    /// Stream-mode readout: drain up to `k` records in arrival order
    pub fn read_records(&mut self, k: usize) -> Result<Vec<CombinationRecord>> {
        match &mut self.sink {
            Sink::Stream(s) => Ok(s.pop(k)),
            Sink::Histogram(_) => Err(Error::SourceMismatch),
        }
    }

    /// Histogram-mode readout: the full bin array, one bin per mask
    pub fn read_histogram(&self) -> Result<&[u32]> {
        match &self.sink {
            Sink::Histogram(h) => Ok(h.bins()),
            Sink::Stream(_) => Err(Error::SourceMismatch),
        }
    }

    /// Sticky bin saturation flag (histogram mode)
    pub fn saturated(&self) -> bool {
        match &self.sink {
            Sink::Histogram(h) => h.saturated(),
            Sink::Stream(_) => false,
        }
    }

    /// Records currently waiting in the stream FIFO
    pub fn queue_len(&self) -> usize {
        match &self.sink {
            Sink::Stream(s) => s.len(),
            Sink::Histogram(_) => 0,
        }
    }

    /// Records that entered the stream FIFO since the last reset
    pub fn delivered(&self) -> u64 {
        match &self.sink {
            Sink::Stream(s) => s.delivered(),
            Sink::Histogram(_) => 0,
        }
    }

    /// Combinations lost to a full stream FIFO since the last reset
    pub fn dropped(&self) -> u64 {
        match &self.sink {
            Sink::Stream(s) => s.dropped(),
            Sink::Histogram(_) => 0,
        }
    }

    /// Combinations the filter forwarded into the sink
    pub fn forwarded(&self) -> u64 {
        return self.sink.forwarded();
    }
}
