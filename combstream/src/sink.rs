//! Dual-mode accumulation of accepted combinations

use std::collections::VecDeque;

use combtools::HISTOGRAM_BINS;

/// One stream-mode readout record
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CombinationRecord {
    /// Participating virtual channels
    pub mask: u16,
    /// Combinations dropped against this record because the queue was
    /// full, saturating
    pub missed: u16,
}

/// Bounded drop-on-full queue of combination records.
///
/// The queue never blocks the matching pipeline: pushing into a full
/// queue drops the combination and folds the loss into the `missed`
/// field of the newest queued record, so the reader always learns how
/// many combinations vanished between delivered records.
#[derive(Clone, Debug)]
pub struct StreamSink {
    queue: VecDeque<CombinationRecord>,
    depth: usize,
    delivered: u64,
    dropped: u64,
}

impl StreamSink {
    pub fn new(depth: usize) -> StreamSink {
        assert!(depth > 0);
        StreamSink {
            queue: VecDeque::with_capacity(depth),
            depth,
            delivered: 0,
            dropped: 0,
        }
    }

    pub fn push(&mut self, mask: u16) {
        if self.queue.len() == self.depth {
            self.dropped += 1;
            let newest = self.queue.back_mut().unwrap();
            newest.missed = newest.missed.saturating_add(1);
        } else {
            self.queue.push_back(CombinationRecord { mask, missed: 0 });
            self.delivered += 1;
        }
    }

    /// Drain up to `k` records in arrival order
    pub fn pop(&mut self, k: usize) -> Vec<CombinationRecord> {
        let n = k.min(self.queue.len());
        return self.queue.drain(..n).collect();
    }

    pub fn len(&self) -> usize {
        return self.queue.len();
    }

    pub fn is_empty(&self) -> bool {
        return self.queue.is_empty();
    }

    /// Combinations that made it into the queue
    pub fn delivered(&self) -> u64 {
        return self.delivered;
    }

    /// Combinations lost to a full queue
    pub fn dropped(&self) -> u64 {
        return self.dropped;
    }

    pub fn clear(&mut self) {
        self.queue.clear();
        self.delivered = 0;
        self.dropped = 0;
    }
}

/// Dense per-mask histogram with saturating bins and a sticky
/// saturation flag. Bins clamp at `u32::MAX` instead of wrapping, so
/// a saturated histogram stops counting rather than fabricating data.
#[derive(Clone, Debug)]
pub struct HistogramSink {
    bins: Vec<u32>,
    saturated: bool,
    accepted: u64,
}

impl HistogramSink {
    pub fn new() -> HistogramSink {
        HistogramSink {
            bins: vec![0; HISTOGRAM_BINS],
            saturated: false,
            accepted: 0,
        }
    }

    pub fn record(&mut self, mask: u16) {
        let bin = &mut self.bins[mask as usize];
        *bin = bin.saturating_add(1);
        if *bin == u32::MAX {
            self.saturated = true;
        }
        self.accepted += 1;
    }

    pub fn bins(&self) -> &[u32] {
        return &self.bins;
    }

    /// True once any bin has reached its maximum value
    pub fn saturated(&self) -> bool {
        return self.saturated;
    }

    /// Combinations recorded, including increments lost to clamping
    pub fn accepted(&self) -> u64 {
        return self.accepted;
    }

    pub fn clear(&mut self) {
        self.bins.iter_mut().for_each(|b| *b = 0);
        self.saturated = false;
        self.accepted = 0;
    }
}

impl Default for HistogramSink {
    fn default() -> Self {
        HistogramSink::new()
    }
}

/// The two mutually exclusive accumulators, fixed at configure time
#[derive(Clone, Debug)]
pub enum Sink {
    Stream(StreamSink),
    Histogram(HistogramSink),
}

impl Sink {
    pub fn record(&mut self, mask: u16) {
        match self {
            Sink::Stream(s) => s.push(mask),
            Sink::Histogram(h) => h.record(mask),
        }
    }

    /// Total combinations forwarded by the filter into this sink
    pub fn forwarded(&self) -> u64 {
        match self {
            Sink::Stream(s) => s.delivered() + s.dropped(),
            Sink::Histogram(h) => h.accepted(),
        }
    }

    pub fn clear(&mut self) {
        match self {
            Sink::Stream(s) => s.clear(),
            Sink::Histogram(h) => h.clear(),
        }
    }
}
