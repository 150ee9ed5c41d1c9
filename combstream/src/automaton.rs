//! The guard/window matching automaton at the heart of the engine

use combtools::Event;

/// A combination that passed both isolation checks, ready for the
/// multiplicity filter
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Verified {
    /// Participating virtual channels
    pub mask: u16,
    /// Timestamp of the candidate's start event
    pub start: u64,
}

/// Per-candidate matching state
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    /// Waiting for an isolated start event
    Idle,
    /// Window open: events before `start + window` join the mask
    Collecting { mask: u16, start: u64, last: u64 },
    /// Window closed: waiting out the guard interval after `last`
    TailGuard { mask: u16, start: u64, last: u64 },
}

/// Three-phase detector for isolated multi-channel combinations.
///
/// One candidate is evaluated at a time over a time-ordered event
/// stream. An event opens a candidate only if nothing was seen within
/// `guard` ticks before it; subsequent events inside the half-open
/// window `[start, start + window)` join the member mask; the
/// candidate is verified once nothing follows within `guard` ticks of
/// its last member. Both isolation checks treat an event landing
/// exactly `guard` ticks away as a violation.
///
/// Verification is triggered by the first event at or beyond the
/// window boundary: it resolves the pending candidate (verify or
/// discard) and is then itself re-evaluated as a potential new start.
/// With no such event the candidate stays pending until [`Automaton::settle`].
#[derive(Clone, Copy, Debug)]
pub struct Automaton {
    window: u64,
    guard: u64,
    state: State,
    /// Most recent event time observed, for head isolation
    seen: Option<u64>,
}

impl Automaton {
    pub fn new(window: u64, guard: u64) -> Automaton {
        Automaton {
            window,
            guard,
            state: State::Idle,
            seen: None,
        }
    }

    /// True if no observed event lies within `guard` ticks before `t`
    fn isolated(&self, t: u64) -> bool {
        match self.seen {
            None => true,
            Some(s) => t - s > self.guard,
        }
    }

    /// Advance the automaton by one event. Yields a verified
    /// combination when this event resolves a pending tail guard.
    pub fn advance(&mut self, e: Event) -> Option<Verified> {
        debug_assert!(self.seen.map_or(true, |s| e.time >= s));
        let mut out = None;
        loop {
            match self.state {
                State::Idle => {
                    if self.isolated(e.time) {
                        self.state = State::Collecting {
                            mask: 1 << e.channel,
                            start: e.time,
                            last: e.time,
                        };
                    }
                    break;
                }
                State::Collecting { mask, start, last } => {
                    if e.time - start < self.window {
                        self.state = State::Collecting {
                            mask: mask | 1 << e.channel,
                            start,
                            last: e.time,
                        };
                        break;
                    }
                    // Window closed by this event; it now faces the
                    // tail guard check
                    self.state = State::TailGuard { mask, start, last };
                }
                State::TailGuard { mask, start, last } => {
                    if e.time - last > self.guard {
                        out = Some(Verified { mask, start });
                    }
                    // Either way the candidate is done; this event is
                    // re-evaluated as a potential new start
                    self.state = State::Idle;
                }
            }
        }
        self.seen = Some(e.time);
        return out;
    }

    /// Resolve a pending candidate as if no further event ever
    /// arrives: the window closes and the tail guard elapses quietly,
    /// so the candidate verifies.
    pub fn settle(&mut self) -> Option<Verified> {
        let out = match self.state {
            State::Idle => None,
            State::Collecting { mask, start, .. } | State::TailGuard { mask, start, .. } => {
                Some(Verified { mask, start })
            }
        };
        self.state = State::Idle;
        return out;
    }

    /// Discard any pending candidate and all recent-activity tracking
    pub fn reset(&mut self) {
        self.state = State::Idle;
        self.seen = None;
    }
}
