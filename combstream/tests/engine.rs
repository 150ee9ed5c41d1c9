use combstream::engine::Combinations;
use combstream::error::{Error, InvalidConfig};
use combtools::cfg::{CombinationConfig, DataSource};
use combtools::Event;

fn ev(time: u64, channel: u8) -> Event {
    Event { time, channel }
}

fn config(channels: u8, window: u64, guard: u64, min: u8, max: u8) -> CombinationConfig {
    CombinationConfig {
        channels,
        window,
        guard,
        filter_min: min,
        filter_max: max,
        source: DataSource::Stream,
    }
}

fn run_stream(cfg: CombinationConfig, events: &[Event]) -> Combinations {
    let mut engine = Combinations::new(cfg).unwrap();
    engine.set_capture_enable(true);
    engine.process(events).unwrap();
    engine.flush();
    return engine;
}

#[test]
fn three_channel_round_trip() {
    // Channels 0, 1, 2 fire inside one window with clean guards on
    // both sides: exactly one triple combination
    let mut engine = run_stream(
        config(3, 100, 20, 1, 3),
        &[ev(0, 0), ev(50, 1), ev(90, 2)],
    );
    let recs = engine.read_records(16).unwrap();
    assert_eq!(recs.len(), 1);
    assert_eq!(recs[0].mask, 0b111);
    assert_eq!(recs[0].missed, 0);
}

#[test]
fn window_boundary_event_is_excluded() {
    // Exactly at start + window: not a member
    let mut engine = run_stream(config(2, 100, 20, 1, 2), &[ev(0, 0), ev(100, 1)]);
    let recs = engine.read_records(16).unwrap();
    assert_eq!(recs.iter().map(|r| r.mask).collect::<Vec<_>>(), vec![0b01, 0b10]);

    // One tick earlier: included
    let mut engine = run_stream(config(2, 100, 20, 1, 2), &[ev(0, 0), ev(99, 1)]);
    let recs = engine.read_records(16).unwrap();
    assert_eq!(recs.iter().map(|r| r.mask).collect::<Vec<_>>(), vec![0b11]);
}

#[test]
fn multiplicity_filter_bounds_every_record() {
    // Well-separated groups of multiplicity 1, 2, and 3
    let events = [
        ev(0, 0),
        ev(1000, 0),
        ev(1010, 1),
        ev(2000, 0),
        ev(2010, 1),
        ev(2020, 2),
    ];
    let mut engine = run_stream(config(3, 100, 50, 2, 2), &events);
    let recs = engine.read_records(16).unwrap();
    assert_eq!(recs.len(), 1);
    for r in &recs {
        let n = r.mask.count_ones();
        assert!((2..=2).contains(&n));
    }
    assert_eq!(recs[0].mask, 0b011);
    // Filtered combinations are out of scope, not overflow
    assert_eq!(engine.dropped(), 0);
    assert_eq!(engine.forwarded(), 1);
}

#[test]
fn overflow_accounting_with_depth_one_fifo() {
    let mut engine =
        Combinations::with_fifo_depth(config(3, 1, 5, 1, 3), 1).unwrap();
    engine.set_capture_enable(true);
    // Three isolated single-channel combinations
    engine
        .process(&[ev(0, 0), ev(10, 1), ev(20, 2)])
        .unwrap();
    engine.flush();
    assert_eq!(engine.queue_len(), 1);
    assert_eq!(engine.delivered(), 1);
    assert_eq!(engine.dropped(), 2);
    let recs = engine.read_records(16).unwrap();
    assert_eq!(recs.len(), 1);
    assert_eq!(recs[0].mask, 0b001);
    assert_eq!(recs[0].missed, 2);
    // Invariant: delivered + dropped == combinations forwarded
    assert_eq!(engine.forwarded(), 3);
}

#[test]
fn histogram_matches_stream_counts() {
    // A stream with repeated masks and some guard casualties
    let events = [
        ev(0, 0),
        ev(10, 1),
        ev(1000, 0),
        ev(1010, 1),
        ev(2000, 2),
        ev(3000, 0),
        ev(3040, 1), // closes the window, inside the guard: discarded
        ev(5000, 2),
    ];
    let cfg = config(3, 30, 100, 1, 3);

    let mut stream = run_stream(cfg, &events);
    let recs = stream.read_records(1024).unwrap();

    let mut hcfg = cfg;
    hcfg.source = DataSource::Histogram;
    let hist_engine = run_stream(hcfg, &events);
    let bins = hist_engine.read_histogram().unwrap();

    let total: u64 = bins.iter().map(|&b| b as u64).sum();
    assert_eq!(total, recs.len() as u64);
    for mask in 0..bins.len() {
        let in_stream = recs.iter().filter(|r| r.mask as usize == mask).count();
        assert_eq!(bins[mask] as usize, in_stream);
    }
    assert!(!hist_engine.saturated());
}

#[test]
fn reset_is_idempotent() {
    let mut engine = run_stream(config(2, 100, 10, 1, 2), &[ev(0, 0), ev(500, 1)]);
    assert!(engine.queue_len() > 0);
    engine.reset();
    let once = (
        engine.queue_len(),
        engine.delivered(),
        engine.dropped(),
        engine.read_records(16).unwrap(),
    );
    engine.reset();
    let twice = (
        engine.queue_len(),
        engine.delivered(),
        engine.dropped(),
        engine.read_records(16).unwrap(),
    );
    assert_eq!(once, (0, 0, 0, vec![]));
    assert_eq!(once, twice);
    // No candidate survives a reset
    engine.flush();
    assert_eq!(engine.read_records(16).unwrap(), vec![]);
}

#[test]
fn capture_disabled_discards_everything() {
    let mut engine = Combinations::new(config(2, 100, 10, 1, 2)).unwrap();
    // Not enabled yet: even unordered garbage is ignored untouched
    engine.process(&[ev(50, 0)]).unwrap();
    engine.process(&[ev(10, 1)]).unwrap();
    engine.set_capture_enable(true);
    engine.process(&[ev(0, 0)]).unwrap();
    engine.flush();
    assert_eq!(engine.read_records(16).unwrap().len(), 1);
}

#[test]
fn configure_requires_capture_disabled() {
    let mut engine = Combinations::new(config(2, 100, 10, 1, 2)).unwrap();
    engine.set_capture_enable(true);
    assert_eq!(
        engine.configure(config(3, 100, 10, 1, 3)),
        Err(Error::CaptureActive)
    );
    engine.set_capture_enable(false);
    assert!(engine.configure(config(3, 100, 10, 1, 3)).is_ok());
    assert_eq!(engine.config().channels, 3);
}

#[test]
fn invalid_configuration_keeps_previous() {
    let mut engine = Combinations::new(config(2, 100, 10, 1, 2)).unwrap();
    assert_eq!(
        engine.configure(config(2, 0, 10, 1, 2)),
        Err(Error::InvalidConfig(InvalidConfig::ZeroWindow))
    );
    assert_eq!(
        engine.configure(config(2, 100, 10, 2, 1)),
        Err(Error::InvalidConfig(InvalidConfig::FilterBounds {
            min: 2,
            max: 1,
            channels: 2
        }))
    );
    assert_eq!(engine.config(), &config(2, 100, 10, 1, 2));
}

#[test]
fn integrity_errors_surface_and_preserve_state() {
    let mut engine = Combinations::new(config(2, 100, 10, 1, 2)).unwrap();
    engine.set_capture_enable(true);
    engine.process(&[ev(0, 0), ev(10, 1)]).unwrap();
    engine.process(&[ev(500, 0)]).unwrap(); // resolves the first candidate

    assert_eq!(
        engine.process(&[ev(600, 2)]),
        Err(Error::OutOfRangeChannel {
            channel: 2,
            channels: 2
        })
    );
    assert_eq!(
        engine.process(&[ev(400, 0)]),
        Err(Error::OrderingViolation {
            time: 400,
            seen: 500
        })
    );
    // The verified combination from before the errors is intact
    let recs = engine.read_records(16).unwrap();
    assert_eq!(recs.len(), 1);
    assert_eq!(recs[0].mask, 0b11);
}

#[test]
fn readout_must_match_data_source() {
    let mut engine = Combinations::new(config(2, 100, 10, 1, 2)).unwrap();
    assert_eq!(engine.read_histogram().err(), Some(Error::SourceMismatch));

    let mut hcfg = config(2, 100, 10, 1, 2);
    hcfg.source = DataSource::Histogram;
    engine.configure(hcfg).unwrap();
    assert_eq!(engine.read_records(1).err(), Some(Error::SourceMismatch));
    assert!(engine.read_histogram().is_ok());
}

#[test]
fn partial_readout_drains_in_order() {
    let events: Vec<Event> = (0..5).map(|i| ev(i * 1000, (i % 2) as u8)).collect();
    let mut engine = run_stream(config(2, 10, 50, 1, 2), &events);
    assert_eq!(engine.queue_len(), 5);
    let first = engine.read_records(2).unwrap();
    assert_eq!(first.iter().map(|r| r.mask).collect::<Vec<_>>(), vec![0b01, 0b10]);
    assert_eq!(engine.read_records(16).unwrap().len(), 3);
    assert_eq!(engine.read_records(16).unwrap(), vec![]);
}
