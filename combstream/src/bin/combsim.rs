use std::io::{stdout, Write};
use std::sync::Arc;

use anyhow::Result;
use parking_lot::Mutex;
use rand::prelude::*;

use combstream::engine::Combinations;
use combstream::pipeline::{self, Message};
use combtools::bit;
use combtools::cfg::{CombinationConfig, DataSource};
use combtools::Event;

#[derive(Debug, argh::FromArgs, Clone)]
/// Feed a synthetic random event stream through the combinations
/// engine and print the detected combinations
pub struct CliArgs {
    /// number of virtual channels
    #[argh(option, default = "4")]
    pub channels: u8,
    /// combination window in ticks
    #[argh(option, short = 'w', default = "3000")]
    pub window: u64,
    /// guard time in ticks
    #[argh(option, short = 'g', default = "1000")]
    pub guard: u64,
    /// minimum multiplicity
    #[argh(option, default = "1")]
    pub min: u8,
    /// maximum multiplicity
    #[argh(option, default = "16")]
    pub max: u8,
    /// number of events to generate
    #[argh(option, short = 'n', default = "100000")]
    pub events: usize,
    /// mean inter-event gap in ticks
    #[argh(option, default = "10000")]
    pub gap: u64,
    /// rng seed
    #[argh(option, default = "42")]
    pub seed: u64,
    /// accumulate a histogram instead of streaming records
    #[argh(switch)]
    pub histogram: bool,
}

/// Exponential inter-arrival times over uniformly random channels
fn synthesize(args: &CliArgs) -> Vec<Event> {
    let mut rng = StdRng::seed_from_u64(args.seed);
    let mut t = 0u64;
    let mut events = Vec::with_capacity(args.events);
    for _ in 0..args.events {
        let u: f64 = rng.gen_range(f64::EPSILON..1.0);
        t += (-u.ln() * args.gap as f64) as u64;
        events.push(Event {
            time: t,
            channel: rng.gen_range(0..args.channels),
        });
    }
    return events;
}

fn main() -> Result<()> {
    let args: CliArgs = argh::from_env();
    tracing_subscriber::fmt::init();

    let config = CombinationConfig {
        channels: args.channels,
        window: args.window,
        guard: args.guard,
        filter_min: args.min,
        filter_max: args.max.min(args.channels),
        source: if args.histogram {
            DataSource::Histogram
        } else {
            DataSource::Stream
        },
    };
    let engine = Arc::new(Mutex::new(Combinations::new(config)?));
    engine.lock().set_capture_enable(true);

    let (tx, rx) = flume::bounded(16);
    let worker = pipeline::spawn(engine.clone(), rx);

    for batch in synthesize(&args).chunks(1024) {
        tx.send(Message::Batch(batch.to_vec()))?;
    }
    tx.send(Message::Flush)?;
    drop(tx);
    worker.join().expect("pipeline thread panicked")?;

    let stdout = stdout();
    let mut stdout = stdout.lock();
    let mut engine = engine.lock();
    if args.histogram {
        let mut total = 0u64;
        let bins = engine.read_histogram()?.to_vec();
        for (mask, count) in bins.iter().enumerate().filter(|(_, &c)| c > 0) {
            total += *count as u64;
            writeln!(
                stdout,
                "{:016b}\t{:?}\t{}",
                mask,
                bit::mask_to_chans(mask as u16),
                count
            )?;
        }
        writeln!(stdout, "total\t{}\tsaturated\t{}", total, engine.saturated())?;
    } else {
        loop {
            let records = engine.read_records(1024)?;
            if records.is_empty() {
                break;
            }
            for r in records {
                writeln!(stdout, "{:016b}\t{:?}\t{}", r.mask, bit::mask_to_chans(r.mask), r.missed)?;
            }
        }
        writeln!(
            stdout,
            "delivered\t{}\tdropped\t{}",
            engine.delivered(),
            engine.dropped()
        )?;
    }
    Ok(())
}
