//! Threaded pipeline wrapper: an engine on its own thread, fed over a
//! channel and read through a shared handle

use std::sync::Arc;
use std::thread::JoinHandle;

use anyhow::Result;
use combtools::Event;
use parking_lot::Mutex;

#[allow(unused_imports)]
use tracing::{debug, error, info, warn};

use crate::engine::Combinations;

/// Messages accepted by the pipeline thread
pub enum Message {
    /// One time-ordered batch of events
    Batch(Vec<Event>),
    /// Resolve any in-flight candidate (see [`Combinations::flush`])
    Flush,
}

/// Spawn a worker that drains batches from `receiver` into the shared
/// engine. Readout locks the same handle between batches; the engine
/// itself never waits for the queue to drain, it drops and counts.
///
/// The worker exits cleanly when all senders drop, and exits with the
/// error when the engine rejects a batch, since admission failures
/// mean the upstream stream can no longer be trusted.
pub fn spawn(
    engine: Arc<Mutex<Combinations>>,
    receiver: flume::Receiver<Message>,
) -> JoinHandle<Result<()>> {
    std::thread::spawn(move || {
        loop {
            match receiver.recv() {
                Ok(Message::Batch(batch)) => {
                    let mut engine = engine.lock();
                    if let Err(e) = engine.process(&batch) {
                        error!("batch rejected: {}", e);
                        return Err(e.into());
                    }
                }
                Ok(Message::Flush) => {
                    engine.lock().flush();
                }
                Err(_) => break,
            }
        }
        Ok(())
    })
}
