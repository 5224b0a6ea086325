//! Non-blocking front for slow security event sinks.
//!
//! `record()` only pushes onto an in-memory queue; a dedicated worker thread
//! drains the queue into the downstream sink.
//!
//! Backpressure: the queue is bounded. When full, the **oldest** queued event
//! is dropped to make room and the loss counter is incremented. Callers are
//! never made to wait for the downstream.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread;

use tracing::{debug, warn};

use crate::sink::{SecurityEventSink, SinkError};
use crate::SecurityEvent;

#[derive(Debug)]
struct QueueState {
    events: VecDeque<SecurityEvent>,
    closed: bool,
}

#[derive(Debug)]
struct Shared {
    state: Mutex<QueueState>,
    ready: Condvar,
    capacity: usize,
    lost: AtomicU64,
}

/// Bounded drop-oldest queue in front of a downstream sink.
#[derive(Debug)]
pub struct BoundedSink {
    shared: Arc<Shared>,
    join: Mutex<Option<thread::JoinHandle<()>>>,
}

impl BoundedSink {
    /// Spawn the drain worker.
    ///
    /// A `capacity` of zero is treated as one.
    pub fn spawn<S>(capacity: usize, downstream: S) -> std::io::Result<Self>
    where
        S: SecurityEventSink + 'static,
    {
        let shared = Arc::new(Shared {
            state: Mutex::new(QueueState {
                events: VecDeque::new(),
                closed: false,
            }),
            ready: Condvar::new(),
            capacity: capacity.max(1),
            lost: AtomicU64::new(0),
        });

        let worker_shared = Arc::clone(&shared);
        let join = thread::Builder::new()
            .name("security-event-sink".to_string())
            .spawn(move || drain_loop(worker_shared, downstream))?;

        Ok(Self {
            shared,
            join: Mutex::new(Some(join)),
        })
    }

    pub fn capacity(&self) -> usize {
        self.shared.capacity
    }

    /// Events dropped on overflow plus events the downstream rejected.
    pub fn lost(&self) -> u64 {
        self.shared.lost.load(Ordering::Relaxed)
    }

    /// Events currently queued (not yet handed to the downstream).
    pub fn pending(&self) -> usize {
        self.shared.state.lock().map(|s| s.events.len()).unwrap_or(0)
    }

    /// Stop accepting events, deliver what is queued, and join the worker.
    ///
    /// Idempotent.
    pub fn shutdown(&self) {
        if let Ok(mut state) = self.shared.state.lock() {
            state.closed = true;
        }
        self.shared.ready.notify_all();

        let join = self.join.lock().ok().and_then(|mut j| j.take());
        if let Some(j) = join {
            let _ = j.join();
        }
    }
}

impl SecurityEventSink for BoundedSink {
    fn record(&self, event: SecurityEvent) -> Result<(), SinkError> {
        let mut state = self.shared.state.lock().map_err(|_| SinkError::Poisoned)?;
        if state.closed {
            return Err(SinkError::Closed);
        }

        if state.events.len() >= self.shared.capacity {
            state.events.pop_front();
            self.shared.lost.fetch_add(1, Ordering::Relaxed);
        }
        state.events.push_back(event);
        drop(state);

        self.shared.ready.notify_one();
        Ok(())
    }
}

impl Drop for BoundedSink {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn drain_loop<S>(shared: Arc<Shared>, downstream: S)
where
    S: SecurityEventSink,
{
    loop {
        let batch: Vec<SecurityEvent> = {
            let Ok(mut state) = shared.state.lock() else {
                warn!("security event queue poisoned; drain worker exiting");
                return;
            };

            while state.events.is_empty() && !state.closed {
                state = match shared.ready.wait(state) {
                    Ok(s) => s,
                    Err(_) => {
                        warn!("security event queue poisoned; drain worker exiting");
                        return;
                    }
                };
            }

            if state.events.is_empty() {
                debug!("security event sink closed and drained");
                return;
            }

            state.events.drain(..).collect()
        };

        for event in batch {
            if let Err(e) = downstream.record(event) {
                shared.lost.fetch_add(1, Ordering::Relaxed);
                warn!(error = %e, "downstream security event sink failed; event lost");
            }
        }
    }
}
