//! Background dispatch queue
//!
//! External analysis calls are slow and rate-limited; they must never stall
//! the sampling loops. A single worker thread drains a bounded queue of
//! dispatch jobs. When the queue is full the new job is dropped rather than
//! queued: the external call is gated on freshness, and a stale frame behind
//! an in-flight one has no value.

use std::sync::mpsc::{self, SyncSender, TrySendError};
use std::thread::{self, JoinHandle};
use tracing::warn;

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Default number of dispatch jobs that may wait behind the in-flight one.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1;

/// Bounded fire-and-forget executor for external dispatch jobs.
#[derive(Debug)]
pub struct Dispatcher {
    sender: Option<SyncSender<Job>>,
    worker: Option<JoinHandle<()>>,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(DEFAULT_QUEUE_CAPACITY)
    }
}

impl Dispatcher {
    /// Spawn the worker with room for `capacity` queued jobs.
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = mpsc::sync_channel::<Job>(capacity);
        let worker = thread::spawn(move || {
            for job in receiver.iter() {
                job();
            }
        });
        Self {
            sender: Some(sender),
            worker: Some(worker),
        }
    }

    /// Hand a job to the worker without blocking. Returns false when the
    /// queue is full and the job was dropped.
    pub fn try_dispatch<F>(&self, job: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        let Some(sender) = &self.sender else {
            return false;
        };
        match sender.try_send(Box::new(job)) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                warn!("dispatch queue full, dropping job");
                false
            }
            Err(TrySendError::Disconnected(_)) => {
                warn!("dispatch worker gone, dropping job");
                false
            }
        }
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        // Closing the channel lets the worker drain and exit.
        drop(self.sender.take());
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Barrier};
    use std::time::Duration;

    #[test]
    fn test_jobs_run_on_worker() {
        let counter = Arc::new(AtomicUsize::new(0));
        {
            let dispatcher = Dispatcher::new(4);
            for _ in 0..3 {
                let counter = counter.clone();
                assert!(dispatcher.try_dispatch(move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                }));
            }
            // Drop joins the worker after the queue drains.
        }
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_full_queue_drops_job() {
        let dispatcher = Dispatcher::new(1);
        let gate = Arc::new(Barrier::new(2));

        // Occupy the worker until we release the barrier.
        let held = gate.clone();
        assert!(dispatcher.try_dispatch(move || {
            held.wait();
        }));

        // Give the worker a moment to pick up the blocking job, then fill
        // the single queue slot.
        thread::sleep(Duration::from_millis(50));
        assert!(dispatcher.try_dispatch(|| {}));

        // Queue slot occupied, worker busy: this one is dropped.
        assert!(!dispatcher.try_dispatch(|| {}));

        gate.wait();
    }

    #[test]
    fn test_drop_waits_for_queued_jobs() {
        let counter = Arc::new(AtomicUsize::new(0));
        let dispatcher = Dispatcher::new(2);

        let slow_counter = counter.clone();
        dispatcher.try_dispatch(move || {
            thread::sleep(Duration::from_millis(20));
            slow_counter.fetch_add(1, Ordering::SeqCst);
        });
        drop(dispatcher);

        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}
