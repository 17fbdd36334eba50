//! Off-thread path requests with results delivered on the caller's tick.
//!
//! [`PathDispatcher::request`] can be called from any thread and never
//! blocks: the job goes onto an unbounded channel served by a fixed pool of
//! worker threads. Finished searches land in a mutex-protected queue that
//! [`PathDispatcher::tick`] drains, running every callback on the ticking
//! thread in completion order.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender};
use parking_lot::Mutex;
use tilenav_core::Vec2;

use crate::astar::{PathResult, Pathfinder};
use crate::config::DispatcherConfig;
use crate::error::NavError;
use crate::grid::NavGrid;

/// Identifies one submitted request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(pub u64);

type Callback = Box<dyn FnOnce(Vec<Vec2>, bool) + Send + 'static>;

struct Job {
    id: RequestId,
    start: Vec2,
    end: Vec2,
    callback: Callback,
}

struct Completed {
    id: RequestId,
    result: PathResult,
    callback: Callback,
}

type CompletionQueue = Arc<Mutex<Vec<Completed>>>;

/// Runs path searches on a worker pool and hands results back on
/// [`tick`](Self::tick).
pub struct PathDispatcher {
    jobs: Option<Sender<Job>>,
    completed: CompletionQueue,
    workers: Vec<JoinHandle<()>>,
    pathfinder: Pathfinder,
    next_id: AtomicU64,
    in_flight: AtomicUsize,
    delivering: Mutex<()>,
}

impl PathDispatcher {
    /// Start `config.workers` threads searching `grid`.
    pub fn new(grid: Arc<NavGrid>, config: DispatcherConfig) -> Result<Self, NavError> {
        config.validate()?;
        let (tx, rx) = crossbeam_channel::unbounded::<Job>();
        let completed: CompletionQueue = Arc::new(Mutex::new(Vec::new()));
        let pathfinder = Pathfinder::new(grid);

        let mut workers = Vec::with_capacity(config.workers);
        for i in 0..config.workers {
            let rx = rx.clone();
            let completed = Arc::clone(&completed);
            let pathfinder = pathfinder.clone();
            let handle = thread::Builder::new()
                .name(format!("{}-{}", config.thread_name, i))
                .spawn(move || run_worker(&pathfinder, &rx, &completed))?;
            workers.push(handle);
        }
        log::debug!(
            "path dispatcher started with {} worker(s) over a {}x{} grid",
            workers.len(),
            pathfinder.grid().width(),
            pathfinder.grid().height(),
        );

        Ok(Self {
            jobs: Some(tx),
            completed,
            workers,
            pathfinder,
            next_id: AtomicU64::new(0),
            in_flight: AtomicUsize::new(0),
            delivering: Mutex::new(()),
        })
    }

    /// Queue a search from `start` to `end`.
    ///
    /// `callback` receives the waypoints and a success flag during a later
    /// [`tick`](Self::tick); it is called exactly once.
    pub fn request<F>(&self, start: Vec2, end: Vec2, callback: F) -> RequestId
    where
        F: FnOnce(Vec<Vec2>, bool) + Send + 'static,
    {
        let id = RequestId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.in_flight.fetch_add(1, Ordering::AcqRel);
        let job = Job {
            id,
            start,
            end,
            callback: Box::new(callback),
        };
        let queued = match &self.jobs {
            Some(jobs) => jobs.send(job).map_err(|err| err.into_inner()),
            None => Err(job),
        };
        if let Err(job) = queued {
            // No worker left to take it; report the failure on the next tick.
            log::error!("path request {} could not be queued", id.0);
            self.completed.lock().push(Completed {
                id: job.id,
                result: PathResult::failure(),
                callback: job.callback,
            });
        }
        id
    }

    /// Deliver every finished result, in completion order, on the calling
    /// thread. Returns how many callbacks ran.
    ///
    /// The queue lock is released before any callback runs, so callbacks
    /// may submit new requests. A tick that starts while another is still
    /// delivering (including one called from inside a callback) returns 0.
    /// A panicking callback is logged and counted as delivered; the rest of
    /// the batch still runs.
    pub fn tick(&self) -> usize {
        let Some(_delivering) = self.delivering.try_lock() else {
            return 0;
        };
        let ready = std::mem::take(&mut *self.completed.lock());
        let count = ready.len();
        for done in ready {
            let Completed {
                id,
                result,
                callback,
            } = done;
            log::trace!(
                "delivering path request {} (success: {})",
                id.0,
                result.success
            );
            let delivered = panic::catch_unwind(AssertUnwindSafe(move || {
                callback(result.waypoints, result.success)
            }));
            if let Err(payload) = delivered {
                log::error!(
                    "callback for path request {} panicked: {}",
                    id.0,
                    panic_message(payload.as_ref())
                );
            }
            self.in_flight.fetch_sub(1, Ordering::AcqRel);
        }
        count
    }

    /// Requests submitted but not yet delivered.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Acquire)
    }

    pub fn workers(&self) -> usize {
        self.workers.len()
    }

    pub fn grid(&self) -> &Arc<NavGrid> {
        self.pathfinder.grid()
    }
}

impl Drop for PathDispatcher {
    /// Close the job channel and wait for the workers. Workers finish the
    /// searches already queued; undelivered results are dropped.
    fn drop(&mut self) {
        drop(self.jobs.take());
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                log::error!("path worker exited by panic");
            }
        }
        let dropped = self.completed.lock().len();
        if dropped > 0 {
            log::debug!("path dispatcher dropped {dropped} undelivered result(s)");
        }
    }
}

impl std::fmt::Debug for PathDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PathDispatcher")
            .field("workers", &self.workers.len())
            .field("in_flight", &self.in_flight())
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Workers
// ---------------------------------------------------------------------------

fn run_worker(pathfinder: &Pathfinder, jobs: &Receiver<Job>, completed: &Mutex<Vec<Completed>>) {
    for job in jobs.iter() {
        let result = guarded_search(job.id, || pathfinder.find_path(job.start, job.end));
        if !result.success {
            log::warn!(
                "path request {} found no path from {} to {}",
                job.id.0,
                job.start,
                job.end
            );
        }
        completed.lock().push(Completed {
            id: job.id,
            result,
            callback: job.callback,
        });
    }
}

/// Run a search, turning a panic into a failed result.
fn guarded_search(id: RequestId, search: impl FnOnce() -> PathResult) -> PathResult {
    panic::catch_unwind(AssertUnwindSafe(search)).unwrap_or_else(|payload| {
        log::error!(
            "path request {} panicked: {}",
            id.0,
            panic_message(payload.as_ref())
        );
        PathResult::failure()
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "unknown panic"
    }
}
