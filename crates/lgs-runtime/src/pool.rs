//! Bounded worker pool behind async loggers.
//!
//! A fixed set of threads drains a bounded FIFO queue. When the queue is
//! full, [`OverflowPolicy::Block`] makes the caller wait for room and
//! [`OverflowPolicy::OverrunOldest`] drops the oldest queued job instead.
//! Dropping the pool runs every job still queued, then joins the workers.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::JoinHandle;

use lgs_config::{SetupError, SetupResult, setup_bail};
use lgs_core::OverflowPolicy;
use parking_lot::{Condvar, Mutex};

pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Queue capacity and worker count of the default global pool.
pub const DEFAULT_QUEUE_SIZE: usize = 8192;
pub const DEFAULT_NUM_THREADS: usize = 1;

struct Queue {
    jobs: VecDeque<Job>,
    closed: bool,
}

struct Shared {
    queue: Mutex<Queue>,
    not_empty: Condvar,
    not_full: Condvar,
    capacity: usize,
    overrun: AtomicU64,
}

pub struct ThreadPool {
    shared: Arc<Shared>,
    workers: Vec<JoinHandle<()>>,
    num_threads: usize,
}

impl ThreadPool {
    pub fn new(queue_size: usize, num_threads: usize) -> SetupResult<Self> {
        if queue_size == 0 || num_threads == 0 {
            setup_bail!(
                "Thread pool needs queue_size and num_threads above 0, got {queue_size} and {num_threads}"
            );
        }
        let shared = Arc::new(Shared {
            queue: Mutex::new(Queue {
                jobs: VecDeque::with_capacity(queue_size.min(DEFAULT_QUEUE_SIZE)),
                closed: false,
            }),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
            capacity: queue_size,
            overrun: AtomicU64::new(0),
        });

        let mut pool = Self {
            shared,
            workers: Vec::with_capacity(num_threads),
            num_threads,
        };
        for i in 0..num_threads {
            let shared = Arc::clone(&pool.shared);
            let handle = std::thread::Builder::new()
                .name(format!("lgs-pool-{i}"))
                .spawn(move || worker_loop(&shared))
                .map_err(|e| SetupError::new(format!("Unable to spawn thread pool worker: {e}")))?;
            pool.workers.push(handle);
        }
        lgs_debug!(pool, queue_size, num_threads, "thread pool started");
        Ok(pool)
    }

    /// The global pool used when a document configures none.
    pub fn with_defaults() -> SetupResult<Self> {
        Self::new(DEFAULT_QUEUE_SIZE, DEFAULT_NUM_THREADS)
    }

    pub fn queue_size(&self) -> usize {
        self.shared.capacity
    }

    pub fn num_threads(&self) -> usize {
        self.num_threads
    }

    /// Jobs dropped so far under [`OverflowPolicy::OverrunOldest`].
    pub fn overrun_count(&self) -> u64 {
        self.shared.overrun.load(Ordering::Relaxed)
    }

    pub fn queued(&self) -> usize {
        self.shared.queue.lock().jobs.len()
    }

    pub fn post(&self, job: Job, policy: OverflowPolicy) {
        let mut queue = self.shared.queue.lock();
        while queue.jobs.len() >= self.shared.capacity {
            match policy {
                OverflowPolicy::Block => self.shared.not_full.wait(&mut queue),
                OverflowPolicy::OverrunOldest => {
                    queue.jobs.pop_front();
                    self.shared.overrun.fetch_add(1, Ordering::Relaxed);
                }
            }
        }
        queue.jobs.push_back(job);
        drop(queue);
        self.shared.not_empty.notify_one();
    }
}

fn worker_loop(shared: &Shared) {
    loop {
        let job = {
            let mut queue = shared.queue.lock();
            loop {
                if let Some(job) = queue.jobs.pop_front() {
                    break job;
                }
                if queue.closed {
                    return;
                }
                shared.not_empty.wait(&mut queue);
            }
        };
        shared.not_full.notify_one();
        job();
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        self.shared.queue.lock().closed = true;
        self.shared.not_empty.notify_all();
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
    }
}

impl std::fmt::Debug for ThreadPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThreadPool")
            .field("queue_size", &self.shared.capacity)
            .field("num_threads", &self.num_threads)
            .finish()
    }
}
