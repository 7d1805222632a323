//! Fixed-size pool of worker threads draining a `WorkQueue`.

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread::{self, JoinHandle},
};

use log::{debug, info};

use super::{ClaimedTask, TaskProcessor, WorkQueue};
use crate::core::EngineError;

/// Owns the worker threads. Dropping the pool stops and joins them.
///
/// Each worker loops: claim the next task, process it, mark it completed; when nothing is
/// claimable it parks on the queue's semaphore. Completion order across workers is
/// unordered.
pub struct WorkerPool<T: Send + 'static> {
    queue: Arc<WorkQueue<T>>,
    stop: Arc<AtomicBool>,
    workers: Vec<JoinHandle<()>>,
}

impl<T: Send + 'static> WorkerPool<T> {
    /// Spawns `worker_count` threads.
    ///
    /// # Arguments
    /// * `worker_count` - Number of threads, fixed for the life of the pool
    /// * `queue` - Queue the workers drain
    /// * `processor` - Work performed for each claimed task
    pub fn new<P>(
        worker_count: usize,
        queue: Arc<WorkQueue<T>>,
        processor: Arc<P>,
    ) -> Result<Self, EngineError>
    where
        P: TaskProcessor<T> + 'static,
    {
        info!(
            "Starting {} chunk workers (available parallelism: {:?})",
            worker_count,
            thread::available_parallelism()
        );

        let stop = Arc::new(AtomicBool::new(false));
        let mut workers = Vec::with_capacity(worker_count);

        for worker_index in 0..worker_count {
            let queue = queue.clone();
            let processor = processor.clone();
            let stop = stop.clone();

            let worker = thread::Builder::new()
                .name(format!("chunk-worker-{worker_index}"))
                .spawn(move || {
                    while !stop.load(Ordering::Acquire) {
                        match queue.get_next_task() {
                            Some(ClaimedTask { receipt, task }) => {
                                processor.process(task);
                                if !queue.set_task_completed(receipt) {
                                    debug!(
                                        "Task {} finished after its queue generation was cleared",
                                        receipt.index
                                    );
                                }
                            }
                            None => queue.wait_for_work(),
                        }
                    }
                })
                .map_err(|source| EngineError::WorkerSpawn { source })?;

            workers.push(worker);
        }

        Ok(Self {
            queue,
            stop,
            workers,
        })
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }
}

impl<T: Send + 'static> Drop for WorkerPool<T> {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Release);
        self.queue.wake_workers(self.workers.len());
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}
