//! # Task Management System
//!
//! A bounded producer/consumer queue feeding a fixed pool of worker threads. The main
//! thread is the only producer; any number of workers consume.
//!
//! ## Architecture Overview
//!
//! - `WorkQueue`: fixed-capacity task array plus three monotonically increasing counters
//! - `CountingSemaphore`: where idle workers park until a task is added
//! - `WorkerPool`: the threads, each looping claim → process → complete
//! - `TaskProcessor`: the work done for each task
//!
//! ## The Three Counters
//!
//! - `task_count`: tasks submitted
//! - `next_task`: tasks claimed. A claim is a compare-and-increment, so exactly one worker
//!   wins each index and the counter never runs past `task_count`
//! - `completed_count`: tasks finished
//!
//! `0 ≤ completed_count ≤ next_task ≤ task_count ≤ capacity` holds at every observation
//! point; [`WorkQueue::snapshot`] returns a consistent view of all three.
//!
//! ## Clearing
//!
//! `clear_tasks` resets all three counters to zero without waiting for workers. Each
//! counter carries the queue's epoch in its upper 32 bits and clearing bumps the epoch.
//! A worker that claimed an index before the clear keeps running its task, but its
//! completion no longer counts, and it can never pick up a task submitted after the clear.
//!
//! ## Example Usage
//! ```rust
//! use std::sync::Arc;
//! use cubes_engine::engine_state::task_management::{WorkQueue, WorkerPool};
//!
//! let queue = Arc::new(WorkQueue::new(8));
//! let pool = WorkerPool::new(2, queue.clone(), Arc::new(|n: u32| assert!(n < 8))).unwrap();
//! for n in 0..8u32 {
//!     queue.add_task(n).unwrap();
//! }
//! queue.wait_and_clear();
//! drop(pool);
//! ```

pub mod semaphore;
pub mod task;
pub mod worker_pool;

use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Condvar, Mutex, PoisonError,
    },
    time::Duration,
};

pub use semaphore::CountingSemaphore;
pub use task::TaskProcessor;
pub use worker_pool::WorkerPool;

const COUNTER_BITS: u32 = 32;
const COUNTER_MASK: u64 = (1 << COUNTER_BITS) - 1;

/// How long `wait_and_clear` sleeps between re-checks if a wakeup is missed.
const IDLE_POLL_INTERVAL: Duration = Duration::from_millis(5);

fn pack(epoch: u32, count: usize) -> u64 {
    ((epoch as u64) << COUNTER_BITS) | (count as u64 & COUNTER_MASK)
}

fn unpack(word: u64) -> (u32, usize) {
    ((word >> COUNTER_BITS) as u32, (word & COUNTER_MASK) as usize)
}

/// Proof of a claim, handed back to `set_task_completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskReceipt {
    /// Index of the task in the queue's array.
    pub index: usize,
    epoch: u32,
}

/// A task won by a worker.
pub struct ClaimedTask<T> {
    pub receipt: TaskReceipt,
    pub task: T,
}

/// A consistent reading of the three counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueSnapshot {
    pub task_count: usize,
    pub next_task: usize,
    pub completed_count: usize,
}

struct QueuedTask<T> {
    epoch: u32,
    task: T,
}

/// Bounded three-counter work queue.
pub struct WorkQueue<T> {
    tasks: Box<[Mutex<Option<QueuedTask<T>>>]>,
    task_count: AtomicU64,
    next_task: AtomicU64,
    completed_count: AtomicU64,
    signal: CountingSemaphore,
    idle_lock: Mutex<()>,
    idle: Condvar,
}

impl<T: Send> WorkQueue<T> {
    /// Creates an empty queue that can hold `capacity` tasks between clears.
    pub fn new(capacity: usize) -> Self {
        Self {
            tasks: (0..capacity).map(|_| Mutex::new(None)).collect(),
            task_count: AtomicU64::new(0),
            next_task: AtomicU64::new(0),
            completed_count: AtomicU64::new(0),
            signal: CountingSemaphore::new(0),
            idle_lock: Mutex::new(()),
            idle: Condvar::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.tasks.len()
    }

    /// Appends a task and wakes one waiting worker.
    ///
    /// Must only be called from the single producer thread.
    ///
    /// # Returns
    /// The task's index, or the task itself if the queue is full
    pub fn add_task(&self, task: T) -> Result<usize, T> {
        let (epoch, index) = unpack(self.task_count.load(Ordering::Acquire));
        if index >= self.capacity() {
            return Err(task);
        }

        *self.tasks[index]
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(QueuedTask { epoch, task });
        self.task_count.store(pack(epoch, index + 1), Ordering::Release);
        self.signal.release(1);
        Ok(index)
    }

    /// Claims the next unclaimed task, if there is one.
    ///
    /// Never blocks. Each index of the current epoch is handed to exactly one caller.
    pub fn get_next_task(&self) -> Option<ClaimedTask<T>> {
        loop {
            let claimed = self.next_task.load(Ordering::Acquire);
            let (claim_epoch, next) = unpack(claimed);
            let (count_epoch, count) = unpack(self.task_count.load(Ordering::Acquire));
            if claim_epoch != count_epoch || next >= count {
                return None;
            }

            if self
                .next_task
                .compare_exchange_weak(
                    claimed,
                    pack(claim_epoch, next + 1),
                    Ordering::AcqRel,
                    Ordering::Acquire,
                )
                .is_err()
            {
                continue;
            }

            let mut slot = self.tasks[next]
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            match slot.take() {
                Some(queued) if queued.epoch == claim_epoch => {
                    return Some(ClaimedTask {
                        receipt: TaskReceipt {
                            index: next,
                            epoch: claim_epoch,
                        },
                        task: queued.task,
                    });
                }
                // Cleared and refilled between our claim and this lock; leave the newer task
                // for its own claimant.
                other => *slot = other,
            }
        }
    }

    /// Records a finished task.
    ///
    /// # Returns
    /// `false` if the queue was cleared after the task was claimed; the completion is
    /// then not counted.
    pub fn set_task_completed(&self, receipt: TaskReceipt) -> bool {
        let mut current = self.completed_count.load(Ordering::Acquire);
        loop {
            let (epoch, completed) = unpack(current);
            if epoch != receipt.epoch {
                return false;
            }
            match self.completed_count.compare_exchange_weak(
                current,
                pack(epoch, completed + 1),
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => break,
                Err(actual) => current = actual,
            }
        }

        if !self.work_still_in_progress() {
            let _guard = self.idle_lock.lock().unwrap_or_else(PoisonError::into_inner);
            self.idle.notify_all();
        }
        true
    }

    /// Resets all three counters to zero. Tasks already claimed keep running.
    ///
    /// Must only be called from the producer thread.
    pub fn clear_tasks(&self) {
        let (epoch, _) = unpack(self.task_count.load(Ordering::Acquire));
        let next_epoch = epoch.wrapping_add(1);
        // task_count first: a claimer that sees the new epoch here cannot pair it with an
        // old next_task.
        self.task_count.store(pack(next_epoch, 0), Ordering::Release);
        self.next_task.store(pack(next_epoch, 0), Ordering::Release);
        self.completed_count.store(pack(next_epoch, 0), Ordering::Release);
    }

    /// Reads the three counters as of a single epoch.
    pub fn snapshot(&self) -> QueueSnapshot {
        loop {
            let (completed_epoch, completed_count) =
                unpack(self.completed_count.load(Ordering::Acquire));
            let (next_epoch, next_task) = unpack(self.next_task.load(Ordering::Acquire));
            let (count_epoch, task_count) = unpack(self.task_count.load(Ordering::Acquire));
            if completed_epoch == next_epoch && next_epoch == count_epoch {
                return QueueSnapshot {
                    task_count,
                    next_task,
                    completed_count,
                };
            }
        }
    }

    /// Whether some submitted task has not completed yet.
    pub fn work_still_in_progress(&self) -> bool {
        let snapshot = self.snapshot();
        snapshot.completed_count < snapshot.task_count
    }

    /// Blocks until every submitted task has completed, then clears the queue.
    pub fn wait_and_clear(&self) {
        self.wait_until_idle();
        self.clear_tasks();
    }

    /// Blocks until every submitted task has completed. The counters are left untouched.
    pub fn wait_until_idle(&self) {
        let mut guard = self.idle_lock.lock().unwrap_or_else(PoisonError::into_inner);
        while self.work_still_in_progress() {
            guard = self
                .idle
                .wait_timeout(guard, IDLE_POLL_INTERVAL)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
    }

    /// Parks the calling worker until a task is signalled.
    pub fn wait_for_work(&self) {
        self.signal.acquire();
    }

    /// Wakes `count` parked workers without adding a task.
    pub fn wake_workers(&self, count: usize) {
        self.signal.release(count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_follow_submission_order() {
        let queue = WorkQueue::new(4);
        queue.add_task("a").unwrap();
        queue.add_task("b").unwrap();

        let first = queue.get_next_task().unwrap();
        let second = queue.get_next_task().unwrap();
        assert_eq!((first.receipt.index, first.task), (0, "a"));
        assert_eq!((second.receipt.index, second.task), (1, "b"));
        assert!(queue.get_next_task().is_none());

        let snapshot = queue.snapshot();
        assert_eq!(snapshot.task_count, 2);
        assert_eq!(snapshot.next_task, 2);
        assert_eq!(snapshot.completed_count, 0);
        assert!(queue.work_still_in_progress());

        assert!(queue.set_task_completed(second.receipt));
        assert!(queue.set_task_completed(first.receipt));
        assert!(!queue.work_still_in_progress());
    }

    #[test]
    fn test_full_queue_returns_the_task() {
        let queue = WorkQueue::new(1);
        assert_eq!(queue.add_task(1), Ok(0));
        assert_eq!(queue.add_task(2), Err(2));
        assert_eq!(queue.snapshot().task_count, 1);
    }

    #[test]
    fn test_clear_discards_stale_completion() {
        let queue = WorkQueue::new(4);
        queue.add_task(10).unwrap();
        let stale = queue.get_next_task().unwrap();

        queue.clear_tasks();
        assert_eq!(
            queue.snapshot(),
            QueueSnapshot {
                task_count: 0,
                next_task: 0,
                completed_count: 0
            }
        );

        queue.add_task(20).unwrap();
        assert!(!queue.set_task_completed(stale.receipt));
        assert_eq!(queue.snapshot().completed_count, 0);

        let fresh = queue.get_next_task().unwrap();
        assert_eq!(fresh.task, 20);
        assert!(queue.set_task_completed(fresh.receipt));
        assert_eq!(queue.snapshot().completed_count, 1);
    }

    #[test]
    fn test_unclaimed_tasks_vanish_on_clear() {
        let queue = WorkQueue::new(4);
        queue.add_task(1).unwrap();
        queue.add_task(2).unwrap();
        queue.clear_tasks();
        assert!(queue.get_next_task().is_none());
        assert!(!queue.work_still_in_progress());
    }

    #[test]
    fn test_wait_and_clear_returns_immediately_when_idle() {
        let queue: WorkQueue<u8> = WorkQueue::new(2);
        queue.wait_and_clear();
        assert_eq!(queue.snapshot().task_count, 0);
    }
}
