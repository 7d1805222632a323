//! # Task System Core Traits
//!
//! A task is a small plain-data record sitting in the work queue. The work itself is done by
//! a `TaskProcessor`, which is shared by every worker thread and owns whatever handles the
//! work needs (chunk slots, noise fields).
//!
//! ## Task Lifecycle
//! 1. The main thread stores a task with `WorkQueue::add_task`
//! 2. A worker wins the task's index with `WorkQueue::get_next_task`
//! 3. The worker hands the task to `TaskProcessor::process`
//! 4. The worker reports `WorkQueue::set_task_completed`
//!
//! ## Thread Safety
//! - Tasks must be `Send` to move from the queue to a worker
//! - Processors must be `Send + Sync`; they are called from every worker concurrently
//! - Processors publish their results through shared state (for chunks: the slot lock and
//!   its upload flag), never by calling back into the main thread

/// Executes tasks of type `T` on worker threads.
pub trait TaskProcessor<T>: Send + Sync {
    /// Performs one task. Runs on a worker thread and must not touch GPU state.
    fn process(&self, task: T);
}

impl<T, F> TaskProcessor<T> for F
where
    F: Fn(T) + Send + Sync,
{
    fn process(&self, task: T) {
        self(task)
    }
}
