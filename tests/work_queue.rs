use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use cubes_engine::engine_state::task_management::{QueueSnapshot, WorkQueue, WorkerPool};

const TASKS: usize = 512;

#[test]
fn test_every_task_runs_exactly_once() {
    let queue = Arc::new(WorkQueue::<usize>::new(TASKS));
    let runs: Arc<Vec<AtomicUsize>> = Arc::new((0..TASKS).map(|_| AtomicUsize::new(0)).collect());

    let counter = runs.clone();
    let _pool = WorkerPool::new(
        4,
        queue.clone(),
        Arc::new(move |task: usize| {
            counter[task].fetch_add(1, Ordering::Relaxed);
        }),
    )
    .unwrap();

    for task in 0..TASKS {
        assert_eq!(queue.add_task(task), Ok(task));
    }
    queue.wait_until_idle();

    assert!(runs.iter().all(|count| count.load(Ordering::Relaxed) == 1));
    assert_eq!(
        queue.snapshot(),
        QueueSnapshot {
            task_count: TASKS,
            next_task: TASKS,
            completed_count: TASKS,
        }
    );
}

#[test]
fn test_counters_stay_ordered_while_workers_run() {
    let queue = Arc::new(WorkQueue::<usize>::new(TASKS));
    let _pool = WorkerPool::new(3, queue.clone(), Arc::new(|_: usize| std::thread::yield_now())).unwrap();

    for task in 0..TASKS {
        queue.add_task(task).unwrap();
        let snapshot = queue.snapshot();
        assert!(snapshot.completed_count <= snapshot.next_task);
        assert!(snapshot.next_task <= snapshot.task_count);
        assert!(snapshot.task_count <= queue.capacity());
    }

    queue.wait_and_clear();
    assert_eq!(
        queue.snapshot(),
        QueueSnapshot {
            task_count: 0,
            next_task: 0,
            completed_count: 0,
        }
    );
}

#[test]
fn test_queue_is_reusable_after_clear() {
    let queue = Arc::new(WorkQueue::<u8>::new(8));
    let done = Arc::new(AtomicUsize::new(0));

    let counter = done.clone();
    let _pool = WorkerPool::new(
        2,
        queue.clone(),
        Arc::new(move |_: u8| {
            counter.fetch_add(1, Ordering::Relaxed);
        }),
    )
    .unwrap();

    for round in 0..3 {
        for task in 0..8u8 {
            queue.add_task(task).unwrap();
        }
        assert!(queue.add_task(99).is_err());
        queue.wait_and_clear();
        assert_eq!(done.load(Ordering::Relaxed), (round + 1) * 8);
    }
}
