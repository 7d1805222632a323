use std::sync::{Condvar, Mutex, PoisonError};

/// A counting semaphore built from a mutex-guarded permit count and a condition variable.
///
/// Each `release` adds permits; each `acquire` blocks until it can take one. Idle workers
/// park here, so this is the only place a worker thread ever blocks.
#[derive(Default)]
pub struct CountingSemaphore {
    permits: Mutex<usize>,
    available: Condvar,
}

impl CountingSemaphore {
    pub fn new(permits: usize) -> Self {
        Self {
            permits: Mutex::new(permits),
            available: Condvar::new(),
        }
    }

    /// Blocks until a permit is available, then takes it.
    pub fn acquire(&self) {
        let mut permits = self.permits.lock().unwrap_or_else(PoisonError::into_inner);
        while *permits == 0 {
            permits = self
                .available
                .wait(permits)
                .unwrap_or_else(PoisonError::into_inner);
        }
        *permits -= 1;
    }

    /// Takes a permit if one is available without blocking.
    #[cfg(test)]
    pub fn try_acquire(&self) -> bool {
        let mut permits = self.permits.lock().unwrap_or_else(PoisonError::into_inner);
        if *permits == 0 {
            return false;
        }
        *permits -= 1;
        true
    }

    /// Adds `count` permits and wakes that many waiters.
    pub fn release(&self, count: usize) {
        let mut permits = self.permits.lock().unwrap_or_else(PoisonError::into_inner);
        *permits += count;
        drop(permits);
        if count == 1 {
            self.available.notify_one();
        } else {
            self.available.notify_all();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, thread};

    use super::*;

    #[test]
    fn test_permits_are_counted() {
        let semaphore = CountingSemaphore::new(0);
        assert!(!semaphore.try_acquire());
        semaphore.release(2);
        assert!(semaphore.try_acquire());
        assert!(semaphore.try_acquire());
        assert!(!semaphore.try_acquire());
    }

    #[test]
    fn test_acquire_wakes_on_release() {
        let semaphore = Arc::new(CountingSemaphore::new(0));
        let waiter = {
            let semaphore = semaphore.clone();
            thread::spawn(move || semaphore.acquire())
        };
        semaphore.release(1);
        waiter.join().unwrap();
        assert!(!semaphore.try_acquire());
    }
}
