use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, TryLockError};

/// A thread-safe, reference-counted resource container with read-write locking.
///
/// `MtResource` provides synchronized access to a value of type `T` that can be shared
/// across threads. It uses an `Arc<RwLock<T>>` internally. Chunk slots are stored this way:
/// worker threads take the write lock while regenerating a chunk, while the main thread
/// polls with the non-blocking `try_get`/`try_get_mut` variants so the render loop never
/// stalls behind a worker.
///
/// # Type Parameters
/// - `T`: The type of the contained resource, must be `Send + Sync`
///
/// # Examples
///
/// ## Sharing Between Threads
/// ```
/// # use std::thread;
/// use cubes_engine::core::MtResource;
///
/// let counter = MtResource::new(0);
/// let counter_clone = counter.clone();
///
/// let handle = thread::spawn(move || {
///     *counter_clone.get_mut() += 1;
/// });
///
/// handle.join().unwrap();
/// assert_eq!(*counter.get(), 1);
/// ```
///
/// ## Polling Without Blocking
/// ```
/// use cubes_engine::core::MtResource;
///
/// let resource = MtResource::new(5);
/// let writer = resource.get_mut();
/// assert!(resource.try_get().is_none());
/// drop(writer);
/// assert_eq!(*resource.try_get().unwrap(), 5);
/// ```
pub struct MtResource<T: Send + Sync> {
    pub resource: Arc<RwLock<T>>,
}

impl<T: Send + Sync + 'static> MtResource<T> {
    /// Creates a new `MtResource` containing the given value.
    ///
    /// # Arguments
    /// * `resource` - The value to be stored in the resource
    ///
    /// # Returns
    /// A new `MtResource` containing the provided value
    pub fn new(resource: T) -> Self {
        Self {
            resource: Arc::new(RwLock::new(resource)),
        }
    }

    /// Returns a read-only guard that allows reading the contained value.
    ///
    /// A poisoned lock is recovered; chunk data is plain voxels and stays valid.
    pub fn get(&self) -> RwLockReadGuard<'_, T> {
        self.resource.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns a mutable guard that allows modifying the contained value.
    pub fn get_mut(&self) -> RwLockWriteGuard<'_, T> {
        self.resource.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Attempts to take a read guard without blocking.
    ///
    /// # Returns
    /// `None` while another thread holds the write lock. A poisoned lock is recovered.
    pub fn try_get(&self) -> Option<RwLockReadGuard<'_, T>> {
        match self.resource.try_read() {
            Ok(guard) => Some(guard),
            Err(TryLockError::Poisoned(poisoned)) => Some(poisoned.into_inner()),
            Err(TryLockError::WouldBlock) => None,
        }
    }

    /// Attempts to take a write guard without blocking.
    ///
    /// # Returns
    /// `None` while any other guard is alive. A poisoned lock is recovered.
    pub fn try_get_mut(&self) -> Option<RwLockWriteGuard<'_, T>> {
        match self.resource.try_write() {
            Ok(guard) => Some(guard),
            Err(TryLockError::Poisoned(poisoned)) => Some(poisoned.into_inner()),
            Err(TryLockError::WouldBlock) => None,
        }
    }
}

impl<T: Send + Sync> Clone for MtResource<T> {
    fn clone(&self) -> Self {
        Self {
            resource: self.resource.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    #[test]
    fn test_panicked_writer_does_not_lock_out_pollers() {
        let resource = MtResource::new(1u32);
        let writer = {
            let resource = resource.clone();
            thread::spawn(move || {
                let mut value = resource.get_mut();
                *value = 2;
                panic!("worker died mid-write");
            })
        };
        assert!(writer.join().is_err());

        assert_eq!(*resource.try_get().unwrap(), 2);
        *resource.try_get_mut().unwrap() = 3;
        assert_eq!(*resource.get(), 3);
    }

    #[test]
    fn test_poll_fails_while_write_guard_is_held() {
        let resource = MtResource::new(0u32);
        let guard = resource.get_mut();
        assert!(resource.try_get().is_none());
        assert!(resource.try_get_mut().is_none());
        drop(guard);
        assert!(resource.try_get_mut().is_some());
    }
}
