//! The record stored in the shared region

use crate::error::{RegionError, RegionResult};
use std::cell::UnsafeCell;
use std::mem::MaybeUninit;
use std::sync::atomic::{AtomicU64, Ordering, fence};

/// Magic number for validation ("CNTRD1")
pub const RECORD_MAGIC: u64 = 0x434E_5452_4431;

/// The single record living in the shared region, with cache-line alignment.
///
/// Layout invariants:
/// - `magic` is zero until initialization completes and is written last,
///   with Release ordering; attachers treat any other value than
///   [`RECORD_MAGIC`] as "not ready".
/// - `mutex` is a `PTHREAD_PROCESS_SHARED` mutex and is valid in every
///   process that maps the region.
/// - `counter` is read and written only while `mutex` is held.
#[repr(C, align(64))]
pub struct CounterRecord {
    /// Readiness / validation marker; written last during init
    magic: AtomicU64,
    /// Embedded process-shared mutex
    mutex: UnsafeCell<libc::pthread_mutex_t>,
    /// The shared counter, guarded by `mutex`
    counter: UnsafeCell<i64>,
}

impl CounterRecord {
    /// Initialize a record in place.
    ///
    /// # Safety
    ///
    /// `ptr` must point to zero-filled, writable memory of at least
    /// `size_of::<CounterRecord>()` bytes that no other process is
    /// initializing concurrently (guaranteed by exclusive creation).
    pub unsafe fn init(ptr: *mut CounterRecord) -> RegionResult<()> {
        unsafe {
            let mut attr = MaybeUninit::<libc::pthread_mutexattr_t>::uninit();
            let rc = libc::pthread_mutexattr_init(attr.as_mut_ptr());
            if rc != 0 {
                return Err(RegionError::MutexInit {
                    op: "pthread_mutexattr_init",
                    errno: rc,
                });
            }

            let rc = libc::pthread_mutexattr_setpshared(
                attr.as_mut_ptr(),
                libc::PTHREAD_PROCESS_SHARED,
            );
            if rc != 0 {
                libc::pthread_mutexattr_destroy(attr.as_mut_ptr());
                return Err(RegionError::MutexInit {
                    op: "pthread_mutexattr_setpshared",
                    errno: rc,
                });
            }

            let rc = libc::pthread_mutex_init((*ptr).mutex.get(), attr.as_ptr());
            libc::pthread_mutexattr_destroy(attr.as_mut_ptr());
            if rc != 0 {
                return Err(RegionError::MutexInit {
                    op: "pthread_mutex_init",
                    errno: rc,
                });
            }

            (*ptr).counter.get().write(0);

            // Publish: everything above must be visible before the magic.
            fence(Ordering::Release);
            (*ptr).magic.store(RECORD_MAGIC, Ordering::Release);
        }
        Ok(())
    }

    /// Whether initialization has completed
    pub fn is_ready(&self) -> bool {
        self.magic.load(Ordering::Acquire) == RECORD_MAGIC
    }

    /// Raw pointer to the embedded mutex
    pub fn mutex_ptr(&self) -> *mut libc::pthread_mutex_t {
        self.mutex.get()
    }

    /// Raw pointer to the counter. Callers must hold the mutex.
    pub fn counter_ptr(&self) -> *mut i64 {
        self.counter.get()
    }
}
