//! Region lifecycle and the counter lock guard

use crate::error::{RegionError, RegionResult};
use crate::platform;
use crate::record::CounterRecord;
use memmap2::MmapMut;
use std::mem;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

/// How many times `attach` re-checks a region whose creator is still
/// initializing, and how long it waits between checks.
const ATTACH_RETRIES: u32 = 100;
const ATTACH_RETRY_DELAY: Duration = Duration::from_millis(1);

/// A named shared-memory region holding one [`CounterRecord`].
///
/// The process that wins the exclusive create owns the region: its handle
/// unlinks the backing file on drop. Attached handles never unlink, even
/// if they are dropped first. The region's lifetime is bounded by the
/// name, not by any single process.
pub struct CounterRegion {
    name: String,
    path: PathBuf,
    mmap: MmapMut,
    owner: bool,
}

impl CounterRegion {
    /// Create the named region with exclusive semantics and initialize its
    /// record (counter zero, mutex ready).
    ///
    /// Fails with [`RegionError::AlreadyExists`] if another process created
    /// the region first; any other error leaves no partial region behind.
    pub fn create_exclusive(name: &str) -> RegionResult<Self> {
        let path = platform::region_path(name);
        let mut mmap = match platform::create_region_mmap(&path, mem::size_of::<CounterRecord>()) {
            Ok(m) => m,
            Err(RegionError::AlreadyExists { .. }) => {
                return Err(RegionError::AlreadyExists {
                    name: name.to_string(),
                });
            }
            Err(e) => return Err(e),
        };

        if let Err(e) = unsafe { CounterRecord::init(mmap.as_mut_ptr() as *mut CounterRecord) } {
            // Do not leave a half-initialized region behind the name.
            let _ = std::fs::remove_file(&path);
            return Err(e);
        }

        debug!(region = name, path = %path.display(), "region created");
        Ok(Self {
            name: name.to_string(),
            path,
            mmap,
            owner: true,
        })
    }

    /// Attach to an existing region without touching its contents.
    ///
    /// The exclusive create is atomic, but an attacher can open the backing
    /// file before the creator has sized it or published the record, so the
    /// size and magic checks are retried briefly before giving up.
    pub fn attach(name: &str) -> RegionResult<Self> {
        let path = platform::region_path(name);

        for _ in 0..ATTACH_RETRIES {
            match Self::try_attach(name, &path) {
                Err(RegionError::NotReady { .. }) => thread::sleep(ATTACH_RETRY_DELAY),
                other => return other,
            }
        }

        Err(RegionError::NotReady {
            name: name.to_string(),
        })
    }

    fn try_attach(name: &str, path: &Path) -> RegionResult<Self> {
        let file = platform::open_region_file(path)?;

        if (file.metadata()?.len() as usize) < mem::size_of::<CounterRecord>() {
            return Err(RegionError::NotReady {
                name: name.to_string(),
            });
        }

        let mmap = platform::attach_region_mmap(&file)?;

        let record = unsafe { &*(mmap.as_ptr() as *const CounterRecord) };
        if !record.is_ready() {
            return Err(RegionError::NotReady {
                name: name.to_string(),
            });
        }

        debug!(region = name, "region attached");
        Ok(Self {
            name: name.to_string(),
            path: path.to_path_buf(),
            mmap,
            owner: false,
        })
    }

    /// Remove a named region's backing file without mapping it.
    ///
    /// For clearing a stale region left by a crashed owner.
    pub fn unlink(name: &str) -> RegionResult<()> {
        let path = platform::region_path(name);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(RegionError::NotFound {
                name: name.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    /// Region name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this handle created (and will unlink) the region
    pub fn is_owner(&self) -> bool {
        self.owner
    }

    fn record(&self) -> &CounterRecord {
        unsafe { &*(self.mmap.as_ptr() as *const CounterRecord) }
    }

    /// Acquire the cross-process mutex, blocking indefinitely.
    ///
    /// The returned guard is the only access path to the counter and
    /// releases the mutex on every exit path, including unwinding. A
    /// nonzero return from `pthread_mutex_lock` is an actual error (not
    /// contention) and is reported without acquiring.
    pub fn lock(&self) -> RegionResult<CounterLock<'_>> {
        let rc = unsafe { libc::pthread_mutex_lock(self.record().mutex_ptr()) };
        if rc != 0 {
            return Err(RegionError::Lock { errno: rc });
        }
        Ok(CounterLock { region: self })
    }

    /// Scoped read-modify-write of the counter.
    ///
    /// Applies `f` to the current value and writes the result back before
    /// releasing. If acquisition fails the mutation is skipped and the
    /// error is returned; the caller must not assume the counter changed.
    pub fn with_lock<R>(&self, f: impl FnOnce(&mut i64) -> R) -> RegionResult<R> {
        let mut guard = self.lock()?;
        let mut value = guard.get();
        let out = f(&mut value);
        guard.set(value);
        Ok(out)
    }
}

impl Drop for CounterRegion {
    fn drop(&mut self) {
        if self.owner {
            match std::fs::remove_file(&self.path) {
                Ok(()) => debug!(region = %self.name, "region unlinked"),
                Err(e) => warn!(region = %self.name, "failed to unlink region: {e}"),
            }
        }
    }
}

/// Scoped exclusive access to the shared counter.
///
/// Holds the region's process-shared mutex; `get`/`set` are the only
/// counter accessors in the crate. Dropping the guard releases the mutex.
pub struct CounterLock<'a> {
    region: &'a CounterRegion,
}

impl CounterLock<'_> {
    /// Read the counter
    pub fn get(&self) -> i64 {
        unsafe { *self.region.record().counter_ptr() }
    }

    /// Write the counter
    pub fn set(&mut self, value: i64) {
        unsafe { *self.region.record().counter_ptr() = value }
    }
}

impl Drop for CounterLock<'_> {
    fn drop(&mut self) {
        let rc = unsafe { libc::pthread_mutex_unlock(self.region.record().mutex_ptr()) };
        if rc != 0 {
            warn!(errno = rc, "pthread_mutex_unlock failed");
        }
    }
}
