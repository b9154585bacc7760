//! Linux-specific mapping helpers

use crate::error::{RegionError, RegionResult};
use memmap2::{MmapMut, MmapOptions};
use nix::unistd::getpid;
use std::fs::{File, OpenOptions};
use std::io;
use std::os::unix::fs::OpenOptionsExt;
use std::path::PathBuf;

/// Prefix for all region files under /dev/shm
const REGION_PREFIX: &str = "counterd_";

/// Backing file path for a named region
pub fn region_path(name: &str) -> PathBuf {
    PathBuf::from(format!("/dev/shm/{REGION_PREFIX}{name}"))
}

/// Create the backing file with exclusive semantics and map it.
///
/// `create_new` is the `O_CREAT | O_EXCL` primitive the role election
/// relies on: when two processes race, the filesystem guarantees exactly
/// one observes success.
pub fn create_region_mmap(path: &std::path::Path, size: usize) -> RegionResult<MmapMut> {
    let file = match OpenOptions::new()
        .create_new(true)
        .read(true)
        .write(true)
        .mode(0o600) // Owner read/write only
        .open(path)
    {
        Ok(f) => f,
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            return Err(RegionError::AlreadyExists {
                name: path.display().to_string(),
            });
        }
        Err(e) => return Err(e.into()),
    };

    file.set_len(size as u64)?;

    let mmap = unsafe { MmapOptions::new().map_mut(&file)? };
    Ok(mmap)
}

/// Open an existing backing file without touching its contents
pub fn open_region_file(path: &std::path::Path) -> RegionResult<File> {
    match OpenOptions::new().read(true).write(true).open(path) {
        Ok(f) => Ok(f),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(RegionError::NotFound {
            name: path.display().to_string(),
        }),
        Err(e) => Err(e.into()),
    }
}

/// Map an already-open backing file
pub fn attach_region_mmap(file: &File) -> RegionResult<MmapMut> {
    let mmap = unsafe { MmapOptions::new().map_mut(file)? };
    Ok(mmap)
}

/// Get current process ID
pub fn current_pid() -> u32 {
    getpid().as_raw() as u32
}
