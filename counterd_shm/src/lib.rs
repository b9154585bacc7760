//! # Shared Counter Region
//!
//! A named, fixed-size shared-memory region holding one mutable record: a
//! signed 64-bit counter plus an embedded `PTHREAD_PROCESS_SHARED` mutex.
//! The region backs the counterd coordinator's cross-process state:
//!
//! - **Exclusive create or attach**: whichever process wins the
//!   `O_CREAT | O_EXCL` race creates and zero-initializes the record; every
//!   other process maps the existing region without re-initializing it.
//! - **Owner teardown**: the creating handle unlinks the backing file on
//!   drop; attached handles never do, regardless of exit order.
//! - **Guarded access**: [`CounterLock`] is the only access path to the
//!   counter. Acquisition blocks indefinitely; release happens on every
//!   exit path, including unwinding.
//!
//! ```no_run
//! use counterd_shm::CounterRegion;
//!
//! # fn main() -> Result<(), counterd_shm::RegionError> {
//! let region = match CounterRegion::create_exclusive("demo") {
//!     Ok(region) => region, // this process is the creator
//!     Err(counterd_shm::RegionError::AlreadyExists { .. }) => {
//!         CounterRegion::attach("demo")?
//!     }
//!     Err(e) => return Err(e),
//! };
//!
//! let value = region.with_lock(|counter| {
//!     *counter += 1;
//!     *counter
//! })?;
//! # Ok(())
//! # }
//! ```
//!
//! Linux only: the region is a file under `/dev/shm` mapped with `memmap2`,
//! and the embedded mutex is a raw pthread mutex initialized in place.

#![deny(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod platform;
pub mod record;
pub mod region;

pub use error::{RegionError, RegionResult};
pub use record::{CounterRecord, RECORD_MAGIC};
pub use region::{CounterLock, CounterRegion};
