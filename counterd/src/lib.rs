//! # counterd Library
//!
//! Cross-process shared-counter coordinator. One process wins the race to
//! create the named shared region and becomes the master: it drives the
//! counter on a fast tick, logs status, and periodically spawns worker
//! copies of its own executable, throttled so at most one worker per mode
//! is ever outstanding. Every other instance attaches as a slave; worker
//! copies apply a single counter operation and exit.
//!
//! All counter access, in every process, goes through
//! [`counterd_shm::CounterRegion`]'s lock guard; the shared event log is
//! serialized by the same cross-process mutex.

#![warn(clippy::all)]

pub mod consts;
pub mod election;
pub mod logger;
pub mod scheduler;
pub mod spawner;
pub mod tracker;
pub mod worker;
