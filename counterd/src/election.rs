//! Process role election.
//!
//! The role is decided once, at startup, by racing to create the named
//! region: the filesystem's exclusive-create atomicity guarantees exactly
//! one winner regardless of how many processes race. The role never
//! changes for a process's lifetime.

use counterd_shm::{CounterRegion, RegionError, RegionResult, platform};
use tracing::info;

/// Role of a process with respect to the shared region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Created the region; owns teardown
    Master,
    /// Attached to an existing region
    Slave,
}

impl Role {
    /// Tag used in event-log lines
    pub fn tag(self) -> &'static str {
        match self {
            Role::Master => "MASTER",
            Role::Slave => "SLAVE",
        }
    }
}

/// Decide this process's role.
///
/// Winning the exclusive create makes this process the master, with the
/// record zero-initialized. Losing because the region already exists makes
/// it a slave, attached without touching the contents. Every other failure
/// is returned as-is and is fatal to the caller: there is no safe state
/// without a mapped region.
pub fn elect(name: &str) -> RegionResult<(Role, CounterRegion)> {
    match CounterRegion::create_exclusive(name) {
        Ok(region) => {
            info!(
                "process {} created region '{name}', acting as master",
                platform::current_pid()
            );
            Ok((Role::Master, region))
        }
        Err(RegionError::AlreadyExists { .. }) => {
            let region = CounterRegion::attach(name)?;
            info!(
                "process {} attached to region '{name}' as slave",
                platform::current_pid()
            );
            Ok((Role::Slave, region))
        }
        Err(e) => Err(e),
    }
}
