//! Error types for shared region operations

use thiserror::Error;

/// Errors that can occur during shared region operations
#[derive(Error, Debug)]
pub enum RegionError {
    /// Region already exists
    #[error("Region already exists: {name}")]
    AlreadyExists {
        /// Region name
        name: String,
    },

    /// Region not found
    #[error("Region not found: {name}")]
    NotFound {
        /// Region name
        name: String,
    },

    /// Region exists but its record has not been initialized yet
    #[error("Region not initialized: {name}")]
    NotReady {
        /// Region name
        name: String,
    },

    /// Process-shared mutex initialization failed
    #[error("Mutex initialization failed: {op} returned errno {errno}")]
    MutexInit {
        /// The pthread call that failed
        op: &'static str,
        /// Returned error number
        errno: i32,
    },

    /// Mutex acquisition failed (an actual error, not contention)
    #[error("Mutex lock failed: errno {errno}")]
    Lock {
        /// Returned error number
        errno: i32,
    },

    /// IO error
    #[error("IO error: {source}")]
    Io {
        /// Source IO error
        #[from]
        source: std::io::Error,
    },
}

/// Result type for shared region operations
pub type RegionResult<T> = Result<T, RegionError>;
