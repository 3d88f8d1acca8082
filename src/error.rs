use std::io;

use thiserror::Error;

/// Failures a derivation can report.
///
/// Hashing is all-or-nothing: none of these leave partial output behind,
/// and none are retried internally. On any error the caller must treat its
/// output buffer as undefined.
#[derive(Debug, Error)]
pub enum KdfError {
    /// A parameter failed the precondition checks. Nothing was allocated
    /// and no work was started.
    #[error("invalid parameter: {0}")]
    InvalidParameter(&'static str),

    /// The hashing region could not be allocated.
    #[error("failed to allocate {bytes} bytes of hashing memory")]
    Allocation { bytes: u64 },

    /// A worker thread could not be spawned.
    #[error("failed to spawn worker thread: {0}")]
    ThreadSpawn(#[from] io::Error),

    /// A worker thread panicked mid-derivation.
    #[error("worker thread panicked")]
    WorkerPanic,
}
