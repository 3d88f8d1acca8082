//! Cost parameters and the precondition gate that guards every derivation.

use clap::Args;

use crate::error::KdfError;
use crate::{
    DEFAULT_BLOCK_SIZE, DEFAULT_MEM_SIZE, DEFAULT_PARALLELISM, DEFAULT_REPETITIONS, MAX_BLOCK_SIZE,
    MAX_GARLIC, MAX_HASH_SIZE, MAX_INPUT_SIZE, MAX_MEM_SIZE, MAX_PARALLELISM, MAX_REPETITIONS,
    MIN_HASH_SIZE,
};

/// Cost parameters shared by every hashing entry point.
///
/// Garlic is deliberately not part of this struct: it is a property of a
/// stored hash (and grows over its lifetime), not of the cost profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Args)]
pub struct Params {
    /// Memory to fill, in MiB
    #[arg(long, default_value_t = DEFAULT_MEM_SIZE)]
    pub mem_size: u32,

    /// Length of one memory block in bytes
    #[arg(long, default_value_t = DEFAULT_BLOCK_SIZE)]
    pub block_size: u32,

    /// Number of worker threads
    #[arg(long, default_value_t = DEFAULT_PARALLELISM)]
    pub parallelism: u32,

    /// Extra multiply-mix rounds per block for CPU-bound hardening
    #[arg(long, default_value_t = DEFAULT_REPETITIONS)]
    pub repetitions: u32,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            mem_size: DEFAULT_MEM_SIZE,
            block_size: DEFAULT_BLOCK_SIZE,
            parallelism: DEFAULT_PARALLELISM,
            repetitions: DEFAULT_REPETITIONS,
        }
    }
}

/// Checks every size, range and overflow precondition before any memory is
/// allocated or any thread is spawned. Pure: on failure nothing has
/// happened yet and the call is fully recoverable.
pub(crate) fn verify_parameters(
    hash_size: usize,
    password_size: usize,
    salt_size: usize,
    data_size: Option<usize>,
    start_garlic: u8,
    stop_garlic: u8,
    params: &Params,
) -> Result<(), KdfError> {
    if hash_size < MIN_HASH_SIZE || hash_size > MAX_HASH_SIZE {
        return Err(KdfError::InvalidParameter("hash size out of range"));
    }
    if hash_size % 4 != 0 {
        return Err(KdfError::InvalidParameter(
            "hash size must be a multiple of 4",
        ));
    }
    if password_size == 0 || password_size > MAX_INPUT_SIZE {
        return Err(KdfError::InvalidParameter("password size out of range"));
    }
    if salt_size == 0 || salt_size > MAX_INPUT_SIZE {
        return Err(KdfError::InvalidParameter("salt size out of range"));
    }
    if let Some(data_size) = data_size {
        if data_size == 0 || data_size > MAX_INPUT_SIZE {
            return Err(KdfError::InvalidParameter("data size out of range"));
        }
    }
    if (params.block_size as usize) < hash_size || params.block_size > MAX_BLOCK_SIZE {
        return Err(KdfError::InvalidParameter("block size out of range"));
    }
    if params.block_size % 4 != 0 {
        return Err(KdfError::InvalidParameter(
            "block size must be a multiple of 4",
        ));
    }
    if params.mem_size == 0 || params.mem_size > MAX_MEM_SIZE {
        return Err(KdfError::InvalidParameter("memory size out of range"));
    }
    if start_garlic > stop_garlic {
        return Err(KdfError::InvalidParameter(
            "start garlic exceeds stop garlic",
        ));
    }
    if stop_garlic > MAX_GARLIC {
        return Err(KdfError::InvalidParameter("garlic out of range"));
    }
    if params.parallelism == 0 || params.parallelism > MAX_PARALLELISM {
        return Err(KdfError::InvalidParameter("parallelism out of range"));
    }
    if params.repetitions == 0 || params.repetitions > MAX_REPETITIONS {
        return Err(KdfError::InvalidParameter("repetitions out of range"));
    }
    if (params.mem_size as u64) << 20 < 4 * params.block_size as u64 * params.parallelism as u64 {
        return Err(KdfError::InvalidParameter(
            "memory too small for block size and parallelism",
        ));
    }
    // The total region at the top garlic level has to fit 64-bit math.
    let total_size = (params.mem_size as u64) << (20 + stop_garlic);
    if total_size >> (20 + stop_garlic) != params.mem_size as u64 {
        return Err(KdfError::InvalidParameter(
            "memory size overflows at stop garlic",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(hash_size: usize, garlic: u8, params: &Params) -> Result<(), KdfError> {
        verify_parameters(hash_size, 8, 4, None, 0, garlic, params)
    }

    #[test]
    fn default_parameters_pass() {
        check(32, 0, &Params::default()).unwrap();
    }

    #[test]
    fn hash_size_floor() {
        let params = Params::default();
        assert!(check(11, 0, &params).is_err());
        assert!(check(12, 0, &params).is_ok());
        assert!(check(1024, 0, &params).is_ok());
        assert!(check(1028, 0, &params).is_err());
        assert!(check(30, 0, &params).is_err());
    }

    #[test]
    fn garlic_ceiling() {
        let params = Params {
            mem_size: 1,
            ..Params::default()
        };
        assert!(check(32, 30, &params).is_ok());
        assert!(check(32, 31, &params).is_err());
        assert!(verify_parameters(32, 8, 4, None, 3, 2, &params).is_err());
    }

    #[test]
    fn block_size_must_be_word_aligned_and_hold_a_hash() {
        let mut params = Params::default();
        params.block_size = 4094;
        assert!(check(32, 0, &params).is_err());
        params.block_size = 28;
        assert!(check(32, 0, &params).is_err());
        params.block_size = 32;
        assert!(check(32, 0, &params).is_ok());
    }

    #[test]
    fn parallelism_and_repetitions_ranges() {
        let mut params = Params::default();
        params.parallelism = 0;
        assert!(check(32, 0, &params).is_err());
        params.parallelism = MAX_PARALLELISM + 1;
        assert!(check(32, 0, &params).is_err());

        params = Params::default();
        params.repetitions = 0;
        assert!(check(32, 0, &params).is_err());
        params.repetitions = MAX_REPETITIONS + 1;
        assert!(check(32, 0, &params).is_err());
    }

    #[test]
    fn memory_must_cover_the_partitions() {
        // 1 MiB cannot feed 1 MiB blocks across two threads.
        let params = Params {
            mem_size: 1,
            block_size: 1 << 20,
            parallelism: 2,
            repetitions: 1,
        };
        assert!(check(32, 0, &params).is_err());
    }

    #[test]
    fn total_size_overflow_is_rejected() {
        // 2^30 MiB at garlic 30 would shift past 64 bits.
        let params = Params {
            mem_size: MAX_MEM_SIZE,
            ..Params::default()
        };
        assert!(check(32, 30, &params).is_err());
        assert!(check(32, 0, &params).is_ok());
    }

    #[test]
    fn input_sizes() {
        let params = Params::default();
        assert!(verify_parameters(32, 0, 4, None, 0, 0, &params).is_err());
        assert!(verify_parameters(32, 8, 0, None, 0, 0, &params).is_err());
        assert!(verify_parameters(32, 8, 4, Some(0), 0, 0, &params).is_err());
        assert!(verify_parameters(32, 8, 4, Some(1025), 0, 0, &params).is_err());
        assert!(verify_parameters(32, 1025, 4, None, 0, 0, &params).is_err());
        assert!(verify_parameters(32, 8, 4, Some(16), 0, 0, &params).is_ok());
    }
}
