//! TigerKDF: memory-hard password hashing and key derivation.
//!
//! Derives fixed-length keys whose computation requires both CPU time and
//! RAM, with the RAM requirement resistant to time-memory trade-off
//! attacks. Each thread fills its memory partition in two passes: a
//! cache-timing-safe pass whose addressing depends only on block indices,
//! then a password-dependent pass whose unpredictable jump distances make
//! discarding memory expensive. An outer garlic loop doubles the memory
//! per level, so stored hashes can be escalated later without the
//! password.

mod addressing;
mod api;
mod block;
mod core;
mod error;
mod hasher;
mod params;
mod utils;
mod worker;

pub use api::{
    client_hash_password, hash_password, hash_password_encoded, phs, server_hash_password,
    simple_hash_password, update_password_hash, verify,
};
pub use error::KdfError;
pub use params::Params;

/// Version tag embedded in encoded hash strings.
pub const VERSION: u32 = 1;

pub const MIN_HASH_SIZE: usize = 12;

pub const MAX_HASH_SIZE: usize = 1024;

/// Upper bound on password, salt and associated-data lengths, in bytes.
pub const MAX_INPUT_SIZE: usize = 1024;

/// Largest supported memory size, in MiB.
pub const MAX_MEM_SIZE: u32 = 1 << 30;

pub const MAX_BLOCK_SIZE: u32 = 1 << 30;

/// Each garlic level doubles memory and time; 30 levels of doubling is the
/// most the size arithmetic supports.
pub const MAX_GARLIC: u8 = 30;

pub const MAX_PARALLELISM: u32 = 1 << 20;

pub const MAX_REPETITIONS: u32 = 1 << 30;

pub const DEFAULT_MEM_SIZE: u32 = 64;

pub const DEFAULT_BLOCK_SIZE: u32 = 4096;

pub const DEFAULT_PARALLELISM: u32 = 1;

pub const DEFAULT_REPETITIONS: u32 = 1;

/// Hash length used by the encoded-string convenience API.
pub const ENCODED_HASH_SIZE: usize = 32;

/// Salt length generated when the caller supplies none.
pub const GENERATED_SALT_SIZE: usize = 16;
