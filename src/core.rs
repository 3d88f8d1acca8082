//! The garlic-level orchestrator.
//!
//! Owns the flat memory region, runs the two fork-join worker phases per
//! garlic level, folds each thread's final block back into the hash state
//! and re-keys between levels. Parameters are assumed to have passed
//! [`crate::params::verify_parameters`] already.

use std::thread;

use tracing::debug;
use zeroize::Zeroize;

use crate::error::KdfError;
use crate::hasher::keyed_hash;
use crate::params::Params;
use crate::utils::encode_be32;
use crate::worker::{self, ThreadContext};

pub(crate) struct TigerKdfCore {
    mem_size: u32,
    block_len: usize,
    parallelism: u32,
    repetitions: u32,
    start_garlic: u8,
    stop_garlic: u8,
    skip_last_hash: bool,
}

impl TigerKdfCore {
    pub(crate) fn new(
        params: &Params,
        start_garlic: u8,
        stop_garlic: u8,
        skip_last_hash: bool,
    ) -> Self {
        debug_assert!(start_garlic <= stop_garlic);
        Self {
            mem_size: params.mem_size,
            block_len: (params.block_size / 4) as usize,
            parallelism: params.parallelism,
            repetitions: params.repetitions,
            start_garlic,
            stop_garlic,
            skip_last_hash,
        }
    }

    /// Runs every garlic level in `start_garlic..=stop_garlic`, mutating
    /// `hash` in place. `hash` length must be the validated hash size.
    ///
    /// The region is allocated once at the size of the top level; each
    /// level uses a prefix of it. Output is a pure function of the hash
    /// state and the parameters.
    pub(crate) fn run(&self, hash: &mut [u8]) -> Result<(), KdfError> {
        let parallelism = self.parallelism as usize;
        let mem_words = ((self.mem_size as u64) << 20) / 4;
        let mut num_blocks: u64 =
            (mem_words / (2 * self.parallelism as u64 * self.block_len as u64))
                << self.start_garlic;
        let total_words = (2 * self.parallelism as u64 * num_blocks * self.block_len as u64)
            << (self.stop_garlic - self.start_garlic);

        let mut mem = allocate_region(total_words)?;
        debug!(
            bytes = total_words * 4,
            parallelism = self.parallelism,
            "allocated hashing region"
        );

        for level in self.start_garlic..=self.stop_garlic {
            debug!(level = u64::from(level), num_blocks, "hashing garlic level");
            let seg_words = num_blocks as usize * self.block_len;
            let used_words = 2 * parallelism * seg_words;

            self.run_independent_phase(&mut mem[..used_words], hash, num_blocks as u32)?;

            // Seed the dependent pass from every thread's first block, so
            // each thread's jumps depend on all seeds at once.
            let mut seed: u32 = 0;
            for p in 0..parallelism {
                seed = seed.wrapping_add(mem[2 * p * seg_words + self.block_len - 1]);
            }

            self.run_dependent_phase(&mut mem[..used_words], seed, num_blocks as u32)?;

            self.xor_into_hash(hash, &mem[..used_words], seg_words);

            num_blocks <<= 1;
            if level < self.stop_garlic || !self.skip_last_hash {
                rekey(hash, level);
            }
        }

        mem.zeroize();
        Ok(())
    }

    /// Spawns one worker per thread over the even (independent) segments
    /// and joins them all before returning.
    fn run_independent_phase(
        &self,
        region: &mut [u32],
        hash: &[u8],
        num_blocks: u32,
    ) -> Result<(), KdfError> {
        let seg_words = num_blocks as usize * self.block_len;
        thread::scope(|scope| {
            let mut handles = Vec::with_capacity(self.parallelism as usize);
            for (p, lanes) in region.chunks_mut(2 * seg_words).enumerate() {
                let (independent, _) = lanes.split_at_mut(seg_words);
                let ctx = self.thread_context(p as u32, num_blocks);
                let handle = thread::Builder::new()
                    .name(format!("tigerkdf-{p}"))
                    .spawn_scoped(scope, move || {
                        worker::independent_pass(&ctx, hash, independent)
                    })?;
                handles.push(handle);
            }
            join_all(handles)
        })
    }

    /// Spawns one worker per thread over the odd (dependent) segments. The
    /// independent segments, complete after the first phase's join, are
    /// handed to every worker read-only.
    fn run_dependent_phase(
        &self,
        region: &mut [u32],
        seed: u32,
        num_blocks: u32,
    ) -> Result<(), KdfError> {
        let seg_words = num_blocks as usize * self.block_len;
        let parallelism = self.parallelism as usize;

        let mut independent: Vec<&[u32]> = Vec::with_capacity(parallelism);
        let mut dependent: Vec<&mut [u32]> = Vec::with_capacity(parallelism);
        let mut rest = region;
        for _ in 0..parallelism {
            let (indep, tail) = rest.split_at_mut(seg_words);
            let (dep, tail) = tail.split_at_mut(seg_words);
            independent.push(indep);
            dependent.push(dep);
            rest = tail;
        }

        thread::scope(|scope| {
            let independent = independent.as_slice();
            let mut handles = Vec::with_capacity(parallelism);
            for (p, dep) in dependent.into_iter().enumerate() {
                let ctx = self.thread_context(p as u32, num_blocks);
                let handle = thread::Builder::new()
                    .name(format!("tigerkdf-{p}"))
                    .spawn_scoped(scope, move || {
                        worker::dependent_pass(&ctx, seed, dep, independent)
                    })?;
                handles.push(handle);
            }
            join_all(handles)
        })
    }

    fn thread_context(&self, p: u32, num_blocks: u32) -> ThreadContext {
        ThreadContext {
            p,
            parallelism: self.parallelism,
            block_len: self.block_len,
            num_blocks,
            repetitions: self.repetitions,
        }
    }

    /// XORs the tail of each thread's dependent segment into the hash.
    fn xor_into_hash(&self, hash: &mut [u8], region: &[u32], seg_words: usize) {
        let hash_words = hash.len() / 4;
        let mut tail = vec![0u8; hash.len()];
        for p in 0..self.parallelism as usize {
            let end = 2 * (p + 1) * seg_words;
            encode_be32(&mut tail, &region[end - hash_words..end]);
            for (h, t) in hash.iter_mut().zip(tail.iter()) {
                *h ^= t;
            }
        }
    }
}

/// Re-keys the hash state with the garlic level folded in, separating the
/// output domains of consecutive levels.
pub(crate) fn rekey(hash: &mut [u8], level: u8) {
    let mut key = hash.to_vec();
    keyed_hash(hash, &key, &[level]);
    key.zeroize();
}

fn allocate_region(total_words: u64) -> Result<Vec<u32>, KdfError> {
    let bytes = total_words.saturating_mul(4);
    let len = usize::try_from(total_words).map_err(|_| KdfError::Allocation { bytes })?;
    let mut mem: Vec<u32> = Vec::new();
    mem.try_reserve_exact(len)
        .map_err(|_| KdfError::Allocation { bytes })?;
    mem.resize(len, 0);
    Ok(mem)
}

fn join_all(handles: Vec<thread::ScopedJoinHandle<'_, ()>>) -> Result<(), KdfError> {
    for handle in handles {
        handle.join().map_err(|_| KdfError::WorkerPanic)?;
    }
    Ok(())
}
