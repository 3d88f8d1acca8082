//! Per-thread hashing of one memory partition.
//!
//! Each worker owns two segments of the shared region: segment `2p` is
//! filled by [`independent_pass`] with data-independent addressing, segment
//! `2p+1` by [`dependent_pass`] with data-dependent addressing. The
//! orchestrator joins all independent passes before starting any dependent
//! pass, because dependent-pass jumps may read any thread's independent
//! segment.

use zeroize::Zeroize;

use crate::addressing::{independent_predecessor, jump_distance};
use crate::block::hash_blocks;
use crate::hasher::keyed_hash;
use crate::utils::decode_be32;

/// Immutable per-worker parameters, fixed before the thread is spawned.
#[derive(Clone, Copy)]
pub(crate) struct ThreadContext {
    pub p: u32,
    pub parallelism: u32,
    pub block_len: usize,
    pub num_blocks: u32,
    pub repetitions: u32,
}

/// First pass: fills the thread's independent segment.
///
/// Block 0 is seeded from a thread-specific key derived from a read-only
/// snapshot of the hash state, then each block folds in a predecessor
/// chosen by bit-reversal. Addresses depend only on block indices, never
/// on data, so the access pattern is identical for every password.
pub(crate) fn independent_pass(ctx: &ThreadContext, hash: &[u8], seg: &mut [u32]) {
    let block_len = ctx.block_len;

    let mut thread_key = vec![0u8; block_len * 4];
    keyed_hash(&mut thread_key, hash, &ctx.p.to_be_bytes());
    decode_be32(&mut seg[..block_len], &thread_key);
    thread_key.zeroize();

    let mut state: u32 = 1;
    let mut window: u32 = 1;
    for i in 1..ctx.num_blocks {
        if window <= i / 2 {
            window <<= 1;
        }
        let from = independent_predecessor(i, window) as usize * block_len;
        let to = i as usize * block_len;
        let (written, rest) = seg.split_at_mut(to);
        state = hash_blocks(
            state,
            &written[to - block_len..],
            &written[from..from + block_len],
            &mut rest[..block_len],
            ctx.repetitions,
        );
    }
}

/// Second pass: fills the thread's dependent segment.
///
/// Jump distances come from the running state, so the access pattern is
/// password-dependent. Distances below `i` stay in this segment; larger
/// ones wrap into another thread's completed independent segment. Block 0
/// chains off the last block of the thread's own independent segment.
pub(crate) fn dependent_pass(
    ctx: &ThreadContext,
    seed: u32,
    seg: &mut [u32],
    independent: &[&[u32]],
) {
    let block_len = ctx.block_len;
    let seg_words = ctx.num_blocks as usize * block_len;

    let mut state = seed;
    for i in 0..ctx.num_blocks {
        let distance = jump_distance(state, i, ctx.num_blocks);
        let to = i as usize * block_len;
        let (written, rest) = seg.split_at_mut(to);
        let prev: &[u32] = if i == 0 {
            &independent[ctx.p as usize][seg_words - block_len..]
        } else {
            &written[to - block_len..]
        };
        state = if distance < i {
            let from = (i - 1 - distance) as usize * block_len;
            hash_blocks(
                state,
                prev,
                &written[from..from + block_len],
                &mut rest[..block_len],
                ctx.repetitions,
            )
        } else {
            let q = ((ctx.p + i) % ctx.parallelism) as usize;
            let b = (ctx.num_blocks - 1 - (distance - i)) as usize;
            hash_blocks(
                state,
                prev,
                &independent[q][b * block_len..(b + 1) * block_len],
                &mut rest[..block_len],
                ctx.repetitions,
            )
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(num_blocks: u32) -> ThreadContext {
        ThreadContext {
            p: 0,
            parallelism: 1,
            block_len: 8,
            num_blocks,
            repetitions: 1,
        }
    }

    #[test]
    fn independent_pass_seeds_first_block_from_hash() {
        let hash = [7u8; 32];
        let ctx = context(4);
        let mut seg = vec![0u32; 4 * 8];
        independent_pass(&ctx, &hash, &mut seg);

        let mut expected_key = vec![0u8; 8 * 4];
        keyed_hash(&mut expected_key, &hash, &0u32.to_be_bytes());
        let mut expected = vec![0u32; 8];
        decode_be32(&mut expected, &expected_key);
        assert_eq!(&seg[..8], &expected[..]);
        // Later blocks were actually written.
        assert!(seg[8..].iter().any(|&w| w != 0));
    }

    #[test]
    fn independent_pass_is_deterministic_per_thread_index() {
        let hash = [3u8; 32];
        let mut a = vec![0u32; 8 * 8];
        let mut b = vec![0u32; 8 * 8];
        independent_pass(&context(8), &hash, &mut a);
        independent_pass(&context(8), &hash, &mut b);
        assert_eq!(a, b);

        let ctx_other = ThreadContext { p: 1, ..context(8) };
        independent_pass(&ctx_other, &hash, &mut b);
        assert_ne!(a, b);
    }

    #[test]
    fn dependent_pass_covers_its_segment() {
        let hash = [9u8; 32];
        let ctx = context(8);
        let mut indep = vec![0u32; 8 * 8];
        independent_pass(&ctx, &hash, &mut indep);

        let mut dep = vec![0u32; 8 * 8];
        let seed = indep[7];
        dependent_pass(&ctx, seed, &mut dep, &[indep.as_slice()]);
        // Every block of the dependent segment was produced.
        for block in dep.chunks(8) {
            assert!(block.iter().any(|&w| w != 0));
        }
    }
}
