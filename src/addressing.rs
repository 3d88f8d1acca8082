//! Predecessor-block addressing for the two hashing passes.
//!
//! The first pass addresses blocks through a bit-reversal permutation that
//! depends only on the block index, so the access pattern leaks nothing
//! about the password. The second pass jumps backwards by a distance
//! derived from the running mixing state, cubed in fixed point to favor
//! recently written blocks; an attacker who discards old blocks has to
//! recompute jump chains of unpredictable length.

/// Reverses the low bits of `value` covered by `mask`, where `mask` is an
/// all-ones window (`2^k - 1` reverses `k` bits).
pub(crate) fn bit_reverse(value: u32, mask: u32) -> u32 {
    let mut value = value;
    let mut mask = mask;
    let mut result = 0;
    while mask != 0 {
        result = (result << 1) | (value & 1);
        value >>= 1;
        mask >>= 1;
    }
    result
}

/// Data-independent predecessor of block `i`, given the current power-of-two
/// growth window. The result is always an earlier block in the same segment.
pub(crate) fn independent_predecessor(i: u32, window: u32) -> u32 {
    let mut pos = bit_reverse(i, window - 1);
    if pos + window < i {
        pos += window;
    }
    pos
}

/// Data-dependent jump distance for block `i` of a dependent segment.
///
/// Squares and cubes the 32-bit state in fixed point, biasing the uniform
/// input towards short distances, then scales into `[0, i + num_blocks - 1]`.
/// A result below `i` stays in the caller's own segment; anything larger
/// crosses into another thread's first-pass segment.
pub(crate) fn jump_distance(state: u32, i: u32, num_blocks: u32) -> u32 {
    let v = state as u64;
    let v2 = (v * v) >> 32;
    let v3 = (v * v2) >> 32;
    (((i as u64 + num_blocks as u64 - 1) * v3) >> 32) as u32
}
