//! The innermost block-mixing routine.

/// Folds one source block into the running state word-by-word and writes the
/// resulting stream into the destination block.
///
/// The recurrence is `state = state * (prev[j] | 3) + from[j]` in wrapping
/// 32-bit arithmetic. `| 3` keeps the multiplier odd so the multiplication
/// stays invertible mod 2^32. `prev` must be the block immediately before
/// `to` in the destination stream, which chains every block to its
/// predecessor and forces strictly sequential computation.
///
/// With `repetitions > 1` the recurrence runs over the block that many
/// times to add CPU cost; the extra rounds form one long multiplication
/// dependency chain and only the final round stores to `to`.
pub(crate) fn hash_blocks(
    mut state: u32,
    prev: &[u32],
    from: &[u32],
    to: &mut [u32],
    repetitions: u32,
) -> u32 {
    debug_assert_eq!(prev.len(), to.len());
    debug_assert_eq!(from.len(), to.len());
    for _ in 1..repetitions {
        for j in 0..to.len() {
            state = state.wrapping_mul(prev[j] | 3).wrapping_add(from[j]);
        }
    }
    for j in 0..to.len() {
        state = state.wrapping_mul(prev[j] | 3).wrapping_add(from[j]);
        to[j] = state;
    }
    state
}
