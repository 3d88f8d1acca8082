//! Big-endian conversions between the byte-oriented hash state and the
//! 32-bit words the memory region is made of.

/// Decodes `bytes` big-endian into `words`. `bytes` must be exactly
/// `4 * words.len()` long.
pub(crate) fn decode_be32(words: &mut [u32], bytes: &[u8]) {
    debug_assert_eq!(bytes.len(), words.len() * 4);
    for (word, chunk) in words.iter_mut().zip(bytes.chunks_exact(4)) {
        *word = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }
}

/// Encodes `words` big-endian into `bytes`. `bytes` must be exactly
/// `4 * words.len()` long.
pub(crate) fn encode_be32(bytes: &mut [u8], words: &[u32]) {
    debug_assert_eq!(bytes.len(), words.len() * 4);
    for (chunk, word) in bytes.chunks_exact_mut(4).zip(words.iter()) {
        chunk.copy_from_slice(&word.to_be_bytes());
    }
}
