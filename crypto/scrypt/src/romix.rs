use crate::salsa::{salsa20_8, Block};
use crypto_common::erase::Erase;

/// scryptROMix over one lane.
///
/// `v` holds `n` copies of the lane and `t` one more; both are overwritten.
/// The lane is mixed in place.
pub fn scrypt_ro_mix(b: &mut [u8], v: &mut [u8], t: &mut [u8], n: usize) {
    let len = b.len();
    debug_assert_eq!(v.len(), n * len);
    debug_assert_eq!(t.len(), len);
    for chunk in v.chunks_mut(len) {
        chunk.copy_from_slice(b);
        scrypt_block_mix(chunk, b);
    }
    for _ in 0..n {
        let j = integerify(b, n);
        xor(b, &v[j * len..(j + 1) * len], t);
        scrypt_block_mix(t, b);
    }
}

/// Reads the first eight bytes of the last 64-byte block as a little-endian
/// integer, reduced mod `n` (a power of two).
#[inline(always)]
#[allow(clippy::cast_possible_truncation)]
fn integerify(x: &[u8], n: usize) -> usize {
    let tail = &x[x.len() - 64..];
    let mut word = [0; 8];
    word.copy_from_slice(&tail[..8]);
    (u64::from_le_bytes(word) & (n as u64 - 1)) as usize
}

/// scryptBlockMix: `input` and `output` are `2r` 64-byte blocks and must not
/// overlap. Even-indexed results land in the first half of `output`, odd
/// ones in the second half.
pub fn scrypt_block_mix(input: &[u8], output: &mut [u8]) {
    debug_assert_eq!(input.len(), output.len());
    let half = input.len() / 2;
    let mut x: Block = [0; 64];
    x.copy_from_slice(&input[input.len() - 64..]);
    for (i, chunk) in input.chunks_exact(64).enumerate() {
        for (a, b) in x.iter_mut().zip(chunk) {
            *a ^= b;
        }
        salsa20_8(&mut x);
        let pos = if i % 2 == 0 {
            (i / 2) * 64
        } else {
            (i / 2) * 64 + half
        };
        output[pos..pos + 64].copy_from_slice(&x);
    }
    x.erase();
}

#[inline(always)]
fn xor(x: &[u8], y: &[u8], output: &mut [u8]) {
    for ((out, &x_i), &y_i) in output.iter_mut().zip(x.iter()).zip(y.iter()) {
        *out = x_i ^ y_i;
    }
}
