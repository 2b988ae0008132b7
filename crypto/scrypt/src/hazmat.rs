//! The building blocks of scrypt, exposed for testing against published
//! intermediate vectors and for callers that manage their own memory.
//!
//! Nothing here validates parameters beyond buffer lengths; prefer
//! [`crate::scrypt`] unless you know why you need these.

pub use crate::salsa::Block;

/// Salsa20/8 core, in place.
#[inline]
pub fn salsa20_8(block: &mut Block) {
    crate::salsa::salsa20_8(block);
}

/// scryptBlockMix over `2r` 64-byte blocks.
///
/// # Panics
///
/// If the buffers differ in length or are not a non-zero multiple of 128
/// bytes.
pub fn block_mix(input: &[u8], output: &mut [u8]) {
    assert_eq!(input.len(), output.len(), "block_mix buffers differ in length");
    assert!(
        !input.is_empty() && input.len() % 128 == 0,
        "block_mix needs 2r 64-byte blocks"
    );
    crate::romix::scrypt_block_mix(input, output);
}

/// scryptROMix over one `128 r` byte lane with cost `n`.
///
/// `scratch` must hold `n` lanes and `tmp` exactly one.
///
/// # Panics
///
/// If `n` is not a power of two greater than one or a buffer has the wrong
/// length.
pub fn ro_mix(lane: &mut [u8], scratch: &mut [u8], tmp: &mut [u8], n: usize) {
    assert!(n > 1 && n.is_power_of_two(), "n must be a power of two above 1");
    assert!(
        !lane.is_empty() && lane.len() % 128 == 0,
        "lane must be 128 r bytes"
    );
    assert_eq!(Some(scratch.len()), lane.len().checked_mul(n), "scratch must be n lanes");
    assert_eq!(tmp.len(), lane.len(), "tmp must be one lane");
    crate::romix::scrypt_ro_mix(lane, scratch, tmp, n);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[should_panic(expected = "2r 64-byte blocks")]
    fn block_mix_rejects_odd_block_count() {
        let input = [0; 64];
        let mut output = [0; 64];
        block_mix(&input, &mut output);
    }

    #[test]
    #[should_panic(expected = "power of two")]
    fn ro_mix_rejects_bad_cost() {
        let mut lane = [0; 128];
        let mut scratch = [0; 384];
        let mut tmp = [0; 128];
        ro_mix(&mut lane, &mut scratch, &mut tmp, 3);
    }

    #[test]
    fn ro_mix_matches_driver_lane() {
        // a single lane with p = 1 is exactly what the driver mixes
        let params = crate::Params::new(16, 1, 1).unwrap();
        let mut lane = vec![0; params.lane_len()];
        pbkdf2::pbkdf2_hmac_sha256(b"pw", b"salt", 1, &mut lane).unwrap();
        let mut scratch = vec![0; params.scratch_len()];
        let mut tmp = vec![0; params.lane_len()];
        ro_mix(&mut lane, &mut scratch, &mut tmp, 16);
        let mut manual = [0; 32];
        pbkdf2::pbkdf2_hmac_sha256(b"pw", &lane, 1, &mut manual).unwrap();

        let mut key = [0; 32];
        crate::scrypt(b"pw", b"salt", &params, &mut key).unwrap();
        assert_eq!(manual, key);
    }
}
