#![deny(
    dead_code,
    deprecated,
    future_incompatible,
    missing_copy_implementations,
    missing_debug_implementations,
    nonstandard_style,
    rust_2018_idioms,
    trivial_casts,
    trivial_numeric_casts,
    unused,
    clippy::all,
    clippy::pedantic,
    clippy::nursery
)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::inline_always
)]

//! The scrypt password-based key derivation function (RFC 7914).
//!
//! ```text
//! B   = PBKDF2-HMAC-SHA256(password, salt, 1, 128 r p)
//! B_i = ROMix_N(B_i)              for each of the p lanes
//! key = PBKDF2-HMAC-SHA256(password, B, 1, keylen)
//! ```
//!
//! All intermediate buffers hold password-derived material and are erased
//! when they go out of scope, whichever way the derivation ends.

mod error;
pub mod hazmat;
mod params;
mod romix;
mod salsa;
mod scratch;

pub use error::{Error, ParamsError};
pub use params::Params;
use pbkdf2::{check_output_len, pbkdf2_hmac_sha256, Algorithm};
use crypto_common::secret::SecretBuf;
use scratch::Scratch;

/// Derive `keylen` bytes from `password` and `salt`.
///
/// Parameters are validated before anything is allocated.
pub fn derive(
    password: &[u8],
    salt: &[u8],
    n: u64,
    r: u64,
    p: u64,
    keylen: usize,
) -> Result<Vec<u8>, Error> {
    let params = Params::new(n, r, p)?;
    check_output_len(Algorithm::Sha256, keylen)?;
    let mut key = Vec::new();
    key.try_reserve_exact(keylen)
        .map_err(|_| Error::OutOfMemory { bytes: keylen })?;
    key.resize(keylen, 0);
    scrypt(password, salt, &params, &mut key)?;
    Ok(key)
}

/// Fill `output` with the scrypt key for `password` and `salt`.
///
/// Lanes are mixed one after another, reusing a single scratch array, so peak
/// memory is `128 r (N + p + 1)` bytes. `output` is only written once every
/// lane has been mixed.
pub fn scrypt(
    password: &[u8],
    salt: &[u8],
    params: &Params,
    output: &mut [u8],
) -> Result<(), Error> {
    check_output_len(Algorithm::Sha256, output.len())?;
    let mut b = expand(password, salt, params)?;
    let mut scratch = Scratch::new(params)?;
    for lane in b.chunks_mut(params.lane_len()) {
        scratch.mix(lane);
    }
    pbkdf2_hmac_sha256(password, &b, 1, output)?;
    Ok(())
}

/// Like [`scrypt`], but lanes are mixed concurrently on the rayon pool.
///
/// Lanes are split into at most one contiguous group per pool thread, and
/// each group mixes its lanes one after another through a single scratch
/// array. Peak memory is therefore bounded by `128 r N` times the number of
/// pool threads, however large `p` is. The result is identical to the
/// sequential driver.
#[cfg(feature = "parallel")]
pub fn scrypt_parallel(
    password: &[u8],
    salt: &[u8],
    params: &Params,
    output: &mut [u8],
) -> Result<(), Error> {
    check_output_len(Algorithm::Sha256, output.len())?;
    let mut b = expand(password, salt, params)?;
    mix_lane_groups(&mut b, params)?;
    pbkdf2_hmac_sha256(password, &b, 1, output)?;
    Ok(())
}

/// Mix every lane of `b` on the rayon pool and return how many scratch
/// arrays were allocated.
#[cfg(feature = "parallel")]
fn mix_lane_groups(b: &mut [u8], params: &Params) -> Result<usize, Error> {
    use rayon::prelude::*;

    let lane_len = params.lane_len();
    let lanes = b.len() / lane_len;
    let per_group = lanes.div_ceil(rayon::current_num_threads().max(1)).max(1);
    b.par_chunks_mut(lane_len * per_group)
        .map(|group| {
            let mut scratch = Scratch::new(params)?;
            for lane in group.chunks_mut(lane_len) {
                scratch.mix(lane);
            }
            Ok::<usize, Error>(1)
        })
        .try_reduce(|| 0, |x, y| Ok(x + y))
}

fn expand(password: &[u8], salt: &[u8], params: &Params) -> Result<SecretBuf, Error> {
    let mut b = scratch::alloc(params.expanded_len())?;
    pbkdf2_hmac_sha256(password, salt, 1, &mut b)?;
    Ok(b)
}
