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

//! PBKDF2 (RFC 8018) over HMAC with SHA-1, the SHA-2 family, MD5 and
//! RIPEMD-160.

mod algorithm;
mod error;
mod hmac;

pub use algorithm::Algorithm;
use crypto_common::erase::Erase;
pub use error::Error;
use hmac::{Hash, Hmac, MAX_OUTPUT_LEN};

/// Check that `len` output bytes can be produced with `algorithm`.
///
/// The block index is a 32-bit big-endian counter, so at most `2^32 - 1`
/// digest-sized blocks can be derived.
pub fn check_output_len(algorithm: Algorithm, len: usize) -> Result<(), Error> {
    let blocks = len.div_ceil(algorithm.output_len());
    if u32::try_from(blocks).is_err() {
        return Err(Error::KeyTooLong { length: len });
    }
    Ok(())
}

/// Fill `output` with PBKDF2-HMAC-`algorithm` of `password` and `salt`.
///
/// Nothing is written to `output` when the arguments are rejected.
pub fn pbkdf2(
    algorithm: Algorithm,
    password: &[u8],
    salt: &[u8],
    rounds: u32,
    output: &mut [u8],
) -> Result<(), Error> {
    if rounds == 0 {
        return Err(Error::ZeroRounds);
    }
    check_output_len(algorithm, output.len())?;
    match algorithm {
        Algorithm::Md5 => derive::<md5::Md5>(password, salt, rounds, output),
        Algorithm::Ripemd160 => derive::<ripemd::Ripemd160>(password, salt, rounds, output),
        Algorithm::Sha1 => derive::<sha1::Sha1>(password, salt, rounds, output),
        Algorithm::Sha224 => derive::<sha2::Sha224>(password, salt, rounds, output),
        Algorithm::Sha256 => derive::<sha2::Sha256>(password, salt, rounds, output),
        Algorithm::Sha384 => derive::<sha2::Sha384>(password, salt, rounds, output),
        Algorithm::Sha512 => derive::<sha2::Sha512>(password, salt, rounds, output),
    }
    Ok(())
}

#[inline]
pub fn pbkdf2_hmac_sha256(
    password: &[u8],
    salt: &[u8],
    rounds: u32,
    output: &mut [u8],
) -> Result<(), Error> {
    pbkdf2(Algorithm::Sha256, password, salt, rounds, output)
}

#[inline]
#[allow(clippy::cast_possible_truncation)]
fn derive<H: Hash>(password: &[u8], salt: &[u8], rounds: u32, res: &mut [u8]) {
    let prf = Hmac::<H>::new_from_slice(password);
    for (i, chunk) in res.chunks_mut(H::OUTPUT_LEN).enumerate() {
        inner(i as u32, chunk, &prf, salt, rounds);
    }
}

#[inline(always)]
fn inner<H: Hash>(i: u32, chunk: &mut [u8], prf: &Hmac<H>, salt: &[u8], rounds: u32) {
    let mut buf = [0; MAX_OUTPUT_LEN];
    let u = &mut buf[..H::OUTPUT_LEN];
    let mut mac = prf.clone();
    mac.update(salt);
    mac.update(&(i + 1).to_be_bytes());
    mac.finalize_into(u);
    chunk.copy_from_slice(&u[..chunk.len()]);
    for _ in 1..rounds {
        let mut mac = prf.clone();
        mac.update(u);
        mac.finalize_into(u);
        xor(chunk, u);
    }
    buf.erase();
}

#[inline(always)]
fn xor(res: &mut [u8], salt: &[u8]) {
    debug_assert!(salt.len() >= res.len(), "length mismatch in xor");
    res.iter_mut().zip(salt.iter()).for_each(|(a, b)| *a ^= b);
}
