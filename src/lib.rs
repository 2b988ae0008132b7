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
    clippy::nursery,
    clippy::unwrap_used
)]
#![allow(clippy::missing_errors_doc, clippy::module_name_repetitions)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! Password-based key derivation: scrypt (RFC 7914) and PBKDF2 over SHA-1,
//! the SHA-2 family, MD5 and RIPEMD-160, with blocking and asynchronous entry
//! points. AES-256-CBC [`encipher`] and [`decipher`] are provided for sealing
//! data under a derived key.
//!
//! ```no_run
//! # async fn demo() -> Result<(), keystretch::Error> {
//! let key = keystretch::scrypt(b"password", b"NaCl", 1024, 8, 16, 64)?;
//! let same = keystretch::scrypt_async(b"password".to_vec(), b"NaCl".to_vec(), 1024, 8, 16, 64)
//!     .await?;
//! assert_eq!(key, same);
//! # Ok(())
//! # }
//! ```

mod cipher;
mod dispatch;
mod error;
mod random;

pub use ::pbkdf2::Algorithm;
pub use ::scrypt::Params;
use crypto_common::constant_time::ConstantTimeEq;
pub use cipher::{decipher, encipher};
pub use crypto_common::{erase::cleanse, secret::SecretBuf};
pub use dispatch::Dispatcher;
pub use error::Error;
pub use random::{random_bytes, random_fill};

/// Derive a `keylen`-byte scrypt key.
///
/// `n` must be a power of two greater than one, `r` and `p` positive with
/// `r * p < 2^30`. Nothing is allocated when the parameters are rejected.
pub fn scrypt(
    password: &[u8],
    salt: &[u8],
    n: u64,
    r: u64,
    p: u64,
    keylen: usize,
) -> Result<Vec<u8>, Error> {
    Ok(::scrypt::derive(password, salt, n, r, p, keylen)?)
}

/// [`scrypt`] on the blocking pool of the current tokio runtime.
///
/// Uses a default [`Dispatcher`]; build one explicitly to bound concurrency.
pub async fn scrypt_async(
    password: Vec<u8>,
    salt: Vec<u8>,
    n: u64,
    r: u64,
    p: u64,
    keylen: usize,
) -> Result<Vec<u8>, Error> {
    Dispatcher::default()
        .scrypt(password, salt, n, r, p, keylen)
        .await
}

/// Derive a `keylen`-byte PBKDF2-HMAC key with `rounds` iterations.
pub fn pbkdf2(
    algorithm: Algorithm,
    password: &[u8],
    salt: &[u8],
    rounds: u32,
    keylen: usize,
) -> Result<Vec<u8>, Error> {
    if rounds == 0 {
        return Err(::pbkdf2::Error::ZeroRounds.into());
    }
    ::pbkdf2::check_output_len(algorithm, keylen)?;
    let mut key = alloc_zeroed(keylen)?;
    ::pbkdf2::pbkdf2(algorithm, password, salt, rounds, &mut key)?;
    Ok(key)
}

/// [`pbkdf2`] on the blocking pool of the current tokio runtime.
pub async fn pbkdf2_async(
    algorithm: Algorithm,
    password: Vec<u8>,
    salt: Vec<u8>,
    rounds: u32,
    keylen: usize,
) -> Result<Vec<u8>, Error> {
    Dispatcher::default()
        .pbkdf2(algorithm, password, salt, rounds, keylen)
        .await
}

/// Recompute the scrypt key for `password` and compare it with `expected`
/// in constant time.
///
/// The key length is taken from `expected`, which must not be empty.
pub fn verify_scrypt(
    password: &[u8],
    salt: &[u8],
    params: &Params,
    expected: &[u8],
) -> Result<bool, Error> {
    if expected.is_empty() {
        return Err(Error::EmptyExpectedKey);
    }
    let mut actual = SecretBuf::try_zeroed(expected.len()).map_err(|_| Error::OutOfMemory {
        bytes: expected.len(),
    })?;
    ::scrypt::scrypt(password, salt, params, &mut actual)?;
    Ok(actual.ct_eq(expected).into())
}

pub(crate) fn alloc_zeroed(len: usize) -> Result<Vec<u8>, Error> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|_| Error::OutOfMemory { bytes: len })?;
    buf.resize(len, 0);
    Ok(buf)
}
