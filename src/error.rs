use std::fmt::{Debug, Display};

pub enum Error {
    Scrypt(scrypt::Error),
    Pbkdf2(pbkdf2::Error),
    /// The operating system's random source failed.
    Entropy(rand_core::Error),
    InvalidRange {
        offset: usize,
        len: usize,
        capacity: usize,
    },
    OutOfMemory {
        bytes: usize,
    },
    /// A verification was asked to match an empty key, which every
    /// password would.
    EmptyExpectedKey,
    InvalidKeyLength {
        len: usize,
    },
    InvalidIvLength {
        len: usize,
    },
    /// Ciphertext that is not a whole number of blocks or whose padding is
    /// malformed.
    BadPadding,
    /// A background job panicked or was cancelled by the runtime.
    Worker(tokio::task::JoinError),
    /// The dispatcher was closed before the job got a permit.
    Closed,
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Scrypt(e) => Display::fmt(e, f),
            Self::Pbkdf2(e) => Display::fmt(e, f),
            Self::Entropy(e) => write!(f, "random source failed: {e}"),
            Self::InvalidRange {
                offset,
                len,
                capacity,
            } => write!(
                f,
                "range {offset}..{offset}+{len} is out of bounds for a buffer of {capacity} bytes"
            ),
            Self::OutOfMemory { bytes } => write!(f, "could not allocate {bytes} bytes"),
            Self::EmptyExpectedKey => f.write_str("cannot verify against an empty key"),
            Self::InvalidKeyLength { len } => {
                write!(f, "cipher key must be 32 bytes, got {len}")
            }
            Self::InvalidIvLength { len } => write!(f, "IV must be 16 bytes, got {len}"),
            Self::BadPadding => f.write_str("ciphertext is truncated or its padding is invalid"),
            Self::Worker(e) => write!(f, "background job failed: {e}"),
            Self::Closed => f.write_str("the dispatcher no longer accepts jobs"),
        }
    }
}

impl Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Scrypt(e) => Some(e),
            Self::Pbkdf2(e) => Some(e),
            Self::Entropy(e) => Some(e),
            Self::Worker(e) => Some(e),
            Self::InvalidRange { .. }
            | Self::OutOfMemory { .. }
            | Self::EmptyExpectedKey
            | Self::InvalidKeyLength { .. }
            | Self::InvalidIvLength { .. }
            | Self::BadPadding
            | Self::Closed => None,
        }
    }
}

impl From<scrypt::Error> for Error {
    fn from(value: scrypt::Error) -> Self {
        Self::Scrypt(value)
    }
}

impl From<scrypt::ParamsError> for Error {
    fn from(value: scrypt::ParamsError) -> Self {
        Self::Scrypt(value.into())
    }
}

impl From<pbkdf2::Error> for Error {
    fn from(value: pbkdf2::Error) -> Self {
        Self::Pbkdf2(value)
    }
}

impl From<rand_core::Error> for Error {
    fn from(value: rand_core::Error) -> Self {
        Self::Entropy(value)
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(value: tokio::task::JoinError) -> Self {
        Self::Worker(value)
    }
}
