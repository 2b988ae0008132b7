use crate::Error;
use core::{fmt::Display, str::FromStr};

/// The hash function PBKDF2 is instantiated with.
///
/// Digests are selected by value at the call site; names are only parsed at
/// the edges (configuration, command line) through [`FromStr`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Algorithm {
    Md5,
    Ripemd160,
    Sha1,
    Sha224,
    #[default]
    Sha256,
    Sha384,
    Sha512,
}

impl Algorithm {
    pub const ALL: [Self; 7] = [
        Self::Md5,
        Self::Ripemd160,
        Self::Sha1,
        Self::Sha224,
        Self::Sha256,
        Self::Sha384,
        Self::Sha512,
    ];

    /// Digest size in bytes, which is also the PBKDF2 block size.
    #[must_use]
    pub const fn output_len(self) -> usize {
        match self {
            Self::Md5 => 16,
            Self::Ripemd160 | Self::Sha1 => 20,
            Self::Sha224 => 28,
            Self::Sha256 => 32,
            Self::Sha384 => 48,
            Self::Sha512 => 64,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Md5 => "md5",
            Self::Ripemd160 => "ripemd160",
            Self::Sha1 => "sha1",
            Self::Sha224 => "sha224",
            Self::Sha256 => "sha256",
            Self::Sha384 => "sha384",
            Self::Sha512 => "sha512",
        }
    }
}

impl Display for Algorithm {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut name = [0; 16];
        let mut len = 0;
        for b in s.bytes().filter(|&b| b != b'-' && b != b'_') {
            if len == name.len() {
                return Err(Error::UnknownAlgorithm);
            }
            name[len] = b.to_ascii_lowercase();
            len += 1;
        }
        Self::ALL
            .into_iter()
            .find(|a| a.name().as_bytes() == &name[..len])
            .ok_or(Error::UnknownAlgorithm)
    }
}
