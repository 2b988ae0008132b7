use core::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Error {
    /// PBKDF2 needs at least one HMAC iteration per output block.
    ZeroRounds,
    /// The output would need more than `2^32 - 1` blocks.
    KeyTooLong { length: usize },
    UnknownAlgorithm,
}

impl Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::ZeroRounds => f.write_str("iteration count must be at least 1"),
            Self::KeyTooLong { length } => {
                write!(f, "cannot derive {length} bytes: too many output blocks")
            }
            Self::UnknownAlgorithm => f.write_str("unknown digest algorithm"),
        }
    }
}

impl std::error::Error for Error {}
