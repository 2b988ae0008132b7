use core::fmt::Display;

/// A violated scrypt parameter invariant. Always detected before any
/// buffer is allocated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamsError {
    InvalidCost { n: u64 },
    CostTooLarge { n: u64, r: u64 },
    ZeroBlockSize,
    ZeroParallelism,
    ParallelismTooLarge { r: u64, p: u64 },
    MemoryOverflow,
}

impl Display for ParamsError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidCost { n } => {
                write!(f, "cost factor N = {n} is not a power of two greater than 1")
            }
            Self::CostTooLarge { n, r } => {
                write!(f, "cost factor N = {n} must be below 2^(16 r) for r = {r}")
            }
            Self::ZeroBlockSize => f.write_str("block size factor r must be positive"),
            Self::ZeroParallelism => f.write_str("parallelism factor p must be positive"),
            Self::ParallelismTooLarge { r, p } => {
                write!(f, "r * p must be below 2^30 (r = {r}, p = {p})")
            }
            Self::MemoryOverflow => f.write_str("memory required by N, r and p is not addressable"),
        }
    }
}

impl std::error::Error for ParamsError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Error {
    Params(ParamsError),
    /// A scratch or expanded buffer could not be allocated. Retrying with
    /// smaller parameters may succeed.
    OutOfMemory { bytes: usize },
    Prf(pbkdf2::Error),
}

impl Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Params(e) => write!(f, "invalid scrypt parameters: {e}"),
            Self::OutOfMemory { bytes } => write!(f, "could not allocate {bytes} bytes"),
            Self::Prf(e) => write!(f, "PBKDF2 failed: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Params(e) => Some(e),
            Self::OutOfMemory { .. } => None,
            Self::Prf(e) => Some(e),
        }
    }
}

impl From<ParamsError> for Error {
    fn from(value: ParamsError) -> Self {
        Self::Params(value)
    }
}

impl From<pbkdf2::Error> for Error {
    fn from(value: pbkdf2::Error) -> Self {
        Self::Prf(value)
    }
}
