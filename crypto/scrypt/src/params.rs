use crate::ParamsError;

/// Validated scrypt cost parameters.
///
/// A `Params` value can only be obtained through [`Params::new`] or
/// [`Params::from_log_n`], so every size derived from it fits in `usize`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Params {
    pub(crate) log_n: u8,
    pub(crate) r: u32,
    pub(crate) p: u32,
}

impl Params {
    /// `n` must be a power of two greater than one and below `2^(16 r)`,
    /// `r` and `p` must be positive with `r * p < 2^30`, and the scratch
    /// (`128 r n`) and expanded (`128 r p`) buffers must be addressable.
    #[allow(clippy::cast_possible_truncation)]
    pub fn new(n: u64, r: u64, p: u64) -> Result<Self, ParamsError> {
        if n <= 1 || !n.is_power_of_two() {
            return Err(ParamsError::InvalidCost { n });
        }
        if r == 0 {
            return Err(ParamsError::ZeroBlockSize);
        }
        if p == 0 {
            return Err(ParamsError::ZeroParallelism);
        }
        if r.checked_mul(p).map_or(true, |rp| rp >= 1 << 30) {
            return Err(ParamsError::ParallelismTooLarge { r, p });
        }
        let log_n = n.trailing_zeros();
        if u64::from(log_n) >= r * 16 {
            return Err(ParamsError::CostTooLarge { n, r });
        }
        let n = usize::try_from(n).map_err(|_| ParamsError::MemoryOverflow)?;
        let r128 = usize::try_from(r)
            .ok()
            .and_then(|r| r.checked_mul(128))
            .ok_or(ParamsError::MemoryOverflow)?;
        let p = usize::try_from(p).map_err(|_| ParamsError::MemoryOverflow)?;
        r128.checked_mul(p).ok_or(ParamsError::MemoryOverflow)?;
        r128.checked_mul(n).ok_or(ParamsError::MemoryOverflow)?;
        Ok(Self {
            log_n: log_n as u8,
            r: r as u32,
            p: p as u32,
        })
    }

    /// Same as [`Params::new`] with `n = 2^log_n`.
    pub fn from_log_n(log_n: u8, r: u32, p: u32) -> Result<Self, ParamsError> {
        let n = 1_u64
            .checked_shl(u32::from(log_n))
            .ok_or(ParamsError::MemoryOverflow)?;
        Self::new(n, u64::from(r), u64::from(p))
    }

    #[must_use]
    pub const fn n(&self) -> u64 {
        1 << self.log_n
    }

    #[must_use]
    pub const fn log_n(&self) -> u8 {
        self.log_n
    }

    #[must_use]
    pub const fn r(&self) -> u32 {
        self.r
    }

    #[must_use]
    pub const fn p(&self) -> u32 {
        self.p
    }

    /// Bytes per lane (`128 r`).
    #[must_use]
    pub const fn lane_len(&self) -> usize {
        128 * self.r as usize
    }

    /// Bytes in the PBKDF2-expanded buffer (`128 r p`).
    #[must_use]
    pub const fn expanded_len(&self) -> usize {
        self.lane_len() * self.p as usize
    }

    /// Bytes in one SMix scratch array (`128 r n`).
    #[must_use]
    pub const fn scratch_len(&self) -> usize {
        self.lane_len() << self.log_n
    }

    pub(crate) const fn n_usize(&self) -> usize {
        1 << self.log_n
    }
}
