use crate::{romix, Error, Params};
use crypto_common::secret::SecretBuf;

#[cfg(test)]
thread_local! {
    static ALLOCATIONS: core::cell::Cell<usize> = const { core::cell::Cell::new(0) };
}

/// Number of secret buffers allocated on this thread so far.
#[cfg(test)]
pub(crate) fn allocations() -> usize {
    ALLOCATIONS.with(core::cell::Cell::get)
}

/// Allocate a zeroed secret buffer, mapping failure to [`Error::OutOfMemory`].
pub(crate) fn alloc(bytes: usize) -> Result<SecretBuf, Error> {
    #[cfg(test)]
    ALLOCATIONS.with(|c| c.set(c.get() + 1));
    SecretBuf::try_zeroed(bytes).map_err(|_| Error::OutOfMemory { bytes })
}

/// The per-worker memory of SMix: the `N`-entry array `V` and one lane-sized
/// temporary. Reusable across lanes; erased when dropped.
pub(crate) struct Scratch {
    v: SecretBuf,
    t: SecretBuf,
    n: usize,
}

impl Scratch {
    pub fn new(params: &Params) -> Result<Self, Error> {
        Ok(Self {
            v: alloc(params.scratch_len())?,
            t: alloc(params.lane_len())?,
            n: params.n_usize(),
        })
    }

    #[inline]
    pub fn mix(&mut self, lane: &mut [u8]) {
        romix::scrypt_ro_mix(lane, &mut self.v, &mut self.t, self.n);
    }
}
