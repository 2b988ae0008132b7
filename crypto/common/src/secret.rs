use crate::erase::{Erase, EraseOnDrop};
use alloc::{collections::TryReserveError, vec::Vec};
use core::ops::{Deref, DerefMut};

/// A heap buffer holding secret bytes.
///
/// The contents are erased when the buffer is dropped, on every exit path.
/// Allocation goes through [`SecretBuf::try_zeroed`] so that oversized
/// requests surface as an error instead of aborting the process.
#[derive(Default)]
pub struct SecretBuf {
    inner: Vec<u8>,
}

impl SecretBuf {
    /// Allocate `len` zeroed bytes, reporting allocation failure to the caller.
    pub fn try_zeroed(len: usize) -> Result<Self, TryReserveError> {
        let mut inner = Vec::new();
        inner.try_reserve_exact(len)?;
        inner.resize(len, 0);
        Ok(Self { inner })
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Hand the bytes to the caller without erasing them.
    #[must_use]
    pub fn into_vec(mut self) -> Vec<u8> {
        core::mem::take(&mut self.inner)
    }
}

impl From<Vec<u8>> for SecretBuf {
    fn from(inner: Vec<u8>) -> Self {
        Self { inner }
    }
}

impl Deref for SecretBuf {
    type Target = [u8];

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for SecretBuf {
    #[inline]
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.inner
    }
}

impl Erase for SecretBuf {
    /// Zero the whole allocation, including spare capacity left behind by
    /// truncating the vector this buffer was built from. The length is kept.
    fn erase(&mut self) {
        self.inner.as_mut_slice().erase();
        self.inner.spare_capacity_mut().erase();
    }
}

impl Drop for SecretBuf {
    fn drop(&mut self) {
        self.erase();
    }
}

impl EraseOnDrop for SecretBuf {}

impl core::fmt::Debug for SecretBuf {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "SecretBuf({} bytes)", self.inner.len())
    }
}
