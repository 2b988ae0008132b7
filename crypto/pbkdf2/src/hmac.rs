use crypto_common::erase::Erase;
use sha2::Digest;

pub(crate) const MAX_BLOCK_LEN: usize = 128;
pub(crate) const MAX_OUTPUT_LEN: usize = 64;

/// The slice of a Merkle-Damgard hash that HMAC needs.
pub(crate) trait Hash: Clone {
    const BLOCK_LEN: usize;
    const OUTPUT_LEN: usize;

    fn empty() -> Self;
    fn absorb(&mut self, data: &[u8]);
    fn finish_into(self, out: &mut [u8]);
}

macro_rules! impl_hash {
    ($($ty:ty => $block:literal, $out:literal);+ $(;)?) => {
        $(
            impl Hash for $ty {
                const BLOCK_LEN: usize = $block;
                const OUTPUT_LEN: usize = $out;

                #[inline(always)]
                fn empty() -> Self {
                    <Self as Digest>::new()
                }

                #[inline(always)]
                fn absorb(&mut self, data: &[u8]) {
                    Digest::update(self, data);
                }

                #[inline(always)]
                fn finish_into(self, out: &mut [u8]) {
                    out.copy_from_slice(&Digest::finalize(self));
                }
            }
        )+
    };
}

impl_hash! {
    md5::Md5 => 64, 16;
    ripemd::Ripemd160 => 64, 20;
    sha1::Sha1 => 64, 20;
    sha2::Sha224 => 64, 28;
    sha2::Sha256 => 64, 32;
    sha2::Sha384 => 128, 48;
    sha2::Sha512 => 128, 64;
}

#[derive(Clone)]
pub(crate) struct Hmac<H: Hash> {
    inner: H,
    outer: H,
}

impl<H: Hash> core::fmt::Debug for Hmac<H> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("Hmac { ... }")
    }
}

impl<H: Hash> Hmac<H> {
    #[inline]
    #[must_use]
    pub fn new_from_slice(key: &[u8]) -> Self {
        let mut buf = [0; MAX_BLOCK_LEN];
        if key.len() <= H::BLOCK_LEN {
            buf[..key.len()].copy_from_slice(key);
        } else {
            let mut h = H::empty();
            h.absorb(key);
            h.finish_into(&mut buf[..H::OUTPUT_LEN]);
        }
        let pad = &mut buf[..H::BLOCK_LEN];
        for b in pad.iter_mut() {
            *b ^= 0x36;
        }
        let mut inner = H::empty();
        inner.absorb(pad);
        for b in pad.iter_mut() {
            *b ^= 0x36 ^ 0x5c;
        }
        let mut outer = H::empty();
        outer.absorb(pad);
        buf.erase();
        Self { inner, outer }
    }

    #[inline]
    pub fn update(&mut self, input: &[u8]) {
        self.inner.absorb(input);
    }

    /// Writes the tag into `out`, which must be exactly `H::OUTPUT_LEN` long.
    #[inline]
    pub fn finalize_into(self, out: &mut [u8]) {
        let Self { inner, mut outer } = self;
        let mut hash = [0; MAX_OUTPUT_LEN];
        inner.finish_into(&mut hash[..H::OUTPUT_LEN]);
        outer.absorb(&hash[..H::OUTPUT_LEN]);
        outer.finish_into(out);
        hash.erase();
    }
}
