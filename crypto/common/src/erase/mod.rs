#![allow(clippy::module_name_repetitions)]

#[inline(always)]
fn atomic_fence() {
    core::sync::atomic::compiler_fence(core::sync::atomic::Ordering::SeqCst);
}

#[inline(always)]
fn volatile_write<T: Copy + Sized>(src: T, dst: &mut T) {
    unsafe { core::ptr::write_volatile(dst, src) }
}

/// Overwrite a value with zeros in a way the optimizer cannot elide.
pub trait Erase {
    fn erase(&mut self);
}

/// Marker for types that erase themselves in their `Drop` impl.
pub trait EraseOnDrop {}

trait DefaultIsErased: Copy + Default + Sized {}

impl<E: DefaultIsErased> Erase for E {
    fn erase(&mut self) {
        volatile_write(E::default(), self);
        atomic_fence();
    }
}

macro_rules! impl_default_is_erased {
    ($($t:ty),*) => {
        $(
            impl DefaultIsErased for $t {}
        )*
    };
}

#[rustfmt::skip]
impl_default_is_erased! {
    bool, char,
    i8, i16, i32, i64, i128, isize,
    u8, u16, u32, u64, u128, usize
}

impl Erase for core::mem::MaybeUninit<u8> {
    fn erase(&mut self) {
        volatile_write(Self::new(0), self);
        atomic_fence();
    }
}

impl<E: Erase, const N: usize> Erase for [E; N] {
    fn erase(&mut self) {
        self.iter_mut().erase();
    }
}

impl<E: EraseOnDrop, const N: usize> EraseOnDrop for [E; N] {}

impl<E: Erase> Erase for [E] {
    fn erase(&mut self) {
        self.iter_mut().erase();
    }
}

impl<E: Erase> Erase for core::slice::IterMut<'_, E> {
    fn erase(&mut self) {
        for elem in self {
            elem.erase();
        }
    }
}

/// Scrub password-derived material from `buf`.
///
/// Every byte is overwritten with a volatile store and the writes are fenced,
/// so the zeroing survives dead-store elimination even when `buf` is about to
/// be freed.
#[inline]
pub fn cleanse(buf: &mut [u8]) {
    buf.erase();
}
