use core::ops::{BitAnd, BitAndAssign, Not};

/// A boolean that is only ever inspected without branching on its value.
#[derive(Debug, Clone, Copy)]
pub struct Choice(u8);

impl Choice {
    #[inline]
    #[must_use]
    pub const fn to_u8(self) -> u8 {
        self.0
    }
}

impl From<Choice> for bool {
    #[inline]
    fn from(value: Choice) -> Self {
        debug_assert!((value.0 == 0) | (value.0 == 1));
        value.0 != 0
    }
}

impl BitAnd for Choice {
    type Output = Self;

    #[inline]
    fn bitand(self, rhs: Self) -> Self::Output {
        (self.0 & rhs.0).into()
    }
}

impl BitAndAssign for Choice {
    #[inline]
    fn bitand_assign(&mut self, rhs: Self) {
        *self = *self & rhs;
    }
}

impl Not for Choice {
    type Output = Self;

    #[inline]
    fn not(self) -> Self::Output {
        (1 & (!self.0)).into()
    }
}

#[cfg(not(feature = "core_hint_black_box"))]
#[inline(never)]
fn black_box(input: u8) -> u8 {
    debug_assert!((input == 0) | (input == 1));
    unsafe { core::ptr::read_volatile(&input) }
}

#[cfg(feature = "core_hint_black_box")]
#[inline(never)]
fn black_box(input: u8) -> u8 {
    debug_assert!((input == 0) | (input == 1));
    core::hint::black_box(input)
}

impl From<u8> for Choice {
    #[inline]
    fn from(value: u8) -> Self {
        Self(black_box(value))
    }
}

#[allow(clippy::module_name_repetitions)]
pub trait ConstantTimeEq {
    fn ct_eq(&self, other: &Self) -> Choice;

    #[inline]
    fn ct_ne(&self, other: &Self) -> Choice {
        !self.ct_eq(other)
    }
}

/// Lengths are compared in the clear; only the contents are constant time.
impl<T: ConstantTimeEq> ConstantTimeEq for [T] {
    #[inline]
    fn ct_eq(&self, other: &Self) -> Choice {
        if self.len() != other.len() {
            return Choice::from(0);
        }
        let mut x = 1;
        for (a, b) in self.iter().zip(other.iter()) {
            x &= a.ct_eq(b).to_u8();
        }
        x.into()
    }
}

macro_rules! impl_uints {
    ($($u:ty => $w:expr),+ $(,)?) => {
        $(
            impl ConstantTimeEq for $u {
                #[inline]
                #[allow(trivial_numeric_casts, clippy::cast_possible_truncation)]
                fn ct_eq(&self, other: &Self) -> Choice {
                    let x = self ^ other;
                    let y = (x | x.wrapping_neg()) >> ($w - 1);
                    ((y ^ 1) as u8).into()
                }
            }
        )+
    };
}

impl_uints!(u8 => 8, u32 => 32, u64 => 64);
