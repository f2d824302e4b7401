use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

/// 192-bit unsigned integer implemented as 3 little-endian u64 limbs.
///
/// Used as the accumulator for blue work, which consensus code sums through
/// [`Uint192::checked_add`]. Like the primitive integers, the operator impls
/// panic on overflow in debug builds and saturate at [`Uint192::MAX`] otherwise.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Uint192([u64; 3]);

impl Uint192 {
    pub const ZERO: Self = Self([0; 3]);
    pub const MAX: Self = Self([u64::MAX; 3]);
    pub const BITS: u32 = 192;

    /// Builds a value from little-endian limbs
    pub const fn from_limbs(limbs: [u64; 3]) -> Self {
        Self(limbs)
    }

    pub const fn limbs(&self) -> [u64; 3] {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0; 3]
    }

    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        let (r0, c0) = self.0[0].overflowing_add(rhs.0[0]);
        let (r1a, c1a) = self.0[1].overflowing_add(rhs.0[1]);
        let (r1, c1b) = r1a.overflowing_add(c0 as u64);
        let (r2a, c2a) = self.0[2].overflowing_add(rhs.0[2]);
        let (r2, c2b) = r2a.overflowing_add((c1a || c1b) as u64);
        if c2a || c2b {
            None
        } else {
            Some(Self([r0, r1, r2]))
        }
    }

    pub fn saturating_add(self, rhs: Self) -> Self {
        self.checked_add(rhs).unwrap_or(Self::MAX)
    }

    /// Returns little-endian bytes (24 bytes)
    pub fn to_le_bytes(&self) -> [u8; 24] {
        let mut out = [0u8; 24];
        out[0..8].copy_from_slice(&self.0[0].to_le_bytes());
        out[8..16].copy_from_slice(&self.0[1].to_le_bytes());
        out[16..24].copy_from_slice(&self.0[2].to_le_bytes());
        out
    }

    /// Returns big-endian bytes (24 bytes)
    pub fn to_be_bytes(&self) -> [u8; 24] {
        let mut out = self.to_le_bytes();
        out.reverse();
        out
    }
}

impl From<u64> for Uint192 {
    fn from(v: u64) -> Self {
        Self([v, 0, 0])
    }
}

impl From<u128> for Uint192 {
    fn from(v: u128) -> Self {
        Self([v as u64, (v >> 64) as u64, 0])
    }
}

impl Ord for Uint192 {
    fn cmp(&self, other: &Self) -> Ordering {
        // most significant limb first
        self.0[2].cmp(&other.0[2]).then(self.0[1].cmp(&other.0[1])).then(self.0[0].cmp(&other.0[0]))
    }
}

impl PartialOrd for Uint192 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl AddAssign for Uint192 {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Add for Uint192 {
    type Output = Uint192;
    fn add(self, rhs: Self) -> Self::Output {
        let sum = self.checked_add(rhs);
        debug_assert!(sum.is_some(), "Uint192 addition overflow");
        sum.unwrap_or(Self::MAX)
    }
}

impl Sum for Uint192 {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, v| acc + v)
    }
}

impl fmt::Display for Uint192 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bytes = self.to_be_bytes();
        let first = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len() - 1);
        write!(f, "0x")?;
        for byte in &bytes[first..] {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Uint192;

    #[test]
    fn add_carries_across_limbs() {
        let a = Uint192::from(u64::MAX);
        let b = Uint192::from(1u64);
        assert_eq!(a + b, Uint192::from_limbs([0, 1, 0]));

        let c = Uint192::from_limbs([u64::MAX, u64::MAX, 0]);
        assert_eq!(c.checked_add(Uint192::from(1u64)), Some(Uint192::from_limbs([0, 0, 1])));
    }

    #[test]
    fn overflow_is_detected() {
        assert_eq!(Uint192::MAX.checked_add(Uint192::from(1u64)), None);
        assert_eq!(Uint192::MAX.saturating_add(Uint192::from(1u64)), Uint192::MAX);
        assert_eq!(Uint192::MAX + Uint192::ZERO, Uint192::MAX);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "Uint192 addition overflow")]
    fn operator_overflow_panics_in_debug() {
        let mut work = Uint192::MAX;
        work += Uint192::from(1u64);
    }

    #[test]
    #[cfg(not(debug_assertions))]
    fn operator_overflow_saturates_in_release() {
        assert_eq!(Uint192::MAX + Uint192::from(1u64), Uint192::MAX);
    }

    #[test]
    fn ordering_uses_most_significant_limb() {
        let high = Uint192::from_limbs([0, 0, 1]);
        let low = Uint192::from_limbs([u64::MAX, u64::MAX, 0]);
        assert!(high > low);
        assert!(Uint192::from(2u64) > Uint192::from(1u64));
    }

    #[test]
    fn sum_and_display() {
        let total: Uint192 = [1u64, 2, 3].into_iter().map(Uint192::from).sum();
        assert_eq!(total, Uint192::from(6u64));
        assert_eq!(Uint192::from(0x1234u64).to_string(), "0x1234");
        assert_eq!(Uint192::ZERO.to_string(), "0x00");
    }
}
