//! Half-integers for angular momentum quantities.
use std::ops::{Add, Neg, Sub};

/// Type that logically behaves like half-integers, but what is actually
/// stored is twice its logical value.
///
/// For example, `Half(3)` represents the fraction `3/2`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Half<T>(pub T);

impl<T> Half<T> {
    /// Unwrap to twice its logical value.
    #[inline]
    pub fn twice(self) -> T {
        self.0
    }
}

impl<T: Add<U>, U> Add<Half<U>> for Half<T> {
    type Output = Half<T::Output>;
    #[inline]
    fn add(self, other: Half<U>) -> Self::Output {
        Half(self.0 + other.0)
    }
}

impl<T: Sub<U>, U> Sub<Half<U>> for Half<T> {
    type Output = Half<T::Output>;
    #[inline]
    fn sub(self, other: Half<U>) -> Self::Output {
        Half(self.0 - other.0)
    }
}

impl<T: Neg> Neg for Half<T> {
    type Output = Half<T::Output>;
    #[inline]
    fn neg(self) -> Self::Output {
        Half(-self.0)
    }
}

/// Iterator over half-integers in steps of one, both ends inclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HalfRange {
    pub start: Half<i32>,
    pub end: Half<i32>,
}

impl Iterator for HalfRange {
    type Item = Half<i32>;
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.start > self.end {
            return None;
        }
        let x = self.start;
        self.start = Half(self.start.0 + 2);
        Some(x)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = if self.start > self.end {
            0
        } else {
            ((self.end.0 - self.start.0) / 2 + 1) as usize
        };
        (n, Some(n))
    }
}

impl ExactSizeIterator for HalfRange {}

impl Half<i32> {
    /// Spin of a center with the given multiplicity `2 s + 1`.
    #[inline]
    pub fn from_multiplicity(mult: u32) -> Self {
        debug_assert!(mult > 0, "multiplicity must be positive");
        Half(mult as i32 - 1)
    }

    /// Multiplicity `2 j + 1`.
    #[inline]
    pub fn multiplicity(self) -> u32 {
        (self.0 + 1) as u32
    }

    /// Obtain the range of values that satisfy the triangular condition,
    /// i.e. the range from `|self − other|` to `self + other` (inclusive).
    #[inline]
    pub fn tri_range(self, other: Self) -> HalfRange {
        HalfRange {
            start: Half((self.0 - other.0).abs()),
            end: self + other,
        }
    }

    /// Projections `-j, -j + 1, …, j`.
    #[inline]
    pub fn multiplet(self) -> HalfRange {
        HalfRange { start: -self, end: self }
    }

    /// Whether `(a, b, c)` satisfy the triangle condition, including
    /// integrality of `a + b + c`.
    #[inline]
    pub fn triangle(a: Self, b: Self, c: Self) -> bool {
        c.0 >= (a.0 - b.0).abs() && c.0 <= a.0 + b.0 && (a.0 + b.0 + c.0) % 2 == 0
    }

    /// Returns `(2 j + 1)^(exponent / 2)`.
    #[inline]
    pub fn weight(self, exponent: i32) -> f64 {
        ((self.twice() + 1) as f64).powf(exponent as f64 / 2.0)
    }

    /// `j (j + 1)`
    #[inline]
    pub fn casimir(self) -> f64 {
        let j = self.0 as f64 / 2.0;
        j * (j + 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tri_range() {
        let js: Vec<_> = Half(1).tri_range(Half(2)).collect();
        assert_eq!(js, vec![Half(1), Half(3)]);
        let js: Vec<_> = Half(2).tri_range(Half(2)).collect();
        assert_eq!(js, vec![Half(0), Half(2), Half(4)]);
        let js: Vec<_> = Half(1).tri_range(Half(4)).collect();
        assert_eq!(js, vec![Half(3), Half(5)]);
        assert_eq!(Half(3).multiplet().len(), 4);
        assert!(Half::triangle(Half(1), Half(1), Half(2)));
        assert!(!Half::triangle(Half(1), Half(1), Half(1)));
        assert!(!Half::triangle(Half(1), Half(1), Half(4)));
    }

    #[test]
    fn test_spin_quantities() {
        assert_eq!(Half::from_multiplicity(4), Half(3));
        assert_eq!(Half(3).multiplicity(), 4);
        assert_eq!(Half(2).casimir(), 2.0);
        assert_eq!(Half(3).weight(2), 4.0);
        assert_eq!(Half(3) - Half(1), Half(2));
    }
}
