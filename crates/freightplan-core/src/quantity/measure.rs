// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use num_traits::{Float, Zero};
use std::{
    iter::Sum,
    ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign},
};

pub trait UnitName {
    const SYMBOL: &'static str;
}

/// A scalar tagged with a unit marker so that weights, volumes and money
/// cannot be mixed up in arithmetic.
#[repr(transparent)]
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Measure<T, U>(T, core::marker::PhantomData<U>);

impl<T, U> Measure<T, U> {
    #[inline]
    pub const fn new(value: T) -> Self {
        Measure(value, core::marker::PhantomData)
    }

    #[inline]
    pub fn zero() -> Self
    where
        T: Zero,
    {
        Measure::new(T::zero())
    }

    #[inline]
    pub const fn value(&self) -> T
    where
        T: Copy,
    {
        self.0
    }

    #[inline]
    pub fn is_zero(&self) -> bool
    where
        T: Zero,
    {
        self.0.is_zero()
    }

    /// Dimensionless fraction of `self` over `denom`; zero when the
    /// denominator is not strictly positive.
    #[inline]
    pub fn ratio(self, denom: Self) -> T
    where
        T: Float,
    {
        if denom.0 <= T::zero() {
            T::zero()
        } else {
            self.0 / denom.0
        }
    }

    #[inline]
    pub fn min(self, other: Self) -> Self
    where
        T: Float,
    {
        Measure::new(self.0.min(other.0))
    }

    #[inline]
    pub fn max(self, other: Self) -> Self
    where
        T: Float,
    {
        Measure::new(self.0.max(other.0))
    }
}

impl<T: std::fmt::Display, U: UnitName> std::fmt::Display for Measure<T, U> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.0, U::SYMBOL)
    }
}

impl<T, U> Default for Measure<T, U>
where
    T: Zero,
{
    #[inline]
    fn default() -> Self {
        Measure::new(T::zero())
    }
}

impl<T, U> Add for Measure<T, U>
where
    T: Add<Output = T>,
{
    type Output = Measure<T, U>;

    #[inline]
    fn add(self, rhs: Self) -> Self::Output {
        Measure::new(self.0 + rhs.0)
    }
}

impl<T, U> AddAssign for Measure<T, U>
where
    T: AddAssign,
{
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl<T, U> Sub for Measure<T, U>
where
    T: Sub<Output = T>,
{
    type Output = Measure<T, U>;

    #[inline]
    fn sub(self, rhs: Self) -> Self::Output {
        Measure::new(self.0 - rhs.0)
    }
}

impl<T, U> SubAssign for Measure<T, U>
where
    T: SubAssign,
{
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl<T, U> Neg for Measure<T, U>
where
    T: Neg<Output = T>,
{
    type Output = Measure<T, U>;

    #[inline]
    fn neg(self) -> Self::Output {
        Measure::new(-self.0)
    }
}

impl<T, U> Mul<T> for Measure<T, U>
where
    T: Mul<Output = T>,
{
    type Output = Measure<T, U>;

    #[inline]
    fn mul(self, rhs: T) -> Self::Output {
        Measure::new(self.0 * rhs)
    }
}

impl<T, U> Div<T> for Measure<T, U>
where
    T: Div<Output = T>,
{
    type Output = Measure<T, U>;

    #[inline]
    fn div(self, rhs: T) -> Self::Output {
        Measure::new(self.0 / rhs)
    }
}

impl<T, U> Sum for Measure<T, U>
where
    T: Zero + Add<Output = T>,
{
    #[inline]
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Measure::new(T::zero()), |acc, m| acc + m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quantity::{Money, Weight};

    #[test]
    fn test_new_and_value() {
        let w = Weight::new(1200.0);
        assert_eq!(w.value(), 1200.0);
    }

    #[test]
    fn test_zero_and_default() {
        assert!(Weight::zero().is_zero());
        assert_eq!(Money::default(), Money::zero());
    }

    #[test]
    fn test_arithmetic() {
        let a = Weight::new(600.0);
        let b = Weight::new(400.0);
        assert_eq!((a + b).value(), 1000.0);
        assert_eq!((a - b).value(), 200.0);
        assert_eq!((-a).value(), -600.0);
        assert_eq!((a * 2.0).value(), 1200.0);
        assert_eq!((a / 2.0).value(), 300.0);

        let mut c = a;
        c += b;
        assert_eq!(c.value(), 1000.0);
        c -= b;
        assert_eq!(c.value(), 600.0);
    }

    #[test]
    fn test_sum() {
        let total: Money = [10.0, 20.0, 30.0].iter().map(|&v| Money::new(v)).sum();
        assert_eq!(total.value(), 60.0);
    }

    #[test]
    fn test_ratio_guards_non_positive_denominator() {
        let used = Weight::new(750.0);
        let cap = Weight::new(1000.0);
        assert_eq!(used.ratio(cap), 0.75);
        assert_eq!(used.ratio(Weight::zero()), 0.0);
        assert_eq!(used.ratio(Weight::new(-5.0)), 0.0);
    }

    #[test]
    fn test_ordering_is_value_ordering() {
        assert!(Weight::new(1.0) < Weight::new(2.0));
        assert!(Money::new(-3.0) < Money::zero());
    }

    #[test]
    fn test_min_max() {
        let a = Money::new(5.0);
        let b = Money::new(7.0);
        assert_eq!(a.min(b), a);
        assert_eq!(a.max(b), b);
    }

    #[test]
    fn test_display_carries_symbol() {
        assert_eq!(Weight::new(2.5).to_string(), "2.5 kg");
        assert_eq!(Money::new(100.0).to_string(), "100 INR");
    }
}
