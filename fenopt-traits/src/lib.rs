//! Scalar traits shared by the `fenopt` crates.
use nalgebra::{RealField, Scalar};
use num::{One, Zero};
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

pub use nalgebra;

/// Real scalar type used by the numerical routines in `fenopt`.
pub trait Real: RealField + Copy {}

impl<T: RealField + Copy> Real for T {}

/// A scalar that residual evaluation code can be generic over.
///
/// Implemented by `f64` for plain evaluation and by derivative-carrying number types
/// (see `fenopt-autodiff`) so that the same residual code yields exact tangents.
/// Mixed arithmetic with `f64` constants is supported directly, so that material
/// parameters and quadrature weights need not be lifted by hand.
pub trait DiffScalar:
    Scalar
    + Copy
    + Send
    + Sync
    + Zero
    + One
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
    + AddAssign
    + SubAssign
    + MulAssign
    + DivAssign
    + Add<f64, Output = Self>
    + Sub<f64, Output = Self>
    + Mul<f64, Output = Self>
    + Div<f64, Output = Self>
{
    /// Lifts a constant into the scalar type (zero derivative).
    fn from_value(value: f64) -> Self;

    /// The primal value, discarding any derivative information.
    fn value(&self) -> f64;

    fn sqrt(self) -> Self;

    fn ln(self) -> Self;

    fn powi(self, n: i32) -> Self;

    fn recip(self) -> Self {
        Self::one() / self
    }
}

impl DiffScalar for f64 {
    fn from_value(value: f64) -> Self {
        value
    }

    fn value(&self) -> f64 {
        *self
    }

    fn sqrt(self) -> Self {
        f64::sqrt(self)
    }

    fn ln(self) -> Self {
        f64::ln(self)
    }

    fn powi(self, n: i32) -> Self {
        f64::powi(self, n)
    }
}
