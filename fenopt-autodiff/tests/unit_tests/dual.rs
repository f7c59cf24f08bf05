use fenopt_autodiff::{DiffScalar, Dual};
use matrixcompare::assert_scalar_eq;
use proptest::prelude::*;

/// Derivative of `f` at `x` using a seeded dual number.
fn derivative(f: impl Fn(Dual) -> Dual, x: f64) -> f64 {
    f(Dual::variable(x)).eps
}

#[test]
fn dual_arithmetic_matches_hand_derivatives() {
    // d/dx (3 x^2 + 2x - 1) = 6x + 2
    let f = |x: Dual| x * x * 3.0 + x * 2.0 - 1.0;
    assert_scalar_eq!(derivative(f, 1.5), 11.0, comp = float);

    // d/dx (1 / x) = -1 / x^2
    let g = |x: Dual| 1.0 / x;
    assert_scalar_eq!(derivative(g, 2.0), -0.25, comp = float);

    // d/dx (x / (x + 1)) = 1 / (x + 1)^2
    let h = |x: Dual| x / (x + 1.0);
    assert_scalar_eq!(derivative(h, 3.0), 1.0 / 16.0, comp = float);
}

#[test]
fn dual_elementary_functions() {
    assert_scalar_eq!(derivative(|x| x.sqrt(), 4.0), 0.25, comp = float);
    assert_scalar_eq!(derivative(|x| x.ln(), 2.0), 0.5, comp = float);
    assert_scalar_eq!(derivative(|x| x.powi(3), 2.0), 12.0, comp = float);
    assert_scalar_eq!(derivative(|x| x.powi(-2), 2.0), -0.25, comp = float);
    assert_eq!(Dual::variable(5.0).powi(0), Dual::constant(1.0));
}

#[test]
fn dual_assign_operators() {
    let mut x = Dual::variable(2.0);
    x += 1.0;
    x *= Dual::variable(2.0);
    x -= Dual::constant(1.0);
    x /= 2.0;
    // x = ((t + 1) t - 1) / 2 at t = 2, dx/dt = (2t + 1) / 2
    assert_scalar_eq!(x.re, 2.5, comp = float);
    assert_scalar_eq!(x.eps, 2.5, comp = float);
}

#[test]
fn f64_diff_scalar_is_identity_lift() {
    assert_eq!(<f64 as DiffScalar>::from_value(3.0), 3.0);
    assert_eq!(DiffScalar::value(&3.0f64), 3.0);
    assert_eq!(<f64 as DiffScalar>::recip(4.0), 0.25);
}

proptest! {
    #[test]
    fn dual_product_rule(a in -10.0..10.0f64, b in -10.0..10.0f64) {
        // d/dx (x (x + b)) at x = a is 2a + b
        let x = Dual::variable(a);
        let y = x * (x + b);
        prop_assert!((y.eps - (2.0 * a + b)).abs() <= 1e-12 * (1.0 + a.abs() + b.abs()));
        prop_assert!((y.re - a * (a + b)).abs() <= 1e-12 * (1.0 + a * a + (a * b).abs()));
    }
}
