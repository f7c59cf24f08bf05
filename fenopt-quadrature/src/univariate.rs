//! Quadrature rules for the one-dimensional domain `[-1, 1]`.

use crate::{Error, Rule};
use std::f64::consts::PI;

const MAX_NEWTON_ITERATIONS: usize = 100;

/// Evaluates the Legendre polynomial $P_n$ and its derivative at `x`.
///
/// Uses the three-term recurrence
/// $m P_m(x) = (2m - 1) x P_{m - 1}(x) - (m - 1) P_{m - 2}(x)$.
/// The derivative formula is singular at |x| == 1, so `x` must lie in the open interval (-1, 1).
fn legendre(n: usize, x: f64) -> (f64, f64) {
    let (mut p_prev, mut p) = (0.0, 1.0);
    for m in 1..=n {
        let m = m as f64;
        let p_next = ((2.0 * m - 1.0) * x * p - (m - 1.0) * p_prev) / m;
        p_prev = p;
        p = p_next;
    }
    let dp = n as f64 * (x * p - p_prev) / (x * x - 1.0);
    (p, dp)
}

/// Gauss–Legendre quadrature for the reference interval `[-1, 1]`.
///
/// Given `n` points, the rule integrates polynomials of degree up to `2n - 1` exactly.
/// Points are returned in increasing order.
///
/// Returns [`Error::NoRuleAvailable`] if zero points are requested.
pub fn try_gauss(num_points: usize) -> Result<Rule<1>, Error> {
    let n = num_points;
    if n == 0 {
        return Err(Error::NoRuleAvailable);
    }

    // Roots are symmetric about zero, so only the positive half (and zero for odd n) is computed
    let num_unique = (n + 1) / 2;
    let mut half = Vec::with_capacity(num_unique);
    for i in 0..num_unique {
        // Tricomi's initial guess for the i-th largest root
        let mut x = (PI * (i as f64 + 0.75) / (n as f64 + 0.5)).cos();
        let mut converged = false;
        for _ in 0..MAX_NEWTON_ITERATIONS {
            let (p, dp) = legendre(n, x);
            let dx = p / dp;
            x -= dx;
            if dx.abs() <= 1e-15 {
                converged = true;
                break;
            }
        }
        if !converged {
            return Err(Error::RootFindingFailed { num_points: n });
        }
        let (_, dp) = legendre(n, x);
        half.push((x, 2.0 / ((1.0 - x * x) * dp * dp)));
    }

    let mut weights = Vec::with_capacity(n);
    let mut points = Vec::with_capacity(n);
    // Mirrored negative roots first, then the computed ones, both in increasing order. For odd n
    // the last computed root is zero and is not mirrored.
    for &(x, w) in half.iter().take(n / 2) {
        points.push([-x]);
        weights.push(w);
    }
    for &(x, w) in half.iter().rev() {
        points.push([x]);
        weights.push(w);
    }

    debug_assert_eq!(points.len(), n);
    Ok((weights, points))
}

/// Same as [`try_gauss`], but panics if no rule can be constructed.
///
/// # Panics
///
/// Panics if zero points are requested.
pub fn gauss(num_points: usize) -> Rule<1> {
    try_gauss(num_points).unwrap_or_else(|err| panic!("{err}"))
}
