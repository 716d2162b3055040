//! Quadrature rules for the reference interval `[-1, 1]`.

use crate::{Error, Rule};
use std::f64::consts::PI;

const MAX_NEWTON_ITERATIONS: usize = 100;

/// Legendre polynomial `p_n` and its predecessor `p_{n-1}`, evaluated at a point.
///
/// The derivative formula is singular at `|x| == 1`, so only use it in the open interval.
#[derive(Debug, Clone, Copy)]
struct Legendre {
    n: usize,
    x: f64,
    p_n: f64,
    p_n_minus_1: f64,
}

impl Legendre {
    fn evaluate(n: usize, x: f64) -> Self {
        // Bonnet's recursion: m p_m = (2m - 1) x p_{m-1} - (m - 1) p_{m-2}
        let (mut p_n, mut p_n_minus_1) = (1.0, 0.0);
        for m in 1..=n {
            let m = m as f64;
            let p_next = ((2.0 * m - 1.0) * x * p_n - (m - 1.0) * p_n_minus_1) / m;
            p_n_minus_1 = p_n;
            p_n = p_next;
        }
        Self { n, x, p_n, p_n_minus_1 }
    }

    fn value(&self) -> f64 {
        self.p_n
    }

    fn derivative(&self) -> f64 {
        let n = self.n as f64;
        n * (self.x * self.p_n - self.p_n_minus_1) / (self.x * self.x - 1.0)
    }
}

/// Gauss-Legendre quadrature on `[-1, 1]` with `num_points` points.
///
/// A rule with `n` points integrates polynomials of degree up to `2n - 1` exactly. Points are
/// returned in descending order.
///
/// Returns [`Error::NoRuleAvailable`] if zero points are requested.
pub fn try_gauss(num_points: usize) -> Result<Rule<1>, Error> {
    let n = num_points;
    if n == 0 {
        return Err(Error::NoRuleAvailable);
    }

    let mut points = Vec::with_capacity(n);
    let mut weights = Vec::with_capacity(n);

    // Roots are symmetric about the origin, so only the non-negative half is searched
    let num_searched = (n + 1) / 2;
    for i in 0..num_searched {
        let mut x = (PI * (i as f64 + 0.75) / (n as f64 + 0.5)).cos();
        let mut legendre = Legendre::evaluate(n, x);
        for _ in 0..MAX_NEWTON_ITERATIONS {
            let dx = -legendre.value() / legendre.derivative();
            x += dx;
            legendre = Legendre::evaluate(n, x);
            if dx.abs() <= 1e-15 {
                break;
            }
        }
        let dp = legendre.derivative();
        points.push([x]);
        weights.push(2.0 / ((1.0 - x * x) * dp * dp));
    }

    for i in num_searched..n {
        let mirror = n - i - 1;
        points.push([-points[mirror][0]]);
        weights.push(weights[mirror]);
    }

    debug_assert_eq!(points.len(), n);
    Ok((weights, points))
}

/// Gauss-Legendre quadrature on `[-1, 1]` with `num_points` points.
///
/// # Panics
///
/// Panics if zero points are requested.
pub fn gauss(num_points: usize) -> Rule<1> {
    try_gauss(num_points).expect("number of points must be positive")
}
