//! Scalar root finding.
//!
//! The resolver only ever needs to invert monotone one-dimensional relations
//! (e.g. "which upstream distance gives this G2 pitch?"), so plain bisection is
//! enough and keeps the result deterministic.

/// Maximum number of bisection steps. Each step halves the bracket, so this is
/// far below `f64` resolution for any physical bracket.
const MAX_STEPS: usize = 200;

/// Find `x ∈ [lo, hi]` with `f(x) = 0` by bisection.
///
/// Returns `None` if `f` does not change sign over the bracket or produces a
/// non-finite value at an endpoint.
pub fn bisect<F>(f: F, lo: f64, hi: f64) -> Option<f64>
where
    F: Fn(f64) -> f64,
{
    let (mut lo, mut hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
    let mut f_lo = f(lo);
    let f_hi = f(hi);
    if !(f_lo.is_finite() && f_hi.is_finite()) {
        return None;
    }
    if f_lo == 0.0 {
        return Some(lo);
    }
    if f_hi == 0.0 {
        return Some(hi);
    }
    if f_lo.signum() == f_hi.signum() {
        return None;
    }

    for _ in 0..MAX_STEPS {
        let mid = 0.5 * (lo + hi);
        if mid <= lo || mid >= hi {
            break;
        }
        let f_mid = f(mid);
        if !f_mid.is_finite() {
            return None;
        }
        if f_mid == 0.0 {
            return Some(mid);
        }
        if f_mid.signum() == f_lo.signum() {
            lo = mid;
            f_lo = f_mid;
        } else {
            hi = mid;
        }
    }
    Some(0.5 * (lo + hi))
}

/// Real roots of `a·x² + b·x + c = 0` in ascending order (`a ≠ 0`).
pub fn quadratic_roots(a: f64, b: f64, c: f64) -> Option<(f64, f64)> {
    if a == 0.0 {
        return None;
    }
    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 || !disc.is_finite() {
        return None;
    }
    let sq = disc.sqrt();
    // Citardauq form for the smaller-magnitude root avoids cancellation.
    let q = -0.5 * (b + b.signum() * sq);
    let (r1, r2) = if q == 0.0 { (0.0, 0.0) } else { (q / a, c / q) };
    Some(if r1 <= r2 { (r1, r2) } else { (r2, r1) })
}
