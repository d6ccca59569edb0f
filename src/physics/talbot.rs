//! Talbot self-imaging relations.
//!
//! The fractional Talbot distance of a grating with pitch `p` is:
//!
//! ```text
//! D = n · p² / (8λ),   λ = hc / E
//! ```
//!
//! In a cone beam the self-image is magnified. With `l` the distance from the
//! (effective) source to G1 and `d` the G1–G2 distance:
//!
//! - magnification `M = (l + d) / l`
//! - parallel-equivalent Talbot distance `D = l·d / (l + d)`, i.e. `d = l·D / (l − D)`
//!
//! Distances are in mm, energies in keV. Pitches passed to these helpers are in
//! mm; the conversion from/to µm happens at the edges of the resolver.

use crate::error::ResolveError;

/// Planck constant times speed of light (keV·mm).
pub const HC_KEV_MM: f64 = 1.239_841_984e-6;

/// Micrometres per millimetre.
pub const UM_PER_MM: f64 = 1000.0;

/// Wavelength (mm) of a photon with the given energy (keV).
pub fn wavelength_mm(energy_kev: f64) -> f64 {
    HC_KEV_MM / energy_kev
}

/// Talbot relation at a fixed design energy and order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Talbot {
    /// `n / (8λ)` in 1/mm, so that `D = k·p²`.
    k: f64,
}

impl Talbot {
    pub fn new(design_energy_kev: f64, order: u32) -> Result<Self, ResolveError> {
        if !(design_energy_kev.is_finite() && design_energy_kev > 0.0) {
            return Err(ResolveError::geometry(format!(
                "design energy must be a positive number of keV, got {design_energy_kev}"
            )));
        }
        if order == 0 {
            return Err(ResolveError::geometry("Talbot order must be at least 1"));
        }
        let lambda = wavelength_mm(design_energy_kev);
        Ok(Self {
            k: f64::from(order) / (8.0 * lambda),
        })
    }

    pub fn k(&self) -> f64 {
        self.k
    }

    /// Parallel-beam Talbot distance (mm) for a G1 pitch (mm).
    pub fn distance(&self, pitch_mm: f64) -> f64 {
        self.k * pitch_mm * pitch_mm
    }

    /// G1 pitch (mm) whose parallel-beam Talbot distance is `distance_mm`.
    pub fn pitch(&self, distance_mm: f64) -> f64 {
        (distance_mm / self.k).sqrt()
    }
}

/// Cone-beam magnification from the upstream distance `l` to the G1–G2 distance `d`.
pub fn magnification(l: f64, d: f64) -> f64 {
    (l + d) / l
}

/// Parallel-equivalent Talbot distance of a cone-beam setup.
pub fn parallel_equivalent(l: f64, d: f64) -> f64 {
    l * d / (l + d)
}

/// Magnified G1–G2 distance for an upstream distance `l` and Talbot distance `talbot`.
///
/// Requires `l > talbot`; closer than that the self-image never forms.
pub fn cone_distance(l: f64, talbot: f64) -> Result<f64, ResolveError> {
    if l <= talbot {
        return Err(ResolveError::geometry(format!(
            "upstream distance {l} mm must exceed the Talbot distance {talbot} mm"
        )));
    }
    Ok(l * talbot / (l - talbot))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wavelength_at_25_kev() {
        let lambda = wavelength_mm(25.0);
        assert!((lambda - 4.959_367_936e-8).abs() < 1e-15);
    }

    #[test]
    fn talbot_distance_and_pitch_are_inverse() {
        let t = Talbot::new(25.0, 1).unwrap();
        let p = 5.0e-3;
        let d = t.distance(p);
        // n·p²/(8λ) = 2.5e-5 / (8 · 4.9594e-8) ≈ 63.01 mm
        assert!((d - 63.012).abs() < 1e-2, "got {d}");
        assert!((t.pitch(d) - p).abs() < 1e-15);
    }

    #[test]
    fn talbot_order_scales_distance() {
        let t1 = Talbot::new(30.0, 1).unwrap();
        let t3 = Talbot::new(30.0, 3).unwrap();
        let p = 4.0e-3;
        assert!((t3.distance(p) - 3.0 * t1.distance(p)).abs() < 1e-9);
    }

    #[test]
    fn invalid_energy_and_order_are_rejected() {
        assert!(Talbot::new(0.0, 1).is_err());
        assert!(Talbot::new(f64::NAN, 1).is_err());
        assert!(Talbot::new(25.0, 0).is_err());
    }

    #[test]
    fn cone_relations_are_consistent() {
        let (l, talbot) = (1000.0, 100.0);
        let d = cone_distance(l, talbot).unwrap();
        assert!((parallel_equivalent(l, d) - talbot).abs() < 1e-9);
        assert!((magnification(l, d) - l / (l - talbot)).abs() < 1e-12);
        assert!(cone_distance(50.0, 100.0).is_err());
    }
}
