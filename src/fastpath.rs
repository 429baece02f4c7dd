//! Vectorized conversion path for the primary (dipstick) sensor.
//!
//! During continuous acquisition the thermometer column arrives as whole sample buffers, and
//! pushing every element through the scalar dispatch of the `curve` module is wasted work.
//! This path trades edge-of-range fidelity for throughput, and its clamping policy is
//! deliberately different from the scalar path's:
//!
//! - input is clipped to [40, 10000] ohm *before* evaluation, so the log-space fits never see
//!   a non-positive or absurd resistance (the scalar path instead relies on its open-ended
//!   boundary segments);
//! - output is clipped to [4, 350] K *after* evaluation (the scalar path instead zeroes
//!   results outside (0, 400) K).
//!
//! The two policies must not be unified: this path is an approximation optimized for speed,
//! and log files produced by either must keep matching their historical counterparts.
//! Inside the shared span the two paths agree to well under 1e-6 relative.

use ndarray::{Array1, ArrayView1};

use crate::evaluator::*;
use crate::sensors::*;

/// Input safety range in ohms.
pub const DIPSTICK_CLIP_OHM: (f64, f64) = (40.0, 10000.0);
/// Output safety range in kelvin.
pub const DIPSTICK_CLIP_KELVIN: (f64, f64) = (4.0, 350.0);

/// Elementwise dipstick conversion over a sample buffer.
///
/// Holds the three segment fits so a buffer pass does no dispatch or validation beyond one
/// boundary comparison per element.
///
/// # Examples
///
/// ```
/// use ndarray::array;
/// use thermocal_backend::fastpath::DipstickFast;
///
/// let fast = DipstickFast::new();
/// let t = fast.convert_arr(array![1000.0, 50.0].view());
/// assert!(17.0 < t[0] && t[0] < 20.0);
/// assert!(t[1] > 200.0);
/// ```
pub struct DipstickFast {
    low: Series,
    mid: Series,
    high: Series,
}

impl DipstickFast {
    pub fn new() -> Self {
        Self {
            low: Series::new_log_domain(DIPSTICK_COEF_LOW.to_vec(), DIPSTICK_DOMAIN_LOW),
            mid: Series::new_log_domain(DIPSTICK_COEF_MID.to_vec(), DIPSTICK_DOMAIN_MID),
            high: Series::new_log_domain(DIPSTICK_COEF_HIGH.to_vec(), DIPSTICK_DOMAIN_HIGH),
        }
    }

    /// Converts a buffer of resistances (ohms) to temperatures (kelvin), one pass.
    pub fn convert_arr(&self, r: ArrayView1<f64>) -> Array1<f64> {
        r.mapv(|ri| {
            let ri = ri.clamp(DIPSTICK_CLIP_OHM.0, DIPSTICK_CLIP_OHM.1);
            let series = if ri >= DIPSTICK_SPLIT_LOW_MID_OHM {
                &self.low
            } else if ri >= DIPSTICK_SPLIT_MID_HIGH_OHM {
                &self.mid
            } else {
                &self.high
            };
            series
                .eval(ri)
                .clamp(DIPSTICK_CLIP_KELVIN.0, DIPSTICK_CLIP_KELVIN.1)
        })
    }
}

impl Default for DipstickFast {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use crate::curve::*;
    use crate::fastpath::*;
    use ndarray::Array1;

    #[test]
    fn agrees_with_scalar_path_inside_shared_span() {
        let fast = DipstickFast::new();
        let scalar = Curve::dipstick();
        let r = Array1::linspace(46.0, 9500.0, 2000);
        let t_fast = fast.convert_arr(r.view());
        for (ri, tf) in r.iter().zip(t_fast.iter()) {
            let ts = scalar.kelvin(*ri, 1.0);
            assert!(
                ((tf - ts) / ts).abs() < 1e-6,
                "fast {} vs scalar {} at {} ohm",
                tf,
                ts,
                ri
            );
        }
    }

    #[test]
    fn input_is_clipped_before_evaluation() {
        let fast = DipstickFast::new();
        let t = fast.convert_arr(ndarray::array![0.0, 1.0, 40.0, 1e9, 10000.0].view());
        assert_eq!(t[0], t[2]);
        assert_eq!(t[1], t[2]);
        assert_eq!(t[3], t[4]);
    }

    #[test]
    fn output_stays_in_safety_range() {
        let fast = DipstickFast::new();
        let r = Array1::linspace(1.0, 20000.0, 500);
        for t in fast.convert_arr(r.view()).iter() {
            assert!((DIPSTICK_CLIP_KELVIN.0..=DIPSTICK_CLIP_KELVIN.1).contains(t));
        }
    }

    #[test]
    fn boundary_policies_differ_from_scalar() {
        let fast = DipstickFast::new();
        let scalar = Curve::dipstick();
        // A dead-short reads 0 ohm: scalar zeroes it, fast clamps it to the warm end
        assert_eq!(scalar.kelvin(0.0, 1.0), 0.0);
        let t = fast.convert_arr(ndarray::array![0.0].view());
        assert!(t[0] >= DIPSTICK_CLIP_KELVIN.0);
    }
}
