//! Implements the piecewise structure of a calibration curve and the uniform segment-dispatch
//! algorithm shared by every sensor. See [`BaseCurve`] for implementation details.
//!
//! A curve is an ordered list of [`Segment`]s, highest resistance first (these are NTC-type
//! thermometers, so high resistance means low temperature). Conversion picks exactly one
//! segment per reading:
//!
//! 1. The corrected resistance is compared against the top segment's upper bound; anything
//!    above it extrapolates the top segment and is flagged [`RangeFlag::BelowRange`].
//! 2. Otherwise the first segment, in descending order, whose lower bound the resistance
//!    reaches wins. The first-match precedence is load-bearing: some boundary constants are
//!    empirically chosen crossing points of adjacent fits and sit closer together than the
//!    fit domains suggest.
//! 3. Anything below the bottom bound extrapolates the curve's designated overflow segment
//!    and is flagged [`RangeFlag::AboveRange`].
//!
//! Range diagnostics are part of the returned [`Conversion`] value instead of a warning side
//! channel, so a caller logging at 1 kSa/s can decide what to do with them without the
//! conversion path ever blocking or raising.

use ndarray::{Array1, ArrayView1};

use crate::evaluator::*;

/// Position of a corrected resistance relative to a curve's calibrated span.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum RangeFlag {
    /// Inside one of the calibrated sub-ranges.
    InRange,
    /// Resistance above the top boundary: the temperature is below the calibrated range.
    BelowRange,
    /// Resistance below the bottom boundary: the temperature is above the calibrated range.
    AboveRange,
}

/// One conversion outcome: the temperature and where the reading fell.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Conversion {
    pub kelvin: f64,
    pub flag: RangeFlag,
}

impl Conversion {
    pub fn in_range(&self) -> bool {
        self.flag == RangeFlag::InRange
    }
}

/// One resistance sub-range of a calibration curve.
///
/// `lower` and `upper` are in ohms and bound the span this segment claims during dispatch;
/// they need not coincide with the fit domain of `series` (crossing-point boundaries are the
/// rule, not the exception). Open-ended segments use `f64::INFINITY` / `f64::NEG_INFINITY`
/// and never flag.
#[derive(Clone, PartialEq)]
pub struct Segment {
    pub lower: f64,
    pub upper: f64,
    pub series: Series,
}

impl Segment {
    pub fn new(lower: f64, upper: f64, series: Series) -> Self {
        assert!(
            upper > lower,
            "Segment with series {} expects lower < upper, got ({}, {})",
            series,
            lower,
            upper
        );
        Segment {
            lower,
            upper,
            series,
        }
    }
}

/// Post-hoc validation applied to an evaluated temperature.
///
/// The two policies are intentionally not unified: the recent ("new") fits zero out
/// non-physical results, the older fits return whatever the series produced.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Validation {
    /// Return the evaluated value as is.
    Passthrough,
    /// Replace any result not finite and strictly inside (0, 400) K with the invalid
    /// sentinel 0.
    ZeroNonPhysical,
}

/// Physical sanity envelope for [`Validation::ZeroNonPhysical`], in kelvin.
pub const SANE_KELVIN: (f64, f64) = (0.0, 400.0);

/// The `BaseCurve` trait defines the conversion behavior of a calibration curve through
/// default trait implementations; a concrete curve only supplies field methods.
///
/// Conversion never panics and never allocates: for any `f64` resistance and multiplier it
/// returns one [`Conversion`] in O(segments × coefficients). This is the property the
/// acquisition loop depends on: a bad reading or a config typo must never halt a run that
/// keeps expensive hardware cold.
pub trait BaseCurve {
    // Field methods
    fn name(&self) -> &str;
    fn segments(&self) -> &Vec<Segment>;
    fn validation(&self) -> Validation;
    /// Index of the segment that extrapolates readings below the bottom boundary.
    fn overflow_idx(&self) -> usize;

    /// Selects the segment for a corrected resistance and reports where the reading fell.
    ///
    /// Comparison runs top-down in descending resistance order; the first segment whose
    /// lower bound the resistance reaches wins.
    fn select(&self, r: f64) -> (usize, RangeFlag) {
        let segs = self.segments();
        if r >= segs[0].upper {
            return (0, RangeFlag::BelowRange);
        }
        for (i, seg) in segs.iter().enumerate() {
            if r >= seg.lower {
                return (i, RangeFlag::InRange);
            }
        }
        (self.overflow_idx(), RangeFlag::AboveRange)
    }

    /// Converts one resistance reading to a temperature.
    ///
    /// The bridge multiplier is applied strictly as a pre-scaling of the resistance, so
    /// `convert(r, m)` and `convert(r * m, 1.0)` are the same reading.
    fn convert(&self, r: f64, multiplier: f64) -> Conversion {
        let r = r * multiplier;
        let (idx, flag) = self.select(r);
        let t = self.segments()[idx].series.eval(r);
        let kelvin = match self.validation() {
            Validation::Passthrough => t,
            Validation::ZeroNonPhysical => {
                if t.is_finite() && SANE_KELVIN.0 < t && t < SANE_KELVIN.1 {
                    t
                } else {
                    0.0
                }
            }
        };
        Conversion { kelvin, flag }
    }

    /// Shortcut returning only the temperature.
    fn kelvin(&self, r: f64, multiplier: f64) -> f64 {
        self.convert(r, multiplier).kelvin
    }

    /// Converts a batch of readings element by element through the scalar path.
    ///
    /// This is the general-purpose array entry for any curve; the primary sensor has a
    /// dedicated vectorized path with different clamping policy (see the `fastpath` module).
    fn convert_batch(&self, r: ArrayView1<f64>, multiplier: f64) -> Array1<f64> {
        r.mapv(|ri| self.convert(ri, multiplier).kelvin)
    }
}

/// A concrete calibration curve: a named, descending-ordered segment list plus its
/// post-validation policy.
///
/// **Refer to the [`BaseCurve`] trait for conversion behavior.** Constructors for the
/// individual sensors live in the `sensors` module.
#[derive(Clone)]
pub struct Curve {
    name: String,
    segments: Vec<Segment>,
    validation: Validation,
    overflow_idx: usize,
}

impl Curve {
    /// Constructs a curve from a descending-ordered segment list.
    ///
    /// The overflow segment defaults to the last (lowest-resistance) one; use
    /// [`Curve::with_overflow`] for curves whose above-range extrapolation reuses an
    /// interior segment.
    ///
    /// # Panics
    ///
    /// Panics if the segment list is empty or not strictly descending by lower bound.
    ///
    /// # Examples
    ///
    /// ```
    /// use thermocal_backend::curve::*;
    /// use thermocal_backend::evaluator::*;
    ///
    /// let curve = Curve::new(
    ///     "Toy",
    ///     vec![
    ///         Segment::new(100.0, 1000.0, Series::new_power(vec![10.0])),
    ///         Segment::new(10.0, 100.0, Series::new_power(vec![100.0])),
    ///     ],
    ///     Validation::Passthrough,
    /// );
    /// assert_eq!(curve.kelvin(500.0, 1.0), 10.0);
    /// assert_eq!(curve.kelvin(50.0, 1.0), 100.0);
    /// ```
    pub fn new(name: &str, segments: Vec<Segment>, validation: Validation) -> Self {
        assert!(
            !segments.is_empty(),
            "Curve {} must have at least one segment",
            name
        );
        for pair in segments.windows(2) {
            assert!(
                pair[0].lower > pair[1].lower,
                "Curve {} segments must be in strictly descending resistance order, got lower bounds {} then {}",
                name,
                pair[0].lower,
                pair[1].lower
            );
        }
        let overflow_idx = segments.len() - 1;
        Curve {
            name: name.to_string(),
            segments,
            validation,
            overflow_idx,
        }
    }

    /// Overrides which segment extrapolates below-bottom readings.
    pub fn with_overflow(mut self, idx: usize) -> Self {
        assert!(
            idx < self.segments.len(),
            "Curve {} overflow segment index {} out of range for {} segments",
            self.name,
            idx,
            self.segments.len()
        );
        self.overflow_idx = idx;
        self
    }
}

impl BaseCurve for Curve {
    fn name(&self) -> &str {
        &self.name
    }

    fn segments(&self) -> &Vec<Segment> {
        &self.segments
    }

    fn validation(&self) -> Validation {
        self.validation
    }

    fn overflow_idx(&self) -> usize {
        self.overflow_idx
    }
}

#[cfg(test)]
mod test {
    use crate::curve::*;
    use crate::evaluator::*;

    // Three constant-valued segments make dispatch decisions directly observable.
    fn toy_curve() -> Curve {
        Curve::new(
            "Toy",
            vec![
                Segment::new(1000.0, 10000.0, Series::new_power(vec![1.0])),
                Segment::new(100.0, 1000.0, Series::new_power(vec![2.0])),
                Segment::new(10.0, 100.0, Series::new_power(vec![3.0])),
            ],
            Validation::Passthrough,
        )
    }

    #[test]
    fn descending_first_match() {
        let curve = toy_curve();
        assert_eq!(curve.select(5000.0), (0, RangeFlag::InRange));
        assert_eq!(curve.select(500.0), (1, RangeFlag::InRange));
        assert_eq!(curve.select(50.0), (2, RangeFlag::InRange));
        // Boundary values belong to the upper segment (>= comparison)
        assert_eq!(curve.select(1000.0), (0, RangeFlag::InRange));
        assert_eq!(curve.select(100.0), (1, RangeFlag::InRange));
    }

    #[test]
    fn open_ends_extrapolate_and_flag() {
        let curve = toy_curve();
        assert_eq!(curve.select(20000.0), (0, RangeFlag::BelowRange));
        assert_eq!(curve.select(5.0), (2, RangeFlag::AboveRange));
        // Values still come from the boundary segments
        assert_eq!(curve.kelvin(20000.0, 1.0), 1.0);
        assert_eq!(curve.kelvin(5.0, 1.0), 3.0);
    }

    #[test]
    fn overflow_segment_can_be_interior() {
        let curve = toy_curve().with_overflow(1);
        assert_eq!(curve.select(5.0), (1, RangeFlag::AboveRange));
        assert_eq!(curve.kelvin(5.0, 1.0), 2.0);
    }

    #[test]
    fn multiplier_prescales_resistance() {
        let curve = toy_curve();
        assert_eq!(curve.convert(50.0, 10.0), curve.convert(500.0, 1.0));
    }

    #[test]
    fn zero_non_physical_replaces_bad_results() {
        let curve = Curve::new(
            "Cold",
            vec![
                Segment::new(100.0, 1000.0, Series::new_power(vec![500.0])),
                Segment::new(10.0, 100.0, Series::new_power(vec![f64::NAN])),
            ],
            Validation::ZeroNonPhysical,
        );
        assert_eq!(curve.kelvin(200.0, 1.0), 0.0); // 500 K is outside (0, 400)
        assert_eq!(curve.kelvin(50.0, 1.0), 0.0); // NaN is zeroed, not propagated
    }

    #[test]
    fn nan_reading_never_panics() {
        let curve = toy_curve();
        let out = curve.convert(f64::NAN, 1.0);
        assert_eq!(out.flag, RangeFlag::AboveRange);
    }

    #[test]
    #[should_panic(expected = "strictly descending")]
    fn unsorted_segments_rejected() {
        Curve::new(
            "Bad",
            vec![
                Segment::new(10.0, 100.0, Series::new_power(vec![1.0])),
                Segment::new(100.0, 1000.0, Series::new_power(vec![2.0])),
            ],
            Validation::Passthrough,
        );
    }

    #[test]
    fn batch_matches_scalar() {
        let curve = toy_curve();
        let r = ndarray::array![5000.0, 500.0, 50.0, 5.0];
        let t = curve.convert_batch(r.view(), 1.0);
        assert_eq!(t, ndarray::array![1.0, 2.0, 3.0, 3.0]);
    }
}
