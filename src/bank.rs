//! The bank module provides the highest level of abstraction for thermometer calibration, and
//! the single place by which methods are exposed to python.
//!
//! ## Overview
//!
//! At the heart of this module lies the [`Calibrator`] struct: an insertion-ordered registry
//! of calibration [`Curve`]s keyed by the configuration names the acquisition GUI sends
//! (`"Dipstick"`, `"Morso"`, `"Ling"`, `"Kanada"`, ...). Its behavior is defined by the
//! [`BaseCalibrator`] trait, which prescribes conversion, registry management, and the
//! fallback rules.
//!
//! The module is organized into the following primary components:
//!
//! 1. **Calibrator Struct**: the registry plus the precomputed vectorized path for the
//!    primary sensor.
//! 2. **Traits**: the [`BaseCalibrator`] trait, which defines all conversion and registry
//!    operations as default methods over a handful of field accessors.
//! 3. **Macro**: [`impl_calibrator_boilerplate!`] generates the boilerplate bridging Rust's
//!    trait system and Python's class system, since PyO3 cannot expose trait methods
//!    directly.
//!
//! ## Fallback rules
//!
//! Curve selection must never halt a live acquisition run: an unknown curve name (a config
//! typo, or the documented no-conversion entries `"None"` and `"Noiseless"`) resolves to an
//! identity passthrough (the bridge multiplier is still applied, so the multiplier law
//! `convert(name, r, m) == convert(name, r * m, 1)` holds for every name). This mirrors the
//! dispatch the acquisition loop has always used and is pinned by tests.

use indexmap::IndexMap;
use maplit::hashset;
use ndarray::{Array1, ArrayView1};
use numpy;
use pyo3::prelude::*;
use regex::Regex;
use std::collections::HashSet;

use crate::curve::*;
use crate::fastpath::*;

/// Registry name of the curve served by the vectorized array path.
pub const FAST_CURVE_NAME: &str = "Dipstick";

/// This trait defines the behavior of the [`Calibrator`] struct through default trait
/// implementations.
///
/// Trait methods are primarily classified into the following categories:
/// 1. Conversion methods, fully parameterized per call (the calibrator holds no notion of a
///    "current" configuration):
///     - [`convert`], [`convert_flagged`] for scalar readings
///     - [`convert_arr`] for sample buffers
/// 2. Registry methods:
///     - [`add_curve`], [`has_curve`], [`is_passthrough`], [`curve_names`]
/// 3. Field methods supplied by the implementing struct:
///     - [`curves`], [`curves_`], [`passthrough_names`], [`fast_dipstick`]
///
/// [`convert`]: BaseCalibrator::convert
/// [`convert_flagged`]: BaseCalibrator::convert_flagged
/// [`convert_arr`]: BaseCalibrator::convert_arr
/// [`add_curve`]: BaseCalibrator::add_curve
/// [`has_curve`]: BaseCalibrator::has_curve
/// [`is_passthrough`]: BaseCalibrator::is_passthrough
/// [`curve_names`]: BaseCalibrator::curve_names
/// [`curves`]: BaseCalibrator::curves
/// [`curves_`]: BaseCalibrator::curves_
/// [`passthrough_names`]: BaseCalibrator::passthrough_names
/// [`fast_dipstick`]: BaseCalibrator::fast_dipstick
pub trait BaseCalibrator {
    // FIELD methods
    fn curves(&self) -> &IndexMap<String, Curve>;
    fn curves_(&mut self) -> &mut IndexMap<String, Curve>;
    fn passthrough_names(&self) -> &HashSet<String>;
    fn fast_dipstick(&self) -> &DipstickFast;

    /// Whether a conversion curve is registered under `name`.
    fn has_curve(&self, name: &str) -> bool {
        self.curves().contains_key(name)
    }

    /// Whether `name` resolves to the identity passthrough rather than a conversion.
    ///
    /// True for the documented no-conversion entries and for any unregistered name. The
    /// acquisition loop uses this to skip the thermometer column entirely, the way it has
    /// always special-cased the `"None"` selection.
    fn is_passthrough(&self, name: &str) -> bool {
        self.passthrough_names().contains(name) || !self.has_curve(name)
    }

    /// Registered curve names, in registration order.
    fn curve_names(&self) -> Vec<String> {
        self.curves().keys().cloned().collect()
    }

    /// Registers a curve under its own name.
    ///
    /// # Panics
    ///
    /// Panics if the name is not of the form letter-then-alphanumerics, or is already taken
    /// (including by a passthrough entry).
    fn add_curve(&mut self, curve: Curve) {
        let re = Regex::new(r"^[A-Za-z][A-Za-z0-9_\-]*$").unwrap();
        if !re.is_match(curve.name()) {
            panic!(
                "Expecting curve names of format 'letter followed by alphanumerics', yet received curve name {}",
                curve.name()
            );
        }
        if self.has_curve(curve.name()) || self.passthrough_names().contains(curve.name()) {
            panic!(
                "Curve name {} already registered. Registered curves are {:?}",
                curve.name(),
                self.curve_names()
            );
        }
        self.curves_().insert(curve.name().to_string(), curve);
    }

    /// Converts one reading and reports where it fell relative to the calibrated span.
    ///
    /// Unknown and passthrough names return the multiplier-corrected resistance unchanged,
    /// flagged in-range.
    fn convert_flagged(&self, name: &str, r: f64, multiplier: f64) -> Conversion {
        match self.curves().get(name) {
            Some(curve) => curve.convert(r, multiplier),
            None => Conversion {
                kelvin: r * multiplier,
                flag: RangeFlag::InRange,
            },
        }
    }

    /// Converts one reading, discarding the range flag.
    fn convert(&self, name: &str, r: f64, multiplier: f64) -> f64 {
        self.convert_flagged(name, r, multiplier).kelvin
    }

    /// Converts a sample buffer.
    ///
    /// The primary sensor routes through the vectorized fast path (input/output safety
    /// clamps instead of the scalar path's zero sentinel, see the `fastpath` module);
    /// every other registered curve maps the scalar path over the buffer; unknown and
    /// passthrough names return the multiplier-corrected buffer unchanged.
    fn convert_arr(&self, name: &str, r: ArrayView1<f64>, multiplier: f64) -> Array1<f64> {
        if name == FAST_CURVE_NAME && self.has_curve(name) {
            let corrected = r.mapv(|ri| ri * multiplier);
            return self.fast_dipstick().convert_arr(corrected.view());
        }
        match self.curves().get(name) {
            Some(curve) => curve.convert_batch(r, multiplier),
            None => r.mapv(|ri| ri * multiplier),
        }
    }
}

/// A concrete struct consisting of the curve registry and the precomputed vectorized path.
///
/// **Refer to the [`BaseCalibrator`] trait for method behavior.**
#[pyclass]
pub struct Calibrator {
    curves: IndexMap<String, Curve>,
    passthrough: HashSet<String>,
    fast_dipstick: DipstickFast,
}

/// A macro to generate boilerplate implementations for structs representing calibrators.
///
/// PyO3 does not support exposing trait methods directly to Python, so this macro wraps each
/// [`BaseCalibrator`] trait method with a direct implementation for export. Scalar and
/// registry methods are exported with arguments and types preserved; the two deviations are
/// [`BaseCalibrator::convert_flagged`], exported as a `(kelvin, in_range)` tuple, and
/// [`BaseCalibrator::convert_arr`], exported as `convert_batch` over numpy arrays.
#[macro_export]
macro_rules! impl_calibrator_boilerplate {
    ($cal_type: ty) => {
        impl BaseCalibrator for $cal_type {
            fn curves(&self) -> &IndexMap<String, Curve> {
                &self.curves
            }
            fn curves_(&mut self) -> &mut IndexMap<String, Curve> {
                &mut self.curves
            }
            fn passthrough_names(&self) -> &HashSet<String> {
                &self.passthrough
            }
            fn fast_dipstick(&self) -> &DipstickFast {
                &self.fast_dipstick
            }
        }

        #[pymethods]
        impl $cal_type {
            pub fn convert(&self, name: &str, r: f64, multiplier: f64) -> f64 {
                BaseCalibrator::convert(self, name, r, multiplier)
            }

            pub fn convert_flagged(&self, name: &str, r: f64, multiplier: f64) -> (f64, bool) {
                let out = BaseCalibrator::convert_flagged(self, name, r, multiplier);
                (out.kelvin, out.in_range())
            }

            pub fn convert_batch(
                &self,
                py: Python,
                name: &str,
                r: numpy::PyReadonlyArray1<f64>,
                multiplier: f64,
            ) -> PyResult<PyObject> {
                let arr = BaseCalibrator::convert_arr(self, name, r.as_array(), multiplier);
                Ok(numpy::PyArray::from_array(py, &arr).to_object(py))
            }

            pub fn curve_names(&self) -> Vec<String> {
                BaseCalibrator::curve_names(self)
            }

            pub fn has_curve(&self, name: &str) -> bool {
                BaseCalibrator::has_curve(self, name)
            }

            pub fn is_passthrough(&self, name: &str) -> bool {
                BaseCalibrator::is_passthrough(self, name)
            }
        }
    };
}

#[pymethods]
impl Calibrator {
    /// Constructor for the `Calibrator` class.
    ///
    /// Registers every sensor curve this lab runs, acquisition-GUI names first, and the
    /// documented passthrough entries `"None"` and `"Noiseless"`.
    ///
    /// # Example (python)
    /// ```python
    /// from thermocal_backend import Calibrator
    ///
    /// cal = Calibrator()
    /// assert cal.convert("Dipstick", 1000.0, 1.0) > 17.0
    /// assert cal.is_passthrough("None")
    /// ```
    #[new]
    pub fn new() -> Self {
        let mut cal = Self::empty();
        cal.add_curve(Curve::dipstick());
        cal.add_curve(Curve::morso());
        cal.add_curve(Curve::ling());
        cal.add_curve(Curve::kanada());
        cal.add_curve(Curve::ling_old());
        cal.add_curve(Curve::kanada_lowtemp());
        cal.add_curve(Curve::cx1050());
        cal
    }
}

impl Calibrator {
    /// A calibrator with no curves registered; every name resolves to passthrough.
    pub fn empty() -> Self {
        Self {
            curves: IndexMap::new(),
            passthrough: hashset! {String::from("None"), String::from("Noiseless")},
            fast_dipstick: DipstickFast::new(),
        }
    }
}

impl Default for Calibrator {
    fn default() -> Self {
        Self::new()
    }
}

impl_calibrator_boilerplate!(Calibrator);

#[cfg(test)]
mod test {
    use crate::bank::*;
    use crate::curve::*;
    use crate::evaluator::*;

    #[test]
    fn default_registry_order_matches_gui_list() {
        let cal = Calibrator::new();
        assert_eq!(
            BaseCalibrator::curve_names(&cal),
            vec![
                "Dipstick",
                "Morso",
                "Ling",
                "Kanada",
                "LingOld",
                "KanadaLowTemp2022",
                "CX1050"
            ]
        );
    }

    #[test]
    fn unknown_name_is_identity_passthrough() {
        let cal = Calibrator::new();
        assert_eq!(BaseCalibrator::convert(&cal, "NotARealCurve", 1000.0, 1.0), 1000.0);
        assert_eq!(BaseCalibrator::convert(&cal, "None", 123.4, 2.0), 246.8);
        assert!(BaseCalibrator::is_passthrough(&cal, "NotARealCurve"));
        assert!(BaseCalibrator::is_passthrough(&cal, "Noiseless"));
        assert!(!BaseCalibrator::is_passthrough(&cal, "Kanada"));
    }

    #[test]
    #[should_panic(expected = "already registered")]
    fn duplicate_name_rejected() {
        let mut cal = Calibrator::new();
        cal.add_curve(Curve::dipstick());
    }

    #[test]
    #[should_panic(expected = "letter followed by alphanumerics")]
    fn malformed_name_rejected() {
        let mut cal = Calibrator::empty();
        cal.add_curve(Curve::new(
            "bad name!",
            vec![Segment::new(0.0, 1.0, Series::new_power(vec![1.0]))],
            Validation::Passthrough,
        ));
    }

    #[test]
    fn array_entry_matches_scalar_entry_for_slow_curves() {
        let cal = Calibrator::new();
        let r = ndarray::array![100.0, 500.0, 2000.0];
        let t = BaseCalibrator::convert_arr(&cal, "Kanada", r.view(), 1.0);
        for (ri, ti) in r.iter().zip(t.iter()) {
            assert_eq!(*ti, BaseCalibrator::convert(&cal, "Kanada", *ri, 1.0));
        }
    }

    #[test]
    fn array_entry_routes_dipstick_through_fast_path() {
        let cal = Calibrator::new();
        // 0 ohm distinguishes the paths: fast clamps to the warm end, scalar zeroes
        let t = BaseCalibrator::convert_arr(&cal, "Dipstick", ndarray::array![0.0].view(), 1.0);
        assert!(t[0] >= 4.0);
        assert_eq!(BaseCalibrator::convert(&cal, "Dipstick", 0.0, 1.0), 0.0);
    }
}
