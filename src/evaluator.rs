//! Provides definitions and implementations for the series evaluators behind
//! every calibration fit.
//!
//! ## Main Structures and Enumerations:
//!
//! - `SeriesForm`: An enumeration of the evaluation bases used by the fits: `ACOS` for the
//!   cos/arccos Chebyshev recurrence in log-resistance space, `LOGDOMAIN` for a normalized-domain
//!   Chebyshev series whose value is the log of temperature, `LINDOMAIN` for a normalized-domain
//!   Chebyshev series in raw resistance, and `POWER` for a plain power series.
//!
//! - `Series`: One truncated series fit: a form, a coefficient vector, and the two domain bounds
//!   the form requires. Offers convenience constructors per form and a single `eval` method.
//!
//! ## Utilities:
//!
//! - `chebval` evaluates a Chebyshev coefficient vector on the canonical interval via the
//!   Clenshaw recurrence (the same algorithm `numpy.polynomial.chebyshev.chebval` uses, so
//!   coefficient tables fitted against numpy evaluate identically here).
//! - `polyval` evaluates an ascending-order power series via Horner's scheme.
//!
//! The two Chebyshev routes are algebraically equivalent on the canonical interval but the fits
//! were produced against different conventions, so a `Series` is evaluated strictly in the form
//! its coefficients were fitted in.

use std::fmt;

/// Enum type for the evaluation bases used by calibration fits.
#[derive(Clone, Copy, PartialEq)]
pub enum SeriesForm {
    /// `T = Σ coef[i]·cos(i·arccos(k))` with `k` mapped from `log10(R)` between the two
    /// Z-bounds. The sum is the temperature itself.
    ACOS,
    /// Chebyshev series over an explicit `log10(R)` domain, window [-1, 1]. The series value is
    /// `log10(T)`, so the temperature is `10^p(log10 R)`.
    LOGDOMAIN,
    /// Chebyshev series over an explicit domain in raw ohms. The series value is the
    /// temperature directly.
    LINDOMAIN,
    /// Plain power series in raw ohms, ascending coefficient order.
    POWER,
}
impl fmt::Display for SeriesForm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                SeriesForm::ACOS => "ACOS",
                SeriesForm::LOGDOMAIN => "LOGDOMAIN",
                SeriesForm::LINDOMAIN => "LINDOMAIN",
                SeriesForm::POWER => "POWER",
            }
        )
    }
}

/// Evaluates a Chebyshev coefficient vector at a point of the canonical interval using the
/// Clenshaw recurrence.
///
/// Coefficients are in ascending order: `coef[i]` multiplies the degree-`i` Chebyshev
/// polynomial of the first kind. The recurrence matches `numpy.polynomial.chebyshev.chebval`
/// term for term, which matters because every `LOGDOMAIN`/`LINDOMAIN` table in this crate was
/// fitted with numpy.
///
/// # Examples
///
/// Degree 0 and 1 are trivial, `T_2(x) = 2x² - 1` checks the recurrence:
///
/// ```
/// use thermocal_backend::evaluator::chebval;
///
/// assert_eq!(chebval(&[1.5], 0.3), 1.5);
/// assert_eq!(chebval(&[0.0, 1.0], 0.3), 0.3);
/// let t2 = chebval(&[0.0, 0.0, 1.0], 0.3);
/// assert!((t2 - (2.0 * 0.3f64 * 0.3 - 1.0)).abs() < 1e-15);
/// ```
pub fn chebval(coef: &[f64], x: f64) -> f64 {
    match coef.len() {
        0 => 0.0,
        1 => coef[0],
        _ => {
            let mut c0 = coef[coef.len() - 2];
            let mut c1 = coef[coef.len() - 1];
            for i in (0..coef.len() - 2).rev() {
                let tmp = c0;
                c0 = coef[i] - c1;
                c1 = tmp + c1 * 2.0 * x;
            }
            c0 + c1 * x
        }
    }
}

/// Evaluates an ascending-order power series at `x` via Horner's scheme.
///
/// ```
/// use thermocal_backend::evaluator::polyval;
///
/// // 1 + 2x + 3x²
/// assert_eq!(polyval(&[1.0, 2.0, 3.0], 2.0), 17.0);
/// ```
pub fn polyval(coef: &[f64], x: f64) -> f64 {
    coef.iter().rev().fold(0.0, |acc, c| acc * x + c)
}

/// One truncated series fit: the form, its coefficients, and the domain bounds the form
/// requires.
///
/// Bounds are in `log10(ohm)` for `ACOS` and `LOGDOMAIN`, in raw ohms for `LINDOMAIN`, and
/// unused for `POWER`. Instances are immutable after construction; use the per-form
/// constructors, which check the table shape and panic with context on a malformed one.
///
/// # Examples
///
/// A constant fit evaluates to its only coefficient everywhere:
///
/// ```
/// use thermocal_backend::evaluator::*;
///
/// let flat = Series::new_lin_domain(vec![4.2], [100.0, 200.0]);
/// assert_eq!(flat.eval(150.0), 4.2);
/// ```
///
/// An empty coefficient table is rejected:
///
/// ```should_panic
/// # use thermocal_backend::evaluator::*;
/// let bad = Series::new_power(vec![]);
/// ```
#[derive(Clone, PartialEq)]
pub struct Series {
    pub form: SeriesForm,
    pub coef: Vec<f64>,
    pub lower: f64,
    pub upper: f64,
}

impl Series {
    /// Base constructor. Prefer the per-form wrappers below.
    pub fn new(form: SeriesForm, coef: Vec<f64>, lower: f64, upper: f64) -> Self {
        assert!(
            !coef.is_empty(),
            "Expected series of form {} to have at least one coefficient",
            form
        );
        if form != SeriesForm::POWER {
            assert!(
                upper > lower,
                "Series of form {} expects bounds lower < upper, got ({}, {})",
                form,
                lower,
                upper
            );
        }
        Series {
            form,
            coef,
            lower,
            upper,
        }
    }

    /// Chebyshev fit evaluated through the cos/arccos recurrence, bounds in `log10(ohm)`.
    pub fn new_acos(coef: Vec<f64>, z_lower: f64, z_upper: f64) -> Series {
        Series::new(SeriesForm::ACOS, coef, z_lower, z_upper)
    }

    /// Normalized-domain Chebyshev fit in `log10(R)` whose value is `log10(T)`.
    pub fn new_log_domain(coef: Vec<f64>, domain: [f64; 2]) -> Series {
        Series::new(SeriesForm::LOGDOMAIN, coef, domain[0], domain[1])
    }

    /// Normalized-domain Chebyshev fit in raw ohms whose value is the temperature.
    pub fn new_lin_domain(coef: Vec<f64>, domain: [f64; 2]) -> Series {
        Series::new(SeriesForm::LINDOMAIN, coef, domain[0], domain[1])
    }

    /// Plain power series in raw ohms.
    pub fn new_power(coef: Vec<f64>) -> Series {
        Series::new(SeriesForm::POWER, coef, -1.0, 1.0)
    }

    /// Maps a point of the fit domain onto the canonical interval [-1, 1].
    fn normalized(&self, x: f64) -> f64 {
        (2.0 * x - self.lower - self.upper) / (self.upper - self.lower)
    }

    /// Evaluates the fit at resistance `r` (ohms) and returns the temperature in kelvin.
    ///
    /// Deterministic and non-panicking for every `f64` input. Non-finite and non-positive
    /// resistances propagate through the `log10` of the log-space forms as NaN rather than
    /// raising; range policy is the caller's concern (see the `curve` module).
    pub fn eval(&self, r: f64) -> f64 {
        match self.form {
            SeriesForm::ACOS => {
                let z = r.log10();
                let k = ((z - self.lower) - (self.upper - z)) / (self.upper - self.lower);
                // Round-off can push k an epsilon past ±1 at sub-range edges, where acos
                // returns NaN. Clamp before the call; NaN inputs pass through unchanged.
                let theta = k.clamp(-1.0, 1.0).acos();
                self.coef
                    .iter()
                    .enumerate()
                    .map(|(i, c)| c * (i as f64 * theta).cos())
                    .sum()
            }
            SeriesForm::LOGDOMAIN => {
                let p = chebval(&self.coef, self.normalized(r.log10()));
                10f64.powf(p)
            }
            SeriesForm::LINDOMAIN => chebval(&self.coef, self.normalized(r)),
            SeriesForm::POWER => polyval(&self.coef, r),
        }
    }
}
impl fmt::Display for Series {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "[{}, {} coef, bounds ({}, {})]",
            self.form,
            self.coef.len(),
            self.lower,
            self.upper
        )
    }
}
