//! Curve definitions for the individual cryostat thermometers.
//!
//! Each constructor assembles one [`Curve`] from its module-level coefficient tables. The
//! tables are calibration data: they are copied digit for digit from the fit outputs and must
//! never be edited by hand. Dispatch boundaries are in ohms; where a boundary is a crossing
//! point of two adjacent fits rather than a fit-domain edge, the odd-looking constant is
//! intentional.
//!
//! All of these are negative-temperature-coefficient sensors: resistance rises as the
//! cryostat cools, so segment lists run from the coldest (highest-resistance) fit down.

use crate::curve::*;
use crate::evaluator::*;

// ---------------------------------------------------------------------------
// Koirankoppi dipstick sensor, January 2022 recalibration
// ---------------------------------------------------------------------------

/// Top of the calibrated span: 9816 ohm is 4.2 K.
pub const DIPSTICK_TOP_OHM: f64 = 9816.0;
/// Low/mid fit crossing, 18.087 K.
pub const DIPSTICK_SPLIT_LOW_MID_OHM: f64 = 1030.73;
/// Mid/high fit crossing, 107.681 K.
pub const DIPSTICK_SPLIT_MID_HIGH_OHM: f64 = 143.125;
/// Bottom of the calibrated span: 45.775 ohm is 295.3 K.
pub const DIPSTICK_BOTTOM_OHM: f64 = 45.775;

/// 4.2 K to 18.087 K (9816 ohm to 1030.73 ohm)
pub const DIPSTICK_COEF_LOW: [f64; 11] = [
    1.0305706890196387,
    -0.44538638729688446,
    0.038245646079858205,
    0.00040965728900122016,
    -0.0012118796335522266,
    0.00016675566193886398,
    -0.0003134743277859895,
    -4.9862349494365405e-05,
    -0.0002538643045723284,
    2.930529810139165e-05,
    0.00010177604830833634,
];
pub const DIPSTICK_DOMAIN_LOW: [f64; 2] = [2.72290035, 3.99196185];

/// 18.087 K to 107.681 K (1030.73 ohm to 143.125 ohm)
pub const DIPSTICK_COEF_MID: [f64; 11] = [
    1.7681898764629274,
    -0.5246006794490299,
    -0.0009736793484812508,
    0.003478858170366785,
    0.0008144241470007147,
    0.00010086660798327552,
    -0.0002057511678956854,
    -1.0562017354248726e-05,
    0.00021521449198016844,
    -0.0003566476960957493,
    -0.00031293753057890167,
];
pub const DIPSTICK_DOMAIN_MID: [f64; 2] = [1.86381739, 3.02540734];

/// 107.681 K to 295.3 K (143.125 ohm to 45.775 ohm)
pub const DIPSTICK_COEF_HIGH: [f64; 11] = [
    2.2479945607783676,
    -0.220244799396414,
    0.0001736586172434195,
    -0.0014264062220913924,
    0.00016439143464969143,
    -0.00015075504768659046,
    -7.754154576623546e-05,
    -0.00011707662585304951,
    -2.3972858842214167e-05,
    -0.00010280191330409421,
    -5.983916339295706e-06,
];
pub const DIPSTICK_DOMAIN_HIGH: [f64; 2] = [1.66062417, 2.16173695];

// ---------------------------------------------------------------------------
// Morso board v1, Cernox CX-1050-SD-HT
// ---------------------------------------------------------------------------

/// 4.2 K to 20 K (3070.98 ohm to 626.869 ohm)
const MORSO_COEF_LOW: [f64; 11] = [
    0.9506674308499167,
    -0.35199927764236455,
    0.016258403822749814,
    0.0055715910387260014,
    0.0008861267363886899,
    -0.0005390646317558515,
    0.00046234441088706396,
    -0.00034663919545294743,
    1.8900818521904524e-05,
    -0.0006577629496062799,
    -0.0010153963072063212,
];
const MORSO_DOMAIN_LOW: [f64; 2] = [2.79717679, 3.48727699];

/// 20 K to 70 K (629.86 ohm to 221.75 ohm)
const MORSO_COEF_MID: [f64; 11] = [
    1.57422337136405,
    -0.2644571720191467,
    0.0018751976846375657,
    0.00015485832655411989,
    0.0002687387319480107,
    0.00042994288778457724,
    0.0001854343092784725,
    0.000677677389021527,
    2.7489387520667344e-05,
    -6.839382864240871e-05,
    0.00013297037462381675,
];
const MORSO_DOMAIN_MID: [f64; 2] = [2.34587734, 2.79924403];

/// 70 K to 260 K (252.526 ohm to 64.0478 ohm)
const MORSO_COEF_HIGH: [f64; 11] = [
    2.105907955347509,
    -0.32561185605929055,
    -0.00452466867832195,
    -0.0041969745056598,
    0.002813068419108741,
    -0.0012856814956658373,
    0.001022107637142309,
    -0.0008692536680943596,
    0.0005275420860334051,
    -0.0007986614863778288,
    0.0004594498328113981,
];
const MORSO_DOMAIN_HIGH: [f64; 2] = [1.80650422, 2.4023061];

/// 260 K to 293 K (73.0427 ohm to 58.1843 ohm)
const MORSO_COEF_ROOM: [f64; 11] = [
    2.419846561814242,
    -0.05110237731635884,
    -0.00032812984876488935,
    0.00019824559266527853,
    -0.0009580047292876272,
    0.0004420826699351031,
    -0.00031778576498260353,
    9.294972361020348e-05,
    0.0002128491379170427,
    -7.140389360008976e-05,
    -9.114398708705641e-05,
];
const MORSO_DOMAIN_ROOM: [f64; 2] = [1.7648058138045555, 1.8635768183793173];

// ---------------------------------------------------------------------------
// Ling dilution refrigerator sensor
// ---------------------------------------------------------------------------

/// 40 mK to 20 K, single wide-range fit
const LING_COEF: [f64; 21] = [
    -5.30606160e-01,
    -1.20610503e+00,
    3.99019199e-01,
    -1.75532773e-01,
    1.14216706e-01,
    -7.73419751e-02,
    5.40618959e-02,
    -3.86658100e-02,
    2.85303341e-02,
    -2.16080176e-02,
    1.63169093e-02,
    -1.29182752e-02,
    1.06184792e-02,
    -7.98300833e-03,
    6.02191244e-03,
    -4.32414907e-03,
    3.41879026e-03,
    -2.75739361e-03,
    2.04716983e-03,
    -1.22720374e-03,
    5.69061400e-04,
];
const LING_DOMAIN: [f64; 2] = [3.0204657, 5.17597456];

/// Legacy narrow-range fit in raw ohms, degree 9
const LING_OLD_COEF: [f64; 10] = [
    0.8287,
    -1.76454e-4,
    2.11729e-8,
    -1.57071e-12,
    7.61027e-17,
    -2.4539e-21,
    5.22219e-26,
    -7.04414e-31,
    5.45476e-36,
    -1.84632e-41,
];

// ---------------------------------------------------------------------------
// Kanada 1.5 K cryostat sensor
// ---------------------------------------------------------------------------

/// Low/mid fit split in ohms
const KANADA_SPLIT_OHM: f64 = 287.6046;

const KANADA_COEF_LOW: [f64; 11] = [
    6.8642361690,
    -7.6201321296,
    2.9185476218,
    -0.8169479610,
    0.1364804787,
    0.0336174734,
    -0.0445366064,
    0.0282235691,
    -0.0018566792,
    -0.0065261097,
    0.0115414837,
];
const KANADA_Z_LOWER_LOW: f64 = 2.3746383841;
const KANADA_Z_UPPER_LOW: f64 = 3.0937542834;

const KANADA_COEF_MID: [f64; 11] = [
    107.6682289065,
    -169.5447785940,
    86.4765089174,
    -28.0981575764,
    6.1235649200,
    -1.9503945254,
    1.0131764357,
    -0.2848764539,
    0.0754777049,
    -0.1217169204,
    0.0183919674,
];
const KANADA_Z_LOWER_MID: f64 = 1.5133641164;
const KANADA_Z_UPPER_MID: f64 = 3.0937542834;

/// 1.5 K to 15 K, 2022 low-temperature extension; fitted in raw ohms
const KANADA_LOWTEMP_COEF: [f64; 12] = [
    4.837741078001092,
    -5.0386618786563675,
    2.6011253829600314,
    -1.2811240931100099,
    0.6202351699537209,
    -0.290718100542933,
    0.13446140588234368,
    -0.06110535096065962,
    0.027152555428268582,
    -0.010518962898060267,
    0.006875088171212802,
    -0.0025596374495960084,
];
const KANADA_LOWTEMP_DOMAIN: [f64; 2] = [268.137, 1202.448];

// ---------------------------------------------------------------------------
// Cernox CX-1050-AA-1.4L, serial X105321
// ---------------------------------------------------------------------------

/// 1.40 K to 14.3 K (9825 ohm to 689.3 ohm)
const CX1050_COEF_LOW: [f64; 10] = [
    5.527867,
    -6.379248,
    2.855709,
    -1.065175,
    0.334348,
    -0.084377,
    0.013947,
    0.000599,
    -0.001649,
    0.001212,
];
const CX1050_Z_LOWER_LOW: f64 = 2.79894969622;
const CX1050_Z_UPPER_LOW: f64 = 4.13119755741;

/// 14.3 K to 80.3 K (689.3 ohm to 189.3 ohm)
const CX1050_COEF_MID: [f64; 7] = [
    43.034893,
    -38.016846,
    8.162617,
    -0.935864,
    0.093585,
    -0.003306,
    -0.006104,
];
const CX1050_Z_LOWER_MID: f64 = 2.23461882459;
const CX1050_Z_UPPER_MID: f64 = 2.88553993198;

/// 80.3 K to 325 K (189.3 ohm to 54.31 ohm)
const CX1050_COEF_HIGH: [f64; 7] = [
    177.551522,
    -126.721728,
    22.066582,
    -3.115138,
    0.595049,
    -0.112115,
    0.015706,
];
const CX1050_Z_LOWER_HIGH: f64 = 1.72880129581;
const CX1050_Z_UPPER_HIGH: f64 = 2.3242938345;

impl Curve {
    /// Koirankoppi dipstick sensor, recalibrated January 2022.
    ///
    /// Three log-domain fits covering 4.2 K to 295.3 K. Results outside the physical
    /// envelope are zeroed; the vectorized counterpart in the `fastpath` module clamps
    /// instead.
    pub fn dipstick() -> Curve {
        Curve::new(
            "Dipstick",
            vec![
                Segment::new(
                    DIPSTICK_SPLIT_LOW_MID_OHM,
                    DIPSTICK_TOP_OHM,
                    Series::new_log_domain(DIPSTICK_COEF_LOW.to_vec(), DIPSTICK_DOMAIN_LOW),
                ),
                Segment::new(
                    DIPSTICK_SPLIT_MID_HIGH_OHM,
                    DIPSTICK_SPLIT_LOW_MID_OHM,
                    Series::new_log_domain(DIPSTICK_COEF_MID.to_vec(), DIPSTICK_DOMAIN_MID),
                ),
                Segment::new(
                    DIPSTICK_BOTTOM_OHM,
                    DIPSTICK_SPLIT_MID_HIGH_OHM,
                    Series::new_log_domain(DIPSTICK_COEF_HIGH.to_vec(), DIPSTICK_DOMAIN_HIGH),
                ),
            ],
            Validation::ZeroNonPhysical,
        )
    }

    /// Cernox CX-1050-SD-HT mounted on morso board v1, calibrated July 2025.
    ///
    /// Four log-domain fits from 4.2 K to 293 K. The 58-64 ohm room-temperature segment sits
    /// in a narrow window between two crossing points that fall close to the neighboring fit
    /// domains (620.85 against a fit edge of 626.87; 224.39 against 221.75); the descending
    /// first-match dispatch keeps those boundaries unambiguous. Readings under 58 ohm
    /// extrapolate the 70-260 K segment, not the room-temperature one.
    pub fn morso() -> Curve {
        Curve::new(
            "Morso",
            vec![
                Segment::new(
                    620.847233906399,
                    3071.0,
                    Series::new_log_domain(MORSO_COEF_LOW.to_vec(), MORSO_DOMAIN_LOW),
                ),
                Segment::new(
                    224.38862779880543,
                    620.847233906399,
                    Series::new_log_domain(MORSO_COEF_MID.to_vec(), MORSO_DOMAIN_MID),
                ),
                Segment::new(
                    64.04780000000001,
                    224.38862779880543,
                    Series::new_log_domain(MORSO_COEF_HIGH.to_vec(), MORSO_DOMAIN_HIGH),
                ),
                Segment::new(
                    58.0,
                    64.04780000000001,
                    Series::new_log_domain(MORSO_COEF_ROOM.to_vec(), MORSO_DOMAIN_ROOM),
                ),
            ],
            Validation::ZeroNonPhysical,
        )
        .with_overflow(2)
    }

    /// Ling dilution refrigerator sensor, single wide-range fit from 40 mK to 20 K.
    ///
    /// The dispatch bounds are the fit-domain edges themselves (the fit covers the whole
    /// usable span), so the flag reports genuine extrapolation only.
    pub fn ling() -> Curve {
        Curve::new(
            "Ling",
            vec![Segment::new(
                10f64.powf(LING_DOMAIN[0]),
                10f64.powf(LING_DOMAIN[1]),
                Series::new_log_domain(LING_COEF.to_vec(), LING_DOMAIN),
            )],
            Validation::Passthrough,
        )
    }

    /// Legacy Ling fit: a 9-degree power series in raw ohms over a very small range.
    ///
    /// Kept for comparison against old log files. No range bounds were ever recorded for
    /// it, so it never flags.
    pub fn ling_old() -> Curve {
        Curve::new(
            "LingOld",
            vec![Segment::new(
                f64::NEG_INFINITY,
                f64::INFINITY,
                Series::new_power(LING_OLD_COEF.to_vec()),
            )],
            Validation::Passthrough,
        )
    }

    /// Kanada 1.5 K cryostat sensor: two 10-degree Chebyshev fits in the cos/arccos form,
    /// split at 287.6046 ohm, open-ended on both sides.
    pub fn kanada() -> Curve {
        Curve::new(
            "Kanada",
            vec![
                Segment::new(
                    KANADA_SPLIT_OHM,
                    f64::INFINITY,
                    Series::new_acos(
                        KANADA_COEF_LOW.to_vec(),
                        KANADA_Z_LOWER_LOW,
                        KANADA_Z_UPPER_LOW,
                    ),
                ),
                Segment::new(
                    f64::NEG_INFINITY,
                    KANADA_SPLIT_OHM,
                    Series::new_acos(
                        KANADA_COEF_MID.to_vec(),
                        KANADA_Z_LOWER_MID,
                        KANADA_Z_UPPER_MID,
                    ),
                ),
            ],
            Validation::Passthrough,
        )
    }

    /// 2022 low-temperature extension for Kanada, valid 1.5 K to 15 K.
    ///
    /// Unlike every other Chebyshev fit here this one is in raw ohms, not log space.
    pub fn kanada_lowtemp() -> Curve {
        Curve::new(
            "KanadaLowTemp2022",
            vec![Segment::new(
                KANADA_LOWTEMP_DOMAIN[0],
                KANADA_LOWTEMP_DOMAIN[1],
                Series::new_lin_domain(KANADA_LOWTEMP_COEF.to_vec(), KANADA_LOWTEMP_DOMAIN),
            )],
            Validation::Passthrough,
        )
    }

    /// Cernox CX-1050-AA-1.4L (serial X105321): three cos/arccos Chebyshev fits from
    /// 1.40 K to 325 K.
    pub fn cx1050() -> Curve {
        Curve::new(
            "CX1050",
            vec![
                Segment::new(
                    689.3,
                    9825.0,
                    Series::new_acos(
                        CX1050_COEF_LOW.to_vec(),
                        CX1050_Z_LOWER_LOW,
                        CX1050_Z_UPPER_LOW,
                    ),
                ),
                Segment::new(
                    189.3,
                    689.3,
                    Series::new_acos(
                        CX1050_COEF_MID.to_vec(),
                        CX1050_Z_LOWER_MID,
                        CX1050_Z_UPPER_MID,
                    ),
                ),
                Segment::new(
                    54.31,
                    189.3,
                    Series::new_acos(
                        CX1050_COEF_HIGH.to_vec(),
                        CX1050_Z_LOWER_HIGH,
                        CX1050_Z_UPPER_HIGH,
                    ),
                ),
            ],
            Validation::Passthrough,
        )
    }
}

#[cfg(test)]
mod test {
    use crate::curve::*;

    /// Asserts strictly decreasing temperature over a linear resistance grid.
    fn assert_monotonic(curve: &Curve, lo_ohm: f64, hi_ohm: f64, n: usize) {
        let mut prev = curve.kelvin(lo_ohm, 1.0);
        for i in 1..=n {
            let r = lo_ohm + (hi_ohm - lo_ohm) * (i as f64) / (n as f64);
            let t = curve.kelvin(r, 1.0);
            assert!(
                t < prev,
                "{}: T({}) = {} not below T at previous grid point {}",
                curve.name(),
                r,
                t,
                prev
            );
            prev = t;
        }
    }

    #[test]
    fn dipstick_segments_are_monotonic() {
        let c = Curve::dipstick();
        assert_monotonic(&c, 1100.0, 9500.0, 50);
        assert_monotonic(&c, 150.0, 1000.0, 50);
        assert_monotonic(&c, 46.0, 140.0, 50);
    }

    #[test]
    fn morso_segments_are_monotonic() {
        let c = Curve::morso();
        assert_monotonic(&c, 630.0, 3000.0, 50);
        assert_monotonic(&c, 230.0, 615.0, 50);
        assert_monotonic(&c, 65.0, 220.0, 50);
        assert_monotonic(&c, 58.5, 63.5, 20);
    }

    #[test]
    fn ling_is_monotonic_over_fit_range() {
        assert_monotonic(&Curve::ling(), 1100.0, 140000.0, 100);
    }

    #[test]
    fn kanada_segments_are_monotonic() {
        let c = Curve::kanada();
        assert_monotonic(&c, 300.0, 1200.0, 50);
        assert_monotonic(&c, 50.0, 280.0, 50);
    }

    #[test]
    fn kanada_lowtemp_is_monotonic() {
        assert_monotonic(&Curve::kanada_lowtemp(), 270.0, 1200.0, 50);
    }

    #[test]
    fn cx1050_segments_are_monotonic() {
        let c = Curve::cx1050();
        assert_monotonic(&c, 700.0, 9500.0, 50);
        assert_monotonic(&c, 190.0, 680.0, 50);
        assert_monotonic(&c, 55.0, 188.0, 50);
    }

    #[test]
    fn no_curve_produces_nan_at_segment_boundaries() {
        for curve in [
            Curve::dipstick(),
            Curve::morso(),
            Curve::ling(),
            Curve::kanada(),
            Curve::kanada_lowtemp(),
            Curve::cx1050(),
        ] {
            for seg in curve.segments() {
                for bound in [seg.lower, seg.upper] {
                    if !bound.is_finite() {
                        continue;
                    }
                    for r in [bound, bound * (1.0 + 1e-12), bound * (1.0 - 1e-12)] {
                        let t = curve.kelvin(r, 1.0);
                        assert!(
                            t.is_finite(),
                            "{} produced non-finite T at {} ohm",
                            curve.name(),
                            r
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn dipstick_spot_values() {
        let c = Curve::dipstick();
        // Low/mid crossing sits at 18.087 K; 1000 ohm is just on the mid side of it
        let mid = c.convert(1000.0, 1.0);
        assert!(mid.in_range());
        assert!(17.0 < mid.kelvin && mid.kelvin < 20.0);
        // 10 kohm is past the 4.2 K end of the span: extrapolated, flagged, still sane
        let cold = c.convert(10000.0, 1.0);
        assert_eq!(cold.flag, RangeFlag::BelowRange);
        assert!(0.0 < cold.kelvin && cold.kelvin < 4.5);
        // 50 ohm is deep in the room-temperature fit
        let warm = c.convert(50.0, 1.0);
        assert!(warm.in_range());
        assert!(250.0 < warm.kelvin && warm.kelvin < 295.0);
    }

    #[test]
    fn dipstick_sentinels() {
        let c = Curve::dipstick();
        assert_eq!(c.kelvin(0.0, 1.0), 0.0);
        assert_eq!(c.kelvin(1e12, 1.0), 0.0);
        assert_eq!(c.kelvin(-5.0, 1.0), 0.0);
    }

    #[test]
    fn morso_room_segment_dispatch() {
        let c = Curve::morso();
        assert!(c.convert(60.0, 1.0).in_range());
        // Below 58 ohm extrapolates the 70-260 K fit, not the room-temperature one
        let (idx, flag) = c.select(50.0);
        assert_eq!((idx, flag), (2, RangeFlag::AboveRange));
    }

    #[test]
    fn cx1050_flags_both_extremes() {
        let c = Curve::cx1050();
        assert_eq!(c.convert(20000.0, 1.0).flag, RangeFlag::BelowRange);
        assert_eq!(c.convert(30.0, 1.0).flag, RangeFlag::AboveRange);
        assert!(c.convert(300.0, 1.0).in_range());
    }

    #[test]
    fn kanada_never_flags() {
        let c = Curve::kanada();
        for r in [10.0, 287.6046, 1e5] {
            assert!(c.convert(r, 1.0).in_range());
        }
    }

    #[test]
    fn ling_old_is_deterministic_and_finite() {
        let c = Curve::ling_old();
        let a = c.kelvin(3000.0, 1.0);
        let b = c.kelvin(3000.0, 1.0);
        assert_eq!(a, b);
        assert!(a.is_finite());
        assert!(c.convert(3000.0, 1.0).in_range());
    }
}
