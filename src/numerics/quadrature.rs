//! Adaptive Gauss–Kronrod quadrature on finite intervals.
//!
//! A 7-point Gauss rule embedded in a 15-point Kronrod rule gives both an
//! estimate and an error bound per interval. The interval with the largest
//! error is bisected until the summed error meets the tolerance or the
//! interval budget runs out.

/// Kronrod abscissae on `[0, 1]`; odd indices are the Gauss nodes.
const XK: [f64; 8] = [
    0.991_455_371_120_812_639,
    0.949_107_912_342_758_525,
    0.864_864_423_359_769_073,
    0.741_531_185_599_394_440,
    0.586_087_235_467_691_130,
    0.405_845_151_377_397_167,
    0.207_784_955_007_898_468,
    0.0,
];

/// Kronrod weights, matching `XK`.
const WK: [f64; 8] = [
    0.022_935_322_010_529_225,
    0.063_092_092_629_978_553,
    0.104_790_010_322_250_184,
    0.140_653_259_715_525_919,
    0.169_004_726_639_267_903,
    0.190_350_578_064_785_410,
    0.204_432_940_075_298_892,
    0.209_482_141_084_727_828,
];

/// Gauss weights for `XK[1]`, `XK[3]`, `XK[5]` and the centre.
const WG: [f64; 4] = [
    0.129_484_966_168_869_693,
    0.279_705_391_489_276_668,
    0.381_830_050_505_118_945,
    0.417_959_183_673_469_388,
];

pub const DEFAULT_REL_TOL: f64 = 1e-10;
pub const DEFAULT_ABS_TOL: f64 = 1e-13;
pub const MAX_INTERVALS: usize = 200;

/// Result of an adaptive integration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quadrature {
    pub value: f64,
    pub error: f64,
    pub intervals: usize,
}

/// `∫ₐᵇ f` with the default tolerances. Returns `NaN` when `f` produces a
/// non-finite value anywhere it is sampled.
pub fn integrate<F: Fn(f64) -> f64>(f: F, a: f64, b: f64) -> f64 {
    integrate_adaptive(&f, a, b, DEFAULT_REL_TOL, DEFAULT_ABS_TOL, MAX_INTERVALS).value
}

/// Adaptive G7–K15 integration of `f` over `[a, b]`.
///
/// Stops when the summed error estimate is at most
/// `max(abs_tol, rel_tol · |value|)` or when `max_intervals` intervals are
/// in use. `a == b` gives zero; `a > b` integrates with the sign flipped.
pub fn integrate_adaptive<F: Fn(f64) -> f64>(
    f: &F, a: f64, b: f64, rel_tol: f64, abs_tol: f64, max_intervals: usize,
) -> Quadrature {
    if a == b {
        return Quadrature { value: 0.0, error: 0.0, intervals: 0 };
    }
    if a > b {
        let q = integrate_adaptive(f, b, a, rel_tol, abs_tol, max_intervals);
        return Quadrature { value: -q.value, ..q };
    }

    let (value, error) = gauss_kronrod_15(f, a, b);
    let mut segments = vec![Segment { a, b, value, error }];
    loop {
        let total: f64 = segments.iter().map(|s| s.value).sum();
        let total_err: f64 = segments.iter().map(|s| s.error).sum();
        if !total.is_finite() || !total_err.is_finite() {
            return Quadrature { value: f64::NAN, error: f64::INFINITY, intervals: segments.len() };
        }
        if total_err <= abs_tol.max(rel_tol * total.abs()) || segments.len() >= max_intervals {
            return Quadrature { value: total, error: total_err, intervals: segments.len() };
        }
        let worst = segments
            .iter()
            .enumerate()
            .max_by(|(_, x), (_, y)| x.error.total_cmp(&y.error))
            .map(|(i, _)| i)
            .unwrap_or(0);
        let seg = segments.swap_remove(worst);
        let mid = 0.5 * (seg.a + seg.b);
        if mid <= seg.a || mid >= seg.b {
            // Interval can no longer be split in f64.
            segments.push(Segment { error: 0.0, ..seg });
            continue;
        }
        let (lv, le) = gauss_kronrod_15(f, seg.a, mid);
        let (rv, re) = gauss_kronrod_15(f, mid, seg.b);
        segments.push(Segment { a: seg.a, b: mid, value: lv, error: le });
        segments.push(Segment { a: mid, b: seg.b, value: rv, error: re });
    }
}

#[derive(Debug, Clone, Copy)]
struct Segment {
    a: f64,
    b: f64,
    value: f64,
    error: f64,
}

fn gauss_kronrod_15<F: Fn(f64) -> f64>(f: &F, a: f64, b: f64) -> (f64, f64) {
    let center = 0.5 * (a + b);
    let half = 0.5 * (b - a);
    let fc = f(center);
    let mut kronrod = WK[7] * fc;
    let mut gauss = WG[3] * fc;
    for j in 0..7 {
        let dx = half * XK[j];
        let pair = f(center - dx) + f(center + dx);
        kronrod += WK[j] * pair;
        if j % 2 == 1 {
            gauss += WG[j / 2] * pair;
        }
    }
    (kronrod * half, ((kronrod - gauss) * half).abs())
}
