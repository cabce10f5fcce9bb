//! Special mathematical functions.
//!
//! Numerical building blocks shared by the core distributions and the
//! test-specific distributions: log-gamma, log binomial coefficients,
//! regularized incomplete gamma, the error function and the standard normal
//! CDF/quantile, plus a compensated accumulator for tail sums.

/// 1/√(2π) ≈ 0.3989422804014327
const FRAC_1_SQRT_2PI: f64 = 0.3989422804014326779399460599343818684758586311649;

/// Lanczos approximation of ln Γ(x).
///
/// Reference: Lanczos (1964), "A Precision Approximation of the Gamma
/// Function", *SIAM Journal on Numerical Analysis* 1(1).
///
/// # Accuracy
/// Relative error < 2 × 10⁻¹⁰ for x > 0.
///
/// # Examples
/// ```
/// use u_nonparametric::special::ln_gamma;
/// // Γ(5) = 24
/// assert!((ln_gamma(5.0) - 24.0_f64.ln()).abs() < 1e-10);
/// ```
pub fn ln_gamma(x: f64) -> f64 {
    #[allow(clippy::excessive_precision)]
    const COEFFICIENTS: [f64; 9] = [
        0.99999999999980993,
        676.5203681218851,
        -1259.1392167224028,
        771.32342877765313,
        -176.61502916214059,
        12.507343278686905,
        -0.13857109526572012,
        9.9843695780195716e-6,
        1.5056327351493116e-7,
    ];
    const G: f64 = 7.0;

    if x < 0.5 {
        let pi = std::f64::consts::PI;
        return (pi / (pi * x).sin()).ln() - ln_gamma(1.0 - x);
    }

    let x = x - 1.0;
    let mut sum = COEFFICIENTS[0];
    for (i, &c) in COEFFICIENTS[1..].iter().enumerate() {
        sum += c / (x + i as f64 + 1.0);
    }

    let t = x + G + 0.5;
    0.5 * (2.0 * std::f64::consts::PI).ln() + (x + 0.5) * t.ln() - t + sum.ln()
}

/// ln(n!) = ln Γ(n + 1).
pub fn ln_factorial(n: u64) -> f64 {
    // Exact for the small arguments that dominate exact-test tables.
    if n < 2 {
        return 0.0;
    }
    if n <= 20 {
        return (2..=n).map(|i| (i as f64).ln()).sum();
    }
    ln_gamma(n as f64 + 1.0)
}

/// Log binomial coefficient ln C(n, k).
///
/// Returns `-∞` when `k > n` (C(n, k) = 0), so `exp` of the result is an
/// exact zero rather than a garbage value.
///
/// # Examples
/// ```
/// use u_nonparametric::special::ln_choose;
/// assert!((ln_choose(10, 5) - 252.0_f64.ln()).abs() < 1e-10);
/// assert_eq!(ln_choose(3, 4), f64::NEG_INFINITY);
/// ```
pub fn ln_choose(n: u64, k: u64) -> f64 {
    if k > n {
        return f64::NEG_INFINITY;
    }
    ln_factorial(n) - ln_factorial(k) - ln_factorial(n - k)
}

// ============================================================================
// Regularized Incomplete Gamma Function
// ============================================================================

/// Regularized lower incomplete gamma function P(a, x) = γ(a, x) / Γ(a).
///
/// # Algorithm
/// Uses series expansion for `x < a + 1`, continued fraction otherwise.
///
/// Reference: Press et al. (2007), *Numerical Recipes*, 3rd ed., §6.2.
///
/// # Examples
/// ```
/// use u_nonparametric::special::regularized_lower_gamma;
/// // P(1, x) = 1 - exp(-x)
/// let p = regularized_lower_gamma(1.0, 2.0);
/// assert!((p - (1.0 - (-2.0_f64).exp())).abs() < 1e-10);
/// ```
pub fn regularized_lower_gamma(a: f64, x: f64) -> f64 {
    if x.is_nan() || a.is_nan() {
        return f64::NAN;
    }
    if x <= 0.0 {
        return 0.0;
    }
    if x == f64::INFINITY {
        return 1.0;
    }
    if x < a + 1.0 {
        gamma_series(a, x)
    } else {
        1.0 - gamma_cf(a, x)
    }
}

/// Regularized upper incomplete gamma function Q(a, x) = 1 − P(a, x).
///
/// Evaluated directly on whichever side converges, so small upper tails
/// keep their relative precision.
pub fn regularized_upper_gamma(a: f64, x: f64) -> f64 {
    if x.is_nan() || a.is_nan() {
        return f64::NAN;
    }
    if x <= 0.0 {
        return 1.0;
    }
    if x == f64::INFINITY {
        return 0.0;
    }
    if x < a + 1.0 {
        1.0 - gamma_series(a, x)
    } else {
        gamma_cf(a, x)
    }
}

/// Series expansion for the regularized lower incomplete gamma.
fn gamma_series(a: f64, x: f64) -> f64 {
    let mut term = 1.0 / a;
    let mut sum = term;
    let mut ap = a;
    for _ in 0..500 {
        ap += 1.0;
        term *= x / ap;
        sum += term;
        if term.abs() < sum.abs() * 1e-15 {
            break;
        }
    }
    (sum * (-x + a * x.ln() - ln_gamma(a)).exp()).min(1.0)
}

/// Continued fraction for Q(a, x) (modified Lentz).
fn gamma_cf(a: f64, x: f64) -> f64 {
    const TINY: f64 = 1e-300;
    let mut b = x + 1.0 - a;
    let mut c = 1.0 / TINY;
    let mut d = 1.0 / b;
    let mut h = d;
    for i in 1..=500 {
        let an = -(i as f64) * (i as f64 - a);
        b += 2.0;
        d = an * d + b;
        if d.abs() < TINY {
            d = TINY;
        }
        c = b + an / c;
        if c.abs() < TINY {
            c = TINY;
        }
        d = 1.0 / d;
        let delta = d * c;
        h *= delta;
        if (delta - 1.0).abs() < 1e-15 {
            break;
        }
    }
    (h * (-x + a * x.ln() - ln_gamma(a)).exp()).clamp(0.0, 1.0)
}

// ============================================================================
// Error Function
// ============================================================================

// Port of the FreeBSD msun `s_erf.c` routines.
//
// ====================================================
// Copyright (C) 1993 by Sun Microsystems, Inc. All rights reserved.
//
// Developed at SunPro, a Sun Microsystems, Inc. business.
// Permission to use, copy, modify, and distribute this
// software is freely granted, provided that this notice
// is preserved.
// ====================================================

const ERX: f64 = 8.45062911510467529297e-01;
const EFX8: f64 = 1.02703333676410069053e+00;
const PP: [f64; 5] = [
    1.28379167095512558561e-01,
    -3.25042107247001499370e-01,
    -2.84817495755985104766e-02,
    -5.77027029648944159157e-03,
    -2.37630166566501626084e-05,
];
const QQ: [f64; 5] = [
    3.97917223959155352819e-01,
    6.50222499887672944485e-02,
    5.08130628187576562776e-03,
    1.32494738004321644526e-04,
    -3.96022827877536812320e-06,
];
const PA: [f64; 7] = [
    -2.36211856075265944077e-03,
    4.14856118683748331666e-01,
    -3.72207876035701323847e-01,
    3.18346619901161753674e-01,
    -1.10894694282396677476e-01,
    3.54783043256182359371e-02,
    -2.16637559486879084300e-03,
];
const QA: [f64; 6] = [
    1.06420880400844228286e-01,
    5.40397917702171048937e-01,
    7.18286544141962662868e-02,
    1.26171219808761642112e-01,
    1.36370839120290507362e-02,
    1.19844998467991074170e-02,
];
const RA: [f64; 8] = [
    -9.86494403484714822705e-03,
    -6.93858572707181764372e-01,
    -1.05586262253232909814e+01,
    -6.23753324503260060396e+01,
    -1.62396669462573470355e+02,
    -1.84605092906711035994e+02,
    -8.12874355063065934246e+01,
    -9.81432934416914548592e+00,
];
const SA: [f64; 8] = [
    1.96512716674392571292e+01,
    1.37657754143519042600e+02,
    4.34565877475229228821e+02,
    6.45387271733267880336e+02,
    4.29008140027567833386e+02,
    1.08635005541779435134e+02,
    6.57024977031928170135e+00,
    -6.04244152148580987438e-02,
];
const RB: [f64; 7] = [
    -9.86494292470009928597e-03,
    -7.99283237680523006574e-01,
    -1.77579549177547519889e+01,
    -1.60636384855821916062e+02,
    -6.37566443368389627722e+02,
    -1.02509513161107724954e+03,
    -4.83519191608651397019e+02,
];
const SB: [f64; 7] = [
    3.03380607434824582924e+01,
    3.25792512996573918826e+02,
    1.53672958608443695994e+03,
    3.19985821950859553908e+03,
    2.55305040643316442583e+03,
    4.74528541206955367215e+02,
    -2.24409524465858183362e+01,
];

/// Horner evaluation with the coefficient of the highest power last.
fn horner(coefficients: &[f64], z: f64) -> f64 {
    coefficients.iter().rev().fold(0.0, |acc, &c| acc * z + c)
}

/// Upper 32 bits of the IEEE representation with the sign cleared.
fn high_word(x: f64) -> u32 {
    ((x.to_bits() >> 32) as u32) & 0x7fff_ffff
}

/// Rational approximation of erf(x)/x − 1 on |x| < 0.84375.
fn erf_small(x: f64) -> f64 {
    let z = x * x;
    let r = horner(&PP, z);
    let s = 1.0 + z * horner(&QQ, z);
    r / s
}

/// erfc(x) for 0.84375 ≤ x < 28.
fn erfc_positive(x: f64) -> f64 {
    let ix = high_word(x);
    if ix < 0x3ff4_0000 {
        // |x| < 1.25
        let s = x - 1.0;
        let p = horner(&PA, s);
        let q = 1.0 + s * horner(&QA, s);
        return 1.0 - ERX - p / q;
    }
    let s = 1.0 / (x * x);
    let (r, big_s) = if ix < 0x4006_db6d {
        // |x| < 1/0.35
        (horner(&RA, s), 1.0 + s * horner(&SA, s))
    } else {
        (horner(&RB, s), 1.0 + s * horner(&SB, s))
    };
    let z = f64::from_bits(x.to_bits() & 0xffff_ffff_0000_0000);
    (-z * z - 0.5625).exp() * ((z - x) * (z + x) + r / big_s).exp() / x
}

/// Error function erf(x) = (2/√π) ∫₀ˣ exp(-t²) dt.
///
/// Full double precision (|error| < 1 ulp) over ℝ.
///
/// # Examples
/// ```
/// use u_nonparametric::special::erf;
/// assert_eq!(erf(0.0), 0.0);
/// assert!((erf(1.0) - 0.8427007929497149).abs() < 1e-15);
/// ```
pub fn erf(x: f64) -> f64 {
    if x.is_nan() {
        return f64::NAN;
    }
    let ix = high_word(x);
    let sign = if x.is_sign_negative() { -1.0 } else { 1.0 };
    if ix >= 0x7ff0_0000 {
        return sign;
    }
    if ix < 0x3feb_0000 {
        // |x| < 0.84375
        if ix < 0x3e30_0000 {
            return 0.125 * (8.0 * x + EFX8 * x);
        }
        return x + x * erf_small(x);
    }
    if ix < 0x4018_0000 {
        // |x| < 6
        return sign * (1.0 - erfc_positive(x.abs()));
    }
    sign * (1.0 - 1.0e-300)
}

/// Complementary error function erfc(x) = 1 − erf(x).
///
/// Evaluated directly rather than as `1 − erf(x)`, so relative precision
/// survives deep in the upper tail.
///
/// # Examples
/// ```
/// use u_nonparametric::special::erfc;
/// assert_eq!(erfc(0.0), 1.0);
/// assert!((erfc(3.0) - 2.209049699858544e-5).abs() < 1e-18);
/// ```
pub fn erfc(x: f64) -> f64 {
    if x.is_nan() {
        return f64::NAN;
    }
    let ix = high_word(x);
    let negative = x.is_sign_negative();
    if ix >= 0x7ff0_0000 {
        return if negative { 2.0 } else { 0.0 };
    }
    if ix < 0x3feb_0000 {
        // |x| < 0.84375
        if ix < 0x3c70_0000 {
            return 1.0 - x;
        }
        let y = erf_small(x);
        if negative || ix < 0x3fd0_0000 {
            return 1.0 - (x + x * y);
        }
        return 0.5 - (x - 0.5 + x * y);
    }
    if ix < 0x403c_0000 {
        // |x| < 28
        let tail = erfc_positive(x.abs());
        return if negative { 2.0 - tail } else { tail };
    }
    if negative {
        2.0
    } else {
        0.0
    }
}

// ============================================================================
// Standard Normal
// ============================================================================

/// Standard normal CDF Φ(x) = P(Z ≤ x) for Z ~ N(0,1).
///
/// Uses `Φ(x) = erfc(−x/√2)/2`, which keeps relative precision in the
/// lower tail.
pub fn standard_normal_cdf(x: f64) -> f64 {
    if x.is_nan() {
        return f64::NAN;
    }
    if x == f64::INFINITY {
        return 1.0;
    }
    if x == f64::NEG_INFINITY {
        return 0.0;
    }
    (0.5 * erfc(-x / std::f64::consts::SQRT_2)).clamp(0.0, 1.0)
}

/// Standard normal survival function 1 − Φ(x).
pub fn standard_normal_upper(x: f64) -> f64 {
    standard_normal_cdf(-x)
}

/// Standard normal PDF φ(x) = (1/√(2π)) exp(-x²/2).
pub fn standard_normal_pdf(x: f64) -> f64 {
    if x.is_nan() {
        return f64::NAN;
    }
    FRAC_1_SQRT_2PI * (-0.5 * x * x).exp()
}

/// Inverse standard normal CDF (quantile function).
///
/// # Algorithm
/// Acklam's rational approximation with separate central and tail regions
/// (break point p = 0.02425). Relative error < 1.15 × 10⁻⁹.
///
/// # Returns
/// - `f64::NAN` if `p` is outside `[0, 1]` or NaN.
/// - `f64::NEG_INFINITY` if `p == 0.0`, `f64::INFINITY` if `p == 1.0`.
///
/// # Examples
/// ```
/// use u_nonparametric::special::inverse_normal_cdf;
/// assert!(inverse_normal_cdf(0.5).abs() < 1e-9);
/// assert!((inverse_normal_cdf(0.975) - 1.959963984540054).abs() < 1e-8);
/// ```
pub fn inverse_normal_cdf(p: f64) -> f64 {
    #[allow(clippy::excessive_precision)]
    const A: [f64; 6] = [
        -3.969683028665376e+01,
        2.209460984245205e+02,
        -2.759285104469687e+02,
        1.383577518672690e+02,
        -3.066479806614716e+01,
        2.506628277459239e+00,
    ];
    #[allow(clippy::excessive_precision)]
    const B: [f64; 5] = [
        -5.447609879822406e+01,
        1.615858368580409e+02,
        -1.556989798598866e+02,
        6.680131188771972e+01,
        -1.328068155288572e+01,
    ];
    #[allow(clippy::excessive_precision)]
    const C: [f64; 6] = [
        -7.784894002430293e-03,
        -3.223964580411365e-01,
        -2.400758277161838e+00,
        -2.549732539343734e+00,
        4.374664141464968e+00,
        2.938163982698783e+00,
    ];
    #[allow(clippy::excessive_precision)]
    const D: [f64; 4] = [
        7.784695709041462e-03,
        3.224671290700398e-01,
        2.445134137142996e+00,
        3.754408661907416e+00,
    ];
    const P_LOW: f64 = 0.02425;

    if p.is_nan() || !(0.0..=1.0).contains(&p) {
        return f64::NAN;
    }
    if p == 0.0 {
        return f64::NEG_INFINITY;
    }
    if p == 1.0 {
        return f64::INFINITY;
    }

    let tail = |q: f64| {
        let t = (-2.0 * q.ln()).sqrt();
        (((((C[0] * t + C[1]) * t + C[2]) * t + C[3]) * t + C[4]) * t + C[5])
            / ((((D[0] * t + D[1]) * t + D[2]) * t + D[3]) * t + 1.0)
    };

    if p < P_LOW {
        tail(p)
    } else if p > 1.0 - P_LOW {
        -tail(1.0 - p)
    } else {
        let q = p - 0.5;
        let r = q * q;
        (((((A[0] * r + A[1]) * r + A[2]) * r + A[3]) * r + A[4]) * r + A[5]) * q
            / (((((B[0] * r + B[1]) * r + B[2]) * r + B[3]) * r + B[4]) * r + 1.0)
    }
}

// ============================================================================
// Compensated summation
// ============================================================================

/// Neumaier compensated accumulator.
///
/// Tail probabilities are sums of many terms of very different magnitude;
/// the compensation term keeps the result at O(ε) independent of the
/// number of terms.
///
/// Reference: Neumaier (1974), *ZAMM* 54(1), pp. 39–51.
#[derive(Debug, Clone, Copy, Default)]
pub struct KahanSum {
    sum: f64,
    c: f64,
}

impl KahanSum {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, x: f64) {
        let t = self.sum + x;
        if self.sum.abs() >= x.abs() {
            self.c += (self.sum - t) + x;
        } else {
            self.c += (x - t) + self.sum;
        }
        self.sum = t;
    }

    pub fn total(&self) -> f64 {
        self.sum + self.c
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // --- ln_gamma / ln_choose ---

    #[test]
    fn test_ln_gamma_known_values() {
        assert!((ln_gamma(3.0) - 2.0_f64.ln()).abs() < 1e-10);
        assert!((ln_gamma(5.0) - 24.0_f64.ln()).abs() < 1e-10);
        assert!(
            (ln_gamma(0.5) - std::f64::consts::PI.sqrt().ln()).abs() < 1e-10,
            "ln Γ(0.5) = {}",
            ln_gamma(0.5)
        );
    }

    #[test]
    fn test_ln_factorial_matches_gamma() {
        for n in [0_u64, 1, 5, 20, 21, 50] {
            let expected = ln_gamma(n as f64 + 1.0);
            assert!(
                (ln_factorial(n) - expected).abs() < 1e-8,
                "ln {n}! = {} vs {expected}",
                ln_factorial(n)
            );
        }
    }

    #[test]
    fn test_ln_choose() {
        assert!((ln_choose(20, 10) - 184756.0_f64.ln()).abs() < 1e-9);
        assert_eq!(ln_choose(7, 0), 0.0);
        assert_eq!(ln_choose(7, 7), 0.0);
        assert_eq!(ln_choose(2, 3), f64::NEG_INFINITY);
    }

    // --- incomplete gamma ---

    #[test]
    fn test_lower_gamma_exponential_case() {
        for &x in &[0.1, 1.0, 2.5, 10.0] {
            let expected = 1.0 - (-x as f64).exp();
            assert!((regularized_lower_gamma(1.0, x) - expected).abs() < 1e-10);
        }
    }

    #[test]
    fn test_lower_upper_complement() {
        for &(a, x) in &[(0.5, 0.2), (2.0, 1.0), (3.0, 7.0), (10.0, 12.0)] {
            let sum = regularized_lower_gamma(a, x) + regularized_upper_gamma(a, x);
            assert!((sum - 1.0).abs() < 1e-12, "P + Q = {sum} for a={a}, x={x}");
        }
    }

    #[test]
    fn test_gamma_boundaries() {
        assert_eq!(regularized_lower_gamma(2.0, 0.0), 0.0);
        assert_eq!(regularized_upper_gamma(2.0, 0.0), 1.0);
        assert_eq!(regularized_lower_gamma(2.0, f64::INFINITY), 1.0);
        assert!(regularized_lower_gamma(f64::NAN, 1.0).is_nan());
    }

    // --- erf / normal ---

    #[test]
    fn test_erf_known_values() {
        assert!((erf(1.0) - 0.8427007929497149).abs() < 1e-14);
        assert!((erf(-1.0) + 0.8427007929497149).abs() < 1e-14);
        assert!((erf(0.5) - 0.5204998778130465).abs() < 1e-14);
        assert!((erfc(3.0) - 2.209049699858544e-5).abs() < 1e-17);
        assert!((erfc(-1.0) - 1.8427007929497148).abs() < 1e-14);
    }

    #[test]
    fn test_normal_cdf_at_zero() {
        assert_eq!(standard_normal_cdf(0.0), 0.5);
    }

    #[test]
    fn test_normal_cdf_known_values() {
        assert!((standard_normal_cdf(1.0) - 0.8413447460685429).abs() < 1e-12);
        assert!((standard_normal_cdf(1.96) - 0.9750021048517795).abs() < 1e-12);
        assert!((standard_normal_cdf(-2.576) - 0.004997532315633).abs() < 1e-9);
        assert!((standard_normal_upper(3.0) - 0.0013498980316301).abs() < 1e-9);
    }

    #[test]
    fn test_normal_cdf_extremes() {
        assert_eq!(standard_normal_cdf(f64::INFINITY), 1.0);
        assert_eq!(standard_normal_cdf(f64::NEG_INFINITY), 0.0);
        assert!(standard_normal_cdf(f64::NAN).is_nan());
    }

    #[test]
    fn test_inverse_normal_known_values() {
        assert!((inverse_normal_cdf(0.95) - 1.6448536269514722).abs() < 1e-8);
        assert!((inverse_normal_cdf(0.01) + 2.3263478740408408).abs() < 1e-8);
        assert!((inverse_normal_cdf(1e-6) + 4.753424308822899).abs() < 1e-7);
        assert_eq!(inverse_normal_cdf(0.0), f64::NEG_INFINITY);
        assert_eq!(inverse_normal_cdf(1.0), f64::INFINITY);
        assert!(inverse_normal_cdf(1.5).is_nan());
    }

    #[test]
    fn test_kahan_sum_recovers_small_terms() {
        let mut acc = KahanSum::new();
        acc.add(1.0);
        for _ in 0..10_000 {
            acc.add(1e-16);
        }
        acc.add(-1.0);
        assert!((acc.total() - 1e-12).abs() < 1e-20);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(500))]

        #[test]
        fn cdf_in_zero_one(x in -8.0_f64..8.0) {
            let c = standard_normal_cdf(x);
            prop_assert!((0.0..=1.0).contains(&c), "CDF({x}) = {c} out of [0,1]");
        }

        #[test]
        fn cdf_is_monotonic(x1 in -8.0_f64..8.0, x2 in -8.0_f64..8.0) {
            let (lo, hi) = if x1 <= x2 { (x1, x2) } else { (x2, x1) };
            prop_assert!(standard_normal_cdf(lo) <= standard_normal_cdf(hi) + 1e-15);
        }

        #[test]
        fn inverse_roundtrip(z in -3.0_f64..3.0) {
            let back = inverse_normal_cdf(standard_normal_cdf(z));
            prop_assert!((back - z).abs() < 1e-7, "roundtrip {z} -> {back}");
        }

        #[test]
        fn erf_odd_symmetry(x in 0.01_f64..5.0) {
            let sum = erf(x) + erf(-x);
            prop_assert!(sum.abs() < 1e-15, "erf odd symmetry: {sum} for x={x}");
        }

        #[test]
        fn lower_gamma_in_01(a in 0.5_f64..50.0, x in 0.0_f64..100.0) {
            let p = regularized_lower_gamma(a, x);
            prop_assert!((0.0..=1.0).contains(&p), "P({a}, {x}) = {p}");
        }
    }
}
