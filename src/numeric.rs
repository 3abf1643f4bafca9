//! Numeric policy: linear-space vs. log-space probability arithmetic.
//!
//! A decoder runs entirely in one domain. Linear space multiplies raw
//! probabilities and can underflow on long sequences; log space replaces
//! products with sums and the forward reduction with a log-sum-exp, at the
//! cost of a transcendental call per addition. Log space is the recommended
//! default beyond a few dozen observations.

/// Probability domain used by a [`crate::Decoder`] instance.
///
/// The domain is fixed per decoder; results are reported in the same domain
/// (see [`crate::decoder::Decoded`] for linear-domain accessors).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericMode {
    /// Raw probabilities in `[0, 1]`. Subject to underflow on long
    /// sequences; underflow is surfaced as a diagnostic flag.
    Linear,
    /// Natural-log probabilities, with `-inf` as the zero element.
    LogSpace,
}

impl NumericMode {
    /// The additive identity of the domain (probability zero).
    #[inline]
    pub fn zero(self) -> f64 {
        match self {
            NumericMode::Linear => 0.0,
            NumericMode::LogSpace => f64::NEG_INFINITY,
        }
    }

    /// Map a raw probability into the domain.
    #[inline]
    pub fn encode(self, p: f64) -> f64 {
        match self {
            NumericMode::Linear => p,
            NumericMode::LogSpace => p.ln(),
        }
    }

    /// Map a domain value back to a raw probability.
    #[inline]
    pub fn to_probability(self, v: f64) -> f64 {
        match self {
            NumericMode::Linear => v,
            NumericMode::LogSpace => v.exp(),
        }
    }

    /// Domain product: `a * b` in linear space, `a + b` in log space.
    #[inline]
    pub fn product(self, a: f64, b: f64) -> f64 {
        match self {
            NumericMode::Linear => a * b,
            NumericMode::LogSpace => a + b,
        }
    }

    /// Domain sum: plain addition in linear space, log-sum-exp in log
    /// space. This is the forward-probability accumulator; the two are not
    /// interchangeable operations.
    #[inline]
    pub fn sum(self, a: f64, b: f64) -> f64 {
        match self {
            NumericMode::Linear => a + b,
            NumericMode::LogSpace => log_sum_exp(a, b),
        }
    }
}

/// Numerically stable `log(exp(a) + exp(b))`.
///
/// `-inf` operands (probability zero) pass through unchanged.
#[inline]
pub fn log_sum_exp(a: f64, b: f64) -> f64 {
    if a == f64::NEG_INFINITY {
        return b;
    }
    if b == f64::NEG_INFINITY {
        return a;
    }
    let max = a.max(b);
    max + ((a - max).exp() + (b - max).exp()).ln()
}

/// Log-sum-exp over a slice; `-inf` for an empty or all-zero slice.
pub fn log_sum_exp_slice(xs: &[f64]) -> f64 {
    let max = xs.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    if max == f64::NEG_INFINITY {
        return f64::NEG_INFINITY;
    }
    let sum: f64 = xs.iter().map(|&x| (x - max).exp()).sum();
    max + sum.ln()
}

/// Did a linear-space product of nonzero factors collapse below the
/// smallest normal float? Signals that the caller should switch to
/// [`NumericMode::LogSpace`].
#[inline]
pub(crate) fn product_underflowed(product: f64, factors_nonzero: bool) -> bool {
    factors_nonzero && product < f64::MIN_POSITIVE
}
