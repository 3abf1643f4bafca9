//! The decoder: forward probability and Viterbi path in one pass.
//!
//! [`Decoder::decode`] runs the combined forward/Viterbi recurrence over an
//! observation sequence, advancing a [`crate::trellis::Frontier`] one
//! observation at a time and reducing over source states at each step. It
//! is a pure function of the model and the sequence: no state survives
//! between calls, and repeated calls return bit-identical results.
//!
//! A decoder carries exactly one numeric policy ([`NumericMode`]); results
//! are reported in that domain, with linear-domain accessors on
//! [`Decoded`].
//!
//! ```
//! use trellis_decode::{Decoder, Model};
//!
//! let model = Model::builder()
//!     .state("Hot")
//!     .state("Cold")
//!     .start("Hot", 0.5)
//!     .start("Cold", 0.5)
//!     .transition("Hot", "Hot", 0.7)
//!     .transition("Hot", "Cold", 0.3)
//!     .transition("Cold", "Hot", 0.4)
//!     .transition("Cold", "Cold", 0.6)
//!     .emission("Hot", "3", 0.7)
//!     .emission("Hot", "1", 0.3)
//!     .emission("Cold", "3", 0.2)
//!     .emission("Cold", "1", 0.8)
//!     .build()
//!     .unwrap();
//!
//! let result = Decoder::log_space().decode(&model, &["3", "1", "1"]).unwrap();
//! assert_eq!(result.path().len(), 3);
//! assert!(result.total_probability() >= result.best_path_probability());
//! ```

use crate::error::ModelError;
use crate::model::Model;
use crate::numeric::NumericMode;
use crate::source::ObservationSource;
use crate::trellis::Frontier;

/// Stateless decoding engine with a fixed numeric policy.
#[derive(Debug, Clone, Copy)]
pub struct Decoder {
    mode: NumericMode,
}

impl Decoder {
    /// Decoder with an explicit numeric policy.
    pub fn new(mode: NumericMode) -> Self {
        Self { mode }
    }

    /// Linear-space decoder. Fine for short sequences; long sequences may
    /// underflow, which is reported via [`Decoded::underflowed`].
    pub fn linear() -> Self {
        Self::new(NumericMode::Linear)
    }

    /// Log-space decoder. Recommended beyond a few dozen observations.
    pub fn log_space() -> Self {
        Self::new(NumericMode::LogSpace)
    }

    /// The configured numeric policy.
    pub fn mode(&self) -> NumericMode {
        self.mode
    }

    /// Decode an observation sequence against a model.
    ///
    /// Returns the forward probability of the sequence, the Viterbi path
    /// (one state per observation) and that path's probability. Symbols the
    /// model never emits get emission probability 0 in every state; they
    /// are not an error. A zero-length sequence yields an empty path with
    /// `total = Σ start` and `best = max start`.
    ///
    /// Ties in any maximization resolve to the first candidate in
    /// state-declaration order.
    ///
    /// # Errors
    /// [`ModelError`] if the model has no states or a state carries neither
    /// a start probability nor any transition/emission entries. Row sums
    /// are deliberately not checked here; see [`Model::check_stochastic`].
    pub fn decode<S: AsRef<str>>(
        &self,
        model: &Model,
        observations: &[S],
    ) -> Result<Decoded, ModelError> {
        model.ensure_decodable()?;

        #[cfg(feature = "tracing")]
        let span = tracing::info_span!(
            "decode",
            states = model.n_states(),
            observations = observations.len(),
            mode = ?self.mode
        );
        #[cfg(feature = "tracing")]
        let _enter = span.enter();

        let mode = self.mode;
        let frontier = match observations.split_first() {
            None => Frontier::seed(model, mode),
            Some((first, rest)) => {
                let mut f = Frontier::init(model, mode, model.symbol_index(first.as_ref()));
                for obs in rest {
                    f = f.advance(model, mode, model.symbol_index(obs.as_ref()));
                }
                f
            }
        };

        let mut total = mode.zero();
        let mut best = mode.zero();
        let mut best_state = 0usize;
        for (s, cell) in frontier.cells.iter().enumerate() {
            total = mode.sum(total, cell.total);
            if cell.best > best {
                best = cell.best;
                best_state = s;
            }
        }
        let path = frontier.cells[best_state].path.to_vec();

        let underflow = mode == NumericMode::Linear && frontier.underflow;
        #[cfg(feature = "tracing")]
        if underflow {
            tracing::warn!(
                observations = observations.len(),
                "linear-space probabilities underflowed; switch to NumericMode::LogSpace"
            );
        }

        Ok(Decoded {
            total,
            best,
            path,
            mode,
            underflow,
        })
    }

    /// Decode a sequence produced by an [`ObservationSource`].
    ///
    /// # Errors
    /// Same as [`decode`](Self::decode).
    pub fn decode_source(
        &self,
        model: &Model,
        source: &impl ObservationSource,
    ) -> Result<Decoded, ModelError> {
        self.decode(model, &source.observations())
    }
}

pub struct DecoderBuilder {
    mode: Option<NumericMode>,
}

impl DecoderBuilder {
    pub fn new() -> Self {
        Self { mode: None }
    }
    pub fn with_mode(mut self, mode: NumericMode) -> Self {
        self.mode = Some(mode);
        self
    }
    pub fn build(self) -> Decoder {
        Decoder::new(self.mode.unwrap_or(NumericMode::LogSpace))
    }
}

impl Default for DecoderBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome of one decode call.
///
/// The scalar fields live in the decoder's numeric domain; the
/// `*_probability` accessors always report linear-domain values.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    total: f64,
    best: f64,
    path: Vec<usize>,
    mode: NumericMode,
    underflow: bool,
}

impl Decoded {
    /// Numeric domain the scalars are expressed in.
    pub fn mode(&self) -> NumericMode {
        self.mode
    }

    /// The Viterbi path as dense state indices, one per observation.
    pub fn path(&self) -> &[usize] {
        &self.path
    }

    /// The Viterbi path rendered as state names.
    pub fn path_names<'m>(&self, model: &'m Model) -> Vec<&'m str> {
        self.path.iter().map(|&s| model.state_name(s)).collect()
    }

    /// Forward probability of the observation sequence (linear domain).
    pub fn total_probability(&self) -> f64 {
        self.mode.to_probability(self.total)
    }

    /// Probability of the Viterbi path (linear domain).
    pub fn best_path_probability(&self) -> f64 {
        self.mode.to_probability(self.best)
    }

    /// Forward probability as a natural log.
    pub fn log_total_probability(&self) -> f64 {
        match self.mode {
            NumericMode::Linear => self.total.ln(),
            NumericMode::LogSpace => self.total,
        }
    }

    /// Viterbi path probability as a natural log.
    pub fn log_best_path_probability(&self) -> f64 {
        match self.mode {
            NumericMode::Linear => self.best.ln(),
            NumericMode::LogSpace => self.best,
        }
    }

    /// True when a linear-mode decode lost probability mass to floating
    /// point underflow. The result is still deterministic, but the scalars
    /// are not meaningful; rerun in log space.
    pub fn underflowed(&self) -> bool {
        self.underflow
    }
}
