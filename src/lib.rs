//! Forward and Viterbi decoding for discrete hidden Markov models.
//!
//! Given an immutable [`Model`] (named hidden states with start, transition
//! and emission probabilities) and an observation sequence, a [`Decoder`]
//! computes in a single pass:
//! - the **forward probability**: the total probability, over all hidden
//!   paths, that the model produced the sequence, and
//! - the **Viterbi path**: the single most probable hidden-state path,
//!   together with its probability.
//!
//! The recurrence keeps one trellis entry per state (total probability,
//! best path, best-path probability) and rebuilds the whole table at each
//! observation from the previous step only (the Markov property in data
//! form). Emission probabilities are indexed by the destination state of
//! each step, so the decoded path has exactly one state per observation.
//!
//! ## Numeric policy
//! Every decoder runs in exactly one probability domain
//! ([`NumericMode::Linear`] or [`NumericMode::LogSpace`]). Linear mode
//! multiplies raw probabilities and flags underflow on its result; log
//! mode replaces products with sums and the forward accumulation with a
//! log-sum-exp, and is the recommended choice beyond a few dozen
//! observations.
//!
//! ## Quick start
//! ```
//! use trellis_decode::{Decoder, Model};
//!
//! let model = Model::builder()
//!     .state("Rainy")
//!     .state("Sunny")
//!     .start("Rainy", 0.6)
//!     .start("Sunny", 0.4)
//!     .transition("Rainy", "Rainy", 0.7)
//!     .transition("Rainy", "Sunny", 0.3)
//!     .transition("Sunny", "Rainy", 0.4)
//!     .transition("Sunny", "Sunny", 0.6)
//!     .emission("Rainy", "walk", 0.1)
//!     .emission("Rainy", "shop", 0.4)
//!     .emission("Rainy", "clean", 0.5)
//!     .emission("Sunny", "walk", 0.6)
//!     .emission("Sunny", "shop", 0.3)
//!     .emission("Sunny", "clean", 0.1)
//!     .build()
//!     .unwrap();
//!
//! let result = Decoder::linear()
//!     .decode(&model, &["walk", "shop", "clean"])
//!     .unwrap();
//!
//! assert!((result.total_probability() - 0.033612).abs() < 1e-9);
//! assert_eq!(result.path_names(&model), vec!["Sunny", "Rainy", "Rainy"]);
//! ```
//!
//! ## Features
//! - `parallel`: fan the per-state reductions of each step out on rayon
//!   (a barrier separates steps; results are identical).
//! - `tracing`: spans around decode calls and a warning when linear-space
//!   probabilities underflow.

pub mod decoder;
pub mod error;
pub mod model;
pub mod numeric;
pub mod series;
pub mod source;
mod trellis;

pub use crate::decoder::{Decoded, Decoder, DecoderBuilder};
pub use crate::error::ModelError;
pub use crate::model::{Model, ModelBuilder};
pub use crate::numeric::NumericMode;
pub use crate::series::{SeriesPoints, StateDensity};
pub use crate::source::{DnaText, ObservationSource};
