//! Error taxonomy for model construction and decoding.
//!
//! All failures are structural problems with the supplied model. Decoding
//! itself is deterministic and cannot partially fail: `decode` either
//! returns a complete result or one of these errors before producing any
//! output. Probability underflow in linear mode is a diagnostic on the
//! result, not an error (see [`crate::decoder::Decoded::underflowed`]).

use thiserror::Error;

/// A structurally invalid model.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    /// The model declares no hidden states.
    #[error("model has no states")]
    EmptyStates,

    /// The same state name was declared more than once.
    #[error("state `{0}` declared more than once")]
    DuplicateState(String),

    /// A start/transition/emission entry references an undeclared state.
    #[error("{table} entry references unknown state `{name}`")]
    UnknownState {
        /// Name as it appeared in the offending entry.
        name: String,
        /// Which table referenced it: "start", "transition" or "emission".
        table: &'static str,
    },

    /// A supplied probability is negative.
    #[error("{table} probability for state `{state}` is negative ({prob})")]
    NegativeProbability {
        state: String,
        table: &'static str,
        prob: f64,
    },

    /// A state has neither a start probability nor any transition or
    /// emission entries, so no path can ever be decoded through it.
    #[error("state `{0}` has no start probability and no transition or emission entries")]
    UndecodableState(String),

    /// Opt-in stochastic check failed: a probability row does not sum to
    /// ~1.0. Never raised by `decode` itself.
    #[error("{table} row for state `{state}` sums to {sum}, expected ~1.0")]
    NotStochastic {
        state: String,
        table: &'static str,
        sum: f64,
    },
}
