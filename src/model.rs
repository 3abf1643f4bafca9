//! Hidden Markov model definition and construction.
//!
//! A [`Model`] is an immutable value: an ordered set of named hidden states,
//! a start-probability vector, a transition matrix and an emission matrix
//! over an interned symbol alphabet. Construction goes through
//! [`ModelBuilder`], which accepts the caller's mapping-shaped view
//! (state name -> probability) and compiles it to dense rows.
//!
//! Probabilities are stored in linear space regardless of the decoder's
//! numeric policy; the decoder maps them into its domain on access.
//!
//! The builder validates structure (duplicates, unknown references,
//! negative probabilities). It deliberately does **not** require rows to
//! sum to 1.0: a caller may supply an improper model, in which case the
//! decoded `total_probability` is not a true probability. The opt-in
//! [`Model::check_stochastic`] covers callers that want the stricter check.

use std::collections::HashMap;

use crate::error::ModelError;

/// An immutable discrete hidden Markov model.
///
/// States and symbols are interned: the declaration order of states is the
/// iteration order used by the decoder, which makes tie-breaking
/// deterministic (first declared state wins).
#[derive(Debug, Clone)]
pub struct Model {
    names: Vec<String>,
    index: HashMap<String, usize>,
    symbols: Vec<String>,
    symbol_ids: HashMap<String, usize>,
    /// start[s], linear probability.
    start: Vec<f64>,
    /// transition[from * n + to], linear probability.
    transition: Vec<f64>,
    /// emission[state * m + symbol], linear probability.
    emission: Vec<f64>,
    has_start: Vec<bool>,
    has_transition: Vec<bool>,
    has_emission: Vec<bool>,
}

impl Model {
    /// Start building a model.
    pub fn builder() -> ModelBuilder {
        ModelBuilder::new()
    }

    /// Number of hidden states.
    pub fn n_states(&self) -> usize {
        self.names.len()
    }

    /// Number of interned observation symbols.
    pub fn n_symbols(&self) -> usize {
        self.symbols.len()
    }

    /// State names in declaration order.
    pub fn state_names(&self) -> &[String] {
        &self.names
    }

    /// Dense index of a state name, if declared.
    pub fn state_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Name of the state at `index`.
    ///
    /// # Panics
    /// Panics if `index >= n_states()`.
    pub fn state_name(&self, index: usize) -> &str {
        &self.names[index]
    }

    /// Dense index of an observation symbol. `None` for symbols the model
    /// never emits; the decoder treats those as emission probability 0 for
    /// every state rather than an error.
    pub fn symbol_index(&self, symbol: &str) -> Option<usize> {
        self.symbol_ids.get(symbol).copied()
    }

    /// Start probability of state `s` (0.0 when absent).
    #[inline]
    pub fn start(&self, s: usize) -> f64 {
        self.start[s]
    }

    /// Transition probability `from -> to` (0.0 when absent).
    #[inline]
    pub fn transition(&self, from: usize, to: usize) -> f64 {
        self.transition[from * self.names.len() + to]
    }

    /// Emission probability of `symbol` (dense index) in state `s`.
    #[inline]
    pub fn emission(&self, s: usize, symbol: usize) -> f64 {
        self.emission[s * self.symbols.len() + symbol]
    }

    /// Decode-time precondition: the model must have at least one state,
    /// and every state must carry a start probability or at least one
    /// transition/emission entry. A state with none of these can never lie
    /// on a decodable path and indicates a configuration error.
    pub(crate) fn ensure_decodable(&self) -> Result<(), ModelError> {
        if self.names.is_empty() {
            return Err(ModelError::EmptyStates);
        }
        for s in 0..self.names.len() {
            if !self.has_start[s] && !self.has_transition[s] && !self.has_emission[s] {
                return Err(ModelError::UndecodableState(self.names[s].clone()));
            }
        }
        Ok(())
    }

    /// Opt-in check that the start vector and every populated transition
    /// and emission row sum to 1.0 within `tolerance`.
    ///
    /// Rows with no explicit entries are skipped; the start check reports
    /// state `*`. Never invoked by `decode`.
    ///
    /// # Errors
    /// [`ModelError::NotStochastic`] for the first offending row.
    pub fn check_stochastic(&self, tolerance: f64) -> Result<(), ModelError> {
        let n = self.names.len();
        let m = self.symbols.len();

        let start_sum: f64 = self.start.iter().sum();
        if self.has_start.iter().any(|&h| h) && (start_sum - 1.0).abs() > tolerance {
            return Err(ModelError::NotStochastic {
                state: "*".into(),
                table: "start",
                sum: start_sum,
            });
        }

        for s in 0..n {
            if self.has_transition[s] {
                let sum: f64 = self.transition[s * n..(s + 1) * n].iter().sum();
                if (sum - 1.0).abs() > tolerance {
                    return Err(ModelError::NotStochastic {
                        state: self.names[s].clone(),
                        table: "transition",
                        sum,
                    });
                }
            }
            if self.has_emission[s] {
                let sum: f64 = self.emission[s * m..(s + 1) * m].iter().sum();
                if (sum - 1.0).abs() > tolerance {
                    return Err(ModelError::NotStochastic {
                        state: self.names[s].clone(),
                        table: "emission",
                        sum,
                    });
                }
            }
        }
        Ok(())
    }
}

/// Builder mirroring the mapping view of an HMM.
///
/// ```
/// use trellis_decode::Model;
///
/// let model = Model::builder()
///     .state("Rainy")
///     .state("Sunny")
///     .start("Rainy", 0.6)
///     .start("Sunny", 0.4)
///     .transition("Rainy", "Rainy", 0.7)
///     .transition("Rainy", "Sunny", 0.3)
///     .transition("Sunny", "Rainy", 0.4)
///     .transition("Sunny", "Sunny", 0.6)
///     .emission("Rainy", "walk", 0.1)
///     .emission("Sunny", "walk", 0.6)
///     .build()
///     .unwrap();
/// assert_eq!(model.n_states(), 2);
/// ```
#[derive(Debug, Default)]
pub struct ModelBuilder {
    states: Vec<String>,
    start: Vec<(String, f64)>,
    transitions: Vec<(String, String, f64)>,
    emissions: Vec<(String, String, f64)>,
}

impl ModelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a hidden state. Declaration order is the decoder's iteration
    /// order and therefore the tie-breaking order.
    pub fn state(mut self, name: &str) -> Self {
        self.states.push(name.to_owned());
        self
    }

    /// Start probability for a declared state. Undeclared-at-build names
    /// are rejected; absent entries default to probability 0.
    pub fn start(mut self, state: &str, prob: f64) -> Self {
        self.start.push((state.to_owned(), prob));
        self
    }

    /// Transition probability `from -> to`. Absent entries default to 0.
    pub fn transition(mut self, from: &str, to: &str, prob: f64) -> Self {
        self.transitions.push((from.to_owned(), to.to_owned(), prob));
        self
    }

    /// Emission probability of `symbol` in `state`. The symbol alphabet is
    /// the set of symbols mentioned here, interned in first-seen order.
    pub fn emission(mut self, state: &str, symbol: &str, prob: f64) -> Self {
        self.emissions
            .push((state.to_owned(), symbol.to_owned(), prob));
        self
    }

    /// Compile and validate the model.
    ///
    /// # Errors
    /// [`ModelError::DuplicateState`], [`ModelError::UnknownState`] or
    /// [`ModelError::NegativeProbability`] on structural problems.
    pub fn build(self) -> Result<Model, ModelError> {
        let mut index = HashMap::with_capacity(self.states.len());
        for (i, name) in self.states.iter().enumerate() {
            if index.insert(name.clone(), i).is_some() {
                return Err(ModelError::DuplicateState(name.clone()));
            }
        }

        let lookup = |name: &str, table: &'static str| -> Result<usize, ModelError> {
            index.get(name).copied().ok_or_else(|| ModelError::UnknownState {
                name: name.to_owned(),
                table,
            })
        };
        let check_prob =
            |state: &str, table: &'static str, prob: f64| -> Result<(), ModelError> {
                if prob < 0.0 {
                    return Err(ModelError::NegativeProbability {
                        state: state.to_owned(),
                        table,
                        prob,
                    });
                }
                Ok(())
            };

        let n = self.states.len();
        let mut symbols: Vec<String> = Vec::new();
        let mut symbol_ids: HashMap<String, usize> = HashMap::new();
        for (_, symbol, _) in &self.emissions {
            if !symbol_ids.contains_key(symbol) {
                symbol_ids.insert(symbol.clone(), symbols.len());
                symbols.push(symbol.clone());
            }
        }
        let m = symbols.len();

        let mut start = vec![0.0; n];
        let mut has_start = vec![false; n];
        for (name, prob) in &self.start {
            let s = lookup(name, "start")?;
            check_prob(name, "start", *prob)?;
            start[s] = *prob;
            has_start[s] = true;
        }

        let mut transition = vec![0.0; n * n];
        let mut has_transition = vec![false; n];
        for (from, to, prob) in &self.transitions {
            let f = lookup(from, "transition")?;
            let t = lookup(to, "transition")?;
            check_prob(from, "transition", *prob)?;
            transition[f * n + t] = *prob;
            has_transition[f] = true;
        }

        let mut emission = vec![0.0; n * m];
        let mut has_emission = vec![false; n];
        for (state, symbol, prob) in &self.emissions {
            let s = lookup(state, "emission")?;
            check_prob(state, "emission", *prob)?;
            let k = symbol_ids[symbol];
            emission[s * m + k] = *prob;
            has_emission[s] = true;
        }

        Ok(Model {
            names: self.states,
            index,
            symbols,
            symbol_ids,
            start,
            transition,
            emission,
            has_start,
            has_transition,
            has_emission,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weather() -> Model {
        Model::builder()
            .state("Rainy")
            .state("Sunny")
            .start("Rainy", 0.6)
            .start("Sunny", 0.4)
            .transition("Rainy", "Rainy", 0.7)
            .transition("Rainy", "Sunny", 0.3)
            .transition("Sunny", "Rainy", 0.4)
            .transition("Sunny", "Sunny", 0.6)
            .emission("Rainy", "walk", 0.1)
            .emission("Rainy", "shop", 0.4)
            .emission("Rainy", "clean", 0.5)
            .emission("Sunny", "walk", 0.6)
            .emission("Sunny", "shop", 0.3)
            .emission("Sunny", "clean", 0.1)
            .build()
            .unwrap()
    }

    #[test]
    fn interning_preserves_declaration_order() {
        let m = weather();
        assert_eq!(m.state_names(), &["Rainy".to_owned(), "Sunny".to_owned()]);
        assert_eq!(m.state_index("Sunny"), Some(1));
        assert_eq!(m.symbol_index("walk"), Some(0));
        assert_eq!(m.symbol_index("clean"), Some(2));
        assert_eq!(m.symbol_index("nap"), None);
    }

    #[test]
    fn dense_lookups() {
        let m = weather();
        assert_eq!(m.start(0), 0.6);
        assert_eq!(m.transition(1, 0), 0.4);
        let shop = m.symbol_index("shop").unwrap();
        assert_eq!(m.emission(0, shop), 0.4);
    }

    #[test]
    fn absent_entries_are_zero() {
        let m = Model::builder()
            .state("A")
            .state("B")
            .start("A", 1.0)
            .transition("A", "B", 1.0)
            .emission("A", "x", 1.0)
            .emission("B", "y", 1.0)
            .build()
            .unwrap();
        assert_eq!(m.start(1), 0.0);
        assert_eq!(m.transition(1, 0), 0.0);
        let y = m.symbol_index("y").unwrap();
        assert_eq!(m.emission(0, y), 0.0);
    }

    #[test]
    fn duplicate_state_rejected() {
        let err = Model::builder().state("A").state("A").build().unwrap_err();
        assert_eq!(err, ModelError::DuplicateState("A".into()));
    }

    #[test]
    fn unknown_reference_rejected() {
        let err = Model::builder()
            .state("A")
            .transition("A", "B", 0.5)
            .build()
            .unwrap_err();
        assert!(matches!(err, ModelError::UnknownState { table: "transition", .. }));
    }

    #[test]
    fn negative_probability_rejected() {
        let err = Model::builder()
            .state("A")
            .start("A", -0.1)
            .build()
            .unwrap_err();
        assert!(matches!(err, ModelError::NegativeProbability { table: "start", .. }));
    }

    #[test]
    fn stochastic_check_flags_bad_row() {
        let m = Model::builder()
            .state("A")
            .start("A", 1.0)
            .transition("A", "A", 0.5)
            .emission("A", "x", 1.0)
            .build()
            .unwrap();
        let err = m.check_stochastic(1e-9).unwrap_err();
        assert!(matches!(err, ModelError::NotStochastic { table: "transition", .. }));
        assert!(weather().check_stochastic(1e-9).is_ok());
    }

    #[test]
    fn undecodable_state_detected() {
        let m = Model::builder()
            .state("A")
            .state("Orphan")
            .start("A", 1.0)
            .transition("A", "A", 1.0)
            .emission("A", "x", 1.0)
            .build()
            .unwrap();
        assert_eq!(
            m.ensure_decodable(),
            Err(ModelError::UndecodableState("Orphan".into()))
        );
    }
}
