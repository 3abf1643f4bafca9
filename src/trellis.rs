//! Per-step trellis table maintained by the decoder.
//!
//! A [`Frontier`] holds one [`Cell`] per hidden state: the total probability
//! of all paths reaching that state at the current step, the best-known
//! path reaching it, and that path's probability. Each step computes a
//! wholly new frontier from the previous one and the previous frontier is
//! then dropped; no trellis table survives beyond one step.
//!
//! Best paths are stored as immutable backward-linked lists with shared
//! prefixes, so extending a path is O(1) and a step costs O(states²)
//! regardless of how far into the sequence it is. The list is materialized
//! into a `Vec` once, at termination.
//!
//! With the `parallel` feature the per-destination-state reductions of one
//! step run on rayon. The collect at the end of [`Frontier::advance`] is
//! the barrier between steps: step `t+1` never observes a partially built
//! step `t`.

use std::sync::Arc;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::model::Model;
use crate::numeric::{product_underflowed, NumericMode};

/// One node of a backward-linked state path.
struct PathNode {
    state: usize,
    prev: PathLink,
}

/// A (possibly empty) path, newest state first.
#[derive(Clone, Default)]
pub(crate) struct PathLink(Option<Arc<PathNode>>);

// Derived Debug would recurse node by node; print the materialized path.
impl std::fmt::Debug for PathLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("PathLink").field(&self.to_vec()).finish()
    }
}

impl PathLink {
    /// The empty path.
    pub fn empty() -> Self {
        PathLink(None)
    }

    /// A new path with `state` appended; the receiver is shared, not copied.
    pub fn extend(&self, state: usize) -> Self {
        PathLink(Some(Arc::new(PathNode {
            state,
            prev: self.clone(),
        })))
    }

    /// Materialize into oldest-first order.
    pub fn to_vec(&self) -> Vec<usize> {
        let mut out = Vec::new();
        let mut cur = &self.0;
        while let Some(node) = cur {
            out.push(node.state);
            cur = &node.prev.0;
        }
        out.reverse();
        out
    }
}

// The derived drop would recurse once per node; a sequence of length T
// builds chains T deep. Unlink iteratively instead, stopping at the first
// node still shared with another cell.
impl Drop for PathLink {
    fn drop(&mut self) {
        let mut cur = self.0.take();
        while let Some(node) = cur {
            match Arc::try_unwrap(node) {
                Ok(mut inner) => cur = inner.prev.0.take(),
                Err(_) => break,
            }
        }
    }
}

/// Trellis entry for one state at one time step.
#[derive(Debug, Clone)]
pub(crate) struct Cell {
    /// Total probability (domain value) of all paths ending here.
    pub total: f64,
    /// Probability (domain value) of the best path ending here.
    pub best: f64,
    /// The best path itself, one state per consumed observation.
    pub path: PathLink,
}

/// The full per-state table for the current time step.
#[derive(Debug, Clone)]
pub(crate) struct Frontier {
    pub cells: Vec<Cell>,
    /// Set when a linear-mode product of nonzero factors collapsed to a
    /// subnormal; sticky across steps.
    pub underflow: bool,
}

/// Emission weight of `symbol` in state `s`, in the decoder's domain.
/// Symbols the model never emits carry probability zero for every state.
#[inline]
fn emit(model: &Model, mode: NumericMode, s: usize, symbol: Option<usize>) -> f64 {
    match symbol {
        Some(k) => mode.encode(model.emission(s, k)),
        None => mode.zero(),
    }
}

impl Frontier {
    /// Frontier before any observation is consumed: start probabilities and
    /// empty paths. Termination applied directly to this frontier yields
    /// the zero-length-sequence result.
    pub fn seed(model: &Model, mode: NumericMode) -> Self {
        let cells = (0..model.n_states())
            .map(|s| {
                let p = mode.encode(model.start(s));
                Cell {
                    total: p,
                    best: p,
                    path: PathLink::empty(),
                }
            })
            .collect();
        Frontier {
            cells,
            underflow: false,
        }
    }

    /// Frontier after the first observation: `start[s] * emit(s, o0)`,
    /// path `[s]`. No transition is paid at this step.
    pub fn init(model: &Model, mode: NumericMode, symbol: Option<usize>) -> Self {
        let mut underflow = false;
        let cells = (0..model.n_states())
            .map(|s| {
                let start = mode.encode(model.start(s));
                let e = emit(model, mode, s, symbol);
                let p = mode.product(start, e);
                if mode == NumericMode::Linear {
                    underflow |= product_underflowed(p, start > 0.0 && e > 0.0);
                }
                Cell {
                    total: p,
                    best: p,
                    path: PathLink::empty().extend(s),
                }
            })
            .collect();
        Frontier { cells, underflow }
    }

    /// One recurrence step: build the next frontier from this one.
    ///
    /// For each destination state `d`:
    /// `total'[d] = Σ_src total[src] * trans(src,d) * emit(d, o)` and
    /// `best'[d] = max_src best[src] * trans(src,d) * emit(d, o)`, the best
    /// path extended from the argmax source. Strict `>` replacement keeps
    /// the first source in state-declaration order on ties.
    pub fn advance(&self, model: &Model, mode: NumericMode, symbol: Option<usize>) -> Frontier {
        let n = model.n_states();

        #[cfg(feature = "parallel")]
        let relaxed: Vec<(Cell, bool)> = (0..n)
            .into_par_iter()
            .map(|d| self.relax_into(model, mode, symbol, d))
            .collect();
        #[cfg(not(feature = "parallel"))]
        let relaxed: Vec<(Cell, bool)> = (0..n)
            .map(|d| self.relax_into(model, mode, symbol, d))
            .collect();

        let mut underflow = self.underflow;
        let cells = relaxed
            .into_iter()
            .map(|(cell, u)| {
                underflow |= u;
                cell
            })
            .collect();
        Frontier { cells, underflow }
    }

    /// Reduction over source states for a single destination state.
    fn relax_into(
        &self,
        model: &Model,
        mode: NumericMode,
        symbol: Option<usize>,
        dst: usize,
    ) -> (Cell, bool) {
        let e = emit(model, mode, dst, symbol);
        let mut total = mode.zero();
        let mut best = mode.zero();
        let mut best_src = 0usize;
        let mut underflow = false;

        for (src, cell) in self.cells.iter().enumerate() {
            let step = mode.product(mode.encode(model.transition(src, dst)), e);
            let contrib = mode.product(cell.total, step);
            let cand = mode.product(cell.best, step);
            if mode == NumericMode::Linear {
                let step_nonzero = model.transition(src, dst) > 0.0 && e > 0.0;
                underflow |= product_underflowed(contrib, cell.total > 0.0 && step_nonzero);
                underflow |= product_underflowed(cand, cell.best > 0.0 && step_nonzero);
            }
            total = mode.sum(total, contrib);
            if cand > best {
                best = cand;
                best_src = src;
            }
        }

        (
            Cell {
                total,
                best,
                path: self.cells[best_src].path.extend(dst),
            },
            underflow,
        )
    }
}
