//! Sink boundary for decoded paths.
//!
//! Downstream consumers (plotting, reporting) only need "a sequence
//! convertible to (coordinate, value) pairs"; that capability is the
//! [`SeriesPoints`] trait. The crate never renders anything itself.
//!
//! [`StateDensity`] is the one built-in producer: the sliding-window
//! fraction of a target state along a decoded path, the classic
//! post-processing step for CpG-island decoding.

/// A sequence convertible to `(coordinate, value)` pairs.
pub trait SeriesPoints {
    fn points(&self) -> Vec<(usize, f64)>;
}

/// Sliding-window density of one state along a decoded path.
///
/// For a window of size `w`, point `i` is the fraction of positions in
/// `path[i..i + w]` equal to the target state; the window advances one
/// position at a time. Paths shorter than the window produce no points.
#[derive(Debug, Clone)]
pub struct StateDensity {
    fractions: Vec<f64>,
}

impl StateDensity {
    /// Compute the density series of `target` (a dense state index) over a
    /// decoded path.
    ///
    /// # Panics
    /// Panics if `window == 0`.
    pub fn over_path(path: &[usize], target: usize, window: usize) -> Self {
        assert!(window > 0, "window must be positive");
        if path.len() < window {
            return Self {
                fractions: Vec::new(),
            };
        }

        let mut fractions = Vec::with_capacity(path.len() - window + 1);
        let mut hits = path[..window].iter().filter(|&&s| s == target).count();
        fractions.push(hits as f64 / window as f64);
        for i in window..path.len() {
            hits += usize::from(path[i] == target);
            hits -= usize::from(path[i - window] == target);
            fractions.push(hits as f64 / window as f64);
        }
        Self { fractions }
    }

    /// The window-start coordinates and fractions as a comma-separated
    /// line, the form the historical plotting pipeline consumed.
    pub fn csv(&self) -> String {
        self.fractions
            .iter()
            .map(|f| f.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl SeriesPoints for StateDensity {
    fn points(&self) -> Vec<(usize, f64)> {
        self.fractions.iter().copied().enumerate().collect()
    }
}
