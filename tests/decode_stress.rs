//! Long-sequence stress checks, gated behind the `heavy` feature:
//! `cargo test --features heavy`.

#![cfg(feature = "heavy")]

use trellis_decode::{Decoder, Model};

fn cpg_model() -> Model {
    Model::builder()
        .state("B")
        .state("I")
        .start("B", 0.5)
        .start("I", 0.5)
        .transition("B", "B", 0.7)
        .transition("B", "I", 0.3)
        .transition("I", "B", 0.5)
        .transition("I", "I", 0.5)
        .emission("B", "a", 0.25)
        .emission("B", "t", 0.40)
        .emission("B", "c", 0.10)
        .emission("B", "g", 0.25)
        .emission("I", "a", 0.25)
        .emission("I", "t", 0.25)
        .emission("I", "c", 0.25)
        .emission("I", "g", 0.25)
        .build()
        .unwrap()
}

fn long_dna(len: usize) -> Vec<&'static str> {
    const BASES: [&str; 4] = ["a", "c", "g", "t"];
    (0..len).map(|i| BASES[(i * 31 + i / 7) % 4]).collect()
}

#[test]
fn heavy_log_space_decode_stays_finite() {
    let model = cpg_model();
    let obs = long_dna(100_000);
    let r = Decoder::log_space().decode(&model, &obs).unwrap();
    assert_eq!(r.path().len(), obs.len());
    assert!(r.log_total_probability().is_finite());
    assert!(r.log_best_path_probability().is_finite());
    assert!(r.log_total_probability() >= r.log_best_path_probability());
    assert!(!r.underflowed());
}

#[test]
fn heavy_linear_decode_underflows_but_terminates() {
    let model = cpg_model();
    let obs = long_dna(50_000);
    let r = Decoder::linear().decode(&model, &obs).unwrap();
    assert_eq!(r.path().len(), obs.len());
    assert!(r.underflowed());
}
