//! Example: the occasionally dishonest casino.
//!
//! The dealer switches between a fair and a biased coin; given a flip
//! sequence, decode which stretches were dealt with which coin.
//!
//! Run with:
//! `cargo run --example casino`

use trellis_decode::{Decoder, Model};

fn main() {
    let model = Model::builder()
        .state("Fair")
        .state("Biased")
        .start("Fair", 0.5)
        .start("Biased", 0.5)
        .transition("Fair", "Fair", 0.9)
        .transition("Fair", "Biased", 0.1)
        .transition("Biased", "Fair", 0.1)
        .transition("Biased", "Biased", 0.9)
        .emission("Fair", "H", 0.5)
        .emission("Fair", "T", 0.5)
        .emission("Biased", "H", 0.75)
        .emission("Biased", "T", 0.25)
        .build()
        .expect("model is well-formed");

    // A fair-looking stretch, then a suspicious run of heads.
    let flips = [
        "H", "T", "T", "H", "T", "H", "T", "T", "H", "T", //
        "H", "H", "H", "H", "H", "T", "H", "H", "H", "H",
    ];

    let result = Decoder::log_space()
        .decode(&model, &flips)
        .expect("model is decodable");

    println!("flips:  {}", flips.join(""));
    println!(
        "coins:  {}",
        result
            .path_names(&model)
            .iter()
            .map(|name| &name[..1])
            .collect::<Vec<_>>()
            .join("")
    );
    println!(
        "log P(flips) = {:.3}, log P(best path) = {:.3}",
        result.log_total_probability(),
        result.log_best_path_probability()
    );
}
