//! Example: the classic weather-from-activity decode.
//!
//! Run with:
//! `cargo run --example weather`

use trellis_decode::{Decoder, Model};

fn main() {
    // A friend reports daily activities; the hidden state is the weather.
    let model = Model::builder()
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
        .expect("model is well-formed");

    let observations = ["walk", "shop", "clean"];
    let result = Decoder::linear()
        .decode(&model, &observations)
        .expect("model is decodable");

    println!("Observations: {}", observations.join(", "));
    println!("Sequence probability: {:.6}", result.total_probability());
    println!(
        "Most likely weather:  {} (p = {:.6})",
        result.path_names(&model).join(" -> "),
        result.best_path_probability()
    );
}
