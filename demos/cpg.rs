//! Example: CpG-island decoding over a DNA fragment.
//!
//! Decodes each base as background (`B`) or island (`I`), then prints the
//! sliding-window island density, the series a plotting collaborator
//! would consume.
//!
//! Run with:
//! `cargo run --example cpg`

use trellis_decode::{Decoder, DnaText, Model, SeriesPoints, StateDensity};

fn main() {
    // Islands are CG-rich; the background is AT-skewed.
    let model = Model::builder()
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
        .expect("model is well-formed");

    let fragment = DnaText::new(
        "atatccgggcgcgcgcggatatatta\
         gcgcgcggcgcgatattatatatatt\
         ccgcggcgcgcgcggcgtatatatat",
    );

    let result = Decoder::log_space()
        .decode_source(&model, &fragment)
        .expect("model is decodable");

    let island = model.state_index("I").expect("state I exists");
    println!("decoded: {}", result.path_names(&model).join(""));

    let density = StateDensity::over_path(result.path(), island, 10);
    println!("island density (window 10): {}", density.csv());
    for (pos, frac) in density.points().into_iter().filter(|(_, f)| *f >= 0.8) {
        println!("island candidate at base {pos} (density {frac:.2})");
    }
}
