use trellis_decode::{Decoder, Model, NumericMode};

fn weather_model() -> Model {
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

fn casino_model() -> Model {
    Model::builder()
        .state("Fair")
        .state("Loaded")
        .start("Fair", 0.5)
        .start("Loaded", 0.5)
        .transition("Fair", "Fair", 0.95)
        .transition("Fair", "Loaded", 0.05)
        .transition("Loaded", "Fair", 0.10)
        .transition("Loaded", "Loaded", 0.90)
        .emission("Fair", "1", 1.0 / 6.0)
        .emission("Fair", "2", 1.0 / 6.0)
        .emission("Fair", "3", 1.0 / 6.0)
        .emission("Fair", "4", 1.0 / 6.0)
        .emission("Fair", "5", 1.0 / 6.0)
        .emission("Fair", "6", 1.0 / 6.0)
        .emission("Loaded", "1", 0.1)
        .emission("Loaded", "2", 0.1)
        .emission("Loaded", "3", 0.1)
        .emission("Loaded", "4", 0.1)
        .emission("Loaded", "5", 0.1)
        .emission("Loaded", "6", 0.5)
        .build()
        .unwrap()
}

#[test]
fn weather_regression_values() {
    let model = weather_model();
    for decoder in [Decoder::linear(), Decoder::log_space()] {
        let r = decoder.decode(&model, &["walk", "shop", "clean"]).unwrap();
        assert!(
            (r.total_probability() - 0.033612).abs() < 1e-9,
            "total probability {} in {:?} mode",
            r.total_probability(),
            decoder.mode()
        );
        assert!((r.best_path_probability() - 0.01344).abs() < 1e-9);
        assert_eq!(r.path_names(&model), vec!["Sunny", "Rainy", "Rainy"]);
    }
}

#[test]
fn single_state_model_is_certain() {
    let model = Model::builder()
        .state("A")
        .start("A", 1.0)
        .transition("A", "A", 1.0)
        .emission("A", "x", 1.0)
        .build()
        .unwrap();
    let r = Decoder::linear().decode(&model, &["x", "x", "x"]).unwrap();
    assert_eq!(r.path_names(&model), vec!["A", "A", "A"]);
    assert_eq!(r.best_path_probability(), 1.0);
    assert_eq!(r.total_probability(), 1.0);
}

#[test]
fn total_dominates_best_path() {
    let model = weather_model();
    let obs = ["shop", "walk", "clean", "clean", "walk", "shop", "shop"];
    let r = Decoder::linear().decode(&model, &obs).unwrap();
    assert!(r.total_probability() > r.best_path_probability());
}

#[test]
fn casino_decode_flags_loaded_run() {
    let model = casino_model();
    let obs = [
        "1", "3", "4", "2", "5", "1", "6", "6", "6", "6", "6", "6", "3", "2", "1", "4",
    ];
    let r = Decoder::log_space().decode(&model, &obs).unwrap();
    assert_eq!(r.path().len(), obs.len());
    assert!(r.log_best_path_probability().is_finite());

    let loaded = model.state_index("Loaded").unwrap();
    let loaded_in_run = r.path()[6..12].iter().filter(|&&s| s == loaded).count();
    assert!(
        loaded_in_run >= 4,
        "expected the run of sixes to decode mostly Loaded, got {loaded_in_run}/6"
    );
}

#[test]
fn decode_via_observation_source() {
    use trellis_decode::DnaText;

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
        .unwrap();

    let text = DnaText::new("1 attat\n2 GCGCGCGC\n3 ttata\n");
    let r = Decoder::log_space().decode_source(&model, &text).unwrap();
    assert_eq!(r.path().len(), 18);

    // The GC-rich middle should decode as island states.
    let island = model.state_index("I").unwrap();
    let islands_mid = r.path()[5..13].iter().filter(|&&s| s == island).count();
    assert!(islands_mid >= 6, "GC run decoded {islands_mid}/8 as island");
}

#[test]
fn modes_agree_on_moderate_sequences() {
    let model = weather_model();
    let obs: Vec<&str> = ["walk", "shop", "clean"].iter().cycle().take(30).copied().collect();
    let lin = Decoder::new(NumericMode::Linear).decode(&model, &obs).unwrap();
    let log = Decoder::new(NumericMode::LogSpace).decode(&model, &obs).unwrap();
    assert_eq!(lin.path(), log.path());
    assert!(!lin.underflowed());
    let rel = (lin.log_total_probability() - log.log_total_probability()).abs();
    assert!(rel < 1e-9, "log totals diverge by {rel}");
}
