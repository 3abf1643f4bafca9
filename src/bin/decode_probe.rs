use std::env;
use std::time::Instant;

use sysinfo::{get_current_pid, ProcessRefreshKind, System};
use trellis_decode::{Decoder, Model, NumericMode};

fn main() {
    let options = match Options::parse(env::args().skip(1)) {
        Ok(opts) => opts,
        Err(err) => {
            eprintln!("decode_probe: {err}");
            Options::print_help();
            std::process::exit(2);
        }
    };

    eprintln!("\n{}", "=".repeat(72));
    eprintln!("Decode Probe: forward/Viterbi scaling and numeric-policy check");
    eprintln!("{}", "=".repeat(72));
    eprintln!();
    eprintln!("Each scenario decodes deterministic synthetic sequences of growing");
    eprintln!("length and reports wall-clock time and RSS delta. Results up to");
    eprintln!(
        "length {} are verified against a full-table reference decoder.",
        options.verify_limit
    );
    eprintln!();

    let mut sys = System::new();
    let mut measurements = Vec::new();

    eprintln!("[1/3] Log-space decoding (weather model)...");
    measurements.extend(run_weather(&options, &mut sys, NumericMode::LogSpace));
    eprintln!();

    eprintln!("[2/3] Linear-space decoding (weather model, underflow watch)...");
    measurements.extend(run_weather(&options, &mut sys, NumericMode::Linear));
    eprintln!();

    eprintln!("[3/3] Log-space decoding (CpG island model over synthetic DNA)...");
    measurements.extend(run_cpg(&options, &mut sys));
    eprintln!();

    if let Err(err) = options.format.write(&measurements) {
        eprintln!("decode_probe: {err}");
        std::process::exit(1);
    }
}

struct Options {
    format: OutputFormat,
    verify_limit: usize,
}

impl Options {
    fn parse<I, T>(mut args: I) -> Result<Self, String>
    where
        I: Iterator<Item = T>,
        T: Into<String>,
    {
        let mut format = OutputFormat::Csv;
        let mut verify_limit = 2048usize;

        while let Some(arg) = args.next() {
            let arg = arg.into();
            if arg == "--help" || arg == "-h" {
                Options::print_help();
                std::process::exit(0);
            } else if let Some(value) = arg.strip_prefix("--format=") {
                format = OutputFormat::from_str(value)?;
            } else if arg == "--format" {
                let value = args
                    .next()
                    .ok_or_else(|| "missing value after --format".to_string())?
                    .into();
                format = OutputFormat::from_str(&value)?;
            } else if let Some(value) = arg.strip_prefix("--verify-limit=") {
                verify_limit = value
                    .parse::<usize>()
                    .map_err(|_| "verify limit must be a positive integer".to_string())?;
            } else if arg == "--verify-limit" {
                let value = args
                    .next()
                    .ok_or_else(|| "missing value after --verify-limit".to_string())?
                    .into();
                verify_limit = value
                    .parse::<usize>()
                    .map_err(|_| "verify limit must be a positive integer".to_string())?;
            } else {
                return Err(format!("unrecognized argument '{arg}'"));
            }
        }

        Ok(Self {
            format,
            verify_limit,
        })
    }

    fn print_help() {
        println!(
            "\
Usage: cargo run --bin decode_probe [-- <options>]

Options:
  --format <csv|table|json>     Output format (default: csv)
  --verify-limit <N>            Maximum sequence length to verify against the
                                full-table reference decoder (default: 2048)
  -h, --help                    Print this help message
"
        );
    }
}

#[derive(Copy, Clone)]
enum OutputFormat {
    Csv,
    Table,
    Json,
}

impl OutputFormat {
    fn from_str(value: &str) -> Result<Self, String> {
        match value {
            "csv" => Ok(Self::Csv),
            "table" => Ok(Self::Table),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown format '{other}'")),
        }
    }

    fn write(self, measurements: &[Measurement]) -> Result<(), String> {
        match self {
            OutputFormat::Csv => write_csv(measurements),
            OutputFormat::Table => write_table(measurements),
            OutputFormat::Json => write_json(measurements),
        }
    }
}

#[derive(Clone)]
struct Measurement {
    scenario: &'static str,
    size_desc: String,
    wall_s: f64,
    rss_delta_kib: u64,
    status: Status,
    detail: Option<String>,
}

#[derive(Clone, Copy)]
enum Status {
    NotChecked,
    Passed,
    Failed,
}

impl Status {
    fn label(&self) -> &'static str {
        match self {
            Status::NotChecked => "not_checked",
            Status::Passed => "passed",
            Status::Failed => "failed",
        }
    }

    fn icon(&self) -> &'static str {
        match self {
            Status::Passed => "✓",
            Status::Failed => "✗",
            Status::NotChecked => "○",
        }
    }
}

const SIZES: &[usize] = &[256, 1024, 4096, 16384, 65536];

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
        .expect("weather model is well-formed")
}

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
        .expect("CpG model is well-formed")
}

/// Deterministic pseudo-observations: a fixed multiplicative walk, no RNG.
fn synthetic_obs(len: usize, alphabet: &[&str]) -> Vec<String> {
    let mut x = 0x2545f4914f6cdd1du64;
    (0..len)
        .map(|_| {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            alphabet[(x >> 33) as usize % alphabet.len()].to_owned()
        })
        .collect()
}

fn run_weather(options: &Options, sys: &mut System, mode: NumericMode) -> Vec<Measurement> {
    let scenario = match mode {
        NumericMode::LogSpace => "weather_log",
        NumericMode::Linear => "weather_linear",
    };
    let model = weather_model();
    let decoder = Decoder::new(mode);
    let total = SIZES.len();

    SIZES
        .iter()
        .enumerate()
        .map(|(idx, &len)| {
            eprint!("      [{}/{}] length {}... ", idx + 1, total, len);
            let obs = synthetic_obs(len, &["walk", "shop", "clean"]);
            let m = measure(scenario, format!("len={len}"), sys, || {
                let result = decoder.decode(&model, &obs).expect("valid model");
                verify(&model, &obs, &result, options.verify_limit)
            });
            eprintln!(
                "{} time={:.3}s, rss_delta={} KiB, status={}",
                m.status.icon(),
                m.wall_s,
                m.rss_delta_kib,
                m.status.label()
            );
            m
        })
        .collect()
}

fn run_cpg(options: &Options, sys: &mut System) -> Vec<Measurement> {
    let model = cpg_model();
    let decoder = Decoder::log_space();
    let total = SIZES.len();

    SIZES
        .iter()
        .enumerate()
        .map(|(idx, &len)| {
            eprint!("      [{}/{}] length {}... ", idx + 1, total, len);
            let obs = synthetic_obs(len, &["a", "c", "g", "t"]);
            let m = measure("cpg_log", format!("len={len}"), sys, || {
                let result = decoder.decode(&model, &obs).expect("valid model");
                verify(&model, &obs, &result, options.verify_limit)
            });
            eprintln!(
                "{} time={:.3}s, rss_delta={} KiB, status={}",
                m.status.icon(),
                m.wall_s,
                m.rss_delta_kib,
                m.status.label()
            );
            m
        })
        .collect()
}

fn verify(
    model: &Model,
    obs: &[String],
    result: &trellis_decode::Decoded,
    verify_limit: usize,
) -> (Status, Option<String>) {
    if obs.len() > verify_limit {
        return (Status::NotChecked, None);
    }
    if result.underflowed() {
        return (
            Status::NotChecked,
            Some("linear-space underflow reported".into()),
        );
    }
    let (ref_log_total, ref_log_best) = reference_decode(model, obs);
    let log_total = result.log_total_probability();
    if (log_total - ref_log_total).abs() > 1e-6 {
        return (
            Status::Failed,
            Some(format!(
                "log total {log_total} differs from reference {ref_log_total}"
            )),
        );
    }
    // The decoded path must achieve the reference optimum; on exact ties a
    // different optimal path is acceptable, so compare probabilities.
    let achieved = path_log_probability(model, result.path(), obs);
    if (achieved - ref_log_best).abs() > 1e-6 {
        return (
            Status::Failed,
            Some(format!(
                "decoded path achieves {achieved}, reference optimum {ref_log_best}"
            )),
        );
    }
    (Status::Passed, None)
}

fn log_emit(model: &Model, s: usize, o: &str) -> f64 {
    match model.symbol_index(o) {
        Some(k) => model.emission(s, k).ln(),
        None => f64::NEG_INFINITY,
    }
}

/// Log probability of one fixed path, evaluated directly from the tables.
fn path_log_probability(model: &Model, path: &[usize], obs: &[String]) -> f64 {
    let mut p = model.start(path[0]).ln() + log_emit(model, path[0], &obs[0]);
    for t in 1..path.len() {
        p += model.transition(path[t - 1], path[t]).ln() + log_emit(model, path[t], &obs[t]);
    }
    p
}

/// Classic two-table log-space reference (forward alpha, Viterbi delta).
/// Deliberately a separate implementation from the library's combined
/// single-frontier pass. Returns (log total, log best-path probability).
fn reference_decode(model: &Model, obs: &[String]) -> (f64, f64) {
    let n = model.n_states();
    let t_len = obs.len();
    if t_len == 0 {
        let total: f64 = (0..n).map(|s| model.start(s)).sum();
        let best = (0..n).map(|s| model.start(s)).fold(0.0f64, f64::max);
        return (total.ln(), best.ln());
    }

    let mut alpha = vec![f64::NEG_INFINITY; n];
    let mut delta = vec![f64::NEG_INFINITY; n];
    for s in 0..n {
        let v = model.start(s).ln() + log_emit(model, s, &obs[0]);
        alpha[s] = v;
        delta[s] = v;
    }

    for t in 1..t_len {
        let mut next_alpha = vec![f64::NEG_INFINITY; n];
        let mut next_delta = vec![f64::NEG_INFINITY; n];
        for d in 0..n {
            let e = log_emit(model, d, &obs[t]);
            let mut acc = f64::NEG_INFINITY;
            let mut best = f64::NEG_INFINITY;
            for s in 0..n {
                let a = model.transition(s, d).ln();
                acc = log_add(acc, alpha[s] + a);
                best = best.max(delta[s] + a);
            }
            next_alpha[d] = acc + e;
            next_delta[d] = best + e;
        }
        alpha = next_alpha;
        delta = next_delta;
    }

    let mut log_total = f64::NEG_INFINITY;
    for &a in &alpha {
        log_total = log_add(log_total, a);
    }
    let log_best = delta.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    (log_total, log_best)
}

fn log_add(a: f64, b: f64) -> f64 {
    if a == f64::NEG_INFINITY {
        return b;
    }
    if b == f64::NEG_INFINITY {
        return a;
    }
    let max = a.max(b);
    max + ((a - max).exp() + (b - max).exp()).ln()
}

fn rss_kib(sys: &mut System) -> u64 {
    sys.refresh_processes_specifics(ProcessRefreshKind::new());
    match get_current_pid() {
        Ok(pid) => sys.process(pid).map(|p| p.memory() / 1024).unwrap_or(0),
        Err(_) => 0,
    }
}

fn measure<F>(
    scenario: &'static str,
    size_desc: String,
    sys: &mut System,
    compute: F,
) -> Measurement
where
    F: FnOnce() -> (Status, Option<String>),
{
    let before = rss_kib(sys);
    let start = Instant::now();
    let (status, detail) = compute();
    let duration = start.elapsed();
    let after = rss_kib(sys);

    Measurement {
        scenario,
        size_desc,
        wall_s: duration.as_secs_f64(),
        rss_delta_kib: after.saturating_sub(before),
        status,
        detail,
    }
}

fn write_csv(measurements: &[Measurement]) -> Result<(), String> {
    println!("scenario,size_desc,wall_s,rss_delta_kib,status,detail");
    for m in measurements {
        let detail = m
            .detail
            .as_ref()
            .map(|s| s.replace('"', "'"))
            .unwrap_or_default();
        println!(
            "{},{},{:.3},{},{},\"{}\"",
            m.scenario,
            m.size_desc,
            m.wall_s,
            m.rss_delta_kib,
            m.status.label(),
            detail
        );
    }
    Ok(())
}

fn write_table(measurements: &[Measurement]) -> Result<(), String> {
    let mut col1 = "scenario".len();
    let mut col2 = "size".len();
    for m in measurements {
        col1 = col1.max(m.scenario.len());
        col2 = col2.max(m.size_desc.len());
    }

    println!(
        "{:<col1$}  {:<col2$}  {:>10}  {:>14}  {:>11}",
        "scenario", "size", "wall_s", "rss_delta_kib", "status"
    );
    for m in measurements {
        println!(
            "{:<col1$}  {:<col2$}  {:>10.3}  {:>14}  {:>11}",
            m.scenario,
            m.size_desc,
            m.wall_s,
            m.rss_delta_kib,
            m.status.label()
        );
    }
    Ok(())
}

fn write_json(measurements: &[Measurement]) -> Result<(), String> {
    println!("[");
    for (i, m) in measurements.iter().enumerate() {
        let detail = m
            .detail
            .as_ref()
            .map(|s| format!("\"{}\"", s.replace('"', "'")))
            .unwrap_or_else(|| "null".to_string());
        let comma = if i + 1 == measurements.len() { "" } else { "," };
        println!(
            "  {{\"scenario\":\"{}\",\"size_desc\":\"{}\",\"wall_s\":{:.3},\"rss_delta_kib\":{},\"status\":\"{}\",\"detail\":{}}}{}",
            m.scenario, m.size_desc, m.wall_s, m.rss_delta_kib, m.status.label(), detail, comma
        );
    }
    println!("]");
    Ok(())
}
