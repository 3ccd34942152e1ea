//! Developer utility to densify a color's samples and train a classifier.

use std::path::{Path, PathBuf};

use huematch::config::{self, AppConfig, ConfigError};
use huematch::densify::{Prepared, Sample, Triangle, prepare_training_set};
use huematch::logging;
use huematch::trainer::{CancelToken, ModelTrainer, ProcessTrainer, TrainedModel};

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let options = parse_args(std::env::args().skip(1).collect())?;
    let (mut app_config, config_fallback) = load_config(options.config.as_deref())?;
    options.apply_overrides(&mut app_config);
    match logging::init(&app_config.logging, options.verbose) {
        Ok(Some(path)) => println!("Logging to {}", path.display()),
        Ok(None) => {}
        Err(err) => eprintln!("Logging disabled: {err}"),
    }
    if let Some(err) = config_fallback {
        tracing::warn!("Using default settings: {err}");
    }

    let samples = load_samples(&options.samples)?;
    println!("Loaded {} samples from {}", samples.len(), options.samples.display());

    let prepared = prepare_training_set(&samples, &app_config.densify, options.triangle.as_ref())
        .map_err(|err| err.to_string())?;
    let set = match prepared {
        Prepared::Ready(set) => set,
        Prepared::Skipped(reason) => {
            println!("Skipped: {reason}");
            return Ok(());
        }
    };
    println!(
        "Training set: {} real + {} filler points",
        set.real().len(),
        set.fillers().len()
    );

    if let Some(dump) = &options.dump {
        let json = serde_json::to_string(&set).map_err(|err| err.to_string())?;
        std::fs::write(dump, json)
            .map_err(|err| format!("Failed to write {}: {err}", dump.display()))?;
        println!("Wrote training set to {}", dump.display());
        return Ok(());
    }

    let trainer = ProcessTrainer::from_settings(&app_config.trainer);
    let model = trainer
        .train(&set, &CancelToken::new())
        .map_err(|err| err.to_string())?;
    save_model(&options.model_out, model)?;
    println!("Wrote model to {}", options.model_out.display());
    Ok(())
}

#[derive(Debug, Clone, PartialEq)]
struct CliOptions {
    samples: PathBuf,
    model_out: PathBuf,
    dump: Option<PathBuf>,
    config: Option<PathBuf>,
    triangle: Option<Triangle>,
    filler_value: Option<f64>,
    chromaticity_buckets: Option<usize>,
    intensity_buckets: Option<usize>,
    fill_interior: bool,
    verbose: bool,
}

impl CliOptions {
    fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(value) = self.filler_value {
            config.densify.filler_value = value;
        }
        if let Some(value) = self.chromaticity_buckets {
            config.densify.chromaticity_buckets = value;
        }
        if let Some(value) = self.intensity_buckets {
            config.densify.intensity_buckets = value;
        }
        if self.fill_interior {
            config.densify.fill_interior = true;
        }
    }
}

fn parse_args(args: Vec<String>) -> Result<CliOptions, String> {
    let mut samples: Option<PathBuf> = None;
    let mut model_out = PathBuf::from("model.json");
    let mut dump = None;
    let mut config = None;
    let mut triangle = None;
    let mut filler_value = None;
    let mut chromaticity_buckets = None;
    let mut intensity_buckets = None;
    let mut fill_interior = false;
    let mut verbose = false;

    let mut idx = 0usize;
    while idx < args.len() {
        let flag = args[idx].as_str();
        let mut value = || {
            idx += 1;
            args.get(idx)
                .cloned()
                .ok_or_else(|| format!("{flag} requires a value"))
        };
        match flag {
            "-h" | "--help" => return Err(help_text()),
            "--samples" => samples = Some(PathBuf::from(value()?)),
            "--model-out" => model_out = PathBuf::from(value()?),
            "--dump" => dump = Some(PathBuf::from(value()?)),
            "--config" => config = Some(PathBuf::from(value()?)),
            "--triangle" => {
                let text = value()?;
                let parsed = text
                    .parse::<Triangle>()
                    .map_err(|err| format!("Invalid --triangle value {text:?}: {err}"))?;
                triangle = Some(parsed);
            }
            "--filler-value" => {
                let text = value()?;
                let parsed = text
                    .parse::<f64>()
                    .ok()
                    .filter(|value| value.is_finite())
                    .ok_or_else(|| format!("Invalid --filler-value value: {text}"))?;
                filler_value = Some(parsed);
            }
            "--chromaticity-buckets" => {
                let text = value()?;
                chromaticity_buckets = Some(parse_buckets(flag, &text)?);
            }
            "--intensity-buckets" => {
                let text = value()?;
                intensity_buckets = Some(parse_buckets(flag, &text)?);
            }
            "--fill-interior" => fill_interior = true,
            "-v" | "--verbose" => verbose = true,
            unknown => return Err(format!("Unknown argument: {unknown}\n\n{}", help_text())),
        }
        idx += 1;
    }

    let samples = samples.ok_or_else(help_text)?;
    Ok(CliOptions {
        samples,
        model_out,
        dump,
        config,
        triangle,
        filler_value,
        chromaticity_buckets,
        intensity_buckets,
        fill_interior,
        verbose,
    })
}

fn parse_buckets(flag: &str, text: &str) -> Result<usize, String> {
    match text.parse::<usize>() {
        Ok(value) if (1..=config::MAX_BUCKETS).contains(&value) => Ok(value),
        _ => Err(format!(
            "Invalid {flag} value: {text} (expected 1..={})",
            config::MAX_BUCKETS
        )),
    }
}

fn help_text() -> String {
    [
        "huematch-train",
        "",
        "Densifies a color's labeled samples and trains a classifier with the configured trainer.",
        "",
        "Usage:",
        "  huematch-train --samples <samples.json> [--model-out model.json]",
        "",
        "Options:",
        "  --samples <file>            JSON array of [x, y, z, label] samples (required).",
        "  --model-out <file>          Where to write the trained model (default model.json).",
        "  --dump <file>               Write the assembled training set instead of training.",
        "  --config <file>             Settings file (default: config.toml in the app directory).",
        "  --triangle x0,y0,x1,y1,x2,y2  Only synthesize fillers inside this chromaticity triangle.",
        "  --filler-value <f>          Label for synthesized samples (default 0).",
        "  --chromaticity-buckets <n>  Grid resolution along x and y (default 6).",
        "  --intensity-buckets <n>     Grid resolution along z (default 6).",
        "  --fill-interior             Allow fillers in a labeled sample's own cell.",
        "  -v, --verbose               Log at debug level, overriding [logging] filter.",
    ]
    .join("\n")
}

/// An explicit `--config` must load; the default location falls back to
/// defaults and hands the error back for logging once tracing is up.
fn load_config(path: Option<&Path>) -> Result<(AppConfig, Option<ConfigError>), String> {
    match path {
        Some(path) => config::load_from(path)
            .map(|loaded| (loaded, None))
            .map_err(|err| err.to_string()),
        None => Ok(match config::load_or_default() {
            Ok(loaded) => (loaded, None),
            Err(err) => (AppConfig::default(), Some(err)),
        }),
    }
}

fn load_samples(path: &Path) -> Result<Vec<Sample>, String> {
    let text = std::fs::read_to_string(path)
        .map_err(|err| format!("Failed to read {}: {err}", path.display()))?;
    serde_json::from_str(&text).map_err(|err| format!("Invalid samples in {}: {err}", path.display()))
}

fn save_model(path: &Path, model: TrainedModel) -> Result<(), String> {
    let json = serde_json::to_string_pretty(&model.into_value()).map_err(|err| err.to_string())?;
    std::fs::write(path, json).map_err(|err| err.to_string())
}
