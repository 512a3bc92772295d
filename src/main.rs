mod cli;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command, ConvertArgs};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;

use strudelscribe::audio::wav;
use strudelscribe::config::{self, AppConfig};
use strudelscribe::paths;
use strudelscribe::{AnalysisInput, AnalysisOptions, AnalysisPipeline, Transcription};

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Convert(args) => convert(args),
        Command::Paths => {
            println!("Config: {}", paths::config_file().display());
            Ok(())
        }
    }
}

fn load_app_config(explicit: Option<&Path>) -> Result<AppConfig> {
    match explicit {
        Some(path) => config::load_config_from(path),
        None => config::load_config(),
    }
}

/// Decode, analyse and (unless printing) write one file.
/// Returns the transcription and where it was written.
fn process_file(
    path: &Path,
    pipeline: &AnalysisPipeline,
    options: &AnalysisOptions,
    out_dir: Option<&Path>,
) -> Result<(Transcription, Option<PathBuf>)> {
    let audio = wav::load_wav(path)?;
    let transcription = pipeline
        .run(AnalysisInput::Audio(audio), options)
        .with_context(|| format!("Failed to analyse {}", path.display()))?;

    let written = match out_dir {
        Some(dir) => {
            let target = paths::pattern_path(dir, path);
            std::fs::write(&target, &transcription.pattern.combined)
                .with_context(|| format!("Failed to write {}", target.display()))?;
            Some(target)
        }
        None => None,
    };

    Ok((transcription, written))
}

fn convert(args: ConvertArgs) -> Result<()> {
    let app_config = load_app_config(args.config.as_deref())?;
    let pipeline = AnalysisPipeline::from_config(&app_config)?;

    let options = AnalysisOptions {
        tempo: args.tempo,
        key: args.key,
        time_signature: match args.time_signature {
            Some(ts) => ts,
            None => app_config.time_signature()?,
        },
        sensitivity: args.sensitivity,
    };

    let out_dir = if args.stdout {
        None
    } else {
        std::fs::create_dir_all(&args.output_dir).with_context(|| {
            format!("Failed to create output directory: {}", args.output_dir.display())
        })?;
        Some(args.output_dir.as_path())
    };

    let total = args.inputs.len();
    let bar = ProgressBar::new(total as u64);
    bar.set_style(ProgressStyle::with_template("{spinner} [{bar:30}] {pos}/{len} {wide_msg}")?);

    // Each file is independent; a failure only affects its own entry.
    let outcomes: Vec<(&PathBuf, Result<(Transcription, Option<PathBuf>)>)> = args
        .inputs
        .par_iter()
        .map(|path| {
            let outcome = process_file(path, &pipeline, &options, out_dir);
            bar.set_message(path.display().to_string());
            bar.inc(1);
            (path, outcome)
        })
        .collect();
    bar.finish_and_clear();

    let mut failures = 0;
    for (path, outcome) in outcomes {
        match outcome {
            Ok((t, written)) => {
                let r = &t.result;
                println!(
                    "  {} {}  {} notes, {} chords, key {}, {} BPM",
                    style("OK").green(),
                    style(path.display()).cyan(),
                    r.notes.len(),
                    r.chords.len(),
                    r.detected_key,
                    r.estimated_tempo,
                );
                match written {
                    Some(target) => println!("     → {}", target.display()),
                    None => println!("\n{}", t.pattern.combined),
                }
            }
            Err(err) => {
                failures += 1;
                println!("  {} {}: {err:#}", style("FAIL").red(), path.display());
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{failures} of {total} files failed");
    }
    Ok(())
}
