use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use strudelscribe::{Key, TimeSignature};

#[derive(Parser)]
#[command(name = "strudelscribe")]
#[command(about = "Transcribe audio into Strudel live-coding patterns")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Transcribe WAV files into pattern files
    Convert(ConvertArgs),

    /// Show where the config file is read from
    Paths,
}

#[derive(Args)]
pub struct ConvertArgs {
    /// WAV files to transcribe
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Directory for the .strudel files
    #[arg(short, long, default_value = "patterns")]
    pub output_dir: PathBuf,

    /// Print patterns to stdout instead of writing files
    #[arg(long, conflicts_with = "output_dir")]
    pub stdout: bool,

    /// Use this tempo (BPM) instead of estimating one
    #[arg(long)]
    pub tempo: Option<f64>,

    /// Use this key (e.g. "C", "F#m", "Bb") instead of detecting one
    #[arg(long)]
    pub key: Option<Key>,

    /// Time signature as N/D (default from config, normally 4/4)
    #[arg(long)]
    pub time_signature: Option<TimeSignature>,

    /// Pitch tracking sensitivity, 0-100
    #[arg(long)]
    pub sensitivity: Option<f64>,

    /// Config file (default: the platform config dir)
    #[arg(long)]
    pub config: Option<PathBuf>,
}
