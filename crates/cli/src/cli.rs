use std::path::PathBuf;

use clap::{Parser, Subcommand};
use vianeo_core::char_limits::DocumentType;
use vianeo_core::scoring::ThresholdLevel;

#[derive(Parser, Debug)]
#[command(
    name = "vianeo-validate",
    version,
    about = "Validate VIANEO step records (JSON)"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Output machine-readable JSON")]
    pub json: bool,
    #[arg(long, global = true, help = "Include passing (info) results")]
    pub verbose: bool,
    #[arg(
        long,
        global = true,
        help = "Engine configuration override (JSON); defaults to $VIANEO_CONFIG"
    )]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check the data-flow rules between two step records.
    Flow {
        source: PathBuf,
        target: PathBuf,
        #[arg(long)]
        source_step: String,
        #[arg(long)]
        target_step: String,
    },
    /// Check every configured step pair over a `{step_id: record}` document.
    Project { steps: PathBuf },
    /// Check dimension scores against a threshold.
    Scores {
        record: PathBuf,
        #[arg(long, value_parser = ThresholdLevel::from_str_value)]
        threshold: Option<ThresholdLevel>,
    },
    /// Check an evidence log and per-section coverage.
    Evidence { record: PathBuf },
    /// Check character limits for a document record.
    Limits {
        record: PathBuf,
        #[arg(long = "type", value_parser = DocumentType::from_str_value)]
        doc_type: Option<DocumentType>,
    },
    /// Check that a step's upstream prerequisites are available.
    Deps {
        step: String,
        #[arg(long, value_delimiter = ',')]
        available: Vec<String>,
    },
}
