use super::commands::{CalcCommand, CheckCommand, StateCommand, ValidateCommand};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "form-rules")]
#[command(about = "Evaluate conditional logic, formulas and validation rules for form metadata")]
pub struct Cli {
    /// Directory holding `<form>.json` or `<form>.toml` metadata files
    #[arg(long, global = true)]
    pub metadata_dir: Option<PathBuf>,

    /// Config file to use instead of the one in the user config directory
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compute field states, visible fields and calculated values
    State(StateCommand),
    /// Evaluate a single formula against form data
    Calc(CalcCommand),
    /// Validate form data against a form's rules
    Validate(ValidateCommand),
    /// Lint a form's metadata for broken rules
    Check(CheckCommand),
}
