//! Command-line parsing for the PE forecaster.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! fitting/forecasting code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{Gamma, KernelKind};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "pe", version, about = "Quarterly PE forecaster (support vector regression)")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fit on the history, print the per-quarter forecast and the averaged PE.
    Forecast(ForecastArgs),
    /// Print only the averaged PE over the horizon (useful for scripting).
    Mean(ModelArgs),
}

/// Data and model options shared by every command.
#[derive(Debug, Args, Clone)]
pub struct ModelArgs {
    /// CSV file with the quarterly history.
    #[arg(short = 'd', long, env = "PE_DATA", value_name = "CSV")]
    pub data: PathBuf,

    /// Forecast horizon in years (4 quarters per year).
    #[arg(short = 'y', long, env = "PE_YEARS", default_value_t = 3,
          value_parser = clap::value_parser!(u32).range(1..=crate::forecast::MAX_YEARS as i64))]
    pub years: u32,

    /// Name of the period column (`YYYY Qn` labels).
    #[arg(long, default_value = "period")]
    pub period_column: String,

    /// Name of the PE column.
    #[arg(long, default_value = "pe")]
    pub pe_column: String,

    /// Kernel family.
    #[arg(long, value_enum, default_value_t = KernelKind::Rbf)]
    pub kernel: KernelKind,

    /// Regularization strength.
    #[arg(short = 'c', long = "c", default_value_t = 1.0)]
    pub c: f64,

    /// Kernel coefficient: `scale`, `auto`, or a positive number.
    #[arg(long, default_value = "scale")]
    pub gamma: Gamma,

    /// Width of the epsilon-insensitive tube (standardized PE units).
    #[arg(long, default_value_t = 0.1)]
    pub epsilon: f64,

    /// Polynomial degree (poly kernel only).
    #[arg(long, default_value_t = 3)]
    pub degree: u32,

    /// Independent term (poly kernel only).
    #[arg(long, default_value_t = 0.0)]
    pub coef0: f64,
}

/// Options for the full forecast report.
#[derive(Debug, Args, Clone)]
pub struct ForecastArgs {
    #[command(flatten)]
    pub model: ModelArgs,

    /// Render an ASCII plot of history and forecast.
    #[arg(long)]
    pub plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 72)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 18)]
    pub height: usize,

    /// Export the per-quarter forecast to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Export the forecast with run metadata to JSON.
    #[arg(long = "export-json")]
    pub export_json: Option<PathBuf>,
}
