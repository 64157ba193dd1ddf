//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - runs the forecast pipeline
//! - prints reports/plots
//! - writes optional exports

use clap::Parser;
use log::info;

use crate::cli::{Command, ForecastArgs, ModelArgs};
use crate::domain::{ColumnNames, ForecastConfig, SvrParams};
use crate::error::{AppError, ForecastError};

pub mod pipeline;
pub mod predictor;

pub use pipeline::RunOutput;
pub use predictor::{PePredictor, predict_pe};

/// Entry point for the `pe` binary.
pub fn run() -> Result<(), AppError> {
    // Optional `.env` so PE_DATA / PE_YEARS can live next to the data.
    dotenvy::dotenv().ok();

    let cli = crate::cli::Cli::parse();

    match cli.command {
        Command::Forecast(args) => handle_forecast(args),
        Command::Mean(args) => handle_mean(args),
    }
}

fn handle_forecast(args: ForecastArgs) -> Result<(), AppError> {
    let config = forecast_config_from_args(&args);
    let run = pipeline::run_forecast(&config)?;

    println!("{}", forecast_report(&config, &run));
    write_exports(&config, &run)?;
    Ok(())
}

fn handle_mean(args: ModelArgs) -> Result<(), AppError> {
    let average = mean_from_args(&args)?;
    println!("{}", format_mean(average));
    Ok(())
}

/// Everything `pe forecast` prints: summary, forecast table, optional plot.
pub fn forecast_report(config: &ForecastConfig, run: &RunOutput) -> String {
    let mut out = crate::report::format_run_summary(&run.dataset, &config.svr, &run.model, &run.in_sample);
    out.push('\n');
    out.push_str(&crate::report::format_forecast(&run.forecast));

    if config.plot {
        out.push('\n');
        out.push_str(&crate::plot::render_forecast_plot(
            &run.dataset,
            Some(run.in_sample.fitted.as_slice()),
            &run.forecast,
            config.plot_width,
            config.plot_height,
        ));
    }
    out
}

/// Write the optional CSV / JSON exports named in `config`.
pub fn write_exports(config: &ForecastConfig, run: &RunOutput) -> Result<(), ForecastError> {
    if let Some(path) = &config.export_csv {
        crate::io::export::write_forecast_csv(path, &run.forecast)?;
        info!("wrote forecast CSV to {}", path.display());
    }
    if let Some(path) = &config.export_json {
        let file = crate::io::export::forecast_file(&run.dataset, &config.svr, &run.forecast);
        crate::io::export::write_forecast_json(path, &file)?;
        info!("wrote forecast JSON to {}", path.display());
    }
    Ok(())
}

/// Averaged PE for `pe mean`, computed through the staged predictor.
pub fn mean_from_args(args: &ModelArgs) -> Result<f64, ForecastError> {
    let mut predictor = PePredictor::with_columns(svr_params_from_args(args), columns_from_args(args));
    predictor.load_data(&args.data)?;
    predictor.prepare_data()?;
    predictor.train_model()?;
    Ok(predictor.predict_future_pe(args.years)?.average_pe)
}

pub fn format_mean(average: f64) -> String {
    format!("{average:.2}")
}

pub fn forecast_config_from_args(args: &ForecastArgs) -> ForecastConfig {
    ForecastConfig {
        data_path: args.model.data.clone(),
        columns: columns_from_args(&args.model),
        years: args.model.years,
        svr: svr_params_from_args(&args.model),
        plot: args.plot,
        plot_width: args.width,
        plot_height: args.height,
        export_csv: args.export.clone(),
        export_json: args.export_json.clone(),
    }
}

pub fn svr_params_from_args(args: &ModelArgs) -> SvrParams {
    SvrParams {
        kernel: args.kernel,
        c: args.c,
        gamma: args.gamma,
        epsilon: args.epsilon,
        degree: args.degree,
        coef0: args.coef0,
        ..SvrParams::default()
    }
}

fn columns_from_args(args: &ModelArgs) -> ColumnNames {
    ColumnNames {
        period: args.period_column.clone(),
        pe: args.pe_column.clone(),
    }
}
