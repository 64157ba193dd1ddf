//! Shared forecast pipeline used by the CLI commands.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! CSV load -> standardize -> SVR fit -> forecast -> in-sample diagnostics
//!
//! The commands then focus on presentation (full report vs a single number).

use crate::domain::{Dataset, ForecastConfig, ForecastResult};
use crate::error::Result;
use crate::fit::{fit_svr, prepare};
use crate::forecast::{InSampleFit, forecast, in_sample_fit};
use crate::io::ingest::load_dataset;
use crate::math::ScalingState;
use crate::models::TrainedModel;

/// All computed outputs of a single forecast run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub dataset: Dataset,
    pub scaling: ScalingState,
    pub model: TrainedModel,
    pub in_sample: InSampleFit,
    pub forecast: ForecastResult,
}

/// Execute the full pipeline and return the computed outputs.
pub fn run_forecast(config: &ForecastConfig) -> Result<RunOutput> {
    // 1) Load and sort observations.
    let dataset = load_dataset(&config.data_path, &config.columns)?;
    run_forecast_with_dataset(config, dataset)
}

/// Execute the pipeline on an already loaded dataset.
pub fn run_forecast_with_dataset(config: &ForecastConfig, dataset: Dataset) -> Result<RunOutput> {
    // 2) Standardize time and PE.
    let (scaling, training) = prepare(&dataset)?;

    // 3) Fit the regressor.
    let model = fit_svr(&training, &config.svr)?;

    // 4) Forecast and compute in-sample diagnostics with the same scalers.
    let forecast = forecast(&model, &scaling, dataset.last().period, config.years)?;
    let in_sample = in_sample_fit(&model, &scaling, &dataset)?;

    Ok(RunOutput {
        dataset,
        scaling,
        model,
        in_sample,
        forecast,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ColumnNames, SvrParams};
    use crate::io::ingest::load_dataset_from_reader;

    fn config(years: u32) -> ForecastConfig {
        ForecastConfig {
            data_path: "unused.csv".into(),
            columns: ColumnNames::default(),
            years,
            svr: SvrParams::default(),
            plot: false,
            plot_width: 60,
            plot_height: 15,
            export_csv: None,
            export_json: None,
        }
    }

    #[test]
    fn pipeline_outputs_are_consistent() {
        let csv = "period,pe\n2021 Q1,9\n2021 Q2,9.5\n2021 Q3,10.4\n2021 Q4,11\n2022 Q1,10.2\n";
        let ds = load_dataset_from_reader(csv.as_bytes(), "inline", &ColumnNames::default()).unwrap();

        let run = run_forecast_with_dataset(&config(2), ds).unwrap();
        assert_eq!(run.forecast.predictions.len(), 8);
        assert_eq!(run.forecast.predictions[0].period, "2022 Q2");
        assert_eq!(run.in_sample.fitted.len(), 5);
        assert_eq!(run.model.scaling_id(), run.scaling.id());
    }
}
