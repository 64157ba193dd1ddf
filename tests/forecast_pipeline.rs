use std::fs;
use std::path::{Path, PathBuf};

use approx::assert_relative_eq;
use tempfile::TempDir;

use pe_forecast::app::pipeline::run_forecast;
use pe_forecast::app::{PePredictor, predict_pe};
use pe_forecast::domain::{ColumnNames, ForecastConfig, SvrParams};
use pe_forecast::error::{AppError, ForecastError};
use pe_forecast::io::{read_forecast_json, write_forecast_csv};

const HISTORY: &str = "period,pe\n\
2022 Q1,10\n\
2022 Q2,11\n\
2022 Q3,12\n\
2022 Q4,13\n\
2023 Q1,14\n\
2023 Q2,13\n\
2023 Q3,12\n\
2023 Q4,11\n";

fn write_csv(dir: &TempDir, name: &str, body: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, body).unwrap();
    path
}

fn config(data_path: &Path, years: u32) -> ForecastConfig {
    ForecastConfig {
        data_path: data_path.to_path_buf(),
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
fn one_year_forecast_covers_the_next_four_quarters() {
    let dir = TempDir::new().unwrap();
    let path = write_csv(&dir, "history.csv", HISTORY);

    let mut predictor = PePredictor::default();
    predictor.load_data(&path).unwrap();
    predictor.prepare_data().unwrap();
    predictor.train_model().unwrap();
    let result = predictor.predict_future_pe(1).unwrap();

    let labels: Vec<&str> = result.predictions.iter().map(|p| p.period.as_str()).collect();
    assert_eq!(labels, ["2024 Q1", "2024 Q2", "2024 Q3", "2024 Q4"]);
    assert!(result.predictions.iter().all(|p| p.predicted_pe.is_finite()));
    assert_eq!(result.years_predicted, 1);

    let mean = result.predictions.iter().map(|p| p.predicted_pe).sum::<f64>() / 4.0;
    assert_relative_eq!(result.average_pe, mean, epsilon = 1e-12);
}

#[test]
fn one_call_helper_matches_the_staged_predictor() {
    let dir = TempDir::new().unwrap();
    let path = write_csv(&dir, "history.csv", HISTORY);

    let mut predictor = PePredictor::default();
    predictor.load_data(&path).unwrap();
    predictor.prepare_data().unwrap();
    predictor.train_model().unwrap();
    let staged = predictor.predict_future_pe(3).unwrap();

    let average = predict_pe(&path, 3, SvrParams::default()).unwrap();
    assert_eq!(average, staged.average_pe);
    assert_eq!(staged.predictions.len(), 12);
}

#[test]
fn unsorted_input_gives_the_same_forecast() {
    let dir = TempDir::new().unwrap();
    let sorted = write_csv(&dir, "sorted.csv", HISTORY);
    let shuffled = write_csv(
        &dir,
        "shuffled.csv",
        "period,pe\n2023 Q2,13\n2022 Q1,10\n2023 Q4,11\n2022 Q3,12\n\
         2022 Q2,11\n2023 Q1,14\n2022 Q4,13\n2023 Q3,12\n",
    );

    let a = predict_pe(&sorted, 2, SvrParams::default()).unwrap();
    let b = predict_pe(&shuffled, 2, SvrParams::default()).unwrap();
    assert_eq!(a, b);
}

#[test]
fn pipeline_writes_csv_and_json_exports() {
    let dir = TempDir::new().unwrap();
    let path = write_csv(&dir, "history.csv", HISTORY);

    let run = run_forecast(&config(&path, 2)).unwrap();
    assert_eq!(run.forecast.predictions.len(), 8);
    assert_eq!(run.in_sample.fitted.len(), 8);
    assert!(run.in_sample.rmse.is_finite());

    let csv_path = dir.path().join("forecast.csv");
    write_forecast_csv(&csv_path, &run.forecast).unwrap();
    let text = fs::read_to_string(&csv_path).unwrap();
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("period,time,predicted_pe"));
    assert!(lines.next().is_some_and(|l| l.starts_with("2024 Q1,2024")));
    assert_eq!(text.lines().count(), 9);

    let json_path = dir.path().join("forecast.json");
    let file = pe_forecast::io::forecast_file(&run.dataset, &SvrParams::default(), &run.forecast);
    pe_forecast::io::write_forecast_json(&json_path, &file).unwrap();
    let back = read_forecast_json(&json_path).unwrap();
    assert_eq!(back.last_observed, "2023 Q4");
    assert_eq!(back.tool, "pe");
    assert_eq!(back.params.kernel, SvrParams::default().kernel);
    assert_eq!(back.forecast.predictions.len(), run.forecast.predictions.len());
    assert_eq!(back.forecast.predictions[7].period, "2025 Q4");
    assert_relative_eq!(back.forecast.average_pe, run.forecast.average_pe, epsilon = 1e-9);
}

#[test]
fn missing_pe_column_is_a_schema_error_with_input_exit_code() {
    let dir = TempDir::new().unwrap();
    let path = write_csv(&dir, "bad.csv", "period,price\n2024 Q1,10\n");

    let err = run_forecast(&config(&path, 1)).unwrap_err();
    assert!(matches!(&err, ForecastError::Schema { missing } if missing == &["pe".to_string()]));
    assert_eq!(AppError::from(err).exit_code(), 2);
}

#[test]
fn bad_period_reports_its_line() {
    let dir = TempDir::new().unwrap();
    let path = write_csv(&dir, "bad.csv", "period,pe\n2024 Q1,10\n2024-Q2,11\n");

    let err = run_forecast(&config(&path, 1)).unwrap_err();
    assert!(matches!(err, ForecastError::Parse { line: Some(3), .. }), "got {err:?}");
}

#[test]
fn header_only_file_is_an_empty_dataset() {
    let dir = TempDir::new().unwrap();
    let path = write_csv(&dir, "empty.csv", "period,pe\n");

    let err = predict_pe(&path, 1, SvrParams::default()).unwrap_err();
    assert!(matches!(err, ForecastError::EmptyDataset { .. }));
    assert_eq!(AppError::from(err).exit_code(), 3);
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = TempDir::new().unwrap();
    let err = predict_pe(&dir.path().join("nope.csv"), 1, SvrParams::default()).unwrap_err();
    assert!(matches!(err, ForecastError::Io(_)));
}
