//! Forecasting: future quarters, in-sample fitted values, and their summaries.

use log::{debug, info};

use crate::domain::{Dataset, ForecastResult, Period, PeriodPrediction};
use crate::error::{ForecastError, Result};
use crate::math::ScalingState;
use crate::models::TrainedModel;

pub const QUARTERS_PER_YEAR: u32 = 4;

/// Longest accepted horizon, in years.
pub const MAX_YEARS: u32 = 100;

/// In-sample fit quality in unscaled PE units.
#[derive(Debug, Clone, PartialEq)]
pub struct InSampleFit {
    pub fitted: Vec<f64>,
    pub rmse: f64,
}

/// Forecast `years * 4` quarters after `last_observed`.
///
/// Future time coordinates are `last_time + i / 4` for `i = 1..=horizon`,
/// standardized with `scaling` (never re-fit), predicted, and mapped back to PE
/// units. The result carries the unweighted mean of all predictions.
pub fn forecast(
    model: &TrainedModel,
    scaling: &ScalingState,
    last_observed: Period,
    years: u32,
) -> Result<ForecastResult> {
    if years > MAX_YEARS {
        return Err(ForecastError::InvalidHorizon(years));
    }
    let horizon = years
        .checked_mul(QUARTERS_PER_YEAR)
        .filter(|&h| h > 0)
        .ok_or(ForecastError::InvalidHorizon(years))?;
    ensure_same_scaling(model, scaling)?;

    let last_time = last_observed.time();
    debug!("forecasting {horizon} quarters after {last_observed}");

    let mut predictions = Vec::with_capacity(horizon as usize);
    for step in 1..=horizon {
        let time = last_time + step as f64 / QUARTERS_PER_YEAR as f64;
        let period = Period::from_time(time);

        let predicted_pe = predict_pe_at(model, scaling, time)?;
        if !predicted_pe.is_finite() {
            return Err(ForecastError::NonFinitePrediction {
                period: period.to_string(),
            });
        }

        predictions.push(PeriodPrediction {
            period: period.to_string(),
            time,
            predicted_pe,
        });
    }

    let average_pe = mean(predictions.iter().map(|p| p.predicted_pe));
    info!("forecast {years}y after {last_observed}: average PE {average_pe:.4}");

    Ok(ForecastResult {
        predictions,
        average_pe,
        years_predicted: years,
    })
}

/// Fitted PE for every training observation, plus the RMSE against the observed values.
pub fn in_sample_fit(model: &TrainedModel, scaling: &ScalingState, dataset: &Dataset) -> Result<InSampleFit> {
    ensure_same_scaling(model, scaling)?;

    let mut fitted = Vec::with_capacity(dataset.len());
    let mut sse = 0.0;
    for o in dataset.observations() {
        let y = predict_pe_at(model, scaling, o.time)?;
        sse += (o.pe - y).powi(2);
        fitted.push(y);
    }

    Ok(InSampleFit {
        fitted,
        rmse: (sse / dataset.len() as f64).sqrt(),
    })
}

fn predict_pe_at(model: &TrainedModel, scaling: &ScalingState, time: f64) -> Result<f64> {
    let x = scaling.time().transform(time)?;
    scaling.pe().inverse_transform(model.predict_scaled(x))
}

fn ensure_same_scaling(model: &TrainedModel, scaling: &ScalingState) -> Result<()> {
    if model.scaling_id() != scaling.id() {
        return Err(ForecastError::ScalingMismatch {
            model: model.scaling_id(),
            given: scaling.id(),
        });
    }
    Ok(())
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 { f64::NAN } else { sum / n as f64 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Observation, SvrParams};
    use crate::fit::{fit_svr, prepare};

    fn dataset(start: Period, pes: &[f64]) -> Dataset {
        let obs = pes
            .iter()
            .enumerate()
            .map(|(i, &pe)| Observation::new(start.add_quarters(i as i64), pe))
            .collect();
        Dataset::new("mem", obs).unwrap()
    }

    fn trained(ds: &Dataset) -> (ScalingState, TrainedModel) {
        let (scaling, training) = prepare(ds).unwrap();
        let model = fit_svr(&training, &SvrParams::default()).unwrap();
        (scaling, model)
    }

    #[test]
    fn horizon_is_four_quarters_per_year() {
        let ds = dataset(Period::new(2022, 1).unwrap(), &[10.0, 11.0, 12.0, 13.0, 14.0, 13.0]);
        let (scaling, model) = trained(&ds);
        for years in 1..=5 {
            let r = forecast(&model, &scaling, ds.last().period, years).unwrap();
            assert_eq!(r.predictions.len(), 4 * years as usize);
            assert_eq!(r.years_predicted, years);
        }
    }

    #[test]
    fn average_is_the_plain_mean_of_predictions() {
        let ds = dataset(Period::new(2021, 3).unwrap(), &[8.0, 9.5, 11.0, 10.0, 12.5, 13.0, 12.0]);
        let (scaling, model) = trained(&ds);
        let r = forecast(&model, &scaling, ds.last().period, 3).unwrap();

        let expected: f64 = r.predictions.iter().map(|p| p.predicted_pe).sum::<f64>() / 12.0;
        assert!((r.average_pe - expected).abs() < 1e-12);
    }

    #[test]
    fn labels_follow_the_last_observed_quarter() {
        let ds = dataset(Period::new(2022, 2).unwrap(), &[10.0, 11.0, 12.0, 13.0]);
        assert_eq!(ds.last().period.to_string(), "2023 Q1");
        let (scaling, model) = trained(&ds);

        let r = forecast(&model, &scaling, ds.last().period, 2).unwrap();
        let labels: Vec<&str> = r.predictions.iter().map(|p| p.period.as_str()).collect();
        assert_eq!(
            labels,
            ["2023 Q2", "2023 Q3", "2023 Q4", "2024 Q1", "2024 Q2", "2024 Q3", "2024 Q4", "2025 Q1"]
        );
        assert_eq!(r.predictions[0].time, 2023.25);
        assert_eq!(r.predictions[7].time, 2025.0);
    }

    #[test]
    fn zero_years_is_rejected() {
        let ds = dataset(Period::new(2022, 1).unwrap(), &[10.0, 11.0, 12.0]);
        let (scaling, model) = trained(&ds);
        assert!(matches!(
            forecast(&model, &scaling, ds.last().period, 0),
            Err(ForecastError::InvalidHorizon(0))
        ));
    }

    #[test]
    fn horizon_beyond_the_cap_is_rejected() {
        let ds = dataset(Period::new(2022, 1).unwrap(), &[10.0, 11.0, 12.0]);
        let (scaling, model) = trained(&ds);
        let last = ds.last().period;

        for years in [MAX_YEARS + 1, 1 << 30, u32::MAX] {
            assert!(matches!(
                forecast(&model, &scaling, last, years),
                Err(ForecastError::InvalidHorizon(y)) if y == years
            ));
        }
        let r = forecast(&model, &scaling, last, MAX_YEARS).unwrap();
        assert_eq!(r.predictions.len(), 4 * MAX_YEARS as usize);
    }

    #[test]
    fn foreign_scaling_state_is_rejected() {
        let ds = dataset(Period::new(2022, 1).unwrap(), &[10.0, 11.0, 12.0, 11.0]);
        let (_, model) = trained(&ds);
        let (other_scaling, _) = prepare(&ds).unwrap();

        let err = forecast(&model, &other_scaling, ds.last().period, 1).unwrap_err();
        assert!(matches!(err, ForecastError::ScalingMismatch { .. }));
    }

    #[test]
    fn in_sample_fit_covers_every_observation() {
        let ds = dataset(Period::new(2022, 1).unwrap(), &[10.0, 11.0, 12.0, 13.0, 14.0, 13.0, 12.0, 11.0]);
        let (scaling, model) = trained(&ds);
        let fit = in_sample_fit(&model, &scaling, &ds).unwrap();
        assert_eq!(fit.fitted.len(), 8);
        assert!(fit.rmse.is_finite());
        assert!(fit.rmse < 2.0);
    }

    #[test]
    fn constant_history_forecasts_the_constant() {
        let ds = dataset(Period::new(2020, 1).unwrap(), &[15.0; 6]);
        let (scaling, model) = trained(&ds);
        let r = forecast(&model, &scaling, ds.last().period, 1).unwrap();
        for p in &r.predictions {
            assert!((p.predicted_pe - 15.0).abs() < 1e-9, "{p:?}");
        }
    }
}
