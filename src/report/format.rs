//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the fitting/forecasting code stays clean and testable
//! - output changes are localized

use crate::domain::{Dataset, ForecastResult, Gamma, KernelKind, SvrParams};
use crate::forecast::InSampleFit;
use crate::models::TrainedModel;

/// Format the run summary (dataset stats + model diagnostics).
pub fn format_run_summary(dataset: &Dataset, params: &SvrParams, model: &TrainedModel, fit: &InSampleFit) -> String {
    let stats = dataset.stats();
    let mut out = String::new();

    out.push_str("=== pe - PE Forecast (SVR) ===\n");
    out.push_str(&format!("Source: {}\n", dataset.source()));
    out.push_str(&format!(
        "History: n={} | periods=[{}, {}] | pe=[{:.2}, {:.2}]\n",
        stats.n_obs, stats.first, stats.last, stats.pe_min, stats.pe_max
    ));

    out.push_str("\nModel:\n");
    out.push_str(&format!("- kernel : {}\n", fmt_kernel(params, model)));
    out.push_str(&format!("- C={} epsilon={}\n", params.c, params.epsilon));

    let d = model.diagnostics();
    out.push_str(&format!(
        "- support vectors: {}/{} | iterations: {}{}\n",
        model.n_support(),
        d.n_train,
        d.iterations,
        if d.converged { "" } else { " (not converged)" }
    ));
    out.push_str(&format!("- in-sample RMSE: {:.4}\n", fit.rmse));
    out.push('\n');

    out
}

/// Format the per-quarter forecast table and the summary line.
pub fn format_forecast(result: &ForecastResult) -> String {
    let mut out = String::new();

    out.push_str(&format!("{:<10} {:>12}", "period", "predicted_pe"));
    out.push('\n');
    out.push_str(&format!("{:-<10} {:-<12}", "", ""));
    out.push('\n');

    for p in &result.predictions {
        out.push_str(&format!("{:<10} {:>12.2}", p.period, p.predicted_pe));
        out.push('\n');
    }

    out.push('\n');
    out.push_str(&format_average(result));
    out.push('\n');
    out
}

/// One-line summary: averaged PE and the horizon used.
pub fn format_average(result: &ForecastResult) -> String {
    let unit = if result.years_predicted == 1 { "year" } else { "years" };
    format!(
        "Average PE over next {} {unit}: {:.2}",
        result.years_predicted, result.average_pe
    )
}

fn fmt_kernel(params: &SvrParams, model: &TrainedModel) -> String {
    let k = model.kernel();
    let gamma = match params.gamma {
        Gamma::Value(_) => format!("gamma={:.6}", k.gamma),
        other => format!("gamma={other} ({:.6})", k.gamma),
    };
    match k.kind {
        KernelKind::Rbf => format!("rbf, {gamma}"),
        KernelKind::Linear => "linear".to_string(),
        KernelKind::Poly => format!("poly, {gamma}, degree={}, coef0={}", k.degree, k.coef0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PeriodPrediction;

    fn result(years: u32, values: &[f64]) -> ForecastResult {
        let predictions = values
            .iter()
            .enumerate()
            .map(|(i, &v)| PeriodPrediction {
                period: format!("2024 Q{}", i + 1),
                time: 2024.0 + i as f64 / 4.0,
                predicted_pe: v,
            })
            .collect::<Vec<_>>();
        let average_pe = values.iter().sum::<f64>() / values.len() as f64;
        ForecastResult {
            predictions,
            average_pe,
            years_predicted: years,
        }
    }

    #[test]
    fn forecast_table_golden() {
        let txt = format_forecast(&result(1, &[12.0, 12.5, 13.25, 14.0]));
        let expected = concat!(
            "period     predicted_pe\n",
            "---------- ------------\n",
            "2024 Q1           12.00\n",
            "2024 Q2           12.50\n",
            "2024 Q3           13.25\n",
            "2024 Q4           14.00\n",
            "\n",
            "Average PE over next 1 year: 12.94\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn average_line_pluralizes_years() {
        assert_eq!(format_average(&result(3, &[10.0, 11.0])), "Average PE over next 3 years: 10.50");
    }
}
