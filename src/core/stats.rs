use super::types::{Percentiles, SavingsByYear, SeriesPercentiles, SummaryStat};

/// Currency/unit precision applied at the aggregation boundary only.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn mean_of(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn population_std(values: &[f64], mean: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let variance =
        values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

fn percentile(values: &mut [f64], p: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    values.sort_by(|a, b| a.total_cmp(b));

    let n = values.len();
    if n == 1 {
        return values[0];
    }

    let rank = (p / 100.0) * (n as f64 - 1.0);
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;

    if lower == upper {
        values[lower]
    } else {
        let w = rank - lower as f64;
        values[lower] * (1.0 - w) + values[upper] * w
    }
}

fn percentiles_of(values: &mut [f64]) -> Percentiles {
    Percentiles {
        p5: round2(percentile(values, 5.0)),
        p25: round2(percentile(values, 25.0)),
        p50: round2(percentile(values, 50.0)),
        p75: round2(percentile(values, 75.0)),
        p95: round2(percentile(values, 95.0)),
    }
}

/// Reduces one scalar outcome collection to mean, population standard
/// deviation and the fixed percentile set. Sorts in place.
pub fn summarize(values: &mut [f64]) -> SummaryStat {
    let mean = mean_of(values);
    let std = population_std(values, mean);
    SummaryStat {
        mean: round2(mean),
        std: round2(std),
        percentiles: percentiles_of(values),
    }
}

/// Column-wise reduction of an `n x years` trajectory matrix: one mean
/// and one percentile series per statistic, each of length `years`.
pub fn summarize_by_year(matrix: &[Vec<f64>], years: usize) -> SavingsByYear {
    let mut mean = Vec::with_capacity(years);
    let mut series = SeriesPercentiles {
        p5: Vec::with_capacity(years),
        p25: Vec::with_capacity(years),
        p50: Vec::with_capacity(years),
        p75: Vec::with_capacity(years),
        p95: Vec::with_capacity(years),
    };

    for year in 0..years {
        let mut column: Vec<f64> = matrix
            .iter()
            .filter_map(|row| row.get(year).copied())
            .collect();
        mean.push(round2(mean_of(&column)));
        let p = percentiles_of(&mut column);
        series.p5.push(p.p5);
        series.p25.push(p.p25);
        series.p50.push(p.p50);
        series.p75.push(p.p75);
        series.p95.push(p.p95);
    }

    SavingsByYear {
        mean,
        percentiles: series,
    }
}
