use serde::Serialize;

/// One percentage-based state incentive. The credit is computed on the
/// post-rebate cost basis and truncated at `cap` when present.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateIncentive {
    pub percentage: f64,
    pub cap: Option<f64>,
}

/// Fixed installation economics for one evaluation. Rates are fractions,
/// currency amounts are dollars.
#[derive(Debug, Clone)]
pub struct FinancialParameters {
    pub system_size_kw: f64,
    pub cost_per_watt: f64,
    pub permit_cost: f64,
    pub federal_credit_rate: f64,
    pub flat_rebates: f64,
    pub state_incentives: Vec<StateIncentive>,
}

/// Production and price estimates resolved upstream. `None` means the
/// lookup was unavailable and the documented defaults apply; an explicit
/// zero is kept as zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct UsageEstimates {
    pub annual_kwh: Option<f64>,
    pub price_per_kwh: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct YearSavings {
    pub year: u32,
    pub annual_savings: f64,
    pub cumulative_savings: f64,
}

/// Single-point estimate with no randomness applied.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeterministicEstimate {
    pub gross_cost: f64,
    pub net_cost: f64,
    /// `+inf` when annual savings are zero; serde_json emits `null`.
    pub payback_years: f64,
    pub yearly_projection: Vec<YearSavings>,
    pub carbon_offset_tons: f64,
}

/// The fixed percentile set reported for every aggregated statistic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Percentiles {
    #[serde(rename = "5")]
    pub p5: f64,
    #[serde(rename = "25")]
    pub p25: f64,
    #[serde(rename = "50")]
    pub p50: f64,
    #[serde(rename = "75")]
    pub p75: f64,
    #[serde(rename = "95")]
    pub p95: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SummaryStat {
    pub mean: f64,
    pub std: f64,
    pub percentiles: Percentiles,
}

/// Per-year percentile series, one value per projection year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPercentiles {
    #[serde(rename = "5")]
    pub p5: Vec<f64>,
    #[serde(rename = "25")]
    pub p25: Vec<f64>,
    #[serde(rename = "50")]
    pub p50: Vec<f64>,
    #[serde(rename = "75")]
    pub p75: Vec<f64>,
    #[serde(rename = "95")]
    pub p95: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavingsByYear {
    pub mean: Vec<f64>,
    pub percentiles: SeriesPercentiles,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationSummary {
    pub n_simulations: usize,
    pub years: u32,
    pub net_cost: SummaryStat,
    pub payback_years: SummaryStat,
    pub total_savings_at_horizon: SummaryStat,
    pub carbon_offset_tons: SummaryStat,
    pub savings_by_year: SavingsByYear,
}
