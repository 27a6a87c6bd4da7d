mod catalog;
mod emissions;
mod engine;
mod model;
mod stats;
mod types;

pub use catalog::{
    COST_OVERRUN_PCT, DistributionSpec, PANEL_DEGRADATION, PRODUCTION_VARIABILITY, TrialDraws,
    UTILITY_INFLATION, sample_trials,
};
pub use emissions::{DEFAULT_LBS_CO2_PER_KWH, EmissionsTable};
pub use engine::{DEFAULT_HORIZON_YEARS, DEFAULT_TRIALS, MAX_TRIALS, run_simulation};
pub use model::{
    DEFAULT_ANNUAL_KWH, DEFAULT_COST_PER_WATT, DEFAULT_FEDERAL_CREDIT_RATE, DEFAULT_PERMIT_COST,
    DEFAULT_PRICE_PER_KWH, carbon_offset_tons, evaluate, gross_cost, net_cost, savings_over_time,
    simple_payback,
};
pub use types::{
    DeterministicEstimate, FinancialParameters, Percentiles, SavingsByYear, SeriesPercentiles,
    SimulationSummary, StateIncentive, SummaryStat, UsageEstimates, YearSavings,
};
