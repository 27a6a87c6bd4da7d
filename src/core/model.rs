use super::catalog::{PANEL_DEGRADATION, UTILITY_INFLATION};
use super::stats::round2;
use super::types::{DeterministicEstimate, FinancialParameters, UsageEstimates, YearSavings};

/// Fallback annual household consumption when the usage lookup is unavailable.
pub const DEFAULT_ANNUAL_KWH: f64 = 10_500.0;
/// Fallback utility rate in dollars per kWh.
pub const DEFAULT_PRICE_PER_KWH: f64 = 0.16;

pub const DEFAULT_COST_PER_WATT: f64 = 3.0;
pub const DEFAULT_PERMIT_COST: f64 = 500.0;
pub const DEFAULT_FEDERAL_CREDIT_RATE: f64 = 0.30;

pub fn gross_cost(params: &FinancialParameters) -> f64 {
    params.system_size_kw * 1000.0 * params.cost_per_watt + params.permit_cost
}

/// Incentive stacking: flat rebates reduce the basis first, then the
/// federal credit and capped state credits are computed on that basis.
/// The order is part of the contract, not an implementation detail.
pub fn net_cost(gross: f64, params: &FinancialParameters) -> f64 {
    let basis = (gross - params.flat_rebates).max(0.0);
    let federal_credit = basis * params.federal_credit_rate;
    let state_credits: f64 = params
        .state_incentives
        .iter()
        .map(|entry| {
            let credit = basis * entry.percentage;
            match entry.cap {
                Some(cap) => credit.min(cap),
                None => credit,
            }
        })
        .sum();
    (basis - federal_credit - state_credits).max(0.0)
}

/// Point-estimate payback ignoring degradation and inflation.
pub fn simple_payback(net: f64, annual_kwh: f64, price_per_kwh: f64) -> f64 {
    let annual_savings = annual_kwh * price_per_kwh;
    if annual_savings == 0.0 {
        return f64::INFINITY;
    }
    net / annual_savings
}

fn production_for_year(
    annual_kwh: f64,
    year: u32,
    degradation: f64,
    multipliers: Option<&[f64]>,
) -> f64 {
    let mut production = annual_kwh * (1.0 - degradation).powi(year as i32);
    if let Some(mults) = multipliers {
        if let Some(m) = mults.get(year as usize - 1) {
            production *= m;
        }
    }
    production
}

/// Year-by-year savings trajectory. Cumulative savings start at `-net`
/// and accumulate in year order; the running total is what the payback
/// crossover is read from.
pub fn savings_over_time(
    net: f64,
    annual_kwh: f64,
    price_per_kwh: f64,
    horizon: u32,
    degradation: f64,
    inflation: f64,
    multipliers: Option<&[f64]>,
) -> Vec<YearSavings> {
    let mut cumulative = -net;
    let mut rows = Vec::with_capacity(horizon as usize);
    for year in 1..=horizon {
        let production = production_for_year(annual_kwh, year, degradation, multipliers);
        let effective_rate = price_per_kwh * (1.0 + inflation).powi(year as i32);
        let annual = production * effective_rate;
        cumulative += annual;
        rows.push(YearSavings {
            year,
            annual_savings: annual,
            cumulative_savings: cumulative,
        });
    }
    rows
}

/// Total production over the horizon converted to tons of CO2 through a
/// grid-intensity factor in lbs per kWh. Unrounded; callers round at the
/// reporting boundary.
pub fn carbon_offset_tons(
    annual_kwh: f64,
    horizon: u32,
    degradation: f64,
    multipliers: Option<&[f64]>,
    lbs_co2_per_kwh: f64,
) -> f64 {
    let total_kwh: f64 = (1..=horizon)
        .map(|year| production_for_year(annual_kwh, year, degradation, multipliers))
        .sum();
    total_kwh * lbs_co2_per_kwh / 2000.0
}

/// Full deterministic evaluation using the catalog means as the fixed
/// degradation and inflation values and no production variability.
pub fn evaluate(
    params: &FinancialParameters,
    estimates: UsageEstimates,
    horizon: u32,
    lbs_co2_per_kwh: f64,
) -> DeterministicEstimate {
    let annual_kwh = estimates.annual_kwh.unwrap_or(DEFAULT_ANNUAL_KWH);
    let price_per_kwh = estimates.price_per_kwh.unwrap_or(DEFAULT_PRICE_PER_KWH);

    let gross = gross_cost(params);
    let net = net_cost(gross, params);
    let payback = simple_payback(net, annual_kwh, price_per_kwh);
    let projection = savings_over_time(
        net,
        annual_kwh,
        price_per_kwh,
        horizon,
        PANEL_DEGRADATION.mean,
        UTILITY_INFLATION.mean,
        None,
    );
    let carbon = carbon_offset_tons(
        annual_kwh,
        horizon,
        PANEL_DEGRADATION.mean,
        None,
        lbs_co2_per_kwh,
    );

    DeterministicEstimate {
        gross_cost: gross,
        net_cost: net,
        payback_years: payback,
        yearly_projection: projection,
        carbon_offset_tons: round2(carbon),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::emissions::DEFAULT_LBS_CO2_PER_KWH;
    use crate::core::types::StateIncentive;

    const EPS: f64 = 1e-9;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn params() -> FinancialParameters {
        FinancialParameters {
            system_size_kw: 10.0,
            cost_per_watt: 3.0,
            permit_cost: 500.0,
            federal_credit_rate: 0.30,
            flat_rebates: 0.0,
            state_incentives: Vec::new(),
        }
    }

    #[test]
    fn gross_cost_is_size_times_watt_cost_plus_permit() {
        assert_approx(gross_cost(&params()), 10.0 * 1000.0 * 3.0 + 500.0);
    }

    #[test]
    fn net_cost_applies_rebates_before_federal_credit() {
        let mut p = params();
        p.flat_rebates = 2_000.0;
        // basis 28_000, federal 30% -> 19_600
        assert_approx(net_cost(30_000.0, &p), 19_600.0);
    }

    #[test]
    fn net_cost_basis_clamps_when_rebates_exceed_gross() {
        let mut p = params();
        p.flat_rebates = 35_000.0;
        assert_approx(net_cost(30_000.0, &p), 0.0);
    }

    #[test]
    fn net_cost_never_negative_with_oversized_incentives() {
        let mut p = params();
        p.federal_credit_rate = 1.0;
        p.state_incentives = vec![StateIncentive {
            percentage: 0.80,
            cap: None,
        }];
        assert_approx(net_cost(30_000.0, &p), 0.0);
    }

    #[test]
    fn state_incentive_cap_truncates_credit() {
        let mut p = params();
        p.federal_credit_rate = 0.0;
        p.state_incentives = vec![
            StateIncentive {
                percentage: 0.10,
                cap: Some(1_000.0),
            },
            StateIncentive {
                percentage: 0.05,
                cap: None,
            },
        ];
        // 10% of 30_000 capped at 1_000, plus uncapped 1_500
        assert_approx(net_cost(30_000.0, &p), 30_000.0 - 1_000.0 - 1_500.0);
    }

    #[test]
    fn simple_payback_matches_ratio() {
        assert_approx(
            simple_payback(21_000.0, 10_000.0, 0.18),
            21_000.0 / (10_000.0 * 0.18),
        );
    }

    #[test]
    fn simple_payback_is_infinite_with_zero_savings() {
        assert_eq!(simple_payback(1_000.0, 0.0, 0.16), f64::INFINITY);
        assert_eq!(simple_payback(1_000.0, 10_000.0, 0.0), f64::INFINITY);
    }

    #[test]
    fn savings_rows_cover_horizon_in_year_order() {
        let rows = savings_over_time(20_000.0, 10_000.0, 0.16, 5, 0.005, 0.025, None);
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0].year, 1);
        assert_eq!(rows[4].year, 5);
        assert_approx(
            rows[0].cumulative_savings,
            -20_000.0 + rows[0].annual_savings,
        );
        for pair in rows.windows(2) {
            assert_approx(
                pair[1].cumulative_savings,
                pair[0].cumulative_savings + pair[1].annual_savings,
            );
        }
    }

    #[test]
    fn savings_without_growth_or_decay_are_flat() {
        let rows = savings_over_time(0.0, 10_000.0, 0.16, 3, 0.0, 0.0, None);
        for row in &rows {
            assert_approx(row.annual_savings, 1_600.0);
        }
        assert_approx(rows[2].cumulative_savings, 4_800.0);
    }

    #[test]
    fn production_multipliers_scale_each_year() {
        let mults = [0.5, 2.0];
        let rows = savings_over_time(0.0, 10_000.0, 0.10, 2, 0.0, 0.0, Some(&mults));
        assert_approx(rows[0].annual_savings, 500.0);
        assert_approx(rows[1].annual_savings, 2_000.0);
    }

    #[test]
    fn carbon_offset_converts_through_grid_intensity() {
        // 2 years of 10_000 kWh at 0.85 lbs/kWh -> 8.5 tons
        assert_approx(carbon_offset_tons(10_000.0, 2, 0.0, None, 0.85), 8.5);
    }

    #[test]
    fn evaluate_falls_back_to_default_usage_and_rate() {
        let est = evaluate(
            &params(),
            UsageEstimates::default(),
            20,
            DEFAULT_LBS_CO2_PER_KWH,
        );
        assert_approx(est.gross_cost, 30_500.0);
        assert_approx(
            est.payback_years,
            est.net_cost / (DEFAULT_ANNUAL_KWH * DEFAULT_PRICE_PER_KWH),
        );
        assert_eq!(est.yearly_projection.len(), 20);
    }

    #[test]
    fn evaluate_keeps_explicit_zero_estimates() {
        let est = evaluate(
            &params(),
            UsageEstimates {
                annual_kwh: Some(0.0),
                price_per_kwh: Some(0.16),
            },
            10,
            DEFAULT_LBS_CO2_PER_KWH,
        );
        assert_eq!(est.payback_years, f64::INFINITY);
        assert_approx(est.carbon_offset_tons, 0.0);
    }
}
