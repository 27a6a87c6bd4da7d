use axum::{
    Router,
    extract::{Json, Query},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::LazyLock;
use tokio::net::TcpListener;

use crate::core::{
    DEFAULT_COST_PER_WATT, DEFAULT_FEDERAL_CREDIT_RATE, DEFAULT_HORIZON_YEARS,
    DEFAULT_PERMIT_COST, DEFAULT_TRIALS, EmissionsTable, FinancialParameters, StateIncentive,
    UsageEstimates, evaluate, run_simulation,
};

static EGRID: LazyLock<EmissionsTable> = LazyLock::new(EmissionsTable::egrid);

/// CLI incentive entry, parsed from `PCT` or `PCT:CAP` (percent, dollars).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateIncentiveArg {
    percentage: f64,
    cap: Option<f64>,
}

fn parse_state_incentive(raw: &str) -> Result<StateIncentiveArg, String> {
    let (pct_raw, cap_raw) = match raw.split_once(':') {
        Some((pct, cap)) => (pct, Some(cap)),
        None => (raw, None),
    };
    let percentage = pct_raw
        .trim()
        .parse::<f64>()
        .map_err(|_| format!("invalid incentive percentage: {pct_raw}"))?;
    let cap = match cap_raw {
        Some(cap) => Some(
            cap.trim()
                .parse::<f64>()
                .map_err(|_| format!("invalid incentive cap: {cap}"))?,
        ),
        None => None,
    };
    Ok(StateIncentiveArg { percentage, cap })
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "suncost",
    about = "Monte Carlo solar installation cost and savings estimator"
)]
pub struct Cli {
    #[arg(long, default_value_t = 8.0, help = "Installed system size in kW")]
    system_size_kw: f64,
    #[arg(
        long,
        default_value_t = DEFAULT_COST_PER_WATT,
        help = "Installed cost per watt in dollars"
    )]
    cost_per_watt: f64,
    #[arg(
        long,
        default_value_t = DEFAULT_PERMIT_COST,
        help = "Fixed permitting and interconnection cost in dollars"
    )]
    permit_cost: f64,
    #[arg(
        long,
        default_value_t = DEFAULT_FEDERAL_CREDIT_RATE * 100.0,
        help = "Federal tax credit in percent of the post-rebate cost basis"
    )]
    federal_credit: f64,
    #[arg(
        long,
        default_value_t = 0.0,
        help = "Total flat rebates in dollars, applied before percentage credits"
    )]
    flat_rebates: f64,
    #[arg(
        long = "state-incentive",
        value_parser = parse_state_incentive,
        help = "State incentive as PCT or PCT:CAP (percent, dollar cap); repeatable"
    )]
    state_incentives: Vec<StateIncentiveArg>,
    #[arg(
        long,
        help = "Annual production estimate in kWh; defaults to 10500 when omitted"
    )]
    annual_kwh: Option<f64>,
    #[arg(
        long,
        help = "Utility price in dollars per kWh; defaults to 0.16 when omitted"
    )]
    price_per_kwh: Option<f64>,
    #[arg(long, default_value_t = DEFAULT_HORIZON_YEARS, help = "Projection horizon in years")]
    years: u32,
    #[arg(
        long,
        default_value_t = DEFAULT_TRIALS as u32,
        help = "Monte Carlo trial count, capped at 10000"
    )]
    simulations: u32,
    #[arg(long, help = "RNG seed for reproducible simulations")]
    seed: Option<u64>,
    #[arg(
        long,
        help = "Resolved eGRID region code for the carbon intensity lookup, e.g. CAMX"
    )]
    region: Option<String>,
    #[arg(
        long,
        default_value_t = false,
        help = "Also run the Monte Carlo simulation and print its summary"
    )]
    simulate: bool,
}

#[derive(Debug, Clone)]
struct EngineRequest {
    params: FinancialParameters,
    estimates: UsageEstimates,
    horizon: u32,
    trials: usize,
    seed: Option<u64>,
    region: Option<String>,
}

fn build_request(cli: &Cli) -> Result<EngineRequest, String> {
    if !cli.system_size_kw.is_finite() || cli.system_size_kw <= 0.0 {
        return Err("--system-size-kw must be > 0".to_string());
    }

    if !cli.cost_per_watt.is_finite() || cli.cost_per_watt <= 0.0 {
        return Err("--cost-per-watt must be > 0".to_string());
    }

    if !cli.permit_cost.is_finite() || cli.permit_cost < 0.0 {
        return Err("--permit-cost must be >= 0".to_string());
    }

    if !(0.0..=100.0).contains(&cli.federal_credit) {
        return Err("--federal-credit must be between 0 and 100".to_string());
    }

    if !cli.flat_rebates.is_finite() || cli.flat_rebates < 0.0 {
        return Err("--flat-rebates must be >= 0".to_string());
    }

    for entry in &cli.state_incentives {
        if !(0.0..=100.0).contains(&entry.percentage) {
            return Err("--state-incentive percentage must be between 0 and 100".to_string());
        }
        if let Some(cap) = entry.cap {
            if !cap.is_finite() || cap < 0.0 {
                return Err("--state-incentive cap must be >= 0".to_string());
            }
        }
    }

    if let Some(kwh) = cli.annual_kwh {
        if !kwh.is_finite() || kwh < 0.0 {
            return Err("--annual-kwh must be >= 0".to_string());
        }
    }

    if let Some(price) = cli.price_per_kwh {
        if !price.is_finite() || price < 0.0 {
            return Err("--price-per-kwh must be >= 0".to_string());
        }
    }

    if cli.years == 0 {
        return Err("--years must be >= 1".to_string());
    }

    if cli.simulations == 0 {
        return Err("--simulations must be > 0".to_string());
    }

    Ok(EngineRequest {
        params: FinancialParameters {
            system_size_kw: cli.system_size_kw,
            cost_per_watt: cli.cost_per_watt,
            permit_cost: cli.permit_cost,
            federal_credit_rate: cli.federal_credit / 100.0,
            flat_rebates: cli.flat_rebates,
            state_incentives: cli
                .state_incentives
                .iter()
                .map(|entry| StateIncentive {
                    percentage: entry.percentage / 100.0,
                    cap: entry.cap,
                })
                .collect(),
        },
        estimates: UsageEstimates {
            annual_kwh: cli.annual_kwh,
            price_per_kwh: cli.price_per_kwh,
        },
        horizon: cli.years,
        trials: cli.simulations as usize,
        seed: cli.seed,
        region: cli.region.clone(),
    })
}

/// Runs the one-shot CLI mode: print the deterministic estimate and,
/// with `--simulate`, the simulation summary as pretty JSON.
pub fn run_cli(cli: &Cli) -> Result<(), String> {
    let request = build_request(cli)?;
    let lbs_per_kwh = EGRID.lbs_per_kwh(request.region.as_deref());

    let estimate = evaluate(
        &request.params,
        request.estimates,
        request.horizon,
        lbs_per_kwh,
    );
    println!(
        "{}",
        serde_json::to_string_pretty(&estimate).map_err(|e| e.to_string())?
    );

    if cli.simulate {
        let summary = run_simulation(
            &request.params,
            request.estimates,
            request.horizon,
            request.trials,
            request.seed,
            lbs_per_kwh,
        );
        println!(
            "{}",
            serde_json::to_string_pretty(&summary).map_err(|e| e.to_string())?
        );
    }

    Ok(())
}

#[derive(Debug, Clone, Copy, Deserialize)]
struct StateIncentivePayload {
    percentage: f64,
    #[serde(default)]
    cap: Option<f64>,
}

/// Shared request payload for both endpoints; rates are fractions per
/// the engine contract. Absent fields take the documented defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SimulatePayload {
    system_size_kw: Option<f64>,
    unit_cost: Option<f64>,
    permit_cost: Option<f64>,
    federal_credit_rate: Option<f64>,
    flat_rebates: Option<f64>,
    state_incentives: Option<Vec<StateIncentivePayload>>,
    annual_production: Option<f64>,
    unit_price: Option<f64>,
    horizon_years: Option<u32>,
    region: Option<String>,
    trial_count: Option<u32>,
    seed: Option<u64>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn default_cli_for_api() -> Cli {
    Cli {
        system_size_kw: 8.0,
        cost_per_watt: DEFAULT_COST_PER_WATT,
        permit_cost: DEFAULT_PERMIT_COST,
        federal_credit: DEFAULT_FEDERAL_CREDIT_RATE * 100.0,
        flat_rebates: 0.0,
        state_incentives: Vec::new(),
        annual_kwh: None,
        price_per_kwh: None,
        years: DEFAULT_HORIZON_YEARS,
        simulations: DEFAULT_TRIALS as u32,
        seed: None,
        region: None,
        simulate: false,
    }
}

fn api_request_from_payload(payload: SimulatePayload) -> Result<EngineRequest, String> {
    let mut cli = default_cli_for_api();

    if let Some(v) = payload.system_size_kw {
        cli.system_size_kw = v;
    }
    if let Some(v) = payload.unit_cost {
        cli.cost_per_watt = v;
    }
    if let Some(v) = payload.permit_cost {
        cli.permit_cost = v;
    }
    if let Some(v) = payload.federal_credit_rate {
        cli.federal_credit = v * 100.0;
    }
    if let Some(v) = payload.flat_rebates {
        cli.flat_rebates = v;
    }
    if let Some(entries) = payload.state_incentives {
        cli.state_incentives = entries
            .iter()
            .map(|entry| StateIncentiveArg {
                percentage: entry.percentage * 100.0,
                cap: entry.cap,
            })
            .collect();
    }
    if let Some(v) = payload.annual_production {
        cli.annual_kwh = Some(v);
    }
    if let Some(v) = payload.unit_price {
        cli.price_per_kwh = Some(v);
    }
    if let Some(v) = payload.horizon_years {
        cli.years = v;
    }
    if let Some(v) = payload.region {
        cli.region = Some(v);
    }
    if let Some(v) = payload.trial_count {
        cli.simulations = v;
    }
    if let Some(v) = payload.seed {
        cli.seed = Some(v);
    }

    build_request(&cli)
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route(
            "/api/estimate",
            get(estimate_get_handler).post(estimate_post_handler),
        )
        .route(
            "/api/simulate",
            get(simulate_get_handler).post(simulate_post_handler),
        )
        .fallback(not_found_handler);

    let listener = TcpListener::bind(addr).await?;
    println!("suncost HTTP API listening on http://{addr}");

    axum::serve(listener, app).await
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn estimate_get_handler(Query(payload): Query<SimulatePayload>) -> Response {
    estimate_handler_impl(payload).await
}

async fn estimate_post_handler(Json(payload): Json<SimulatePayload>) -> Response {
    estimate_handler_impl(payload).await
}

async fn estimate_handler_impl(payload: SimulatePayload) -> Response {
    let request = match api_request_from_payload(payload) {
        Ok(request) => request,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &msg),
    };

    let lbs_per_kwh = EGRID.lbs_per_kwh(request.region.as_deref());
    let estimate = evaluate(
        &request.params,
        request.estimates,
        request.horizon,
        lbs_per_kwh,
    );
    json_response(StatusCode::OK, estimate)
}

async fn simulate_get_handler(Query(payload): Query<SimulatePayload>) -> Response {
    simulate_handler_impl(payload).await
}

async fn simulate_post_handler(Json(payload): Json<SimulatePayload>) -> Response {
    simulate_handler_impl(payload).await
}

async fn simulate_handler_impl(payload: SimulatePayload) -> Response {
    let request = match api_request_from_payload(payload) {
        Ok(request) => request,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &msg),
    };

    let lbs_per_kwh = EGRID.lbs_per_kwh(request.region.as_deref());
    let summary = run_simulation(
        &request.params,
        request.estimates,
        request.horizon,
        request.trials,
        request.seed,
        lbs_per_kwh,
    );
    json_response(StatusCode::OK, summary)
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        "no-store".parse().expect("valid header"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
fn api_request_from_json(json: &str) -> Result<EngineRequest, String> {
    let payload = serde_json::from_str::<SimulatePayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    api_request_from_payload(payload)
}
