use rand::{Rng, SeedableRng, rngs::StdRng};
use rand_distr::Normal;

/// One named stochastic input. `mean` and `std` describe the unclipped
/// normal; `clip_min` is applied to realized draws afterward, so sample
/// statistics may differ slightly when the clip binds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistributionSpec {
    pub mean: f64,
    pub std: f64,
    pub clip_min: Option<f64>,
}

/// Annual fractional increase in the utility rate.
pub const UTILITY_INFLATION: DistributionSpec = DistributionSpec {
    mean: 0.025,
    std: 0.01,
    clip_min: Some(0.0),
};

/// Annual fractional decline in panel output.
pub const PANEL_DEGRADATION: DistributionSpec = DistributionSpec {
    mean: 0.005,
    std: 0.001,
    clip_min: Some(0.0),
};

/// Multiplicative overrun on gross installation cost.
pub const COST_OVERRUN_PCT: DistributionSpec = DistributionSpec {
    mean: 0.0,
    std: 0.05,
    clip_min: None,
};

/// Per-year production multiplier (weather, soiling, downtime).
pub const PRODUCTION_VARIABILITY: DistributionSpec = DistributionSpec {
    mean: 1.0,
    std: 0.07,
    clip_min: Some(0.5),
};

impl DistributionSpec {
    fn draw(&self, rng: &mut StdRng, count: usize) -> Vec<f64> {
        let normal = match Normal::new(self.mean, self.std) {
            Ok(dist) => dist,
            Err(_) => return vec![self.mean; count],
        };
        (0..count)
            .map(|_| {
                let value: f64 = rng.sample(normal);
                match self.clip_min {
                    Some(min) => value.max(min),
                    None => value,
                }
            })
            .collect()
    }
}

/// All random draws for one simulation run. Scalar vectors are indexed
/// by trial; `production` is one multiplier per trial per year.
#[derive(Debug, Clone)]
pub struct TrialDraws {
    pub inflation: Vec<f64>,
    pub degradation: Vec<f64>,
    pub cost_overrun: Vec<f64>,
    pub production: Vec<Vec<f64>>,
}

/// Draws `n` trials' worth of samples in a fixed order so the output is
/// a pure function of the seed. A missing seed pulls one from OS entropy.
pub fn sample_trials(n: usize, horizon: u32, seed: Option<u64>) -> TrialDraws {
    let mut rng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_os_rng(),
    };
    TrialDraws {
        inflation: UTILITY_INFLATION.draw(&mut rng, n),
        degradation: PANEL_DEGRADATION.draw(&mut rng, n),
        cost_overrun: COST_OVERRUN_PCT.draw(&mut rng, n),
        production: (0..n)
            .map(|_| PRODUCTION_VARIABILITY.draw(&mut rng, horizon as usize))
            .collect(),
    }
}
