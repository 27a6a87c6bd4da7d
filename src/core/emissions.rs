use std::collections::HashMap;

/// National-average grid intensity used when no region is resolved.
pub const DEFAULT_LBS_CO2_PER_KWH: f64 = 0.85;

/// Immutable eGRID subregion -> CO2 lbs per MWh lookup. Built once at
/// process start and shared read-only with every evaluation.
#[derive(Debug, Clone)]
pub struct EmissionsTable {
    lbs_per_mwh: HashMap<&'static str, f64>,
}

const EGRID_LBS_PER_MWH: [(&str, f64); 27] = [
    ("AKGD", 899.633),
    ("AKMS", 520.483),
    ("AZNM", 703.703),
    ("CAMX", 428.464),
    ("ERCT", 733.862),
    ("FRCC", 782.262),
    ("HIMS", 1123.37),
    ("HIOA", 1489.55),
    ("MROE", 1397.31),
    ("MROW", 920.13),
    ("NEWE", 539.275),
    ("NWPP", 631.735),
    ("NYCW", 864.469),
    ("NYLI", 1180.67),
    ("NYUP", 242.089),
    ("PRMS", 1543.07),
    ("RFCE", 596.904),
    ("RFCM", 970.617),
    ("RFCW", 911.424),
    ("RMPA", 1036.60),
    ("SPNO", 861.999),
    ("SPSO", 872.042),
    ("SRMV", 739.72),
    ("SRMW", 1239.84),
    ("SRSO", 842.329),
    ("SRTV", 898.079),
    ("SRVC", 593.419),
];

impl EmissionsTable {
    pub fn egrid() -> Self {
        Self {
            lbs_per_mwh: EGRID_LBS_PER_MWH.into_iter().collect(),
        }
    }

    /// Grid intensity in lbs CO2 per kWh for a resolved eGRID region
    /// code. Unknown or absent regions fall back to the default factor.
    pub fn lbs_per_kwh(&self, region: Option<&str>) -> f64 {
        region
            .map(|r| r.trim().to_ascii_uppercase())
            .and_then(|r| self.lbs_per_mwh.get(r.as_str()).copied())
            .map(|lbs_per_mwh| lbs_per_mwh / 1000.0)
            .unwrap_or(DEFAULT_LBS_CO2_PER_KWH)
    }
}
