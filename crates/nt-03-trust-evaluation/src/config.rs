//! Trust evaluation configuration.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TrustError};

/// Constants of the trust update, decay and obfuscation steps.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct TrustConfig {
    /// Sensitivity to abnormal behaviour.
    pub k_adj: f64,
    /// Decay constant `t` of the time factor.
    pub decay_t: f64,
    /// Score given to newly admitted subjects.
    pub bootstrap_score: f64,
    /// Highest tolerated re-identification probability.
    pub anonymity_threshold: f64,
    /// First (finest) granularity tried, also the fallback.
    pub obfuscation_max_d: u32,
    /// Last (coarsest) granularity tried.
    pub obfuscation_min_d: u32,
    /// CSV with the normal-behaviour reference vector.
    pub normal_model_path: String,
    /// CSV with the abnormal-behaviour reference vector.
    pub abnormal_model_path: String,
}

impl Default for TrustConfig {
    fn default() -> Self {
        Self {
            k_adj: 0.17,
            decay_t: 0.5,
            bootstrap_score: 0.1,
            anonymity_threshold: 0.5,
            obfuscation_max_d: 30,
            obfuscation_min_d: 10,
            normal_model_path: "datasets/normal_model.csv".to_string(),
            abnormal_model_path: "datasets/abnormal_model.csv".to_string(),
        }
    }
}

impl TrustConfig {
    /// Reject values the formulas cannot use.
    pub fn validate(&self) -> Result<()> {
        if self.decay_t <= 0.0 {
            return Err(TrustError::InvalidConfig("decay_t must be > 0".into()));
        }
        if self.k_adj < 0.0 {
            return Err(TrustError::InvalidConfig("k_adj must be >= 0".into()));
        }
        if self.obfuscation_min_d == 0 || self.obfuscation_min_d > self.obfuscation_max_d {
            return Err(TrustError::InvalidConfig(format!(
                "obfuscation range {}..={} is empty",
                self.obfuscation_min_d, self.obfuscation_max_d
            )));
        }
        if !(0.0..=1.0).contains(&self.bootstrap_score) {
            return Err(TrustError::InvalidConfig("bootstrap_score outside [0, 1]".into()));
        }
        Ok(())
    }
}
