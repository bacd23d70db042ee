//! # Trust Engine
//!
//! Binds the configuration and the loaded reference models to the three
//! per-cycle operations the agent drives.

use shared_types::{Record, ReputationEntry};
use tracing::{info, instrument};

use crate::config::TrustConfig;
use crate::domain::classifier::tally;
use crate::domain::models::ReferenceModels;
use crate::domain::obfuscation::{self, choose_d, ObfuscationChoice};
use crate::domain::update::{apply_time_delay, apply_update, RoundMarkers};
use crate::error::Result;

/// Trust evaluation with fixed constants and reference models.
#[derive(Debug, Clone)]
pub struct TrustEngine {
    config: TrustConfig,
    models: ReferenceModels,
}

impl TrustEngine {
    /// Engine over already-loaded models.
    pub fn new(config: TrustConfig, models: ReferenceModels) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, models })
    }

    /// Validate `config` and load its model files.
    pub fn from_config(config: TrustConfig) -> Result<Self> {
        config.validate()?;
        let models =
            ReferenceModels::load(&config.normal_model_path, &config.abnormal_model_path)?;
        info!(
            dimension = models.dimension(),
            "[nt-03] reference models loaded"
        );
        Ok(Self { config, models })
    }

    /// Active configuration.
    pub fn config(&self) -> &TrustConfig {
        &self.config
    }

    /// Score assigned to newly admitted subjects.
    pub fn bootstrap_score(&self) -> f64 {
        self.config.bootstrap_score
    }

    /// Behaviour update after data collection; `k` is the previous block's serial.
    #[instrument(skip_all, fields(subjects = entries.len(), records = records.len(), k))]
    pub fn update(
        &self,
        entries: &mut [ReputationEntry],
        markers: &mut RoundMarkers,
        records: &[Record],
        k: i64,
    ) {
        let tallies = tally(&self.models, records);
        apply_update(
            entries,
            markers,
            &tallies,
            k,
            self.config.k_adj,
            self.config.decay_t,
        );
        info!("[nt-03] trust values updated");
    }

    /// Once-per-cycle decay of every score.
    pub fn time_delay(&self, entries: &mut [ReputationEntry], markers: &mut RoundMarkers, k: i64) {
        apply_time_delay(entries, markers, k, self.config.decay_t);
        info!(subjects = entries.len(), "[nt-03] time-delay evaluation done");
    }

    /// Choose a granularity and generalize every score.
    pub fn obfuscate(&self, entries: &mut [ReputationEntry]) -> ObfuscationChoice {
        let scores: Vec<f64> = entries.iter().map(|e| e.score).collect();
        let choice = choose_d(
            &scores,
            self.config.obfuscation_max_d,
            self.config.obfuscation_min_d,
            self.config.anonymity_threshold,
        );
        obfuscation::apply(entries, choice.d);
        if choice.fallback {
            info!(d = choice.d, "[nt-03] no granularity met the threshold, using default");
        } else {
            info!(d = choice.d, worst_case = choice.worst_case, "[nt-03] obfuscation applied");
        }
        choice
    }
}
