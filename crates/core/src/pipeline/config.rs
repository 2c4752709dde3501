use std::collections::HashSet;

use thiserror::Error;

use crate::shared::constants::{
    DEFAULT_CONFIDENCE_PERCENT, DEFAULT_MODEL_INPUT, DEFAULT_SKIP_INTERVAL,
};

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Skip interval must be at least 1")]
    SkipIntervalZero,

    #[error("Model input must have non-zero dimensions, got {0}x{1}")]
    ModelInputZero(u32, u32),

    #[error("Confidence threshold must be within 0..=100, got {0}")]
    ConfidenceOutOfRange(f64),
}

/// Tuning knobs for a watch run.
///
/// `label_filter` restricts annotation to the named classes; `None` keeps
/// every class the detector knows. `max_cycles` bounds the presentation
/// loop for headless runs; interactive runs leave it `None` and stop on a
/// key press or signal instead.
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    pub model_input: (u32, u32),
    pub confidence_percent: f64,
    pub skip_interval: u64,
    pub label_filter: Option<HashSet<String>>,
    pub max_cycles: Option<u64>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            model_input: DEFAULT_MODEL_INPUT,
            confidence_percent: DEFAULT_CONFIDENCE_PERCENT,
            skip_interval: DEFAULT_SKIP_INTERVAL,
            label_filter: None,
            max_cycles: None,
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.skip_interval == 0 {
            return Err(ConfigError::SkipIntervalZero);
        }
        let (w, h) = self.model_input;
        if w == 0 || h == 0 {
            return Err(ConfigError::ModelInputZero(w, h));
        }
        if !(0.0..=100.0).contains(&self.confidence_percent) {
            return Err(ConfigError::ConfidenceOutOfRange(self.confidence_percent));
        }
        Ok(())
    }
}
