//! Run configuration assembled from CLI flags and environment

use std::path::PathBuf;
use log::{debug, error};

/// Environment variable naming the base model
pub const BASE_MODEL_VAR: &str = "BASE_MODEL";
/// Environment variable naming the shift model
pub const SHIFT_MODEL_VAR: &str = "SHIFT_MODEL";

/// Fully validated configuration for one benchmark run
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig
{   /// Model identifier for the baseline
    pub base_model: String
  , /// Model identifier for the variant under test
    pub shift_model: String
  , /// Maximum tokens per generation
    pub max_tokens: u32
  , /// Sampling temperature
    pub temperature: f64
  , /// Path for the CSV report
    pub output_path: PathBuf
}

impl RunConfig
{   /// Validate all inputs once, before any generation happens
    pub fn from_sources(
      base_model: Option<String>
    , shift_model: Option<String>
    , max_tokens: u32
    , temperature: f64
    , output_path: PathBuf
    ) -> Result<Self, crate::error::Error>
    {   debug!("Validating run configuration");

        let base_model = base_model
          .filter(|m| !m.is_empty())
          .ok_or_else(|| {
            error!("{} not set", BASE_MODEL_VAR);
            crate::error::Error::InvalidConfiguration(
              format!("{} must be set", BASE_MODEL_VAR)
            )
          })?;

        let shift_model = shift_model
          .filter(|m| !m.is_empty())
          .ok_or_else(|| {
            error!("{} not set", SHIFT_MODEL_VAR);
            crate::error::Error::InvalidConfiguration(
              format!("{} must be set", SHIFT_MODEL_VAR)
            )
          })?;

        if max_tokens == 0
        {   error!("max_tokens must be positive");
            return Err(crate::error::Error::InvalidConfiguration(
              "max_tokens must be greater than zero".to_string()
            ));
        }

        if !temperature.is_finite() || temperature < 0.0
        {   error!("Invalid temperature: {}", temperature);
            return Err(crate::error::Error::InvalidConfiguration(
              format!("temperature must be >= 0, got {}", temperature)
            ));
        }

        Ok(RunConfig
        {   base_model
          , shift_model
          , max_tokens
          , temperature
          , output_path
        })
    }
}
