/// Configuration schemas - all config structures defined once with defaults
///
/// Each struct is defined using the config_struct! macro which provides
/// embedded defaults and serde support.
use crate::config_struct;
use crate::constants::{ DEFAULT_BLOCK_TIME_MS, MAX_DECIMAL_SCALE, SECONDS_PER_YEAR };
use crate::errors::ConfigError;

// ============================================================================
// METRICS CONFIGURATION
// ============================================================================

config_struct! {
    /// Metric computation parameters
    pub struct MetricsConfig {
        /// Compounding periods per year for per-second rates
        seconds_per_year: u64 = SECONDS_PER_YEAR,

        /// Block time used when a per-block record does not carry one
        default_block_time_ms: u64 = DEFAULT_BLOCK_TIME_MS,

        /// Clamp utilization into [0, 1] instead of failing the record
        clamp_utilization: bool = true,
    }
}

// ============================================================================
// BATCH CONFIGURATION
// ============================================================================

config_struct! {
    /// Batch fan-out configuration
    pub struct BatchConfig {
        /// Worker threads for a dedicated pool (0 = rayon global pool)
        worker_threads: usize = 0,
    }
}

// ============================================================================
// OUTPUT CONFIGURATION
// ============================================================================

config_struct! {
    /// Result table presentation
    pub struct OutputConfig {
        /// Decimal places kept when rendering rows
        decimal_places: u32 = 8,

        /// Rendered in place of a ratio the protocol does not define
        absent_sentinel: String = "n/a".to_string(),
    }
}

// ============================================================================
// MAIN CONFIGURATION STRUCTURE
// ============================================================================

config_struct! {
    /// Top-level lendmetrics configuration
    pub struct Config {
        metrics: MetricsConfig = MetricsConfig::default(),
        batch: BatchConfig = BatchConfig::default(),
        output: OutputConfig = OutputConfig::default(),
    }
}

// ============================================================================
// IMPLEMENTATIONS
// ============================================================================

impl Config {
    /// Validate cross-field constraints
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.metrics.seconds_per_year == 0 {
            return Err(invalid("metrics.seconds_per_year", "must be > 0"));
        }

        if self.metrics.default_block_time_ms == 0 {
            return Err(invalid("metrics.default_block_time_ms", "must be > 0"));
        }

        if self.output.decimal_places > MAX_DECIMAL_SCALE {
            return Err(
                invalid(
                    "output.decimal_places",
                    &format!("must be <= {}", MAX_DECIMAL_SCALE)
                )
            );
        }

        if self.output.absent_sentinel.trim().is_empty() {
            return Err(invalid("output.absent_sentinel", "cannot be empty"));
        }

        Ok(())
    }
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidConfig {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.metrics.seconds_per_year, 31_536_000);
        assert_eq!(config.output.absent_sentinel, "n/a");
    }

    #[test]
    fn test_zero_block_time_rejected() {
        let mut config = Config::default();
        config.metrics.default_block_time_ms = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("default_block_time_ms"));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: Config = toml::from_str("[output]\ndecimal_places = 4\n").unwrap();
        assert_eq!(config.output.decimal_places, 4);
        assert_eq!(config.output.absent_sentinel, "n/a");
        assert_eq!(config.metrics, MetricsConfig::default());
    }
}
