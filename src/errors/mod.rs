/// Structured error handling for lendmetrics
///
/// Every failure inside the metric core is local to one raw record. The batch
/// processor wraps them in `RecordFailure` so callers get protocol, market and
/// field context without re-deriving it.
use rust_decimal::Decimal;
use thiserror::Error;

// =============================================================================
// METRIC ERRORS
// =============================================================================

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MetricsError {
    #[error("Malformed raw value for '{field}' ({value}): {reason}")] MalformedRawValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Invalid compounding frequency: {periods} periods per year (must be > 0)")]
    InvalidCompoundingFrequency {
        periods: i64,
    },

    #[error("Unknown protocol: no adapter registered for '{protocol_id}'")] UnknownProtocol {
        protocol_id: String,
    },

    #[error(
        "Incomplete raw record for {protocol_id}/{market_id}: required field '{field}' is missing"
    )]
    IncompleteRawRecord {
        protocol_id: String,
        market_id: String,
        field: String,
    },

    #[error("Invalid ratio for '{field}' ({value}): {reason}")] InvalidRatio {
        field: String,
        value: Decimal,
        reason: String,
    },

    #[error("Rate overflow: (1 + {rate})^{periods} exceeds decimal range")] RateOverflow {
        rate: Decimal,
        periods: i64,
    },
}

impl MetricsError {
    pub fn malformed(field: &str, value: &str, reason: impl Into<String>) -> Self {
        MetricsError::MalformedRawValue {
            field: field.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    /// Name of the raw or canonical field the error points at, if any
    pub fn field(&self) -> Option<&str> {
        match self {
            MetricsError::MalformedRawValue { field, .. } => Some(field),
            MetricsError::IncompleteRawRecord { field, .. } => Some(field),
            MetricsError::InvalidRatio { field, .. } => Some(field),
            _ => None,
        }
    }

    /// Short machine-friendly kind label for logs and reports
    pub fn kind(&self) -> &'static str {
        match self {
            MetricsError::MalformedRawValue { .. } => "malformed_raw_value",
            MetricsError::InvalidCompoundingFrequency { .. } => "invalid_compounding_frequency",
            MetricsError::UnknownProtocol { .. } => "unknown_protocol",
            MetricsError::IncompleteRawRecord { .. } => "incomplete_raw_record",
            MetricsError::InvalidRatio { .. } => "invalid_ratio",
            MetricsError::RateOverflow { .. } => "rate_overflow",
        }
    }
}

pub type MetricsResult<T> = std::result::Result<T, MetricsError>;

// =============================================================================
// PER-RECORD FAILURE
// =============================================================================

/// A failed record, reported alongside the successful ones in a batch
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{protocol_id}/{market_id}: {error}")]
pub struct RecordFailure {
    pub protocol_id: String,
    pub market_id: String,
    #[source]
    pub error: MetricsError,
}

impl RecordFailure {
    pub fn new(protocol_id: &str, market_id: &str, error: MetricsError) -> Self {
        Self {
            protocol_id: protocol_id.to_string(),
            market_id: market_id.to_string(),
            error,
        }
    }

    pub fn field(&self) -> Option<&str> {
        self.error.field()
    }
}

// =============================================================================
// CONFIGURATION ERRORS
// =============================================================================

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")] Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")] Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid config field '{field}': {reason}")] InvalidConfig {
        field: String,
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_context_is_exposed() {
        let err = MetricsError::IncompleteRawRecord {
            protocol_id: "aave_v3".to_string(),
            market_id: "USDC".to_string(),
            field: "total_borrowed".to_string(),
        };
        assert_eq!(err.field(), Some("total_borrowed"));
        assert_eq!(err.kind(), "incomplete_raw_record");

        let failure = RecordFailure::new("aave_v3", "USDC", err);
        let message = failure.to_string();
        assert!(message.contains("aave_v3/USDC"));
        assert!(message.contains("total_borrowed"));
    }

    #[test]
    fn test_unknown_protocol_has_no_field() {
        let err = MetricsError::UnknownProtocol {
            protocol_id: "fictional_v9".to_string(),
        };
        assert_eq!(err.field(), None);
        assert!(err.to_string().contains("fictional_v9"));
    }
}
