use chrono::{ DateTime, Utc };
use rust_decimal::Decimal;
use serde::{ Deserialize, Serialize };
use std::collections::BTreeMap;

// =============================================================================
// RATE BASIS
// =============================================================================

/// Period at which a protocol accrues its nominal rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RateBasis {
    PerSecond,
    PerBlock {
        /// Block time in milliseconds (0 = use the configured default)
        #[serde(default)]
        block_time_ms: u64,
    },
    PerAnnum,
}

impl std::fmt::Display for RateBasis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RateBasis::PerSecond => write!(f, "per_second"),
            RateBasis::PerBlock { block_time_ms } => write!(f, "per_block({}ms)", block_time_ms),
            RateBasis::PerAnnum => write!(f, "per_annum"),
        }
    }
}

// =============================================================================
// RAW INPUT
// =============================================================================

/// A raw on-chain integer and the decimal exponent it is scaled by
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawValue {
    #[serde(deserialize_with = "string_or_number")]
    pub value: String,
    #[serde(default)]
    pub exponent: Option<i64>,
}

impl RawValue {
    pub fn new(value: impl Into<String>, exponent: i64) -> Self {
        Self {
            value: value.into(),
            exponent: Some(exponent),
        }
    }
}

/// Deserialize a value that could be either a string or a number into a String
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
    where D: serde::Deserializer<'de>
{
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!("expected string or number, got {}", other))),
    }
}

pub type RawFields = BTreeMap<String, RawValue>;

/// Protocol-native snapshot of one market at one point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub protocol_id: String,
    pub market_id: String,
    pub observed_at: DateTime<Utc>,
    #[serde(default)]
    pub symbol: Option<String>,
    pub raw_fields: RawFields,
    pub rate_basis: RateBasis,
}

impl RawRecord {
    pub fn raw(&self, field: &str) -> Option<&RawValue> {
        self.raw_fields.get(field)
    }
}

// =============================================================================
// CANONICAL FIELDS
// =============================================================================

/// Protocol-agnostic field names every adapter maps into
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalField {
    TotalSupplied,
    TotalBorrowed,
    SupplyRate,
    BorrowRate,
    CollateralFactor,
    LiquidationThreshold,
}

impl CanonicalField {
    /// Fields without which no metric record can be produced
    ///
    /// Borrowed comes first: adapters derive supplied liquidity from it, so a
    /// missing debt figure is reported as the root cause.
    pub const REQUIRED: [CanonicalField; 4] = [
        CanonicalField::TotalBorrowed,
        CanonicalField::TotalSupplied,
        CanonicalField::SupplyRate,
        CanonicalField::BorrowRate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CanonicalField::TotalSupplied => "total_supplied",
            CanonicalField::TotalBorrowed => "total_borrowed",
            CanonicalField::SupplyRate => "supply_rate",
            CanonicalField::BorrowRate => "borrow_rate",
            CanonicalField::CollateralFactor => "collateral_factor",
            CanonicalField::LiquidationThreshold => "liquidation_threshold",
        }
    }
}

impl std::fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Canonical fields in human-readable units; lives for one computation pass
pub type NormalizedFields = BTreeMap<CanonicalField, Decimal>;

/// Protocol-specific optional values (liquidation bonus, caps, ...)
pub type ExtraFields = BTreeMap<String, Decimal>;

// =============================================================================
// OUTPUT
// =============================================================================

/// Normalized per-market metrics
///
/// Ratios the protocol does not define are `None`, never `0`: a zero
/// liquidation threshold would read as "no risk" downstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricRecord {
    pub protocol_id: String,
    pub market_id: String,
    pub symbol: Option<String>,
    pub observed_at: DateTime<Utc>,
    pub tvl: Decimal,
    pub total_supplied: Decimal,
    pub total_borrowed: Decimal,
    pub utilization_rate: Decimal,
    pub supply_apy: Decimal,
    pub borrow_apy: Decimal,
    pub spread: Decimal,
    pub collateral_factor: Option<Decimal>,
    pub liquidation_threshold: Option<Decimal>,
    pub extra: ExtraFields,
}

impl MetricRecord {
    /// Ordering key for deterministic output
    pub fn sort_key(&self) -> (&str, &str, DateTime<Utc>) {
        (&self.protocol_id, &self.market_id, self.observed_at)
    }
}
