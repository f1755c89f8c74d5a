/// Global constants used across lendmetrics
///
/// This module contains fixed-point scales and calendar constants that are
/// not configurable and are shared by the normalizer and the adapters.

// ============================================================================
// FIXED-POINT SCALES (decimal exponents)
// ============================================================================

/// Ray precision (1e27), used by Aave for rates and indexes
pub const RAY_DECIMALS: u32 = 27;

/// Wad precision (1e18), used by Compound mantissas
pub const WAD_DECIMALS: u32 = 18;

/// Basis points precision (1e4), used by Aave risk parameters
pub const BPS_DECIMALS: u32 = 4;

/// Largest scale a `rust_decimal::Decimal` can carry
pub const MAX_DECIMAL_SCALE: u32 = 28;

// ============================================================================
// CALENDAR
// ============================================================================

/// Seconds in a 365-day year
pub const SECONDS_PER_YEAR: u64 = 31_536_000;

/// Ethereum mainnet slot time after the merge
pub const DEFAULT_BLOCK_TIME_MS: u64 = 12_000;

// ============================================================================
// PROTOCOL IDENTIFIERS
// ============================================================================

pub const AAVE_V3: &str = "aave_v3";
pub const COMPOUND_V2: &str = "compound_v2";
pub const COMPOUND_V3: &str = "compound_v3";
