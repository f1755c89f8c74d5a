/// Compound v2 adapter
///
/// cToken markets accrue interest once per block. Rates and the collateral
/// factor are 1e18 mantissas; there is no per-market liquidation threshold.
use super::{
    all_fields,
    checked_difference,
    checked_sum,
    optional_field,
    optional_fixed,
    ProtocolAdapter,
};
use crate::arguments::is_debug_metrics_enabled;
use crate::constants::{ COMPOUND_V2, WAD_DECIMALS };
use crate::errors::MetricsResult;
use crate::logger::{ self, LogTag };
use crate::metrics::types::{
    CanonicalField,
    ExtraFields,
    NormalizedFields,
    RateBasis,
    RawFields,
    RawRecord,
};

const CASH: &str = "cash";
const TOTAL_BORROWS: &str = "totalBorrows";
const TOTAL_RESERVES: &str = "totalReserves";
const SUPPLY_RATE_PER_BLOCK: &str = "supplyRatePerBlock";
const BORROW_RATE_PER_BLOCK: &str = "borrowRatePerBlock";
const COLLATERAL_FACTOR_MANTISSA: &str = "collateralFactorMantissa";
const RESERVE_FACTOR_MANTISSA: &str = "reserveFactorMantissa";
const EXCHANGE_RATE: &str = "exchangeRateStored";

pub struct CompoundV2Adapter;

impl CompoundV2Adapter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CompoundV2Adapter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProtocolAdapter for CompoundV2Adapter {
    fn protocol_id(&self) -> &str {
        COMPOUND_V2
    }

    fn field_map(&self, raw_fields: &RawFields) -> MetricsResult<NormalizedFields> {
        let mut fields = NormalizedFields::new();

        let borrows = optional_field(raw_fields, TOTAL_BORROWS)?;
        if let Some(borrows) = borrows {
            fields.insert(CanonicalField::TotalBorrowed, borrows);
        }

        // Supplied liquidity excludes protocol reserves
        if let Some([cash, borrows, reserves]) = all_fields(raw_fields, [
            CASH,
            TOTAL_BORROWS,
            TOTAL_RESERVES,
        ])? {
            let gross = checked_sum(CASH, cash, borrows)?;
            fields.insert(
                CanonicalField::TotalSupplied,
                checked_difference(TOTAL_RESERVES, gross, reserves)?
            );
        }

        if let Some(rate) = optional_fixed(raw_fields, SUPPLY_RATE_PER_BLOCK, WAD_DECIMALS)? {
            fields.insert(CanonicalField::SupplyRate, rate);
        }
        if let Some(rate) = optional_fixed(raw_fields, BORROW_RATE_PER_BLOCK, WAD_DECIMALS)? {
            fields.insert(CanonicalField::BorrowRate, rate);
        }
        if let Some(factor) = optional_fixed(raw_fields, COLLATERAL_FACTOR_MANTISSA, WAD_DECIMALS)? {
            fields.insert(CanonicalField::CollateralFactor, factor);
        }

        if is_debug_metrics_enabled() {
            logger::debug(
                LogTag::Metrics,
                &format!("compound_v2 field map: borrows={:?} mapped={}", borrows, fields.len())
            );
        }

        Ok(fields)
    }

    /// Always per block; the record's block time is kept when it declares one
    fn rate_basis_for(&self, record: &RawRecord) -> RateBasis {
        match record.rate_basis {
            basis @ RateBasis::PerBlock { .. } => basis,
            _ => RateBasis::PerBlock { block_time_ms: 0 },
        }
    }

    fn normalize_extra(&self, raw_fields: &RawFields) -> MetricsResult<ExtraFields> {
        let mut extra = ExtraFields::new();
        if let Some(reserve_factor) = optional_fixed(raw_fields, RESERVE_FACTOR_MANTISSA, WAD_DECIMALS)? {
            extra.insert("reserve_factor".to_string(), reserve_factor);
        }
        if let Some(exchange_rate) = optional_field(raw_fields, EXCHANGE_RATE)? {
            extra.insert("exchange_rate".to_string(), exchange_rate);
        }
        Ok(extra)
    }
}
