/// Aave v3 adapter
///
/// Handles reserves in the UiPoolDataProvider `AggregatedReserveData` layout.
/// Rates are annual APRs in ray that accrue per second; LTV, liquidation
/// threshold, bonus and reserve factor are basis points.
use super::{ checked_sum, optional_field, optional_fixed, ProtocolAdapter };
use crate::arguments::is_debug_metrics_enabled;
use crate::constants::{ AAVE_V3, BPS_DECIMALS, RAY_DECIMALS };
use crate::errors::{ MetricsError, MetricsResult };
use crate::logger::{ self, LogTag };
use crate::metrics::types::{
    CanonicalField,
    ExtraFields,
    NormalizedFields,
    RateBasis,
    RawFields,
    RawRecord,
};
use rust_decimal::Decimal;

// Raw field names
const AVAILABLE_LIQUIDITY: &str = "availableLiquidity";
const TOTAL_SCALED_VARIABLE_DEBT: &str = "totalScaledVariableDebt";
const VARIABLE_BORROW_INDEX: &str = "variableBorrowIndex";
const TOTAL_PRINCIPAL_STABLE_DEBT: &str = "totalPrincipalStableDebt";
const LIQUIDITY_RATE: &str = "liquidityRate";
const VARIABLE_BORROW_RATE: &str = "variableBorrowRate";
const BASE_LTV_AS_COLLATERAL: &str = "baseLTVasCollateral";
const RESERVE_LIQUIDATION_THRESHOLD: &str = "reserveLiquidationThreshold";
const RESERVE_LIQUIDATION_BONUS: &str = "reserveLiquidationBonus";
const RESERVE_FACTOR: &str = "reserveFactor";
const SUPPLY_CAP: &str = "supplyCap";
const BORROW_CAP: &str = "borrowCap";

pub struct AaveV3Adapter {
    seconds_per_year: u64,
}

impl AaveV3Adapter {
    pub fn new(seconds_per_year: u64) -> Self {
        Self { seconds_per_year }
    }

    /// Annual ray APR to the per-second rate the reserve accrues at
    fn per_second(&self, field: &str, apr: Decimal) -> MetricsResult<Decimal> {
        if self.seconds_per_year == 0 {
            return Err(MetricsError::InvalidCompoundingFrequency { periods: 0 });
        }
        apr.checked_div(Decimal::from(self.seconds_per_year)).ok_or_else(||
            MetricsError::malformed(field, &apr.to_string(), "rate division overflow")
        )
    }

    /// Outstanding debt: scaled variable debt times the borrow index, plus any
    /// legacy stable debt
    fn total_borrowed(&self, raw_fields: &RawFields) -> MetricsResult<Option<Decimal>> {
        let Some(scaled_debt) = optional_field(raw_fields, TOTAL_SCALED_VARIABLE_DEBT)? else {
            return Ok(None);
        };
        let Some(index) = optional_fixed(raw_fields, VARIABLE_BORROW_INDEX, RAY_DECIMALS)? else {
            return Ok(None);
        };

        let variable_debt = scaled_debt
            .checked_mul(index)
            .ok_or_else(||
                MetricsError::malformed(
                    TOTAL_SCALED_VARIABLE_DEBT,
                    &scaled_debt.to_string(),
                    "debt times borrow index overflows"
                )
            )?;

        let stable_debt = optional_field(raw_fields, TOTAL_PRINCIPAL_STABLE_DEBT)?.unwrap_or(
            Decimal::ZERO
        );

        checked_sum(TOTAL_PRINCIPAL_STABLE_DEBT, variable_debt, stable_debt).map(Some)
    }
}

impl ProtocolAdapter for AaveV3Adapter {
    fn protocol_id(&self) -> &str {
        AAVE_V3
    }

    fn field_map(&self, raw_fields: &RawFields) -> MetricsResult<NormalizedFields> {
        let mut fields = NormalizedFields::new();

        let borrowed = self.total_borrowed(raw_fields)?;
        let available = optional_field(raw_fields, AVAILABLE_LIQUIDITY)?;

        if let Some(borrowed) = borrowed {
            fields.insert(CanonicalField::TotalBorrowed, borrowed);
            if let Some(available) = available {
                fields.insert(
                    CanonicalField::TotalSupplied,
                    checked_sum(AVAILABLE_LIQUIDITY, available, borrowed)?
                );
            }
        }

        if let Some(apr) = optional_fixed(raw_fields, LIQUIDITY_RATE, RAY_DECIMALS)? {
            fields.insert(CanonicalField::SupplyRate, self.per_second(LIQUIDITY_RATE, apr)?);
        }
        if let Some(apr) = optional_fixed(raw_fields, VARIABLE_BORROW_RATE, RAY_DECIMALS)? {
            fields.insert(CanonicalField::BorrowRate, self.per_second(VARIABLE_BORROW_RATE, apr)?);
        }

        if let Some(ltv) = optional_fixed(raw_fields, BASE_LTV_AS_COLLATERAL, BPS_DECIMALS)? {
            fields.insert(CanonicalField::CollateralFactor, ltv);
        }
        if let Some(threshold) = optional_fixed(raw_fields, RESERVE_LIQUIDATION_THRESHOLD, BPS_DECIMALS)? {
            fields.insert(CanonicalField::LiquidationThreshold, threshold);
        }

        if is_debug_metrics_enabled() {
            logger::debug(
                LogTag::Metrics,
                &format!(
                    "aave_v3 field map: available={:?} borrowed={:?} mapped={}",
                    available,
                    borrowed,
                    fields.len()
                )
            );
        }

        Ok(fields)
    }

    fn rate_basis_for(&self, _record: &RawRecord) -> RateBasis {
        RateBasis::PerSecond
    }

    fn normalize_extra(&self, raw_fields: &RawFields) -> MetricsResult<ExtraFields> {
        let mut extra = ExtraFields::new();

        // Stored as 1 + bonus; zero when the asset is not collateral
        if let Some(bonus) = optional_fixed(raw_fields, RESERVE_LIQUIDATION_BONUS, BPS_DECIMALS)? {
            if bonus > Decimal::ONE {
                extra.insert("liquidation_bonus".to_string(), bonus - Decimal::ONE);
            }
        }

        if let Some(reserve_factor) = optional_fixed(raw_fields, RESERVE_FACTOR, BPS_DECIMALS)? {
            extra.insert("reserve_factor".to_string(), reserve_factor);
        }

        // A zero cap means uncapped
        for (raw_name, name) in [
            (SUPPLY_CAP, "supply_cap"),
            (BORROW_CAP, "borrow_cap"),
        ] {
            if let Some(cap) = optional_field(raw_fields, raw_name)? {
                if !cap.is_zero() {
                    extra.insert(name.to_string(), cap);
                }
            }
        }

        Ok(extra)
    }
}
