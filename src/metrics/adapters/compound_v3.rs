/// Compound v3 (Comet) adapter
///
/// One Comet deployment is one base-asset market. Supply and borrow rates are
/// per-second 1e18 mantissas. Collateral factors belong to individual
/// collateral assets, so they are only mapped when the record carries them.
use super::{ optional_field, optional_fixed, ProtocolAdapter };
use crate::constants::{ COMPOUND_V3, WAD_DECIMALS };
use crate::errors::MetricsResult;
use crate::metrics::types::{
    CanonicalField,
    ExtraFields,
    NormalizedFields,
    RateBasis,
    RawFields,
    RawRecord,
};

const TOTAL_SUPPLY: &str = "totalSupply";
const TOTAL_BORROW: &str = "totalBorrow";
const SUPPLY_RATE: &str = "supplyRate";
const BORROW_RATE: &str = "borrowRate";
const BORROW_COLLATERAL_FACTOR: &str = "borrowCollateralFactor";
const LIQUIDATE_COLLATERAL_FACTOR: &str = "liquidateCollateralFactor";
const RESERVES: &str = "reserves";

// Amounts carry the base asset's decimals
const AMOUNT_FIELDS: [(&str, CanonicalField); 2] = [
    (TOTAL_SUPPLY, CanonicalField::TotalSupplied),
    (TOTAL_BORROW, CanonicalField::TotalBorrowed),
];

// Always 1e18 mantissas
const WAD_FIELDS: [(&str, CanonicalField); 4] = [
    (SUPPLY_RATE, CanonicalField::SupplyRate),
    (BORROW_RATE, CanonicalField::BorrowRate),
    (BORROW_COLLATERAL_FACTOR, CanonicalField::CollateralFactor),
    (LIQUIDATE_COLLATERAL_FACTOR, CanonicalField::LiquidationThreshold),
];

pub struct CompoundV3Adapter;

impl CompoundV3Adapter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CompoundV3Adapter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProtocolAdapter for CompoundV3Adapter {
    fn protocol_id(&self) -> &str {
        COMPOUND_V3
    }

    fn field_map(&self, raw_fields: &RawFields) -> MetricsResult<NormalizedFields> {
        let mut fields = NormalizedFields::new();
        for (raw_name, canonical) in AMOUNT_FIELDS {
            if let Some(value) = optional_field(raw_fields, raw_name)? {
                fields.insert(canonical, value);
            }
        }
        for (raw_name, canonical) in WAD_FIELDS {
            if let Some(value) = optional_fixed(raw_fields, raw_name, WAD_DECIMALS)? {
                fields.insert(canonical, value);
            }
        }
        Ok(fields)
    }

    fn rate_basis_for(&self, _record: &RawRecord) -> RateBasis {
        RateBasis::PerSecond
    }

    fn normalize_extra(&self, raw_fields: &RawFields) -> MetricsResult<ExtraFields> {
        let mut extra = ExtraFields::new();
        // Signed: Comet reports negative reserves when it is insolvent
        if let Some(reserves) = optional_field(raw_fields, RESERVES)? {
            extra.insert("reserves".to_string(), reserves);
        }
        Ok(extra)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::MetricsError;
    use crate::metrics::adapters::test_support::raw_fields;
    use crate::metrics::types::RawValue;
    use rust_decimal_macros::dec;

    fn usdc_comet() -> RawFields {
        raw_fields(
            &[
                (TOTAL_SUPPLY, "500000000000000", 6),
                (TOTAL_BORROW, "350000000000000", 6),
                (SUPPLY_RATE, "1000000000", 18),
                (BORROW_RATE, "1500000000", 18),
                (RESERVES, "-2500000", 6),
            ]
        )
    }

    #[test]
    fn test_base_market_amounts_and_rates() {
        let fields = CompoundV3Adapter::new().field_map(&usdc_comet()).unwrap();
        assert_eq!(fields[&CanonicalField::TotalSupplied], dec!(500000000));
        assert_eq!(fields[&CanonicalField::TotalBorrowed], dec!(350000000));
        assert_eq!(fields[&CanonicalField::SupplyRate], dec!(0.000000001));
        assert_eq!(fields[&CanonicalField::BorrowRate], dec!(0.0000000015));
    }

    #[test]
    fn test_collateral_factors_only_when_present() {
        let adapter = CompoundV3Adapter::new();
        let fields = adapter.field_map(&usdc_comet()).unwrap();
        assert!(!fields.contains_key(&CanonicalField::CollateralFactor));
        assert!(!fields.contains_key(&CanonicalField::LiquidationThreshold));

        let mut raw = usdc_comet();
        raw.extend(
            raw_fields(
                &[
                    (BORROW_COLLATERAL_FACTOR, "830000000000000000", 18),
                    (LIQUIDATE_COLLATERAL_FACTOR, "900000000000000000", 18),
                ]
            )
        );
        let fields = adapter.field_map(&raw).unwrap();
        assert_eq!(fields[&CanonicalField::CollateralFactor], dec!(0.83));
        assert_eq!(fields[&CanonicalField::LiquidationThreshold], dec!(0.9));
    }

    #[test]
    fn test_mantissas_have_fixed_scale() {
        let adapter = CompoundV3Adapter::new();
        let mut raw = usdc_comet();
        raw.insert(SUPPLY_RATE.to_string(), RawValue {
            value: "1000000000".to_string(),
            exponent: None,
        });
        let fields = adapter.field_map(&raw).unwrap();
        assert_eq!(fields[&CanonicalField::SupplyRate], dec!(0.000000001));

        raw.extend(raw_fields(&[(BORROW_COLLATERAL_FACTOR, "83", 2)]));
        let err = adapter.field_map(&raw).unwrap_err();
        assert!(matches!(err, MetricsError::MalformedRawValue { .. }));
        assert_eq!(err.field(), Some(BORROW_COLLATERAL_FACTOR));
    }

    #[test]
    fn test_negative_reserves_kept() {
        let extra = CompoundV3Adapter::new().normalize_extra(&usdc_comet()).unwrap();
        assert_eq!(extra["reserves"], dec!(-2.5));
    }
}
