/// End-to-end checks: raw JSON records through the batch processor into rows
use lendmetrics::config::Config;
use lendmetrics::errors::{ MetricsError, MetricsResult };
use lendmetrics::metrics::{
    normalize,
    process_batch,
    to_rows,
    AdapterRegistry,
    CanonicalField,
    MetricAssembler,
    NormalizedFields,
    ProtocolAdapter,
    RawFields,
    RawRecord,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;

const RECORDS: &str =
    r#"[
    {
        "protocol_id": "aave_v3",
        "market_id": "0xa0b8-usdc",
        "symbol": "USDC",
        "observed_at": "2024-03-01T12:00:00Z",
        "rate_basis": { "kind": "per_second" },
        "raw_fields": {
            "availableLiquidity": { "value": "600000000000", "exponent": 6 },
            "totalScaledVariableDebt": { "value": "400000000000", "exponent": 6 },
            "variableBorrowIndex": { "value": "1000000000000000000000000000" },
            "liquidityRate": { "value": "50000000000000000000000000", "exponent": 27 },
            "variableBorrowRate": { "value": "70000000000000000000000000", "exponent": 27 },
            "baseLTVasCollateral": { "value": 7700, "exponent": 4 },
            "reserveLiquidationThreshold": { "value": 8000, "exponent": 4 },
            "reserveLiquidationBonus": { "value": 10450, "exponent": 4 }
        }
    },
    {
        "protocol_id": "compound_v2",
        "market_id": "cDAI",
        "symbol": "DAI",
        "observed_at": "2024-03-01T12:00:00Z",
        "rate_basis": { "kind": "per_block", "block_time_ms": 12000 },
        "raw_fields": {
            "cash": { "value": "300000000000000000000000", "exponent": 18 },
            "totalBorrows": { "value": "200000000000000000000000", "exponent": 18 },
            "totalReserves": { "value": "0", "exponent": 18 },
            "supplyRatePerBlock": { "value": "10000000000", "exponent": 18 },
            "borrowRatePerBlock": { "value": "20000000000", "exponent": 18 },
            "collateralFactorMantissa": { "value": "750000000000000000", "exponent": 18 }
        }
    },
    {
        "protocol_id": "fictional_v9",
        "market_id": "anything",
        "observed_at": "2024-03-01T12:00:00Z",
        "rate_basis": { "kind": "per_annum" },
        "raw_fields": {}
    },
    {
        "protocol_id": "compound_v3",
        "market_id": "cUSDCv3",
        "symbol": "USDC",
        "observed_at": "2024-03-01T12:00:00Z",
        "rate_basis": { "kind": "per_second" },
        "raw_fields": {
            "totalSupply": { "value": "500000000000000", "exponent": 6 },
            "supplyRate": { "value": "1000000000", "exponent": 18 },
            "borrowRate": { "value": "1500000000", "exponent": 18 }
        }
    }
]"#;

fn assembler() -> MetricAssembler {
    let config = Config::default();
    MetricAssembler::new(
        Arc::new(AdapterRegistry::with_builtin_adapters(&config.metrics)),
        config.metrics
    )
}

fn parse_records() -> Vec<RawRecord> {
    serde_json::from_str(RECORDS).expect("fixture parses")
}

#[test]
fn test_batch_reports_successes_and_failures() {
    let report = process_batch(&assembler(), &parse_records());

    let assembled: Vec<&str> = report.records
        .iter()
        .map(|r| r.protocol_id.as_str())
        .collect();
    assert_eq!(assembled, vec!["aave_v3", "compound_v2"]);

    assert_eq!(report.failures.len(), 2);
    let compound_v3 = &report.failures[0];
    assert_eq!(compound_v3.protocol_id, "compound_v3");
    assert_eq!(compound_v3.field(), Some("total_borrowed"));
    assert!(matches!(compound_v3.error, MetricsError::IncompleteRawRecord { .. }));

    let unknown = &report.failures[1];
    assert_eq!(unknown.error, MetricsError::UnknownProtocol {
        protocol_id: "fictional_v9".to_string(),
    });
}

#[test]
fn test_aave_metrics() {
    let report = process_batch(&assembler(), &parse_records());
    let aave = &report.records[0];

    assert_eq!(aave.tvl, dec!(1000000));
    assert_eq!(aave.utilization_rate, dec!(0.4));
    assert!((aave.supply_apy - dec!(0.051271096334354555)).abs() < Decimal::new(1, 12));
    assert_eq!(aave.collateral_factor, Some(dec!(0.77)));
    assert_eq!(aave.liquidation_threshold, Some(dec!(0.8)));
    assert_eq!(aave.extra["liquidation_bonus"], dec!(0.045));
    assert!(aave.spread > Decimal::ZERO);
}

#[test]
fn test_rows_distinguish_absent_from_zero() {
    let config = Config::default();
    let report = process_batch(&assembler(), &parse_records());
    let rows = to_rows(&report.records, &config.output);

    let compound = &rows[1];
    assert_eq!(compound.protocol_id, "compound_v2");
    assert_eq!(compound.liquidation_threshold, "n/a");
    assert_eq!(compound.collateral_factor, "0.75");
    assert_eq!(compound.observed_at, "2024-03-01T12:00:00Z");
    assert_eq!(compound.utilization_rate, "0.4");

    let json = serde_json::to_value(compound).unwrap();
    assert_eq!(json["liquidation_threshold"], "n/a");
}

#[test]
fn test_invariants_hold_for_every_record() {
    let report = process_batch(&assembler(), &parse_records());
    for record in &report.records {
        assert!(record.utilization_rate >= Decimal::ZERO);
        assert!(record.utilization_rate <= Decimal::ONE);
        for ratio in [record.collateral_factor, record.liquidation_threshold].into_iter().flatten() {
            assert!((Decimal::ZERO..=Decimal::ONE).contains(&ratio));
        }
        if let (Some(cf), Some(lt)) = (record.collateral_factor, record.liquidation_threshold) {
            assert!(lt >= cf);
        }
    }
}

#[test]
fn test_batch_is_idempotent() {
    let assembler = assembler();
    let records = parse_records();
    let first = process_batch(&assembler, &records);
    let second = process_batch(&assembler, &records);
    assert_eq!(first.records, second.records);
    assert_eq!(first.failures, second.failures);
}

/// A protocol whose raw names are already canonical
struct PassthroughAdapter;

impl ProtocolAdapter for PassthroughAdapter {
    fn protocol_id(&self) -> &str {
        "passthrough"
    }

    fn field_map(&self, raw_fields: &RawFields) -> MetricsResult<NormalizedFields> {
        let mut fields = NormalizedFields::new();
        for field in [
            CanonicalField::TotalSupplied,
            CanonicalField::TotalBorrowed,
            CanonicalField::SupplyRate,
            CanonicalField::BorrowRate,
        ] {
            if let Some(raw) = raw_fields.get(field.as_str()) {
                fields.insert(field, normalize(field.as_str(), raw)?);
            }
        }
        Ok(fields)
    }
}

#[test]
fn test_custom_adapter_without_exponent_is_malformed() {
    let config = Config::default();
    let registry = AdapterRegistry::with_builtin_adapters(&config.metrics);
    registry.register("passthrough", Arc::new(PassthroughAdapter));
    let assembler = MetricAssembler::new(Arc::new(registry), config.metrics);

    let records: Vec<RawRecord> = serde_json
        ::from_str(
            r#"[{
                "protocol_id": "Passthrough",
                "market_id": "m",
                "observed_at": "2024-03-01T00:00:00Z",
                "rate_basis": { "kind": "per_annum" },
                "raw_fields": {
                    "total_supplied": { "value": "100", "exponent": 0 },
                    "total_borrowed": { "value": "25" },
                    "supply_rate": { "value": "3", "exponent": 2 },
                    "borrow_rate": { "value": "6", "exponent": 2 }
                }
            }]"#
        )
        .unwrap();

    let report = process_batch(&assembler, &records);
    assert!(report.records.is_empty());
    assert_eq!(report.failures[0].field(), Some("total_borrowed"));
    assert!(matches!(report.failures[0].error, MetricsError::MalformedRawValue { .. }));
}
