/// Result table rows
///
/// Rows are the presentation boundary: decimals are rounded here and
/// nowhere earlier, and ratios a protocol does not define render as the
/// configured sentinel so they cannot be mistaken for zero.
use super::types::MetricRecord;
use crate::config::OutputConfig;
use chrono::SecondsFormat;
use rust_decimal::{ Decimal, RoundingStrategy };
use serde::{ Deserialize, Serialize };
use std::collections::BTreeMap;

/// Column names in output order
pub const COLUMNS: [&str; 12] = [
    "protocol_id",
    "market_id",
    "observed_at",
    "tvl",
    "utilization_rate",
    "supply_apy",
    "borrow_apy",
    "collateral_factor",
    "liquidation_threshold",
    "symbol",
    "total_borrowed",
    "spread",
];

/// One result table row, every column rendered as text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricRow {
    pub protocol_id: String,
    pub market_id: String,
    pub observed_at: String,
    pub tvl: String,
    pub utilization_rate: String,
    pub supply_apy: String,
    pub borrow_apy: String,
    pub collateral_factor: String,
    pub liquidation_threshold: String,
    pub symbol: String,
    pub total_borrowed: String,
    pub spread: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

impl MetricRow {
    pub fn from_record(record: &MetricRecord, output: &OutputConfig) -> Self {
        let number = |value: Decimal| render(value, output.decimal_places);
        let optional = |value: Option<Decimal>| {
            value.map(number).unwrap_or_else(|| output.absent_sentinel.clone())
        };

        Self {
            protocol_id: record.protocol_id.clone(),
            market_id: record.market_id.clone(),
            observed_at: record.observed_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            tvl: number(record.tvl),
            utilization_rate: number(record.utilization_rate),
            supply_apy: number(record.supply_apy),
            borrow_apy: number(record.borrow_apy),
            collateral_factor: optional(record.collateral_factor),
            liquidation_threshold: optional(record.liquidation_threshold),
            symbol: record.symbol.clone().unwrap_or_else(|| output.absent_sentinel.clone()),
            total_borrowed: number(record.total_borrowed),
            spread: number(record.spread),
            extra: record.extra
                .iter()
                .map(|(name, value)| (name.clone(), number(*value)))
                .collect(),
        }
    }

    /// Column values in `COLUMNS` order
    pub fn values(&self) -> [&str; 12] {
        [
            self.protocol_id.as_str(),
            self.market_id.as_str(),
            self.observed_at.as_str(),
            self.tvl.as_str(),
            self.utilization_rate.as_str(),
            self.supply_apy.as_str(),
            self.borrow_apy.as_str(),
            self.collateral_factor.as_str(),
            self.liquidation_threshold.as_str(),
            self.symbol.as_str(),
            self.total_borrowed.as_str(),
            self.spread.as_str(),
        ]
    }
}

/// Build rows for a slice of records, keeping their order
pub fn to_rows(records: &[MetricRecord], output: &OutputConfig) -> Vec<MetricRow> {
    records
        .iter()
        .map(|record| MetricRow::from_record(record, output))
        .collect()
}

/// Round half-even and drop trailing zeros
fn render(value: Decimal, decimal_places: u32) -> String {
    value
        .round_dp_with_strategy(decimal_places, RoundingStrategy::MidpointNearestEven)
        .normalize()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::types::ExtraFields;
    use rust_decimal_macros::dec;

    fn record() -> MetricRecord {
        MetricRecord {
            protocol_id: "compound_v2".to_string(),
            market_id: "cUSDC".to_string(),
            symbol: Some("USDC".to_string()),
            observed_at: chrono::DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
            tvl: dec!(1250000.123456789),
            total_supplied: dec!(1250000.123456789),
            total_borrowed: dec!(0),
            utilization_rate: dec!(0),
            supply_apy: dec!(0.0512710963343545),
            borrow_apy: dec!(0.080000000050),
            spread: dec!(0.0287289037156455),
            collateral_factor: Some(dec!(0.75)),
            liquidation_threshold: None,
            extra: ExtraFields::from([("reserve_factor".to_string(), dec!(0.15))]),
        }
    }

    #[test]
    fn test_absent_ratio_is_sentinel_not_zero() {
        let row = MetricRow::from_record(&record(), &OutputConfig::default());
        assert_eq!(row.liquidation_threshold, "n/a");
        assert_eq!(row.utilization_rate, "0");
        assert_ne!(row.liquidation_threshold, row.utilization_rate);
        assert_eq!(row.collateral_factor, "0.75");
    }

    #[test]
    fn test_rounding_half_even() {
        let row = MetricRow::from_record(&record(), &OutputConfig::default());
        assert_eq!(row.tvl, "1250000.12345679");
        assert_eq!(row.supply_apy, "0.0512711");
        assert_eq!(row.borrow_apy, "0.08");

        let output = OutputConfig {
            decimal_places: 2,
            ..OutputConfig::default()
        };
        let mut tie = record();
        tie.tvl = dec!(0.125);
        tie.spread = dec!(0.135);
        let row = MetricRow::from_record(&tie, &output);
        assert_eq!(row.tvl, "0.12");
        assert_eq!(row.spread, "0.14");
    }

    #[test]
    fn test_timestamp_and_columns() {
        let row = MetricRow::from_record(&record(), &OutputConfig::default());
        assert_eq!(row.observed_at, "2023-11-14T22:13:20Z");
        assert_eq!(row.values().len(), COLUMNS.len());
        assert_eq!(row.values()[9], "USDC");
        assert_eq!(row.extra["reserve_factor"], "0.15");
    }

    #[test]
    fn test_custom_sentinel() {
        let output = OutputConfig {
            absent_sentinel: "-".to_string(),
            ..OutputConfig::default()
        };
        let mut unnamed = record();
        unnamed.symbol = None;
        let row = MetricRow::from_record(&unnamed, &output);
        assert_eq!(row.liquidation_threshold, "-");
        assert_eq!(row.symbol, "-");
    }
}
