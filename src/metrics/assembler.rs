/// Metric assembler: one raw record in, one metric record (or failure) out
///
/// Resolves the record's adapter, maps raw fields onto canonical fields,
/// annualizes rates and derives utilization and spread. Assembly reads
/// nothing but the record and the registry, so the same input always yields
/// the same output.
use super::compounder::annualize;
use super::registry::AdapterRegistry;
use super::types::{ CanonicalField, MetricRecord, NormalizedFields, RawRecord };
use crate::arguments::is_debug_metrics_enabled;
use crate::config::MetricsConfig;
use crate::errors::{ MetricsError, MetricsResult, RecordFailure };
use crate::logger::{ self, LogTag };
use rust_decimal::Decimal;
use std::sync::Arc;

pub struct MetricAssembler {
    registry: Arc<AdapterRegistry>,
    config: MetricsConfig,
}

impl MetricAssembler {
    pub fn new(registry: Arc<AdapterRegistry>, config: MetricsConfig) -> Self {
        Self { registry, config }
    }

    /// Assemble the metric record for one raw record
    pub fn assemble(&self, record: &RawRecord) -> Result<MetricRecord, RecordFailure> {
        self.try_assemble(record).map_err(|error| {
            if is_debug_metrics_enabled() {
                logger::debug(
                    LogTag::Metrics,
                    &format!(
                        "{}/{} rejected ({}): {}",
                        record.protocol_id,
                        record.market_id,
                        error.kind(),
                        error
                    )
                );
            }
            RecordFailure::new(&record.protocol_id, &record.market_id, error)
        })
    }

    fn try_assemble(&self, record: &RawRecord) -> MetricsResult<MetricRecord> {
        let adapter = self.registry.resolve(&record.protocol_id)?;
        let fields = adapter.field_map(&record.raw_fields)?;

        let [total_borrowed, total_supplied, supply_rate, borrow_rate] = required_fields(
            record,
            &fields
        )?;

        let basis = adapter.rate_basis_for(record);
        let supply_apy = annualize(
            supply_rate,
            &basis,
            self.config.seconds_per_year,
            self.config.default_block_time_ms
        )?;
        let borrow_apy = annualize(
            borrow_rate,
            &basis,
            self.config.seconds_per_year,
            self.config.default_block_time_ms
        )?;

        let utilization_rate = self.utilization(record, total_supplied, total_borrowed)?;

        let collateral_factor = ratio(&fields, CanonicalField::CollateralFactor)?;
        let liquidation_threshold = ratio(&fields, CanonicalField::LiquidationThreshold)?;
        if let (Some(cf), Some(lt)) = (collateral_factor, liquidation_threshold) {
            if lt < cf {
                return Err(MetricsError::InvalidRatio {
                    field: CanonicalField::LiquidationThreshold.to_string(),
                    value: lt,
                    reason: format!("below collateral factor {}", cf),
                });
            }
        }

        let extra = adapter.normalize_extra(&record.raw_fields)?;

        if is_debug_metrics_enabled() {
            logger::debug(
                LogTag::Metrics,
                &format!(
                    "{}/{} basis={} supplied={} borrowed={} supply_apy={} borrow_apy={}",
                    record.protocol_id,
                    record.market_id,
                    basis,
                    total_supplied,
                    total_borrowed,
                    supply_apy,
                    borrow_apy
                )
            );
        }

        let spread = borrow_apy
            .checked_sub(supply_apy)
            .ok_or_else(||
                MetricsError::malformed("spread", &borrow_apy.to_string(), "borrow minus supply APY overflows")
            )?;

        Ok(MetricRecord {
            protocol_id: record.protocol_id.clone(),
            market_id: record.market_id.clone(),
            symbol: record.symbol.clone(),
            observed_at: record.observed_at,
            tvl: total_supplied,
            total_supplied,
            total_borrowed,
            utilization_rate,
            supply_apy,
            borrow_apy,
            spread,
            collateral_factor,
            liquidation_threshold,
            extra,
        })
    }

    /// Borrowed over supplied, exactly zero for an empty market
    fn utilization(
        &self,
        record: &RawRecord,
        supplied: Decimal,
        borrowed: Decimal
    ) -> MetricsResult<Decimal> {
        if supplied <= Decimal::ZERO {
            return Ok(Decimal::ZERO);
        }

        let raw = borrowed
            .checked_div(supplied)
            .ok_or_else(||
                MetricsError::malformed(
                    CanonicalField::TotalBorrowed.as_str(),
                    &borrowed.to_string(),
                    "utilization division overflow"
                )
            )?;

        if (Decimal::ZERO..=Decimal::ONE).contains(&raw) {
            return Ok(raw);
        }

        if !self.config.clamp_utilization {
            return Err(MetricsError::InvalidRatio {
                field: "utilization_rate".to_string(),
                value: raw,
                reason: "outside [0, 1]".to_string(),
            });
        }

        let clamped = raw.clamp(Decimal::ZERO, Decimal::ONE);
        logger::warning(
            LogTag::Metrics,
            &format!(
                "{}/{} utilization {} clamped to {}",
                record.protocol_id,
                record.market_id,
                raw,
                clamped
            )
        );
        Ok(clamped)
    }
}

/// Borrowed, supplied, supply rate and borrow rate, in that order
fn required_fields(record: &RawRecord, fields: &NormalizedFields) -> MetricsResult<[Decimal; 4]> {
    let mut values = [Decimal::ZERO; 4];
    for (slot, field) in values.iter_mut().zip(CanonicalField::REQUIRED) {
        *slot = *fields.get(&field).ok_or_else(|| MetricsError::IncompleteRawRecord {
            protocol_id: record.protocol_id.clone(),
            market_id: record.market_id.clone(),
            field: field.to_string(),
        })?;
    }
    Ok(values)
}

/// An optional ratio, which must lie in [0, 1] when present
fn ratio(fields: &NormalizedFields, field: CanonicalField) -> MetricsResult<Option<Decimal>> {
    match fields.get(&field) {
        None => Ok(None),
        Some(value) if (Decimal::ZERO..=Decimal::ONE).contains(value) => Ok(Some(*value)),
        Some(value) =>
            Err(MetricsError::InvalidRatio {
                field: field.to_string(),
                value: *value,
                reason: "outside [0, 1]".to_string(),
            }),
    }
}
