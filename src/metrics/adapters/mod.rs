/// Protocol adapters for lending markets
///
/// Each adapter knows one protocol's raw field layout and maps it into the
/// canonical field set. Adapters hold no mutable state and are shared across
/// worker threads behind an `Arc`.

pub mod aave_v3;
pub mod compound_v2;
pub mod compound_v3;

pub use aave_v3::AaveV3Adapter;
pub use compound_v2::CompoundV2Adapter;
pub use compound_v3::CompoundV3Adapter;

use super::normalizer::{ normalize, normalize_scaled };
use super::types::{ ExtraFields, NormalizedFields, RateBasis, RawFields, RawRecord };
use crate::errors::{ MetricsError, MetricsResult };
use rust_decimal::Decimal;

/// Maps a protocol's raw record layout onto canonical fields
pub trait ProtocolAdapter: Send + Sync {
    /// Identifier records use to select this adapter
    fn protocol_id(&self) -> &str;

    /// Map raw fields into canonical fields
    ///
    /// Required canonical fields whose raw sources are missing are left out;
    /// the assembler reports them. Rates are per-period nominal rates matching
    /// `rate_basis_for`.
    fn field_map(&self, raw_fields: &RawFields) -> MetricsResult<NormalizedFields>;

    /// Compounding basis for this record's rates
    fn rate_basis_for(&self, record: &RawRecord) -> RateBasis {
        record.rate_basis
    }

    /// Protocol-specific optional values
    fn normalize_extra(&self, _raw_fields: &RawFields) -> MetricsResult<ExtraFields> {
        Ok(ExtraFields::new())
    }
}

// =============================================================================
// SHARED HELPERS
// =============================================================================

/// Normalize a raw field when present
pub(crate) fn optional_field(raw_fields: &RawFields, name: &str) -> MetricsResult<Option<Decimal>> {
    raw_fields
        .get(name)
        .map(|raw| normalize(name, raw))
        .transpose()
}

/// Normalize a raw field whose scale is fixed by the protocol layout
///
/// The exponent may be omitted from the record; one that disagrees with the
/// layout is rejected.
pub(crate) fn optional_fixed(
    raw_fields: &RawFields,
    name: &str,
    decimals: u32
) -> MetricsResult<Option<Decimal>> {
    let Some(raw) = raw_fields.get(name) else {
        return Ok(None);
    };
    if let Some(exponent) = raw.exponent {
        if exponent != (decimals as i64) {
            return Err(
                MetricsError::malformed(
                    name,
                    &raw.value,
                    format!("exponent {} does not match fixed scale {}", exponent, decimals)
                )
            );
        }
    }
    normalize_scaled(name, &raw.value, decimals).map(Some)
}

/// Normalize all named raw fields, or `None` if any is missing
///
/// A malformed value is an error even when another field is missing.
pub(crate) fn all_fields<const N: usize>(
    raw_fields: &RawFields,
    names: [&str; N]
) -> MetricsResult<Option<[Decimal; N]>> {
    let mut values = [Decimal::ZERO; N];
    let mut complete = true;

    for (slot, name) in values.iter_mut().zip(names) {
        match optional_field(raw_fields, name)? {
            Some(value) => {
                *slot = value;
            }
            None => {
                complete = false;
            }
        }
    }

    Ok(if complete { Some(values) } else { None })
}

/// `a + b`, or a malformed error naming `field` when the sum leaves range
pub(crate) fn checked_sum(field: &str, a: Decimal, b: Decimal) -> MetricsResult<Decimal> {
    a.checked_add(b).ok_or_else(|| MetricsError::malformed(field, &a.to_string(), "sum overflows"))
}

/// `a - b`, or a malformed error naming `field` when the difference leaves range
pub(crate) fn checked_difference(field: &str, a: Decimal, b: Decimal) -> MetricsResult<Decimal> {
    a.checked_sub(b).ok_or_else(||
        MetricsError::malformed(field, &a.to_string(), "difference overflows")
    )
}
