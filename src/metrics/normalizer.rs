/// Unit normalizer: protocol fixed-point integers to human-readable decimals
///
/// `value / 10^exponent` is computed by moving the decimal point inside the
/// digit string, so raw integers wider than 64 bits (ray-scaled rates,
/// 18-decimal reserves) never pass through a float.
use super::types::RawValue;
use crate::constants::MAX_DECIMAL_SCALE;
use crate::errors::{ MetricsError, MetricsResult };
use rust_decimal::Decimal;

/// Significant digits a Decimal mantissa holds without overflow
const MAX_SIGNIFICANT_DIGITS: usize = 28;

/// Normalize a raw field into a Decimal in human-readable units
pub fn normalize(field: &str, raw: &RawValue) -> MetricsResult<Decimal> {
    let exponent = match raw.exponent {
        Some(exponent) if exponent < 0 => {
            return Err(
                MetricsError::malformed(
                    field,
                    &raw.value,
                    format!("negative decimal exponent {}", exponent)
                )
            );
        }
        Some(exponent) => exponent as u64,
        None => {
            return Err(MetricsError::malformed(field, &raw.value, "missing decimal exponent"));
        }
    };

    scale_down(field, &raw.value, exponent)
}

/// Normalize a raw integer with an exponent known from the protocol layout
pub fn normalize_scaled(field: &str, value: &str, exponent: u32) -> MetricsResult<Decimal> {
    scale_down(field, value, exponent as u64)
}

fn scale_down(field: &str, value: &str, exponent: u64) -> MetricsResult<Decimal> {
    let text = value.trim();
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };

    if digits.is_empty() {
        return Err(MetricsError::malformed(field, value, "empty numeric value"));
    }
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(MetricsError::malformed(field, value, "not an integer"));
    }

    let digits = digits.trim_start_matches('0');
    if digits.is_empty() {
        return Ok(Decimal::ZERO);
    }

    // Anything smaller than the finest representable step rounds to zero
    if exponent > (digits.len() as u64) + (MAX_DECIMAL_SCALE as u64) {
        return Ok(Decimal::ZERO);
    }

    // Split into integer and fractional digit runs around the shifted point
    let exponent = exponent as usize;
    let (int_part, frac_part): (&str, String) = if digits.len() > exponent {
        let split = digits.len() - exponent;
        (&digits[..split], digits[split..].to_string())
    } else {
        ("", format!("{}{}", "0".repeat(exponent - digits.len()), digits))
    };

    if int_part.len() > MAX_SIGNIFICANT_DIGITS {
        return Err(
            MetricsError::malformed(
                field,
                value,
                format!("{} integer digits exceed decimal precision", int_part.len())
            )
        );
    }

    // Keep as many fractional digits as the mantissa allows, rounding half-up
    let significant_budget = if int_part.is_empty() {
        MAX_SIGNIFICANT_DIGITS
    } else {
        MAX_SIGNIFICANT_DIGITS - int_part.len()
    };
    let leading_zeros = if int_part.is_empty() {
        frac_part.len() - frac_part.trim_start_matches('0').len()
    } else {
        0
    };
    let keep = (leading_zeros + significant_budget)
        .min(MAX_DECIMAL_SCALE as usize)
        .min(frac_part.len());

    let kept = frac_part[..keep].trim_end_matches('0');
    let round_up = frac_part.as_bytes().get(keep).map_or(false, |d| *d >= b'5');

    let literal = match (int_part.is_empty(), kept.is_empty()) {
        (true, true) => "0".to_string(),
        (true, false) => format!("0.{}", kept),
        (false, true) => int_part.to_string(),
        (false, false) => format!("{}.{}", int_part, kept),
    };

    let mut result = Decimal::from_str_exact(&literal).map_err(|e|
        MetricsError::malformed(field, value, e.to_string())
    )?;

    if round_up {
        let ulp = Decimal::new(1, keep as u32);
        result = result
            .checked_add(ulp)
            .ok_or_else(|| MetricsError::malformed(field, value, "overflow while rounding"))?;
    }

    Ok(if negative { -result } else { result })
}
