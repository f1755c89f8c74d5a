/// Rate compounder: per-period nominal rates to annual percentage yield
///
/// `APY = (1 + r)^n - 1`, evaluated with exponentiation by squaring over
/// `Decimal`. Nothing is rounded here; presentation rounding happens when
/// result rows are built.
use super::types::RateBasis;
use crate::errors::{ MetricsError, MetricsResult };
use rust_decimal::Decimal;

impl RateBasis {
    /// Number of compounding periods in one year for this basis
    ///
    /// `block_time_ms == 0` on a per-block basis falls back to
    /// `default_block_time_ms`.
    pub fn periods_per_year(
        &self,
        seconds_per_year: u64,
        default_block_time_ms: u64
    ) -> MetricsResult<i64> {
        match self {
            RateBasis::PerSecond => to_periods(seconds_per_year as u128),
            RateBasis::PerBlock { block_time_ms } => {
                let block_time_ms = if *block_time_ms == 0 {
                    default_block_time_ms
                } else {
                    *block_time_ms
                };
                if block_time_ms == 0 {
                    return Err(MetricsError::InvalidCompoundingFrequency { periods: 0 });
                }
                to_periods(((seconds_per_year as u128) * 1000) / (block_time_ms as u128))
            }
            RateBasis::PerAnnum => Ok(1),
        }
    }
}

fn to_periods(periods: u128) -> MetricsResult<i64> {
    let periods = i64::try_from(periods).unwrap_or(i64::MAX);
    if periods <= 0 {
        return Err(MetricsError::InvalidCompoundingFrequency { periods });
    }
    Ok(periods)
}

/// Compound a per-period nominal rate `rate` over `periods` periods per year
pub fn compound(rate: Decimal, periods: i64) -> MetricsResult<Decimal> {
    if periods <= 0 {
        return Err(MetricsError::InvalidCompoundingFrequency { periods });
    }
    if periods == 1 || rate.is_zero() {
        return Ok(rate);
    }

    let overflow = MetricsError::RateOverflow { rate, periods };
    let base = Decimal::ONE.checked_add(rate).ok_or_else(|| overflow.clone())?;
    let growth = checked_powu(base, periods as u64).ok_or_else(|| overflow.clone())?;

    growth.checked_sub(Decimal::ONE).ok_or(overflow)
}

/// Annualize a per-period rate under the given basis
///
/// A per-annum rate is already annual and is returned unchanged.
pub fn annualize(
    rate: Decimal,
    basis: &RateBasis,
    seconds_per_year: u64,
    default_block_time_ms: u64
) -> MetricsResult<Decimal> {
    if let RateBasis::PerAnnum = basis {
        return Ok(rate);
    }
    let periods = basis.periods_per_year(seconds_per_year, default_block_time_ms)?;
    compound(rate, periods)
}

/// `base^exp` by repeated squaring; `None` on overflow
fn checked_powu(base: Decimal, mut exp: u64) -> Option<Decimal> {
    let mut result = Decimal::ONE;
    let mut square = base;

    while exp > 0 {
        if exp & 1 == 1 {
            result = result.checked_mul(square)?;
        }
        exp >>= 1;
        if exp > 0 {
            square = square.checked_mul(square)?;
        }
    }

    Some(result)
}
