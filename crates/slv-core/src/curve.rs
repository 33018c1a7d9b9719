//! Pricing-curve boundary: tick-to-sqrt-price conversion and range amounts.
//!
//! [`PricingCurve`] treats the pool's pricing primitive as an external
//! collaborator: the auditor asks it for sqrt prices at tick indexes and, in
//! delegating mode, for the token amounts a liquidity range pins. It never
//! re-derives swap behavior. [`Q96Curve`] is the reference implementation
//! used when no external primitive is wired in.

use std::fmt;

use primitive_types::U256;

use crate::math::amounts_in_range;
use crate::types::{MAX_SQRT_RATIO, MAX_TICK, MIN_SQRT_RATIO, MIN_TICK};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CurveError {
    /// Tick index outside the quotable range.
    TickOutOfRange { tick: i32 },
    /// A sqrt price bound is zero, reversed, or outside the global range.
    InvalidPriceBound { lower: U256, upper: U256 },
    /// The pool's current sqrt price is zero.
    ZeroCurrentPrice,
}

impl fmt::Display for CurveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CurveError::TickOutOfRange { tick } => {
                write!(f, "tick {tick} outside quotable range [{MIN_TICK}, {MAX_TICK}]")
            }
            CurveError::InvalidPriceBound { lower, upper } => {
                write!(f, "invalid sqrt price bounds: lower={lower} upper={upper}")
            }
            CurveError::ZeroCurrentPrice => f.write_str("current sqrt price is zero"),
        }
    }
}

impl std::error::Error for CurveError {}

// ---------------------------------------------------------------------------
// Curve trait
// ---------------------------------------------------------------------------

/// Pricing primitive a pool settles against. Object safe; shared across
/// tasks, hence `Send + Sync`.
pub trait PricingCurve: Send + Sync {
    /// `sqrt(1.0001^tick)` in Q64.96.
    fn sqrt_price_at_tick(&self, tick: i32) -> Result<U256, CurveError>;

    /// Token amounts `liquidity` pins over `[sqrt_lower, sqrt_upper]` at
    /// `sqrt_current`, rounded exactly as the pool's own accounting rounds.
    /// A zero `sqrt_current` is an error, never a price below the range.
    fn range_amounts(
        &self,
        liquidity: u128,
        sqrt_lower: U256,
        sqrt_upper: U256,
        sqrt_current: U256,
    ) -> Result<(U256, U256), CurveError>;
}

/// Rejects bound pairs no pool could have minted: zero, reversed, or outside
/// `[MIN_SQRT_RATIO, MAX_SQRT_RATIO]`.
pub fn validate_price_bounds(sqrt_lower: U256, sqrt_upper: U256) -> Result<(), CurveError> {
    if sqrt_lower.is_zero()
        || sqrt_lower >= sqrt_upper
        || sqrt_lower < MIN_SQRT_RATIO
        || sqrt_upper > MAX_SQRT_RATIO
    {
        return Err(CurveError::InvalidPriceBound { lower: sqrt_lower, upper: sqrt_upper });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Reference Q64.96 curve
// ---------------------------------------------------------------------------

/// Reference Q64.96 curve backed by the canonical tick ladder.
#[derive(Clone, Copy, Debug, Default)]
pub struct Q96Curve;

impl PricingCurve for Q96Curve {
    fn sqrt_price_at_tick(&self, tick: i32) -> Result<U256, CurveError> {
        sqrt_ratio_at_tick(tick)
    }

    fn range_amounts(
        &self,
        liquidity: u128,
        sqrt_lower: U256,
        sqrt_upper: U256,
        sqrt_current: U256,
    ) -> Result<(U256, U256), CurveError> {
        validate_price_bounds(sqrt_lower, sqrt_upper)?;
        if sqrt_current.is_zero() {
            return Err(CurveError::ZeroCurrentPrice);
        }
        // Bounds were validated above, so any arithmetic fault traces back
        // to them.
        amounts_in_range(sqrt_lower, sqrt_upper, sqrt_current, liquidity)
            .map_err(|_| CurveError::InvalidPriceBound { lower: sqrt_lower, upper: sqrt_upper })
    }
}

/// 1.0 in Q128, the ladder's working scale.
const Q128: U256 = U256([0, 0, 1, 0]);

/// `sqrt(1.0001^-1)` in Q128; seed for odd tick magnitudes.
const LADDER_SEED_ODD: u128 = 0xfffc_b933_bd6f_ad37_aa2d_162d_1a59_4001;

/// `sqrt(1.0001^-(2^k))` in Q128 for `k = 1..=19`, one entry per bit of the
/// tick magnitude above bit zero.
const SQRT_LADDER_Q128: [u128; 19] = [
    0xfff9_7272_373d_4132_59a4_6990_580e_213a,
    0xfff2_e50f_5f65_6932_ef12_357c_f3c7_fdcc,
    0xffe5_caca_7e10_e4e6_1c36_24ea_a094_1cd0,
    0xffcb_9843_d60f_6159_c9db_5883_5c92_6644,
    0xff97_3b41_fa98_c081_472e_6896_dfb2_54c0,
    0xff2e_a164_66c9_6a38_43ec_78b3_26b5_2861,
    0xfe5d_ee04_6a99_a2a8_11c4_61f1_969c_3053,
    0xfcbe_86c7_900a_88ae_dcff_c83b_479a_a3a4,
    0xf987_a725_3ac4_1317_6f2b_074c_f781_5e54,
    0xf339_2b08_22b7_0005_940c_7a39_8e4b_70f3,
    0xe715_9475_a2c2_9b74_43b2_9c7f_a6e8_89d9,
    0xd097_f3bd_fd20_22b8_845a_d8f7_92aa_5825,
    0xa9f7_4646_2d87_0fdf_8a65_dc1f_90e0_61e5,
    0x70d8_69a1_56d2_a1b8_90bb_3df6_2baf_32f7,
    0x31be_135f_97d0_8fd9_8123_1505_542f_cfa6,
    0x09aa_508b_5b7a_84e1_c677_de54_f3e9_9bc9,
    0x005d_6af8_dedb_8119_6699_c329_225e_e604,
    0x0000_2216_e584_f5fa_1ea9_2604_1bed_fe98,
    0x0000_0000_048a_1703_91f7_dc42_444e_8fa2,
];

/// `sqrt(1.0001^tick)` in Q64.96 via binary decomposition of the tick
/// magnitude. Bit for bit the pool's own ladder, so prices agree exactly.
pub fn sqrt_ratio_at_tick(tick: i32) -> Result<U256, CurveError> {
    if !(MIN_TICK..=MAX_TICK).contains(&tick) {
        return Err(CurveError::TickOutOfRange { tick });
    }
    let abs_tick = tick.unsigned_abs();

    let mut ratio = if abs_tick & 1 != 0 {
        U256::from(LADDER_SEED_ODD)
    } else {
        Q128
    };
    for (k, factor) in SQRT_LADDER_Q128.iter().enumerate() {
        if abs_tick & (1 << (k + 1)) != 0 {
            ratio = mul_shift(ratio, *factor);
        }
    }

    // The ladder accumulates the negative-tick price; invert for positive.
    if tick > 0 {
        ratio = U256::MAX / ratio;
    }

    // Q128 -> Q64.96, rounding up to match pool accounting.
    let shifted = ratio >> 32;
    if (ratio % (U256::one() << 32)).is_zero() {
        Ok(shifted)
    } else {
        Ok(shifted + U256::one())
    }
}

/// `(ratio * factor) >> 128`. Inside the ladder loop `ratio` never exceeds
/// 2^128 and `factor` stays below it, so the product fits 256 bits.
fn mul_shift(ratio: U256, factor: u128) -> U256 {
    (ratio * U256::from(factor)) >> 128
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Q96;

    #[test]
    fn tick_zero_is_exactly_q96() {
        assert_eq!(sqrt_ratio_at_tick(0).unwrap(), Q96);
    }

    #[test]
    fn extreme_ticks_hit_the_global_bounds() {
        assert_eq!(sqrt_ratio_at_tick(MIN_TICK).unwrap(), MIN_SQRT_RATIO);
        assert_eq!(sqrt_ratio_at_tick(MAX_TICK).unwrap(), MAX_SQRT_RATIO);
    }

    #[test]
    fn ladder_is_strictly_increasing() {
        let samples = [
            MIN_TICK, -887_271, -500_000, -75_000, -6_932, -200, -11, -1, 0, 1, 11, 200, 6_932,
            75_000, 500_000, 887_271, MAX_TICK,
        ];
        for pair in samples.windows(2) {
            let lo = sqrt_ratio_at_tick(pair[0]).unwrap();
            let hi = sqrt_ratio_at_tick(pair[1]).unwrap();
            assert!(lo < hi, "ticks {} and {} out of order", pair[0], pair[1]);
        }
    }

    #[test]
    fn tick_6932_is_near_sqrt_two() {
        // 1.0001^6932 is just above 2, so the sqrt price sits a hair over
        // sqrt(2) * Q96.
        let price = sqrt_ratio_at_tick(6_932).unwrap();
        let lower = Q96 * U256::from(14_141) / U256::from(10_000);
        let upper = Q96 * U256::from(14_144) / U256::from(10_000);
        assert!(price > lower && price < upper, "price {price} outside sqrt(2) window");
    }

    #[test]
    fn opposite_ticks_multiply_back_to_one() {
        // price(t) * price(-t) ~= Q96^2, within ladder rounding.
        for tick in [1, 50, 1_000, 100_000] {
            let pos = sqrt_ratio_at_tick(tick).unwrap();
            let neg = sqrt_ratio_at_tick(-tick).unwrap();
            // pos * neg is about 2^192, well inside 256 bits.
            let product = (pos * neg) >> 96;
            let err = if product > Q96 { product - Q96 } else { Q96 - product };
            // Tolerance scales with price magnitude.
            assert!(err <= pos >> 90, "tick {tick}: product {product} too far from Q96");
        }
    }

    #[test]
    fn out_of_range_ticks_are_rejected() {
        assert_eq!(
            sqrt_ratio_at_tick(MAX_TICK + 1),
            Err(CurveError::TickOutOfRange { tick: MAX_TICK + 1 })
        );
        assert_eq!(
            sqrt_ratio_at_tick(MIN_TICK - 1),
            Err(CurveError::TickOutOfRange { tick: MIN_TICK - 1 })
        );
    }

    #[test]
    fn validate_rejects_degenerate_bounds() {
        let ok = validate_price_bounds(Q96, Q96 * U256::from(2));
        assert!(ok.is_ok());

        assert!(validate_price_bounds(U256::zero(), Q96).is_err());
        assert!(validate_price_bounds(Q96, Q96).is_err());
        assert!(validate_price_bounds(Q96 * U256::from(2), Q96).is_err());
        assert!(validate_price_bounds(U256::from(1), Q96).is_err());
        assert!(validate_price_bounds(Q96, MAX_SQRT_RATIO + U256::one()).is_err());
    }

    #[test]
    fn q96_curve_rejects_bad_bounds_before_math() {
        let err = Q96Curve
            .range_amounts(1_000, Q96, Q96, Q96)
            .unwrap_err();
        assert!(matches!(err, CurveError::InvalidPriceBound { .. }));
    }

    #[test]
    fn q96_curve_rejects_zero_current_price() {
        // Zero would otherwise read as "below the range" and price a full
        // X leg against valid bounds.
        let err = Q96Curve
            .range_amounts(1_000, Q96, Q96 * U256::from(2), U256::zero())
            .unwrap_err();
        assert!(matches!(err, CurveError::ZeroCurrentPrice));
    }

    #[test]
    fn error_display_names_the_tick() {
        let msg = CurveError::TickOutOfRange { tick: 900_000 }.to_string();
        assert!(msg.contains("900000"));
    }
}
