use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds to `dp` decimal places, ties away from zero.
pub fn round_half_away(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// Monthly percentages are published with a single decimal.
pub fn round1(value: Decimal) -> Decimal {
    round_half_away(value, 1)
}

/// Rents are expressed in whole currency units.
pub fn round_units(value: Decimal) -> Decimal {
    round_half_away(value, 0)
}

/// Converts a proportion (`0.0162`) into a one-decimal percentage (`1.6`).
///
/// `None` when the percentage does not fit in a `Decimal`.
pub fn ratio_to_percent(ratio: Decimal) -> Option<Decimal> {
    ratio.checked_mul(Decimal::ONE_HUNDRED).map(round1)
}
