//! Price tier conversion from the store currency to the derived catalog price.
//!
//! The multiplier is a step function of `price` alone, so the derived price
//! never depends on ingestion order or on any other record in the batch.

use rust_decimal::{Decimal, RoundingStrategy};

/// `(inclusive upper bound, multiplier)` for every bounded tier, ascending.
/// The lowest tier starts at 1.
const TIERS: [(u32, u32); 4] = [(100, 120), (150, 100), (200, 90), (350, 85)];

/// Multiplier for prices above the last bounded tier.
const TOP_TIER_MULTIPLIER: u32 = 80;

/// Multiplier for prices below 1.
const FALLBACK_MULTIPLIER: u32 = 120;

/// Digits kept after the decimal point in stored prices.
pub const PRICE_SCALE: u32 = 2;

/// Exclusive bound on the magnitude of a stored price (`NUMERIC(10,2)`).
pub const PRICE_LIMIT: i64 = 100_000_000;

/// Rounds `price` to [`PRICE_SCALE`], half away from zero, which is how a
/// Postgres `NUMERIC` column rounds on insert.
#[must_use]
pub fn round_price(price: Decimal) -> Decimal {
    price.round_dp_with_strategy(PRICE_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// `price` as it will be stored, or `None` when it does not fit the price
/// columns.
#[must_use]
pub fn storable_price(price: Decimal) -> Option<Decimal> {
    let rounded = round_price(price);
    (rounded.abs() < Decimal::from(PRICE_LIMIT)).then_some(rounded)
}

/// Returns the tier multiplier for `price`.
///
/// Bounds are inclusive on the upper end: 100 is in the first tier, 100.01
/// in the second, 150 in the second, and so on.
#[must_use]
pub fn tier_multiplier(price: Decimal) -> Decimal {
    if price < Decimal::ONE {
        return Decimal::from(FALLBACK_MULTIPLIER);
    }

    TIERS
        .iter()
        .find(|(upper, _)| price <= Decimal::from(*upper))
        .map_or(Decimal::from(TOP_TIER_MULTIPLIER), |(_, multiplier)| {
            Decimal::from(*multiplier)
        })
}

/// Computes the derived price, or `None` when `price` is not positive or the
/// product does not fit in a `Decimal`.
#[must_use]
pub fn derived_price(price: Decimal) -> Option<Decimal> {
    if price <= Decimal::ZERO {
        return None;
    }
    price.checked_mul(tier_multiplier(price))
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).expect("valid decimal literal")
    }

    fn huge() -> Decimal {
        Decimal::from_scientific("1e28").expect("valid scientific literal")
    }

    #[test]
    fn tier_boundaries_are_inclusive_on_the_upper_end() {
        let cases = [
            ("1", 120),
            ("100", 120),
            ("100.01", 100),
            ("150", 100),
            ("150.01", 90),
            ("200", 90),
            ("200.01", 85),
            ("350", 85),
            ("350.01", 80),
            ("10000", 80),
        ];
        for (price, expected) in cases {
            assert_eq!(
                tier_multiplier(dec(price)),
                Decimal::from(expected),
                "price {price}"
            );
        }
    }

    #[test]
    fn values_between_whole_number_bounds_use_the_next_tier() {
        assert_eq!(tier_multiplier(dec("100.5")), Decimal::from(100));
        assert_eq!(tier_multiplier(dec("150.5")), Decimal::from(90));
        assert_eq!(tier_multiplier(dec("200.5")), Decimal::from(85));
    }

    #[test]
    fn sub_unit_prices_use_fallback_multiplier() {
        assert_eq!(tier_multiplier(dec("0.5")), Decimal::from(120));
        assert_eq!(tier_multiplier(Decimal::ZERO), Decimal::from(120));
    }

    #[test]
    fn derived_price_multiplies_exactly() {
        assert_eq!(derived_price(dec("100")), Some(dec("12000")));
        assert_eq!(derived_price(dec("100.01")), Some(dec("10001")));
        assert_eq!(derived_price(dec("150")), Some(dec("15000")));
        assert_eq!(derived_price(dec("150.01")), Some(dec("13500.9")));
        assert_eq!(derived_price(dec("350")), Some(dec("29750")));
        assert_eq!(derived_price(dec("350.01")), Some(dec("28000.8")));
        assert_eq!(derived_price(dec("0.5")), Some(dec("60")));
    }

    #[test]
    fn overflowing_price_has_no_derived_price() {
        assert_eq!(derived_price(Decimal::MAX), None);
        assert_eq!(derived_price(huge()), None);
    }

    #[test]
    fn prices_round_half_away_from_zero() {
        assert_eq!(round_price(dec("100.005")), dec("100.01"));
        assert_eq!(round_price(dec("100.004")), dec("100"));
        assert_eq!(round_price(dec("-2.345")), dec("-2.35"));
    }

    #[test]
    fn storable_price_enforces_column_range() {
        assert_eq!(storable_price(dec("99999999.99")), Some(dec("99999999.99")));
        assert_eq!(storable_price(dec("99999999.995")), None);
        assert_eq!(storable_price(dec("100000000")), None);
        assert_eq!(storable_price(dec("-100000000")), None);
        assert_eq!(storable_price(huge()), None);
    }

    #[test]
    fn largest_storable_price_derives_without_overflow() {
        let top = dec("99999999.99");
        assert_eq!(derived_price(top), Some(dec("7999999999.20")));
    }

    #[test]
    fn non_positive_price_has_no_derived_price() {
        assert_eq!(derived_price(Decimal::ZERO), None);
        assert_eq!(derived_price(dec("-12.5")), None);
    }
}
