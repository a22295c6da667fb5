use crate::domain::model::Money;
use rust_decimal::{Decimal, RoundingStrategy};

/// 10% over the carrier list price.
pub const DEFAULT_MARKUP_RATE: Decimal = Decimal::from_parts(10, 0, 0, false, 2);

/// Marks list prices up by a fixed rate. Amounts are rounded half-up to
/// cents; currency passes through unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricingPolicy {
    markup_rate: Decimal,
}

impl PricingPolicy {
    pub fn new(markup_rate: Decimal) -> Self {
        Self { markup_rate }
    }

    pub fn markup_rate(&self) -> Decimal {
        self.markup_rate
    }

    pub fn markup(&self, amount: Decimal) -> Decimal {
        (amount * (Decimal::ONE + self.markup_rate))
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }

    pub fn price(&self, list_price: &Money) -> Money {
        Money::new(self.markup(list_price.amount), list_price.currency.clone())
    }
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MARKUP_RATE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_default_rate_is_ten_percent() {
        assert_eq!(DEFAULT_MARKUP_RATE, d("0.10"));
        assert_eq!(PricingPolicy::default().markup_rate(), d("0.10"));
    }

    #[test]
    fn test_markup_rounds_to_cents() {
        let policy = PricingPolicy::default();
        assert_eq!(policy.markup(d("100.00")), d("110.00"));
        assert_eq!(policy.markup(d("99.99")), d("109.99"));
        assert_eq!(policy.markup(d("45.00")), d("49.50"));
        // 0.05 * 1.1 = 0.055 rounds half-up
        assert_eq!(policy.markup(d("0.05")), d("0.06"));
    }

    #[test]
    fn test_custom_rate_and_currency_passthrough() {
        let policy = PricingPolicy::new(d("0.25"));
        let priced = policy.price(&Money::new(d("20.00"), "CAD"));
        assert_eq!(priced.amount, d("25.00"));
        assert_eq!(priced.currency, "CAD");
    }

    #[test]
    fn test_zero_rate_keeps_list_price() {
        let policy = PricingPolicy::new(Decimal::ZERO);
        assert_eq!(policy.markup(d("12.34")), d("12.34"));
    }
}
