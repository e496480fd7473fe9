//! Line and order money arithmetic.
//!
//! Pure and deterministic: same inputs always produce the same outputs, no
//! rounding beyond exact decimal arithmetic. Range validation of the discount
//! percentage is the builder's job, not this module's.

use rust_decimal::Decimal;

/// Subtotal and discount amount of a single line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineAmounts {
    /// `quantity × unit_price × (1 − discount/100)`.
    pub subtotal: Decimal,
    /// `quantity × unit_price × (discount/100)`.
    pub discount: Decimal,
}

/// Order-level totals over a set of lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderTotals {
    pub total_amount: Decimal,
    pub total_discount: Decimal,
}

/// Compute both amounts of a line in one step.
///
/// The subtotal is derived as `gross − discount` so the two amounts always
/// reconcile exactly against the undiscounted value.
pub fn line_amounts(quantity: i64, unit_price: Decimal, discount_percent: Decimal) -> LineAmounts {
    let gross = Decimal::from(quantity) * unit_price;
    let discount = gross * discount_percent / Decimal::ONE_HUNDRED;
    LineAmounts {
        subtotal: gross - discount,
        discount,
    }
}

pub fn line_subtotal(quantity: i64, unit_price: Decimal, discount_percent: Decimal) -> Decimal {
    line_amounts(quantity, unit_price, discount_percent).subtotal
}

pub fn line_discount_amount(
    quantity: i64,
    unit_price: Decimal,
    discount_percent: Decimal,
) -> Decimal {
    line_amounts(quantity, unit_price, discount_percent).discount
}

/// Fold line amounts into order totals.
pub fn order_totals<I>(lines: I) -> OrderTotals
where
    I: IntoIterator<Item = LineAmounts>,
{
    let mut totals = OrderTotals {
        total_amount: Decimal::ZERO,
        total_discount: Decimal::ZERO,
    };
    for line in lines {
        totals.total_amount += line.subtotal;
        totals.total_discount += line.discount;
    }
    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn undiscounted_line_keeps_gross() {
        let amounts = line_amounts(2, dec("10"), Decimal::ZERO);
        assert_eq!(amounts.subtotal, dec("20"));
        assert_eq!(amounts.discount, Decimal::ZERO);
    }

    #[test]
    fn half_discount_splits_evenly() {
        let amounts = line_amounts(1, dec("5"), dec("50"));
        assert_eq!(amounts.subtotal, dec("2.5"));
        assert_eq!(amounts.discount, dec("2.5"));
    }

    #[test]
    fn full_discount_zeroes_subtotal() {
        let amounts = line_amounts(3, dec("9.99"), dec("100"));
        assert_eq!(amounts.subtotal, Decimal::ZERO);
        assert_eq!(amounts.discount, dec("29.97"));
    }

    #[test]
    fn two_line_order_totals() {
        let totals = order_totals([
            line_amounts(2, dec("10"), Decimal::ZERO),
            line_amounts(1, dec("5"), dec("50")),
        ]);
        assert_eq!(totals.total_amount, dec("22.5"));
        assert_eq!(totals.total_discount, dec("2.5"));
    }

    #[test]
    fn empty_order_totals_are_zero() {
        let totals = order_totals([]);
        assert_eq!(totals.total_amount, Decimal::ZERO);
        assert_eq!(totals.total_discount, Decimal::ZERO);
    }

    proptest! {
        /// Subtotal and discount of any line reconcile exactly against the
        /// gross value, and order totals are the plain sums.
        #[test]
        fn amounts_reconcile_to_gross(
            lines in proptest::collection::vec(
                (1i64..1_000, 0i64..10_000_000, 0u32..=100),
                0..20,
            )
        ) {
            let amounts: Vec<LineAmounts> = lines
                .iter()
                .map(|&(quantity, price_cents, discount)| {
                    line_amounts(
                        quantity,
                        Decimal::new(price_cents, 2),
                        Decimal::from(discount),
                    )
                })
                .collect();

            let gross: Decimal = lines
                .iter()
                .map(|&(quantity, price_cents, _)| {
                    Decimal::from(quantity) * Decimal::new(price_cents, 2)
                })
                .sum();

            let totals = order_totals(amounts.iter().copied());
            prop_assert_eq!(totals.total_amount + totals.total_discount, gross);

            for (computed, &(quantity, price_cents, _)) in amounts.iter().zip(&lines) {
                let line_gross = Decimal::from(quantity) * Decimal::new(price_cents, 2);
                prop_assert_eq!(computed.subtotal + computed.discount, line_gross);
            }
        }
    }
}
