//! Pricing engine for quotations and financial documents.
//!
//! All totals are derived here and nowhere else: handlers recompute the full
//! set of totals from the submitted line items on every write and persist the
//! result as plain columns. There is no incremental update path.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::LineItem;

/// Fixed 7% VAT rate.
fn vat_rate() -> Decimal {
    Decimal::new(7, 2)
}

/// Fixed 3% withholding tax rate.
fn withholding_rate() -> Decimal {
    Decimal::new(3, 2)
}

/// Round a monetary amount to 2 decimal places, midpoint away from zero.
///
/// The single rounding helper used by every pricing computation.
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Derived totals for one document, recomputed in full on every change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingTotals {
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub after_discount: Decimal,
    pub vat: Decimal,
    pub total_amount: Decimal,
    pub withholding: Decimal,
    pub net_total: Decimal,
}

/// Result of the reverse computation from a desired net payout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReverseCalculation {
    pub gross_before_withholding: Decimal,
    pub withholding_amount: Decimal,
}

#[derive(Debug, Error)]
pub enum PricingError {
    #[error("Desired net amount must be greater than zero")]
    InvalidDesiredNet,

    #[error("Quantities, prices, discount and withholding must not be negative")]
    NegativeAmount,
}

/// Reject structurally invalid pricing inputs before any computation.
pub fn validate_inputs(
    items: &[LineItem],
    discount: Decimal,
    withholding: Decimal,
) -> Result<(), PricingError> {
    if discount < Decimal::ZERO || withholding < Decimal::ZERO {
        return Err(PricingError::NegativeAmount);
    }
    for item in items {
        if item.quantity < Decimal::ZERO || item.price_per_unit < Decimal::ZERO {
            return Err(PricingError::NegativeAmount);
        }
    }
    Ok(())
}

/// Compute the full totals set from line items and the user-supplied
/// discount, VAT flag and withholding amount.
///
/// The steps are ordered; each value feeds the next:
/// subtotal, after-discount (clamped at zero), VAT (7% when enabled),
/// total amount, net total. The net total is deliberately not clamped:
/// a withholding amount larger than the total produces a negative net.
pub fn compute_totals(
    items: &[LineItem],
    discount: Decimal,
    include_vat: bool,
    withholding: Decimal,
) -> PricingTotals {
    let subtotal: Decimal = items.iter().map(LineItem::effective_amount).sum();

    let after_discount = (subtotal - discount).max(Decimal::ZERO);

    let vat = if include_vat {
        round2(after_discount * vat_rate())
    } else {
        Decimal::ZERO
    };

    let total_amount = round2(after_discount + vat);
    let net_total = round2(total_amount - withholding);

    PricingTotals {
        subtotal,
        discount,
        after_discount,
        vat,
        total_amount,
        withholding,
        net_total,
    }
}

/// Compute the gross amount to bill so that after the flat 3% withholding
/// deduction the issuer receives exactly `desired_net`.
///
/// The gross is returned unrounded; only the withholding amount is rounded.
pub fn gross_from_desired_net(desired_net: Decimal) -> Result<ReverseCalculation, PricingError> {
    if desired_net <= Decimal::ZERO {
        return Err(PricingError::InvalidDesiredNet);
    }

    // net = gross - gross * 0.03 = gross * 0.97, so gross = net / 0.97
    let gross_before_withholding = desired_net / (Decimal::ONE - withholding_rate());
    let withholding_amount = round2(gross_before_withholding * withholding_rate());

    Ok(ReverseCalculation {
        gross_before_withholding,
        withholding_amount,
    })
}

/// Redistribute `target_gross` across the given items proportionally,
/// rewriting only price and amount. An empty item list yields one synthetic
/// "Item/Service" line carrying the whole gross.
///
/// When the current total is zero the ratio is undefined; every item's price
/// and amount collapse to zero instead of surfacing an error. Callers must
/// re-run [`compute_totals`] afterwards with the withholding amount from
/// [`gross_from_desired_net`].
pub fn apply_gross_to_items(items: &[LineItem], target_gross: Decimal) -> Vec<LineItem> {
    if items.is_empty() {
        let price = round2(target_gross);
        return vec![LineItem {
            description: "Item/Service".to_string(),
            unit: "item".to_string(),
            quantity: Decimal::ONE,
            price_per_unit: price,
            amount: price,
        }];
    }

    let current_total: Decimal = items.iter().map(LineItem::effective_amount).sum();
    let ratio = target_gross.checked_div(current_total);

    items
        .iter()
        .map(|item| {
            let (price_per_unit, amount) = match ratio {
                Some(ratio) => {
                    let price = round2(item.price_per_unit * ratio);
                    (price, round2(item.quantity * price))
                }
                None => (Decimal::ZERO, Decimal::ZERO),
            };
            LineItem {
                description: item.description.clone(),
                unit: item.unit.clone(),
                quantity: item.quantity,
                price_per_unit,
                amount,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn item(quantity: &str, price: &str) -> LineItem {
        LineItem {
            description: "Test item".to_string(),
            unit: "piece".to_string(),
            quantity: dec(quantity),
            price_per_unit: dec(price),
            amount: dec(quantity) * dec(price),
        }
    }

    #[test]
    fn round2_midpoint_goes_away_from_zero() {
        assert_eq!(round2(dec("1.005")), dec("1.01"));
        assert_eq!(round2(dec("1.004")), dec("1.00"));
        assert_eq!(round2(dec("-1.005")), dec("-1.01"));
    }

    #[test]
    fn stored_amount_wins_over_quantity_times_price() {
        // A nonzero stored amount is trusted even when inconsistent
        let mut inconsistent = item("2", "100");
        inconsistent.amount = dec("150");
        let totals = compute_totals(&[inconsistent], Decimal::ZERO, false, Decimal::ZERO);
        assert_eq!(totals.subtotal, dec("150"));
    }

    #[test]
    fn zero_stored_amount_falls_back_to_product() {
        let mut zeroed = item("3", "40");
        zeroed.amount = Decimal::ZERO;
        let totals = compute_totals(&[zeroed], Decimal::ZERO, false, Decimal::ZERO);
        assert_eq!(totals.subtotal, dec("120"));
    }

    #[test]
    fn redistribution_over_zero_total_collapses_to_zero() {
        let items = vec![item("1", "0"), item("5", "0")];
        let adjusted = apply_gross_to_items(&items, dec("1000"));
        assert_eq!(adjusted.len(), 2);
        for it in &adjusted {
            assert_eq!(it.price_per_unit, Decimal::ZERO);
            assert_eq!(it.amount, Decimal::ZERO);
        }
    }

    #[test]
    fn redistribution_keeps_non_price_fields() {
        let items = vec![item("2", "500"), item("1", "1000")];
        let adjusted = apply_gross_to_items(&items, dec("4000"));
        assert_eq!(adjusted[0].description, items[0].description);
        assert_eq!(adjusted[0].unit, items[0].unit);
        assert_eq!(adjusted[0].quantity, items[0].quantity);
        // 2000 -> 4000 doubles every price
        assert_eq!(adjusted[0].price_per_unit, dec("1000"));
        assert_eq!(adjusted[0].amount, dec("2000"));
        assert_eq!(adjusted[1].price_per_unit, dec("2000"));
    }

    #[test]
    fn desired_net_must_be_positive() {
        assert!(gross_from_desired_net(Decimal::ZERO).is_err());
        assert!(gross_from_desired_net(dec("-5")).is_err());
        assert!(gross_from_desired_net(dec("0.01")).is_ok());
    }
}
