//! Reverse-calculation tests: desired net payout to gross pricing,
//! proportional redistribution and the follow-up totals recompute.

use quotation_service::models::LineItem;
use quotation_service::pricing::{
    apply_gross_to_items, compute_totals, gross_from_desired_net,
};
use rust_decimal::Decimal;
use std::str::FromStr;

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn item(quantity: &str, price: &str) -> LineItem {
    LineItem {
        description: "Service".to_string(),
        unit: "piece".to_string(),
        quantity: dec(quantity),
        price_per_unit: dec(price),
        amount: dec(quantity) * dec(price),
    }
}

#[test]
fn desired_net_9700_round_trip() {
    let reverse = gross_from_desired_net(dec("9700")).unwrap();
    assert_eq!(reverse.gross_before_withholding, dec("10000"));
    assert_eq!(reverse.withholding_amount, dec("300.00"));

    // gross - withholding lands back on the desired net within a cent
    let recovered = reverse.gross_before_withholding - reverse.withholding_amount;
    assert!((recovered - dec("9700")).abs() <= dec("0.01"));
}

#[test]
fn gross_is_not_rounded_before_withholding() {
    let reverse = gross_from_desired_net(dec("100")).unwrap();
    // 100 / 0.97 = 103.0927835..., kept unrounded
    assert!(reverse.gross_before_withholding > dec("103.09"));
    assert!(reverse.gross_before_withholding < dec("103.10"));
    assert_eq!(reverse.withholding_amount, dec("3.09"));
}

#[test]
fn zero_and_negative_desired_net_are_rejected() {
    assert!(gross_from_desired_net(Decimal::ZERO).is_err());
    assert!(gross_from_desired_net(dec("-9700")).is_err());
}

#[test]
fn empty_items_get_a_single_synthetic_line() {
    let adjusted = apply_gross_to_items(&[], dec("5000"));
    assert_eq!(adjusted.len(), 1);
    assert_eq!(adjusted[0].description, "Item/Service");
    assert_eq!(adjusted[0].unit, "item");
    assert_eq!(adjusted[0].quantity, Decimal::ONE);
    assert_eq!(adjusted[0].price_per_unit, dec("5000"));
    assert_eq!(adjusted[0].amount, dec("5000"));
}

#[test]
fn redistribution_is_proportional() {
    let items = vec![item("2", "500"), item("1", "1000")];
    let adjusted = apply_gross_to_items(&items, dec("3000"));

    // current total 2000, ratio 1.5
    assert_eq!(adjusted[0].price_per_unit, dec("750.00"));
    assert_eq!(adjusted[0].amount, dec("1500.00"));
    assert_eq!(adjusted[1].price_per_unit, dec("1500.00"));
    assert_eq!(adjusted[1].amount, dec("1500.00"));

    let new_total: Decimal = adjusted.iter().map(|i| i.amount).sum();
    assert_eq!(new_total, dec("3000.00"));
}

#[test]
fn zero_total_items_collapse_to_zero_instead_of_failing() {
    let items = vec![item("1", "0"), item("3", "0")];
    let adjusted = apply_gross_to_items(&items, dec("5000"));

    assert_eq!(adjusted.len(), 2);
    for it in &adjusted {
        assert_eq!(it.price_per_unit, Decimal::ZERO);
        assert_eq!(it.amount, Decimal::ZERO);
    }
}

#[test]
fn full_calculator_flow_applies_withholding_from_reverse() {
    // The calculator flow: reverse-compute the gross, redistribute it,
    // then recompute totals with the derived withholding amount
    let items = vec![item("1", "2500"), item("1", "2500")];

    let reverse = gross_from_desired_net(dec("9700")).unwrap();
    let adjusted = apply_gross_to_items(&items, reverse.gross_before_withholding);
    let totals = compute_totals(&adjusted, Decimal::ZERO, false, reverse.withholding_amount);

    assert_eq!(totals.subtotal, dec("10000.00"));
    assert_eq!(totals.withholding, dec("300.00"));
    assert_eq!(totals.net_total, dec("9700.00"));
}

#[test]
fn rounding_keeps_redistributed_total_within_a_cent() {
    let items = vec![item("3", "33.33"), item("7", "14.29")];
    let reverse = gross_from_desired_net(dec("970")).unwrap();
    let adjusted = apply_gross_to_items(&items, reverse.gross_before_withholding);

    let new_total: Decimal = adjusted.iter().map(|i| i.amount).sum();
    let target = dec("1000");
    assert!((new_total - target).abs() < dec("0.25"), "drift too large: {}", new_total);
}
