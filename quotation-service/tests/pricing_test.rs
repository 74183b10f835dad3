//! Pricing engine tests covering discount clamping, VAT, withholding and
//! recompute determinism.

use quotation_service::models::LineItem;
use quotation_service::pricing::{compute_totals, round2};
use rust_decimal::Decimal;
use std::str::FromStr;

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn item(quantity: &str, price: &str) -> LineItem {
    LineItem {
        description: "Consulting".to_string(),
        unit: "piece".to_string(),
        quantity: dec(quantity),
        price_per_unit: dec(price),
        amount: dec(quantity) * dec(price),
    }
}

fn sample_items() -> Vec<LineItem> {
    vec![item("2", "500"), item("1", "1000")]
}

#[test]
fn discount_within_subtotal_is_subtracted() {
    let totals = compute_totals(&sample_items(), dec("500"), false, Decimal::ZERO);
    assert_eq!(totals.subtotal, dec("2000"));
    assert_eq!(totals.after_discount, dec("1500"));
}

#[test]
fn discount_larger_than_subtotal_clamps_to_zero() {
    let totals = compute_totals(&sample_items(), dec("5000"), false, Decimal::ZERO);
    assert_eq!(totals.after_discount, Decimal::ZERO);
    assert_eq!(totals.total_amount, Decimal::ZERO);
}

#[test]
fn vat_disabled_leaves_total_at_after_discount() {
    let totals = compute_totals(&sample_items(), dec("200"), false, Decimal::ZERO);
    assert_eq!(totals.vat, Decimal::ZERO);
    assert_eq!(totals.total_amount, totals.after_discount);
}

#[test]
fn vat_enabled_is_seven_percent_of_after_discount() {
    let totals = compute_totals(&sample_items(), dec("100"), true, Decimal::ZERO);
    assert_eq!(totals.after_discount, dec("1900"));
    assert_eq!(totals.vat, round2(dec("1900") * dec("0.07")));
    assert_eq!(totals.vat, dec("133.00"));
    assert_eq!(totals.total_amount, dec("2033.00"));
}

#[test]
fn vat_is_rounded_to_two_decimals() {
    // 1234.56 * 0.07 = 86.4192 -> 86.42
    let totals = compute_totals(&[item("1", "1234.56")], Decimal::ZERO, true, Decimal::ZERO);
    assert_eq!(totals.vat, dec("86.42"));
}

#[test]
fn net_total_subtracts_withholding() {
    let totals = compute_totals(&sample_items(), Decimal::ZERO, false, dec("60"));
    assert_eq!(totals.net_total, dec("1940"));
}

#[test]
fn net_total_goes_negative_when_withholding_exceeds_total() {
    // Withholding is deliberately not clamped
    let totals = compute_totals(&sample_items(), Decimal::ZERO, false, dec("2500"));
    assert_eq!(totals.total_amount, dec("2000"));
    assert_eq!(totals.net_total, dec("-500"));
}

#[test]
fn recompute_is_deterministic() {
    let first = compute_totals(&sample_items(), dec("150"), true, dec("30"));
    let second = compute_totals(&sample_items(), dec("150"), true, dec("30"));
    assert_eq!(first, second);
}

#[test]
fn empty_item_list_yields_zero_totals() {
    let totals = compute_totals(&[], Decimal::ZERO, true, Decimal::ZERO);
    assert_eq!(totals.subtotal, Decimal::ZERO);
    assert_eq!(totals.vat, Decimal::ZERO);
    assert_eq!(totals.total_amount, Decimal::ZERO);
    assert_eq!(totals.net_total, Decimal::ZERO);
}

#[test]
fn end_to_end_with_vat() {
    // items [{qty 2, price 500}, {qty 1, price 1000}], VAT on
    let totals = compute_totals(&sample_items(), Decimal::ZERO, true, Decimal::ZERO);
    assert_eq!(totals.subtotal, dec("2000"));
    assert_eq!(totals.after_discount, dec("2000"));
    assert_eq!(totals.vat, dec("140.00"));
    assert_eq!(totals.total_amount, dec("2140.00"));
    assert_eq!(totals.net_total, dec("2140.00"));
}

#[test]
fn end_to_end_with_discount_and_withholding() {
    // same items, discount 200, VAT off, withholding 50
    let totals = compute_totals(&sample_items(), dec("200"), false, dec("50"));
    assert_eq!(totals.subtotal, dec("2000"));
    assert_eq!(totals.after_discount, dec("1800"));
    assert_eq!(totals.vat, Decimal::ZERO);
    assert_eq!(totals.total_amount, dec("1800"));
    assert_eq!(totals.net_total, dec("1750"));
}
