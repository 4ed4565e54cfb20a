//! Core proration calculation functions.
//!
//! Pure functions for proration math - no I/O, no rounding. Rounding is a
//! display concern and lives in [`crate::proration::format`].

use rust_decimal::prelude::*;
use rust_decimal::Decimal;

use super::models::{AllocatedFee, BillInput, BillResult, FeeMethod, LineItem, LineItemResult};

const TOTAL_BEFORE_DISCOUNT: &str = "total amount before discount";
const NUMBER_OF_ITEMS: &str = "number of items";

/// Errors raised by the proration engine
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CalculationError {
    #[error("Cannot prorate: {denominator} is zero")]
    DivisionByZero { denominator: &'static str },

    #[error("Amount too large while computing {context}")]
    Overflow { context: &'static str },
}

impl CalculationError {
    /// Stable machine-readable name, used by the JSON API
    pub fn kind(&self) -> &'static str {
        match self {
            CalculationError::DivisionByZero { .. } => "division_by_zero",
            CalculationError::Overflow { .. } => "overflow",
        }
    }
}

/// Round to specified decimal places, halves away from zero.
///
/// This matches fixed-point display formatting, so every amount on the
/// result page is rounded the same way.
///
/// # Examples
/// ```
/// use rust_decimal_macros::dec;
/// use prorate_bill::proration::round_money;
///
/// assert_eq!(round_money(dec!(2.345), 2), dec!(2.35));
/// assert_eq!(round_money(dec!(-2.345), 2), dec!(-2.35));
/// assert_eq!(round_money(dec!(1.234), 2), dec!(1.23));
/// ```
pub fn round_money(amount: Decimal, places: u32) -> Decimal {
    amount.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero)
}

/// Distribute the discount and ancillary fees of a bill across its items.
///
/// For every item, `prorate = amount / total_amount_before_discount`. The
/// discounted amount is `total_amount_after_discount * prorate`; a
/// `Prorated` fee contributes `fee * prorate` and an `Equal` fee
/// contributes `fee / number_of_items`. Item and fee order is preserved.
///
/// The returned `total_amount_before_discount` is the sum of item amounts,
/// not the declared total, so an inconsistent input is visible in the
/// result.
///
/// # Errors
/// * [`CalculationError::DivisionByZero`] when there are items and the
///   declared pre-discount total is zero, or when there are no items but an
///   `Equal` fee needs splitting.
/// * [`CalculationError::Overflow`] when an intermediate amount does not fit
///   in a `Decimal`.
pub fn prorate_bill(input: &BillInput) -> Result<BillResult, CalculationError> {
    let has_equal_fee = input
        .other_fees
        .iter()
        .any(|fee| fee.method == FeeMethod::Equal);

    if input.items.is_empty() && has_equal_fee {
        return Err(CalculationError::DivisionByZero {
            denominator: NUMBER_OF_ITEMS,
        });
    }

    let number_of_items = Decimal::from(input.items.len());

    let items = input
        .items
        .iter()
        .map(|item| prorate_item(item, input, number_of_items))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(BillResult {
        total_amount_before_discount: checked_sum(
            items.iter().map(|r| r.amount_before_discount),
            TOTAL_BEFORE_DISCOUNT,
        )?,
        total_discount: checked_sum(items.iter().map(|r| r.discount), "total discount")?,
        total_amount_after_discount: checked_sum(
            items.iter().map(|r| r.amount_after_discount),
            "total amount after discount",
        )?,
        total_fees: checked_sum(
            items.iter().flat_map(|r| r.allocated_fees.iter().map(|f| f.amount)),
            "total fees",
        )?,
        total_final_amount: checked_sum(items.iter().map(|r| r.final_amount), "total final amount")?,
        items,
    })
}

/// Prorate a single line item against the bill totals
fn prorate_item(
    item: &LineItem,
    input: &BillInput,
    number_of_items: Decimal,
) -> Result<LineItemResult, CalculationError> {
    let prorate = checked_div(item.amount, input.total_amount_before_discount, TOTAL_BEFORE_DISCOUNT)?;
    let amount_after_discount = checked_mul(
        input.total_amount_after_discount,
        prorate,
        "amount after discount",
    )?;
    let discount = item
        .amount
        .checked_sub(amount_after_discount)
        .ok_or(CalculationError::Overflow { context: "discount" })?;

    let allocated_fees = input
        .other_fees
        .iter()
        .map(|fee| {
            let amount = match fee.method {
                FeeMethod::Prorated => checked_mul(fee.amount, prorate, "prorated fee")?,
                FeeMethod::Equal => checked_div(fee.amount, number_of_items, NUMBER_OF_ITEMS)?,
            };
            Ok(AllocatedFee {
                fee_id: fee.id.clone(),
                name: fee.name.clone(),
                amount,
            })
        })
        .collect::<Result<Vec<_>, CalculationError>>()?;

    let fees_total = checked_sum(allocated_fees.iter().map(|f| f.amount), "item fees")?;
    let final_amount = amount_after_discount
        .checked_add(fees_total)
        .ok_or(CalculationError::Overflow { context: "final amount" })?;

    Ok(LineItemResult {
        id: item.id.clone(),
        name: item.name.clone(),
        amount_before_discount: item.amount,
        amount_after_discount,
        discount,
        prorated_percentage: checked_mul(prorate, Decimal::ONE_HUNDRED, "prorated percentage")?,
        allocated_fees,
        final_amount,
    })
}

fn checked_div(
    numerator: Decimal,
    denominator: Decimal,
    name: &'static str,
) -> Result<Decimal, CalculationError> {
    if denominator.is_zero() {
        return Err(CalculationError::DivisionByZero { denominator: name });
    }
    numerator
        .checked_div(denominator)
        .ok_or(CalculationError::Overflow { context: name })
}

fn checked_mul(a: Decimal, b: Decimal, context: &'static str) -> Result<Decimal, CalculationError> {
    a.checked_mul(b).ok_or(CalculationError::Overflow { context })
}

fn checked_sum(
    mut values: impl Iterator<Item = Decimal>,
    context: &'static str,
) -> Result<Decimal, CalculationError> {
    values.try_fold(Decimal::ZERO, |acc, v| {
        acc.checked_add(v).ok_or(CalculationError::Overflow { context })
    })
}
