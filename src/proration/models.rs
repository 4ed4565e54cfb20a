//! Domain models for bill proration.
//!
//! Inputs are built by the form layer (or the JSON API) after field
//! validation; results are produced by [`crate::proration::prorate_bill`].

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;

/// How an ancillary fee is spread across line items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeeMethod {
    /// In proportion to each item's share of the pre-discount total
    #[default]
    Prorated,
    /// Same amount for every item
    Equal,
}

impl FeeMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeeMethod::Prorated => "prorated",
            FeeMethod::Equal => "equally",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FeeMethod::Prorated => "Prorated",
            FeeMethod::Equal => "Equally",
        }
    }

    pub fn all() -> [FeeMethod; 2] {
        [FeeMethod::Prorated, FeeMethod::Equal]
    }
}

impl fmt::Display for FeeMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a fee method string is not recognised
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown fee method '{0}' (expected 'prorated' or 'equally')")]
pub struct UnknownFeeMethod(pub String);

impl FromStr for FeeMethod {
    type Err = UnknownFeeMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "prorated" | "prorate" => Ok(FeeMethod::Prorated),
            "equally" | "equal" => Ok(FeeMethod::Equal),
            other => Err(UnknownFeeMethod(other.to_string())),
        }
    }
}

/// A single billable entry (a person or a product)
#[derive(Debug, Clone, PartialEq)]
pub struct LineItem {
    pub id: String,
    pub name: String,
    pub amount: Decimal,
}

/// An additional charge spread across the line items
#[derive(Debug, Clone, PartialEq)]
pub struct OtherFee {
    pub id: String,
    pub name: String,
    pub amount: Decimal,
    pub method: FeeMethod,
}

/// Validated bill as entered by the user
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BillInput {
    pub total_amount_before_discount: Decimal,
    pub total_amount_after_discount: Decimal,
    pub items: Vec<LineItem>,
    pub other_fees: Vec<OtherFee>,
}

/// Share of one fee charged to one line item
#[derive(Debug, Clone, PartialEq)]
pub struct AllocatedFee {
    pub fee_id: String,
    pub name: String,
    pub amount: Decimal,
}

/// Prorated breakdown for one line item
#[derive(Debug, Clone, PartialEq)]
pub struct LineItemResult {
    pub id: String,
    pub name: String,
    pub amount_before_discount: Decimal,
    pub amount_after_discount: Decimal,
    pub discount: Decimal,
    /// Share of the pre-discount total, 0 to 100
    pub prorated_percentage: Decimal,
    pub allocated_fees: Vec<AllocatedFee>,
    pub final_amount: Decimal,
}

impl LineItemResult {
    pub fn total_fees(&self) -> Decimal {
        self.allocated_fees.iter().map(|f| f.amount).sum()
    }
}

/// Result of a proration run, items in input order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BillResult {
    pub items: Vec<LineItemResult>,
    /// Sum of item amounts, recomputed rather than copied from the input
    pub total_amount_before_discount: Decimal,
    pub total_discount: Decimal,
    pub total_amount_after_discount: Decimal,
    pub total_fees: Decimal,
    pub total_final_amount: Decimal,
}
