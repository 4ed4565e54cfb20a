//! Response DTOs for the proration API.

use rust_decimal::Decimal;
use serde::Serialize;

use super::calculators::CalculationError;
use super::models::{AllocatedFee, BillResult, LineItemResult};

/// Fee share charged to one item
#[derive(Debug, Serialize)]
pub struct AllocatedFeeResponse {
    pub fee_id: String,
    pub name: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
}

/// Per-item breakdown
#[derive(Debug, Serialize)]
pub struct LineItemResultResponse {
    pub id: String,
    pub name: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub amount_before_discount: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub amount_after_discount: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub discount: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub prorated_percentage: Decimal,
    pub other_fees: Vec<AllocatedFeeResponse>,
    #[serde(with = "rust_decimal::serde::str")]
    pub final_amount: Decimal,
}

/// Response for a proration run
#[derive(Debug, Serialize)]
pub struct ProrationResponse {
    pub items: Vec<LineItemResultResponse>,
    #[serde(with = "rust_decimal::serde::str")]
    pub total_amount_before_discount: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub total_discount: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub total_amount_after_discount: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub total_fees: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub total_final_amount: Decimal,
}

/// Generic proration error response
#[derive(Debug, Serialize)]
pub struct ProrationErrorResponse {
    pub error_type: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl From<AllocatedFee> for AllocatedFeeResponse {
    fn from(fee: AllocatedFee) -> Self {
        Self {
            fee_id: fee.fee_id,
            name: fee.name,
            amount: fee.amount,
        }
    }
}

impl From<LineItemResult> for LineItemResultResponse {
    fn from(item: LineItemResult) -> Self {
        Self {
            id: item.id,
            name: item.name,
            amount_before_discount: item.amount_before_discount,
            amount_after_discount: item.amount_after_discount,
            discount: item.discount,
            prorated_percentage: item.prorated_percentage,
            other_fees: item.allocated_fees.into_iter().map(Into::into).collect(),
            final_amount: item.final_amount,
        }
    }
}

impl From<BillResult> for ProrationResponse {
    fn from(result: BillResult) -> Self {
        Self {
            items: result.items.into_iter().map(Into::into).collect(),
            total_amount_before_discount: result.total_amount_before_discount,
            total_discount: result.total_discount,
            total_amount_after_discount: result.total_amount_after_discount,
            total_fees: result.total_fees,
            total_final_amount: result.total_final_amount,
        }
    }
}

impl From<&CalculationError> for ProrationErrorResponse {
    fn from(err: &CalculationError) -> Self {
        let details = match err {
            CalculationError::DivisionByZero { denominator } => {
                serde_json::json!({ "denominator": denominator })
            }
            CalculationError::Overflow { context } => serde_json::json!({ "context": context }),
        };
        Self {
            error_type: err.kind().to_string(),
            message: err.to_string(),
            details: Some(details),
        }
    }
}
