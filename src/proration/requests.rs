//! Request DTOs for the proration API.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::models::{BillInput, FeeMethod, LineItem, OtherFee, UnknownFeeMethod};

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

fn default_method() -> String {
    FeeMethod::Prorated.as_str().to_string()
}

/// Request to prorate a bill
///
/// Also used as the snapshot of the last calculated bill on the page.
#[derive(Debug, Serialize, Deserialize)]
pub struct CalculateProrationRequest {
    #[serde(with = "rust_decimal::serde::str")]
    pub total_amount_before_discount: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub total_amount_after_discount: Decimal,
    pub items: Vec<LineItemRequest>,
    #[serde(default)]
    pub other_fees: Vec<OtherFeeRequest>,
}

/// A line item in the request
#[derive(Debug, Serialize, Deserialize)]
pub struct LineItemRequest {
    #[serde(default = "new_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
}

/// An ancillary fee in the request
#[derive(Debug, Serialize, Deserialize)]
pub struct OtherFeeRequest {
    #[serde(default = "new_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
    #[serde(default = "default_method")]
    pub method: String,
}

/// A request field that fails the checks the form layer would apply
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidRequest {
    #[error("{field} must not be negative")]
    NegativeAmount { field: String },

    #[error("{field}: {source}")]
    Method {
        field: String,
        source: UnknownFeeMethod,
    },
}

impl CalculateProrationRequest {
    /// Convert into engine input, rejecting negative amounts and unknown methods
    pub fn into_input(self) -> Result<BillInput, InvalidRequest> {
        let items = self
            .items
            .into_iter()
            .enumerate()
            .map(|(i, item)| {
                non_negative(item.amount, || format!("items[{i}].amount"))?;
                Ok(LineItem {
                    id: item.id,
                    name: item.name,
                    amount: item.amount,
                })
            })
            .collect::<Result<Vec<_>, InvalidRequest>>()?;

        let other_fees = self
            .other_fees
            .into_iter()
            .enumerate()
            .map(|(i, fee)| {
                non_negative(fee.amount, || format!("other_fees[{i}].amount"))?;
                let method = fee.method.parse::<FeeMethod>().map_err(|source| InvalidRequest::Method {
                    field: format!("other_fees[{i}].method"),
                    source,
                })?;
                Ok(OtherFee {
                    id: fee.id,
                    name: fee.name,
                    amount: fee.amount,
                    method,
                })
            })
            .collect::<Result<Vec<_>, InvalidRequest>>()?;

        Ok(BillInput {
            total_amount_before_discount: self.total_amount_before_discount,
            total_amount_after_discount: self.total_amount_after_discount,
            items,
            other_fees,
        })
    }
}

impl From<&BillInput> for CalculateProrationRequest {
    fn from(input: &BillInput) -> Self {
        Self {
            total_amount_before_discount: input.total_amount_before_discount,
            total_amount_after_discount: input.total_amount_after_discount,
            items: input
                .items
                .iter()
                .map(|item| LineItemRequest {
                    id: item.id.clone(),
                    name: item.name.clone(),
                    amount: item.amount,
                })
                .collect(),
            other_fees: input
                .other_fees
                .iter()
                .map(|fee| OtherFeeRequest {
                    id: fee.id.clone(),
                    name: fee.name.clone(),
                    amount: fee.amount,
                    method: fee.method.as_str().to_string(),
                })
                .collect(),
        }
    }
}

fn non_negative(amount: Decimal, field: impl FnOnce() -> String) -> Result<(), InvalidRequest> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(InvalidRequest::NegativeAmount { field: field() });
    }
    Ok(())
}
