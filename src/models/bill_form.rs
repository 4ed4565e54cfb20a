//! Bill form state and the commands that edit it.
//!
//! The form round-trips through the browser as urlencoded fields. Each
//! submit carries an `action` naming the command to apply: rows are added
//! and removed here, and `calculate` validates the fields into a
//! [`BillInput`] for the proration engine. The last calculated bill rides
//! along as a JSON snapshot so edits keep showing its result.

use std::collections::BTreeMap;
use std::str::FromStr;

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::proration::requests::CalculateProrationRequest;
use crate::proration::{BillInput, FeeMethod, LineItem, OtherFee};

pub const TOTAL_BEFORE_FIELD: &str = "total_amount_before_discount";
pub const TOTAL_AFTER_FIELD: &str = "total_amount_after_discount";
pub const ACTION_FIELD: &str = "action";
pub const LAST_BILL_FIELD: &str = "last_bill";

/// Line item row as typed by the user
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ItemDraft {
    pub id: String,
    pub name: String,
    pub amount: String,
}

impl ItemDraft {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: String::new(),
            amount: "0".to_string(),
        }
    }
}

/// Other fee row as typed by the user
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeeDraft {
    pub id: String,
    pub name: String,
    pub amount: String,
    pub method: String,
}

impl FeeDraft {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: String::new(),
            amount: "0".to_string(),
            method: FeeMethod::Prorated.as_str().to_string(),
        }
    }
}

/// Mutable bill form, owned by the page between submits
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BillForm {
    pub total_amount_before_discount: String,
    pub total_amount_after_discount: String,
    pub items: Vec<ItemDraft>,
    pub other_fees: Vec<FeeDraft>,
    /// JSON snapshot of the bill behind the result currently shown
    pub last_bill: String,
}

/// Edits issued by the form buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormCommand {
    AddItem,
    RemoveItem(usize),
    AddFee,
    RemoveFee(usize),
    Recalculate,
}

/// Form submission that cannot be interpreted
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("Unknown form action '{0}'")]
    UnknownCommand(String),

    #[error("No {list} row at index {index} (form has {len})")]
    IndexOutOfRange {
        list: &'static str,
        index: usize,
        len: usize,
    },

    #[error("Malformed form field '{0}'")]
    MalformedField(String),
}

/// Validation failure for one field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl FromStr for FormCommand {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || FormError::UnknownCommand(s.to_string());
        let (name, index) = match s.split_once(':') {
            Some((name, index)) => (name, Some(index.parse::<usize>().map_err(|_| unknown())?)),
            None => (s, None),
        };

        match (name, index) {
            ("add_item", None) => Ok(FormCommand::AddItem),
            ("remove_item", Some(i)) => Ok(FormCommand::RemoveItem(i)),
            ("add_fee", None) => Ok(FormCommand::AddFee),
            ("remove_fee", Some(i)) => Ok(FormCommand::RemoveFee(i)),
            ("calculate", None) => Ok(FormCommand::Recalculate),
            _ => Err(unknown()),
        }
    }
}

impl FormCommand {
    /// Command named by the submitted `action` field; calculating when absent
    pub fn from_pairs(pairs: &[(String, String)]) -> Result<Self, FormError> {
        pairs
            .iter()
            .find(|(key, _)| key == ACTION_FIELD)
            .map(|(_, value)| value.parse())
            .unwrap_or(Ok(FormCommand::Recalculate))
    }
}

impl BillForm {
    /// Rebuild the form from submitted fields.
    ///
    /// Row fields are named `items-{i}-{field}` and `fees-{i}-{field}`.
    /// Rows keep their index order; gaps left by the browser are closed.
    pub fn from_pairs(pairs: &[(String, String)]) -> Result<Self, FormError> {
        let mut form = BillForm::default();
        let mut items: BTreeMap<usize, ItemDraft> = BTreeMap::new();
        let mut fees: BTreeMap<usize, FeeDraft> = BTreeMap::new();

        for (key, value) in pairs {
            match key.as_str() {
                TOTAL_BEFORE_FIELD => form.total_amount_before_discount = value.clone(),
                TOTAL_AFTER_FIELD => form.total_amount_after_discount = value.clone(),
                LAST_BILL_FIELD => form.last_bill = value.clone(),
                ACTION_FIELD => {}
                _ => {
                    let Some((list, index, field)) = split_row_key(key) else {
                        tracing::debug!("Ignoring unknown form field: {}", key);
                        continue;
                    };
                    let malformed = || FormError::MalformedField(key.clone());
                    match list {
                        "items" => {
                            let row = items.entry(index).or_default();
                            match field {
                                "id" => row.id = value.clone(),
                                "name" => row.name = value.clone(),
                                "amount" => row.amount = value.clone(),
                                _ => return Err(malformed()),
                            }
                        }
                        "fees" => {
                            let row = fees.entry(index).or_default();
                            match field {
                                "id" => row.id = value.clone(),
                                "name" => row.name = value.clone(),
                                "amount" => row.amount = value.clone(),
                                "method" => row.method = value.clone(),
                                _ => return Err(malformed()),
                            }
                        }
                        _ => return Err(malformed()),
                    }
                }
            }
        }

        form.items = items
            .into_values()
            .map(|mut row| {
                if row.id.is_empty() {
                    row.id = Uuid::new_v4().to_string();
                }
                row
            })
            .collect();
        form.other_fees = fees
            .into_values()
            .map(|mut row| {
                if row.id.is_empty() {
                    row.id = Uuid::new_v4().to_string();
                }
                if row.method.is_empty() {
                    row.method = FeeMethod::Prorated.as_str().to_string();
                }
                row
            })
            .collect();

        Ok(form)
    }

    /// Apply an editing command. `Recalculate` leaves the form untouched.
    pub fn apply(&mut self, command: FormCommand) -> Result<(), FormError> {
        match command {
            FormCommand::AddItem => self.items.push(ItemDraft::new()),
            FormCommand::AddFee => self.other_fees.push(FeeDraft::new()),
            FormCommand::RemoveItem(index) => {
                if index >= self.items.len() {
                    return Err(FormError::IndexOutOfRange {
                        list: "item",
                        index,
                        len: self.items.len(),
                    });
                }
                self.items.remove(index);
            }
            FormCommand::RemoveFee(index) => {
                if index >= self.other_fees.len() {
                    return Err(FormError::IndexOutOfRange {
                        list: "fee",
                        index,
                        len: self.other_fees.len(),
                    });
                }
                self.other_fees.remove(index);
            }
            FormCommand::Recalculate => {}
        }
        Ok(())
    }

    /// Bill from the last successful calculation, if the page carries one
    pub fn last_calculated(&self) -> Option<BillInput> {
        if self.last_bill.is_empty() {
            return None;
        }
        let request: CalculateProrationRequest = match serde_json::from_str(&self.last_bill) {
            Ok(request) => request,
            Err(e) => {
                tracing::debug!("Discarding unreadable bill snapshot: {}", e);
                return None;
            }
        };
        match request.into_input() {
            Ok(input) => Some(input),
            Err(e) => {
                tracing::debug!("Discarding invalid bill snapshot: {}", e);
                None
            }
        }
    }

    /// Remember `input` as the bill behind the shown result
    pub fn remember(&mut self, input: &BillInput) {
        match serde_json::to_string(&CalculateProrationRequest::from(input)) {
            Ok(json) => self.last_bill = json,
            Err(e) => {
                tracing::warn!("Failed to snapshot bill: {}", e);
                self.last_bill.clear();
            }
        }
    }

    /// Check every field and build the engine input.
    ///
    /// All problems are reported, not just the first one.
    pub fn validate(&self) -> Result<BillInput, Vec<FieldError>> {
        let mut errors = Vec::new();

        let total_before = parse_amount(
            &self.total_amount_before_discount,
            TOTAL_BEFORE_FIELD,
            "Total amount before discount",
            &mut errors,
        );
        let total_after = parse_amount(
            &self.total_amount_after_discount,
            TOTAL_AFTER_FIELD,
            "Total amount after discount",
            &mut errors,
        );

        let items: Vec<Option<LineItem>> = self
            .items
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let amount = parse_amount(
                    &row.amount,
                    &format!("items-{i}-amount"),
                    &format!("Item {} amount", i + 1),
                    &mut errors,
                )?;
                Some(LineItem {
                    id: row.id.clone(),
                    name: row.name.trim().to_string(),
                    amount,
                })
            })
            .collect();

        let other_fees: Vec<Option<OtherFee>> = self
            .other_fees
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let amount = parse_amount(
                    &row.amount,
                    &format!("fees-{i}-amount"),
                    &format!("Fee {} amount", i + 1),
                    &mut errors,
                );
                let method = match row.method.parse::<FeeMethod>() {
                    Ok(method) => Some(method),
                    Err(e) => {
                        errors.push(FieldError::new(
                            format!("fees-{i}-method"),
                            format!("Fee {} method: {}", i + 1, e),
                        ));
                        None
                    }
                };
                Some(OtherFee {
                    id: row.id.clone(),
                    name: row.name.trim().to_string(),
                    amount: amount?,
                    method: method?,
                })
            })
            .collect();

        if !errors.is_empty() {
            return Err(errors);
        }

        // No errors means every field parsed
        match (total_before, total_after) {
            (Some(before), Some(after)) => Ok(BillInput {
                total_amount_before_discount: before,
                total_amount_after_discount: after,
                items: items.into_iter().flatten().collect(),
                other_fees: other_fees.into_iter().flatten().collect(),
            }),
            _ => Err(errors),
        }
    }
}

/// `items-3-amount` -> ("items", 3, "amount")
fn split_row_key(key: &str) -> Option<(&str, usize, &str)> {
    let mut parts = key.splitn(3, '-');
    let list = parts.next()?;
    let index = parts.next()?.parse().ok()?;
    let field = parts.next()?;
    Some((list, index, field))
}

fn parse_amount(
    raw: &str,
    field: &str,
    label: &str,
    errors: &mut Vec<FieldError>,
) -> Option<Decimal> {
    let raw = raw.trim();
    if raw.is_empty() {
        errors.push(FieldError::new(field, format!("{label} is required")));
        return None;
    }
    match Decimal::from_str(raw) {
        Ok(amount) if amount.is_sign_negative() && !amount.is_zero() => {
            errors.push(FieldError::new(field, format!("{label} must not be negative")));
            None
        }
        Ok(amount) => Some(amount),
        Err(_) => {
            errors.push(FieldError::new(field, format!("{label} must be a number")));
            None
        }
    }
}
