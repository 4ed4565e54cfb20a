//! Prorate bill page handlers

use askama::Template;
use axum::{
    extract::{Form, State},
    response::Html,
};

use crate::config::Config;
use crate::error::Result;
use crate::models::{BillForm, FieldError, FormCommand};
use crate::proration::format::{format_money, format_percentage};
use crate::proration::{prorate_bill, BillResult, FeeMethod, LineItemResult};
use crate::AppState;

/// Fee method option in the select box
struct MethodOption {
    value: &'static str,
    label: &'static str,
    selected: bool,
}

struct ItemRow {
    index: usize,
    id: String,
    name: String,
    amount: String,
}

struct FeeRow {
    index: usize,
    id: String,
    name: String,
    amount: String,
    methods: Vec<MethodOption>,
}

struct FeeLine {
    name: String,
    amount: String,
}

struct ResultCard {
    name: String,
    percentage: String,
    amount_before_discount: String,
    discount: String,
    amount_after_discount: String,
    fees: Vec<FeeLine>,
    has_fees: bool,
    final_amount: String,
}

struct ResultSummary {
    cards: Vec<ResultCard>,
    total_amount_before_discount: String,
    total_discount: String,
    total_fees: String,
    total_final_amount: String,
}

/// Prorate bill page template
#[derive(Template)]
#[template(path = "prorate_bill.html")]
struct ProrateBillTemplate {
    currency_label: String,
    total_amount_before_discount: String,
    total_amount_after_discount: String,
    items: Vec<ItemRow>,
    fees: Vec<FeeRow>,
    field_errors: Vec<FieldError>,
    has_field_errors: bool,
    calculation_error: Option<String>,
    result: Option<ResultSummary>,
    last_bill: String,
}

/// What the page shows next to the form
#[derive(Default)]
struct Outcome {
    field_errors: Vec<FieldError>,
    calculation_error: Option<String>,
    result: Option<BillResult>,
}

/// Empty calculator
pub async fn show(State(state): State<AppState>) -> Result<Html<String>> {
    render(&state.config, &BillForm::default(), Outcome::default())
}

/// Apply the submitted command and re-render.
///
/// A shown result stays until the next successful or failed calculation;
/// editing rows or submitting invalid fields keeps the previous one.
pub async fn submit(
    State(state): State<AppState>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Html<String>> {
    let mut form = BillForm::from_pairs(&pairs)?;
    let command = FormCommand::from_pairs(&pairs)?;

    let outcome = match command {
        FormCommand::Recalculate => match form.validate() {
            Ok(input) => match prorate_bill(&input) {
                Ok(result) => {
                    tracing::debug!(
                        items = input.items.len(),
                        fees = input.other_fees.len(),
                        "Prorated bill"
                    );
                    form.remember(&input);
                    Outcome {
                        result: Some(result),
                        ..Outcome::default()
                    }
                }
                Err(e) => {
                    tracing::debug!("Proration failed: {}", e);
                    form.last_bill.clear();
                    Outcome {
                        calculation_error: Some(e.to_string()),
                        ..Outcome::default()
                    }
                }
            },
            Err(errors) => {
                tracing::debug!("Bill form has {} invalid fields", errors.len());
                Outcome {
                    field_errors: errors,
                    result: previous_result(&mut form),
                    ..Outcome::default()
                }
            }
        },
        edit => {
            form.apply(edit)?;
            Outcome {
                result: previous_result(&mut form),
                ..Outcome::default()
            }
        }
    };

    render(&state.config, &form, outcome)
}

/// Recompute the result of the remembered bill, forgetting it if unusable
fn previous_result(form: &mut BillForm) -> Option<BillResult> {
    let result = form
        .last_calculated()
        .and_then(|input| prorate_bill(&input).ok());
    if result.is_none() {
        form.last_bill.clear();
    }
    result
}

fn render(config: &Config, form: &BillForm, outcome: Outcome) -> Result<Html<String>> {
    let Outcome {
        field_errors,
        calculation_error,
        result,
    } = outcome;

    let template = ProrateBillTemplate {
        currency_label: config.currency_label.clone(),
        total_amount_before_discount: form.total_amount_before_discount.clone(),
        total_amount_after_discount: form.total_amount_after_discount.clone(),
        items: form
            .items
            .iter()
            .enumerate()
            .map(|(index, row)| ItemRow {
                index,
                id: row.id.clone(),
                name: row.name.clone(),
                amount: row.amount.clone(),
            })
            .collect(),
        fees: form
            .other_fees
            .iter()
            .enumerate()
            .map(|(index, row)| FeeRow {
                index,
                id: row.id.clone(),
                name: row.name.clone(),
                amount: row.amount.clone(),
                methods: method_options(&row.method),
            })
            .collect(),
        has_field_errors: !field_errors.is_empty(),
        field_errors,
        calculation_error,
        result: result.map(|result| summarize(config, &result)),
        last_bill: form.last_bill.clone(),
    };

    Ok(Html(template.render()?))
}

fn method_options(current: &str) -> Vec<MethodOption> {
    let current = current.parse::<FeeMethod>().unwrap_or_default();
    FeeMethod::all()
        .into_iter()
        .map(|method| MethodOption {
            value: method.as_str(),
            label: method.label(),
            selected: method == current,
        })
        .collect()
}

fn summarize(config: &Config, result: &BillResult) -> ResultSummary {
    let money = |amount| format_money(amount, &config.currency_label, config.display_decimals);

    ResultSummary {
        cards: result
            .items
            .iter()
            .map(|item: &LineItemResult| ResultCard {
                name: item.name.clone(),
                percentage: format_percentage(item.prorated_percentage, config.display_decimals),
                amount_before_discount: money(item.amount_before_discount),
                discount: money(item.discount),
                amount_after_discount: money(item.amount_after_discount),
                fees: item
                    .allocated_fees
                    .iter()
                    .map(|fee| FeeLine {
                        name: fee.name.clone(),
                        amount: money(fee.amount),
                    })
                    .collect(),
                has_fees: !item.allocated_fees.is_empty(),
                final_amount: money(item.final_amount),
            })
            .collect(),
        total_amount_before_discount: money(result.total_amount_before_discount),
        total_discount: money(result.total_discount),
        total_fees: money(result.total_fees),
        total_final_amount: money(result.total_final_amount),
    }
}
