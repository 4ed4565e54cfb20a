//! Form models for the bill page

pub mod bill_form;

pub use bill_form::{BillForm, FeeDraft, FieldError, FormCommand, FormError, ItemDraft};
