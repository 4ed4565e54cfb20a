//! Proration engine module.
//!
//! Distributes a bill's discount and ancillary fees across its line items.
//! The engine itself is pure; the page handlers and the JSON API call it.

pub mod calculators;
pub mod format;
pub mod models;
pub mod requests;
pub mod responses;
pub mod routes;

// Re-export commonly used items
pub use calculators::{prorate_bill, round_money, CalculationError};
pub use models::{AllocatedFee, BillInput, BillResult, FeeMethod, LineItem, LineItemResult, OtherFee};
pub use routes::router;
