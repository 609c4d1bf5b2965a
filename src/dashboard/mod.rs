//! The dashboard: aggregated view of the user's ledger plus the chart APIs.

mod aggregation;
mod api;
mod page;

pub(crate) use aggregation::{Totals, classification_map, compute_totals};
pub(crate) use api::{get_expense_breakdown, get_income_expense_trend};
pub(crate) use page::{create_transaction_endpoint, get_dashboard_page};
