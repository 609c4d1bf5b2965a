//! Monthly budgets and their progress tracking.

mod db;
mod domain;
mod page;

pub(crate) use db::create_budget_table;
pub(crate) use domain::month_name;
pub(crate) use page::{get_budgets_page, upsert_budget_endpoint};
