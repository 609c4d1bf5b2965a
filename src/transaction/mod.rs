//! The transaction ledger.
//!
//! A transaction records a single amount of money against a category name.
//! Whether it counts as income or expense is decided by the kind of the
//! category it names.

mod db;
mod domain;
mod endpoints;
mod filter;
mod form;

pub(crate) use db::{create_transaction, create_transaction_table, get_transactions};
pub(crate) use domain::{RecurrenceKind, Transaction, TransactionFormData};
pub(crate) use endpoints::{
    delete_transaction_endpoint, get_edit_transaction_page, update_transaction_endpoint,
};
pub(crate) use filter::TransactionFilter;
pub(crate) use form::validate_transaction_form;
