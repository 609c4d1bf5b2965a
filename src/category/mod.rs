//! The category registry.
//!
//! Categories classify transactions as income or expense. Transactions refer
//! to categories by name, so retyping or deleting a category changes how
//! historical transactions are reported.

mod db;
mod domain;
mod pages;

pub(crate) use db::{create_category_table, get_categories, seed_default_categories};
pub(crate) use domain::{Category, CategoryKind};
pub(crate) use pages::{create_category_endpoint, delete_category_endpoint, get_categories_page};

#[cfg(test)]
pub(crate) use db::create_category;
#[cfg(test)]
pub(crate) use domain::CategoryName;
