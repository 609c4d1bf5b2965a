//! Core budget domain types and progress computation.

use serde::{Deserialize, Serialize};
use time::Month;

use crate::{Error, transaction::Transaction, user::UserID};

/// A monthly spending limit for one category.
///
/// There is at most one budget per (user, category, month, year), enforced by
/// a UNIQUE constraint. Submitting the same combination again overwrites the
/// amount.
#[derive(Debug, Clone, PartialEq)]
pub struct Budget {
    /// The budget's ID in the application database.
    pub id: i64,
    /// The name of the category the limit applies to.
    pub category: String,
    /// The spending limit, stored as submitted.
    pub amount: f64,
    /// The calendar month the limit applies to, 1 through 12.
    pub month: u8,
    /// The calendar year the limit applies to.
    pub year: i32,
    /// The user that owns this budget.
    pub user_id: UserID,
}

/// How far along a budget is for its month.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetProgress {
    /// The budget being tracked.
    pub budget: Budget,
    /// The total spent against the budget's category in its month.
    pub spent: f64,
    /// The amount left before the limit, negative when overspent.
    pub remaining: f64,
    /// How much of the limit is used, as a percentage clamped to 100.
    pub percentage: f64,
}

impl BudgetProgress {
    /// Compute the progress of `budget` against the user's transactions.
    ///
    /// Only transactions that name the budget's category and fall within the
    /// budget's calendar month count towards the spent total.
    pub fn compute(budget: Budget, transactions: &[Transaction]) -> Self {
        let spent: f64 = transactions
            .iter()
            .filter(|transaction| {
                transaction.category == budget.category
                    && transaction.timestamp.year() == budget.year
                    && u8::from(transaction.timestamp.month()) == budget.month
            })
            .map(|transaction| transaction.amount)
            .sum();

        let remaining = budget.amount - spent;
        let percentage = if budget.amount > 0.0 {
            (spent / budget.amount * 100.0).min(100.0)
        } else {
            0.0
        };

        Self {
            budget,
            spent,
            remaining,
            percentage,
        }
    }

    /// Whether the spent total has passed the limit.
    pub fn is_exceeded(&self) -> bool {
        self.remaining < 0.0
    }
}

/// The display name of a calendar month number, e.g. 8 -> "August".
///
/// # Errors
/// Returns an [Error::DateError] if `month` is not in 1 through 12.
pub fn month_name(month: u8) -> Result<&'static str, Error> {
    let month = Month::try_from(month).map_err(|error| Error::DateError(error.to_string()))?;

    Ok(match month {
        Month::January => "January",
        Month::February => "February",
        Month::March => "March",
        Month::April => "April",
        Month::May => "May",
        Month::June => "June",
        Month::July => "July",
        Month::August => "August",
        Month::September => "September",
        Month::October => "October",
        Month::November => "November",
        Month::December => "December",
    })
}

/// Form data for creating or overwriting a budget.
#[derive(Debug, Serialize, Deserialize)]
pub struct BudgetFormData {
    /// The category name the limit applies to.
    pub category: String,
    /// The limit amount as typed into the form.
    pub amount: String,
    /// The calendar month, 1 through 12.
    pub month: u8,
    /// The calendar year.
    pub year: i32,
}
