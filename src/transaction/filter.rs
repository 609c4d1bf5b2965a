//! Filtering of the transaction list by date range and note text.
//!
//! Filters are applied in memory after fetching the user's transactions. The
//! per-user data sets are small enough that pushing the filters into SQL is
//! not worth the extra query plumbing.

use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

use crate::transaction::domain::Transaction;

const DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

/// Criteria for narrowing down the transaction list.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TransactionFilter {
    /// Keep transactions on or after this date.
    pub start_date: Option<Date>,
    /// Keep transactions on or before this date.
    pub end_date: Option<Date>,
    /// Keep transactions whose note contains this text, case-insensitively.
    pub note_fragment: Option<String>,
}

impl TransactionFilter {
    /// Build a filter from the raw query string values.
    ///
    /// Dates must be in 'YYYY-MM-DD' format. Values that are empty or do not
    /// parse are treated as absent so that a malformed link still renders the
    /// unfiltered page.
    pub fn parse(start_date: &str, end_date: &str, note: &str) -> Self {
        Self {
            start_date: Date::parse(start_date, DATE_FORMAT).ok(),
            end_date: Date::parse(end_date, DATE_FORMAT).ok(),
            note_fragment: match note.trim() {
                "" => None,
                fragment => Some(fragment.to_lowercase()),
            },
        }
    }

    /// Whether any criterion is set.
    pub fn is_active(&self) -> bool {
        self.start_date.is_some() || self.end_date.is_some() || self.note_fragment.is_some()
    }

    /// Whether `transaction` passes all set criteria.
    pub fn matches(&self, transaction: &Transaction) -> bool {
        let date = transaction.timestamp.date();

        if self.start_date.is_some_and(|start| date < start) {
            return false;
        }

        if self.end_date.is_some_and(|end| date > end) {
            return false;
        }

        if let Some(fragment) = &self.note_fragment {
            let note = transaction.note.as_deref().unwrap_or_default();

            if !note.to_lowercase().contains(fragment) {
                return false;
            }
        }

        true
    }

    /// Keep only the transactions that pass all set criteria.
    pub fn apply(&self, transactions: &[Transaction]) -> Vec<Transaction> {
        transactions
            .iter()
            .filter(|transaction| self.matches(transaction))
            .cloned()
            .collect()
    }
}
