//! Core transaction domain types.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::user::UserID;

/// How often a recurring transaction repeats.
///
/// Recurrence is descriptive only. Each occurrence is entered as its own
/// transaction, the flag just marks the entry as part of a repeating series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecurrenceKind {
    /// The transaction repeats every week.
    Weekly,
    /// The transaction repeats every month.
    Monthly,
    /// The transaction repeats every year.
    Yearly,
}

impl RecurrenceKind {
    /// The canonical string stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            RecurrenceKind::Weekly => "weekly",
            RecurrenceKind::Monthly => "monthly",
            RecurrenceKind::Yearly => "yearly",
        }
    }

    /// Parse the canonical database string back into a kind.
    pub fn from_db_str(value: &str) -> Option<Self> {
        match value {
            "weekly" => Some(RecurrenceKind::Weekly),
            "monthly" => Some(RecurrenceKind::Monthly),
            "yearly" => Some(RecurrenceKind::Yearly),
            _ => None,
        }
    }
}

/// Database identifier for a transaction.
pub type TransactionId = i64;

/// A single income or expense entry in the user's ledger.
///
/// Transactions refer to their category by name rather than by ID, so the
/// category string may not match any existing category row if the category
/// was since retyped or renamed.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    /// The transaction's ID in the application database.
    pub id: TransactionId,
    /// The amount of money, always greater than zero. Whether it counts as
    /// income or expense is decided by the category's kind.
    pub amount: f64,
    /// The name of the category this transaction belongs to.
    pub category: String,
    /// An optional free-text description.
    pub note: Option<String>,
    /// When the transaction happened.
    pub timestamp: OffsetDateTime,
    /// Whether this entry is part of a repeating series.
    pub is_recurring: bool,
    /// How often the series repeats, set only when `is_recurring` is true.
    pub recurrence: Option<RecurrenceKind>,
    /// The user that owns this transaction.
    pub user_id: UserID,
}

/// Form data for creating or updating a transaction.
///
/// The amount and date arrive as strings and are validated by the endpoint,
/// so that bad input can be reported back on the form instead of failing
/// deserialization with a bare 422.
#[derive(Debug, Serialize, Deserialize)]
pub struct TransactionFormData {
    /// The amount as typed into the form.
    pub amount: String,
    /// The category name selected in the form.
    pub category: String,
    /// An optional free-text description.
    #[serde(default)]
    pub note: String,
    /// The date-time string from the form's datetime-local input, e.g.
    /// "2025-08-31T14:30". An empty string means "now".
    #[serde(default)]
    pub date: String,
    /// Present when the recurring checkbox is ticked.
    #[serde(default)]
    pub is_recurring: Option<String>,
    /// The selected recurrence interval.
    #[serde(default)]
    pub recurrence: Option<RecurrenceKind>,
}

#[cfg(test)]
mod recurrence_kind_tests {
    use super::RecurrenceKind;

    #[test]
    fn db_string_round_trips() {
        for kind in [
            RecurrenceKind::Weekly,
            RecurrenceKind::Monthly,
            RecurrenceKind::Yearly,
        ] {
            assert_eq!(RecurrenceKind::from_db_str(kind.as_str()), Some(kind));
        }
    }

    #[test]
    fn from_db_str_rejects_unknown_value() {
        assert_eq!(RecurrenceKind::from_db_str("daily"), None);
    }

    #[test]
    fn form_value_deserializes_lowercase() {
        let kind: RecurrenceKind = serde_json::from_str(r#""monthly""#).unwrap();

        assert_eq!(kind, RecurrenceKind::Monthly);
    }
}
