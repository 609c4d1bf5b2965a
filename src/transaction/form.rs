//! Validation of submitted transaction forms.

use time::{
    OffsetDateTime, PrimitiveDateTime, format_description::BorrowedFormatItem,
    macros::format_description,
};

use crate::{
    Error,
    transaction::domain::{RecurrenceKind, TransactionFormData},
};

// The value format of an HTML datetime-local input.
const FORM_DATE_FORMAT: &[BorrowedFormatItem] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]");

/// The validated values of a transaction form.
#[derive(Debug, PartialEq)]
pub struct ValidatedTransactionForm {
    /// The amount of money, greater than zero.
    pub amount: f64,
    /// The category name.
    pub category: String,
    /// The note, with an empty submission mapped to `None`.
    pub note: Option<String>,
    /// When the transaction happened, in UTC.
    pub timestamp: OffsetDateTime,
    /// Whether the recurring checkbox was ticked.
    pub is_recurring: bool,
    /// The recurrence interval, kept only for recurring entries.
    pub recurrence: Option<RecurrenceKind>,
}

/// Validate a submitted transaction form.
///
/// # Errors
/// Returns:
/// - [Error::InvalidAmount] if the amount does not parse as a number greater
///   than zero.
/// - [Error::DateError] if the date string is non-empty but not in the
///   datetime-local format 'YYYY-MM-DDTHH:MM'.
pub fn validate_transaction_form(
    form: &TransactionFormData,
) -> Result<ValidatedTransactionForm, Error> {
    let amount: f64 = form
        .amount
        .trim()
        .parse()
        .map_err(|_| Error::InvalidAmount)?;

    if !amount.is_finite() || amount <= 0.0 {
        return Err(Error::InvalidAmount);
    }

    let timestamp = match form.date.trim() {
        "" => OffsetDateTime::now_utc(),
        date => PrimitiveDateTime::parse(date, FORM_DATE_FORMAT)
            .map_err(|error| Error::DateError(error.to_string()))?
            .assume_utc(),
    };

    let note = match form.note.trim() {
        "" => None,
        note => Some(note.to_string()),
    };

    let is_recurring = form.is_recurring.is_some();

    Ok(ValidatedTransactionForm {
        amount,
        category: form.category.clone(),
        note,
        timestamp,
        is_recurring,
        recurrence: if is_recurring { form.recurrence } else { None },
    })
}

#[cfg(test)]
mod transaction_form_tests {
    use time::macros::datetime;

    use crate::{
        Error,
        transaction::domain::{RecurrenceKind, TransactionFormData},
    };

    use super::validate_transaction_form;

    fn test_form() -> TransactionFormData {
        TransactionFormData {
            amount: "12.50".to_string(),
            category: "Food".to_string(),
            note: "weekly shop".to_string(),
            date: "2025-08-31T14:30".to_string(),
            is_recurring: None,
            recurrence: None,
        }
    }

    #[test]
    fn valid_form_passes() {
        let validated = validate_transaction_form(&test_form()).unwrap();

        assert_eq!(validated.amount, 12.5);
        assert_eq!(validated.category, "Food");
        assert_eq!(validated.note.as_deref(), Some("weekly shop"));
        assert_eq!(validated.timestamp, datetime!(2025-08-31 14:30 UTC));
        assert!(!validated.is_recurring);
    }

    #[test]
    fn non_numeric_amount_fails() {
        let form = TransactionFormData {
            amount: "a lot".to_string(),
            ..test_form()
        };

        assert_eq!(validate_transaction_form(&form), Err(Error::InvalidAmount));
    }

    #[test]
    fn zero_amount_fails() {
        let form = TransactionFormData {
            amount: "0".to_string(),
            ..test_form()
        };

        assert_eq!(validate_transaction_form(&form), Err(Error::InvalidAmount));
    }

    #[test]
    fn negative_amount_fails() {
        let form = TransactionFormData {
            amount: "-3".to_string(),
            ..test_form()
        };

        assert_eq!(validate_transaction_form(&form), Err(Error::InvalidAmount));
    }

    #[test]
    fn malformed_date_fails() {
        let form = TransactionFormData {
            date: "31/08/2025".to_string(),
            ..test_form()
        };

        assert!(matches!(
            validate_transaction_form(&form),
            Err(Error::DateError(_))
        ));
    }

    #[test]
    fn empty_date_defaults_to_now() {
        let form = TransactionFormData {
            date: "".to_string(),
            ..test_form()
        };

        let validated = validate_transaction_form(&form).unwrap();

        let seconds_ago = (time::OffsetDateTime::now_utc() - validated.timestamp).whole_seconds();
        assert!((0..5).contains(&seconds_ago));
    }

    #[test]
    fn empty_note_becomes_none() {
        let form = TransactionFormData {
            note: "   ".to_string(),
            ..test_form()
        };

        let validated = validate_transaction_form(&form).unwrap();

        assert_eq!(validated.note, None);
    }

    #[test]
    fn recurrence_requires_checkbox() {
        let form = TransactionFormData {
            is_recurring: None,
            recurrence: Some(RecurrenceKind::Weekly),
            ..test_form()
        };

        let validated = validate_transaction_form(&form).unwrap();

        assert!(!validated.is_recurring);
        assert_eq!(validated.recurrence, None);
    }

    #[test]
    fn checkbox_value_enables_recurrence() {
        let form = TransactionFormData {
            is_recurring: Some("on".to_string()),
            recurrence: Some(RecurrenceKind::Monthly),
            ..test_form()
        };

        let validated = validate_transaction_form(&form).unwrap();

        assert!(validated.is_recurring);
        assert_eq!(validated.recurrence, Some(RecurrenceKind::Monthly));
    }
}
