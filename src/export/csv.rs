//! The CSV download of the user's ledger.

use axum::{
    Extension,
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use time::{format_description::BorrowedFormatItem, macros::format_description};

use crate::{
    AppState, Error,
    transaction::{Transaction, get_transactions},
    user::UserID,
};

const CSV_DATE_FORMAT: &[BorrowedFormatItem] =
    format_description!("[year]-[month]-[day] [hour]:[minute]");

/// Write the transactions as CSV bytes with an `ID,Amount,Category,Note,Date`
/// header.
pub fn write_csv(transactions: &[Transaction]) -> Result<Vec<u8>, Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer
        .write_record(["ID", "Amount", "Category", "Note", "Date"])
        .map_err(|error| Error::ExportError(error.to_string()))?;

    for transaction in transactions {
        let date = transaction
            .timestamp
            .format(CSV_DATE_FORMAT)
            .map_err(|error| Error::DateError(error.to_string()))?;

        writer
            .write_record([
                transaction.id.to_string(),
                transaction.amount.to_string(),
                transaction.category.clone(),
                transaction.note.clone().unwrap_or_default(),
                date,
            ])
            .map_err(|error| Error::ExportError(error.to_string()))?;
    }

    writer
        .into_inner()
        .map_err(|error| Error::ExportError(error.to_string()))
}

/// Serve the user's transactions as a CSV file download.
pub async fn export_csv_endpoint(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLock)?;

    let transactions = get_transactions(user_id, &connection)?;
    let bytes = write_csv(&transactions)?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"transactions.csv\"",
            ),
        ],
        bytes,
    )
        .into_response())
}
