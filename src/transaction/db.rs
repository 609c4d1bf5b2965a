//! Database operations for transactions.
//!
//! Timestamps are stored as unix seconds so that filtering and bucketing can
//! be done with plain integer comparisons.

use rusqlite::{Connection, Row, types::Type};
use time::OffsetDateTime;

use crate::{
    Error,
    transaction::domain::{RecurrenceKind, Transaction, TransactionId},
    user::UserID,
};

/// Initialize the transaction table.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
            id INTEGER PRIMARY KEY,
            amount REAL NOT NULL,
            category TEXT NOT NULL,
            note TEXT,
            timestamp INTEGER NOT NULL,
            is_recurring INTEGER NOT NULL DEFAULT 0,
            recurrence TEXT,
            user_id INTEGER NOT NULL,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        );",
    )?;

    Ok(())
}

/// Create a transaction and return it with its generated ID.
///
/// # Errors
/// Returns an [Error::InvalidAmount] if `amount` is not a finite number
/// greater than zero.
#[allow(clippy::too_many_arguments)]
pub fn create_transaction(
    amount: f64,
    category: &str,
    note: Option<&str>,
    timestamp: OffsetDateTime,
    is_recurring: bool,
    recurrence: Option<RecurrenceKind>,
    user_id: UserID,
    connection: &Connection,
) -> Result<Transaction, Error> {
    validate_amount(amount)?;

    let recurrence = if is_recurring { recurrence } else { None };

    connection.execute(
        "INSERT INTO \"transaction\" (amount, category, note, timestamp, is_recurring, recurrence, user_id) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        (
            amount,
            category,
            note,
            timestamp.unix_timestamp(),
            is_recurring,
            recurrence.map(|kind| kind.as_str()),
            user_id.as_i64(),
        ),
    )?;

    let id = connection.last_insert_rowid();

    Ok(Transaction {
        id,
        amount,
        category: category.to_string(),
        note: note.map(|note| note.to_string()),
        timestamp,
        is_recurring,
        recurrence,
        user_id,
    })
}

/// Retrieve a single transaction owned by `user_id`.
///
/// # Errors
/// Returns an [Error::NotFound] if the transaction does not exist or belongs
/// to another user.
pub fn get_transaction(
    transaction_id: TransactionId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Transaction, Error> {
    connection
        .prepare(
            "SELECT id, amount, category, note, timestamp, is_recurring, recurrence, user_id \
             FROM \"transaction\" WHERE id = :id AND user_id = :user_id",
        )?
        .query_row(
            &[(":id", &transaction_id), (":user_id", &user_id.as_i64())],
            map_row,
        )
        .map_err(|error| error.into())
}

/// Retrieve all of the user's transactions, newest first.
pub fn get_transactions(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(
            "SELECT id, amount, category, note, timestamp, is_recurring, recurrence, user_id \
             FROM \"transaction\" WHERE user_id = :user_id \
             ORDER BY timestamp DESC, id DESC",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], map_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(|error| error.into()))
        .collect()
}

/// Overwrite an existing transaction owned by `user_id`.
///
/// # Errors
/// Returns:
/// - [Error::InvalidAmount] if the new amount is not a finite number greater
///   than zero.
/// - [Error::NotFound] if the transaction does not exist or belongs to
///   another user.
#[allow(clippy::too_many_arguments)]
pub fn update_transaction(
    transaction_id: TransactionId,
    amount: f64,
    category: &str,
    note: Option<&str>,
    timestamp: OffsetDateTime,
    is_recurring: bool,
    recurrence: Option<RecurrenceKind>,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    validate_amount(amount)?;

    let recurrence = if is_recurring { recurrence } else { None };

    let rows_updated = connection.execute(
        "UPDATE \"transaction\" \
         SET amount = ?1, category = ?2, note = ?3, timestamp = ?4, is_recurring = ?5, recurrence = ?6 \
         WHERE id = ?7 AND user_id = ?8",
        (
            amount,
            category,
            note,
            timestamp.unix_timestamp(),
            is_recurring,
            recurrence.map(|kind| kind.as_str()),
            transaction_id,
            user_id.as_i64(),
        ),
    )?;

    if rows_updated == 0 {
        Err(Error::NotFound)
    } else {
        Ok(())
    }
}

/// Delete a transaction owned by `user_id`.
///
/// # Errors
/// Returns an [Error::NotFound] if the transaction does not exist or belongs
/// to another user.
pub fn delete_transaction(
    transaction_id: TransactionId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_deleted = connection.execute(
        "DELETE FROM \"transaction\" WHERE id = ?1 AND user_id = ?2",
        (transaction_id, user_id.as_i64()),
    )?;

    if rows_deleted == 0 {
        Err(Error::NotFound)
    } else {
        Ok(())
    }
}

fn validate_amount(amount: f64) -> Result<(), Error> {
    if amount.is_finite() && amount > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidAmount)
    }
}

fn map_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id = row.get(0)?;
    let amount = row.get(1)?;
    let category = row.get(2)?;
    let note = row.get(3)?;

    let unix_timestamp: i64 = row.get(4)?;
    let timestamp = OffsetDateTime::from_unix_timestamp(unix_timestamp).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(4, Type::Integer, error.into())
    })?;

    let is_recurring = row.get(5)?;

    let raw_recurrence: Option<String> = row.get(6)?;
    let recurrence = match raw_recurrence {
        Some(value) => Some(RecurrenceKind::from_db_str(&value).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                6,
                Type::Text,
                format!("unknown recurrence kind {value:?}").into(),
            )
        })?),
        None => None,
    };

    let user_id = UserID::new(row.get(7)?);

    Ok(Transaction {
        id,
        amount,
        category,
        note,
        timestamp,
        is_recurring,
        recurrence,
        user_id,
    })
}
