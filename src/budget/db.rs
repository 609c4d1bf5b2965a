//! Database operations for budgets.

use rusqlite::{Connection, Row};

use crate::{Error, budget::domain::Budget, user::UserID};

/// Initialize the budget table.
pub fn create_budget_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS budget (
            id INTEGER PRIMARY KEY,
            category TEXT NOT NULL,
            amount REAL NOT NULL,
            month INTEGER NOT NULL,
            year INTEGER NOT NULL,
            user_id INTEGER NOT NULL,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE,
            UNIQUE(user_id, category, month, year)
        );",
    )?;

    Ok(())
}

/// Create a budget, or overwrite the amount of the existing budget for the
/// same (category, month, year).
///
/// The amount is stored as submitted; a non-positive limit simply renders
/// with zero progress.
pub fn upsert_budget(
    category: &str,
    amount: f64,
    month: u8,
    year: i32,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    connection.execute(
        "INSERT INTO budget (category, amount, month, year, user_id) \
         VALUES (?1, ?2, ?3, ?4, ?5) \
         ON CONFLICT(user_id, category, month, year) \
         DO UPDATE SET amount = excluded.amount",
        (category, amount, month, year, user_id.as_i64()),
    )?;

    Ok(())
}

/// Retrieve all of the user's budgets, most recent month first.
pub fn get_budgets(user_id: UserID, connection: &Connection) -> Result<Vec<Budget>, Error> {
    connection
        .prepare(
            "SELECT id, category, amount, month, year, user_id FROM budget \
             WHERE user_id = :user_id \
             ORDER BY year DESC, month DESC, category ASC",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], map_row)?
        .map(|maybe_budget| maybe_budget.map_err(|error| error.into()))
        .collect()
}

fn map_row(row: &Row) -> Result<Budget, rusqlite::Error> {
    Ok(Budget {
        id: row.get(0)?,
        category: row.get(1)?,
        amount: row.get(2)?,
        month: row.get(3)?,
        year: row.get(4)?,
        user_id: UserID::new(row.get(5)?),
    })
}
