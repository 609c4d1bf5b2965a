//! Code for creating the user table and fetching users from the database.

use std::fmt::Display;

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{Error, password::PasswordHash};

/// A newtype wrapper for integer user IDs.
///
/// This helps disambiguate user IDs from other types of IDs, leading to
/// better compile time errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct UserID(i64);

impl UserID {
    /// Create a new user ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the user ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A user of the application.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    /// The user's ID in the application database.
    pub id: UserID,
    /// The email the user registered with.
    pub email: String,
    /// The user's password hash.
    pub password_hash: PasswordHash,
    /// The currently active password reset token, if any.
    pub reset_token: Option<String>,
    /// When the reset token stops being valid.
    pub token_expiry: Option<OffsetDateTime>,
}

/// Create the user table.
///
/// # Errors
/// This function will return an error if the SQL query failed.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
                id INTEGER PRIMARY KEY,
                email TEXT NOT NULL UNIQUE,
                password TEXT NOT NULL,
                reset_token TEXT,
                token_expiry INTEGER
                )",
        (),
    )?;

    Ok(())
}

/// Create and insert a new user into the database.
///
/// # Errors
/// Returns an [Error::EmailTaken] if a user with `email` already exists, or
/// an [Error::SqlError] if another SQL related error occurred.
pub fn create_user(
    email: &str,
    password_hash: PasswordHash,
    connection: &Connection,
) -> Result<User, Error> {
    connection.execute(
        "INSERT INTO user (email, password) VALUES (?1, ?2)",
        (email, password_hash.as_ref()),
    )?;

    let id = UserID::new(connection.last_insert_rowid());

    Ok(User {
        id,
        email: email.to_string(),
        password_hash,
        reset_token: None,
        token_expiry: None,
    })
}

/// Get the user from the database with an email equal to `email`.
///
/// # Errors
/// Returns an [Error::NotFound] if `email` does not belong to a registered
/// user, or an [Error::SqlError] if another SQL related error occurred.
pub fn get_user_by_email(email: &str, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare(
            "SELECT id, email, password, reset_token, token_expiry FROM user WHERE email = :email",
        )?
        .query_row(&[(":email", email)], map_row)
        .map_err(|error| error.into())
}

/// Get the user from the database with an ID equal to `user_id`.
///
/// # Errors
/// Returns an [Error::NotFound] if `user_id` does not belong to a registered
/// user, or an [Error::SqlError] if another SQL related error occurred.
pub fn get_user_by_id(user_id: UserID, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare(
            "SELECT id, email, password, reset_token, token_expiry FROM user WHERE id = :id",
        )?
        .query_row(&[(":id", &user_id.as_i64())], map_row)
        .map_err(|error| error.into())
}

/// Get the user that owns the password reset token `token`.
///
/// The caller is responsible for checking the token expiry.
///
/// # Errors
/// Returns an [Error::InvalidResetToken] if no user owns `token`.
pub fn get_user_by_reset_token(token: &str, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare(
            "SELECT id, email, password, reset_token, token_expiry FROM user \
             WHERE reset_token = :token",
        )?
        .query_row(&[(":token", token)], map_row)
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::InvalidResetToken,
            error => error.into(),
        })
}

/// Store a password reset token and its expiry for `user_id`.
///
/// Replaces any previously issued token.
///
/// # Errors
/// Returns an [Error::SqlError] if an SQL related error occurred.
pub fn set_reset_token(
    user_id: UserID,
    token: &str,
    expiry: OffsetDateTime,
    connection: &Connection,
) -> Result<(), Error> {
    connection.execute(
        "UPDATE user SET reset_token = ?1, token_expiry = ?2 WHERE id = ?3",
        (token, expiry.unix_timestamp(), user_id.as_i64()),
    )?;

    Ok(())
}

/// Replace the user's password hash and clear the reset token so that it
/// cannot be used twice.
///
/// # Errors
/// Returns an [Error::SqlError] if an SQL related error occurred.
pub fn update_password(
    user_id: UserID,
    password_hash: &PasswordHash,
    connection: &Connection,
) -> Result<(), Error> {
    connection.execute(
        "UPDATE user SET password = ?1, reset_token = NULL, token_expiry = NULL WHERE id = ?2",
        (password_hash.as_ref(), user_id.as_i64()),
    )?;

    Ok(())
}

fn map_row(row: &Row) -> Result<User, rusqlite::Error> {
    let id = UserID::new(row.get(0)?);
    let email = row.get(1)?;
    let raw_password_hash: String = row.get(2)?;
    let reset_token = row.get(3)?;

    let raw_expiry: Option<i64> = row.get(4)?;
    let token_expiry = match raw_expiry {
        Some(timestamp) => Some(OffsetDateTime::from_unix_timestamp(timestamp).map_err(
            |error| {
                rusqlite::Error::FromSqlConversionFailure(
                    4,
                    rusqlite::types::Type::Integer,
                    Box::new(error),
                )
            },
        )?),
        None => None,
    };

    Ok(User {
        id,
        email,
        password_hash: PasswordHash::new_unchecked(&raw_password_hash),
        reset_token,
        token_expiry,
    })
}

#[cfg(test)]
mod user_tests {
    use rusqlite::Connection;
    use time::{Duration, OffsetDateTime};

    use crate::{
        Error,
        password::PasswordHash,
        user::{
            create_user, get_user_by_email, get_user_by_id, get_user_by_reset_token,
            set_reset_token, update_password,
        },
    };

    use super::create_user_table;

    fn get_db_connection() -> Connection {
        let conn =
            Connection::open_in_memory().expect("Could not create in-memory SQLite database");
        create_user_table(&conn).expect("Could not create user table");

        conn
    }

    #[test]
    fn insert_user_succeeds() {
        let connection = get_db_connection();
        let password_hash = PasswordHash::new_unchecked("hunter2");

        let inserted_user =
            create_user("foo@bar.baz", password_hash.clone(), &connection).unwrap();

        assert!(inserted_user.id.as_i64() > 0);
        assert_eq!(inserted_user.email, "foo@bar.baz");
        assert_eq!(inserted_user.password_hash, password_hash);
    }

    #[test]
    fn insert_user_fails_on_duplicate_email() {
        let connection = get_db_connection();
        let password_hash = PasswordHash::new_unchecked("hunter2");
        create_user("foo@bar.baz", password_hash.clone(), &connection).unwrap();

        let result = create_user("foo@bar.baz", password_hash, &connection);

        assert_eq!(result, Err(Error::EmailTaken));
    }

    #[test]
    fn get_user_by_email_finds_inserted_user() {
        let connection = get_db_connection();
        let inserted_user = create_user(
            "foo@bar.baz",
            PasswordHash::new_unchecked("hunter2"),
            &connection,
        )
        .unwrap();

        let selected_user = get_user_by_email("foo@bar.baz", &connection).unwrap();

        assert_eq!(selected_user, inserted_user);
    }

    #[test]
    fn get_user_by_email_fails_on_unknown_email() {
        let connection = get_db_connection();

        let result = get_user_by_email("nobody@example.com", &connection);

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn reset_token_round_trips() {
        let connection = get_db_connection();
        let user = create_user(
            "foo@bar.baz",
            PasswordHash::new_unchecked("hunter2"),
            &connection,
        )
        .unwrap();
        let expiry = OffsetDateTime::now_utc() + Duration::hours(1);

        set_reset_token(user.id, "sometoken", expiry, &connection).unwrap();

        let selected_user = get_user_by_reset_token("sometoken", &connection).unwrap();
        assert_eq!(selected_user.id, user.id);
        assert_eq!(selected_user.reset_token.as_deref(), Some("sometoken"));
        assert_eq!(
            selected_user.token_expiry.map(|dt| dt.unix_timestamp()),
            Some(expiry.unix_timestamp())
        );
    }

    #[test]
    fn get_user_by_reset_token_fails_on_unknown_token() {
        let connection = get_db_connection();

        let result = get_user_by_reset_token("unknown", &connection);

        assert_eq!(result, Err(Error::InvalidResetToken));
    }

    #[test]
    fn update_password_clears_reset_token() {
        let connection = get_db_connection();
        let user = create_user(
            "foo@bar.baz",
            PasswordHash::new_unchecked("hunter2"),
            &connection,
        )
        .unwrap();
        let expiry = OffsetDateTime::now_utc() + Duration::hours(1);
        set_reset_token(user.id, "sometoken", expiry, &connection).unwrap();

        let new_hash = PasswordHash::new_unchecked("hunter3");
        update_password(user.id, &new_hash, &connection).unwrap();

        let selected_user = get_user_by_id(user.id, &connection).unwrap();
        assert_eq!(selected_user.password_hash, new_hash);
        assert_eq!(selected_user.reset_token, None);
        assert_eq!(selected_user.token_expiry, None);
        assert_eq!(
            get_user_by_reset_token("sometoken", &connection),
            Err(Error::InvalidResetToken)
        );
    }
}
