//! QuickLedger is a web app for tracking income, expenses, and monthly
//! budgets.
//!
//! This library provides a server that renders HTML pages directly, plus a
//! couple of JSON endpoints that feed the dashboard charts.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use tokio::signal;

mod app_state;
mod auth;
mod budget;
mod category;
mod dashboard;
mod db;
mod endpoints;
mod export;
mod forgot_password;
mod html;
mod log_in;
mod log_out;
mod logging;
mod navigation;
mod not_found;
mod password;
mod register;
mod routing;
mod transaction;
mod user;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use db::initialize as initialize_db;
pub use logging::logging_middleware;
pub use password::{PasswordHash, ValidatedPassword};
pub use routing::build_router;
pub use user::{User, UserID};

use crate::not_found::{render_internal_server_error, render_not_found};

/// An async task that waits for either the ctrl+c or terminate signal,
/// whichever comes first, and then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The minimum number of characters a password must have.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// An account already exists for the email used at registration.
    #[error("an account with this email already exists")]
    EmailTaken,

    /// The password used at registration or reset is shorter than
    /// [MIN_PASSWORD_LENGTH] characters.
    #[error("password must be at least {MIN_PASSWORD_LENGTH} characters long")]
    PasswordTooShort,

    /// The password does not contain a digit.
    #[error("password must contain at least one number")]
    PasswordNeedsDigit,

    /// The password does not contain a letter.
    #[error("password must contain at least one letter")]
    PasswordNeedsLetter,

    /// The email/password combination did not match a registered user.
    ///
    /// The same error is used for unknown emails and wrong passwords so that
    /// the log-in form does not leak which accounts exist.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// The password reset token is unknown or its expiry has passed.
    #[error("invalid or expired reset link")]
    InvalidResetToken,

    /// A category with the same name already exists for this user.
    #[error("a category with this name already exists")]
    DuplicateCategory,

    /// An empty string was used to create a category name.
    #[error("category name cannot be empty")]
    EmptyCategoryName,

    /// The category cannot be deleted because transactions still reference
    /// its name.
    #[error("category \"{0}\" is still used by existing transactions")]
    CategoryInUse(String),

    /// A transaction amount did not parse as a number greater than zero.
    #[error("amount must be a number greater than zero")]
    InvalidAmount,

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// The session cookie is missing from the cookie jar in the request.
    #[error("no session cookie in the cookie jar")]
    CookieMissing,

    /// The session cookie exists but could not be parsed, or its expiry has
    /// passed.
    #[error("the session has expired or is invalid")]
    SessionExpired,

    /// A date or date-time could not be formatted or parsed.
    ///
    /// Callers should pass in the original error as a string.
    #[error("could not handle date-time value: {0}")]
    DateError(String),

    /// An error occurred while serializing a value as JSON.
    #[error("could not serialize as JSON: {0}")]
    JsonError(String),

    /// An error occurred while producing a CSV or PDF download.
    #[error("could not generate the export: {0}")]
    ExportError(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// Could not acquire the database lock.
    #[error("could not acquire the database lock")]
    DatabaseLock,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.contains("user.email") =>
            {
                Error::EmailTaken
            }
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.contains("category") =>
            {
                Error::DuplicateCategory
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => render_not_found(),
            // Any errors that are not handled above are not intended to be
            // shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    render_internal_server_error(),
                )
                    .into_response()
            }
        }
    }
}
