//! The password reset flow.
//!
//! Requesting a reset always reports success so that the form cannot be used
//! to probe which emails are registered. There is no mail delivery; the
//! reset link is written to the server log instead, which is good enough for
//! a self-hosted deployment.

use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use maud::{Markup, html};
use serde::Deserialize;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::{
    AppState, Error,
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        LINK_STYLE, base, form_error,
    },
    password::{PasswordHash, ValidatedPassword},
    user::{User, get_user_by_email, get_user_by_reset_token, set_reset_token, update_password},
};

/// How long a password reset token stays valid.
const RESET_TOKEN_VALIDITY: Duration = Duration::hours(1);

/// The data submitted through the forgot-password form.
#[derive(Debug, Deserialize)]
pub struct ForgotPasswordFormData {
    /// The email to send the reset link to.
    pub email: String,
}

/// The data submitted through the reset-password form.
#[derive(Debug, Deserialize)]
pub struct ResetPasswordFormData {
    /// The new plain-text password, validated before hashing.
    pub password: String,
}

fn render_forgot_password_page(confirmation_message: &str) -> Markup {
    let content = html! {
        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="text-2xl font-bold mb-4" { "Forgot password" }

            @if !confirmation_message.is_empty() {
                p class="text-green-600 dark:text-green-400" { (confirmation_message) }
            }

            form method="post" action=(endpoints::FORGOT_PASSWORD) class="flex flex-col gap-4 w-full"
            {
                div
                {
                    label for="email" class=(FORM_LABEL_STYLE) { "Email" }
                    input type="email" name="email" id="email" required
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Send reset link" }

                p
                {
                    a href=(endpoints::LOG_IN) class=(LINK_STYLE) { "Back to log in" }
                }
            }
        }
    };

    base("Forgot password", &[], &content)
}

fn render_reset_password_page(token: &str, error_message: &str) -> Markup {
    let content = html! {
        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="text-2xl font-bold mb-4" { "Choose a new password" }

            (form_error(error_message))

            form method="post" action=(format!("/reset-password/{token}"))
                class="flex flex-col gap-4 w-full"
            {
                div
                {
                    label for="password" class=(FORM_LABEL_STYLE) { "New password" }
                    input type="password" name="password" id="password" required
                        minlength=(crate::MIN_PASSWORD_LENGTH)
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Reset password" }
            }
        }
    };

    base("Reset password", &[], &content)
}

fn render_invalid_token_page() -> Markup {
    let content = html! {
        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="text-2xl font-bold mb-4" { "Invalid reset link" }

            p class="mb-4" { (Error::InvalidResetToken) "." }

            a href=(endpoints::FORGOT_PASSWORD) class=(LINK_STYLE) { "Request a new link" }
        }
    };

    base("Reset password", &[], &content)
}

/// Display the form for requesting a password reset link.
pub async fn get_forgot_password_page() -> Markup {
    render_forgot_password_page("")
}

/// Issue a reset token for the submitted email.
///
/// The response is the same whether or not the email belongs to an account.
pub async fn forgot_password_endpoint(
    State(state): State<AppState>,
    Form(form): Form<ForgotPasswordFormData>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLock)?;

    match get_user_by_email(&form.email, &connection) {
        Ok(user) => {
            let token = Uuid::new_v4().to_string();
            let expiry = OffsetDateTime::now_utc() + RESET_TOKEN_VALIDITY;

            set_reset_token(user.id, &token, expiry, &connection)?;

            tracing::info!(
                "Password reset requested for {}: {}",
                user.email,
                endpoints::RESET_PASSWORD.replace("{token}", &token)
            );
        }
        Err(Error::NotFound) => {
            tracing::debug!("Password reset requested for unknown email.");
        }
        Err(error) => return Err(error),
    }

    Ok(render_forgot_password_page(
        "If an account with this email exists, a reset link has been sent.",
    )
    .into_response())
}

fn user_for_valid_token(
    token: &str,
    connection: &rusqlite::Connection,
) -> Result<User, Error> {
    let user = get_user_by_reset_token(token, connection)?;

    match user.token_expiry {
        Some(expiry) if expiry > OffsetDateTime::now_utc() => Ok(user),
        _ => Err(Error::InvalidResetToken),
    }
}

/// Display the new-password form, if the token is valid and unexpired.
pub async fn get_reset_password_page(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLock)?;

    match user_for_valid_token(&token, &connection) {
        Ok(_) => Ok(render_reset_password_page(&token, "").into_response()),
        Err(Error::InvalidResetToken) => Ok(render_invalid_token_page().into_response()),
        Err(error) => Err(error),
    }
}

/// Replace the password for the account that owns the token.
///
/// The token is cleared on success, so a reset link can only be used once.
pub async fn reset_password_endpoint(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Form(form): Form<ResetPasswordFormData>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLock)?;

    let user = match user_for_valid_token(&token, &connection) {
        Ok(user) => user,
        Err(Error::InvalidResetToken) => {
            return Ok(render_invalid_token_page().into_response());
        }
        Err(error) => return Err(error),
    };

    let result = ValidatedPassword::new(&form.password)
        .and_then(|password| PasswordHash::new(password, PasswordHash::DEFAULT_COST))
        .and_then(|password_hash| update_password(user.id, &password_hash, &connection));

    match result {
        Ok(()) => Ok(Redirect::to(endpoints::LOG_IN).into_response()),
        Err(
            error @ (Error::PasswordTooShort
            | Error::PasswordNeedsDigit
            | Error::PasswordNeedsLetter),
        ) => Ok(render_reset_password_page(&token, &error.to_string()).into_response()),
        Err(error) => Err(error),
    }
}

#[cfg(test)]
mod password_reset_tests {
    use axum::{
        Form,
        extract::{Path, State},
        http::StatusCode,
    };
    use rusqlite::Connection;
    use time::{Duration, OffsetDateTime};

    use crate::{
        AppState,
        password::PasswordHash,
        test_utils::assert_contains_text,
        user::{User, create_user, get_user_by_id, set_reset_token},
    };

    use super::{
        ForgotPasswordFormData, ResetPasswordFormData, forgot_password_endpoint,
        get_reset_password_page, reset_password_endpoint,
    };

    fn test_state_and_user() -> (AppState, User) {
        let state =
            AppState::new(Connection::open_in_memory().unwrap(), "wow much secret").unwrap();

        let user = {
            let connection = state.db_connection.lock().unwrap();
            create_user(
                "foo@bar.baz",
                PasswordHash::new_unchecked("hunter2"),
                &connection,
            )
            .unwrap()
        };

        (state, user)
    }

    #[tokio::test]
    async fn request_for_known_email_stores_token() {
        let (state, user) = test_state_and_user();

        let response = forgot_password_endpoint(
            State(state.clone()),
            Form(ForgotPasswordFormData {
                email: "foo@bar.baz".to_string(),
            }),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_contains_text(response, "If an account with this email exists").await;

        let connection = state.db_connection.lock().unwrap();
        let user = get_user_by_id(user.id, &connection).unwrap();
        assert!(user.reset_token.is_some());
        assert!(user.token_expiry.unwrap() > OffsetDateTime::now_utc());
    }

    #[tokio::test]
    async fn request_for_unknown_email_reports_the_same_message() {
        let (state, _user) = test_state_and_user();

        let response = forgot_password_endpoint(
            State(state),
            Form(ForgotPasswordFormData {
                email: "nobody@example.com".to_string(),
            }),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_contains_text(response, "If an account with this email exists").await;
    }

    #[tokio::test]
    async fn reset_page_renders_for_valid_token() {
        let (state, user) = test_state_and_user();
        {
            let connection = state.db_connection.lock().unwrap();
            set_reset_token(
                user.id,
                "sometoken",
                OffsetDateTime::now_utc() + Duration::hours(1),
                &connection,
            )
            .unwrap();
        }

        let response = get_reset_password_page(State(state), Path("sometoken".to_string()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_contains_text(response, "Choose a new password").await;
    }

    #[tokio::test]
    async fn reset_page_rejects_expired_token() {
        let (state, user) = test_state_and_user();
        {
            let connection = state.db_connection.lock().unwrap();
            set_reset_token(
                user.id,
                "sometoken",
                OffsetDateTime::now_utc() - Duration::minutes(1),
                &connection,
            )
            .unwrap();
        }

        let response = get_reset_password_page(State(state), Path("sometoken".to_string()))
            .await
            .unwrap();

        assert_contains_text(response, "Invalid reset link").await;
    }

    #[tokio::test]
    async fn reset_page_rejects_unknown_token() {
        let (state, _user) = test_state_and_user();

        let response = get_reset_password_page(State(state), Path("unknown".to_string()))
            .await
            .unwrap();

        assert_contains_text(response, "Invalid reset link").await;
    }

    #[tokio::test]
    async fn reset_replaces_password_and_clears_token() {
        let (state, user) = test_state_and_user();
        {
            let connection = state.db_connection.lock().unwrap();
            set_reset_token(
                user.id,
                "sometoken",
                OffsetDateTime::now_utc() + Duration::hours(1),
                &connection,
            )
            .unwrap();
        }

        let response = reset_password_endpoint(
            State(state.clone()),
            Path("sometoken".to_string()),
            Form(ResetPasswordFormData {
                password: "xyz789".to_string(),
            }),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let connection = state.db_connection.lock().unwrap();
        let user = get_user_by_id(user.id, &connection).unwrap();
        assert!(user.password_hash.verify("xyz789").unwrap());
        assert_eq!(user.reset_token, None);
        assert_eq!(user.token_expiry, None);
    }

    #[tokio::test]
    async fn reset_token_is_single_use() {
        let (state, user) = test_state_and_user();
        {
            let connection = state.db_connection.lock().unwrap();
            set_reset_token(
                user.id,
                "sometoken",
                OffsetDateTime::now_utc() + Duration::hours(1),
                &connection,
            )
            .unwrap();
        }

        reset_password_endpoint(
            State(state.clone()),
            Path("sometoken".to_string()),
            Form(ResetPasswordFormData {
                password: "xyz789".to_string(),
            }),
        )
        .await
        .unwrap();

        let response = reset_password_endpoint(
            State(state),
            Path("sometoken".to_string()),
            Form(ResetPasswordFormData {
                password: "abc123".to_string(),
            }),
        )
        .await
        .unwrap();

        assert_contains_text(response, "Invalid reset link").await;
    }

    #[tokio::test]
    async fn reset_with_weak_password_rerenders_with_error() {
        let (state, user) = test_state_and_user();
        {
            let connection = state.db_connection.lock().unwrap();
            set_reset_token(
                user.id,
                "sometoken",
                OffsetDateTime::now_utc() + Duration::hours(1),
                &connection,
            )
            .unwrap();
        }

        let response = reset_password_endpoint(
            State(state),
            Path("sometoken".to_string()),
            Form(ResetPasswordFormData {
                password: "short".to_string(),
            }),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_contains_text(response, "at least 6 characters").await;
    }
}
