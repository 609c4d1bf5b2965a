//! The registration page and endpoint.

use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use maud::{Markup, html};
use serde::Deserialize;

use crate::{
    AppState, Error,
    category::seed_default_categories,
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        LINK_STYLE, base, form_error,
    },
    password::{PasswordHash, ValidatedPassword},
    user::create_user,
};

/// The data submitted through the registration form.
#[derive(Debug, Deserialize)]
pub struct RegisterFormData {
    /// The email to register with.
    pub email: String,
    /// The plain-text password, validated before hashing.
    pub password: String,
}

fn render_register_page(error_message: &str) -> Markup {
    let content = html! {
        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="text-2xl font-bold mb-4" { "Create an account" }

            (form_error(error_message))

            form method="post" action=(endpoints::REGISTER) class="flex flex-col gap-4 w-full"
            {
                div
                {
                    label for="email" class=(FORM_LABEL_STYLE) { "Email" }
                    input type="email" name="email" id="email" required
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="password" class=(FORM_LABEL_STYLE) { "Password" }
                    input type="password" name="password" id="password" required
                        minlength=(crate::MIN_PASSWORD_LENGTH)
                        class=(FORM_TEXT_INPUT_STYLE);
                    p class="mt-1 text-xs text-gray-500 dark:text-gray-400"
                    {
                        "At least " (crate::MIN_PASSWORD_LENGTH)
                        " characters with a letter and a number."
                    }
                }

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Register" }

                p
                {
                    "Already have an account? "
                    a href=(endpoints::LOG_IN) class=(LINK_STYLE) { "Log in" }
                }
            }
        }
    };

    base("Register", &[], &content)
}

/// Display the registration form.
pub async fn get_register_page() -> Markup {
    render_register_page("")
}

/// Create an account from the submitted form.
///
/// On success the new user gets the default category set and is redirected
/// to the log-in page. Validation failures re-render the form with an error
/// message.
pub async fn register_endpoint(
    State(state): State<AppState>,
    Form(form): Form<RegisterFormData>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLock)?;

    let result = ValidatedPassword::new(&form.password)
        .and_then(|password| PasswordHash::new(password, PasswordHash::DEFAULT_COST))
        .and_then(|password_hash| create_user(&form.email, password_hash, &connection))
        .and_then(|user| seed_default_categories(user.id, &connection));

    match result {
        Ok(()) => Ok(Redirect::to(endpoints::LOG_IN).into_response()),
        Err(
            error @ (Error::EmailTaken
            | Error::PasswordTooShort
            | Error::PasswordNeedsDigit
            | Error::PasswordNeedsLetter),
        ) => Ok(render_register_page(&error.to_string()).into_response()),
        Err(error) => Err(error),
    }
}

#[cfg(test)]
mod register_tests {
    use axum::{Form, extract::State, http::StatusCode};
    use rusqlite::Connection;

    use crate::{
        AppState,
        category::get_categories,
        test_utils::{assert_contains_text, assert_valid_html, parse_html_document},
        user::get_user_by_email,
    };

    use super::{RegisterFormData, get_register_page, register_endpoint};

    fn test_state() -> AppState {
        AppState::new(Connection::open_in_memory().unwrap(), "wow much secret").unwrap()
    }

    #[tokio::test]
    async fn page_renders_registration_form() {
        let response = get_register_page().await;

        let html = scraper::Html::parse_document(&response.into_string());
        assert_valid_html(&html);
        assert!(html.html().contains("Register"));
    }

    #[tokio::test]
    async fn valid_registration_creates_user_and_default_categories() {
        let state = test_state();

        let response = register_endpoint(
            State(state.clone()),
            Form(RegisterFormData {
                email: "foo@bar.baz".to_string(),
                password: "abc123".to_string(),
            }),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let connection = state.db_connection.lock().unwrap();
        let user = get_user_by_email("foo@bar.baz", &connection).unwrap();
        assert!(user.password_hash.verify("abc123").unwrap());

        let categories = get_categories(user.id, &connection).unwrap();
        assert_eq!(categories.len(), 9);
    }

    #[tokio::test]
    async fn password_without_digit_is_rejected() {
        let state = test_state();

        let response = register_endpoint(
            State(state.clone()),
            Form(RegisterFormData {
                email: "foo@bar.baz".to_string(),
                password: "abcdef".to_string(),
            }),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_contains_text(response, "at least one number").await;

        let connection = state.db_connection.lock().unwrap();
        assert!(get_user_by_email("foo@bar.baz", &connection).is_err());
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let state = test_state();
        register_endpoint(
            State(state.clone()),
            Form(RegisterFormData {
                email: "foo@bar.baz".to_string(),
                password: "abc123".to_string(),
            }),
        )
        .await
        .unwrap();

        let response = register_endpoint(
            State(state),
            Form(RegisterFormData {
                email: "foo@bar.baz".to_string(),
                password: "abc123".to_string(),
            }),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_contains_text(response, "already exists").await;
    }
}
