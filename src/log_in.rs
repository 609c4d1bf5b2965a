//! The log-in page and endpoint.

use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::PrivateCookieJar;
use maud::{Markup, html};
use serde::Deserialize;

use crate::{
    AppState, Error,
    auth::set_auth_cookie,
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        LINK_STYLE, base, form_error,
    },
    user::get_user_by_email,
};

/// The data submitted through the log-in form.
#[derive(Debug, Deserialize)]
pub struct LogInFormData {
    /// The email of the account to log into.
    pub email: String,
    /// The plain-text password to check against the stored hash.
    pub password: String,
}

fn render_log_in_page(error_message: &str) -> Markup {
    let content = html! {
        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="text-2xl font-bold mb-4" { "Log in" }

            (form_error(error_message))

            form method="post" action=(endpoints::LOG_IN) class="flex flex-col gap-4 w-full"
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
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Log in" }

                p
                {
                    a href=(endpoints::FORGOT_PASSWORD) class=(LINK_STYLE) { "Forgot password?" }
                }

                p
                {
                    "No account yet? "
                    a href=(endpoints::REGISTER) class=(LINK_STYLE) { "Register" }
                }
            }
        }
    };

    base("Log in", &[], &content)
}

/// Display the log-in form.
pub async fn get_log_in_page() -> Markup {
    render_log_in_page("")
}

/// Establish a session for the submitted credentials.
///
/// Failed attempts get the same error message whether the email is unknown
/// or the password is wrong, so the form does not reveal which accounts
/// exist.
pub async fn log_in_endpoint(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    Form(form): Form<LogInFormData>,
) -> Result<Response, Error> {
    let user = {
        let connection = state
            .db_connection
            .lock()
            .map_err(|_| Error::DatabaseLock)?;

        match get_user_by_email(&form.email, &connection) {
            Ok(user) => Some(user),
            Err(Error::NotFound) => None,
            Err(error) => return Err(error),
        }
    };

    let Some(user) = user else {
        return Ok(render_log_in_page(&Error::InvalidCredentials.to_string()).into_response());
    };

    let password_matches = user
        .password_hash
        .verify(&form.password)
        .map_err(|error| Error::HashingError(error.to_string()))?;

    if !password_matches {
        return Ok(render_log_in_page(&Error::InvalidCredentials.to_string()).into_response());
    }

    let jar = set_auth_cookie(jar, user.id, state.cookie_duration)?;

    Ok((jar, Redirect::to(endpoints::DASHBOARD)).into_response())
}
