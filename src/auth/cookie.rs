//! Functions for reading and writing the session cookie.

use std::cmp::max;

use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, SameSite},
};
use time::{Duration, OffsetDateTime};

use crate::{Error, auth::Token, user::UserID};

pub(crate) const SESSION_COOKIE: &str = "session";

/// The default duration for which session cookies are valid.
pub(crate) const DEFAULT_COOKIE_DURATION: Duration = Duration::minutes(30);

/// Add a session cookie to the cookie jar, indicating that a user is logged
/// in and authenticated.
///
/// Sets the initial expiry of the session to `duration` from the current
/// time. Returns the cookie jar with the cookie added.
///
/// # Errors
/// Returns an [Error::JsonError] if the token cannot be serialized.
pub(crate) fn set_auth_cookie(
    jar: PrivateCookieJar,
    user_id: UserID,
    duration: Duration,
) -> Result<PrivateCookieJar, Error> {
    let expires_at = OffsetDateTime::now_utc() + duration;
    let token = Token {
        user_id,
        expires_at,
    };

    Ok(jar.add(build_session_cookie(&token, expires_at)?))
}

/// Set the session cookie to an invalid value and set its max age to zero,
/// which should delete the cookie on the client side.
pub(crate) fn invalidate_auth_cookie(jar: PrivateCookieJar) -> PrivateCookieJar {
    jar.add(
        Cookie::build((SESSION_COOKIE, "deleted"))
            .expires(OffsetDateTime::UNIX_EPOCH)
            .max_age(Duration::ZERO)
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(true)
            .path("/"),
    )
}

/// Get the session token from the cookie jar.
///
/// # Errors
/// Returns:
/// - [Error::CookieMissing] if there is no session cookie.
/// - [Error::SessionExpired] if the cookie cannot be parsed or the token's
///   expiry has passed.
pub(crate) fn get_token_from_cookie(jar: &PrivateCookieJar) -> Result<Token, Error> {
    let cookie = jar.get(SESSION_COOKIE).ok_or(Error::CookieMissing)?;

    let token: Token =
        serde_json::from_str(cookie.value_trimmed()).map_err(|_| Error::SessionExpired)?;

    if token.is_expired() {
        return Err(Error::SessionExpired);
    }

    Ok(token)
}

/// Slide the session expiry forward to the latest of UTC now plus `duration`
/// and the token's current expiry.
///
/// # Errors
/// The cookie jar is not modified if an error is returned.
pub(crate) fn extend_session(
    jar: PrivateCookieJar,
    duration: Duration,
) -> Result<PrivateCookieJar, Error> {
    let token = get_token_from_cookie(&jar)?;

    let new_expiry = OffsetDateTime::now_utc()
        .checked_add(duration)
        .ok_or_else(|| Error::DateError("session expiry overflowed".to_string()))?;
    let expires_at = max(token.expires_at, new_expiry);

    let token = Token {
        user_id: token.user_id,
        expires_at,
    };

    Ok(jar.add(build_session_cookie(&token, expires_at)?))
}

fn build_session_cookie(
    token: &Token,
    expires_at: OffsetDateTime,
) -> Result<Cookie<'static>, Error> {
    let value = serde_json::to_string(token).map_err(|error| Error::JsonError(error.to_string()))?;

    Ok(Cookie::build((SESSION_COOKIE, value))
        .expires(expires_at)
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(true)
        .path("/")
        .build())
}
