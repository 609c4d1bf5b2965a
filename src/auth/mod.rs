//! User authentication with private cookies.
//!
//! A signed and encrypted cookie holds a [Token] with the user's ID and the
//! session expiry. The [middleware::auth_guard] validates the cookie on
//! protected routes and slides the expiry forward on each response.

mod cookie;
mod middleware;
mod token;

pub(crate) use cookie::{DEFAULT_COOKIE_DURATION, invalidate_auth_cookie, set_auth_cookie};
pub(crate) use middleware::{AuthState, auth_guard};
pub(crate) use token::Token;
