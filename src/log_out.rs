//! The log-out endpoint.

use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::PrivateCookieJar;

use crate::{auth::invalidate_auth_cookie, endpoints};

/// End the session and return to the log-in page.
pub async fn log_out_endpoint(jar: PrivateCookieJar) -> Response {
    let jar = invalidate_auth_cookie(jar);

    (jar, Redirect::to(endpoints::LOG_IN)).into_response()
}

#[cfg(test)]
mod log_out_tests {
    use axum::http::StatusCode;
    use axum_extra::extract::{PrivateCookieJar, cookie::Key};
    use sha2::{Digest, Sha512};

    use crate::test_utils::get_header;

    use super::log_out_endpoint;

    #[tokio::test]
    async fn log_out_invalidates_cookie_and_redirects() {
        let hash = Sha512::digest("wow much secret");
        let jar = PrivateCookieJar::new(Key::from(&hash));

        let response = log_out_endpoint(jar).await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            get_header(&response, "location"),
            crate::endpoints::LOG_IN
        );
        assert!(get_header(&response, "set-cookie").contains("Max-Age=0"));
    }
}
