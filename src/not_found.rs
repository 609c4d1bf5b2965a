//! Error pages for missing resources and internal errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

use crate::{
    endpoints,
    html::{LINK_STYLE, base},
};

fn error_page(header: &str, description: &str, fix: &str) -> Markup {
    let content = html!(
        section class="bg-white dark:bg-gray-900"
        {
            div class="py-8 px-4 mx-auto max-w-screen-xl lg:py-16 lg:px-6"
            {
                div class="mx-auto max-w-screen-sm text-center"
                {
                    h1 class="mb-4 text-7xl tracking-tight font-extrabold text-blue-600 dark:text-blue-500"
                    {
                        (header)
                    }

                    p class="mb-4 text-3xl tracking-tight font-bold text-gray-900 dark:text-white"
                    {
                        (description)
                    }

                    p class="mb-4 text-gray-500 dark:text-gray-400" { (fix) }

                    a href=(endpoints::DASHBOARD) class=(LINK_STYLE) { "Back to the dashboard" }
                }
            }
        }
    );

    base("Error", &[], &content)
}

/// Render the 404 page with the appropriate status code.
pub fn render_not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        error_page(
            "404",
            "Page not found",
            "The thing you were looking for does not exist or belongs to someone else.",
        ),
    )
        .into_response()
}

/// Render the generic 500 page body.
pub fn render_internal_server_error() -> Markup {
    error_page(
        "500",
        "Sorry, something went wrong.",
        "Try again later or check the server logs.",
    )
}

/// Fallback handler for unknown routes.
pub async fn get_404_not_found() -> Response {
    render_not_found()
}

#[cfg(test)]
mod not_found_tests {
    use axum::http::StatusCode;

    use super::get_404_not_found;

    #[tokio::test]
    async fn returns_not_found_status() {
        let response = get_404_not_found().await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
