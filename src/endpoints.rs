//! The endpoint URIs of the app.
//!
//! For endpoints that take a parameter, e.g. '/edit/{id}', use
//! [format_endpoint].

/// The root route which redirects to the dashboard or log-in page.
pub const ROOT: &str = "/";
/// The landing page for logged in users, also accepts new transactions.
pub const DASHBOARD: &str = "/dashboard";
/// The page for editing an existing transaction.
pub const EDIT_TRANSACTION: &str = "/edit/{id}";
/// The route for deleting a transaction.
pub const DELETE_TRANSACTION: &str = "/delete/{id}";
/// The page for viewing budgets and their progress, also accepts upserts.
pub const BUDGETS: &str = "/budgets";
/// The page for listing categories, also accepts new categories.
pub const CATEGORIES: &str = "/categories";
/// The route for deleting a category.
pub const DELETE_CATEGORY: &str = "/categories/delete/{id}";
/// The route for downloading the ledger as a PDF report.
pub const EXPORT_PDF: &str = "/export/pdf";
/// The route for downloading the ledger as a CSV file.
pub const EXPORT_CSV: &str = "/export/csv";

/// The route for the registration page.
pub const REGISTER: &str = "/register";
/// The route for the log-in page.
pub const LOG_IN: &str = "/login";
/// The route for logging out the current user.
pub const LOG_OUT: &str = "/logout";
/// The route for requesting a password reset link.
pub const FORGOT_PASSWORD: &str = "/forgot-password";
/// The route for resetting a password with a token.
pub const RESET_PASSWORD: &str = "/reset-password/{token}";

/// The chart data for the expense breakdown doughnut.
pub const API_EXPENSE_BREAKDOWN: &str = "/api/expense-breakdown";
/// The chart data for the monthly income/expense trend.
pub const API_INCOME_EXPENSE_TREND: &str = "/api/income-expense-trend";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace and ends with a
/// right brace, e.g. '{id}' in '/edit/{id}'. This function assumes that an
/// endpoint path only contains ASCII characters and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_string();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|end| param_start + end + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}

// These tests are here so that we know when we call `Uri::from_shared` it
// will not panic.
#[cfg(test)]
mod endpoints_tests {
    use axum::http::Uri;

    use crate::endpoints;

    use super::format_endpoint;

    fn assert_endpoint_is_valid_uri(uri: &str) {
        assert!(uri.parse::<Uri>().is_ok());
    }

    #[test]
    fn endpoints_are_valid_uris() {
        assert_endpoint_is_valid_uri(endpoints::ROOT);
        assert_endpoint_is_valid_uri(endpoints::DASHBOARD);
        assert_endpoint_is_valid_uri(endpoints::EDIT_TRANSACTION);
        assert_endpoint_is_valid_uri(endpoints::DELETE_TRANSACTION);
        assert_endpoint_is_valid_uri(endpoints::BUDGETS);
        assert_endpoint_is_valid_uri(endpoints::CATEGORIES);
        assert_endpoint_is_valid_uri(endpoints::DELETE_CATEGORY);
        assert_endpoint_is_valid_uri(endpoints::EXPORT_PDF);
        assert_endpoint_is_valid_uri(endpoints::EXPORT_CSV);
        assert_endpoint_is_valid_uri(endpoints::REGISTER);
        assert_endpoint_is_valid_uri(endpoints::LOG_IN);
        assert_endpoint_is_valid_uri(endpoints::LOG_OUT);
        assert_endpoint_is_valid_uri(endpoints::FORGOT_PASSWORD);
        assert_endpoint_is_valid_uri(endpoints::RESET_PASSWORD);
        assert_endpoint_is_valid_uri(endpoints::API_EXPENSE_BREAKDOWN);
        assert_endpoint_is_valid_uri(endpoints::API_INCOME_EXPENSE_TREND);
    }

    #[test]
    fn format_endpoint_replaces_parameter() {
        let got = format_endpoint(endpoints::EDIT_TRANSACTION, 42);

        assert_eq!(got, "/edit/42");
    }

    #[test]
    fn format_endpoint_without_parameter_returns_path() {
        let got = format_endpoint(endpoints::DASHBOARD, 42);

        assert_eq!(got, endpoints::DASHBOARD);
    }
}
