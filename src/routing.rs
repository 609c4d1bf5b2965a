//! Assembles the application's routes into a router.

use axum::{
    Router,
    extract::FromRef,
    middleware,
    response::Redirect,
    routing::{get, post},
};

use crate::{
    AppState,
    auth::{AuthState, auth_guard},
    budget::{get_budgets_page, upsert_budget_endpoint},
    category::{create_category_endpoint, delete_category_endpoint, get_categories_page},
    dashboard::{
        create_transaction_endpoint, get_dashboard_page, get_expense_breakdown,
        get_income_expense_trend,
    },
    endpoints,
    export::{export_csv_endpoint, export_pdf_endpoint},
    forgot_password::{
        forgot_password_endpoint, get_forgot_password_page, get_reset_password_page,
        reset_password_endpoint,
    },
    log_in::{get_log_in_page, log_in_endpoint},
    log_out::log_out_endpoint,
    not_found::get_404_not_found,
    register::{get_register_page, register_endpoint},
    transaction::{
        delete_transaction_endpoint, get_edit_transaction_page, update_transaction_endpoint,
    },
};

/// Create the app's router with all the app's routes.
///
/// Routes other than registration, log-in, and the password reset flow
/// require a valid session cookie and redirect to the log-in page without
/// one.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(
            endpoints::REGISTER,
            get(get_register_page).post(register_endpoint),
        )
        .route(endpoints::LOG_IN, get(get_log_in_page).post(log_in_endpoint))
        .route(
            endpoints::FORGOT_PASSWORD,
            get(get_forgot_password_page).post(forgot_password_endpoint),
        )
        .route(
            endpoints::RESET_PASSWORD,
            get(get_reset_password_page).post(reset_password_endpoint),
        );

    let protected_routes = Router::new()
        .route(
            endpoints::ROOT,
            get(|| async { Redirect::to(endpoints::DASHBOARD) }),
        )
        .route(
            endpoints::DASHBOARD,
            get(get_dashboard_page).post(create_transaction_endpoint),
        )
        .route(endpoints::LOG_OUT, get(log_out_endpoint))
        .route(
            endpoints::EDIT_TRANSACTION,
            get(get_edit_transaction_page).post(update_transaction_endpoint),
        )
        .route(
            endpoints::DELETE_TRANSACTION,
            post(delete_transaction_endpoint),
        )
        .route(
            endpoints::BUDGETS,
            get(get_budgets_page).post(upsert_budget_endpoint),
        )
        .route(
            endpoints::CATEGORIES,
            get(get_categories_page).post(create_category_endpoint),
        )
        .route(endpoints::DELETE_CATEGORY, post(delete_category_endpoint))
        .route(endpoints::EXPORT_CSV, get(export_csv_endpoint))
        .route(endpoints::EXPORT_PDF, get(export_pdf_endpoint))
        .route(endpoints::API_EXPENSE_BREAKDOWN, get(get_expense_breakdown))
        .route(
            endpoints::API_INCOME_EXPENSE_TREND,
            get(get_income_expense_trend),
        )
        .route_layer(middleware::from_fn_with_state(
            AuthState::from_ref(&state),
            auth_guard,
        ));

    unprotected_routes
        .merge(protected_routes)
        .fallback(get_404_not_found)
        .with_state(state)
}
