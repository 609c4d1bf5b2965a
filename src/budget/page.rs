//! The budget page and its form handler.

use axum::{
    Extension, Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use maud::{Markup, html};
use time::{Month, OffsetDateTime};

use crate::{
    AppState, Error,
    budget::{
        db::{get_budgets, upsert_budget},
        domain::{BudgetFormData, BudgetProgress, month_name},
    },
    category::{Category, get_categories},
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, CARD_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        PAGE_CONTAINER_STYLE, base, form_error, format_currency,
    },
    navigation::NavBar,
    transaction::get_transactions,
    user::UserID,
};

fn render_progress_card(progress: &BudgetProgress) -> Result<Markup, Error> {
    let month = month_name(progress.budget.month)?;
    let bar_color = if progress.is_exceeded() {
        "bg-red-500"
    } else {
        "bg-blue-500"
    };

    Ok(html! {
        div class=(CARD_STYLE)
        {
            div class="flex flex-row justify-between"
            {
                span class="font-semibold" { (progress.budget.category) }
                span class="text-sm text-gray-500 dark:text-gray-400"
                {
                    (month) " " (progress.budget.year)
                }
            }

            div class="w-full bg-gray-200 dark:bg-gray-700 rounded-full h-2.5"
            {
                div class=(format!("h-2.5 rounded-full {bar_color}"))
                    style=(format!("width: {}%", progress.percentage)) {}
            }

            div class="flex flex-row justify-between text-sm"
            {
                span
                {
                    (format_currency(progress.spent))
                    " of "
                    (format_currency(progress.budget.amount))
                }

                @if progress.is_exceeded() {
                    span class="text-red-600 dark:text-red-400"
                    {
                        "Over by " (format_currency(-progress.remaining))
                    }
                } @else {
                    span { (format_currency(progress.remaining)) " left" }
                }
            }
        }
    })
}

fn render_budgets_page(
    progress: &[BudgetProgress],
    categories: &[Category],
    error_message: &str,
) -> Result<Markup, Error> {
    let now = OffsetDateTime::now_utc();

    let cards: Vec<Markup> = progress
        .iter()
        .map(render_progress_card)
        .collect::<Result<_, _>>()?;

    let content = html! {
        (NavBar::new(endpoints::BUDGETS).into_html())

        div class=(PAGE_CONTAINER_STYLE)
        {
            h1 class="text-2xl font-bold mb-4" { "Budgets" }

            form method="post" action=(endpoints::BUDGETS) class="flex flex-row items-end gap-2 mb-6"
            {
                div
                {
                    label for="category" class=(FORM_LABEL_STYLE) { "Category" }
                    select name="category" id="category" class=(FORM_TEXT_INPUT_STYLE)
                    {
                        @for category in categories {
                            option value=(category.name) { (category.name) }
                        }
                    }
                }

                div
                {
                    label for="amount" class=(FORM_LABEL_STYLE) { "Limit" }
                    input type="number" name="amount" id="amount" step="0.01" min="0.01" required
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="month" class=(FORM_LABEL_STYLE) { "Month" }
                    select name="month" id="month" class=(FORM_TEXT_INPUT_STYLE)
                    {
                        @for month in 1..=12u8 {
                            option value=(month) selected[month == u8::from(now.month())]
                            {
                                // Month numbers 1 through 12 always have a name.
                                (month_name(month).unwrap_or(""))
                            }
                        }
                    }
                }

                div
                {
                    label for="year" class=(FORM_LABEL_STYLE) { "Year" }
                    input type="number" name="year" id="year" value=(now.year())
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Set budget" }
            }

            (form_error(error_message))

            div class="grid grid-cols-1 md:grid-cols-2 gap-4 w-full max-w-screen-md"
            {
                @for card in &cards {
                    (card)
                }
            }

            @if progress.is_empty() {
                p class="text-gray-500 dark:text-gray-400" { "No budgets yet." }
            }
        }
    };

    Ok(base("Budgets", &[], &content))
}

fn compute_all_progress(
    user_id: UserID,
    connection: &rusqlite::Connection,
) -> Result<Vec<BudgetProgress>, Error> {
    let budgets = get_budgets(user_id, connection)?;
    let transactions = get_transactions(user_id, connection)?;

    Ok(budgets
        .into_iter()
        .map(|budget| BudgetProgress::compute(budget, &transactions))
        .collect())
}

/// Display the budgets with their progress bars alongside the upsert form.
pub async fn get_budgets_page(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLock)?;

    let progress = compute_all_progress(user_id, &connection)?;
    let categories = get_categories(user_id, &connection)?;

    Ok(render_budgets_page(&progress, &categories, "")?.into_response())
}

/// Create or overwrite a budget from the submitted form.
///
/// Submitting a (category, month, year) combination that already has a budget
/// replaces its amount.
pub async fn upsert_budget_endpoint(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<BudgetFormData>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLock)?;

    let result = form
        .amount
        .trim()
        .parse::<f64>()
        .map_err(|_| Error::InvalidAmount)
        .and_then(|amount| {
            Month::try_from(form.month).map_err(|error| Error::DateError(error.to_string()))?;

            upsert_budget(&form.category, amount, form.month, form.year, user_id, &connection)
        });

    match result {
        Ok(()) => Ok(Redirect::to(endpoints::BUDGETS).into_response()),
        Err(error @ (Error::InvalidAmount | Error::DateError(_))) => {
            let progress = compute_all_progress(user_id, &connection)?;
            let categories = get_categories(user_id, &connection)?;

            Ok(render_budgets_page(&progress, &categories, &error.to_string())?.into_response())
        }
        Err(error) => Err(error),
    }
}

#[cfg(test)]
mod budgets_page_tests {
    use axum::{Extension, Form, extract::State, http::StatusCode};
    use rusqlite::Connection;
    use time::macros::datetime;

    use crate::{
        AppState,
        budget::{db::{get_budgets, upsert_budget}, domain::BudgetFormData},
        password::PasswordHash,
        test_utils::assert_contains_text,
        transaction::create_transaction,
        user::{User, create_user},
    };

    use super::{get_budgets_page, upsert_budget_endpoint};

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
    async fn page_shows_progress_for_budget() {
        let (state, user) = test_state_and_user();
        {
            let connection = state.db_connection.lock().unwrap();
            upsert_budget("Food", 50.0, 8, 2025, user.id, &connection).unwrap();
            create_transaction(
                40.0,
                "Food",
                None,
                datetime!(2025-08-10 12:00 UTC),
                false,
                None,
                user.id,
                &connection,
            )
            .unwrap();
        }

        let response = get_budgets_page(State(state), Extension(user.id))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = crate::test_utils::response_text(response).await;
        assert!(body.contains("40.00 of"));
        assert!(body.contains("width: 80%"));
        assert!(body.contains("10.00 left"));
    }

    #[tokio::test]
    async fn upsert_creates_budget_and_redirects() {
        let (state, user) = test_state_and_user();

        let response = upsert_budget_endpoint(
            State(state.clone()),
            Extension(user.id),
            Form(BudgetFormData {
                category: "Food".to_string(),
                amount: "50".to_string(),
                month: 8,
                year: 2025,
            }),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let connection = state.db_connection.lock().unwrap();
        let budgets = get_budgets(user.id, &connection).unwrap();
        assert_eq!(budgets.len(), 1);
        assert_eq!(budgets[0].amount, 50.0);
    }

    #[tokio::test]
    async fn upsert_with_bad_amount_rerenders_with_error() {
        let (state, user) = test_state_and_user();

        let response = upsert_budget_endpoint(
            State(state),
            Extension(user.id),
            Form(BudgetFormData {
                category: "Food".to_string(),
                amount: "nope".to_string(),
                month: 8,
                year: 2025,
            }),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_contains_text(response, "greater than zero").await;
    }

    #[tokio::test]
    async fn upsert_with_bad_month_rerenders_with_error() {
        let (state, user) = test_state_and_user();

        let response = upsert_budget_endpoint(
            State(state),
            Extension(user.id),
            Form(BudgetFormData {
                category: "Food".to_string(),
                amount: "50".to_string(),
                month: 13,
                year: 2025,
            }),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}
