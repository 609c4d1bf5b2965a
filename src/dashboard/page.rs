//! The dashboard page: summary cards, insights, charts, and the transaction
//! ledger with its create form.

use axum::{
    Extension, Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use maud::{Markup, PreEscaped, html};
use rusqlite::Connection;
use serde::Deserialize;
use time::{format_description::BorrowedFormatItem, macros::format_description};

use crate::{
    AppState, Error,
    budget::month_name,
    category::{Category, get_categories},
    dashboard::aggregation::{
        Insights, MonthlyBucket, Trend, classification_map, compute_totals, derive_insights,
        monthly_series, top_expense_categories,
    },
    endpoints,
    html::{
        BUTTON_DELETE_STYLE, BUTTON_PRIMARY_STYLE, CARD_STYLE, FORM_LABEL_STYLE,
        FORM_TEXT_INPUT_STYLE, HeadElement, LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, form_error, format_currency,
    },
    navigation::NavBar,
    transaction::{
        RecurrenceKind, Transaction, TransactionFilter, TransactionFormData, create_transaction,
        get_transactions, validate_transaction_form,
    },
    user::UserID,
};

const DISPLAY_DATE_FORMAT: &[BorrowedFormatItem] =
    format_description!("[year]-[month]-[day] [hour]:[minute]");

/// The filter values accepted by the dashboard's query string.
#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    /// Keep transactions on or after this date, 'YYYY-MM-DD'.
    #[serde(default)]
    pub start_date: String,
    /// Keep transactions on or before this date, 'YYYY-MM-DD'.
    #[serde(default)]
    pub end_date: String,
    /// Keep transactions whose note contains this text.
    #[serde(default)]
    pub note: String,
}

impl DashboardQuery {
    fn to_filter(&self) -> TransactionFilter {
        TransactionFilter::parse(&self.start_date, &self.end_date, &self.note)
    }
}

const CHART_JS_URL: &str = "https://cdn.jsdelivr.net/npm/chart.js@4";

// Builds the doughnut and trend charts from the JSON endpoints.
fn chart_script() -> HeadElement {
    let script = format!(
        r##"
        document.addEventListener("DOMContentLoaded", () => {{
            fetch("{breakdown}")
                .then((response) => response.json())
                .then((breakdown) => {{
                    new Chart(document.getElementById("expense-breakdown-chart"), {{
                        type: "doughnut",
                        data: {{
                            labels: breakdown.labels,
                            datasets: [{{ data: breakdown.data, backgroundColor: breakdown.colors }}],
                        }},
                    }});
                }});

            fetch("{trend}")
                .then((response) => response.json())
                .then((trend) => {{
                    new Chart(document.getElementById("income-expense-trend-chart"), {{
                        type: "line",
                        data: {{
                            labels: trend.labels,
                            datasets: [
                                {{ label: "Income", data: trend.income, borderColor: "#22c55e" }},
                                {{ label: "Expense", data: trend.expense, borderColor: "#ef4444" }},
                            ],
                        }},
                    }});
                }});
        }});
        "##,
        breakdown = endpoints::API_EXPENSE_BREAKDOWN,
        trend = endpoints::API_INCOME_EXPENSE_TREND,
    );

    HeadElement::ScriptSource(PreEscaped(script))
}

fn summary_card(title: &str, amount: f64, text_style: &str) -> Markup {
    html! {
        div class=(CARD_STYLE)
        {
            span class="text-sm text-gray-500 dark:text-gray-400" { (title) }
            span class=(format!("text-2xl font-bold {text_style}")) { (format_currency(amount)) }
        }
    }
}

fn insight_cards(insights: &Insights) -> Markup {
    let trend_text = match insights.trend {
        Trend::Stable => "Stable".to_string(),
        trend => format!("{} {:.1}%", capitalize(trend.as_str()), insights.trend_percentage),
    };

    html! {
        div class="grid grid-cols-2 md:grid-cols-4 gap-4 w-full max-w-screen-lg mb-6"
        {
            div class=(CARD_STYLE)
            {
                span class="text-sm text-gray-500 dark:text-gray-400" { "Savings rate" }
                span class="text-xl font-bold" { (format!("{:.1}%", insights.savings_rate)) }
            }

            div class=(CARD_STYLE)
            {
                span class="text-sm text-gray-500 dark:text-gray-400" { "Avg monthly income" }
                span class="text-xl font-bold" { (format_currency(insights.avg_monthly_income)) }
            }

            div class=(CARD_STYLE)
            {
                span class="text-sm text-gray-500 dark:text-gray-400" { "Avg monthly expense" }
                span class="text-xl font-bold" { (format_currency(insights.avg_monthly_expense)) }
            }

            div class=(CARD_STYLE)
            {
                span class="text-sm text-gray-500 dark:text-gray-400" { "Monthly surplus" }
                span class="text-xl font-bold" { (format_currency(insights.monthly_surplus)) }
            }

            div class=(CARD_STYLE)
            {
                span class="text-sm text-gray-500 dark:text-gray-400" { "Biggest expense" }
                @match &insights.highest_expense_category {
                    Some(category) => span class="text-xl font-bold"
                    {
                        (category) " (" (format_currency(insights.highest_expense_amount)) ")"
                    }
                    None => span class="text-xl font-bold" { "-" }
                }
            }

            div class=(CARD_STYLE)
            {
                span class="text-sm text-gray-500 dark:text-gray-400" { "Spending trend" }
                span class="text-xl font-bold" { (trend_text) }
            }

            @if insights.is_overspending {
                div class=(format!("{CARD_STYLE} border border-red-500"))
                {
                    span class="text-sm text-red-600 dark:text-red-400" { "Overspending" }
                    span class="text-xl font-bold" { "Expenses exceed income" }
                }
            }
        }
    }
}

fn capitalize(word: &str) -> String {
    let mut characters = word.chars();

    match characters.next() {
        Some(first) => first.to_uppercase().chain(characters).collect(),
        None => String::new(),
    }
}

fn monthly_table(series: &[MonthlyBucket]) -> Markup {
    html! {
        table class="w-full max-w-screen-md text-sm text-left text-gray-500 dark:text-gray-400 mb-6"
        {
            thead class=(TABLE_HEADER_STYLE)
            {
                tr
                {
                    th scope="col" class=(TABLE_CELL_STYLE) { "Month" }
                    th scope="col" class=(TABLE_CELL_STYLE) { "Income" }
                    th scope="col" class=(TABLE_CELL_STYLE) { "Expense" }
                    th scope="col" class=(TABLE_CELL_STYLE) { "Balance" }
                }
            }

            tbody
            {
                @for bucket in series.iter().rev()
                {
                    tr class=(TABLE_ROW_STYLE)
                    {
                        td class=(TABLE_CELL_STYLE)
                        {
                            (month_name(bucket.month).unwrap_or("")) " " (bucket.year)
                        }
                        td class=(TABLE_CELL_STYLE) { (format_currency(bucket.income)) }
                        td class=(TABLE_CELL_STYLE) { (format_currency(bucket.expense)) }
                        td class=(TABLE_CELL_STYLE) { (format_currency(bucket.balance())) }
                    }
                }
            }
        }
    }
}

fn new_transaction_form(categories: &[Category], error_message: &str) -> Markup {
    html! {
        form method="post" action=(endpoints::DASHBOARD)
            class="flex flex-row flex-wrap items-end gap-2 mb-6"
        {
            div
            {
                label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }
                input type="number" name="amount" id="amount" step="0.01" min="0.01" required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

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
                label for="note" class=(FORM_LABEL_STYLE) { "Note" }
                input type="text" name="note" id="note" class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="date" class=(FORM_LABEL_STYLE) { "Date" }
                input type="datetime-local" name="date" id="date" class=(FORM_TEXT_INPUT_STYLE);
            }

            div class="flex flex-row items-center gap-2"
            {
                input type="checkbox" name="is_recurring" id="is_recurring";
                label for="is_recurring" class=(FORM_LABEL_STYLE) { "Recurring" }

                select name="recurrence" id="recurrence" class=(FORM_TEXT_INPUT_STYLE)
                {
                    @for kind in [
                        RecurrenceKind::Weekly,
                        RecurrenceKind::Monthly,
                        RecurrenceKind::Yearly,
                    ] {
                        option value=(kind.as_str()) { (kind.as_str()) }
                    }
                }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Add transaction" }

            (form_error(error_message))
        }
    }
}

fn filter_form(query: &DashboardQuery) -> Markup {
    html! {
        form method="get" action=(endpoints::DASHBOARD)
            class="flex flex-row flex-wrap items-end gap-2 mb-6"
        {
            div
            {
                label for="start_date" class=(FORM_LABEL_STYLE) { "From" }
                input type="date" name="start_date" id="start_date" value=(query.start_date)
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="end_date" class=(FORM_LABEL_STYLE) { "To" }
                input type="date" name="end_date" id="end_date" value=(query.end_date)
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="note" class=(FORM_LABEL_STYLE) { "Note contains" }
                input type="text" name="note" id="note" value=(query.note)
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Filter" }

            a href=(endpoints::DASHBOARD) class=(LINK_STYLE) { "Clear" }
        }
    }
}

fn transaction_table(transactions: &[Transaction]) -> Result<Markup, Error> {
    let mut rows = Vec::with_capacity(transactions.len());

    for transaction in transactions {
        let date = transaction
            .timestamp
            .format(DISPLAY_DATE_FORMAT)
            .map_err(|error| Error::DateError(error.to_string()))?;

        rows.push(html! {
            tr class=(TABLE_ROW_STYLE)
            {
                td class=(TABLE_CELL_STYLE) { (format_currency(transaction.amount)) }
                td class=(TABLE_CELL_STYLE) { (transaction.category) }
                td class=(TABLE_CELL_STYLE) { (transaction.note.as_deref().unwrap_or("-")) }
                td class=(TABLE_CELL_STYLE) { (date) }
                td class=(TABLE_CELL_STYLE)
                {
                    @if transaction.is_recurring {
                        @if let Some(kind) = transaction.recurrence {
                            (kind.as_str())
                        } @else {
                            "yes"
                        }
                    } @else {
                        "-"
                    }
                }
                td class=(TABLE_CELL_STYLE)
                {
                    a href=(endpoints::format_endpoint(endpoints::EDIT_TRANSACTION, transaction.id))
                        class=(LINK_STYLE)
                    {
                        "Edit"
                    }
                }
                td class=(TABLE_CELL_STYLE)
                {
                    form method="post"
                        action=(endpoints::format_endpoint(endpoints::DELETE_TRANSACTION, transaction.id))
                    {
                        button type="submit" class=(BUTTON_DELETE_STYLE) { "Delete" }
                    }
                }
            }
        });
    }

    Ok(html! {
        table class="w-full max-w-screen-lg text-sm text-left text-gray-500 dark:text-gray-400"
        {
            thead class=(TABLE_HEADER_STYLE)
            {
                tr
                {
                    th scope="col" class=(TABLE_CELL_STYLE) { "Amount" }
                    th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                    th scope="col" class=(TABLE_CELL_STYLE) { "Note" }
                    th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                    th scope="col" class=(TABLE_CELL_STYLE) { "Recurring" }
                    th scope="col" class=(TABLE_CELL_STYLE) colspan="2" { "Actions" }
                }
            }

            tbody
            {
                @for row in &rows {
                    (row)
                }

                @if rows.is_empty() {
                    tr class=(TABLE_ROW_STYLE)
                    {
                        td class=(TABLE_CELL_STYLE) colspan="7" { "No transactions yet." }
                    }
                }
            }
        }
    })
}

fn render_dashboard(
    user_id: UserID,
    query: &DashboardQuery,
    error_message: &str,
    connection: &Connection,
) -> Result<Markup, Error> {
    let categories = get_categories(user_id, connection)?;
    let transactions = get_transactions(user_id, connection)?;

    let filter = query.to_filter();
    let visible_transactions = if filter.is_active() {
        filter.apply(&transactions)
    } else {
        transactions.clone()
    };

    let classification = classification_map(&categories);

    // The summary cards reflect the current filter, while the monthly series
    // and insight cards always cover the full history.
    let visible_totals = compute_totals(&visible_transactions, &classification);
    let full_totals = compute_totals(&transactions, &classification);
    let series = monthly_series(&transactions, &classification);
    let top_expenses = top_expense_categories(&transactions, &categories);
    let insights = derive_insights(&full_totals, &top_expenses, &series);

    let content = html! {
        (NavBar::new(endpoints::DASHBOARD).into_html())

        div class=(PAGE_CONTAINER_STYLE)
        {
            h1 class="text-2xl font-bold mb-4" { "Dashboard" }

            div class="grid grid-cols-1 md:grid-cols-3 gap-4 w-full max-w-screen-lg mb-6"
            {
                (summary_card("Income", visible_totals.income, "text-green-600 dark:text-green-400"))
                (summary_card("Expense", visible_totals.expense, "text-red-600 dark:text-red-400"))
                (summary_card("Balance", visible_totals.balance, ""))
            }

            (insight_cards(&insights))

            div class="grid grid-cols-1 md:grid-cols-2 gap-4 w-full max-w-screen-lg mb-6"
            {
                div class=(CARD_STYLE)
                {
                    h2 class="font-semibold mb-2" { "Expense breakdown" }
                    canvas id="expense-breakdown-chart" {}
                }

                div class=(CARD_STYLE)
                {
                    h2 class="font-semibold mb-2" { "Income vs expense" }
                    canvas id="income-expense-trend-chart" {}
                }
            }

            h2 class="text-xl font-semibold mb-2" { "Monthly summary" }
            (monthly_table(&series))

            h2 class="text-xl font-semibold mb-2" { "New transaction" }
            (new_transaction_form(&categories, error_message))

            h2 class="text-xl font-semibold mb-2" { "Transactions" }
            (filter_form(query))
            (transaction_table(&visible_transactions)?)
        }
    };

    Ok(base(
        "Dashboard",
        &[HeadElement::ScriptLink(CHART_JS_URL.to_string()), chart_script()],
        &content,
    ))
}

/// Display the dashboard, optionally filtered by the query string.
pub async fn get_dashboard_page(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<DashboardQuery>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLock)?;

    Ok(render_dashboard(user_id, &query, "", &connection)?.into_response())
}

/// Create a transaction from the dashboard's form.
///
/// On success the client is redirected back to the (unfiltered) dashboard.
/// Validation failures re-render the page with an error message.
pub async fn create_transaction_endpoint(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<TransactionFormData>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLock)?;

    let result = validate_transaction_form(&form).and_then(|validated| {
        create_transaction(
            validated.amount,
            &validated.category,
            validated.note.as_deref(),
            validated.timestamp,
            validated.is_recurring,
            validated.recurrence,
            user_id,
            &connection,
        )
    });

    match result {
        Ok(_) => Ok(Redirect::to(endpoints::DASHBOARD).into_response()),
        Err(error @ (Error::InvalidAmount | Error::DateError(_))) => Ok(render_dashboard(
            user_id,
            &DashboardQuery::default(),
            &error.to_string(),
            &connection,
        )?
        .into_response()),
        Err(error) => Err(error),
    }
}
