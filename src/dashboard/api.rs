//! JSON endpoints that feed the dashboard charts.

use axum::{Extension, Json, extract::State};
use serde::Serialize;

use crate::{
    AppState, Error,
    budget::month_name,
    category::get_categories,
    dashboard::aggregation::{classification_map, expense_breakdown, monthly_series},
    transaction::get_transactions,
    user::UserID,
};

/// The most recent monthly buckets included in the trend chart.
const TREND_BUCKET_LIMIT: usize = 12;

/// The data set for the expense breakdown doughnut chart.
#[derive(Debug, Serialize, PartialEq)]
pub struct ExpenseBreakdownResponse {
    /// The expense category names, largest total first.
    pub labels: Vec<String>,
    /// The summed amount per category.
    pub data: Vec<f64>,
    /// The display color per category.
    pub colors: Vec<String>,
}

/// The data set for the income/expense trend line chart.
#[derive(Debug, Serialize, PartialEq)]
pub struct IncomeExpenseTrendResponse {
    /// Month labels like "Aug 2025", oldest first.
    pub labels: Vec<String>,
    /// The income total per month.
    pub income: Vec<f64>,
    /// The expense total per month.
    pub expense: Vec<f64>,
}

/// Serve the spending-per-category data for the doughnut chart.
pub async fn get_expense_breakdown(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<ExpenseBreakdownResponse>, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLock)?;

    let categories = get_categories(user_id, &connection)?;
    let transactions = get_transactions(user_id, &connection)?;

    let breakdown = expense_breakdown(&transactions, &categories);

    let mut response = ExpenseBreakdownResponse {
        labels: Vec::with_capacity(breakdown.len()),
        data: Vec::with_capacity(breakdown.len()),
        colors: Vec::with_capacity(breakdown.len()),
    };

    for category_total in breakdown {
        response.labels.push(category_total.name);
        response.data.push(category_total.total);
        response.colors.push(category_total.color);
    }

    Ok(Json(response))
}

/// Serve the monthly income/expense data for the trend chart, covering at
/// most the last twelve months with transactions.
pub async fn get_income_expense_trend(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<IncomeExpenseTrendResponse>, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLock)?;

    let categories = get_categories(user_id, &connection)?;
    let transactions = get_transactions(user_id, &connection)?;

    let series = monthly_series(&transactions, &classification_map(&categories));
    let recent = &series[series.len().saturating_sub(TREND_BUCKET_LIMIT)..];

    let mut response = IncomeExpenseTrendResponse {
        labels: Vec::with_capacity(recent.len()),
        income: Vec::with_capacity(recent.len()),
        expense: Vec::with_capacity(recent.len()),
    };

    for bucket in recent {
        response
            .labels
            .push(format!("{} {}", month_label(bucket.month)?, bucket.year));
        response.income.push(bucket.income);
        response.expense.push(bucket.expense);
    }

    Ok(Json(response))
}

// "August" -> "Aug".
fn month_label(month: u8) -> Result<&'static str, Error> {
    let name = month_name(month)?;

    Ok(&name[..3])
}
