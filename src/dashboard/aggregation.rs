//! Reduces a user's transactions into the summary numbers shown on the
//! dashboard.
//!
//! A transaction's direction (income vs. expense) is not stored on the
//! transaction itself. It is derived at read time by looking the category
//! name up in the user's current category set. Transactions whose category
//! name no longer matches any category are untyped and contribute to neither
//! total.

use std::collections::{BTreeMap, HashMap};

use crate::{
    category::{Category, CategoryKind},
    transaction::Transaction,
};

/// The number of categories shown in the top-expenses list.
const TOP_EXPENSE_COUNT: usize = 5;

/// The income, expense, and balance totals over a set of transactions.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Totals {
    /// The sum of amounts with an Income-typed category.
    pub income: f64,
    /// The sum of amounts with an Expense-typed category.
    pub expense: f64,
    /// Income minus expense.
    pub balance: f64,
}

/// The total spent against one expense category.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTotal {
    /// The category name.
    pub name: String,
    /// The summed amount.
    pub total: f64,
    /// The category's display color.
    pub color: String,
}

/// The income and expense sums for one calendar month.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyBucket {
    /// The calendar year of the bucket.
    pub year: i32,
    /// The calendar month of the bucket, 1 through 12.
    pub month: u8,
    /// The sum of Income-typed amounts in this month.
    pub income: f64,
    /// The sum of Expense-typed amounts in this month.
    pub expense: f64,
}

impl MonthlyBucket {
    /// Income minus expense for this month.
    pub fn balance(&self) -> f64 {
        self.income - self.expense
    }
}

/// The direction of the recent spending trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    /// Recent months spend more than the months before them.
    Increasing,
    /// Recent months spend the same or less than the months before them.
    Decreasing,
    /// Not enough history to compare.
    Stable,
}

impl Trend {
    /// The display string for the trend direction.
    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Increasing => "increasing",
            Trend::Decreasing => "decreasing",
            Trend::Stable => "stable",
        }
    }
}

/// Derived statistics shown in the dashboard's insight cards.
#[derive(Debug, Clone, PartialEq)]
pub struct Insights {
    /// The share of income left after expenses, as a percentage. Zero when
    /// there is no income.
    pub savings_rate: f64,
    /// Total income divided by the number of monthly buckets.
    pub avg_monthly_income: f64,
    /// Total expense divided by the number of monthly buckets.
    pub avg_monthly_expense: f64,
    /// The expense category with the largest total, if any expenses exist.
    pub highest_expense_category: Option<String>,
    /// The amount spent on the highest expense category.
    pub highest_expense_amount: f64,
    /// Whether expenses exceed income.
    pub is_overspending: bool,
    /// Balance divided by the number of monthly buckets.
    pub monthly_surplus: f64,
    /// The direction of recent spending compared to the months before.
    pub trend: Trend,
    /// The absolute relative change between the compared means, as a
    /// percentage.
    pub trend_percentage: f64,
}

/// Build the name-to-kind lookup used to classify transactions.
pub fn classification_map(categories: &[Category]) -> HashMap<String, CategoryKind> {
    categories
        .iter()
        .map(|category| (category.name.to_string(), category.kind))
        .collect()
}

/// Sum transactions into income, expense, and balance.
pub fn compute_totals(
    transactions: &[Transaction],
    classification: &HashMap<String, CategoryKind>,
) -> Totals {
    let mut totals = Totals::default();

    for transaction in transactions {
        match classification.get(&transaction.category) {
            Some(CategoryKind::Income) => totals.income += transaction.amount,
            Some(CategoryKind::Expense) => totals.expense += transaction.amount,
            None => {}
        }
    }

    totals.balance = totals.income - totals.expense;

    totals
}

/// Sum spending per expense category, largest first.
///
/// Only Expense-typed categories with at least one matching transaction
/// appear. Ties keep the categories' creation order.
pub fn expense_breakdown(
    transactions: &[Transaction],
    categories: &[Category],
) -> Vec<CategoryTotal> {
    let mut breakdown: Vec<CategoryTotal> = categories
        .iter()
        .filter(|category| category.kind == CategoryKind::Expense)
        .map(|category| {
            let total = transactions
                .iter()
                .filter(|transaction| transaction.category == category.name.as_ref())
                .map(|transaction| transaction.amount)
                .sum();

            CategoryTotal {
                name: category.name.to_string(),
                total,
                color: category.color.clone(),
            }
        })
        .filter(|category_total| category_total.total > 0.0)
        .collect();

    // A stable sort keeps creation order among equal totals.
    breakdown.sort_by(|a, b| b.total.total_cmp(&a.total));

    breakdown
}

/// The five largest expense categories.
pub fn top_expense_categories(
    transactions: &[Transaction],
    categories: &[Category],
) -> Vec<CategoryTotal> {
    let mut breakdown = expense_breakdown(transactions, categories);
    breakdown.truncate(TOP_EXPENSE_COUNT);

    breakdown
}

/// Group transactions by calendar month, oldest first.
///
/// The series always covers the full transaction history, ignoring any
/// date-range filter applied to the transaction list on display.
pub fn monthly_series(
    transactions: &[Transaction],
    classification: &HashMap<String, CategoryKind>,
) -> Vec<MonthlyBucket> {
    let mut buckets: BTreeMap<(i32, u8), MonthlyBucket> = BTreeMap::new();

    for transaction in transactions {
        let year = transaction.timestamp.year();
        let month = u8::from(transaction.timestamp.month());

        let bucket = buckets.entry((year, month)).or_insert(MonthlyBucket {
            year,
            month,
            income: 0.0,
            expense: 0.0,
        });

        match classification.get(&transaction.category) {
            Some(CategoryKind::Income) => bucket.income += transaction.amount,
            Some(CategoryKind::Expense) => bucket.expense += transaction.amount,
            None => {}
        }
    }

    buckets.into_values().collect()
}

// The trend compares the mean expense of this many recent buckets against
// the same number of buckets before them.
const TREND_WINDOW: usize = 3;

fn spending_trend(series: &[MonthlyBucket]) -> (Trend, f64) {
    if series.len() < 2 * TREND_WINDOW {
        return (Trend::Stable, 0.0);
    }

    let recent = &series[series.len() - TREND_WINDOW..];
    let previous = &series[series.len() - 2 * TREND_WINDOW..series.len() - TREND_WINDOW];

    let recent_mean: f64 =
        recent.iter().map(|bucket| bucket.expense).sum::<f64>() / TREND_WINDOW as f64;
    let previous_mean: f64 =
        previous.iter().map(|bucket| bucket.expense).sum::<f64>() / TREND_WINDOW as f64;

    let trend = if recent_mean > previous_mean {
        Trend::Increasing
    } else {
        Trend::Decreasing
    };

    let percentage = if previous_mean == 0.0 {
        0.0
    } else {
        ((recent_mean - previous_mean) / previous_mean * 100.0).abs()
    };

    (trend, percentage)
}

/// Derive the insight card statistics from the full-history totals, top
/// expense list, and monthly series.
pub fn derive_insights(
    totals: &Totals,
    top_expenses: &[CategoryTotal],
    series: &[MonthlyBucket],
) -> Insights {
    let bucket_count = series.len().max(1) as f64;

    let savings_rate = if totals.income > 0.0 {
        (totals.income - totals.expense) / totals.income * 100.0
    } else {
        0.0
    };

    let (trend, trend_percentage) = spending_trend(series);

    Insights {
        savings_rate,
        avg_monthly_income: totals.income / bucket_count,
        avg_monthly_expense: totals.expense / bucket_count,
        highest_expense_category: top_expenses.first().map(|category| category.name.clone()),
        highest_expense_amount: top_expenses
            .first()
            .map(|category| category.total)
            .unwrap_or(0.0),
        is_overspending: totals.expense > totals.income,
        monthly_surplus: totals.balance / bucket_count,
        trend,
        trend_percentage,
    }
}
