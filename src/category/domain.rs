//! Core category domain types.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::{Error, user::UserID};

/// Whether a category counts towards income or expenses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(rename_all = "lowercase")]
pub enum CategoryKind {
    /// Transactions in this category add to the user's income total.
    Income,
    /// Transactions in this category add to the user's expense total.
    Expense,
}

impl CategoryKind {
    /// The canonical string stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryKind::Income => "Income",
            CategoryKind::Expense => "Expense",
        }
    }

    /// Parse the canonical database string back into a kind.
    pub fn from_db_str(value: &str) -> Option<Self> {
        match value {
            "Income" => Some(CategoryKind::Income),
            "Expense" => Some(CategoryKind::Expense),
            _ => None,
        }
    }
}

impl Display for CategoryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A validated, non-empty category name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct CategoryName(String);

impl CategoryName {
    /// Create a category name.
    ///
    /// # Errors
    /// This function will return an [Error::EmptyCategoryName] if `name` is
    /// an empty string after trimming whitespace.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            Err(Error::EmptyCategoryName)
        } else {
            Ok(Self(name.to_string()))
        }
    }

    /// Create a category name without validation.
    ///
    /// The caller should ensure that the string is not empty.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl AsRef<str> for CategoryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for CategoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Database identifier for a category.
pub type CategoryId = i64;

/// A named, colored bucket that types the user's transactions.
#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    /// The category's ID in the application database.
    pub id: CategoryId,
    /// The name transactions refer to.
    pub name: CategoryName,
    /// Whether the category counts as income or expense.
    pub kind: CategoryKind,
    /// The display color as a hex string, e.g. "#ef4444".
    pub color: String,
    /// The user that owns this category.
    pub user_id: UserID,
}

/// The categories every new user starts with.
pub const DEFAULT_CATEGORIES: [(&str, CategoryKind, &str); 9] = [
    ("Salary", CategoryKind::Income, "#22c55e"),
    ("Freelance", CategoryKind::Income, "#10b981"),
    ("Investments", CategoryKind::Income, "#14b8a6"),
    ("Food", CategoryKind::Expense, "#ef4444"),
    ("Transport", CategoryKind::Expense, "#f97316"),
    ("Shopping", CategoryKind::Expense, "#eab308"),
    ("Bills", CategoryKind::Expense, "#3b82f6"),
    ("Entertainment", CategoryKind::Expense, "#a855f7"),
    ("Healthcare", CategoryKind::Expense, "#ec4899"),
];

/// Form data for creating a category.
#[derive(Debug, Serialize, Deserialize)]
pub struct CategoryFormData {
    /// The category name.
    pub name: String,
    /// "income" or "expense".
    pub kind: CategoryKind,
    /// The display color as a hex string.
    pub color: String,
}
