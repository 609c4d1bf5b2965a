//! The edit page and delete handler for transactions.

use axum::{
    Extension, Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use maud::{Markup, html};
use time::{format_description::BorrowedFormatItem, macros::format_description};

use crate::{
    AppState, Error,
    category::{Category, get_categories},
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        LINK_STYLE, base, form_error,
    },
    navigation::NavBar,
    transaction::{
        db::{delete_transaction, get_transaction, update_transaction},
        domain::{RecurrenceKind, Transaction, TransactionFormData, TransactionId},
        form::validate_transaction_form,
    },
    user::UserID,
};

const FORM_DATE_FORMAT: &[BorrowedFormatItem] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]");

fn render_edit_page(
    transaction: &Transaction,
    categories: &[Category],
    error_message: &str,
) -> Result<Markup, Error> {
    let date_value = transaction
        .timestamp
        .format(FORM_DATE_FORMAT)
        .map_err(|error| Error::DateError(error.to_string()))?;

    // A transaction may refer to a category that was since deleted. Offer the
    // dangling name as an extra option so the form round-trips unchanged.
    let has_matching_category = categories
        .iter()
        .any(|category| category.name.as_ref() == transaction.category);

    let content = html! {
        (NavBar::new(endpoints::DASHBOARD).into_html())

        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="text-2xl font-bold mb-4" { "Edit transaction" }

            (form_error(error_message))

            form method="post"
                action=(endpoints::format_endpoint(endpoints::EDIT_TRANSACTION, transaction.id))
                class="flex flex-col gap-4 w-full"
            {
                div
                {
                    label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }
                    input type="number" name="amount" id="amount" step="0.01" min="0.01" required
                        value=(transaction.amount) class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="category" class=(FORM_LABEL_STYLE) { "Category" }
                    select name="category" id="category" class=(FORM_TEXT_INPUT_STYLE)
                    {
                        @if !has_matching_category {
                            option value=(transaction.category) selected { (transaction.category) }
                        }

                        @for category in categories {
                            option value=(category.name)
                                selected[category.name.as_ref() == transaction.category]
                            {
                                (category.name)
                            }
                        }
                    }
                }

                div
                {
                    label for="note" class=(FORM_LABEL_STYLE) { "Note" }
                    input type="text" name="note" id="note"
                        value=(transaction.note.as_deref().unwrap_or_default())
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="date" class=(FORM_LABEL_STYLE) { "Date" }
                    input type="datetime-local" name="date" id="date" value=(date_value)
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div class="flex flex-row items-center gap-2"
                {
                    input type="checkbox" name="is_recurring" id="is_recurring"
                        checked[transaction.is_recurring];
                    label for="is_recurring" class=(FORM_LABEL_STYLE) { "Recurring" }

                    select name="recurrence" id="recurrence" class=(FORM_TEXT_INPUT_STYLE)
                    {
                        @for kind in [
                            RecurrenceKind::Weekly,
                            RecurrenceKind::Monthly,
                            RecurrenceKind::Yearly,
                        ] {
                            option value=(kind.as_str())
                                selected[transaction.recurrence == Some(kind)]
                            {
                                (kind.as_str())
                            }
                        }
                    }
                }

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Save changes" }

                a href=(endpoints::DASHBOARD) class=(LINK_STYLE) { "Cancel" }
            }
        }
    };

    Ok(base("Edit transaction", &[], &content))
}

/// Display the form for editing an existing transaction.
pub async fn get_edit_transaction_page(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserID>,
    Path(transaction_id): Path<TransactionId>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLock)?;

    let transaction = get_transaction(transaction_id, user_id, &connection)?;
    let categories = get_categories(user_id, &connection)?;

    Ok(render_edit_page(&transaction, &categories, "")?.into_response())
}

/// Overwrite a transaction with the submitted form values.
///
/// On success the client is redirected to the dashboard. Validation failures
/// re-render the edit form with an error message and the stored values.
pub async fn update_transaction_endpoint(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserID>,
    Path(transaction_id): Path<TransactionId>,
    Form(form): Form<TransactionFormData>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLock)?;

    // Look the transaction up first so that an edit of a missing or foreign
    // transaction 404s instead of reporting a validation error.
    let transaction = get_transaction(transaction_id, user_id, &connection)?;

    let result = validate_transaction_form(&form).and_then(|validated| {
        update_transaction(
            transaction_id,
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
        Ok(()) => Ok(Redirect::to(endpoints::DASHBOARD).into_response()),
        Err(error @ (Error::InvalidAmount | Error::DateError(_))) => {
            let categories = get_categories(user_id, &connection)?;

            Ok(render_edit_page(&transaction, &categories, &error.to_string())?.into_response())
        }
        Err(error) => Err(error),
    }
}

/// Delete a transaction and return to the dashboard.
pub async fn delete_transaction_endpoint(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserID>,
    Path(transaction_id): Path<TransactionId>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLock)?;

    delete_transaction(transaction_id, user_id, &connection)?;

    Ok(Redirect::to(endpoints::DASHBOARD).into_response())
}
