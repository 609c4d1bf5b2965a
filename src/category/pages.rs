//! The category management page and its form handlers.

use axum::{
    Extension, Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use maud::{Markup, html};

use crate::{
    AppState, Error, endpoints,
    category::{
        db::{create_category, delete_category, get_categories},
        domain::{Category, CategoryFormData, CategoryName},
    },
    html::{
        BUTTON_DELETE_STYLE, BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base,
        form_error,
    },
    navigation::NavBar,
    user::UserID,
};

fn render_categories_page(categories: &[Category], error_message: &str) -> Markup {
    let content = html! {
        (NavBar::new(endpoints::CATEGORIES).into_html())

        div class=(PAGE_CONTAINER_STYLE)
        {
            h1 class="text-2xl font-bold mb-4" { "Categories" }

            form method="post" action=(endpoints::CATEGORIES) class="flex flex-row items-end gap-2 mb-6"
            {
                div
                {
                    label for="name" class=(FORM_LABEL_STYLE) { "Name" }
                    input type="text" name="name" id="name" required class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="kind" class=(FORM_LABEL_STYLE) { "Type" }
                    select name="kind" id="kind" class=(FORM_TEXT_INPUT_STYLE)
                    {
                        option value="expense" { "Expense" }
                        option value="income" { "Income" }
                    }
                }

                div
                {
                    label for="color" class=(FORM_LABEL_STYLE) { "Color" }
                    input type="color" name="color" id="color" value="#3b82f6"
                        class="block w-16 h-10 p-1 rounded border border-gray-300 dark:border-gray-600";
                }

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Add category" }
            }

            (form_error(error_message))

            table class="w-full max-w-screen-md text-sm text-left text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Name" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Type" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Color" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                    }
                }

                tbody
                {
                    @for category in categories
                    {
                        tr class=(TABLE_ROW_STYLE)
                        {
                            td class=(TABLE_CELL_STYLE) { (category.name) }
                            td class=(TABLE_CELL_STYLE) { (category.kind) }
                            td class=(TABLE_CELL_STYLE)
                            {
                                span class="inline-block w-4 h-4 rounded-full align-middle"
                                    style=(format!("background-color: {}", category.color)) {}
                                span class="ml-2 align-middle" { (category.color) }
                            }
                            td class=(TABLE_CELL_STYLE)
                            {
                                form method="post"
                                    action=(endpoints::format_endpoint(endpoints::DELETE_CATEGORY, category.id))
                                {
                                    button type="submit" class=(BUTTON_DELETE_STYLE) { "Delete" }
                                }
                            }
                        }
                    }

                    @if categories.is_empty()
                    {
                        tr class=(TABLE_ROW_STYLE)
                        {
                            td class=(TABLE_CELL_STYLE) colspan="4" { "No categories yet." }
                        }
                    }
                }
            }
        }
    };

    base("Categories", &[], &content)
}

/// Display the category list alongside the new-category form.
pub async fn get_categories_page(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLock)?;

    let categories = get_categories(user_id, &connection)?;

    Ok(render_categories_page(&categories, "").into_response())
}

/// Create a category from the submitted form.
///
/// On success the client is redirected back to the category page. Validation
/// failures re-render the page with an error message.
pub async fn create_category_endpoint(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<CategoryFormData>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLock)?;

    let result = CategoryName::new(&form.name).and_then(|name| {
        create_category(name, form.kind, &form.color, user_id, &connection)
    });

    match result {
        Ok(_) => Ok(Redirect::to(endpoints::CATEGORIES).into_response()),
        Err(error @ (Error::EmptyCategoryName | Error::DuplicateCategory)) => {
            let categories = get_categories(user_id, &connection)?;

            Ok(render_categories_page(&categories, &error.to_string()).into_response())
        }
        Err(error) => Err(error),
    }
}

/// Delete a category, unless transactions still reference it.
pub async fn delete_category_endpoint(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserID>,
    Path(category_id): Path<i64>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLock)?;

    match delete_category(category_id, user_id, &connection) {
        Ok(()) => Ok(Redirect::to(endpoints::CATEGORIES).into_response()),
        Err(error @ Error::CategoryInUse(_)) => {
            let categories = get_categories(user_id, &connection)?;

            Ok(render_categories_page(&categories, &error.to_string()).into_response())
        }
        Err(error) => Err(error),
    }
}
