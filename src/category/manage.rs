//! The categories page: a form for adding a category above a table of the
//! user's categories.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use axum::{
    Extension, Form,
    extract::{FromRef, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, CategoryId, Error, UserID,
    alert::Alert,
    category::{
        Category, CategoryForm, CategoryName, count_transactions_per_category, create_category,
        get_categories,
    },
    endpoints::{self, format_endpoint},
    flash::{set_flash, take_flash},
    html::{
        BUTTON_DELETE_STYLE, BUTTON_PRIMARY_STYLE, CATEGORY_BADGE_STYLE, FORM_LABEL_STYLE,
        FORM_TEXT_INPUT_STYLE, LINK_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        TABLE_STYLE, field_error, page,
    },
    validation::REQUIRED_FIELD_MSG,
};

/// The state needed by the category pages.
#[derive(Debug, Clone)]
pub struct CategoryState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

impl FromRef<CategoryState> for Key {
    fn from_ref(state: &CategoryState) -> Self {
        state.cookie_key.clone()
    }
}

/// A category with the number of transactions filed under it.
struct CategoryRow {
    category: Category,
    transaction_count: u32,
}

/// The name input shared by the add and edit forms.
pub(super) fn category_name_input(value: &str, error_message: Option<&str>) -> Markup {
    html! {
        div
        {
            label for="name" class=(FORM_LABEL_STYLE) { "Category Name" }

            input
                type="text"
                name="name"
                id="name"
                placeholder="e.g. Groceries"
                class=(FORM_TEXT_INPUT_STYLE)
                required
                autofocus
                value=(value);

            (field_error(error_message))
        }
    }
}

fn category_table(rows: &[CategoryRow]) -> Markup {
    html! {
        @if rows.is_empty() {
            p class="empty-state" { "No categories yet. Add one above to start grouping your transactions." }
        } @else {
            table class=(TABLE_STYLE)
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Name" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Transactions" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                    }
                }

                tbody
                {
                    @for row in rows {
                        tr class=(TABLE_ROW_STYLE)
                        {
                            td class=(TABLE_CELL_STYLE)
                            {
                                span class=(CATEGORY_BADGE_STYLE) { (row.category.name) }
                            }
                            td class=(TABLE_CELL_STYLE) { (row.transaction_count) }
                            td class=(TABLE_CELL_STYLE)
                            {
                                a
                                    href=(format_endpoint(endpoints::EDIT_CATEGORY_VIEW, row.category.id))
                                    class=(LINK_STYLE)
                                { "Edit" }
                                " "
                                a
                                    href=(format_endpoint(endpoints::DELETE_CATEGORY, row.category.id))
                                    class=(BUTTON_DELETE_STYLE)
                                { "Delete" }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn manage_categories_view(
    form: &CategoryForm,
    error_message: Option<&str>,
    rows: &[CategoryRow],
    flash: Option<&Alert>,
) -> Markup {
    let content = html! {
        form method="post" action=(endpoints::CATEGORIES_VIEW) class="form"
        {
            (category_name_input(&form.name, error_message))

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Add Category" }
        }

        h2 { "Your Categories" }

        (category_table(rows))
    };

    page("Manage Categories", endpoints::CATEGORIES_VIEW, flash, &content)
}

fn get_category_rows(user_id: UserID, connection: &Connection) -> Result<Vec<CategoryRow>, Error> {
    let mut counts: HashMap<CategoryId, u32> =
        count_transactions_per_category(user_id, connection)?;

    let rows = get_categories(user_id, connection)?
        .into_iter()
        .map(|category| CategoryRow {
            transaction_count: counts.remove(&category.id).unwrap_or(0),
            category,
        })
        .collect();

    Ok(rows)
}

/// Renders the page for adding and listing categories.
pub async fn get_categories_page(
    State(state): State<CategoryState>,
    Extension(user_id): Extension<UserID>,
    jar: PrivateCookieJar,
) -> Result<Response, Error> {
    let rows = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        get_category_rows(user_id, &connection)?
    };

    let (jar, flash) = take_flash(jar);
    let view = manage_categories_view(&CategoryForm::default(), None, &rows, flash.as_ref());

    Ok((jar, view).into_response())
}

/// Handles the add category form.
///
/// A blank name re-renders the page with an error under the name field.
pub async fn create_category_endpoint(
    State(state): State<CategoryState>,
    Extension(user_id): Extension<UserID>,
    jar: PrivateCookieJar,
    Form(form): Form<CategoryForm>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let name = match CategoryName::new(&form.name) {
        Ok(name) => name,
        Err(Error::EmptyCategoryName) => {
            let rows = get_category_rows(user_id, &connection)?;
            let view = manage_categories_view(&form, Some(REQUIRED_FIELD_MSG), &rows, None);
            return Ok(view.into_response());
        }
        Err(error) => return Err(error),
    };

    let category = create_category(name, user_id, &connection)
        .inspect_err(|error| tracing::error!("could not create category: {error}"))?;

    let jar = set_flash(
        jar,
        Alert::success(format!("Category \"{}\" added.", category.name)),
    );

    Ok((jar, Redirect::to(endpoints::CATEGORIES_VIEW)).into_response())
}
