//! The page for renaming a category.

use axum::{
    Extension, Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::PrivateCookieJar;
use maud::{Markup, html};

use crate::{
    CategoryId, Error, UserID,
    alert::Alert,
    category::{CategoryForm, CategoryName, CategoryState, get_category, update_category},
    endpoints::{self, format_endpoint},
    flash::set_flash,
    html::{BUTTON_PRIMARY_STYLE, LINK_STYLE, page},
    validation::REQUIRED_FIELD_MSG,
};

use super::manage::category_name_input;

fn edit_category_view(
    category_id: CategoryId,
    form: &CategoryForm,
    error_message: Option<&str>,
) -> Markup {
    let edit_url = format_endpoint(endpoints::EDIT_CATEGORY_VIEW, category_id);

    let content = html! {
        form method="post" action=(edit_url) class="form"
        {
            (category_name_input(&form.name, error_message))

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Save Changes" }

            a href=(endpoints::CATEGORIES_VIEW) class=(LINK_STYLE) { "Cancel" }
        }
    };

    page("Edit Category", endpoints::CATEGORIES_VIEW, None, &content)
}

/// Renders the form for renaming a category.
pub async fn get_edit_category_page(
    State(state): State<CategoryState>,
    Extension(user_id): Extension<UserID>,
    Path(category_id): Path<CategoryId>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let category = get_category(category_id, user_id, &connection)?;
    let form = CategoryForm {
        name: category.name.to_string(),
    };

    Ok(edit_category_view(category_id, &form, None).into_response())
}

/// Handles the rename form and returns the user to the categories page.
pub async fn update_category_endpoint(
    State(state): State<CategoryState>,
    Extension(user_id): Extension<UserID>,
    Path(category_id): Path<CategoryId>,
    jar: PrivateCookieJar,
    Form(form): Form<CategoryForm>,
) -> Result<Response, Error> {
    let name = match CategoryName::new(&form.name) {
        Ok(name) => name,
        Err(Error::EmptyCategoryName) => {
            return Ok(
                edit_category_view(category_id, &form, Some(REQUIRED_FIELD_MSG)).into_response(),
            );
        }
        Err(error) => return Err(error),
    };

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    update_category(category_id, user_id, name.clone(), &connection)?;

    let jar = set_flash(
        jar,
        Alert::success(format!("Category renamed to \"{name}\".")),
    );

    Ok((jar, Redirect::to(endpoints::CATEGORIES_VIEW)).into_response())
}
