use axum::{
    Extension,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::PrivateCookieJar;

use crate::{
    CategoryId, Error, UserID,
    alert::Alert,
    category::{CategoryState, delete_category, get_category},
    endpoints,
    flash::set_flash,
};

/// Deletes a category and returns the user to the categories page.
///
/// Transactions in the category are kept; they just lose the category.
pub async fn delete_category_endpoint(
    State(state): State<CategoryState>,
    Extension(user_id): Extension<UserID>,
    Path(category_id): Path<CategoryId>,
    jar: PrivateCookieJar,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let category = get_category(category_id, user_id, &connection)?;
    delete_category(category_id, user_id, &connection)?;

    let jar = set_flash(
        jar,
        Alert::success(format!("Category \"{}\" deleted.", category.name)),
    );

    Ok((jar, Redirect::to(endpoints::CATEGORIES_VIEW)).into_response())
}
