//! The page and endpoint for changing an existing transaction.

use axum::{
    Extension,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{Form, PrivateCookieJar};

use crate::{
    Category, Error, TransactionId, UserID,
    alert::Alert,
    category::get_categories,
    endpoints::{self, format_endpoint},
    flash::set_flash,
    transaction::{
        TransactionState, get_transaction, update_transaction,
        form::{TransactionForm, TransactionFormErrors, transaction_form_view},
    },
};

pub const TRANSACTION_UPDATED_MSG: &str = "Transaction updated.";

fn edit_transaction_view(
    transaction_id: TransactionId,
    form: &TransactionForm,
    errors: &TransactionFormErrors,
    categories: &[Category],
) -> Response {
    transaction_form_view(
        "Edit Transaction",
        endpoints::ROOT,
        &format_endpoint(endpoints::EDIT_TRANSACTION_VIEW, transaction_id),
        "Save Changes",
        form,
        errors,
        categories,
    )
    .into_response()
}

/// Renders the transaction form filled in with the transaction's current values.
pub async fn get_edit_transaction_page(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
    Path(transaction_id): Path<TransactionId>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let transaction = get_transaction(transaction_id, user_id, &connection)?;
    let categories = get_categories(user_id, &connection)?;

    Ok(edit_transaction_view(
        transaction_id,
        &TransactionForm::from_transaction(&transaction),
        &TransactionFormErrors::default(),
        &categories,
    ))
}

/// Replaces the transaction's fields and categories, redirects to the home page on success.
pub async fn update_transaction_endpoint(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
    Path(transaction_id): Path<TransactionId>,
    jar: PrivateCookieJar,
    Form(form): Form<TransactionForm>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    // Check the transaction exists before reporting any form errors.
    get_transaction(transaction_id, user_id, &connection)?;

    let result = form
        .validate()
        .map(|builder| update_transaction(transaction_id, builder, user_id, &connection));

    let errors = match result {
        Ok(Ok(_)) => {
            let jar = set_flash(jar, Alert::success(TRANSACTION_UPDATED_MSG));

            return Ok((jar, Redirect::to(endpoints::ROOT)).into_response());
        }
        Ok(Err(error)) => TransactionFormErrors::from_error(error)?,
        Err(errors) => errors,
    };

    let categories = get_categories(user_id, &connection)?;

    Ok(edit_transaction_view(transaction_id, &form, &errors, &categories))
}
