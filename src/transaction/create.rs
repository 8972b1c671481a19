//! The page and endpoint for recording a new transaction.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Redirect, Response},
};
// axum_extra's Form collects repeated fields, e.g. `categories=1&categories=2`, into a Vec.
use axum_extra::extract::{Form, PrivateCookieJar, cookie::Key};
use rusqlite::Connection;

use crate::{
    AppState, Category, Error, UserID,
    alert::Alert,
    category::get_categories,
    endpoints,
    flash::set_flash,
    timezone::local_today,
    transaction::{
        create_transaction,
        form::{TransactionForm, TransactionFormErrors, transaction_form_view},
    },
};

pub const TRANSACTION_ADDED_MSG: &str = "Transaction added.";

/// The state needed by the transaction pages.
#[derive(Debug, Clone)]
pub struct TransactionState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for TransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

impl FromRef<TransactionState> for Key {
    fn from_ref(state: &TransactionState) -> Self {
        state.cookie_key.clone()
    }
}

fn new_transaction_view(
    form: &TransactionForm,
    errors: &TransactionFormErrors,
    categories: &[Category],
) -> Response {
    transaction_form_view(
        "Add Transaction",
        endpoints::NEW_TRANSACTION_VIEW,
        endpoints::NEW_TRANSACTION_VIEW,
        "Add Transaction",
        form,
        errors,
        categories,
    )
    .into_response()
}

/// Renders the form for recording a transaction, dated today in the server's timezone.
pub async fn get_new_transaction_page(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let Some(today) = local_today(&state.local_timezone) else {
        tracing::error!("Invalid timezone {}", state.local_timezone);
        return Err(Error::InvalidTimezoneError(state.local_timezone));
    };

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let categories = get_categories(user_id, &connection)?;

    Ok(new_transaction_view(
        &TransactionForm::new(today),
        &TransactionFormErrors::default(),
        &categories,
    ))
}

/// A route handler for creating a new transaction, redirects to the home page on success.
///
/// Invalid input re-renders the form with the submitted values and a message
/// under each offending field.
pub async fn create_transaction_endpoint(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
    jar: PrivateCookieJar,
    Form(form): Form<TransactionForm>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let result = form
        .validate()
        .map(|builder| create_transaction(builder, user_id, &connection));

    let errors = match result {
        Ok(Ok(transaction)) => {
            tracing::debug!("created transaction {} for user {user_id}", transaction.id);
            let jar = set_flash(jar, Alert::success(TRANSACTION_ADDED_MSG));

            return Ok((jar, Redirect::to(endpoints::ROOT)).into_response());
        }
        Ok(Err(error)) => TransactionFormErrors::from_error(error)?,
        Err(errors) => errors,
    };

    let categories = get_categories(user_id, &connection)?;

    Ok(new_transaction_view(&form, &errors, &categories))
}
