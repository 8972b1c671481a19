//! The home page: a greeting, the user's totals and their transactions.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use maud::html;
use rusqlite::Connection;

use crate::{
    AppState, CategoryId, Error, UserID,
    auth::get_user_by_id,
    category::get_categories,
    endpoints,
    flash::take_flash,
    html::{BUTTON_PRIMARY_STYLE, page},
    report::{build_report, totals_cards},
    transaction::{TransactionTableRow, get_transactions, transactions_table},
};

/// The state needed for the home page.
#[derive(Debug, Clone)]
pub struct HomeState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for HomeState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

impl FromRef<HomeState> for Key {
    fn from_ref(state: &HomeState) -> Self {
        state.cookie_key.clone()
    }
}

/// Display the home page for the logged-in user.
pub async fn get_home_page(
    State(state): State<HomeState>,
    Extension(user_id): Extension<UserID>,
    jar: PrivateCookieJar,
) -> Result<Response, Error> {
    let (user, transactions, categories) = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        (
            get_user_by_id(user_id, &connection)?,
            get_transactions(user_id, &connection)?,
            get_categories(user_id, &connection)?,
        )
    };

    let totals = build_report(&transactions, &categories).totals;
    let categories_by_id: HashMap<CategoryId, _> = categories
        .iter()
        .map(|category| (category.id, category))
        .collect();
    let rows: Vec<TransactionTableRow> = transactions
        .iter()
        .map(|transaction| TransactionTableRow::new(transaction, &categories_by_id))
        .collect();

    let content = html! {
        (totals_cards(&totals))

        section
        {
            div class="section-header"
            {
                h2 { "Transactions" }
                a href=(endpoints::NEW_TRANSACTION_VIEW) class=(BUTTON_PRIMARY_STYLE) { "Add Transaction" }
            }

            (transactions_table(&rows))
        }
    };

    let (jar, flash) = take_flash(jar);
    let title = format!("Welcome, {}!", user.username);

    Ok((jar, page(&title, endpoints::ROOT, flash.as_ref(), &content)).into_response())
}
