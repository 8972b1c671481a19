//! The endpoint for deleting a transaction.

use axum::{
    Extension,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::PrivateCookieJar;

use crate::{
    Error, TransactionId, UserID,
    alert::Alert,
    endpoints,
    flash::set_flash,
    transaction::{TransactionState, delete_transaction},
};

pub const TRANSACTION_DELETED_MSG: &str = "Transaction deleted.";

/// Deletes one of the user's transactions and redirects to the home page.
pub async fn delete_transaction_endpoint(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
    Path(transaction_id): Path<TransactionId>,
    jar: PrivateCookieJar,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    delete_transaction(transaction_id, user_id, &connection)?;

    let jar = set_flash(jar, Alert::success(TRANSACTION_DELETED_MSG));

    Ok((jar, Redirect::to(endpoints::ROOT)).into_response())
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension,
        extract::{Path, State},
        http::StatusCode,
        response::IntoResponse,
    };
    use axum_extra::extract::PrivateCookieJar;
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Transaction, UserID,
        app_state::create_cookie_key,
        create_transaction,
        db::initialize,
        endpoints,
        test_utils::{assert_redirect, insert_test_user},
        transaction::{TransactionState, count_transactions},
    };

    use super::delete_transaction_endpoint;

    fn get_test_state() -> (TransactionState, UserID) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let user = insert_test_user(&connection);

        let state = TransactionState {
            cookie_key: create_cookie_key("foobar"),
            db_connection: Arc::new(Mutex::new(connection)),
            local_timezone: "Etc/UTC".to_owned(),
        };

        (state, user.id)
    }

    #[tokio::test]
    async fn delete_removes_exactly_one_transaction() {
        let (state, user_id) = get_test_state();
        let to_delete = {
            let connection = state.db_connection.lock().unwrap();
            create_transaction(
                Transaction::build(1.0, date!(2024 - 09 - 19), "Keep"),
                user_id,
                &connection,
            )
            .unwrap();
            create_transaction(
                Transaction::build(2.0, date!(2024 - 09 - 19), "Delete"),
                user_id,
                &connection,
            )
            .unwrap()
        };
        let jar = PrivateCookieJar::new(state.cookie_key.clone());

        let response = delete_transaction_endpoint(
            State(state.clone()),
            Extension(user_id),
            Path(to_delete.id),
            jar,
        )
        .await
        .unwrap();

        assert_redirect(&response, endpoints::ROOT);
        assert_eq!(
            count_transactions(user_id, &state.db_connection.lock().unwrap()),
            Ok(1)
        );
    }

    #[tokio::test]
    async fn delete_missing_transaction_is_not_found() {
        let (state, user_id) = get_test_state();
        let jar = PrivateCookieJar::new(state.cookie_key.clone());

        let result =
            delete_transaction_endpoint(State(state), Extension(user_id), Path(42), jar).await;

        assert_eq!(result.into_response().status(), StatusCode::NOT_FOUND);
    }
}
