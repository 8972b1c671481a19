//! Log-out route handler that invalidates the auth cookie and redirects users.

use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::PrivateCookieJar;

use crate::{alert::Alert, auth::invalidate_auth_cookie, endpoints, flash::set_flash};

pub const LOG_OUT_MSG: &str = "You have been logged out.";

/// Invalidate the auth cookie and redirect the client to the log-in page.
pub async fn get_log_out(jar: PrivateCookieJar) -> Response {
    let jar = invalidate_auth_cookie(jar);
    let jar = set_flash(jar, Alert::success(LOG_OUT_MSG));

    (jar, Redirect::to(endpoints::LOG_IN_VIEW)).into_response()
}
