//! One-shot messages that survive a redirect, e.g. "Transaction added."
//!
//! The message is stored in an encrypted cookie by the handler that redirects
//! and removed by the page that displays it.

use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, SameSite},
};

use crate::alert::Alert;

pub(crate) const COOKIE_FLASH: &str = "flash";

/// Store `alert` so that it is shown on the next page the user visits.
///
/// If the alert cannot be serialized the error is logged and the jar is returned unchanged.
pub fn set_flash(jar: PrivateCookieJar, alert: Alert) -> PrivateCookieJar {
    let value = match serde_json::to_string(&alert) {
        Ok(value) => value,
        Err(error) => {
            tracing::error!("could not serialize flash message {alert:?}: {error}");
            return jar;
        }
    };

    jar.add(
        Cookie::build((COOKIE_FLASH, value))
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(true)
            .path("/"),
    )
}

/// Remove the flash message from `jar`, returning it if there was a valid one.
pub fn take_flash(jar: PrivateCookieJar) -> (PrivateCookieJar, Option<Alert>) {
    let Some(cookie) = jar.get(COOKIE_FLASH) else {
        return (jar, None);
    };

    let alert = match serde_json::from_str(cookie.value_trimmed()) {
        Ok(alert) => Some(alert),
        Err(error) => {
            tracing::warn!("discarding unreadable flash message: {error}");
            None
        }
    };

    (jar.remove(Cookie::build(COOKIE_FLASH).path("/")), alert)
}
