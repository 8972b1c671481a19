//! The routes for displaying the log-in page and handling log-in requests.
//! The cookie module handles the lower level authentication and cookie logic.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Duration;

use crate::{
    AppState, Error,
    alert::Alert,
    auth::{get_user_by_username, normalize_redirect_url, set_auth_cookie},
    endpoints,
    flash::take_flash,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base, field_error, link,
        log_in_register, password_input,
    },
    timezone::get_local_offset,
    validation::required,
};

/// How long the auth cookie should last if the user selects "remember me" at log-in.
pub const REMEMBER_ME_COOKIE_DURATION: Duration = Duration::days(7);

pub const INVALID_CREDENTIALS_ERROR_MSG: &str = "Invalid username or password.";

const INTERNAL_ERROR_MSG: &str = "An internal error occurred. Please try again later.";

#[derive(Default)]
struct LogInFormErrors {
    username: Option<&'static str>,
    password: Option<&'static str>,
}

fn log_in_form(username: &str, errors: &LogInFormErrors, redirect_url: Option<&str>) -> Markup {
    html! {
        form method="post" action=(endpoints::LOG_IN_VIEW) class="form"
        {
            @if let Some(redirect_url) = redirect_url {
                input type="hidden" name="redirect_url" value=(redirect_url);
            }

            div
            {
                label for="username" class=(FORM_LABEL_STYLE) { "Username" }

                input
                    type="text"
                    name="username"
                    id="username"
                    class=(FORM_TEXT_INPUT_STYLE)
                    required
                    autofocus
                    value=(username);

                (field_error(errors.username))
            }

            (password_input("password", "Password", 0, errors.password))

            div class="form-checkbox"
            {
                input type="checkbox" name="remember_me" id="remember_me";
                label for="remember_me" { "Keep me logged in for one week" }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Log in" }

            p
            {
                "Don't have an account? "
                (link(endpoints::REGISTER_VIEW, "Register here"))
            }
        }
    }
}

fn log_in_view(
    username: &str,
    errors: &LogInFormErrors,
    alert: Option<&Alert>,
    redirect_url: Option<&str>,
) -> Markup {
    let form = log_in_form(username, errors, redirect_url);
    let content = log_in_register("Log in to your account", alert, &form);

    base("Log In", &content)
}

fn parse_redirect_url(raw_url: Option<&str>, source: &str) -> Option<String> {
    let raw_url = raw_url.filter(|url| !url.is_empty())?;

    let redirect_url = normalize_redirect_url(raw_url);
    if redirect_url.is_none() {
        tracing::warn!("Invalid redirect URL from {source}: {raw_url}");
    }

    redirect_url
}

#[derive(Deserialize)]
pub struct RedirectQuery {
    pub redirect_url: Option<String>,
}

/// Display the log-in page along with any pending flash message, e.g. after registering.
pub async fn get_log_in_page(
    jar: PrivateCookieJar,
    Query(query): Query<RedirectQuery>,
) -> Response {
    let redirect_url = parse_redirect_url(query.redirect_url.as_deref(), "log-in query");
    let (jar, flash) = take_flash(jar);

    (
        jar,
        log_in_view(
            "",
            &LogInFormErrors::default(),
            flash.as_ref(),
            redirect_url.as_deref(),
        ),
    )
        .into_response()
}

/// The state needed to perform a login.
#[derive(Debug, Clone)]
pub struct LoginState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for LoginState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<LoginState> for Key {
    fn from_ref(state: &LoginState) -> Self {
        state.cookie_key.clone()
    }
}

/// The raw data entered by the user in the log-in form.
///
/// The password is stored as a plain string. There is no need for validation here since
/// it will be compared against the password hash in the database.
#[derive(Clone, Serialize, Deserialize)]
pub struct LogInData {
    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub password: String,

    /// Whether to extend the initial auth cookie duration.
    ///
    /// This value comes from a checkbox, so it either has a string value or is not set
    /// (see the [MDN docs](https://developer.mozilla.org/en-US/docs/Web/HTML/Element/input/checkbox#value_2)).
    /// The `Some` variant should be interpreted as `true` irregardless of the
    /// string value, and the `None` variant should be interpreted as `false`.
    pub remember_me: Option<String>,

    /// Optional URL to redirect to after logging in.
    pub redirect_url: Option<String>,
}

/// Handler for log-in requests via the POST method.
///
/// On a successful log-in request, the auth cookie is set and the client is
/// redirected to the requested page, or the home page if none was requested.
/// Otherwise, the form is returned with an error message explaining the problem.
pub async fn post_log_in(
    State(state): State<LoginState>,
    jar: PrivateCookieJar,
    Form(user_data): Form<LogInData>,
) -> Response {
    let redirect_url = parse_redirect_url(user_data.redirect_url.as_deref(), "log-in form");
    let redirect_url = redirect_url.as_deref();
    let render_error = |errors: LogInFormErrors, alert: Option<Alert>| {
        log_in_view(&user_data.username, &errors, alert.as_ref(), redirect_url).into_response()
    };

    let (username, password) = match (
        required(&user_data.username),
        required(&user_data.password),
    ) {
        (Ok(username), Ok(_)) => (username, user_data.password.as_str()),
        (username, password) => {
            let errors = LogInFormErrors {
                username: username.err(),
                password: password.err(),
            };
            return render_error(errors, None);
        }
    };

    let user = {
        let connection = match state.db_connection.lock() {
            Ok(connection) => connection,
            Err(error) => {
                tracing::error!("could not acquire database lock: {error}");
                return render_error(
                    LogInFormErrors::default(),
                    Some(Alert::error(INTERNAL_ERROR_MSG)),
                );
            }
        };

        get_user_by_username(username, &connection)
    };

    let user = match user {
        Ok(user) => user,
        Err(Error::NotFound) => {
            return render_error(
                LogInFormErrors::default(),
                Some(Alert::error(INVALID_CREDENTIALS_ERROR_MSG)),
            );
        }
        Err(error) => {
            tracing::error!("Unhandled error while verifying credentials: {error}");
            return render_error(LogInFormErrors::default(), Some(Alert::error(INTERNAL_ERROR_MSG)));
        }
    };

    match user.password_hash.verify(password) {
        Ok(true) => {}
        Ok(false) => {
            return render_error(
                LogInFormErrors::default(),
                Some(Alert::error(INVALID_CREDENTIALS_ERROR_MSG)),
            );
        }
        Err(error) => {
            tracing::error!("Unhandled error while verifying credentials: {error}");
            return render_error(LogInFormErrors::default(), Some(Alert::error(INTERNAL_ERROR_MSG)));
        }
    }

    let cookie_duration = if user_data.remember_me.is_some() {
        REMEMBER_ME_COOKIE_DURATION
    } else {
        state.cookie_duration
    };

    let local_offset = match get_local_offset(&state.local_timezone) {
        Some(offset) => offset,
        None => return Error::InvalidTimezoneError(state.local_timezone).into_response(),
    };

    match set_auth_cookie(jar, user.id, cookie_duration, local_offset) {
        Ok(jar) => {
            tracing::info!("User {} logged in", user.id);
            (jar, Redirect::to(redirect_url.unwrap_or(endpoints::ROOT))).into_response()
        }
        Err(error) => {
            tracing::error!("Error setting auth cookie: {error}");
            error.into_response()
        }
    }
}


#[cfg(test)]
mod log_in_tests {
    use std::{
        collections::HashSet,
        sync::{Arc, Mutex},
    };

    use axum::{
        Form, Router,
        body::Body,
        extract::State,
        http::{Response, StatusCode, header::SET_COOKIE},
        routing::post,
    };
    use axum_extra::extract::{PrivateCookieJar, cookie::Cookie};
    use axum_test::TestServer;
    use rusqlite::Connection;
    use time::{Duration, OffsetDateTime};

    use crate::{
        app_state::create_cookie_key,
        auth::{COOKIE_TOKEN, DEFAULT_COOKIE_DURATION},
        db::initialize,
        endpoints,
        test_utils::{
            TEST_PASSWORD, TEST_USERNAME, assert_form_error_message, assert_redirect,
            insert_test_user, parse_html_document,
        },
        validation::REQUIRED_FIELD_MSG,
    };

    use super::{
        INVALID_CREDENTIALS_ERROR_MSG, LogInData, LoginState, REMEMBER_ME_COOKIE_DURATION,
        post_log_in,
    };

    fn get_test_state(with_user: bool) -> LoginState {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        initialize(&connection).expect("Could not initialize database");

        if with_user {
            insert_test_user(&connection);
        }

        LoginState {
            cookie_key: create_cookie_key("foobar"),
            cookie_duration: DEFAULT_COOKIE_DURATION,
            local_timezone: "Etc/UTC".to_owned(),
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    fn log_in_data(username: &str, password: &str) -> LogInData {
        LogInData {
            username: username.to_owned(),
            password: password.to_owned(),
            remember_me: None,
            redirect_url: None,
        }
    }

    async fn new_log_in_request(state: LoginState, log_in_form: LogInData) -> Response<Body> {
        let jar = PrivateCookieJar::new(state.cookie_key.clone());

        post_log_in(State(state), jar, Form(log_in_form)).await
    }

    /// Asserts that two date times are within two seconds of each other.
    /// A macro so that failures report the caller's line.
    macro_rules! assert_date_time_close {
        ($left:expr, $right:expr$(,)?) => {
            assert!(
                ($left - $right).abs() < Duration::seconds(2),
                "got date time {:?}, want {:?}",
                $left,
                $right
            );
        };
    }

    #[track_caller]
    fn assert_set_cookie(response: &Response<Body>) {
        let mut found_cookies = HashSet::new();

        for cookie_headers in response.headers().get_all(SET_COOKIE) {
            let cookie_string = cookie_headers.to_str().unwrap();
            let cookie = Cookie::parse(cookie_string).unwrap();

            match cookie.name() {
                COOKIE_TOKEN => {
                    assert!(cookie.expires_datetime() > Some(OffsetDateTime::now_utc()));
                    found_cookies.insert(cookie.name().to_string());
                }
                _ => panic!("Unexpected cookie found: {}", cookie.name()),
            }
        }

        assert!(
            found_cookies.contains(COOKIE_TOKEN),
            "could not find cookie '{}' in {:?}",
            COOKIE_TOKEN,
            found_cookies
        );
    }

    #[tokio::test]
    async fn log_in_succeeds_with_valid_credentials() {
        let state = get_test_state(true);

        let response = new_log_in_request(state, log_in_data(TEST_USERNAME, TEST_PASSWORD)).await;

        assert_redirect(&response, endpoints::ROOT);
        assert_set_cookie(&response);
    }

    #[tokio::test]
    async fn log_in_redirects_to_requested_url() {
        let state = get_test_state(true);
        let redirect_url = "/reports";

        let response = new_log_in_request(
            state,
            LogInData {
                redirect_url: Some(redirect_url.to_owned()),
                ..log_in_data(TEST_USERNAME, TEST_PASSWORD)
            },
        )
        .await;

        assert_redirect(&response, redirect_url);
    }

    #[tokio::test]
    async fn log_in_falls_back_on_invalid_redirect_url() {
        let state = get_test_state(true);

        let response = new_log_in_request(
            state,
            LogInData {
                redirect_url: Some("https://example.com".to_owned()),
                ..log_in_data(TEST_USERNAME, TEST_PASSWORD)
            },
        )
        .await;

        assert_redirect(&response, endpoints::ROOT);
    }

    #[tokio::test]
    async fn log_in_fails_with_incorrect_password() {
        let state = get_test_state(true);

        let response = new_log_in_request(state, log_in_data(TEST_USERNAME, "wrongpassword")).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get(SET_COOKIE).is_none());
        assert_body_contains_alert(response, INVALID_CREDENTIALS_ERROR_MSG).await;
    }

    #[tokio::test]
    async fn log_in_fails_with_unknown_username() {
        let state = get_test_state(true);

        let response = new_log_in_request(state, log_in_data("nobody", TEST_PASSWORD)).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_body_contains_alert(response, INVALID_CREDENTIALS_ERROR_MSG).await;
    }

    #[tokio::test]
    async fn log_in_with_empty_fields_shows_required_errors() {
        let state = get_test_state(true);

        let response = new_log_in_request(state, log_in_data(" ", "")).await;

        assert_eq!(response.status(), StatusCode::OK);
        let document = parse_html_document(response).await;
        let errors = crate::test_utils::form_error_messages(&document);
        assert_eq!(errors, vec![REQUIRED_FIELD_MSG, REQUIRED_FIELD_MSG]);
        assert_form_error_message(&document, REQUIRED_FIELD_MSG);
    }

    #[tokio::test]
    async fn form_deserialises_without_fields() {
        let state = get_test_state(false);
        let app = Router::new()
            .route(endpoints::LOG_IN_VIEW, post(post_log_in))
            .with_state(state);
        let server = TestServer::try_new(app).expect("Could not create test server.");

        let response = server
            .post(endpoints::LOG_IN_VIEW)
            .form(&[("remember_me", "on")])
            .await;

        response.assert_status_ok();
        response.assert_text_contains(REQUIRED_FIELD_MSG);
    }

    #[tokio::test]
    async fn remember_me_extends_auth_cookie_through_form() {
        let state = get_test_state(true);
        let app = Router::new()
            .route(endpoints::LOG_IN_VIEW, post(post_log_in))
            .with_state(state);
        let server = TestServer::try_new(app).expect("Could not create test server.");
        let form = [
            ("username", TEST_USERNAME),
            ("password", TEST_PASSWORD),
            ("remember_me", "on"),
        ];

        let response = server.post(endpoints::LOG_IN_VIEW).form(&form).await;

        assert_eq!(response.status_code(), StatusCode::SEE_OTHER);

        let token_cookie = response.cookie(COOKIE_TOKEN);
        assert_date_time_close!(
            token_cookie.expires_datetime().unwrap(),
            OffsetDateTime::now_utc() + REMEMBER_ME_COOKIE_DURATION
        );
    }

    #[tokio::test]
    async fn default_log_in_uses_session_duration() {
        let state = get_test_state(true);
        let app = Router::new()
            .route(endpoints::LOG_IN_VIEW, post(post_log_in))
            .with_state(state);
        let server = TestServer::try_new(app).expect("Could not create test server.");

        let response = server
            .post(endpoints::LOG_IN_VIEW)
            .form(&[("username", TEST_USERNAME), ("password", TEST_PASSWORD)])
            .await;

        let token_cookie = response.cookie(COOKIE_TOKEN);
        assert_date_time_close!(
            token_cookie.expires_datetime().unwrap(),
            OffsetDateTime::now_utc() + DEFAULT_COOKIE_DURATION
        );
    }

    async fn assert_body_contains_alert(response: Response<Body>, message: &str) {
        let document = parse_html_document(response).await;
        let error_selector = scraper::Selector::parse("div.alert-error").unwrap();
        let error = document
            .select(&error_selector)
            .next()
            .expect("expected error message");
        let error_text = error.text().collect::<String>();
        assert_eq!(
            error_text.trim(),
            message,
            "response body should include error message \"{message}\", got \"{error_text}\""
        );
    }
}
