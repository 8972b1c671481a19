//! The registration page for creating a new account.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use email_address::EmailAddress;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error, PasswordHash, ValidatedPassword,
    alert::Alert,
    auth::{Username, create_user, parse_email},
    endpoints,
    flash::set_flash,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base, field_error, link,
        log_in_register, password_input,
    },
    validation::required,
};

pub const REGISTRATION_SUCCESS_MSG: &str = "Account created successfully! You can now log in.";
pub const PASSWORDS_DO_NOT_MATCH_MSG: &str = "Passwords do not match.";
pub const DUPLICATE_USERNAME_MSG: &str = "That username is already taken.";
pub const DUPLICATE_EMAIL_MSG: &str = "That email is already registered.";
pub const INVALID_EMAIL_MSG: &str = "Enter a valid email address.";

/// The raw data entered by the user in the registration form.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
}

#[derive(Default)]
struct RegisterFormErrors {
    username: Option<String>,
    email: Option<String>,
    password: Option<String>,
    confirm_password: Option<String>,
}

impl RegisterFormErrors {
    fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.email.is_none()
            && self.password.is_none()
            && self.confirm_password.is_none()
    }
}

fn text_input(id: &str, label: &str, type_: &str, value: &str, error: Option<&str>) -> Markup {
    html! {
        div
        {
            label for=(id) class=(FORM_LABEL_STYLE) { (label) }

            input
                type=(type_)
                name=(id)
                id=(id)
                class=(FORM_TEXT_INPUT_STYLE)
                required
                value=(value);

            (field_error(error))
        }
    }
}

fn registration_form(form: &RegisterForm, errors: &RegisterFormErrors) -> Markup {
    html! {
        form method="post" action=(endpoints::REGISTER_VIEW) class="form"
        {
            (text_input("username", "Username", "text", &form.username, errors.username.as_deref()))
            (text_input("email", "Email", "email", &form.email, errors.email.as_deref()))
            (password_input(
                "password",
                "Password",
                ValidatedPassword::MIN_LENGTH,
                errors.password.as_deref()
            ))
            (password_input(
                "confirm_password",
                "Confirm Password",
                ValidatedPassword::MIN_LENGTH,
                errors.confirm_password.as_deref()
            ))

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Register" }

            p
            {
                "Already have an account? "
                (link(endpoints::LOG_IN_VIEW, "Log in here"))
            }
        }
    }
}

fn registration_view(form: &RegisterForm, errors: &RegisterFormErrors) -> Markup {
    let content = log_in_register("Create an account", None, &registration_form(form, errors));

    base("Register", &content)
}

/// Display the registration page.
pub async fn get_register_page() -> Response {
    registration_view(&RegisterForm::default(), &RegisterFormErrors::default()).into_response()
}

/// The state needed for creating a new user.
#[derive(Debug, Clone)]
pub struct RegistrationState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The bcrypt cost used when hashing new passwords.
    pub password_hash_cost: u32,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for RegistrationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            password_hash_cost: state.password_hash_cost,
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<RegistrationState> for Key {
    fn from_ref(state: &RegistrationState) -> Self {
        state.cookie_key.clone()
    }
}

struct ValidRegistration {
    username: Username,
    email: EmailAddress,
    password: ValidatedPassword,
}

fn validate(form: &RegisterForm) -> Result<ValidRegistration, RegisterFormErrors> {
    let mut errors = RegisterFormErrors::default();

    let username = required(&form.username)
        .map_err(str::to_owned)
        .and_then(|username| {
            Username::new(username).map_err(|error| match error {
                Error::UsernameTooLong(max_length) => {
                    format!("Username must be at most {max_length} characters long.")
                }
                error => error.to_string(),
            })
        })
        .map_err(|error| errors.username = Some(error))
        .ok();

    let email = required(&form.email)
        .map_err(str::to_owned)
        .and_then(|email| parse_email(email).map_err(|_| INVALID_EMAIL_MSG.to_owned()))
        .map_err(|error| errors.email = Some(error))
        .ok();

    let password = if form.password.is_empty() {
        errors.password = Some(crate::validation::REQUIRED_FIELD_MSG.to_owned());
        None
    } else {
        ValidatedPassword::new(&form.password)
            .map_err(|_| {
                errors.password = Some(format!(
                    "Password must be at least {} characters long.",
                    ValidatedPassword::MIN_LENGTH
                ))
            })
            .ok()
    };

    if form.confirm_password.is_empty() {
        errors.confirm_password = Some(crate::validation::REQUIRED_FIELD_MSG.to_owned());
    } else if form.confirm_password != form.password {
        errors.confirm_password = Some(PASSWORDS_DO_NOT_MATCH_MSG.to_owned());
    }

    match (username, email, password) {
        (Some(username), Some(email), Some(password)) if errors.is_empty() => {
            Ok(ValidRegistration {
                username,
                email,
                password,
            })
        }
        _ => Err(errors),
    }
}

/// Handler for registration requests via the POST method.
///
/// On success the user is sent to the log-in page with a confirmation message.
/// Invalid input re-renders the form with a message under each offending field.
pub async fn register_user(
    State(state): State<RegistrationState>,
    jar: PrivateCookieJar,
    Form(form): Form<RegisterForm>,
) -> Response {
    let registration = match validate(&form) {
        Ok(registration) => registration,
        Err(errors) => return registration_view(&form, &errors).into_response(),
    };

    let password_hash = match PasswordHash::new(registration.password, state.password_hash_cost) {
        Ok(password_hash) => password_hash,
        Err(error) => {
            tracing::error!("an error occurred while hashing a password: {error}");
            return error.into_response();
        }
    };

    let result = match state.db_connection.lock() {
        Ok(connection) => create_user(
            registration.username,
            registration.email,
            password_hash,
            &connection,
        ),
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            Err(Error::DatabaseLockError)
        }
    };

    match result {
        Ok(user) => {
            tracing::info!("Registered user {} with ID {}", user.username, user.id);
            let jar = set_flash(jar, Alert::success(REGISTRATION_SUCCESS_MSG));

            (jar, Redirect::to(endpoints::LOG_IN_VIEW)).into_response()
        }
        Err(Error::DuplicateUsername) => {
            let errors = RegisterFormErrors {
                username: Some(DUPLICATE_USERNAME_MSG.to_owned()),
                ..Default::default()
            };
            registration_view(&form, &errors).into_response()
        }
        Err(Error::DuplicateEmail) => {
            let errors = RegisterFormErrors {
                email: Some(DUPLICATE_EMAIL_MSG.to_owned()),
                ..Default::default()
            };
            registration_view(&form, &errors).into_response()
        }
        Err(error) => error.into_response(),
    }
}


#[cfg(test)]
mod register_user_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Form, extract::State, http::StatusCode, response::Response};
    use axum_extra::extract::PrivateCookieJar;
    use rusqlite::Connection;

    use crate::{
        PasswordHash,
        app_state::create_cookie_key,
        auth::{count_users, get_user_by_username},
        db::initialize,
        endpoints,
        test_utils::{assert_form_error_message, assert_redirect, parse_html_document},
        validation::REQUIRED_FIELD_MSG,
    };

    use super::{
        DUPLICATE_EMAIL_MSG, DUPLICATE_USERNAME_MSG, INVALID_EMAIL_MSG,
        PASSWORDS_DO_NOT_MATCH_MSG, RegisterForm, RegistrationState, register_user,
    };

    fn get_test_state() -> RegistrationState {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        initialize(&connection).expect("Could not initialize database");

        RegistrationState {
            cookie_key: create_cookie_key("foobar"),
            password_hash_cost: PasswordHash::MIN_COST,
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    fn valid_form() -> RegisterForm {
        RegisterForm {
            username: "registeruser".to_owned(),
            email: "registeruser@example.com".to_owned(),
            password: "password".to_owned(),
            confirm_password: "password".to_owned(),
        }
    }

    async fn new_register_request(state: RegistrationState, form: RegisterForm) -> Response {
        let jar = PrivateCookieJar::new(state.cookie_key.clone());

        register_user(State(state), jar, Form(form)).await
    }

    #[tokio::test]
    async fn register_user_succeeds() {
        let state = get_test_state();

        let response = new_register_request(state.clone(), valid_form()).await;

        assert_redirect(&response, endpoints::LOG_IN_VIEW);
        let connection = state.db_connection.lock().unwrap();
        let user = get_user_by_username("registeruser", &connection).unwrap();
        assert_eq!(user.email.as_str(), "registeruser@example.com");
        assert!(user.password_hash.verify("password").unwrap());
    }

    #[tokio::test]
    async fn register_user_sets_flash_cookie() {
        let response = new_register_request(get_test_state(), valid_form()).await;

        let set_cookie = response
            .headers()
            .get("set-cookie")
            .expect("want flash cookie")
            .to_str()
            .unwrap();
        assert!(set_cookie.starts_with("flash="), "got {set_cookie}");
    }

    #[tokio::test]
    async fn register_with_empty_fields_shows_required_errors() {
        let state = get_test_state();

        let response = new_register_request(state.clone(), RegisterForm::default()).await;

        assert_eq!(response.status(), StatusCode::OK);
        let document = parse_html_document(response).await;
        let errors = crate::test_utils::form_error_messages(&document);
        assert_eq!(errors, vec![REQUIRED_FIELD_MSG; 4]);
        assert_eq!(count_users(&state.db_connection.lock().unwrap()), Ok(0));
    }

    #[tokio::test]
    async fn register_with_mismatched_passwords_fails() {
        let state = get_test_state();
        let form = RegisterForm {
            confirm_password: "passw0rd".to_owned(),
            ..valid_form()
        };

        let response = new_register_request(state.clone(), form).await;

        assert_eq!(response.status(), StatusCode::OK);
        let document = parse_html_document(response).await;
        assert_form_error_message(&document, PASSWORDS_DO_NOT_MATCH_MSG);
        assert_eq!(count_users(&state.db_connection.lock().unwrap()), Ok(0));
    }

    #[tokio::test]
    async fn register_with_short_password_fails() {
        let form = RegisterForm {
            password: "short".to_owned(),
            confirm_password: "short".to_owned(),
            ..valid_form()
        };

        let response = new_register_request(get_test_state(), form).await;

        let document = parse_html_document(response).await;
        assert_form_error_message(&document, "Password must be at least 8 characters long.");
    }

    #[tokio::test]
    async fn register_with_invalid_email_fails() {
        let form = RegisterForm {
            email: "not-an-email".to_owned(),
            ..valid_form()
        };

        let response = new_register_request(get_test_state(), form).await;

        let document = parse_html_document(response).await;
        assert_form_error_message(&document, INVALID_EMAIL_MSG);
    }

    #[tokio::test]
    async fn register_with_taken_username_fails() {
        let state = get_test_state();
        new_register_request(state.clone(), valid_form()).await;
        let form = RegisterForm {
            email: "other@example.com".to_owned(),
            ..valid_form()
        };

        let response = new_register_request(state.clone(), form).await;

        assert_eq!(response.status(), StatusCode::OK);
        let document = parse_html_document(response).await;
        assert_form_error_message(&document, DUPLICATE_USERNAME_MSG);
        assert_eq!(count_users(&state.db_connection.lock().unwrap()), Ok(1));
    }

    #[tokio::test]
    async fn register_with_taken_email_fails() {
        let state = get_test_state();
        new_register_request(state.clone(), valid_form()).await;
        let form = RegisterForm {
            username: "someoneelse".to_owned(),
            ..valid_form()
        };

        let response = new_register_request(state, form).await;

        let document = parse_html_document(response).await;
        assert_form_error_message(&document, DUPLICATE_EMAIL_MSG);
    }

    #[tokio::test]
    async fn failed_registration_keeps_username_and_email() {
        let form = RegisterForm {
            confirm_password: "different".to_owned(),
            ..valid_form()
        };

        let response = new_register_request(get_test_state(), form).await;

        let document = parse_html_document(response).await;
        let form = crate::test_utils::must_get_form(&document);
        crate::test_utils::assert_form_input_with_value(&form, "username", "text", "registeruser");
        crate::test_utils::assert_form_input_with_value(
            &form,
            "email",
            "email",
            "registeruser@example.com",
        );
    }
}
