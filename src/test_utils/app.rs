use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use axum::http::StatusCode;
use axum_extra::extract::cookie::Cookie;
use axum_test::{TestRequest, TestResponse, TestServer};
use rusqlite::Connection;
use serde::Serialize;
use time::Duration;

use crate::{
    AppState, Config, PasswordHash, User, Username, auth::parse_email, build_router, create_user,
    endpoints,
};

pub(crate) const TEST_USERNAME: &str = "testuser";
pub(crate) const TEST_EMAIL: &str = "testuser@example.com";
pub(crate) const TEST_PASSWORD: &str = "password";

/// Insert the standard test user into the database.
#[track_caller]
pub(crate) fn insert_test_user(connection: &Connection) -> User {
    create_user(
        Username::new(TEST_USERNAME).unwrap(),
        parse_email(TEST_EMAIL).unwrap(),
        PasswordHash::from_raw_password(TEST_PASSWORD, PasswordHash::MIN_COST).unwrap(),
        connection,
    )
    .expect("Could not create test user")
}

/// Drives the full application like a browser: cookies from responses are
/// kept and sent with later requests.
pub(crate) struct TestClient {
    server: TestServer,
    cookies: HashMap<String, Cookie<'static>>,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl TestClient {
    pub fn new() -> Self {
        let state = AppState::from_config(&Config::testing()).expect("Could not create app state");
        let db_connection = state.db_connection.clone();
        let server = TestServer::try_new(build_router(state)).expect("Could not create test server.");

        Self {
            server,
            cookies: HashMap::new(),
            db_connection,
        }
    }

    /// A client with the standard test user already registered.
    pub fn with_test_user() -> Self {
        let client = Self::new();
        insert_test_user(&client.db_connection.lock().unwrap());

        client
    }

    /// A client that has logged in as the standard test user.
    pub async fn logged_in() -> Self {
        let mut client = Self::with_test_user();
        let response = client.log_in(TEST_USERNAME, TEST_PASSWORD).await;
        assert_eq!(
            response.status_code(),
            StatusCode::SEE_OTHER,
            "log in failed: {}",
            response.text()
        );

        client
    }

    pub async fn log_in(&mut self, username: &str, password: &str) -> TestResponse {
        self.post_form(
            endpoints::LOG_IN_VIEW,
            &[("username", username), ("password", password)],
        )
        .await
    }

    pub async fn get(&mut self, path: &str) -> TestResponse {
        let request = self.with_cookies(self.server.get(path));
        let response = request.await;
        self.store_cookies(&response);

        response
    }

    pub async fn post_form<T: Serialize + ?Sized>(&mut self, path: &str, form: &T) -> TestResponse {
        let request = self.with_cookies(self.server.post(path)).form(form);
        let response = request.await;
        self.store_cookies(&response);

        response
    }

    /// GET each redirect location until a response is not a redirect.
    pub async fn follow_redirects(&mut self, mut response: TestResponse) -> TestResponse {
        for _ in 0..10 {
            if !response.status_code().is_redirection() {
                return response;
            }

            let location = response
                .header("location")
                .to_str()
                .expect("Could not convert location header to str")
                .to_owned();
            response = self.get(&location).await;
        }

        panic!("too many redirects");
    }

    fn with_cookies(&self, mut request: TestRequest) -> TestRequest {
        for cookie in self.cookies.values() {
            request = request.add_cookie(cookie.clone());
        }

        request
    }

    fn store_cookies(&mut self, response: &TestResponse) {
        for cookie in response.cookies().iter() {
            if cookie.max_age() == Some(Duration::ZERO) {
                self.cookies.remove(cookie.name());
            } else {
                self.cookies
                    .insert(cookie.name().to_owned(), cookie.clone().into_owned());
            }
        }
    }
}
