#![allow(missing_docs)]

pub(crate) mod app;
pub(crate) mod form;
pub(crate) mod html;
pub(crate) mod http;

pub(crate) use app::{TEST_PASSWORD, TEST_USERNAME, TestClient, insert_test_user};
pub(crate) use form::{
    assert_form_action, assert_form_error_message, assert_form_input,
    assert_form_input_with_value, assert_form_submit_button_with_text, form_error_messages,
    must_get_form,
};
pub(crate) use html::{assert_valid_html, parse_html_document};
pub(crate) use http::{assert_content_type, assert_redirect, assert_status_ok};
