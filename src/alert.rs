//! Success and error messages shown at the top of a page.

use maud::{Markup, html};
use serde::{Deserialize, Serialize};

/// Alert message types for styling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertType {
    Success,
    Error,
}

impl AlertType {
    fn class(self) -> &'static str {
        match self {
            AlertType::Success => "alert alert-success",
            AlertType::Error => "alert alert-error",
        }
    }
}

/// A message for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub kind: AlertType,
    pub message: String,
}

impl Alert {
    /// Create a new success alert
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: AlertType::Success,
            message: message.into(),
        }
    }

    /// Create a new error alert
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: AlertType::Error,
            message: message.into(),
        }
    }

    pub fn into_html(&self) -> Markup {
        html! {
            div class=(self.kind.class()) role="alert" { (self.message) }
        }
    }
}
