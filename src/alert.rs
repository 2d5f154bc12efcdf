//! Alert partials for displaying success and error messages to users.
//!
//! API endpoints respond to HTMX form posts with these partials; the markup
//! swaps out-of-band into the fixed alert container on every page.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

/// A dismissible alert message.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    /// Something worked; shown in green.
    Success {
        /// The headline of the alert.
        message: String,
        /// Optional second line with more detail.
        details: String,
    },
    /// Something failed; shown in red.
    Error {
        /// The headline of the alert.
        message: String,
        /// Optional second line with more detail.
        details: String,
    },
}

impl Alert {
    /// Create a new success alert.
    pub fn success(message: &str, details: &str) -> Self {
        Self::Success {
            message: message.to_owned(),
            details: details.to_owned(),
        }
    }

    /// Create a new success alert without details.
    pub fn success_simple(message: &str) -> Self {
        Self::success(message, "")
    }

    /// Create a new error alert.
    pub fn error(message: &str, details: &str) -> Self {
        Self::Error {
            message: message.to_owned(),
            details: details.to_owned(),
        }
    }

    /// Render the alert as an out-of-band swap for the alert container.
    pub fn into_markup(self) -> Markup {
        let (message, details, tone_style) = match self {
            Alert::Success { message, details } => (
                message,
                details,
                "text-green-800 bg-green-50 dark:bg-gray-800 dark:text-green-400 border border-green-300 dark:border-green-800",
            ),
            Alert::Error { message, details } => (
                message,
                details,
                "text-red-800 bg-red-50 dark:bg-gray-800 dark:text-red-400 border border-red-300 dark:border-red-800",
            ),
        };

        html!(
            div
                id="alert-container"
                hx-swap-oob="true"
                class="w-full max-w-md px-4"
                style="position: fixed; bottom: 1rem; left: 50%; transform: translateX(-50%); z-index: 9999;"
            {
                div
                    class=(format!("flex items-start justify-between gap-3 p-4 rounded-lg shadow {tone_style}"))
                    role="alert"
                {
                    div
                    {
                        p class="font-semibold" { (message) }

                        @if !details.is_empty() {
                            p class="text-sm mt-1" { (details) }
                        }
                    }

                    button
                        type="button"
                        class="font-bold"
                        aria-label="Dismiss"
                        onclick="document.getElementById('alert-container').classList.add('hidden')"
                    {
                        "×"
                    }
                }
            }
        )
    }
}

impl IntoResponse for Alert {
    fn into_response(self) -> Response {
        let status = match &self {
            Alert::Success { .. } => StatusCode::OK,
            Alert::Error { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };

        render_alert(status, self)
    }
}

/// Render `alert` as a response with the given status code.
pub fn render_alert(status_code: StatusCode, alert: Alert) -> Response {
    (status_code, alert.into_markup()).into_response()
}
