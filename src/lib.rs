//! Bursar is a web app for managing fee collection and expenditures in a
//! school office.
//!
//! Staff record student fee payments as itemised invoices, browse and edit
//! the payment history, print fee receipts, track expenditures, and view a
//! dashboard of income vs. expenditure. The app serves HTML pages directly
//! and stores everything in a local SQLite database.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use tokio::signal;

mod alert;
mod app_state;
mod dashboard;
mod db;
mod endpoints;
mod expenditure;
mod html;
mod internal_server_error;
mod invoice;
mod money;
mod navigation;
mod not_found;
mod routing;
mod timezone;
mod urdu;

pub use app_state::AppState;
pub use db::initialize as initialize_db;
pub use routing::build_router;

use crate::{
    alert::{Alert, render_alert},
    internal_server_error::{InternalServerErrorPage, render_internal_server_error},
    not_found::get_404_not_found_response,
};

/// An async task that waits for either the ctrl+c or terminate signal,
/// whichever comes first, and then signals the server to shut down
/// gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// No fee item had both a label and a positive amount, so there is
    /// nothing to bill for.
    #[error("at least one fee item must have both a label and an amount")]
    IncompleteItems,

    /// The amount received was greater than the invoice total.
    ///
    /// Totals are derived, so accepting this would make the remaining
    /// amount negative. The caller must not persist anything and should
    /// re-surface the previous values.
    #[error("amount received {received} exceeds the invoice total {total}")]
    ReceivedExceedsTotal {
        /// The normalized amount received.
        received: i64,
        /// The invoice total the received amount was checked against.
        total: i64,
    },

    /// An expenditure was submitted with a zero amount.
    ///
    /// Malformed numeric input is normalized to zero rather than reported,
    /// so this also covers unparseable amounts.
    #[error("expenditure amount must be greater than zero")]
    InvalidExpenditureAmount,

    /// A required text field was submitted empty.
    #[error("{0} must not be empty")]
    MissingField(&'static str),

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// Tried to update an invoice that does not exist.
    #[error("tried to update an invoice that is not in the database")]
    UpdateMissingInvoice,

    /// Tried to delete an invoice that does not exist.
    #[error("tried to delete an invoice that is not in the database")]
    DeleteMissingInvoice,

    /// Tried to update an expenditure that does not exist.
    #[error("tried to update an expenditure that is not in the database")]
    UpdateMissingExpenditure,

    /// Tried to delete an expenditure that does not exist.
    #[error("tried to delete an expenditure that is not in the database")]
    DeleteMissingExpenditure,

    /// A multi-row invoice write failed partway and the compensating write
    /// failed too, so the stored invoice may not match its fee items.
    ///
    /// This condition is terminal for the operation and must never be
    /// retried silently.
    #[error("invoice {0} may be inconsistent: a partial write could not be rolled back")]
    LedgerInconsistent(i64),

    /// The configured timezone is not a canonical timezone name.
    #[error("invalid timezone {0}")]
    InvalidTimezone(String),

    /// Could not acquire the database lock.
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => get_404_not_found_response(),
            Error::InvalidTimezone(timezone) => {
                render_internal_server_error(InternalServerErrorPage {
                    description: "Invalid Timezone Settings",
                    fix: &format!(
                        "Could not get local timezone \"{timezone}\". Check your server settings \
                        and ensure the timezone has been set to a valid, canonical timezone string"
                    ),
                })
            }
            Error::LedgerInconsistent(invoice_id) => {
                render_internal_server_error(InternalServerErrorPage {
                    description: "Ledger May Be Inconsistent",
                    fix: &format!(
                        "A write for invoice {invoice_id} failed partway and could not be rolled \
                        back. Check the stored invoice against its fee items before retrying."
                    ),
                })
            }
            Error::DatabaseLockError => render_internal_server_error(Default::default()),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                render_internal_server_error(Default::default())
            }
        }
    }
}

impl Error {
    fn into_alert_response(self) -> Response {
        match self {
            Error::IncompleteItems => render_alert(
                StatusCode::BAD_REQUEST,
                Alert::error(
                    "نامکمل فیس آئٹمز",
                    "کم از کم ایک فیس آئٹم میں نام اور رقم درج کریں۔",
                ),
            ),
            Error::ReceivedExceedsTotal { .. } => render_alert(
                StatusCode::BAD_REQUEST,
                Alert::error(
                    "وصول شدہ رقم درست نہیں",
                    "وصول شدہ رقم کل رقم سے زیادہ نہیں ہو سکتی۔",
                ),
            ),
            Error::InvalidExpenditureAmount => render_alert(
                StatusCode::BAD_REQUEST,
                Alert::error(
                    "Invalid expenditure amount",
                    "The amount must be a whole number greater than zero.",
                ),
            ),
            Error::MissingField(field) => render_alert(
                StatusCode::BAD_REQUEST,
                Alert::error(
                    "Missing required field",
                    &format!("The {field} field must not be empty."),
                ),
            ),
            Error::UpdateMissingInvoice => render_alert(
                StatusCode::NOT_FOUND,
                Alert::error(
                    "Could not update invoice",
                    "The invoice could not be found.",
                ),
            ),
            Error::DeleteMissingInvoice => render_alert(
                StatusCode::NOT_FOUND,
                Alert::error(
                    "Could not delete invoice",
                    "The invoice could not be found. \
                    Try refreshing the page to see if the invoice has already been deleted.",
                ),
            ),
            Error::UpdateMissingExpenditure => render_alert(
                StatusCode::NOT_FOUND,
                Alert::error(
                    "Could not update expenditure",
                    "The expenditure could not be found.",
                ),
            ),
            Error::DeleteMissingExpenditure => render_alert(
                StatusCode::NOT_FOUND,
                Alert::error(
                    "Could not delete expenditure",
                    "The expenditure could not be found. \
                    Try refreshing the page to see if the expenditure has already been deleted.",
                ),
            ),
            Error::LedgerInconsistent(invoice_id) => render_alert(
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::error(
                    "Ledger may be inconsistent",
                    &format!(
                        "A write for invoice {invoice_id} failed partway and could not be rolled \
                        back. Check the invoice before retrying."
                    ),
                ),
            ),
            _ => render_alert(
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::error(
                    "Something went wrong",
                    "An unexpected error occurred, check the server logs for more details.",
                ),
            ),
        }
    }
}
