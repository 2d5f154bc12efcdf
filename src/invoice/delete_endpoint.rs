//! Defines the endpoint for deleting an invoice.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    alert::Alert,
    invoice::core::{InvoiceId, delete_invoice},
};

/// The state needed to delete an invoice.
#[derive(Debug, Clone)]
pub struct DeleteInvoiceState {
    /// The database connection for managing invoices.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteInvoiceState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for deleting an invoice, responds with an alert.
///
/// Deleted invoices disappear from the history and from every dashboard
/// rollup; there is no soft delete.
pub async fn delete_invoice_endpoint(
    State(state): State<DeleteInvoiceState>,
    Path(invoice_id): Path<InvoiceId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_invoice(invoice_id, &connection) {
        // The status code has to be 200 OK or HTMX will not delete the table row.
        Ok(()) => Alert::success_simple("ریکارڈ حذف کر دیا گیا۔").into_response(),
        Err(error) => {
            tracing::error!("Could not delete invoice {invoice_id}: {error}");
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod delete_invoice_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Path, State},
        http::StatusCode,
    };
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        initialize_db,
        invoice::core::{FeeItem, create_invoice, get_all_invoices, test_draft},
    };

    use super::{DeleteInvoiceState, delete_invoice_endpoint};

    fn must_create_test_state() -> DeleteInvoiceState {
        let connection =
            Connection::open_in_memory().expect("could not create in-memory SQLite database");
        initialize_db(&connection).expect("could not initialize test DB");

        DeleteInvoiceState {
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    #[tokio::test]
    async fn deletes_invoice() {
        let state = must_create_test_state();
        let created = {
            let connection = state.db_connection.lock().unwrap();
            create_invoice(
                test_draft(
                    "INV-0001",
                    date!(2025 - 03 - 01),
                    vec![FeeItem {
                        label: "ماہانہ فیس".to_owned(),
                        amount: 500,
                    }],
                ),
                &connection,
            )
            .unwrap()
        };

        let response = delete_invoice_endpoint(State(state.clone()), Path(created.id)).await;

        assert_eq!(response.status(), StatusCode::OK);
        let connection = state.db_connection.lock().unwrap();
        assert_eq!(get_all_invoices(&connection).unwrap(), []);
    }

    #[tokio::test]
    async fn responds_not_found_for_missing_invoice() {
        let state = must_create_test_state();

        let response = delete_invoice_endpoint(State(state), Path(42)).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
