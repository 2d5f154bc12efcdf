//! Defines the endpoint for committing a new fee payment.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::Connection;

use crate::{
    AppState, Error, endpoints,
    invoice::{
        core::{create_invoice, get_invoice_numbers},
        form::{InvoiceForm, build_invoice_draft},
    },
};

/// The state needed to create an invoice.
#[derive(Debug, Clone)]
pub struct CreateInvoiceState {
    /// The database connection for managing invoices.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateInvoiceState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for committing a fee payment.
///
/// Validation happens before any write: if the items are incomplete or the
/// received amount exceeds the total, the request is rejected with an alert
/// and the ledger is untouched.
pub async fn create_invoice_endpoint(
    State(state): State<CreateInvoiceState>,
    Form(form): Form<InvoiceForm>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let existing_numbers = match get_invoice_numbers(&connection) {
        Ok(numbers) => numbers,
        Err(error) => {
            tracing::error!("could not get invoice numbers: {error}");
            return error.into_alert_response();
        }
    };

    let draft = match build_invoice_draft(form, &existing_numbers) {
        Ok(draft) => draft,
        Err(error) => return error.into_alert_response(),
    };

    match create_invoice(draft, &connection) {
        Ok(invoice) => {
            tracing::info!(
                "committed invoice {} ({}) for {}",
                invoice.invoice_no,
                invoice.id,
                invoice.student_name
            );
            (
                HxRedirect(endpoints::HISTORY_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(error) => {
            tracing::error!("Could not create invoice: {error}");
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod create_invoice_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::State,
        http::{HeaderValue, StatusCode},
    };
    use axum_extra::extract::Form;
    use axum_htmx::HX_REDIRECT;
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        endpoints,
        initialize_db,
        invoice::{core::get_all_invoices, form::InvoiceForm},
    };

    use super::{CreateInvoiceState, create_invoice_endpoint};

    fn must_create_test_state() -> CreateInvoiceState {
        let connection =
            Connection::open_in_memory().expect("could not create in-memory SQLite database");
        initialize_db(&connection).expect("could not initialize test DB");

        CreateInvoiceState {
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    fn form() -> InvoiceForm {
        InvoiceForm {
            date: date!(2025 - 03 - 10),
            student_name: "حسن".to_owned(),
            father_name: "اکرم".to_owned(),
            class_name: "جماعت 7".to_owned(),
            invoice_no: "".to_owned(),
            item_label: vec!["ماہانہ فیس".to_owned(), "".to_owned()],
            item_amount: vec!["500".to_owned(), "".to_owned()],
            amount_received: "200".to_owned(),
        }
    }

    #[tokio::test]
    async fn commits_invoice_and_redirects_to_history() {
        let state = must_create_test_state();

        let response = create_invoice_endpoint(State(state.clone()), Form(form())).await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(HX_REDIRECT),
            Some(&HeaderValue::from_str(endpoints::HISTORY_VIEW).unwrap())
        );

        let connection = state.db_connection.lock().unwrap();
        let invoices = get_all_invoices(&connection).unwrap();
        assert_eq!(invoices.len(), 1);
        assert_eq!(invoices[0].invoice_no, "INV-0001");
        assert_eq!(invoices[0].total_amount, 500);
        assert_eq!(invoices[0].amount_received, 200);
        assert_eq!(invoices[0].remaining_amount, 300);
    }

    #[tokio::test]
    async fn rejects_overpayment_without_committing() {
        let state = must_create_test_state();
        let mut overpaid = form();
        overpaid.amount_received = "600".to_owned();

        let response = create_invoice_endpoint(State(state.clone()), Form(overpaid)).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let connection = state.db_connection.lock().unwrap();
        assert_eq!(get_all_invoices(&connection).unwrap(), []);
    }

    #[tokio::test]
    async fn rejects_incomplete_items_without_committing() {
        let state = must_create_test_state();
        let mut incomplete = form();
        incomplete.item_label = vec!["".to_owned()];
        incomplete.item_amount = vec!["500".to_owned()];
        incomplete.amount_received = "0".to_owned();

        let response = create_invoice_endpoint(State(state.clone()), Form(incomplete)).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let connection = state.db_connection.lock().unwrap();
        assert_eq!(get_all_invoices(&connection).unwrap(), []);
    }
}
