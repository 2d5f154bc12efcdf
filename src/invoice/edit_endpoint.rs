//! Defines the endpoint for replacing a committed invoice.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::Connection;

use crate::{
    AppState, Error, endpoints,
    invoice::{
        core::{InvoiceId, get_invoice_numbers, update_invoice},
        form::{InvoiceForm, build_invoice_draft},
    },
};

/// The state needed to edit an invoice.
#[derive(Debug, Clone)]
pub struct EditInvoiceState {
    /// The database connection for managing invoices.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditInvoiceState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for replacing a committed invoice with an edited one.
///
/// From the ledger's point of view the edit is all-or-nothing: either the
/// new fields, items and recomputed totals are all visible afterwards, or
/// the invoice is unchanged.
pub async fn edit_invoice_endpoint(
    State(state): State<EditInvoiceState>,
    Path(invoice_id): Path<InvoiceId>,
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

    match update_invoice(invoice_id, draft, &connection) {
        Ok(()) => (
            HxRedirect(endpoints::HISTORY_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("Could not update invoice {invoice_id}: {error}");
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod edit_invoice_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Path, State},
        http::{HeaderValue, StatusCode},
    };
    use axum_extra::extract::Form;
    use axum_htmx::HX_REDIRECT;
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        endpoints,
        initialize_db,
        invoice::{
            core::{FeeItem, create_invoice, get_invoice, test_draft},
            form::InvoiceForm,
        },
    };

    use super::{EditInvoiceState, edit_invoice_endpoint};

    fn must_create_test_state() -> EditInvoiceState {
        let connection =
            Connection::open_in_memory().expect("could not create in-memory SQLite database");
        initialize_db(&connection).expect("could not initialize test DB");

        EditInvoiceState {
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    #[tokio::test]
    async fn replaces_items_and_recomputes_totals() {
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
        let form = InvoiceForm {
            date: date!(2025 - 03 - 02),
            student_name: "بلال".to_owned(),
            father_name: "اسلم".to_owned(),
            class_name: "جماعت 8".to_owned(),
            invoice_no: "INV-0001".to_owned(),
            item_label: vec!["امتحانی فیس".to_owned()],
            item_amount: vec!["300".to_owned()],
            amount_received: "100".to_owned(),
        };

        let response =
            edit_invoice_endpoint(State(state.clone()), Path(created.id), Form(form)).await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(HX_REDIRECT),
            Some(&HeaderValue::from_str(endpoints::HISTORY_VIEW).unwrap())
        );

        let connection = state.db_connection.lock().unwrap();
        let updated = get_invoice(created.id, &connection).unwrap();
        assert_eq!(updated.student_name, "بلال");
        assert_eq!(
            updated.items,
            vec![FeeItem {
                label: "امتحانی فیس".to_owned(),
                amount: 300
            }]
        );
        assert_eq!(updated.total_amount, 300);
        assert_eq!(updated.amount_received, 100);
        assert_eq!(updated.remaining_amount, 200);
    }

    #[tokio::test]
    async fn rejects_overpayment_and_leaves_invoice_unchanged() {
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
        let form = InvoiceForm {
            date: date!(2025 - 03 - 02),
            student_name: "بلال".to_owned(),
            father_name: "اسلم".to_owned(),
            class_name: "جماعت 8".to_owned(),
            invoice_no: "INV-0001".to_owned(),
            item_label: vec!["امتحانی فیس".to_owned()],
            item_amount: vec!["300".to_owned()],
            amount_received: "400".to_owned(),
        };

        let response =
            edit_invoice_endpoint(State(state.clone()), Path(created.id), Form(form)).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let connection = state.db_connection.lock().unwrap();
        let unchanged = get_invoice(created.id, &connection).unwrap();
        assert_eq!(unchanged, created);
    }

    #[tokio::test]
    async fn responds_not_found_for_missing_invoice() {
        let state = must_create_test_state();
        let form = InvoiceForm {
            date: date!(2025 - 03 - 02),
            student_name: "بلال".to_owned(),
            father_name: "اسلم".to_owned(),
            class_name: "جماعت 8".to_owned(),
            invoice_no: "INV-0001".to_owned(),
            item_label: vec!["امتحانی فیس".to_owned()],
            item_amount: vec!["300".to_owned()],
            amount_received: "0".to_owned(),
        };

        let response = edit_invoice_endpoint(State(state), Path(42), Form(form)).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
