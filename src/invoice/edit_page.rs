//! Defines the route handler for the invoice edit page.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use maud::html;
use rusqlite::Connection;

use crate::{
    AppState, Error, endpoints,
    html::{PAGE_CONTAINER_STYLE, base},
    invoice::{
        core::{InvoiceId, get_invoice},
        form::{FormAction, InvoiceFormDefaults, invoice_form, totals_script},
    },
    navigation::NavBar,
};

/// The state needed for the invoice edit page.
#[derive(Debug, Clone)]
pub struct EditInvoicePageState {
    /// The database connection for managing invoices.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditInvoicePageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the edit form for a committed invoice, pre-filled with its
/// current fields and items.
pub async fn get_edit_invoice_page(
    State(state): State<EditInvoicePageState>,
    Path(invoice_id): Path<InvoiceId>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let invoice = get_invoice(invoice_id, &connection)
        .inspect_err(|error| tracing::error!("could not get invoice {invoice_id}: {error}"))?;

    let nav_bar = NavBar::new(endpoints::HISTORY_VIEW);
    let defaults = InvoiceFormDefaults {
        date: invoice.date,
        student_name: &invoice.student_name,
        father_name: &invoice.father_name,
        class_name: &invoice.class_name,
        invoice_no: &invoice.invoice_no,
        items: &invoice.items,
        amount_received: invoice.amount_received,
    };

    let content = html! {
        (nav_bar.into_html())

        main class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-3xl flex items-baseline justify-between mb-6"
            {
                h1 class="text-2xl font-bold" { "انوائس میں ترمیم" }

                span class="text-sm text-gray-600 dark:text-gray-400"
                {
                    "Invoice: " (invoice.invoice_no)
                }
            }

            (invoice_form(FormAction::Edit(invoice.id), &defaults))
        }
    };

    Ok(base("Edit Invoice", &[totals_script()], &content).into_response())
}
