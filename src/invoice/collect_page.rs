//! Defines the route handler for the collect-fee page.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::html;
use rusqlite::Connection;

use crate::{
    AppState, Error, endpoints,
    html::{PAGE_CONTAINER_STYLE, base},
    invoice::{
        core::get_invoice_numbers,
        form::{FormAction, InvoiceFormDefaults, invoice_form, totals_script},
        numbering::next_invoice_number,
    },
    navigation::NavBar,
    timezone::current_local_date,
};

/// The state needed for the collect-fee page.
#[derive(Debug, Clone)]
pub struct CollectPageState {
    /// The database connection for managing invoices.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Asia/Karachi".
    pub local_timezone: String,
}

impl FromRef<AppState> for CollectPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Render the form for recording a new fee payment.
///
/// The form is pre-filled with today's date and the next suggested invoice
/// number, recomputed against the current record set on every render.
pub async fn get_collect_page(State(state): State<CollectPageState>) -> Result<Response, Error> {
    let today = current_local_date(&state.local_timezone)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let existing_numbers = get_invoice_numbers(&connection)
        .inspect_err(|error| tracing::error!("could not get invoice numbers: {error}"))?;
    let suggested_number = next_invoice_number(existing_numbers.iter().map(String::as_str));

    let nav_bar = NavBar::new(endpoints::COLLECT_VIEW);
    let defaults = InvoiceFormDefaults {
        date: today,
        student_name: "",
        father_name: "",
        class_name: "",
        invoice_no: &suggested_number,
        items: &[],
        amount_received: 0,
    };

    let content = html! {
        (nav_bar.into_html())

        main class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-3xl flex items-baseline justify-between mb-6"
            {
                h1 class="text-2xl font-bold" { "طلبہ فیس ادائیگی" }

                span class="text-sm text-gray-600 dark:text-gray-400"
                {
                    "Invoice: " (suggested_number)
                }
            }

            (invoice_form(FormAction::Create, &defaults))
        }
    };

    Ok(base(
        "Collect Fee",
        &[totals_script()],
        &content,
    )
    .into_response())
}

#[cfg(test)]
mod collect_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::{extract::State, response::Response};
    use rusqlite::Connection;
    use scraper::{Html, Selector};
    use time::macros::date;

    use crate::{
        db::initialize,
        invoice::core::{FeeItem, create_invoice, test_draft},
    };

    use super::{CollectPageState, get_collect_page};

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    async fn parse_html(response: Response) -> Html {
        let body = response.into_body();
        let body = axum::body::to_bytes(body, usize::MAX)
            .await
            .expect("Could not get response body");
        let text = String::from_utf8_lossy(&body).to_string();

        Html::parse_document(&text)
    }

    #[track_caller]
    fn assert_valid_html(html: &Html) {
        assert!(
            html.errors.is_empty(),
            "Got HTML parsing errors: {:?}",
            html.errors
        );
    }

    #[tokio::test]
    async fn collect_page_suggests_next_invoice_number() {
        let conn = get_test_connection();
        create_invoice(
            test_draft(
                "INV-0041",
                date!(2025 - 03 - 01),
                vec![FeeItem {
                    label: "ماہانہ فیس".to_owned(),
                    amount: 500,
                }],
            ),
            &conn,
        )
        .unwrap();
        let state = CollectPageState {
            db_connection: Arc::new(Mutex::new(conn)),
            local_timezone: "Etc/UTC".to_owned(),
        };

        let response = get_collect_page(State(state)).await.unwrap();

        let html = parse_html(response).await;
        assert_valid_html(&html);

        let input_selector = Selector::parse("input[name='invoice_no']").unwrap();
        let invoice_no_input = html
            .select(&input_selector)
            .next()
            .expect("No invoice number input found");
        assert_eq!(invoice_no_input.value().attr("value"), Some("INV-0042"));
    }

    #[tokio::test]
    async fn collect_page_renders_blank_item_rows() {
        let state = CollectPageState {
            db_connection: Arc::new(Mutex::new(get_test_connection())),
            local_timezone: "Etc/UTC".to_owned(),
        };

        let response = get_collect_page(State(state)).await.unwrap();

        let html = parse_html(response).await;
        assert_valid_html(&html);

        let label_selector = Selector::parse("input[name='item_label']").unwrap();
        let label_inputs: Vec<_> = html.select(&label_selector).collect();
        assert!(
            label_inputs.len() >= 3,
            "Expected several blank item rows, got {}",
            label_inputs.len()
        );
    }
}
