//! Defines the route handler for the payment history page.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;
use time::{Date, macros::format_description};

use crate::{
    AppState, Error, endpoints,
    html::{
        BUTTON_DELETE_STYLE, FORM_TEXT_INPUT_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE,
        TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, format_amount,
        format_date_dmy,
    },
    invoice::{
        core::{Invoice, get_all_invoices},
        query::{InvoiceFilter, class_options, filter_invoices},
    },
    navigation::NavBar,
    timezone::current_local_date,
};

/// The filter parameters of the history page, all optional.
///
/// Dates arrive as raw text so that a cleared date field (an empty string)
/// means "no bound" rather than a parse failure. A parameter that is absent
/// entirely gets the page default: the current month.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryQuery {
    /// Free-text search across student, father, class and invoice number.
    pub q: Option<String>,
    /// Exact class filter.
    pub class: Option<String>,
    /// Inclusive start date, ISO formatted.
    pub from: Option<String>,
    /// Inclusive end date, ISO formatted.
    pub to: Option<String>,
}

/// Turn the query parameters into the filter predicate set.
///
/// Missing date parameters default to the current month (first of the
/// month through today); present-but-unparseable ones mean "no bound".
pub fn resolve_filter(query: &HistoryQuery, today: Date) -> InvoiceFilter {
    let date_from = match &query.from {
        None => Some(first_of_month(today)),
        Some(raw) => parse_date(raw),
    };
    let date_to = match &query.to {
        None => Some(today),
        Some(raw) => parse_date(raw),
    };

    InvoiceFilter {
        search: query.q.clone(),
        class_name: query.class.clone(),
        date_from,
        date_to,
    }
}

fn first_of_month(date: Date) -> Date {
    date.replace_day(1).unwrap()
}

fn parse_date(raw: &str) -> Option<Date> {
    Date::parse(raw.trim(), format_description!("[year]-[month]-[day]")).ok()
}

/// The query string for re-linking the current filter, e.g. on the report
/// link.
pub fn filter_query_string(query: &HistoryQuery, filter: &InvoiceFilter) -> String {
    let mut pairs: Vec<(&str, String)> = Vec::new();

    if let Some(q) = &query.q {
        pairs.push(("q", q.clone()));
    }
    if let Some(class) = &query.class {
        pairs.push(("class", class.clone()));
    }
    if let Some(from) = filter.date_from {
        pairs.push(("from", from.to_string()));
    }
    if let Some(to) = filter.date_to {
        pairs.push(("to", to.to_string()));
    }

    serde_urlencoded::to_string(&pairs).unwrap_or_default()
}

/// The state needed for the history page.
#[derive(Debug, Clone)]
pub struct HistoryPageState {
    /// The database connection for managing invoices.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Asia/Karachi".
    pub local_timezone: String,
}

impl FromRef<AppState> for HistoryPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Render the payment history with the filter bar and record table.
pub async fn get_history_page(
    State(state): State<HistoryPageState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Response, Error> {
    let today = current_local_date(&state.local_timezone)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let invoices = get_all_invoices(&connection)
        .inspect_err(|error| tracing::error!("could not get invoices: {error}"))?;
    let total_count = invoices.len();
    let classes = class_options(&invoices);

    let filter = resolve_filter(&query, today);
    let filtered = filter_invoices(invoices, &filter);

    let report_url = format!(
        "{}?{}",
        endpoints::HISTORY_REPORT_VIEW,
        filter_query_string(&query, &filter)
    );

    Ok(history_view(&query, &filter, &classes, &filtered, total_count, &report_url).into_response())
}

fn history_view(
    query: &HistoryQuery,
    filter: &InvoiceFilter,
    classes: &[String],
    filtered: &[Invoice],
    total_count: usize,
    report_url: &str,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::HISTORY_VIEW);

    let content = html! {
        (nav_bar.into_html())

        main class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-6xl"
            {
                div class="flex flex-wrap items-baseline justify-between gap-4 mb-4"
                {
                    h1 class="text-2xl font-bold" { "Payment History" }

                    span class="text-sm text-gray-600 dark:text-gray-400"
                    {
                        "Showing: " (filtered.len()) " / " (total_count)
                    }
                }

                (filter_bar(query, filter, classes, report_url))

                @if total_count == 0 {
                    p class="mt-8 text-center text-gray-600 dark:text-gray-400"
                        data-empty-state="true"
                    {
                        "ابھی تک کوئی ادائیگی محفوظ نہیں ہوئی۔"
                    }
                } @else if filtered.is_empty() {
                    p class="mt-8 text-center text-gray-600 dark:text-gray-400"
                        data-empty-state="true"
                    {
                        "فلٹر کے مطابق کوئی ریکارڈ نہیں ملا۔"
                    }
                } @else {
                    (history_table(filtered))
                }
            }
        }
    };

    base("Payment History", &[], &content)
}

fn filter_bar(
    query: &HistoryQuery,
    filter: &InvoiceFilter,
    classes: &[String],
    report_url: &str,
) -> Markup {
    html! {
        form
            method="get"
            action=(endpoints::HISTORY_VIEW)
            class="grid grid-cols-2 md:grid-cols-6 gap-2 items-end mb-6"
        {
            input
                name="q"
                type="text"
                aria-label="Search"
                placeholder="Student / Father / Class"
                value=[query.q.as_deref()]
                class=(FORM_TEXT_INPUT_STYLE);

            select
                name="class"
                aria-label="Class filter"
                class=(FORM_TEXT_INPUT_STYLE)
            {
                option value="" { "All Classes" }

                @for class in classes {
                    option
                        value=(class)
                        selected[query.class.as_deref() == Some(class.as_str())]
                    {
                        (class)
                    }
                }
            }

            input
                name="from"
                type="date"
                aria-label="From date"
                value=[filter.date_from.map(|date| date.to_string())]
                class=(FORM_TEXT_INPUT_STYLE);

            input
                name="to"
                type="date"
                aria-label="To date"
                value=[filter.date_to.map(|date| date.to_string())]
                class=(FORM_TEXT_INPUT_STYLE);

            button
                type="submit"
                class="px-4 py-2.5 text-sm font-medium text-white bg-blue-600 rounded hover:bg-blue-700"
            {
                "Apply"
            }

            a
                href=(report_url)
                target="_blank"
                class="px-4 py-2.5 text-sm font-medium text-center text-gray-900 bg-white rounded border border-gray-200 hover:bg-gray-100 dark:bg-gray-800 dark:text-gray-300 dark:border-gray-600"
            {
                "Export PDF"
            }
        }
    }
}

fn history_table(invoices: &[Invoice]) -> Markup {
    html! {
        div class="relative overflow-x-auto shadow-md sm:rounded-lg"
        {
            table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class="px-6 py-3" { "انوائس نمبر" }
                        th scope="col" class="px-6 py-3" { "تاریخ" }
                        th scope="col" class="px-6 py-3" { "طالب علم" }
                        th scope="col" class="px-6 py-3" { "والد" }
                        th scope="col" class="px-6 py-3" { "کلاس" }
                        th scope="col" class="px-6 py-3" { "آئٹمز" }
                        th scope="col" class="px-6 py-3" { "کل رقم" }
                        th scope="col" class="px-6 py-3" { "وصول" }
                        th scope="col" class="px-6 py-3" { "بقایا" }
                        th scope="col" class="px-6 py-3" { "Actions" }
                    }
                }

                tbody
                {
                    @for invoice in invoices {
                        (history_row(invoice))
                    }
                }
            }
        }
    }
}

fn history_row(invoice: &Invoice) -> Markup {
    let items_summary = if invoice.items.is_empty() {
        "-".to_owned()
    } else {
        invoice
            .items
            .iter()
            .map(|item| format!("{} ({})", item.label, format_amount(item.amount)))
            .collect::<Vec<_>>()
            .join("، ")
    };

    html! {
        tr class=(TABLE_ROW_STYLE) data-invoice-row="true"
        {
            td class=(TABLE_CELL_STYLE) { (invoice.invoice_no) }
            td class=(TABLE_CELL_STYLE) { bdi dir="ltr" { (format_date_dmy(invoice.date)) } }
            td class=(TABLE_CELL_STYLE) { (invoice.student_name) }
            td class=(TABLE_CELL_STYLE) { (invoice.father_name) }
            td class=(TABLE_CELL_STYLE) { (invoice.class_name) }
            td class=(TABLE_CELL_STYLE) { (items_summary) }
            td class=(TABLE_CELL_STYLE) { (format_amount(invoice.total_amount)) }
            td class=(TABLE_CELL_STYLE) { (format_amount(invoice.amount_received)) }
            td class=(TABLE_CELL_STYLE) { (format_amount(invoice.remaining_amount)) }
            td class=(TABLE_CELL_STYLE)
            {
                div class="flex gap-3"
                {
                    a
                        href=(endpoints::format_endpoint(endpoints::INVOICE_PRINT_VIEW, invoice.id))
                        target="_blank"
                        class=(LINK_STYLE)
                    {
                        "Print"
                    }

                    a
                        href=(endpoints::format_endpoint(endpoints::EDIT_INVOICE_VIEW, invoice.id))
                        class=(LINK_STYLE)
                    {
                        "Edit"
                    }

                    button
                        type="button"
                        class=(BUTTON_DELETE_STYLE)
                        hx-delete=(endpoints::format_endpoint(endpoints::INVOICE, invoice.id))
                        hx-target="closest tr"
                        hx-swap="outerHTML"
                        hx-target-error="#alert-container"
                        hx-confirm="کیا آپ یہ ریکارڈ حذف کرنا چاہتے ہیں؟"
                    {
                        "Delete"
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod history_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Query, State},
        response::Response,
    };
    use rusqlite::Connection;
    use scraper::{Html, Selector};
    use time::macros::date;

    use crate::invoice::core::{FeeItem, create_invoice, delete_invoice, test_draft};
    use crate::{db::initialize, invoice::query::InvoiceFilter};

    use super::{HistoryPageState, HistoryQuery, get_history_page, resolve_filter};

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    fn fee_items() -> Vec<FeeItem> {
        vec![FeeItem {
            label: "ماہانہ فیس".to_owned(),
            amount: 500,
        }]
    }

    /// A query whose date range covers every test record.
    fn wide_query() -> HistoryQuery {
        HistoryQuery {
            from: Some("2020-01-01".to_owned()),
            to: Some("2030-01-01".to_owned()),
            ..Default::default()
        }
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
    fn count_invoice_rows(html: &Html) -> usize {
        let row_selector = Selector::parse("tbody tr[data-invoice-row='true']").unwrap();
        html.select(&row_selector).count()
    }

    #[test]
    fn missing_dates_default_to_current_month() {
        let today = date!(2025 - 03 - 17);

        let filter = resolve_filter(&HistoryQuery::default(), today);

        assert_eq!(
            filter,
            InvoiceFilter {
                search: None,
                class_name: None,
                date_from: Some(date!(2025 - 03 - 01)),
                date_to: Some(today),
            }
        );
    }

    #[test]
    fn cleared_dates_mean_no_bound() {
        let today = date!(2025 - 03 - 17);
        let query = HistoryQuery {
            from: Some("".to_owned()),
            to: Some("".to_owned()),
            ..Default::default()
        };

        let filter = resolve_filter(&query, today);

        assert_eq!(filter.date_from, None);
        assert_eq!(filter.date_to, None);
    }

    #[tokio::test]
    async fn history_page_lists_matching_records() {
        let conn = get_test_connection();
        create_invoice(test_draft("INV-0001", date!(2025 - 03 - 01), fee_items()), &conn).unwrap();
        create_invoice(test_draft("INV-0002", date!(2025 - 03 - 02), fee_items()), &conn).unwrap();
        let state = HistoryPageState {
            db_connection: Arc::new(Mutex::new(conn)),
            local_timezone: "Etc/UTC".to_owned(),
        };

        let response = get_history_page(State(state), Query(wide_query()))
            .await
            .unwrap();

        let html = parse_html(response).await;
        assert_eq!(count_invoice_rows(&html), 2);
    }

    #[tokio::test]
    async fn history_page_applies_search_filter() {
        let conn = get_test_connection();
        create_invoice(test_draft("INV-0001", date!(2025 - 03 - 01), fee_items()), &conn).unwrap();
        create_invoice(test_draft("INV-0002", date!(2025 - 03 - 02), fee_items()), &conn).unwrap();
        let state = HistoryPageState {
            db_connection: Arc::new(Mutex::new(conn)),
            local_timezone: "Etc/UTC".to_owned(),
        };
        let query = HistoryQuery {
            q: Some("INV-0002".to_owned()),
            ..wide_query()
        };

        let response = get_history_page(State(state), Query(query)).await.unwrap();

        let html = parse_html(response).await;
        assert_eq!(count_invoice_rows(&html), 1);
    }

    #[tokio::test]
    async fn deleted_invoice_disappears_from_history() {
        let conn = get_test_connection();
        let keep =
            create_invoice(test_draft("INV-0001", date!(2025 - 03 - 01), fee_items()), &conn)
                .unwrap();
        let remove =
            create_invoice(test_draft("INV-0002", date!(2025 - 03 - 02), fee_items()), &conn)
                .unwrap();
        delete_invoice(remove.id, &conn).unwrap();
        let state = HistoryPageState {
            db_connection: Arc::new(Mutex::new(conn)),
            local_timezone: "Etc/UTC".to_owned(),
        };

        let response = get_history_page(State(state), Query(wide_query()))
            .await
            .unwrap();

        let html = parse_html(response).await;
        assert_eq!(count_invoice_rows(&html), 1);
        let text: String = html.root_element().text().collect();
        assert!(text.contains(&keep.invoice_no));
        assert!(!text.contains(&remove.invoice_no));
    }

    #[tokio::test]
    async fn empty_ledger_shows_empty_state() {
        let state = HistoryPageState {
            db_connection: Arc::new(Mutex::new(get_test_connection())),
            local_timezone: "Etc/UTC".to_owned(),
        };

        let response = get_history_page(State(state), Query(HistoryQuery::default()))
            .await
            .unwrap();

        let html = parse_html(response).await;
        let empty_selector = Selector::parse("[data-empty-state='true']").unwrap();
        assert!(html.select(&empty_selector).next().is_some());
    }
}
