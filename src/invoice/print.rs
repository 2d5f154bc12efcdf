//! The printable fee receipt and history report pages.
//!
//! Both are standalone HTML documents with embedded print CSS: the receipt
//! prints a STUDENT COPY and an OFFICE COPY side by side on one A5
//! landscape sheet, the report prints the filtered history on A4
//! landscape. A small script triggers the browser print dialog on load.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, Query, State},
    response::{IntoResponse, Response},
};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use rusqlite::Connection;
use time::Date;

use crate::{
    AppState, Error,
    html::{format_amount, format_date_dmy},
    invoice::{
        core::{Invoice, InvoiceId, get_all_invoices, get_invoice},
        history_page::{HistoryQuery, resolve_filter},
        query::filter_invoices,
    },
    timezone::current_local_date,
};

const SCHOOL_NAME: &str = "الحرم پبلک سکول اینڈ اقرا اکیڈمی";
const SCHOOL_ADDRESS: &str = "مسلم سٹی روڈ بالو، ضلع نوشہرہ";
const SCHOOL_PHONE: &str = "0315-9498390";

/// The receipt pads its item table to this many rows so every printed
/// receipt has the same height.
const RECEIPT_ITEM_ROWS: usize = 10;

/// The state needed for the printable pages.
#[derive(Debug, Clone)]
pub struct PrintPageState {
    /// The database connection for managing invoices.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Asia/Karachi".
    pub local_timezone: String,
}

impl FromRef<AppState> for PrintPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Render the printable fee receipt for one invoice.
pub async fn get_invoice_print_page(
    State(state): State<PrintPageState>,
    Path(invoice_id): Path<InvoiceId>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let invoice = get_invoice(invoice_id, &connection)
        .inspect_err(|error| tracing::error!("could not get invoice {invoice_id}: {error}"))?;

    Ok(receipt_view(&invoice).into_response())
}

/// Render the printable report of the filtered payment history.
pub async fn get_history_report_page(
    State(state): State<PrintPageState>,
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
    let filter = resolve_filter(&query, today);
    let filtered = filter_invoices(invoices, &filter);

    Ok(report_view(&filtered, today).into_response())
}

fn print_on_load_script() -> Markup {
    html!(
        script
        {
            (PreEscaped("window.addEventListener('load', () => window.print());"))
        }
    )
}

fn receipt_view(invoice: &Invoice) -> Markup {
    html! {
        (DOCTYPE)
        html lang="ur" dir="rtl"
        {
            head
            {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { "Fee Invoice " (invoice.invoice_no) }
                style { (PreEscaped(RECEIPT_STYLE)) }
            }

            body
            {
                div class="sheet"
                {
                    (receipt_copy(invoice, "STUDENT COPY"))
                    (receipt_copy(invoice, "OFFICE COPY"))
                }

                (print_on_load_script())
            }
        }
    }
}

fn receipt_copy(invoice: &Invoice, copy_title: &str) -> Markup {
    html! {
        section class="copy"
        {
            div class="copy-tag" { (copy_title) }
            h1 class="school" { (SCHOOL_NAME) }
            p class="address"
            {
                (SCHOOL_ADDRESS) " - " bdi class="num-ltr" { (SCHOOL_PHONE) }
            }

            div class="meta"
            {
                span
                {
                    "انوائس نمبر: " bdi class="num-ltr" { (invoice.invoice_no) }
                }
                span class="meta-title" { "فیس رسید" }
                span
                {
                    "تاریخ: " bdi class="num-ltr" { (format_date_dmy(invoice.date)) }
                }
            }

            table class="mini"
            {
                tr
                {
                    th { "طالب علم" }
                    th { "والد" }
                    th { "کلاس" }
                }
                tr
                {
                    td { (non_empty_or_dash(&invoice.student_name)) }
                    td { (non_empty_or_dash(&invoice.father_name)) }
                    td { (non_empty_or_dash(&invoice.class_name)) }
                }
            }

            table class="items"
            {
                tr
                {
                    th class="sno" { "نمبر شمار" }
                    th { "تفصیل" }
                    th class="amt" { "رقم" }
                }

                @for row in 0..RECEIPT_ITEM_ROWS.max(invoice.items.len()) {
                    @let item = invoice.items.get(row);

                    tr
                    {
                        td { @if item.is_some() { ((row + 1)) } }
                        td { @if let Some(item) = item { (item.label) } }
                        td { @if let Some(item) = item { (format_amount(item.amount)) } }
                    }
                }
            }

            div class="bottom"
            {
                div class="notes"
                {
                    @if copy_title != "OFFICE COPY" {
                        p { strong { "وصول کنندہ:" } " __________" }
                    }
                }

                table class="totals"
                {
                    tr { th { "کل" } td { (format_amount(invoice.total_amount)) } }
                    tr { th { "وصول" } td { (format_amount(invoice.amount_received)) } }
                    tr { th { "بقایا" } td { (format_amount(invoice.remaining_amount)) } }
                }
            }

            div class="footer-note" { "یہ کمپیوٹر سے تیار کردہ رسید ہے" }
        }
    }
}

fn non_empty_or_dash(text: &str) -> &str {
    if text.is_empty() { "-" } else { text }
}

fn report_view(invoices: &[Invoice], today: Date) -> Markup {
    let total_billed: i64 = invoices.iter().map(|invoice| invoice.total_amount).sum();
    let total_collected: i64 = invoices.iter().map(|invoice| invoice.amount_received).sum();
    let total_remaining: i64 = invoices.iter().map(|invoice| invoice.remaining_amount).sum();

    html! {
        (DOCTYPE)
        html lang="en"
        {
            head
            {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { "Payment History Report" }
                style { (PreEscaped(REPORT_STYLE)) }
            }

            body
            {
                div class="head"
                {
                    h1 { "Payment History Report" }
                    div class="meta"
                    {
                        "Generated on: " (format_date_dmy(today))
                        br;
                        "Records: " (invoices.len())
                    }
                }

                div class="summary"
                {
                    (summary_card("Total Billed", &format_amount(total_billed)))
                    (summary_card("Total Collected", &format_amount(total_collected)))
                    (summary_card("Total Remaining", &format_amount(total_remaining)))
                    (summary_card("Total Invoices", &invoices.len().to_string()))
                }

                @if invoices.is_empty() {
                    div class="empty" { "No records found for current filters." }
                } @else {
                    table
                    {
                        thead
                        {
                            tr
                            {
                                th { "Invoice" }
                                th { "Date" }
                                th { "Student" }
                                th { "Father" }
                                th { "Class" }
                                th { "Items" }
                                th { "Total" }
                                th { "Received" }
                                th { "Remaining" }
                            }
                        }

                        tbody
                        {
                            @for invoice in invoices {
                                (report_row(invoice))
                            }
                        }
                    }
                }

                (print_on_load_script())
            }
        }
    }
}

fn summary_card(label: &str, value: &str) -> Markup {
    html! {
        div class="summary-card"
        {
            div class="label" { (label) }
            div class="value" { (value) }
        }
    }
}

fn report_row(invoice: &Invoice) -> Markup {
    let items = if invoice.items.is_empty() {
        "-".to_owned()
    } else {
        invoice
            .items
            .iter()
            .map(|item| format!("{} ({})", non_empty_or_dash(&item.label), item.amount))
            .collect::<Vec<_>>()
            .join(", ")
    };

    html! {
        tr
        {
            td class="mono" { (invoice.invoice_no) }
            td class="mono" { (format_date_dmy(invoice.date)) }
            td { (non_empty_or_dash(&invoice.student_name)) }
            td { (non_empty_or_dash(&invoice.father_name)) }
            td { (non_empty_or_dash(&invoice.class_name)) }
            td class="items-full" { (items) }
            td class="num" { (format_amount(invoice.total_amount)) }
            td class="num" { (format_amount(invoice.amount_received)) }
            td class="num" { (format_amount(invoice.remaining_amount)) }
        }
    }
}

const RECEIPT_STYLE: &str = r#"
* { box-sizing: border-box; }
body {
    margin: 0;
    font-family: "Jameel Noori Nastaleeq", "Noto Nastaliq Urdu", "Noto Naskh Arabic", Tahoma, sans-serif;
    color: #111;
}
.sheet {
    display: grid;
    grid-template-columns: 1fr 1fr;
    gap: 18px;
    padding: 10px;
    position: relative;
}
.sheet::after {
    content: "";
    position: absolute;
    top: 10px;
    bottom: 10px;
    left: 50%;
    transform: translateX(-50%);
    border-left: 1px dashed #666;
    pointer-events: none;
}
.copy { border: 1px solid #222; padding: 10px; min-height: 96vh; position: relative; }
.copy-tag {
    border: 1px solid #111;
    padding: 2px 10px;
    font-size: 8px;
    width: fit-content;
    margin: 0 auto 6px;
    direction: ltr;
    text-align: center;
    font-family: "Segoe UI", Tahoma, sans-serif;
    font-weight: 700;
}
.school { margin: 18px 0 2px; text-align: center; font-size: 40px; line-height: 1.2; }
.address { margin: 0 0 10px; text-align: center; font-size: 18px; font-weight: 700; line-height: 1.2; }
.meta {
    display: grid;
    grid-template-columns: 1fr auto 1fr;
    align-items: center;
    font-size: 18px;
    margin-bottom: 8px;
    border-top: 1px solid #111;
    border-bottom: 1px solid #111;
    padding: 6px 0;
}
.meta span:first-child { text-align: right; }
.meta span:last-child { text-align: left; }
.meta-title { text-align: center; font-weight: 700; }
.num-ltr { direction: ltr; unicode-bidi: isolate; }
table { width: 100%; border-collapse: collapse; }
th, td { border: 1px solid #111; padding: 6px 8px; text-align: center; font-size: 24px; line-height: 1.25; }
.mini { margin-bottom: 10px; }
.items { direction: rtl; }
.mini th,
.items th { background: #f4f4f4; }
.items tr { height: 48px; }
.items .sno { width: 56px; text-align: center; }
.items .amt { width: 120px; text-align: center; }
.items td:nth-child(2), .items th:nth-child(2) { text-align: right; }
.bottom { margin-top: 10px; display: grid; grid-template-columns: 1fr 220px; gap: 10px; align-items: end; }
.notes p { margin: 2px 0; font-size: 21px; }
.totals th { text-align: right; background: #f4f4f4; }
.totals td { width: 90px; font-weight: 700; }
.footer-note { margin-top: 14px; font-size: 17px; text-align: center; }
@media print {
    @page { size: A5 landscape; margin: 4mm; }
    body {
        font-size: 12px;
        -webkit-print-color-adjust: exact;
        print-color-adjust: exact;
    }
    .sheet { padding: 0; gap: 4mm; align-items: stretch; }
    .sheet::after { top: 0; bottom: 0; border-left: 0.4mm dashed #555; }
    .copy {
        min-height: 0;
        height: 137mm;
        padding: 3mm;
        break-inside: avoid;
        overflow: hidden;
        display: flex;
        flex-direction: column;
    }
    .copy-tag { font-size: 9px; margin-bottom: 3px; padding: 1px 8px; }
    .school { font-size: 28px; margin: 4px 0 0; line-height: 1.1; }
    .address { font-size: 14px; margin: 0 0 5px; line-height: 1.1; }
    .meta { font-size: 12px; padding: 4px 0; margin-bottom: 6px; }
    th, td { font-size: 12px; padding: 3px 4px; line-height: 1.15; }
    .mini { margin-bottom: 6px; }
    .items tr { height: 22px; }
    .bottom { margin-top: 6px; grid-template-columns: 1fr 128px; gap: 6px; }
    .notes p { margin: 1px 0; font-size: 12px; }
    .totals td { width: 58px; }
    .footer-note { margin-top: 6px; font-size: 11px; }
}
"#;

const REPORT_STYLE: &str = r#"
* { box-sizing: border-box; }
body {
    margin: 0;
    font-family: "Segoe UI", Tahoma, sans-serif;
    color: #111;
    background: #fff;
    padding: 8mm;
}
.head {
    display: flex;
    align-items: flex-start;
    justify-content: space-between;
    gap: 12px;
    margin-bottom: 8px;
    border-bottom: 1px solid #d7dce3;
    padding-bottom: 6px;
}
h1 { margin: 0; font-size: 19px; letter-spacing: 0.01em; }
.meta { color: #5b6470; font-size: 12px; text-align: right; line-height: 1.5; }
.summary {
    display: grid;
    grid-template-columns: repeat(4, minmax(0, 1fr));
    gap: 6px;
    margin: 8px 0 10px;
}
.summary-card {
    border: 1px solid #d7dce3;
    background: #f7f9fc;
    border-radius: 6px;
    padding: 6px 8px;
}
.summary-card .label { font-size: 11px; color: #5b6470; margin-bottom: 2px; }
.summary-card .value { font-size: 15px; font-weight: 700; color: #111827; }
table { width: 100%; border-collapse: collapse; table-layout: fixed; }
th, td {
    border: 1px solid #d7dce3;
    padding: 5px 6px;
    font-size: 11px;
    text-align: left;
    vertical-align: middle;
    overflow-wrap: anywhere;
}
th { background: #edf2f7; font-weight: 700; color: #1f2937; }
.mono { font-family: ui-monospace, SFMono-Regular, Menlo, monospace; }
.num { text-align: right; font-variant-numeric: tabular-nums; }
.items-full { line-height: 1.35; }
th:nth-child(1) { width: 8%; }
th:nth-child(2) { width: 8%; }
th:nth-child(3) { width: 14%; }
th:nth-child(4) { width: 14%; }
th:nth-child(5) { width: 6%; }
th:nth-child(6) { width: 24%; }
th:nth-child(7), th:nth-child(8), th:nth-child(9) { width: 8.6%; }
.empty { margin-top: 16px; border: 1px dashed #aaa; padding: 12px; color: #555; }
@media print {
    @page { size: A4 landscape; margin: 8mm; }
    body { padding: 0; }
}
"#;
