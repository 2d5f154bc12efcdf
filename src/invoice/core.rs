//! Defines the core data models and database queries for fee invoices.
//!
//! An invoice and its fee items span two tables, and the database is only
//! atomic at the single-row level, so the multi-row write paths here
//! compensate by hand: a failed item write deletes or restores the parent
//! row, and a failed compensation surfaces as [Error::LedgerInconsistent].

use std::collections::HashMap;

use rusqlite::{Connection, Row, params};
use time::{Date, OffsetDateTime};

use crate::{Error, invoice::totals::Totals};

/// The ID of an invoice row.
pub type InvoiceId = i64;

/// A single labelled charge belonging to one invoice, e.g. "Tuition".
///
/// Item order is significant (it is the print and display order) and is
/// persisted via an explicit sort order column.
#[derive(Debug, Clone, PartialEq)]
pub struct FeeItem {
    /// What the charge is for.
    pub label: String,
    /// The charged amount in whole currency units.
    pub amount: i64,
}

/// One committed fee-collection record tied to a student.
///
/// `total_amount`, `amount_received` and `remaining_amount` are derived
/// fields: every mutation path recomputes all three together via
/// [crate::invoice::totals::compute_totals], they are never set
/// independently.
#[derive(Debug, Clone, PartialEq)]
pub struct Invoice {
    /// The ID of the invoice.
    pub id: InvoiceId,
    /// The invoice number shown on the receipt, e.g. "INV-0042".
    pub invoice_no: String,
    /// The payment date.
    pub date: Date,
    /// The student the fee was collected from.
    pub student_name: String,
    /// The student's father's name.
    pub father_name: String,
    /// The student's class.
    pub class_name: String,
    /// The itemised charges, in display order.
    pub items: Vec<FeeItem>,
    /// Sum of the item amounts.
    pub total_amount: i64,
    /// How much of the total was received.
    pub amount_received: i64,
    /// The outstanding amount, never negative.
    pub remaining_amount: i64,
    /// When the record was committed.
    pub created_at: OffsetDateTime,
}

/// The validated fields for an invoice that has not been committed yet.
///
/// A draft only exists client-side as form state; committing it assigns the
/// ID and creation timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceDraft {
    /// The invoice number to commit under.
    pub invoice_no: String,
    /// The payment date.
    pub date: Date,
    /// The student the fee was collected from.
    pub student_name: String,
    /// The student's father's name.
    pub father_name: String,
    /// The student's class.
    pub class_name: String,
    /// The cleaned fee items, in display order.
    pub items: Vec<FeeItem>,
    /// The derived totals for `items`.
    pub totals: Totals,
}

/// Create the invoice table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_invoice_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS invoice (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                invoice_no TEXT NOT NULL,
                date TEXT NOT NULL,
                student_name TEXT NOT NULL,
                father_name TEXT NOT NULL,
                class_name TEXT NOT NULL,
                total_amount INTEGER NOT NULL,
                amount_received INTEGER NOT NULL,
                remaining_amount INTEGER NOT NULL,
                created_at TEXT NOT NULL
                )",
        (),
    )?;

    // Index used by the history page ordering.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_invoice_date ON invoice(date, created_at);",
        (),
    )?;

    Ok(())
}

/// Create the fee item table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_fee_item_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS fee_item (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                invoice_id INTEGER NOT NULL REFERENCES invoice(id),
                item_name TEXT NOT NULL,
                amount INTEGER NOT NULL CHECK (amount >= 0),
                sort_order INTEGER NOT NULL
                )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_fee_item_invoice ON fee_item(invoice_id, sort_order);",
        (),
    )?;

    Ok(())
}

/// Map a database row to an [Invoice] with no items attached yet.
pub fn map_invoice_row(row: &Row) -> Result<Invoice, rusqlite::Error> {
    Ok(Invoice {
        id: row.get(0)?,
        invoice_no: row.get(1)?,
        date: row.get(2)?,
        student_name: row.get(3)?,
        father_name: row.get(4)?,
        class_name: row.get(5)?,
        items: Vec::new(),
        total_amount: row.get(6)?,
        amount_received: row.get(7)?,
        remaining_amount: row.get(8)?,
        created_at: row.get(9)?,
    })
}

const INVOICE_COLUMNS: &str = "id, invoice_no, date, student_name, father_name, class_name, \
     total_amount, amount_received, remaining_amount, created_at";

/// Commit a new invoice and its fee items.
///
/// The invoice row is written first, then the item rows. If the item write
/// fails the invoice row is deleted again so that no half-written record is
/// observable.
///
/// # Errors
/// This function will return a:
/// - [Error::SqlError] if either write fails (after compensation succeeded),
/// - or [Error::LedgerInconsistent] if the item write failed and the
///   compensating delete of the invoice row failed too.
pub fn create_invoice(draft: InvoiceDraft, connection: &Connection) -> Result<Invoice, Error> {
    let created_at = OffsetDateTime::now_utc();

    let mut invoice = connection
        .prepare(&format!(
            "INSERT INTO invoice (invoice_no, date, student_name, father_name, class_name, \
             total_amount, amount_received, remaining_amount, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             RETURNING {INVOICE_COLUMNS}"
        ))?
        .query_one(
            params![
                draft.invoice_no,
                draft.date,
                draft.student_name,
                draft.father_name,
                draft.class_name,
                draft.totals.total,
                draft.totals.received,
                draft.totals.remaining,
                created_at,
            ],
            map_invoice_row,
        )?;

    if let Err(error) = insert_fee_items(invoice.id, &draft.items, connection) {
        if let Err(rollback_error) =
            connection.execute("DELETE FROM invoice WHERE id = ?1", params![invoice.id])
        {
            tracing::error!(
                "could not roll back invoice {} after failed item write: {rollback_error}",
                invoice.id
            );
            return Err(Error::LedgerInconsistent(invoice.id));
        }

        return Err(error);
    }

    invoice.items = draft.items;

    Ok(invoice)
}

/// Replace a committed invoice and all of its fee items.
///
/// The edit is all-or-nothing as far as readers can observe: the invoice
/// row is updated first, and if replacing the items fails the row and its
/// previous items are restored from a snapshot taken up front.
///
/// # Errors
/// This function will return a:
/// - [Error::UpdateMissingInvoice] if `id` does not refer to a committed invoice,
/// - [Error::SqlError] if a write fails (after the rollback succeeded),
/// - or [Error::LedgerInconsistent] if the rollback itself failed.
pub fn update_invoice(
    id: InvoiceId,
    draft: InvoiceDraft,
    connection: &Connection,
) -> Result<(), Error> {
    let previous = match get_invoice(id, connection) {
        Ok(invoice) => invoice,
        Err(Error::NotFound) => return Err(Error::UpdateMissingInvoice),
        Err(error) => return Err(error),
    };

    let rows_affected = connection.execute(
        "UPDATE invoice
        SET \
            invoice_no = ?1, \
            date = ?2, \
            student_name = ?3, \
            father_name = ?4, \
            class_name = ?5, \
            total_amount = ?6, \
            amount_received = ?7, \
            remaining_amount = ?8 \
        WHERE id = ?9;",
        params![
            draft.invoice_no,
            draft.date,
            draft.student_name,
            draft.father_name,
            draft.class_name,
            draft.totals.total,
            draft.totals.received,
            draft.totals.remaining,
            id,
        ],
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingInvoice);
    }

    if let Err(error) = replace_fee_items(id, &draft.items, connection) {
        if let Err(rollback_error) = restore_invoice(&previous, connection) {
            tracing::error!(
                "could not restore invoice {id} after failed item write: {rollback_error}"
            );
            return Err(Error::LedgerInconsistent(id));
        }

        return Err(error);
    }

    Ok(())
}

/// Delete a committed invoice and its fee items.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingInvoice] if `id` does not refer to a committed invoice,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_invoice(id: InvoiceId, connection: &Connection) -> Result<(), Error> {
    connection.execute("DELETE FROM fee_item WHERE invoice_id = ?1", params![id])?;

    let rows_affected = connection.execute("DELETE FROM invoice WHERE id = ?1", params![id])?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingInvoice);
    }

    Ok(())
}

/// Retrieve an invoice with its fee items by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid invoice,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_invoice(id: InvoiceId, connection: &Connection) -> Result<Invoice, Error> {
    let mut invoice = connection
        .prepare(&format!(
            "SELECT {INVOICE_COLUMNS} FROM invoice WHERE id = :id"
        ))?
        .query_one(&[(":id", &id)], map_invoice_row)?;

    invoice.items = get_fee_items(id, connection)?;

    Ok(invoice)
}

/// Retrieve every invoice with its fee items, newest first.
///
/// Results are ordered by payment date descending with the creation
/// timestamp as a tie-break, which is the display order everywhere in the
/// app. Filtering happens in memory on top of this.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_all_invoices(connection: &Connection) -> Result<Vec<Invoice>, Error> {
    let mut invoices: Vec<Invoice> = connection
        .prepare(&format!(
            "SELECT {INVOICE_COLUMNS} FROM invoice ORDER BY date DESC, created_at DESC"
        ))?
        .query_map([], map_invoice_row)?
        .collect::<Result<_, _>>()?;

    let mut items_by_invoice: HashMap<InvoiceId, Vec<FeeItem>> = HashMap::new();
    let mut statement = connection.prepare(
        "SELECT invoice_id, item_name, amount FROM fee_item ORDER BY invoice_id, sort_order",
    )?;
    let rows = statement.query_map([], |row| {
        Ok((
            row.get::<_, InvoiceId>(0)?,
            FeeItem {
                label: row.get(1)?,
                amount: row.get(2)?,
            },
        ))
    })?;

    for row in rows {
        let (invoice_id, item) = row?;
        items_by_invoice.entry(invoice_id).or_default().push(item);
    }

    for invoice in &mut invoices {
        if let Some(items) = items_by_invoice.remove(&invoice.id) {
            invoice.items = items;
        }
    }

    Ok(invoices)
}

/// Retrieve just the invoice numbers of every committed invoice.
///
/// Used to derive the next suggested invoice number without loading the
/// whole ledger.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_invoice_numbers(connection: &Connection) -> Result<Vec<String>, Error> {
    connection
        .prepare("SELECT invoice_no FROM invoice")?
        .query_map([], |row| row.get(0))?
        .collect::<Result<_, _>>()
        .map_err(Error::from)
}

fn get_fee_items(id: InvoiceId, connection: &Connection) -> Result<Vec<FeeItem>, Error> {
    connection
        .prepare(
            "SELECT item_name, amount FROM fee_item WHERE invoice_id = :id ORDER BY sort_order",
        )?
        .query_map(&[(":id", &id)], |row| {
            Ok(FeeItem {
                label: row.get(0)?,
                amount: row.get(1)?,
            })
        })?
        .collect::<Result<_, _>>()
        .map_err(Error::from)
}

fn insert_fee_items(
    id: InvoiceId,
    items: &[FeeItem],
    connection: &Connection,
) -> Result<(), Error> {
    let mut statement = connection.prepare(
        "INSERT INTO fee_item (invoice_id, item_name, amount, sort_order) \
         VALUES (?1, ?2, ?3, ?4)",
    )?;

    for (sort_order, item) in items.iter().enumerate() {
        statement.execute(params![id, item.label, item.amount, sort_order as i64])?;
    }

    Ok(())
}

fn replace_fee_items(
    id: InvoiceId,
    items: &[FeeItem],
    connection: &Connection,
) -> Result<(), Error> {
    connection.execute("DELETE FROM fee_item WHERE invoice_id = ?1", params![id])?;

    insert_fee_items(id, items, connection)
}

/// Put a snapshotted invoice back, fields and items both.
fn restore_invoice(previous: &Invoice, connection: &Connection) -> Result<(), Error> {
    connection.execute(
        "UPDATE invoice
        SET \
            invoice_no = ?1, \
            date = ?2, \
            student_name = ?3, \
            father_name = ?4, \
            class_name = ?5, \
            total_amount = ?6, \
            amount_received = ?7, \
            remaining_amount = ?8 \
        WHERE id = ?9;",
        params![
            previous.invoice_no,
            previous.date,
            previous.student_name,
            previous.father_name,
            previous.class_name,
            previous.total_amount,
            previous.amount_received,
            previous.remaining_amount,
            previous.id,
        ],
    )?;

    replace_fee_items(previous.id, &previous.items, connection)
}

#[cfg(test)]
pub(crate) fn test_draft(invoice_no: &str, date: Date, items: Vec<FeeItem>) -> InvoiceDraft {
    let total = items.iter().map(|item| item.amount).sum();

    InvoiceDraft {
        invoice_no: invoice_no.to_owned(),
        date,
        student_name: "حسن".to_owned(),
        father_name: "اکرم".to_owned(),
        class_name: "جماعت 7".to_owned(),
        items,
        totals: Totals {
            total,
            received: total,
            remaining: 0,
        },
    }
}
