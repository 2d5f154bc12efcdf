//! Defines the core data model and database queries for expenditures.

use rusqlite::{Connection, Row, params};
use time::{Date, OffsetDateTime};

use crate::Error;

/// The ID of an expenditure row.
pub type ExpenditureId = i64;

/// A single expenditure, independent of any invoice.
#[derive(Debug, Clone, PartialEq)]
pub struct Expenditure {
    /// The ID of the expenditure.
    pub id: ExpenditureId,
    /// When the money was spent.
    pub date: Date,
    /// What the money was spent on.
    pub title: String,
    /// The amount spent in whole currency units, always positive.
    pub amount: i64,
    /// Free-form notes.
    pub notes: String,
    /// When the record was created.
    pub created_at: OffsetDateTime,
    /// When the record was last edited.
    pub updated_at: OffsetDateTime,
}

/// The validated fields for an expenditure that has not been committed yet.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenditureDraft {
    /// When the money was spent.
    pub date: Date,
    /// What the money was spent on.
    pub title: String,
    /// The amount spent, already normalized and positive.
    pub amount: i64,
    /// Free-form notes.
    pub notes: String,
}

/// Create the expenditure table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_expenditure_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS expenditure (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                date TEXT NOT NULL,
                title TEXT NOT NULL,
                amount INTEGER NOT NULL CHECK (amount > 0),
                notes TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
                )",
        (),
    )?;

    Ok(())
}

/// Map a database row to an [Expenditure].
pub fn map_expenditure_row(row: &Row) -> Result<Expenditure, rusqlite::Error> {
    Ok(Expenditure {
        id: row.get(0)?,
        date: row.get(1)?,
        title: row.get(2)?,
        amount: row.get(3)?,
        notes: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

const EXPENDITURE_COLUMNS: &str = "id, date, title, amount, notes, created_at, updated_at";

/// Commit a new expenditure.
///
/// # Errors
/// This function will return a [Error::SqlError] if the insert fails.
pub fn create_expenditure(
    draft: ExpenditureDraft,
    connection: &Connection,
) -> Result<Expenditure, Error> {
    let now = OffsetDateTime::now_utc();

    let expenditure = connection
        .prepare(&format!(
            "INSERT INTO expenditure (date, title, amount, notes, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             RETURNING {EXPENDITURE_COLUMNS}"
        ))?
        .query_one(
            params![draft.date, draft.title, draft.amount, draft.notes, now, now],
            map_expenditure_row,
        )?;

    Ok(expenditure)
}

/// Replace the fields of a committed expenditure and bump its update
/// timestamp.
///
/// # Errors
/// This function will return a:
/// - [Error::UpdateMissingExpenditure] if `id` does not refer to a committed
///   expenditure,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_expenditure(
    id: ExpenditureId,
    draft: ExpenditureDraft,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE expenditure
        SET \
            date = ?1, \
            title = ?2, \
            amount = ?3, \
            notes = ?4, \
            updated_at = ?5 \
        WHERE id = ?6;",
        params![
            draft.date,
            draft.title,
            draft.amount,
            draft.notes,
            OffsetDateTime::now_utc(),
            id,
        ],
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingExpenditure);
    }

    Ok(())
}

/// Delete a committed expenditure.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingExpenditure] if `id` does not refer to a committed
///   expenditure,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_expenditure(id: ExpenditureId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM expenditure WHERE id = ?1", params![id])?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingExpenditure);
    }

    Ok(())
}

/// Retrieve an expenditure by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid expenditure,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_expenditure(id: ExpenditureId, connection: &Connection) -> Result<Expenditure, Error> {
    let expenditure = connection
        .prepare(&format!(
            "SELECT {EXPENDITURE_COLUMNS} FROM expenditure WHERE id = :id"
        ))?
        .query_one(&[(":id", &id)], map_expenditure_row)?;

    Ok(expenditure)
}

/// Retrieve every expenditure, newest first.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_all_expenditures(connection: &Connection) -> Result<Vec<Expenditure>, Error> {
    connection
        .prepare(&format!(
            "SELECT {EXPENDITURE_COLUMNS} FROM expenditure ORDER BY date DESC, created_at DESC"
        ))?
        .query_map([], map_expenditure_row)?
        .collect::<Result<_, _>>()
        .map_err(Error::from)
}

#[cfg(test)]
pub(crate) fn test_expenditure_draft(title: &str, amount: i64, date: Date) -> ExpenditureDraft {
    ExpenditureDraft {
        date,
        title: title.to_owned(),
        amount,
        notes: "".to_owned(),
    }
}

#[cfg(test)]
mod database_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{Error, db::initialize};

    use super::{
        ExpenditureDraft, create_expenditure, delete_expenditure, get_all_expenditures,
        get_expenditure, test_expenditure_draft, update_expenditure,
    };

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    #[test]
    fn create_round_trips_expenditure() {
        let conn = get_test_connection();
        let draft = test_expenditure_draft("بجلی کا بل", 1500, date!(2025 - 03 - 05));

        let created = create_expenditure(draft, &conn).unwrap();
        let fetched = get_expenditure(created.id, &conn).unwrap();

        assert_eq!(created, fetched);
        assert_eq!(fetched.title, "بجلی کا بل");
        assert_eq!(fetched.amount, 1500);
    }

    #[test]
    fn update_bumps_updated_at_only() {
        let conn = get_test_connection();
        let created = create_expenditure(
            test_expenditure_draft("بجلی کا بل", 1500, date!(2025 - 03 - 05)),
            &conn,
        )
        .unwrap();
        let new_draft = ExpenditureDraft {
            date: date!(2025 - 03 - 06),
            title: "گیس کا بل".to_owned(),
            amount: 900,
            notes: "مارچ".to_owned(),
        };

        update_expenditure(created.id, new_draft, &conn).unwrap();

        let updated = get_expenditure(created.id, &conn).unwrap();
        assert_eq!(updated.title, "گیس کا بل");
        assert_eq!(updated.amount, 900);
        assert_eq!(updated.notes, "مارچ");
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);
    }

    #[test]
    fn update_fails_on_missing_expenditure() {
        let conn = get_test_connection();

        let result = update_expenditure(
            42,
            test_expenditure_draft("بجلی کا بل", 1500, date!(2025 - 03 - 05)),
            &conn,
        );

        assert_eq!(result, Err(Error::UpdateMissingExpenditure));
    }

    #[test]
    fn delete_removes_expenditure() {
        let conn = get_test_connection();
        let created = create_expenditure(
            test_expenditure_draft("بجلی کا بل", 1500, date!(2025 - 03 - 05)),
            &conn,
        )
        .unwrap();

        delete_expenditure(created.id, &conn).unwrap();

        assert_eq!(get_expenditure(created.id, &conn), Err(Error::NotFound));
        assert_eq!(
            delete_expenditure(created.id, &conn),
            Err(Error::DeleteMissingExpenditure)
        );
    }

    #[test]
    fn get_all_orders_by_date_then_creation() {
        let conn = get_test_connection();
        let older = create_expenditure(
            test_expenditure_draft("چاک", 100, date!(2025 - 03 - 01)),
            &conn,
        )
        .unwrap();
        let newer = create_expenditure(
            test_expenditure_draft("بجلی کا بل", 1500, date!(2025 - 03 - 05)),
            &conn,
        )
        .unwrap();

        assert_eq!(get_all_expenditures(&conn).unwrap(), vec![newer, older]);
    }
}
