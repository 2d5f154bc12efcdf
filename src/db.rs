//! Creates the application's database schema.

use rusqlite::Connection;

use crate::{
    expenditure::create_expenditure_table,
    invoice::{create_fee_item_table, create_invoice_table},
};

/// Add the tables for the domain models to the database, if they do not
/// exist yet.
///
/// # Errors
/// Returns an error if a table cannot be created or if there is an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), rusqlite::Error> {
    create_invoice_table(connection)?;
    create_fee_item_table(connection)?;
    create_expenditure_table(connection)?;

    Ok(())
}

#[cfg(test)]
mod initialize_tests {
    use rusqlite::Connection;

    use super::initialize;

    #[test]
    fn sql_is_valid() {
        let connection =
            Connection::open_in_memory().expect("Could not initialise in-memory SQLite database");

        assert_eq!(Ok(()), initialize(&connection));
    }

    #[test]
    fn initialize_is_idempotent() {
        let connection = Connection::open_in_memory().unwrap();

        initialize(&connection).unwrap();

        assert_eq!(Ok(()), initialize(&connection));
    }
}
