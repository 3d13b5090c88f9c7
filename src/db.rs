//! Creates the application's database schema.

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};

use crate::{
    auth::create_user_table, invoice::create_invoice_table,
    transaction::create_transaction_table,
};

/// Create the tables for the domain models if they do not already exist.
///
/// All tables are created inside one exclusive transaction, so a partially
/// initialized database is never left behind.
///
/// # Errors
/// Returns an error if any of the tables could not be created.
pub fn initialize(connection: &Connection) -> Result<(), rusqlite::Error> {
    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_user_table(&transaction)?;
    create_transaction_table(&transaction)?;
    create_invoice_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}
