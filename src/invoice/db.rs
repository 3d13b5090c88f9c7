//! Database queries for invoice records.

use rusqlite::{Connection, Row};
use time::Date;

use crate::{
    Error,
    database_id::InvoiceID,
    invoice::domain::{FileName, Invoice},
};

/// Create the invoice table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_invoice_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS invoice (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                file_name TEXT NOT NULL UNIQUE,
                file_path TEXT NOT NULL,
                upload_date TEXT NOT NULL
                )",
        (),
    )?;

    Ok(())
}

/// Record an invoice whose file has been written to `file_path`.
///
/// # Errors
/// This function will return a:
/// - [Error::DuplicateInvoiceFileName] if an invoice with `file_name` is already recorded,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn insert_invoice(
    file_name: &FileName,
    file_path: &str,
    upload_date: Date,
    connection: &Connection,
) -> Result<Invoice, Error> {
    connection
        .prepare(
            "INSERT INTO invoice (file_name, file_path, upload_date)
             VALUES (?1, ?2, ?3)
             RETURNING id, file_name, file_path, upload_date",
        )?
        .query_row(
            (file_name.as_ref(), file_path, upload_date),
            map_invoice_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
                },
                _,
            ) => Error::DuplicateInvoiceFileName(file_name.to_string()),
            error => error.into(),
        })
}

/// Retrieve an invoice record by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a recorded invoice,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_invoice(id: InvoiceID, connection: &Connection) -> Result<Invoice, Error> {
    connection
        .prepare("SELECT id, file_name, file_path, upload_date FROM invoice WHERE id = :id")?
        .query_row(&[(":id", &id)], map_invoice_row)
        .map_err(Error::from)
}

/// Get every invoice record in the order they were stored.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn get_all_invoices(connection: &Connection) -> Result<Vec<Invoice>, Error> {
    connection
        .prepare("SELECT id, file_name, file_path, upload_date FROM invoice ORDER BY id")?
        .query_map([], map_invoice_row)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(Error::from)
}

/// Remove the record of invoice `id`. The file is left alone.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingInvoice] if `id` does not refer to a recorded invoice,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_invoice_record(id: InvoiceID, connection: &Connection) -> Result<(), Error> {
    let rows_affected =
        connection.execute("DELETE FROM invoice WHERE id = :id", &[(":id", &id)])?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingInvoice);
    }

    Ok(())
}

/// Get the number of invoices in the archive.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn count_invoices(connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM invoice;", [], |row| row.get(0))
        .map_err(Error::from)
}

fn map_invoice_row(row: &Row) -> Result<Invoice, rusqlite::Error> {
    let raw_file_name: String = row.get(1)?;

    Ok(Invoice {
        id: row.get(0)?,
        file_name: FileName::new_unchecked(&raw_file_name),
        file_path: row.get(2)?,
        upload_date: row.get(3)?,
    })
}
