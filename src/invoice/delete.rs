//! The endpoint for removing an invoice and its file from the archive.

use std::{path::Path as FilePath, sync::Mutex};

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    Error,
    alert::Alert,
    database_id::InvoiceID,
    invoice::{
        InvoiceState,
        db::{delete_invoice_record, get_invoice},
        storage::InvoiceStorage,
    },
};

/// Remove the file of invoice `invoice_id` and then its record.
///
/// A file that is already missing from disk does not stop the record from
/// being deleted.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingInvoice] if `invoice_id` does not refer to a recorded invoice,
/// - [Error::DatabaseLockError] or [Error::SqlError] if the record cannot be removed.
pub async fn delete_invoice(
    invoice_id: InvoiceID,
    storage: &InvoiceStorage,
    db_connection: &Mutex<Connection>,
) -> Result<(), Error> {
    let invoice = {
        let connection = db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        get_invoice(invoice_id, &connection).map_err(|error| match error {
            Error::NotFound => Error::DeleteMissingInvoice,
            error => error,
        })?
    };

    storage.remove(FilePath::new(&invoice.file_path)).await;

    let connection = db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    delete_invoice_record(invoice_id, &connection)
}

/// A route handler for deleting an invoice, responds with an alert.
pub async fn delete_invoice_endpoint(
    State(state): State<InvoiceState>,
    Path(invoice_id): Path<InvoiceID>,
) -> Response {
    match delete_invoice(invoice_id, &state.invoice_storage, &state.db_connection).await {
        // The status code has to be 200 OK or htmx will not remove the table row.
        Ok(()) => {
            tracing::info!("Deleted invoice {invoice_id}");
            Alert::SuccessSimple {
                message: "Invoice deleted successfully".to_owned(),
            }
            .into_response()
        }
        Err(Error::DeleteMissingInvoice) => Error::DeleteMissingInvoice.into_alert_response(),
        Err(error) => {
            tracing::error!("Could not delete invoice {invoice_id}: {error}");
            error.into_alert_response()
        }
    }
}
