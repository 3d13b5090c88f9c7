//! Serves archived invoice files.

use axum::{
    extract::{Path, State},
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::{IntoResponse, Response},
};

use crate::{
    Error,
    invoice::{InvoiceState, domain::FileName, storage::InvoiceStorage},
};

/// Read the archived file called `requested_name`.
///
/// Only names that are already sanitized are served, so a request can never
/// reach outside the storage directory.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if the name is not a sanitized name or there is no such file,
/// - or [Error::StorageError] if the file could not be read.
pub async fn retrieve_invoice_file(
    requested_name: &str,
    storage: &InvoiceStorage,
) -> Result<(FileName, Vec<u8>), Error> {
    let file_name = FileName::new(requested_name).map_err(|_| Error::NotFound)?;

    if file_name.as_ref() != requested_name {
        tracing::debug!("refused to serve unsanitized file name \"{requested_name}\"");
        return Err(Error::NotFound);
    }

    let contents = storage.read(&file_name).await?;

    Ok((file_name, contents))
}

/// A route handler that sends an invoice file as an attachment.
pub async fn get_invoice_file(
    State(state): State<InvoiceState>,
    Path(requested_name): Path<String>,
) -> Result<Response, Error> {
    let (file_name, contents) = retrieve_invoice_file(&requested_name, &state.invoice_storage)
        .await
        .inspect_err(|error| match error {
            Error::NotFound => {}
            error => tracing::error!("Could not serve invoice file {requested_name}: {error}"),
        })?;

    Ok((
        [
            (CONTENT_TYPE, "application/octet-stream".to_owned()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        contents,
    )
        .into_response())
}
