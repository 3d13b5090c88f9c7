//! The page and endpoint for uploading an invoice to the archive.

use std::sync::Mutex;

use axum::{
    body::Bytes,
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;
use time::Date;

use crate::{
    Error, endpoints,
    html::{BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, base, loading_spinner},
    invoice::{
        InvoiceState,
        db::insert_invoice,
        domain::{FileName, Invoice},
        storage::InvoiceStorage,
    },
    navigation::NavBar,
    timezone::local_today,
};

/// Render the invoice upload page.
pub async fn get_new_invoice_page() -> Response {
    let nav_bar = NavBar::new(endpoints::INVOICES_VIEW).into_html();

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            div class="w-full max-w-md space-y-4"
            {
                h1 class="text-xl font-bold" { "Upload Invoice" }

                (upload_form())
            }
        }
    };

    base("Upload Invoice", &content).into_response()
}

fn upload_form() -> Markup {
    html! {
        form
            hx-post=(endpoints::INVOICES_API)
            hx-target-error="#alert-container"
            hx-indicator="#indicator"
            hx-disabled-elt="#submit-button"
            enctype="multipart/form-data"
            class="w-full space-y-4 md:space-y-6"
        {
            div
            {
                label for="file" class=(FORM_LABEL_STYLE) { "Invoice file" }

                input
                    type="file"
                    name="file"
                    id="file"
                    required
                    class="block w-full text-sm text-gray-900 border border-gray-300 rounded
                        cursor-pointer bg-gray-50 dark:text-gray-400 focus:outline-none
                        dark:bg-gray-700 dark:border-gray-600 dark:placeholder-gray-400";
            }

            button type="submit" id="submit-button" class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" id="indicator" { (loading_spinner()) }
                "Upload"
            }
        }
    }
}

/// A route handler for uploading an invoice, redirects to the invoices page on success.
pub async fn upload_invoice_endpoint(
    State(state): State<InvoiceState>,
    multipart: Multipart,
) -> Response {
    let (raw_file_name, contents) = match read_file_field(multipart).await {
        Ok(upload) => upload,
        Err(error) => {
            tracing::debug!("rejected invoice upload: {error}");
            return error.into_alert_response();
        }
    };

    let Some(upload_date) = local_today(&state.local_timezone) else {
        return Error::InvalidTimezoneError(state.local_timezone).into_alert_response();
    };

    match upload_invoice(
        &raw_file_name,
        &contents,
        upload_date,
        &state.invoice_storage,
        &state.db_connection,
    )
    .await
    {
        Ok(invoice) => {
            tracing::info!("Uploaded invoice {} as {}", invoice.id, invoice.file_name);
            (
                HxRedirect(endpoints::INVOICES_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(error) => {
            tracing::debug!("could not upload invoice \"{raw_file_name}\": {error}");
            error.into_alert_response()
        }
    }
}

/// Take the field named "file" from the form as its client-side file name and contents.
async fn read_file_field(mut multipart: Multipart) -> Result<(String, Bytes), Error> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|error| Error::MultipartError(error.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = match field.file_name() {
            Some(file_name) if file_name.trim().is_empty() => return Err(Error::EmptyFileName),
            Some(file_name) => file_name.to_owned(),
            None => return Err(Error::MissingFile),
        };

        let contents = field
            .bytes()
            .await
            .map_err(|error| Error::MultipartError(error.to_string()))?;

        return Ok((file_name, contents));
    }

    Err(Error::MissingFile)
}

/// Store `contents` under the sanitized `raw_file_name` and record it.
///
/// If the record cannot be inserted the new file is removed again, so the
/// directory and the table never disagree about a name.
///
/// # Errors
/// This function will return a:
/// - [Error::EmptyFileName] if nothing is left of the name after sanitizing,
/// - [Error::DuplicateInvoiceFileName] if the name is already taken,
/// - [Error::StorageError] if the file cannot be written,
/// - [Error::DatabaseLockError] or [Error::SqlError] if the record cannot be stored.
pub async fn upload_invoice(
    raw_file_name: &str,
    contents: &[u8],
    upload_date: Date,
    storage: &InvoiceStorage,
    db_connection: &Mutex<Connection>,
) -> Result<Invoice, Error> {
    let file_name = FileName::new(raw_file_name)?;
    let path = storage.write_new(&file_name, contents).await?;

    let inserted = match db_connection.lock() {
        Ok(connection) => insert_invoice(
            &file_name,
            &path.to_string_lossy(),
            upload_date,
            &connection,
        ),
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            Err(Error::DatabaseLockError)
        }
    };

    if inserted.is_err() {
        storage.remove(&path).await;
    }

    inserted
}
