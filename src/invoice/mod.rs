//! The invoice archive.
//!
//! Uploaded files are written to a storage directory under a sanitized name
//! and recorded in the database. This module contains:
//! - The `Invoice` model and the file name sanitizing rules
//! - The storage directory and the database functions for invoice records
//! - View handlers for uploading, listing, downloading and deleting invoices

mod db;
mod delete;
mod domain;
mod download;
mod list;
mod storage;
mod upload;

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use rusqlite::Connection;

use crate::AppState;

pub use db::{count_invoices, create_invoice_table};
pub use delete::delete_invoice_endpoint;
pub use download::get_invoice_file;
pub use list::get_invoices_page;
pub use storage::InvoiceStorage;
pub use upload::{get_new_invoice_page, upload_invoice_endpoint};

/// The state needed to manage the invoice archive.
#[derive(Debug, Clone)]
pub struct InvoiceState {
    /// The database connection for managing invoice records.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The directory invoice files are written to.
    pub invoice_storage: InvoiceStorage,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for InvoiceState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            invoice_storage: state.invoice_storage.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}
