//! Database ID type definitions.

/// Alias for the integer type used for mapping to database IDs.
pub type DatabaseID = i64;

/// The ID of a transaction in the ledger.
pub type TransactionID = DatabaseID;

/// The ID of an invoice record in the archive.
pub type InvoiceID = DatabaseID;
