//! The ledger of income and expense transactions.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and the parsing of user input into `NewTransaction`
//! - Database functions for storing, querying, and managing transactions
//! - View handlers for transaction-related web pages and the CSV export

mod core;
mod create;
mod delete;
mod edit;
mod export;
mod form;
mod list;

pub use core::{
    Transaction, TransactionType, count_transactions, create_transaction_table,
    get_all_transactions,
};
pub use create::{create_transaction_endpoint, get_new_transaction_page};
pub use delete::delete_transaction_endpoint;
pub use edit::{edit_transaction_endpoint, get_edit_transaction_page};
pub use export::get_export_transactions;
pub use list::get_transactions_page;

#[cfg(test)]
pub use core::{NewTransaction, create_transaction};
