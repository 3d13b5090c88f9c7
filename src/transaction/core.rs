//! Defines the core data models and database queries for the ledger.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    Connection, Row,
    types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{Error, database_id::TransactionID};

// ============================================================================
// MODELS
// ============================================================================

/// Whether money was earned or spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    /// The name used in forms, the database and exported files.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }
}

impl FromStr for TransactionType {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim() {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            other => Err(Error::InvalidTransactionType(other.to_owned())),
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ToSql for TransactionType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: Error| FromSqlError::Other(Box::new(error)))
    }
}

/// An income or expense recorded in the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionID,
    /// Whether the money was earned or spent.
    pub type_: TransactionType,
    /// The amount of money earned or spent.
    pub amount: f64,
    /// The VAT included in this transaction, independent of `amount`.
    pub vat: f64,
    /// A text description of what the transaction was for. May be empty.
    pub description: String,
    /// When the transaction happened.
    pub date: Date,
}

/// The validated fields of a transaction that has not been stored yet.
///
/// Build one from user input with [crate::transaction::TransactionForm::parse].
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub type_: TransactionType,
    pub amount: f64,
    pub vat: f64,
    pub description: String,
    pub date: Date,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                type TEXT NOT NULL CHECK (type IN ('income', 'expense')),
                amount REAL NOT NULL,
                vat REAL NOT NULL,
                description TEXT NOT NULL,
                date TEXT NOT NULL
                )",
        (),
    )?;

    Ok(())
}

/// Append a transaction to the ledger.
///
/// # Errors
/// Returns [Error::SqlError] if the insert failed.
pub fn create_transaction(
    transaction: NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(
            "INSERT INTO \"transaction\" (type, amount, vat, description, date)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING id, type, amount, vat, description, date",
        )?
        .query_row(
            (
                transaction.type_,
                transaction.amount,
                transaction.vat,
                transaction.description,
                transaction.date,
            ),
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Overwrite every field of the transaction `id` with `transaction`.
///
/// # Errors
/// This function will return a:
/// - [Error::UpdateMissingTransaction] if `id` does not refer to a stored transaction,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_transaction(
    id: TransactionID,
    transaction: NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    connection
        .prepare(
            "UPDATE \"transaction\"
             SET type = ?1, amount = ?2, vat = ?3, description = ?4, date = ?5
             WHERE id = ?6
             RETURNING id, type, amount, vat, description, date",
        )?
        .query_row(
            (
                transaction.type_,
                transaction.amount,
                transaction.vat,
                transaction.description,
                transaction.date,
                id,
            ),
            map_transaction_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::UpdateMissingTransaction,
            error => error.into(),
        })
}

/// Remove the transaction `id` from the ledger.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingTransaction] if `id` does not refer to a stored transaction,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_transaction(id: TransactionID, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM \"transaction\" WHERE id = :id",
        &[(":id", &id)],
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingTransaction);
    }

    Ok(())
}

/// Retrieve a transaction from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_transaction(id: TransactionID, connection: &Connection) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(
            "SELECT id, type, amount, vat, description, date FROM \"transaction\" WHERE id = :id",
        )?
        .query_row(&[(":id", &id)], map_transaction_row)?;

    Ok(transaction)
}

/// Get every transaction in the order they were stored.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn get_all_transactions(connection: &Connection) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare("SELECT id, type, amount, vat, description, date FROM \"transaction\" ORDER BY id")?
        .query_map([], map_transaction_row)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(Error::from)
}

/// Get the total number of transactions in the database.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn count_transactions(connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM \"transaction\";", [], |row| {
            row.get(0)
        })
        .map_err(|error| error.into())
}

/// Map a database row to a Transaction.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        id: row.get(0)?,
        type_: row.get(1)?,
        amount: row.get(2)?,
        vat: row.get(3)?,
        description: row.get(4)?,
        date: row.get(5)?,
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod database_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{Error, db::initialize};

    use super::{
        NewTransaction, Transaction, TransactionType, count_transactions, create_transaction,
        delete_transaction, get_all_transactions, get_transaction, update_transaction,
    };

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    fn new_transaction(type_: TransactionType, amount: f64, vat: f64) -> NewTransaction {
        NewTransaction {
            type_,
            amount,
            vat,
            description: "Office chair".to_owned(),
            date: date!(2024 - 01 - 15),
        }
    }

    #[test]
    fn create_then_list_returns_record_verbatim() {
        let conn = get_test_connection();

        let created = create_transaction(
            new_transaction(TransactionType::Expense, 120.5, 24.1),
            &conn,
        )
        .unwrap();

        let want = Transaction {
            id: 1,
            type_: TransactionType::Expense,
            amount: 120.5,
            vat: 24.1,
            description: "Office chair".to_owned(),
            date: date!(2024 - 01 - 15),
        };
        assert_eq!(created, want);
        assert_eq!(get_all_transactions(&conn).unwrap(), vec![want]);
    }

    #[test]
    fn list_is_in_storage_order_not_date_order() {
        let conn = get_test_connection();
        let mut later = new_transaction(TransactionType::Income, 1.0, 0.0);
        later.date = date!(2024 - 12 - 31);
        let mut earlier = new_transaction(TransactionType::Income, 2.0, 0.0);
        earlier.date = date!(2024 - 01 - 01);
        create_transaction(later, &conn).unwrap();
        create_transaction(earlier, &conn).unwrap();

        let dates = get_all_transactions(&conn)
            .unwrap()
            .into_iter()
            .map(|transaction| transaction.date)
            .collect::<Vec<_>>();

        assert_eq!(dates, vec![date!(2024 - 12 - 31), date!(2024 - 01 - 01)]);
    }

    #[test]
    fn update_overwrites_all_fields() {
        let conn = get_test_connection();
        let created =
            create_transaction(new_transaction(TransactionType::Expense, 10.0, 2.0), &conn)
                .unwrap();
        let replacement = NewTransaction {
            type_: TransactionType::Income,
            amount: 99.0,
            vat: 19.0,
            description: "Consulting".to_owned(),
            date: date!(2024 - 02 - 01),
        };

        let updated = update_transaction(created.id, replacement, &conn).unwrap();

        assert_eq!(updated, get_transaction(created.id, &conn).unwrap());
        assert_eq!(updated.type_, TransactionType::Income);
        assert_eq!(updated.amount, 99.0);
        assert_eq!(updated.vat, 19.0);
        assert_eq!(updated.description, "Consulting");
        assert_eq!(updated.date, date!(2024 - 02 - 01));
    }

    #[test]
    fn update_missing_transaction_fails() {
        let conn = get_test_connection();

        let result = update_transaction(
            42,
            new_transaction(TransactionType::Income, 1.0, 0.0),
            &conn,
        );

        assert_eq!(result, Err(Error::UpdateMissingTransaction));
    }

    #[test]
    fn delete_then_edit_gives_not_found() {
        let conn = get_test_connection();
        let created =
            create_transaction(new_transaction(TransactionType::Expense, 10.0, 2.0), &conn)
                .unwrap();

        delete_transaction(created.id, &conn).unwrap();
        let result = update_transaction(
            created.id,
            new_transaction(TransactionType::Expense, 11.0, 2.0),
            &conn,
        );

        assert_eq!(result, Err(Error::UpdateMissingTransaction));
        assert_eq!(get_transaction(created.id, &conn), Err(Error::NotFound));
    }

    #[test]
    fn double_delete_gives_not_found() {
        let conn = get_test_connection();
        let created =
            create_transaction(new_transaction(TransactionType::Expense, 10.0, 2.0), &conn)
                .unwrap();

        assert_eq!(delete_transaction(created.id, &conn), Ok(()));
        assert_eq!(
            delete_transaction(created.id, &conn),
            Err(Error::DeleteMissingTransaction)
        );
        assert_eq!(
            delete_transaction(created.id, &conn),
            Err(Error::DeleteMissingTransaction)
        );
    }

    #[test]
    fn get_count() {
        let conn = get_test_connection();
        let want_count = 20;
        for i in 1..=want_count {
            create_transaction(
                new_transaction(TransactionType::Income, i as f64, 0.0),
                &conn,
            )
            .expect("Could not create transaction");
        }

        let got_count = count_transactions(&conn).expect("Could not get count");

        assert_eq!(want_count, got_count);
    }

    #[test]
    fn type_is_stored_as_lowercase_text() {
        let conn = get_test_connection();
        create_transaction(new_transaction(TransactionType::Income, 1.0, 0.0), &conn).unwrap();

        let stored: String = conn
            .query_row("SELECT type FROM \"transaction\"", [], |row| row.get(0))
            .unwrap();

        assert_eq!(stored, "income");
    }
}
