//! Defines the core data models and database queries for transactions.

use std::{collections::HashMap, fmt::Display, str::FromStr};

use rusqlite::{
    Connection, Row, ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    CategoryId, Error, TransactionId, UserID, category::ensure_categories_belong_to_user,
};

// ============================================================================
// MODELS
// ============================================================================

/// Whether money was spent or earned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money spent.
    #[default]
    Expense,
    /// Money earned.
    Income,
}

impl TransactionType {
    /// The value used in forms and the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Expense => "expense",
            TransactionType::Income => "income",
        }
    }

    /// The human readable name.
    pub fn label(&self) -> &'static str {
        match self {
            TransactionType::Expense => "Expense",
            TransactionType::Income => "Income",
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "expense" => Ok(TransactionType::Expense),
            "income" => Ok(TransactionType::Income),
            other => Err(Error::InvalidTransactionType(other.to_owned())),
        }
    }
}

impl ToSql for TransactionType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let text = value.as_str()?;

        text.parse()
            .map_err(|error: Error| FromSqlError::Other(Box::new(error)))
    }
}

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The amount of money spent or earned, always greater than zero.
    pub amount: f64,
    /// Whether the money was spent or earned.
    pub transaction_type: TransactionType,
    /// When the transaction happened.
    pub date: Date,
    /// A text description of what the transaction was for.
    pub description: String,
    /// The user that recorded the transaction.
    pub user_id: UserID,
    /// The categories the transaction is filed under, in ascending order.
    pub category_ids: Vec<CategoryId>,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(amount: f64, date: Date, description: &str) -> TransactionBuilder {
        TransactionBuilder {
            amount,
            date,
            description: description.to_owned(),
            transaction_type: TransactionType::default(),
            category_ids: Vec::new(),
        }
    }

    /// The amount with the sign of its effect on the user's balance.
    pub fn signed_amount(&self) -> f64 {
        match self.transaction_type {
            TransactionType::Expense => -self.amount,
            TransactionType::Income => self.amount,
        }
    }
}

/// A builder for creating and updating [Transaction]s.
///
/// The builder holds the fields a user can change, so it is used both by
/// [create_transaction] and [update_transaction].
///
/// ```ignore
/// let builder = Transaction::build(1.82, date!(2024 - 09 - 19), "Buy Milk")
///     .transaction_type(TransactionType::Expense)
///     .category_ids(vec![1]);
/// let transaction = create_transaction(builder, user_id, &connection)?;
/// ```
#[derive(Debug, PartialEq, Clone)]
pub struct TransactionBuilder {
    /// The amount of money spent or earned. Must be greater than zero.
    pub amount: f64,

    /// The date when the transaction occurred.
    pub date: Date,

    /// A human-readable description of the transaction, e.g. "Buy Milk".
    pub description: String,

    /// Defaults to [TransactionType::Expense].
    pub transaction_type: TransactionType,

    /// The IDs of the user's categories to file the transaction under.
    pub category_ids: Vec<CategoryId>,
}

impl TransactionBuilder {
    /// Set whether the transaction is an expense or income.
    pub fn transaction_type(mut self, transaction_type: TransactionType) -> Self {
        self.transaction_type = transaction_type;
        self
    }

    /// Set the categories for the transaction.
    pub fn category_ids(mut self, category_ids: Vec<CategoryId>) -> Self {
        self.category_ids = category_ids;
        self
    }

    /// Check the amount and description, and sort and deduplicate the category IDs.
    fn validate(mut self) -> Result<Self, Error> {
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(Error::InvalidAmount(self.amount));
        }

        let description = self.description.trim();
        if description.is_empty() {
            return Err(Error::EmptyDescription);
        }
        self.description = description.to_owned();

        self.category_ids.sort_unstable();
        self.category_ids.dedup();

        Ok(self)
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create a new transaction for the user from a builder.
///
/// The transaction row and its category links are written in one SQL transaction.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidAmount] if the amount is not greater than zero,
/// - or [Error::EmptyDescription] if the description is blank,
/// - or [Error::InvalidCategory] if a category ID does not refer to one of the user's categories,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    builder: TransactionBuilder,
    user_id: UserID,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let builder = builder.validate()?;

    let sql_transaction = connection.unchecked_transaction()?;

    ensure_categories_belong_to_user(&builder.category_ids, user_id, &sql_transaction)?;

    let id: TransactionId = sql_transaction
        .prepare(
            "INSERT INTO \"transaction\" (description, amount, transaction_type, date, user_id)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING id",
        )?
        .query_row(
            (
                &builder.description,
                builder.amount,
                builder.transaction_type,
                builder.date,
                user_id.as_i64(),
            ),
            |row| row.get(0),
        )?;

    insert_category_links(id, &builder.category_ids, &sql_transaction)?;

    sql_transaction.commit()?;

    Ok(Transaction {
        id,
        amount: builder.amount,
        transaction_type: builder.transaction_type,
        date: builder.date,
        description: builder.description,
        user_id,
        category_ids: builder.category_ids,
    })
}

/// Retrieve one of the user's transactions by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to one of the user's transactions,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_transaction(
    id: TransactionId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let mut transaction = connection
        .prepare(
            "SELECT id, description, amount, transaction_type, date, user_id
             FROM \"transaction\" WHERE id = :id AND user_id = :user_id",
        )?
        .query_row(
            &[(":id", &id), (":user_id", &user_id.as_i64())],
            map_transaction_row,
        )?;

    transaction.category_ids = connection
        .prepare(
            "SELECT category_id FROM transaction_category
             WHERE transaction_id = ?1 ORDER BY category_id",
        )?
        .query_map([id], |row| row.get(0))?
        .collect::<Result<Vec<CategoryId>, rusqlite::Error>>()?;

    Ok(transaction)
}

/// Get all of the user's transactions, newest first.
///
/// Transactions on the same date are ordered by most recently created.
pub fn get_transactions(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let mut transactions = connection
        .prepare(
            "SELECT id, description, amount, transaction_type, date, user_id
             FROM \"transaction\" WHERE user_id = ?1
             ORDER BY date DESC, id DESC",
        )?
        .query_map([user_id.as_i64()], map_transaction_row)?
        .collect::<Result<Vec<Transaction>, rusqlite::Error>>()?;

    let mut links: HashMap<TransactionId, Vec<CategoryId>> = HashMap::new();
    let mut statement = connection.prepare(
        "SELECT tc.transaction_id, tc.category_id
         FROM transaction_category tc
         INNER JOIN \"transaction\" t ON t.id = tc.transaction_id
         WHERE t.user_id = ?1
         ORDER BY tc.category_id",
    )?;
    let rows = statement.query_map([user_id.as_i64()], |row| {
        Ok((row.get::<_, TransactionId>(0)?, row.get::<_, CategoryId>(1)?))
    })?;

    for row in rows {
        let (transaction_id, category_id) = row?;
        links.entry(transaction_id).or_default().push(category_id);
    }

    for transaction in &mut transactions {
        if let Some(category_ids) = links.remove(&transaction.id) {
            transaction.category_ids = category_ids;
        }
    }

    Ok(transactions)
}

/// Replace every field of one of the user's transactions and its category set.
///
/// The update is atomic: if any step fails nothing is changed.
///
/// # Errors
/// This function will return a:
/// - [Error::UpdateMissingTransaction] if `id` does not refer to one of the user's transactions,
/// - or the same validation errors as [create_transaction].
pub fn update_transaction(
    id: TransactionId,
    builder: TransactionBuilder,
    user_id: UserID,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let builder = builder.validate()?;

    let sql_transaction = connection.unchecked_transaction()?;

    ensure_categories_belong_to_user(&builder.category_ids, user_id, &sql_transaction)?;

    let rows_affected = sql_transaction.execute(
        "UPDATE \"transaction\"
         SET description = ?1, amount = ?2, transaction_type = ?3, date = ?4
         WHERE id = ?5 AND user_id = ?6",
        (
            &builder.description,
            builder.amount,
            builder.transaction_type,
            builder.date,
            id,
            user_id.as_i64(),
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingTransaction);
    }

    sql_transaction.execute(
        "DELETE FROM transaction_category WHERE transaction_id = ?1",
        [id],
    )?;
    insert_category_links(id, &builder.category_ids, &sql_transaction)?;

    sql_transaction.commit()?;

    Ok(Transaction {
        id,
        amount: builder.amount,
        transaction_type: builder.transaction_type,
        date: builder.date,
        description: builder.description,
        user_id,
        category_ids: builder.category_ids,
    })
}

/// Delete one of the user's transactions and its category links.
///
/// # Errors
/// Returns an [Error::DeleteMissingTransaction] if `id` does not refer to one of the user's transactions.
pub fn delete_transaction(
    id: TransactionId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM \"transaction\" WHERE id = ?1 AND user_id = ?2",
        (id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingTransaction);
    }

    Ok(())
}

/// Get the number of transactions the user has.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn count_transactions(user_id: UserID, connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row(
            "SELECT COUNT(id) FROM \"transaction\" WHERE user_id = ?1;",
            [user_id.as_i64()],
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}

/// Create the transaction table and the transaction-category link table.
///
/// # Errors
/// Returns an error if the tables cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
            id INTEGER PRIMARY KEY,
            description TEXT NOT NULL,
            amount REAL NOT NULL CHECK (amount > 0),
            transaction_type TEXT NOT NULL CHECK (transaction_type IN ('expense', 'income')),
            date TEXT NOT NULL,
            user_id INTEGER NOT NULL,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_transaction_user_date ON \"transaction\"(user_id, date);

        CREATE TABLE IF NOT EXISTS transaction_category (
            transaction_id INTEGER NOT NULL,
            category_id INTEGER NOT NULL,
            PRIMARY KEY(transaction_id, category_id),
            FOREIGN KEY(transaction_id) REFERENCES \"transaction\"(id) ON DELETE CASCADE,
            FOREIGN KEY(category_id) REFERENCES category(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_transaction_category_category
            ON transaction_category(category_id);",
    )?;

    Ok(())
}

fn insert_category_links(
    transaction_id: TransactionId,
    category_ids: &[CategoryId],
    connection: &Connection,
) -> Result<(), rusqlite::Error> {
    let mut statement = connection.prepare(
        "INSERT INTO transaction_category (transaction_id, category_id) VALUES (?1, ?2)",
    )?;

    for &category_id in category_ids {
        statement.execute((transaction_id, category_id))?;
    }

    Ok(())
}

/// Map a database row to a Transaction without its category IDs.
fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id = row.get(0)?;
    let description = row.get(1)?;
    let amount = row.get(2)?;
    let transaction_type = row.get(3)?;
    let date = row.get(4)?;
    let user_id = UserID::new(row.get(5)?);

    Ok(Transaction {
        id,
        amount,
        transaction_type,
        date,
        description,
        user_id,
        category_ids: Vec::new(),
    })
}

// ============================================================================
// TESTS
// ============================================================================
