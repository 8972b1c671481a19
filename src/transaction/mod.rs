//! Transaction management for the budgeting application.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and `TransactionBuilder` for creating transactions
//! - Database functions for storing, querying, and managing transactions
//! - View handlers for the add, edit and delete transaction routes
//! - The transaction table shown on the home page

mod core;
mod create;
mod delete;
mod edit;
mod form;
mod list;

pub use core::{
    Transaction, TransactionBuilder, TransactionType, count_transactions, create_transaction,
    create_transaction_table, delete_transaction, get_transaction, get_transactions,
    update_transaction,
};
pub use create::{TransactionState, create_transaction_endpoint, get_new_transaction_page};
pub use delete::delete_transaction_endpoint;
pub use edit::{get_edit_transaction_page, update_transaction_endpoint};
pub use list::{TransactionTableRow, transactions_table};
