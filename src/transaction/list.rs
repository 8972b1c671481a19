//! The table of a user's transactions shown on the home page.

use std::collections::HashMap;

use maud::{Markup, html};

use crate::{
    Category, CategoryId, Transaction, TransactionType,
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_DELETE_STYLE, BUTTON_PRIMARY_STYLE, CATEGORY_BADGE_STYLE, LINK_STYLE,
        TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, TABLE_STYLE, format_currency,
    },
};

/// A transaction with its category names resolved, ready for display.
pub struct TransactionTableRow {
    pub description: String,
    pub date: time::Date,
    pub transaction_type: TransactionType,
    pub amount: f64,
    pub category_names: Vec<String>,
    pub edit_url: String,
    pub delete_url: String,
}

impl TransactionTableRow {
    /// Resolve the category names of `transaction` using the user's categories.
    pub fn new(transaction: &Transaction, categories: &HashMap<CategoryId, &Category>) -> Self {
        let category_names = transaction
            .category_ids
            .iter()
            .filter_map(|id| categories.get(id))
            .map(|category| category.name.to_string())
            .collect();

        Self {
            description: transaction.description.clone(),
            date: transaction.date,
            transaction_type: transaction.transaction_type,
            amount: transaction.amount,
            category_names,
            edit_url: format_endpoint(endpoints::EDIT_TRANSACTION_VIEW, transaction.id),
            delete_url: format_endpoint(endpoints::DELETE_TRANSACTION, transaction.id),
        }
    }
}

fn amount_class(transaction_type: TransactionType) -> &'static str {
    match transaction_type {
        TransactionType::Expense => "amount amount-expense",
        TransactionType::Income => "amount amount-income",
    }
}

fn transaction_row_view(row: &TransactionTableRow) -> Markup {
    html! {
        tr class=(TABLE_ROW_STYLE)
        {
            td class=(TABLE_CELL_STYLE) { (row.description) }
            td class=(TABLE_CELL_STYLE) { time datetime=(row.date) { (row.date) } }
            td class=(TABLE_CELL_STYLE) { (row.transaction_type.label()) }
            td class=(TABLE_CELL_STYLE)
            {
                @for name in &row.category_names {
                    span class=(CATEGORY_BADGE_STYLE) { (name) }
                    " "
                }
            }
            td class={ (TABLE_CELL_STYLE) " " (amount_class(row.transaction_type)) }
            {
                (format_currency(row.amount))
            }
            td class=(TABLE_CELL_STYLE)
            {
                a href=(row.edit_url) class=(LINK_STYLE) { "Edit" }
                " "
                a href=(row.delete_url) class=(BUTTON_DELETE_STYLE) { "Delete" }
            }
        }
    }
}

/// The table of transactions, or a prompt to add the first one.
pub fn transactions_table(rows: &[TransactionTableRow]) -> Markup {
    html! {
        @if rows.is_empty() {
            div class="empty-state"
            {
                p { "No transactions yet." }
                a href=(endpoints::NEW_TRANSACTION_VIEW) class=(BUTTON_PRIMARY_STYLE) { "Add Transaction" }
            }
        } @else {
            table class=(TABLE_STYLE)
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Type" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Categories" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Amount" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                    }
                }

                tbody
                {
                    @for row in rows {
                        (transaction_row_view(row))
                    }
                }
            }
        }
    }
}
