//! Categories group a user's transactions, e.g. 'Groceries' or 'Salary'.

mod db;
mod delete;
mod domain;
mod edit;
mod manage;

pub use db::{
    count_categories, count_transactions_per_category, create_category, create_category_table,
    delete_category, ensure_categories_belong_to_user, get_categories, get_category,
    update_category,
};
pub use delete::delete_category_endpoint;
pub use domain::{Category, CategoryForm, CategoryName};
pub use edit::{get_edit_category_page, update_category_endpoint};
pub use manage::{CategoryState, create_category_endpoint, get_categories_page};
