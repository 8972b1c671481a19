//! Summaries of a user's transactions for the reports page.

use std::collections::{BTreeMap, HashMap};

use time::{Date, Month};

use crate::{Category, CategoryId, Transaction, TransactionType};

/// The label for expenses that are not in any category.
pub const UNCATEGORIZED_LABEL: &str = "Uncategorized";

/// Income and expense totals over some set of transactions.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Totals {
    pub income: f64,
    pub expenses: f64,
}

impl Totals {
    /// Income minus expenses.
    pub fn net(&self) -> f64 {
        self.income - self.expenses
    }

    fn add(&mut self, transaction: &Transaction) {
        match transaction.transaction_type {
            TransactionType::Expense => self.expenses += transaction.amount,
            TransactionType::Income => self.income += transaction.amount,
        }
    }
}

/// The total spent in one category.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryExpenses {
    pub name: String,
    pub total: f64,
}

/// The totals for one calendar month.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlySummary {
    pub year: i32,
    pub month: Month,
    pub totals: Totals,
}

impl MonthlySummary {
    /// The month and year, e.g. "September 2024".
    pub fn label(&self) -> String {
        format!("{} {}", self.month, self.year)
    }
}

/// Everything shown on the reports page.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub totals: Totals,
    /// Largest total first.
    pub expenses_by_category: Vec<CategoryExpenses>,
    /// Most recent month first.
    pub monthly: Vec<MonthlySummary>,
}

/// Sum `transactions` overall, per category and per month.
///
/// Expenses are grouped by category ID, so categories that share a name get
/// separate rows. An expense in several categories counts toward each of them,
/// so the category totals can add up to more than the total expenses.
pub fn build_report(transactions: &[Transaction], categories: &[Category]) -> Report {
    let category_names: HashMap<CategoryId, &str> = categories
        .iter()
        .map(|category| (category.id, category.name.as_ref()))
        .collect();

    let mut totals = Totals::default();
    // `None` collects expenses without a known category.
    let mut by_category: HashMap<Option<CategoryId>, f64> = HashMap::new();
    let mut by_month: BTreeMap<(i32, u8), Totals> = BTreeMap::new();

    for transaction in transactions {
        totals.add(transaction);
        by_month
            .entry(month_key(transaction.date))
            .or_default()
            .add(transaction);

        if transaction.transaction_type != TransactionType::Expense {
            continue;
        }

        let known_ids: Vec<CategoryId> = transaction
            .category_ids
            .iter()
            .copied()
            .filter(|id| category_names.contains_key(id))
            .collect();

        if known_ids.is_empty() {
            *by_category.entry(None).or_insert(0.0) += transaction.amount;
        } else {
            for id in known_ids {
                *by_category.entry(Some(id)).or_insert(0.0) += transaction.amount;
            }
        }
    }

    let mut category_totals: Vec<(Option<CategoryId>, &str, f64)> = by_category
        .into_iter()
        .map(|(id, total)| {
            let name = id
                .and_then(|id| category_names.get(&id).copied())
                .unwrap_or(UNCATEGORIZED_LABEL);
            (id, name, total)
        })
        .collect();
    category_totals.sort_by(|(a_id, a_name, a_total), (b_id, b_name, b_total)| {
        b_total
            .total_cmp(a_total)
            .then_with(|| a_name.cmp(b_name))
            .then_with(|| a_id.cmp(b_id))
    });

    let expenses_by_category = category_totals
        .into_iter()
        .map(|(_, name, total)| CategoryExpenses {
            name: name.to_owned(),
            total,
        })
        .collect();

    let monthly = by_month
        .into_iter()
        .rev()
        .filter_map(|((year, month), totals)| {
            Some(MonthlySummary {
                year,
                month: Month::try_from(month).ok()?,
                totals,
            })
        })
        .collect();

    Report {
        totals,
        expenses_by_category,
        monthly,
    }
}

fn month_key(date: Date) -> (i32, u8) {
    (date.year(), u8::from(date.month()))
}

#[cfg(test)]
mod tests {
    use time::{Month, macros::date};

    use crate::{Category, CategoryName, Transaction, TransactionType, UserID};

    use super::{
        CategoryExpenses, MonthlySummary, Totals, UNCATEGORIZED_LABEL, build_report,
    };

    fn category(id: i64, name: &str) -> Category {
        Category {
            id,
            name: CategoryName::new_unchecked(name),
            user_id: UserID::new(1),
        }
    }

    fn transaction(
        id: i64,
        amount: f64,
        transaction_type: TransactionType,
        date: time::Date,
        category_ids: Vec<i64>,
    ) -> Transaction {
        Transaction {
            id,
            amount,
            transaction_type,
            date,
            description: format!("transaction {id}"),
            user_id: UserID::new(1),
            category_ids,
        }
    }

    #[test]
    fn empty_report() {
        let report = build_report(&[], &[]);

        assert_eq!(report.totals, Totals::default());
        assert_eq!(report.totals.net(), 0.0);
        assert!(report.expenses_by_category.is_empty());
        assert!(report.monthly.is_empty());
    }

    #[test]
    fn totals_income_and_expenses() {
        let transactions = [
            transaction(1, 100.0, TransactionType::Income, date!(2024 - 09 - 01), vec![]),
            transaction(2, 30.0, TransactionType::Expense, date!(2024 - 09 - 02), vec![]),
            transaction(3, 20.0, TransactionType::Expense, date!(2024 - 09 - 03), vec![]),
        ];

        let report = build_report(&transactions, &[]);

        assert_eq!(
            report.totals,
            Totals {
                income: 100.0,
                expenses: 50.0
            }
        );
        assert_eq!(report.totals.net(), 50.0);
    }

    #[test]
    fn expenses_by_category_counts_each_category_and_skips_income() {
        let categories = [category(1, "Food"), category(2, "Treats")];
        let transactions = [
            transaction(1, 10.0, TransactionType::Expense, date!(2024 - 09 - 01), vec![1]),
            transaction(2, 4.0, TransactionType::Expense, date!(2024 - 09 - 02), vec![1, 2]),
            transaction(3, 5.0, TransactionType::Expense, date!(2024 - 09 - 03), vec![]),
            transaction(4, 500.0, TransactionType::Income, date!(2024 - 09 - 04), vec![2]),
        ];

        let report = build_report(&transactions, &categories);

        assert_eq!(
            report.expenses_by_category,
            vec![
                CategoryExpenses {
                    name: "Food".to_owned(),
                    total: 14.0
                },
                CategoryExpenses {
                    name: UNCATEGORIZED_LABEL.to_owned(),
                    total: 5.0
                },
                CategoryExpenses {
                    name: "Treats".to_owned(),
                    total: 4.0
                },
            ]
        );
    }

    #[test]
    fn categories_with_the_same_name_are_kept_apart() {
        let categories = [category(1, "Food"), category(2, "Food")];
        let transactions = [
            transaction(1, 10.0, TransactionType::Expense, date!(2024 - 09 - 01), vec![1, 2]),
            transaction(2, 3.0, TransactionType::Expense, date!(2024 - 09 - 02), vec![2]),
        ];

        let report = build_report(&transactions, &categories);

        assert_eq!(
            report.expenses_by_category,
            vec![
                CategoryExpenses {
                    name: "Food".to_owned(),
                    total: 13.0
                },
                CategoryExpenses {
                    name: "Food".to_owned(),
                    total: 10.0
                },
            ]
        );
        assert_eq!(report.totals.expenses, 13.0);
    }

    #[test]
    fn category_named_uncategorized_is_not_merged_with_missing_categories() {
        let categories = [category(1, UNCATEGORIZED_LABEL)];
        let transactions = [
            transaction(1, 5.0, TransactionType::Expense, date!(2024 - 09 - 01), vec![1]),
            transaction(2, 5.0, TransactionType::Expense, date!(2024 - 09 - 02), vec![]),
        ];

        let report = build_report(&transactions, &categories);

        assert_eq!(report.expenses_by_category.len(), 2);
        assert!(
            report
                .expenses_by_category
                .iter()
                .all(|row| row.name == UNCATEGORIZED_LABEL && row.total == 5.0)
        );
    }

    #[test]
    fn monthly_breakdown_newest_first() {
        let transactions = [
            transaction(1, 100.0, TransactionType::Income, date!(2024 - 08 - 15), vec![]),
            transaction(2, 30.0, TransactionType::Expense, date!(2024 - 09 - 02), vec![]),
            transaction(3, 20.0, TransactionType::Expense, date!(2023 - 09 - 03), vec![]),
        ];

        let report = build_report(&transactions, &[]);

        assert_eq!(
            report.monthly,
            vec![
                MonthlySummary {
                    year: 2024,
                    month: Month::September,
                    totals: Totals {
                        income: 0.0,
                        expenses: 30.0
                    },
                },
                MonthlySummary {
                    year: 2024,
                    month: Month::August,
                    totals: Totals {
                        income: 100.0,
                        expenses: 0.0
                    },
                },
                MonthlySummary {
                    year: 2023,
                    month: Month::September,
                    totals: Totals {
                        income: 0.0,
                        expenses: 20.0
                    },
                },
            ]
        );
        assert_eq!(report.monthly[0].label(), "September 2024");
    }
}
