use std::{error::Error, path::Path, process::exit};

use clap::Parser;
use rusqlite::Connection;
use time::{Duration, OffsetDateTime};

use pocket_ledger::{
    CategoryName, PasswordHash, Transaction, TransactionType, Username, ValidatedPassword,
    create_category, create_transaction, create_user, initialize_db,
};

/// A utility for creating a test database for Pocket Ledger.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

const DEMO_USERNAME: &str = "demo";
const DEMO_EMAIL: &str = "demo@example.com";
const DEMO_PASSWORD: &str = "password";

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        Some(extension) if !extension.is_empty() => {}
        _ => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let connection = Connection::open(output_path)?;

    initialize_db(&connection)?;

    println!("Creating demo user...");

    let password_hash = PasswordHash::new(
        ValidatedPassword::new_unchecked(DEMO_PASSWORD),
        PasswordHash::DEFAULT_COST,
    )?;
    let user = create_user(
        Username::new(DEMO_USERNAME)?,
        DEMO_EMAIL.parse()?,
        password_hash,
        &connection,
    )?;

    println!("Creating categories...");

    let add_category = |name: &str| {
        create_category(CategoryName::new(name)?, user.id, &connection).map(|category| category.id)
    };
    let groceries = add_category("Groceries")?;
    let rent = add_category("Rent")?;
    let entertainment = add_category("Entertainment")?;
    let salary = add_category("Salary")?;

    println!("Creating transactions...");

    let today = OffsetDateTime::now_utc().date();
    for months_ago in 0..6 {
        let month_start = today - Duration::days(30 * months_ago);

        let transactions = [
            Transaction::build(4200.0, month_start, "Monthly salary")
                .transaction_type(TransactionType::Income)
                .category_ids(vec![salary]),
            Transaction::build(1650.0, month_start - Duration::days(1), "Rent")
                .category_ids(vec![rent]),
            Transaction::build(
                120.0 + 10.0 * months_ago as f64,
                month_start - Duration::days(3),
                "Weekly groceries",
            )
            .category_ids(vec![groceries]),
            Transaction::build(1.82, month_start - Duration::days(5), "Buy Milk")
                .category_ids(vec![groceries]),
            Transaction::build(24.5, month_start - Duration::days(8), "Movie night")
                .category_ids(vec![entertainment, groceries]),
            Transaction::build(15.0, month_start - Duration::days(12), "Parking"),
        ];

        for transaction in transactions {
            create_transaction(transaction, user.id, &connection)?;
        }
    }

    println!("Success! Log in as \"{DEMO_USERNAME}\" with the password \"{DEMO_PASSWORD}\".");

    Ok(())
}
