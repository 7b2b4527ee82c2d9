//! Add command handler.

use crate::args::AddArgs;
use crate::commands::{LedgerRow, Out};
use crate::model::NewEntry;
use crate::session::Session;
use crate::{Config, Result};

/// Records a new transaction and rewrites the ledger file.
///
/// The amount from `args` is a magnitude; the direction decides whether it is stored as a positive
/// (income) or a negative (expense) amount. The category, and the account when the ledger has an
/// account column, must be one of the values listed in the configuration.
///
/// # Errors
/// - Returns a validation error if the description is blank, the amount is not greater than zero
///   or the category or account is unknown.
/// - Returns a storage error if the ledger file cannot be read or written.
pub async fn add(config: Config, args: AddArgs) -> Result<Out<LedgerRow>> {
    let currency = config.currency().to_string();
    let mut session = Session::open(config).await?;
    let entry = NewEntry {
        description: args.description().to_string(),
        magnitude: args.amount().value(),
        direction: args.direction(),
        category: args.category().to_string(),
        account: args.account().map(str::to_string),
    };
    let (row, transaction) = match args.date() {
        Some(date) => session.record_on(entry, date).await?,
        None => session.record(entry).await?,
    };
    let added = LedgerRow::new(row, transaction);
    let message = format!("Added row {row}: {}", added.describe(&currency));
    Ok(Out::new(message, added))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{error_type, ErrorType};
    use crate::model::{Amount, Direction, RowId, Schema};
    use crate::test::TestEnv;
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn args(amount: &str, direction: Direction, account: Option<&str>) -> AddArgs {
        AddArgs::new(
            "Weekly shop",
            Amount::from_str(amount).unwrap(),
            direction,
            "food",
            account.map(str::to_string),
            NaiveDate::from_ymd_opt(2025, 5, 17),
        )
    }

    #[tokio::test]
    async fn test_add_expense() {
        let env = TestEnv::new().await;
        let out = add(
            env.config(),
            args("64.10", Direction::Expense, Some("Store Card")),
        )
        .await
        .unwrap();
        let added = out.structure().unwrap();
        assert_eq!(added.row, RowId::new(0));
        assert_eq!(added.transaction.amount().to_string(), "-64.10");
        assert_eq!(added.transaction.category(), "Food");
        assert_eq!(
            out.message(),
            "Added row 0: 2025-05-17 Weekly shop -$64.10 (Food, Store Card)"
        );

        let content = std::fs::read_to_string(env.config().ledger_path()).unwrap();
        assert!(content.ends_with("2025-05-17,Weekly shop,Food,Store Card,-64.10\n"));
    }

    #[tokio::test]
    async fn test_add_requires_account() {
        let env = TestEnv::new().await;
        let err = add(env.config(), args("10", Direction::Income, None))
            .await
            .unwrap_err();
        assert_eq!(error_type(&err), Some(ErrorType::Validation));
    }

    #[tokio::test]
    async fn test_add_without_account_column() {
        let env = TestEnv::with_schema(Schema::V1).await;
        let out = add(env.config(), args("10", Direction::Income, None))
            .await
            .unwrap();
        let added = out.structure().unwrap();
        assert_eq!(added.transaction.account(), None);
        assert_eq!(added.transaction.amount().to_string(), "10.00");
    }

    #[tokio::test]
    async fn test_add_rejects_zero() {
        let env = TestEnv::new().await;
        let err = add(env.config(), args("0", Direction::Expense, Some("Cash/Other")))
            .await
            .unwrap_err();
        assert_eq!(error_type(&err), Some(ErrorType::Validation));
    }
}
