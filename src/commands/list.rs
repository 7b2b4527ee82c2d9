//! List command handler.

use crate::args::ListArgs;
use crate::commands::{LedgerRow, Out};
use crate::model::Transaction;
use crate::session::Session;
use crate::{Config, Result};

/// Shows the transactions with the most recent first, together with the row numbers that `update`
/// and `delete` expect.
pub async fn list(config: Config, args: ListArgs) -> Result<Out<Vec<LedgerRow>>> {
    let session = Session::open(config).await?;
    let ledger = session.ledger();
    if ledger.is_empty() {
        return Ok(Out::new("The ledger is empty", Vec::new()));
    }

    let limit = args.limit().unwrap_or(usize::MAX);
    let rows: Vec<LedgerRow> = ledger
        .recent_first()
        .into_iter()
        .take(limit)
        .map(|(row, t)| LedgerRow::new(row, t.clone()))
        .collect();

    let currency = session.config().currency();
    let with_account = ledger.schema().has_accounts();
    let mut table = vec![header(with_account)];
    table.extend(rows.iter().map(|r| cells(r, with_account, currency)));

    let message = format!(
        "Showing {} of {} transactions\n\n{}",
        rows.len(),
        ledger.len(),
        render(&table)
    );
    Ok(Out::new(message, rows))
}

fn header(with_account: bool) -> Vec<String> {
    let mut header = vec!["Row", "Date", "Description", "Category"];
    if with_account {
        header.push("Account");
    }
    header.push("Amount");
    header.into_iter().map(String::from).collect()
}

fn cells(row: &LedgerRow, with_account: bool, currency: &str) -> Vec<String> {
    let t: &Transaction = &row.transaction;
    let mut cells = vec![
        row.row.to_string(),
        t.date().to_string(),
        t.description().to_string(),
        t.category().to_string(),
    ];
    if with_account {
        cells.push(t.account().unwrap_or_default().to_string());
    }
    cells.push(t.amount().display_with(currency));
    cells
}

/// Lays out the cells in columns. The last column, the amount, is right-aligned.
fn render(table: &[Vec<String>]) -> String {
    let columns = table.first().map(Vec::len).unwrap_or_default();
    let widths: Vec<usize> = (0..columns)
        .map(|ix| {
            table
                .iter()
                .map(|row| row[ix].chars().count())
                .max()
                .unwrap_or_default()
        })
        .collect();

    let mut lines = Vec::with_capacity(table.len());
    for row in table {
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .enumerate()
            .map(|(ix, (cell, &width))| {
                if ix + 1 == columns {
                    format!("{cell:>width$}")
                } else {
                    format!("{cell:<width$}")
                }
            })
            .collect();
        lines.push(line.join("  ").trim_end().to_string());
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::AddArgs;
    use crate::commands::add;
    use crate::model::{Amount, Direction, RowId, Schema};
    use crate::test::TestEnv;
    use chrono::NaiveDate;
    use std::str::FromStr;

    async fn add_on(env: &TestEnv, description: &str, amount: &str, day: u32) {
        let args = AddArgs::new(
            description,
            Amount::from_str(amount).unwrap(),
            Direction::Expense,
            "Leisure",
            None,
            NaiveDate::from_ymd_opt(2025, 6, day),
        );
        add(env.config(), args).await.unwrap();
    }

    #[tokio::test]
    async fn test_list_recent_first() {
        let env = TestEnv::with_schema(Schema::V1).await;
        add_on(&env, "Cinema", "15", 3).await;
        add_on(&env, "Concert", "1200", 9).await;
        add_on(&env, "Museum", "8", 3).await;

        let out = list(env.config(), ListArgs::default()).await.unwrap();
        let order: Vec<RowId> = out.structure().unwrap().iter().map(|r| r.row).collect();
        assert_eq!(order, vec![RowId::new(1), RowId::new(2), RowId::new(0)]);

        let expected = "Showing 3 of 3 transactions\n\n\
            Row  Date        Description  Category      Amount\n\
            1    2025-06-09  Concert      Leisure   -$1,200.00\n\
            2    2025-06-03  Museum       Leisure       -$8.00\n\
            0    2025-06-03  Cinema       Leisure      -$15.00";
        assert_eq!(out.message(), expected);
    }

    #[tokio::test]
    async fn test_list_limit() {
        let env = TestEnv::with_schema(Schema::V1).await;
        add_on(&env, "Cinema", "15", 3).await;
        add_on(&env, "Concert", "120", 9).await;
        let out = list(env.config(), ListArgs::new(Some(1))).await.unwrap();
        let rows = out.structure().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].transaction.description(), "Concert");
        assert!(out.message().starts_with("Showing 1 of 2 transactions"));
    }

    #[tokio::test]
    async fn test_list_empty() {
        let env = TestEnv::new().await;
        let out = list(env.config(), ListArgs::default()).await.unwrap();
        assert_eq!(out.message(), "The ledger is empty");
        assert!(out.structure().unwrap().is_empty());
    }
}
