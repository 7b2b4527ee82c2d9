//! The in-memory ledger: an ordered list of transactions plus the sums that are shown to the user.
//!
//! Every aggregate is recomputed from the rows each time it is asked for.

use crate::model::{Amount, Edit, RowId, Schema, Transaction};
use crate::Result;
use anyhow::bail;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// All recorded transactions, in the order they were appended.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Ledger {
    schema: Schema,
    data: Vec<Transaction>,
}

impl Ledger {
    /// Creates an empty ledger.
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            data: Vec::new(),
        }
    }

    /// Creates a ledger holding `data`.
    pub fn from_data(schema: Schema, data: Vec<Transaction>) -> Self {
        Self { schema, data }
    }

    pub fn schema(&self) -> Schema {
        self.schema
    }

    pub fn data(&self) -> &[Transaction] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn get(&self, row: RowId) -> Option<&Transaction> {
        self.data.get(row.index())
    }

    /// Iterates over the rows paired with their ids.
    pub fn rows(&self) -> impl Iterator<Item = (RowId, &Transaction)> {
        self.data
            .iter()
            .enumerate()
            .map(|(ix, t)| (RowId::new(ix), t))
    }

    // -------------------------------------------------------------------------------------------
    // Aggregation
    // -------------------------------------------------------------------------------------------

    /// The sum of all signed amounts.
    pub fn balance(&self) -> Decimal {
        self.data.iter().map(|t| t.amount().value()).sum()
    }

    /// The sum of all positive amounts.
    pub fn income_total(&self) -> Decimal {
        self.data
            .iter()
            .filter(|t| t.is_income())
            .map(|t| t.amount().value())
            .sum()
    }

    /// The sum of all negative amounts, as a magnitude.
    pub fn expense_total(&self) -> Decimal {
        self.data
            .iter()
            .filter(|t| t.is_expense())
            .map(|t| t.amount().magnitude())
            .sum()
    }

    /// The signed sum of every category that appears in the ledger.
    pub fn category_totals(&self) -> BTreeMap<String, Decimal> {
        let mut totals = BTreeMap::new();
        for t in &self.data {
            *totals
                .entry(t.category().to_string())
                .or_insert(Decimal::ZERO) += t.amount().value();
        }
        totals
    }

    /// The magnitude of the expenses of each category. Categories that only have income are left
    /// out.
    pub fn expense_by_category(&self) -> BTreeMap<String, Decimal> {
        let mut totals = BTreeMap::new();
        for t in self.data.iter().filter(|t| t.is_expense()) {
            *totals
                .entry(t.category().to_string())
                .or_insert(Decimal::ZERO) += t.amount().magnitude();
        }
        totals
    }

    /// The signed sum of one category.
    pub fn category_total(&self, category: &str) -> Decimal {
        self.data
            .iter()
            .filter(|t| t.category() == category)
            .map(|t| t.amount().value())
            .sum()
    }

    /// The signed sum of every row whose category is not one of `categories`.
    pub fn total_excluding<S: AsRef<str>>(&self, categories: &[S]) -> Decimal {
        self.data
            .iter()
            .filter(|t| !categories.iter().any(|c| c.as_ref() == t.category()))
            .map(|t| t.amount().value())
            .sum()
    }

    /// The magnitude of the expenses paid with `account`. Zero when the ledger has no account
    /// column.
    pub fn account_spend(&self, account: &str) -> Decimal {
        if !self.schema.has_accounts() {
            return Decimal::ZERO;
        }
        self.data
            .iter()
            .filter(|t| t.is_expense() && t.account() == Some(account))
            .map(|t| t.amount().magnitude())
            .sum()
    }

    /// `account_spend` for every account that appears in the ledger. Empty when the ledger has no
    /// account column.
    pub fn account_spend_totals(&self) -> BTreeMap<String, Decimal> {
        let mut totals = BTreeMap::new();
        if !self.schema.has_accounts() {
            return totals;
        }
        for t in &self.data {
            let Some(account) = t.account() else {
                continue;
            };
            let entry = totals.entry(account.to_string()).or_insert(Decimal::ZERO);
            if t.is_expense() {
                *entry += t.amount().magnitude();
            }
        }
        totals
    }

    /// The rows ordered by date, newest first. Rows that share a date are ordered with the most
    /// recently appended first.
    pub fn recent_first(&self) -> Vec<(RowId, &Transaction)> {
        let mut rows: Vec<(RowId, &Transaction)> = self.rows().collect();
        rows.sort_by(|(a_id, a), (b_id, b)| b.date().cmp(&a.date()).then(b_id.cmp(a_id)));
        rows
    }

    // -------------------------------------------------------------------------------------------
    // Mutation
    // -------------------------------------------------------------------------------------------

    /// Appends a row and returns its id.
    pub fn append(&mut self, transaction: Transaction) -> RowId {
        self.data.push(transaction);
        RowId::new(self.data.len() - 1)
    }

    /// Applies `edit` to the row. The sign of the amount is preserved. On error the row is left
    /// unchanged.
    pub fn update(&mut self, row: RowId, edit: &Edit) -> Result<&Transaction> {
        let len = self.data.len();
        let Some(t) = self.data.get_mut(row.index()) else {
            bail!(not_found(row, len));
        };
        t.edit(edit)?;
        Ok(&*t)
    }

    /// Removes the row and returns it. Rows after it move down by one position.
    pub fn delete(&mut self, row: RowId) -> Result<Transaction> {
        if row.index() >= self.data.len() {
            bail!(not_found(row, self.data.len()));
        }
        Ok(self.data.remove(row.index()))
    }

    /// The signed amounts of all rows, in order.
    pub fn amounts(&self) -> impl Iterator<Item = Amount> + '_ {
        self.data.iter().map(Transaction::amount)
    }
}

fn not_found(row: RowId, len: usize) -> String {
    if len == 0 {
        format!("Row {row} does not exist, the ledger is empty")
    } else {
        format!("Row {row} does not exist, valid rows are 0 to {}", len - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Direction, NewEntry};
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn txn(day: u32, category: &str, account: Option<&str>, amount: &str) -> Transaction {
        Transaction::new(
            NaiveDate::from_ymd_opt(2025, 1, day).unwrap(),
            format!("{category} on {day}"),
            category,
            account.map(str::to_string),
            Amount::new(dec(amount)),
        )
    }

    fn sample() -> Ledger {
        Ledger::from_data(
            Schema::V2,
            vec![
                txn(1, "Salary", Some("Cash/Other"), "3000"),
                txn(2, "Food", Some("Credit Card"), "-45.10"),
                txn(2, "Transport", Some("Debit Card"), "-12.00"),
                txn(5, "Transport", Some("Debit Card"), "80"),
                txn(3, "Food", Some("Credit Card"), "-20.90"),
                txn(4, "Housing", Some("Debit Card"), "-1200"),
            ],
        )
    }

    #[test]
    fn test_balance_is_sum_of_amounts() {
        let ledger = sample();
        let sum: Decimal = ledger.amounts().map(|a| a.value()).sum();
        assert_eq!(ledger.balance(), sum);
        assert_eq!(ledger.balance(), dec("1802.00"));
        assert_eq!(
            ledger.income_total() - ledger.expense_total(),
            ledger.balance()
        );
    }

    #[test]
    fn test_empty_ledger_aggregates() {
        let ledger = Ledger::new(Schema::V2);
        assert_eq!(ledger.balance(), Decimal::ZERO);
        assert!(ledger.category_totals().is_empty());
        assert!(ledger.recent_first().is_empty());
    }

    #[test]
    fn test_category_totals() {
        let totals = sample().category_totals();
        assert_eq!(totals["Food"], dec("-66.00"));
        assert_eq!(totals["Transport"], dec("68.00"));
        assert_eq!(totals["Salary"], dec("3000"));
    }

    #[test]
    fn test_expense_by_category_uses_magnitudes() {
        let totals = sample().expense_by_category();
        assert_eq!(totals["Food"], dec("66.00"));
        assert_eq!(totals["Transport"], dec("12.00"));
        assert!(!totals.contains_key("Salary"));
    }

    #[test]
    fn test_headline_and_remainder() {
        let ledger = sample();
        let headline = ["Salary", "Transport"];
        let parts: Decimal = headline.iter().map(|c| ledger.category_total(c)).sum();
        assert_eq!(ledger.total_excluding(&headline), dec("-1266.00"));
        assert_eq!(parts + ledger.total_excluding(&headline), ledger.balance());
    }

    #[test]
    fn test_account_spend() {
        let ledger = sample();
        assert_eq!(ledger.account_spend("Credit Card"), dec("66.00"));
        // Income on the account does not reduce its spend.
        assert_eq!(ledger.account_spend("Debit Card"), dec("1212.00"));
        assert_eq!(ledger.account_spend("Store Card"), Decimal::ZERO);

        let totals = ledger.account_spend_totals();
        assert_eq!(totals["Cash/Other"], Decimal::ZERO);
        assert_eq!(totals.len(), 3);
    }

    #[test]
    fn test_account_spend_without_account_column() {
        let ledger = Ledger::from_data(Schema::V1, vec![txn(1, "Food", None, "-10")]);
        assert_eq!(ledger.account_spend("Credit Card"), Decimal::ZERO);
        assert!(ledger.account_spend_totals().is_empty());
    }

    #[test]
    fn test_recent_first() {
        let ledger = sample();
        let ids: Vec<usize> = ledger
            .recent_first()
            .iter()
            .map(|(id, _)| id.index())
            .collect();
        assert_eq!(ids, vec![3, 5, 4, 2, 1, 0]);
    }

    #[test]
    fn test_append_returns_row_id() {
        let mut ledger = sample();
        let entry = NewEntry {
            description: "Cinema".to_string(),
            magnitude: dec("30"),
            direction: Direction::Expense,
            category: "Leisure".to_string(),
            account: Some("Store Card".to_string()),
        };
        let t = Transaction::from_entry(&entry, NaiveDate::from_ymd_opt(2025, 1, 9).unwrap())
            .unwrap();
        let id = ledger.append(t);
        assert_eq!(id, RowId::new(6));
        assert_eq!(ledger.get(id).unwrap().amount().value(), dec("-30"));
    }

    #[test]
    fn test_update_preserves_sign() {
        let mut ledger = sample();
        let edit = Edit {
            description: None,
            magnitude: Some(dec("99")),
        };
        let updated = ledger.update(RowId::new(1), &edit).unwrap();
        assert_eq!(updated.amount().value(), dec("-99"));
        let updated = ledger.update(RowId::new(0), &edit).unwrap();
        assert_eq!(updated.amount().value(), dec("99"));
    }

    #[test]
    fn test_update_unknown_row() {
        let mut ledger = sample();
        let edit = Edit {
            description: Some("x".to_string()),
            magnitude: None,
        };
        let err = ledger.update(RowId::new(6), &edit).unwrap_err();
        assert!(err.to_string().contains("valid rows are 0 to 5"));
    }

    #[test]
    fn test_delete_removes_exactly_one_row() {
        let mut ledger = sample();
        let before = ledger.data().to_vec();
        let removed = ledger.delete(RowId::new(2)).unwrap();
        assert_eq!(removed, before[2]);
        assert_eq!(ledger.len(), before.len() - 1);
        let mut expected = before.clone();
        expected.remove(2);
        assert_eq!(ledger.data(), expected.as_slice());
    }

    #[test]
    fn test_delete_unknown_row() {
        let mut ledger = Ledger::new(Schema::V1);
        let err = ledger.delete(RowId::new(0)).unwrap_err();
        assert!(err.to_string().contains("the ledger is empty"));
    }
}
