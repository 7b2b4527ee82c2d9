use crate::model::schema::{Column, Mapping};
use crate::model::{Amount, Direction, Schema, MAX_MAGNITUDE};
use crate::Result;
use anyhow::{bail, Context};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::num::ParseIntError;
use std::str::FromStr;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Represents a single row of the ledger.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Transaction {
    date: NaiveDate,
    description: String,
    category: String,
    /// `None` when the ledger schema has no account column.
    #[serde(skip_serializing_if = "Option::is_none")]
    account: Option<String>,
    amount: Amount,
}

impl Transaction {
    /// Creates a transaction from already-validated parts.
    pub fn new(
        date: NaiveDate,
        description: impl Into<String>,
        category: impl Into<String>,
        account: Option<String>,
        amount: Amount,
    ) -> Self {
        Self {
            date,
            description: description.into(),
            category: category.into(),
            account,
            amount,
        }
    }

    /// Builds a transaction from user input, rejecting an empty description or a magnitude that
    /// is not greater than zero. The stored amount is signed by `entry.direction`.
    pub fn from_entry(entry: &NewEntry, date: NaiveDate) -> Result<Self> {
        let description = validate_description(&entry.description)?;
        let magnitude = validate_magnitude(entry.magnitude)?;
        Ok(Self::new(
            date,
            description,
            entry.category.trim(),
            entry.account.as_ref().map(|a| a.trim().to_string()),
            Amount::signed(magnitude, entry.direction),
        ))
    }

    /// Parses one CSV record using the column positions found in the header row. The account is
    /// only read when `schema` has an account column.
    pub(crate) fn from_record(
        schema: Schema,
        mapping: &Mapping,
        record: &csv::StringRecord,
    ) -> Result<Self> {
        let date_str = field(mapping, record, Column::Date).unwrap_or_default();
        let date = parse_date(date_str)?;
        let amount_str = field(mapping, record, Column::Amount).unwrap_or_default();
        let amount = Amount::from_str(amount_str)
            .with_context(|| format!("Invalid amount '{amount_str}'"))?;

        Ok(Self {
            date,
            description: field(mapping, record, Column::Description)
                .unwrap_or_default()
                .to_string(),
            category: field(mapping, record, Column::Category)
                .unwrap_or_default()
                .to_string(),
            account: if schema.has_accounts() {
                Some(
                    field(mapping, record, Column::Account)
                        .unwrap_or_default()
                        .to_string(),
                )
            } else {
                None
            },
            amount,
        })
    }

    /// The values of this transaction in the order of `columns`.
    pub(crate) fn to_record(&self, columns: &[Column]) -> Vec<String> {
        columns
            .iter()
            .map(|column| match column {
                Column::Date => self.date.format(DATE_FORMAT).to_string(),
                Column::Description => self.description.clone(),
                Column::Category => self.category.clone(),
                Column::Account => self.account.clone().unwrap_or_default(),
                Column::Amount => self.amount.to_string(),
            })
            .collect()
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn account(&self) -> Option<&str> {
        self.account.as_deref()
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn is_income(&self) -> bool {
        self.amount.is_positive()
    }

    pub fn is_expense(&self) -> bool {
        self.amount.is_negative()
    }

    /// Replaces the description and/or the magnitude of the amount. The sign of the amount never
    /// changes.
    pub(crate) fn edit(&mut self, edit: &Edit) -> Result<()> {
        if edit.is_empty() {
            bail!("Nothing to update: provide a new description, a new amount, or both");
        }
        let description = edit
            .description
            .as_deref()
            .map(validate_description)
            .transpose()?;
        let magnitude = edit.magnitude.map(validate_magnitude).transpose()?;
        if let Some(description) = description {
            self.description = description;
        }
        if let Some(magnitude) = magnitude {
            self.amount = self.amount.with_magnitude(magnitude);
        }
        Ok(())
    }
}

fn field<'a>(
    mapping: &Mapping,
    record: &'a csv::StringRecord,
    column: Column,
) -> Option<&'a str> {
    mapping.position(column).and_then(|ix| record.get(ix))
}

fn validate_description(description: &str) -> Result<String> {
    let trimmed = description.trim();
    if trimmed.is_empty() {
        bail!("The description must not be empty");
    }
    Ok(trimmed.to_string())
}

fn validate_magnitude(magnitude: Decimal) -> Result<Decimal> {
    if magnitude <= Decimal::ZERO {
        bail!("The amount must be greater than zero, got {magnitude}");
    }
    if magnitude > Decimal::from(MAX_MAGNITUDE) {
        bail!("The amount must not be larger than {MAX_MAGNITUDE}, got {magnitude}");
    }
    Ok(magnitude)
}

/// Parses a ledger date. Timestamps are accepted and truncated to their date.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    let s = s.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, DATE_FORMAT) {
        return Ok(date);
    }
    if let Ok(datetime) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
        return Ok(datetime.date());
    }
    if let Ok(datetime) = DateTime::parse_from_rfc3339(s) {
        return Ok(datetime.date_naive());
    }
    bail!("Invalid date '{s}', expected YYYY-MM-DD")
}

/// The values a user supplies to record a new transaction.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct NewEntry {
    pub description: String,
    /// The positive amount that was typed in.
    pub magnitude: Decimal,
    pub direction: Direction,
    pub category: String,
    pub account: Option<String>,
}

/// The values a user supplies to change an existing transaction.
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Edit {
    pub description: Option<String>,
    pub magnitude: Option<Decimal>,
}

impl Edit {
    pub fn is_empty(&self) -> bool {
        self.description.is_none() && self.magnitude.is_none()
    }
}

/// The position of a row in the ledger, starting at zero.
#[derive(
    Debug, Default, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RowId(usize);

impl RowId {
    pub const fn new(ix: usize) -> Self {
        Self(ix)
    }

    pub fn index(&self) -> usize {
        self.0
    }
}

impl Display for RowId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl FromStr for RowId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(description: &str, magnitude: &str, direction: Direction) -> NewEntry {
        NewEntry {
            description: description.to_string(),
            magnitude: Decimal::from_str(magnitude).unwrap(),
            direction,
            category: "Food".to_string(),
            account: None,
        }
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()
    }

    #[test]
    fn test_from_entry_expense_is_negative() {
        let t = Transaction::from_entry(&entry("Lunch", "25.50", Direction::Expense), day())
            .unwrap();
        assert_eq!(t.amount().value(), Decimal::from_str("-25.50").unwrap());
        assert!(t.is_expense());
        assert_eq!(t.date(), day());
    }

    #[test]
    fn test_from_entry_income_is_positive() {
        let t = Transaction::from_entry(&entry("Pay", "3000", Direction::Income), day()).unwrap();
        assert_eq!(t.amount().value(), Decimal::from(3000));
        assert!(t.is_income());
    }

    #[test]
    fn test_from_entry_rejects_blank_description() {
        let result = Transaction::from_entry(&entry("   ", "1", Direction::Expense), day());
        assert!(result.is_err());
    }

    #[test]
    fn test_from_entry_rejects_non_positive_magnitude() {
        assert!(Transaction::from_entry(&entry("x", "0", Direction::Expense), day()).is_err());
        assert!(Transaction::from_entry(&entry("x", "-3", Direction::Income), day()).is_err());
    }

    #[test]
    fn test_from_entry_rejects_huge_magnitude() {
        let huge = "79228162514264337593543950335";
        assert!(Transaction::from_entry(&entry("x", huge, Direction::Income), day()).is_err());
        let mut t = Transaction::from_entry(&entry("x", "1", Direction::Income), day()).unwrap();
        let edit = Edit {
            description: None,
            magnitude: Some(Decimal::from_str(huge).unwrap()),
        };
        assert!(t.edit(&edit).is_err());
    }

    #[test]
    fn test_record_sign_after_currency() {
        let mapping = Mapping::new(Schema::V1.header_row()).unwrap();
        let record = csv::StringRecord::from(vec!["2025-03-14", "Snack", "Food", "R$ -50.00"]);
        let t = Transaction::from_record(Schema::V1, &mapping, &record).unwrap();
        assert!(t.is_expense());
        assert_eq!(t.amount().value(), Decimal::from(-50));
    }

    #[test]
    fn test_edit_preserves_sign() {
        let mut t =
            Transaction::from_entry(&entry("Taxi", "40", Direction::Expense), day()).unwrap();
        let edit = Edit {
            description: Some("Taxi home".to_string()),
            magnitude: Some(Decimal::from(15)),
        };
        t.edit(&edit).unwrap();
        assert_eq!(t.description(), "Taxi home");
        assert_eq!(t.amount().value(), Decimal::from(-15));
    }

    #[test]
    fn test_failed_edit_changes_nothing() {
        let mut t =
            Transaction::from_entry(&entry("Taxi", "40", Direction::Expense), day()).unwrap();
        let before = t.clone();
        let edit = Edit {
            description: Some("New".to_string()),
            magnitude: Some(Decimal::ZERO),
        };
        assert!(t.edit(&edit).is_err());
        assert_eq!(t, before);
        assert!(t.edit(&Edit::default()).is_err());
    }

    #[test]
    fn test_parse_date_variants() {
        assert_eq!(parse_date("2025-03-14").unwrap(), day());
        assert_eq!(parse_date("2025-03-14 18:22:01").unwrap(), day());
        assert_eq!(parse_date("2025-03-14 18:22:01.123456").unwrap(), day());
        assert_eq!(parse_date("2025-03-14T18:22:01-03:00").unwrap(), day());
        assert!(parse_date("14/03/2025").is_err());
    }

    #[test]
    fn test_record_round_trip_uses_mapping() {
        let mapping =
            Mapping::new(["Amount", "Description", "Account", "Date", "Category"]).unwrap();
        let record =
            csv::StringRecord::from(vec!["-9.99", "Snack", "Credit Card", "2025-03-14", "Food"]);
        let t = Transaction::from_record(Schema::V1, &mapping, &record).unwrap();
        assert_eq!(t.description(), "Snack");
        assert_eq!(t.account(), None);
        let t = Transaction::from_record(Schema::V2, &mapping, &record).unwrap();
        assert_eq!(t.account(), Some("Credit Card"));
        assert_eq!(
            t.to_record(Schema::V1.columns()),
            vec!["2025-03-14", "Snack", "Food", "-9.99"]
        );
    }

    #[test]
    fn test_record_bad_amount() {
        let mapping = Mapping::new(Schema::V1.header_row()).unwrap();
        let record = csv::StringRecord::from(vec!["2025-03-14", "Snack", "Food", "lots"]);
        assert!(Transaction::from_record(Schema::V1, &mapping, &record).is_err());
    }

    #[test]
    fn test_row_id_parse() {
        assert_eq!(RowId::from_str("3").unwrap(), RowId::new(3));
        assert!(RowId::from_str("-1").is_err());
    }
}
