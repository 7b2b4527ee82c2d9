//! The column layout of the ledger file.
//!
//! A `Schema` is a fixed set of columns. A file is only usable when its header row contains every
//! column that the configured schema requires; the `Mapping` records where each column was found.

use crate::Result;
use anyhow::bail;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::error::Error as StdError;
use std::fmt::{Display, Formatter};

/// A revision of the ledger file layout.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum Schema {
    /// `Date, Description, Category, Amount`
    V1,
    /// `Date, Description, Category, Account, Amount`
    #[default]
    V2,
}

serde_plain::derive_display_from_serialize!(Schema);
serde_plain::derive_fromstr_from_deserialize!(Schema);

const V1_COLUMNS: &[Column] = &[
    Column::Date,
    Column::Description,
    Column::Category,
    Column::Amount,
];

const V2_COLUMNS: &[Column] = &[
    Column::Date,
    Column::Description,
    Column::Category,
    Column::Account,
    Column::Amount,
];

impl Schema {
    /// The columns of this schema in the order they are written.
    pub fn columns(&self) -> &'static [Column] {
        match self {
            Schema::V1 => V1_COLUMNS,
            Schema::V2 => V2_COLUMNS,
        }
    }

    pub fn has(&self, column: Column) -> bool {
        self.columns().contains(&column)
    }

    pub fn has_accounts(&self) -> bool {
        self.has(Column::Account)
    }

    /// The header row that is written at the top of the ledger file.
    pub fn header_row(&self) -> Vec<&'static str> {
        self.columns().iter().map(Column::as_header_str).collect()
    }
}

/// Represents the known columns that can be found in a ledger file.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    Date,
    Description,
    Category,
    Account,
    Amount,
}

serde_plain::derive_display_from_serialize!(Column);
serde_plain::derive_fromstr_from_deserialize!(Column);

impl Column {
    pub fn from_header(header: impl AsRef<str>) -> Result<Column> {
        match header.as_ref().trim() {
            DATE_STR => Ok(Column::Date),
            DESCRIPTION_STR => Ok(Column::Description),
            CATEGORY_STR => Ok(Column::Category),
            ACCOUNT_STR => Ok(Column::Account),
            AMOUNT_STR => Ok(Column::Amount),
            bad => bail!("Invalid ledger column name '{bad}'"),
        }
    }

    pub fn as_header_str(&self) -> &'static str {
        match self {
            Column::Date => DATE_STR,
            Column::Description => DESCRIPTION_STR,
            Column::Category => CATEGORY_STR,
            Column::Account => ACCOUNT_STR,
            Column::Amount => AMOUNT_STR,
        }
    }
}

const DATE_STR: &str = "Date";
const DESCRIPTION_STR: &str = "Description";
const CATEGORY_STR: &str = "Category";
const ACCOUNT_STR: &str = "Account";
const AMOUNT_STR: &str = "Amount";

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct MappingError(String);

impl Display for MappingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl StdError for MappingError {}

/// Records the position of each known column in the header row of a ledger file.
#[derive(Default, Debug, Clone, Eq, PartialEq)]
pub struct Mapping {
    positions: HashMap<Column, usize>,
    unknown: Vec<String>,
}

impl Mapping {
    /// Create a new `Mapping` from the header row of a file. Headers that are not known columns
    /// are remembered but otherwise ignored.
    pub fn new<S, I>(headers: I) -> std::result::Result<Self, MappingError>
    where
        S: AsRef<str>,
        I: IntoIterator<Item = S>,
    {
        let mut positions = HashMap::new();
        let mut unknown = Vec::new();
        for (ix, header) in headers.into_iter().enumerate() {
            let header = header.as_ref();
            match Column::from_header(header) {
                Ok(column) => {
                    if positions.insert(column, ix).is_some() {
                        return Err(MappingError(format!(
                            "Encountered a duplicate header '{}'",
                            column.as_header_str()
                        )));
                    }
                }
                Err(_) => unknown.push(header.to_string()),
            }
        }
        Ok(Self { positions, unknown })
    }

    /// The position of `column` in a row, if the header row had it.
    pub fn position(&self, column: Column) -> Option<usize> {
        self.positions.get(&column).copied()
    }

    /// The columns that `schema` requires but the header row did not have.
    pub fn missing(&self, schema: Schema) -> Vec<Column> {
        schema
            .columns()
            .iter()
            .filter(|c| !self.positions.contains_key(*c))
            .copied()
            .collect()
    }

    /// Headers that did not match any known column.
    pub fn unknown_headers(&self) -> &[String] {
        &self.unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_rows() {
        assert_eq!(
            Schema::V1.header_row(),
            vec!["Date", "Description", "Category", "Amount"]
        );
        assert_eq!(
            Schema::V2.header_row(),
            vec!["Date", "Description", "Category", "Account", "Amount"]
        );
        assert!(!Schema::V1.has_accounts());
        assert!(Schema::V2.has_accounts());
    }

    #[test]
    fn test_mapping_out_of_order() {
        let mapping = Mapping::new(["Amount", " Date ", "Category", "Description"]).unwrap();
        assert_eq!(mapping.position(Column::Amount), Some(0));
        assert_eq!(mapping.position(Column::Date), Some(1));
        assert!(mapping.missing(Schema::V1).is_empty());
        assert_eq!(mapping.missing(Schema::V2), vec![Column::Account]);
    }

    #[test]
    fn test_mapping_unknown_headers() {
        let mapping =
            Mapping::new(["Date", "Description", "Category", "Amount", "Notes"]).unwrap();
        assert_eq!(mapping.unknown_headers(), &["Notes".to_string()]);
        assert!(mapping.missing(Schema::V1).is_empty());
    }

    #[test]
    fn test_mapping_duplicate_header() {
        assert!(Mapping::new(["Date", "Date"]).is_err());
    }

    #[test]
    fn test_schema_strings() {
        assert_eq!(Schema::V2.to_string(), "v2");
        assert_eq!("v1".parse::<Schema>().unwrap(), Schema::V1);
    }
}
