//! Command handlers for the pocket CLI.
//!
//! This module contains implementations for all CLI subcommands.

mod add;
mod delete;
mod init;
mod list;
mod summary;
mod update;

use crate::model::{RowId, Transaction};
use serde::Serialize;
use std::fmt::Debug;
use tracing::{debug, info};

pub use add::add;
pub use delete::delete;
pub use init::init;
pub use list::list;
pub use summary::{summary, CategoryTotal, Summary};
pub use update::update;

/// The output type for a command. This allows the command to return a consistent message and,
/// optionally, structured data.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the command execution.
    message: String,

    /// Any structured data that needs to be output from the call.
    structure: Option<T>,
}

impl<T, S> From<S> for Out<T>
where
    T: Debug + Clone + Serialize,
    S: Into<String>,
{
    fn from(value: S) -> Self {
        Out::new_message(value)
    }
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// Create a new `Out` object that has `Some(structure)`.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: Some(structure),
        }
    }

    /// Create a new `Out` object that has `None` for `structure`.
    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: None,
        }
    }

    /// Get the `message`.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the structured data stored in `structure`.
    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    /// Print the message to `info!` and the structured data (if it exists) as JSON to `debug!`.
    pub fn print(&self) {
        info!("{}", self.message);
        if let Some(structure) = self.structure() {
            if let Ok(json) = serde_json::to_string_pretty(structure) {
                debug!("Command output:\n\n{json}\n\n");
            }
        }
    }
}

/// A transaction together with its position in the ledger.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct LedgerRow {
    pub row: RowId,
    #[serde(flatten)]
    pub transaction: Transaction,
}

impl LedgerRow {
    pub fn new(row: RowId, transaction: Transaction) -> Self {
        Self { row, transaction }
    }

    /// A one-line description of the row for messages, e.g. `Taxi -$35.00 (Transport, Cash/Other)`.
    pub(crate) fn describe(&self, currency: &str) -> String {
        let t = &self.transaction;
        let place = match t.account() {
            Some(account) => format!("{}, {}", t.category(), account),
            None => t.category().to_string(),
        };
        format!(
            "{} {} {} ({place})",
            t.date(),
            t.description(),
            t.amount().display_with(currency)
        )
    }
}
