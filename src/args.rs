//! These structs provide the CLI interface for the pocket CLI.

use crate::config::DEFAULT_CURRENCY;
use crate::model::{parse_date, Amount, Direction, Edit, RowId, Schema};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// pocket: A command-line tool for keeping track of income and expenses.
///
/// Every transaction you record is stored as a row of a CSV file in your pocket home directory.
/// The file is rewritten after every change, and a copy of the previous version is kept in the
/// `.backups` directory.
///
/// Run `pocket init` once to create the directory, then use `add`, `update` and `delete` to change
/// the ledger and `list` and `summary` to look at it.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the data directory and initialize the configuration file and an empty ledger.
    ///
    /// This is the first command you should run. By default the data directory is $HOME/pocket,
    /// pass --pocket-home if you want it somewhere else.
    ///
    /// The `v2` schema records which account or card paid for each transaction. Use `v1` if you
    /// only want to track categories.
    Init(InitArgs),
    /// Record a new income or expense.
    Add(AddArgs),
    /// Change the description and/or the amount of a recorded transaction. The transaction stays
    /// an income or an expense.
    Update(UpdateArgs),
    /// Remove a transaction from the ledger.
    Delete(DeleteArgs),
    /// Show the transactions, most recent first, with the row numbers used by update and delete.
    List(ListArgs),
    /// Show the balance and the totals by category and by account.
    Summary,
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG. See the tracing-subscriber crate for instructions.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where the ledger and configuration are held. Defaults to ~/pocket
    #[arg(long, env = "POCKET_HOME", default_value_t = default_pocket_home())]
    pocket_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, pocket_home: PathBuf) -> Self {
        Self {
            log_level,
            pocket_home: pocket_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn pocket_home(&self) -> &DisplayPath {
        &self.pocket_home
    }
}

/// (Not shown): Args for the `pocket init` command.
#[derive(Debug, Parser, Clone)]
pub struct InitArgs {
    /// The columns of the ledger file.
    #[arg(long, value_enum, default_value_t = Schema::V2)]
    schema: Schema,

    /// The prefix used when amounts are shown, e.g. '$' or 'R$ '.
    #[arg(long, default_value = DEFAULT_CURRENCY)]
    currency: String,
}

impl InitArgs {
    pub fn new(schema: Schema, currency: impl Into<String>) -> Self {
        Self {
            schema,
            currency: currency.into(),
        }
    }

    pub fn schema(&self) -> Schema {
        self.schema
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }
}

/// (Not shown): Args for the `pocket add` command.
#[derive(Debug, Parser, Clone)]
pub struct AddArgs {
    /// What the money was for, or where it came from.
    #[arg(long)]
    description: String,

    /// The amount, always entered as a positive number. Use --direction to say whether it is
    /// income or an expense.
    #[arg(long)]
    amount: Amount,

    /// Whether the amount is money coming in or going out.
    #[arg(long, value_enum, default_value_t = Direction::Expense)]
    direction: Direction,

    /// One of the categories listed in config.json.
    #[arg(long)]
    category: String,

    /// One of the accounts listed in config.json. Required by the v2 schema.
    #[arg(long)]
    account: Option<String>,

    /// The date of the transaction as YYYY-MM-DD. Defaults to today.
    #[arg(long, value_parser = date_arg)]
    date: Option<NaiveDate>,
}

impl AddArgs {
    pub fn new(
        description: impl Into<String>,
        amount: Amount,
        direction: Direction,
        category: impl Into<String>,
        account: Option<String>,
        date: Option<NaiveDate>,
    ) -> Self {
        Self {
            description: description.into(),
            amount,
            direction,
            category: category.into(),
            account,
            date,
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn account(&self) -> Option<&str> {
        self.account.as_deref()
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }
}

/// (Not shown): Args for the `pocket update` command.
#[derive(Debug, Parser, Clone)]
pub struct UpdateArgs {
    /// The row number shown by `pocket list`.
    row: RowId,

    /// The new description.
    #[arg(long)]
    description: Option<String>,

    /// The new amount, entered as a positive number.
    #[arg(long)]
    amount: Option<Amount>,
}

impl UpdateArgs {
    pub fn new(row: RowId, description: Option<String>, amount: Option<Amount>) -> Self {
        Self {
            row,
            description,
            amount,
        }
    }

    pub fn row(&self) -> RowId {
        self.row
    }

    /// The changes to apply to the row.
    pub fn edit(&self) -> Edit {
        Edit {
            description: self.description.clone(),
            magnitude: self.amount.map(|a| a.value()),
        }
    }
}

/// (Not shown): Args for the `pocket delete` command.
#[derive(Debug, Parser, Clone)]
pub struct DeleteArgs {
    /// The row number shown by `pocket list`.
    row: RowId,
}

impl DeleteArgs {
    pub fn new(row: RowId) -> Self {
        Self { row }
    }

    pub fn row(&self) -> RowId {
        self.row
    }
}

/// (Not shown): Args for the `pocket list` command.
#[derive(Debug, Default, Parser, Clone)]
pub struct ListArgs {
    /// Show at most this many transactions.
    #[arg(long)]
    limit: Option<usize>,
}

impl ListArgs {
    pub fn new(limit: Option<usize>) -> Self {
        Self { limit }
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }
}

fn date_arg(s: &str) -> Result<NaiveDate, String> {
    parse_date(s).map_err(|e| format!("{e:#}"))
}

fn default_pocket_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("pocket"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --pocket-home or POCKET_HOME instead of relying on the default \
                pocket home directory. If you continue using the program right now, you may have \
                problems!",
            );
            PathBuf::from("pocket")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn new(path: PathBuf) -> Self {
        Self(path)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}
