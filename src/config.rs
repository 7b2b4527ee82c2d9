//! Configuration file handling for the pocket ledger.
//!
//! The configuration file is stored at `$POCKET_HOME/config.json` and contains the ledger schema
//! revision, the currency used for display, backup settings and the fixed sets of categories and
//! accounts that entries are checked against.

use crate::backup::Backup;
use crate::model::Schema;
use crate::store::Store;
use crate::{utils, Result};
use anyhow::{bail, ensure, Context};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::debug;

const APP_NAME: &str = "pocket";
const CONFIG_VERSION: u8 = 1;
const BACKUP_COPIES: u32 = 5;
const BACKUPS: &str = ".backups";
const CONFIG_JSON: &str = "config.json";
const LEDGER_CSV: &str = "ledger.csv";
pub const DEFAULT_CURRENCY: &str = "$";
const DEFAULT_CATEGORIES: &[&str] = &["Salary", "Transport", "Food", "Housing", "Leisure", "Other"];
const DEFAULT_ACCOUNTS: &[&str] = &["Credit Card", "Debit Card", "Store Card", "Cash/Other"];
const DEFAULT_HEADLINE_CATEGORIES: &[&str] = &["Salary", "Transport"];

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$POCKET_HOME` and from there it loads `$POCKET_HOME/config.json`. It provides
/// paths to other items that are either configurable or are expected in a certain location within
/// the pocket home directory.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    backups: PathBuf,
    config_path: PathBuf,
    ledger_path: PathBuf,
    config_file: ConfigFile,
}

impl Config {
    /// Creates the data directory, its backups subdirectory and:
    /// - Creates an initial `config.json` file with default categories and accounts
    /// - Creates an empty ledger file with the header row of `schema`, unless one already exists
    ///
    /// # Arguments
    /// - `dir` - The directory that will be the root of data directory, e.g. `$HOME/pocket`
    /// - `schema` - The column layout of the ledger file.
    /// - `currency` - The prefix used when amounts are displayed, e.g. `$` or `R$ `.
    ///
    /// # Errors
    /// - Returns an error if `config.json` already exists.
    /// - Returns an error if any file operations fail.
    pub async fn create(dir: impl Into<PathBuf>, schema: Schema, currency: &str) -> Result<Self> {
        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the pocket home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let config_path = root.join(CONFIG_JSON);
        if config_path.exists() {
            bail!(
                "A config file already exists at '{}', refusing to overwrite it",
                config_path.display()
            );
        }

        let backups_dir = root.join(BACKUPS);
        utils::make_dir(&backups_dir).await?;

        let config_file = ConfigFile::new(schema, currency);
        config_file.save(&config_path).await?;

        let config = Self {
            ledger_path: root.join(config_file.ledger_path()),
            root,
            backups: backups_dir,
            config_path,
            config_file,
        };

        let store = config.store();
        if store.path().exists() {
            debug!(
                "Keeping the existing ledger file at {}",
                store.path().display()
            );
        } else {
            store
                .create_empty()
                .await
                .context("Unable to create the ledger file")?;
        }

        Ok(config)
    }

    /// This will
    /// - validate that the `pocket_home` exists and that the config file exists
    /// - load and validate the config file
    /// - validate that the backups directory exists
    /// - return the loaded configuration object
    pub async fn load(pocket_home: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = pocket_home.into();
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("Pocket Home is missing, run 'pocket init' first")?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!("The config file is missing '{}'", config_path.display())
        }
        let config_file = ConfigFile::load(&config_path).await?;

        let config = Self {
            ledger_path: root.join(config_file.ledger_path()),
            backups: root.join(BACKUPS),
            root,
            config_path,
            config_file,
        };
        if !config.backups.is_dir() {
            bail!(
                "The backups directory is missing '{}'",
                config.backups.display()
            )
        }
        Ok(config)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn backups(&self) -> &Path {
        &self.backups
    }

    /// The location of the ledger CSV file.
    pub fn ledger_path(&self) -> &Path {
        &self.ledger_path
    }

    pub fn schema(&self) -> Schema {
        self.config_file.schema
    }

    pub fn currency(&self) -> &str {
        &self.config_file.currency
    }

    pub fn backup_copies(&self) -> u32 {
        self.config_file.backup_copies
    }

    pub fn categories(&self) -> &[String] {
        &self.config_file.categories
    }

    pub fn accounts(&self) -> &[String] {
        &self.config_file.accounts
    }

    /// Categories whose totals are shown on their own at the top of the summary.
    pub fn headline_categories(&self) -> &[String] {
        &self.config_file.headline_categories
    }

    /// Creates a new `Backup` instance for managing backup files.
    pub fn backup(&self) -> Backup {
        Backup::new(self)
    }

    /// Creates a new `Store` for reading and writing the ledger file.
    pub fn store(&self) -> Store {
        Store::new(self)
    }

    /// Returns the configured spelling of `category`, matching case-insensitively.
    ///
    /// # Errors
    /// Returns an error naming the valid categories when `category` is not one of them.
    pub fn resolve_category(&self, category: &str) -> Result<String> {
        resolve(category, self.categories()).with_context(|| {
            format!(
                "Unknown category '{}', expected one of: {}",
                category.trim(),
                self.categories().join(", ")
            )
        })
    }

    /// Checks the account of a new entry against the schema and the configured accounts.
    ///
    /// Returns `None` when the schema has no account column, and the configured spelling of the
    /// account otherwise.
    ///
    /// # Errors
    /// - Returns an error if the schema has an account column and no account was given.
    /// - Returns an error if the account is not one of the configured accounts.
    pub fn resolve_account(&self, account: Option<&str>) -> Result<Option<String>> {
        if !self.schema().has_accounts() {
            if let Some(a) = account {
                tracing::warn!(
                    "Ignoring account '{a}' because the ledger schema {} has no account column",
                    self.schema()
                );
            }
            return Ok(None);
        }
        let Some(account) = account else {
            bail!(
                "An account is required, expected one of: {}",
                self.accounts().join(", ")
            );
        };
        let resolved = resolve(account, self.accounts()).with_context(|| {
            format!(
                "Unknown account '{}', expected one of: {}",
                account.trim(),
                self.accounts().join(", ")
            )
        })?;
        Ok(Some(resolved))
    }
}

/// The key that names are compared by, both when resolving and when checking for duplicates.
fn name_key(value: &str) -> String {
    value.trim().to_lowercase()
}

fn resolve(value: &str, allowed: &[String]) -> Option<String> {
    let key = name_key(value);
    allowed.iter().find(|a| name_key(a) == key).cloned()
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "pocket",
///   "config_version": 1,
///   "schema": "v2",
///   "currency": "$",
///   "backup_copies": 5,
///   "categories": ["Salary", "Transport", "Food", "Housing", "Leisure", "Other"],
///   "accounts": ["Credit Card", "Debit Card", "Store Card", "Cash/Other"],
///   "headline_categories": ["Salary", "Transport"]
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "pocket"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// Column layout of the ledger file
    #[serde(default)]
    schema: Schema,

    /// Prefix used when displaying amounts
    #[serde(default = "default_currency")]
    currency: String,

    /// Number of backup copies to keep
    #[serde(default = "default_backup_copies")]
    backup_copies: u32,

    #[serde(default = "default_categories")]
    categories: Vec<String>,

    #[serde(default = "default_accounts")]
    accounts: Vec<String>,

    #[serde(default = "default_headline_categories")]
    headline_categories: Vec<String>,

    /// Path to the ledger file (optional, relative to config.json or absolute)
    /// Defaults to $POCKET_HOME/ledger.csv if not specified
    #[serde(skip_serializing_if = "Option::is_none")]
    ledger_path: Option<PathBuf>,
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

fn default_backup_copies() -> u32 {
    BACKUP_COPIES
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

fn default_categories() -> Vec<String> {
    to_strings(DEFAULT_CATEGORIES)
}

fn default_accounts() -> Vec<String> {
    to_strings(DEFAULT_ACCOUNTS)
}

fn default_headline_categories() -> Vec<String> {
    to_strings(DEFAULT_HEADLINE_CATEGORIES)
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self::new(Schema::default(), DEFAULT_CURRENCY)
    }
}

impl ConfigFile {
    /// Creates a new ConfigFile with default categories and accounts.
    fn new(schema: Schema, currency: &str) -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            schema,
            currency: currency.to_string(),
            backup_copies: BACKUP_COPIES,
            categories: default_categories(),
            accounts: default_accounts(),
            headline_categories: default_headline_categories(),
            ledger_path: None,
        }
    }

    /// Loads a ConfigFile asynchronously from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, parsed or fails validation
    async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = utils::read(path).await?;

        let config: ConfigFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file at {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("Invalid config file at {}", path.display()))?;
        Ok(config)
    }

    /// Saves the ConfigFile to the specified path.
    async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data)
            .await
            .context("Unable to write config file")
    }

    fn validate(&self) -> Result<()> {
        ensure!(
            self.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            self.app_name
        );
        ensure!(
            self.config_version <= CONFIG_VERSION,
            "Config version {} is not supported, is a newer version of pocket available?",
            self.config_version
        );
        check_set("categories", &self.categories)?;
        if self.schema.has_accounts() {
            check_set("accounts", &self.accounts)?;
        }
        for headline in &self.headline_categories {
            ensure!(
                self.categories.contains(headline),
                "Headline category '{headline}' is not one of the categories"
            );
        }
        Ok(())
    }

    /// Gets the ledger path.
    ///
    /// If the path is relative, it should be interpreted as relative to the config.json file.
    fn ledger_path(&self) -> PathBuf {
        self.ledger_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(LEDGER_CSV))
    }
}

/// Checks that a configured set of names is non-empty and has no duplicates or blank entries.
fn check_set(name: &str, values: &[String]) -> Result<()> {
    ensure!(!values.is_empty(), "The list of {name} must not be empty");
    let mut seen = BTreeSet::new();
    for value in values {
        let key = name_key(value);
        ensure!(!key.is_empty(), "The list of {name} contains a blank entry");
        ensure!(
            seen.insert(key),
            "The list of {name} contains '{value}' more than once"
        );
    }
    Ok(())
}
