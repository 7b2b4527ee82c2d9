//! Reading and writing the ledger CSV file.
//!
//! The whole ledger is read when a session opens and the whole file is rewritten after every
//! change. A file whose header row lacks a column of the configured schema is not an error: it is
//! copied to the backups directory and an empty ledger is used in its place.

use crate::backup::Backup;
use crate::ledger::Ledger;
use crate::model::{Column, Mapping, Schema, Transaction};
use crate::{utils, Config, Result};
use anyhow::{anyhow, ensure, Context};
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};

/// The ledger file of a pocket home directory.
#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
    schema: Schema,
    backup: Backup,
}

/// The outcome of parsing the contents of a ledger file.
#[derive(Debug, Clone, Eq, PartialEq)]
enum Parsed {
    Ledger(Ledger),
    /// The header row lacks these columns of the schema.
    Mismatch(Vec<Column>),
}

impl Store {
    pub fn new(config: &Config) -> Self {
        Self {
            path: config.ledger_path().to_path_buf(),
            schema: config.schema(),
            backup: config.backup(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn schema(&self) -> Schema {
        self.schema
    }

    /// Writes a ledger file that only has the header row.
    pub async fn create_empty(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            utils::make_dir(parent).await?;
        }
        let data = to_csv(&Ledger::new(self.schema))?;
        utils::write_replace(&self.path, data).await
    }

    /// Reads the ledger file.
    ///
    /// - A missing or blank file is an empty ledger.
    /// - A file that lacks a column of the schema is backed up and an empty ledger is returned.
    ///
    /// # Errors
    /// - Returns an error if the file cannot be read.
    /// - Returns an error if a row has an invalid date or amount.
    pub async fn load(&self) -> Result<Ledger> {
        if !self.path.exists() {
            debug!(
                "No ledger file at {}, starting with an empty ledger",
                self.path.display()
            );
            return Ok(Ledger::new(self.schema));
        }

        let content = utils::read(&self.path).await?;
        let parsed = parse(&content, self.schema)
            .with_context(|| format!("Unable to load the ledger from {}", self.path.display()))?;

        match parsed {
            Parsed::Ledger(ledger) => {
                debug!(
                    "Loaded {} transactions from {}",
                    ledger.len(),
                    self.path.display()
                );
                Ok(ledger)
            }
            Parsed::Mismatch(missing) => {
                let backup_path = self.backup.schema_mismatch(&self.path).await?;
                let missing: Vec<&str> = missing.iter().map(Column::as_header_str).collect();
                warn!(
                    "The ledger file {} is missing the column(s) {} required by schema {}. \
                    Starting with an empty ledger; the old file was copied to {}",
                    self.path.display(),
                    missing.join(", "),
                    self.schema,
                    backup_path.display()
                );
                Ok(Ledger::new(self.schema))
            }
        }
    }

    /// Rewrites the whole ledger file. The previous file is copied to the backups directory first.
    pub async fn save(&self, ledger: &Ledger) -> Result<()> {
        ensure!(
            ledger.schema() == self.schema,
            "Cannot save a ledger with schema {} to a file with schema {}",
            ledger.schema(),
            self.schema
        );
        if self.path.exists() {
            if let Some(backup_path) = self.backup.pre_write(&self.path).await? {
                trace!("Saved backup to {}", backup_path.display());
            }
        }
        let data = to_csv(ledger)?;
        utils::write_replace(&self.path, data)
            .await
            .context("Unable to save the ledger")?;
        debug!(
            "Saved {} transactions to {}",
            ledger.len(),
            self.path.display()
        );
        Ok(())
    }
}

fn parse(content: &str, schema: Schema) -> Result<Parsed> {
    if content.trim().is_empty() {
        return Ok(Parsed::Ledger(Ledger::new(schema)));
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers = reader.headers().context("Unable to read the header row")?;
    let mapping = Mapping::new(headers.iter())?;

    let missing = mapping.missing(schema);
    if !missing.is_empty() {
        return Ok(Parsed::Mismatch(missing));
    }
    if !mapping.unknown_headers().is_empty() {
        debug!(
            "Ignoring unknown column(s) {}, they will be dropped on the next save",
            mapping.unknown_headers().join(", ")
        );
    }

    let mut data = Vec::new();
    for result in reader.records() {
        let record = result.context("Unable to read a row")?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        let transaction = Transaction::from_record(schema, &mapping, &record)
            .with_context(|| format!("Invalid row on line {line}"))?;
        data.push(transaction);
    }
    Ok(Parsed::Ledger(Ledger::from_data(schema, data)))
}

fn to_csv(ledger: &Ledger) -> Result<Vec<u8>> {
    let schema = ledger.schema();
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(schema.header_row())
        .context("Unable to write the header row")?;
    for t in ledger.data() {
        writer
            .write_record(t.to_record(schema.columns()))
            .context("Unable to write a row")?;
    }
    writer
        .into_inner()
        .map_err(|e| anyhow!("Unable to flush the ledger data: {}", e.error()))
}
