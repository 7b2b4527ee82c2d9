//! The application state of one run: the configuration and the ledger it loaded.
//!
//! Every change goes through a `Session`, which validates the entry, mutates the in-memory ledger
//! and then rewrites the ledger file before returning.

use crate::error::{ErrorType, IntoResult};
use crate::ledger::Ledger;
use crate::model::{Edit, NewEntry, RowId, Transaction};
use crate::store::Store;
use crate::{Config, Result};
use anyhow::anyhow;
use chrono::{Local, NaiveDate};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct Session {
    config: Config,
    store: Store,
    ledger: Ledger,
}

impl Session {
    /// Loads the ledger file named by `config`.
    pub async fn open(config: Config) -> Result<Self> {
        let store = config.store();
        let ledger = store.load().await.pub_result(ErrorType::Storage)?;
        Ok(Self {
            config,
            store,
            ledger,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Records a new transaction dated today.
    pub async fn record(&mut self, entry: NewEntry) -> Result<(RowId, Transaction)> {
        self.record_on(entry, Local::now().date_naive()).await
    }

    /// Records a new transaction with the given date. The category and account are checked
    /// against the configuration, the amount is signed by the entry's direction and the ledger
    /// file is rewritten.
    pub async fn record_on(
        &mut self,
        entry: NewEntry,
        date: NaiveDate,
    ) -> Result<(RowId, Transaction)> {
        let entry = self.normalize(entry).pub_result(ErrorType::Validation)?;
        let transaction =
            Transaction::from_entry(&entry, date).pub_result(ErrorType::Validation)?;
        let snapshot = self.ledger.clone();
        let row = self.ledger.append(transaction.clone());
        self.persist_or_rollback(snapshot).await?;
        debug!("Recorded row {row}: {transaction:?}");
        Ok((row, transaction))
    }

    /// Changes the description and/or magnitude of a row. The sign of the amount is kept.
    pub async fn edit(&mut self, row: RowId, edit: Edit) -> Result<Transaction> {
        self.ledger
            .get(row)
            .ok_or_else(|| anyhow!("Row {row} does not exist"))
            .pub_result(ErrorType::NotFound)?;
        let snapshot = self.ledger.clone();
        let updated = self
            .ledger
            .update(row, &edit)
            .pub_result(ErrorType::Validation)?
            .clone();
        self.persist_or_rollback(snapshot).await?;
        debug!("Updated row {row}: {updated:?}");
        Ok(updated)
    }

    /// Removes a row. Later rows move down by one position.
    pub async fn remove(&mut self, row: RowId) -> Result<Transaction> {
        let snapshot = self.ledger.clone();
        let removed = self.ledger.delete(row).pub_result(ErrorType::NotFound)?;
        self.persist_or_rollback(snapshot).await?;
        debug!("Removed row {row}: {removed:?}");
        Ok(removed)
    }

    /// Rewrites the ledger file. If that fails, the in-memory ledger goes back to `snapshot` so
    /// that it matches the file again.
    async fn persist_or_rollback(&mut self, snapshot: Ledger) -> Result<()> {
        let result = self
            .store
            .save(&self.ledger)
            .await
            .pub_result(ErrorType::Storage);
        if result.is_err() {
            self.ledger = snapshot;
        }
        result
    }

    /// Replaces the category and account of `entry` with their configured spellings.
    fn normalize(&self, mut entry: NewEntry) -> Result<NewEntry> {
        entry.category = self.config.resolve_category(&entry.category)?;
        entry.account = self.config.resolve_account(entry.account.as_deref())?;
        Ok(entry)
    }
}
