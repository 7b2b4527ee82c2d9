use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::model::Schema;
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the data directory, its backups subdirectory and:
/// - Creates an initial `config.json` file with the default categories and accounts
/// - Creates an empty ledger file with the header row of `schema`, unless a ledger file exists
///
/// # Arguments
/// - `pocket_home` - The directory that will be the root of data directory, e.g. `$HOME/pocket`
/// - `schema` - The column layout of the ledger file.
/// - `currency` - The prefix used when amounts are displayed.
///
/// # Errors
/// - Returns an error if a config file already exists.
/// - Returns an error if any file operations fail.
pub async fn init(pocket_home: &Path, schema: Schema, currency: &str) -> Result<Out<()>> {
    let config = Config::create(pocket_home, schema, currency)
        .await
        .context("Unable to create the data directory and configs")
        .pub_result(ErrorType::Config)?;
    Ok(format!(
        "Successfully created the pocket directory at {} with a {} ledger",
        config.root().display(),
        config.schema()
    )
    .into())
}
