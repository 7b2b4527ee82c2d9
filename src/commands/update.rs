//! Update command handler.

use crate::args::UpdateArgs;
use crate::commands::{LedgerRow, Out};
use crate::session::Session;
use crate::{Config, Result};

/// Changes the description and/or the amount of one row and rewrites the ledger file.
///
/// The new amount is a magnitude. An expense stays an expense and an income stays an income.
///
/// # Errors
/// - Returns a not-found error if the row does not exist.
/// - Returns a validation error if neither a description nor an amount is given, or if either
///   is invalid.
/// - Returns a storage error if the ledger file cannot be read or written.
pub async fn update(config: Config, args: UpdateArgs) -> Result<Out<LedgerRow>> {
    let currency = config.currency().to_string();
    let mut session = Session::open(config).await?;
    let row = args.row();
    let transaction = session.edit(row, args.edit()).await?;
    let updated = LedgerRow::new(row, transaction);
    let message = format!("Updated row {row}: {}", updated.describe(&currency));
    Ok(Out::new(message, updated))
}
