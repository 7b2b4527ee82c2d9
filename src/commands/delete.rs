//! Delete command handler.

use crate::args::DeleteArgs;
use crate::commands::{LedgerRow, Out};
use crate::session::Session;
use crate::{Config, Result};

/// Removes one row from the ledger and rewrites the ledger file. The rows after it move down by
/// one position, so the row numbers shown by `list` change.
///
/// # Errors
/// - Returns a not-found error if the row does not exist.
/// - Returns a storage error if the ledger file cannot be read or written.
pub async fn delete(config: Config, args: DeleteArgs) -> Result<Out<LedgerRow>> {
    let currency = config.currency().to_string();
    let mut session = Session::open(config).await?;
    let row = args.row();
    let removed = LedgerRow::new(row, session.remove(row).await?);
    let message = format!("Deleted row {row}: {}", removed.describe(&currency));
    Ok(Out::new(message, removed))
}
