//! `pocket_ledger` records income and expenses in a CSV file and summarizes them.
//!
//! A [`Session`] loads the ledger named by a [`Config`], applies changes to it and rewrites the
//! file after each change. The [`Ledger`] computes balances and totals from its rows.

pub mod args;
mod backup;
pub mod commands;
mod config;
mod error;
pub mod ledger;
pub mod model;
pub mod session;
mod store;
mod utils;


pub use config::Config;
pub use error::{error_type, Error, ErrorType, IntoResult, PubError, Result};
pub use ledger::Ledger;
pub use session::Session;
