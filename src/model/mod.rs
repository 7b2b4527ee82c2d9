//! Types that represent the core data model, such as `Transaction` and `Amount`.
mod amount;
mod direction;
mod schema;
mod transaction;

pub use amount::{format_money, Amount, AmountError, MAX_MAGNITUDE};
pub use direction::Direction;
pub use schema::{Column, Mapping, MappingError, Schema};
pub use transaction::{parse_date, Edit, NewEntry, RowId, Transaction};
