use serde::{Deserialize, Serialize};

/// Whether money came in or went out. Entries are typed as positive magnitudes and the direction
/// decides the sign that is stored.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Money received, stored as a positive amount.
    Income,
    /// Money spent, stored as a negative amount.
    #[default]
    Expense,
}

serde_plain::derive_display_from_serialize!(Direction);
serde_plain::derive_fromstr_from_deserialize!(Direction);
