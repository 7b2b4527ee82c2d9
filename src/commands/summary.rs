//! Summary command handler.

use crate::commands::Out;
use crate::ledger::Ledger;
use crate::model::format_money;
use crate::session::Session;
use crate::{Config, Result};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

/// The totals shown by `pocket summary`. Expense figures are magnitudes, every other figure is a
/// signed sum.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct Summary {
    pub transactions: usize,
    pub balance: Decimal,
    pub income: Decimal,
    pub expenses: Decimal,
    /// The configured headline categories, in their configured order.
    pub headlines: Vec<CategoryTotal>,
    /// The signed sum of every category that is not a headline category.
    pub everything_else: Decimal,
    pub category_totals: BTreeMap<String, Decimal>,
    pub expense_by_category: BTreeMap<String, Decimal>,
    /// Empty when the ledger has no account column.
    pub account_spend: BTreeMap<String, Decimal>,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: Decimal,
}

impl Summary {
    /// Computes the summary of `ledger`. Every configured account is listed in `account_spend`,
    /// followed by accounts that only appear in the ledger.
    pub fn new(ledger: &Ledger, config: &Config) -> Self {
        let headlines: Vec<CategoryTotal> = config
            .headline_categories()
            .iter()
            .map(|category| CategoryTotal {
                category: category.clone(),
                total: ledger.category_total(category),
            })
            .collect();

        let mut account_spend = BTreeMap::new();
        if ledger.schema().has_accounts() {
            for account in config.accounts() {
                account_spend.insert(account.clone(), ledger.account_spend(account));
            }
            account_spend.extend(ledger.account_spend_totals());
        }

        Self {
            transactions: ledger.len(),
            balance: ledger.balance(),
            income: ledger.income_total(),
            expenses: ledger.expense_total(),
            headlines,
            everything_else: ledger.total_excluding(config.headline_categories()),
            category_totals: ledger.category_totals(),
            expense_by_category: ledger.expense_by_category(),
            account_spend,
        }
    }

    /// Renders the summary as text, formatting amounts with `currency`.
    fn render(&self, currency: &str) -> String {
        let money = |value: Decimal| format_money(value, currency);
        let mut lines = vec![
            format!("Transactions: {}", self.transactions),
            format!("Balance: {}", money(self.balance)),
            format!("Income: {}", money(self.income)),
            format!("Expenses: {}", money(self.expenses)),
        ];
        for headline in &self.headlines {
            lines.push(format!("{}: {}", headline.category, money(headline.total)));
        }
        if !self.headlines.is_empty() {
            lines.push(format!("Everything else: {}", money(self.everything_else)));
        }
        section(&mut lines, "By category", &self.category_totals, &money);
        section(&mut lines, "Spent by category", &self.expense_by_category, &money);
        section(&mut lines, "Spent by account", &self.account_spend, &money);
        lines.join("\n")
    }
}

fn section(
    lines: &mut Vec<String>,
    title: &str,
    values: &BTreeMap<String, Decimal>,
    money: &dyn Fn(Decimal) -> String,
) {
    if values.is_empty() {
        return;
    }
    lines.push(String::new());
    lines.push(format!("{title}:"));
    for (name, value) in values {
        lines.push(format!("  {name}: {}", money(*value)));
    }
}

/// Computes the balance, the income and expense totals, the headline category totals and the
/// per-category and per-account totals of the ledger.
pub async fn summary(config: Config) -> Result<Out<Summary>> {
    let session = Session::open(config).await?;
    let summary = Summary::new(session.ledger(), session.config());
    let message = summary.render(session.config().currency());
    Ok(Out::new(message, summary))
}
