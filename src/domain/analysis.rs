//! One analysis session: the fetched balance, transactions and derived totals

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Chain, Direction, Transaction};
use crate::error::ValidationError;

/// Inclusive query period. `start` is always strictly before `end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ValidationError> {
        if start >= end {
            return Err(ValidationError::InvalidDateRange);
        }
        Ok(Self { start, end })
    }

    /// Parse two `YYYY-MM-DD` strings
    pub fn parse(start: &str, end: &str) -> Result<Self, ValidationError> {
        Self::new(parse_date(start, "from date")?, parse_date(end, "to date")?)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

fn parse_date(value: &str, field: &'static str) -> Result<NaiveDate, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| ValidationError::InvalidDate(value.to_string()))
}

/// Direction-signed aggregates over a transaction list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    #[serde(with = "rust_decimal::serde::float")]
    pub total_in: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_out: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub net_change: Decimal,
    pub count: usize,
}

impl Statistics {
    pub fn from_transactions(transactions: &[Transaction]) -> Self {
        let mut stats = Statistics {
            count: transactions.len(),
            ..Default::default()
        };
        for tx in transactions {
            match tx.direction {
                Direction::In => stats.total_in += tx.amount,
                Direction::Out => stats.total_out += tx.amount,
            }
        }
        stats.net_change = stats.total_in - stats.total_out;
        stats
    }

    /// Net change relative to a balance, in percent (0 when the balance is not positive)
    pub fn net_change_percent(&self, balance: Decimal) -> Decimal {
        if balance <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        self.net_change / balance * Decimal::ONE_HUNDRED
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenBalance {
    pub symbol: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub balance: Decimal,
}

impl TokenBalance {
    pub fn new(symbol: impl Into<String>, balance: Decimal) -> Self {
        Self {
            symbol: symbol.into(),
            balance,
        }
    }
}

/// Native balance plus token balances at a point in time
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BalanceSnapshot {
    #[serde(with = "rust_decimal::serde::float")]
    pub native: Decimal,
    pub tokens: Vec<TokenBalance>,
}

impl BalanceSnapshot {
    pub fn new(native: Decimal, tokens: Vec<TokenBalance>) -> Self {
        Self { native, tokens }
    }

    pub fn native_only(native: Decimal) -> Self {
        Self {
            native,
            tokens: Vec::new(),
        }
    }
}

/// Convert a raw smallest-unit amount (wei, satoshi, lamports, ...) to native units
pub fn from_base_units(raw: &str, decimals: u32) -> Result<Decimal, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(Decimal::ZERO);
    }
    if let Ok(units) = raw.parse::<i128>() {
        if let Ok(value) = Decimal::try_from_i128_with_scale(units, decimals) {
            return Ok(value.normalize());
        }
    }
    let value = Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .map_err(|_| ValidationError::InvalidNumber(raw.to_string()))?;
    let scale = Decimal::from(10u64.pow(decimals.min(19)));
    value
        .checked_div(scale)
        .map(|v| v.normalize())
        .ok_or_else(|| ValidationError::InvalidNumber(raw.to_string()))
}

/// Result of one analysis query, replaced wholesale on the next query
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    pub address: String,
    pub chain: Chain,
    pub range: DateRange,
    pub balance: BalanceSnapshot,
    pub opening_balance: Option<BalanceSnapshot>,
    pub transactions: Vec<Transaction>,
    pub statistics: Statistics,
}

impl AnalysisResult {
    /// Build a result whose statistics are derived from `transactions`
    pub fn new(
        chain: Chain,
        address: impl Into<String>,
        range: DateRange,
        balance: BalanceSnapshot,
        transactions: Vec<Transaction>,
    ) -> Self {
        let statistics = Statistics::from_transactions(&transactions);
        Self {
            address: address.into(),
            chain,
            range,
            balance,
            opening_balance: None,
            transactions,
            statistics,
        }
    }
}
