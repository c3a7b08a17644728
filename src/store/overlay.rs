//! User corrections layered over fetched data
//!
//! The fetched transactions are never mutated. Deletions and edits are kept
//! here and applied on every read, so resetting the overlay always restores
//! exactly what the backend returned.

use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

use crate::domain::{BalanceSnapshot, Direction, TokenBalance, Transaction, TxStatus, TxType};
use crate::error::ValidationError;

/// Partial transaction; `Some` fields replace the original value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionPatch {
    pub timestamp: Option<DateTime<Utc>>,
    pub tx_type: Option<TxType>,
    pub direction: Option<Direction>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub amount: Option<Decimal>,
    pub token_symbol: Option<String>,
    pub usd_value: Option<Decimal>,
    pub status: Option<TxStatus>,
}

impl TransactionPatch {
    pub fn is_empty(&self) -> bool {
        *self == TransactionPatch::default()
    }

    /// Set one field from a `key=value` style pair
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ValidationError> {
        let value = value.trim();
        match key.trim().to_lowercase().as_str() {
            "date" | "time" | "timestamp" => self.timestamp = Some(parse_timestamp(value)?),
            "type" => {
                self.tx_type = Some(
                    TxType::parse(value)
                        .ok_or_else(|| ValidationError::UnknownField(value.to_string()))?,
                )
            }
            "direction" | "dir" => {
                self.direction = Some(match value.to_lowercase().as_str() {
                    "in" => Direction::In,
                    "out" => Direction::Out,
                    _ => return Err(ValidationError::UnknownField(value.to_string())),
                })
            }
            "from" => self.from = Some(value.to_string()),
            "to" => self.to = Some(value.to_string()),
            "amount" => self.amount = Some(parse_amount(value, "amount")?),
            "token" | "symbol" => self.token_symbol = Some(value.to_string()),
            "usd" | "usd_value" => self.usd_value = Some(parse_amount(value, "USD value")?),
            "status" => {
                self.status = Some(match value.to_lowercase().as_str() {
                    "success" => TxStatus::Success,
                    "failed" => TxStatus::Failed,
                    "pending" => TxStatus::Pending,
                    _ => return Err(ValidationError::UnknownField(value.to_string())),
                })
            }
            other => return Err(ValidationError::UnknownField(other.to_string())),
        }
        Ok(())
    }

    /// Fold `newer` into this patch; fields set in `newer` win
    fn merge(&mut self, newer: TransactionPatch) {
        if newer.timestamp.is_some() {
            self.timestamp = newer.timestamp;
        }
        if newer.tx_type.is_some() {
            self.tx_type = newer.tx_type;
        }
        if newer.direction.is_some() {
            self.direction = newer.direction;
        }
        if newer.from.is_some() {
            self.from = newer.from;
        }
        if newer.to.is_some() {
            self.to = newer.to;
        }
        if newer.amount.is_some() {
            self.amount = newer.amount;
        }
        if newer.token_symbol.is_some() {
            self.token_symbol = newer.token_symbol;
        }
        if newer.usd_value.is_some() {
            self.usd_value = newer.usd_value;
        }
        if newer.status.is_some() {
            self.status = newer.status;
        }
    }

    fn apply_to(&self, tx: &mut Transaction) {
        if let Some(timestamp) = self.timestamp {
            tx.timestamp = timestamp;
        }
        if let Some(tx_type) = self.tx_type {
            tx.tx_type = tx_type;
        }
        if let Some(direction) = self.direction {
            tx.direction = direction;
        }
        if let Some(from) = &self.from {
            tx.from = from.clone();
        }
        if let Some(to) = &self.to {
            tx.to = to.clone();
        }
        if let Some(amount) = self.amount {
            tx.amount = amount;
        }
        if let Some(symbol) = &self.token_symbol {
            tx.token_symbol = Some(symbol.clone());
        }
        if let Some(usd) = self.usd_value {
            tx.usd_value = Some(usd);
        }
        if let Some(status) = self.status {
            tx.status = status;
        }
        tx.edited = true;
    }
}

/// Parse a non-negative decimal amount
pub fn parse_amount(value: &str, field: &'static str) -> Result<Decimal, ValidationError> {
    let amount = Decimal::from_str(value.trim())
        .map_err(|_| ValidationError::InvalidNumber(value.trim().to_string()))?;
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(ValidationError::NegativeAmount(field));
    }
    Ok(amount)
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, ValidationError> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| ValidationError::InvalidDate(value.to_string()))
}

#[derive(Debug, Clone, Default)]
pub struct EditOverlay {
    opening_override: Option<BalanceSnapshot>,
    current_override: Option<BalanceSnapshot>,
    deleted: BTreeSet<String>,
    edits: BTreeMap<String, TransactionPatch>,
}

impl EditOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_opening_balance(
        &mut self,
        native: Decimal,
        tokens: Vec<TokenBalance>,
    ) -> Result<(), ValidationError> {
        check_balance(native, &tokens)?;
        self.opening_override = Some(BalanceSnapshot::new(native, tokens));
        Ok(())
    }

    pub fn set_current_balance(
        &mut self,
        native: Decimal,
        tokens: Vec<TokenBalance>,
    ) -> Result<(), ValidationError> {
        check_balance(native, &tokens)?;
        self.current_override = Some(BalanceSnapshot::new(native, tokens));
        Ok(())
    }

    pub fn opening_balance(&self) -> Option<&BalanceSnapshot> {
        self.opening_override.as_ref()
    }

    pub fn current_balance(&self) -> Option<&BalanceSnapshot> {
        self.current_override.as_ref()
    }

    /// Mark a hash as deleted. Returns `false` if it already was.
    pub fn delete_transaction(&mut self, hash: &str) -> bool {
        self.deleted.insert(hash.to_string())
    }

    pub fn deleted_count(&self) -> usize {
        self.deleted.len()
    }

    pub fn edit_transaction(
        &mut self,
        hash: &str,
        patch: TransactionPatch,
    ) -> Result<(), ValidationError> {
        if let Some(amount) = patch.amount {
            if amount.is_sign_negative() && !amount.is_zero() {
                return Err(ValidationError::NegativeAmount("amount"));
            }
        }
        self.edits
            .entry(hash.to_string())
            .or_default()
            .merge(patch);
        Ok(())
    }

    pub fn edited_count(&self) -> usize {
        self.edits.len()
    }

    /// Effective transactions: deletions dropped, edits layered, order kept
    pub fn apply(&self, original: &[Transaction]) -> Vec<Transaction> {
        original
            .iter()
            .filter(|tx| !self.deleted.contains(&tx.hash))
            .map(|tx| {
                let mut tx = tx.clone();
                if let Some(patch) = self.edits.get(&tx.hash) {
                    patch.apply_to(&mut tx);
                }
                tx
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.opening_override.is_none()
            && self.current_override.is_none()
            && self.deleted.is_empty()
            && self.edits.is_empty()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

fn check_balance(native: Decimal, tokens: &[TokenBalance]) -> Result<(), ValidationError> {
    if native.is_sign_negative() && !native.is_zero() {
        return Err(ValidationError::NegativeAmount("native balance"));
    }
    if tokens
        .iter()
        .any(|t| t.balance.is_sign_negative() && !t.balance.is_zero())
    {
        return Err(ValidationError::NegativeAmount("token balance"));
    }
    Ok(())
}
