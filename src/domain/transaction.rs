//! Transaction records as reported by the analysis backend

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Transaction category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TxType {
    Transfer,
    Swap,
    Deposit,
    Withdrawal,
    Stake,
    Unstake,
    Bridge,
    Mint,
    Burn,
    Approve,
    /// Any label the backend reports that is not one of the above
    Other,
}

impl TxType {
    pub const ALL: [TxType; 10] = [
        TxType::Transfer,
        TxType::Swap,
        TxType::Deposit,
        TxType::Withdrawal,
        TxType::Stake,
        TxType::Unstake,
        TxType::Bridge,
        TxType::Mint,
        TxType::Burn,
        TxType::Approve,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            TxType::Transfer => "Transfer",
            TxType::Swap => "Swap",
            TxType::Deposit => "Deposit",
            TxType::Withdrawal => "Withdrawal",
            TxType::Stake => "Stake",
            TxType::Unstake => "Unstake",
            TxType::Bridge => "Bridge",
            TxType::Mint => "Mint",
            TxType::Burn => "Burn",
            TxType::Approve => "Approve",
            TxType::Other => "Other",
        }
    }

    /// Parse a label; returns `None` for anything unrecognised
    pub fn parse(label: &str) -> Option<TxType> {
        let lower = label.trim().to_lowercase();
        match lower.as_str() {
            // backend sub-kinds of plain transfers
            "internal transfer" | "token transfer" => Some(TxType::Transfer),
            "other" => Some(TxType::Other),
            _ => TxType::ALL
                .into_iter()
                .find(|t| t.label().to_lowercase() == lower),
        }
    }
}

impl From<String> for TxType {
    fn from(value: String) -> Self {
        TxType::parse(&value).unwrap_or(TxType::Other)
    }
}

impl From<TxType> for String {
    fn from(value: TxType) -> Self {
        value.label().to_string()
    }
}

impl fmt::Display for TxType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    In,
    Out,
}

impl Direction {
    pub fn label(&self) -> &'static str {
        match self {
            Direction::In => "in",
            Direction::Out => "out",
        }
    }

    /// Apply this direction's sign to an amount
    pub fn signed(&self, amount: Decimal) -> Decimal {
        match self {
            Direction::In => amount,
            Direction::Out => -amount,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TxStatus {
    #[serde(alias = "success")]
    Success,
    #[serde(alias = "failed", alias = "Failure", alias = "Error")]
    Failed,
    #[serde(alias = "pending")]
    Pending,
}

impl TxStatus {
    pub fn label(&self) -> &'static str {
        match self {
            TxStatus::Success => "Success",
            TxStatus::Failed => "Failed",
            TxStatus::Pending => "Pending",
        }
    }
}

fn default_status() -> TxStatus {
    TxStatus::Success
}

fn unknown_party() -> String {
    "Unknown".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub hash: String,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub tx_type: TxType,
    pub direction: Direction,
    #[serde(default = "unknown_party", deserialize_with = "null_as_unknown")]
    pub from: String,
    #[serde(default = "unknown_party", deserialize_with = "null_as_unknown")]
    pub to: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    #[serde(default)]
    pub token_symbol: Option<String>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub usd_value: Option<Decimal>,
    #[serde(default = "default_status")]
    pub status: TxStatus,
    #[serde(default)]
    pub block_number: Option<u64>,
    #[serde(default)]
    pub gas_used: Option<u64>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub gas_price: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub fee: Option<Decimal>,
    #[serde(default)]
    pub edited: bool,
}

fn null_as_unknown<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.unwrap_or_else(unknown_party))
}

impl Transaction {
    /// The other side of the transfer, seen from the analysed address
    pub fn counterparty(&self) -> &str {
        match self.direction {
            Direction::In => &self.from,
            Direction::Out => &self.to,
        }
    }

    /// Amount with the direction's sign applied
    pub fn signed_amount(&self) -> Decimal {
        self.direction.signed(self.amount)
    }

    /// Token symbol, falling back to the chain's native symbol
    pub fn token_or<'a>(&'a self, native: &'a str) -> &'a str {
        self.token_symbol
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(native)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BACKEND_TX: &str = r#"{
        "hash": "0xabc",
        "timestamp": 1704463380,
        "date": "2024-01-05T14:03:00",
        "type": "Token Transfer",
        "direction": "in",
        "from": "0xfrom",
        "to": "0xto",
        "amount": 12.5,
        "token": "USDC",
        "tokenSymbol": "USDC",
        "status": "Success",
        "gasUsed": 52000,
        "gasPrice": 21.5,
        "blockNumber": 19000000,
        "confirmations": 12
    }"#;

    #[test]
    fn test_decode_backend_transaction() {
        let tx: Transaction = serde_json::from_str(BACKEND_TX).unwrap();
        assert_eq!(tx.hash, "0xabc");
        assert_eq!(tx.tx_type, TxType::Transfer);
        assert_eq!(tx.direction, Direction::In);
        assert_eq!(tx.amount, Decimal::new(125, 1));
        assert_eq!(tx.token_symbol.as_deref(), Some("USDC"));
        assert_eq!(tx.usd_value, None);
        assert_eq!(tx.block_number, Some(19_000_000));
        assert_eq!(tx.timestamp.timestamp(), 1_704_463_380);
        assert!(!tx.edited);
        assert_eq!(tx.counterparty(), "0xfrom");
    }

    #[test]
    fn test_unknown_type_and_null_parties() {
        let json = r#"{"hash":"h","timestamp":0,"type":"Airdrop","direction":"out",
            "from":null,"to":"0xdest","amount":1,"tokenSymbol":null,"status":"Failed"}"#;
        let tx: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(tx.tx_type, TxType::Other);
        assert_eq!(tx.from, "Unknown");
        assert_eq!(tx.status, TxStatus::Failed);
        assert_eq!(tx.counterparty(), "0xdest");
        assert_eq!(tx.signed_amount(), Decimal::from(-1));
        assert_eq!(tx.token_or("ETH"), "ETH");
    }

    #[test]
    fn test_type_labels() {
        assert_eq!(TxType::parse("swap"), Some(TxType::Swap));
        assert_eq!(TxType::parse("Internal Transfer"), Some(TxType::Transfer));
        assert_eq!(TxType::parse("nope"), None);
        assert_eq!(String::from(TxType::Unstake), "Unstake");
    }
}
