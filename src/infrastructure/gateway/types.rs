//! Backend wire formats and their conversion into domain types

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{
    from_base_units, AnalysisResult, BalanceSnapshot, Chain, DateRange, Statistics, TokenBalance,
    Transaction,
};
use crate::error::GatewayError;

/// `{success, error}` wrapper every backend JSON reply carries
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawTokenBalance {
    Detailed {
        balance: Decimal,
        #[allow(dead_code)]
        #[serde(default)]
        contract: Option<String>,
    },
    Plain(Decimal),
}

impl RawTokenBalance {
    fn balance(&self) -> Decimal {
        match self {
            RawTokenBalance::Detailed { balance, .. } => *balance,
            RawTokenBalance::Plain(balance) => *balance,
        }
    }
}

#[derive(Debug, Deserialize)]
struct AnalyzeResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    error: Option<String>,
    /// Smallest-unit integer, as a string or a number
    #[serde(default)]
    balance: Option<serde_json::Value>,
    #[serde(default)]
    token_balances: Option<BTreeMap<String, RawTokenBalance>>,
    #[serde(default)]
    opening_balance: Option<serde_json::Value>,
    #[serde(default)]
    opening_token_balances: Option<BTreeMap<String, RawTokenBalance>>,
    #[serde(default)]
    transactions: Vec<Transaction>,
}

fn raw_amount(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn token_list(tokens: Option<BTreeMap<String, RawTokenBalance>>) -> Vec<TokenBalance> {
    tokens
        .unwrap_or_default()
        .into_iter()
        .map(|(symbol, raw)| TokenBalance::new(symbol, raw.balance()))
        .collect()
}

fn snapshot(
    chain: Chain,
    native: &serde_json::Value,
    tokens: Option<BTreeMap<String, RawTokenBalance>>,
) -> Result<BalanceSnapshot, GatewayError> {
    let raw = raw_amount(native).unwrap_or_default();
    let native = from_base_units(&raw, chain.decimals())
        .map_err(|e| GatewayError::Decode(e.to_string()))?;
    Ok(BalanceSnapshot::new(native, token_list(tokens)))
}

/// Decode an `/analyze` reply
pub(crate) fn decode_analysis(
    chain: Chain,
    address: &str,
    range: DateRange,
    body: &[u8],
) -> Result<AnalysisResult, GatewayError> {
    let response: AnalyzeResponse =
        serde_json::from_slice(body).map_err(|e| GatewayError::Decode(e.to_string()))?;

    if !response.success {
        return Err(GatewayError::Backend(
            response
                .error
                .unwrap_or_else(|| "analysis failed".to_string()),
        ));
    }

    let balance = snapshot(
        chain,
        response.balance.as_ref().unwrap_or(&serde_json::Value::Null),
        response.token_balances,
    )?;
    let opening_balance = match response.opening_balance.as_ref() {
        Some(value) if !value.is_null() => {
            Some(snapshot(chain, value, response.opening_token_balances)?)
        }
        _ => None,
    };

    let mut result = AnalysisResult::new(chain, address, range, balance, response.transactions);
    result.opening_balance = opening_balance;
    Ok(result)
}

/// Best-effort error text from a failed reply body
pub(crate) fn backend_error(body: &[u8]) -> Option<String> {
    serde_json::from_slice::<Envelope>(body)
        .ok()
        .filter(|e| e.success != Some(true))
        .and_then(|e| e.error)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    Pdf,
    Csv,
}

impl ExportKind {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportKind::Pdf => "pdf",
            ExportKind::Csv => "csv",
        }
    }
}

/// Everything the backend needs to render a statement with user corrections applied
#[derive(Debug, Clone)]
pub struct ExportRequest {
    pub chain: Chain,
    pub address: String,
    pub range: DateRange,
    pub transactions: Vec<Transaction>,
    pub opening_balance: Option<BalanceSnapshot>,
    pub current_balance: Option<BalanceSnapshot>,
    pub statistics: Statistics,
}

impl ExportRequest {
    pub(crate) fn payload(&self) -> Result<serde_json::Value, GatewayError> {
        let payload = ExportPayload {
            blockchain: self.chain,
            address: &self.address,
            start_date: self.range.start().to_string(),
            end_date: self.range.end().to_string(),
            transactions: &self.transactions,
            opening_balance: self.opening_balance.as_ref(),
            current_balance: self.current_balance.as_ref(),
            statistics: &self.statistics,
        };
        serde_json::to_value(payload).map_err(|e| GatewayError::Decode(e.to_string()))
    }

    pub fn default_filename(&self, kind: ExportKind) -> String {
        statement_filename(self.chain, &self.address, self.range, kind)
    }
}

/// `{chain}_{address[..8]}_statement_{start}_to_{end}.{ext}`
pub fn statement_filename(chain: Chain, address: &str, range: DateRange, kind: ExportKind) -> String {
    let short: String = address.chars().take(8).collect();
    format!(
        "{}_{}_statement_{}_to_{}.{}",
        chain.slug(),
        short,
        range.start(),
        range.end(),
        kind.extension()
    )
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportPayload<'a> {
    blockchain: Chain,
    address: &'a str,
    start_date: String,
    end_date: String,
    transactions: &'a [Transaction],
    opening_balance: Option<&'a BalanceSnapshot>,
    current_balance: Option<&'a BalanceSnapshot>,
    statistics: &'a Statistics,
}

/// A rendered statement downloaded from the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFile {
    pub kind: ExportKind,
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Extract `filename` from a `Content-Disposition` header
pub(crate) fn disposition_filename(header: &str) -> Option<String> {
    header
        .split(';')
        .map(str::trim)
        .find_map(|part| part.strip_prefix("filename="))
        .map(|name| name.trim().trim_matches('"').to_string())
        .filter(|name| !name.is_empty() && !name.contains('/') && !name.contains('\\'))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub service: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range() -> DateRange {
        DateRange::parse("2024-01-01", "2024-01-31").unwrap()
    }

    #[test]
    fn test_decode_analysis_converts_base_units() {
        let body = br#"{
            "success": true,
            "balance": "2500000000000000000",
            "token_balances": {"USDT": {"balance": 1000.5, "contract": "0xdac1"}},
            "opening_balance": 1000000000000000000,
            "transactions": [],
            "statistics": {"total_in": 0, "total_out": 0, "net_flow": 0, "total_transactions": 0}
        }"#;
        let result = decode_analysis(Chain::Ethereum, "0xabc", range(), body).unwrap();
        assert_eq!(result.balance.native, Decimal::new(25, 1));
        assert_eq!(result.balance.tokens, vec![TokenBalance::new("USDT", Decimal::new(10005, 1))]);
        assert_eq!(result.opening_balance.unwrap().native, Decimal::ONE);
        assert_eq!(result.statistics.count, 0);
    }

    #[test]
    fn test_decode_analysis_failure_envelope() {
        let body = br#"{"success": false, "error": "Unsupported blockchain: foo"}"#;
        assert_eq!(
            decode_analysis(Chain::Ethereum, "0xabc", range(), body),
            Err(GatewayError::Backend("Unsupported blockchain: foo".into()))
        );
        assert!(matches!(
            decode_analysis(Chain::Ethereum, "0xabc", range(), b"<html>"),
            Err(GatewayError::Decode(_))
        ));
    }

    #[test]
    fn test_disposition_filename() {
        assert_eq!(
            disposition_filename(r#"attachment; filename="report.pdf""#).as_deref(),
            Some("report.pdf")
        );
        assert_eq!(disposition_filename("attachment; filename=a.csv").as_deref(), Some("a.csv"));
        assert_eq!(disposition_filename("attachment"), None);
        assert_eq!(disposition_filename(r#"attachment; filename="../x""#), None);
    }

    #[test]
    fn test_default_filename() {
        let request = ExportRequest {
            chain: Chain::Polygon,
            address: "0x742d35Cc6634C0532925a3b844Bc454e4438f44e".into(),
            range: range(),
            transactions: Vec::new(),
            opening_balance: None,
            current_balance: None,
            statistics: Statistics::default(),
        };
        assert_eq!(
            request.default_filename(ExportKind::Pdf),
            "polygon_0x742d35_statement_2024-01-01_to_2024-01-31.pdf"
        );
    }
}
