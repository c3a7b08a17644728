//! CSV Export
//!
//! Writes an account statement: a metadata block followed by the
//! transaction table.

use std::io::Write;

use rust_decimal::Decimal;

use super::Statement;
use crate::domain::Transaction;
use crate::error::ExportError;

const TRANSACTION_HEADER: [&str; 13] = [
    "Date",
    "Hash",
    "Type",
    "Direction",
    "From",
    "To",
    "Amount",
    "Token",
    "USD Value",
    "Status",
    "Block",
    "Gas Used",
    "Gas Price",
];

fn amount(value: Decimal) -> String {
    format!("{:.8}", value)
}

fn optional<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Write a statement, returning the number of transaction rows
pub fn write_statement<W: Write>(writer: W, statement: &Statement) -> Result<usize, ExportError> {
    // Metadata rows have fewer columns than the table
    let mut wtr = csv::WriterBuilder::new().flexible(true).from_writer(writer);
    let symbol = statement.chain.symbol();

    wtr.write_record(["Blockchain Account Statement"])?;
    wtr.write_record(["Network", statement.chain.name()])?;
    wtr.write_record(["Address", statement.address.as_str()])?;
    wtr.write_record(["Date Range", statement.range.to_string().as_str()])?;
    wtr.write_record([
        "Generated",
        statement
            .generated_at
            .format("%Y-%m-%d %H:%M:%S")
            .to_string()
            .as_str(),
    ])?;
    wtr.write_record([
        "Total Transactions",
        statement.statistics.count.to_string().as_str(),
    ])?;
    wtr.write_record(["Total In", amount(statement.statistics.total_in).as_str(), symbol])?;
    wtr.write_record(["Total Out", amount(statement.statistics.total_out).as_str(), symbol])?;
    wtr.write_record([
        "Net Change",
        amount(statement.statistics.net_change).as_str(),
        symbol,
    ])?;

    if let Some(opening) = &statement.opening_balance {
        wtr.write_record(["Opening Balance", amount(opening.native).as_str(), symbol])?;
        for token in &opening.tokens {
            wtr.write_record([
                "Opening Balance",
                amount(token.balance).as_str(),
                token.symbol.as_str(),
            ])?;
        }
    }

    if let Some(current) = &statement.current_balance {
        wtr.write_record(["Current Balance", amount(current.native).as_str(), symbol])?;
        for token in &current.tokens {
            wtr.write_record([
                "Current Balance",
                amount(token.balance).as_str(),
                token.symbol.as_str(),
            ])?;
        }
    }

    wtr.write_record([""])?;
    wtr.write_record(["Transactions:"])?;
    wtr.write_record(TRANSACTION_HEADER)?;

    for tx in &statement.transactions {
        wtr.write_record(transaction_record(tx, symbol))?;
    }

    wtr.flush()?;
    Ok(statement.transactions.len())
}

fn transaction_record(tx: &Transaction, native_symbol: &str) -> [String; 13] {
    [
        tx.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
        tx.hash.clone(),
        tx.tx_type.label().to_string(),
        tx.direction.label().to_string(),
        tx.from.clone(),
        tx.to.clone(),
        amount(tx.amount),
        tx.token_or(native_symbol).to_string(),
        tx.usd_value.map(|v| format!("{:.2}", v)).unwrap_or_default(),
        tx.status.label().to_string(),
        optional(tx.block_number),
        optional(tx.gas_used),
        optional(tx.gas_price),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        BalanceSnapshot, Chain, DateRange, Direction, Statistics, TokenBalance, TxStatus, TxType,
    };
    use chrono::{Local, TimeZone, Utc};

    fn statement(transactions: Vec<Transaction>) -> Statement {
        Statement {
            chain: Chain::Ethereum,
            address: "0xabc".to_string(),
            range: DateRange::parse("2024-01-01", "2024-01-31").unwrap(),
            generated_at: Local.with_ymd_and_hms(2024, 2, 1, 9, 30, 0).unwrap(),
            statistics: Statistics::from_transactions(&transactions),
            opening_balance: None,
            current_balance: Some(BalanceSnapshot::new(
                Decimal::new(25, 1),
                vec![TokenBalance::new("USDT", Decimal::from(100))],
            )),
            transactions,
        }
    }

    fn tx(hash: &str) -> Transaction {
        Transaction {
            hash: hash.to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 1, 5, 14, 3, 0).unwrap(),
            tx_type: TxType::Swap,
            direction: Direction::Out,
            from: "0xabc".to_string(),
            to: "0xdef, router".to_string(),
            amount: Decimal::new(15, 1),
            token_symbol: None,
            usd_value: Some(Decimal::new(300012, 2)),
            status: TxStatus::Success,
            block_number: Some(19_000_000),
            gas_used: None,
            gas_price: None,
            fee: None,
            edited: false,
        }
    }

    #[test]
    fn test_write_statement_layout() {
        let mut out = Vec::new();
        let rows = write_statement(&mut out, &statement(vec![tx("0x1"), tx("0x2")])).unwrap();
        assert_eq!(rows, 2);

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Blockchain Account Statement");
        assert_eq!(lines[1], "Network,Ethereum");
        assert_eq!(lines[3], "Date Range,2024-01-01 to 2024-01-31");
        assert_eq!(lines[4], "Generated,2024-02-01 09:30:00");
        assert!(lines.contains(&"Total Out,1.50000000,ETH"));
        assert!(lines.contains(&"Current Balance,2.50000000,ETH"));
        assert!(lines.contains(&"Current Balance,100.00000000,USDT"));
        assert!(!text.contains("Opening Balance"));

        let table = lines.iter().position(|l| *l == "Transactions:").unwrap();
        assert_eq!(
            lines[table + 1],
            "Date,Hash,Type,Direction,From,To,Amount,Token,USD Value,Status,Block,Gas Used,Gas Price"
        );
        assert_eq!(
            lines[table + 2],
            "2024-01-05 14:03:00,0x1,Swap,out,0xabc,\"0xdef, router\",1.50000000,ETH,3000.12,Success,19000000,,"
        );
        assert_eq!(lines.len(), table + 4);
    }

    #[test]
    fn test_write_statement_empty_table() {
        let mut out = Vec::new();
        let rows = write_statement(&mut out, &statement(Vec::new())).unwrap();
        assert_eq!(rows, 0);
        let text = String::from_utf8(out).unwrap();
        assert!(text.trim_end().ends_with("Gas Price"));
        assert!(text.contains("Total Transactions,0"));
    }
}
