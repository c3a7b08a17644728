//! Plain display data derived from the store
//!
//! Everything here is terminal-agnostic; `draw` only styles and lays out.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::domain::format::{
    format_address, format_amount, format_change, format_date, format_percent,
    format_signed_amount, format_usd,
};
use crate::domain::{Chain, Direction, TxStatus};
use crate::store::{PageInfo, SortField, TransactionStore};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    pub hash: String,
    pub date: String,
    pub tx_type: String,
    pub direction: String,
    pub counterparty: String,
    pub amount: String,
    pub token: String,
    pub usd_value: String,
    pub status: String,
    pub incoming: bool,
    pub failed: bool,
    pub edited: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryCard {
    pub title: &'static str,
    pub value: String,
    pub detail: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakdownRow {
    pub label: String,
    pub count: usize,
    /// Share of all effective transactions, 0-100
    pub percent: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyBar {
    /// Volume in thousandths of a native unit
    pub height: u64,
    pub positive: bool,
}

fn chain_of(store: &TransactionStore) -> Chain {
    store
        .analysis()
        .map(|a| a.chain)
        .unwrap_or(Chain::Ethereum)
}

/// Column titles with the sort arrow on the active column
pub fn column_titles(store: &TransactionStore) -> Vec<String> {
    let state = store.view_state();
    SortField::ALL
        .iter()
        .map(|field| {
            if *field == state.sort_field {
                format!("{} {}", field.title(), state.sort_direction.arrow())
            } else {
                field.title().to_string()
            }
        })
        .collect()
}

/// Rows of the current page
pub fn table_rows(store: &TransactionStore) -> Vec<TableRow> {
    let chain = chain_of(store);
    let (symbol, decimals) = (chain.symbol(), chain.display_decimals());
    store
        .page()
        .iter()
        .map(|tx| TableRow {
            hash: format_address(&tx.hash),
            date: format_date(tx.timestamp),
            tx_type: tx.tx_type.label().to_string(),
            direction: match tx.direction {
                Direction::In => "IN".to_string(),
                Direction::Out => "OUT".to_string(),
            },
            counterparty: format_address(tx.counterparty()),
            amount: format_signed_amount(tx, symbol, decimals),
            token: tx.token_or(symbol).to_string(),
            usd_value: format_usd(tx.usd_value),
            status: tx.status.label().to_string(),
            incoming: tx.direction == Direction::In,
            failed: tx.status == TxStatus::Failed,
            edited: tx.edited,
        })
        .collect()
}

pub fn summary_cards(store: &TransactionStore) -> Vec<SummaryCard> {
    let Some(analysis) = store.analysis() else {
        return Vec::new();
    };
    let (symbol, decimals) = (analysis.chain.symbol(), analysis.chain.display_decimals());
    let stats = store.effective_statistics();
    let balance = store.effective_balance().unwrap_or_default();

    let mut cards = vec![
        SummaryCard {
            title: "Current Balance",
            value: format_amount(balance.native, symbol, decimals),
            detail: (!balance.tokens.is_empty())
                .then(|| format!("+{} tokens", balance.tokens.len())),
        },
        SummaryCard {
            title: "Net Change",
            value: format_change(stats.net_change, symbol, decimals),
            detail: Some(format_percent(stats.net_change_percent(balance.native))),
        },
        SummaryCard {
            title: "Total In",
            value: format_amount(stats.total_in, symbol, decimals),
            detail: None,
        },
        SummaryCard {
            title: "Total Out",
            value: format_amount(stats.total_out, symbol, decimals),
            detail: None,
        },
        SummaryCard {
            title: "Transactions",
            value: stats.count.to_string(),
            detail: edits_detail(store),
        },
    ];

    if let Some(opening) = store.effective_opening_balance() {
        cards.insert(
            0,
            SummaryCard {
                title: "Opening Balance",
                value: format_amount(opening.native, symbol, decimals),
                detail: Some(format!("as of {}", analysis.range.start())),
            },
        );
    }
    cards
}

fn edits_detail(store: &TransactionStore) -> Option<String> {
    let overlay = store.overlay();
    let (deleted, edited) = (overlay.deleted_count(), overlay.edited_count());
    match (deleted, edited) {
        (0, 0) => None,
        (d, 0) => Some(format!("{} deleted", d)),
        (0, e) => Some(format!("{} edited", e)),
        (d, e) => Some(format!("{} deleted, {} edited", d, e)),
    }
}

pub fn pagination_label(store: &TransactionStore) -> String {
    match store.page_info() {
        PageInfo::Empty => "No transactions".to_string(),
        info @ PageInfo::Page {
            first_row,
            last_row,
            count,
            ..
        } => format!("Showing {}-{} of {}  ·  {}", first_row, last_row, count, info),
    }
}

pub fn type_breakdown(store: &TransactionStore) -> Vec<BreakdownRow> {
    let breakdown = store.type_breakdown();
    let total: usize = breakdown.iter().map(|(_, count)| count).sum();
    breakdown
        .into_iter()
        .map(|(tx_type, count)| BreakdownRow {
            label: tx_type.label().to_string(),
            count,
            percent: if total == 0 {
                0
            } else {
                ((count * 100 + total / 2) / total) as u16
            },
        })
        .collect()
}

pub fn daily_bars(store: &TransactionStore) -> Vec<DailyBar> {
    let scale = Decimal::from(1000);
    store
        .daily_activity()
        .into_iter()
        .map(|day| DailyBar {
            height: (day.volume * scale).round().to_u64().unwrap_or(u64::MAX),
            positive: day.net_change >= Decimal::ZERO,
        })
        .collect()
}
