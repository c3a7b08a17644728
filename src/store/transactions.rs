//! Client-side transaction table: filter, sort, paginate
//!
//! The visible rows are recomputed from the fetched transactions, the edit
//! overlay and the view state after every mutation; nothing derived is ever
//! kept across mutations.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::overlay::{EditOverlay, TransactionPatch};
use crate::domain::{AnalysisResult, BalanceSnapshot, Statistics, TokenBalance, Transaction, TxType};
use crate::error::ValidationError;

pub const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Date,
    Hash,
    Type,
    Direction,
    Counterparty,
    Amount,
    Token,
    UsdValue,
    Status,
}

impl SortField {
    pub const ALL: [SortField; 9] = [
        SortField::Date,
        SortField::Hash,
        SortField::Type,
        SortField::Direction,
        SortField::Counterparty,
        SortField::Amount,
        SortField::Token,
        SortField::UsdValue,
        SortField::Status,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            SortField::Date => "Date",
            SortField::Hash => "Hash",
            SortField::Type => "Type",
            SortField::Direction => "Direction",
            SortField::Counterparty => "From/To",
            SortField::Amount => "Amount",
            SortField::Token => "Token",
            SortField::UsdValue => "USD Value",
            SortField::Status => "Status",
        }
    }

    pub fn parse(input: &str) -> Option<SortField> {
        match input.trim().to_lowercase().as_str() {
            "date" | "time" | "timestamp" => Some(SortField::Date),
            "hash" => Some(SortField::Hash),
            "type" => Some(SortField::Type),
            "direction" | "dir" => Some(SortField::Direction),
            "counterparty" | "address" | "from" | "to" => Some(SortField::Counterparty),
            "amount" => Some(SortField::Amount),
            "token" => Some(SortField::Token),
            "usd" | "usd_value" | "value" => Some(SortField::UsdValue),
            "status" => Some(SortField::Status),
            _ => None,
        }
    }

    /// Next field in column order (wraps)
    pub fn next(&self) -> SortField {
        let idx = SortField::ALL
            .iter()
            .position(|field| field == self)
            .unwrap_or(0);
        SortField::ALL[(idx + 1) % SortField::ALL.len()]
    }

    fn compare(&self, a: &Transaction, b: &Transaction) -> Ordering {
        match self {
            SortField::Date => a.timestamp.cmp(&b.timestamp),
            SortField::Hash => a.hash.cmp(&b.hash),
            SortField::Type => a.tx_type.label().cmp(b.tx_type.label()),
            SortField::Direction => a.direction.cmp(&b.direction),
            SortField::Counterparty => a
                .counterparty()
                .to_lowercase()
                .cmp(&b.counterparty().to_lowercase()),
            SortField::Amount => a.amount.cmp(&b.amount),
            SortField::Token => a.token_symbol.cmp(&b.token_symbol),
            SortField::UsdValue => a.usd_value.cmp(&b.usd_value),
            SortField::Status => a.status.label().cmp(b.status.label()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn flipped(&self) -> SortDirection {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    pub fn arrow(&self) -> &'static str {
        match self {
            SortDirection::Asc => "↑",
            SortDirection::Desc => "↓",
        }
    }

    pub fn parse(input: &str) -> Option<SortDirection> {
        match input.trim().to_lowercase().as_str() {
            "asc" | "ascending" | "up" => Some(SortDirection::Asc),
            "desc" | "descending" | "down" => Some(SortDirection::Desc),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageMove {
    Next,
    Prev,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub sort_field: SortField,
    pub sort_direction: SortDirection,
    pub type_filter: Option<TxType>,
    pub search_term: String,
    /// 1-based
    pub current_page: usize,
    pub page_size: usize,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            sort_field: SortField::Date,
            sort_direction: SortDirection::Desc,
            type_filter: None,
            search_term: String::new(),
            current_page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Pagination summary. `Empty` is distinct from "page 1 of 1".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageInfo {
    Empty,
    Page {
        current: usize,
        total: usize,
        /// 1-based row numbers of the first and last visible row
        first_row: usize,
        last_row: usize,
        count: usize,
    },
}

impl PageInfo {
    pub fn has_prev(&self) -> bool {
        matches!(self, PageInfo::Page { current, .. } if *current > 1)
    }

    pub fn has_next(&self) -> bool {
        matches!(self, PageInfo::Page { current, total, .. } if current < total)
    }
}

impl fmt::Display for PageInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageInfo::Empty => f.write_str("No transactions"),
            PageInfo::Page { current, total, .. } => write!(f, "Page {} of {}", current, total),
        }
    }
}

/// One day of activity for the volume and balance panels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyActivity {
    pub day: NaiveDate,
    pub volume: Decimal,
    pub net_change: Decimal,
}

#[derive(Debug, Default)]
pub struct TransactionStore {
    analysis: Option<AnalysisResult>,
    overlay: EditOverlay,
    view_state: ViewState,
    view: Vec<Transaction>,
}

impl TransactionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page_size(page_size: usize) -> Self {
        let mut store = Self::new();
        store.view_state.page_size = page_size.max(1);
        store
    }

    /// Replace the whole session with a new analysis
    pub fn load(&mut self, mut result: AnalysisResult) {
        result.transactions = dedup_by_hash(std::mem::take(&mut result.transactions));
        self.analysis = Some(result);
        self.overlay.reset();
        self.view_state.type_filter = None;
        self.view_state.search_term.clear();
        self.view_state.current_page = 1;
        self.refresh();
    }

    pub fn analysis(&self) -> Option<&AnalysisResult> {
        self.analysis.as_ref()
    }

    pub fn overlay(&self) -> &EditOverlay {
        &self.overlay
    }

    pub fn view_state(&self) -> &ViewState {
        &self.view_state
    }

    pub fn original_transactions(&self) -> &[Transaction] {
        self.analysis
            .as_ref()
            .map(|a| a.transactions.as_slice())
            .unwrap_or(&[])
    }

    // === View ===

    pub fn apply_filter(&mut self, type_filter: Option<TxType>, search_term: &str) {
        self.view_state.type_filter = type_filter;
        self.view_state.search_term = search_term.trim().to_string();
        self.view_state.current_page = 1;
        self.refresh();
    }

    pub fn sort(&mut self, field: SortField, direction: SortDirection) {
        self.view_state.sort_field = field;
        self.view_state.sort_direction = direction;
        self.refresh();
    }

    /// Header-click behaviour: same field flips, a new field starts ascending
    pub fn toggle_sort(&mut self, field: SortField) {
        let direction = if self.view_state.sort_field == field {
            self.view_state.sort_direction.flipped()
        } else {
            SortDirection::Asc
        };
        self.sort(field, direction);
    }

    /// Filtered and sorted rows, all pages
    pub fn filtered(&self) -> &[Transaction] {
        &self.view
    }

    pub fn page(&self) -> &[Transaction] {
        if self.view.is_empty() {
            return &[];
        }
        let size = self.view_state.page_size;
        let start = (self.view_state.current_page - 1) * size;
        let end = (start + size).min(self.view.len());
        self.view.get(start..end).unwrap_or(&[])
    }

    pub fn total_pages(&self) -> usize {
        self.view.len().div_ceil(self.view_state.page_size).max(1)
    }

    pub fn current_page(&self) -> usize {
        self.view_state.current_page
    }

    pub fn change_page(&mut self, direction: PageMove) {
        let total = self.total_pages();
        match direction {
            PageMove::Next if self.view_state.current_page < total => {
                self.view_state.current_page += 1
            }
            PageMove::Prev if self.view_state.current_page > 1 => {
                self.view_state.current_page -= 1
            }
            _ => {}
        }
    }

    pub fn is_empty(&self) -> bool {
        self.view.is_empty()
    }

    pub fn page_info(&self) -> PageInfo {
        if self.view.is_empty() {
            return PageInfo::Empty;
        }
        let size = self.view_state.page_size;
        let current = self.view_state.current_page;
        let first_row = (current - 1) * size + 1;
        PageInfo::Page {
            current,
            total: self.total_pages(),
            first_row,
            last_row: (first_row + size - 1).min(self.view.len()),
            count: self.view.len(),
        }
    }

    // === Overlay ===

    /// Returns whether the hash was newly deleted. Unknown hashes are ignored.
    pub fn delete_transaction(&mut self, hash: &str) -> bool {
        if !self.contains(hash) {
            return false;
        }
        let changed = self.overlay.delete_transaction(hash);
        self.refresh();
        changed
    }

    pub fn edit_transaction(
        &mut self,
        hash: &str,
        patch: TransactionPatch,
    ) -> Result<(), ValidationError> {
        if !self.contains(hash) {
            return Err(ValidationError::UnknownTransaction(hash.to_string()));
        }
        self.overlay.edit_transaction(hash, patch)?;
        self.refresh();
        Ok(())
    }

    pub fn set_opening_balance(
        &mut self,
        native: Decimal,
        tokens: Vec<TokenBalance>,
    ) -> Result<(), ValidationError> {
        self.overlay.set_opening_balance(native, tokens)
    }

    pub fn set_current_balance(
        &mut self,
        native: Decimal,
        tokens: Vec<TokenBalance>,
    ) -> Result<(), ValidationError> {
        self.overlay.set_current_balance(native, tokens)
    }

    pub fn reset_overlay(&mut self) {
        self.overlay.reset();
        self.refresh();
    }

    // === Effective data (display and export) ===

    pub fn effective_transactions(&self) -> Vec<Transaction> {
        self.overlay.apply(self.original_transactions())
    }

    /// Every effective transaction in the current sort order, ignoring filters
    pub fn sorted_transactions(&self) -> Vec<Transaction> {
        let mut rows = self.effective_transactions();
        sort_rows(&mut rows, self.view_state.sort_field, self.view_state.sort_direction);
        rows
    }

    pub fn effective_statistics(&self) -> Statistics {
        Statistics::from_transactions(&self.effective_transactions())
    }

    pub fn effective_balance(&self) -> Option<BalanceSnapshot> {
        self.overlay
            .current_balance()
            .cloned()
            .or_else(|| self.analysis.as_ref().map(|a| a.balance.clone()))
    }

    pub fn effective_opening_balance(&self) -> Option<BalanceSnapshot> {
        self.overlay.opening_balance().cloned().or_else(|| {
            self.analysis
                .as_ref()
                .and_then(|a| a.opening_balance.clone())
        })
    }

    /// Count per type over effective transactions, in first-seen order
    pub fn type_breakdown(&self) -> Vec<(TxType, usize)> {
        let mut out: Vec<(TxType, usize)> = Vec::new();
        for tx in self.effective_transactions() {
            match out.iter_mut().find(|(t, _)| *t == tx.tx_type) {
                Some((_, count)) => *count += 1,
                None => out.push((tx.tx_type, 1)),
            }
        }
        out
    }

    /// Volume and net change per UTC day, oldest first
    pub fn daily_activity(&self) -> Vec<DailyActivity> {
        let mut days: BTreeMap<NaiveDate, (Decimal, Decimal)> = BTreeMap::new();
        for tx in self.effective_transactions() {
            let entry = days
                .entry(tx.timestamp.date_naive())
                .or_insert((Decimal::ZERO, Decimal::ZERO));
            entry.0 += tx.amount;
            entry.1 += tx.signed_amount();
        }
        days.into_iter()
            .map(|(day, (volume, net_change))| DailyActivity {
                day,
                volume,
                net_change,
            })
            .collect()
    }

    fn contains(&self, hash: &str) -> bool {
        self.original_transactions().iter().any(|tx| tx.hash == hash)
    }

    fn refresh(&mut self) {
        let state = &self.view_state;
        let term = state.search_term.to_lowercase();
        let mut view: Vec<Transaction> = self
            .overlay
            .apply(self.original_transactions())
            .into_iter()
            .filter(|tx| state.type_filter.map_or(true, |t| tx.tx_type == t))
            .filter(|tx| term.is_empty() || matches_search(tx, &term))
            .collect();

        sort_rows(&mut view, state.sort_field, state.sort_direction);

        self.view = view;
        let total = self.total_pages();
        self.view_state.current_page = self.view_state.current_page.clamp(1, total);
    }
}

// sort_by is stable, so ties keep fetch order in both directions
fn sort_rows(rows: &mut [Transaction], field: SortField, direction: SortDirection) {
    match direction {
        SortDirection::Asc => rows.sort_by(|a, b| field.compare(a, b)),
        SortDirection::Desc => rows.sort_by(|a, b| field.compare(b, a)),
    }
}

fn matches_search(tx: &Transaction, term: &str) -> bool {
    tx.hash.to_lowercase().contains(term)
        || tx.tx_type.label().to_lowercase().contains(term)
        || tx.counterparty().to_lowercase().contains(term)
}

fn dedup_by_hash(transactions: Vec<Transaction>) -> Vec<Transaction> {
    let mut seen = std::collections::HashSet::new();
    let before = transactions.len();
    let unique: Vec<Transaction> = transactions
        .into_iter()
        .filter(|tx| seen.insert(tx.hash.clone()))
        .collect();
    if unique.len() != before {
        tracing::warn!(
            dropped = before - unique.len(),
            "duplicate transaction hashes in analysis result"
        );
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Chain, DateRange, Direction, TxStatus};
    use chrono::{TimeZone, Utc};

    fn tx(hash: &str, day: u32, tx_type: TxType, direction: Direction, amount: i64) -> Transaction {
        Transaction {
            hash: hash.to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 1, day, 12, 0, 0).unwrap(),
            tx_type,
            direction,
            from: format!("0xsender{hash}"),
            to: format!("0xreceiver{hash}"),
            amount: Decimal::from(amount),
            token_symbol: None,
            usd_value: None,
            status: TxStatus::Success,
            block_number: None,
            gas_used: None,
            gas_price: None,
            fee: None,
            edited: false,
        }
    }

    fn result(transactions: Vec<Transaction>) -> AnalysisResult {
        AnalysisResult::new(
            Chain::Ethereum,
            "0x742d35Cc6634C0532925a3b844Bc454e4438f44e",
            DateRange::parse("2024-01-01", "2024-02-01").unwrap(),
            BalanceSnapshot::native_only(Decimal::TEN),
            transactions,
        )
    }

    fn hashes(txs: &[Transaction]) -> Vec<&str> {
        txs.iter().map(|tx| tx.hash.as_str()).collect()
    }

    #[test]
    fn test_empty_store_reports_empty_page() {
        let mut store = TransactionStore::new();
        assert!(store.is_empty());
        assert!(store.page().is_empty());
        assert_eq!(store.total_pages(), 1);
        assert_eq!(store.page_info(), PageInfo::Empty);
        assert_eq!(store.page_info().to_string(), "No transactions");
        store.change_page(PageMove::Next);
        store.change_page(PageMove::Prev);
        assert_eq!(store.current_page(), 1);

        store.load(result(Vec::new()));
        assert_eq!(store.page_info(), PageInfo::Empty);
    }

    #[test]
    fn test_pagination_bounds() {
        let txs = (1..=25)
            .map(|i| tx(&format!("h{i}"), i, TxType::Transfer, Direction::In, 1))
            .collect();
        let mut store = TransactionStore::new();
        store.load(result(txs));

        assert_eq!(store.total_pages(), 3);
        assert_eq!(store.page().len(), 10);
        store.change_page(PageMove::Prev);
        assert_eq!(store.current_page(), 1);

        store.change_page(PageMove::Next);
        store.change_page(PageMove::Next);
        assert_eq!(store.current_page(), 3);
        assert_eq!(store.page().len(), 5);
        store.change_page(PageMove::Next);
        assert_eq!(store.current_page(), 3);
        assert_eq!(
            store.page_info(),
            PageInfo::Page {
                current: 3,
                total: 3,
                first_row: 21,
                last_row: 25,
                count: 25
            }
        );
        assert_eq!(store.page_info().to_string(), "Page 3 of 3");
    }

    #[test]
    fn test_filter_by_type_resets_page() {
        let mut txs: Vec<Transaction> = (1..=12)
            .map(|i| tx(&format!("t{i}"), i, TxType::Transfer, Direction::In, 1))
            .collect();
        txs.push(tx("s1", 13, TxType::Swap, Direction::Out, 2));
        txs.push(tx("s2", 14, TxType::Swap, Direction::In, 3));
        let mut store = TransactionStore::new();
        store.load(result(txs));
        store.change_page(PageMove::Next);
        assert_eq!(store.current_page(), 2);

        store.apply_filter(Some(TxType::Swap), "");
        assert_eq!(store.current_page(), 1);
        let mut got = hashes(store.filtered());
        got.sort();
        assert_eq!(got, vec!["s1", "s2"]);
    }

    #[test]
    fn test_search_is_case_insensitive_over_hash_type_counterparty() {
        let txs = vec![
            tx("0xAAA", 1, TxType::Transfer, Direction::In, 1),
            tx("0xBBB", 2, TxType::Stake, Direction::Out, 1),
            tx("0xCCC", 3, TxType::Mint, Direction::In, 1),
        ];
        let mut store = TransactionStore::new();
        store.load(result(txs));

        store.apply_filter(None, "aaa");
        assert_eq!(hashes(store.filtered()), vec!["0xAAA"]);

        store.apply_filter(None, "STAKE");
        assert_eq!(hashes(store.filtered()), vec!["0xBBB"]);

        // outgoing counterparty is the receiver
        store.apply_filter(None, "receiver0xbbb");
        assert_eq!(hashes(store.filtered()), vec!["0xBBB"]);
        store.apply_filter(None, "sender0xbbb");
        assert!(store.filtered().is_empty());
        assert_eq!(store.page_info(), PageInfo::Empty);
    }

    #[test]
    fn test_sort_is_stable_and_reversible() {
        let txs = vec![
            tx("a", 1, TxType::Transfer, Direction::In, 5),
            tx("b", 2, TxType::Transfer, Direction::In, 5),
            tx("c", 3, TxType::Transfer, Direction::In, 1),
            tx("d", 4, TxType::Transfer, Direction::In, 5),
        ];
        let mut store = TransactionStore::new();
        store.load(result(txs));

        store.sort(SortField::Amount, SortDirection::Asc);
        assert_eq!(hashes(store.filtered()), vec!["c", "a", "b", "d"]);
        store.sort(SortField::Amount, SortDirection::Desc);
        assert_eq!(hashes(store.filtered()), vec!["a", "b", "d", "c"]);

        store.sort(SortField::Date, SortDirection::Desc);
        let desc: Vec<String> = store.filtered().iter().map(|t| t.hash.clone()).collect();
        store.sort(SortField::Date, SortDirection::Asc);
        let mut asc: Vec<String> = store.filtered().iter().map(|t| t.hash.clone()).collect();
        asc.reverse();
        assert_eq!(desc, asc);
    }

    #[test]
    fn test_toggle_sort() {
        let mut store = TransactionStore::new();
        store.toggle_sort(SortField::Date);
        assert_eq!(store.view_state().sort_direction, SortDirection::Asc);
        store.toggle_sort(SortField::Date);
        assert_eq!(store.view_state().sort_direction, SortDirection::Desc);
        store.toggle_sort(SortField::Amount);
        assert_eq!(store.view_state().sort_field, SortField::Amount);
        assert_eq!(store.view_state().sort_direction, SortDirection::Asc);
    }

    #[test]
    fn test_delete_reset_scenario() {
        let txs = vec![
            tx("A", 1, TxType::Transfer, Direction::In, 1),
            tx("B", 2, TxType::Transfer, Direction::In, 1),
            tx("C", 3, TxType::Transfer, Direction::In, 1),
        ];
        let mut store = TransactionStore::new();
        store.load(result(txs.clone()));

        store.sort(SortField::Date, SortDirection::Asc);
        assert_eq!(hashes(store.filtered()), vec!["A", "B", "C"]);

        assert!(store.delete_transaction("B"));
        assert_eq!(hashes(&store.effective_transactions()), vec!["A", "C"]);
        assert_eq!(hashes(store.filtered()), vec!["A", "C"]);

        store.reset_overlay();
        assert_eq!(store.effective_transactions(), txs);
    }

    #[test]
    fn test_delete_clamps_page() {
        let txs = (1..=11)
            .map(|i| tx(&format!("h{i}"), i, TxType::Transfer, Direction::In, 1))
            .collect();
        let mut store = TransactionStore::new();
        store.load(result(txs));
        store.change_page(PageMove::Next);
        assert_eq!(store.current_page(), 2);
        let last = store.page()[0].hash.clone();
        store.delete_transaction(&last);
        assert_eq!(store.current_page(), 1);
        assert!(!store.delete_transaction("missing"));
    }

    #[test]
    fn test_load_clears_overlay_and_filters() {
        let mut store = TransactionStore::new();
        store.load(result(vec![tx("a", 1, TxType::Swap, Direction::In, 1)]));
        store.delete_transaction("a");
        store.apply_filter(Some(TxType::Swap), "a");
        store.sort(SortField::Amount, SortDirection::Asc);

        store.load(result(vec![tx("b", 2, TxType::Transfer, Direction::In, 1)]));
        assert!(store.overlay().is_empty());
        assert_eq!(store.view_state().type_filter, None);
        assert_eq!(store.view_state().search_term, "");
        assert_eq!(store.view_state().sort_field, SortField::Amount);
        assert_eq!(hashes(store.filtered()), vec!["b"]);
    }

    #[test]
    fn test_edit_updates_statistics_and_view() {
        let mut store = TransactionStore::new();
        store.load(result(vec![
            tx("a", 1, TxType::Transfer, Direction::In, 10),
            tx("b", 2, TxType::Transfer, Direction::Out, 4),
        ]));
        assert_eq!(store.effective_statistics().net_change, Decimal::from(6));

        let patch = TransactionPatch {
            direction: Some(Direction::In),
            tx_type: Some(TxType::Deposit),
            ..Default::default()
        };
        store.edit_transaction("b", patch).unwrap();
        let stats = store.effective_statistics();
        assert_eq!(stats.total_in, Decimal::from(14));
        assert_eq!(stats.total_out, Decimal::ZERO);

        store.apply_filter(Some(TxType::Deposit), "");
        assert_eq!(hashes(store.filtered()), vec!["b"]);
        assert!(store.filtered()[0].edited);

        assert_eq!(
            store.edit_transaction("zzz", TransactionPatch::default()),
            Err(ValidationError::UnknownTransaction("zzz".into()))
        );
    }

    #[test]
    fn test_balance_overrides_take_precedence() {
        let mut store = TransactionStore::new();
        store.load(result(Vec::new()));
        assert_eq!(store.effective_balance().unwrap().native, Decimal::TEN);
        assert!(store.effective_opening_balance().is_none());

        store.set_current_balance(Decimal::ONE, Vec::new()).unwrap();
        store
            .set_opening_balance(Decimal::TWO, vec![TokenBalance::new("USDT", Decimal::TEN)])
            .unwrap();
        assert_eq!(store.effective_balance().unwrap().native, Decimal::ONE);
        assert_eq!(store.effective_opening_balance().unwrap().tokens.len(), 1);

        store.reset_overlay();
        assert_eq!(store.effective_balance().unwrap().native, Decimal::TEN);
    }

    #[test]
    fn test_duplicate_hashes_are_dropped_on_load() {
        let mut store = TransactionStore::new();
        store.load(result(vec![
            tx("a", 1, TxType::Transfer, Direction::In, 1),
            tx("a", 2, TxType::Swap, Direction::In, 9),
        ]));
        assert_eq!(store.original_transactions().len(), 1);
        assert_eq!(store.original_transactions()[0].tx_type, TxType::Transfer);
    }

    #[test]
    fn test_breakdown_and_daily_activity() {
        let mut store = TransactionStore::new();
        store.load(result(vec![
            tx("a", 2, TxType::Swap, Direction::In, 3),
            tx("b", 1, TxType::Transfer, Direction::Out, 1),
            tx("c", 2, TxType::Swap, Direction::Out, 1),
        ]));
        assert_eq!(
            store.type_breakdown(),
            vec![(TxType::Swap, 2), (TxType::Transfer, 1)]
        );
        let days = store.daily_activity();
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].net_change, Decimal::from(-1));
        assert_eq!(days[1].volume, Decimal::from(4));
        assert_eq!(days[1].net_change, Decimal::from(2));
    }
}
