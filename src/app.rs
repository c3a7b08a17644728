//! Session controller: owns the store and mediates between keys, commands
//! and the background runtime.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::config::Config;
use crate::core::{parse_command, Action, Command, ExportTarget, NotifyLevel};
use crate::domain::{validate_address, AnalysisResult, Chain, DateRange, TokenBalance};
use crate::error::{GatewayError, ValidationError};
use crate::infrastructure::gateway::{ExportKind, ExportedFile, HealthStatus};
use crate::infrastructure::runtime::{RuntimeCommand, TaskKind};
use crate::modules::export::{self, Statement};
use crate::store::{parse_amount, PageMove, SortDirection, TransactionPatch, TransactionStore};

const STATUS_TTL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Command,
}

#[derive(Debug, Default)]
pub struct CommandBar {
    pub input: String,
    pub last: Option<String>,
}

#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    pub level: NotifyLevel,
    since: Instant,
}

/// A validated analysis query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub chain: Chain,
    pub address: String,
    pub range: DateRange,
}

pub struct App {
    pub store: TransactionStore,
    /// Query behind the loaded analysis
    pub query: Option<Query>,
    pub input_mode: InputMode,
    pub command: CommandBar,
    /// Selected row within the current page
    pub selected: usize,
    pub backend_url: String,
    pub health: Option<HealthStatus>,
    pub should_quit: bool,

    status: Option<StatusMessage>,
    export_dir: Option<PathBuf>,
    /// Latest issued analysis generation; older replies are discarded
    generation: u64,
    analysis_in_flight: Option<Query>,
    export_in_flight: bool,
    health_in_flight: bool,
    requests: VecDeque<RuntimeCommand>,
}

impl App {
    pub fn new(config: &Config) -> Self {
        Self {
            store: TransactionStore::with_page_size(config.page_size),
            query: None,
            input_mode: InputMode::Normal,
            command: CommandBar::default(),
            selected: 0,
            backend_url: config.backend_url.clone(),
            health: None,
            should_quit: false,
            status: None,
            export_dir: config.export_dir.clone(),
            generation: 0,
            analysis_in_flight: None,
            export_in_flight: false,
            health_in_flight: false,
            requests: VecDeque::new(),
        }
    }

    // === Status ===

    pub fn set_status(&mut self, text: impl Into<String>, level: NotifyLevel) {
        self.status = Some(StatusMessage {
            text: text.into(),
            level,
            since: Instant::now(),
        });
    }

    pub fn status_text(&self) -> Option<(&str, NotifyLevel)> {
        self.status
            .as_ref()
            .map(|status| (status.text.as_str(), status.level))
    }

    pub fn on_tick(&mut self) {
        if let Some(status) = self.status.as_ref() {
            if status.since.elapsed() > STATUS_TTL && status.level != NotifyLevel::Error {
                self.status = None;
            }
        }
    }

    pub fn apply_action(&mut self, action: Action) {
        match action {
            Action::None => {}
            Action::Notify(text, level) => self.set_status(text, level),
            Action::Quit => self.should_quit = true,
        }
    }

    // === Background requests ===

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_loading(&self) -> bool {
        self.analysis_in_flight.is_some()
    }

    pub fn is_exporting(&self) -> bool {
        self.export_in_flight
    }

    /// Drain commands queued for the runtime
    pub fn take_requests(&mut self) -> Vec<RuntimeCommand> {
        self.requests.drain(..).collect()
    }

    /// Validate a query and queue it. Nothing is sent when validation fails.
    pub fn request_analysis(&mut self, chain: &str, address: &str, start: &str, end: &str) -> Action {
        let query = match validate_query(chain, address, start, end) {
            Ok(query) => query,
            Err(err) => return Action::warn(err.to_string()),
        };

        if self.analysis_in_flight.as_ref() == Some(&query) {
            return Action::warn("Analysis already in progress");
        }

        self.submit_analysis(query)
    }

    fn submit_analysis(&mut self, query: Query) -> Action {
        self.generation += 1;
        info!(
            generation = self.generation,
            chain = %query.chain,
            address = %query.address,
            "analysis requested"
        );
        self.requests.push_back(RuntimeCommand::Analyze {
            generation: self.generation,
            chain: query.chain,
            address: query.address.clone(),
            range: query.range,
        });
        let message = format!(
            "Analyzing {} on {} ({})…",
            crate::domain::format::format_address(&query.address),
            query.chain.name(),
            query.range
        );
        self.analysis_in_flight = Some(query);
        Action::info(message)
    }

    /// Apply a finished analysis if it belongs to the latest request
    pub fn apply_analysis(&mut self, generation: u64, result: Arc<AnalysisResult>) {
        if generation != self.generation {
            warn!(generation, latest = self.generation, "discarding stale analysis");
            return;
        }
        let query = self.analysis_in_flight.take().unwrap_or_else(|| Query {
            chain: result.chain,
            address: result.address.clone(),
            range: result.range,
        });

        let result = Arc::unwrap_or_clone(result);
        let count = result.transactions.len();
        self.store.load(result);
        self.query = Some(query);
        self.selected = 0;

        if count == 0 {
            self.set_status("No transactions found for this period", NotifyLevel::Warn);
        } else {
            self.set_status(format!("Loaded {} transactions", count), NotifyLevel::Info);
        }
    }

    pub fn apply_gateway_error(&mut self, generation: u64, error: GatewayError) {
        if generation != self.generation {
            warn!(generation, "discarding stale analysis error");
            return;
        }
        self.analysis_in_flight = None;
        tracing::error!(%error, "analysis failed");
        self.set_status(format!("Analysis failed: {}", error.reason()), NotifyLevel::Error);
    }

    pub fn apply_export_result(&mut self, result: Result<ExportedFile, GatewayError>) {
        self.export_in_flight = false;
        let action = match result {
            Ok(file) => self.save_downloaded(&file),
            Err(err) => Action::error(format!("Export failed: {}", err.reason())),
        };
        self.apply_action(action);
    }

    pub fn apply_health(&mut self, result: Result<HealthStatus, GatewayError>) {
        self.health_in_flight = false;
        match result {
            Ok(status) => {
                let text = format!(
                    "Backend {} ({})",
                    status.status,
                    status.version.as_deref().unwrap_or("unknown version")
                );
                self.health = Some(status);
                self.set_status(text, NotifyLevel::Info);
            }
            Err(err) => {
                self.health = None;
                self.set_status(format!("Backend unreachable: {}", err.reason()), NotifyLevel::Error);
            }
        }
    }

    /// Catch-all for a background task that died unexpectedly
    pub fn apply_unexpected(&mut self, task: TaskKind, generation: Option<u64>, message: &str) {
        match task {
            TaskKind::Analysis => {
                if generation.is_some_and(|g| g != self.generation) {
                    warn!(?generation, latest = self.generation, "discarding stale task failure");
                    return;
                }
                self.analysis_in_flight = None;
            }
            TaskKind::Export => self.export_in_flight = false,
            TaskKind::Health => self.health_in_flight = false,
        }
        warn!(?task, reason = message, "background task failed unexpectedly");
        self.set_status("Unexpected error, please try again", NotifyLevel::Error);
    }

    // === Commands ===

    pub fn enter_command(&mut self) {
        self.input_mode = InputMode::Command;
        self.command.input.clear();
    }

    pub fn exit_command(&mut self) {
        self.input_mode = InputMode::Normal;
        self.command.input.clear();
    }

    pub fn apply_command(&mut self) {
        let input = self.command.input.trim().to_string();
        if input.is_empty() {
            self.exit_command();
            return;
        }
        let cmd = parse_command(&input);
        let action = self.execute_command(cmd);
        self.apply_action(action);
        self.command.last = Some(input);
        self.exit_command();
    }

    /// Run a command line without touching the command bar
    pub fn apply_command_text(&mut self, input: &str) {
        let action = self.execute_command(parse_command(input));
        self.apply_action(action);
    }

    pub fn execute_command(&mut self, cmd: Command) -> Action {
        match cmd {
            Command::Analyze {
                chain,
                address,
                start,
                end,
            } => self.request_analysis(&chain, &address, &start, &end),
            Command::Refresh => self.refresh(),

            Command::Filter(tx_type) => {
                let term = self.store.view_state().search_term.clone();
                self.store.apply_filter(tx_type, &term);
                self.selected = 0;
                match tx_type {
                    Some(t) => Action::info(format!("Showing {} transactions", t)),
                    None => Action::info("Showing all types"),
                }
            }
            Command::Search(term) => {
                let tx_type = self.store.view_state().type_filter;
                self.store.apply_filter(tx_type, &term);
                self.selected = 0;
                Action::None
            }
            Command::Sort { field, direction } => {
                match direction {
                    Some(direction) => self.store.sort(field, direction),
                    None => self.store.toggle_sort(field),
                }
                Action::None
            }
            Command::Page(direction) => {
                self.change_page(direction);
                Action::None
            }

            Command::Delete(hash) => self.delete_transaction(&hash),
            Command::Edit { hash, fields } => self.edit_transaction(&hash, &fields),
            Command::Opening { native, tokens } => self.override_balance(&native, &tokens, true),
            Command::Current { native, tokens } => self.override_balance(&native, &tokens, false),
            Command::Reset => self.reset_overlay(),

            Command::Export(target) => self.request_export(target),
            Command::Health => self.request_health(),
            Command::Quit => Action::Quit,

            Command::Usage(usage) => Action::warn(format!("Usage: {}", usage)),
            Command::Unknown(input) => Action::warn(format!("Unknown command: {}", input)),
        }
    }

    fn refresh(&mut self) -> Action {
        let Some(query) = self
            .analysis_in_flight
            .clone()
            .or_else(|| self.query.clone())
        else {
            return Action::warn("Nothing to refresh");
        };
        self.requests.push_back(RuntimeCommand::Invalidate);
        self.submit_analysis(query)
    }

    // === Table ===

    pub fn change_page(&mut self, direction: PageMove) {
        self.store.change_page(direction);
        self.selected = 0;
    }

    pub fn cycle_sort_field(&mut self) {
        let next = self.store.view_state().sort_field.next();
        self.store.sort(next, SortDirection::Asc);
    }

    pub fn toggle_sort_direction(&mut self) {
        let state = self.store.view_state();
        let (field, direction) = (state.sort_field, state.sort_direction.flipped());
        self.store.sort(field, direction);
    }

    pub fn move_selection_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn move_selection_down(&mut self) {
        let rows = self.store.page().len();
        if rows > 0 && self.selected + 1 < rows {
            self.selected += 1;
        }
    }

    pub fn selected_hash(&self) -> Option<String> {
        self.store.page().get(self.selected).map(|tx| tx.hash.clone())
    }

    fn clamp_selection(&mut self) {
        let rows = self.store.page().len();
        self.selected = self.selected.min(rows.saturating_sub(1));
    }

    // === Corrections ===

    pub fn delete_selected(&mut self) -> Action {
        match self.selected_hash() {
            Some(hash) => self.delete_transaction(&hash),
            None => Action::None,
        }
    }

    fn delete_transaction(&mut self, hash: &str) -> Action {
        let action = if self.store.delete_transaction(hash) {
            Action::info(format!(
                "Deleted {} (reset with u or :reset)",
                crate::domain::format::format_address(hash)
            ))
        } else {
            Action::warn(ValidationError::UnknownTransaction(hash.to_string()).to_string())
        };
        self.clamp_selection();
        action
    }

    fn edit_transaction(&mut self, hash: &str, fields: &[(String, String)]) -> Action {
        let mut patch = TransactionPatch::default();
        for (key, value) in fields {
            if let Err(err) = patch.set(key, value) {
                return Action::warn(err.to_string());
            }
        }
        match self.store.edit_transaction(hash, patch) {
            Ok(()) => {
                self.clamp_selection();
                Action::info(format!(
                    "Edited {}",
                    crate::domain::format::format_address(hash)
                ))
            }
            Err(err) => Action::warn(err.to_string()),
        }
    }

    fn override_balance(
        &mut self,
        native: &str,
        tokens: &[(String, String)],
        opening: bool,
    ) -> Action {
        if self.store.analysis().is_none() {
            return Action::warn("Run an analysis first");
        }
        let field = if opening { "opening balance" } else { "current balance" };
        let parsed = parse_amount(native, field).and_then(|native| {
            let tokens = tokens
                .iter()
                .map(|(symbol, amount)| {
                    parse_amount(amount, "token balance")
                        .map(|balance| TokenBalance::new(symbol.to_uppercase(), balance))
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok((native, tokens))
        });
        let result = parsed.and_then(|(native, tokens)| {
            if opening {
                self.store.set_opening_balance(native, tokens)
            } else {
                self.store.set_current_balance(native, tokens)
            }
        });
        match result {
            Ok(()) => Action::info(format!("Updated {}", field)),
            Err(err) => Action::warn(err.to_string()),
        }
    }

    pub fn reset_overlay(&mut self) -> Action {
        if self.store.overlay().is_empty() {
            return Action::None;
        }
        self.store.reset_overlay();
        self.clamp_selection();
        Action::info("Restored fetched data")
    }

    // === Export ===

    fn resolve_export_dir(&self) -> Result<PathBuf, Action> {
        export::export_dir(self.export_dir.as_deref())
            .map_err(|e| Action::error(format!("Failed to create export directory: {}", e)))
    }

    pub fn request_export(&mut self, target: ExportTarget) -> Action {
        let kind = match target {
            ExportTarget::LocalCsv => return self.export_local_csv(),
            ExportTarget::Pdf => ExportKind::Pdf,
            ExportTarget::ServerCsv => ExportKind::Csv,
        };
        if self.export_in_flight {
            return Action::warn("Export already in progress");
        }
        let statement = match Statement::from_store(&self.store) {
            Ok(statement) => statement,
            Err(err) => return Action::warn(err.to_string()),
        };
        self.export_in_flight = true;
        self.requests.push_back(RuntimeCommand::Export {
            kind,
            request: Box::new(statement.into_request()),
        });
        Action::info(format!("Generating {} statement…", kind.extension().to_uppercase()))
    }

    fn export_local_csv(&mut self) -> Action {
        let dir = match self.resolve_export_dir() {
            Ok(dir) => dir,
            Err(action) => return action,
        };
        match export::save_local_csv(&self.store, &dir) {
            Ok(path) => Action::info(format!("Exported statement to {}", path.display())),
            Err(err) => Action::error(format!("Export failed: {}", err)),
        }
    }

    fn save_downloaded(&self, file: &ExportedFile) -> Action {
        let dir = match self.resolve_export_dir() {
            Ok(dir) => dir,
            Err(action) => return action,
        };
        match export::save_download(&dir, file) {
            Ok(path) => Action::info(format!("Saved {}", path.display())),
            Err(err) => Action::error(format!("Export failed: {}", err)),
        }
    }

    pub fn request_health(&mut self) -> Action {
        if self.health_in_flight {
            return Action::None;
        }
        self.health_in_flight = true;
        self.requests.push_back(RuntimeCommand::Health);
        Action::info(format!("Checking {}…", self.backend_url))
    }
}

fn validate_query(chain: &str, address: &str, start: &str, end: &str) -> Result<Query, ValidationError> {
    let chain: Chain = chain.parse()?;
    let address = address.trim();
    validate_address(chain, address)?;
    let range = DateRange::parse(start, end)?;
    Ok(Query {
        chain,
        address: address.to_string(),
        range,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::BalanceSnapshot;
    use rust_decimal::Decimal;

    const ADDR: &str = "0x742d35Cc6634C0532925a3b844Bc454e4438f44e";

    fn app() -> App {
        App::new(&Config::default())
    }

    fn empty_result() -> Arc<AnalysisResult> {
        Arc::new(AnalysisResult::new(
            Chain::Ethereum,
            ADDR,
            DateRange::parse("2024-01-01", "2024-02-01").unwrap(),
            BalanceSnapshot::native_only(Decimal::ONE),
            Vec::new(),
        ))
    }

    #[test]
    fn test_invalid_query_sends_nothing() {
        let mut app = app();
        let action = app.request_analysis("eth", "0x123", "2024-01-01", "2024-02-01");
        assert!(matches!(action, Action::Notify(_, NotifyLevel::Warn)));
        let action = app.request_analysis("eth", ADDR, "2024-02-01", "2024-01-01");
        assert_eq!(
            action,
            Action::warn(ValidationError::InvalidDateRange.to_string())
        );
        assert!(app.take_requests().is_empty());
        assert_eq!(app.generation(), 0);
    }

    #[test]
    fn test_duplicate_request_is_refused() {
        let mut app = app();
        app.request_analysis("eth", ADDR, "2024-01-01", "2024-02-01");
        let again = app.request_analysis("ethereum", ADDR, "2024-01-01", "2024-02-01");
        assert_eq!(again, Action::warn("Analysis already in progress"));
        assert_eq!(app.take_requests().len(), 1);
    }

    #[test]
    fn test_stale_generation_is_discarded() {
        let mut app = app();
        app.request_analysis("eth", ADDR, "2024-01-01", "2024-02-01");
        app.request_analysis("polygon", ADDR, "2024-01-01", "2024-02-01");
        assert_eq!(app.generation(), 2);

        app.apply_analysis(1, empty_result());
        assert!(app.store.analysis().is_none());
        assert!(app.is_loading());

        app.apply_analysis(2, empty_result());
        assert!(app.store.analysis().is_some());
        assert!(!app.is_loading());
    }

    #[test]
    fn test_gateway_error_leaves_state() {
        let mut app = app();
        app.request_analysis("eth", ADDR, "2024-01-01", "2024-02-01");
        app.apply_analysis(1, empty_result());
        app.request_analysis("eth", ADDR, "2024-01-01", "2024-03-01");
        app.apply_gateway_error(2, GatewayError::Status { status: 503 });
        assert!(app.store.analysis().is_some());
        assert!(!app.is_loading());
        assert_eq!(app.status_text().unwrap().1, NotifyLevel::Error);
    }

    #[test]
    fn test_export_guard() {
        let mut app = app();
        assert!(matches!(
            app.request_export(ExportTarget::Pdf),
            Action::Notify(_, NotifyLevel::Warn)
        ));
        app.request_analysis("eth", ADDR, "2024-01-01", "2024-02-01");
        app.apply_analysis(1, empty_result());
        app.take_requests();

        app.request_export(ExportTarget::Pdf);
        assert!(app.is_exporting());
        assert_eq!(
            app.request_export(ExportTarget::ServerCsv),
            Action::warn("Export already in progress")
        );
        assert_eq!(app.take_requests().len(), 1);

        app.apply_export_result(Err(GatewayError::Backend("No data".into())));
        assert!(!app.is_exporting());
        assert_eq!(app.status_text().unwrap().0, "Export failed: backend error: No data");
    }

    #[test]
    fn test_unexpected_failure_clears_guard() {
        let mut app = app();
        app.request_analysis("eth", ADDR, "2024-01-01", "2024-02-01");
        app.apply_unexpected(TaskKind::Analysis, Some(1), "boom");
        assert!(!app.is_loading());
        assert!(!app.should_quit);
    }

    #[test]
    fn test_stale_task_failure_keeps_latest_request() {
        let mut app = app();
        app.request_analysis("eth", ADDR, "2024-01-01", "2024-02-01");
        app.request_analysis("polygon", ADDR, "2024-01-01", "2024-02-01");

        app.apply_unexpected(TaskKind::Analysis, Some(1), "boom");
        assert!(app.is_loading());
        assert!(app.status_text().is_none());

        app.apply_analysis(2, empty_result());
        assert!(app.store.analysis().is_some());
        assert!(!app.is_loading());
        assert_eq!(app.query.as_ref().map(|q| q.chain), Some(Chain::Polygon));
    }

    #[test]
    fn test_latest_result_applies_after_guard_cleared() {
        let mut app = app();
        app.request_analysis("eth", ADDR, "2024-01-01", "2024-02-01");
        app.apply_unexpected(TaskKind::Analysis, None, "boom");
        assert!(!app.is_loading());

        app.apply_analysis(1, empty_result());
        assert!(app.store.analysis().is_some());
        assert_eq!(app.query.as_ref().map(|q| q.address.as_str()), Some(ADDR));
    }
}
