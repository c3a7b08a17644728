//! Domain models: networks, transactions, analysis results
//!
//! Pure data and pure functions only; nothing here touches the network
//! or the terminal.

mod analysis;
mod chain;
pub mod format;
mod transaction;
mod validate;

pub use analysis::{
    from_base_units, AnalysisResult, BalanceSnapshot, DateRange, Statistics, TokenBalance,
};
pub use chain::Chain;
pub use transaction::{Direction, Transaction, TxStatus, TxType};
pub use validate::validate_address;
