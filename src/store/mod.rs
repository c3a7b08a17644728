//! Client-side state for the loaded analysis

mod overlay;
mod transactions;

pub use overlay::{parse_amount, EditOverlay, TransactionPatch};
pub use transactions::{
    DailyActivity, PageInfo, PageMove, SortDirection, SortField, TransactionStore, ViewState,
    DEFAULT_PAGE_SIZE,
};
