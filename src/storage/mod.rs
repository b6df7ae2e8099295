pub mod history;
pub mod shared;

pub use history::{HistoryCache, HistoryLookup};
pub use shared::SharedHistory;
