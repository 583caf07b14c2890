pub mod history;
pub mod models;
pub mod summary;

pub use history::HistoryStore;
pub use models::SessionRecord;
pub use summary::{AppTotal, WeeklySummary};
