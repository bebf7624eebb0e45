pub mod log_store;
pub mod providers;
pub mod relay;

pub use log_store::SearchLogStore;
pub use providers::CompletionProvider;
pub use relay::{LogDispatch, SearchRelay};
