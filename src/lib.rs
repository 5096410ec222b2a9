pub mod api;
pub mod analysis;
pub mod blacklist;
pub mod enrichment;
pub mod error;
pub mod models;
pub mod reference;
pub mod screener;
pub mod statements;
pub mod utils;

pub use error::{ScreenerError, ScreenerResult, SkipReason};
pub use screener::{ScreenResult, Screener};
