pub mod context;
pub mod eval;
pub mod ordering;
pub mod pst;
#[allow(clippy::module_inception)]
pub mod search;
pub mod tt;

pub use context::SearchContext;
pub use eval::evaluate;
pub use search::{SearchResult, principal_variation, search, search_with};
pub use tt::TranspositionTable;
