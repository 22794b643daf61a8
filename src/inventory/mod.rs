mod cache;
mod filter;

pub use cache::{InventoryCache, Snapshot};
pub use filter::{is_excluded, ExclusionFilter};
