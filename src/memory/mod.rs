pub mod keywords;
pub mod store;

pub use keywords::extract_keywords;
pub use store::{MemoryEntry, MemoryKind, MemoryStore};
