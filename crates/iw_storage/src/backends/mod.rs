pub mod http;
pub mod memory;

pub use http::HttpCatalog;
pub use memory::{MemoryCatalog, MemoryStore};
