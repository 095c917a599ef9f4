// Public modules
pub mod backup;
pub mod clone;
pub mod defaults;
pub mod error;
pub mod http;
pub mod store;

// Internal modules - not part of public API
pub(crate) mod paths;

// Re-export common types for convenience
pub use error::{Error, ErrorCode, Result};
pub use store::{ArtifactStore, LocalStore, MemoryStore};
