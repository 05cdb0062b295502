//! Data models for the schoollibrary server

pub mod book;
pub mod identity;

// Re-export commonly used types
pub use book::{Book, BookFields, BookIndex, BookInput, BookView, Etag, Lending, LendingInput, LendingView};
pub use identity::{Capabilities, Identity};
