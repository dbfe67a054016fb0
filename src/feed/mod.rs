//! Contacts feed retrieval.
//!
//! - [`document`]: namespace-aware element tree built from `quick-xml` events
//! - [`parser`]: one feed page into feed metadata and [`crate::contacts::Contact`] records
//! - [`walker`]: follows `next` links page by page until the feed ends

pub mod document;
pub mod parser;
pub mod walker;

pub use parser::{FeedParser, PageSummary};
pub use walker::{PageHandler, PageWalker};
