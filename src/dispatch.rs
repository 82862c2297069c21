//! Query dispatch against the campus data-access interface.
//!
//! ```text
//! (Intent, SlotMap) ──► LookupRequest ──► QueryDispatcher ──► DataSource
//!                                             │  timeout + bounded retry
//!                                             ▼
//!                                  QueryResult ──► ResponseRenderer ──► text
//! ```

pub mod dispatcher;
pub mod memory;
pub mod render;
pub mod source;

pub use dispatcher::QueryDispatcher;
pub use memory::{CampusDataset, InMemoryCampusStore};
pub use render::ResponseRenderer;
pub use source::{DataSource, LookupError, LookupRequest, QueryResult, Record, RecordSet};
