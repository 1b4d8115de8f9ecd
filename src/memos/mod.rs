//! Memos module - note storage, search and AI enrichment
//!
//! Provides the REST endpoints for memo CRUD, cached summaries, generated
//! keyword tags and sample-data seeding.

pub mod handler;
pub mod seed;
pub mod service;
pub mod store;
pub mod types;

pub use handler::{memos_router, MemosState};
pub use service::MemoService;
pub use store::{MemoStore, SqliteMemoStore};
