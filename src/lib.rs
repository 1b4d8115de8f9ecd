//! memopad - personal memo board with AI summaries and keyword tags
//!
//! Memos are short notes with a title, body, category and tags, stored in
//! SQLite and served over a small REST API. A text-generation backend
//! (Gemini) produces cached summaries and keyword tags on request.
//!
//! ## Modules
//!
//! - [`memos`]: data model, SQLite store, service and REST handlers
//! - [`generation`]: prompt construction and the Gemini client
//! - [`client`]: HTTP client and the local memo board state
//! - [`api`]: application router (health, CORS, tracing)
//! - [`config`]: configuration management

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod generation;
pub mod memos;

pub use config::MemopadConfig;
pub use error::{Error, Result};
