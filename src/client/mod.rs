//! Client-side memo board: a local mirror of the memo list kept in sync with
//! the REST API, plus search/category view state.

pub mod api;
pub mod board;
pub mod state;

pub use api::{HttpMemoApi, MemoApi};
pub use board::MemoBoard;
pub use state::{BoardEvent, BoardState, BoardStats};
