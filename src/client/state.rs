//! Client-side memo board state
//!
//! `BoardState` is an owned snapshot: the local mirror of memos plus the
//! current search and category selection. Every change goes through
//! [`BoardState::apply`], which consumes the state and returns the next one.

use crate::memos::types::{CategoryFilter, Memo, MemoCategory};
use serde::Serialize;
use std::collections::BTreeMap;

/// State transitions for the board
#[derive(Debug, Clone)]
pub enum BoardEvent {
    /// Replace the whole mirror with a freshly fetched list
    Loaded(Vec<Memo>),
    /// A memo was created remotely; it goes to the front
    Created(Memo),
    /// A memo was updated remotely; the entry with its id is replaced
    Replaced(Memo),
    /// A memo was deleted remotely
    Deleted(String),
    /// Every memo was deleted; filters reset too
    Cleared,
    SearchChanged(String),
    CategoryChanged(CategoryFilter),
}

/// Owned board state
#[derive(Debug, Clone, Default)]
pub struct BoardState {
    pub memos: Vec<Memo>,
    pub search_query: String,
    pub selected_category: CategoryFilter,
}

/// Aggregate counts derived from the full mirror
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardStats {
    pub total: usize,
    pub by_category: BTreeMap<MemoCategory, usize>,
    pub filtered: usize,
}

impl BoardState {
    pub fn apply(mut self, event: BoardEvent) -> Self {
        match event {
            BoardEvent::Loaded(memos) => self.memos = memos,
            BoardEvent::Created(memo) => self.memos.insert(0, memo),
            BoardEvent::Replaced(memo) => {
                if let Some(slot) = self.memos.iter_mut().find(|m| m.id == memo.id) {
                    *slot = memo;
                }
            }
            BoardEvent::Deleted(id) => self.memos.retain(|m| m.id != id),
            BoardEvent::Cleared => {
                self.memos.clear();
                self.search_query.clear();
                self.selected_category = CategoryFilter::All;
            }
            BoardEvent::SearchChanged(query) => self.search_query = query,
            BoardEvent::CategoryChanged(category) => self.selected_category = category,
        }
        self
    }

    /// The memos to display: category restriction first, then a
    /// case-insensitive match on title, content or any tag. A blank query
    /// matches everything; otherwise the query is used as typed.
    pub fn filtered(&self) -> Vec<&Memo> {
        let blank = self.search_query.trim().is_empty();
        let query = self.search_query.to_lowercase();
        self.memos
            .iter()
            .filter(|m| self.selected_category.matches(m.category))
            .filter(|m| blank || m.matches_text(&query, true))
            .collect()
    }

    pub fn stats(&self) -> BoardStats {
        let mut by_category = BTreeMap::new();
        for memo in &self.memos {
            *by_category.entry(memo.category).or_insert(0) += 1;
        }
        BoardStats {
            total: self.memos.len(),
            by_category,
            filtered: self.filtered().len(),
        }
    }

    pub fn get(&self, id: &str) -> Option<&Memo> {
        self.memos.iter().find(|m| m.id == id)
    }
}
