//! Memo board controller
//!
//! Keeps a local mirror of the memo list in sync with a [`MemoApi`]. Each
//! mutation calls the API first and only folds the result into the mirror
//! when the call succeeded, so a failed request never leaves stale entries.

use crate::client::api::MemoApi;
use crate::client::state::{BoardEvent, BoardState, BoardStats};
use crate::error::Result;
use crate::memos::types::{
    CategoryFilter, CreateMemoRequest, ListMemosQuery, Memo, UpdateMemoRequest,
};
use futures::future::join_all;

pub struct MemoBoard<A: MemoApi> {
    api: A,
    state: BoardState,
}

impl<A: MemoApi> MemoBoard<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            state: BoardState::default(),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn state(&self) -> &BoardState {
        &self.state
    }

    fn dispatch(&mut self, event: BoardEvent) {
        let state = std::mem::take(&mut self.state);
        self.state = state.apply(event);
    }

    /// Seed sample data (best effort) and fetch the full list
    pub async fn load(&mut self) -> Result<()> {
        if let Err(e) = self.api.seed().await {
            tracing::warn!(error = %e, "Seeding failed; loading existing memos");
        }
        self.refresh().await
    }

    /// Replace the mirror with the server's current list
    pub async fn refresh(&mut self) -> Result<()> {
        let memos = self.api.list(&ListMemosQuery::default()).await?;
        tracing::debug!(count = memos.len(), "Board loaded");
        self.dispatch(BoardEvent::Loaded(memos));
        Ok(())
    }

    pub async fn create(&mut self, request: CreateMemoRequest) -> Result<Memo> {
        let memo = self.api.create(request).await?;
        self.dispatch(BoardEvent::Created(memo.clone()));
        Ok(memo)
    }

    pub async fn update(&mut self, id: &str, request: UpdateMemoRequest) -> Result<Memo> {
        let memo = self.api.update(id, request).await?;
        self.replace(memo.clone());
        Ok(memo)
    }

    pub async fn delete(&mut self, id: &str) -> Result<()> {
        self.api.delete(id).await?;
        self.dispatch(BoardEvent::Deleted(id.to_string()));
        Ok(())
    }

    /// Swap in a memo that changed elsewhere (e.g. after tag generation)
    pub fn replace(&mut self, memo: Memo) {
        self.dispatch(BoardEvent::Replaced(memo));
    }

    /// Cached summary; lookup failures are treated as "no summary"
    pub async fn summary(&self, id: &str) -> Option<String> {
        match self.api.get_summary(id).await {
            Ok(summary) => summary,
            Err(e) => {
                tracing::debug!(id, error = %e, "Summary lookup failed");
                None
            }
        }
    }

    pub async fn summarize(&self, id: &str) -> Result<String> {
        self.api.summarize(id).await
    }

    pub async fn generate_tags(&mut self, id: &str) -> Result<Memo> {
        let memo = self.api.generate_tags(id).await?;
        self.replace(memo.clone());
        Ok(memo)
    }

    /// Delete every memo in the mirror concurrently, waiting for every
    /// request to settle.
    ///
    /// On any failure the mirror is left as it was and the first error is
    /// returned; deletions that went through are picked up by the next `load`.
    pub async fn clear_all(&mut self) -> Result<usize> {
        let count = self.state.memos.len();
        let api = &self.api;
        let results = join_all(self.state.memos.iter().map(|m| api.delete(&m.id))).await;
        let failed = results.iter().filter(|r| r.is_err()).count();
        if let Some(err) = results.into_iter().find_map(|r| r.err()) {
            tracing::warn!(count, failed, error = %err, "Clearing memos failed");
            return Err(err);
        }
        self.dispatch(BoardEvent::Cleared);
        tracing::info!(count, "Cleared all memos");
        Ok(count)
    }

    pub fn search(&mut self, query: impl Into<String>) {
        self.dispatch(BoardEvent::SearchChanged(query.into()));
    }

    pub fn filter_by_category(&mut self, category: CategoryFilter) {
        self.dispatch(BoardEvent::CategoryChanged(category));
    }

    /// Memos matching the current search and category
    pub fn view(&self) -> Vec<&Memo> {
        self.state.filtered()
    }

    pub fn stats(&self) -> BoardStats {
        self.state.stats()
    }

    pub fn get_by_id(&self, id: &str) -> Option<&Memo> {
        self.state.get(id)
    }
}
