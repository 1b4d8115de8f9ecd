//! Memo service
//!
//! Orchestrates validation, persistence, summary caching and tag generation
//! on top of a `MemoStore` and a `TextGenerator`.

use crate::error::{Error, Result};
use crate::generation::{parse_tags, summary_prompt, tags_prompt, TextGenerator};
use crate::memos::seed::sample_memos;
use crate::memos::store::{truncate_micros, MemoStore};
use crate::memos::types::*;
use chrono::Utc;
use std::sync::Arc;

/// Memo lifecycle operations
pub struct MemoService {
    store: Arc<dyn MemoStore>,
    generator: Arc<dyn TextGenerator>,
}

impl MemoService {
    pub fn new(store: Arc<dyn MemoStore>, generator: Arc<dyn TextGenerator>) -> Self {
        Self { store, generator }
    }

    /// List memos, newest first. Tags are not searched here.
    pub async fn list(&self, filter: &MemoFilter) -> Result<Vec<Memo>> {
        let memos = self.store.list(filter).await?;
        tracing::debug!(
            category = %filter.category.as_str(),
            search = filter.search.as_deref().unwrap_or(""),
            count = memos.len(),
            "Listed memos"
        );
        Ok(memos)
    }

    pub async fn get(&self, id: &str) -> Result<Memo> {
        self.store.get(id).await?.ok_or_else(|| not_found(id))
    }

    /// Create a memo; title and content must both be non-blank
    pub async fn create(&self, req: CreateMemoRequest) -> Result<Memo> {
        if req.title.trim().is_empty() || req.content.trim().is_empty() {
            return Err(Error::Validation("Title and content are required".to_string()));
        }

        let now = truncate_micros(Utc::now());
        let memo = self
            .store
            .insert(NewMemo {
                id: uuid::Uuid::new_v4().to_string(),
                title: req.title,
                content: req.content,
                category: req.category.unwrap_or_default(),
                tags: normalize_tags(req.tags.unwrap_or_default()),
                created_at: now,
                updated_at: now,
            })
            .await?;

        tracing::info!(id = %memo.id, category = %memo.category, "Memo created");
        Ok(memo)
    }

    /// Apply the fields present in `req`, leaving the rest untouched
    pub async fn update(&self, id: &str, mut req: UpdateMemoRequest) -> Result<Memo> {
        if let Some(tags) = req.tags.take() {
            req.tags = Some(normalize_tags(tags));
        }
        let memo = self
            .store
            .update(id, &req)
            .await?
            .ok_or_else(|| not_found(id))?;
        tracing::info!(id = %memo.id, "Memo updated");
        Ok(memo)
    }

    /// Delete a memo. Succeeds even when nothing matched.
    pub async fn delete(&self, id: &str) -> Result<()> {
        self.store.delete(id).await?;
        tracing::info!(id, "Memo deleted");
        Ok(())
    }

    /// Cached summary, or `None` when none has been generated
    pub async fn get_summary(&self, id: &str) -> Result<Option<String>> {
        self.store.get_summary(id).await
    }

    /// Generate a summary for the memo and cache it (overwriting any previous one)
    pub async fn summarize(&self, id: &str) -> Result<String> {
        let memo = self.enrichable(id, "Content is too short to summarize").await?;

        let summary = self
            .generator
            .generate(&summary_prompt(&memo.content))
            .await
            .map_err(|e| log_generation_failure(id, "summary", self.generator.name(), e))?;

        self.store.upsert_summary(id, &summary).await?;
        tracing::info!(id, chars = summary.chars().count(), "Summary generated");
        Ok(summary)
    }

    /// Generate keyword tags and replace the memo's tags with them
    pub async fn generate_tags(&self, id: &str) -> Result<Memo> {
        let memo = self
            .enrichable(id, "Content is too short to generate tags")
            .await?;

        let reply = self
            .generator
            .generate(&tags_prompt(&memo.content))
            .await
            .map_err(|e| log_generation_failure(id, "tags", self.generator.name(), e))?;

        let tags = parse_tags(&reply);
        if tags.is_empty() {
            tracing::warn!(id, "Tag reply contained no usable keywords");
            return Err(Error::Generation("Failed to generate tags".to_string()));
        }

        let memo = self.update(id, UpdateMemoRequest::tags(tags)).await?;
        tracing::info!(id, tags = ?memo.tags, "Tags generated");
        Ok(memo)
    }

    /// Insert the sample memos when the store is empty
    pub async fn seed(&self) -> Result<SeedResponse> {
        match self
            .store
            .insert_many_if_empty(sample_memos(Utc::now()))
            .await?
        {
            Some(count) => {
                tracing::info!(count, "Seeded sample memos");
                Ok(SeedResponse::created(count))
            }
            None => {
                tracing::debug!("Seed skipped; memos already exist");
                Ok(SeedResponse::skipped())
            }
        }
    }

    async fn enrichable(&self, id: &str, too_short: &str) -> Result<Memo> {
        let memo = self.get(id).await?;
        if !memo.is_enrichable() {
            return Err(Error::Validation(too_short.to_string()));
        }
        Ok(memo)
    }
}

fn not_found(id: &str) -> Error {
    Error::NotFound(format!("Memo {} not found", id))
}

fn log_generation_failure(id: &str, kind: &str, backend: &str, err: Error) -> Error {
    match &err {
        Error::Config(msg) => tracing::error!(id, kind, backend, "Generation not configured: {}", msg),
        other => tracing::warn!(id, kind, backend, "Generation failed: {}", other),
    }
    err
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::testing::ScriptedGenerator;
    use crate::memos::store::SqliteMemoStore;

    fn service_with(generator: Arc<ScriptedGenerator>) -> MemoService {
        let store = Arc::new(SqliteMemoStore::in_memory().unwrap());
        MemoService::new(store, generator)
    }

    fn service() -> MemoService {
        service_with(Arc::new(ScriptedGenerator::replying("unused")))
    }

    fn create_req(title: &str, content: &str) -> CreateMemoRequest {
        CreateMemoRequest {
            title: title.to_string(),
            content: content.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_rejects_empty_fields_before_store() {
        let svc = service();
        for (title, content) in [("", "body text"), ("Title", ""), ("   ", "body"), ("", "")] {
            let err = svc.create(create_req(title, content)).await.unwrap_err();
            assert!(matches!(err, Error::Validation(_)));
        }
        assert_eq!(svc.store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_create_defaults() {
        let svc = service();
        let memo = svc.create(create_req("Groceries", "Eggs and milk")).await.unwrap();
        assert_eq!(memo.category, MemoCategory::Personal);
        assert!(memo.tags.is_empty());
        assert_eq!(memo.created_at, memo.updated_at);
        assert!(uuid::Uuid::parse_str(&memo.id).is_ok());
    }

    #[tokio::test]
    async fn test_create_then_get_roundtrip() {
        let svc = service();
        let created = svc
            .create(CreateMemoRequest {
                title: "Standup".to_string(),
                content: "Blocked on review".to_string(),
                category: Some(MemoCategory::Work),
                tags: Some(vec!["Team".to_string(), "team".to_string()]),
            })
            .await
            .unwrap();
        assert_eq!(created.tags, vec!["team"]);

        let fetched = svc.get(&created.id).await.unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let err = service().get("missing").await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_update_tags_only_changes_tags() {
        let svc = service();
        let before = svc.create(create_req("Title", "Some content here")).await.unwrap();

        let after = svc
            .update(&before.id, UpdateMemoRequest::tags(vec!["A".into(), "b".into()]))
            .await
            .unwrap();

        assert_eq!(after.tags, vec!["a", "b"]);
        assert_eq!(after.title, before.title);
        assert_eq!(after.content, before.content);
        assert_eq!(after.category, before.category);
        assert_eq!(after.created_at, before.created_at);
        assert!(after.updated_at > before.updated_at);
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let err = service()
            .update("missing", UpdateMemoRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_list_all_is_union_of_categories_newest_first() {
        let svc = service();
        for (title, category) in [
            ("one", MemoCategory::Work),
            ("two", MemoCategory::Personal),
            ("three", MemoCategory::Idea),
            ("four", MemoCategory::Work),
        ] {
            svc.create(CreateMemoRequest {
                title: title.to_string(),
                content: "content".to_string(),
                category: Some(category),
                tags: None,
            })
            .await
            .unwrap();
        }

        let all = svc
            .list(&MemoFilter {
                category: CategoryFilter::parse(Some("all")),
                search: None,
            })
            .await
            .unwrap();
        assert_eq!(all.len(), 4);
        assert!(all.windows(2).all(|w| w[0].created_at >= w[1].created_at));

        let mut union = Vec::new();
        for category in MemoCategory::ALL {
            union.extend(
                svc.list(&MemoFilter {
                    category: CategoryFilter::Only(category),
                    search: None,
                })
                .await
                .unwrap(),
            );
        }
        let mut all_ids: Vec<_> = all.iter().map(|m| m.id.clone()).collect();
        let mut union_ids: Vec<_> = union.iter().map(|m| m.id.clone()).collect();
        all_ids.sort();
        union_ids.sort();
        assert_eq!(all_ids, union_ids);
    }

    #[tokio::test]
    async fn test_delete_nonexistent_succeeds() {
        service().delete("does-not-exist").await.unwrap();
    }

    #[tokio::test]
    async fn test_get_summary_absent_is_none() {
        assert!(service().get_summary("anything").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_summarize_short_content_never_calls_generator() {
        let generator = Arc::new(ScriptedGenerator::replying("summary"));
        let svc = service_with(generator.clone());
        let memo = svc.create(create_req("Short", "  tiny    ")).await.unwrap();

        let err = svc.summarize(&memo.id).await.unwrap_err();
        assert!(matches!(err, Error::Validation(ref m) if m.contains("too short")));
        assert_eq!(generator.calls(), 0);

        let err = svc.generate_tags(&memo.id).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test]
    async fn test_summarize_missing_memo_is_not_found() {
        let generator = Arc::new(ScriptedGenerator::replying("summary"));
        let svc = service_with(generator.clone());
        let err = svc.summarize("missing").await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test]
    async fn test_summarize_caches_and_overwrites() {
        let generator = Arc::new(ScriptedGenerator::replying("A concise summary."));
        let svc = service_with(generator.clone());
        let memo = svc
            .create(create_req("Trip", "Pack the tent, stove and sleeping bags"))
            .await
            .unwrap();

        assert_eq!(svc.summarize(&memo.id).await.unwrap(), "A concise summary.");
        assert_eq!(svc.summarize(&memo.id).await.unwrap(), "A concise summary.");
        assert_eq!(generator.calls(), 2);
        assert_eq!(
            svc.get_summary(&memo.id).await.unwrap().as_deref(),
            Some("A concise summary.")
        );

        let prompt = generator.prompts.lock().unwrap()[0].clone();
        assert!(prompt.contains("Pack the tent"));
    }

    #[tokio::test]
    async fn test_summarize_missing_key_is_config_error() {
        let svc = service_with(Arc::new(ScriptedGenerator::missing_key()));
        let memo = svc
            .create(create_req("Notes", "Long enough content to summarize"))
            .await
            .unwrap();
        let err = svc.summarize(&memo.id).await.unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(svc.get_summary(&memo.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_generate_tags_replaces_tags() {
        let generator = Arc::new(ScriptedGenerator::replying("회의, 회의, 프로젝트, project"));
        let svc = service_with(generator);
        let memo = svc
            .create(CreateMemoRequest {
                title: "주간 회의".to_string(),
                content: "프로젝트 일정과 우선순위를 논의했다".to_string(),
                category: Some(MemoCategory::Work),
                tags: Some(vec!["old".to_string()]),
            })
            .await
            .unwrap();

        let updated = svc.generate_tags(&memo.id).await.unwrap();
        assert_eq!(updated.tags, vec!["회의", "프로젝트", "project"]);
        assert_eq!(updated.title, memo.title);
        assert_eq!(svc.get(&memo.id).await.unwrap().tags, updated.tags);
    }

    #[tokio::test]
    async fn test_generate_tags_empty_reply_is_generation_error() {
        let svc = service_with(Arc::new(ScriptedGenerator::replying(" , ,")));
        let memo = svc
            .create(CreateMemoRequest {
                title: "Keep".to_string(),
                content: "Existing tags should survive a bad reply".to_string(),
                category: None,
                tags: Some(vec!["keep".to_string()]),
            })
            .await
            .unwrap();

        let err = svc.generate_tags(&memo.id).await.unwrap_err();
        assert!(matches!(err, Error::Generation(_)));
        assert_eq!(svc.get(&memo.id).await.unwrap().tags, vec!["keep"]);
    }

    #[tokio::test]
    async fn test_generate_tags_upstream_failure() {
        let svc = service_with(Arc::new(ScriptedGenerator::failing()));
        let memo = svc
            .create(create_req("Title", "Plenty of content for tags"))
            .await
            .unwrap();
        let err = svc.generate_tags(&memo.id).await.unwrap_err();
        assert!(matches!(err, Error::Generation(_)));
    }

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let svc = service();
        let first = svc.seed().await.unwrap();
        let count = first.count.unwrap();
        assert!(count > 0);

        let second = svc.seed().await.unwrap();
        assert_eq!(second.skipped, Some(true));
        assert_eq!(svc.store.count().await.unwrap(), count as u64);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_seed_inserts_once() {
        let svc = Arc::new(service());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let svc = svc.clone();
                tokio::spawn(async move { svc.seed().await.unwrap() })
            })
            .collect();

        let mut created = 0;
        let mut total = 0;
        for handle in handles {
            let outcome = handle.await.unwrap();
            if let Some(count) = outcome.count {
                created += 1;
                total = count;
            }
        }
        assert_eq!(created, 1);
        assert_eq!(svc.store.count().await.unwrap(), total as u64);
    }

    #[tokio::test]
    async fn test_seed_skipped_when_user_memos_exist() {
        let svc = service();
        svc.create(create_req("Mine", "My own memo")).await.unwrap();
        assert_eq!(svc.seed().await.unwrap(), SeedResponse::skipped());
    }
}
