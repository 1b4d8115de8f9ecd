//! Client-side access to the memo API
//!
//! `MemoApi` mirrors the REST surface one method per endpoint. `HttpMemoApi`
//! speaks to a running server; `MemoService` implements the trait directly
//! so a board can also run in-process.

use crate::error::{Error, Result};
use crate::memos::service::MemoService;
use crate::memos::types::{
    ApiError, CreateMemoRequest, DeleteResponse, ListMemosQuery, Memo, SeedResponse,
    SummaryResponse, UpdateMemoRequest,
};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;

#[async_trait]
pub trait MemoApi: Send + Sync {
    async fn seed(&self) -> Result<SeedResponse>;
    async fn list(&self, query: &ListMemosQuery) -> Result<Vec<Memo>>;
    async fn get(&self, id: &str) -> Result<Memo>;
    async fn create(&self, request: CreateMemoRequest) -> Result<Memo>;
    async fn update(&self, id: &str, request: UpdateMemoRequest) -> Result<Memo>;
    async fn delete(&self, id: &str) -> Result<()>;
    async fn get_summary(&self, id: &str) -> Result<Option<String>>;
    async fn summarize(&self, id: &str) -> Result<String>;
    async fn generate_tags(&self, id: &str) -> Result<Memo>;
}

#[async_trait]
impl MemoApi for MemoService {
    async fn seed(&self) -> Result<SeedResponse> {
        MemoService::seed(self).await
    }

    async fn list(&self, query: &ListMemosQuery) -> Result<Vec<Memo>> {
        MemoService::list(self, &query.clone().into()).await
    }

    async fn get(&self, id: &str) -> Result<Memo> {
        MemoService::get(self, id).await
    }

    async fn create(&self, request: CreateMemoRequest) -> Result<Memo> {
        MemoService::create(self, request).await
    }

    async fn update(&self, id: &str, request: UpdateMemoRequest) -> Result<Memo> {
        MemoService::update(self, id, request).await
    }

    async fn delete(&self, id: &str) -> Result<()> {
        MemoService::delete(self, id).await
    }

    async fn get_summary(&self, id: &str) -> Result<Option<String>> {
        MemoService::get_summary(self, id).await
    }

    async fn summarize(&self, id: &str) -> Result<String> {
        MemoService::summarize(self, id).await
    }

    async fn generate_tags(&self, id: &str) -> Result<Memo> {
        MemoService::generate_tags(self, id).await
    }
}

/// REST client for a memopad server
pub struct HttpMemoApi {
    base_url: String,
    client: Client,
}

impl HttpMemoApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `/memos/{id}[/{action}]` with the id percent-encoded as one segment
    fn memo_url(&self, id: &str, action: Option<&str>) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| Error::Config(format!("Invalid server URL {}: {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| Error::Config(format!("Invalid server URL {}", self.base_url)))?
            .pop_if_empty()
            .push("memos")
            .push(id)
            .extend(action);
        Ok(url)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }

        let text = response.text().await.unwrap_or_default();
        Err(remote_error(status, &text))
    }
}

/// Turn an error response back into the matching error variant
fn remote_error(status: StatusCode, body: &str) -> Error {
    let (code, message) = match serde_json::from_str::<ApiError>(body) {
        Ok(parsed) => (parsed.error.code, parsed.error.message),
        Err(_) => (String::new(), body.trim().to_string()),
    };
    match code.as_str() {
        "BAD_REQUEST" => Error::Validation(message),
        "NOT_FOUND" => Error::NotFound(message),
        "CONFIG_ERROR" => Error::Config(message),
        "GENERATION_FAILED" => Error::Generation(message),
        _ => match status {
            StatusCode::BAD_REQUEST => Error::Validation(message),
            StatusCode::NOT_FOUND => Error::NotFound(message),
            _ => Error::Remote {
                status: status.as_u16(),
                message,
            },
        },
    }
}

#[async_trait]
impl MemoApi for HttpMemoApi {
    async fn seed(&self) -> Result<SeedResponse> {
        self.send(self.client.post(self.url("/memos/seed"))).await
    }

    async fn list(&self, query: &ListMemosQuery) -> Result<Vec<Memo>> {
        self.send(self.client.get(self.url("/memos")).query(query))
            .await
    }

    async fn get(&self, id: &str) -> Result<Memo> {
        self.send(self.client.get(self.memo_url(id, None)?)).await
    }

    async fn create(&self, request: CreateMemoRequest) -> Result<Memo> {
        self.send(self.client.post(self.url("/memos")).json(&request))
            .await
    }

    async fn update(&self, id: &str, request: UpdateMemoRequest) -> Result<Memo> {
        self.send(self.client.patch(self.memo_url(id, None)?).json(&request))
            .await
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let _: DeleteResponse = self
            .send(self.client.delete(self.memo_url(id, None)?))
            .await?;
        Ok(())
    }

    async fn get_summary(&self, id: &str) -> Result<Option<String>> {
        let response: SummaryResponse = self
            .send(self.client.get(self.memo_url(id, Some("summary"))?))
            .await?;
        Ok(response.summary)
    }

    async fn summarize(&self, id: &str) -> Result<String> {
        let response: SummaryResponse = self
            .send(self.client.post(self.memo_url(id, Some("summary"))?))
            .await?;
        response
            .summary
            .ok_or_else(|| Error::Generation("Server returned an empty summary".to_string()))
    }

    async fn generate_tags(&self, id: &str) -> Result<Memo> {
        self.send(self.client.post(self.memo_url(id, Some("tags"))?))
            .await
    }
}
