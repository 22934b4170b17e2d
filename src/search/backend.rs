//! 搜索后端 - Tavily 与 SerpAPI 两种实现，各自负责解析自己的响应结构

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use crate::config::SearchEngine;

const TAVILY_ENDPOINT: &str = "https://api.tavily.com/search";
const SERPAPI_ENDPOINT: &str = "https://serpapi.com/search.json";

/// 缺少标题时使用的占位标题
pub const UNKNOWN_TITLE: &str = "Unknown Title";

/// 搜索错误
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("{0} not found in environment variables")]
    MissingApiKey(&'static str),

    #[error("Unsupported search engine: {0}")]
    UnsupportedEngine(String),

    #[error("search request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("search provider returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unexpected search response: {0}")]
    Parse(String),
}

/// 归一化后的搜索结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub content: String,
}

impl SearchResult {
    pub fn new(title: impl Into<String>, url: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            content: content.into(),
        }
    }

    /// 从provider原始记录中构建，缺少url的记录返回None
    fn from_record(record: &Value, url_field: &str, content_field: &str) -> Option<Self> {
        let url = record.get(url_field)?.as_str()?;
        let title = record
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or(UNKNOWN_TITLE);
        let content = record
            .get(content_field)
            .and_then(Value::as_str)
            .unwrap_or_default();
        Some(Self::new(title, url, content))
    }
}

/// 搜索后端接口
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// 后端名称，用于日志
    fn name(&self) -> &str;

    /// 执行一次查询
    async fn search(&self, query: &str, num_results: usize)
    -> Result<Vec<SearchResult>, SearchError>;
}

fn build_http_client(timeout: Duration) -> Result<reqwest::Client, SearchError> {
    Ok(reqwest::Client::builder().timeout(timeout).build()?)
}

/// 把非2xx响应转换为错误
async fn into_payload(response: reqwest::Response) -> Result<Value, SearchError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(SearchError::Status {
            status: status.as_u16(),
            body,
        });
    }
    Ok(response.json::<Value>().await?)
}

/// Tavily后端，响应为扁平的 `results` 列表，字段 `url` / `content`
pub struct TavilyBackend {
    client: reqwest::Client,
    api_key: String,
}

impl TavilyBackend {
    pub fn new(api_key: &str, timeout: Duration) -> Result<Self, SearchError> {
        Ok(Self {
            client: build_http_client(timeout)?,
            api_key: api_key.to_string(),
        })
    }

    pub fn parse_response(payload: &Value) -> Result<Vec<SearchResult>, SearchError> {
        let results = payload
            .get("results")
            .and_then(Value::as_array)
            .ok_or_else(|| SearchError::Parse("missing results array".to_string()))?;

        Ok(results
            .iter()
            .filter_map(|record| SearchResult::from_record(record, "url", "content"))
            .collect())
    }
}

#[async_trait]
impl SearchBackend for TavilyBackend {
    fn name(&self) -> &str {
        "tavily"
    }

    async fn search(
        &self,
        query: &str,
        num_results: usize,
    ) -> Result<Vec<SearchResult>, SearchError> {
        let body = serde_json::json!({
            "query": query,
            "max_results": num_results,
            "search_depth": "basic",
            "include_answer": false,
            "include_raw_content": false
        });

        let response = self
            .client
            .post(TAVILY_ENDPOINT)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;
        let payload = into_payload(response).await?;
        Self::parse_response(&payload)
    }
}

/// SerpAPI后端，响应嵌套在 `organic_results` 下，字段 `link` / `snippet`
pub struct SerpApiBackend {
    client: reqwest::Client,
    api_key: String,
}

impl SerpApiBackend {
    pub fn new(api_key: &str, timeout: Duration) -> Result<Self, SearchError> {
        Ok(Self {
            client: build_http_client(timeout)?,
            api_key: api_key.to_string(),
        })
    }

    pub fn parse_response(payload: &Value) -> Result<Vec<SearchResult>, SearchError> {
        if let Some(message) = payload.get("error").and_then(Value::as_str) {
            return Err(SearchError::Parse(message.to_string()));
        }

        let Some(organic) = payload.get("organic_results").and_then(Value::as_array) else {
            return Ok(Vec::new());
        };

        Ok(organic
            .iter()
            .filter_map(|record| SearchResult::from_record(record, "link", "snippet"))
            .collect())
    }
}

#[async_trait]
impl SearchBackend for SerpApiBackend {
    fn name(&self) -> &str {
        "serpapi"
    }

    async fn search(
        &self,
        query: &str,
        num_results: usize,
    ) -> Result<Vec<SearchResult>, SearchError> {
        let num = num_results.to_string();
        let response = self
            .client
            .get(SERPAPI_ENDPOINT)
            .query(&[
                ("engine", "google"),
                ("q", query),
                ("num", num.as_str()),
                ("api_key", self.api_key.as_str()),
            ])
            .send()
            .await?;
        let payload = into_payload(response).await?;
        Self::parse_response(&payload)
    }
}

/// 根据后端类型与凭据创建后端实例
pub fn create_backend(
    engine: SearchEngine,
    api_key: &str,
    timeout: Duration,
) -> Result<Box<dyn SearchBackend>, SearchError> {
    match engine {
        SearchEngine::Tavily => Ok(Box::new(TavilyBackend::new(api_key, timeout)?)),
        SearchEngine::SerpApi => Ok(Box::new(SerpApiBackend::new(api_key, timeout)?)),
    }
}
