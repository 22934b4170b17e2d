//! Web搜索工具 - 执行搜索并记录来源，用于生成引用说明

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::{SearchConfig, SearchEngine};

pub mod backend;

pub use backend::{
    SearchBackend, SearchError, SearchResult, SerpApiBackend, TavilyBackend, create_backend,
};

/// 历史为空时的引用说明
pub const NO_SEARCHES_PERFORMED: &str = "No web searches performed for this response.";

/// 有搜索但没有可引用来源时的说明
pub const NO_SOURCES_TO_CITE: &str = "Web search performed but no specific sources to cite.";

/// 生成引用时回看的历史条数
const ATTRIBUTION_WINDOW: usize = 3;

/// 引用中最多列出的来源数
const MAX_ATTRIBUTED_SOURCES: usize = 5;

/// 来源引用
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRef {
    pub title: String,
    pub url: String,
}

/// 搜索历史条目
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHistoryEntry {
    pub query: String,
    pub timestamp: DateTime<Utc>,
    pub sources: Vec<SourceRef>,
}

/// Web搜索工具
pub struct WebSearchTool {
    backend: Box<dyn SearchBackend>,
    history: Vec<SearchHistoryEntry>,
    request_timeout: Option<Duration>,
}

impl WebSearchTool {
    /// 根据配置创建搜索工具，缺少对应凭据时直接失败
    pub fn new(config: &SearchConfig, request_timeout: Duration) -> Result<Self, SearchError> {
        let api_key = config
            .credential()
            .ok_or(SearchError::MissingApiKey(config.engine.credential_name()))?;
        let backend = create_backend(config.engine, api_key, request_timeout)?;
        Ok(Self {
            request_timeout: Some(request_timeout),
            ..Self::with_backend(backend)
        })
    }

    /// 按后端名称创建搜索工具，仅支持 `tavily` 与 `serpapi`
    pub fn from_engine_name(
        name: &str,
        config: &SearchConfig,
        request_timeout: Duration,
    ) -> Result<Self, SearchError> {
        let engine = name
            .parse::<SearchEngine>()
            .map_err(|_| SearchError::UnsupportedEngine(name.to_string()))?;
        let config = SearchConfig {
            engine,
            ..config.clone()
        };
        Self::new(&config, request_timeout)
    }

    pub fn with_backend(backend: Box<dyn SearchBackend>) -> Self {
        Self {
            backend,
            history: Vec::new(),
            request_timeout: None,
        }
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// 真实后端的HTTP超时，注入的后端为None
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout
    }

    /// 执行搜索并记录来源；后端出错时记录日志并返回空结果
    pub async fn search(&mut self, query: &str, num_results: usize) -> Vec<SearchResult> {
        match self.backend.search(query, num_results).await {
            Ok(results) => {
                debug!(
                    backend = self.backend.name(),
                    query,
                    results = results.len(),
                    "web search completed"
                );
                self.record_search(query, &results);
                results
            }
            Err(e) => {
                warn!(backend = self.backend.name(), query, "Search error: {}", e);
                Vec::new()
            }
        }
    }

    /// 记录一次搜索的查询与来源
    pub fn record_search(&mut self, query: &str, results: &[SearchResult]) {
        let sources = results
            .iter()
            .map(|r| SourceRef {
                title: r.title.clone(),
                url: r.url.clone(),
            })
            .collect();

        self.history.push(SearchHistoryEntry {
            query: query.to_string(),
            timestamp: Utc::now(),
            sources,
        });
    }

    /// 基于最近的搜索历史生成引用说明
    pub fn attribution_text(&self) -> String {
        if self.history.is_empty() {
            return NO_SEARCHES_PERFORMED.to_string();
        }

        let window_start = self.history.len().saturating_sub(ATTRIBUTION_WINDOW);
        let mut unique_sources: Vec<&SourceRef> = Vec::new();
        for source in self.history[window_start..]
            .iter()
            .flat_map(|entry| entry.sources.iter())
        {
            if !unique_sources.iter().any(|s| s.url == source.url) {
                unique_sources.push(source);
            }
        }
        unique_sources.truncate(MAX_ATTRIBUTED_SOURCES);

        if unique_sources.is_empty() {
            return NO_SOURCES_TO_CITE.to_string();
        }

        let mut attribution = String::from("Information from web search results including:\n");
        for (idx, source) in unique_sources.iter().enumerate() {
            attribution.push_str(&format!("{}. {} ({})\n", idx + 1, source.title, source.url));
        }
        attribution
    }

    pub fn history(&self) -> &[SearchHistoryEntry] {
        &self.history
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }
}
