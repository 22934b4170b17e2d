//! 单元测试共用的替身实现

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::llm::client::{AgentConfig, TextGenerator};
use crate::search::{SearchBackend, SearchError, SearchResult};

/// 返回预设结果的搜索后端，记录收到的查询
#[derive(Clone)]
pub struct MockSearchBackend {
    results: Option<Vec<SearchResult>>,
    pub calls: Arc<Mutex<Vec<(String, usize)>>>,
}

impl MockSearchBackend {
    pub fn returning(results: Vec<SearchResult>) -> Self {
        Self {
            results: Some(results),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing() -> Self {
        Self {
            results: None,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[async_trait]
impl SearchBackend for MockSearchBackend {
    fn name(&self) -> &str {
        "mock"
    }

    async fn search(
        &self,
        query: &str,
        num_results: usize,
    ) -> Result<Vec<SearchResult>, SearchError> {
        self.calls
            .lock()
            .unwrap()
            .push((query.to_string(), num_results));
        match &self.results {
            Some(results) => Ok(results.clone()),
            None => Err(SearchError::Status {
                status: 503,
                body: "service unavailable".to_string(),
            }),
        }
    }
}

/// 记录prompt并返回固定文本的生成器
#[derive(Clone)]
pub struct MockGenerator {
    reply: Option<String>,
    pub prompts: Arc<Mutex<Vec<(String, AgentConfig)>>>,
}

impl MockGenerator {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: None,
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().map(|(p, _)| p.clone())
    }

    pub fn last_settings(&self) -> Option<AgentConfig> {
        self.prompts.lock().unwrap().last().map(|(_, s)| s.clone())
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    async fn generate(&self, prompt: &str, settings: &AgentConfig) -> Result<String> {
        self.prompts
            .lock()
            .unwrap()
            .push((prompt.to_string(), settings.clone()));
        self.reply
            .clone()
            .ok_or_else(|| anyhow!("connection refused"))
    }
}

pub fn result(title: &str, url: &str, content: &str) -> SearchResult {
    SearchResult::new(title, url, content)
}
