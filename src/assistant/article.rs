use anyhow::Result;
use std::sync::Arc;

use super::complete_template;
use crate::agent::{AgentReply, ArticleSearchAgent, SearchEnabledAgent};
use crate::config::Config;
use crate::llm::client::{AgentConfig, TextGenerator};
use crate::prompts::{TemplateFields, TemplateKey};

/// 可选的写作风格
pub const ARTICLE_STYLES: [&str; 7] = [
    "Academic",
    "Conversational",
    "Professional",
    "Technical",
    "Educational",
    "Journalistic",
    "Narrative",
];

/// 可选的字数
pub const WORD_COUNTS: [u32; 7] = [250, 500, 750, 1000, 1500, 2000, 3000];

pub const DEFAULT_WORD_COUNT: u32 = 1000;
pub const DEFAULT_STYLE: &str = "Conversational";

/// 追问时主题为空的占位
pub const UNKNOWN_TOPIC: &str = "the previously discussed topic";

/// 分析请求在会话中的文本
pub fn analysis_request(topic: &str, word_count: u32, style: &str, temperature: f64) -> String {
    format!(
        "Generate a {}-word {} article about {} with temperature {}",
        word_count,
        style.to_lowercase(),
        topic,
        temperature
    )
}

/// 文章生成助手
pub struct ArticleAssistant {
    llm: Arc<dyn TextGenerator>,
    settings: AgentConfig,
    search_agent: Option<ArticleSearchAgent>,
}

impl ArticleAssistant {
    pub fn new(llm: Arc<dyn TextGenerator>, model_name: &str, temperature: f64) -> Self {
        Self {
            llm,
            settings: AgentConfig::new(model_name, temperature),
            search_agent: None,
        }
    }

    pub fn with_search(mut self, agent: ArticleSearchAgent) -> Self {
        self.search_agent = Some(agent);
        self
    }

    pub fn from_config(
        config: &Config,
        llm: Arc<dyn TextGenerator>,
        model_name: Option<&str>,
    ) -> Result<Self> {
        let model = model_name.unwrap_or(&config.features.article_model);
        let temperature = config.features.article_temperature;
        let assistant = Self::new(llm.clone(), model, temperature);

        if !config.search.enabled {
            return Ok(assistant);
        }
        let agent = SearchEnabledAgent::with_llm(config, llm, model, temperature)?;
        Ok(assistant.with_search(ArticleSearchAgent::new(agent)))
    }

    pub fn settings(&self) -> &AgentConfig {
        &self.settings
    }

    /// 生成文章；本次温度同时用于之后的追问
    pub async fn generate(
        &mut self,
        topic: &str,
        word_count: u32,
        temperature: f64,
        style: &str,
    ) -> Result<AgentReply> {
        self.settings.temperature = temperature;

        if let Some(agent) = self.search_agent.as_mut() {
            return agent
                .generate_article(topic, word_count, temperature, style)
                .await;
        }

        let fields = TemplateFields::new()
            .with("topic", topic)
            .with("word_count", word_count)
            .with("temperature", temperature)
            .with("style", style);
        complete_template(self.llm.as_ref(), &self.settings, TemplateKey::Article, fields).await
    }

    /// 针对已生成文章的修改请求或提问
    pub async fn follow_up(&self, topic: &str, article: &str, request: &str) -> Result<AgentReply> {
        let topic = if topic.trim().is_empty() { UNKNOWN_TOPIC } else { topic };
        let fields = TemplateFields::new()
            .with("topic", topic)
            .with("article", article)
            .with("request", request);

        complete_template(self.llm.as_ref(), &self.settings, TemplateKey::ArticleFollowUp, fields)
            .await
    }
}
