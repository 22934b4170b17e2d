//! 搜索增强Agent - 组合Prompt模板、Web搜索与LLM调用

use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::Config;
use crate::llm::client::{AgentConfig, LLMClient, TextGenerator};
use crate::prompts::{PromptTemplate, TemplateError, TemplateFields};
use crate::search::{SearchResult, WebSearchTool};

pub mod iterative;
pub mod specialized;

pub use iterative::{DraftState, IterativeChain};
pub use specialized::{ArticleSearchAgent, CodeExplainerSearchAgent, StudyPlanSearchAgent};

/// 未执行搜索时的引用说明
pub const NO_SEARCH_PERFORMED: &str = "No web search performed for this response.";

/// 搜索结果注入段，追加在基础模板之后
pub const SEARCH_RESULTS_SECTION: &str = "\n\nWeb search results:\n{search_results}\n\n";

/// 搜索结果在模板中的字段名
pub const SEARCH_RESULTS_FIELD: &str = "search_results";

/// 默认注入prompt的搜索结果数量
pub const DEFAULT_RESULTS_COUNT: usize = 5;

/// Agent的回复：生成文本与引用说明
#[derive(Debug, Clone, PartialEq)]
pub struct AgentReply {
    pub content: String,
    pub attribution: String,
}

impl AgentReply {
    pub fn new(content: impl Into<String>, attribution: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            attribution: attribution.into(),
        }
    }
}

/// 可执行Web搜索以增强回复的Agent
pub struct SearchEnabledAgent {
    config: AgentConfig,
    llm: Arc<dyn TextGenerator>,
    search_tool: WebSearchTool,
    results_count: usize,
}

impl SearchEnabledAgent {
    pub fn new(config: AgentConfig, llm: Arc<dyn TextGenerator>, search_tool: WebSearchTool) -> Self {
        Self {
            config,
            llm,
            search_tool,
            results_count: DEFAULT_RESULTS_COUNT,
        }
    }

    /// 从应用配置创建，搜索凭据缺失时失败
    pub fn from_config(app_config: &Config, model_name: &str, temperature: f64) -> Result<Self> {
        let llm: Arc<dyn TextGenerator> = Arc::new(LLMClient::new(app_config.llm.clone())?);
        Self::with_llm(app_config, llm, model_name, temperature)
    }

    /// 共享已有的LLM客户端
    pub fn with_llm(
        app_config: &Config,
        llm: Arc<dyn TextGenerator>,
        model_name: &str,
        temperature: f64,
    ) -> Result<Self> {
        let search_tool = WebSearchTool::new(&app_config.search, app_config.request_timeout())?;
        Ok(Self::new(AgentConfig::new(model_name, temperature), llm, search_tool)
            .with_results_count(app_config.search.results_count))
    }

    pub fn with_results_count(mut self, results_count: usize) -> Self {
        self.results_count = results_count;
        self
    }

    pub fn agent_config(&self) -> &AgentConfig {
        &self.config
    }

    /// 覆盖本Agent后续调用的温度
    pub fn set_temperature(&mut self, temperature: f64) {
        self.config.temperature = temperature;
    }

    pub fn search_tool(&self) -> &WebSearchTool {
        &self.search_tool
    }

    pub fn clear_search_history(&mut self) {
        self.search_tool.clear_history();
    }

    /// 由搜索结果构建注入prompt的上下文
    pub fn build_search_context(results: &[SearchResult], limit: usize) -> String {
        results
            .iter()
            .take(limit)
            .map(|r| format!("Source: {}\nURL: {}\nContent: {}\n", r.title, r.url, r.content))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// 渲染最终prompt；提供搜索结果时在模板后追加搜索结果段
    pub fn prepare_prompt(
        base_template: &PromptTemplate,
        search_context: Option<&str>,
        fields: &TemplateFields,
    ) -> Result<String, TemplateError> {
        match search_context {
            Some(context) => {
                let enhanced = base_template.append(SEARCH_RESULTS_SECTION);
                let fields = fields.clone().with(SEARCH_RESULTS_FIELD, context);
                enhanced.render(&fields)
            }
            None => base_template.render(fields),
        }
    }

    /// 执行Agent：可选搜索 -> 渲染prompt -> 调用LLM
    ///
    /// 搜索失败在搜索工具内部降级为空结果；LLM调用失败直接返回给调用方。
    pub async fn run(
        &mut self,
        base_template: &PromptTemplate,
        search_query: Option<&str>,
        fields: TemplateFields,
    ) -> Result<AgentReply> {
        let search_query = search_query.filter(|q| !q.is_empty());

        let search_context = match search_query {
            Some(query) => {
                let results = self.search_tool.search(query, self.results_count).await;
                info!(query, results = results.len(), "🔎 web search finished");
                Some(Self::build_search_context(&results, self.results_count))
            }
            None => None,
        };

        let prompt = Self::prepare_prompt(base_template, search_context.as_deref(), &fields)?;
        debug!(prompt_chars = prompt.len(), "prompt rendered");

        let content = self.llm.generate(&prompt, &self.config).await?;

        let attribution = match search_query {
            Some(_) => self.search_tool.attribution_text(),
            None => NO_SEARCH_PERFORMED.to_string(),
        };

        Ok(AgentReply {
            content,
            attribution,
        })
    }
}
