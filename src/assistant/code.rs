use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use super::complete_template;
use crate::agent::{AgentReply, CodeExplainerSearchAgent, SearchEnabledAgent};
use crate::config::Config;
use crate::llm::client::{AgentConfig, TextGenerator};
use crate::prompts::{CodeMode, TemplateFields, TemplateKey};

/// 分析请求在会话中的文本
pub fn analysis_request(mode: CodeMode, language: &str) -> String {
    format!(
        "Please {} for this {} code.",
        mode.label().to_lowercase(),
        language
    )
}

/// 代码讲解助手；启用搜索时检索相关库的文档
pub struct CodeAssistant {
    llm: Arc<dyn TextGenerator>,
    settings: AgentConfig,
    search_agent: Option<CodeExplainerSearchAgent>,
}

impl CodeAssistant {
    pub fn new(llm: Arc<dyn TextGenerator>, model_name: &str, temperature: f64) -> Self {
        Self {
            llm,
            settings: AgentConfig::new(model_name, temperature),
            search_agent: None,
        }
    }

    pub fn with_search(mut self, agent: CodeExplainerSearchAgent) -> Self {
        self.search_agent = Some(agent);
        self
    }

    /// 按配置创建；启用搜索但缺少凭据时失败
    pub fn from_config(
        config: &Config,
        llm: Arc<dyn TextGenerator>,
        model_name: Option<&str>,
    ) -> Result<Self> {
        let model = model_name.unwrap_or(&config.features.code_model);
        let temperature = config.features.code_temperature;
        let assistant = Self::new(llm.clone(), model, temperature);

        if !config.search.enabled {
            return Ok(assistant);
        }
        let agent = SearchEnabledAgent::with_llm(config, llm, model, temperature)?;
        Ok(assistant.with_search(CodeExplainerSearchAgent::new(agent)))
    }

    pub fn settings(&self) -> &AgentConfig {
        &self.settings
    }

    pub fn search_enabled(&self) -> bool {
        self.search_agent.is_some()
    }

    pub async fn analyze(&mut self, code: &str, language: &str, mode: CodeMode) -> Result<AgentReply> {
        info!(language, mode = %mode, "analyzing code");
        if let Some(agent) = self.search_agent.as_mut() {
            return agent.explain_code(code, language, mode).await;
        }

        let fields = TemplateFields::new()
            .with("code", code)
            .with("language", language);
        complete_template(self.llm.as_ref(), &self.settings, TemplateKey::Code(mode), fields).await
    }

    /// 基于代码与此前讲解回答追问，不执行搜索
    pub async fn follow_up(
        &self,
        language: &str,
        code_context: &str,
        previous_explanations: &str,
        question: &str,
    ) -> Result<AgentReply> {
        let fields = TemplateFields::new()
            .with("language", language)
            .with("code_context", code_context)
            .with("previous_explanations", previous_explanations)
            .with("question", question);

        complete_template(self.llm.as_ref(), &self.settings, TemplateKey::CodeFollowUp, fields)
            .await
    }
}
