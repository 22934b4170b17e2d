use anyhow::Result;
use std::sync::Arc;

use super::complete_template;
use crate::agent::AgentReply;
use crate::config::Config;
use crate::llm::client::{AgentConfig, TextGenerator};
use crate::prompts::{TemplateFields, TemplateKey};

/// 分析请求在会话中的文本
pub const ANALYSIS_REQUEST: &str =
    "Please analyze my CV and provide interview preparation assistance.";

/// 未提供职位描述时的占位文本
pub const NO_JOB_DESCRIPTION: &str = "Not provided";

/// 简历分析与面试准备助手，不使用搜索
pub struct CvAssistant {
    llm: Arc<dyn TextGenerator>,
    settings: AgentConfig,
}

impl CvAssistant {
    pub fn new(llm: Arc<dyn TextGenerator>, model_name: &str, temperature: f64) -> Self {
        Self {
            llm,
            settings: AgentConfig::new(model_name, temperature),
        }
    }

    pub fn from_config(config: &Config, llm: Arc<dyn TextGenerator>, model_name: Option<&str>) -> Self {
        let model = model_name.unwrap_or(&config.features.cv_model);
        Self::new(llm, model, config.features.cv_temperature)
    }

    pub fn settings(&self) -> &AgentConfig {
        &self.settings
    }

    /// 分析简历；提供职位描述时按职位匹配分析
    pub async fn analyze(&self, cv_text: &str, job_description: Option<&str>) -> Result<AgentReply> {
        let (key, fields) = match job_description.filter(|jd| !jd.trim().is_empty()) {
            Some(jd) => (
                TemplateKey::CvJobMatch,
                TemplateFields::new()
                    .with("cv_text", cv_text)
                    .with("job_description", jd),
            ),
            None => (
                TemplateKey::CvAnalysis,
                TemplateFields::new().with("cv_text", cv_text),
            ),
        };

        complete_template(self.llm.as_ref(), &self.settings, key, fields).await
    }

    /// 基于简历与此前回复回答追问
    pub async fn follow_up(
        &self,
        cv_text: &str,
        job_description: Option<&str>,
        context: &str,
        question: &str,
    ) -> Result<AgentReply> {
        let job_description = job_description
            .filter(|jd| !jd.trim().is_empty())
            .unwrap_or(NO_JOB_DESCRIPTION);
        let fields = TemplateFields::new()
            .with("cv_text", cv_text)
            .with("job_description", job_description)
            .with("context", context)
            .with("question", question);

        complete_template(self.llm.as_ref(), &self.settings, TemplateKey::CvFollowUp, fields).await
    }
}
