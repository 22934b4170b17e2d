use anyhow::Result;
use std::sync::Arc;

use super::complete_template;
use crate::agent::{AgentReply, SearchEnabledAgent, StudyPlanSearchAgent};
use crate::config::Config;
use crate::llm::client::{AgentConfig, TextGenerator};
use crate::prompts::{TemplateFields, TemplateKey};

/// 可选的经验水平，第一个为默认值
pub const EXPERIENCE_LEVELS: [&str; 3] = ["Beginner", "Intermediate", "Advanced"];

pub const DEFAULT_DURATION_WEEKS: u32 = 8;
pub const MAX_DURATION_WEEKS: u32 = 24;

/// 追问时学科为空的占位
pub const UNKNOWN_SUBJECT: &str = "the subject";

/// 分析请求在会话中的文本
pub fn analysis_request(subject: &str, duration_weeks: u32, experience_level: &str, goals: &str) -> String {
    format!(
        "Create a {}-week study plan for {} at {} level with these goals: {}",
        duration_weeks, subject, experience_level, goals
    )
}

/// 学习计划助手
pub struct StudyAssistant {
    llm: Arc<dyn TextGenerator>,
    settings: AgentConfig,
    search_agent: Option<StudyPlanSearchAgent>,
}

impl StudyAssistant {
    pub fn new(llm: Arc<dyn TextGenerator>, model_name: &str, temperature: f64) -> Self {
        Self {
            llm,
            settings: AgentConfig::new(model_name, temperature),
            search_agent: None,
        }
    }

    pub fn with_search(mut self, agent: StudyPlanSearchAgent) -> Self {
        self.search_agent = Some(agent);
        self
    }

    pub fn from_config(
        config: &Config,
        llm: Arc<dyn TextGenerator>,
        model_name: Option<&str>,
    ) -> Result<Self> {
        let model = model_name.unwrap_or(&config.features.study_model);
        let temperature = config.features.study_temperature;
        let assistant = Self::new(llm.clone(), model, temperature);

        if !config.search.enabled {
            return Ok(assistant);
        }
        let agent = SearchEnabledAgent::with_llm(config, llm, model, temperature)?;
        Ok(assistant.with_search(StudyPlanSearchAgent::new(agent)))
    }

    pub fn settings(&self) -> &AgentConfig {
        &self.settings
    }

    pub async fn generate(
        &mut self,
        subject: &str,
        duration_weeks: u32,
        experience_level: &str,
        goals: &str,
    ) -> Result<AgentReply> {
        if let Some(agent) = self.search_agent.as_mut() {
            return agent
                .generate_study_plan(subject, duration_weeks, experience_level, goals)
                .await;
        }

        let fields = TemplateFields::new()
            .with("subject", subject)
            .with("duration_weeks", duration_weeks)
            .with("experience_level", experience_level)
            .with("goals", goals);
        complete_template(self.llm.as_ref(), &self.settings, TemplateKey::StudyPlan, fields).await
    }

    /// 针对已有学习计划的修改请求或提问
    pub async fn follow_up(
        &self,
        subject: &str,
        duration_weeks: u32,
        experience_level: &str,
        plan: &str,
        request: &str,
    ) -> Result<AgentReply> {
        let subject = if subject.trim().is_empty() { UNKNOWN_SUBJECT } else { subject };
        let fields = TemplateFields::new()
            .with("subject", subject)
            .with("duration_weeks", duration_weeks)
            .with("experience_level", experience_level)
            .with("plan", plan)
            .with("request", request);

        complete_template(self.llm.as_ref(), &self.settings, TemplateKey::StudyFollowUp, fields)
            .await
    }
}
