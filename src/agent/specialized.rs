use anyhow::Result;

use super::{AgentReply, SearchEnabledAgent};
use crate::prompts::{CodeMode, TemplateFields, TemplateKey};

/// 代码预览的最大字符数
const CODE_PREVIEW_CHARS: usize = 200;

/// 查询中最多保留的依赖声明行
const MAX_LIBRARY_LINES: usize = 3;

/// 文章生成Agent
pub struct ArticleSearchAgent {
    agent: SearchEnabledAgent,
}

impl ArticleSearchAgent {
    pub fn new(agent: SearchEnabledAgent) -> Self {
        Self { agent }
    }

    pub fn search_query(topic: &str) -> String {
        format!("{} facts information research", topic)
    }

    /// 生成文章，温度按本次请求覆盖
    pub async fn generate_article(
        &mut self,
        topic: &str,
        word_count: u32,
        temperature: f64,
        style: &str,
    ) -> Result<AgentReply> {
        self.agent.set_temperature(temperature);

        let query = Self::search_query(topic);
        let fields = TemplateFields::new()
            .with("topic", topic)
            .with("word_count", word_count)
            .with("temperature", temperature)
            .with("style", style);

        self.agent
            .run(&TemplateKey::Article.search_template(), Some(&query), fields)
            .await
    }

    pub fn inner(&mut self) -> &mut SearchEnabledAgent {
        &mut self.agent
    }
}

/// 学习计划Agent
pub struct StudyPlanSearchAgent {
    agent: SearchEnabledAgent,
}

impl StudyPlanSearchAgent {
    pub fn new(agent: SearchEnabledAgent) -> Self {
        Self { agent }
    }

    pub fn search_query(subject: &str, experience_level: &str) -> String {
        format!(
            "{} learning resources curriculum study guide {} level",
            subject, experience_level
        )
    }

    pub async fn generate_study_plan(
        &mut self,
        subject: &str,
        duration_weeks: u32,
        experience_level: &str,
        goals: &str,
    ) -> Result<AgentReply> {
        let query = Self::search_query(subject, experience_level);
        let fields = TemplateFields::new()
            .with("subject", subject)
            .with("duration_weeks", duration_weeks)
            .with("experience_level", experience_level)
            .with("goals", goals);

        self.agent
            .run(&TemplateKey::StudyPlan.search_template(), Some(&query), fields)
            .await
    }

    pub fn inner(&mut self) -> &mut SearchEnabledAgent {
        &mut self.agent
    }
}

/// 代码讲解Agent，搜索相关库的文档
pub struct CodeExplainerSearchAgent {
    agent: SearchEnabledAgent,
}

impl CodeExplainerSearchAgent {
    pub fn new(agent: SearchEnabledAgent) -> Self {
        Self { agent }
    }

    /// 从代码开头的依赖声明推断搜索查询，没有依赖声明时使用代码预览
    pub fn search_query(code: &str, language: &str) -> String {
        let preview: String = code.chars().take(CODE_PREVIEW_CHARS).collect();

        let libraries: Vec<&str> = preview
            .lines()
            .filter(|line| {
                line.contains("import ")
                    || line.contains("from ")
                    || line.contains("require(")
                    || line.contains("#include")
            })
            .map(str::trim)
            .take(MAX_LIBRARY_LINES)
            .collect();

        let search_terms = if libraries.is_empty() {
            preview
        } else {
            libraries.join(" ")
        };
        format!("{} programming {} documentation", language, search_terms)
    }

    pub async fn explain_code(
        &mut self,
        code: &str,
        language: &str,
        mode: CodeMode,
    ) -> Result<AgentReply> {
        let query = Self::search_query(code, language);
        let fields = TemplateFields::new()
            .with("code", code)
            .with("language", language);

        self.agent
            .run(&TemplateKey::Code(mode).search_template(), Some(&query), fields)
            .await
    }

    pub fn inner(&mut self) -> &mut SearchEnabledAgent {
        &mut self.agent
    }
}
