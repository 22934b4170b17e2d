//! 迭代式草稿链：先生成初稿，再根据反馈逐轮修改

use anyhow::Result;
use std::sync::Arc;

use crate::llm::client::{AgentConfig, TextGenerator};
use crate::prompts::{TemplateFields, TemplateKey};
use crate::utils::token_estimator::truncate_to_token_limit;

/// 尚无草稿时refine返回的提示
pub const NO_DRAFT_MESSAGE: &str = "Please generate an initial draft first.";

/// 草稿状态
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DraftState {
    #[default]
    NoDraft,
    HasDraft(String),
}

pub struct IterativeChain {
    task_description: String,
    llm: Arc<dyn TextGenerator>,
    settings: AgentConfig,
    state: DraftState,
}

impl IterativeChain {
    pub fn new(
        task_description: impl Into<String>,
        llm: Arc<dyn TextGenerator>,
        settings: AgentConfig,
    ) -> Self {
        Self {
            task_description: task_description.into(),
            llm,
            settings,
            state: DraftState::NoDraft,
        }
    }

    pub fn state(&self) -> &DraftState {
        &self.state
    }

    pub fn current_draft(&self) -> Option<&str> {
        match &self.state {
            DraftState::NoDraft => None,
            DraftState::HasDraft(draft) => Some(draft),
        }
    }

    /// 生成初稿，覆盖已有草稿
    pub async fn initial_draft(&mut self, input: &str) -> Result<String> {
        let fields = TemplateFields::new()
            .with("task_description", &self.task_description)
            .with("input", truncate_to_token_limit(input));
        let prompt = TemplateKey::IterativeInitial.template().render(&fields)?;

        let draft = self.llm.generate(&prompt, &self.settings).await?;
        self.state = DraftState::HasDraft(draft.clone());
        Ok(draft)
    }

    /// 根据反馈修改当前草稿
    pub async fn refine(&mut self, feedback: &str) -> Result<String> {
        let DraftState::HasDraft(current) = &self.state else {
            return Ok(NO_DRAFT_MESSAGE.to_string());
        };

        let fields = TemplateFields::new()
            .with("task_description", &self.task_description)
            .with("current_draft", truncate_to_token_limit(current))
            .with("feedback", feedback);
        let prompt = TemplateKey::IterativeRefine.template().render(&fields)?;

        let draft = self.llm.generate(&prompt, &self.settings).await?;
        self.state = DraftState::HasDraft(draft.clone());
        Ok(draft)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockGenerator;

    fn chain(generator: &MockGenerator) -> IterativeChain {
        IterativeChain::new(
            "Write a product description.",
            Arc::new(generator.clone()),
            AgentConfig::new("llama3-70b-8192", 0.7),
        )
    }

    #[tokio::test]
    async fn test_refine_without_draft() {
        let generator = MockGenerator::replying("unused");
        let mut chain = chain(&generator);

        let reply = chain.refine("shorter please").await.unwrap();

        assert_eq!(reply, NO_DRAFT_MESSAGE);
        assert_eq!(chain.state(), &DraftState::NoDraft);
        assert!(generator.last_prompt().is_none());
    }

    #[tokio::test]
    async fn test_draft_then_refine() {
        let generator = MockGenerator::replying("draft v1");
        let mut chain = chain(&generator);

        let draft = chain.initial_draft("a mechanical keyboard").await.unwrap();
        assert_eq!(draft, "draft v1");
        assert_eq!(chain.current_draft(), Some("draft v1"));
        let prompt = generator.last_prompt().unwrap();
        assert!(prompt.contains("Write a product description."));
        assert!(prompt.contains("Initial input: a mechanical keyboard"));

        chain.refine("mention the switches").await.unwrap();
        let prompt = generator.last_prompt().unwrap();
        assert!(prompt.contains("Current draft:\ndraft v1"));
        assert!(prompt.contains("Feedback: mention the switches"));
    }

    #[tokio::test]
    async fn test_failed_draft_keeps_state() {
        let generator = MockGenerator::failing();
        let mut chain = chain(&generator);

        assert!(chain.initial_draft("input").await.is_err());
        assert_eq!(chain.state(), &DraftState::NoDraft);
    }

    #[tokio::test]
    async fn test_long_input_is_truncated() {
        let generator = MockGenerator::replying("ok");
        let mut chain = chain(&generator);

        chain.initial_draft(&"z".repeat(40_000)).await.unwrap();

        let prompt = generator.last_prompt().unwrap();
        assert!(prompt.contains("[Note: Text was truncated to fit token limits]"));
    }
}
