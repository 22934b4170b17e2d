//! 功能助手 - CV分析、代码讲解、文章生成、学习计划，以及会话历史

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::agent::AgentReply;
use crate::config::DEFAULT_SOURCE_ATTRIBUTION;
use crate::llm::client::{AgentConfig, TextGenerator};
use crate::prompts::{TemplateFields, TemplateKey};

pub mod article;
pub mod code;
pub mod cv;
pub mod study;

pub use article::ArticleAssistant;
pub use code::CodeAssistant;
pub use cv::CvAssistant;
pub use study::StudyAssistant;

/// 追问失败时的来源说明
pub const ERROR_SOURCE: &str = "Error occurred";

/// 追问失败时的回复前缀
pub const FOLLOW_UP_ERROR_PREFIX: &str = "Error generating response: ";

/// 功能类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    Cv,
    Code,
    Article,
    Study,
}

impl Feature {
    /// 分析失败时的回复前缀
    pub fn analysis_error_prefix(&self) -> &'static str {
        match self {
            Feature::Cv => "Error in analyzing CV: ",
            Feature::Code => "Error in analyzing code: ",
            Feature::Article => "Error in generating article: ",
            Feature::Study => "Error in generating study plan: ",
        }
    }

    /// 尚未分析就追问时的提示
    pub fn missing_context_message(&self) -> &'static str {
        match self {
            Feature::Cv => {
                "Please upload your CV/resume first to get interview preparation assistance."
            }
            Feature::Code => "Please provide your code and run an analysis first to get started.",
            Feature::Article => "Please generate an article first.",
            Feature::Study => "Please generate a study plan first.",
        }
    }
}

/// 消息角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// 会话消息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub role: Role,
    pub content: String,
    pub source: Option<String>,
    pub is_code: bool,
}

impl ConversationMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            source: None,
            is_code: false,
        }
    }

    pub fn code(content: impl Into<String>) -> Self {
        Self {
            is_code: true,
            ..Self::user(content)
        }
    }

    pub fn assistant(content: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            source: Some(source.into()),
            is_code: false,
        }
    }
}

/// 按顺序保存的会话历史，仅存在于内存中
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    messages: Vec<ConversationMessage>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: ConversationMessage) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[ConversationMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn has_assistant_reply(&self) -> bool {
        self.messages.iter().any(|m| m.role == Role::Assistant)
    }

    /// 所有助手回复拼接而成的上下文
    pub fn assistant_context(&self) -> String {
        self.messages
            .iter()
            .filter(|m| m.role == Role::Assistant && !m.is_code)
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// 第一条代码消息
    pub fn first_code(&self) -> Option<&str> {
        self.messages
            .iter()
            .find(|m| m.is_code)
            .map(|m| m.content.as_str())
    }

    /// 最近一条助手回复
    pub fn last_assistant_reply(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::Assistant)
            .map(|m| m.content.as_str())
    }
}

/// 单个功能的会话：管理历史，并把LLM错误转换为展示文本
#[derive(Debug, Clone)]
pub struct FeatureSession {
    feature: Feature,
    conversation: Conversation,
}

impl FeatureSession {
    pub fn new(feature: Feature) -> Self {
        Self {
            feature,
            conversation: Conversation::new(),
        }
    }

    pub fn feature(&self) -> Feature {
        self.feature
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// 开始新的分析：清空历史并记录用户请求
    pub fn begin_analysis(&mut self, request: &str) {
        self.conversation.clear();
        self.conversation.push(ConversationMessage::user(request));
    }

    /// 记录用户提交的代码
    pub fn attach_code(&mut self, code: &str) {
        self.conversation.push(ConversationMessage::code(code));
    }

    /// 记录分析结果，失败时记录带前缀的错误文本
    pub fn finish_analysis(&mut self, outcome: Result<AgentReply>) -> &ConversationMessage {
        let message = match outcome {
            Ok(reply) => ConversationMessage::assistant(reply.content, reply.attribution),
            Err(e) => {
                warn!(feature = ?self.feature, "analysis failed: {:#}", e);
                ConversationMessage::assistant(
                    format!("{}{:#}", self.feature.analysis_error_prefix(), e),
                    DEFAULT_SOURCE_ATTRIBUTION,
                )
            }
        };
        self.push_reply(message)
    }

    /// 记录追问，返回是否已有可供追问的分析结果
    pub fn ask(&mut self, question: &str) -> bool {
        let ready = self.conversation.has_assistant_reply();
        self.conversation.push(ConversationMessage::user(question));
        ready
    }

    /// 尚无分析结果时回复提示
    pub fn decline_follow_up(&mut self) -> &ConversationMessage {
        let message = ConversationMessage::assistant(
            self.feature.missing_context_message(),
            DEFAULT_SOURCE_ATTRIBUTION,
        );
        self.push_reply(message)
    }

    /// 记录追问结果，失败时记录错误文本
    pub fn finish_follow_up(&mut self, outcome: Result<AgentReply>) -> &ConversationMessage {
        let message = match outcome {
            Ok(reply) => ConversationMessage::assistant(reply.content, reply.attribution),
            Err(e) => {
                warn!(feature = ?self.feature, "follow-up failed: {:#}", e);
                ConversationMessage::assistant(
                    format!("{}{:#}", FOLLOW_UP_ERROR_PREFIX, e),
                    ERROR_SOURCE,
                )
            }
        };
        self.push_reply(message)
    }

    fn push_reply(&mut self, message: ConversationMessage) -> &ConversationMessage {
        self.conversation.push(message);
        &self.conversation.messages[self.conversation.messages.len() - 1]
    }
}

/// 不经过搜索，直接渲染模板并调用LLM
pub(crate) async fn complete_template(
    llm: &dyn TextGenerator,
    settings: &AgentConfig,
    key: TemplateKey,
    fields: TemplateFields,
) -> Result<AgentReply> {
    let prompt = key.template().render(&fields)?;
    let content = llm.generate(&prompt, settings).await?;
    Ok(AgentReply::new(content, DEFAULT_SOURCE_ATTRIBUTION))
}
