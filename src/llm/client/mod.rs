//! LLM客户端 - 提供统一的LLM服务接口

use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::config::LLMConfig;

mod providers;

use providers::ProviderClient;

/// 单次调用使用的模型与温度
#[derive(Debug, Clone, PartialEq)]
pub struct AgentConfig {
    pub model_name: String,
    pub temperature: f64,
}

impl AgentConfig {
    pub fn new(model_name: impl Into<String>, temperature: f64) -> Self {
        Self {
            model_name: model_name.into(),
            temperature,
        }
    }
}

/// LLM调用错误
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("LLM request timed out after {0} seconds")]
    Timeout(u64),
}

/// 文本生成接口：给定渲染完成的prompt，返回生成的文本
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str, settings: &AgentConfig) -> Result<String>;
}

/// LLM客户端 - 提供统一的LLM服务接口
#[derive(Clone)]
pub struct LLMClient {
    config: LLMConfig,
    client: ProviderClient,
}

impl LLMClient {
    /// 创建新的LLM客户端
    pub fn new(config: LLMConfig) -> Result<Self> {
        let client = ProviderClient::new(&config)?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &LLMConfig {
        &self.config
    }

    /// 检查模型连接是否正常
    pub async fn check_connection(&self) -> Result<()> {
        println!("🔄 正在检查模型连接...");
        let settings = AgentConfig::new(&self.config.model, self.config.temperature);
        match self.generate("Hello", &settings).await {
            Ok(_) => {
                println!("✅ 模型连接正常");
                Ok(())
            }
            Err(e) => {
                eprintln!("❌ 模型连接失败: {}", e);
                Err(e)
            }
        }
    }
}

#[async_trait]
impl TextGenerator for LLMClient {
    /// 单次调用，不重试；超时时间对所有调用统一
    async fn generate(&self, prompt: &str, settings: &AgentConfig) -> Result<String> {
        debug!(
            provider = %self.config.provider,
            model = %settings.model_name,
            temperature = settings.temperature,
            prompt_chars = prompt.len(),
            "invoking LLM"
        );

        let agent =
            self.client
                .create_agent(&settings.model_name, settings.temperature, &self.config);
        let timeout = Duration::from_secs(self.config.timeout_seconds);

        match tokio::time::timeout(timeout, agent.prompt(prompt)).await {
            Ok(result) => result,
            Err(_) => Err(LlmError::Timeout(self.config.timeout_seconds).into()),
        }
    }
}
