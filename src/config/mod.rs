use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;

/// LLM Provider类型
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub enum LLMProvider {
    #[serde(rename = "groq")]
    #[default]
    Groq,
    #[serde(rename = "openai")]
    OpenAI,
    #[serde(rename = "deepseek")]
    DeepSeek,
    #[serde(rename = "anthropic")]
    Anthropic,
    #[serde(rename = "ollama")]
    Ollama,
}

impl std::fmt::Display for LLMProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LLMProvider::Groq => write!(f, "groq"),
            LLMProvider::OpenAI => write!(f, "openai"),
            LLMProvider::DeepSeek => write!(f, "deepseek"),
            LLMProvider::Anthropic => write!(f, "anthropic"),
            LLMProvider::Ollama => write!(f, "ollama"),
        }
    }
}

impl std::str::FromStr for LLMProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "groq" => Ok(LLMProvider::Groq),
            "openai" => Ok(LLMProvider::OpenAI),
            "deepseek" => Ok(LLMProvider::DeepSeek),
            "anthropic" => Ok(LLMProvider::Anthropic),
            "ollama" => Ok(LLMProvider::Ollama),
            _ => Err(format!("Unknown provider: {}", s)),
        }
    }
}

/// Web搜索后端类型
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchEngine {
    #[serde(rename = "tavily")]
    Tavily,
    #[serde(rename = "serpapi")]
    #[default]
    SerpApi,
}

impl SearchEngine {
    /// 对应后端所需的凭据环境变量名
    pub fn credential_name(&self) -> &'static str {
        match self {
            SearchEngine::Tavily => "TAVILY_API_KEY",
            SearchEngine::SerpApi => "SERPAPI_API_KEY",
        }
    }
}

impl std::fmt::Display for SearchEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchEngine::Tavily => write!(f, "tavily"),
            SearchEngine::SerpApi => write!(f, "serpapi"),
        }
    }
}

impl std::str::FromStr for SearchEngine {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tavily" => Ok(SearchEngine::Tavily),
            "serpapi" => Ok(SearchEngine::SerpApi),
            _ => Err(format!("Unsupported search engine: {}", s)),
        }
    }
}

/// 应用程序配置
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct Config {
    /// LLM模型配置
    pub llm: LLMConfig,

    /// Web搜索配置
    pub search: SearchConfig,

    /// 各功能的模型与温度配置
    pub features: FeatureConfig,

    /// 是否启用详细日志
    pub verbose: bool,
}

/// LLM模型配置
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct LLMConfig {
    /// LLM Provider类型
    pub provider: LLMProvider,

    /// LLM API KEY
    pub api_key: String,

    /// LLM API基地址
    pub api_base_url: String,

    /// 默认模型
    pub model: String,

    /// 最大tokens
    pub max_tokens: u32,

    /// 默认温度
    pub temperature: f64,

    /// 超时时间（秒），对LLM与搜索请求统一生效
    pub timeout_seconds: u64,
}

/// Web搜索配置
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct SearchConfig {
    /// 是否启用搜索增强
    pub enabled: bool,

    /// 搜索后端
    pub engine: SearchEngine,

    /// Tavily API KEY
    pub tavily_api_key: Option<String>,

    /// SerpAPI API KEY
    pub serpapi_api_key: Option<String>,

    /// 单次搜索请求的结果数量，同时也是注入prompt的结果上限
    pub results_count: usize,
}

/// 各功能模块的模型与温度
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct FeatureConfig {
    pub cv_model: String,
    pub cv_temperature: f64,
    pub code_model: String,
    pub code_temperature: f64,
    pub article_model: String,
    pub article_temperature: f64,
    pub study_model: String,
    pub study_temperature: f64,
}

pub const DEFAULT_MODEL: &str = "llama3-70b-8192";

/// 未使用搜索时附带的来源说明
pub const DEFAULT_SOURCE_ATTRIBUTION: &str =
    "Generated with AI - no web search capability in this version";

impl Config {
    /// 从文件加载配置
    pub fn from_file(path: &PathBuf) -> Result<Self> {
        let mut file =
            File::open(path).context(format!("Failed to open config file: {:?}", path))?;
        let mut content = String::new();
        file.read_to_string(&mut content)
            .context("Failed to read config file")?;

        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }

    /// LLM调用与搜索请求共用的超时时间
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.llm.timeout_seconds)
    }

    /// 将同一个模型应用到所有功能
    pub fn set_model_for_all(&mut self, model: &str) {
        self.llm.model = model.to_string();
        self.features.cv_model = model.to_string();
        self.features.code_model = model.to_string();
        self.features.article_model = model.to_string();
        self.features.study_model = model.to_string();
    }
}

impl SearchConfig {
    /// 获取当前后端的凭据，空白值视为缺失
    pub fn credential(&self) -> Option<&str> {
        let key = match self.engine {
            SearchEngine::Tavily => self.tavily_api_key.as_deref(),
            SearchEngine::SerpApi => self.serpapi_api_key.as_deref(),
        };
        key.filter(|k| !k.trim().is_empty())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm: LLMConfig::default(),
            search: SearchConfig::default(),
            features: FeatureConfig::default(),
            verbose: false,
        }
    }
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            provider: LLMProvider::default(),
            api_key: std::env::var("GROQ_API_KEY").unwrap_or_default(),
            api_base_url: String::from("https://api.groq.com/openai/v1"),
            model: String::from(DEFAULT_MODEL),
            max_tokens: 8192,
            temperature: 0.7,
            timeout_seconds: 120,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            engine: SearchEngine::default(),
            tavily_api_key: std::env::var("TAVILY_API_KEY").ok(),
            serpapi_api_key: std::env::var("SERPAPI_API_KEY").ok(),
            results_count: 5,
        }
    }
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            cv_model: String::from(DEFAULT_MODEL),
            cv_temperature: 0.7,
            code_model: String::from(DEFAULT_MODEL),
            code_temperature: 0.2,
            article_model: String::from(DEFAULT_MODEL),
            article_temperature: 0.5,
            study_model: String::from(DEFAULT_MODEL),
            study_temperature: 0.3,
        }
    }
}

// Include tests
#[cfg(test)]
mod tests;
