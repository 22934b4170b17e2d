use crate::assistant::article::{ARTICLE_STYLES, DEFAULT_STYLE, DEFAULT_WORD_COUNT, WORD_COUNTS};
use crate::assistant::study::{DEFAULT_DURATION_WEEKS, EXPERIENCE_LEVELS, MAX_DURATION_WEEKS};
use crate::config::{Config, LLMProvider, SearchEngine};
use crate::prompts::CodeMode;
use crate::workflow::Task;
use anyhow::{Context, Result, anyhow, bail};
use clap::builder::PossibleValuesParser;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::warn;

/// 默认配置文件名
pub const DEFAULT_CONFIG_FILE: &str = "assistant.toml";

/// Sage Assist - 带Web搜索增强的学习与求职助手
#[derive(Parser, Debug)]
#[command(name = "sage-assist")]
#[command(
    about = "AI study and career assistant: CV interview preparation, code explanation, article writing and study plans, optionally grounded in live web search results."
)]
#[command(version)]
pub struct Args {
    /// 配置文件路径
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 所有功能使用的模型
    #[arg(short, long)]
    pub model: Option<String>,

    /// LLM Provider (groq, openai, deepseek, anthropic, ollama)
    #[arg(long)]
    pub llm_provider: Option<String>,

    /// LLM API KEY
    #[arg(long)]
    pub llm_api_key: Option<String>,

    /// LLM API基地址
    #[arg(long)]
    pub llm_api_base_url: Option<String>,

    /// 请求超时（秒）
    #[arg(long)]
    pub timeout_seconds: Option<u64>,

    /// 搜索引擎 (tavily, serpapi)
    #[arg(long)]
    pub search_engine: Option<String>,

    /// 禁用Web搜索
    #[arg(long)]
    pub no_search: bool,

    /// 是否启用详细日志
    #[arg(short, long)]
    pub verbose: bool,

    /// 运行前检查模型连接
    #[arg(long)]
    pub check_connection: bool,

    /// 分析完成后从标准输入读取追问
    #[arg(short, long, global = true)]
    pub interactive: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// 简历分析与面试准备
    Cv {
        /// 简历文件（PDF或文本）
        #[arg(long)]
        cv_file: PathBuf,

        /// 职位描述
        #[arg(long)]
        job_description: Option<String>,
    },
    /// 代码讲解、纠错、优化或解题
    Code {
        #[arg(long, default_value = "python")]
        language: String,

        /// line-by-line, fix, optimize, solve
        #[arg(long, default_value = "line-by-line")]
        mode: CodeMode,

        #[arg(long, conflicts_with = "code_file")]
        code: Option<String>,

        #[arg(long)]
        code_file: Option<PathBuf>,
    },
    /// 生成文章
    Article {
        #[arg(long)]
        topic: String,

        /// 250, 500, 750, 1000, 1500, 2000, 3000
        #[arg(long, default_value_t = DEFAULT_WORD_COUNT, value_parser = parse_word_count)]
        word_count: u32,

        #[arg(long, default_value = DEFAULT_STYLE, value_parser = PossibleValuesParser::new(ARTICLE_STYLES))]
        style: String,

        /// 创造性 (0.1 - 1.0)
        #[arg(long, default_value_t = 0.5, value_parser = parse_temperature)]
        temperature: f64,
    },
    /// 生成学习计划
    Study {
        #[arg(long)]
        subject: String,

        /// 计划周数 (1 - 24)
        #[arg(
            long,
            default_value_t = DEFAULT_DURATION_WEEKS,
            value_parser = clap::value_parser!(u32).range(1..=MAX_DURATION_WEEKS as i64)
        )]
        weeks: u32,

        #[arg(long, default_value = EXPERIENCE_LEVELS[0], value_parser = PossibleValuesParser::new(EXPERIENCE_LEVELS))]
        level: String,

        #[arg(long)]
        goals: String,
    },
    /// 迭代式草稿：生成初稿，交互模式下按反馈修改
    Draft {
        #[arg(long)]
        task: String,

        #[arg(long)]
        input: String,
    },
}

fn parse_temperature(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("invalid temperature: {}", s))?;
    if (0.1..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("temperature must be between 0.1 and 1.0, got {}", value))
    }
}

fn parse_word_count(s: &str) -> Result<u32, String> {
    let value: u32 = s
        .parse()
        .map_err(|_| format!("invalid word count: {}", s))?;
    if WORD_COUNTS.contains(&value) {
        Ok(value)
    } else {
        Err(format!("word count must be one of {:?}, got {}", WORD_COUNTS, value))
    }
}

impl Command {
    /// 转换为执行任务，代码文件在此读取
    pub fn into_task(self) -> Result<Task> {
        let task = match self {
            Command::Cv {
                cv_file,
                job_description,
            } => Task::Cv {
                cv_file,
                job_description,
            },
            Command::Code {
                language,
                mode,
                code,
                code_file,
            } => {
                let code = match (code, code_file) {
                    (Some(code), _) => code,
                    (None, Some(path)) => std::fs::read_to_string(&path)
                        .with_context(|| format!("Failed to read code file {:?}", path))?,
                    (None, None) => bail!("Either --code or --code-file is required"),
                };
                if code.trim().is_empty() {
                    bail!("No code provided");
                }
                Task::Code {
                    code,
                    language,
                    mode,
                }
            }
            Command::Article {
                topic,
                word_count,
                style,
                temperature,
            } => Task::Article {
                topic,
                word_count,
                style,
                temperature,
            },
            Command::Study {
                subject,
                weeks,
                level,
                goals,
            } => Task::Study {
                subject,
                duration_weeks: weeks,
                experience_level: level,
                goals,
            },
            Command::Draft { task, input } => Task::Draft {
                task_description: task,
                input,
            },
        };
        Ok(task)
    }
}

impl Args {
    /// 将CLI参数转换为配置：配置文件 -> 默认位置 -> 默认值，之后由命令行参数覆盖
    pub fn build_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(config_path) => Config::from_file(config_path)?,
            None => {
                let default_config_path = std::env::current_dir()
                    .unwrap_or_else(|_| PathBuf::from("."))
                    .join(DEFAULT_CONFIG_FILE);
                if default_config_path.exists() {
                    Config::from_file(&default_config_path)?
                } else {
                    Config::default()
                }
            }
        };

        // 覆盖LLM配置
        if let Some(provider_str) = &self.llm_provider {
            match provider_str.parse::<LLMProvider>() {
                Ok(provider) => config.llm.provider = provider,
                Err(_) => warn!(
                    "⚠️ unknown provider: {}, keeping {}",
                    provider_str, config.llm.provider
                ),
            }
        }
        if let Some(llm_api_base_url) = &self.llm_api_base_url {
            config.llm.api_base_url = llm_api_base_url.clone();
        }
        if let Some(llm_api_key) = &self.llm_api_key {
            config.llm.api_key = llm_api_key.clone();
        }
        if let Some(model) = &self.model {
            config.set_model_for_all(model);
        }
        if let Some(timeout_seconds) = self.timeout_seconds {
            config.llm.timeout_seconds = timeout_seconds;
        }

        // 搜索配置
        if let Some(engine_str) = &self.search_engine {
            config.search.engine = engine_str.parse::<SearchEngine>().map_err(|e| anyhow!(e))?;
        }
        if self.no_search {
            config.search.enabled = false;
        }

        config.verbose = config.verbose || self.verbose;

        Ok(config)
    }
}
