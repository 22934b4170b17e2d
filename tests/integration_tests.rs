use anyhow::{Result, anyhow};
use async_trait::async_trait;
use sage_assist::agent::{ArticleSearchAgent, SearchEnabledAgent};
use sage_assist::config::{Config, DEFAULT_SOURCE_ATTRIBUTION};
use sage_assist::llm::client::{AgentConfig, TextGenerator};
use sage_assist::prompts::{PromptTemplate, TemplateFields};
use sage_assist::search::{SearchBackend, SearchError, SearchResult, WebSearchTool};
use sage_assist::workflow::{Task, Workflow};
use std::io::Cursor;
use std::sync::{Arc, Mutex};

/// 固定返回一组搜索结果的后端
struct FixedBackend {
    results: Vec<SearchResult>,
}

#[async_trait]
impl SearchBackend for FixedBackend {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn search(&self, _query: &str, _num_results: usize) -> Result<Vec<SearchResult>, SearchError> {
        Ok(self.results.clone())
    }
}

/// 记录所有prompt的生成器
#[derive(Clone, Default)]
struct RecordingGenerator {
    prompts: Arc<Mutex<Vec<String>>>,
    fail: bool,
}

#[async_trait]
impl TextGenerator for RecordingGenerator {
    async fn generate(&self, prompt: &str, _settings: &AgentConfig) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if self.fail {
            return Err(anyhow!("rate limited"));
        }
        Ok(format!("reply #{}", self.prompts.lock().unwrap().len()))
    }
}

fn offline_config() -> Config {
    let mut config = Config::default();
    config.search.enabled = false;
    config
}

#[tokio::test]
async fn test_duplicate_urls_are_cited_once() {
    let generator = RecordingGenerator::default();
    let backend = FixedBackend {
        results: vec![
            SearchResult::new("Rust Book", "https://doc.rust-lang.org/book/", "Ownership rules."),
            SearchResult::new("Rust Book (mirror)", "https://doc.rust-lang.org/book/", "Same page."),
        ],
    };
    let mut agent = SearchEnabledAgent::new(
        AgentConfig::new("llama3-70b-8192", 0.7),
        Arc::new(generator.clone()),
        WebSearchTool::with_backend(Box::new(backend)),
    );

    let reply = agent
        .run(
            &PromptTemplate::new("Write about {topic}."),
            Some("rust memory safety facts research"),
            TemplateFields::new().with("topic", "memory safety"),
        )
        .await
        .unwrap();

    assert_eq!(
        reply.attribution,
        "Information from web search results including:\n1. Rust Book (https://doc.rust-lang.org/book/)\n"
    );
    let prompt = generator.prompts.lock().unwrap()[0].clone();
    assert!(prompt.contains("Source: Rust Book (mirror)"));
}

#[tokio::test]
async fn test_article_agent_history_accumulates() {
    let generator = RecordingGenerator::default();
    let backend = FixedBackend {
        results: vec![SearchResult::new("Tokio", "https://tokio.rs", "Async runtime.")],
    };
    let mut agent = ArticleSearchAgent::new(SearchEnabledAgent::new(
        AgentConfig::new("llama3-70b-8192", 0.5),
        Arc::new(generator.clone()),
        WebSearchTool::with_backend(Box::new(backend)),
    ));

    agent.generate_article("async Rust", 500, 0.4, "Technical").await.unwrap();
    agent.generate_article("tokio", 500, 0.4, "Technical").await.unwrap();

    let history = agent.inner().search_tool().history();
    assert_eq!(history.len(), 2);
    assert_eq!(history[1].query, "tokio facts information research");
}

#[test]
fn test_unsupported_engine_is_rejected() {
    let mut config = offline_config();
    config.search.serpapi_api_key = Some("serp-test".to_string());

    assert!(matches!(
        WebSearchTool::from_engine_name("bing", &config.search, config.request_timeout()),
        Err(SearchError::UnsupportedEngine(_))
    ));
}

#[tokio::test]
async fn test_study_conversation_flow() {
    let generator = RecordingGenerator::default();
    let workflow = Workflow::new(offline_config(), Arc::new(generator.clone()));

    let session = workflow
        .run(
            Task::Study {
                subject: "Databases".to_string(),
                duration_weeks: 6,
                experience_level: "Intermediate".to_string(),
                goals: "Understand indexing".to_string(),
            },
            true,
            Cursor::new("Add a week on transactions\n"),
            &mut Vec::new(),
        )
        .await
        .unwrap()
        .unwrap();

    let messages = session.conversation().messages();
    assert_eq!(messages.len(), 4);
    assert_eq!(messages[1].content, "reply #1");
    assert_eq!(messages[3].content, "reply #2");
    assert_eq!(messages[3].source.as_deref(), Some(DEFAULT_SOURCE_ATTRIBUTION));

    let follow_up_prompt = generator.prompts.lock().unwrap()[1].clone();
    assert!(follow_up_prompt.contains("Original study plan for Databases (6 weeks, Intermediate level):\nreply #1"));
}

#[tokio::test]
async fn test_follow_up_failure_is_recorded() {
    let generator = RecordingGenerator {
        fail: true,
        ..Default::default()
    };
    let workflow = Workflow::new(offline_config(), Arc::new(generator));

    let session = workflow
        .run(
            Task::Article {
                topic: "Rust".to_string(),
                word_count: 250,
                style: "Academic".to_string(),
                temperature: 0.5,
            },
            true,
            Cursor::new("Shorter please\n"),
            &mut Vec::new(),
        )
        .await
        .unwrap()
        .unwrap();

    let messages = session.conversation().messages();
    assert!(messages[1].content.starts_with("Error in generating article: "));
    // 分析失败后仍视为已有回复，追问照常发出
    assert_eq!(messages[3].content, "Error generating response: rate limited");
    assert_eq!(messages[3].source.as_deref(), Some("Error occurred"));
}
