#[cfg(test)]
mod tests {
    use crate::config::{
        Config, FeatureConfig, LLMConfig, LLMProvider, SearchConfig, SearchEngine,
    };
    use std::path::PathBuf;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();

        assert!(!config.verbose);
        assert!(config.search.enabled);
        assert_eq!(config.search.engine, SearchEngine::SerpApi);
        assert_eq!(config.search.results_count, 5);
    }

    #[test]
    fn test_llm_provider_default() {
        let provider = LLMProvider::default();
        assert_eq!(provider, LLMProvider::Groq);
    }

    #[test]
    fn test_llm_provider_from_str() {
        assert_eq!("groq".parse::<LLMProvider>().unwrap(), LLMProvider::Groq);
        assert_eq!(
            "OpenAI".parse::<LLMProvider>().unwrap(),
            LLMProvider::OpenAI
        );
        assert_eq!(
            "deepseek".parse::<LLMProvider>().unwrap(),
            LLMProvider::DeepSeek
        );
        assert_eq!(
            "anthropic".parse::<LLMProvider>().unwrap(),
            LLMProvider::Anthropic
        );
        assert_eq!(
            "ollama".parse::<LLMProvider>().unwrap(),
            LLMProvider::Ollama
        );

        assert!("invalid".parse::<LLMProvider>().is_err());
    }

    #[test]
    fn test_llm_provider_display() {
        assert_eq!(LLMProvider::Groq.to_string(), "groq");
        assert_eq!(LLMProvider::OpenAI.to_string(), "openai");
        assert_eq!(LLMProvider::DeepSeek.to_string(), "deepseek");
        assert_eq!(LLMProvider::Anthropic.to_string(), "anthropic");
        assert_eq!(LLMProvider::Ollama.to_string(), "ollama");
    }

    #[test]
    fn test_search_engine_round_trip_names() {
        assert_eq!(
            "tavily".parse::<SearchEngine>().unwrap(),
            SearchEngine::Tavily
        );
        assert_eq!(
            "serpapi".parse::<SearchEngine>().unwrap(),
            SearchEngine::SerpApi
        );
        assert_eq!(SearchEngine::Tavily.to_string(), "tavily");
        assert_eq!(SearchEngine::SerpApi.to_string(), "serpapi");

        let err = "bing".parse::<SearchEngine>().unwrap_err();
        assert!(err.contains("bing"));
    }

    #[test]
    fn test_search_engine_names_are_case_sensitive() {
        let err = "TAVILY".parse::<SearchEngine>().unwrap_err();
        assert_eq!(err, "Unsupported search engine: TAVILY");
        assert!("SerpAPI".parse::<SearchEngine>().is_err());
    }

    #[test]
    fn test_llm_config_default() {
        let config = LLMConfig::default();

        assert_eq!(config.provider, LLMProvider::Groq);
        // api_key may be empty if env var is not set
        assert_eq!(config.api_base_url, "https://api.groq.com/openai/v1");
        assert_eq!(config.model, "llama3-70b-8192");
        assert_eq!(config.temperature, 0.7);
        assert_eq!(config.timeout_seconds, 120);
    }

    #[test]
    fn test_feature_config_default_temperatures() {
        let config = FeatureConfig::default();

        assert_eq!(config.code_temperature, 0.2);
        assert_eq!(config.article_temperature, 0.5);
        assert_eq!(config.study_temperature, 0.3);
        assert_eq!(config.cv_temperature, 0.7);
    }

    #[test]
    fn test_search_credential_blank_is_missing() {
        let mut config = SearchConfig::default();
        config.engine = SearchEngine::Tavily;
        config.tavily_api_key = Some("   ".to_string());
        assert!(config.credential().is_none());

        config.tavily_api_key = Some("tvly-123".to_string());
        assert_eq!(config.credential(), Some("tvly-123"));

        config.engine = SearchEngine::SerpApi;
        config.serpapi_api_key = None;
        assert!(config.credential().is_none());
    }

    #[test]
    fn test_set_model_for_all() {
        let mut config = Config::default();
        config.set_model_for_all("gemma2-9b-it");

        assert_eq!(config.llm.model, "gemma2-9b-it");
        assert_eq!(config.features.cv_model, "gemma2-9b-it");
        assert_eq!(config.features.code_model, "gemma2-9b-it");
        assert_eq!(config.features.article_model, "gemma2-9b-it");
        assert_eq!(config.features.study_model, "gemma2-9b-it");
    }

    #[test]
    fn test_from_file_partial_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("assistant.toml");

        let content = r#"verbose = true

[llm]
provider = "openai"
model = "gpt-4o-mini"
api_key = "sk-test"

[search]
engine = "tavily"
tavily_api_key = "tvly-test"
results_count = 3

[features]
code_temperature = 0.1
"#;
        std::fs::write(&config_path, content).unwrap();

        let config = Config::from_file(&config_path).unwrap();

        assert!(config.verbose);
        assert_eq!(config.llm.provider, LLMProvider::OpenAI);
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert_eq!(config.llm.api_key, "sk-test");
        assert_eq!(config.llm.timeout_seconds, 120);
        assert_eq!(config.search.engine, SearchEngine::Tavily);
        assert_eq!(config.search.credential(), Some("tvly-test"));
        assert_eq!(config.search.results_count, 3);
        assert_eq!(config.features.code_temperature, 0.1);
        assert_eq!(config.features.study_temperature, 0.3);
    }

    #[test]
    fn test_request_timeout_follows_llm_timeout() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("assistant.toml");
        std::fs::write(&config_path, "[llm]\ntimeout_seconds = 30\n").unwrap();

        let config = Config::from_file(&config_path).unwrap();

        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(Config::default().request_timeout(), Duration::from_secs(120));
    }

    #[test]
    fn test_from_file_missing() {
        let result = Config::from_file(&PathBuf::from("/nonexistent/assistant.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_from_file_rejects_unknown_engine() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("assistant.toml");
        std::fs::write(&config_path, "[search]\nengine = \"bing\"\n").unwrap();

        assert!(Config::from_file(&config_path).is_err());
    }
}
