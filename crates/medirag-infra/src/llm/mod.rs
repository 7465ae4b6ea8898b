//! LLM provider implementations.
//!
//! Contains the OpenAI-compatible implementation of the [`LlmProvider`]
//! trait defined in `medirag-core`, and the factory ([`create_provider`])
//! that builds it from the `[llm]` config section when an API key is set.
//!
//! [`LlmProvider`]: medirag_core::llm::provider::LlmProvider

pub mod openai_compat;

use secrecy::SecretString;

use medirag_core::llm::box_provider::BoxLlmProvider;
use medirag_types::config::LlmConfig;

use self::openai_compat::OpenAiCompatibleProvider;
use self::openai_compat::config::OpenAiCompatConfig;

/// Read the API key from the environment variable named in `api_key_env`.
pub fn resolve_api_key(config: &LlmConfig) -> Option<SecretString> {
    non_empty_key(std::env::var(&config.api_key_env).ok())
}

fn non_empty_key(value: Option<String>) -> Option<SecretString> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(SecretString::from)
}

/// Create a [`BoxLlmProvider`] when a key is available.
///
/// Returns `None` without a key; replies then come from templates.
pub fn create_provider(config: &LlmConfig, api_key: Option<SecretString>) -> Option<BoxLlmProvider> {
    let Some(api_key) = api_key else {
        tracing::info!(
            env = %config.api_key_env,
            "No LLM API key configured, using template responses"
        );
        return None;
    };

    let provider = OpenAiCompatibleProvider::new(OpenAiCompatConfig::from_llm_config(config, api_key));
    Some(BoxLlmProvider::new(provider))
}

#[cfg(test)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    #[test]
    fn test_create_provider_without_key() {
        assert!(create_provider(&LlmConfig::default(), None).is_none());
    }

    #[test]
    fn test_create_provider_with_key() {
        let key = SecretString::from("sk-test".to_string());
        let provider = create_provider(&LlmConfig::default(), Some(key)).unwrap();
        assert_eq!(provider.name(), "openai");
    }

    #[test]
    fn test_create_provider_with_base_url() {
        let config = LlmConfig {
            base_url: Some("https://openrouter.ai/api/v1".to_string()),
            ..LlmConfig::default()
        };
        let key = SecretString::from("or-test".to_string());
        let provider = create_provider(&config, Some(key)).unwrap();
        assert_eq!(provider.name(), "openrouter");
    }

    #[test]
    fn test_non_empty_key() {
        assert!(non_empty_key(None).is_none());
        assert!(non_empty_key(Some("   ".to_string())).is_none());
        let key = non_empty_key(Some(" sk-abc \n".to_string())).unwrap();
        assert_eq!(key.expose_secret(), "sk-abc");
    }

    #[test]
    fn test_resolve_api_key_unset_variable() {
        let config = LlmConfig {
            api_key_env: "MEDIRAG_TEST_KEY_THAT_IS_NEVER_SET".to_string(),
            ..LlmConfig::default()
        };
        assert!(resolve_api_key(&config).is_none());
    }
}
