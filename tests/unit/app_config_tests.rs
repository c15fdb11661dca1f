/*!
 * Tests for application configuration loading, defaults and validation.
 */

use std::str::FromStr;

use mdxlate::app_config::{Config, ProviderConfig, TranslationProvider};
use mdxlate::errors::ConfigError;

#[test]
fn test_config_default_shouldUseOllamaAndStandardLimits() {
    let config = Config::default();

    assert_eq!(config.translation.provider, TranslationProvider::Ollama);
    assert_eq!(config.token_limit, 1000);
    assert_eq!(config.source_language, "en");
    assert_eq!(config.target_language, "zh");
    assert_eq!(config.translation.available_providers.len(), 3);
}

#[test]
fn test_config_default_shouldValidate() {
    let config = Config::default();
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_validate_withZeroTokenLimit_shouldFail() {
    let mut config = Config::default();
    config.token_limit = 0;

    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidTokenLimit(0))
    ));
}

#[test]
fn test_config_validate_withInvalidLanguage_shouldFail() {
    let mut config = Config::default();
    config.source_language = "not-a-language".to_string();

    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidLanguage(_))
    ));
}

#[test]
fn test_config_validate_withOpenAIAndNoKey_shouldFail() {
    let mut config = Config::default();
    config.translation.provider = TranslationProvider::OpenAI;

    assert!(matches!(
        config.validate(),
        Err(ConfigError::MissingApiKey { .. })
    ));
}

#[test]
fn test_config_validate_withAnthropicAndKey_shouldSucceed() {
    let mut config = Config::default();
    config.translation.provider = TranslationProvider::Anthropic;
    for provider in &mut config.translation.available_providers {
        if provider.provider_type == "anthropic" {
            provider.api_key = "sk-test".to_string();
        }
    }

    assert!(config.validate().is_ok());
}

#[test]
fn test_translationConfig_getModel_shouldFallBackPerProvider() {
    let mut config = Config::default();
    config.translation.available_providers.clear();

    config.translation.provider = TranslationProvider::Ollama;
    assert_eq!(config.translation.get_model(), "llama3.2");

    config.translation.provider = TranslationProvider::OpenAI;
    assert_eq!(config.translation.get_model(), "gpt-4o-mini");
}

#[test]
fn test_translationConfig_getModel_shouldPreferConfiguredModel() {
    let mut config = Config::default();
    config.translation.provider = TranslationProvider::Anthropic;
    for provider in &mut config.translation.available_providers {
        if provider.provider_type == "anthropic" {
            provider.model = "claude-3-5-sonnet".to_string();
        }
    }

    assert_eq!(config.translation.get_model(), "claude-3-5-sonnet");
}

#[test]
fn test_translationProvider_fromStr_shouldParseKnownProviders() {
    assert_eq!(
        TranslationProvider::from_str("ollama").unwrap(),
        TranslationProvider::Ollama
    );
    assert_eq!(
        TranslationProvider::from_str("OpenAI").unwrap(),
        TranslationProvider::OpenAI
    );
    assert!(TranslationProvider::from_str("gemini").is_err());
}

#[test]
fn test_providerConfig_new_shouldFillProviderDefaults() {
    let ollama = ProviderConfig::new(TranslationProvider::Ollama);
    assert_eq!(ollama.endpoint, "http://localhost:11434");
    assert!(ollama.rate_limit.is_none());

    let anthropic = ProviderConfig::new(TranslationProvider::Anthropic);
    assert_eq!(anthropic.endpoint, "https://api.anthropic.com");
    assert_eq!(anthropic.rate_limit, Some(45));
}

#[test]
fn test_config_serde_shouldRoundTrip() {
    let config = Config::default();
    let json = serde_json::to_string_pretty(&config).unwrap();
    let parsed: Config = serde_json::from_str(&json).unwrap();

    assert_eq!(parsed.token_limit, config.token_limit);
    assert_eq!(parsed.translation.provider, config.translation.provider);
    assert_eq!(parsed.source_language, config.source_language);
}

#[test]
fn test_config_serde_withMinimalJson_shouldApplyDefaults() {
    let json = r#"{
        "source_language": "en",
        "target_language": "fr",
        "translation": {}
    }"#;

    let config: Config = serde_json::from_str(json).unwrap();
    assert_eq!(config.token_limit, 1000);
    assert_eq!(config.country, "China");
    assert_eq!(config.translation.provider, TranslationProvider::Ollama);
}
