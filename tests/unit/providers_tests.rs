/*!
 * Tests for provider request shaping, response parsing, and the mock
 * completion used throughout the pipeline tests. No network access.
 */

use serde_json::json;

use mdxlate::providers::anthropic::{Anthropic, AnthropicRequest, AnthropicResponse};
use mdxlate::providers::mock::MockCompletion;
use mdxlate::providers::ollama::GenerationRequest;
use mdxlate::providers::openai::{OpenAI, OpenAIRequest, OpenAIResponse};
use mdxlate::translation::core::Completion;

#[test]
fn test_anthropicRequest_serialization_shouldIncludeSetFieldsOnly() {
    let request = AnthropicRequest::new("claude-3-haiku", 4096)
        .add_message("user", "translate this")
        .temperature(0.7);

    let value = serde_json::to_value(&request).unwrap();
    assert_eq!(value["model"], "claude-3-haiku");
    assert_eq!(value["max_tokens"], 4096);
    assert_eq!(value["messages"][0]["role"], "user");
    assert_eq!(value["messages"][0]["content"], "translate this");
    assert_eq!(value["temperature"], 0.7f32);
    assert!(value.get("top_p").is_none());
    assert!(value.get("system").is_none());
}

#[test]
fn test_anthropicResponse_extractText_shouldConcatenateTextBlocks() {
    let response: AnthropicResponse = serde_json::from_value(json!({
        "content": [
            {"type": "text", "text": "Hello "},
            {"type": "tool_use", "text": "ignored"},
            {"type": "text", "text": "world"}
        ],
        "usage": {"input_tokens": 10, "output_tokens": 5}
    }))
    .unwrap();

    assert_eq!(Anthropic::extract_text(&response), "Hello world");
    assert_eq!(response.usage.input_tokens, 10);
}

#[test]
fn test_openAIRequest_serialization_shouldIncludeMessages() {
    let request = OpenAIRequest::new("gpt-4o-mini")
        .add_message("user", "hi")
        .top_p(0.95)
        .max_tokens(100);

    let value = serde_json::to_value(&request).unwrap();
    assert_eq!(value["model"], "gpt-4o-mini");
    assert_eq!(value["messages"][0]["content"], "hi");
    assert_eq!(value["top_p"], 0.95f32);
    assert_eq!(value["max_tokens"], 100);
    assert!(value.get("temperature").is_none());
}

#[test]
fn test_openAIResponse_extractText_shouldUseFirstChoice() {
    let response: OpenAIResponse = serde_json::from_value(json!({
        "choices": [
            {"message": {"role": "assistant", "content": "bonjour"}}
        ],
        "usage": {"prompt_tokens": 12, "completion_tokens": 3}
    }))
    .unwrap();

    assert_eq!(OpenAI::extract_text(&response), "bonjour");
    assert_eq!(response.usage.unwrap().completion_tokens, 3);
}

#[test]
fn test_openAIResponse_withoutUsage_shouldParse() {
    let response: OpenAIResponse = serde_json::from_value(json!({
        "choices": [
            {"message": {"role": "assistant", "content": "ok"}}
        ]
    }))
    .unwrap();

    assert!(response.usage.is_none());
}

#[test]
fn test_generationRequest_serialization_shouldDisableStreaming() {
    let request = GenerationRequest::new("llama3.2", "translate me")
        .temperature(1.0)
        .top_p(0.95);

    let value = serde_json::to_value(&request).unwrap();
    assert_eq!(value["model"], "llama3.2");
    assert_eq!(value["prompt"], "translate me");
    assert_eq!(value["stream"], false);
    assert_eq!(value["options"]["temperature"], 1.0f32);
    assert_eq!(value["options"]["top_p"], 0.95f32);
}

#[tokio::test]
async fn test_mockCompletion_working_shouldBeDeterministic() {
    let mock = MockCompletion::working();

    let first = mock.complete("same prompt").await.unwrap();
    let second = mock.complete("same prompt").await.unwrap();
    let other = mock.complete("different prompt").await.unwrap();

    assert_eq!(first, second);
    assert_ne!(first, other);
    assert_eq!(mock.calls(), 3);
}

#[tokio::test]
async fn test_mockCompletion_failAt_shouldFailOnlyOnThatCall() {
    let mock = MockCompletion::fail_at(1);

    assert!(mock.complete("zero").await.is_ok());
    assert!(mock.complete("one").await.is_err());
    assert!(mock.complete("two").await.is_ok());
}

#[tokio::test]
async fn test_mockCompletion_shouldRecordPrompts() {
    let mock = MockCompletion::working();
    mock.complete("alpha").await.unwrap();
    mock.complete("beta").await.unwrap();

    assert_eq!(mock.prompts(), vec!["alpha", "beta"]);
}
