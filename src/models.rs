// ============================================================================
// File: src/models.rs
// API request and response models
// ============================================================================

use serde::{Deserialize, Serialize};

/// One piece of content in a Gemini conversation
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>, // "user" or "model"
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Request body for `models/{model}:generateContent`
#[derive(Debug, Serialize)]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
}

impl GenerateContentRequest {
    /// A single-turn user prompt
    pub fn from_prompt(prompt: &str) -> Self {
        Self {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                }],
            }],
        }
    }
}

/// Response from `generateContent`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub prompt_feedback: Option<PromptFeedback>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate, if it has any
    pub fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|part| part.text.as_deref())
            .collect();

        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<Content>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    pub block_reason: Option<String>,
}

/// Page of results from the `models` listing endpoint
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListModelsResponse {
    #[serde(default)]
    pub models: Vec<ModelInfo>,
    pub next_page_token: Option<String>,
}

/// A model available to the configured API key
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub supported_generation_methods: Vec<String>,
}

/// Response from the Custom Search JSON API
#[derive(Debug, Deserialize)]
pub struct CustomSearchResponse {
    #[serde(default)]
    pub items: Vec<CustomSearchItem>,
}

/// Raw search hit; the API omits fields freely
#[derive(Debug, Deserialize)]
pub struct CustomSearchItem {
    pub title: Option<String>,
    pub link: Option<String>,
    pub snippet: Option<String>,
}

/// Normalized search hit handed to the synthesis step
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct SearchResultItem {
    pub title: String,
    pub link: String,
    pub snippet: String,
}

impl From<CustomSearchItem> for SearchResultItem {
    fn from(item: CustomSearchItem) -> Self {
        Self {
            title: item.title.unwrap_or_default(),
            link: item.link.unwrap_or_default(),
            snippet: item.snippet.unwrap_or_default().replace('\n', " "),
        }
    }
}

/// The model's verdict on whether a question needs a web search
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct Decision {
    #[serde(default)]
    pub need_search: bool,
    #[serde(default)]
    pub query: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serializes_single_user_turn() {
        let body = serde_json::to_value(GenerateContentRequest::from_prompt("hi")).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"contents": [{"role": "user", "parts": [{"text": "hi"}]}]})
        );
    }

    #[test]
    fn test_response_text_joins_parts_of_first_candidate() {
        let response: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates": [
                {"content": {"role": "model", "parts": [{"text": "Hello, "}, {"text": "world"}]}, "finishReason": "STOP"},
                {"content": {"role": "model", "parts": [{"text": "ignored"}]}}
            ]}"#,
        )
        .unwrap();

        assert_eq!(response.text().as_deref(), Some("Hello, world"));
    }

    #[test]
    fn test_blocked_response_has_no_text() {
        let response: GenerateContentResponse =
            serde_json::from_str(r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#).unwrap();

        assert!(response.text().is_none());
        assert_eq!(
            response.prompt_feedback.and_then(|f| f.block_reason).as_deref(),
            Some("SAFETY")
        );
    }

    #[test]
    fn test_search_item_normalization() {
        let response: CustomSearchResponse = serde_json::from_str(
            r#"{"items": [
                {"title": "Paris", "link": "https://example.com/paris", "snippet": "line1\nline2"},
                {"title": "No snippet", "link": "https://example.com/none"},
                {}
            ]}"#,
        )
        .unwrap();

        let items: Vec<SearchResultItem> = response.items.into_iter().map(Into::into).collect();

        assert_eq!(items[0].snippet, "line1 line2");
        assert_eq!(items[1].title, "No snippet");
        assert_eq!(items[1].snippet, "");
        assert_eq!(items[2], SearchResultItem::default());
    }

    #[test]
    fn test_search_response_without_items() {
        let response: CustomSearchResponse =
            serde_json::from_str(r#"{"kind": "customsearch#search"}"#).unwrap();
        assert!(response.items.is_empty());
    }
}
