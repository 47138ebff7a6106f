//! Request and response bodies for page generation.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Body of `POST /generate`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerationRequest {
    /// Description of the page to build. `null` is treated as missing.
    #[serde(default)]
    pub prompt: Option<String>,

    /// Gemini model name; the configured default applies when absent.
    #[serde(default)]
    pub model: Option<String>,

    /// Extra arguments forwarded to the provider.
    #[serde(default)]
    pub parameters: Option<Map<String, Value>>,
}

impl GenerationRequest {
    /// The prompt, if present and non-empty.
    pub fn prompt(&self) -> Option<&str> {
        self.prompt.as_deref().filter(|p| !p.is_empty())
    }
}

/// Markup, style and script split out of one generation result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtractedFragments {
    pub html: String,
    pub css: String,
    pub js: String,
}

/// Successful response of `POST /generate`.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationResponse {
    /// HTML-escaped composed document.
    pub complete_html: String,
    #[serde(flatten)]
    pub fragments: ExtractedFragments,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_and_null_prompt_are_missing() {
        let empty: GenerationRequest = serde_json::from_value(json!({ "prompt": "" })).unwrap();
        let null: GenerationRequest = serde_json::from_value(json!({ "prompt": null })).unwrap();
        let absent: GenerationRequest = serde_json::from_value(json!({})).unwrap();

        assert_eq!(empty.prompt(), None);
        assert_eq!(null.prompt(), None);
        assert_eq!(absent.prompt(), None);
    }

    #[test]
    fn test_whitespace_prompt_is_kept() {
        let req: GenerationRequest = serde_json::from_value(json!({ "prompt": " " })).unwrap();
        assert_eq!(req.prompt(), Some(" "));
    }

    #[test]
    fn test_null_parameters_deserialize_as_none() {
        let req: GenerationRequest =
            serde_json::from_value(json!({ "prompt": "x", "parameters": null })).unwrap();
        assert!(req.parameters.is_none());
    }

    #[test]
    fn test_response_flattens_fragments() {
        let response = GenerationResponse {
            complete_html: "&lt;p&gt;".to_string(),
            fragments: ExtractedFragments {
                html: "<p>".to_string(),
                css: "p{}".to_string(),
                js: String::new(),
            },
        };

        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({ "complete_html": "&lt;p&gt;", "html": "<p>", "css": "p{}", "js": "" })
        );
    }
}
