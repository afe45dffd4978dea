//! Web-answer lookups through the search model
//!
//! The search model is asked for a JSON object `{"content", "link"}`, usually
//! wrapped in a ```json fence. Lookups never fail: any error becomes the
//! `N/A` answer so callers can fan out without special-casing.

use serde::{Deserialize, Serialize};
use tracing::warn;
use url::Url;

use super::generator::TextGenerator;
use crate::constants::report::NOT_AVAILABLE;
use crate::types::{Result, ScreenerError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebAnswer {
    pub content: String,
    #[serde(default = "not_available")]
    pub link: String,
}

fn not_available() -> String {
    NOT_AVAILABLE.to_string()
}

impl WebAnswer {
    pub fn not_available() -> Self {
        Self {
            content: not_available(),
            link: not_available(),
        }
    }

    pub fn is_available(&self) -> bool {
        let content = self.content.trim();
        !content.is_empty() && content != NOT_AVAILABLE
    }
}

// =============================================================================
// Prompts
// =============================================================================

const ANSWER_FORMAT: &str = r#"Respond with this JSON and nothing else:
```json
{
  "content": "<answer, or N/A>",
  "link": "<page the answer came from, or N/A>"
}
```"#;

/// Lookup restricted to pages of one website
pub fn site_prompt(topic: &str, site: &str) -> String {
    format!(
        "Search only pages under the '{site}' domain for the topic: '{topic}'.\n\
         Give a clear, direct answer. If the website does not cover the topic, answer N/A.\n\
         {ANSWER_FORMAT}"
    )
}

/// Open web lookup
pub fn web_prompt(topic: &str) -> String {
    format!(
        "Search the web for the topic: '{topic}'.\n\
         Give a clear, direct answer. If nothing reliable is found, answer N/A.\n\
         {ANSWER_FORMAT}"
    )
}

/// Run one lookup with the search model, falling back to `N/A` on any failure
pub async fn lookup(generator: &TextGenerator, prompt: &str) -> WebAnswer {
    let parsed = match generator.search(prompt).await {
        Ok(text) => parse_web_answer(&text),
        Err(e) => Err(e),
    };
    parsed.unwrap_or_else(|e| {
        warn!(error = %e, "Web lookup failed, using N/A");
        WebAnswer::not_available()
    })
}

// =============================================================================
// Parsing
// =============================================================================

/// Parse a (possibly fenced) JSON answer and clean its link
pub fn parse_web_answer(text: &str) -> Result<WebAnswer> {
    let body = fenced_body(text);
    let mut answer: WebAnswer = match serde_json::from_str(body) {
        Ok(answer) => answer,
        Err(first) => {
            let object = body
                .find('{')
                .zip(body.rfind('}'))
                .filter(|(start, end)| start < end)
                .map(|(start, end)| &body[start..=end])
                .ok_or(ScreenerError::Json(first))?;
            serde_json::from_str(object)?
        }
    };
    answer.link = strip_tracking_params(answer.link.trim());
    Ok(answer)
}

/// Contents of the first ``` fence (closing fence optional), or the whole text
fn fenced_body(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(start) = trimmed.find("```") else {
        return trimmed;
    };
    let after = &trimmed[start + 3..];
    let after = after.strip_prefix("json").unwrap_or(after);
    match after.find("```") {
        Some(end) => after[..end].trim(),
        None => after.trim(),
    }
}

/// Drop `utm_*` query parameters; non-URLs (such as `N/A`) pass through unchanged
pub fn strip_tracking_params(link: &str) -> String {
    let Ok(mut url) = Url::parse(link) else {
        return link.to_string();
    };
    if url.query().is_none() {
        return url.to_string();
    }

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !key.starts_with("utm_"))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    if kept.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(kept);
    }
    url.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::testing::{FakeProvider, completion, fake_generator};
    use std::sync::Arc;

    #[test]
    fn test_parse_fenced_answer() {
        let text = "```json\n{\"content\": \"Acme Robotics\", \"link\": \"https://acme.co/about?utm_source=openai\"}\n```";
        let answer = parse_web_answer(text).unwrap();
        assert_eq!(answer.content, "Acme Robotics");
        assert_eq!(answer.link, "https://acme.co/about");
    }

    #[test]
    fn test_parse_bare_and_wrapped_json() {
        let bare = parse_web_answer(r#"{"content": "B2B SaaS", "link": "N/A"}"#).unwrap();
        assert_eq!(bare.content, "B2B SaaS");
        assert_eq!(bare.link, "N/A");

        let chatty = parse_web_answer(
            "Here is what I found: {\"content\": \"Robots\"} Hope that helps.",
        )
        .unwrap();
        assert_eq!(chatty.content, "Robots");
        assert_eq!(chatty.link, "N/A");
    }

    #[test]
    fn test_parse_unclosed_fence() {
        let answer = parse_web_answer("```json\n{\"content\": \"x\", \"link\": \"N/A\"}").unwrap();
        assert_eq!(answer.content, "x");
    }

    #[test]
    fn test_parse_garbage_fails() {
        assert!(parse_web_answer("no json here").is_err());
    }

    #[test]
    fn test_strip_tracking_keeps_other_params() {
        assert_eq!(
            strip_tracking_params("https://acme.co/team?id=7&utm_medium=x&utm_source=openai"),
            "https://acme.co/team?id=7"
        );
        assert_eq!(strip_tracking_params("N/A"), "N/A");
        assert_eq!(
            strip_tracking_params("https://acme.co/pricing"),
            "https://acme.co/pricing"
        );
    }

    #[test]
    fn test_availability() {
        assert!(!WebAnswer::not_available().is_available());
        let answer = WebAnswer {
            content: "Industrial automation".to_string(),
            link: "N/A".to_string(),
        };
        assert!(answer.is_available());
    }

    #[tokio::test]
    async fn test_lookup_falls_back_on_bad_output() {
        let provider = Arc::new(FakeProvider::new(|_, _| Ok(completion("I could not search."))));
        let generator = fake_generator(provider);
        let answer = lookup(&generator, &site_prompt("team", "acme.co")).await;
        assert_eq!(answer, WebAnswer::not_available());
    }

    #[test]
    fn test_prompts_name_topic_and_site() {
        let prompt = site_prompt("What is the name of the company?", "acme.co");
        assert!(prompt.contains("'acme.co'"));
        assert!(prompt.contains("What is the name of the company?"));
        assert!(web_prompt("TAM of robotics").contains("TAM of robotics"));
    }
}
