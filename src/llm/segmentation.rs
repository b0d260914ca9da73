use super::{create_llm, ChatMessage, LLMConfig, LLM};
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::{debug, info};

use crate::notes::Section;

/// Output style for generated notes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteStyle {
    Professional,
    Blog,
    Tutorial,
}

impl NoteStyle {
    fn describe(&self) -> &'static str {
        match self {
            NoteStyle::Professional => {
                "a rigorous technical-documentation style, concise and precise"
            }
            NoteStyle::Blog => "a relaxed blog style, with occasional analogies and examples",
            NoteStyle::Tutorial => {
                "a step-by-step tutorial style, explaining every concept in detail"
            }
        }
    }
}

impl FromStr for NoteStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "professional" => Ok(NoteStyle::Professional),
            "blog" => Ok(NoteStyle::Blog),
            "tutorial" => Ok(NoteStyle::Tutorial),
            other => Err(format!("unknown note style: {}", other)),
        }
    }
}

/// Subtitle analyzer that asks an LLM to carve titled, timestamped sections
pub struct SubtitleAnalyzer {
    llm: Box<dyn LLM>,
}

impl SubtitleAnalyzer {
    pub fn new(config: &LLMConfig) -> Result<Self> {
        Ok(Self { llm: create_llm(config)? })
    }

    /// Build an analyzer around an existing LLM handle
    pub fn with_llm(llm: Box<dyn LLM>) -> Self {
        Self { llm }
    }

    /// Segment subtitle text into ordered note sections.
    ///
    /// The model is told to answer with a bare JSON array, but responses
    /// wrapped in prose are tolerated: the first balanced array span is
    /// extracted and parsed strictly. Anything less than one well-formed,
    /// non-empty section list fails the call.
    pub async fn segment(&self, subtitle_text: &str, style: NoteStyle) -> Result<Vec<Section>> {
        let messages = vec![
            ChatMessage::system(system_prompt(style)),
            ChatMessage::user(format!(
                "Analyze the following subtitles and produce structured notes:\n\n{}",
                subtitle_text
            )),
        ];

        let response = self.llm.chat(messages).await?;
        debug!("segmentation response: {} chars (tokens: {:?})", response.content.len(), response.tokens_used);

        let json = extract_json_array(&response.content)
            .ok_or_else(|| anyhow!("LLM response contained no JSON array"))?;
        let sections: Vec<Section> = serde_json::from_str(json)
            .map_err(|e| anyhow!("LLM returned malformed section JSON: {}", e))?;

        if sections.is_empty() {
            return Err(anyhow!("LLM returned an empty section list"));
        }

        info!("🧩 LLM segmented subtitles into {} sections", sections.len());
        Ok(sections)
    }
}

/// System prompt steering the LLM toward densely illustrated section notes
fn system_prompt(style: NoteStyle) -> String {
    format!(
        r#"# Role
You are a meticulous video annotator and technical writer. Your goal is to turn video subtitles into an illustrated, near frame-by-frame walkthrough.

# Key requirement
The picture often changes after only a sentence or two. Capture every visual change point; never merge several distinct on-screen actions into one long paragraph. Insert screenshot placeholders generously.

# Rules
1. Screenshot placement:
   - Every action the speaker performs (click, drag, connect) gets a screenshot
   - Every visible change (parameter change, result comparison, close-up) gets a screenshot
   - If one sentence covers two actions, split it into two lines with two placeholders
2. Micro-step structure: short sentences or 2-3 line paragraphs, one operation per paragraph
3. Content cleanup: fix misheard technical terms, drop filler words, keep every technical parameter and key point from the original speech
4. Placeholder format: insert `[HH:MM:SS]` markers in the body where an image belongs; timestamps must come from the subtitles and stay in order

# Output style
{}

# Output format
Answer with nothing but a JSON array in exactly this shape:
[
  {{
    "timestamp": "00:01:23",
    "title": "Section title (5-15 words, punchy)",
    "content": "Section body (Markdown). Plain technical prose only; no meta words like 'screenshot' or 'frame'. Where an image belongs, insert only the timestamp marker [HH:MM:SS]; it will be replaced with the matching video frame."
  }}
]

# Notes
- The output must be a legal JSON array
- Timestamps use the HH:MM:SS format
- Every section needs the timestamp, title and content fields"#,
        style.describe()
    )
}

/// Find the first balanced top-level `[...]` span in free-form text.
///
/// Bracket characters inside JSON strings do not count toward balance.
fn extract_json_array(text: &str) -> Option<&str> {
    let start = text.find('[')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + i + c.len_utf8()]);
                }
            }
            _ => {}
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{LLMProvider, LLMResponse};
    use async_trait::async_trait;

    struct CannedLLM {
        content: String,
    }

    #[async_trait]
    impl LLM for CannedLLM {
        async fn chat(&self, _messages: Vec<ChatMessage>) -> Result<LLMResponse> {
            Ok(LLMResponse { content: self.content.clone(), tokens_used: None })
        }

        async fn is_available(&self) -> bool {
            true
        }

        fn provider_type(&self) -> LLMProvider {
            LLMProvider::DeepSeek
        }
    }

    fn analyzer(content: &str) -> SubtitleAnalyzer {
        SubtitleAnalyzer::with_llm(Box::new(CannedLLM { content: content.to_string() }))
    }

    #[test]
    fn test_extract_plain_array() {
        assert_eq!(extract_json_array(r#"[1, 2, 3]"#), Some("[1, 2, 3]"));
    }

    #[test]
    fn test_extract_array_wrapped_in_prose() {
        let text = "Sure! Here are your notes:\n```json\n[{\"a\": 1}]\n```\nHope that helps.";
        assert_eq!(extract_json_array(text), Some(r#"[{"a": 1}]"#));
    }

    #[test]
    fn test_extract_handles_brackets_inside_strings() {
        let text = r#"noise [{"content": "see [00:01:02] here"}] trailing [1]"#;
        assert_eq!(extract_json_array(text), Some(r#"[{"content": "see [00:01:02] here"}]"#));
    }

    #[test]
    fn test_extract_nested_arrays() {
        assert_eq!(extract_json_array("x [[1], [2]] y"), Some("[[1], [2]]"));
    }

    #[test]
    fn test_extract_none_without_array() {
        assert_eq!(extract_json_array("no brackets here"), None);
        assert_eq!(extract_json_array("unterminated [1, 2"), None);
    }

    #[tokio::test]
    async fn test_segment_parses_wrapped_response() {
        let analyzer = analyzer(
            "Here you go:\n[{\"timestamp\": \"00:00:10\", \"title\": \"Intro\", \"content\": \"Start [00:00:10]\"}]",
        );

        let sections = analyzer.segment("subtitles", NoteStyle::Professional).await.unwrap();
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].timestamp, "00:00:10");
        assert_eq!(sections[0].title, "Intro");
    }

    #[tokio::test]
    async fn test_segment_rejects_proseless_response() {
        let err = analyzer("I could not process that.")
            .segment("subtitles", NoteStyle::Blog)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("no JSON array"));
    }

    #[tokio::test]
    async fn test_segment_rejects_empty_array() {
        let err = analyzer("[]").segment("subtitles", NoteStyle::Blog).await.unwrap_err();
        assert!(err.to_string().contains("empty section list"));
    }

    #[tokio::test]
    async fn test_segment_rejects_malformed_sections() {
        let err = analyzer("[{\"timestamp\": 42}]")
            .segment("subtitles", NoteStyle::Tutorial)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("malformed"));
    }

    #[test]
    fn test_style_parsing() {
        assert_eq!("professional".parse::<NoteStyle>().unwrap(), NoteStyle::Professional);
        assert_eq!("Blog".parse::<NoteStyle>().unwrap(), NoteStyle::Blog);
        assert!("casual".parse::<NoteStyle>().is_err());
    }
}
