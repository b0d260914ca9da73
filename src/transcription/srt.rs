use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::timecode::millis_to_timecode;

/// One timed subtitle display unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubtitleCue {
    /// Sequential 1-based number
    pub index: u32,
    /// Start time in milliseconds
    pub start_ms: u64,
    /// End time in milliseconds
    pub end_ms: u64,
    /// Display text
    pub text: String,
}

impl fmt::Display for SubtitleCue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\n{} --> {}\n{}\n",
            self.index,
            millis_to_timecode(self.start_ms),
            millis_to_timecode(self.end_ms),
            self.text
        )
    }
}

/// SRT document assembled from segmented cues
#[derive(Debug, Clone, Default)]
pub struct SrtDocument {
    cues: Vec<SubtitleCue>,
}

impl SrtDocument {
    pub fn new() -> Self {
        Self { cues: Vec::new() }
    }

    pub fn from_cues(cues: Vec<SubtitleCue>) -> Self {
        Self { cues }
    }

    pub fn push(&mut self, cue: SubtitleCue) {
        self.cues.push(cue);
    }

    /// Render the document as SRT text: blank-line-separated 4-line records.
    pub fn render(&self) -> String {
        let mut content = String::new();

        for cue in &self.cues {
            content.push_str(&cue.to_string());
            content.push('\n');
        }

        content
    }

    /// Save the rendered document to a file
    pub async fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        tokio::fs::write(path.as_ref(), self.render()).await?;
        Ok(())
    }

    pub fn cues(&self) -> &[SubtitleCue] {
        &self.cues
    }

    pub fn len(&self) -> usize {
        self.cues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }

    /// Check cues for common timing and content issues
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        for cue in &self.cues {
            if cue.end_ms < cue.start_ms {
                issues.push(format!("Cue {}: end time precedes start time", cue.index));
            }
            if cue.text.trim().is_empty() {
                issues.push(format!("Cue {}: empty text", cue.index));
            }
        }

        for pair in self.cues.windows(2) {
            if pair[1].index <= pair[0].index {
                issues.push(format!(
                    "Cues {} and {}: indices are not strictly increasing",
                    pair[0].index, pair[1].index
                ));
            }
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cue(index: u32, start_ms: u64, end_ms: u64, text: &str) -> SubtitleCue {
        SubtitleCue {
            index,
            start_ms,
            end_ms,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_cue_display() {
        let output = cue(1, 10_000, 15_000, "First line").to_string();
        assert_eq!(output, "1\n00:00:10,000 --> 00:00:15,000\nFirst line\n");
    }

    #[test]
    fn test_document_rendering() {
        let doc = SrtDocument::from_cues(vec![
            cue(1, 0, 5_000, "First subtitle"),
            cue(2, 5_000, 10_000, "Second subtitle"),
        ]);

        let content = doc.render();
        assert_eq!(
            content,
            "1\n00:00:00,000 --> 00:00:05,000\nFirst subtitle\n\n\
             2\n00:00:05,000 --> 00:00:10,000\nSecond subtitle\n\n"
        );
    }

    #[test]
    fn test_validation_flags_bad_cues() {
        let doc = SrtDocument::from_cues(vec![
            cue(1, 10_000, 5_000, "Backwards"),
            cue(1, 15_000, 20_000, "  "),
        ]);

        let issues = doc.validate();
        assert!(issues.iter().any(|i| i.contains("precedes")));
        assert!(issues.iter().any(|i| i.contains("empty text")));
        assert!(issues.iter().any(|i| i.contains("strictly increasing")));
    }
}
