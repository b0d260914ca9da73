use super::{Sentence, Word};
use super::srt::SubtitleCue;

/// Punctuation that closes a subtitle chunk
const SPLIT_PUNCTUATION: &[&str] = &[
    "。", "，", "！", "？", "；", "：", "、", ".", ",", "!", "?", ";", ":",
];

/// A chunk is also closed once it spans this long, provided it already
/// buffers at least [`MIN_CHUNK_WORDS`] words.
const MAX_CHUNK_DURATION_MS: u64 = 3_000;
const MIN_CHUNK_WORDS: usize = 2;

/// Split word-timed sentences into short display cues.
///
/// Each sentence is chunked independently; cues never span sentence
/// boundaries. A chunk closes on splitting punctuation or on the duration
/// cap, and any trailing words are flushed at sentence end. The cue index
/// runs contiguously across all sentences.
pub fn segment_sentences(sentences: &[Sentence]) -> Vec<SubtitleCue> {
    let mut cues = Vec::new();
    let mut index: u32 = 1;

    for sentence in sentences {
        let words = &sentence.words;
        if words.is_empty() {
            continue;
        }

        let mut chunk: Vec<&Word> = Vec::new();
        let mut chunk_start = words[0].begin_ms;

        for word in words {
            chunk.push(word);

            let over_budget = word.end_ms.saturating_sub(chunk_start) >= MAX_CHUNK_DURATION_MS
                && chunk.len() >= MIN_CHUNK_WORDS;

            if SPLIT_PUNCTUATION.contains(&word.punctuation.as_str()) || over_budget {
                if let Some(cue) = flush_chunk(&chunk, chunk_start, &mut index) {
                    cues.push(cue);
                }
                chunk.clear();
                // The splitting word's end time anchors the next chunk, not
                // the following word's begin time.
                chunk_start = word.end_ms;
            }
        }

        if let Some(cue) = flush_chunk(&chunk, chunk_start, &mut index) {
            cues.push(cue);
        }
    }

    cues
}

/// Emit a cue for the buffered words, skipping chunks that trim to nothing.
fn flush_chunk(chunk: &[&Word], start_ms: u64, index: &mut u32) -> Option<SubtitleCue> {
    let last = chunk.last()?;
    let text: String = chunk
        .iter()
        .map(|w| format!("{}{}", w.text, w.punctuation))
        .collect();
    let text = text.trim().to_string();

    if text.is_empty() {
        return None;
    }

    let cue = SubtitleCue {
        index: *index,
        start_ms,
        end_ms: last.end_ms,
        text,
    };
    *index += 1;
    Some(cue)
}
