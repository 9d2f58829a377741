//! Small text helpers shared by grading and lesson generation.

/// Whitespace-token word count, the measure used for chapter validation.
pub fn word_count(text: &str) -> u32 {
    text.split_whitespace().count() as u32
}

/// Splits on blank lines; surrounding whitespace is trimmed, empties dropped.
pub fn split_paragraphs(text: &str) -> Vec<String> {
    text.split("\n\n")
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect()
}

/// Naive sentence splitter; good enough for question extraction over
/// textbook prose.
pub fn split_sentences(text: &str) -> Vec<String> {
    text.split(['.', '!', '?'])
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Canonical form for answer comparison: trimmed, lowercased.
pub fn normalize_answer(answer: &str) -> String {
    answer.trim().to_lowercase()
}
