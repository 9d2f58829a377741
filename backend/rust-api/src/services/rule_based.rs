//! Deterministic lesson extraction from raw chapter text. No network, no
//! randomness: the same chapter always yields the same draft, which is what
//! makes the external-AI fallback safe.

use std::collections::HashMap;

use lazy_static::lazy_static;
use regex::Regex;

use crate::config::GenerationConfig;
use crate::models::lesson::{
    GeneratedQuestion, KeyConcept, LessonDifficulty, LessonDraft, LessonSection,
    QuestionDifficulty, SectionType,
};
use crate::models::quiz::QuestionType;
use crate::utils::text::{split_paragraphs, split_sentences, word_count};

lazy_static! {
    // Scan/PDF artifacts that survive text extraction.
    static ref PAGE_BREAK: Regex = Regex::new(r"(?m)^\s*-{3,}\s*Page\s+\d+\s*-{3,}\s*$").unwrap();
    static ref LONE_PAGE_NUMBER: Regex = Regex::new(r"(?m)^\s*\d{1,4}\s*$").unwrap();
    static ref HYPHEN_JOIN: Regex = Regex::new(r"(\w)-\n(\w)").unwrap();
    static ref HEADER_FOOTER: Regex =
        Regex::new(r"(?mi)^\s*(chapter\s+\d+\s*\|.*|©.*|all rights reserved.*)$").unwrap();
    static ref EXCESS_BLANK_LINES: Regex = Regex::new(r"\n{3,}").unwrap();

    static ref MARKDOWN_HEADING: Regex = Regex::new(r"(?m)^#{1,3}\s+(.{3,120})$").unwrap();

    static ref OBJECTIVE_MARKER: Regex = Regex::new(
        r"(?i)(?:students? (?:will|should) (?:be able to )?|learners? (?:will|should) |objective:?\s*|by the end of this (?:chapter|lesson),?\s*(?:you|students?) (?:will|should) )([^.\n]{10,200})"
    )
    .unwrap();

    // "X is ...", "X refers to ...", "X is defined as ..." style definitions.
    static ref DEFINITION: Regex = Regex::new(
        r"(?m)^\s*([A-Z][A-Za-z ]{2,40}?)\s+(?:is defined as|refers to|is called|means|is)\s+([^.\n]{10,200})\."
    )
    .unwrap();

    static ref CAPITALIZED_TERM: Regex = Regex::new(r"\b([A-Z][a-z]{3,}(?:\s[A-Z][a-z]{3,})?)\b").unwrap();

    static ref EXAMPLE_MARKER: Regex =
        Regex::new(r"(?i)\b(for example|for instance|example \d|consider the)\b").unwrap();
    static ref PRACTICE_MARKER: Regex =
        Regex::new(r"(?i)\b(exercise|practice|try (?:this|it) yourself|solve the)\b").unwrap();
}

/// Strips extraction artifacts before any analysis.
pub fn preprocess(raw: &str) -> String {
    let text = HYPHEN_JOIN.replace_all(raw, "$1$2");
    let text = PAGE_BREAK.replace_all(&text, "");
    let text = LONE_PAGE_NUMBER.replace_all(&text, "");
    let text = HEADER_FOOTER.replace_all(&text, "");
    let text = EXCESS_BLANK_LINES.replace_all(&text, "\n\n");
    text.trim().to_string()
}

/// First markdown heading, or the first short title-case line, or the
/// fallback title supplied by the caller.
pub fn extract_title(content: &str, fallback: &str) -> String {
    if let Some(captures) = MARKDOWN_HEADING.captures(content) {
        return captures[1].trim().to_string();
    }
    for line in content.lines().take(10) {
        let line = line.trim();
        if line.len() >= 5
            && line.len() <= 80
            && !line.ends_with('.')
            && line.chars().next().is_some_and(|c| c.is_uppercase())
            && word_count(line) <= 10
        {
            return line.to_string();
        }
    }
    fallback.to_string()
}

/// Pulls explicit objective statements out of the text, capped at five. With
/// none found, synthesizes generic ones from the title so a draft never
/// ships without objectives.
pub fn extract_objectives(content: &str, title: &str) -> Vec<String> {
    let mut objectives: Vec<String> = OBJECTIVE_MARKER
        .captures_iter(content)
        .map(|c| {
            let mut s = c[1].trim().to_string();
            if !s.ends_with('.') {
                s.push('.');
            }
            let mut chars = s.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => s,
            }
        })
        .filter(|s| s.len() > 20 && s.len() < 200)
        .collect();
    // Markers can repeat anywhere in the chapter, not just back to back.
    let mut seen: Vec<String> = Vec::new();
    objectives.retain(|s| {
        let key = s.to_lowercase();
        if seen.contains(&key) {
            false
        } else {
            seen.push(key);
            true
        }
    });
    objectives.truncate(5);

    if objectives.is_empty() {
        objectives = vec![
            format!("Understand the main ideas of {}.", title),
            format!("Explain the key concepts covered in {}.", title),
            format!("Apply what you learned about {} to new problems.", title),
        ];
    }
    objectives
}

/// Key terms: explicit definitions first, then frequent capitalized terms
/// as bare entries. Capped at eight.
pub fn extract_key_concepts(content: &str, cap: usize) -> Vec<KeyConcept> {
    let mut concepts: Vec<KeyConcept> = Vec::new();
    let mut seen: Vec<String> = Vec::new();

    for captures in DEFINITION.captures_iter(content) {
        let term = captures[1].trim().to_string();
        let key = term.to_lowercase();
        if seen.contains(&key) {
            continue;
        }
        seen.push(key);
        concepts.push(KeyConcept {
            term,
            definition: format!("{}.", captures[2].trim()),
        });
        if concepts.len() >= cap {
            return concepts;
        }
    }

    // Frequency-ranked capitalized terms fill the remainder.
    let mut frequency: HashMap<String, usize> = HashMap::new();
    for captures in CAPITALIZED_TERM.captures_iter(content) {
        *frequency.entry(captures[1].to_string()).or_insert(0) += 1;
    }
    let mut ranked: Vec<(String, usize)> = frequency
        .into_iter()
        .filter(|(term, count)| *count >= 3 && !seen.contains(&term.to_lowercase()))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

    for (term, _) in ranked {
        if concepts.len() >= cap {
            break;
        }
        seen.push(term.to_lowercase());
        concepts.push(KeyConcept {
            term: term.clone(),
            definition: format!("An important term in this lesson: {}.", term),
        });
    }
    concepts
}

/// Chunks the body into ordered sections: an introduction, content blocks
/// flushed every few paragraphs, example/practice blocks where the text
/// signals them, and a closing summary.
pub fn build_sections(content: &str, title: &str, cfg: &GenerationConfig) -> Vec<LessonSection> {
    let paragraphs = split_paragraphs(content);
    let mut sections = Vec::new();
    let mut order = 0;

    let intro_text = paragraphs
        .first()
        .cloned()
        .unwrap_or_else(|| format!("This lesson covers {}.", title));
    sections.push(LessonSection {
        section_type: SectionType::Introduction,
        title: "Introduction".to_string(),
        content: intro_text,
        order,
    });
    order += 1;

    let body = if paragraphs.len() > 1 {
        &paragraphs[1..]
    } else {
        &[][..]
    };

    let mut buffer: Vec<String> = Vec::new();
    let mut buffer_len = 0usize;
    let mut content_sections = 0usize;

    let flush =
        |buffer: &mut Vec<String>, order: &mut i32, sections: &mut Vec<LessonSection>, n: usize| {
            if buffer.is_empty() {
                return;
            }
            let text = buffer.join("\n\n");
            let (section_type, section_title) = if EXAMPLE_MARKER.is_match(&text) {
                (SectionType::Example, "Worked Example".to_string())
            } else if PRACTICE_MARKER.is_match(&text) {
                (SectionType::Practice, "Practice".to_string())
            } else {
                (SectionType::Explanation, format!("Part {}", n + 1))
            };
            sections.push(LessonSection {
                section_type,
                title: section_title,
                content: text,
                order: *order,
            });
            *order += 1;
            buffer.clear();
        };

    for paragraph in body {
        if content_sections >= cfg.max_sections {
            break;
        }
        buffer_len += paragraph.len();
        buffer.push(paragraph.clone());
        if buffer.len() >= 3 || buffer_len > 1000 {
            flush(&mut buffer, &mut order, &mut sections, content_sections);
            content_sections += 1;
            buffer_len = 0;
        }
    }
    if content_sections < cfg.max_sections {
        flush(&mut buffer, &mut order, &mut sections, content_sections);
    }

    sections.push(LessonSection {
        section_type: SectionType::Summary,
        title: "Summary".to_string(),
        content: format!(
            "In this lesson you studied {}. Review the key concepts and try the questions to check your understanding.",
            title
        ),
        order,
    });

    sections
}

/// Builds quiz questions from concepts, factual sentences and objectives.
/// Pads with a generic question up to the minimum, caps at the maximum.
pub fn build_questions(
    content: &str,
    title: &str,
    concepts: &[KeyConcept],
    objectives: &[String],
    cfg: &GenerationConfig,
) -> Vec<GeneratedQuestion> {
    let mut questions = Vec::new();
    let mut order = 0;

    for concept in concepts.iter().take(4) {
        questions.push(GeneratedQuestion {
            question_text: format!("What does the term \"{}\" mean?", concept.term),
            question_type: QuestionType::MultipleChoice,
            options: vec![
                concept.definition.clone(),
                "A term that does not appear in this lesson.".to_string(),
                "A unit of measurement.".to_string(),
                "None of the above.".to_string(),
            ],
            correct_answer: concept.definition.clone(),
            explanation: format!("{} — {}", concept.term, concept.definition),
            difficulty: QuestionDifficulty::Easy,
            order,
        });
        order += 1;
    }

    // Declarative sentences become true/false checks.
    for sentence in split_sentences(content) {
        if questions.len() >= cfg.max_questions {
            break;
        }
        let words = word_count(&sentence);
        if (8..=25).contains(&words)
            && sentence.contains(" is ")
            && !sentence.contains('?')
        {
            questions.push(GeneratedQuestion {
                question_text: format!("True or false: {}.", sentence),
                question_type: QuestionType::TrueFalse,
                options: vec!["true".to_string(), "false".to_string()],
                correct_answer: "true".to_string(),
                explanation: "This statement appears in the lesson text.".to_string(),
                difficulty: QuestionDifficulty::Medium,
                order,
            });
            order += 1;
        }
    }

    for objective in objectives {
        if questions.len() >= cfg.max_questions {
            break;
        }
        questions.push(GeneratedQuestion {
            question_text: format!(
                "Which learning objective does this lesson address: \"{}\"?",
                objective.trim_end_matches('.')
            ),
            question_type: QuestionType::TrueFalse,
            options: vec!["true".to_string(), "false".to_string()],
            correct_answer: "true".to_string(),
            explanation: "This is one of the stated objectives.".to_string(),
            difficulty: QuestionDifficulty::Easy,
            order,
        });
        order += 1;
    }

    while questions.len() < cfg.min_questions {
        questions.push(GeneratedQuestion {
            question_text: format!("Is this lesson mainly about {}?", title),
            question_type: QuestionType::TrueFalse,
            options: vec!["true".to_string(), "false".to_string()],
            correct_answer: "true".to_string(),
            explanation: format!("The lesson covers {}.", title),
            difficulty: QuestionDifficulty::Easy,
            order,
        });
        order += 1;
    }

    questions.truncate(cfg.max_questions);
    questions
}

/// Reading time from word count at a grade-banded pace, clamped to a
/// classroom-sized 15..=60 minutes.
pub fn estimate_duration(words: u32, grade_level: i32) -> u32 {
    let wpm = if grade_level <= 3 {
        100
    } else if grade_level <= 6 {
        150
    } else {
        200
    };
    // Reading plus roughly half again for exercises.
    let minutes = (words as f64 / wpm as f64 * 1.5).ceil() as u32;
    minutes.clamp(15, 60)
}

pub fn difficulty_for_grade(grade_level: i32) -> LessonDifficulty {
    if grade_level <= 3 {
        LessonDifficulty::Beginner
    } else if grade_level <= 6 {
        LessonDifficulty::Intermediate
    } else {
        LessonDifficulty::Advanced
    }
}

/// Full extraction pipeline over one chapter.
pub fn build_draft(
    chapter_title: &str,
    grade_level: i32,
    raw_content: &str,
    cfg: &GenerationConfig,
) -> LessonDraft {
    let content = preprocess(raw_content);
    let title = extract_title(&content, chapter_title);
    let objectives = extract_objectives(&content, &title);
    let key_concepts = extract_key_concepts(&content, 8);
    let sections = build_sections(&content, &title, cfg);
    let questions = build_questions(&content, &title, &key_concepts, &objectives, cfg);
    let words = word_count(&content);

    let introduction = sections
        .first()
        .map(|s| s.content.clone())
        .unwrap_or_default();

    LessonDraft {
        title,
        introduction,
        learning_objectives: objectives,
        key_concepts,
        sections,
        questions,
        estimated_duration: estimate_duration(words, grade_level),
        difficulty_level: difficulty_for_grade(grade_level),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHAPTER: &str = "\
# Photosynthesis

Photosynthesis is the process by which green plants convert sunlight into chemical energy.

Students will be able to describe how plants make their own food using sunlight and water.

Chlorophyll is the green pigment that captures light energy inside plant cells. The chloroplast is the part of the cell where photosynthesis happens.

For example, consider the leaves of a sunflower turning toward the sun during the day.

Plants release oxygen as a by-product of photosynthesis, and animals depend on this oxygen to breathe. Water travels from the roots to the leaves through narrow tubes. Carbon dioxide enters the leaf through tiny openings called stomata.

Exercise: try this yourself by placing a plant near a window and observing its growth over two weeks.";

    #[test]
    fn preprocess_removes_pdf_artifacts() {
        let raw = "Text before.\n--- Page 12 ---\n42\nText after con-\ntinued word.";
        let cleaned = preprocess(raw);
        assert!(!cleaned.contains("Page 12"));
        assert!(!cleaned.contains("\n42\n"));
        assert!(cleaned.contains("continued"));
    }

    #[test]
    fn title_comes_from_markdown_heading() {
        assert_eq!(extract_title(CHAPTER, "fallback"), "Photosynthesis");
    }

    #[test]
    fn title_falls_back_when_nothing_matches() {
        let text = "just some lowercase prose without any heading at all. it keeps going.";
        assert_eq!(extract_title(text, "Chapter 3"), "Chapter 3");
    }

    #[test]
    fn objectives_extracted_from_markers() {
        let objectives = extract_objectives(CHAPTER, "Photosynthesis");
        assert!(!objectives.is_empty());
        assert!(objectives.len() <= 5);
        assert!(objectives[0].to_lowercase().contains("describe how plants"));
    }

    #[test]
    fn repeated_objectives_are_deduplicated() {
        let text = "Students will be able to name the planets of the solar system.\n\n\
            The solar system contains eight planets orbiting the sun.\n\n\
            Students will be able to name the planets of the solar system.";
        let objectives = extract_objectives(text, "Space");
        assert_eq!(objectives.len(), 1);
    }

    #[test]
    fn objectives_synthesized_when_absent() {
        let objectives = extract_objectives("No markers here at all.", "Fractions");
        assert_eq!(objectives.len(), 3);
        assert!(objectives[0].contains("Fractions"));
    }

    #[test]
    fn key_concepts_found_from_definitions() {
        let concepts = extract_key_concepts(CHAPTER, 8);
        assert!(concepts.iter().any(|c| c.term == "Chlorophyll"));
        assert!(concepts.len() <= 8);
    }

    #[test]
    fn sections_start_with_intro_and_end_with_summary() {
        let cfg = GenerationConfig::default();
        let sections = build_sections(CHAPTER, "Photosynthesis", &cfg);
        assert_eq!(sections[0].section_type, SectionType::Introduction);
        assert_eq!(
            sections.last().unwrap().section_type,
            SectionType::Summary
        );
        // Orders are contiguous from zero.
        for (i, section) in sections.iter().enumerate() {
            assert_eq!(section.order, i as i32);
        }
    }

    #[test]
    fn question_count_respects_bounds() {
        let cfg = GenerationConfig::default();
        let draft = build_draft("Photosynthesis", 5, CHAPTER, &cfg);
        assert!(draft.questions.len() >= cfg.min_questions);
        assert!(draft.questions.len() <= cfg.max_questions);
    }

    #[test]
    fn sparse_text_still_reaches_minimum_questions() {
        let cfg = GenerationConfig::default();
        let questions = build_questions("Short text.", "Topic", &[], &[], &cfg);
        assert_eq!(questions.len(), cfg.min_questions);
    }

    #[test]
    fn duration_is_clamped_and_grade_banded() {
        assert_eq!(estimate_duration(100, 2), 15);
        assert_eq!(estimate_duration(100_000, 9), 60);
        // Younger readers get more time for the same text.
        assert!(estimate_duration(3000, 2) >= estimate_duration(3000, 9));
    }

    #[test]
    fn difficulty_tracks_grade_level() {
        assert_eq!(difficulty_for_grade(2), LessonDifficulty::Beginner);
        assert_eq!(difficulty_for_grade(5), LessonDifficulty::Intermediate);
        assert_eq!(difficulty_for_grade(10), LessonDifficulty::Advanced);
    }

    #[test]
    fn build_draft_is_deterministic() {
        let cfg = GenerationConfig::default();
        let a = build_draft("Photosynthesis", 5, CHAPTER, &cfg);
        let b = build_draft("Photosynthesis", 5, CHAPTER, &cfg);
        assert_eq!(a.title, b.title);
        assert_eq!(a.learning_objectives, b.learning_objectives);
        assert_eq!(a.sections.len(), b.sections.len());
        assert_eq!(a.questions.len(), b.questions.len());
    }
}
