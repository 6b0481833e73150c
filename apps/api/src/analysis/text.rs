//! Small text utilities shared by the heuristic rule sets.

/// Trims, collapses whitespace and case-folds. This is the form fingerprinted for the cache.
pub fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Lower-cased word tokens. Punctuation other than apostrophes splits tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .map(|t| t.trim_matches('\'').to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Counts non-overlapping occurrences of a (possibly multi-word) phrase in a token stream.
pub fn count_phrase(tokens: &[String], phrase: &str) -> usize {
    let needle: Vec<&str> = phrase.split_whitespace().collect();
    if needle.is_empty() || needle.len() > tokens.len() {
        return 0;
    }

    let mut count = 0;
    let mut i = 0;
    while i + needle.len() <= tokens.len() {
        let matched = tokens[i..i + needle.len()]
            .iter()
            .zip(&needle)
            .all(|(t, n)| t == n);
        if matched {
            count += 1;
            i += needle.len();
        } else {
            i += 1;
        }
    }
    count
}

pub fn count_phrases(tokens: &[String], phrases: &[&str]) -> usize {
    phrases.iter().map(|p| count_phrase(tokens, p)).sum()
}

pub fn contains_any(tokens: &[String], phrases: &[&str]) -> bool {
    phrases.iter().any(|p| count_phrase(tokens, p) > 0)
}

const STOPWORDS: &[&str] = &[
    "about", "after", "again", "also", "been", "before", "being", "could", "describe", "does",
    "doing", "from", "have", "having", "into", "just", "more", "most", "other", "over", "should",
    "some", "such", "tell", "than", "that", "their", "them", "then", "there", "these", "they",
    "this", "those", "through", "very", "were", "what", "when", "where", "which", "while", "with",
    "would", "your", "you're", "yourself",
];

/// Tokens longer than three characters that are not stopwords.
pub fn content_words(text: &str) -> Vec<String> {
    let mut words: Vec<String> = tokenize(text)
        .into_iter()
        .filter(|t| t.chars().count() > 3 && !STOPWORDS.contains(&t.as_str()))
        .collect();
    words.sort();
    words.dedup();
    words
}
