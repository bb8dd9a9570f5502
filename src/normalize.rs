//! Text normalization shared by training and inference.

use std::collections::HashSet;

use once_cell::sync::Lazy;

/// English stopwords (NLTK list) minus the negations, which carry sentiment.
const STOPWORDS: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "your", "yours",
    "yourself", "yourselves", "he", "him", "his", "himself", "she", "her", "hers", "herself",
    "it", "its", "itself", "they", "them", "their", "theirs", "themselves", "what", "which",
    "who", "whom", "this", "that", "these", "those", "am", "is", "are", "was", "were", "be",
    "been", "being", "have", "has", "had", "having", "do", "does", "did", "doing", "a", "an",
    "the", "and", "but", "if", "or", "because", "as", "until", "while", "of", "at", "by", "for",
    "with", "about", "against", "between", "into", "through", "during", "before", "after",
    "above", "below", "to", "from", "up", "down", "in", "out", "on", "off", "over", "under",
    "again", "further", "then", "once", "here", "there", "when", "where", "why", "how", "all",
    "any", "both", "each", "few", "more", "most", "other", "some", "such", "only", "own",
    "same", "so", "than", "too", "very", "s", "t", "can", "will", "just", "don", "should",
    "now", "d", "ll", "m", "o", "re", "ve", "y", "ain", "aren", "couldn", "didn", "doesn",
    "hadn", "hasn", "haven", "isn", "ma", "mightn", "mustn", "needn", "shan", "shouldn",
    "wasn", "weren", "won", "wouldn",
];

/// Words ending in "s" that are not plurals.
const SINGULAR_S: &[&str] = &[
    "always", "news", "series", "species", "perhaps", "sometimes", "yes", "thus", "towards",
    "afterwards", "besides", "less", "unless", "various", "physics", "mathematics",
];

const IRREGULAR_PLURALS: &[(&str, &str)] = &[
    ("children", "child"),
    ("men", "man"),
    ("women", "woman"),
    ("feet", "foot"),
    ("mice", "mouse"),
];

static STOPWORD_SET: Lazy<HashSet<&'static str>> = Lazy::new(|| STOPWORDS.iter().copied().collect());
static SINGULAR_SET: Lazy<HashSet<&'static str>> =
    Lazy::new(|| SINGULAR_S.iter().copied().collect());

/// Lowercase, keep ASCII letters only, drop stopwords, singularize.
/// Whitespace-only input yields an empty string.
pub fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase();
    let letters: String = lowered
        .chars()
        .filter(|c| c.is_ascii_alphabetic() || c.is_whitespace())
        .collect();

    letters
        .split_whitespace()
        .filter(|token| !STOPWORD_SET.contains(token))
        .map(lemmatize)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Plural-to-singular reduction for nouns.
pub fn lemmatize(token: &str) -> String {
    if let Some((_, singular)) = IRREGULAR_PLURALS.iter().find(|(plural, _)| *plural == token) {
        return singular.to_string();
    }
    if token.len() <= 3 || SINGULAR_SET.contains(token) {
        return token.to_string();
    }

    if let Some(stem) = token.strip_suffix("ies") {
        if stem.len() > 1 {
            return format!("{stem}y");
        }
    }
    if token.ends_with("sses")
        || token.ends_with("ches")
        || token.ends_with("shes")
        || token.ends_with("xes")
        || token.ends_with("zes")
    {
        return token[..token.len() - 2].to_string();
    }
    if token.ends_with("ss") || token.ends_with("us") || token.ends_with("is") {
        return token.to_string();
    }
    match token.strip_suffix('s') {
        Some(stem) => stem.to_string(),
        None => token.to_string(),
    }
}
