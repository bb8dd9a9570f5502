use once_cell::sync::Lazy;
use regex::Regex;

/// Commas, semicolons and whole-word contrast connectors.
static CLAUSE_DELIMITER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)[,;]|\b(?:but|however|although|though|yet|despite)\b")
        .expect("clause delimiter pattern")
});

/// Splits feedback into contrast-delimited clauses, dropping fragments
/// shorter than `min_chars`. Falls back to the whole text when nothing
/// survives.
pub fn split(text: &str, min_chars: usize) -> Vec<String> {
    let clauses: Vec<String> = CLAUSE_DELIMITER
        .split(text)
        .map(str::trim)
        .filter(|clause| clause.chars().count() >= min_chars)
        .map(str::to_string)
        .collect();

    if clauses.is_empty() {
        vec![text.to_string()]
    } else {
        clauses
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_contrast_connector() {
        assert_eq!(
            split("Faculty is excellent but the wifi is terrible", 6),
            vec!["Faculty is excellent", "the wifi is terrible"]
        );
    }

    #[test]
    fn splits_on_punctuation_and_mixed_case() {
        assert_eq!(
            split("Great labs; HOWEVER the hostel is dirty, canteen is fine", 6),
            vec!["Great labs", "the hostel is dirty", "canteen is fine"]
        );
    }

    #[test]
    fn drops_short_fragments() {
        assert_eq!(
            split("Ok, but the placement drive was chaotic", 6),
            vec!["the placement drive was chaotic"]
        );
    }

    #[test]
    fn keeps_words_containing_connectors() {
        assert_eq!(
            split("The attribute list is yetis only", 6),
            vec!["The attribute list is yetis only"]
        );
    }

    #[test]
    fn falls_back_to_whole_text() {
        assert_eq!(split("meh", 6), vec!["meh"]);
        assert_eq!(split("ok, but", 6), vec!["ok, but"]);
    }
}
