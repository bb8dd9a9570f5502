//! Word and phrase lexicons plus sarcasm patterns.
//!
//! The tables are plain data (`LexiconTables`) so they can be replaced or
//! extended from a config file; `Lexicon::compile` turns them into matchers.

use std::collections::HashSet;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::error::{AbsaError, Result};
use crate::models::SentimentLabel;

const POSITIVE_WORDS: &[&str] = &[
    "nice", "good", "great", "excellent", "amazing", "wonderful", "fantastic", "superb",
    "outstanding", "brilliant", "awesome", "best", "love", "loved", "happy", "perfect",
    "beautiful", "clean", "modern", "helpful", "supportive", "knowledgeable", "talented",
    "efficient", "effective", "impressive", "top", "well", "better", "positive", "recommend",
    "enjoy", "enjoyed", "useful", "strong", "smart", "innovative", "quality", "satisfied",
    "satisfying", "rewarding", "exceptional", "remarkable", "splendid",
    // slang
    "lit", "banger", "fire", "solid", "dope", "clutch", "smooth", "decent", "nailed", "killed",
    "goated", "blessed", "legendary", "insane", "unreal", "phenomenal", "stellar", "mint",
    "crisp", "ace",
];

const NEGATIVE_WORDS: &[&str] = &[
    "bad", "poor", "terrible", "awful", "horrible", "worst", "useless", "pathetic", "dirty",
    "broken", "outdated", "slow", "boring", "rude", "arrogant", "corrupt", "rigid", "unhelpful",
    "disappointing", "disappointed", "frustrating", "frustrated", "waste", "hate", "hated",
    "ugly", "disgusting", "unhygienic", "overcrowded", "disorganized", "irresponsible",
    "careless", "negligent", "incompetent", "inadequate",
    // slang
    "trash", "mid", "weak", "buggy", "messy", "painful", "exhausting", "stressful", "draining",
    "confusing", "chaotic", "pointless", "unbearable", "ridiculous", "nightmare", "sucks",
    "atrocious", "dreadful", "abysmal", "diabolical", "dismal",
];

const NEUTRAL_WORDS: &[&str] = &[
    "okay", "fine", "average", "manageable", "fair", "acceptable", "normal", "standard",
    "typical", "alright", "meh", "moderate", "mediocre", "passable", "adequate", "ordinary",
    "so-so",
];

const POSITIVE_PHRASES: &[&str] = &[
    "not bad", "top notch", "on point", "worth it", "great stuff", "loved it", "works well",
    "super helpful", "amazing experience", "highly recommend", "no complaints",
    "actually impressive", "surprisingly good", "really good", "so good", "nailed it",
    "pretty great", "absolutely loved",
];

const NEUTRAL_PHRASES: &[&str] = &[
    "not bad", "not great", "could be better", "decent enough", "nothing special",
    "does the job", "so so", "kind of okay", "not bad not great", "okay i guess",
    "it is what it is", "meets expectations", "gets the work done", "pretty average",
    "somewhere in the middle", "neither good nor bad",
];

const NEGATIVE_PHRASES: &[&str] = &[
    "not good", "very bad", "needs improvement", "worst experience", "doesn't help",
    "no support", "not useful", "not helpful", "not clear", "tests patience", "waste of time",
    "makes no sense", "outdated stuff", "nothing works", "straight up trash", "complete waste",
    "total disaster", "zero value", "pure chaos", "so stressful", "so draining",
    "beyond frustrating", "absolutely terrible", "genuinely awful", "not working",
];

const SARCASM_PATTERNS: &[(&str, &str)] = &[
    (
        "praise-then-qualifier",
        r"(great|love|amazing|excellent|wonderful|fantastic|brilliant|superb).{0,40}(when|if|except|unless|only|but|however)",
    ),
    (
        "praise-then-complaint",
        r"(great|love|amazing|perfect|excellent).{0,60}(broken|useless|pathetic|terrible|awful|horrible|waste|never|nothing|zero)",
    ),
    (
        "backhanded-qualifier",
        r"(if your goal is|prepares you for|teaches you|builds character|rich tradition of|consistently)",
    ),
    (
        "outdated-absurdity",
        r"(belong in a museum|from the 90s|from the 1990s|stopped existing|do not exist|never use)",
    ),
    (
        "dark-humour",
        r"(question my life|life choices|destroying us|break.*spirit|feel.*hopeless|nostalgic for freedom)",
    ),
];

const CONTRAST_CONNECTORS: &[&str] = &[
    "but", "however", "although", "though", "yet", "despite", "unfortunately",
];

/// A named regular expression. A match pushes an unsure classifier towards
/// `polarity`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaggedPattern {
    pub tag: String,
    pub pattern: String,
    #[serde(default = "negative")]
    pub polarity: SentimentLabel,
}

fn negative() -> SentimentLabel {
    SentimentLabel::Negative
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LexiconTables {
    pub positive_words: Vec<String>,
    pub negative_words: Vec<String>,
    pub neutral_words: Vec<String>,
    pub positive_phrases: Vec<String>,
    pub neutral_phrases: Vec<String>,
    pub negative_phrases: Vec<String>,
    pub sarcasm_patterns: Vec<TaggedPattern>,
    pub contrast_connectors: Vec<String>,
}

fn owned(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

impl Default for LexiconTables {
    fn default() -> Self {
        Self {
            positive_words: owned(POSITIVE_WORDS),
            negative_words: owned(NEGATIVE_WORDS),
            neutral_words: owned(NEUTRAL_WORDS),
            positive_phrases: owned(POSITIVE_PHRASES),
            neutral_phrases: owned(NEUTRAL_PHRASES),
            negative_phrases: owned(NEGATIVE_PHRASES),
            sarcasm_patterns: SARCASM_PATTERNS
                .iter()
                .map(|(tag, pattern)| TaggedPattern {
                    tag: tag.to_string(),
                    pattern: pattern.to_string(),
                    polarity: SentimentLabel::Negative,
                })
                .collect(),
            contrast_connectors: owned(CONTRAST_CONNECTORS),
        }
    }
}

#[derive(Debug)]
struct CompiledPattern {
    tag: String,
    polarity: SentimentLabel,
    regex: Regex,
}

/// The first sarcasm pattern that matched some text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternMatch<'a> {
    pub tag: &'a str,
    pub polarity: SentimentLabel,
}

/// Compiled heuristic tables.
#[derive(Debug)]
pub struct Lexicon {
    positive_words: HashSet<String>,
    negative_words: HashSet<String>,
    neutral_words: HashSet<String>,
    /// Phrase sets in precedence order: negative, positive, neutral.
    phrases: Vec<(SentimentLabel, Vec<String>)>,
    sarcasm: Vec<CompiledPattern>,
    contrast: Option<Regex>,
    max_word_tokens: usize,
}

fn case_insensitive(pattern: &str) -> Result<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|source| AbsaError::Pattern {
            pattern: pattern.to_string(),
            source,
        })
}

fn lowered_set(words: &[String]) -> HashSet<String> {
    words.iter().map(|w| w.trim().to_lowercase()).collect()
}

impl Lexicon {
    /// `max_word_tokens` bounds the word-count fallback to short texts.
    pub fn compile(tables: &LexiconTables, max_word_tokens: usize) -> Result<Self> {
        let neutral_phrases = lowered_set(&tables.neutral_phrases);
        // A positive phrase that is also neutral ("not bad") never reads as positive.
        let positive_phrases: Vec<String> = tables
            .positive_phrases
            .iter()
            .map(|p| p.trim().to_lowercase())
            .filter(|p| !neutral_phrases.contains(p))
            .collect();

        let phrases = vec![
            (
                SentimentLabel::Negative,
                tables.negative_phrases.iter().map(|p| p.trim().to_lowercase()).collect(),
            ),
            (SentimentLabel::Positive, positive_phrases),
            (
                SentimentLabel::Neutral,
                tables.neutral_phrases.iter().map(|p| p.trim().to_lowercase()).collect(),
            ),
        ];

        let sarcasm = tables
            .sarcasm_patterns
            .iter()
            .map(|p| {
                Ok(CompiledPattern {
                    tag: p.tag.clone(),
                    polarity: p.polarity,
                    regex: case_insensitive(&p.pattern)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let contrast = if tables.contrast_connectors.is_empty() {
            None
        } else {
            let alternation = tables
                .contrast_connectors
                .iter()
                .map(|c| regex::escape(c.trim()))
                .collect::<Vec<_>>()
                .join("|");
            Some(case_insensitive(&format!(r"\b(?:{alternation})\b"))?)
        };

        Ok(Self {
            positive_words: lowered_set(&tables.positive_words),
            negative_words: lowered_set(&tables.negative_words),
            neutral_words: lowered_set(&tables.neutral_words),
            phrases,
            sarcasm,
            contrast,
            max_word_tokens,
        })
    }

    /// True if any sarcasm pattern matches the raw text.
    pub fn sarcasm_or_contrast(&self, text: &str) -> bool {
        self.sarcasm_match(text).is_some()
    }

    /// First sarcasm pattern that matches, in table order.
    pub fn sarcasm_match(&self, text: &str) -> Option<PatternMatch<'_>> {
        self.sarcasm
            .iter()
            .find(|p| p.regex.is_match(text))
            .map(|p| PatternMatch {
                tag: p.tag.as_str(),
                polarity: p.polarity,
            })
    }

    pub fn sarcasm_tag(&self, text: &str) -> Option<&str> {
        self.sarcasm_match(text).map(|m| m.tag)
    }

    /// True if the text contains a generic contrast connector such as "but".
    pub fn has_contrast_connector(&self, text: &str) -> bool {
        self.contrast.as_ref().is_some_and(|re| re.is_match(text))
    }

    /// Cheap polarity guess for short or slang-heavy text. `None` defers to
    /// the classifier.
    pub fn lexicon_guess(&self, text: &str) -> Option<SentimentLabel> {
        let lowered = text.trim().to_lowercase();

        for (label, phrases) in &self.phrases {
            if phrases.iter().any(|phrase| lowered.contains(phrase.as_str())) {
                return Some(*label);
            }
        }

        let tokens: Vec<&str> = lowered
            .split_whitespace()
            .map(|t| t.trim_matches(|c: char| !c.is_alphanumeric() && c != '-'))
            .filter(|t| !t.is_empty())
            .collect();
        if tokens.is_empty() || tokens.len() > self.max_word_tokens {
            return None;
        }

        let count = |set: &HashSet<String>| tokens.iter().filter(|t| set.contains(**t)).count();
        let pos = count(&self.positive_words);
        let neg = count(&self.negative_words);
        let neu = count(&self.neutral_words);

        if tokens.len() == 1 && neu > 0 {
            Some(SentimentLabel::Neutral)
        } else if pos > neg && pos > neu {
            Some(SentimentLabel::Positive)
        } else if neg > pos && neg > neu {
            Some(SentimentLabel::Negative)
        } else if neu > 0 && pos == 0 && neg == 0 {
            Some(SentimentLabel::Neutral)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lexicon() -> Lexicon {
        Lexicon::compile(&LexiconTables::default(), 5).unwrap()
    }

    #[test]
    fn detects_sarcastic_praise() {
        let lex = lexicon();
        assert!(lex.sarcasm_or_contrast("Great wifi, works perfectly when nobody is online"));
        assert_eq!(
            lex.sarcasm_tag("The projectors belong in a museum"),
            Some("outdated-absurdity")
        );
        assert!(!lex.sarcasm_or_contrast("The library is quiet and well stocked"));
    }

    #[test]
    fn contrast_connector_needs_whole_word() {
        let lex = lexicon();
        assert!(lex.has_contrast_connector("Good labs, however the canteen is dirty"));
        assert!(!lex.has_contrast_connector("Bread and butter topics only"));
    }

    #[test]
    fn negative_phrase_beats_positive_word() {
        assert_eq!(
            lexicon().lexicon_guess("Honestly a waste of time, great view though"),
            Some(SentimentLabel::Negative)
        );
    }

    #[test]
    fn shared_phrase_reads_neutral() {
        assert_eq!(lexicon().lexicon_guess("not bad"), Some(SentimentLabel::Neutral));
        assert_eq!(lexicon().lexicon_guess("Top notch labs"), Some(SentimentLabel::Positive));
    }

    #[test]
    fn single_slang_words() {
        let lex = lexicon();
        assert_eq!(lex.lexicon_guess("trash"), Some(SentimentLabel::Negative));
        assert_eq!(lex.lexicon_guess("Lit!"), Some(SentimentLabel::Positive));
        assert_eq!(lex.lexicon_guess("okay"), Some(SentimentLabel::Neutral));
        assert_eq!(lex.lexicon_guess("so-so"), Some(SentimentLabel::Neutral));
    }

    #[test]
    fn ties_and_long_texts_defer() {
        let lex = lexicon();
        assert_eq!(lex.lexicon_guess("good but bad"), None);
        assert_eq!(lex.lexicon_guess("the hostel rooms are near the main gate"), None);
        assert_eq!(
            lex.lexicon_guess("the teachers here are really good at explaining everything"),
            Some(SentimentLabel::Positive)
        );
        assert_eq!(lex.lexicon_guess("the teachers here are mostly good overall"), None);
    }

    #[test]
    fn match_carries_configured_polarity() {
        let mut tables = LexiconTables::default();
        tables.sarcasm_patterns = vec![TaggedPattern {
            tag: "pleasant-surprise".into(),
            pattern: r"\bsurprisingly\b".into(),
            polarity: SentimentLabel::Positive,
        }];
        let lex = Lexicon::compile(&tables, 5).unwrap();
        assert_eq!(
            lex.sarcasm_match("The canteen was Surprisingly decent"),
            Some(PatternMatch {
                tag: "pleasant-surprise",
                polarity: SentimentLabel::Positive,
            })
        );
        assert_eq!(
            lexicon().sarcasm_match("Labs from the 90s").map(|m| m.polarity),
            Some(SentimentLabel::Negative)
        );
    }

    #[test]
    fn polarity_defaults_to_negative() {
        let tables: LexiconTables =
            serde_json::from_str(r#"{"sarcasm_patterns": [{"tag": "t", "pattern": "meh"}]}"#)
                .unwrap();
        assert_eq!(tables.sarcasm_patterns[0].polarity, SentimentLabel::Negative);
        assert!(!tables.positive_words.is_empty());
    }

    #[test]
    fn invalid_pattern_is_reported() {
        let mut tables = LexiconTables::default();
        tables.sarcasm_patterns.push(TaggedPattern {
            tag: "broken".into(),
            pattern: "(unclosed".into(),
            polarity: SentimentLabel::Negative,
        });
        let err = Lexicon::compile(&tables, 5).unwrap_err();
        assert!(matches!(err, AbsaError::Pattern { .. }));
    }
}
