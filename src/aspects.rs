use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::Aspect;

const FACULTY: &[&str] = &[
    "teacher", "professor", "faculty", "instructor", "lecturer", "mentor", "teaching", "taught",
    "explain", "explanation", "class", "lecture", "doubt", "staff", "educator", "guide", "tutor",
    "academic", "knowledgeable", "knowledge", "subject", "lesson", "session", "approach", "method",
];

const INFRASTRUCTURE: &[&str] = &[
    "infrastructure", "building", "lab", "laboratory", "library", "hostel", "canteen",
    "cafeteria", "classroom", "facility", "facilities", "campus", "wifi", "internet", "computer",
    "equipment", "cleanliness", "clean", "maintenance", "parking", "sports", "gym", "auditorium",
    "room", "bench", "projector", "ac", "air conditioning", "toilet", "washroom",
];

const CURRICULUM: &[&str] = &[
    "curriculum", "syllabus", "course", "subject", "study", "material", "content", "module",
    "assignment", "project", "exam", "examination", "test", "practical", "theory", "research",
    "learning", "academic", "schedule", "timetable", "workshop", "seminar", "program", "degree",
    "skill", "knowledge", "internship", "training",
];

const PLACEMENTS: &[&str] = &[
    "placement", "job", "company", "recruit", "recruitment", "hire", "hiring", "career", "offer",
    "salary", "package", "interview", "campus", "drive", "opportunity", "employ", "employment",
    "industry", "corporate", "mnc", "startup", "internship", "profile", "lpa", "ctc",
];

const MANAGEMENT: &[&str] = &[
    "management", "admin", "administration", "principal", "director", "hod", "dean", "college",
    "department", "rule", "policy", "fee", "fees", "regulation", "event", "fest", "activity",
    "committee", "response", "support", "complaint", "grievance", "discipline", "organization",
    "coordination", "communication",
];

struct KeywordMatcher {
    aspect: Aspect,
    /// Whole-word matchers, used for detection.
    whole_word: Vec<Regex>,
    /// Word-start matchers, used for clause attribution.
    word_start: Vec<Regex>,
}

static MATCHERS: Lazy<Vec<KeywordMatcher>> = Lazy::new(|| {
    Aspect::ALL
        .into_iter()
        .map(|aspect| KeywordMatcher {
            aspect,
            whole_word: keywords_for(aspect)
                .iter()
                .map(|kw| keyword_regex(&format!(r"\b{}\b", regex::escape(kw))))
                .collect(),
            word_start: keywords_for(aspect)
                .iter()
                .map(|kw| keyword_regex(&format!(r"(?i)\b{}", regex::escape(kw))))
                .collect(),
        })
        .collect()
});

// Escaped literals always compile.
fn keyword_regex(pattern: &str) -> Regex {
    Regex::new(pattern).expect("escaped keyword pattern")
}

/// Static keyword list for an aspect. `General` has none.
pub fn keywords_for(aspect: Aspect) -> &'static [&'static str] {
    match aspect {
        Aspect::Faculty => FACULTY,
        Aspect::Infrastructure => INFRASTRUCTURE,
        Aspect::Curriculum => CURRICULUM,
        Aspect::Placements => PLACEMENTS,
        Aspect::Management => MANAGEMENT,
        Aspect::General => &[],
    }
}

/// Aspects mentioned in `text`, in declaration order. Never empty.
pub fn detect(text: &str) -> Vec<Aspect> {
    let lowered = text.to_lowercase();
    let detected: Vec<Aspect> = MATCHERS
        .iter()
        .filter(|matcher| matcher.whole_word.iter().any(|re| re.is_match(&lowered)))
        .map(|matcher| matcher.aspect)
        .collect();

    if detected.is_empty() {
        vec![Aspect::General]
    } else {
        detected
    }
}

/// True when `clause` contains a word starting with one of the aspect's keywords.
pub fn mentions(aspect: Aspect, clause: &str) -> bool {
    MATCHERS
        .iter()
        .find(|matcher| matcher.aspect == aspect)
        .map(|matcher| matcher.word_start.iter().any(|re| re.is_match(clause)))
        .unwrap_or(false)
}
