//! Hybrid sentiment decision: classifier output arbitrated against sarcasm
//! patterns and the short-text lexicon.

use std::sync::Arc;

use tracing::debug;

use crate::classifier::{top_label, Classifier};
use crate::config::ResolverThresholds;
use crate::error::Result;
use crate::lexicon::Lexicon;
use crate::models::{round_to, PredictionResult, SentimentLabel};
use crate::normalize::normalize;

/// Which rule produced the final label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    EmptyInput,
    SarcasmOverride,
    LexiconOverride,
    Classifier,
}

pub struct SentimentResolver {
    classifier: Arc<dyn Classifier>,
    lexicon: Lexicon,
    thresholds: ResolverThresholds,
}

impl SentimentResolver {
    pub fn new(
        classifier: Arc<dyn Classifier>,
        lexicon: Lexicon,
        thresholds: ResolverThresholds,
    ) -> Self {
        Self {
            classifier,
            lexicon,
            thresholds,
        }
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    pub fn thresholds(&self) -> &ResolverThresholds {
        &self.thresholds
    }

    pub fn resolve(&self, raw_text: &str) -> Result<PredictionResult> {
        self.resolve_with_decision(raw_text).map(|(result, _)| result)
    }

    pub fn resolve_with_decision(&self, raw_text: &str) -> Result<(PredictionResult, Decision)> {
        let cleaned = normalize(raw_text);
        if cleaned.is_empty() {
            return Ok((PredictionResult::empty(), Decision::EmptyInput));
        }

        // Always consulted; the probabilities ride along whatever decides.
        let probabilities = self.classifier.predict_proba(&cleaned)?;
        let (ml_label, ml_confidence) =
            top_label(&probabilities).unwrap_or((SentimentLabel::Neutral, 0.0));

        // Patterns look at surface punctuation, so they see the raw text.
        let pattern = self.lexicon.sarcasm_match(raw_text);
        let t = &self.thresholds;

        // A pattern only pulls an unsure classifier away from a different label.
        let (label, confidence, decision) = match pattern {
            Some(hit)
                if ml_label != hit.polarity && ml_confidence < t.sarcasm_confidence_ceiling =>
            {
                (
                    hit.polarity,
                    (ml_confidence + t.sarcasm_confidence_bump).min(t.sarcasm_confidence_cap),
                    Decision::SarcasmOverride,
                )
            }
            _ => match self.lexicon.lexicon_guess(raw_text) {
                Some(guess) if ml_confidence < t.lexicon_confidence_ceiling => {
                    (guess, t.lexicon_confidence, Decision::LexiconOverride)
                }
                _ => (ml_label, ml_confidence, Decision::Classifier),
            },
        };

        debug!(
            ?decision,
            pattern = pattern.map(|hit| hit.tag),
            %ml_label,
            ml_confidence,
            %label,
            "resolved sentiment"
        );

        Ok((
            PredictionResult {
                label,
                confidence: round_to(confidence.clamp(0.0, 1.0), 4),
                probabilities,
            },
            decision,
        ))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::AbsaError;
    use crate::lexicon::{LexiconTables, TaggedPattern};
    use crate::models::Probabilities;

    /// Returns the same distribution for every input.
    pub(crate) struct FixedClassifier(pub Probabilities);

    impl FixedClassifier {
        pub(crate) fn new(positive: f64, neutral: f64, negative: f64) -> Self {
            Self(Probabilities::from([
                (SentimentLabel::Positive, positive),
                (SentimentLabel::Neutral, neutral),
                (SentimentLabel::Negative, negative),
            ]))
        }
    }

    impl Classifier for FixedClassifier {
        fn predict_proba(&self, _normalized: &str) -> Result<Probabilities> {
            Ok(self.0.clone())
        }
    }

    struct BrokenClassifier;

    impl Classifier for BrokenClassifier {
        fn predict_proba(&self, _normalized: &str) -> Result<Probabilities> {
            Err(AbsaError::ModelUnavailable("artifact missing".into()))
        }
    }

    pub(crate) fn resolver(classifier: impl Classifier + 'static) -> SentimentResolver {
        SentimentResolver::new(
            Arc::new(classifier),
            Lexicon::compile(&LexiconTables::default(), 5).unwrap(),
            ResolverThresholds::default(),
        )
    }

    #[test]
    fn empty_text_is_neutral_with_zero_confidence() {
        let r = resolver(BrokenClassifier);
        let (result, decision) = r.resolve_with_decision("   ").unwrap();
        assert_eq!(result, PredictionResult::empty());
        assert_eq!(decision, Decision::EmptyInput);
        // Stopwords only also normalize to nothing.
        assert_eq!(r.resolve("it is what it").unwrap().confidence, 0.0);
    }

    #[test]
    fn sarcasm_flips_weak_positive() {
        let r = resolver(FixedClassifier::new(0.60, 0.25, 0.15));
        let (result, decision) = r
            .resolve_with_decision("Love the labs, the equipment belong in a museum")
            .unwrap();
        assert_eq!(decision, Decision::SarcasmOverride);
        assert_eq!(result.label, SentimentLabel::Negative);
        assert!((result.confidence - 0.75).abs() < 1e-9);
        assert_eq!(result.probabilities[&SentimentLabel::Positive], 0.60);
    }

    #[test]
    fn sarcasm_bump_is_capped() {
        let r = resolver(FixedClassifier::new(0.10, 0.68, 0.22));
        // 0.68 + 0.15 stays under the default cap.
        let result = r.resolve("Great canteen, only when it is open").unwrap();
        assert_eq!(result.label, SentimentLabel::Negative);
        assert!((result.confidence - 0.83).abs() < 1e-9);

        let mut thresholds = ResolverThresholds::default();
        thresholds.sarcasm_confidence_cap = 0.80;
        let capped = SentimentResolver::new(
            Arc::new(FixedClassifier::new(0.10, 0.68, 0.22)),
            Lexicon::compile(&LexiconTables::default(), 5).unwrap(),
            thresholds,
        );
        let result = capped.resolve("Great canteen, only when it is open").unwrap();
        assert!((result.confidence - 0.80).abs() < 1e-9);
    }

    fn surprise_resolver(classifier: FixedClassifier) -> SentimentResolver {
        let mut tables = LexiconTables::default();
        tables.sarcasm_patterns = vec![TaggedPattern {
            tag: "pleasant-surprise".into(),
            pattern: r"\bsurprisingly\b".into(),
            polarity: SentimentLabel::Positive,
        }];
        SentimentResolver::new(
            Arc::new(classifier),
            Lexicon::compile(&tables, 5).unwrap(),
            ResolverThresholds::default(),
        )
    }

    #[test]
    fn pattern_overrides_towards_its_polarity() {
        let text = "the canteen was surprisingly decent overall today";

        let r = surprise_resolver(FixedClassifier::new(0.10, 0.30, 0.60));
        let (result, decision) = r.resolve_with_decision(text).unwrap();
        assert_eq!(decision, Decision::SarcasmOverride);
        assert_eq!(result.label, SentimentLabel::Positive);
        assert!((result.confidence - 0.75).abs() < 1e-9);

        // Already agrees with the pattern, so the classifier stands.
        let r = surprise_resolver(FixedClassifier::new(0.60, 0.30, 0.10));
        let (result, decision) = r.resolve_with_decision(text).unwrap();
        assert_eq!(decision, Decision::Classifier);
        assert_eq!(result.label, SentimentLabel::Positive);
        assert_eq!(result.confidence, 0.60);
    }

    #[test]
    fn negative_pattern_leaves_negative_classifier_alone() {
        let r = resolver(FixedClassifier::new(0.15, 0.25, 0.60));
        let (result, decision) = r
            .resolve_with_decision("The projectors are from the 90s and the seats are hard")
            .unwrap();
        assert_eq!(decision, Decision::Classifier);
        assert_eq!(result.label, SentimentLabel::Negative);
        assert_eq!(result.confidence, 0.60);
    }

    #[test]
    fn confident_classifier_ignores_sarcasm() {
        let r = resolver(FixedClassifier::new(0.80, 0.10, 0.10));
        let (result, decision) = r
            .resolve_with_decision("Excellent library, except on weekends")
            .unwrap();
        assert_eq!(decision, Decision::Classifier);
        assert_eq!(result.label, SentimentLabel::Positive);
        assert_eq!(result.confidence, 0.80);
    }

    #[test]
    fn lexicon_overrides_unsure_classifier() {
        let r = resolver(FixedClassifier::new(0.40, 0.35, 0.25));
        let (result, decision) = r.resolve_with_decision("trash").unwrap();
        assert_eq!(decision, Decision::LexiconOverride);
        assert_eq!(result.label, SentimentLabel::Negative);
        assert_eq!(result.confidence, 0.82);
    }

    #[test]
    fn single_neutral_word_goes_through_lexicon() {
        let r = resolver(FixedClassifier::new(0.45, 0.30, 0.25));
        let (result, decision) = r.resolve_with_decision("okay").unwrap();
        assert_eq!(decision, Decision::LexiconOverride);
        assert_eq!(result.label, SentimentLabel::Neutral);
        assert_eq!(result.confidence, 0.82);
    }

    #[test]
    fn confident_classifier_beats_lexicon() {
        let r = resolver(FixedClassifier::new(0.20, 0.20, 0.60));
        let (result, decision) = r.resolve_with_decision("lit").unwrap();
        assert_eq!(decision, Decision::Classifier);
        assert_eq!(result.label, SentimentLabel::Negative);
        assert_eq!(result.confidence, 0.60);
    }

    #[test]
    fn classifier_failure_propagates() {
        let r = resolver(BrokenClassifier);
        assert!(matches!(
            r.resolve("the wifi is slow"),
            Err(AbsaError::ModelUnavailable(_))
        ));
    }

    #[test]
    fn confidence_stays_in_unit_interval() {
        let mut thresholds = ResolverThresholds::default();
        thresholds.lexicon_confidence = 1.7;
        let r = SentimentResolver::new(
            Arc::new(FixedClassifier::new(0.34, 0.33, 0.33)),
            Lexicon::compile(&LexiconTables::default(), 5).unwrap(),
            thresholds,
        );
        for text in ["trash", "okay", "", "Great fest but zero planning", "the gate"] {
            let c = r.resolve(text).unwrap().confidence;
            assert!((0.0..=1.0).contains(&c), "{text}: {c}");
        }
    }
}
