use std::sync::Arc;

use tracing::debug;

use crate::aspects;
use crate::classifier::Classifier;
use crate::clauses;
use crate::config::HeuristicsConfig;
use crate::error::Result;
use crate::lexicon::Lexicon;
use crate::models::{Aspect, AspectResult, FeedbackAnalysis, FeedbackCategory};
use crate::normalize::normalize;
use crate::resolver::SentimentResolver;

/// Per-aspect and overall sentiment for a single piece of feedback.
pub struct FeedbackAnalyzer {
    resolver: SentimentResolver,
}

impl FeedbackAnalyzer {
    pub fn new(resolver: SentimentResolver) -> Self {
        Self { resolver }
    }

    /// Compiles the heuristic tables and wires them to `classifier`.
    pub fn from_config(classifier: Arc<dyn Classifier>, config: &HeuristicsConfig) -> Result<Self> {
        let lexicon = Lexicon::compile(&config.lexicon, config.thresholds.lexicon_max_tokens)?;
        Ok(Self::new(SentimentResolver::new(
            classifier,
            lexicon,
            config.thresholds.clone(),
        )))
    }

    pub fn resolver(&self) -> &SentimentResolver {
        &self.resolver
    }

    pub fn analyze(&self, text: &str) -> Result<FeedbackAnalysis> {
        let detected = aspects::detect(text);
        let clauses = clauses::split(text, self.resolver.thresholds().min_clause_chars);

        let mut aspect_results = Vec::with_capacity(detected.len());
        for &aspect in &detected {
            let clause = best_clause(aspect, text, &clauses);
            let prediction = self.resolver.resolve(clause)?;
            debug!(%aspect, clause, label = %prediction.label, "aspect sentiment");
            aspect_results.push(AspectResult {
                aspect,
                sentiment: prediction.label,
                confidence: prediction.confidence,
                score: prediction.label.score(),
                probabilities: prediction.probabilities,
            });
        }

        // Independent of the aspect resolutions above.
        let overall = self.resolver.resolve(text)?;
        let overall_score = aspect_results.iter().map(|r| r.score as f64).sum::<f64>()
            / aspect_results.len() as f64;

        Ok(FeedbackAnalysis {
            original_text: text.to_string(),
            normalized_text: normalize(text),
            aspects: detected,
            overall,
            overall_score,
            aspect_results,
        })
    }

    /// Sequential batch; blank rows are skipped, order is preserved.
    pub fn analyze_batch<S: AsRef<str>>(&self, texts: &[S]) -> Result<Vec<FeedbackAnalysis>> {
        texts
            .iter()
            .map(AsRef::as_ref)
            .filter(|text| !text.trim().is_empty())
            .map(|text| self.analyze(text))
            .collect()
    }

    /// Fans the batch out over blocking worker tasks. Output order matches
    /// input order.
    pub async fn analyze_batch_concurrent(
        self: Arc<Self>,
        texts: Vec<String>,
        workers: usize,
    ) -> Result<Vec<FeedbackAnalysis>> {
        let texts: Vec<String> = texts.into_iter().filter(|t| !t.trim().is_empty()).collect();
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let chunk_size = texts.len().div_ceil(workers.max(1));
        let mut handles = Vec::new();
        for chunk in texts.chunks(chunk_size) {
            let analyzer = Arc::clone(&self);
            let chunk = chunk.to_vec();
            handles.push(tokio::task::spawn_blocking(move || {
                analyzer.analyze_batch(&chunk)
            }));
        }

        let mut results = Vec::with_capacity(texts.len());
        for handle in handles {
            results.extend(handle.await??);
        }
        Ok(results)
    }
}

/// First clause mentioning one of the aspect's keywords, else the full text.
/// Keywords must start a word: a bare substring match would let "ac" claim
/// clauses about "faculty".
fn best_clause<'a>(aspect: Aspect, text: &'a str, clauses: &'a [String]) -> &'a str {
    clauses
        .iter()
        .find(|clause| aspects::mentions(aspect, clause))
        .map(String::as_str)
        .unwrap_or(text)
}

/// Groups feedback into "generic" (very short, or no specific aspect) versus
/// aspect-specific, with a human readable description.
pub fn categorize(text: &str, aspects: &[Aspect]) -> FeedbackCategory {
    let is_short = text.split_whitespace().count() <= 3;
    let specific: Vec<Aspect> = aspects
        .iter()
        .copied()
        .filter(|a| *a != Aspect::General)
        .collect();

    if is_short || specific.is_empty() {
        return FeedbackCategory {
            label: "Generic Feedback".to_string(),
            is_generic: true,
            aspects: Vec::new(),
            description: "A short or general expression not tied to a specific aspect of the college."
                .to_string(),
        };
    }

    let names: Vec<&str> = specific.iter().map(|a| a.name()).collect();
    let description = if let [only] = specific.as_slice() {
        format!("This feedback is specifically about the {only} aspect of the college.")
    } else {
        format!("This feedback covers multiple aspects: {}.", names.join(", "))
    };

    FeedbackCategory {
        label: names.join(", "),
        is_generic: false,
        aspects: specific,
        description,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::ClassifierHandle;
    use crate::error::AbsaError;
    use crate::models::{Probabilities, SentimentLabel};
    use crate::resolver::tests::{resolver, FixedClassifier};
    use crate::training;

    fn unsure_analyzer() -> FeedbackAnalyzer {
        FeedbackAnalyzer::new(resolver(FixedClassifier::new(0.34, 0.33, 0.33)))
    }

    fn trained_analyzer() -> FeedbackAnalyzer {
        let report = training::train_bundled().unwrap();
        let handle = ClassifierHandle::with_model("unused.json", report.model);
        FeedbackAnalyzer::from_config(Arc::new(handle), &HeuristicsConfig::default()).unwrap()
    }

    #[test]
    fn attributes_mixed_sentiment_per_aspect() {
        let analysis = unsure_analyzer()
            .analyze("Faculty is excellent but the wifi is terrible")
            .unwrap();

        assert_eq!(analysis.aspects, vec![Aspect::Faculty, Aspect::Infrastructure]);
        assert_eq!(analysis.aspect_results.len(), 2);
        assert_eq!(analysis.aspect_results[0].aspect, Aspect::Faculty);
        assert_eq!(analysis.aspect_results[0].sentiment, SentimentLabel::Positive);
        assert_eq!(analysis.aspect_results[1].aspect, Aspect::Infrastructure);
        assert_eq!(analysis.aspect_results[1].sentiment, SentimentLabel::Negative);
        assert_eq!(analysis.overall_score, 0.0);
    }

    #[test]
    fn trained_model_separates_clauses() {
        let analysis = trained_analyzer()
            .analyze("Faculty is excellent but the wifi is terrible")
            .unwrap();
        let infra = analysis
            .aspect_results
            .iter()
            .find(|r| r.aspect == Aspect::Infrastructure)
            .unwrap();
        assert_eq!(infra.sentiment, SentimentLabel::Negative);
        let faculty = analysis
            .aspect_results
            .iter()
            .find(|r| r.aspect == Aspect::Faculty)
            .unwrap();
        assert_ne!(faculty.sentiment, SentimentLabel::Negative);
    }

    #[test]
    fn general_uses_full_text() {
        let analysis = unsure_analyzer().analyze("Honestly trash").unwrap();
        assert_eq!(analysis.aspects, vec![Aspect::General]);
        assert_eq!(analysis.aspect_results[0].sentiment, SentimentLabel::Negative);
        assert_eq!(analysis.overall.label, SentimentLabel::Negative);
        assert_eq!(analysis.overall_score, -1.0);
    }

    #[test]
    fn overall_score_is_mean_of_aspect_scores() {
        let analysis = unsure_analyzer()
            .analyze("The library is excellent, the fees are terrible, the hostel is okay")
            .unwrap();
        let mean = analysis
            .aspect_results
            .iter()
            .map(|r| r.score as f64)
            .sum::<f64>()
            / analysis.aspect_results.len() as f64;
        assert_eq!(analysis.overall_score, mean);
        assert_eq!(analysis.aspects.len(), analysis.aspect_results.len());
    }

    #[test]
    fn analysis_is_repeatable() {
        let analyzer = trained_analyzer();
        let text = "Great canteen, only when it is open; placements are mid";
        assert_eq!(analyzer.analyze(text).unwrap(), analyzer.analyze(text).unwrap());
    }

    #[test]
    fn batch_skips_blank_rows() {
        let results = unsure_analyzer()
            .analyze_batch(&["trash", "   ", "okay", ""])
            .unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].original_text, "trash");
        assert_eq!(results[1].original_text, "okay");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn concurrent_batch_preserves_order() {
        let analyzer = Arc::new(unsure_analyzer());
        let texts: Vec<String> = (0..23)
            .map(|i| if i % 2 == 0 { format!("trash {i}") } else { format!("okay {i}") })
            .collect();

        let expected = analyzer.analyze_batch(&texts).unwrap();
        let results = Arc::clone(&analyzer)
            .analyze_batch_concurrent(texts, 4)
            .await
            .unwrap();
        assert_eq!(results, expected);
    }

    #[tokio::test]
    async fn concurrent_batch_surfaces_model_errors() {
        struct Missing;
        impl Classifier for Missing {
            fn predict_proba(&self, _: &str) -> Result<Probabilities> {
                Err(AbsaError::ModelUnavailable("gone".into()))
            }
        }
        let analyzer = Arc::new(FeedbackAnalyzer::new(resolver(Missing)));
        let err = analyzer
            .analyze_batch_concurrent(vec!["the lab is slow".into()], 2)
            .await
            .unwrap_err();
        assert!(matches!(err, AbsaError::ModelUnavailable(_)));
    }

    #[test]
    fn categorizes_feedback() {
        let generic = categorize("so good", &[Aspect::General]);
        assert!(generic.is_generic);

        let single = categorize("The hostel rooms are clean", &[Aspect::Infrastructure]);
        assert!(!single.is_generic);
        assert_eq!(single.label, "Infrastructure");

        let multi = categorize(
            "Teachers are great and fees are fair",
            &[Aspect::Faculty, Aspect::Management],
        );
        assert_eq!(multi.label, "Faculty, Management");
        assert!(multi.description.contains("multiple aspects"));
    }
}
