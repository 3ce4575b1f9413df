use tracing::{debug, info, warn};

use crate::labels::{Label, LabelScheme};

use super::error::EngineError;
use super::softmax::{argmax_first, argmax_last, softmax, to_percent};

/// Resolved classification for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    /// Winning label.
    pub label: Label,
    /// Probability of the winning label, in `[0, 1]`.
    pub confidence: f64,
    /// Every class probability in scheme order.
    pub scores: Vec<(Label, f64)>,
    /// Set when the model only emits one class score.
    pub degenerate: bool,
}

impl Verdict {
    /// Confidence as a percentage rounded to two decimals.
    pub fn confidence_percent(&self) -> f64 {
        to_percent(self.confidence)
    }

    pub fn score_of(&self, label: &str) -> Option<f64> {
        self.scores
            .iter()
            .find(|(l, _)| l.as_str() == label)
            .map(|(_, p)| *p)
    }
}

/// Turns raw logits into a [`Verdict`] under a fixed [`LabelScheme`].
///
/// The scheme/class-count check happens once in [`VerdictEngine::new`]; after
/// that, [`VerdictEngine::resolve`] is a pure synchronous transform.
#[derive(Debug, Clone)]
pub struct VerdictEngine {
    scheme: LabelScheme,
}

impl VerdictEngine {
    pub fn new(
        scheme: LabelScheme,
        model_classes: usize,
        allow_degenerate: bool,
    ) -> Result<Self, EngineError> {
        if scheme.class_count() != model_classes {
            return Err(EngineError::ClassCountMismatch {
                scheme: scheme.id().to_string(),
                scheme_classes: scheme.class_count(),
                model_classes,
            });
        }

        if matches!(scheme, LabelScheme::Degenerate { .. }) {
            if !allow_degenerate {
                return Err(EngineError::DegenerateDisallowed {
                    scheme: scheme.id().to_string(),
                });
            }
            warn!(
                scheme = %scheme.id(),
                "Serving a single-class model; verdicts will be flagged degenerate"
            );
        }

        info!(
            scheme = %scheme.id(),
            kind = scheme.kind().as_str(),
            classes = model_classes,
            "Verdict engine ready"
        );

        Ok(Self { scheme })
    }

    pub fn scheme(&self) -> &LabelScheme {
        &self.scheme
    }

    pub fn resolve(&self, logits: &[f32]) -> Result<Verdict, EngineError> {
        let expected = self.scheme.class_count();
        if logits.len() != expected {
            return Err(EngineError::ShapeMismatch {
                expected,
                actual: logits.len(),
            });
        }

        let dist = softmax(logits)?;
        let probs = dist.as_slice();

        let verdict = match &self.scheme {
            LabelScheme::Binary { labels, .. } => {
                // exact ties go to position 1
                let winner = argmax_last(probs);
                Verdict {
                    label: labels[winner].clone(),
                    confidence: probs[winner],
                    scores: labels.iter().cloned().zip(probs.iter().copied()).collect(),
                    degenerate: false,
                }
            }
            LabelScheme::Ternary { labels, .. } => {
                let winner = argmax_first(probs);
                Verdict {
                    label: labels[winner].clone(),
                    confidence: probs[winner],
                    scores: labels.iter().cloned().zip(probs.iter().copied()).collect(),
                    degenerate: false,
                }
            }
            LabelScheme::Degenerate { label, missing, .. } => {
                let mut scores = vec![(label.clone(), probs[0])];
                if let Some(missing) = missing {
                    scores.push((missing.clone(), 0.0));
                }
                Verdict {
                    label: label.clone(),
                    confidence: probs[0],
                    scores,
                    degenerate: true,
                }
            }
        };

        debug!(
            label = %verdict.label,
            confidence = verdict.confidence,
            degenerate = verdict.degenerate,
            "Resolved verdict"
        );

        Ok(verdict)
    }
}
