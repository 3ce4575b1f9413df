//! Response contracts rendered from a [`Verdict`].
//!
//! - Text mode: numeric confidence in percent, raw probabilities per label.
//! - Claim mode: percent strings (`"97.12%"`) for the confidence and per-label
//!   details keyed `<label>_score`. Claim models are always three-way, so
//!   there is no degenerate flag.
//!
//! Both contracts deserialize as well, so clients (and tests) can parse a
//! rendered verdict back.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::constants::PERCENT_DECIMALS;
use crate::engine::{Verdict, to_percent};

fn is_false(value: &bool) -> bool {
    !*value
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextVerdictResponse {
    pub label: String,
    /// Percentage in `[0, 100]`, two decimals.
    pub confidence: f64,
    /// Probability per label, in `[0, 1]`.
    pub raw_scores: BTreeMap<String, f64>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub degenerate: bool,
}

impl TextVerdictResponse {
    pub fn from_verdict(verdict: &Verdict) -> Self {
        Self {
            label: verdict.label.to_string(),
            confidence: verdict.confidence_percent(),
            raw_scores: verdict
                .scores
                .iter()
                .map(|(label, p)| (label.to_string(), *p))
                .collect(),
            degenerate: verdict.degenerate,
        }
    }

    /// Confidence as a probability in `[0, 1]`.
    pub fn probability(&self) -> f64 {
        self.confidence / 100.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimVerdictResponse {
    pub verdict: String,
    /// `"NN.NN%"`.
    pub confidence: String,
    /// `"<label>_score" -> "NN.NN%"`.
    pub details: BTreeMap<String, String>,
}

impl ClaimVerdictResponse {
    pub fn from_verdict(verdict: &Verdict) -> Self {
        Self {
            verdict: verdict.label.to_string(),
            confidence: format_percentage(verdict.confidence),
            details: verdict
                .scores
                .iter()
                .map(|(label, p)| (label.score_key(), format_percentage(*p)))
                .collect(),
        }
    }

    /// Confidence as a probability in `[0, 1]`, if the string is well formed.
    pub fn probability(&self) -> Option<f64> {
        parse_percentage(&self.confidence)
    }
}

/// Renders a probability as `"NN.NN%"`.
pub fn format_percentage(probability: f64) -> String {
    format!(
        "{:.*}%",
        PERCENT_DECIMALS as usize,
        to_percent(probability)
    )
}

/// Parses `"97.12%"` (the `%` is optional) back into `0.9712`.
pub fn parse_percentage(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    let number = trimmed.strip_suffix('%').unwrap_or(trimmed).trim();
    let percent: f64 = number.parse().ok()?;
    if !percent.is_finite() || !(0.0..=100.0).contains(&percent) {
        return None;
    }
    Some(percent / 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::Label;

    fn verdict(label: &str, scores: &[(&str, f64)], degenerate: bool) -> Verdict {
        let scores: Vec<(Label, f64)> = scores
            .iter()
            .map(|(l, p)| (Label::new(l).unwrap(), *p))
            .collect();
        let confidence = scores
            .iter()
            .find(|(l, _)| l.as_str() == label)
            .map(|(_, p)| *p)
            .unwrap();
        Verdict {
            label: Label::new(label).unwrap(),
            confidence,
            scores,
            degenerate,
        }
    }

    #[test]
    fn test_text_contract_shape() {
        let v = verdict("REAL", &[("FAKE", 0.0073915), ("REAL", 0.9926085)], false);
        let json = serde_json::to_value(TextVerdictResponse::from_verdict(&v)).unwrap();

        assert_eq!(json["label"], "REAL");
        assert_eq!(json["confidence"], 99.26);
        assert_eq!(json["raw_scores"]["REAL"], 0.9926085);
        assert_eq!(json["raw_scores"]["FAKE"], 0.0073915);
        assert!(json.get("degenerate").is_none());
    }

    #[test]
    fn test_claim_contract_shape() {
        let v = verdict(
            "TRUSTED",
            &[("TRUSTED", 0.9712), ("NEUTRAL", 0.0188), ("FAKE", 0.01)],
            false,
        );
        let json = serde_json::to_value(ClaimVerdictResponse::from_verdict(&v)).unwrap();

        assert_eq!(json["verdict"], "TRUSTED");
        assert_eq!(json["confidence"], "97.12%");
        assert_eq!(json["details"]["trusted_score"], "97.12%");
        assert_eq!(json["details"]["neutral_score"], "1.88%");
        assert_eq!(json["details"]["fake_score"], "1.00%");
    }

    #[test]
    fn test_degenerate_flag_rendered() {
        let v = verdict("FAKE", &[("FAKE", 1.0), ("REAL", 0.0)], true);
        let text = serde_json::to_value(TextVerdictResponse::from_verdict(&v)).unwrap();
        assert_eq!(text["degenerate"], true);
        assert_eq!(text["confidence"], 100.0);
        assert_eq!(text["raw_scores"]["REAL"], 0.0);
    }

    #[test]
    fn test_parse_back_preserves_label_and_confidence() {
        let v = verdict(
            "NEUTRAL",
            &[("TRUSTED", 0.2), ("NEUTRAL", 0.71234), ("FAKE", 0.08766)],
            false,
        );

        let body = serde_json::to_string(&ClaimVerdictResponse::from_verdict(&v)).unwrap();
        let parsed: ClaimVerdictResponse = serde_json::from_str(&body).unwrap();
        assert_eq!(parsed.verdict, "NEUTRAL");
        assert!((parsed.probability().unwrap() - v.confidence).abs() <= 0.00005);

        let body = serde_json::to_string(&TextVerdictResponse::from_verdict(&v)).unwrap();
        let parsed: TextVerdictResponse = serde_json::from_str(&body).unwrap();
        assert_eq!(parsed.label, "NEUTRAL");
        assert!((parsed.probability() - v.confidence).abs() <= 0.00005);
        assert!(!parsed.degenerate);
    }

    #[test]
    fn test_parse_percentage() {
        let parsed = parse_percentage("97.12%").unwrap();
        assert!((parsed - 0.9712).abs() < 1e-12);
        assert_eq!(parse_percentage(" 50 "), Some(0.5));
        assert_eq!(parse_percentage("0.00%"), Some(0.0));
        assert_eq!(parse_percentage("abc%"), None);
        assert_eq!(parse_percentage("120%"), None);
        assert_eq!(parse_percentage("-1%"), None);
    }

    #[test]
    fn test_format_percentage_pads_decimals() {
        assert_eq!(format_percentage(0.5), "50.00%");
        assert_eq!(format_percentage(1.0), "100.00%");
    }
}
