use super::error::EngineError;

/// Softmax output: values in `[0, 1]` summing to one.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbabilityDistribution(Vec<f64>);

impl ProbabilityDistribution {
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.0.get(index).copied()
    }

    pub fn sum(&self) -> f64 {
        self.0.iter().sum()
    }
}

/// Numerically stable softmax over raw logits.
///
/// The maximum logit is subtracted before exponentiating, so the largest term
/// is always `exp(0) = 1` and large magnitudes cannot overflow.
pub fn softmax(logits: &[f32]) -> Result<ProbabilityDistribution, EngineError> {
    if logits.is_empty() {
        return Err(EngineError::MalformedScores {
            reason: "score vector is empty".to_string(),
        });
    }

    if let Some(pos) = logits.iter().position(|v| !v.is_finite()) {
        return Err(EngineError::MalformedScores {
            reason: format!("non-finite score {} at position {}", logits[pos], pos),
        });
    }

    let max = logits
        .iter()
        .map(|&v| f64::from(v))
        .fold(f64::NEG_INFINITY, f64::max);

    let exps: Vec<f64> = logits.iter().map(|&v| (f64::from(v) - max).exp()).collect();
    // at least one term is exp(0) = 1
    let total: f64 = exps.iter().sum();

    Ok(ProbabilityDistribution(
        exps.into_iter().map(|e| e / total).collect(),
    ))
}

/// Index of the largest probability; the first maximal position wins ties.
pub fn argmax_first(probs: &[f64]) -> usize {
    let mut best = 0;
    for (idx, &p) in probs.iter().enumerate().skip(1) {
        if p > probs[best] {
            best = idx;
        }
    }
    best
}

/// Index of the largest probability; the last maximal position wins ties.
pub fn argmax_last(probs: &[f64]) -> usize {
    let mut best = 0;
    for (idx, &p) in probs.iter().enumerate().skip(1) {
        if p >= probs[best] {
            best = idx;
        }
    }
    best
}

/// `p * 100` rounded to two decimal places.
pub fn to_percent(probability: f64) -> f64 {
    let scale = 10f64.powi(crate::constants::PERCENT_DECIMALS);
    (probability * 100.0 * scale).round() / scale
}
