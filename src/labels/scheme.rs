use std::collections::HashSet;
use std::fmt;

use super::error::SchemeError;

/// Built-in binary scheme: position 0 = fake, position 1 = real.
pub const FAKE_REAL_V1: &str = "fake-real@v1";
/// Built-in NLI scheme: `[entailment, neutral, contradiction]`.
pub const NLI_VERDICT_V1: &str = "nli-verdict@v1";
/// Built-in one-class scheme: only the fake score is emitted.
pub const SINGLE_V1: &str = "single@v1";
/// Name reserved for operator-supplied label lists.
pub const CUSTOM_SCHEME_NAME: &str = "custom";

/// Upper-case class name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Label(String);

impl Label {
    pub fn new(name: impl AsRef<str>) -> Result<Self, SchemeError> {
        let trimmed = name.as_ref().trim();
        if trimmed.is_empty() {
            return Err(SchemeError::EmptyLabel);
        }
        Ok(Self(trimmed.to_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Key used by the claim contract's `details` map, e.g. `trusted_score`.
    pub fn score_key(&self) -> String {
        format!("{}_score", self.0.to_lowercase())
    }

    fn fixed(name: &'static str) -> Self {
        Self(name.to_string())
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// `name@version` identifier attached to every deployed scheme.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SchemeId {
    name: String,
    version: String,
}

impl SchemeId {
    pub fn parse(value: &str) -> Result<Self, SchemeError> {
        let malformed = || SchemeError::MalformedId {
            value: value.to_string(),
        };

        let (name, version) = value.trim().split_once('@').ok_or_else(malformed)?;
        let (name, version) = (name.trim(), version.trim());
        if name.is_empty() || version.is_empty() || version.contains('@') {
            return Err(malformed());
        }

        Ok(Self {
            name: name.to_lowercase(),
            version: version.to_string(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }
}

impl fmt::Display for SchemeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.version)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemeKind {
    Binary,
    Ternary,
    Degenerate,
}

impl SchemeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemeKind::Binary => "binary",
            SchemeKind::Ternary => "ternary",
            SchemeKind::Degenerate => "degenerate",
        }
    }
}

/// Mapping from score-vector position to class name.
///
/// Positions are fixed by configuration and never inferred from the class
/// count. Each variant also fixes the argmax tie policy applied by the
/// verdict engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelScheme {
    /// Two classes. Exact ties resolve to position 1.
    Binary { id: SchemeId, labels: [Label; 2] },
    /// Three classes. Ties resolve to the first maximal position.
    Ternary { id: SchemeId, labels: [Label; 3] },
    /// One class. `missing` is reported with probability 0.0 when present.
    Degenerate {
        id: SchemeId,
        label: Label,
        missing: Option<Label>,
    },
}

impl LabelScheme {
    /// Builds a scheme from an endpoint's `*_LABEL_SCHEME` / `*_LABELS` values.
    pub fn from_config(scheme: &str, labels: Option<&[String]>) -> Result<Self, SchemeError> {
        let id = SchemeId::parse(scheme)?;

        if id.name() == CUSTOM_SCHEME_NAME {
            let labels = labels
                .filter(|l| !l.is_empty())
                .ok_or_else(|| SchemeError::MissingLabels { id: id.to_string() })?;
            let labels = labels
                .iter()
                .map(Label::new)
                .collect::<Result<Vec<_>, _>>()?;
            return Self::from_labels(id, labels);
        }

        if labels.is_some_and(|l| !l.is_empty()) {
            return Err(SchemeError::UnexpectedLabels { id: id.to_string() });
        }

        Self::builtin(id)
    }

    /// Looks up a built-in scheme by id.
    pub fn builtin(id: SchemeId) -> Result<Self, SchemeError> {
        match id.to_string().as_str() {
            FAKE_REAL_V1 => Ok(LabelScheme::Binary {
                id,
                labels: [Label::fixed("FAKE"), Label::fixed("REAL")],
            }),
            NLI_VERDICT_V1 => Ok(LabelScheme::Ternary {
                id,
                labels: [
                    Label::fixed("TRUSTED"),
                    Label::fixed("NEUTRAL"),
                    Label::fixed("FAKE"),
                ],
            }),
            SINGLE_V1 => Ok(LabelScheme::Degenerate {
                id,
                label: Label::fixed("FAKE"),
                missing: Some(Label::fixed("REAL")),
            }),
            _ => Err(SchemeError::UnknownScheme { id: id.to_string() }),
        }
    }

    /// Builds a scheme from an ordered label list (1-3 unique labels).
    pub fn from_labels(id: SchemeId, labels: Vec<Label>) -> Result<Self, SchemeError> {
        {
            let mut seen = HashSet::with_capacity(labels.len());
            for label in &labels {
                if !seen.insert(label) {
                    return Err(SchemeError::DuplicateLabel {
                        label: label.to_string(),
                    });
                }
            }
        }

        let count = labels.len();
        let mut iter = labels.into_iter();
        match (iter.next(), iter.next(), iter.next(), iter.next()) {
            (Some(label), None, None, None) => Ok(LabelScheme::Degenerate {
                id,
                label,
                missing: None,
            }),
            (Some(a), Some(b), None, None) => Ok(LabelScheme::Binary { id, labels: [a, b] }),
            (Some(a), Some(b), Some(c), None) => Ok(LabelScheme::Ternary {
                id,
                labels: [a, b, c],
            }),
            _ => Err(SchemeError::UnsupportedClassCount { count }),
        }
    }

    pub fn id(&self) -> &SchemeId {
        match self {
            LabelScheme::Binary { id, .. }
            | LabelScheme::Ternary { id, .. }
            | LabelScheme::Degenerate { id, .. } => id,
        }
    }

    pub fn kind(&self) -> SchemeKind {
        match self {
            LabelScheme::Binary { .. } => SchemeKind::Binary,
            LabelScheme::Ternary { .. } => SchemeKind::Ternary,
            LabelScheme::Degenerate { .. } => SchemeKind::Degenerate,
        }
    }

    /// Number of score positions the scheme maps (the model's class count).
    pub fn class_count(&self) -> usize {
        match self {
            LabelScheme::Binary { .. } => 2,
            LabelScheme::Ternary { .. } => 3,
            LabelScheme::Degenerate { .. } => 1,
        }
    }

    /// Labels in score-vector order.
    pub fn labels(&self) -> Vec<&Label> {
        match self {
            LabelScheme::Binary { labels, .. } => labels.iter().collect(),
            LabelScheme::Ternary { labels, .. } => labels.iter().collect(),
            LabelScheme::Degenerate { label, .. } => vec![label],
        }
    }
}
