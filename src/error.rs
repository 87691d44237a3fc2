use std::fmt::Display;

use serde::{
    Deserialize,
    Serialize,
};

/// Category of a dataset-level detection failure.
#[derive(Eq, Hash, PartialEq, Copy, Clone, Debug, Serialize, Deserialize)]
pub enum EvidenceKind {
    /// Too few, degraded or indistinguishable signals.
    Insufficient,
    /// Explicit failure markers embedded in the raw signal.
    Inconsistent,
    /// More than one equally plausible grouping.
    Ambiguous,
}

impl Display for EvidenceKind {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            EvidenceKind::Insufficient => write!(f, "insufficient evidence"),
            EvidenceKind::Inconsistent => write!(f, "inconsistent evidence"),
            EvidenceKind::Ambiguous => write!(f, "ambiguous evidence"),
        }
    }
}

/// Failure to derive a usable batch assignment for a dataset.
///
/// These reflect the quality of the supplied signals, so retrying with the
/// same input reproduces the same error.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvidenceError {
    #[error("insufficient evidence for batching: {reason}")]
    InsufficientEvidence { reason: String },

    #[error("inconsistent evidence for batching: {reason}")]
    InconsistentEvidence { reason: String },

    #[error("ambiguous evidence for batching: {reason}")]
    AmbiguousEvidence { reason: String },
}

impl EvidenceError {
    pub fn insufficient(reason: impl Into<String>) -> Self {
        Self::InsufficientEvidence {
            reason: reason.into(),
        }
    }

    pub fn inconsistent(reason: impl Into<String>) -> Self {
        Self::InconsistentEvidence {
            reason: reason.into(),
        }
    }

    pub fn ambiguous(reason: impl Into<String>) -> Self {
        Self::AmbiguousEvidence {
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> EvidenceKind {
        match self {
            Self::InsufficientEvidence { .. } => EvidenceKind::Insufficient,
            Self::InconsistentEvidence { .. } => EvidenceKind::Inconsistent,
            Self::AmbiguousEvidence { .. } => EvidenceKind::Ambiguous,
        }
    }

    pub fn reason(&self) -> &str {
        match self {
            Self::InsufficientEvidence { reason }
            | Self::InconsistentEvidence { reason }
            | Self::AmbiguousEvidence { reason } => reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_and_reason() {
        let err = EvidenceError::inconsistent("run FAILURE reported");
        assert_eq!(err.kind(), EvidenceKind::Inconsistent);
        assert_eq!(err.reason(), "run FAILURE reported");
        assert_eq!(
            err.to_string(),
            "inconsistent evidence for batching: run FAILURE reported"
        );
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(
            EvidenceError::ambiguous("x").kind().to_string(),
            "ambiguous evidence"
        );
    }
}
