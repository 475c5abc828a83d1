//! Error types for skeleton/motion parsing and kinematics.

use serde::{Deserialize, Serialize};

/// Coarse classification of a [`MocapError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    Syntax,
    Cardinality,
    Sequence,
    Lookup,
    Hierarchy,
    Config,
}

/// Every failure the parsers, models and kinematics engine can report.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum MocapError {
    /// An expected keyword or field was missing or mismatched.
    #[error("syntax error at line {line}: expected {expected}, found '{found}'")]
    Syntax {
        line: usize,
        expected: String,
        found: String,
    },

    /// A setter received a different number of values than previously established.
    #[error("cardinality mismatch for {field} of '{owner}': expected {expected}, got {found}")]
    Cardinality {
        owner: String,
        field: String,
        expected: usize,
        found: usize,
    },

    /// A channel or axis label was declared twice for one joint.
    #[error("duplicate channel '{name}' on '{owner}'")]
    DuplicateChannel { owner: String, name: String },

    /// Frame markers are not contiguous.
    #[error("frame sequence error at line {line}: expected frame {expected}, found {found}")]
    Sequence {
        line: usize,
        expected: u64,
        found: u64,
    },

    /// Query by joint name that does not exist.
    #[error("unknown joint: {name}")]
    UnknownJoint { name: String },

    /// Query by frame index outside the motion.
    #[error("frame {index} is out of range (frame count {count})")]
    FrameOutOfRange { index: usize, count: usize },

    /// A joint name was declared twice.
    #[error("duplicate joint: {name}")]
    DuplicateJoint { name: String },

    /// The parent/child adjacency does not form a tree rooted at `root`.
    #[error("invalid hierarchy: {reason}")]
    InvalidHierarchy { reason: String },

    /// Configuration rejected before parsing started.
    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl MocapError {
    pub(crate) fn syntax(line: usize, expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::Syntax {
            line,
            expected: expected.into(),
            found: found.into(),
        }
    }

    pub(crate) fn cardinality(
        owner: impl Into<String>,
        field: impl Into<String>,
        expected: usize,
        found: usize,
    ) -> Self {
        Self::Cardinality {
            owner: owner.into(),
            field: field.into(),
            expected,
            found,
        }
    }

    pub(crate) fn unknown_joint(name: impl Into<String>) -> Self {
        Self::UnknownJoint { name: name.into() }
    }

    pub(crate) fn hierarchy(reason: impl Into<String>) -> Self {
        Self::InvalidHierarchy {
            reason: reason.into(),
        }
    }

    /// Classify the error.
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Syntax { .. } => ErrorKind::Syntax,
            Self::Cardinality { .. } | Self::DuplicateChannel { .. } => ErrorKind::Cardinality,
            Self::Sequence { .. } => ErrorKind::Sequence,
            Self::UnknownJoint { .. } | Self::FrameOutOfRange { .. } => ErrorKind::Lookup,
            Self::DuplicateJoint { .. } | Self::InvalidHierarchy { .. } => ErrorKind::Hierarchy,
            Self::InvalidConfig { .. } => ErrorKind::Config,
        }
    }

    /// Get error category for logging.
    #[inline]
    pub fn category(&self) -> &'static str {
        match self.kind() {
            ErrorKind::Syntax | ErrorKind::Sequence => "format",
            ErrorKind::Cardinality | ErrorKind::Hierarchy => "model",
            ErrorKind::Lookup => "lookup",
            ErrorKind::Config => "config",
        }
    }

    /// Line index the error points at, when it came from a parser.
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::Syntax { line, .. } | Self::Sequence { line, .. } => Some(*line),
            _ => None,
        }
    }
}
