//! Parser and kinematics configuration.

use serde::{Deserialize, Serialize};

use crate::error::MocapError;

/// ASF version accepted by default.
pub const SUPPORTED_VERSION: &str = "1.10";

/// Frame rate applied to motions unless configured otherwise.
pub const DEFAULT_FRAME_RATE: u32 = 30;

/// How fields inside a line are separated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Delimiter {
    /// Tab-separated fields; runs of tabs used for indentation are ignored.
    #[default]
    Tab,
    /// Any run of whitespace separates fields.
    Whitespace,
}

impl Delimiter {
    /// Split a raw line into its non-empty fields.
    pub fn split<'a>(&self, line: &'a str) -> Vec<&'a str> {
        match self {
            Delimiter::Tab => line
                .split('\t')
                .map(str::trim)
                .filter(|field| !field.is_empty())
                .collect(),
            Delimiter::Whitespace => line.split_whitespace().collect(),
        }
    }
}

/// Where the root joint sits in posed frames.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RootMotion {
    /// Root stays at its bind-pose translation; only its rotation is animated.
    #[default]
    Anchored,
    /// Root follows the translation channels of each frame.
    Translated,
}

/// Configuration shared by both parsers and the kinematics engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Value required in the `:version` line.
    pub version: String,
    pub delimiter: Delimiter,
    /// Frames per second assigned to parsed motions.
    pub frame_rate: u32,
    pub root_motion: RootMotion,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: SUPPORTED_VERSION.to_string(),
            delimiter: Delimiter::Tab,
            frame_rate: DEFAULT_FRAME_RATE,
            root_motion: RootMotion::Anchored,
        }
    }
}

impl Config {
    pub fn with_delimiter(mut self, delimiter: Delimiter) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_frame_rate(mut self, frame_rate: u32) -> Self {
        self.frame_rate = frame_rate;
        self
    }

    pub fn with_root_motion(mut self, root_motion: RootMotion) -> Self {
        self.root_motion = root_motion;
        self
    }

    /// Reject settings no parse could succeed with.
    pub fn validate(&self) -> Result<(), MocapError> {
        if self.frame_rate == 0 {
            return Err(MocapError::InvalidConfig {
                reason: "frame_rate must be greater than 0".into(),
            });
        }
        if self.version.trim().is_empty() {
            return Err(MocapError::InvalidConfig {
                reason: "version must not be empty".into(),
            });
        }
        Ok(())
    }
}
