//! Motion model: an ordered series of frames of per-joint channel values.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_FRAME_RATE;
use crate::error::MocapError;

/// Channel values of one frame, keyed by joint name in file order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    channels: IndexMap<String, Vec<f64>>,
}

impl Frame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the values of `joint`, returning the previous ones if any.
    pub fn insert(&mut self, joint: impl Into<String>, values: Vec<f64>) -> Option<Vec<f64>> {
        self.channels.insert(joint.into(), values)
    }

    pub fn channels(&self, joint: &str) -> Option<&[f64]> {
        self.channels.get(joint).map(Vec::as_slice)
    }

    pub fn contains(&self, joint: &str) -> bool {
        self.channels.contains_key(joint)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[f64])> + '_ {
        self.channels
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, Vec<f64>)> for Frame {
    fn from_iter<T: IntoIterator<Item = (S, Vec<f64>)>>(iter: T) -> Self {
        Self {
            channels: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// A time series of frames sampled at a fixed rate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Motion {
    frame_rate: u32,
    frames: Vec<Frame>,
    /// Seconds; kept equal to `frames.len() / frame_rate`.
    duration: f64,
}

impl Default for Motion {
    fn default() -> Self {
        Self {
            frame_rate: DEFAULT_FRAME_RATE,
            frames: Vec::new(),
            duration: 0.0,
        }
    }
}

fn check_frame_rate(frame_rate: u32) -> Result<(), MocapError> {
    if frame_rate == 0 {
        return Err(MocapError::InvalidConfig {
            reason: "frame rate must be greater than 0".into(),
        });
    }
    Ok(())
}

impl Motion {
    pub fn new(frame_rate: u32) -> Result<Self, MocapError> {
        check_frame_rate(frame_rate)?;
        Ok(Self {
            frame_rate,
            ..Self::default()
        })
    }

    pub fn frame_rate(&self) -> u32 {
        self.frame_rate
    }

    pub fn set_frame_rate(&mut self, frame_rate: u32) -> Result<(), MocapError> {
        check_frame_rate(frame_rate)?;
        self.frame_rate = frame_rate;
        self.update_duration();
        Ok(())
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Length of the clip in seconds.
    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn frame(&self, index: usize) -> Result<&Frame, MocapError> {
        self.frames.get(index).ok_or(MocapError::FrameOutOfRange {
            index,
            count: self.frames.len(),
        })
    }

    /// Timestamp of frame `index` in seconds.
    pub fn frame_time(&self, index: usize) -> f64 {
        index as f64 / self.frame_rate as f64
    }

    pub fn push_frame(&mut self, frame: Frame) {
        self.frames.push(frame);
        self.update_duration();
    }

    fn update_duration(&mut self) {
        self.duration = self.frames.len() as f64 / self.frame_rate as f64;
    }
}
