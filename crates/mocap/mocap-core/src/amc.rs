//! Motion (AMC) parser.
//!
//! After the `:FULLY-SPECIFIED` and `:DEGREES` header lines the file is a run
//! of frame blocks: a marker line holding the 1-based frame number followed
//! by one `<joint> <v1> ... <vk>` line per animated joint. Value counts are
//! checked against the skeleton the motion is parsed for.

use log::debug;

use crate::config::Config;
use crate::cursor::{Cursor, Line};
use crate::error::MocapError;
use crate::motion::{Frame, Motion};
use crate::skeleton::Skeleton;

/// Parse AMC text for `skeleton` with the default configuration.
pub fn parse_motion(text: &str, skeleton: &Skeleton) -> Result<Motion, MocapError> {
    MotionParser::new(skeleton).parse_str(text)
}

#[derive(Clone, Debug)]
pub struct MotionParser<'s> {
    skeleton: &'s Skeleton,
    config: Config,
}

/// A line holding a single numeric field. Only non-negative integers are
/// valid frame numbers; anything else numeric is a malformed marker.
fn frame_marker<'a>(line: &Line<'a>) -> Option<&'a str> {
    match line.fields.as_slice() {
        [number] if number.parse::<f64>().is_ok() => Some(*number),
        _ => None,
    }
}

impl<'s> MotionParser<'s> {
    pub fn new(skeleton: &'s Skeleton) -> Self {
        Self::with_config(skeleton, Config::default())
    }

    pub fn with_config(skeleton: &'s Skeleton, config: Config) -> Self {
        Self { skeleton, config }
    }

    pub fn parse_str(&self, text: &str) -> Result<Motion, MocapError> {
        let lines: Vec<&str> = text.lines().collect();
        self.parse_lines(&lines)
    }

    pub fn parse_lines<S: AsRef<str>>(&self, lines: &[S]) -> Result<Motion, MocapError> {
        self.config.validate()?;
        let lines: Vec<&str> = lines.iter().map(AsRef::as_ref).collect();
        let cursor = Cursor::new(&lines, self.config.delimiter);

        let (_, cursor) = cursor.expect(":FULLY-SPECIFIED")?;
        let (_, mut cursor) = cursor.expect(":DEGREES")?;

        let mut motion = Motion::new(self.config.frame_rate)?;
        let mut number: u64 = 1;
        while !cursor.is_at_end() {
            let (frame, next) = self.parse_frame(cursor, number)?;
            motion.push_frame(frame);
            number += 1;
            cursor = next;
        }
        debug!(
            "parsed motion for '{}': {} frames at {} fps ({:.3}s)",
            self.skeleton.name(),
            motion.frame_count(),
            motion.frame_rate(),
            motion.duration()
        );
        Ok(motion)
    }

    /// Marker line `number`, then channel lines up to the next marker or the
    /// end of input.
    fn parse_frame<'a>(
        &self,
        cursor: Cursor<'a>,
        number: u64,
    ) -> Result<(Frame, Cursor<'a>), MocapError> {
        let expected = format!("frame marker {number}");
        let (marker, mut cursor) = cursor.next_line(&expected)?;
        let Some(found) = frame_marker(&marker).and_then(|token| token.parse::<u64>().ok()) else {
            return Err(MocapError::syntax(marker.index, expected, marker.keyword()));
        };
        if found != number {
            return Err(MocapError::Sequence {
                line: marker.index,
                expected: number,
                found,
            });
        }

        let mut frame = Frame::new();
        while let Some(line) = cursor.peek() {
            if frame_marker(&line).is_some() {
                break;
            }
            self.read_channels(&line, &mut frame)?;
            cursor = cursor.next_line("a channel line")?.1;
        }
        Ok((frame, cursor))
    }

    fn read_channels(&self, line: &Line<'_>, frame: &mut Frame) -> Result<(), MocapError> {
        let name = line.keyword();
        if name.starts_with(':') {
            return Err(MocapError::syntax(line.index, "a channel line", name));
        }
        let joint = self.skeleton.joint(name)?;
        let values = line.numbers(line.args())?;
        if values.len() != joint.dof_count() {
            return Err(MocapError::cardinality(
                name,
                "channels",
                joint.dof_count(),
                values.len(),
            ));
        }
        if frame.contains(name) {
            return Err(MocapError::syntax(
                line.index,
                "one channel line per joint and frame",
                name,
            ));
        }
        frame.insert(name, values);
        Ok(())
    }
}
