//! Forward kinematics: bind-pose and posed world-space joint positions.
//!
//! Joints are visited depth first from the root, each carrying its parent's
//! global rotation and position:
//!
//! ```text
//! local(j)     = C(j) * M(j) * C(j)^-1
//! global(j)    = global(parent) * local(j)
//! position(j)  = position(parent) + global(parent) * direction(j) * length(j)
//! ```
//!
//! `C` is the joint's fixed axis offset (applied in its declared rotation
//! order) and `M` the frame's rotation channels, applied X then Y then Z.
//! A joint's own rotation moves its descendants, not the joint itself.

use hashbrown::HashMap;
use indexmap::IndexMap;
use log::{trace, warn};
use nalgebra::{Rotation3, Vector3};
use serde::{Deserialize, Serialize};

use crate::config::{Config, RootMotion};
use crate::error::MocapError;
use crate::motion::{Frame, Motion};
use crate::skeleton::{Axis, EulerOrder, Joint, Skeleton};

/// World-space position of every joint, in depth-first order from the root.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    positions: IndexMap<String, Vector3<f64>>,
}

impl Pose {
    pub fn get(&self, joint: &str) -> Option<&Vector3<f64>> {
        self.positions.get(joint)
    }

    pub fn position(&self, joint: &str) -> Result<Vector3<f64>, MocapError> {
        self.get(joint)
            .copied()
            .ok_or_else(|| MocapError::unknown_joint(joint))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Vector3<f64>)> + '_ {
        self.positions.iter().map(|(name, p)| (name.as_str(), p))
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// How a DOF channel name drives the joint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Channel {
    Rotation(Axis),
    Translation(Axis),
    /// Channels such as `l` (bone stretch) that do not move the joint.
    Ignored,
}

impl Channel {
    fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "rx" => Channel::Rotation(Axis::X),
            "ry" => Channel::Rotation(Axis::Y),
            "rz" => Channel::Rotation(Axis::Z),
            "tx" => Channel::Translation(Axis::X),
            "ty" => Channel::Translation(Axis::Y),
            "tz" => Channel::Translation(Axis::Z),
            _ => Channel::Ignored,
        }
    }
}

fn axis_index(axis: Axis) -> usize {
    match axis {
        Axis::X => 0,
        Axis::Y => 1,
        Axis::Z => 2,
    }
}

fn axis_rotation(axis: Axis, angle: f64) -> Rotation3<f64> {
    match axis {
        Axis::X => Rotation3::from_axis_angle(&Vector3::x_axis(), angle),
        Axis::Y => Rotation3::from_axis_angle(&Vector3::y_axis(), angle),
        Axis::Z => Rotation3::from_axis_angle(&Vector3::z_axis(), angle),
    }
}

/// Rotation applying `order`'s axes left to right. Angles in radians,
/// indexed X, Y, Z.
pub fn euler_rotation(order: EulerOrder, angles: [f64; 3]) -> Rotation3<f64> {
    order
        .axes()
        .iter()
        .fold(Rotation3::identity(), |acc, &axis| {
            axis_rotation(axis, angles[axis_index(axis)]) * acc
        })
}

/// Axis label to (is translation, axis): `X`/`RX` rotate, `TX` translates.
fn axis_label(label: &str) -> Option<(bool, Axis)> {
    match label.to_ascii_uppercase().as_str() {
        "X" | "RX" => Some((false, Axis::X)),
        "Y" | "RY" => Some((false, Axis::Y)),
        "Z" | "RZ" => Some((false, Axis::Z)),
        "TX" => Some((true, Axis::X)),
        "TY" => Some((true, Axis::Y)),
        "TZ" => Some((true, Axis::Z)),
        _ => None,
    }
}

/// Per-joint data derived once from the skeleton.
#[derive(Clone, Debug)]
struct Segment {
    name: String,
    parent: Option<usize>,
    offset: Vector3<f64>,
    /// Bind translation; only meaningful for the root.
    translation: Vector3<f64>,
    axis: Rotation3<f64>,
    axis_inverse: Rotation3<f64>,
    channels: Vec<Channel>,
}

impl Segment {
    fn new(joint: &Joint, parent: Option<usize>, angle_scale: f64) -> Self {
        let mut translation = Vector3::zeros();
        let mut angles = [0.0; 3];
        for (label, value) in joint.axis() {
            match axis_label(label) {
                Some((true, axis)) => translation[axis_index(axis)] = *value,
                Some((false, axis)) => angles[axis_index(axis)] = *value * angle_scale,
                None => {}
            }
        }
        let axis = euler_rotation(joint.rotation_order(), angles);
        Self {
            name: joint.name().to_string(),
            parent,
            offset: Vector3::from(joint.offset()),
            translation,
            axis,
            axis_inverse: axis.inverse(),
            channels: joint.dof().iter().map(|c| Channel::from_name(c)).collect(),
        }
    }

    /// Local rotation and translation channels for one frame's values.
    fn local(&self, values: &[f64]) -> (Rotation3<f64>, Option<Vector3<f64>>) {
        let mut angles = [0.0; 3];
        let mut translation: Option<Vector3<f64>> = None;
        for (channel, value) in self.channels.iter().zip(values) {
            match channel {
                Channel::Rotation(axis) => angles[axis_index(*axis)] = value.to_radians(),
                Channel::Translation(axis) => {
                    translation.get_or_insert_with(Vector3::zeros)[axis_index(*axis)] = *value
                }
                Channel::Ignored => {}
            }
        }
        if angles == [0.0; 3] {
            return (Rotation3::identity(), translation);
        }
        let motion = euler_rotation(EulerOrder::XYZ, angles);
        (self.axis * motion * self.axis_inverse, translation)
    }
}

/// Forward-kinematics engine over a borrowed skeleton and optional motion.
///
/// The bind pose is computed once at construction; posed frames are computed
/// on demand and only read shared state, so one engine can serve several
/// threads.
#[derive(Clone, Debug)]
pub struct Kinematics<'a> {
    skeleton: &'a Skeleton,
    motion: Option<&'a Motion>,
    root_motion: RootMotion,
    segments: Vec<Segment>,
    bind: Pose,
}

impl<'a> Kinematics<'a> {
    pub fn new(skeleton: &'a Skeleton) -> Self {
        Self::with_config(skeleton, &Config::default())
    }

    pub fn with_config(skeleton: &'a Skeleton, config: &Config) -> Self {
        let angle_scale = if skeleton.units().angle_is_radians() {
            1.0
        } else {
            1f64.to_radians()
        };

        let mut segments: Vec<Segment> = Vec::with_capacity(skeleton.len());
        let mut slots: HashMap<&str, usize> = HashMap::with_capacity(skeleton.len());
        for joint in skeleton.depth_first() {
            let parent = skeleton
                .parent_of(joint.name())
                .ok()
                .flatten()
                .and_then(|p| slots.get(p).copied());
            slots.insert(joint.name(), segments.len());
            segments.push(Segment::new(joint, parent, angle_scale));
        }

        let bind = bind_pose(&segments);
        Self {
            skeleton,
            motion: None,
            root_motion: config.root_motion,
            segments,
            bind,
        }
    }

    /// Attach the motion whose frames [`Kinematics::posed_positions`] reads.
    /// Animated joints missing from some frames are reported once here.
    pub fn with_motion(mut self, motion: &'a Motion) -> Self {
        self.motion = Some(motion);
        for (name, missing) in self.missing_channels() {
            warn!(
                "'{name}' has no channels in {missing} of {} frames; posed with zero rotation",
                motion.frame_count()
            );
        }
        self
    }

    /// Animated joints absent from frames of the attached motion, with the
    /// number of frames that leave them out.
    pub fn missing_channels(&self) -> Vec<(&str, usize)> {
        let Some(motion) = self.motion else {
            return Vec::new();
        };
        self.segments
            .iter()
            .filter(|segment| !segment.channels.is_empty())
            .filter_map(|segment| {
                let missing = motion
                    .frames()
                    .iter()
                    .filter(|frame| !frame.contains(&segment.name))
                    .count();
                (missing > 0).then_some((segment.name.as_str(), missing))
            })
            .collect()
    }

    pub fn skeleton(&self) -> &'a Skeleton {
        self.skeleton
    }

    pub fn motion(&self) -> Option<&'a Motion> {
        self.motion
    }

    /// Rest positions: the root at its translation, every other joint at its
    /// parent plus `direction * length`.
    pub fn bind_pose(&self) -> &Pose {
        &self.bind
    }

    /// Positions for frame `index` of the attached motion.
    pub fn posed_positions(&self, index: usize) -> Result<Pose, MocapError> {
        let frame = match self.motion {
            Some(motion) => motion.frame(index)?,
            None => return Err(MocapError::FrameOutOfRange { index, count: 0 }),
        };
        Ok(self.pose_frame(frame))
    }

    /// Positions for an arbitrary frame. Joints missing from the frame keep
    /// a zero rotation.
    pub fn pose_frame(&self, frame: &Frame) -> Pose {
        let mut rotations: Vec<Rotation3<f64>> = Vec::with_capacity(self.segments.len());
        let mut positions: Vec<Vector3<f64>> = Vec::with_capacity(self.segments.len());

        for segment in &self.segments {
            let values = frame.channels(&segment.name).unwrap_or_else(|| {
                if !segment.channels.is_empty() {
                    trace!("frame has no channels for '{}'", segment.name);
                }
                &[][..]
            });
            let (local, translation) = segment.local(values);
            let (rotation, position) = match segment.parent {
                None => {
                    let position = match (self.root_motion, translation) {
                        (RootMotion::Translated, Some(t)) => t,
                        _ => segment.translation,
                    };
                    (local, position)
                }
                Some(parent) => (
                    rotations[parent] * local,
                    positions[parent] + rotations[parent] * segment.offset,
                ),
            };
            rotations.push(rotation);
            positions.push(position);
        }

        collect_pose(&self.segments, positions)
    }

    /// Every frame of the attached motion, in order.
    pub fn frames(&self) -> impl Iterator<Item = Pose> + '_ {
        self.motion
            .into_iter()
            .flat_map(|motion| motion.frames().iter())
            .map(move |frame| self.pose_frame(frame))
    }
}

fn bind_pose(segments: &[Segment]) -> Pose {
    let mut positions: Vec<Vector3<f64>> = Vec::with_capacity(segments.len());
    for segment in segments {
        let position = match segment.parent {
            None => segment.translation,
            Some(parent) => positions[parent] + segment.offset,
        };
        positions.push(position);
    }
    collect_pose(segments, positions)
}

fn collect_pose(segments: &[Segment], positions: Vec<Vector3<f64>>) -> Pose {
    Pose {
        positions: segments
            .iter()
            .map(|s| s.name.clone())
            .zip(positions)
            .collect(),
    }
}
