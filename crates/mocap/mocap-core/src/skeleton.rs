//! Skeleton model: joints, units, documentation and the parent/child hierarchy.

use std::fmt;
use std::str::FromStr;

use hashbrown::HashMap;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::MocapError;

/// Name of the distinguished root joint.
pub const ROOT: &str = "root";

/// Cartesian rotation axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub fn label(self) -> &'static str {
        match self {
            Axis::X => "X",
            Axis::Y => "Y",
            Axis::Z => "Z",
        }
    }

    fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'X' => Some(Axis::X),
            'Y' => Some(Axis::Y),
            'Z' => Some(Axis::Z),
            _ => None,
        }
    }
}

/// Order in which three axis rotations are applied, e.g. `XYZ` rotates about
/// X first, then Y, then Z.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EulerOrder(pub [Axis; 3]);

impl EulerOrder {
    pub const XYZ: EulerOrder = EulerOrder([Axis::X, Axis::Y, Axis::Z]);

    pub fn axes(&self) -> [Axis; 3] {
        self.0
    }
}

impl Default for EulerOrder {
    fn default() -> Self {
        Self::XYZ
    }
}

impl FromStr for EulerOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let axes: Vec<Axis> = s.chars().filter_map(Axis::from_char).collect();
        if s.chars().count() != 3 || axes.len() != 3 {
            return Err(format!("'{s}' is not a three-axis rotation order"));
        }
        if axes[0] == axes[1] || axes[1] == axes[2] || axes[0] == axes[2] {
            return Err(format!("'{s}' repeats an axis"));
        }
        Ok(EulerOrder([axes[0], axes[1], axes[2]]))
    }
}

impl fmt::Display for EulerOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for axis in self.0 {
            f.write_str(axis.label())?;
        }
        Ok(())
    }
}

/// Inclusive range a degree of freedom may take. Bounds may be infinite.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Limit {
    pub min: f64,
    pub max: f64,
}

impl Limit {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn unbounded() -> Self {
        Self::new(f64::NEG_INFINITY, f64::INFINITY)
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Unit labels from the `:units` section, carried verbatim.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Units {
    pub mass: String,
    pub length: String,
    pub angle: String,
}

impl Units {
    /// Whether skeleton angles (axis offsets, limits) are in radians.
    pub fn angle_is_radians(&self) -> bool {
        self.angle.eq_ignore_ascii_case("rad")
    }
}

/// One skeletal segment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Joint {
    name: String,
    id: Option<u32>,
    direction: [f64; 3],
    length: f64,
    axis_order: Vec<String>,
    axis: IndexMap<String, f64>,
    rotation_order: EulerOrder,
    dof: Vec<String>,
    limits: Vec<Limit>,
}

impl Joint {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
            direction: [0.0; 3],
            length: 0.0,
            axis_order: Vec::new(),
            axis: IndexMap::new(),
            rotation_order: EulerOrder::XYZ,
            dof: Vec::new(),
            limits: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_root(&self) -> bool {
        self.name == ROOT
    }

    pub fn id(&self) -> Option<u32> {
        self.id
    }

    pub fn set_id(&mut self, id: u32) {
        self.id = Some(id);
    }

    /// Bind-pose direction from the parent (unit length in well-formed data).
    pub fn direction(&self) -> [f64; 3] {
        self.direction
    }

    pub fn set_direction(&mut self, values: &[f64]) -> Result<(), MocapError> {
        let direction: [f64; 3] = values
            .try_into()
            .map_err(|_| MocapError::cardinality(&self.name, "direction", 3, values.len()))?;
        self.direction = direction;
        Ok(())
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn set_length(&mut self, length: f64) {
        self.length = length;
    }

    /// Bind-pose offset from the parent: `direction * length`.
    pub fn offset(&self) -> [f64; 3] {
        self.direction.map(|c| c * self.length)
    }

    pub fn axis_order(&self) -> &[String] {
        &self.axis_order
    }

    /// Order the axis offset angles are applied in.
    pub fn rotation_order(&self) -> EulerOrder {
        self.rotation_order
    }

    /// Use a three-axis rotation order for both the axis labels and the
    /// offset rotation. Clears previously set axis values.
    pub fn set_axis_order(&mut self, order: EulerOrder) {
        self.axis_order = order.axes().iter().map(|a| a.label().to_string()).collect();
        self.rotation_order = order;
        self.axis.clear();
    }

    /// Use arbitrary axis labels (the root keys translation and rotation
    /// together, `TX TY TZ RX RY RZ`). Clears previously set axis values.
    pub fn set_axis_labels<I, S>(&mut self, labels: I) -> Result<(), MocapError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels = self.unique_labels(labels)?;
        self.axis_order = labels;
        self.axis.clear();
        Ok(())
    }

    /// Rotation order of the offset angles without touching the axis labels.
    pub fn set_rotation_order(&mut self, order: EulerOrder) {
        self.rotation_order = order;
    }

    /// Axis offset values keyed by axis label, in axis order.
    pub fn axis(&self) -> &IndexMap<String, f64> {
        &self.axis
    }

    pub fn axis_value(&self, label: &str) -> Option<f64> {
        self.axis.get(label).copied()
    }

    /// Assign one value per axis label. Fails without mutating when the axis
    /// order is unset or the count differs.
    pub fn set_axis(&mut self, values: &[f64]) -> Result<(), MocapError> {
        if self.axis_order.is_empty() || values.len() != self.axis_order.len() {
            return Err(MocapError::cardinality(
                &self.name,
                "axis",
                self.axis_order.len(),
                values.len(),
            ));
        }
        self.axis = self
            .axis_order
            .iter()
            .cloned()
            .zip(values.iter().copied())
            .collect();
        Ok(())
    }

    /// Declared degrees of freedom, in declaration order.
    pub fn dof(&self) -> &[String] {
        &self.dof
    }

    pub fn dof_count(&self) -> usize {
        self.dof.len()
    }

    /// Declare the channels. Names must be unique; clears previous limits.
    pub fn set_dof<I, S>(&mut self, channels: I) -> Result<(), MocapError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let channels = self.unique_labels(channels)?;
        self.dof = channels;
        self.limits.clear();
        Ok(())
    }

    /// Limits paired with their channel, in declaration order. Empty until set.
    pub fn limits(&self) -> impl Iterator<Item = (&str, &Limit)> + '_ {
        self.dof.iter().map(String::as_str).zip(self.limits.iter())
    }

    pub fn limit(&self, channel: &str) -> Option<&Limit> {
        let at = self.dof.iter().position(|c| c == channel)?;
        self.limits.get(at)
    }

    /// Assign exactly one range per declared channel. Fails without mutating
    /// when no channels are declared or the count differs.
    pub fn set_limits(&mut self, limits: Vec<Limit>) -> Result<(), MocapError> {
        if self.dof.is_empty() || limits.len() != self.dof.len() {
            return Err(MocapError::cardinality(
                &self.name,
                "limits",
                self.dof.len(),
                limits.len(),
            ));
        }
        self.limits = limits;
        Ok(())
    }

    fn unique_labels<I, S>(&self, labels: I) -> Result<Vec<String>, MocapError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut out: Vec<String> = Vec::new();
        for label in labels {
            let label = label.into();
            if out.contains(&label) {
                return Err(MocapError::DuplicateChannel {
                    owner: self.name.clone(),
                    name: label,
                });
            }
            out.push(label);
        }
        Ok(out)
    }
}

/// A parsed skeleton definition.
///
/// Joints keep their declaration order; a name index gives constant-time
/// lookups. The hierarchy is validated as a tree rooted at [`ROOT`] on every
/// insertion.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Skeleton {
    name: String,
    documentation: String,
    units: Units,
    joints: Vec<Joint>,
    hierarchy: IndexMap<String, Vec<String>>,
    #[serde(skip)]
    index: HashMap<String, usize>,
    #[serde(skip)]
    parents: HashMap<String, String>,
}

impl Skeleton {
    /// New skeleton holding only a default root joint.
    pub fn new(name: impl Into<String>) -> Self {
        let mut index = HashMap::new();
        index.insert(ROOT.to_string(), 0);
        Self {
            name: name.into(),
            documentation: String::new(),
            units: Units::default(),
            joints: vec![Joint::new(ROOT)],
            hierarchy: IndexMap::new(),
            index,
            parents: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn documentation(&self) -> &str {
        &self.documentation
    }

    pub fn set_documentation(&mut self, documentation: impl Into<String>) {
        self.documentation = documentation.into();
    }

    pub fn units(&self) -> &Units {
        &self.units
    }

    pub fn set_mass_unit(&mut self, unit: impl Into<String>) {
        self.units.mass = unit.into();
    }

    pub fn set_length_unit(&mut self, unit: impl Into<String>) {
        self.units.length = unit.into();
    }

    pub fn set_angle_unit(&mut self, unit: impl Into<String>) {
        self.units.angle = unit.into();
    }

    /// Replace the root joint.
    pub fn set_root(&mut self, joint: Joint) -> Result<(), MocapError> {
        if !joint.is_root() {
            return Err(MocapError::hierarchy(format!(
                "root joint must be named '{ROOT}', got '{}'",
                joint.name()
            )));
        }
        self.joints[0] = joint;
        Ok(())
    }

    pub fn root(&self) -> &Joint {
        &self.joints[0]
    }

    /// Append a joint; names must be unique.
    pub fn add_joint(&mut self, joint: Joint) -> Result<(), MocapError> {
        if self.index.contains_key(joint.name()) {
            return Err(MocapError::DuplicateJoint {
                name: joint.name().to_string(),
            });
        }
        self.index.insert(joint.name().to_string(), self.joints.len());
        self.joints.push(joint);
        Ok(())
    }

    /// Attach `children` under `parent`, in order. Every name must already be
    /// a joint, a child may have only one parent, and no child may be an
    /// ancestor of `parent`. Nothing is recorded when any check fails.
    pub fn add_joint_hierarchy<I, S>(&mut self, parent: &str, children: I) -> Result<(), MocapError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if !self.contains(parent) {
            return Err(MocapError::unknown_joint(parent));
        }
        let children: Vec<String> = children.into_iter().map(Into::into).collect();
        let ancestors = self.ancestors(parent);
        for (i, child) in children.iter().enumerate() {
            if !self.contains(child) {
                return Err(MocapError::unknown_joint(child.as_str()));
            }
            if child == ROOT {
                return Err(MocapError::hierarchy(format!(
                    "'{ROOT}' cannot be a child of '{parent}'"
                )));
            }
            if let Some(existing) = self.parents.get(child) {
                return Err(MocapError::hierarchy(format!(
                    "'{child}' already has parent '{existing}', cannot also attach to '{parent}'"
                )));
            }
            if children[..i].contains(child) {
                return Err(MocapError::hierarchy(format!(
                    "'{child}' listed twice under '{parent}'"
                )));
            }
            if child == parent || ancestors.iter().any(|a| a == child) {
                return Err(MocapError::hierarchy(format!(
                    "attaching '{child}' under '{parent}' creates a cycle"
                )));
            }
        }
        for child in &children {
            self.parents.insert(child.clone(), parent.to_string());
        }
        self.hierarchy
            .entry(parent.to_string())
            .or_default()
            .extend(children);
        Ok(())
    }

    /// Check that every joint hangs off the root.
    pub fn validate_tree(&self) -> Result<(), MocapError> {
        for joint in &self.joints[1..] {
            if !self.parents.contains_key(joint.name()) {
                return Err(MocapError::hierarchy(format!(
                    "joint '{}' is not attached to the hierarchy",
                    joint.name()
                )));
            }
        }
        Ok(())
    }

    fn ancestors(&self, name: &str) -> Vec<String> {
        let mut out = Vec::new();
        let mut current = name;
        while let Some(parent) = self.parents.get(current) {
            out.push(parent.clone());
            current = parent;
        }
        out
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Joint> {
        self.index.get(name).map(|&i| &self.joints[i])
    }

    pub fn joint(&self, name: &str) -> Result<&Joint, MocapError> {
        self.get(name).ok_or_else(|| MocapError::unknown_joint(name))
    }

    /// All joints in declaration order, root first.
    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    pub fn joint_names(&self) -> Vec<&str> {
        self.joints.iter().map(Joint::name).collect()
    }

    /// Joint count, root included; at least 1.
    pub fn len(&self) -> usize {
        self.joints.len()
    }

    /// Always false: a skeleton holds its root from construction on.
    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    /// Parent name → ordered child names, in declaration order.
    pub fn hierarchy(&self) -> &IndexMap<String, Vec<String>> {
        &self.hierarchy
    }

    pub fn parent_of(&self, name: &str) -> Result<Option<&str>, MocapError> {
        if !self.contains(name) {
            return Err(MocapError::unknown_joint(name));
        }
        Ok(self.parents.get(name).map(String::as_str))
    }

    /// Children of `name` in declared order; empty for leaves.
    pub fn children(&self, name: &str) -> &[String] {
        self.hierarchy.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn dof_count(&self, name: &str) -> Result<usize, MocapError> {
        self.joint(name).map(Joint::dof_count)
    }

    /// Joints reachable from the root, depth first, children in declared order.
    pub fn depth_first(&self) -> Vec<&Joint> {
        let mut out = Vec::with_capacity(self.joints.len());
        let mut stack = vec![ROOT];
        while let Some(name) = stack.pop() {
            if let Some(joint) = self.get(name) {
                out.push(joint);
            }
            stack.extend(self.children(name).iter().rev().map(String::as_str));
        }
        out
    }

    /// `(parent, child)` pairs in depth-first order, one per segment to draw.
    pub fn bones(&self) -> Vec<(&str, &str)> {
        self.depth_first()
            .into_iter()
            .filter_map(|joint| {
                self.parents
                    .get(joint.name())
                    .map(|parent| (parent.as_str(), joint.name()))
            })
            .collect()
    }
}
