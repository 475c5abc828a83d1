//! Skeleton-definition (ASF) parser.
//!
//! Sections are read in their fixed order, each with its own field grammar:
//!
//! ```text
//! :version        1.10
//! :name           <name>
//! :units          mass/length/angle lines
//! :documentation  free text up to :root
//! :root           axis, order, position, orientation
//! :bonedata       begin ... end blocks
//! :hierarchy      begin, <parent> <child>..., end
//! ```
//!
//! Any deviation aborts the parse; no partial skeleton is returned.

use log::{debug, trace};

use crate::config::Config;
use crate::cursor::{Cursor, Line};
use crate::error::MocapError;
use crate::skeleton::{EulerOrder, Joint, Limit, Skeleton, ROOT};

/// Parse ASF text with the default configuration.
pub fn parse_skeleton(text: &str) -> Result<Skeleton, MocapError> {
    SkeletonParser::default().parse_str(text)
}

#[derive(Clone, Debug, Default)]
pub struct SkeletonParser {
    config: Config,
}

impl SkeletonParser {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn parse_str(&self, text: &str) -> Result<Skeleton, MocapError> {
        let lines: Vec<&str> = text.lines().collect();
        self.parse_lines(&lines)
    }

    pub fn parse_lines<S: AsRef<str>>(&self, lines: &[S]) -> Result<Skeleton, MocapError> {
        self.config.validate()?;
        let lines: Vec<&str> = lines.iter().map(AsRef::as_ref).collect();
        let cursor = Cursor::new(&lines, self.config.delimiter);

        let cursor = self.parse_version(cursor)?;
        let (mut skeleton, cursor) = parse_name(cursor)?;
        debug!("parsing skeleton '{}'", skeleton.name());
        let cursor = parse_units(cursor, &mut skeleton)?;
        let cursor = parse_documentation(cursor, &mut skeleton)?;
        let (root, cursor) = parse_root(cursor)?;
        skeleton.set_root(root)?;
        let cursor = parse_bonedata(cursor, &mut skeleton)?;
        let cursor = parse_hierarchy(cursor, &mut skeleton)?;

        if let Some(line) = cursor.peek() {
            return Err(MocapError::syntax(line.index, "end of input", line.keyword()));
        }
        skeleton.validate_tree()?;
        debug!(
            "parsed skeleton '{}': {} joints",
            skeleton.name(),
            skeleton.len()
        );
        Ok(skeleton)
    }

    fn parse_version<'a>(&self, cursor: Cursor<'a>) -> Result<Cursor<'a>, MocapError> {
        let (line, cursor) = cursor.expect(":version")?;
        let version = line.arg(0, "format version")?;
        if version != self.config.version {
            return Err(MocapError::syntax(
                line.index,
                format!("version '{}'", self.config.version),
                version,
            ));
        }
        Ok(cursor)
    }
}

fn parse_name(cursor: Cursor<'_>) -> Result<(Skeleton, Cursor<'_>), MocapError> {
    let (line, cursor) = cursor.expect(":name")?;
    if line.args().is_empty() {
        return Err(MocapError::syntax(line.index, "skeleton name", "nothing"));
    }
    Ok((Skeleton::new(line.args().join(" ")), cursor))
}

fn parse_units<'a>(cursor: Cursor<'a>, skeleton: &mut Skeleton) -> Result<Cursor<'a>, MocapError> {
    let (_, cursor) = cursor.expect(":units")?;
    let (line, cursor) = cursor.expect("mass")?;
    skeleton.set_mass_unit(line.arg(0, "mass unit")?);
    let (line, cursor) = cursor.expect("length")?;
    skeleton.set_length_unit(line.arg(0, "length unit")?);
    let (line, cursor) = cursor.expect("angle")?;
    skeleton.set_angle_unit(line.arg(0, "angle unit")?);
    Ok(cursor)
}

/// Everything between `:documentation` and `:root`, joined with newlines.
/// Leaves the cursor on the `:root` line.
fn parse_documentation<'a>(
    cursor: Cursor<'a>,
    skeleton: &mut Skeleton,
) -> Result<Cursor<'a>, MocapError> {
    let (_, mut cursor) = cursor.expect(":documentation")?;
    let mut text: Vec<&str> = Vec::new();
    loop {
        let Some((_, raw, next)) = cursor.next_raw() else {
            return Err(MocapError::syntax(
                cursor.position(),
                "':root'",
                "end of input",
            ));
        };
        let raw = raw.trim_end_matches('\r');
        if raw.trim() == ":root" {
            break;
        }
        text.push(raw);
        cursor = next;
    }
    skeleton.set_documentation(text.join("\n"));
    Ok(cursor)
}

/// `:root` with its `axis` and `order` lines (either first), then
/// `position` and `orientation`.
fn parse_root(cursor: Cursor<'_>) -> Result<(Joint, Cursor<'_>), MocapError> {
    let (_, mut cursor) = cursor.expect(":root")?;
    let mut root = Joint::new(ROOT);
    let mut seen_axis = false;
    let mut seen_order = false;

    while !(seen_axis && seen_order) {
        let expected = match (seen_axis, seen_order) {
            (false, false) => "'axis' or 'order'",
            (true, _) => "'order'",
            (_, true) => "'axis'",
        };
        let (line, next) = cursor.next_line(expected)?;
        match line.keyword() {
            "axis" if !seen_axis => {
                root.set_rotation_order(parse_euler_order(&line, line.arg(0, "rotation order")?)?);
                seen_axis = true;
            }
            "order" if !seen_order => {
                if line.args().is_empty() {
                    return Err(MocapError::syntax(line.index, "channel name", "nothing"));
                }
                root.set_axis_labels(line.args().iter().copied())?;
                root.set_dof(line.args().iter().copied())?;
                seen_order = true;
            }
            other => return Err(MocapError::syntax(line.index, expected, other)),
        }
        cursor = next;
    }

    let (line, cursor) = cursor.expect("position")?;
    let mut values = line.numbers(line.args())?;
    if values.len() != 3 {
        return Err(MocapError::cardinality(ROOT, "position", 3, values.len()));
    }
    let (line, cursor) = cursor.expect("orientation")?;
    let orientation = line.numbers(line.args())?;
    if orientation.len() != 3 {
        return Err(MocapError::cardinality(ROOT, "orientation", 3, orientation.len()));
    }
    values.extend(orientation);
    root.set_axis(&values)?;
    Ok((root, cursor))
}

fn parse_euler_order(line: &Line<'_>, token: &str) -> Result<EulerOrder, MocapError> {
    token
        .parse()
        .map_err(|_| MocapError::syntax(line.index, "a rotation order such as 'XYZ'", token))
}

fn parse_bonedata<'a>(
    cursor: Cursor<'a>,
    skeleton: &mut Skeleton,
) -> Result<Cursor<'a>, MocapError> {
    let (_, mut cursor) = cursor.expect(":bonedata")?;
    loop {
        match cursor.peek() {
            None => {
                return Err(MocapError::syntax(
                    cursor.position(),
                    "':hierarchy'",
                    "end of input",
                ))
            }
            Some(line) if line.is(":hierarchy") => return Ok(cursor),
            Some(_) => {
                let (joint, next) = parse_bone(cursor)?;
                trace!(
                    "bone '{}' dof={:?} length={}",
                    joint.name(),
                    joint.dof(),
                    joint.length()
                );
                skeleton.add_joint(joint)?;
                cursor = next;
            }
        }
    }
}

/// One `begin ... end` block.
fn parse_bone(cursor: Cursor<'_>) -> Result<(Joint, Cursor<'_>), MocapError> {
    let (_, mut cursor) = cursor.expect("begin")?;

    let mut id = None;
    if let Some(line) = cursor.peek().filter(|line| line.is("id")) {
        let token = line.arg(0, "bone id")?;
        id = Some(
            token
                .parse::<u32>()
                .map_err(|_| MocapError::syntax(line.index, "a bone id", token))?,
        );
        cursor = cursor.next_line("'id'")?.1;
    }

    let (line, cursor) = cursor.expect("name")?;
    let mut joint = Joint::new(line.arg(0, "joint name")?);
    if let Some(id) = id {
        joint.set_id(id);
    }

    let (line, cursor) = cursor.expect("direction")?;
    joint.set_direction(&line.numbers(line.args())?)?;

    let (line, cursor) = cursor.expect("length")?;
    if line.args().len() != 1 {
        return Err(MocapError::cardinality(joint.name(), "length", 1, line.args().len()));
    }
    let length = line.number(line.args()[0])?;
    if length < 0.0 {
        return Err(MocapError::syntax(
            line.index,
            "a non-negative length",
            line.args()[0],
        ));
    }
    joint.set_length(length);

    let (line, mut cursor) = cursor.expect("axis")?;
    let Some((order, values)) = line.args().split_last() else {
        return Err(MocapError::syntax(line.index, "axis values", "nothing"));
    };
    joint.set_axis_order(parse_euler_order(&line, order)?);
    joint.set_axis(&line.numbers(values)?)?;

    if let Some(line) = cursor.peek().filter(|line| line.is("dof")) {
        if line.args().is_empty() {
            return Err(MocapError::syntax(line.index, "channel name", "nothing"));
        }
        joint.set_dof(line.args().iter().copied())?;
        cursor = cursor.next_line("'dof'")?.1;
        cursor = parse_limits(cursor, &mut joint)?;
    }

    let (_, cursor) = cursor.expect("end")?;
    Ok((joint, cursor))
}

/// `limits (a b)` followed by one `(a b)` line per remaining channel.
fn parse_limits<'a>(cursor: Cursor<'a>, joint: &mut Joint) -> Result<Cursor<'a>, MocapError> {
    let (line, mut cursor) = cursor.expect("limits")?;
    let mut ranges = vec![parse_range(&line, line.args())?];
    while let Some(line) = cursor.peek() {
        if !line.keyword().starts_with('(') {
            break;
        }
        ranges.push(parse_range(&line, &line.fields)?);
        cursor = cursor.next_line("a limit range")?.1;
    }
    joint.set_limits(ranges)?;
    Ok(cursor)
}

fn parse_range(line: &Line<'_>, tokens: &[&str]) -> Result<Limit, MocapError> {
    let text = tokens.join(" ");
    let bad = || MocapError::syntax(line.index, "a limit range '(min max)'", text.as_str());
    let inner = text
        .trim()
        .strip_prefix('(')
        .and_then(|rest| rest.strip_suffix(')'))
        .ok_or_else(bad)?;
    let bounds: Vec<&str> = inner.split_whitespace().collect();
    let [min, max] = bounds.as_slice() else {
        return Err(bad());
    };
    Ok(Limit::new(line.number(min)?, line.number(max)?))
}

fn parse_hierarchy<'a>(
    cursor: Cursor<'a>,
    skeleton: &mut Skeleton,
) -> Result<Cursor<'a>, MocapError> {
    let (_, cursor) = cursor.expect(":hierarchy")?;
    let (_, mut cursor) = cursor.expect("begin")?;
    loop {
        let (line, next) = cursor.next_line("'end'")?;
        cursor = next;
        if line.is("end") {
            return Ok(cursor);
        }
        if line.args().is_empty() {
            return Err(MocapError::syntax(line.index, "child joint name", "nothing"));
        }
        skeleton.add_joint_hierarchy(line.keyword(), line.args().iter().copied())?;
    }
}
