//! mocap-core: ASF/AMC motion-capture parsing and forward kinematics.
//!
//! The skeleton parser turns a skeleton-definition (ASF) file into a
//! [`Skeleton`]; the motion parser reads a motion (AMC) file against that
//! skeleton into a [`Motion`]; [`Kinematics`] derives bind-pose and per-frame
//! world positions from both. Rendering, file handling and logger setup are
//! left to callers.
//!
//! ```no_run
//! use mocap_core::{parse_motion, parse_skeleton, Kinematics};
//!
//! # fn run(asf: &str, amc: &str) -> mocap_core::Result<()> {
//! let skeleton = parse_skeleton(asf)?;
//! let motion = parse_motion(amc, &skeleton)?;
//! let kinematics = Kinematics::new(&skeleton).with_motion(&motion);
//! let pose = kinematics.posed_positions(0)?;
//! println!("root at {:?}", pose.position("root")?);
//! # Ok(())
//! # }
//! ```

pub mod amc;
pub mod asf;
pub mod config;
pub mod cursor;
pub mod error;
pub mod kinematics;
pub mod motion;
pub mod skeleton;

pub use amc::{parse_motion, MotionParser};
pub use asf::{parse_skeleton, SkeletonParser};
pub use config::{Config, Delimiter, RootMotion};
pub use error::{ErrorKind, MocapError};
pub use kinematics::{euler_rotation, Kinematics, Pose};
pub use motion::{Frame, Motion};
pub use skeleton::{Axis, EulerOrder, Joint, Limit, Skeleton, Units, ROOT};

/// Result type used throughout the crate.
pub type Result<T> = core::result::Result<T, MocapError>;
