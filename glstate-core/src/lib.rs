//! Tracking of fixed-function pipeline state, with application that skips redundant device
//! calls.
//!
//! Build a desired [`Snapshot`], then hand it to an [`Applier`] together with the snapshot you
//! believe mirrors the device. Only attribute groups that differ turn into device calls, and the
//! mirror is updated with exactly what was sent:
//!
//! ```
//! use glstate_core::{Applier, DepthFunc, RecordingDevice, Snapshot};
//!
//! let mut device = RecordingDevice::desktop(4);
//! let applier = Applier::default();
//!
//! let baseline = Snapshot::default();
//! let mut current = baseline;
//! applier.force_apply(&mut device, &baseline, Some(&mut current)).unwrap();
//!
//! let mut desired = baseline;
//! desired.set_depth_func(DepthFunc::Never);
//! assert_eq!(applier.apply_relative(&mut device, &desired, &mut current).unwrap(), 1);
//! assert_eq!(applier.apply_relative(&mut device, &desired, &mut current).unwrap(), 0);
//! ```

mod applier;
pub mod device;
mod enums;
mod error;
mod readback;
mod snapshot;
mod validate;

pub use applier::Applier;
pub use device::{Capabilities, Device, DeviceError, DeviceProfile, RecordingDevice};
pub use enums::*;
pub use error::{Error, Result};
pub use snapshot::{AttributeGroup, ColorMask, Snapshot, TextureUnit, MAX_TEXTURE_UNITS};
pub use validate::{validate, ValidationError};
