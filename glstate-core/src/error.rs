use thiserror::Error;

use crate::device::DeviceError;
use crate::snapshot::AttributeGroup;

/// Errors returned by snapshot setters, the applier and readback.
#[derive(Debug, Error)]
pub enum Error {
   #[error("line width must be positive and finite, got {0}")]
   InvalidLineWidth(f32),

   #[error("device reported unknown {parameter} code 0x{code:04X}")]
   UnknownEnum { parameter: &'static str, code: u32 },

   #[error("device reported active texture unit code 0x{0:04X}, which is not a texture unit")]
   UnknownTextureUnit(i32),

   #[error("device call for {group} failed: {source}")]
   Device {
      group: AttributeGroup,
      #[source]
      source: DeviceError,
   },

   #[error("device query failed: {0}")]
   Query(#[source] DeviceError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
