//! The boundary between state tracking and the graphics device.
//!
//! The core never owns a device. It borrows one for the duration of a single operation, and the
//! caller is responsible for making sure the device's context is current on the calling thread.

mod recording;

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::enums::{ColorChannel, GlEnum, TextureTarget};
use crate::snapshot::{TextureUnit, MAX_TEXTURE_UNITS};

pub use recording::{Call, RecordingDevice};

/// The feature subset exposed by a device.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceProfile {
   /// Desktop OpenGL with the fixed-function pipeline available.
   Desktop,
   /// OpenGL ES 2 and WebGL. No line smoothing, no `MIN`/`MAX` blending, no 1D or 3D textures.
   Embedded,
}

impl fmt::Display for DeviceProfile {
   fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
      match self {
         Self::Desktop => write!(f, "desktop"),
         Self::Embedded => write!(f, "embedded"),
      }
   }
}

/// A boolean pipeline feature that can be enabled or disabled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Feature {
   DepthTest,
   CullFace,
   Blend,
   LineSmooth,
   /// A texture target on the active texture unit.
   Texture(TextureTarget),
}

impl Feature {
   pub fn to_gl(self) -> u32 {
      match self {
         Self::DepthTest => glow::DEPTH_TEST,
         Self::CullFace => glow::CULL_FACE,
         Self::Blend => glow::BLEND,
         Self::LineSmooth => glow::LINE_SMOOTH,
         Self::Texture(target) => target.to_gl(),
      }
   }
}

/// An enumerated parameter that can be both set and queried.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EnumParameter {
   DepthFunc,
   CullFace,
   FrontFace,
   BlendEquation,
}

impl EnumParameter {
   /// The code used to query the parameter.
   pub fn query_code(self) -> u32 {
      match self {
         Self::DepthFunc => glow::DEPTH_FUNC,
         Self::CullFace => glow::CULL_FACE_MODE,
         Self::FrontFace => glow::FRONT_FACE,
         Self::BlendEquation => glow::BLEND_EQUATION_RGB,
      }
   }

   pub fn name(self) -> &'static str {
      match self {
         Self::DepthFunc => "depth function",
         Self::CullFace => "cull face",
         Self::FrontFace => "front face",
         Self::BlendEquation => "blend equation",
      }
   }
}

/// Integer-valued queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IntQuery {
   BlendSrc,
   BlendDst,
   /// The active texture unit, as `TEXTURE0 + index`.
   ActiveTexture,
}

impl IntQuery {
   pub fn to_gl(self) -> u32 {
      match self {
         Self::BlendSrc => glow::BLEND_SRC_RGB,
         Self::BlendDst => glow::BLEND_DST_RGB,
         Self::ActiveTexture => glow::ACTIVE_TEXTURE,
      }
   }
}

/// Boolean-valued queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BoolQuery {
   DepthWriteMask,
   ColorWriteMask(ColorChannel),
}

/// Float-valued queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FloatQuery {
   LineWidth,
}

/// A failed device call.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DeviceError {
   #[error("device reported error 0x{code:04X}")]
   Gl { code: u32 },
   #[error("{what} is not supported by the {profile} profile")]
   Unsupported {
      what: &'static str,
      profile: DeviceProfile,
   },
}

/// A graphics device whose fixed-function state can be set and queried.
///
/// Each setter corresponds to one attribute group and counts as one device call.
pub trait Device {
   /// Returns the feature subset this device exposes.
   fn profile(&self) -> DeviceProfile;

   /// Returns the number of texture units the device has.
   fn max_texture_units(&mut self) -> Result<u32, DeviceError>;

   fn set_feature(&mut self, feature: Feature, enabled: bool) -> Result<(), DeviceError>;

   /// Sets an enumerated parameter to a device-native code.
   fn set_enum(&mut self, parameter: EnumParameter, value: u32) -> Result<(), DeviceError>;

   fn set_blend_func(&mut self, src: u32, dst: u32) -> Result<(), DeviceError>;

   fn set_depth_mask(&mut self, writable: bool) -> Result<(), DeviceError>;

   fn set_color_mask(
      &mut self,
      red: bool,
      green: bool,
      blue: bool,
      alpha: bool,
   ) -> Result<(), DeviceError>;

   fn set_line_width(&mut self, width: f32) -> Result<(), DeviceError>;

   /// Makes `unit` (a zero-based index) the active texture unit.
   fn set_active_texture_unit(&mut self, unit: u32) -> Result<(), DeviceError>;

   /// Enables exactly the targets set in `targets` on `unit` and disables the rest.
   ///
   /// The active texture unit must be the same after the call as it was before.
   fn set_texture_targets(&mut self, unit: u32, targets: TextureUnit) -> Result<(), DeviceError>;

   fn query_feature(&mut self, feature: Feature) -> Result<bool, DeviceError>;

   /// Returns the device-native code of an enumerated parameter.
   fn query_enum(&mut self, parameter: EnumParameter) -> Result<u32, DeviceError>;

   fn query_int(&mut self, query: IntQuery) -> Result<i32, DeviceError>;

   fn query_bool(&mut self, query: BoolQuery) -> Result<bool, DeviceError>;

   fn query_float(&mut self, query: FloatQuery) -> Result<f32, DeviceError>;
}

/// What a device supports, captured once per operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Capabilities {
   pub profile: DeviceProfile,
   pub max_texture_units: u32,
}

impl Capabilities {
   /// Queries a device's capabilities.
   pub fn query<D>(device: &mut D) -> Result<Self, DeviceError>
   where
      D: Device + ?Sized,
   {
      Ok(Self {
         profile: device.profile(),
         max_texture_units: device.max_texture_units()?,
      })
   }

   /// Returns the number of texture units that are both present on the device and tracked by
   /// snapshots.
   pub fn tracked_texture_units(&self) -> usize {
      (self.max_texture_units as usize).min(MAX_TEXTURE_UNITS)
   }
}

impl fmt::Display for Capabilities {
   fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
      write!(f, "{} profile, {} texture units", self.profile, self.max_texture_units)
   }
}
