//! An in-memory device that records every call made to it.

use crate::device::{
   BoolQuery, Device, DeviceError, DeviceProfile, EnumParameter, Feature, FloatQuery, IntQuery,
};
use crate::enums::{BlendEquation, ColorChannel, GlEnum, TextureTarget};
use crate::snapshot::TextureUnit;

/// A state-changing call received by a [`RecordingDevice`].
#[derive(Clone, Debug, PartialEq)]
pub enum Call {
   SetFeature(Feature, bool),
   SetEnum(EnumParameter, u32),
   SetBlendFunc(u32, u32),
   SetDepthMask(bool),
   SetColorMask([bool; 4]),
   SetLineWidth(f32),
   SetActiveTextureUnit(u32),
   SetTextureTargets(u32, TextureUnit),
}

/// A device that keeps its state in memory.
///
/// The initial state is the one a freshly created OpenGL context has, which is deliberately
/// different from [`Snapshot::default`][crate::Snapshot::default]. Setters behave like their
/// OpenGL counterparts, including the restrictions of the embedded profile, and every setter call
/// is appended to a log that tests can inspect.
#[derive(Clone, Debug)]
pub struct RecordingDevice {
   profile: DeviceProfile,

   depth_test: bool,
   cull_face_enable: bool,
   blend: bool,
   line_smooth: bool,

   depth_func: u32,
   cull_face: u32,
   front_face: u32,
   blend_equation: u32,
   blend_func: (u32, u32),

   depth_mask: bool,
   color_mask: [bool; 4],
   line_width: f32,

   active_texture_unit: u32,
   texture_units: Vec<TextureUnit>,

   calls: Vec<Call>,
   queries: usize,
   failing_call: Option<usize>,
   failing_query: Option<usize>,
}

impl RecordingDevice {
   /// Creates a device in its power-on state.
   pub fn new(profile: DeviceProfile, texture_units: u32) -> Self {
      Self {
         profile,
         depth_test: false,
         cull_face_enable: false,
         blend: false,
         line_smooth: false,
         depth_func: glow::LESS,
         cull_face: glow::BACK,
         front_face: glow::CCW,
         blend_equation: glow::FUNC_ADD,
         blend_func: (glow::ONE, glow::ZERO),
         depth_mask: true,
         color_mask: [true; 4],
         line_width: 1.0,
         active_texture_unit: 0,
         texture_units: vec![TextureUnit::DISABLED; texture_units as usize],
         calls: Vec::new(),
         queries: 0,
         failing_call: None,
         failing_query: None,
      }
   }

   /// Creates a desktop device with the given number of texture units.
   pub fn desktop(texture_units: u32) -> Self {
      Self::new(DeviceProfile::Desktop, texture_units)
   }

   /// Creates an embedded device with the given number of texture units.
   pub fn embedded(texture_units: u32) -> Self {
      Self::new(DeviceProfile::Embedded, texture_units)
   }

   /// Returns every state-changing call made so far, including ones that failed.
   pub fn calls(&self) -> &[Call] {
      &self.calls
   }

   /// Returns and forgets the logged calls.
   pub fn take_calls(&mut self) -> Vec<Call> {
      std::mem::take(&mut self.calls)
   }

   /// Returns the number of queries made so far.
   pub fn query_count(&self) -> usize {
      self.queries
   }

   /// Makes the setter call with the given zero-based index (counted over the whole log) fail
   /// with `INVALID_OPERATION` without changing any state.
   pub fn fail_call(&mut self, index: usize) {
      self.failing_call = Some(index);
   }

   /// Makes the query with the given zero-based index fail with `INVALID_OPERATION`.
   pub fn fail_query(&mut self, index: usize) {
      self.failing_query = Some(index);
   }

   /// Returns the zero-based index of the active texture unit.
   pub fn active_texture_unit(&self) -> u32 {
      self.active_texture_unit
   }

   /// Returns the enabled targets on a texture unit.
   pub fn texture_unit(&self, unit: u32) -> Option<TextureUnit> {
      self.texture_units.get(unit as usize).copied()
   }

   fn record(&mut self, call: Call) -> Result<(), DeviceError> {
      let index = self.calls.len();
      self.calls.push(call);
      if self.failing_call == Some(index) {
         return Err(DeviceError::Gl {
            code: glow::INVALID_OPERATION,
         });
      }
      Ok(())
   }

   fn query(&mut self) -> Result<(), DeviceError> {
      let index = self.queries;
      self.queries += 1;
      if self.failing_query == Some(index) {
         return Err(DeviceError::Gl {
            code: glow::INVALID_OPERATION,
         });
      }
      Ok(())
   }

   fn unsupported(&self, what: &'static str) -> DeviceError {
      DeviceError::Unsupported {
         what,
         profile: self.profile,
      }
   }

   /// Returns whether the feature exists on this device's profile. Enabling a feature that does
   /// not exist is an error; disabling it is a no-op, since it's never on.
   fn check_feature(&self, feature: Feature, enabled: bool) -> Result<bool, DeviceError> {
      let what = match feature {
         Feature::LineSmooth => "line smoothing",
         Feature::Texture(target) if !target.is_embedded_supported() => texture_target_name(target),
         _ => return Ok(true),
      };
      match (self.profile, enabled) {
         (DeviceProfile::Desktop, _) => Ok(true),
         (DeviceProfile::Embedded, false) => Ok(false),
         (DeviceProfile::Embedded, true) => Err(self.unsupported(what)),
      }
   }

   fn check_unit(&self, unit: u32) -> Result<usize, DeviceError> {
      if (unit as usize) < self.texture_units.len() {
         Ok(unit as usize)
      } else {
         Err(DeviceError::Gl {
            code: glow::INVALID_ENUM,
         })
      }
   }
}

fn texture_target_name(target: TextureTarget) -> &'static str {
   match target {
      TextureTarget::Texture1D => "1D texturing",
      TextureTarget::Texture2D => "2D texturing",
      TextureTarget::Texture3D => "3D texturing",
      TextureTarget::CubeMap => "cube map texturing",
   }
}

fn is_valid_code<T: GlEnum>(code: u32) -> bool {
   T::from_gl(code).is_some()
}

const INVALID_ENUM: DeviceError = DeviceError::Gl {
   code: glow::INVALID_ENUM,
};

impl Device for RecordingDevice {
   fn profile(&self) -> DeviceProfile {
      self.profile
   }

   fn max_texture_units(&mut self) -> Result<u32, DeviceError> {
      self.query()?;
      Ok(self.texture_units.len() as u32)
   }

   fn set_feature(&mut self, feature: Feature, enabled: bool) -> Result<(), DeviceError> {
      self.record(Call::SetFeature(feature, enabled))?;
      if !self.check_feature(feature, enabled)? {
         return Ok(());
      }
      match feature {
         Feature::DepthTest => self.depth_test = enabled,
         Feature::CullFace => self.cull_face_enable = enabled,
         Feature::Blend => self.blend = enabled,
         Feature::LineSmooth => self.line_smooth = enabled,
         Feature::Texture(target) => {
            let unit = self.check_unit(self.active_texture_unit)?;
            self.texture_units[unit].set_enabled(target, enabled);
         }
      }
      Ok(())
   }

   fn set_enum(&mut self, parameter: EnumParameter, value: u32) -> Result<(), DeviceError> {
      use crate::enums::{CullFace, DepthFunc, FrontFace};

      self.record(Call::SetEnum(parameter, value))?;
      let valid = match parameter {
         EnumParameter::DepthFunc => is_valid_code::<DepthFunc>(value),
         EnumParameter::CullFace => is_valid_code::<CullFace>(value),
         EnumParameter::FrontFace => is_valid_code::<FrontFace>(value),
         EnumParameter::BlendEquation => is_valid_code::<BlendEquation>(value),
      };
      if !valid {
         return Err(INVALID_ENUM);
      }
      match parameter {
         EnumParameter::DepthFunc => self.depth_func = value,
         EnumParameter::CullFace => self.cull_face = value,
         EnumParameter::FrontFace => self.front_face = value,
         EnumParameter::BlendEquation => {
            let equation = BlendEquation::from_gl(value).ok_or(INVALID_ENUM)?;
            if self.profile == DeviceProfile::Embedded && !equation.is_embedded_supported() {
               return Err(self.unsupported("min/max blending"));
            }
            self.blend_equation = value;
         }
      }
      Ok(())
   }

   fn set_blend_func(&mut self, src: u32, dst: u32) -> Result<(), DeviceError> {
      use crate::enums::BlendFactor;

      self.record(Call::SetBlendFunc(src, dst))?;
      if !is_valid_code::<BlendFactor>(src) || !is_valid_code::<BlendFactor>(dst) {
         return Err(INVALID_ENUM);
      }
      self.blend_func = (src, dst);
      Ok(())
   }

   fn set_depth_mask(&mut self, writable: bool) -> Result<(), DeviceError> {
      self.record(Call::SetDepthMask(writable))?;
      self.depth_mask = writable;
      Ok(())
   }

   fn set_color_mask(
      &mut self,
      red: bool,
      green: bool,
      blue: bool,
      alpha: bool,
   ) -> Result<(), DeviceError> {
      let mask = [red, green, blue, alpha];
      self.record(Call::SetColorMask(mask))?;
      self.color_mask = mask;
      Ok(())
   }

   fn set_line_width(&mut self, width: f32) -> Result<(), DeviceError> {
      self.record(Call::SetLineWidth(width))?;
      if !(width > 0.0) {
         return Err(DeviceError::Gl {
            code: glow::INVALID_VALUE,
         });
      }
      self.line_width = width;
      Ok(())
   }

   fn set_active_texture_unit(&mut self, unit: u32) -> Result<(), DeviceError> {
      self.record(Call::SetActiveTextureUnit(unit))?;
      self.check_unit(unit)?;
      self.active_texture_unit = unit;
      Ok(())
   }

   fn set_texture_targets(&mut self, unit: u32, targets: TextureUnit) -> Result<(), DeviceError> {
      self.record(Call::SetTextureTargets(unit, targets))?;
      let index = self.check_unit(unit)?;
      if self.profile == DeviceProfile::Embedded {
         let mut unsupported = targets.enabled_targets().filter(|t| !t.is_embedded_supported());
         if let Some(target) = unsupported.next() {
            return Err(self.unsupported(texture_target_name(target)));
         }
      }
      self.texture_units[index] = targets;
      Ok(())
   }

   fn query_feature(&mut self, feature: Feature) -> Result<bool, DeviceError> {
      self.query()?;
      if !self.check_feature(feature, false)? {
         return Ok(false);
      }
      Ok(match feature {
         Feature::DepthTest => self.depth_test,
         Feature::CullFace => self.cull_face_enable,
         Feature::Blend => self.blend,
         Feature::LineSmooth => self.line_smooth,
         Feature::Texture(target) => {
            let unit = self.check_unit(self.active_texture_unit)?;
            self.texture_units[unit].is_enabled(target)
         }
      })
   }

   fn query_enum(&mut self, parameter: EnumParameter) -> Result<u32, DeviceError> {
      self.query()?;
      Ok(match parameter {
         EnumParameter::DepthFunc => self.depth_func,
         EnumParameter::CullFace => self.cull_face,
         EnumParameter::FrontFace => self.front_face,
         EnumParameter::BlendEquation => self.blend_equation,
      })
   }

   fn query_int(&mut self, query: IntQuery) -> Result<i32, DeviceError> {
      self.query()?;
      Ok(match query {
         IntQuery::BlendSrc => self.blend_func.0 as i32,
         IntQuery::BlendDst => self.blend_func.1 as i32,
         IntQuery::ActiveTexture => (glow::TEXTURE0 + self.active_texture_unit) as i32,
      })
   }

   fn query_bool(&mut self, query: BoolQuery) -> Result<bool, DeviceError> {
      self.query()?;
      Ok(match query {
         BoolQuery::DepthWriteMask => self.depth_mask,
         BoolQuery::ColorWriteMask(channel) => self.color_mask[ColorChannel::index(channel)],
      })
   }

   fn query_float(&mut self, query: FloatQuery) -> Result<f32, DeviceError> {
      self.query()?;
      Ok(match query {
         FloatQuery::LineWidth => self.line_width,
      })
   }
}
