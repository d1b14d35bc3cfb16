#[cfg(not(target_arch = "wasm32"))]
mod context;

use std::rc::Rc;

use glow::HasContext;
use glstate_core::device::{BoolQuery, EnumParameter, Feature, FloatQuery, IntQuery};
use glstate_core::{Device, DeviceError, DeviceProfile, GlEnum, TextureTarget, TextureUnit};
use smallvec::SmallVec;

#[cfg(not(target_arch = "wasm32"))]
pub use crate::context::HeadlessContext;

/// The number of fixed-function texture units. Only meaningful on compatibility contexts.
const MAX_TEXTURE_UNITS: u32 = 0x84E2;

/// The kind of context to ask for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextProfile {
   /// Desktop OpenGL with the fixed-function pipeline. Falls back to OpenGL ES 2 if that is not
   /// available.
   Compatibility,
   /// OpenGL ES 2.
   Embedded,
}

impl Default for ContextProfile {
   /// Texture target enables only exist in compatibility contexts, so that's the default.
   fn default() -> Self {
      Self::Compatibility
   }
}

/// Determines the device profile from a `GL_VERSION` string.
pub fn profile_from_version(version: &str) -> DeviceProfile {
   if version.starts_with("OpenGL ES") || version.starts_with("WebGL") {
      DeviceProfile::Embedded
   } else {
      DeviceProfile::Desktop
   }
}

/// A [`Device`] backed by an OpenGL context.
///
/// Every setter checks `glGetError` after issuing its calls. The context must be current on the
/// calling thread for as long as the device is used.
pub struct GlowDevice {
   gl: Rc<glow::Context>,
   profile: DeviceProfile,
}

impl GlowDevice {
   /// Creates a device, detecting the profile from the context's version string.
   pub fn new(gl: Rc<glow::Context>) -> Self {
      let version = unsafe { gl.get_parameter_string(glow::VERSION) };
      let profile = profile_from_version(&version);
      log::info!("OpenGL version: {} ({} profile)", version, profile);
      Self::with_profile(gl, profile)
   }

   /// Creates a device with an explicitly chosen profile.
   pub fn with_profile(gl: Rc<glow::Context>, profile: DeviceProfile) -> Self {
      let device = Self { gl, profile };
      // Errors left over from whoever used the context before must not be blamed on us.
      if let Err(error) = device.check() {
         log::warn!("discarding pending OpenGL error: {}", error);
      }
      device
   }

   /// Returns the first pending error, if any, and clears the rest.
   fn check(&self) -> Result<(), DeviceError> {
      let code = unsafe { self.gl.get_error() };
      if code == glow::NO_ERROR {
         return Ok(());
      }
      while unsafe { self.gl.get_error() } != glow::NO_ERROR {}
      Err(DeviceError::Gl { code })
   }

   /// Returns whether `feature` exists on this profile. Enabling a missing feature is an error,
   /// while disabling it needs no call at all.
   fn supports(&self, feature: Feature, enabled: bool) -> Result<bool, DeviceError> {
      if self.profile == DeviceProfile::Desktop {
         return Ok(true);
      }
      let what = match feature {
         Feature::LineSmooth => "line smoothing",
         Feature::Texture(TextureTarget::Texture1D) => "1D texturing",
         Feature::Texture(TextureTarget::Texture3D) => "3D texturing",
         _ => return Ok(true),
      };
      if enabled {
         Err(DeviceError::Unsupported {
            what,
            profile: self.profile,
         })
      } else {
         Ok(false)
      }
   }

   fn toggle(&self, capability: u32, enabled: bool) {
      unsafe {
         if enabled {
            self.gl.enable(capability);
         } else {
            self.gl.disable(capability);
         }
      }
   }
}

impl Device for GlowDevice {
   fn profile(&self) -> DeviceProfile {
      self.profile
   }

   fn max_texture_units(&mut self) -> Result<u32, DeviceError> {
      let parameter = match self.profile {
         DeviceProfile::Desktop => MAX_TEXTURE_UNITS,
         DeviceProfile::Embedded => glow::MAX_COMBINED_TEXTURE_IMAGE_UNITS,
      };
      let units = unsafe { self.gl.get_parameter_i32(parameter) };
      self.check()?;
      Ok(units.max(0) as u32)
   }

   fn set_feature(&mut self, feature: Feature, enabled: bool) -> Result<(), DeviceError> {
      if !self.supports(feature, enabled)? {
         return Ok(());
      }
      self.toggle(feature.to_gl(), enabled);
      self.check()
   }

   fn set_enum(&mut self, parameter: EnumParameter, value: u32) -> Result<(), DeviceError> {
      unsafe {
         match parameter {
            EnumParameter::DepthFunc => self.gl.depth_func(value),
            EnumParameter::CullFace => self.gl.cull_face(value),
            EnumParameter::FrontFace => self.gl.front_face(value),
            EnumParameter::BlendEquation => self.gl.blend_equation(value),
         }
      }
      self.check()
   }

   fn set_blend_func(&mut self, src: u32, dst: u32) -> Result<(), DeviceError> {
      unsafe { self.gl.blend_func(src, dst) };
      self.check()
   }

   fn set_depth_mask(&mut self, writable: bool) -> Result<(), DeviceError> {
      unsafe { self.gl.depth_mask(writable) };
      self.check()
   }

   fn set_color_mask(
      &mut self,
      red: bool,
      green: bool,
      blue: bool,
      alpha: bool,
   ) -> Result<(), DeviceError> {
      unsafe { self.gl.color_mask(red, green, blue, alpha) };
      self.check()
   }

   fn set_line_width(&mut self, width: f32) -> Result<(), DeviceError> {
      unsafe { self.gl.line_width(width) };
      self.check()
   }

   fn set_active_texture_unit(&mut self, unit: u32) -> Result<(), DeviceError> {
      unsafe { self.gl.active_texture(glow::TEXTURE0 + unit) };
      self.check()
   }

   fn set_texture_targets(&mut self, unit: u32, targets: TextureUnit) -> Result<(), DeviceError> {
      let mut toggles = SmallVec::<[(u32, bool); 4]>::new();
      for target in TextureTarget::BY_PRIORITY {
         let enabled = targets.is_enabled(target);
         if self.supports(Feature::Texture(target), enabled)? {
            toggles.push((target.to_gl(), enabled));
         }
      }
      unsafe {
         let previous = self.gl.get_parameter_i32(glow::ACTIVE_TEXTURE) as u32;
         self.gl.active_texture(glow::TEXTURE0 + unit);
         for (capability, enabled) in toggles {
            self.toggle(capability, enabled);
         }
         self.gl.active_texture(previous);
      }
      self.check()
   }

   fn query_feature(&mut self, feature: Feature) -> Result<bool, DeviceError> {
      if !self.supports(feature, false)? {
         return Ok(false);
      }
      let enabled = unsafe { self.gl.is_enabled(feature.to_gl()) };
      self.check()?;
      Ok(enabled)
   }

   fn query_enum(&mut self, parameter: EnumParameter) -> Result<u32, DeviceError> {
      let value = unsafe { self.gl.get_parameter_i32(parameter.query_code()) };
      self.check()?;
      Ok(value as u32)
   }

   fn query_int(&mut self, query: IntQuery) -> Result<i32, DeviceError> {
      let value = unsafe { self.gl.get_parameter_i32(query.to_gl()) };
      self.check()?;
      Ok(value)
   }

   fn query_bool(&mut self, query: BoolQuery) -> Result<bool, DeviceError> {
      let value = unsafe {
         match query {
            BoolQuery::DepthWriteMask => self.gl.get_parameter_i32(glow::DEPTH_WRITEMASK),
            BoolQuery::ColorWriteMask(channel) => {
               let mut mask = [0; 4];
               self.gl.get_parameter_i32_slice(glow::COLOR_WRITEMASK, &mut mask);
               mask[channel.index()]
            }
         }
      };
      self.check()?;
      Ok(value != 0)
   }

   fn query_float(&mut self, query: FloatQuery) -> Result<f32, DeviceError> {
      let value = unsafe {
         match query {
            FloatQuery::LineWidth => {
               let mut width = [0.0];
               self.gl.get_parameter_f32_slice(glow::LINE_WIDTH, &mut width);
               width[0]
            }
         }
      };
      self.check()?;
      Ok(value)
   }
}
