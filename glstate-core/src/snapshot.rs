//! Snapshots of fixed-function pipeline state.
//!
//! A [`Snapshot`] is plain data. It knows nothing about the device; changes only reach the
//! device through the [`Applier`][crate::Applier].

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::enums::{
   BlendEquation, BlendFactor, ColorChannel, CullFace, DepthFunc, FrontFace, TextureTarget,
};
use crate::error::{Error, Result};

/// The number of texture unit records every snapshot carries. Devices with more units only have
/// their first `MAX_TEXTURE_UNITS` units tracked.
pub const MAX_TEXTURE_UNITS: usize = 12;

/// Per-channel color write mask.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColorMask {
   pub red: bool,
   pub green: bool,
   pub blue: bool,
   pub alpha: bool,
}

impl ColorMask {
   pub const ALL: Self = Self::new(true, true, true, true);
   pub const NONE: Self = Self::new(false, false, false, false);

   pub const fn new(red: bool, green: bool, blue: bool, alpha: bool) -> Self {
      Self {
         red,
         green,
         blue,
         alpha,
      }
   }

   pub fn channel(&self, channel: ColorChannel) -> bool {
      match channel {
         ColorChannel::Red => self.red,
         ColorChannel::Green => self.green,
         ColorChannel::Blue => self.blue,
         ColorChannel::Alpha => self.alpha,
      }
   }

   pub fn set_channel(&mut self, channel: ColorChannel, enabled: bool) {
      match channel {
         ColorChannel::Red => self.red = enabled,
         ColorChannel::Green => self.green = enabled,
         ColorChannel::Blue => self.blue = enabled,
         ColorChannel::Alpha => self.alpha = enabled,
      }
   }
}

impl Default for ColorMask {
   fn default() -> Self {
      Self::ALL
   }
}

/// The dimensional targets enabled on a single texture unit.
///
/// The device only ever samples from one target per unit, so a consistent record has at most one
/// flag set. [`TextureUnit::only`] and [`TextureUnit::set_target`] keep it that way;
/// [`TextureUnit::set_enabled`] does not, and records built with it should go through
/// [`validate`][crate::validate] before being applied.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextureUnit {
   #[serde(default)]
   pub texture_1d: bool,
   #[serde(default)]
   pub texture_2d: bool,
   #[serde(default)]
   pub texture_3d: bool,
   #[serde(default)]
   pub cube_map: bool,
}

impl TextureUnit {
   /// A unit with no target enabled.
   pub const DISABLED: Self = Self {
      texture_1d: false,
      texture_2d: false,
      texture_3d: false,
      cube_map: false,
   };

   /// A unit with exactly one target enabled.
   pub fn only(target: TextureTarget) -> Self {
      let mut unit = Self::DISABLED;
      unit.set_enabled(target, true);
      unit
   }

   pub fn is_enabled(&self, target: TextureTarget) -> bool {
      match target {
         TextureTarget::Texture1D => self.texture_1d,
         TextureTarget::Texture2D => self.texture_2d,
         TextureTarget::Texture3D => self.texture_3d,
         TextureTarget::CubeMap => self.cube_map,
      }
   }

   /// Sets a single flag without touching the others.
   pub fn set_enabled(&mut self, target: TextureTarget, enabled: bool) {
      match target {
         TextureTarget::Texture1D => self.texture_1d = enabled,
         TextureTarget::Texture2D => self.texture_2d = enabled,
         TextureTarget::Texture3D => self.texture_3d = enabled,
         TextureTarget::CubeMap => self.cube_map = enabled,
      }
   }

   /// Makes `target` the only enabled target, or disables the unit if `target` is `None`.
   pub fn set_target(&mut self, target: Option<TextureTarget>) {
      *self = target.map(Self::only).unwrap_or(Self::DISABLED);
   }

   /// Returns the target the device would sample from.
   pub fn target(&self) -> Option<TextureTarget> {
      TextureTarget::BY_PRIORITY.iter().copied().find(|&target| self.is_enabled(target))
   }

   /// Returns the enabled targets, highest priority first.
   pub fn enabled_targets(&self) -> impl Iterator<Item = TextureTarget> + '_ {
      TextureTarget::BY_PRIORITY.iter().copied().filter(move |&target| self.is_enabled(target))
   }
}

/// One logically atomic piece of state, applied with a single device call.
///
/// The variants are listed in the order the applier processes them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AttributeGroup {
   DepthTestEnable,
   DepthFunc,
   CullFaceEnable,
   CullFace,
   FrontFace,
   BlendEnable,
   BlendEquation,
   BlendFunc,
   DepthMask,
   ColorMask,
   LineWidth,
   LineSmoothing,
   ActiveTextureUnit,
   TextureUnit(u32),
}

impl fmt::Display for AttributeGroup {
   fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
      match self {
         Self::DepthTestEnable => write!(f, "depth test enable"),
         Self::DepthFunc => write!(f, "depth function"),
         Self::CullFaceEnable => write!(f, "face culling enable"),
         Self::CullFace => write!(f, "culled face"),
         Self::FrontFace => write!(f, "front face order"),
         Self::BlendEnable => write!(f, "blending enable"),
         Self::BlendEquation => write!(f, "blend equation"),
         Self::BlendFunc => write!(f, "blend function"),
         Self::DepthMask => write!(f, "depth mask"),
         Self::ColorMask => write!(f, "color mask"),
         Self::LineWidth => write!(f, "line width"),
         Self::LineSmoothing => write!(f, "line smoothing"),
         Self::ActiveTextureUnit => write!(f, "active texture unit"),
         Self::TextureUnit(unit) => write!(f, "texture unit {} targets", unit),
      }
   }
}

/// A complete description of the tracked pipeline state at one instant.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
   pub(crate) depth_test: bool,
   pub(crate) depth_func: DepthFunc,

   pub(crate) cull_face_enable: bool,
   pub(crate) cull_face: CullFace,
   pub(crate) front_face: FrontFace,

   pub(crate) blend: bool,
   pub(crate) blend_equation: BlendEquation,
   pub(crate) blend_func: (BlendFactor, BlendFactor),

   pub(crate) depth_mask: bool,
   pub(crate) color_mask: ColorMask,

   #[serde(deserialize_with = "deserialize_line_width")]
   pub(crate) line_width: f32,
   pub(crate) line_smoothing: bool,

   pub(crate) active_texture_unit: u32,
   pub(crate) texture_units: [TextureUnit; MAX_TEXTURE_UNITS],
}

pub(crate) fn is_valid_line_width(width: f32) -> bool {
   width.is_finite() && width > 0.0
}

fn deserialize_line_width<'de, D>(deserializer: D) -> std::result::Result<f32, D::Error>
where
   D: Deserializer<'de>,
{
   let width = f32::deserialize(deserializer)?;
   if is_valid_line_width(width) {
      Ok(width)
   } else {
      Err(serde::de::Error::custom(Error::InvalidLineWidth(width)))
   }
}

impl Default for Snapshot {
   /// The baseline state: depth testing with `Less`, no culling (back faces, counter-clockwise
   /// front), alpha blending, all masks writable, 2px lines without smoothing, and texture unit 0
   /// active with every target disabled.
   fn default() -> Self {
      Self {
         depth_test: true,
         depth_func: DepthFunc::Less,
         cull_face_enable: false,
         cull_face: CullFace::Back,
         front_face: FrontFace::Ccw,
         blend: true,
         blend_equation: BlendEquation::Add,
         blend_func: (BlendFactor::SrcAlpha, BlendFactor::OneMinusSrcAlpha),
         depth_mask: true,
         color_mask: ColorMask::ALL,
         line_width: 2.0,
         line_smoothing: false,
         active_texture_unit: 0,
         texture_units: [TextureUnit::DISABLED; MAX_TEXTURE_UNITS],
      }
   }
}

impl Snapshot {
   pub fn new() -> Self {
      Self::default()
   }

   pub fn depth_test_enabled(&self) -> bool {
      self.depth_test
   }

   pub fn set_depth_test_enabled(&mut self, enabled: bool) {
      self.depth_test = enabled;
   }

   pub fn depth_func(&self) -> DepthFunc {
      self.depth_func
   }

   pub fn set_depth_func(&mut self, func: DepthFunc) {
      self.depth_func = func;
   }

   pub fn cull_face_enabled(&self) -> bool {
      self.cull_face_enable
   }

   pub fn set_cull_face_enabled(&mut self, enabled: bool) {
      self.cull_face_enable = enabled;
   }

   pub fn cull_face(&self) -> CullFace {
      self.cull_face
   }

   pub fn set_cull_face(&mut self, face: CullFace) {
      self.cull_face = face;
   }

   pub fn front_face(&self) -> FrontFace {
      self.front_face
   }

   pub fn set_front_face(&mut self, order: FrontFace) {
      self.front_face = order;
   }

   pub fn blend_enabled(&self) -> bool {
      self.blend
   }

   pub fn set_blend_enabled(&mut self, enabled: bool) {
      self.blend = enabled;
   }

   pub fn blend_equation(&self) -> BlendEquation {
      self.blend_equation
   }

   pub fn set_blend_equation(&mut self, equation: BlendEquation) {
      self.blend_equation = equation;
   }

   /// Returns the `(source, destination)` blending factors.
   pub fn blend_func(&self) -> (BlendFactor, BlendFactor) {
      self.blend_func
   }

   pub fn set_blend_func(&mut self, src: BlendFactor, dst: BlendFactor) {
      self.blend_func = (src, dst);
   }

   pub fn depth_mask(&self) -> bool {
      self.depth_mask
   }

   pub fn set_depth_mask(&mut self, writable: bool) {
      self.depth_mask = writable;
   }

   pub fn color_mask(&self) -> ColorMask {
      self.color_mask
   }

   pub fn set_color_mask(&mut self, mask: ColorMask) {
      self.color_mask = mask;
   }

   pub fn line_width(&self) -> f32 {
      self.line_width
   }

   /// Sets the rasterized line width. The width must be positive and finite.
   pub fn set_line_width(&mut self, width: f32) -> Result<()> {
      if !is_valid_line_width(width) {
         return Err(Error::InvalidLineWidth(width));
      }
      self.line_width = width;
      Ok(())
   }

   pub fn line_smoothing(&self) -> bool {
      self.line_smoothing
   }

   pub fn set_line_smoothing(&mut self, enabled: bool) {
      self.line_smoothing = enabled;
   }

   pub fn active_texture_unit(&self) -> u32 {
      self.active_texture_unit
   }

   pub fn set_active_texture_unit(&mut self, unit: u32) {
      self.active_texture_unit = unit;
   }

   /// Returns the state of every tracked texture unit.
   pub fn texture_units(&self) -> &[TextureUnit; MAX_TEXTURE_UNITS] {
      &self.texture_units
   }

   /// Returns the state of a single texture unit, or `None` if `unit` is not tracked.
   pub fn texture_unit(&self, unit: usize) -> Option<&TextureUnit> {
      self.texture_units.get(unit)
   }

   /// Returns a mutable reference to a texture unit, or `None` if `unit` is not tracked.
   pub fn texture_unit_mut(&mut self, unit: usize) -> Option<&mut TextureUnit> {
      self.texture_units.get_mut(unit)
   }

   /// Lists every attribute group whose value differs between `self` and `other`, in the order
   /// the applier processes them.
   pub fn differing_groups(&self, other: &Snapshot) -> Vec<AttributeGroup> {
      let scalar = [
         (AttributeGroup::DepthTestEnable, self.depth_test != other.depth_test),
         (AttributeGroup::DepthFunc, self.depth_func != other.depth_func),
         (AttributeGroup::CullFaceEnable, self.cull_face_enable != other.cull_face_enable),
         (AttributeGroup::CullFace, self.cull_face != other.cull_face),
         (AttributeGroup::FrontFace, self.front_face != other.front_face),
         (AttributeGroup::BlendEnable, self.blend != other.blend),
         (AttributeGroup::BlendEquation, self.blend_equation != other.blend_equation),
         (AttributeGroup::BlendFunc, self.blend_func != other.blend_func),
         (AttributeGroup::DepthMask, self.depth_mask != other.depth_mask),
         (AttributeGroup::ColorMask, self.color_mask != other.color_mask),
         (AttributeGroup::LineWidth, self.line_width != other.line_width),
         (AttributeGroup::LineSmoothing, self.line_smoothing != other.line_smoothing),
         (AttributeGroup::ActiveTextureUnit, self.active_texture_unit != other.active_texture_unit),
      ];
      let units = self
         .texture_units
         .iter()
         .zip(other.texture_units.iter())
         .enumerate()
         .map(|(unit, (a, b))| (AttributeGroup::TextureUnit(unit as u32), a != b));
      scalar
         .into_iter()
         .chain(units)
         .filter(|&(_, differs)| differs)
         .map(|(group, _)| group)
         .collect()
   }
}
