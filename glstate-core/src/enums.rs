//! Closed enumerations for every symbolic pipeline value, along with their mapping to and from
//! device-native codes.
//!
//! `GlEnum` is the only place where the crate speaks the device's vocabulary. Everything else
//! (snapshots, the applier, validation) works with the enums below.

use serde::{Deserialize, Serialize};
use strum::{EnumIter, IntoStaticStr};

/// Conversion between an enum and its device-native code.
pub trait GlEnum: Sized + Copy {
   /// Returns the device-native code for this value.
   fn to_gl(self) -> u32;

   /// Maps a device-native code back to a value. Returns `None` for codes outside the enum.
   fn from_gl(code: u32) -> Option<Self>;
}

macro_rules! gl_enum {
   (
      $(#[$attr:meta])*
      pub enum $name:ident {
         $(
            $(#[$variant_attr:meta])*
            $variant:ident = $code:path
         ),+ $(,)?
      }
   ) => {
      $(#[$attr])*
      #[derive(
         Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, IntoStaticStr, Serialize, Deserialize,
      )]
      #[serde(rename_all = "snake_case")]
      #[strum(serialize_all = "snake_case")]
      pub enum $name {
         $(
            $(#[$variant_attr])*
            $variant,
         )+
      }

      impl GlEnum for $name {
         fn to_gl(self) -> u32 {
            match self {
               $(Self::$variant => $code,)+
            }
         }

         fn from_gl(code: u32) -> Option<Self> {
            match code {
               $($code => Some(Self::$variant),)+
               _ => None,
            }
         }
      }
   };
}

gl_enum! {
   /// The comparison used by the depth test.
   pub enum DepthFunc {
      Never = glow::NEVER,
      Less = glow::LESS,
      Equal = glow::EQUAL,
      LessOrEqual = glow::LEQUAL,
      Greater = glow::GREATER,
      NotEqual = glow::NOTEQUAL,
      GreaterOrEqual = glow::GEQUAL,
      Always = glow::ALWAYS,
   }
}

impl Default for DepthFunc {
   fn default() -> Self {
      Self::Less
   }
}

gl_enum! {
   /// Which faces get discarded when face culling is enabled.
   pub enum CullFace {
      Front = glow::FRONT,
      Back = glow::BACK,
   }
}

impl Default for CullFace {
   fn default() -> Self {
      Self::Back
   }
}

gl_enum! {
   /// The winding order that makes a polygon front-facing.
   pub enum FrontFace {
      /// Counter-clockwise.
      Ccw = glow::CCW,
      /// Clockwise.
      Cw = glow::CW,
   }
}

impl Default for FrontFace {
   fn default() -> Self {
      Self::Ccw
   }
}

gl_enum! {
   /// How source and destination colors are combined.
   pub enum BlendEquation {
      Add = glow::FUNC_ADD,
      Subtract = glow::FUNC_SUBTRACT,
      ReverseSubtract = glow::FUNC_REVERSE_SUBTRACT,
      /// Not available on embedded profiles.
      Min = glow::MIN,
      /// Not available on embedded profiles.
      Max = glow::MAX,
   }
}

impl BlendEquation {
   /// Returns whether the equation exists on embedded profiles.
   pub fn is_embedded_supported(self) -> bool {
      !matches!(self, Self::Min | Self::Max)
   }
}

impl Default for BlendEquation {
   fn default() -> Self {
      Self::Add
   }
}

gl_enum! {
   /// A blending factor, used for both the source and the destination side.
   pub enum BlendFactor {
      Zero = glow::ZERO,
      One = glow::ONE,
      SrcColor = glow::SRC_COLOR,
      OneMinusSrcColor = glow::ONE_MINUS_SRC_COLOR,
      DstColor = glow::DST_COLOR,
      OneMinusDstColor = glow::ONE_MINUS_DST_COLOR,
      SrcAlpha = glow::SRC_ALPHA,
      OneMinusSrcAlpha = glow::ONE_MINUS_SRC_ALPHA,
      DstAlpha = glow::DST_ALPHA,
      OneMinusDstAlpha = glow::ONE_MINUS_DST_ALPHA,
      SrcAlphaSaturate = glow::SRC_ALPHA_SATURATE,
   }
}

gl_enum! {
   /// A dimensional texture target that can be enabled on a texture unit.
   pub enum TextureTarget {
      /// Not available on embedded profiles.
      #[serde(rename = "texture_1d")]
      #[strum(serialize = "texture_1d")]
      Texture1D = glow::TEXTURE_1D,
      #[serde(rename = "texture_2d")]
      #[strum(serialize = "texture_2d")]
      Texture2D = glow::TEXTURE_2D,
      /// Not available on embedded profiles.
      #[serde(rename = "texture_3d")]
      #[strum(serialize = "texture_3d")]
      Texture3D = glow::TEXTURE_3D,
      CubeMap = glow::TEXTURE_CUBE_MAP,
   }
}

impl TextureTarget {
   /// All targets, from the highest priority to the lowest. When more than one target is enabled
   /// on a unit, the device samples from the first enabled one in this list.
   pub const BY_PRIORITY: [TextureTarget; 4] =
      [Self::CubeMap, Self::Texture3D, Self::Texture2D, Self::Texture1D];

   /// Returns whether the target exists on embedded profiles.
   pub fn is_embedded_supported(self) -> bool {
      matches!(self, Self::Texture2D | Self::CubeMap)
   }
}

/// One channel of the color write mask.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ColorChannel {
   Red,
   Green,
   Blue,
   Alpha,
}

impl ColorChannel {
   /// The channel's position in a device color mask query.
   pub fn index(self) -> usize {
      self as usize
   }
}

#[cfg(test)]
mod tests {
   use strum::IntoEnumIterator;

   use super::*;

   fn assert_bijective<T>()
   where
      T: GlEnum + IntoEnumIterator + PartialEq + std::fmt::Debug,
   {
      for value in T::iter() {
         assert_eq!(T::from_gl(value.to_gl()), Some(value));
      }
   }

   #[test]
   fn every_enum_maps_back_to_itself() {
      assert_bijective::<DepthFunc>();
      assert_bijective::<CullFace>();
      assert_bijective::<FrontFace>();
      assert_bijective::<BlendEquation>();
      assert_bijective::<BlendFactor>();
      assert_bijective::<TextureTarget>();
   }

   #[test]
   fn unknown_codes_are_rejected() {
      assert_eq!(DepthFunc::from_gl(glow::FRONT), None);
      assert_eq!(CullFace::from_gl(glow::FRONT_AND_BACK), None);
      assert_eq!(BlendFactor::from_gl(glow::CONSTANT_COLOR), None);
   }

   #[test]
   fn embedded_support() {
      assert!(BlendEquation::ReverseSubtract.is_embedded_supported());
      assert!(!BlendEquation::Min.is_embedded_supported());
      assert!(!BlendEquation::Max.is_embedded_supported());
      assert!(TextureTarget::CubeMap.is_embedded_supported());
      assert!(!TextureTarget::Texture3D.is_embedded_supported());
   }

   #[test]
   fn names_are_snake_case() {
      let name: &'static str = BlendFactor::OneMinusSrcAlpha.into();
      assert_eq!(name, "one_minus_src_alpha");
   }
}
