#![allow(dead_code)]

use glstate_core::{
   BlendEquation, BlendFactor, ColorMask, CullFace, DepthFunc, FrontFace, Snapshot, TextureTarget,
   TextureUnit,
};

/// The number of texture units the test devices have.
pub const UNITS: u32 = 4;

/// A snapshot that differs from the default one in every attribute group except the texture units
/// not listed below.
pub fn exotic() -> Snapshot {
   let mut snapshot = Snapshot::default();
   snapshot.set_depth_test_enabled(false);
   snapshot.set_depth_func(DepthFunc::GreaterOrEqual);
   snapshot.set_cull_face_enabled(true);
   snapshot.set_cull_face(CullFace::Front);
   snapshot.set_front_face(FrontFace::Cw);
   snapshot.set_blend_enabled(false);
   snapshot.set_blend_equation(BlendEquation::ReverseSubtract);
   snapshot.set_blend_func(BlendFactor::DstColor, BlendFactor::Zero);
   snapshot.set_depth_mask(false);
   snapshot.set_color_mask(ColorMask::new(true, false, true, false));
   snapshot.set_line_width(3.5).unwrap();
   snapshot.set_line_smoothing(true);
   snapshot.set_active_texture_unit(2);
   *snapshot.texture_unit_mut(1).unwrap() = TextureUnit::only(TextureTarget::Texture3D);
   *snapshot.texture_unit_mut(3).unwrap() = TextureUnit::only(TextureTarget::CubeMap);
   snapshot
}
