mod common;

use glstate_core::device::{Call, EnumParameter, Feature};
use glstate_core::{
   Applier, AttributeGroup, BlendEquation, BlendFactor, ColorMask, DepthFunc, DeviceError,
   Error, GlEnum, RecordingDevice, Snapshot, TextureTarget, TextureUnit,
};
use pretty_assertions::assert_eq;
use strum::IntoEnumIterator;

use common::{exotic, UNITS};

/// A device that has been forced into the default snapshot, along with its mirror.
fn baseline_device() -> (RecordingDevice, Snapshot) {
   let mut device = RecordingDevice::desktop(UNITS);
   let mut current = Snapshot::default();
   Applier::default().force_apply(&mut device, &Snapshot::default(), Some(&mut current)).unwrap();
   device.take_calls();
   (device, current)
}

/// Applies `desired` relatively and forcibly on top of the default state, checking the device
/// against `desired` after each.
fn assert_applies(desired: &Snapshot) {
   let applier = Applier::default();

   let (mut device, mut current) = baseline_device();
   applier.apply_relative(&mut device, desired, &mut current).unwrap();
   assert_eq!(current, *desired);
   assert_eq!(applier.read_back(&mut device).unwrap(), *desired);

   let (mut device, _) = baseline_device();
   applier.force_apply(&mut device, desired, None).unwrap();
   assert_eq!(applier.read_back(&mut device).unwrap(), *desired);
}

#[test]
fn force_apply_issues_one_call_per_group() {
   let mut device = RecordingDevice::desktop(UNITS);
   let calls = Applier::default().force_apply(&mut device, &Snapshot::default(), None).unwrap();
   assert_eq!(calls, 13 + UNITS as usize);
   assert_eq!(device.calls().len(), calls);

   // Forcing ignores the mirror entirely.
   let mut current = Snapshot::default();
   device.take_calls();
   let calls = Applier::default()
      .force_apply(&mut device, &Snapshot::default(), Some(&mut current))
      .unwrap();
   assert_eq!(calls, 13 + UNITS as usize);
}

#[test]
fn force_apply_makes_the_device_match() {
   let applier = Applier::default();
   for desired in [Snapshot::default(), exotic()] {
      let mut device = RecordingDevice::desktop(UNITS);
      let mut current = Snapshot::default();
      current.set_line_width(7.0).unwrap();
      applier.force_apply(&mut device, &desired, Some(&mut current)).unwrap();
      assert_eq!(current, desired);
      assert_eq!(applier.read_back(&mut device).unwrap(), desired);
   }
}

#[test]
fn calls_follow_the_canonical_order() {
   let mut device = RecordingDevice::desktop(UNITS);
   Applier::default().force_apply(&mut device, &exotic(), None).unwrap();
   assert_eq!(
      device.take_calls(),
      vec![
         Call::SetFeature(Feature::DepthTest, false),
         Call::SetEnum(EnumParameter::DepthFunc, glow::GEQUAL),
         Call::SetFeature(Feature::CullFace, true),
         Call::SetEnum(EnumParameter::CullFace, glow::FRONT),
         Call::SetEnum(EnumParameter::FrontFace, glow::CW),
         Call::SetFeature(Feature::Blend, false),
         Call::SetEnum(EnumParameter::BlendEquation, glow::FUNC_REVERSE_SUBTRACT),
         Call::SetBlendFunc(glow::DST_COLOR, glow::ZERO),
         Call::SetDepthMask(false),
         Call::SetColorMask([true, false, true, false]),
         Call::SetLineWidth(3.5),
         Call::SetFeature(Feature::LineSmooth, true),
         Call::SetActiveTextureUnit(2),
         Call::SetTextureTargets(0, TextureUnit::DISABLED),
         Call::SetTextureTargets(1, TextureUnit::only(TextureTarget::Texture3D)),
         Call::SetTextureTargets(2, TextureUnit::DISABLED),
         Call::SetTextureTargets(3, TextureUnit::only(TextureTarget::CubeMap)),
      ]
   );
}

#[test]
fn relative_apply_of_the_same_state_is_free() {
   let applier = Applier::default();
   for desired in [Snapshot::default(), exotic()] {
      let mut device = RecordingDevice::desktop(UNITS);
      let mut current = desired;
      assert_eq!(applier.apply_relative(&mut device, &desired, &mut current).unwrap(), 0);
      assert!(device.calls().is_empty());
   }
}

#[test]
fn relative_apply_issues_one_call_per_differing_group() {
   let applier = Applier::default();
   let mutations: [fn(&mut Snapshot); 9] = [
      |s| s.set_depth_test_enabled(false),
      |s| s.set_depth_func(DepthFunc::Always),
      |s| s.set_cull_face_enabled(true),
      |s| s.set_blend_equation(BlendEquation::Max),
      |s| s.set_blend_func(BlendFactor::One, BlendFactor::SrcAlpha),
      |s| s.set_color_mask(ColorMask::new(true, true, false, true)),
      |s| s.set_line_width(1.25).unwrap(),
      |s| s.set_active_texture_unit(3),
      |s| s.texture_unit_mut(2).unwrap().set_target(Some(TextureTarget::Texture1D)),
   ];

   // One group at a time.
   for mutate in &mutations {
      let (mut device, mut current) = baseline_device();
      let mut desired = current;
      mutate(&mut desired);
      assert_eq!(applier.apply_relative(&mut device, &desired, &mut current).unwrap(), 1);
      assert_eq!(device.calls().len(), 1);
      assert_eq!(current, desired);
   }

   // All of them at once.
   let (mut device, mut current) = baseline_device();
   let mut desired = current;
   for mutate in &mutations {
      mutate(&mut desired);
   }
   let differing = current.differing_groups(&desired);
   assert_eq!(differing.len(), mutations.len());
   let calls = applier.apply_relative(&mut device, &desired, &mut current).unwrap();
   assert_eq!(calls, differing.len());
   assert_eq!(device.calls().len(), differing.len());
   assert_eq!(current, desired);
   assert_eq!(applier.apply_relative(&mut device, &desired, &mut current).unwrap(), 0);
}

#[test]
fn blend_factors_and_color_channels_are_single_groups() {
   let applier = Applier::default();
   let (mut device, mut current) = baseline_device();
   let mut desired = current;
   desired.set_blend_func(BlendFactor::Zero, BlendFactor::One);
   desired.set_color_mask(ColorMask::NONE);
   assert_eq!(applier.apply_relative(&mut device, &desired, &mut current).unwrap(), 2);
   assert_eq!(
      device.take_calls(),
      vec![Call::SetBlendFunc(glow::ZERO, glow::ONE), Call::SetColorMask([false; 4])]
   );
}

#[test]
fn changing_the_depth_function_leaves_depth_testing_alone() {
   let applier = Applier::default();
   let (mut device, mut current) = baseline_device();
   let mut desired = current;
   desired.set_depth_func(DepthFunc::Never);

   assert_eq!(applier.apply_relative(&mut device, &desired, &mut current).unwrap(), 1);
   assert_eq!(device.take_calls(), vec![Call::SetEnum(EnumParameter::DepthFunc, glow::NEVER)]);

   let read = applier.read_back(&mut device).unwrap();
   assert_eq!(read.depth_func(), DepthFunc::Never);
   assert!(read.depth_test_enabled());
}

#[test]
fn color_mask_survives_force_apply_and_readback() {
   let applier = Applier::default();
   let mut desired = Snapshot::default();
   desired.set_color_mask(ColorMask::new(false, false, false, true));
   let mut device = RecordingDevice::desktop(UNITS);
   applier.force_apply(&mut device, &desired, None).unwrap();
   assert_eq!(
      applier.read_back(&mut device).unwrap().color_mask(),
      ColorMask::new(false, false, false, true)
   );
}

#[test]
fn stale_mirror_under_applies() {
   let applier = Applier::default();
   let (mut device, mut current) = baseline_device();

   // Someone changes the device without going through the applier.
   glstate_core::Device::set_feature(&mut device, Feature::Blend, false).unwrap();
   device.take_calls();

   let desired = Snapshot::default();
   assert_eq!(applier.apply_relative(&mut device, &desired, &mut current).unwrap(), 0);
   assert!(!applier.read_back(&mut device).unwrap().blend_enabled());
}

#[test]
fn failed_call_keeps_earlier_groups_mirrored() {
   let applier = Applier::default();
   let mut device = RecordingDevice::desktop(UNITS);
   let mut current = Snapshot::default();
   let desired = exotic();
   // Index 7 is the blend function.
   device.fail_call(7);

   let error = applier.force_apply(&mut device, &desired, Some(&mut current)).unwrap_err();
   match error {
      Error::Device { group, source } => {
         assert_eq!(group, AttributeGroup::BlendFunc);
         assert_eq!(
            source,
            DeviceError::Gl {
               code: glow::INVALID_OPERATION
            }
         );
      }
      other => panic!("unexpected error: {}", other),
   }
   assert_eq!(
      current.differing_groups(&desired),
      vec![
         AttributeGroup::BlendFunc,
         AttributeGroup::DepthMask,
         AttributeGroup::ColorMask,
         AttributeGroup::LineWidth,
         AttributeGroup::LineSmoothing,
         AttributeGroup::ActiveTextureUnit,
         AttributeGroup::TextureUnit(1),
         AttributeGroup::TextureUnit(3),
      ]
   );
}

#[test]
fn unsupported_state_is_sent_and_reported() {
   let applier = Applier::default();
   let mut device = RecordingDevice::embedded(UNITS);
   let mut current = Snapshot::default();
   let mut desired = Snapshot::default();
   desired.set_line_smoothing(true);

   // Disabling smoothing is what the embedded profile does anyway, so that much succeeds.
   applier.force_apply(&mut device, &Snapshot::default(), Some(&mut current)).unwrap();
   let error = applier.apply_relative(&mut device, &desired, &mut current).unwrap_err();
   assert!(matches!(
      error,
      Error::Device {
         group: AttributeGroup::LineSmoothing,
         source: DeviceError::Unsupported { .. },
      }
   ));
   assert_eq!(current, Snapshot::default());
}

#[test]
fn texture_units_beyond_the_cap_are_untouched() {
   let mut device = RecordingDevice::desktop(8);
   let applier = Applier::new(2);
   let calls = applier.force_apply(&mut device, &Snapshot::default(), None).unwrap();
   assert_eq!(calls, 13 + 2);

   let mut current = Snapshot::default();
   let mut desired = current;
   *desired.texture_unit_mut(5).unwrap() = TextureUnit::only(TextureTarget::Texture2D);
   assert_eq!(applier.apply_relative(&mut device, &desired, &mut current).unwrap(), 0);
   assert_eq!(current.texture_unit(5), Some(&TextureUnit::DISABLED));
}

#[test]
fn every_depth_function() {
   for func in DepthFunc::iter() {
      let mut desired = Snapshot::default();
      desired.set_depth_func(func);
      assert_applies(&desired);
      desired.set_depth_test_enabled(false);
      assert_applies(&desired);
   }
}

#[test]
fn every_blend_equation() {
   for equation in BlendEquation::iter() {
      let mut desired = Snapshot::default();
      desired.set_blend_equation(equation);
      assert_applies(&desired);
   }
}

#[test]
fn blend_factor_pairs() {
   for src in BlendFactor::iter() {
      for dst in [BlendFactor::Zero, BlendFactor::One, BlendFactor::DstAlpha] {
         let mut desired = Snapshot::default();
         desired.set_blend_func(src, dst);
         assert_applies(&desired);
      }
   }
}

#[test]
fn color_masks() {
   for bits in 0..16u8 {
      let mut desired = Snapshot::default();
      desired.set_color_mask(ColorMask::new(
         bits & 1 != 0,
         bits & 2 != 0,
         bits & 4 != 0,
         bits & 8 != 0,
      ));
      assert_applies(&desired);
   }
}

#[test]
fn lines_and_texture_units() {
   for width in [2.5, 1.5, 1.0] {
      let mut desired = Snapshot::default();
      desired.set_line_width(width).unwrap();
      desired.set_line_smoothing(true);
      assert_applies(&desired);
   }
   for unit in 0..UNITS {
      let mut desired = Snapshot::default();
      desired.set_active_texture_unit(unit);
      assert_applies(&desired);
   }
   for target in TextureTarget::iter() {
      let mut desired = Snapshot::default();
      *desired.texture_unit_mut(1).unwrap() = TextureUnit::only(target);
      assert_applies(&desired);
   }
}

#[test]
fn enum_codes_reach_the_device_unchanged() {
   let mut device = RecordingDevice::desktop(UNITS);
   let mut desired = Snapshot::default();
   desired.set_depth_func(DepthFunc::LessOrEqual);
   Applier::default().force_apply(&mut device, &desired, None).unwrap();
   assert!(device
      .calls()
      .contains(&Call::SetEnum(EnumParameter::DepthFunc, DepthFunc::LessOrEqual.to_gl())));
}
