//! Reconciling the device with a desired snapshot.

use crate::device::{Capabilities, Device, DeviceError, EnumParameter, Feature};
use crate::enums::GlEnum;
use crate::error::{Error, Result};
use crate::snapshot::{AttributeGroup, Snapshot, MAX_TEXTURE_UNITS};

/// Applies snapshots to a device and reads them back.
///
/// The applier holds no device state of its own. The last known device state lives in a
/// "current" snapshot owned by the caller, which the applier updates in place with exactly what it
/// sent. Keeping that snapshot in sync with the device is the caller's job: if something else
/// changes the device behind the applier's back, relative application will skip calls it should
/// have made.
#[derive(Clone, Copy, Debug)]
pub struct Applier {
   max_texture_units: usize,
}

impl Default for Applier {
   fn default() -> Self {
      Self::new(MAX_TEXTURE_UNITS)
   }
}

impl Applier {
   /// Creates an applier that tracks at most `max_texture_units` texture units. The value is
   /// clamped to [`MAX_TEXTURE_UNITS`].
   pub fn new(max_texture_units: usize) -> Self {
      Self {
         max_texture_units: max_texture_units.min(MAX_TEXTURE_UNITS),
      }
   }

   /// Returns the number of texture units an operation on this device touches.
   pub(crate) fn texture_unit_count(&self, capabilities: &Capabilities) -> usize {
      capabilities.tracked_texture_units().min(self.max_texture_units)
   }

   /// Applies every attribute group of `desired`, regardless of what the device currently holds.
   ///
   /// If `current` is given, it is updated to mirror what was sent. Returns the number of device
   /// calls issued.
   pub fn force_apply<D>(
      &self,
      device: &mut D,
      desired: &Snapshot,
      current: Option<&mut Snapshot>,
   ) -> Result<usize>
   where
      D: Device + ?Sized,
   {
      self.apply(device, desired, current, true)
   }

   /// Applies the attribute groups of `desired` that differ from `current`, then updates `current`
   /// to match. Returns the number of device calls issued, which is exactly the number of
   /// differing groups.
   pub fn apply_relative<D>(
      &self,
      device: &mut D,
      desired: &Snapshot,
      current: &mut Snapshot,
   ) -> Result<usize>
   where
      D: Device + ?Sized,
   {
      self.apply(device, desired, Some(current), false)
   }

   fn apply<D>(
      &self,
      device: &mut D,
      desired: &Snapshot,
      current: Option<&mut Snapshot>,
      force: bool,
   ) -> Result<usize>
   where
      D: Device + ?Sized,
   {
      let capabilities = Capabilities::query(device).map_err(Error::Query)?;
      let texture_units = self.texture_unit_count(&capabilities);

      let mut pass = Pass {
         device,
         current,
         force,
         calls: 0,
      };

      pass.group(
         AttributeGroup::DepthTestEnable,
         desired.depth_test,
         |s| &mut s.depth_test,
         |d, enabled| d.set_feature(Feature::DepthTest, enabled),
      )?;
      pass.group(
         AttributeGroup::DepthFunc,
         desired.depth_func,
         |s| &mut s.depth_func,
         |d, func| d.set_enum(EnumParameter::DepthFunc, func.to_gl()),
      )?;
      pass.group(
         AttributeGroup::CullFaceEnable,
         desired.cull_face_enable,
         |s| &mut s.cull_face_enable,
         |d, enabled| d.set_feature(Feature::CullFace, enabled),
      )?;
      pass.group(
         AttributeGroup::CullFace,
         desired.cull_face,
         |s| &mut s.cull_face,
         |d, face| d.set_enum(EnumParameter::CullFace, face.to_gl()),
      )?;
      pass.group(
         AttributeGroup::FrontFace,
         desired.front_face,
         |s| &mut s.front_face,
         |d, order| d.set_enum(EnumParameter::FrontFace, order.to_gl()),
      )?;
      pass.group(
         AttributeGroup::BlendEnable,
         desired.blend,
         |s| &mut s.blend,
         |d, enabled| d.set_feature(Feature::Blend, enabled),
      )?;
      pass.group(
         AttributeGroup::BlendEquation,
         desired.blend_equation,
         |s| &mut s.blend_equation,
         |d, equation| d.set_enum(EnumParameter::BlendEquation, equation.to_gl()),
      )?;
      pass.group(
         AttributeGroup::BlendFunc,
         desired.blend_func,
         |s| &mut s.blend_func,
         |d, (src, dst)| d.set_blend_func(src.to_gl(), dst.to_gl()),
      )?;
      pass.group(
         AttributeGroup::DepthMask,
         desired.depth_mask,
         |s| &mut s.depth_mask,
         |d, writable| d.set_depth_mask(writable),
      )?;
      pass.group(
         AttributeGroup::ColorMask,
         desired.color_mask,
         |s| &mut s.color_mask,
         |d, mask| d.set_color_mask(mask.red, mask.green, mask.blue, mask.alpha),
      )?;
      pass.group(
         AttributeGroup::LineWidth,
         desired.line_width,
         |s| &mut s.line_width,
         |d, width| d.set_line_width(width),
      )?;
      pass.group(
         AttributeGroup::LineSmoothing,
         desired.line_smoothing,
         |s| &mut s.line_smoothing,
         |d, enabled| d.set_feature(Feature::LineSmooth, enabled),
      )?;
      pass.group(
         AttributeGroup::ActiveTextureUnit,
         desired.active_texture_unit,
         |s| &mut s.active_texture_unit,
         |d, unit| d.set_active_texture_unit(unit),
      )?;
      for unit in 0..texture_units {
         pass.group(
            AttributeGroup::TextureUnit(unit as u32),
            desired.texture_units[unit],
            move |s| &mut s.texture_units[unit],
            |d, targets| d.set_texture_targets(unit as u32, targets),
         )?;
      }

      log::debug!(
         "{} apply issued {} device calls ({})",
         if force { "forced" } else { "relative" },
         pass.calls,
         capabilities,
      );
      Ok(pass.calls)
   }
}

/// A single pass over the attribute groups.
struct Pass<'a, D: ?Sized> {
   device: &'a mut D,
   current: Option<&'a mut Snapshot>,
   force: bool,
   calls: usize,
}

impl<'a, D> Pass<'a, D>
where
   D: Device + ?Sized,
{
   /// Issues `call` if the group is forced or its tracked value differs from `desired`, and
   /// mirrors the value into the current snapshot once the call succeeds.
   fn group<T, F, C>(&mut self, group: AttributeGroup, desired: T, field: F, call: C) -> Result<()>
   where
      T: PartialEq + Copy + std::fmt::Debug,
      F: Fn(&mut Snapshot) -> &mut T,
      C: FnOnce(&mut D, T) -> Result<(), DeviceError>,
   {
      let stale = match self.current.as_deref_mut() {
         Some(current) => *field(current) != desired,
         None => true,
      };
      if !(self.force || stale) {
         return Ok(());
      }

      log::trace!("applying {}: {:?}", group, desired);
      self.calls += 1;
      call(&mut *self.device, desired).map_err(|source| Error::Device { group, source })?;
      if let Some(current) = self.current.as_deref_mut() {
         *field(current) = desired;
      }
      Ok(())
   }
}
