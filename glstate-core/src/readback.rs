//! Reading the live device state back into a snapshot.

use strum::IntoEnumIterator;

use crate::applier::Applier;
use crate::device::{
   BoolQuery, Capabilities, Device, DeviceProfile, EnumParameter, Feature, FloatQuery, IntQuery,
};
use crate::enums::{
   BlendEquation, BlendFactor, ColorChannel, CullFace, DepthFunc, FrontFace, GlEnum, TextureTarget,
};
use crate::error::{Error, Result};
use crate::snapshot::{ColorMask, Snapshot, TextureUnit};

impl Applier {
   /// Queries every tracked attribute from the device.
   ///
   /// Texture units are inspected by switching the active unit to each of them in turn. The unit
   /// that was active before the call is made active again on every exit path, so readback has no
   /// observable effect on the device. Units the device does not have (or that are above the
   /// configured cap) read as disabled.
   pub fn read_back<D>(&self, device: &mut D) -> Result<Snapshot>
   where
      D: Device + ?Sized,
   {
      let capabilities = Capabilities::query(device).map_err(Error::Query)?;
      let mut snapshot = read_scalars(device, capabilities.profile)?;

      let active = query_active_texture_unit(device)?;
      snapshot.active_texture_unit = active;

      let units = self.texture_unit_count(&capabilities);
      let result = read_texture_units(device, capabilities.profile, units, &mut snapshot);
      // Without any unit to read, the active unit was never switched.
      let restored = match units {
         0 => Ok(()),
         _ => device.set_active_texture_unit(active).map_err(Error::Query),
      };
      result?;
      restored?;

      log::debug!("read back device state ({})", capabilities);
      Ok(snapshot)
   }
}

fn query_enum<D, T>(device: &mut D, parameter: EnumParameter) -> Result<T>
where
   D: Device + ?Sized,
   T: GlEnum,
{
   let code = device.query_enum(parameter).map_err(Error::Query)?;
   T::from_gl(code).ok_or(Error::UnknownEnum {
      parameter: parameter.name(),
      code,
   })
}

fn query_blend_factor<D>(device: &mut D, query: IntQuery, name: &'static str) -> Result<BlendFactor>
where
   D: Device + ?Sized,
{
   let code = device.query_int(query).map_err(Error::Query)? as u32;
   BlendFactor::from_gl(code).ok_or(Error::UnknownEnum {
      parameter: name,
      code,
   })
}

fn query_active_texture_unit<D>(device: &mut D) -> Result<u32>
where
   D: Device + ?Sized,
{
   let code = device.query_int(IntQuery::ActiveTexture).map_err(Error::Query)?;
   (code as u32).checked_sub(glow::TEXTURE0).ok_or(Error::UnknownTextureUnit(code))
}

fn read_scalars<D>(device: &mut D, profile: DeviceProfile) -> Result<Snapshot>
where
   D: Device + ?Sized,
{
   let mut snapshot = Snapshot::default();

   snapshot.depth_test = device.query_feature(Feature::DepthTest).map_err(Error::Query)?;
   snapshot.depth_func = query_enum::<_, DepthFunc>(device, EnumParameter::DepthFunc)?;

   snapshot.cull_face_enable = device.query_feature(Feature::CullFace).map_err(Error::Query)?;
   snapshot.cull_face = query_enum::<_, CullFace>(device, EnumParameter::CullFace)?;
   snapshot.front_face = query_enum::<_, FrontFace>(device, EnumParameter::FrontFace)?;

   snapshot.blend = device.query_feature(Feature::Blend).map_err(Error::Query)?;
   snapshot.blend_equation = query_enum::<_, BlendEquation>(device, EnumParameter::BlendEquation)?;
   snapshot.blend_func = (
      query_blend_factor(device, IntQuery::BlendSrc, "blend source factor")?,
      query_blend_factor(device, IntQuery::BlendDst, "blend destination factor")?,
   );

   snapshot.depth_mask = device.query_bool(BoolQuery::DepthWriteMask).map_err(Error::Query)?;
   let mut color_mask = ColorMask::NONE;
   for channel in ColorChannel::iter() {
      let enabled = device.query_bool(BoolQuery::ColorWriteMask(channel)).map_err(Error::Query)?;
      color_mask.set_channel(channel, enabled);
   }
   snapshot.color_mask = color_mask;

   snapshot.line_width = device.query_float(FloatQuery::LineWidth).map_err(Error::Query)?;
   // Embedded profiles have no line smoothing at all, so there is nothing to query.
   snapshot.line_smoothing = match profile {
      DeviceProfile::Desktop => device.query_feature(Feature::LineSmooth).map_err(Error::Query)?,
      DeviceProfile::Embedded => false,
   };

   Ok(snapshot)
}

/// Reads the targets of the first `units` texture units. Leaves a different unit active.
fn read_texture_units<D>(
   device: &mut D,
   profile: DeviceProfile,
   units: usize,
   snapshot: &mut Snapshot,
) -> Result<()>
where
   D: Device + ?Sized,
{
   for (unit, record) in snapshot.texture_units.iter_mut().enumerate() {
      if unit >= units {
         *record = TextureUnit::DISABLED;
         continue;
      }
      device.set_active_texture_unit(unit as u32).map_err(Error::Query)?;
      // The device samples from the highest priority target, so that's the only one recorded.
      let mut target = None;
      for candidate in TextureTarget::BY_PRIORITY {
         if profile == DeviceProfile::Embedded && !candidate.is_embedded_supported() {
            continue;
         }
         if device.query_feature(Feature::Texture(candidate)).map_err(Error::Query)? {
            target = Some(candidate);
            break;
         }
      }
      record.set_target(target);
   }
   Ok(())
}
