//! Detecting snapshots that cannot be applied faithfully.

use thiserror::Error;

use crate::device::{Capabilities, DeviceProfile};
use crate::enums::{BlendEquation, TextureTarget};
use crate::snapshot::{is_valid_line_width, Snapshot};

/// The first problem found in a snapshot.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ValidationError {
   #[error("line width {0} is not a positive, finite number")]
   InvalidLineWidth(f32),

   #[error("line smoothing is not available on the {0} profile")]
   LineSmoothingUnsupported(DeviceProfile),

   #[error("blend equation {} is not available on the {} profile", name(.equation), .profile)]
   BlendEquationUnsupported {
      equation: BlendEquation,
      profile: DeviceProfile,
   },

   #[error("active texture unit {unit} is out of range, the device has {available} units")]
   ActiveUnitOutOfRange { unit: u32, available: u32 },

   #[error("texture unit {} has more than one target enabled: {}", .unit, names(.targets))]
   ConflictingTargets {
      unit: usize,
      targets: Vec<TextureTarget>,
   },

   #[error(
      "texture unit {} enables {}, which is not available on the {} profile",
      .unit,
      name(.target),
      .profile
   )]
   TargetUnsupported {
      unit: usize,
      target: TextureTarget,
      profile: DeviceProfile,
   },

   #[error(
      "texture unit {} enables {}, but the device only has {} units",
      .unit,
      name(.target),
      .available
   )]
   UnitOutOfRange {
      unit: usize,
      target: TextureTarget,
      available: u32,
   },
}

fn name<T>(value: &T) -> &'static str
where
   T: Copy + Into<&'static str>,
{
   (*value).into()
}

fn names(targets: &[TextureTarget]) -> String {
   targets.iter().map(name).collect::<Vec<_>>().join(", ")
}

/// Checks that `snapshot` is internally consistent and within what the device supports.
///
/// Checks run in a fixed order and the first violation is returned. Nothing is corrected.
pub fn validate(snapshot: &Snapshot, capabilities: &Capabilities) -> Result<(), ValidationError> {
   let profile = capabilities.profile;
   let embedded = profile == DeviceProfile::Embedded;

   if !is_valid_line_width(snapshot.line_width) {
      return Err(ValidationError::InvalidLineWidth(snapshot.line_width));
   }
   if embedded && snapshot.line_smoothing {
      return Err(ValidationError::LineSmoothingUnsupported(profile));
   }
   if embedded && !snapshot.blend_equation.is_embedded_supported() {
      return Err(ValidationError::BlendEquationUnsupported {
         equation: snapshot.blend_equation,
         profile,
      });
   }
   if snapshot.active_texture_unit >= capabilities.max_texture_units {
      return Err(ValidationError::ActiveUnitOutOfRange {
         unit: snapshot.active_texture_unit,
         available: capabilities.max_texture_units,
      });
   }

   for (unit, record) in snapshot.texture_units.iter().enumerate() {
      let targets: Vec<_> = record.enabled_targets().collect();
      if targets.len() > 1 {
         return Err(ValidationError::ConflictingTargets { unit, targets });
      }
      let target = match targets.first() {
         Some(&target) => target,
         None => continue,
      };
      if embedded && !target.is_embedded_supported() {
         return Err(ValidationError::TargetUnsupported {
            unit,
            target,
            profile,
         });
      }
      if unit >= capabilities.tracked_texture_units() {
         return Err(ValidationError::UnitOutOfRange {
            unit,
            target,
            available: capabilities.max_texture_units,
         });
      }
   }

   Ok(())
}

#[cfg(test)]
mod tests {
   use pretty_assertions::assert_eq;

   use super::*;
   use crate::snapshot::TextureUnit;

   const DESKTOP: Capabilities = Capabilities {
      profile: DeviceProfile::Desktop,
      max_texture_units: 8,
   };
   const EMBEDDED: Capabilities = Capabilities {
      profile: DeviceProfile::Embedded,
      max_texture_units: 8,
   };

   #[test]
   fn default_snapshot_is_valid_everywhere() {
      assert_eq!(validate(&Snapshot::default(), &DESKTOP), Ok(()));
      assert_eq!(validate(&Snapshot::default(), &EMBEDDED), Ok(()));
   }

   #[test]
   fn rejects_conflicting_targets() {
      let mut snapshot = Snapshot::default();
      let unit = snapshot.texture_unit_mut(2).unwrap();
      unit.set_enabled(TextureTarget::Texture2D, true);
      unit.set_enabled(TextureTarget::Texture1D, true);
      let error = validate(&snapshot, &DESKTOP).unwrap_err();
      assert_eq!(
         error,
         ValidationError::ConflictingTargets {
            unit: 2,
            targets: vec![TextureTarget::Texture2D, TextureTarget::Texture1D],
         }
      );
      assert_eq!(
         error.to_string(),
         "texture unit 2 has more than one target enabled: texture_2d, texture_1d"
      );
   }

   #[test]
   fn embedded_profile_restrictions() {
      let mut snapshot = Snapshot::default();
      snapshot.set_line_smoothing(true);
      assert_eq!(validate(&snapshot, &DESKTOP), Ok(()));
      assert_eq!(
         validate(&snapshot, &EMBEDDED),
         Err(ValidationError::LineSmoothingUnsupported(DeviceProfile::Embedded))
      );

      let mut snapshot = Snapshot::default();
      snapshot.set_blend_equation(BlendEquation::Min);
      let error = validate(&snapshot, &EMBEDDED).unwrap_err();
      assert!(matches!(error, ValidationError::BlendEquationUnsupported { .. }));
      assert_eq!(
         error.to_string(),
         "blend equation min is not available on the embedded profile"
      );

      let mut snapshot = Snapshot::default();
      *snapshot.texture_unit_mut(0).unwrap() = TextureUnit::only(TextureTarget::Texture3D);
      assert_eq!(validate(&snapshot, &DESKTOP), Ok(()));
      let error = validate(&snapshot, &EMBEDDED).unwrap_err();
      assert!(matches!(error, ValidationError::TargetUnsupported { unit: 0, .. }));
      assert_eq!(
         error.to_string(),
         "texture unit 0 enables texture_3d, which is not available on the embedded profile"
      );
   }

   #[test]
   fn reports_the_first_violation() {
      let mut snapshot = Snapshot::default();
      snapshot.set_line_smoothing(true);
      snapshot.set_blend_equation(BlendEquation::Max);
      assert!(matches!(
         validate(&snapshot, &EMBEDDED),
         Err(ValidationError::LineSmoothingUnsupported(_))
      ));
   }

   #[test]
   fn rejects_units_the_device_does_not_have() {
      let mut snapshot = Snapshot::default();
      snapshot.set_active_texture_unit(8);
      assert!(matches!(
         validate(&snapshot, &DESKTOP),
         Err(ValidationError::ActiveUnitOutOfRange { unit: 8, available: 8 })
      ));

      let mut snapshot = Snapshot::default();
      *snapshot.texture_unit_mut(9).unwrap() = TextureUnit::only(TextureTarget::Texture2D);
      assert!(matches!(
         validate(&snapshot, &DESKTOP),
         Err(ValidationError::UnitOutOfRange { unit: 9, .. })
      ));
   }

   #[test]
   fn catches_widths_smuggled_past_the_setter() {
      let mut snapshot = Snapshot::default();
      snapshot.line_width = -1.0;
      assert_eq!(validate(&snapshot, &DESKTOP), Err(ValidationError::InvalidLineWidth(-1.0)));
   }
}
