//! The `glstate-probe` harness.
//!
//! The probe creates a headless context, reads its pipeline state back, validates it, then forces
//! the baseline state onto it and checks that reading it back again gives the baseline.

use std::path::PathBuf;

use glstate_core::{
   validate, Applier, AttributeGroup, Capabilities, Device, Snapshot, ValidationError,
};
use glstate_opengl::HeadlessContext;
use simple_logger::SimpleLogger;
use structopt::StructOpt;

pub mod config;

use crate::config::UserConfig;

#[derive(Debug, StructOpt)]
#[structopt(
   name = "glstate-probe",
   about = "Reads back, validates and resets the pipeline state of a headless OpenGL context."
)]
pub struct Options {
   /// Use this config file instead of the one in the user's config directory.
   #[structopt(long, parse(from_os_str))]
   pub config: Option<PathBuf>,

   /// Print the state read back after resetting as TOML.
   #[structopt(long)]
   pub dump: bool,
}

/// The outcome of probing a device.
#[derive(Debug)]
pub struct Report {
   pub capabilities: Capabilities,
   /// The state the device was in before the probe touched it.
   pub initial: Snapshot,
   /// Whether the initial state is one that could have been applied.
   pub validation: Result<(), ValidationError>,
   /// The number of device calls the reset took.
   pub reset_calls: usize,
   /// The state read back after the reset.
   pub reset: Snapshot,
   /// Groups where the state read back after the reset differs from the mirror the reset left.
   pub drift: Vec<AttributeGroup>,
}

impl Report {
   pub fn is_clean(&self) -> bool {
      self.validation.is_ok() && self.drift.is_empty()
   }
}

/// Runs the probe sequence on `device`.
pub fn probe<D>(device: &mut D, applier: &Applier) -> anyhow::Result<Report>
where
   D: Device,
{
   let capabilities = Capabilities::query(device)?;
   log::info!("device: {}", capabilities);

   let initial = applier.read_back(device)?;
   let validation = validate(&initial, &capabilities);
   match &validation {
      Ok(()) => log::info!("initial state is valid"),
      Err(error) => log::warn!("initial state is invalid: {}", error),
   }

   let mut mirror = Snapshot::default();
   let reset_calls = applier.force_apply(device, &Snapshot::default(), Some(&mut mirror))?;
   log::info!("reset to the baseline state in {} calls", reset_calls);

   let reset = applier.read_back(device)?;
   let drift = mirror.differing_groups(&reset);
   for group in &drift {
      log::warn!("{} drifted from the applied state", group);
   }

   Ok(Report {
      capabilities,
      initial,
      validation,
      reset_calls,
      reset,
      drift,
   })
}

/// Renders a snapshot as a TOML document.
pub fn dump(snapshot: &Snapshot) -> anyhow::Result<String> {
   // Going through a `Value` lets the serializer put plain keys before tables.
   Ok(toml::to_string(&toml::Value::try_from(snapshot)?)?)
}

pub fn main() -> anyhow::Result<()> {
   let options = Options::from_args();

   let config = match &options.config {
      Some(path) => UserConfig::load_or_create_at(path)?,
      None => UserConfig::load_or_create()?,
   };
   SimpleLogger::new().with_level(config.log.level.filter()).init()?;
   log::debug!("using config: {:?}", config);

   let context = HeadlessContext::new(config.context.profile)?;
   let mut device = context.device();
   let applier = Applier::new(config.applier.max_texture_units);

   let report = probe(&mut device, &applier)?;
   if options.dump {
      print!("{}", dump(&report.reset)?);
   }

   if report.is_clean() {
      log::info!("probe finished without problems");
   } else {
      log::warn!("probe finished with {} drifted groups", report.drift.len());
   }

   Ok(())
}
