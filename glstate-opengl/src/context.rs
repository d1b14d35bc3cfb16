use std::fmt::Write;
use std::rc::Rc;

use glutin::dpi::PhysicalSize;
use glutin::event_loop::EventLoop;
use glutin::{Api, Context, ContextBuilder, GlProfile, GlRequest, PossiblyCurrent};

use crate::{ContextProfile, GlowDevice};

/// An offscreen OpenGL context, current on the thread that created it.
pub struct HeadlessContext {
   // The context has to go before the event loop it was created with.
   _context: Context<PossiblyCurrent>,
   _event_loop: EventLoop<()>,
   gl: Rc<glow::Context>,
}

struct Attempt {
   description: &'static str,
   request: GlRequest,
   profile: Option<GlProfile>,
}

impl Attempt {
   fn for_profile(profile: ContextProfile) -> Vec<Attempt> {
      let compatibility = Attempt {
         description: "OpenGL, compatibility profile",
         request: GlRequest::Latest,
         profile: Some(GlProfile::Compatibility),
      };
      let embedded = Attempt {
         description: "OpenGL ES 2.0",
         request: GlRequest::Specific(Api::OpenGlEs, (2, 0)),
         profile: None,
      };
      match profile {
         ContextProfile::Compatibility => vec![compatibility, embedded],
         ContextProfile::Embedded => vec![embedded],
      }
   }
}

impl HeadlessContext {
   /// Creates a 1x1 headless context and makes it current.
   ///
   /// Each configuration suitable for `profile` is tried in turn; if none of them works, the
   /// error lists why each one failed.
   pub fn new(profile: ContextProfile) -> anyhow::Result<Self> {
      let event_loop = EventLoop::new();

      let mut failures = Vec::new();
      let mut context = None;
      for attempt in Attempt::for_profile(profile) {
         let mut builder = ContextBuilder::new().with_gl(attempt.request);
         if let Some(profile) = attempt.profile {
            builder = builder.with_gl_profile(profile);
         }
         match builder.build_headless(&event_loop, PhysicalSize::new(1, 1)) {
            Ok(ok) => {
               log::debug!("created headless context: {}", attempt.description);
               context = Some(ok);
               break;
            }
            Err(error) => failures.push((attempt.description, error.to_string())),
         }
      }

      let context = match context {
         Some(context) => context,
         None => {
            let mut error_message = String::from(
               "Failed to create a headless OpenGL context.\nTried the following configurations, none of which seem to be supported:\n",
            );
            for (description, error) in &failures {
               let _ = writeln!(error_message, " - {}; failed with: '{}'", description, error);
            }
            anyhow::bail!(error_message)
         }
      };

      let context = unsafe { context.make_current() }
         .map_err(|(_, error)| anyhow::anyhow!("cannot make the context current: {}", error))?;
      let gl = unsafe {
         glow::Context::from_loader_function(|name| context.get_proc_address(name) as *const _)
      };

      Ok(Self {
         _context: context,
         _event_loop: event_loop,
         gl: Rc::new(gl),
      })
   }

   /// Creates a device that drives this context.
   pub fn device(&self) -> GlowDevice {
      GlowDevice::new(Rc::clone(&self.gl))
   }
}
