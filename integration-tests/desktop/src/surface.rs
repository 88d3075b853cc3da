//! Hidden GLFW window holding the OpenGL context the fixtures run against.

use glfw::{Context as _, Glfw, Window, WindowEvent};
use lustre::Context;
use lustre_gl::GL33;
use std::ffi::c_void;
use std::fmt;
use std::sync::mpsc::Receiver;

#[derive(Debug)]
pub enum SurfaceError {
  Init(glfw::InitError),
  WindowCreation,
  Context(lustre::Error),
}

impl fmt::Display for SurfaceError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match *self {
      SurfaceError::Init(ref e) => write!(f, "cannot initialize GLFW: {:?}", e),
      SurfaceError::WindowCreation => f.write_str("cannot create the window"),
      SurfaceError::Context(ref e) => write!(f, "cannot create the context: {}", e),
    }
  }
}

impl From<glfw::InitError> for SurfaceError {
  fn from(e: glfw::InitError) -> Self {
    SurfaceError::Init(e)
  }
}

impl From<lustre::Error> for SurfaceError {
  fn from(e: lustre::Error) -> Self {
    SurfaceError::Context(e)
  }
}

pub struct Surface {
  pub ctx: Context<GL33>,
  // kept alive with the context
  _window: Window,
  _events: Receiver<(f64, WindowEvent)>,
  _glfw: Glfw,
}

impl Surface {
  pub fn new(title: &str) -> Result<Self, SurfaceError> {
    let mut glfw = glfw::init(glfw::FAIL_ON_ERRORS)?;

    // OpenGL hints
    glfw.window_hint(glfw::WindowHint::OpenGlProfile(
      glfw::OpenGlProfileHint::Core,
    ));
    glfw.window_hint(glfw::WindowHint::OpenGlForwardCompat(true));
    glfw.window_hint(glfw::WindowHint::ContextVersionMajor(3));
    glfw.window_hint(glfw::WindowHint::ContextVersionMinor(3));
    glfw.window_hint(glfw::WindowHint::Visible(false));

    let (mut window, events) = glfw
      .create_window(640, 480, title, glfw::WindowMode::Windowed)
      .ok_or(SurfaceError::WindowCreation)?;
    window.make_current();

    let backend = unsafe { GL33::load_with(|s| window.get_proc_address(s) as *const c_void) };
    let mut ctx = Context::new(backend)?;

    log::info!(
      "{} / {} / GLSL {}",
      ctx.vendor()?,
      ctx.renderer()?,
      ctx.shading_language_version()?
    );

    Ok(Surface {
      ctx,
      _window: window,
      _events: events,
      _glfw: glfw,
    })
  }
}
