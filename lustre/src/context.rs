//! Graphics context.
//!
//! A [`Context`] owns a backend and is the only way to reach it. All the object types of this
//! crate take a `&mut Context` to perform their operations, which is also where the global,
//! process-wide state of the driver is read and written: clear values, viewport, toggles, etc.
//!
//! # On context and threads
//!
//! A native context is bound to the thread it was made current on. [`Context`] is `!Send` and
//! `!Sync` so that it cannot leave that thread. Nothing in this crate locks or queues: every
//! operation is a direct, blocking call into the backend, immediately followed by a read of the
//! error register.
//!
//! # Error checking
//!
//! Every getter and setter in this module, toggles included, reads the error register right after
//! its native call (see [`Context::check`]).

use gl::types::*;
use std::marker::PhantomData;

use crate::backend::Backend;
use crate::error::{DriverError, Error, PreconditionError, StateQueryError};
use crate::label;
use crate::state::{
  decode_bool, encode_bool, Capability, DepthComparison, DepthRange, FaceCullingMode,
  FaceCullingOrder, PolygonMode, PolygonModes, Rect, POLYGON_MODE,
};
use crate::vertex_array::VertexAttribArray;

/// A graphics context.
#[derive(Debug)]
pub struct Context<B> {
  _a: PhantomData<*const ()>, // !Send and !Sync
  backend: B,
  vertex_attribs: Vec<VertexAttribArray>,
}

impl<B> Context<B>
where
  B: Backend,
{
  /// Wrap a backend.
  ///
  /// The maximum number of vertex attributes is queried once here; it sizes the set of
  /// [`VertexAttribArray`] controllers for the lifetime of the context.
  pub fn new(backend: B) -> Result<Self, Error> {
    let mut ctx = Context {
      _a: PhantomData,
      backend,
      vertex_attribs: Vec::new(),
    };

    let [max] = ctx.get_integers::<1>(gl::MAX_VERTEX_ATTRIBS)?;
    let max = non_negative(gl::MAX_VERTEX_ATTRIBS, max.into())?;
    log::debug!("context created with {} vertex attributes", max);

    ctx.vertex_attribs = (0..max as GLuint).map(VertexAttribArray::new).collect();
    Ok(ctx)
  }

  /// Access the backend.
  pub fn backend(&mut self) -> &mut B {
    &mut self.backend
  }

  /// Give back the backend.
  pub fn into_backend(self) -> B {
    self.backend
  }

  /// Read the error register once and translate it.
  ///
  /// This is called after every native call made by this crate.
  pub fn check(&mut self) -> Result<(), Error> {
    match DriverError::from_code(self.backend.get_error()) {
      None => Ok(()),
      Some(e) => {
        log::debug!("driver reported {}", e);
        Err(Error::Driver(e))
      }
    }
  }

  pub(crate) fn get_integers<const N: usize>(&mut self, pname: GLenum) -> Result<[GLint; N], Error> {
    let mut data = [0; N];
    self.backend.get_integer_v(pname, &mut data);
    self.check()?;
    Ok(data)
  }

  pub(crate) fn get_integer_indexed(&mut self, pname: GLenum, index: GLuint) -> Result<GLint, Error> {
    let mut data = [0];
    self.backend.get_integer_i_v(pname, index, &mut data);
    self.check()?;
    Ok(data[0])
  }

  fn get_floats<const N: usize>(&mut self, pname: GLenum) -> Result<[GLfloat; N], Error> {
    let mut data = [0.; N];
    self.backend.get_float_v(pname, &mut data);
    self.check()?;
    Ok(data)
  }

  fn get_doubles<const N: usize>(&mut self, pname: GLenum) -> Result<[GLdouble; N], Error> {
    let mut data = [0.; N];
    self.backend.get_double_v(pname, &mut data);
    self.check()?;
    Ok(data)
  }

  fn get_string(&mut self, name: GLenum) -> Result<String, Error> {
    let bytes = self.backend.get_string(name);
    self.check()?;
    Ok(bytes.map(label::decode).unwrap_or_default())
  }

  /// The vertex attribute controller at `index`.
  pub fn vertex_attrib_array(&self, index: usize) -> Result<VertexAttribArray, Error> {
    self.vertex_attribs.get(index).copied().ok_or_else(|| {
      PreconditionError::AttribIndexOutOfRange {
        index,
        max: self.vertex_attribs.len(),
      }
      .into()
    })
  }

  /// All the vertex attribute controllers.
  pub fn vertex_attrib_arrays(&self) -> &[VertexAttribArray] {
    &self.vertex_attribs
  }

  /// Company responsible for the driver.
  pub fn vendor(&mut self) -> Result<String, Error> {
    self.get_string(gl::VENDOR)
  }

  /// Name of the renderer, typically the GPU.
  pub fn renderer(&mut self) -> Result<String, Error> {
    self.get_string(gl::RENDERER)
  }

  /// Version string of the API.
  pub fn version(&mut self) -> Result<String, Error> {
    self.get_string(gl::VERSION)
  }

  /// Version string of the shading language.
  pub fn shading_language_version(&mut self) -> Result<String, Error> {
    self.get_string(gl::SHADING_LANGUAGE_VERSION)
  }

  pub fn clear_color(&mut self) -> Result<[f32; 4], Error> {
    self.get_floats(gl::COLOR_CLEAR_VALUE)
  }

  pub fn set_clear_color(&mut self, color: [f32; 4]) -> Result<(), Error> {
    self
      .backend
      .clear_color(color[0], color[1], color[2], color[3]);
    self.check()
  }

  pub fn clear_depth(&mut self) -> Result<f64, Error> {
    self.get_doubles::<1>(gl::DEPTH_CLEAR_VALUE).map(|[d]| d)
  }

  pub fn set_clear_depth(&mut self, depth: f64) -> Result<(), Error> {
    self.backend.clear_depth(depth);
    self.check()
  }

  pub fn clear_stencil(&mut self) -> Result<i32, Error> {
    self.get_integers::<1>(gl::STENCIL_CLEAR_VALUE).map(|[s]| s)
  }

  pub fn set_clear_stencil(&mut self, stencil: i32) -> Result<(), Error> {
    self.backend.clear_stencil(stencil);
    self.check()
  }

  pub fn viewport(&mut self) -> Result<Rect, Error> {
    self.get_integers(gl::VIEWPORT).map(Rect::from_raw)
  }

  pub fn set_viewport(&mut self, rect: Rect) -> Result<(), Error> {
    self
      .backend
      .viewport(rect.x, rect.y, rect.width, rect.height);
    self.check()
  }

  pub fn scissor_box(&mut self) -> Result<Rect, Error> {
    self.get_integers(gl::SCISSOR_BOX).map(Rect::from_raw)
  }

  pub fn set_scissor_box(&mut self, rect: Rect) -> Result<(), Error> {
    self.backend.scissor(rect.x, rect.y, rect.width, rect.height);
    self.check()
  }

  pub fn line_width(&mut self) -> Result<f32, Error> {
    self.get_floats::<1>(gl::LINE_WIDTH).map(|[w]| w)
  }

  pub fn set_line_width(&mut self, width: f32) -> Result<(), Error> {
    self.backend.line_width(width);
    self.check()
  }

  pub fn point_size(&mut self) -> Result<f32, Error> {
    self.get_floats::<1>(gl::POINT_SIZE).map(|[s]| s)
  }

  pub fn set_point_size(&mut self, size: f32) -> Result<(), Error> {
    self.backend.point_size(size);
    self.check()
  }

  /// Polygon modes of front and back faces.
  pub fn polygon_mode(&mut self) -> Result<PolygonModes, Error> {
    let [front, back] = self.get_integers::<2>(POLYGON_MODE)?;

    Ok(PolygonModes {
      front: PolygonMode::from_glenum(front as GLenum)?,
      back: PolygonMode::from_glenum(back as GLenum)?,
    })
  }

  /// Set the polygon modes of front and back faces.
  ///
  /// Core profiles only accept the same mode for both faces: a pair with different modes fails
  /// with [`PreconditionError::MismatchedPolygonModes`] and makes no native call.
  pub fn set_polygon_mode(&mut self, modes: PolygonModes) -> Result<(), Error> {
    if modes.front != modes.back {
      return Err(PreconditionError::MismatchedPolygonModes(modes).into());
    }

    self
      .backend
      .polygon_mode(gl::FRONT_AND_BACK, modes.front.to_glenum());
    self.check()
  }

  pub fn depth_range(&mut self) -> Result<DepthRange, Error> {
    let [near, far] = self.get_doubles::<2>(gl::DEPTH_RANGE)?;
    Ok(DepthRange { near, far })
  }

  pub fn set_depth_range(&mut self, range: DepthRange) -> Result<(), Error> {
    self.backend.depth_range(range.near, range.far);
    self.check()
  }

  /// Whether a capability is enabled.
  pub fn is_enabled(&mut self, cap: Capability) -> Result<bool, Error> {
    let cap = cap.to_glenum();
    let state = self.backend.is_enabled(cap);
    self.check()?;
    Ok(decode_bool(cap, state.into())?)
  }

  /// Enable or disable a capability.
  pub fn set_enabled(&mut self, cap: Capability, enabled: bool) -> Result<(), Error> {
    let cap = cap.to_glenum();

    if enabled {
      self.backend.enable(cap);
    } else {
      self.backend.disable(cap);
    }

    self.check()
  }

  pub fn front_face(&mut self) -> Result<FaceCullingOrder, Error> {
    let [order] = self.get_integers::<1>(gl::FRONT_FACE)?;
    Ok(FaceCullingOrder::from_glenum(order as GLenum)?)
  }

  pub fn set_front_face(&mut self, order: FaceCullingOrder) -> Result<(), Error> {
    self.backend.front_face(order.to_glenum());
    self.check()
  }

  pub fn cull_face_mode(&mut self) -> Result<FaceCullingMode, Error> {
    let [mode] = self.get_integers::<1>(gl::CULL_FACE_MODE)?;
    Ok(FaceCullingMode::from_glenum(mode as GLenum)?)
  }

  pub fn set_cull_face_mode(&mut self, mode: FaceCullingMode) -> Result<(), Error> {
    self.backend.cull_face(mode.to_glenum());
    self.check()
  }

  pub fn depth_func(&mut self) -> Result<DepthComparison, Error> {
    let [func] = self.get_integers::<1>(gl::DEPTH_FUNC)?;
    Ok(DepthComparison::from_glenum(func as GLenum)?)
  }

  pub fn set_depth_func(&mut self, func: DepthComparison) -> Result<(), Error> {
    self.backend.depth_func(func.to_glenum());
    self.check()
  }

  /// Whether depth writes are enabled.
  pub fn depth_mask(&mut self) -> Result<bool, Error> {
    let mut data = [gl::FALSE];
    self.backend.get_boolean_v(gl::DEPTH_WRITEMASK, &mut data);
    self.check()?;
    Ok(decode_bool(gl::DEPTH_WRITEMASK, data[0].into())?)
  }

  pub fn set_depth_mask(&mut self, enabled: bool) -> Result<(), Error> {
    self.backend.depth_mask(encode_bool(enabled));
    self.check()
  }

  /// Index of the active texture unit.
  pub fn active_texture_unit(&mut self) -> Result<u32, Error> {
    let [texture] = self.get_integers::<1>(gl::ACTIVE_TEXTURE)?;
    let unit = (texture as GLenum).wrapping_sub(gl::TEXTURE0);
    Ok(unit)
  }

  /// Make `unit` the active texture unit; texture binding points act on it.
  ///
  /// Units past the driver limit are reported by the driver; a unit with no `GL_TEXTUREi` enum at
  /// all is rejected locally.
  pub fn set_active_texture_unit(&mut self, unit: u32) -> Result<(), Error> {
    let texture = gl::TEXTURE0
      .checked_add(unit)
      .ok_or(PreconditionError::TextureUnitOutOfRange(unit))?;

    self.backend.active_texture(texture);
    self.check()
  }
}

/// Turn a driver-provided count or name into an unsigned value.
pub(crate) fn non_negative(pname: GLenum, value: i64) -> Result<usize, StateQueryError> {
  usize::try_from(value).map_err(|_| StateQueryError::Negative { pname, value })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::soft::SoftBackend;

  fn context() -> Context<SoftBackend> {
    Context::new(SoftBackend::new()).unwrap()
  }

  #[test]
  fn vertex_attribs_sized_from_driver() {
    let ctx = Context::new(SoftBackend::with_max_vertex_attribs(4)).unwrap();

    assert_eq!(ctx.vertex_attrib_arrays().len(), 4);
    assert!(ctx.vertex_attrib_array(3).is_ok());
    assert_eq!(
      ctx.vertex_attrib_array(4),
      Err(Error::Precondition(PreconditionError::AttribIndexOutOfRange {
        index: 4,
        max: 4
      }))
    );
  }

  #[test]
  fn check_reads_error_once() {
    let mut ctx = context();
    ctx.backend().raise(gl::OUT_OF_MEMORY);

    assert_eq!(ctx.check(), Err(Error::Driver(DriverError::OutOfMemory)));
    assert_eq!(ctx.check(), Ok(()));
  }

  #[test]
  fn unknown_error_code_is_kept() {
    let mut ctx = context();
    ctx.backend().raise(0x1234);

    assert_eq!(ctx.check(), Err(Error::Driver(DriverError::Unknown(0x1234))));
  }

  #[test]
  fn clear_values() {
    let mut ctx = context();

    assert_eq!(ctx.clear_color().unwrap(), [0., 0., 0., 0.]);
    ctx.set_clear_color([0.1, 0.2, 0.3, 1.]).unwrap();
    assert_eq!(ctx.clear_color().unwrap(), [0.1, 0.2, 0.3, 1.]);

    assert_eq!(ctx.clear_depth().unwrap(), 1.);
    ctx.set_clear_depth(0.5).unwrap();
    assert_eq!(ctx.clear_depth().unwrap(), 0.5);

    ctx.set_clear_stencil(7).unwrap();
    assert_eq!(ctx.clear_stencil().unwrap(), 7);
  }

  #[test]
  fn viewport_and_scissor() {
    let mut ctx = context();
    let rect = Rect::new(10, 20, 640, 480);

    ctx.set_viewport(rect).unwrap();
    assert_eq!(ctx.viewport().unwrap(), rect);

    ctx.set_scissor_box(Rect::new(0, 0, 32, 32)).unwrap();
    assert_eq!(ctx.scissor_box().unwrap(), Rect::new(0, 0, 32, 32));
  }

  #[test]
  fn negative_viewport_is_a_driver_error() {
    let mut ctx = context();

    assert_eq!(
      ctx.set_viewport(Rect::new(0, 0, -1, 10)),
      Err(Error::Driver(DriverError::InvalidValue))
    );
  }

  #[test]
  fn line_width_and_point_size() {
    let mut ctx = context();

    ctx.set_line_width(2.).unwrap();
    assert_eq!(ctx.line_width().unwrap(), 2.);
    assert_eq!(
      ctx.set_line_width(0.),
      Err(Error::Driver(DriverError::InvalidValue))
    );

    ctx.set_point_size(4.).unwrap();
    assert_eq!(ctx.point_size().unwrap(), 4.);
  }

  #[test]
  fn polygon_mode_pair() {
    let mut ctx = context();

    assert_eq!(
      ctx.polygon_mode().unwrap(),
      PolygonModes {
        front: PolygonMode::Fill,
        back: PolygonMode::Fill
      }
    );

    ctx
      .set_polygon_mode(PolygonModes::both(PolygonMode::Line))
      .unwrap();
    assert_eq!(
      ctx.polygon_mode().unwrap(),
      PolygonModes {
        front: PolygonMode::Line,
        back: PolygonMode::Line
      }
    );
  }

  #[test]
  fn mismatched_polygon_modes_are_rejected_locally() {
    let mut ctx = context();
    let modes = PolygonModes {
      front: PolygonMode::Line,
      back: PolygonMode::Fill,
    };
    let calls = ctx.backend().calls();

    assert_eq!(
      ctx.set_polygon_mode(modes),
      Err(Error::Precondition(
        PreconditionError::MismatchedPolygonModes(modes)
      ))
    );
    assert_eq!(ctx.backend().calls(), calls);
    assert_eq!(
      ctx.polygon_mode().unwrap(),
      PolygonModes::both(PolygonMode::Fill)
    );
  }

  #[test]
  fn depth_state() {
    let mut ctx = context();

    assert_eq!(ctx.depth_range().unwrap(), DepthRange::default());
    ctx
      .set_depth_range(DepthRange {
        near: 0.25,
        far: 0.75,
      })
      .unwrap();
    assert_eq!(
      ctx.depth_range().unwrap(),
      DepthRange {
        near: 0.25,
        far: 0.75
      }
    );

    assert_eq!(ctx.depth_func().unwrap(), DepthComparison::Less);
    ctx.set_depth_func(DepthComparison::GreaterOrEqual).unwrap();
    assert_eq!(ctx.depth_func().unwrap(), DepthComparison::GreaterOrEqual);

    assert!(ctx.depth_mask().unwrap());
    ctx.set_depth_mask(false).unwrap();
    assert!(!ctx.depth_mask().unwrap());
  }

  #[test]
  fn toggles() {
    let mut ctx = context();
    let caps = [
      Capability::DepthTest,
      Capability::DepthClamp,
      Capability::FaceCulling,
      Capability::ScissorTest,
      Capability::Blending,
    ];

    for cap in caps {
      assert!(!ctx.is_enabled(cap).unwrap());
      ctx.set_enabled(cap, true).unwrap();
      assert!(ctx.is_enabled(cap).unwrap());
      ctx.set_enabled(cap, false).unwrap();
      assert!(!ctx.is_enabled(cap).unwrap());
    }
  }

  #[test]
  fn face_culling() {
    let mut ctx = context();

    assert_eq!(ctx.front_face().unwrap(), FaceCullingOrder::CCW);
    ctx.set_front_face(FaceCullingOrder::CW).unwrap();
    assert_eq!(ctx.front_face().unwrap(), FaceCullingOrder::CW);

    assert_eq!(ctx.cull_face_mode().unwrap(), FaceCullingMode::Back);
    ctx.set_cull_face_mode(FaceCullingMode::Both).unwrap();
    assert_eq!(ctx.cull_face_mode().unwrap(), FaceCullingMode::Both);
  }

  #[test]
  fn setters_always_check() {
    let mut ctx = context();

    // a stale error is reported by the next checked call, whatever it is
    ctx.backend().raise(gl::INVALID_ENUM);
    assert_eq!(
      ctx.set_cull_face_mode(FaceCullingMode::Front),
      Err(Error::Driver(DriverError::InvalidEnum))
    );

    ctx.backend().raise(gl::INVALID_ENUM);
    assert_eq!(
      ctx.set_enabled(Capability::DepthTest, true),
      Err(Error::Driver(DriverError::InvalidEnum))
    );
  }

  #[test]
  fn active_texture_unit() {
    let mut ctx = context();

    assert_eq!(ctx.active_texture_unit().unwrap(), 0);
    ctx.set_active_texture_unit(3).unwrap();
    assert_eq!(ctx.active_texture_unit().unwrap(), 3);
  }

  #[test]
  fn texture_unit_past_the_limit() {
    let mut ctx = context();
    let calls = ctx.backend().calls();

    assert_eq!(
      ctx.set_active_texture_unit(u32::MAX),
      Err(Error::Precondition(PreconditionError::TextureUnitOutOfRange(
        u32::MAX
      )))
    );
    assert_eq!(ctx.backend().calls(), calls);

    assert_eq!(
      ctx.set_active_texture_unit(4096),
      Err(Error::Driver(DriverError::InvalidEnum))
    );
    assert_eq!(ctx.active_texture_unit().unwrap(), 0);
  }

  #[test]
  fn strings() {
    let mut ctx = context();

    assert_eq!(ctx.vendor().unwrap(), "lustre");
    assert!(ctx.version().unwrap().starts_with("4.6"));
    assert!(!ctx.renderer().unwrap().is_empty());
    assert!(!ctx.shading_language_version().unwrap().is_empty());
  }
}
