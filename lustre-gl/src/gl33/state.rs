//! Global state: error register, `glGet*` queries and fixed-function setters.

use gl::types::*;
use lustre::backend::state::State;

use crate::gl33::{driver_string, GL33};

/// Widest answer of a `glGet*` query we issue (a 4×4 matrix).
const MAX_STATE_VALUES: usize = 16;

// Driver queries write as many values as the key requires; go through a buffer large enough for
// any of them and copy what the caller asked for.
macro_rules! get_state {
  ($f:ident, $t:ty, $zero:expr, $pname:expr, $data:expr) => {{
    let mut scratch: [$t; MAX_STATE_VALUES] = [$zero; MAX_STATE_VALUES];
    unsafe { gl::$f($pname, scratch.as_mut_ptr()) };

    let len = $data.len().min(MAX_STATE_VALUES);
    $data[..len].copy_from_slice(&scratch[..len]);
  }};
}

unsafe impl State for GL33 {
  fn get_error(&mut self) -> GLenum {
    let pending = std::mem::replace(&mut self.pending_error, gl::NO_ERROR);

    if pending != gl::NO_ERROR {
      pending
    } else {
      unsafe { gl::GetError() }
    }
  }

  fn get_integer_v(&mut self, pname: GLenum, data: &mut [GLint]) {
    get_state!(GetIntegerv, GLint, 0, pname, data);
  }

  fn get_integer_i_v(&mut self, pname: GLenum, index: GLuint, data: &mut [GLint]) {
    let mut scratch = [0; MAX_STATE_VALUES];
    unsafe { gl::GetIntegeri_v(pname, index, scratch.as_mut_ptr()) };

    let len = data.len().min(MAX_STATE_VALUES);
    data[..len].copy_from_slice(&scratch[..len]);
  }

  fn get_float_v(&mut self, pname: GLenum, data: &mut [GLfloat]) {
    get_state!(GetFloatv, GLfloat, 0., pname, data);
  }

  fn get_double_v(&mut self, pname: GLenum, data: &mut [GLdouble]) {
    get_state!(GetDoublev, GLdouble, 0., pname, data);
  }

  fn get_boolean_v(&mut self, pname: GLenum, data: &mut [GLboolean]) {
    get_state!(GetBooleanv, GLboolean, gl::FALSE, pname, data);
  }

  fn get_string(&mut self, name: GLenum) -> Option<Vec<u8>> {
    unsafe { driver_string(gl::GetString(name)) }
  }

  fn is_enabled(&mut self, cap: GLenum) -> GLboolean {
    unsafe { gl::IsEnabled(cap) }
  }

  fn enable(&mut self, cap: GLenum) {
    unsafe { gl::Enable(cap) }
  }

  fn disable(&mut self, cap: GLenum) {
    unsafe { gl::Disable(cap) }
  }

  fn clear_color(&mut self, r: GLfloat, g: GLfloat, b: GLfloat, a: GLfloat) {
    unsafe { gl::ClearColor(r, g, b, a) }
  }

  fn clear_depth(&mut self, depth: GLdouble) {
    unsafe { gl::ClearDepth(depth) }
  }

  fn clear_stencil(&mut self, s: GLint) {
    unsafe { gl::ClearStencil(s) }
  }

  fn viewport(&mut self, x: GLint, y: GLint, width: GLsizei, height: GLsizei) {
    unsafe { gl::Viewport(x, y, width, height) }
  }

  fn scissor(&mut self, x: GLint, y: GLint, width: GLsizei, height: GLsizei) {
    unsafe { gl::Scissor(x, y, width, height) }
  }

  fn line_width(&mut self, width: GLfloat) {
    unsafe { gl::LineWidth(width) }
  }

  fn point_size(&mut self, size: GLfloat) {
    unsafe { gl::PointSize(size) }
  }

  fn polygon_mode(&mut self, face: GLenum, mode: GLenum) {
    unsafe { gl::PolygonMode(face, mode) }
  }

  fn depth_range(&mut self, near: GLdouble, far: GLdouble) {
    unsafe { gl::DepthRange(near, far) }
  }

  fn front_face(&mut self, mode: GLenum) {
    unsafe { gl::FrontFace(mode) }
  }

  fn cull_face(&mut self, mode: GLenum) {
    unsafe { gl::CullFace(mode) }
  }

  fn depth_func(&mut self, func: GLenum) {
    unsafe { gl::DepthFunc(func) }
  }

  fn depth_mask(&mut self, flag: GLboolean) {
    unsafe { gl::DepthMask(flag) }
  }

  fn active_texture(&mut self, texture: GLenum) {
    unsafe { gl::ActiveTexture(texture) }
  }
}
