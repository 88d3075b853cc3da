//! Global state backend interface.
//!
//! Error register, state queries and the fixed-function setters.

use gl::types::*;

/// Global state access.
pub unsafe trait State {
  /// Read and clear the error register (`glGetError`).
  fn get_error(&mut self) -> GLenum;

  /// `glGetIntegerv`; `data` is sized by the caller to the number of values `pname` returns.
  fn get_integer_v(&mut self, pname: GLenum, data: &mut [GLint]);

  /// `glGetIntegeri_v`.
  fn get_integer_i_v(&mut self, pname: GLenum, index: GLuint, data: &mut [GLint]);

  /// `glGetFloatv`.
  fn get_float_v(&mut self, pname: GLenum, data: &mut [GLfloat]);

  /// `glGetDoublev`.
  fn get_double_v(&mut self, pname: GLenum, data: &mut [GLdouble]);

  /// `glGetBooleanv`.
  fn get_boolean_v(&mut self, pname: GLenum, data: &mut [GLboolean]);

  /// `glGetString`; `None` if the driver returned a null pointer.
  fn get_string(&mut self, name: GLenum) -> Option<Vec<u8>>;

  /// `glIsEnabled`.
  fn is_enabled(&mut self, cap: GLenum) -> GLboolean;

  /// `glEnable`.
  fn enable(&mut self, cap: GLenum);

  /// `glDisable`.
  fn disable(&mut self, cap: GLenum);

  fn clear_color(&mut self, r: GLfloat, g: GLfloat, b: GLfloat, a: GLfloat);

  fn clear_depth(&mut self, depth: GLdouble);

  fn clear_stencil(&mut self, s: GLint);

  fn viewport(&mut self, x: GLint, y: GLint, width: GLsizei, height: GLsizei);

  fn scissor(&mut self, x: GLint, y: GLint, width: GLsizei, height: GLsizei);

  fn line_width(&mut self, width: GLfloat);

  fn point_size(&mut self, size: GLfloat);

  fn polygon_mode(&mut self, face: GLenum, mode: GLenum);

  fn depth_range(&mut self, near: GLdouble, far: GLdouble);

  fn front_face(&mut self, mode: GLenum);

  fn cull_face(&mut self, mode: GLenum);

  fn depth_func(&mut self, func: GLenum);

  fn depth_mask(&mut self, flag: GLboolean);

  /// `glActiveTexture`; `texture` is `GL_TEXTURE0 + unit`.
  fn active_texture(&mut self, texture: GLenum);
}
