//! Shader program backend interface.

use gl::types::*;
use std::ffi::CStr;

/// Program objects and uniform upload.
pub unsafe trait Program {
  /// `glCreateProgram`; returns 0 on failure.
  fn create_program(&mut self) -> GLuint;

  fn delete_program(&mut self, name: GLuint);

  fn is_program(&mut self, name: GLuint) -> GLboolean;

  fn attach_shader(&mut self, program: GLuint, shader: GLuint);

  fn detach_shader(&mut self, program: GLuint, shader: GLuint);

  fn link_program(&mut self, name: GLuint);

  fn validate_program(&mut self, name: GLuint);

  fn use_program(&mut self, name: GLuint);

  fn get_program_iv(&mut self, name: GLuint, pname: GLenum) -> GLint;

  /// `glGetProgramInfoLog`, without the trailing NUL.
  fn get_program_info_log(&mut self, name: GLuint) -> Vec<u8>;

  fn get_uniform_location(&mut self, program: GLuint, name: &CStr) -> GLint;

  fn get_attrib_location(&mut self, program: GLuint, name: &CStr) -> GLint;

  fn bind_attrib_location(&mut self, program: GLuint, index: GLuint, name: &CStr);

  /// `glUniform{1,2,3,4}iv`; `values.len()` is a multiple of `components`.
  fn uniform_iv(&mut self, location: GLint, components: usize, values: &[GLint]);

  /// `glUniform{1,2,3,4}uiv`.
  fn uniform_uiv(&mut self, location: GLint, components: usize, values: &[GLuint]);

  /// `glUniform{1,2,3,4}fv`.
  fn uniform_fv(&mut self, location: GLint, components: usize, values: &[GLfloat]);

  /// `glUniform{1,2,3,4}dv`.
  #[cfg(feature = "GL_ARB_gpu_shader_fp64")]
  fn uniform_dv(&mut self, location: GLint, components: usize, values: &[GLdouble]);

  /// `glUniformMatrix{2,3,4}fv`, column-major, never transposed.
  fn uniform_matrix_fv(&mut self, location: GLint, dim: usize, values: &[GLfloat]);
}
