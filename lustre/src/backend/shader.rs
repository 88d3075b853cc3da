//! Shader stage backend interface.

use gl::types::*;

/// Shader objects.
pub unsafe trait Shader {
  /// `glCreateShader`; returns 0 on failure.
  fn create_shader(&mut self, ty: GLenum) -> GLuint;

  fn delete_shader(&mut self, name: GLuint);

  fn is_shader(&mut self, name: GLuint) -> GLboolean;

  fn shader_source(&mut self, name: GLuint, source: &[u8]);

  /// `glGetShaderSource`, without the trailing NUL.
  fn get_shader_source(&mut self, name: GLuint) -> Vec<u8>;

  fn compile_shader(&mut self, name: GLuint);

  fn get_shader_iv(&mut self, name: GLuint, pname: GLenum) -> GLint;

  /// `glGetShaderInfoLog`, without the trailing NUL.
  fn get_shader_info_log(&mut self, name: GLuint) -> Vec<u8>;
}
