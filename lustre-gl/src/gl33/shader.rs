//! Shader stage implementation.

use gl::types::*;
use lustre::backend::shader::Shader;

use crate::gl33::{count, read_string, GL33};

unsafe impl Shader for GL33 {
  fn create_shader(&mut self, ty: GLenum) -> GLuint {
    unsafe { gl::CreateShader(ty) }
  }

  fn delete_shader(&mut self, name: GLuint) {
    unsafe { gl::DeleteShader(name) }
  }

  fn is_shader(&mut self, name: GLuint) -> GLboolean {
    unsafe { gl::IsShader(name) }
  }

  fn shader_source(&mut self, name: GLuint, source: &[u8]) {
    let ptr = source.as_ptr() as *const GLchar;
    let len = count(source.len());

    unsafe { gl::ShaderSource(name, 1, &ptr, &len) }
  }

  fn get_shader_source(&mut self, name: GLuint) -> Vec<u8> {
    let len = self.get_shader_iv(name, gl::SHADER_SOURCE_LENGTH);

    unsafe {
      read_string(len, |size, written, buf| {
        gl::GetShaderSource(name, size, written, buf)
      })
    }
  }

  fn compile_shader(&mut self, name: GLuint) {
    unsafe { gl::CompileShader(name) }
  }

  fn get_shader_iv(&mut self, name: GLuint, pname: GLenum) -> GLint {
    let mut value = 0;
    unsafe { gl::GetShaderiv(name, pname, &mut value) };
    value
  }

  fn get_shader_info_log(&mut self, name: GLuint) -> Vec<u8> {
    let len = self.get_shader_iv(name, gl::INFO_LOG_LENGTH);

    unsafe {
      read_string(len, |size, written, buf| {
        gl::GetShaderInfoLog(name, size, written, buf)
      })
    }
  }
}
