//! Shader program and uniform implementation.

use gl::types::*;
use lustre::backend::program::Program;
use std::ffi::CStr;

use crate::gl33::{read_string, GL33};

/// Number of elements in `len` values of `components` components each.
fn element_count(len: usize, components: usize) -> Option<GLsizei> {
  if components == 0 || len % components != 0 {
    None
  } else {
    GLsizei::try_from(len / components).ok()
  }
}

// Forward a vector uniform upload to the entry point matching its component count.
macro_rules! uniform_vec {
  ($backend:ident, $location:ident, $components:ident, $values:ident, $f1:ident, $f2:ident, $f3:ident, $f4:ident) => {{
    let n = match element_count($values.len(), $components) {
      Some(n) => n,
      None => {
        $backend.raise(gl::INVALID_VALUE);
        return;
      }
    };
    let ptr = $values.as_ptr();

    unsafe {
      match $components {
        1 => gl::$f1($location, n, ptr),
        2 => gl::$f2($location, n, ptr),
        3 => gl::$f3($location, n, ptr),
        4 => gl::$f4($location, n, ptr),
        _ => $backend.raise(gl::INVALID_VALUE),
      }
    }
  }};
}

unsafe impl Program for GL33 {
  fn create_program(&mut self) -> GLuint {
    unsafe { gl::CreateProgram() }
  }

  fn delete_program(&mut self, name: GLuint) {
    unsafe { gl::DeleteProgram(name) }
  }

  fn is_program(&mut self, name: GLuint) -> GLboolean {
    unsafe { gl::IsProgram(name) }
  }

  fn attach_shader(&mut self, program: GLuint, shader: GLuint) {
    unsafe { gl::AttachShader(program, shader) }
  }

  fn detach_shader(&mut self, program: GLuint, shader: GLuint) {
    unsafe { gl::DetachShader(program, shader) }
  }

  fn link_program(&mut self, name: GLuint) {
    unsafe { gl::LinkProgram(name) }
  }

  fn validate_program(&mut self, name: GLuint) {
    unsafe { gl::ValidateProgram(name) }
  }

  fn use_program(&mut self, name: GLuint) {
    unsafe { gl::UseProgram(name) }
  }

  fn get_program_iv(&mut self, name: GLuint, pname: GLenum) -> GLint {
    let mut value = 0;
    unsafe { gl::GetProgramiv(name, pname, &mut value) };
    value
  }

  fn get_program_info_log(&mut self, name: GLuint) -> Vec<u8> {
    let len = self.get_program_iv(name, gl::INFO_LOG_LENGTH);

    unsafe {
      read_string(len, |size, written, buf| {
        gl::GetProgramInfoLog(name, size, written, buf)
      })
    }
  }

  fn get_uniform_location(&mut self, program: GLuint, name: &CStr) -> GLint {
    unsafe { gl::GetUniformLocation(program, name.as_ptr() as *const GLchar) }
  }

  fn get_attrib_location(&mut self, program: GLuint, name: &CStr) -> GLint {
    unsafe { gl::GetAttribLocation(program, name.as_ptr() as *const GLchar) }
  }

  fn bind_attrib_location(&mut self, program: GLuint, index: GLuint, name: &CStr) {
    unsafe { gl::BindAttribLocation(program, index, name.as_ptr() as *const GLchar) }
  }

  fn uniform_iv(&mut self, location: GLint, components: usize, values: &[GLint]) {
    uniform_vec!(self, location, components, values, Uniform1iv, Uniform2iv, Uniform3iv, Uniform4iv);
  }

  fn uniform_uiv(&mut self, location: GLint, components: usize, values: &[GLuint]) {
    uniform_vec!(self, location, components, values, Uniform1uiv, Uniform2uiv, Uniform3uiv, Uniform4uiv);
  }

  fn uniform_fv(&mut self, location: GLint, components: usize, values: &[GLfloat]) {
    uniform_vec!(self, location, components, values, Uniform1fv, Uniform2fv, Uniform3fv, Uniform4fv);
  }

  #[cfg(feature = "GL_ARB_gpu_shader_fp64")]
  fn uniform_dv(&mut self, location: GLint, components: usize, values: &[GLdouble]) {
    uniform_vec!(self, location, components, values, Uniform1dv, Uniform2dv, Uniform3dv, Uniform4dv);
  }

  fn uniform_matrix_fv(&mut self, location: GLint, dim: usize, values: &[GLfloat]) {
    let n = match element_count(values.len(), dim * dim) {
      Some(n) => n,
      None => {
        self.raise(gl::INVALID_VALUE);
        return;
      }
    };
    let ptr = values.as_ptr();

    // matrices are given column by column
    unsafe {
      match dim {
        2 => gl::UniformMatrix2fv(location, n, gl::FALSE, ptr),
        3 => gl::UniformMatrix3fv(location, n, gl::FALSE, ptr),
        4 => gl::UniformMatrix4fv(location, n, gl::FALSE, ptr),
        _ => self.raise(gl::INVALID_VALUE),
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn whole_elements_only() {
    assert_eq!(element_count(12, 3), Some(4));
    assert_eq!(element_count(16, 16), Some(1));
    assert_eq!(element_count(5, 2), None);
    assert_eq!(element_count(4, 0), None);
  }
}
