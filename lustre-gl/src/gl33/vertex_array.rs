//! Vertex array implementation.

use gl::types::*;
use lustre::backend::vertex_array::VertexArray;
use std::ffi::c_void;

use crate::gl33::{bind_once, count, GL33};

unsafe impl VertexArray for GL33 {
  fn create_vertex_arrays(&mut self, names: &mut [GLuint]) {
    unsafe {
      if self.dsa {
        gl::CreateVertexArrays(count(names.len()), names.as_mut_ptr());
      } else {
        gl::GenVertexArrays(count(names.len()), names.as_mut_ptr());
        bind_once(names, gl::VERTEX_ARRAY_BINDING, |name| {
          gl::BindVertexArray(name)
        });
      }
    }
  }

  fn delete_vertex_arrays(&mut self, names: &[GLuint]) {
    unsafe { gl::DeleteVertexArrays(count(names.len()), names.as_ptr()) }
  }

  fn is_vertex_array(&mut self, name: GLuint) -> GLboolean {
    unsafe { gl::IsVertexArray(name) }
  }

  fn bind_vertex_array(&mut self, name: GLuint) {
    unsafe { gl::BindVertexArray(name) }
  }

  fn enable_vertex_attrib_array(&mut self, index: GLuint) {
    unsafe { gl::EnableVertexAttribArray(index) }
  }

  fn disable_vertex_attrib_array(&mut self, index: GLuint) {
    unsafe { gl::DisableVertexAttribArray(index) }
  }

  fn vertex_attrib_pointer(
    &mut self,
    index: GLuint,
    size: GLint,
    ty: GLenum,
    normalized: GLboolean,
    integer: bool,
    stride: GLsizei,
    offset: usize,
  ) {
    // an offset into the bound array buffer, never dereferenced on our side
    let offset = offset as *const c_void;

    unsafe {
      if integer {
        gl::VertexAttribIPointer(index, size, ty, stride, offset);
      } else {
        gl::VertexAttribPointer(index, size, ty, normalized, stride, offset);
      }
    }
  }

  fn vertex_attrib_divisor(&mut self, index: GLuint, divisor: GLuint) {
    unsafe { gl::VertexAttribDivisor(index, divisor) }
  }

  fn get_vertex_attrib_iv(&mut self, index: GLuint, pname: GLenum) -> GLint {
    let mut value = 0;
    unsafe { gl::GetVertexAttribiv(index, pname, &mut value) };
    value
  }
}
