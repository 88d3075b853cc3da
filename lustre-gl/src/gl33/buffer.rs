//! OpenGL buffer implementation.

use gl::types::*;
use lustre::backend::buffer::Buffer;
use std::ffi::c_void;
use std::ptr::null;

use crate::gl33::{bind_once, count, GL33};

unsafe impl Buffer for GL33 {
  fn create_buffers(&mut self, names: &mut [GLuint]) {
    unsafe {
      if self.dsa {
        gl::CreateBuffers(count(names.len()), names.as_mut_ptr());
      } else {
        gl::GenBuffers(count(names.len()), names.as_mut_ptr());
        bind_once(names, gl::COPY_WRITE_BUFFER_BINDING, |name| {
          gl::BindBuffer(gl::COPY_WRITE_BUFFER, name)
        });
      }
    }
  }

  fn delete_buffers(&mut self, names: &[GLuint]) {
    unsafe { gl::DeleteBuffers(count(names.len()), names.as_ptr()) }
  }

  fn is_buffer(&mut self, name: GLuint) -> GLboolean {
    unsafe { gl::IsBuffer(name) }
  }

  fn bind_buffer(&mut self, target: GLenum, name: GLuint) {
    unsafe { gl::BindBuffer(target, name) }
  }

  fn bind_buffer_base(&mut self, target: GLenum, index: GLuint, name: GLuint) {
    unsafe { gl::BindBufferBase(target, index, name) }
  }

  fn buffer_data(&mut self, target: GLenum, size: GLsizeiptr, data: Option<&[u8]>, usage: GLenum) {
    let ptr = match data {
      // the driver would read past the end of the slice
      Some(data) if (data.len() as GLsizeiptr) < size => {
        self.raise(gl::INVALID_VALUE);
        return;
      }
      Some(data) => data.as_ptr() as *const c_void,
      None => null(),
    };

    unsafe { gl::BufferData(target, size, ptr, usage) }
  }

  fn buffer_sub_data(&mut self, target: GLenum, offset: GLintptr, data: &[u8]) {
    unsafe {
      gl::BufferSubData(
        target,
        offset,
        data.len() as GLsizeiptr,
        data.as_ptr() as *const c_void,
      )
    }
  }

  fn get_buffer_sub_data(&mut self, target: GLenum, offset: GLintptr, data: &mut [u8]) {
    unsafe {
      gl::GetBufferSubData(
        target,
        offset,
        data.len() as GLsizeiptr,
        data.as_mut_ptr() as *mut c_void,
      )
    }
  }

  fn get_buffer_parameter(&mut self, name: GLuint, pname: GLenum) -> GLint64 {
    let mut value: GLint64 = 0;

    unsafe {
      if self.dsa {
        gl::GetNamedBufferParameteri64v(name, pname, &mut value);
      } else {
        let mut previous: GLint = 0;
        gl::GetIntegerv(gl::COPY_READ_BUFFER_BINDING, &mut previous);
        gl::BindBuffer(gl::COPY_READ_BUFFER, name);
        gl::GetBufferParameteri64v(gl::COPY_READ_BUFFER, pname, &mut value);
        gl::BindBuffer(gl::COPY_READ_BUFFER, previous as GLuint);
      }
    }

    value
  }
}
