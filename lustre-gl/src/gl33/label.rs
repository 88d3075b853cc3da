//! Debug labels (`GL_KHR_debug`, core since OpenGL 4.3).
//!
//! On contexts lacking the entry points, every label call fails with `GL_INVALID_OPERATION`.

use gl::types::*;
use lustre::backend::label::Label;
use std::ffi::c_void;
use std::ptr::null_mut;

use crate::gl33::{count, read_string, GL33};

impl GL33 {
  fn require_debug_labels(&mut self) -> bool {
    if !self.debug_labels {
      log::warn!("object labels are not supported by this context");
      self.raise(gl::INVALID_OPERATION);
    }

    self.debug_labels
  }
}

unsafe impl Label for GL33 {
  fn object_label(&mut self, identifier: GLenum, name: GLuint, label: &[u8]) {
    if self.require_debug_labels() {
      unsafe {
        gl::ObjectLabel(
          identifier,
          name,
          count(label.len()),
          label.as_ptr() as *const GLchar,
        )
      }
    }
  }

  fn get_object_label(&mut self, identifier: GLenum, name: GLuint) -> Vec<u8> {
    if !self.require_debug_labels() {
      return Vec::new();
    }

    unsafe {
      let mut len: GLsizei = 0;
      gl::GetObjectLabel(identifier, name, 0, &mut len, null_mut());

      read_string(len + 1, |size, written, buf| {
        gl::GetObjectLabel(identifier, name, size, written, buf)
      })
    }
  }

  fn object_ptr_label(&mut self, ptr: usize, label: &[u8]) {
    if self.require_debug_labels() {
      unsafe {
        gl::ObjectPtrLabel(
          ptr as *const c_void,
          count(label.len()),
          label.as_ptr() as *const GLchar,
        )
      }
    }
  }

  fn get_object_ptr_label(&mut self, ptr: usize) -> Vec<u8> {
    if !self.require_debug_labels() {
      return Vec::new();
    }

    unsafe {
      let mut len: GLsizei = 0;
      gl::GetObjectPtrLabel(ptr as *const c_void, 0, &mut len, null_mut());

      read_string(len + 1, |size, written, buf| {
        gl::GetObjectPtrLabel(ptr as *const c_void, size, written, buf)
      })
    }
  }
}
