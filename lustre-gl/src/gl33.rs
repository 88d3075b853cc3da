//! OpenGL 3.3 backend.
//!
//! This module implements the lustre backend traits for OpenGL 3.3 and later. The backend type is
//! [`GL33`].
//!
//! When the direct state access entry points of OpenGL 4.5 (`glCreate*`,
//! `glGetNamed*Parameter*`) are available, they are used to create objects and to query them by
//! name. Otherwise, names are generated with `glGen*` and bound once so that they become objects,
//! and per-name queries bind the object to a scratch target before restoring the previous
//! binding. Either way, the bindings observable by the caller are left untouched.

mod buffer;
mod label;
mod program;
mod query;
mod shader;
mod state;
mod sync;
mod texture;
mod vertex_array;

use gl::types::*;
use std::ffi::{c_void, CStr};
use std::marker::PhantomData;

/// An OpenGL 3.3 backend.
///
/// A value of this type stands for the OpenGL context that was current when it was loaded. It is
/// neither [`Send`] nor [`Sync`]: it must only be used on the thread owning that context.
#[derive(Debug)]
pub struct GL33 {
  dsa: bool,
  debug_labels: bool,
  // error raised by the backend itself, reported before the driver's
  pending_error: GLenum,
  _a: PhantomData<*const ()>, // !Send and !Sync
}

impl GL33 {
  /// Load the OpenGL function pointers and create the backend.
  ///
  /// `loader` maps an OpenGL symbol name to its address, as the `get_proc_address` function of a
  /// windowing crate does.
  ///
  /// # Safety
  ///
  /// An OpenGL 3.3 (or later) context must be current on the calling thread, and must stay current
  /// for as long as the returned value is used.
  pub unsafe fn load_with<F>(loader: F) -> Self
  where
    F: FnMut(&'static str) -> *const c_void,
  {
    gl::load_with(loader);

    let dsa = gl::CreateBuffers::is_loaded()
      && gl::CreateTextures::is_loaded()
      && gl::CreateQueries::is_loaded()
      && gl::CreateVertexArrays::is_loaded()
      && gl::GetNamedBufferParameteri64v::is_loaded();
    let debug_labels = gl::ObjectLabel::is_loaded() && gl::GetObjectLabel::is_loaded();

    log::info!(
      "OpenGL backend loaded; direct state access: {}, debug labels: {}",
      if dsa { "yes" } else { "no" },
      if debug_labels { "yes" } else { "no" },
    );

    GL33 {
      dsa,
      debug_labels,
      pending_error: gl::NO_ERROR,
      _a: PhantomData,
    }
  }

  /// Whether direct state access entry points are in use.
  pub fn has_dsa(&self) -> bool {
    self.dsa
  }

  /// Record an error detected by the backend, to be reported by the next `glGetError`.
  fn raise(&mut self, code: GLenum) {
    if self.pending_error == gl::NO_ERROR {
      self.pending_error = code;
    }
  }
}

/// Bind each name once so that it becomes an object, then restore the previous binding of the
/// target queried with `binding_query`.
unsafe fn bind_once(names: &[GLuint], binding_query: GLenum, bind: impl Fn(GLuint)) {
  let mut previous: GLint = 0;
  gl::GetIntegerv(binding_query, &mut previous);

  for &name in names {
    bind(name);
  }

  bind(previous as GLuint);
}

/// Copy a NUL-terminated string owned by the driver.
unsafe fn driver_string(ptr: *const GLubyte) -> Option<Vec<u8>> {
  if ptr.is_null() {
    None
  } else {
    Some(CStr::from_ptr(ptr as *const _).to_bytes().to_vec())
  }
}

/// Read a driver string of at most `len` bytes (NUL included) with `read`, which receives the
/// buffer size, a slot for the written length and the buffer.
unsafe fn read_string(len: GLint, read: impl FnOnce(GLsizei, &mut GLsizei, *mut GLchar)) -> Vec<u8> {
  if len <= 0 {
    return Vec::new();
  }

  let mut bytes = vec![0u8; len as usize];
  let mut written: GLsizei = 0;
  read(len, &mut written, bytes.as_mut_ptr() as *mut GLchar);

  bytes.truncate(written.clamp(0, len) as usize);
  bytes
}

/// Length of a slice as a native count.
fn count(len: usize) -> GLsizei {
  GLsizei::try_from(len).unwrap_or(GLsizei::MAX)
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::ffi::CString;

  #[test]
  fn null_driver_string() {
    assert_eq!(unsafe { driver_string(std::ptr::null()) }, None);
  }

  #[test]
  fn driver_string_stops_at_nul() {
    let s = CString::new("4.6.0 NVIDIA").unwrap();
    let bytes = unsafe { driver_string(s.as_ptr() as *const GLubyte) };

    assert_eq!(bytes.as_deref(), Some(&b"4.6.0 NVIDIA"[..]));
  }

  #[test]
  fn read_string_keeps_written_bytes_only() {
    let bytes = unsafe {
      read_string(16, |size, written, buf| {
        assert_eq!(size, 16);
        let src = b"abc\0";
        std::ptr::copy_nonoverlapping(src.as_ptr() as *const GLchar, buf, src.len());
        *written = 3;
      })
    };

    assert_eq!(bytes, b"abc");
  }

  #[test]
  fn empty_read_string_reads_nothing() {
    let bytes = unsafe { read_string(0, |_, _, _| panic!("nothing to read")) };
    assert!(bytes.is_empty());
  }

  #[test]
  fn counts_saturate() {
    assert_eq!(count(3), 3);
    assert_eq!(count(usize::MAX), GLsizei::MAX);
  }
}
