//! Sync object backend interface.
//!
//! Sync objects are named by pointers rather than integers; they travel through this interface as
//! addresses.

use gl::types::*;

/// Sync objects.
pub unsafe trait Sync {
  /// `glFenceSync`; returns 0 on failure.
  fn fence_sync(&mut self, condition: GLenum, flags: GLbitfield) -> usize;

  fn delete_sync(&mut self, sync: usize);

  fn is_sync(&mut self, sync: usize) -> GLboolean;

  /// `glClientWaitSync`; `timeout` is in nanoseconds.
  fn client_wait_sync(&mut self, sync: usize, flags: GLbitfield, timeout: GLuint64) -> GLenum;

  /// `glWaitSync` with `GL_TIMEOUT_IGNORED`.
  fn wait_sync(&mut self, sync: usize);

  fn get_sync_iv(&mut self, sync: usize, pname: GLenum) -> GLint;
}
