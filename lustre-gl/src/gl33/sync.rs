//! Sync object implementation.
//!
//! `GLsync` handles cross the backend interface as addresses.

use gl::types::*;
use lustre::backend::sync::Sync;
use std::ptr::null_mut;

use crate::gl33::GL33;

unsafe impl Sync for GL33 {
  fn fence_sync(&mut self, condition: GLenum, flags: GLbitfield) -> usize {
    unsafe { gl::FenceSync(condition, flags) as usize }
  }

  fn delete_sync(&mut self, sync: usize) {
    unsafe { gl::DeleteSync(sync as GLsync) }
  }

  fn is_sync(&mut self, sync: usize) -> GLboolean {
    unsafe { gl::IsSync(sync as GLsync) }
  }

  fn client_wait_sync(&mut self, sync: usize, flags: GLbitfield, timeout: GLuint64) -> GLenum {
    unsafe { gl::ClientWaitSync(sync as GLsync, flags, timeout) }
  }

  fn wait_sync(&mut self, sync: usize) {
    unsafe { gl::WaitSync(sync as GLsync, 0, gl::TIMEOUT_IGNORED) }
  }

  fn get_sync_iv(&mut self, sync: usize, pname: GLenum) -> GLint {
    let mut value = 0;
    unsafe { gl::GetSynciv(sync as GLsync, pname, 1, null_mut(), &mut value) };
    value
  }
}
