//! Debug label backend interface.

use gl::types::*;

/// Object labeling (`KHR_debug`, core since OpenGL 4.3).
pub unsafe trait Label {
  /// `glObjectLabel`. `identifier` is the object namespace (`GL_BUFFER`, `GL_TEXTURE`, …).
  fn object_label(&mut self, identifier: GLenum, name: GLuint, label: &[u8]);

  /// `glGetObjectLabel`, returning the label bytes without the trailing NUL.
  fn get_object_label(&mut self, identifier: GLenum, name: GLuint) -> Vec<u8>;

  /// `glObjectPtrLabel`, for sync objects. `ptr` is the sync object address.
  fn object_ptr_label(&mut self, ptr: usize, label: &[u8]);

  /// `glGetObjectPtrLabel`.
  fn get_object_ptr_label(&mut self, ptr: usize) -> Vec<u8>;
}
