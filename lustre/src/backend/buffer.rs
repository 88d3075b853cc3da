//! Buffer backend interface.

use gl::types::*;

/// Buffer objects.
pub unsafe trait Buffer {
  /// Allocate `names.len()` buffer names and write them to `names`.
  fn create_buffers(&mut self, names: &mut [GLuint]);

  fn delete_buffers(&mut self, names: &[GLuint]);

  fn is_buffer(&mut self, name: GLuint) -> GLboolean;

  fn bind_buffer(&mut self, target: GLenum, name: GLuint);

  /// `glBindBufferBase`, for indexed targets.
  fn bind_buffer_base(&mut self, target: GLenum, index: GLuint, name: GLuint);

  /// `glBufferData`. When `data` is `None`, `size` bytes of storage are allocated uninitialized.
  fn buffer_data(&mut self, target: GLenum, size: GLsizeiptr, data: Option<&[u8]>, usage: GLenum);

  fn buffer_sub_data(&mut self, target: GLenum, offset: GLintptr, data: &[u8]);

  fn get_buffer_sub_data(&mut self, target: GLenum, offset: GLintptr, data: &mut [u8]);

  /// Query a parameter of the buffer named `name`, regardless of where it is bound.
  fn get_buffer_parameter(&mut self, name: GLuint, pname: GLenum) -> GLint64;
}
