//! Query object backend interface.

use gl::types::*;

/// Query objects.
pub unsafe trait Query {
  /// Allocate `names.len()` query names for `target`.
  fn create_queries(&mut self, target: GLenum, names: &mut [GLuint]);

  fn delete_queries(&mut self, names: &[GLuint]);

  fn is_query(&mut self, name: GLuint) -> GLboolean;

  fn begin_query(&mut self, target: GLenum, name: GLuint);

  fn end_query(&mut self, target: GLenum);

  /// `glQueryCounter` with `GL_TIMESTAMP`.
  fn query_counter(&mut self, name: GLuint);

  /// `glGetQueryObjecti64v`.
  fn get_query_object_i64(&mut self, name: GLuint, pname: GLenum) -> GLint64;
}
