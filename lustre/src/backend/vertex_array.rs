//! Vertex array backend interface.

use gl::types::*;

/// Vertex array objects and the attribute state of the bound one.
pub unsafe trait VertexArray {
  /// Allocate `names.len()` vertex array names.
  fn create_vertex_arrays(&mut self, names: &mut [GLuint]);

  fn delete_vertex_arrays(&mut self, names: &[GLuint]);

  fn is_vertex_array(&mut self, name: GLuint) -> GLboolean;

  fn bind_vertex_array(&mut self, name: GLuint);

  fn enable_vertex_attrib_array(&mut self, index: GLuint);

  fn disable_vertex_attrib_array(&mut self, index: GLuint);

  /// `glVertexAttribPointer`, or `glVertexAttribIPointer` when `integer` is set. `offset` is a
  /// byte offset into the bound array buffer.
  #[allow(clippy::too_many_arguments)]
  fn vertex_attrib_pointer(
    &mut self,
    index: GLuint,
    size: GLint,
    ty: GLenum,
    normalized: GLboolean,
    integer: bool,
    stride: GLsizei,
    offset: usize,
  );

  fn vertex_attrib_divisor(&mut self, index: GLuint, divisor: GLuint);

  fn get_vertex_attrib_iv(&mut self, index: GLuint, pname: GLenum) -> GLint;
}
