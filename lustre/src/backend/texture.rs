//! Texture backend interface.

use gl::types::*;

/// Texture objects.
pub unsafe trait Texture {
  /// Allocate `names.len()` texture names for `target`.
  fn create_textures(&mut self, target: GLenum, names: &mut [GLuint]);

  fn delete_textures(&mut self, names: &[GLuint]);

  fn is_texture(&mut self, name: GLuint) -> GLboolean;

  fn bind_texture(&mut self, target: GLenum, name: GLuint);

  fn tex_parameter_i(&mut self, target: GLenum, pname: GLenum, param: GLint);

  fn get_tex_parameter_iv(&mut self, target: GLenum, pname: GLenum) -> GLint;

  fn get_tex_level_parameter_iv(&mut self, target: GLenum, level: GLint, pname: GLenum) -> GLint;

  #[allow(clippy::too_many_arguments)]
  fn tex_image_2d(
    &mut self,
    target: GLenum,
    level: GLint,
    internal_format: GLint,
    width: GLsizei,
    height: GLsizei,
    format: GLenum,
    ty: GLenum,
    data: Option<&[u8]>,
  );

  fn generate_mipmap(&mut self, target: GLenum);
}
