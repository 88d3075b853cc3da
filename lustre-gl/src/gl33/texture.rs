//! OpenGL texture implementation.

use gl::types::*;
use lustre::backend::texture::Texture;
use std::ffi::c_void;
use std::ptr::null;

use crate::gl33::{bind_once, count, GL33};

/// State key holding the texture bound to `target` on the active unit.
fn binding_query(target: GLenum) -> Option<GLenum> {
  match target {
    gl::TEXTURE_1D => Some(gl::TEXTURE_BINDING_1D),
    gl::TEXTURE_2D => Some(gl::TEXTURE_BINDING_2D),
    gl::TEXTURE_3D => Some(gl::TEXTURE_BINDING_3D),
    gl::TEXTURE_1D_ARRAY => Some(gl::TEXTURE_BINDING_1D_ARRAY),
    gl::TEXTURE_2D_ARRAY => Some(gl::TEXTURE_BINDING_2D_ARRAY),
    gl::TEXTURE_CUBE_MAP => Some(gl::TEXTURE_BINDING_CUBE_MAP),
    gl::TEXTURE_RECTANGLE => Some(gl::TEXTURE_BINDING_RECTANGLE),
    _ => None,
  }
}

unsafe impl Texture for GL33 {
  fn create_textures(&mut self, target: GLenum, names: &mut [GLuint]) {
    if self.dsa {
      unsafe { gl::CreateTextures(target, count(names.len()), names.as_mut_ptr()) };
      return;
    }

    // the target of a texture is fixed by its first binding
    let query = match binding_query(target) {
      Some(query) => query,
      None => {
        self.raise(gl::INVALID_ENUM);
        return;
      }
    };

    unsafe {
      gl::GenTextures(count(names.len()), names.as_mut_ptr());
      bind_once(names, query, |name| gl::BindTexture(target, name));
    }
  }

  fn delete_textures(&mut self, names: &[GLuint]) {
    unsafe { gl::DeleteTextures(count(names.len()), names.as_ptr()) }
  }

  fn is_texture(&mut self, name: GLuint) -> GLboolean {
    unsafe { gl::IsTexture(name) }
  }

  fn bind_texture(&mut self, target: GLenum, name: GLuint) {
    unsafe { gl::BindTexture(target, name) }
  }

  fn tex_parameter_i(&mut self, target: GLenum, pname: GLenum, param: GLint) {
    unsafe { gl::TexParameteri(target, pname, param) }
  }

  fn get_tex_parameter_iv(&mut self, target: GLenum, pname: GLenum) -> GLint {
    let mut value = 0;
    unsafe { gl::GetTexParameteriv(target, pname, &mut value) };
    value
  }

  fn get_tex_level_parameter_iv(&mut self, target: GLenum, level: GLint, pname: GLenum) -> GLint {
    let mut value = 0;
    unsafe { gl::GetTexLevelParameteriv(target, level, pname, &mut value) };
    value
  }

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
  ) {
    let ptr = data.map_or(null(), |data| data.as_ptr() as *const c_void);

    unsafe {
      gl::TexImage2D(
        target,
        level,
        internal_format,
        width,
        height,
        0,
        format,
        ty,
        ptr,
      )
    }
  }

  fn generate_mipmap(&mut self, target: GLenum) {
    unsafe { gl::GenerateMipmap(target) }
  }
}
