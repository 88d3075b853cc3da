//! Upload a 2D image, set its parameters and generate its mipmaps.

use lustre::binding::TEXTURE_2D;
use lustre::texture::{
  MagFilter, MinFilter, TexelFormat, Texture, TextureParameter, TextureTarget, Wrap,
};
use lustre::{Context, Error, Object as _};
use lustre_gl::GL33;

pub fn fixture(ctx: &mut Context<GL33>) -> Result<(), Error> {
  let texture = Texture::create(ctx, TextureTarget::Dim2)?;
  let texels = vec![0x7F; 8 * 4 * 4];

  TEXTURE_2D.set(ctx, texture)?;
  TEXTURE_2D.image_2d(ctx, 0, TexelFormat::RGBA8, 8, 4, Some(&texels))?;
  assert_eq!(TEXTURE_2D.level_size(ctx, 0)?, [8, 4, 1]);

  TEXTURE_2D.set_filters(ctx, MinFilter::LinearMipmapLinear, MagFilter::Nearest)?;
  TEXTURE_2D.set_wrap(ctx, Wrap::ClampToEdge)?;
  assert_eq!(
    TEXTURE_2D.parameter(ctx, TextureParameter::MagFilter)?,
    gl::NEAREST as i32
  );
  assert_eq!(
    TEXTURE_2D.parameter(ctx, TextureParameter::WrapT)?,
    gl::CLAMP_TO_EDGE as i32
  );

  TEXTURE_2D.generate_mipmap(ctx)?;
  assert_eq!(TEXTURE_2D.level_size(ctx, 1)?, [4, 2, 1]);
  assert_eq!(TEXTURE_2D.level_size(ctx, 3)?, [1, 1, 1]);

  // storage without texels
  TEXTURE_2D.image_2d(ctx, 0, TexelFormat::R32F, 16, 16, None)?;
  assert_eq!(TEXTURE_2D.level_size(ctx, 0)?, [16, 16, 1]);

  TEXTURE_2D.set(ctx, Texture::NULL)?;
  texture.delete(ctx)
}

