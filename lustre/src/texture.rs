//! Textures.
//!
//! A [`Texture`] is created for a given [`TextureTarget`] and can only ever be bound to that
//! target. Its parameters and images are edited through the texture binding points
//! ([`TEXTURE_2D`](crate::binding::TEXTURE_2D), …), on the active texture unit.

use gl::types::*;

use crate::backend::Backend;
use crate::binding::{Bindable, BindingPoint};
use crate::context::{non_negative, Context};
use crate::error::{Error, PreconditionError};
use crate::handle::{named_object, Object, ObjectKind};
use crate::label::{self, LabelTarget};

named_object! {
  /// A texture object.
  Texture, Texture
}

impl Texture {
  /// Create a single texture for `target`.
  pub fn create<B>(ctx: &mut Context<B>, target: TextureTarget) -> Result<Self, Error>
  where
    B: Backend,
  {
    let mut names = [0];
    ctx.backend().create_textures(target.to_glenum(), &mut names);
    ctx.check()?;
    crate::batch::single(names[0]).map(Self::from_raw)
  }

  /// Create `count` textures for `target` in a single native call.
  pub fn create_many<B>(
    ctx: &mut Context<B>,
    target: TextureTarget,
    count: usize,
  ) -> Result<Vec<Self>, Error>
  where
    B: Backend,
  {
    let mut dst = vec![Texture::NULL; count];
    crate::batch::fill(ctx, &mut dst, |ctx, names| {
      ctx.backend().create_textures(target.to_glenum(), names)
    })?;
    Ok(dst)
  }

  /// Create `count` textures for `target` into `dst[index..index + count]`.
  pub fn create_into<B>(
    ctx: &mut Context<B>,
    target: TextureTarget,
    dst: &mut [Self],
    index: GLsizei,
    count: GLsizei,
  ) -> Result<(), Error>
  where
    B: Backend,
  {
    let range = crate::batch::range(dst.len(), index, count)?;
    crate::batch::fill(ctx, &mut dst[range], |ctx, names| {
      ctx.backend().create_textures(target.to_glenum(), names)
    })
  }

  /// Delete several textures in a single native call.
  pub fn delete_many<B>(ctx: &mut Context<B>, textures: &[Self]) -> Result<(), Error>
  where
    B: Backend,
  {
    let names = crate::batch::names(textures)?;
    ctx.backend().delete_textures(&names);
    ctx.check()
  }
}

impl Object for Texture {
  const KIND: ObjectKind = ObjectKind::Texture;

  fn is_null(&self) -> bool {
    !self.handle().is_allocated()
  }

  fn label<B>(&self, ctx: &mut Context<B>) -> Result<String, Error>
  where
    B: Backend,
  {
    let target = LabelTarget::Name(Self::KIND.identifier(), self.live()?);
    label::get(ctx, target)
  }

  fn set_label<B>(&self, ctx: &mut Context<B>, label: &str) -> Result<(), Error>
  where
    B: Backend,
  {
    let target = LabelTarget::Name(Self::KIND.identifier(), self.live()?);
    label::set(ctx, target, label)
  }

  fn is_valid<B>(&self, ctx: &mut Context<B>) -> Result<bool, Error>
  where
    B: Backend,
  {
    let name = self.live()?;
    let valid = ctx.backend().is_texture(name);
    ctx.check()?;
    Ok(valid == gl::TRUE)
  }

  fn delete<B>(self, ctx: &mut Context<B>) -> Result<(), Error>
  where
    B: Backend,
  {
    let name = self.live()?;
    ctx.backend().delete_textures(&[name]);
    ctx.check()
  }
}

/// Kind of texture, fixed at creation.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TextureTarget {
  /// 1D.
  Dim1,
  /// 2D.
  Dim2,
  /// 3D.
  Dim3,
  /// Array of 1D textures.
  Dim1Array,
  /// Array of 2D textures.
  Dim2Array,
  /// Cube map: six square 2D faces.
  CubeMap,
  /// 2D texture addressed with unnormalized coordinates, without mipmaps.
  Rectangle,
}

impl TextureTarget {
  pub(crate) fn to_glenum(self) -> GLenum {
    match self {
      TextureTarget::Dim1 => gl::TEXTURE_1D,
      TextureTarget::Dim2 => gl::TEXTURE_2D,
      TextureTarget::Dim3 => gl::TEXTURE_3D,
      TextureTarget::Dim1Array => gl::TEXTURE_1D_ARRAY,
      TextureTarget::Dim2Array => gl::TEXTURE_2D_ARRAY,
      TextureTarget::CubeMap => gl::TEXTURE_CUBE_MAP,
      TextureTarget::Rectangle => gl::TEXTURE_RECTANGLE,
    }
  }
}

impl Bindable for Texture {
  type Target = TextureTarget;

  fn binding_query(target: TextureTarget) -> GLenum {
    match target {
      TextureTarget::Dim1 => gl::TEXTURE_BINDING_1D,
      TextureTarget::Dim2 => gl::TEXTURE_BINDING_2D,
      TextureTarget::Dim3 => gl::TEXTURE_BINDING_3D,
      TextureTarget::Dim1Array => gl::TEXTURE_BINDING_1D_ARRAY,
      TextureTarget::Dim2Array => gl::TEXTURE_BINDING_2D_ARRAY,
      TextureTarget::CubeMap => gl::TEXTURE_BINDING_CUBE_MAP,
      TextureTarget::Rectangle => gl::TEXTURE_BINDING_RECTANGLE,
    }
  }

  fn bind_raw<B>(backend: &mut B, target: TextureTarget, name: GLuint)
  where
    B: Backend,
  {
    backend.bind_texture(target.to_glenum(), name);
  }

  fn from_bound(name: GLuint) -> Self {
    Texture::from_raw(name)
  }

  fn bound_name(&self) -> GLuint {
    self.raw()
  }
}

/// Integer parameters of a texture.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TextureParameter {
  MinFilter,
  MagFilter,
  WrapS,
  WrapT,
  WrapR,
  /// Lowest mipmap level sampled.
  BaseLevel,
  /// Highest mipmap level sampled.
  MaxLevel,
}

impl TextureParameter {
  fn to_glenum(self) -> GLenum {
    match self {
      TextureParameter::MinFilter => gl::TEXTURE_MIN_FILTER,
      TextureParameter::MagFilter => gl::TEXTURE_MAG_FILTER,
      TextureParameter::WrapS => gl::TEXTURE_WRAP_S,
      TextureParameter::WrapT => gl::TEXTURE_WRAP_T,
      TextureParameter::WrapR => gl::TEXTURE_WRAP_R,
      TextureParameter::BaseLevel => gl::TEXTURE_BASE_LEVEL,
      TextureParameter::MaxLevel => gl::TEXTURE_MAX_LEVEL,
    }
  }
}

/// How to wrap texture coordinates while sampling textures?
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Wrap {
  /// Coordinates outside of *[0;1]* are clamped to either *0* or *1*.
  ClampToEdge,
  /// Coordinates outside of *[0;1]* sample the border color.
  ClampToBorder,
  /// Only the fractional part of coordinates is used.
  Repeat,
  /// Same as `Repeat` but alternating between *[0;1]* and *[1;0]*.
  MirroredRepeat,
}

impl Wrap {
  fn to_glenum(self) -> GLenum {
    match self {
      Wrap::ClampToEdge => gl::CLAMP_TO_EDGE,
      Wrap::ClampToBorder => gl::CLAMP_TO_BORDER,
      Wrap::Repeat => gl::REPEAT,
      Wrap::MirroredRepeat => gl::MIRRORED_REPEAT,
    }
  }
}

/// Minification filter.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum MinFilter {
  /// Nearest interpolation.
  Nearest,
  /// Linear interpolation between surrounding pixels.
  Linear,
  /// Nearest mipmap, nearest interpolation.
  NearestMipmapNearest,
  /// Nearest mipmap, linear interpolation.
  NearestMipmapLinear,
  /// Linear interpolation between two mipmaps sampled with a nearest filter.
  LinearMipmapNearest,
  /// Linear interpolation between two mipmaps sampled with a linear filter.
  LinearMipmapLinear,
}

impl MinFilter {
  fn to_glenum(self) -> GLenum {
    match self {
      MinFilter::Nearest => gl::NEAREST,
      MinFilter::Linear => gl::LINEAR,
      MinFilter::NearestMipmapNearest => gl::NEAREST_MIPMAP_NEAREST,
      MinFilter::NearestMipmapLinear => gl::NEAREST_MIPMAP_LINEAR,
      MinFilter::LinearMipmapNearest => gl::LINEAR_MIPMAP_NEAREST,
      MinFilter::LinearMipmapLinear => gl::LINEAR_MIPMAP_LINEAR,
    }
  }
}

/// Magnification filter.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum MagFilter {
  /// Nearest interpolation.
  Nearest,
  /// Linear interpolation between surrounding pixels.
  Linear,
}

impl MagFilter {
  fn to_glenum(self) -> GLenum {
    match self {
      MagFilter::Nearest => gl::NEAREST,
      MagFilter::Linear => gl::LINEAR,
    }
  }
}

/// Storage format of texels, along with the client-side layout used to upload them.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TexelFormat {
  R8,
  RG8,
  RGB8,
  RGBA8,
  R32F,
  RGBA32F,
  Depth32F,
}

impl TexelFormat {
  /// `(internal format, format, type)` triple.
  pub(crate) fn to_glenums(self) -> (GLenum, GLenum, GLenum) {
    match self {
      TexelFormat::R8 => (gl::R8, gl::RED, gl::UNSIGNED_BYTE),
      TexelFormat::RG8 => (gl::RG8, gl::RG, gl::UNSIGNED_BYTE),
      TexelFormat::RGB8 => (gl::RGB8, gl::RGB, gl::UNSIGNED_BYTE),
      TexelFormat::RGBA8 => (gl::RGBA8, gl::RGBA, gl::UNSIGNED_BYTE),
      TexelFormat::R32F => (gl::R32F, gl::RED, gl::FLOAT),
      TexelFormat::RGBA32F => (gl::RGBA32F, gl::RGBA, gl::FLOAT),
      TexelFormat::Depth32F => (gl::DEPTH_COMPONENT32F, gl::DEPTH_COMPONENT, gl::FLOAT),
    }
  }

  /// Size of a single texel, in bytes.
  pub fn bytes(self) -> usize {
    match self {
      TexelFormat::R8 => 1,
      TexelFormat::RG8 => 2,
      TexelFormat::RGB8 => 3,
      TexelFormat::RGBA8 => 4,
      TexelFormat::R32F => 4,
      TexelFormat::RGBA32F => 16,
      TexelFormat::Depth32F => 4,
    }
  }
}

/// Default unpack alignment; rows of uploaded images start on multiples of it.
const UNPACK_ALIGNMENT: usize = 4;

/// Number of bytes the driver reads for a `width × height` image; `None` if it overflows.
fn image_2d_size(format: TexelFormat, width: u32, height: u32) -> Option<usize> {
  let row = usize::try_from(width).ok()?.checked_mul(format.bytes())?;
  let row = row.checked_add(UNPACK_ALIGNMENT - 1)? / UNPACK_ALIGNMENT * UNPACK_ALIGNMENT;
  row.checked_mul(usize::try_from(height).ok()?)
}

impl BindingPoint<Texture> {
  /// Read an integer parameter of the bound texture.
  pub fn parameter<B>(&self, ctx: &mut Context<B>, param: TextureParameter) -> Result<i32, Error>
  where
    B: Backend,
  {
    let target = self.target().to_glenum();
    let value = ctx
      .backend()
      .get_tex_parameter_iv(target, param.to_glenum());
    ctx.check()?;
    Ok(value)
  }

  /// Set an integer parameter of the bound texture.
  pub fn set_parameter<B>(
    &self,
    ctx: &mut Context<B>,
    param: TextureParameter,
    value: i32,
  ) -> Result<(), Error>
  where
    B: Backend,
  {
    let target = self.target().to_glenum();
    ctx
      .backend()
      .tex_parameter_i(target, param.to_glenum(), value);
    ctx.check()
  }

  /// Set both filters of the bound texture.
  pub fn set_filters<B>(
    &self,
    ctx: &mut Context<B>,
    min: MinFilter,
    mag: MagFilter,
  ) -> Result<(), Error>
  where
    B: Backend,
  {
    self.set_parameter(ctx, TextureParameter::MinFilter, min.to_glenum() as GLint)?;
    self.set_parameter(ctx, TextureParameter::MagFilter, mag.to_glenum() as GLint)
  }

  /// Set the wrapping of the bound texture along all three coordinates.
  pub fn set_wrap<B>(&self, ctx: &mut Context<B>, wrap: Wrap) -> Result<(), Error>
  where
    B: Backend,
  {
    let wrap = wrap.to_glenum() as GLint;

    for param in [
      TextureParameter::WrapS,
      TextureParameter::WrapT,
      TextureParameter::WrapR,
    ] {
      self.set_parameter(ctx, param, wrap)?;
    }

    Ok(())
  }

  /// `[width, height, depth]` of a mipmap level of the bound texture.
  pub fn level_size<B>(&self, ctx: &mut Context<B>, level: i32) -> Result<[usize; 3], Error>
  where
    B: Backend,
  {
    let target = self.target().to_glenum();
    let mut size = [0; 3];

    for (dim, pname) in size
      .iter_mut()
      .zip([gl::TEXTURE_WIDTH, gl::TEXTURE_HEIGHT, gl::TEXTURE_DEPTH])
    {
      let value = ctx
        .backend()
        .get_tex_level_parameter_iv(target, level, pname);
      ctx.check()?;
      *dim = non_negative(pname, value.into())?;
    }

    Ok(size)
  }

  /// Specify a mipmap level of the bound 2D texture.
  ///
  /// When `texels` is provided, it must hold exactly the bytes of the image with each row padded
  /// to a multiple of 4 bytes. Without texels the storage is allocated uninitialized.
  pub fn image_2d<B>(
    &self,
    ctx: &mut Context<B>,
    level: i32,
    format: TexelFormat,
    width: u32,
    height: u32,
    texels: Option<&[u8]>,
  ) -> Result<(), Error>
  where
    B: Backend,
  {
    let too_large = PreconditionError::ImageTooLarge { width, height };
    let native_width = GLsizei::try_from(width).map_err(|_| too_large.clone())?;
    let native_height = GLsizei::try_from(height).map_err(|_| too_large.clone())?;

    if let Some(texels) = texels {
      let expected = image_2d_size(format, width, height).ok_or(too_large)?;

      if texels.len() != expected {
        return Err(
          PreconditionError::DataSizeMismatch {
            expected,
            provided: texels.len(),
          }
          .into(),
        );
      }
    }

    let (internal_format, fmt, ty) = format.to_glenums();
    ctx.backend().tex_image_2d(
      self.target().to_glenum(),
      level,
      internal_format as GLint,
      native_width,
      native_height,
      fmt,
      ty,
      texels,
    );
    ctx.check()
  }

  /// Generate the mipmap chain of the bound texture from its base level.
  pub fn generate_mipmap<B>(&self, ctx: &mut Context<B>) -> Result<(), Error>
  where
    B: Backend,
  {
    ctx.backend().generate_mipmap(self.target().to_glenum());
    ctx.check()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::binding::{TEXTURE_2D, TEXTURE_3D};
  use crate::error::DriverError;
  use crate::soft::SoftBackend;

  fn context() -> Context<SoftBackend> {
    Context::new(SoftBackend::new()).unwrap()
  }

  fn bound_2d(ctx: &mut Context<SoftBackend>) -> Texture {
    let tex = Texture::create(ctx, TextureTarget::Dim2).unwrap();
    TEXTURE_2D.set(ctx, tex).unwrap();
    tex
  }

  #[test]
  fn create_then_delete() {
    let mut ctx = context();
    let textures = Texture::create_many(&mut ctx, TextureTarget::Dim2, 2).unwrap();

    assert!(textures.iter().all(|t| t.is_valid(&mut ctx).unwrap()));
    Texture::delete_many(&mut ctx, &textures).unwrap();
    assert!(textures.iter().all(|t| !t.is_valid(&mut ctx).unwrap()));
  }

  #[test]
  fn target_is_fixed_at_creation() {
    let mut ctx = context();
    let tex = Texture::create(&mut ctx, TextureTarget::Dim2).unwrap();

    assert_eq!(
      TEXTURE_3D.set(&mut ctx, tex),
      Err(Error::Driver(DriverError::InvalidOperation))
    );
  }

  #[test]
  fn parameters() {
    let mut ctx = context();
    bound_2d(&mut ctx);

    TEXTURE_2D
      .set_filters(&mut ctx, MinFilter::LinearMipmapLinear, MagFilter::Nearest)
      .unwrap();
    TEXTURE_2D.set_wrap(&mut ctx, Wrap::MirroredRepeat).unwrap();
    TEXTURE_2D
      .set_parameter(&mut ctx, TextureParameter::MaxLevel, 3)
      .unwrap();

    assert_eq!(
      TEXTURE_2D
        .parameter(&mut ctx, TextureParameter::MinFilter)
        .unwrap(),
      gl::LINEAR_MIPMAP_LINEAR as i32
    );
    assert_eq!(
      TEXTURE_2D
        .parameter(&mut ctx, TextureParameter::MagFilter)
        .unwrap(),
      gl::NEAREST as i32
    );
    assert_eq!(
      TEXTURE_2D.parameter(&mut ctx, TextureParameter::WrapR).unwrap(),
      gl::MIRRORED_REPEAT as i32
    );
    assert_eq!(
      TEXTURE_2D
        .parameter(&mut ctx, TextureParameter::MaxLevel)
        .unwrap(),
      3
    );
  }

  #[test]
  fn mipmap_filter_is_not_a_mag_filter() {
    let mut ctx = context();
    bound_2d(&mut ctx);

    assert_eq!(
      TEXTURE_2D.set_parameter(
        &mut ctx,
        TextureParameter::MagFilter,
        gl::LINEAR_MIPMAP_LINEAR as i32
      ),
      Err(Error::Driver(DriverError::InvalidEnum))
    );
  }

  #[test]
  fn image_upload_and_size() {
    let mut ctx = context();
    bound_2d(&mut ctx);

    TEXTURE_2D
      .image_2d(&mut ctx, 0, TexelFormat::RGBA8, 4, 2, Some(&[0; 32]))
      .unwrap();
    assert_eq!(TEXTURE_2D.level_size(&mut ctx, 0).unwrap(), [4, 2, 1]);

    TEXTURE_2D.generate_mipmap(&mut ctx).unwrap();
    assert_eq!(TEXTURE_2D.level_size(&mut ctx, 1).unwrap(), [2, 1, 1]);
    assert_eq!(TEXTURE_2D.level_size(&mut ctx, 2).unwrap(), [1, 1, 1]);
  }

  #[test]
  fn rows_are_padded() {
    let mut ctx = context();
    bound_2d(&mut ctx);

    // 3 × 3 bytes per row, padded to 12
    assert_eq!(
      TEXTURE_2D.image_2d(&mut ctx, 0, TexelFormat::RGB8, 3, 2, Some(&[0; 18])),
      Err(Error::Precondition(PreconditionError::DataSizeMismatch {
        expected: 24,
        provided: 18
      }))
    );
    TEXTURE_2D
      .image_2d(&mut ctx, 0, TexelFormat::RGB8, 3, 2, Some(&[0; 24]))
      .unwrap();
  }

  #[test]
  fn oversized_images_are_rejected_locally() {
    let mut ctx = context();
    bound_2d(&mut ctx);
    let calls = ctx.backend().calls();
    let too_large = |width, height| -> Result<(), Error> {
      Err(Error::Precondition(PreconditionError::ImageTooLarge {
        width,
        height,
      }))
    };

    assert_eq!(
      TEXTURE_2D.image_2d(
        &mut ctx,
        0,
        TexelFormat::RGBA32F,
        u32::MAX,
        u32::MAX,
        Some(&[0; 4])
      ),
      too_large(u32::MAX, u32::MAX)
    );
    assert_eq!(
      TEXTURE_2D.image_2d(&mut ctx, 0, TexelFormat::R8, 1 << 31, 1, None),
      too_large(1 << 31, 1)
    );
    assert_eq!(ctx.backend().calls(), calls);
  }

  #[test]
  fn uninitialized_storage() {
    let mut ctx = context();
    bound_2d(&mut ctx);

    TEXTURE_2D
      .image_2d(&mut ctx, 0, TexelFormat::Depth32F, 16, 16, None)
      .unwrap();
    assert_eq!(TEXTURE_2D.level_size(&mut ctx, 0).unwrap(), [16, 16, 1]);
  }

  #[test]
  fn nothing_bound() {
    let mut ctx = context();

    assert_eq!(
      TEXTURE_2D.generate_mipmap(&mut ctx),
      Err(Error::Driver(DriverError::InvalidOperation))
    );
  }

  #[test]
  fn label_roundtrip() {
    let mut ctx = context();
    let tex = Texture::create(&mut ctx, TextureTarget::CubeMap).unwrap();

    tex.set_label(&mut ctx, "skybox").unwrap();
    assert_eq!(tex.label(&mut ctx).unwrap(), "skybox");
  }

  #[test]
  fn null_texture_is_rejected() {
    let mut ctx = context();
    let calls = ctx.backend().calls();

    assert_eq!(
      Texture::NULL.delete(&mut ctx),
      Err(Error::Precondition(PreconditionError::NullObject(
        ObjectKind::Texture
      )))
    );
    assert_eq!(ctx.backend().calls(), calls);
  }
}
