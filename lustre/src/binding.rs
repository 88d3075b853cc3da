//! Binding points.
//!
//! A binding point is a slot through which an object becomes the active one for the operations
//! that follow: uploading to “the array buffer”, setting parameters of “the 2D texture”, drawing
//! with “the current program”, etc.
//!
//! Binding points keep no history and no cache: [`BindingPoint::set`] always reaches the driver
//! and the last call wins. Code that needs to restore a previous binding must read it with
//! [`BindingPoint::get`] first.

use gl::types::*;
use std::fmt;

use crate::backend::Backend;
use crate::buffer::{Buffer, BufferTarget};
use crate::context::{non_negative, Context};
use crate::error::Error;
use crate::handle::Object;
use crate::program::Program;
use crate::texture::{Texture, TextureTarget};
use crate::vertex_array::VertexArray;

/// Objects that can be bound.
pub trait Bindable: Object {
  /// What the object binds to.
  type Target: Copy + fmt::Debug + Eq;

  /// State key holding the name bound to `target`.
  fn binding_query(target: Self::Target) -> GLenum;

  /// Issue the native bind call.
  fn bind_raw<B>(backend: &mut B, target: Self::Target, name: GLuint)
  where
    B: Backend;

  /// Wrap a name read back from the binding query.
  fn from_bound(name: GLuint) -> Self;

  /// Name to bind; `0` for the null object, which unbinds.
  fn bound_name(&self) -> GLuint;
}

/// A target slot objects of type `R` are bound to.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BindingPoint<R>
where
  R: Bindable,
{
  target: R::Target,
}

impl<R> BindingPoint<R>
where
  R: Bindable,
{
  /// Binding point for `target`.
  pub const fn new(target: R::Target) -> Self {
    BindingPoint { target }
  }

  /// The target this binding point stands for.
  pub fn target(&self) -> R::Target {
    self.target
  }

  /// Object currently bound; the null object if none.
  pub fn get<B>(&self, ctx: &mut Context<B>) -> Result<R, Error>
  where
    B: Backend,
  {
    let pname = R::binding_query(self.target);
    let [name] = ctx.get_integers::<1>(pname)?;
    let name = non_negative(pname, name.into())?;

    Ok(R::from_bound(name as GLuint))
  }

  /// Bind `object`, or unbind with the null object.
  pub fn set<B>(&self, ctx: &mut Context<B>, object: R) -> Result<(), Error>
  where
    B: Backend,
  {
    R::bind_raw(ctx.backend(), self.target, object.bound_name());
    ctx.check()
  }
}

pub const ARRAY_BUFFER: BindingPoint<Buffer> = BindingPoint::new(BufferTarget::Array);
pub const ELEMENT_ARRAY_BUFFER: BindingPoint<Buffer> =
  BindingPoint::new(BufferTarget::ElementArray);
pub const UNIFORM_BUFFER: BindingPoint<Buffer> = BindingPoint::new(BufferTarget::Uniform);
pub const COPY_READ_BUFFER: BindingPoint<Buffer> = BindingPoint::new(BufferTarget::CopyRead);
pub const COPY_WRITE_BUFFER: BindingPoint<Buffer> = BindingPoint::new(BufferTarget::CopyWrite);
pub const PIXEL_PACK_BUFFER: BindingPoint<Buffer> = BindingPoint::new(BufferTarget::PixelPack);
pub const PIXEL_UNPACK_BUFFER: BindingPoint<Buffer> =
  BindingPoint::new(BufferTarget::PixelUnpack);

pub const TEXTURE_1D: BindingPoint<Texture> = BindingPoint::new(TextureTarget::Dim1);
pub const TEXTURE_2D: BindingPoint<Texture> = BindingPoint::new(TextureTarget::Dim2);
pub const TEXTURE_3D: BindingPoint<Texture> = BindingPoint::new(TextureTarget::Dim3);
pub const TEXTURE_1D_ARRAY: BindingPoint<Texture> = BindingPoint::new(TextureTarget::Dim1Array);
pub const TEXTURE_2D_ARRAY: BindingPoint<Texture> = BindingPoint::new(TextureTarget::Dim2Array);
pub const TEXTURE_CUBE_MAP: BindingPoint<Texture> = BindingPoint::new(TextureTarget::CubeMap);
pub const TEXTURE_RECTANGLE: BindingPoint<Texture> = BindingPoint::new(TextureTarget::Rectangle);

/// The vertex array used by draw calls and edited by vertex attribute controllers.
pub const VERTEX_ARRAY: BindingPoint<VertexArray> = BindingPoint::new(());

/// The program used by draw calls and uniform uploads.
pub const PROGRAM: BindingPoint<Program> = BindingPoint::new(());

#[cfg(test)]
mod tests {
  use super::*;
  use crate::error::DriverError;
  use crate::soft::SoftBackend;

  fn context() -> Context<SoftBackend> {
    Context::new(SoftBackend::new()).unwrap()
  }

  #[test]
  fn unbound_at_start() {
    let mut ctx = context();

    assert_eq!(ARRAY_BUFFER.get(&mut ctx).unwrap(), Buffer::NULL);
    assert_eq!(TEXTURE_2D.get(&mut ctx).unwrap(), Texture::NULL);
    assert_eq!(VERTEX_ARRAY.get(&mut ctx).unwrap(), VertexArray::NULL);
    assert_eq!(PROGRAM.get(&mut ctx).unwrap(), Program::NULL);
  }

  #[test]
  fn get_after_set() {
    let mut ctx = context();
    let buf = Buffer::create(&mut ctx).unwrap();

    ARRAY_BUFFER.set(&mut ctx, buf).unwrap();
    assert_eq!(ARRAY_BUFFER.get(&mut ctx).unwrap(), buf);
    assert_eq!(ELEMENT_ARRAY_BUFFER.get(&mut ctx).unwrap(), Buffer::NULL);
  }

  #[test]
  fn set_twice_is_set_once() {
    let mut ctx = context();
    let buf = Buffer::create(&mut ctx).unwrap();

    ARRAY_BUFFER.set(&mut ctx, buf).unwrap();
    let once = ARRAY_BUFFER.get(&mut ctx).unwrap();
    ARRAY_BUFFER.set(&mut ctx, buf).unwrap();
    let twice = ARRAY_BUFFER.get(&mut ctx).unwrap();

    assert_eq!(once, twice);
  }

  #[test]
  fn every_set_reaches_the_driver() {
    let mut ctx = context();
    let buf = Buffer::create(&mut ctx).unwrap();

    ARRAY_BUFFER.set(&mut ctx, buf).unwrap();
    let calls = ctx.backend().calls();
    ARRAY_BUFFER.set(&mut ctx, buf).unwrap();

    // bind + error check
    assert_eq!(ctx.backend().calls(), calls + 2);
  }

  #[test]
  fn last_set_wins() {
    let mut ctx = context();
    let a = Buffer::create(&mut ctx).unwrap();
    let b = Buffer::create(&mut ctx).unwrap();

    ARRAY_BUFFER.set(&mut ctx, a).unwrap();
    ARRAY_BUFFER.set(&mut ctx, b).unwrap();
    assert_eq!(ARRAY_BUFFER.get(&mut ctx).unwrap(), b);

    ARRAY_BUFFER.set(&mut ctx, Buffer::NULL).unwrap();
    assert_eq!(ARRAY_BUFFER.get(&mut ctx).unwrap(), Buffer::NULL);
  }

  #[test]
  fn binding_a_deleted_object_fails() {
    let mut ctx = context();
    let buf = Buffer::create(&mut ctx).unwrap();
    buf.delete(&mut ctx).unwrap();

    assert_eq!(
      ARRAY_BUFFER.set(&mut ctx, buf),
      Err(Error::Driver(DriverError::InvalidOperation))
    );
  }

  #[test]
  fn texture_bindings_are_per_unit() {
    let mut ctx = context();
    let tex = Texture::create(&mut ctx, TextureTarget::Dim2).unwrap();

    TEXTURE_2D.set(&mut ctx, tex).unwrap();
    ctx.set_active_texture_unit(1).unwrap();
    assert_eq!(TEXTURE_2D.get(&mut ctx).unwrap(), Texture::NULL);
    ctx.set_active_texture_unit(0).unwrap();
    assert_eq!(TEXTURE_2D.get(&mut ctx).unwrap(), tex);
  }
}
