//! Object handles.
//!
//! Every GPU object is represented by a small `Copy` value wrapping a [`Handle`]. A handle is
//! either [`Handle::Unallocated`] (the reserved zero / null name) or [`Handle::Allocated`] with a
//! non-zero name or pointer. Values compare and hash by handle only, and copying one copies the
//! reference, never the GPU object.
//!
//! Using an unallocated value for anything but comparison, hashing and [`Debug`](fmt::Debug) fails
//! with [`PreconditionError::NullObject`] before any native call. That includes
//! [`Display`](fmt::Display): formatting a null object returns [`fmt::Error`].

use gl::types::*;
use std::fmt;
use std::hash::Hash;
use std::num::{NonZeroU32, NonZeroUsize};

use crate::backend::Backend;
use crate::context::Context;
use crate::error::{Error, PreconditionError};

/// Kind of GPU object.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ObjectKind {
  Buffer,
  Texture,
  Shader,
  Program,
  Query,
  VertexArray,
  Sync,
}

impl ObjectKind {
  /// Namespace identifier used by object labels.
  pub(crate) fn identifier(self) -> GLenum {
    match self {
      ObjectKind::Buffer => gl::BUFFER,
      ObjectKind::Texture => gl::TEXTURE,
      ObjectKind::Shader => gl::SHADER,
      ObjectKind::Program => gl::PROGRAM,
      ObjectKind::Query => gl::QUERY,
      ObjectKind::VertexArray => gl::VERTEX_ARRAY,
      ObjectKind::Sync => gl::SYNC_FENCE,
    }
  }
}

impl fmt::Display for ObjectKind {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match *self {
      ObjectKind::Buffer => f.write_str("buffer"),
      ObjectKind::Texture => f.write_str("texture"),
      ObjectKind::Shader => f.write_str("shader"),
      ObjectKind::Program => f.write_str("program"),
      ObjectKind::Query => f.write_str("query"),
      ObjectKind::VertexArray => f.write_str("vertex array"),
      ObjectKind::Sync => f.write_str("sync object"),
    }
  }
}

/// Opaque identifier of a native object.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Handle<T> {
  /// The reserved null value; never a live object.
  Unallocated,
  /// A live (or deleted, see the module documentation) object.
  Allocated(T),
}

impl<T> Default for Handle<T> {
  fn default() -> Self {
    Handle::Unallocated
  }
}

impl<T> Handle<T>
where
  T: Copy,
{
  /// Whether this handle names an object.
  pub fn is_allocated(&self) -> bool {
    matches!(self, Handle::Allocated(_))
  }

  /// The wrapped identifier, if any.
  pub fn get(&self) -> Option<T> {
    match *self {
      Handle::Allocated(t) => Some(t),
      Handle::Unallocated => None,
    }
  }

  /// The wrapped identifier, or a [`PreconditionError::NullObject`] for `kind`.
  pub fn live(&self, kind: ObjectKind) -> Result<T, PreconditionError> {
    self.get().ok_or(PreconditionError::NullObject(kind))
  }
}

impl Handle<NonZeroU32> {
  /// Wrap an integer name; `0` gives [`Handle::Unallocated`].
  pub fn from_name(name: GLuint) -> Self {
    NonZeroU32::new(name).map_or(Handle::Unallocated, Handle::Allocated)
  }

  /// The integer name, `0` when unallocated.
  pub fn name(&self) -> GLuint {
    self.get().map_or(0, NonZeroU32::get)
  }
}

impl Handle<NonZeroUsize> {
  /// Wrap a pointer address; null gives [`Handle::Unallocated`].
  pub fn from_ptr(ptr: usize) -> Self {
    NonZeroUsize::new(ptr).map_or(Handle::Unallocated, Handle::Allocated)
  }

  /// The pointer address, `0` when unallocated.
  pub fn ptr(&self) -> usize {
    self.get().map_or(0, NonZeroUsize::get)
  }
}

/// Operations shared by every GPU object.
pub trait Object: Copy + Default + Eq + Hash + fmt::Debug {
  /// Kind of object.
  const KIND: ObjectKind;

  fn kind(&self) -> ObjectKind {
    Self::KIND
  }

  /// Whether this value is the null object.
  fn is_null(&self) -> bool;

  /// Debug label of the object; empty if none was ever set.
  fn label<B>(&self, ctx: &mut Context<B>) -> Result<String, Error>
  where
    B: Backend;

  /// Set the debug label of the object, replacing any previous one.
  ///
  /// Labels are restricted to ASCII without NUL bytes.
  fn set_label<B>(&self, ctx: &mut Context<B>, label: &str) -> Result<(), Error>
  where
    B: Backend;

  /// Whether the driver currently recognizes this value as an object of its kind.
  fn is_valid<B>(&self, ctx: &mut Context<B>) -> Result<bool, Error>
  where
    B: Backend;

  /// Release the native object.
  ///
  /// The value itself is not reset; using it afterwards is up to the driver.
  fn delete<B>(self, ctx: &mut Context<B>) -> Result<(), Error>
  where
    B: Backend;
}

/// Declare a resource type wrapping an integer name.
macro_rules! named_object {
  ($(#[$meta:meta])* $name:ident, $kind:ident) => {
    $(#[$meta])*
    #[derive(Clone, Copy, Default, Eq, Hash, PartialEq)]
    pub struct $name {
      handle: $crate::handle::Handle<std::num::NonZeroU32>,
    }

    impl $name {
      /// The null object.
      pub const NULL: Self = $name {
        handle: $crate::handle::Handle::Unallocated,
      };

      /// Wrap a raw name; `0` gives the null object.
      pub fn from_raw(name: gl::types::GLuint) -> Self {
        $name {
          handle: $crate::handle::Handle::from_name(name),
        }
      }

      /// The raw name; `0` for the null object.
      pub fn raw(&self) -> gl::types::GLuint {
        self.handle.name()
      }

      /// The wrapped handle.
      pub fn handle(&self) -> $crate::handle::Handle<std::num::NonZeroU32> {
        self.handle
      }

      pub(crate) fn live(&self) -> Result<gl::types::GLuint, $crate::error::PreconditionError> {
        self
          .handle
          .live($crate::handle::ObjectKind::$kind)
          .map(std::num::NonZeroU32::get)
      }
    }

    impl $crate::batch::Named for $name {
      fn from_name(name: gl::types::GLuint) -> Self {
        $name::from_raw(name)
      }

      fn live_name(&self) -> Result<gl::types::GLuint, $crate::error::PreconditionError> {
        self.live()
      }
    }

    impl std::fmt::Debug for $name {
      fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self.handle.get() {
          Some(name) => write!(f, concat!(stringify!($name), "({})"), name),
          None => f.write_str(concat!(stringify!($name), "(null)")),
        }
      }
    }

    impl std::fmt::Display for $name {
      fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let name = self.live().map_err(|_| std::fmt::Error)?;
        write!(f, "{} {}", $crate::handle::ObjectKind::$kind, name)
      }
    }
  };
}

pub(crate) use named_object;

/// Assertions shared by the tests of every object kind.
#[cfg(test)]
pub(crate) mod checks {
  use gl::types::GLsizei;

  use super::Object;
  use crate::context::Context;
  use crate::error::{Error, PreconditionError};
  use crate::soft::SoftBackend;

  /// Every member of the null object fails locally, without reaching the backend.
  pub(crate) fn null_is_rejected<R>(ctx: &mut Context<SoftBackend>)
  where
    R: Object,
  {
    let null = R::default();
    let expected = Error::Precondition(PreconditionError::NullObject(R::KIND));
    let calls = ctx.backend().calls();

    assert!(null.is_null());
    assert_eq!(null.kind(), R::KIND);
    assert_eq!(null.label(ctx), Err(expected.clone()));
    assert_eq!(null.set_label(ctx, "null"), Err(expected.clone()));
    assert_eq!(null.is_valid(ctx), Err(expected.clone()));
    assert_eq!(null.delete(ctx), Err(expected));
    assert_eq!(ctx.backend().calls(), calls);
  }

  /// A fresh object is valid and unlabeled, keeps the last label set, and is gone once deleted.
  pub(crate) fn lifecycle<R>(ctx: &mut Context<SoftBackend>, object: R)
  where
    R: Object,
  {
    assert!(!object.is_null());
    assert!(object.is_valid(ctx).unwrap());
    assert_eq!(object.label(ctx).unwrap(), "");

    object.set_label(ctx, "first").unwrap();
    assert_eq!(object.label(ctx).unwrap(), "first");
    object.set_label(ctx, "second").unwrap();
    assert_eq!(object.label(ctx).unwrap(), "second");

    object.delete(ctx).unwrap();
    assert!(!object.is_valid(ctx).unwrap());
  }

  /// Batch creation into a slice validates its arguments before any native call.
  pub(crate) fn create_into_checks_arguments<R, F>(ctx: &mut Context<SoftBackend>, mut create_into: F)
  where
    R: Object,
    F: FnMut(&mut Context<SoftBackend>, &mut [R], GLsizei, GLsizei) -> Result<(), Error>,
  {
    let mut dst = [R::default(); 4];
    let calls = ctx.backend().calls();

    assert_eq!(
      create_into(ctx, &mut dst, 0, -1),
      Err(Error::Precondition(PreconditionError::NegativeCount(-1)))
    );
    assert_eq!(
      create_into(ctx, &mut dst, -1, 1),
      Err(Error::Precondition(PreconditionError::NegativeIndex(-1)))
    );
    assert_eq!(
      create_into(ctx, &mut dst, 3, 2),
      Err(Error::Precondition(PreconditionError::OutOfRange {
        index: 3,
        count: 2,
        len: 4
      }))
    );
    create_into(ctx, &mut dst, 2, 0).unwrap();
    assert_eq!(dst, [R::default(); 4]);
    assert_eq!(ctx.backend().calls(), calls);

    create_into(ctx, &mut dst, 1, 2).unwrap();
    assert!(dst[0].is_null() && dst[3].is_null());
    assert!(!dst[1].is_null() && !dst[2].is_null());
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::buffer::Buffer;
  use crate::program::Program;
  use crate::query::{Query, QueryTarget};
  use crate::shader::{Shader, ShaderType};
  use crate::soft::SoftBackend;
  use crate::sync::Fence;
  use crate::texture::{Texture, TextureTarget};
  use crate::vertex_array::VertexArray;

  fn context() -> Context<SoftBackend> {
    Context::new(SoftBackend::new()).unwrap()
  }

  #[test]
  fn every_kind_rejects_null() {
    let mut ctx = context();

    checks::null_is_rejected::<Buffer>(&mut ctx);
    checks::null_is_rejected::<Texture>(&mut ctx);
    checks::null_is_rejected::<Shader>(&mut ctx);
    checks::null_is_rejected::<Program>(&mut ctx);
    checks::null_is_rejected::<Query>(&mut ctx);
    checks::null_is_rejected::<VertexArray>(&mut ctx);
    checks::null_is_rejected::<Fence>(&mut ctx);
  }

  #[test]
  fn every_kind_lives_and_dies() {
    let mut ctx = context();

    let buffer = Buffer::create(&mut ctx).unwrap();
    checks::lifecycle(&mut ctx, buffer);
    let texture = Texture::create(&mut ctx, TextureTarget::Dim2).unwrap();
    checks::lifecycle(&mut ctx, texture);
    let shader = Shader::create(&mut ctx, ShaderType::Fragment).unwrap();
    checks::lifecycle(&mut ctx, shader);
    let program = Program::create(&mut ctx).unwrap();
    checks::lifecycle(&mut ctx, program);
    let query = Query::create(&mut ctx, QueryTarget::SamplesPassed).unwrap();
    checks::lifecycle(&mut ctx, query);
    let vertex_array = VertexArray::create(&mut ctx).unwrap();
    checks::lifecycle(&mut ctx, vertex_array);
    let fence = Fence::create(&mut ctx).unwrap();
    checks::lifecycle(&mut ctx, fence);
  }

  #[test]
  fn every_batch_kind_checks_create_into() {
    let mut ctx = context();

    checks::create_into_checks_arguments(&mut ctx, Buffer::create_into);
    checks::create_into_checks_arguments(&mut ctx, VertexArray::create_into);
    checks::create_into_checks_arguments(&mut ctx, |ctx, dst, index, count| {
      Texture::create_into(ctx, TextureTarget::Dim3, dst, index, count)
    });
    checks::create_into_checks_arguments(&mut ctx, |ctx, dst, index, count| {
      Query::create_into(ctx, QueryTarget::TimeElapsed, dst, index, count)
    });
  }

  #[test]
  fn zero_is_unallocated() {
    assert_eq!(Handle::<NonZeroU32>::from_name(0), Handle::Unallocated);
    assert_eq!(Handle::<NonZeroUsize>::from_ptr(0), Handle::Unallocated);
    assert_eq!(Handle::<NonZeroU32>::default(), Handle::Unallocated);
  }

  #[test]
  fn name_roundtrip() {
    let h = Handle::<NonZeroU32>::from_name(42);

    assert!(h.is_allocated());
    assert_eq!(h.name(), 42);
    assert_eq!(Handle::<NonZeroU32>::Unallocated.name(), 0);
  }

  #[test]
  fn live_reports_kind() {
    let h = Handle::<NonZeroU32>::Unallocated;

    assert_eq!(
      h.live(ObjectKind::Texture),
      Err(PreconditionError::NullObject(ObjectKind::Texture))
    );
  }
}
