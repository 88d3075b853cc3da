//! Vertex arrays and vertex attribute arrays.
//!
//! A [`VertexArray`] records the vertex attribute setup: which attributes are enabled, where they
//! are read from and how they are laid out. That setup is edited through the
//! [`VertexAttribArray`] controllers of a [`Context`], and always applies to the vertex array
//! currently bound to [`VERTEX_ARRAY`](crate::binding::VERTEX_ARRAY).

use gl::types::*;

use crate::backend::Backend;
use crate::binding::Bindable;
use crate::context::{non_negative, Context};
use crate::error::Error;
use crate::handle::{named_object, Object, ObjectKind};
use crate::label::{self, LabelTarget};
use crate::state::{decode_bool, encode_bool};

named_object! {
  /// A vertex array object.
  VertexArray, VertexArray
}

impl VertexArray {
  /// Create a single vertex array.
  pub fn create<B>(ctx: &mut Context<B>) -> Result<Self, Error>
  where
    B: Backend,
  {
    let mut names = [0];
    ctx.backend().create_vertex_arrays(&mut names);
    ctx.check()?;
    crate::batch::single(names[0]).map(Self::from_raw)
  }

  /// Create `count` vertex arrays in a single native call.
  pub fn create_many<B>(ctx: &mut Context<B>, count: usize) -> Result<Vec<Self>, Error>
  where
    B: Backend,
  {
    let mut dst = vec![VertexArray::NULL; count];
    crate::batch::fill(ctx, &mut dst, |ctx, names| {
      ctx.backend().create_vertex_arrays(names)
    })?;
    Ok(dst)
  }

  /// Create `count` vertex arrays into `dst[index..index + count]`.
  ///
  /// Arguments are checked before anything reaches the driver; a zero `count` does nothing.
  pub fn create_into<B>(
    ctx: &mut Context<B>,
    dst: &mut [Self],
    index: GLsizei,
    count: GLsizei,
  ) -> Result<(), Error>
  where
    B: Backend,
  {
    let range = crate::batch::range(dst.len(), index, count)?;
    crate::batch::fill(ctx, &mut dst[range], |ctx, names| {
      ctx.backend().create_vertex_arrays(names)
    })
  }

  /// Delete several vertex arrays in a single native call.
  pub fn delete_many<B>(ctx: &mut Context<B>, arrays: &[Self]) -> Result<(), Error>
  where
    B: Backend,
  {
    let names = crate::batch::names(arrays)?;
    ctx.backend().delete_vertex_arrays(&names);
    ctx.check()
  }
}

impl Object for VertexArray {
  const KIND: ObjectKind = ObjectKind::VertexArray;

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
    let valid = ctx.backend().is_vertex_array(name);
    ctx.check()?;
    Ok(valid == gl::TRUE)
  }

  fn delete<B>(self, ctx: &mut Context<B>) -> Result<(), Error>
  where
    B: Backend,
  {
    let name = self.live()?;
    ctx.backend().delete_vertex_arrays(&[name]);
    ctx.check()
  }
}

impl Bindable for VertexArray {
  type Target = ();

  fn binding_query(_: ()) -> GLenum {
    gl::VERTEX_ARRAY_BINDING
  }

  fn bind_raw<B>(backend: &mut B, _: (), name: GLuint)
  where
    B: Backend,
  {
    backend.bind_vertex_array(name);
  }

  fn from_bound(name: GLuint) -> Self {
    VertexArray::from_raw(name)
  }

  fn bound_name(&self) -> GLuint {
    self.raw()
  }
}

/// Scalar type of a vertex attribute component.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum AttribType {
  I8,
  U8,
  I16,
  U16,
  I32,
  U32,
  F32,
}

impl AttribType {
  fn to_glenum(self) -> GLenum {
    match self {
      AttribType::I8 => gl::BYTE,
      AttribType::U8 => gl::UNSIGNED_BYTE,
      AttribType::I16 => gl::SHORT,
      AttribType::U16 => gl::UNSIGNED_SHORT,
      AttribType::I32 => gl::INT,
      AttribType::U32 => gl::UNSIGNED_INT,
      AttribType::F32 => gl::FLOAT,
    }
  }
}

/// How the shader sees an attribute.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum AttribInterpretation {
  /// Converted to floating point as-is.
  Floating,
  /// Converted to floating point, normalized to `[0, 1]` or `[-1, 1]`.
  Normalized,
  /// Kept as integers (`glVertexAttribIPointer`).
  Integral,
}

/// Layout of an attribute in the bound array buffer.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct AttribFormat {
  /// Number of components, from 1 to 4.
  pub components: u8,
  pub ty: AttribType,
  pub interpretation: AttribInterpretation,
  /// Byte distance between two consecutive attributes; `0` means tightly packed.
  pub stride: i32,
  /// Byte offset of the first attribute in the buffer.
  pub offset: usize,
}

/// Controller of the vertex attribute at a given index.
///
/// Obtained from [`Context::vertex_attrib_array`]; there are as many of them as the driver
/// supports vertex attributes.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct VertexAttribArray {
  index: GLuint,
}

impl VertexAttribArray {
  pub(crate) fn new(index: GLuint) -> Self {
    VertexAttribArray { index }
  }

  /// Index of the attribute.
  pub fn index(&self) -> u32 {
    self.index
  }

  pub fn is_enabled<B>(&self, ctx: &mut Context<B>) -> Result<bool, Error>
  where
    B: Backend,
  {
    let pname = gl::VERTEX_ATTRIB_ARRAY_ENABLED;
    let enabled = ctx.backend().get_vertex_attrib_iv(self.index, pname);
    ctx.check()?;
    Ok(decode_bool(pname, enabled)?)
  }

  pub fn set_enabled<B>(&self, ctx: &mut Context<B>, enabled: bool) -> Result<(), Error>
  where
    B: Backend,
  {
    if enabled {
      ctx.backend().enable_vertex_attrib_array(self.index);
    } else {
      ctx.backend().disable_vertex_attrib_array(self.index);
    }

    ctx.check()
  }

  /// Point the attribute at the buffer bound to
  /// [`ARRAY_BUFFER`](crate::binding::ARRAY_BUFFER).
  pub fn set_pointer<B>(&self, ctx: &mut Context<B>, format: AttribFormat) -> Result<(), Error>
  where
    B: Backend,
  {
    let normalized = format.interpretation == AttribInterpretation::Normalized;
    let integer = format.interpretation == AttribInterpretation::Integral;

    ctx.backend().vertex_attrib_pointer(
      self.index,
      format.components.into(),
      format.ty.to_glenum(),
      encode_bool(normalized),
      integer,
      format.stride,
      format.offset,
    );
    ctx.check()
  }

  /// Instancing divisor; `0` means the attribute advances per vertex.
  pub fn divisor<B>(&self, ctx: &mut Context<B>) -> Result<u32, Error>
  where
    B: Backend,
  {
    let pname = gl::VERTEX_ATTRIB_ARRAY_DIVISOR;
    let divisor = ctx.backend().get_vertex_attrib_iv(self.index, pname);
    ctx.check()?;
    Ok(non_negative(pname, divisor.into())? as u32)
  }

  pub fn set_divisor<B>(&self, ctx: &mut Context<B>, divisor: u32) -> Result<(), Error>
  where
    B: Backend,
  {
    ctx.backend().vertex_attrib_divisor(self.index, divisor);
    ctx.check()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::binding::{ARRAY_BUFFER, VERTEX_ARRAY};
  use crate::buffer::{Buffer, BufferUsage};
  use crate::error::{DriverError, PreconditionError};
  use crate::soft::SoftBackend;

  fn context() -> Context<SoftBackend> {
    Context::new(SoftBackend::new()).unwrap()
  }

  #[test]
  fn attribute_state_follows_bound_vertex_array() {
    let mut ctx = context();
    let vaos = VertexArray::create_many(&mut ctx, 2).unwrap();
    let attrib = ctx.vertex_attrib_array(0).unwrap();

    VERTEX_ARRAY.set(&mut ctx, vaos[0]).unwrap();
    attrib.set_enabled(&mut ctx, true).unwrap();
    attrib.set_divisor(&mut ctx, 1).unwrap();
    assert!(attrib.is_enabled(&mut ctx).unwrap());
    assert_eq!(attrib.divisor(&mut ctx).unwrap(), 1);

    VERTEX_ARRAY.set(&mut ctx, vaos[1]).unwrap();
    assert!(!attrib.is_enabled(&mut ctx).unwrap());
    assert_eq!(attrib.divisor(&mut ctx).unwrap(), 0);
  }

  #[test]
  fn pointer_needs_array_buffer() {
    let mut ctx = context();
    let vao = VertexArray::create(&mut ctx).unwrap();
    let attrib = ctx.vertex_attrib_array(1).unwrap();
    let format = AttribFormat {
      components: 3,
      ty: AttribType::F32,
      interpretation: AttribInterpretation::Floating,
      stride: 12,
      offset: 0,
    };

    VERTEX_ARRAY.set(&mut ctx, vao).unwrap();
    assert_eq!(
      attrib.set_pointer(&mut ctx, format),
      Err(Error::Driver(DriverError::InvalidOperation))
    );

    let vbo = Buffer::create(&mut ctx).unwrap();
    ARRAY_BUFFER.set(&mut ctx, vbo).unwrap();
    ARRAY_BUFFER
      .data(&mut ctx, &[0; 36], BufferUsage::StaticDraw)
      .unwrap();
    attrib.set_pointer(&mut ctx, format).unwrap();
  }

  #[test]
  fn null_vertex_array_is_rejected() {
    let mut ctx = context();
    let calls = ctx.backend().calls();

    assert_eq!(
      VertexArray::NULL.label(&mut ctx),
      Err(Error::Precondition(PreconditionError::NullObject(
        ObjectKind::VertexArray
      )))
    );
    assert_eq!(ctx.backend().calls(), calls);
  }
}
