//! GPU buffers.
//!
//! A [`Buffer`] is a region of GPU memory. Its storage is allocated, uploaded and read back
//! through one of the buffer binding points ([`ARRAY_BUFFER`](crate::binding::ARRAY_BUFFER),
//! [`UNIFORM_BUFFER`](crate::binding::UNIFORM_BUFFER), …) while its attributes are queried
//! directly on the buffer.

use gl::types::*;

use crate::backend::Backend;
use crate::binding::{Bindable, BindingPoint};
use crate::context::{non_negative, Context};
use crate::error::{Error, StateQueryError};
use crate::handle::{named_object, Object, ObjectKind};
use crate::label::{self, LabelTarget};

named_object! {
  /// A buffer object.
  Buffer, Buffer
}

impl Buffer {
  /// Create a single buffer.
  pub fn create<B>(ctx: &mut Context<B>) -> Result<Self, Error>
  where
    B: Backend,
  {
    let mut names = [0];
    ctx.backend().create_buffers(&mut names);
    ctx.check()?;
    crate::batch::single(names[0]).map(Self::from_raw)
  }

  /// Create `count` buffers in a single native call.
  pub fn create_many<B>(ctx: &mut Context<B>, count: usize) -> Result<Vec<Self>, Error>
  where
    B: Backend,
  {
    let mut dst = vec![Buffer::NULL; count];
    crate::batch::fill(ctx, &mut dst, |ctx, names| ctx.backend().create_buffers(names))?;
    Ok(dst)
  }

  /// Create `count` buffers into `dst[index..index + count]`.
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
      ctx.backend().create_buffers(names)
    })
  }

  /// Delete several buffers in a single native call.
  pub fn delete_many<B>(ctx: &mut Context<B>, buffers: &[Self]) -> Result<(), Error>
  where
    B: Backend,
  {
    let names = crate::batch::names(buffers)?;
    ctx.backend().delete_buffers(&names);
    ctx.check()
  }

  /// Size of the storage, in bytes.
  pub fn size<B>(&self, ctx: &mut Context<B>) -> Result<usize, Error>
  where
    B: Backend,
  {
    let size = self.parameter(ctx, gl::BUFFER_SIZE)?;
    Ok(non_negative(gl::BUFFER_SIZE, size)?)
  }

  /// Usage hint the storage was allocated with.
  pub fn usage<B>(&self, ctx: &mut Context<B>) -> Result<BufferUsage, Error>
  where
    B: Backend,
  {
    let usage = self.parameter(ctx, gl::BUFFER_USAGE)?;
    Ok(BufferUsage::from_glenum(usage as GLenum)?)
  }

  fn parameter<B>(&self, ctx: &mut Context<B>, pname: GLenum) -> Result<GLint64, Error>
  where
    B: Backend,
  {
    let name = self.live()?;
    let value = ctx.backend().get_buffer_parameter(name, pname);
    ctx.check()?;
    Ok(value)
  }
}

impl Object for Buffer {
  const KIND: ObjectKind = ObjectKind::Buffer;

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
    let valid = ctx.backend().is_buffer(name);
    ctx.check()?;
    Ok(valid == gl::TRUE)
  }

  fn delete<B>(self, ctx: &mut Context<B>) -> Result<(), Error>
  where
    B: Backend,
  {
    let name = self.live()?;
    ctx.backend().delete_buffers(&[name]);
    ctx.check()
  }
}

/// Targets a buffer can be bound to.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum BufferTarget {
  /// Vertex attributes.
  Array,
  /// Vertex indices.
  ElementArray,
  /// Uniform blocks.
  Uniform,
  /// Source of buffer-to-buffer copies.
  CopyRead,
  /// Destination of buffer-to-buffer copies.
  CopyWrite,
  /// Destination of pixel reads.
  PixelPack,
  /// Source of texture uploads.
  PixelUnpack,
}

impl BufferTarget {
  pub(crate) fn to_glenum(self) -> GLenum {
    match self {
      BufferTarget::Array => gl::ARRAY_BUFFER,
      BufferTarget::ElementArray => gl::ELEMENT_ARRAY_BUFFER,
      BufferTarget::Uniform => gl::UNIFORM_BUFFER,
      BufferTarget::CopyRead => gl::COPY_READ_BUFFER,
      BufferTarget::CopyWrite => gl::COPY_WRITE_BUFFER,
      BufferTarget::PixelPack => gl::PIXEL_PACK_BUFFER,
      BufferTarget::PixelUnpack => gl::PIXEL_UNPACK_BUFFER,
    }
  }
}

impl Bindable for Buffer {
  type Target = BufferTarget;

  fn binding_query(target: BufferTarget) -> GLenum {
    match target {
      BufferTarget::Array => gl::ARRAY_BUFFER_BINDING,
      BufferTarget::ElementArray => gl::ELEMENT_ARRAY_BUFFER_BINDING,
      BufferTarget::Uniform => gl::UNIFORM_BUFFER_BINDING,
      BufferTarget::CopyRead => gl::COPY_READ_BUFFER_BINDING,
      BufferTarget::CopyWrite => gl::COPY_WRITE_BUFFER_BINDING,
      BufferTarget::PixelPack => gl::PIXEL_PACK_BUFFER_BINDING,
      BufferTarget::PixelUnpack => gl::PIXEL_UNPACK_BUFFER_BINDING,
    }
  }

  fn bind_raw<B>(backend: &mut B, target: BufferTarget, name: GLuint)
  where
    B: Backend,
  {
    backend.bind_buffer(target.to_glenum(), name);
  }

  fn from_bound(name: GLuint) -> Self {
    Buffer::from_raw(name)
  }

  fn bound_name(&self) -> GLuint {
    self.raw()
  }
}

/// Hints to the driver as to how often and in what way a buffer will be used.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum BufferUsage {
  StreamDraw,
  StreamRead,
  StreamCopy,
  StaticDraw,
  StaticRead,
  StaticCopy,
  DynamicDraw,
  DynamicRead,
  DynamicCopy,
}

impl BufferUsage {
  pub(crate) fn to_glenum(self) -> GLenum {
    match self {
      BufferUsage::StreamDraw => gl::STREAM_DRAW,
      BufferUsage::StreamRead => gl::STREAM_READ,
      BufferUsage::StreamCopy => gl::STREAM_COPY,
      BufferUsage::StaticDraw => gl::STATIC_DRAW,
      BufferUsage::StaticRead => gl::STATIC_READ,
      BufferUsage::StaticCopy => gl::STATIC_COPY,
      BufferUsage::DynamicDraw => gl::DYNAMIC_DRAW,
      BufferUsage::DynamicRead => gl::DYNAMIC_READ,
      BufferUsage::DynamicCopy => gl::DYNAMIC_COPY,
    }
  }

  pub(crate) fn from_glenum(usage: GLenum) -> Result<Self, StateQueryError> {
    match usage {
      gl::STREAM_DRAW => Ok(BufferUsage::StreamDraw),
      gl::STREAM_READ => Ok(BufferUsage::StreamRead),
      gl::STREAM_COPY => Ok(BufferUsage::StreamCopy),
      gl::STATIC_DRAW => Ok(BufferUsage::StaticDraw),
      gl::STATIC_READ => Ok(BufferUsage::StaticRead),
      gl::STATIC_COPY => Ok(BufferUsage::StaticCopy),
      gl::DYNAMIC_DRAW => Ok(BufferUsage::DynamicDraw),
      gl::DYNAMIC_READ => Ok(BufferUsage::DynamicRead),
      gl::DYNAMIC_COPY => Ok(BufferUsage::DynamicCopy),
      _ => Err(StateQueryError::UnknownBufferUsage(usage)),
    }
  }
}

impl BindingPoint<Buffer> {
  /// Replace the storage of the bound buffer with a copy of `data`.
  pub fn data<B>(&self, ctx: &mut Context<B>, data: &[u8], usage: BufferUsage) -> Result<(), Error>
  where
    B: Backend,
  {
    let target = self.target().to_glenum();
    ctx
      .backend()
      .buffer_data(target, data.len() as GLsizeiptr, Some(data), usage.to_glenum());
    ctx.check()
  }

  /// Replace the storage of the bound buffer with `size` uninitialized bytes.
  pub fn allocate<B>(
    &self,
    ctx: &mut Context<B>,
    size: GLsizeiptr,
    usage: BufferUsage,
  ) -> Result<(), Error>
  where
    B: Backend,
  {
    let target = self.target().to_glenum();
    ctx
      .backend()
      .buffer_data(target, size, None, usage.to_glenum());
    ctx.check()
  }

  /// Overwrite part of the storage of the bound buffer, starting at byte `offset`.
  pub fn sub_data<B>(&self, ctx: &mut Context<B>, offset: GLintptr, data: &[u8]) -> Result<(), Error>
  where
    B: Backend,
  {
    let target = self.target().to_glenum();
    ctx.backend().buffer_sub_data(target, offset, data);
    ctx.check()
  }

  /// Read back `out.len()` bytes of the bound buffer, starting at byte `offset`.
  pub fn read<B>(&self, ctx: &mut Context<B>, offset: GLintptr, out: &mut [u8]) -> Result<(), Error>
  where
    B: Backend,
  {
    let target = self.target().to_glenum();
    ctx.backend().get_buffer_sub_data(target, offset, out);
    ctx.check()
  }

  /// Bind `buffer` to the indexed slot `index` of this target (and to the target itself).
  ///
  /// Only meaningful for indexed targets such as
  /// [`UNIFORM_BUFFER`](crate::binding::UNIFORM_BUFFER); the driver rejects the others.
  pub fn bind_base<B>(&self, ctx: &mut Context<B>, index: u32, buffer: Buffer) -> Result<(), Error>
  where
    B: Backend,
  {
    let target = self.target().to_glenum();
    ctx.backend().bind_buffer_base(target, index, buffer.raw());
    ctx.check()
  }

  /// Buffer bound to the indexed slot `index` of this target.
  pub fn get_indexed<B>(&self, ctx: &mut Context<B>, index: u32) -> Result<Buffer, Error>
  where
    B: Backend,
  {
    let pname = Buffer::binding_query(self.target());
    let name = ctx.get_integer_indexed(pname, index)?;
    let name = non_negative(pname, name.into())?;
    Ok(Buffer::from_raw(name as GLuint))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::binding::{ARRAY_BUFFER, ELEMENT_ARRAY_BUFFER, UNIFORM_BUFFER};
  use crate::error::{DriverError, PreconditionError};
  use crate::soft::SoftBackend;
  use std::collections::hash_map::DefaultHasher;
  use std::hash::{Hash, Hasher};

  fn context() -> Context<SoftBackend> {
    Context::new(SoftBackend::new()).unwrap()
  }

  fn hash(buffer: &Buffer) -> u64 {
    let mut hasher = DefaultHasher::new();
    buffer.hash(&mut hasher);
    hasher.finish()
  }

  #[test]
  fn create_then_delete() {
    let mut ctx = context();
    let buf = Buffer::create(&mut ctx).unwrap();

    assert!(!buf.is_null());
    assert_ne!(buf.raw(), 0);
    assert!(buf.is_valid(&mut ctx).unwrap());

    buf.delete(&mut ctx).unwrap();
    assert!(!buf.is_valid(&mut ctx).unwrap());
  }

  #[test]
  fn uploaded_size_is_reported() {
    let mut ctx = context();
    let buf = Buffer::create(&mut ctx).unwrap();
    let data = [1u8; 123];

    ARRAY_BUFFER.set(&mut ctx, buf).unwrap();
    ARRAY_BUFFER
      .data(&mut ctx, &data, BufferUsage::StaticDraw)
      .unwrap();

    assert_eq!(buf.size(&mut ctx).unwrap(), data.len());
    assert_eq!(buf.usage(&mut ctx).unwrap(), BufferUsage::StaticDraw);
  }

  #[test]
  fn size_does_not_depend_on_binding() {
    let mut ctx = context();
    let buf = Buffer::create(&mut ctx).unwrap();

    ELEMENT_ARRAY_BUFFER.set(&mut ctx, buf).unwrap();
    ELEMENT_ARRAY_BUFFER
      .allocate(&mut ctx, 64, BufferUsage::DynamicDraw)
      .unwrap();
    ELEMENT_ARRAY_BUFFER.set(&mut ctx, Buffer::NULL).unwrap();

    assert_eq!(buf.size(&mut ctx).unwrap(), 64);
  }

  #[test]
  fn huge_allocation_is_out_of_memory() {
    let mut ctx = context();
    let buf = Buffer::create(&mut ctx).unwrap();

    ARRAY_BUFFER.set(&mut ctx, buf).unwrap();
    ARRAY_BUFFER
      .allocate(&mut ctx, 16, BufferUsage::StaticDraw)
      .unwrap();

    assert_eq!(
      ARRAY_BUFFER.allocate(&mut ctx, GLsizeiptr::MAX, BufferUsage::StaticDraw),
      Err(Error::Driver(DriverError::OutOfMemory))
    );
    assert_eq!(buf.size(&mut ctx).unwrap(), 16);
  }

  #[test]
  fn sub_data_and_read_back() {
    let mut ctx = context();
    let buf = Buffer::create(&mut ctx).unwrap();
    let mut out = [0; 4];

    ARRAY_BUFFER.set(&mut ctx, buf).unwrap();
    ARRAY_BUFFER
      .data(&mut ctx, &[0; 8], BufferUsage::StreamDraw)
      .unwrap();
    ARRAY_BUFFER.sub_data(&mut ctx, 2, &[1, 2, 3, 4]).unwrap();
    ARRAY_BUFFER.read(&mut ctx, 1, &mut out).unwrap();

    assert_eq!(out, [0, 1, 2, 3]);
    assert_eq!(
      ARRAY_BUFFER.sub_data(&mut ctx, 6, &[1, 2, 3, 4]),
      Err(Error::Driver(DriverError::InvalidValue))
    );
  }

  #[test]
  fn upload_without_binding_fails() {
    let mut ctx = context();

    assert_eq!(
      ARRAY_BUFFER.data(&mut ctx, &[0; 4], BufferUsage::StaticDraw),
      Err(Error::Driver(DriverError::InvalidOperation))
    );
  }

  #[test]
  fn indexed_uniform_binding() {
    let mut ctx = context();
    let buf = Buffer::create(&mut ctx).unwrap();

    UNIFORM_BUFFER.bind_base(&mut ctx, 2, buf).unwrap();
    assert_eq!(UNIFORM_BUFFER.get_indexed(&mut ctx, 2).unwrap(), buf);
    assert_eq!(UNIFORM_BUFFER.get_indexed(&mut ctx, 0).unwrap(), Buffer::NULL);
    assert_eq!(UNIFORM_BUFFER.get(&mut ctx).unwrap(), buf);
  }

  #[test]
  fn batch_create() {
    let mut ctx = context();
    let buffers = Buffer::create_many(&mut ctx, 3).unwrap();

    assert_eq!(buffers.len(), 3);
    assert!(buffers.iter().all(|b| !b.is_null()));
    assert_ne!(buffers[0], buffers[1]);
    assert_ne!(buffers[1], buffers[2]);

    Buffer::delete_many(&mut ctx, &buffers).unwrap();
  }

  #[test]
  fn batch_create_into_checks_arguments_first() {
    let mut ctx = context();
    let mut dst = [Buffer::NULL; 4];
    let calls = ctx.backend().calls();

    assert_eq!(
      Buffer::create_into(&mut ctx, &mut dst, 0, -1),
      Err(Error::Precondition(PreconditionError::NegativeCount(-1)))
    );
    assert_eq!(
      Buffer::create_into(&mut ctx, &mut dst, -1, 1),
      Err(Error::Precondition(PreconditionError::NegativeIndex(-1)))
    );
    assert_eq!(
      Buffer::create_into(&mut ctx, &mut dst, 3, 2),
      Err(Error::Precondition(PreconditionError::OutOfRange {
        index: 3,
        count: 2,
        len: 4
      }))
    );
    assert_eq!(ctx.backend().calls(), calls);
  }

  #[test]
  fn batch_create_into_zero_is_a_noop() {
    let mut ctx = context();
    let mut dst = [Buffer::NULL; 2];
    let calls = ctx.backend().calls();

    Buffer::create_into(&mut ctx, &mut dst, 1, 0).unwrap();
    assert_eq!(dst, [Buffer::NULL; 2]);
    assert_eq!(ctx.backend().calls(), calls);
  }

  #[test]
  fn batch_create_into_fills_range_only() {
    let mut ctx = context();
    let mut dst = [Buffer::NULL; 4];

    Buffer::create_into(&mut ctx, &mut dst, 1, 2).unwrap();
    assert!(dst[0].is_null());
    assert!(!dst[1].is_null());
    assert!(!dst[2].is_null());
    assert!(dst[3].is_null());
  }

  #[test]
  fn delete_many_rejects_null() {
    let mut ctx = context();
    let buf = Buffer::create(&mut ctx).unwrap();

    assert_eq!(
      Buffer::delete_many(&mut ctx, &[buf, Buffer::NULL]),
      Err(Error::Precondition(PreconditionError::NullObject(
        ObjectKind::Buffer
      )))
    );
    assert!(buf.is_valid(&mut ctx).unwrap());
  }

  #[test]
  fn null_buffer_is_rejected_locally() {
    let mut ctx = context();
    let null = Buffer::default();
    let calls = ctx.backend().calls();
    let expected = Err(Error::Precondition(PreconditionError::NullObject(
      ObjectKind::Buffer,
    )));

    assert_eq!(null.size(&mut ctx).map(|_| ()), expected);
    assert_eq!(null.usage(&mut ctx).map(|_| ()), expected);
    assert_eq!(null.label(&mut ctx).map(|_| ()), expected);
    assert_eq!(null.set_label(&mut ctx, "x"), expected);
    assert_eq!(null.is_valid(&mut ctx).map(|_| ()), expected);
    assert_eq!(null.delete(&mut ctx), expected);
    assert_eq!(ctx.backend().calls(), calls);
  }

  #[test]
  fn label_roundtrip() {
    let mut ctx = context();
    let buf = Buffer::create(&mut ctx).unwrap();

    assert_eq!(buf.label(&mut ctx).unwrap(), "");
    buf.set_label(&mut ctx, "vertices").unwrap();
    assert_eq!(buf.label(&mut ctx).unwrap(), "vertices");
    buf.set_label(&mut ctx, "indices").unwrap();
    assert_eq!(buf.label(&mut ctx).unwrap(), "indices");
  }

  #[test]
  fn multibyte_label_is_rejected() {
    let mut ctx = context();
    let buf = Buffer::create(&mut ctx).unwrap();

    assert_eq!(
      buf.set_label(&mut ctx, "données"),
      Err(Error::Precondition(PreconditionError::InvalidLabel))
    );
    assert_eq!(buf.label(&mut ctx).unwrap(), "");
  }

  #[test]
  fn equality_follows_handle() {
    let a = Buffer::from_raw(3);
    let b = Buffer::from_raw(3);
    let c = Buffer::from_raw(4);

    assert_eq!(a, b);
    assert_eq!(hash(&a), hash(&b));
    assert_ne!(a, c);
    assert_ne!(hash(&a), hash(&c));
  }

  #[test]
  fn display_requires_a_live_buffer() {
    use std::fmt::Write as _;

    let mut s = String::new();
    assert!(write!(s, "{}", Buffer::NULL).is_err());
    assert_eq!(Buffer::from_raw(7).to_string(), "buffer 7");
    assert_eq!(format!("{:?}", Buffer::NULL), "Buffer(null)");
  }
}
